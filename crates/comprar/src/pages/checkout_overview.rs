//! Checkout step two: the order overview with rendered totals.

use crate::checkout::{DisplayedTotals, PRICE_EPSILON};
use crate::command::Predicate;
use crate::locator::ElementQuery;
use crate::pages::parse_amount;
use crate::result::{ComprarError, ComprarResult};
use crate::session::Session;

/// The order overview page (checkout step two).
#[derive(Debug)]
pub struct CheckoutOverviewPage<'a> {
    session: &'a mut Session,
}

impl<'a> CheckoutOverviewPage<'a> {
    /// Wrap a session expected to be on the overview.
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Wait for the page title.
    pub fn verify_loaded(&mut self) -> ComprarResult<()> {
        self.session.assert(
            ElementQuery::css(".title"),
            Predicate::TextEquals("Checkout: Overview".to_string()),
        )
    }

    /// Names of the items in the order, in render order.
    pub fn item_names(&mut self) -> ComprarResult<Vec<String>> {
        self.session
            .read_texts(ElementQuery::css(".inventory_item_name"))
    }

    /// Number of order rows.
    pub fn item_count(&mut self) -> ComprarResult<usize> {
        self.session.read_count(ElementQuery::css(".cart_item"))
    }

    /// The three money amounts as rendered, parsed out of their labels.
    pub fn displayed_totals(&mut self) -> ComprarResult<DisplayedTotals> {
        let subtotal_text = self
            .session
            .read_text(ElementQuery::css(".summary_subtotal_label"))?;
        let tax_text = self.session.read_text(ElementQuery::css(".summary_tax_label"))?;
        let total_text = self
            .session
            .read_text(ElementQuery::css(".summary_total_label"))?;
        Ok(DisplayedTotals {
            subtotal: parse_amount("subtotal", &subtotal_text)?,
            tax: parse_amount("tax", &tax_text)?,
            total: parse_amount("total", &total_text)?,
        })
    }

    /// Reconcile the rendered amounts against an expected subtotal:
    /// subtotal within epsilon of `expected_subtotal`, and total within
    /// epsilon of subtotal plus tax. Mismatches are fatal, never retried.
    pub fn verify_price_consistency(&mut self, expected_subtotal: f64) -> ComprarResult<()> {
        let totals = self.displayed_totals()?;
        if (totals.subtotal - expected_subtotal).abs() > PRICE_EPSILON {
            return Err(ComprarError::DataIntegrityMismatch {
                label: "item subtotal".to_string(),
                computed: expected_subtotal,
                displayed: totals.subtotal,
                epsilon: PRICE_EPSILON,
            });
        }
        let expected_total = totals.subtotal + totals.tax;
        if (totals.total - expected_total).abs() > PRICE_EPSILON {
            return Err(ComprarError::DataIntegrityMismatch {
                label: "order total".to_string(),
                computed: expected_total,
                displayed: totals.total,
                epsilon: PRICE_EPSILON,
            });
        }
        Ok(())
    }

    /// The rendered payment method.
    pub fn payment_info(&mut self) -> ComprarResult<String> {
        self.session.read_text(ElementQuery::test_id("payment-info-value"))
    }

    /// The rendered shipping method.
    pub fn shipping_info(&mut self) -> ComprarResult<String> {
        self.session.read_text(ElementQuery::test_id("shipping-info-value"))
    }

    /// Abandon checkout; this step's cancel returns to the inventory.
    pub fn cancel(&mut self) -> ComprarResult<()> {
        self.session.click(ElementQuery::test_id("cancel"))?;
        self.session
            .assert_page(Predicate::UrlContains("/inventory.html".to_string()))
    }

    /// Place the order.
    pub fn finish(&mut self) -> ComprarResult<()> {
        self.session.click(ElementQuery::test_id("finish"))?;
        self.session
            .assert_page(Predicate::UrlContains("/checkout-complete.html".to_string()))
    }
}
