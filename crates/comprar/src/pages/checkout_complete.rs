//! Checkout confirmation page.

use crate::command::Predicate;
use crate::locator::ElementQuery;
use crate::result::ComprarResult;
use crate::session::Session;

/// The order confirmation page.
#[derive(Debug)]
pub struct CheckoutCompletePage<'a> {
    session: &'a mut Session,
}

impl<'a> CheckoutCompletePage<'a> {
    /// Wrap a session expected to be on the confirmation page.
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Wait for the page title.
    pub fn verify_loaded(&mut self) -> ComprarResult<()> {
        self.session.assert(
            ElementQuery::css(".title"),
            Predicate::TextEquals("Checkout: Complete!".to_string()),
        )
    }

    /// The confirmation headline.
    pub fn completion_header(&mut self) -> ComprarResult<String> {
        self.session.read_text(ElementQuery::css(".complete-header"))
    }

    /// The confirmation body text.
    pub fn completion_text(&mut self) -> ComprarResult<String> {
        self.session.read_text(ElementQuery::css(".complete-text"))
    }

    /// The order really went through: headline and dispatch notice.
    pub fn verify_completion_message(&mut self) -> ComprarResult<()> {
        self.session.assert(
            ElementQuery::css(".complete-header"),
            Predicate::TextEquals("Thank you for your order!".to_string()),
        )?;
        self.session.assert(
            ElementQuery::css(".complete-text"),
            Predicate::TextContains("Your order has been dispatched".to_string()),
        )
    }

    /// Placing the order emptied the cart, so the badge is gone.
    pub fn verify_cart_empty(&mut self) -> ComprarResult<()> {
        self.session
            .assert(ElementQuery::css(".shopping_cart_badge"), Predicate::Absent)
    }

    /// Back to the inventory.
    pub fn back_home(&mut self) -> ComprarResult<()> {
        self.session.click(ElementQuery::test_id("back-to-products"))?;
        self.session
            .assert_page(Predicate::UrlContains("/inventory.html".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Customer, HarnessConfig};
    use crate::mock::FakeStorefront;
    use crate::pages::{CartPage, CheckoutInfoPage, CheckoutOverviewPage, InventoryPage, LoginPage};

    fn complete_session() -> Session {
        let mut config = HarnessConfig::default();
        config.timeouts.default_ms = 200;
        config.timeouts.page_load_ms = 200;
        config.timeouts.poll_interval_ms = 5;
        let mut s = Session::new(Box::new(FakeStorefront::new()), config);
        LoginPage::new(&mut s).login_as_standard().unwrap();
        let mut inventory = InventoryPage::new(&mut s);
        inventory.add_to_cart("Sauce Labs Backpack").unwrap();
        inventory.open_cart().unwrap();
        CartPage::new(&mut s).checkout().unwrap();
        let mut info = CheckoutInfoPage::new(&mut s);
        info.fill(&Customer::default()).unwrap();
        info.submit().unwrap();
        CheckoutOverviewPage::new(&mut s).finish().unwrap();
        s
    }

    #[test]
    fn test_confirmation_page_renders_the_thank_you() {
        let mut s = complete_session();
        let mut page = CheckoutCompletePage::new(&mut s);
        page.verify_loaded().unwrap();
        page.verify_completion_message().unwrap();
        assert_eq!(page.completion_header().unwrap(), "Thank you for your order!");
        assert!(page.completion_text().unwrap().contains("pony"));
    }

    #[test]
    fn test_cart_is_empty_after_the_order() {
        let mut s = complete_session();
        CheckoutCompletePage::new(&mut s).verify_cart_empty().unwrap();
    }

    #[test]
    fn test_back_home_lands_on_inventory() {
        let mut s = complete_session();
        CheckoutCompletePage::new(&mut s).back_home().unwrap();
    }
}
