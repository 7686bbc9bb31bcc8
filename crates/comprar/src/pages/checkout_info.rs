//! Checkout step one: the customer information form.

use crate::command::Predicate;
use crate::config::Customer;
use crate::locator::ElementQuery;
use crate::result::ComprarResult;
use crate::session::Session;

/// The customer information form (checkout step one).
#[derive(Debug)]
pub struct CheckoutInfoPage<'a> {
    session: &'a mut Session,
}

impl<'a> CheckoutInfoPage<'a> {
    /// Wrap a session expected to be on the information form.
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    fn error_banner() -> ElementQuery {
        ElementQuery::test_id("error")
    }

    /// Wait for the page title.
    pub fn verify_loaded(&mut self) -> ComprarResult<()> {
        self.session.assert(
            ElementQuery::css(".title"),
            Predicate::TextEquals("Checkout: Your Information".to_string()),
        )
    }

    /// Type the first name.
    pub fn enter_first_name(&mut self, value: &str) -> ComprarResult<()> {
        self.session.type_text(ElementQuery::test_id("firstName"), value)
    }

    /// Type the last name.
    pub fn enter_last_name(&mut self, value: &str) -> ComprarResult<()> {
        self.session.type_text(ElementQuery::test_id("lastName"), value)
    }

    /// Type the postal code.
    pub fn enter_postal_code(&mut self, value: &str) -> ComprarResult<()> {
        self.session.type_text(ElementQuery::test_id("postalCode"), value)
    }

    /// Fill all three fields from customer data. Empty fields are typed
    /// as-is, which clears whatever was there.
    pub fn fill(&mut self, customer: &Customer) -> ComprarResult<()> {
        self.enter_first_name(&customer.first_name)?;
        self.enter_last_name(&customer.last_name)?;
        self.enter_postal_code(&customer.postal_code)
    }

    /// Click continue. The application decides whether the form passes.
    pub fn submit(&mut self) -> ComprarResult<()> {
        self.session.click(ElementQuery::test_id("continue"))
    }

    /// Abandon checkout; this step's cancel returns to the cart.
    pub fn cancel(&mut self) -> ComprarResult<()> {
        self.session.click(ElementQuery::test_id("cancel"))?;
        self.session
            .assert_page(Predicate::UrlContains("/cart.html".to_string()))
    }

    /// The current validation banner text.
    pub fn error_message(&mut self) -> ComprarResult<String> {
        self.session.read_text(Self::error_banner())
    }

    /// Wait for the validation banner to contain `text`.
    pub fn verify_error_contains(&mut self, text: &str) -> ComprarResult<()> {
        self.session
            .assert(Self::error_banner(), Predicate::TextContains(text.to_string()))
    }

    /// Dismiss the validation banner.
    pub fn close_error(&mut self) -> ComprarResult<()> {
        self.session.click(ElementQuery::test_id("error-button"))?;
        self.session.assert(Self::error_banner(), Predicate::Absent)
    }
}
