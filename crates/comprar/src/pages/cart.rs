//! Cart page: review, edit, and enter checkout.

use crate::checkout::CartLine;
use crate::command::Predicate;
use crate::locator::ElementQuery;
use crate::pages::{parse_amount, parse_count};
use crate::result::ComprarResult;
use crate::session::Session;

/// The cart review page.
#[derive(Debug)]
pub struct CartPage<'a> {
    session: &'a mut Session,
}

impl<'a> CartPage<'a> {
    const PATH: &'static str = "/cart.html";

    /// Wrap a session expected to be on (or heading to) the cart.
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    fn row_target(name: &str, target: ElementQuery) -> ElementQuery {
        ElementQuery::row(".cart_item", ".inventory_item_name", name, target)
    }

    /// Navigate directly to the cart page.
    pub fn navigate(&mut self) -> ComprarResult<()> {
        self.session.visit(Self::PATH)
    }

    /// Wait for the page title.
    pub fn verify_loaded(&mut self) -> ComprarResult<()> {
        self.session.assert(
            ElementQuery::css(".title"),
            Predicate::TextEquals("Your Cart".to_string()),
        )
    }

    /// Names of the items in the cart, in render order.
    pub fn item_names(&mut self) -> ComprarResult<Vec<String>> {
        self.session
            .read_texts(ElementQuery::css(".inventory_item_name"))
    }

    /// Number of cart rows; zero for an empty cart.
    pub fn item_count(&mut self) -> ComprarResult<usize> {
        self.session.read_count(ElementQuery::css(".cart_item"))
    }

    /// Wait for the cart to hold exactly `count` rows.
    pub fn verify_item_count(&mut self, count: usize) -> ComprarResult<()> {
        self.session
            .assert(ElementQuery::css(".cart_item"), Predicate::CountEquals(count))
    }

    /// Quantity cell of a named item.
    pub fn quantity_of(&mut self, name: &str) -> ComprarResult<u32> {
        let text = self
            .session
            .read_text(Self::row_target(name, ElementQuery::css(".cart_quantity")))?;
        parse_count("quantity", &text)
    }

    /// Price cell of a named item.
    pub fn price_of(&mut self, name: &str) -> ComprarResult<f64> {
        let text = self
            .session
            .read_text(Self::row_target(name, ElementQuery::css(".inventory_item_price")))?;
        parse_amount("price", &text)
    }

    /// Remove a named item from the cart.
    pub fn remove(&mut self, name: &str) -> ComprarResult<()> {
        self.session
            .click(Self::row_target(name, ElementQuery::test_id_prefix("remove")))
    }

    /// Back to the inventory.
    pub fn continue_shopping(&mut self) -> ComprarResult<()> {
        self.session.click(ElementQuery::test_id("continue-shopping"))?;
        self.session
            .assert_page(Predicate::UrlContains("/inventory.html".to_string()))
    }

    /// Start the checkout flow.
    pub fn checkout(&mut self) -> ComprarResult<()> {
        self.session.click(ElementQuery::test_id("checkout"))?;
        self.session
            .assert_page(Predicate::UrlContains("/checkout-step-one.html".to_string()))
    }

    /// Snapshot the cart as [`CartLine`]s: one read of every name, then a
    /// quantity and price read per row.
    pub fn cart_lines(&mut self) -> ComprarResult<Vec<CartLine>> {
        let names = self.item_names()?;
        let mut lines = Vec::with_capacity(names.len());
        for name in names {
            let qty = self.quantity_of(&name)?;
            let unit_price = self.price_of(&name)?;
            lines.push(CartLine::new(name, unit_price, qty));
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::mock::FakeStorefront;
    use crate::pages::{InventoryPage, LoginPage};

    fn cart_session() -> Session {
        let mut config = HarnessConfig::default();
        config.timeouts.default_ms = 200;
        config.timeouts.page_load_ms = 200;
        config.timeouts.poll_interval_ms = 5;
        let mut s = Session::new(Box::new(FakeStorefront::new()), config);
        LoginPage::new(&mut s).login_as_standard().unwrap();
        let mut inventory = InventoryPage::new(&mut s);
        inventory.add_to_cart("Sauce Labs Backpack").unwrap();
        inventory.add_to_cart("Sauce Labs Bike Light").unwrap();
        inventory.open_cart().unwrap();
        s
    }

    #[test]
    fn test_cart_lists_added_items() {
        let mut s = cart_session();
        let mut page = CartPage::new(&mut s);
        page.verify_loaded().unwrap();
        page.verify_item_count(2).unwrap();
        assert_eq!(
            page.item_names().unwrap(),
            vec!["Sauce Labs Backpack", "Sauce Labs Bike Light"]
        );
    }

    #[test]
    fn test_quantity_and_price_cells() {
        let mut s = cart_session();
        let mut page = CartPage::new(&mut s);
        assert_eq!(page.quantity_of("Sauce Labs Backpack").unwrap(), 1);
        let price = page.price_of("Sauce Labs Bike Light").unwrap();
        assert!((price - 9.99).abs() < 1e-9);
    }

    #[test]
    fn test_remove_drops_the_row() {
        let mut s = cart_session();
        let mut page = CartPage::new(&mut s);
        page.remove("Sauce Labs Backpack").unwrap();
        page.verify_item_count(1).unwrap();
        assert_eq!(page.item_names().unwrap(), vec!["Sauce Labs Bike Light"]);
    }

    #[test]
    fn test_cart_lines_snapshot_names_prices_quantities() {
        let mut s = cart_session();
        let lines = CartPage::new(&mut s).cart_lines().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "Sauce Labs Backpack");
        assert!((lines[0].unit_price - 29.99).abs() < 1e-9);
        assert_eq!(lines[0].qty, 1);
        let subtotal: f64 = lines.iter().map(CartLine::line_total).sum();
        assert!((subtotal - 39.98).abs() < 1e-9);
    }

    #[test]
    fn test_empty_cart_snapshots_to_no_lines() {
        let mut s = cart_session();
        let mut page = CartPage::new(&mut s);
        page.remove("Sauce Labs Backpack").unwrap();
        page.remove("Sauce Labs Bike Light").unwrap();
        assert!(page.cart_lines().unwrap().is_empty());
        assert_eq!(page.item_count().unwrap(), 0);
    }

    #[test]
    fn test_continue_shopping_returns_to_inventory() {
        let mut s = cart_session();
        CartPage::new(&mut s).continue_shopping().unwrap();
    }

    #[test]
    fn test_checkout_enters_step_one() {
        let mut s = cart_session();
        CartPage::new(&mut s).checkout().unwrap();
    }
}
