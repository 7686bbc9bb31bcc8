//! Inventory page: product listing, sorting, and cart management.

use crate::command::Predicate;
use crate::locator::ElementQuery;
use crate::pages::{parse_amount, parse_count};
use crate::result::{ComprarError, ComprarResult};
use crate::session::Session;
use std::fmt;

/// The sort dropdown's options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOption {
    /// Name A to Z
    NameAscending,
    /// Name Z to A
    NameDescending,
    /// Price low to high
    PriceLowToHigh,
    /// Price high to low
    PriceHighToLow,
}

impl SortOption {
    /// The `<option>` value the dropdown uses
    #[must_use]
    pub const fn as_value(&self) -> &'static str {
        match self {
            Self::NameAscending => "az",
            Self::NameDescending => "za",
            Self::PriceLowToHigh => "lohi",
            Self::PriceHighToLow => "hilo",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_value())
    }
}

/// The product listing page.
#[derive(Debug)]
pub struct InventoryPage<'a> {
    session: &'a mut Session,
}

impl<'a> InventoryPage<'a> {
    const PATH: &'static str = "/inventory.html";

    /// Wrap a session expected to be on (or heading to) the inventory.
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    fn item_row() -> &'static str {
        ".inventory_item"
    }

    fn name_cell() -> &'static str {
        ".inventory_item_name"
    }

    fn row_target(name: &str, target: ElementQuery) -> ElementQuery {
        ElementQuery::row(Self::item_row(), Self::name_cell(), name, target)
    }

    /// Navigate directly to the inventory page.
    pub fn navigate(&mut self) -> ComprarResult<()> {
        self.session.visit(Self::PATH)
    }

    /// Wait for the page title.
    pub fn verify_loaded(&mut self) -> ComprarResult<()> {
        self.session.assert(
            ElementQuery::css(".title"),
            Predicate::TextEquals("Products".to_string()),
        )
    }

    /// Product names in render order.
    pub fn product_names(&mut self) -> ComprarResult<Vec<String>> {
        self.session.read_texts(ElementQuery::css(Self::name_cell()))
    }

    /// Number of product cards rendered.
    pub fn product_count(&mut self) -> ComprarResult<usize> {
        self.session.read_count(ElementQuery::css(Self::item_row()))
    }

    /// Unit price of a product, parsed from its price cell.
    pub fn price_of(&mut self, name: &str) -> ComprarResult<f64> {
        let text = self
            .session
            .read_text(Self::row_target(name, ElementQuery::css(".inventory_item_price")))?;
        parse_amount("price", &text)
    }

    /// Description text of a product.
    pub fn description_of(&mut self, name: &str) -> ComprarResult<String> {
        self.session
            .read_text(Self::row_target(name, ElementQuery::css(".inventory_item_desc")))
    }

    /// Add a product to the cart by name.
    pub fn add_to_cart(&mut self, name: &str) -> ComprarResult<()> {
        self.session
            .click(Self::row_target(name, ElementQuery::test_id_prefix("add-to-cart")))
    }

    /// Add several products to the cart, in order.
    pub fn add_all(&mut self, names: &[&str]) -> ComprarResult<()> {
        for name in names {
            self.add_to_cart(name)?;
        }
        Ok(())
    }

    /// Remove a product from the cart by name.
    pub fn remove_from_cart(&mut self, name: &str) -> ComprarResult<()> {
        self.session
            .click(Self::row_target(name, ElementQuery::test_id_prefix("remove")))
    }

    /// A product's button reads "Remove" once it is in the cart.
    pub fn verify_in_cart(&mut self, name: &str) -> ComprarResult<()> {
        self.session.assert(
            Self::row_target(name, ElementQuery::test_id_prefix("remove")),
            Predicate::Exists,
        )
    }

    /// Choose a sort order in the dropdown.
    pub fn sort_by(&mut self, option: SortOption) -> ComprarResult<()> {
        self.session.type_text(
            ElementQuery::test_id("product-sort-container"),
            option.as_value(),
        )
    }

    /// Re-read the listing and check it is ordered per `option`.
    pub fn verify_sorted(&mut self, option: SortOption) -> ComprarResult<()> {
        match option {
            SortOption::NameAscending | SortOption::NameDescending => {
                let names = self.product_names()?;
                let mut expected = names.clone();
                expected.sort();
                if option == SortOption::NameDescending {
                    expected.reverse();
                }
                if names == expected {
                    Ok(())
                } else {
                    Err(ComprarError::Assertion {
                        message: format!("listing not sorted {option}: {names:?}"),
                    })
                }
            }
            SortOption::PriceLowToHigh | SortOption::PriceHighToLow => {
                let texts = self
                    .session
                    .read_texts(ElementQuery::css(".inventory_item_price"))?;
                let prices = texts
                    .iter()
                    .map(|t| parse_amount("price", t))
                    .collect::<ComprarResult<Vec<f64>>>()?;
                let ordered = prices.windows(2).all(|w| {
                    if option == SortOption::PriceLowToHigh {
                        w[0] <= w[1]
                    } else {
                        w[0] >= w[1]
                    }
                });
                if ordered {
                    Ok(())
                } else {
                    Err(ComprarError::Assertion {
                        message: format!("listing not sorted {option}: {prices:?}"),
                    })
                }
            }
        }
    }

    /// Current badge count; an absent badge is zero.
    pub fn cart_badge_count(&mut self) -> ComprarResult<u32> {
        let badge = ElementQuery::css(".shopping_cart_badge");
        if self.session.read_count(badge.clone())? == 0 {
            return Ok(0);
        }
        let text = self.session.read_text(badge)?;
        parse_count("badge", &text)
    }

    /// Wait for the badge to show `count`; zero means no badge at all.
    pub fn verify_badge(&mut self, count: u32) -> ComprarResult<()> {
        let badge = ElementQuery::css(".shopping_cart_badge");
        if count == 0 {
            self.session.assert(badge, Predicate::Absent)
        } else {
            self.session
                .assert(badge, Predicate::TextEquals(count.to_string()))
        }
    }

    /// Click through to the cart page.
    pub fn open_cart(&mut self) -> ComprarResult<()> {
        self.session.click(ElementQuery::css(".shopping_cart_link"))?;
        self.session
            .assert_page(Predicate::UrlContains("/cart.html".to_string()))
    }

    /// Open the burger menu.
    pub fn open_menu(&mut self) -> ComprarResult<()> {
        self.session.click(ElementQuery::css("#react-burger-menu-btn"))?;
        self.session
            .assert(ElementQuery::css("#logout_sidebar_link"), Predicate::Visible)
    }

    /// Close the burger menu.
    pub fn close_menu(&mut self) -> ComprarResult<()> {
        self.session.click(ElementQuery::css("#react-burger-cross-btn"))
    }

    /// Log out via the burger menu.
    pub fn logout(&mut self) -> ComprarResult<()> {
        self.open_menu()?;
        self.session.click(ElementQuery::css("#logout_sidebar_link"))
    }

    /// Empty the cart via the burger menu's reset entry.
    pub fn reset_app_state(&mut self) -> ComprarResult<()> {
        self.open_menu()?;
        self.session.click(ElementQuery::css("#reset_sidebar_link"))?;
        self.close_menu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::mock::FakeStorefront;
    use crate::pages::LoginPage;

    fn inventory_session() -> Session {
        let mut config = HarnessConfig::default();
        config.timeouts.default_ms = 200;
        config.timeouts.page_load_ms = 200;
        config.timeouts.poll_interval_ms = 5;
        let mut s = Session::new(Box::new(FakeStorefront::new()), config);
        LoginPage::new(&mut s).login_as_standard().unwrap();
        s
    }

    #[test]
    fn test_listing_shows_the_whole_catalog() {
        let mut s = inventory_session();
        let mut page = InventoryPage::new(&mut s);
        page.verify_loaded().unwrap();
        assert_eq!(page.product_count().unwrap(), 6);
        let names = page.product_names().unwrap();
        assert!(names.iter().any(|n| n == "Sauce Labs Backpack"));
    }

    #[test]
    fn test_add_and_remove_update_badge() {
        let mut s = inventory_session();
        let mut page = InventoryPage::new(&mut s);
        page.verify_badge(0).unwrap();
        page.add_all(&["Sauce Labs Backpack", "Sauce Labs Onesie"]).unwrap();
        page.verify_badge(2).unwrap();
        page.verify_in_cart("Sauce Labs Backpack").unwrap();
        page.remove_from_cart("Sauce Labs Backpack").unwrap();
        page.verify_badge(1).unwrap();
        assert_eq!(page.cart_badge_count().unwrap(), 1);
    }

    #[test]
    fn test_price_and_description_by_name() {
        let mut s = inventory_session();
        let mut page = InventoryPage::new(&mut s);
        let price = page.price_of("Sauce Labs Fleece Jacket").unwrap();
        assert!((price - 49.99).abs() < 1e-9);
        let desc = page.description_of("Sauce Labs Onesie").unwrap();
        assert!(desc.contains("onesie"));
    }

    #[test]
    fn test_every_sort_order_verifies() {
        let mut s = inventory_session();
        let mut page = InventoryPage::new(&mut s);
        for option in [
            SortOption::NameAscending,
            SortOption::NameDescending,
            SortOption::PriceLowToHigh,
            SortOption::PriceHighToLow,
        ] {
            page.sort_by(option).unwrap();
            page.verify_sorted(option).unwrap();
        }
    }

    #[test]
    fn test_reset_app_state_clears_badge() {
        let mut s = inventory_session();
        let mut page = InventoryPage::new(&mut s);
        page.add_to_cart("Sauce Labs Bike Light").unwrap();
        page.verify_badge(1).unwrap();
        page.reset_app_state().unwrap();
        page.verify_badge(0).unwrap();
    }

    #[test]
    fn test_logout_returns_to_login() {
        let mut s = inventory_session();
        InventoryPage::new(&mut s).logout().unwrap();
        let url = s.read_url().unwrap();
        assert!(url.ends_with('/'));
    }
}
