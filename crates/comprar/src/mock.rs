//! In-memory storefront double.
//!
//! [`FakeStorefront`] implements [`PageDriver`] over a deterministic model
//! of the five-page demo flow: login, inventory, cart, two checkout steps,
//! and the confirmation page. It renders a flat node list per page and
//! mutates its state on clicks and typing, which lets every scenario in
//! this crate run without a browser.
//!
//! The model mirrors the demo application's observable behavior: login
//! errors with the "Epic sadface:" prefix, `data-test` attributes on
//! interactive elements, a cart badge that only exists while the cart is
//! non-empty, and checkout form validation in first/last/postal order.

use crate::driver::{ElementState, PageDriver};
use crate::locator::ElementQuery;
use crate::result::{ComprarError, ComprarResult};

const PASSWORD: &str = "secret_sauce";
const LOCKED_OUT_USER: &str = "locked_out_user";
const ACCEPTED_USERS: [&str; 6] = [
    "standard_user",
    "locked_out_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];

/// Catalog as (name, description, price).
const PRODUCTS: [(&str, &str, f64); 6] = [
    (
        "Sauce Labs Backpack",
        "carry.allTheThings() with the sleek, streamlined Sly Pack",
        29.99,
    ),
    (
        "Sauce Labs Bike Light",
        "A red light isn't the desired state in testing",
        9.99,
    ),
    (
        "Sauce Labs Bolt T-Shirt",
        "Get your testing superhero on with the Sauce Labs bolt T-shirt",
        15.99,
    ),
    (
        "Sauce Labs Fleece Jacket",
        "It's not every day that you come across a midweight quarter-zip fleece jacket",
        49.99,
    ),
    (
        "Sauce Labs Onesie",
        "Rib snap infant onesie for the junior automation engineer in development",
        7.99,
    ),
    (
        "Test.allTheThings() T-Shirt (Red)",
        "This classic Sauce Labs t-shirt is perfect to wear when cozying up",
        15.99,
    ),
];

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// One rendered element in the flat page model.
#[derive(Debug, Clone, Default)]
struct Node {
    classes: Vec<String>,
    id: Option<String>,
    data_test: Option<String>,
    text: String,
    value: String,
    visible: bool,
    /// Item row this node belongs to, for row-scoped queries
    row: Option<usize>,
}

impl Node {
    fn css(class: &str, text: impl Into<String>) -> Self {
        Self {
            classes: vec![class.to_string()],
            text: text.into(),
            visible: true,
            ..Self::default()
        }
    }

    fn test(data_test: &str, text: impl Into<String>) -> Self {
        Self {
            data_test: Some(data_test.to_string()),
            text: text.into(),
            visible: true,
            ..Self::default()
        }
    }

    fn input(data_test: &str, value: impl Into<String>) -> Self {
        Self {
            data_test: Some(data_test.to_string()),
            value: value.into(),
            visible: true,
            ..Self::default()
        }
    }

    fn with_id(id: &str, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.to_string()),
            text: text.into(),
            visible: true,
            ..Self::default()
        }
    }

    fn in_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

/// Deterministic in-memory model of the storefront.
#[derive(Debug, Clone)]
pub struct FakeStorefront {
    base_url: String,
    url: String,
    logged_in: bool,
    login_error: Option<String>,
    username_input: String,
    password_input: String,
    sort_code: String,
    cart: Vec<String>,
    first_name: String,
    last_name: String,
    postal_code: String,
    checkout_error: Option<String>,
    menu_open: bool,
    tax_rate: f64,
    subtotal_override: Option<f64>,
}

impl Default for FakeStorefront {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeStorefront {
    /// A fresh storefront at the login page.
    #[must_use]
    pub fn new() -> Self {
        let base_url = "https://www.saucedemo.com".to_string();
        let url = format!("{base_url}/");
        Self {
            base_url,
            url,
            logged_in: false,
            login_error: None,
            username_input: String::new(),
            password_input: String::new(),
            sort_code: "az".to_string(),
            cart: Vec::new(),
            first_name: String::new(),
            last_name: String::new(),
            postal_code: String::new(),
            checkout_error: None,
            menu_open: false,
            tax_rate: 0.08,
            subtotal_override: None,
        }
    }

    /// Force the rendered subtotal to a fixed value, for exercising
    /// price-reconciliation failures.
    pub fn override_displayed_subtotal(&mut self, subtotal: f64) {
        self.subtotal_override = Some(subtotal);
    }

    /// Product names currently in the cart, in add order
    #[must_use]
    pub fn cart_contents(&self) -> &[String] {
        &self.cart
    }

    fn path(&self) -> String {
        self.url
            .strip_prefix(&self.base_url)
            .unwrap_or(&self.url)
            .to_string()
    }

    fn goto(&mut self, path: &str) {
        self.url = format!("{}{path}", self.base_url);
        self.menu_open = false;
    }

    fn products_sorted(&self) -> Vec<(&'static str, &'static str, f64)> {
        let mut products = PRODUCTS.to_vec();
        match self.sort_code.as_str() {
            "za" => products.sort_by(|a, b| b.0.cmp(a.0)),
            "lohi" => products.sort_by(|a, b| a.2.total_cmp(&b.2)),
            "hilo" => products.sort_by(|a, b| b.2.total_cmp(&a.2)),
            _ => products.sort_by(|a, b| a.0.cmp(b.0)),
        }
        products
    }

    fn price_of(name: &str) -> f64 {
        PRODUCTS
            .iter()
            .find(|(n, _, _)| *n == name)
            .map_or(0.0, |(_, _, p)| *p)
    }

    fn displayed_subtotal(&self) -> f64 {
        self.subtotal_override.unwrap_or_else(|| {
            round_cents(self.cart.iter().map(|name| Self::price_of(name)).sum())
        })
    }

    fn header_nodes(&self, nodes: &mut Vec<Node>) {
        nodes.push(Node::css("shopping_cart_link", ""));
        if !self.cart.is_empty() {
            nodes.push(Node::css("shopping_cart_badge", self.cart.len().to_string()));
        }
        nodes.push(Node::with_id("react-burger-menu-btn", "Open Menu"));
        if self.menu_open {
            nodes.push(Node::with_id("react-burger-cross-btn", "Close Menu"));
            nodes.push(Node::with_id("inventory_sidebar_link", "All Items"));
            nodes.push(Node::with_id("about_sidebar_link", "About"));
            nodes.push(Node::with_id("logout_sidebar_link", "Logout"));
            nodes.push(Node::with_id("reset_sidebar_link", "Reset App State"));
        }
    }

    fn cart_row_nodes(&self, nodes: &mut Vec<Node>, with_remove: bool) {
        for (i, name) in self.cart.iter().enumerate() {
            nodes.push(Node::css("cart_item", "").in_row(i));
            nodes.push(Node::css("cart_quantity", "1").in_row(i));
            nodes.push(Node::css("inventory_item_name", name.clone()).in_row(i));
            nodes.push(Node::css("inventory_item_price", money(Self::price_of(name))).in_row(i));
            if with_remove {
                nodes.push(Node::test(&format!("remove-{}", slug(name)), "Remove").in_row(i));
            }
        }
    }

    fn login_nodes(&self) -> Vec<Node> {
        let mut nodes = vec![
            Node::css("login_logo", "Swag Labs"),
            Node::input("username", self.username_input.clone()),
            Node::input("password", self.password_input.clone()),
            Node::test("login-button", "Login"),
            Node::test(
                "login-credentials",
                ACCEPTED_USERS.join("\n"),
            ),
            Node::test("login-password", PASSWORD),
        ];
        if let Some(error) = &self.login_error {
            nodes.push(Node::test("error", error.clone()));
            nodes.push(Node::test("error-button", ""));
        }
        nodes
    }

    fn inventory_nodes(&self) -> Vec<Node> {
        let mut nodes = vec![Node::css("title", "Products")];
        nodes.push(Node {
            data_test: Some("product-sort-container".to_string()),
            value: self.sort_code.clone(),
            visible: true,
            ..Node::default()
        });
        for (i, (name, desc, price)) in self.products_sorted().into_iter().enumerate() {
            nodes.push(Node::css("inventory_item", "").in_row(i));
            nodes.push(Node::css("inventory_item_name", name).in_row(i));
            nodes.push(Node::css("inventory_item_desc", desc).in_row(i));
            nodes.push(Node::css("inventory_item_price", money(price)).in_row(i));
            let button = if self.cart.iter().any(|c| c == name) {
                Node::test(&format!("remove-{}", slug(name)), "Remove")
            } else {
                Node::test(&format!("add-to-cart-{}", slug(name)), "Add to cart")
            };
            nodes.push(button.in_row(i));
        }
        self.header_nodes(&mut nodes);
        nodes
    }

    fn cart_nodes(&self) -> Vec<Node> {
        let mut nodes = vec![Node::css("title", "Your Cart")];
        self.cart_row_nodes(&mut nodes, true);
        nodes.push(Node::test("continue-shopping", "Continue Shopping"));
        nodes.push(Node::test("checkout", "Checkout"));
        self.header_nodes(&mut nodes);
        nodes
    }

    fn step_one_nodes(&self) -> Vec<Node> {
        let mut nodes = vec![
            Node::css("title", "Checkout: Your Information"),
            Node::input("firstName", self.first_name.clone()),
            Node::input("lastName", self.last_name.clone()),
            Node::input("postalCode", self.postal_code.clone()),
            Node::test("cancel", "Cancel"),
            Node::test("continue", "Continue"),
        ];
        if let Some(error) = &self.checkout_error {
            nodes.push(Node::test("error", error.clone()));
            nodes.push(Node::test("error-button", ""));
        }
        self.header_nodes(&mut nodes);
        nodes
    }

    fn step_two_nodes(&self) -> Vec<Node> {
        let mut nodes = vec![Node::css("title", "Checkout: Overview")];
        self.cart_row_nodes(&mut nodes, false);
        let subtotal = self.displayed_subtotal();
        let tax = round_cents(subtotal * self.tax_rate);
        nodes.push(Node::test("payment-info-value", "SauceCard #31337"));
        nodes.push(Node::test("shipping-info-value", "Free Pony Express Delivery!"));
        nodes.push(Node::css(
            "summary_subtotal_label",
            format!("Item total: {}", money(subtotal)),
        ));
        nodes.push(Node::css("summary_tax_label", format!("Tax: {}", money(tax))));
        nodes.push(Node::css(
            "summary_total_label",
            format!("Total: {}", money(round_cents(subtotal + tax))),
        ));
        nodes.push(Node::test("cancel", "Cancel"));
        nodes.push(Node::test("finish", "Finish"));
        self.header_nodes(&mut nodes);
        nodes
    }

    fn complete_nodes(&self) -> Vec<Node> {
        let mut nodes = vec![
            Node::css("title", "Checkout: Complete!"),
            Node::css("complete-header", "Thank you for your order!"),
            Node::css(
                "complete-text",
                "Your order has been dispatched, and will arrive just as fast as the pony can get there!",
            ),
            Node::test("back-to-products", "Back Home"),
        ];
        self.header_nodes(&mut nodes);
        nodes
    }

    fn dom(&self) -> Vec<Node> {
        match self.path().as_str() {
            "/inventory.html" => self.inventory_nodes(),
            "/cart.html" => self.cart_nodes(),
            "/checkout-step-one.html" => self.step_one_nodes(),
            "/checkout-step-two.html" => self.step_two_nodes(),
            "/checkout-complete.html" => self.complete_nodes(),
            _ => self.login_nodes(),
        }
    }

    fn css_match(node: &Node, selector: &str) -> bool {
        if let Some(class) = selector.strip_prefix('.') {
            node.classes.iter().any(|c| c == class)
        } else if let Some(id) = selector.strip_prefix('#') {
            node.id.as_deref() == Some(id)
        } else if let Some(rest) = selector.strip_prefix("[data-test^=\"") {
            rest.strip_suffix("\"]")
                .is_some_and(|p| node.data_test.as_deref().is_some_and(|d| d.starts_with(p)))
        } else if let Some(rest) = selector.strip_prefix("[data-test=\"") {
            rest.strip_suffix("\"]")
                .is_some_and(|id| node.data_test.as_deref() == Some(id))
        } else {
            false
        }
    }

    fn node_matches(node: &Node, query: &ElementQuery) -> bool {
        match query {
            ElementQuery::Css(selector) => Self::css_match(node, selector),
            ElementQuery::TestId(id) => node.data_test.as_deref() == Some(id.as_str()),
            ElementQuery::TestIdPrefix(prefix) => node
                .data_test
                .as_deref()
                .is_some_and(|d| d.starts_with(prefix.as_str())),
            ElementQuery::WithText { base, text } => {
                Self::node_matches(node, base) && node.text.contains(text.as_str())
            }
            // Row queries do not nest.
            ElementQuery::RowByText { .. } => false,
        }
    }

    fn resolve_nodes(&self, query: &ElementQuery) -> Vec<Node> {
        let nodes = self.dom();
        if let ElementQuery::RowByText {
            row,
            probe,
            text,
            target,
        } = query
        {
            let matched_rows: Vec<usize> = nodes
                .iter()
                .filter(|n| Self::css_match(n, row))
                .filter_map(|n| n.row)
                .filter(|idx| {
                    nodes.iter().any(|n| {
                        n.row == Some(*idx)
                            && Self::css_match(n, probe)
                            && n.text.contains(text.as_str())
                    })
                })
                .collect();
            nodes
                .into_iter()
                .filter(|n| {
                    n.row.is_some_and(|idx| matched_rows.contains(&idx))
                        && Self::node_matches(n, target)
                })
                .collect()
        } else {
            nodes
                .into_iter()
                .filter(|n| Self::node_matches(n, query))
                .collect()
        }
    }

    fn attempt_login(&mut self) {
        let username = self.username_input.clone();
        if username.is_empty() {
            self.login_error = Some("Epic sadface: Username is required".to_string());
        } else if self.password_input.is_empty() {
            self.login_error = Some("Epic sadface: Password is required".to_string());
        } else if username == LOCKED_OUT_USER {
            self.login_error =
                Some("Epic sadface: Sorry, this user has been locked out.".to_string());
        } else if self.password_input != PASSWORD || !ACCEPTED_USERS.contains(&username.as_str()) {
            self.login_error = Some(
                "Epic sadface: Username and password do not match any user in this service"
                    .to_string(),
            );
        } else {
            self.login_error = None;
            self.logged_in = true;
            self.goto("/inventory.html");
        }
    }

    fn submit_customer_info(&mut self) {
        if self.first_name.trim().is_empty() {
            self.checkout_error = Some("Error: First Name is required".to_string());
        } else if self.last_name.trim().is_empty() {
            self.checkout_error = Some("Error: Last Name is required".to_string());
        } else if self.postal_code.trim().is_empty() {
            self.checkout_error = Some("Error: Postal Code is required".to_string());
        } else {
            self.checkout_error = None;
            self.goto("/checkout-step-two.html");
        }
    }

    fn dispatch_click(&mut self, node: &Node) {
        if let Some(data_test) = node.data_test.clone() {
            match data_test.as_str() {
                "login-button" => self.attempt_login(),
                "error-button" => {
                    self.login_error = None;
                    self.checkout_error = None;
                }
                "continue-shopping" => self.goto("/inventory.html"),
                "checkout" => self.goto("/checkout-step-one.html"),
                "continue" => self.submit_customer_info(),
                "cancel" => {
                    if self.path() == "/checkout-step-one.html" {
                        self.goto("/cart.html");
                    } else {
                        self.goto("/inventory.html");
                    }
                }
                "finish" => {
                    self.cart.clear();
                    self.goto("/checkout-complete.html");
                }
                "back-to-products" => self.goto("/inventory.html"),
                other => {
                    if let Some(slugged) = other.strip_prefix("add-to-cart-") {
                        if let Some((name, _, _)) =
                            PRODUCTS.iter().find(|(n, _, _)| slug(n) == slugged)
                        {
                            self.cart.push((*name).to_string());
                        }
                    } else if let Some(slugged) = other.strip_prefix("remove-") {
                        self.cart.retain(|name| slug(name) != slugged);
                    }
                }
            }
            return;
        }
        if let Some(id) = node.id.as_deref() {
            match id {
                "react-burger-menu-btn" => self.menu_open = true,
                "react-burger-cross-btn" => self.menu_open = false,
                "logout_sidebar_link" => {
                    self.logged_in = false;
                    self.username_input.clear();
                    self.password_input.clear();
                    self.goto("/");
                }
                "reset_sidebar_link" => self.cart.clear(),
                "inventory_sidebar_link" => self.goto("/inventory.html"),
                _ => {}
            }
            return;
        }
        if node.classes.iter().any(|c| c == "shopping_cart_link") {
            self.goto("/cart.html");
        }
    }
}

impl PageDriver for FakeStorefront {
    fn resolve(&self, query: &ElementQuery) -> Vec<ElementState> {
        self.resolve_nodes(query)
            .into_iter()
            .map(|n| ElementState {
                text: n.text,
                value: n.value,
                visible: n.visible,
            })
            .collect()
    }

    fn click(&mut self, query: &ElementQuery) -> ComprarResult<()> {
        let Some(node) = self.resolve_nodes(query).into_iter().next() else {
            return Err(ComprarError::ElementNotFound {
                query: query.to_string(),
            });
        };
        self.dispatch_click(&node);
        Ok(())
    }

    fn type_text(&mut self, query: &ElementQuery, text: &str) -> ComprarResult<()> {
        let Some(node) = self.resolve_nodes(query).into_iter().next() else {
            return Err(ComprarError::ElementNotFound {
                query: query.to_string(),
            });
        };
        match node.data_test.as_deref() {
            Some("username") => self.username_input = text.to_string(),
            Some("password") => self.password_input = text.to_string(),
            Some("firstName") => self.first_name = text.to_string(),
            Some("lastName") => self.last_name = text.to_string(),
            Some("postalCode") => self.postal_code = text.to_string(),
            Some("product-sort-container") => self.sort_code = text.to_string(),
            _ => {}
        }
        Ok(())
    }

    fn visit(&mut self, url: &str) -> ComprarResult<()> {
        let path = url
            .strip_prefix(&self.base_url)
            .map(ToString::to_string)
            .unwrap_or_else(|| url.to_string());
        if !self.logged_in && path != "/" && !path.is_empty() {
            // Unauthenticated deep links bounce back to the login page.
            self.goto("/");
            return Ok(());
        }
        self.goto(&path);
        Ok(())
    }

    fn current_url(&self) -> String {
        self.url.clone()
    }

    fn document_ready(&self) -> bool {
        true
    }
}
