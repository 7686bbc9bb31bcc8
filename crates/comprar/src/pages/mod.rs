//! Page abstractions for the storefront flow.
//!
//! One type per page, each a thin wrapper over a borrowed
//! [`crate::session::Session`]. Pages own the query definitions and the
//! page-specific verifications; all waiting and retrying stays in the
//! command engine underneath. Holding the session mutably means a page
//! object can never outlive the navigation state it was created for.

pub mod cart;
pub mod checkout_complete;
pub mod checkout_info;
pub mod checkout_overview;
pub mod inventory;
pub mod login;

pub use cart::CartPage;
pub use checkout_complete::CheckoutCompletePage;
pub use checkout_info::CheckoutInfoPage;
pub use checkout_overview::CheckoutOverviewPage;
pub use inventory::{InventoryPage, SortOption};
pub use login::LoginPage;

use crate::result::{ComprarError, ComprarResult};
use regex::Regex;
use std::sync::OnceLock;

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+\.\d{2}").expect("static pattern"))
}

/// Parse a dollar amount out of rendered text like `"Item total: $29.99"`.
pub(crate) fn parse_amount(label: &str, text: &str) -> ComprarResult<f64> {
    let matched = amount_pattern()
        .find(text)
        .ok_or_else(|| ComprarError::Assertion {
            message: format!("no amount found in {label} text \"{text}\""),
        })?;
    matched
        .as_str()
        .parse::<f64>()
        .map_err(|e| ComprarError::Assertion {
            message: format!("unparseable amount in {label} text \"{text}\": {e}"),
        })
}

/// Parse a small rendered integer, e.g. a badge or quantity cell.
pub(crate) fn parse_count(label: &str, text: &str) -> ComprarResult<u32> {
    text.trim().parse::<u32>().map_err(|e| ComprarError::Assertion {
        message: format!("unparseable count in {label} text \"{text}\": {e}"),
    })
}
