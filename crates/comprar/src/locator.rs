//! Element queries: re-resolvable descriptions of how to find elements.
//!
//! An [`ElementQuery`] never caches a live handle. The page under test
//! re-renders asynchronously after every action, so resolving the same
//! query twice may yield different concrete elements; callers re-resolve
//! by query each time instead of holding elements across waits.
//!
//! No retry logic lives here. Retries belong to the command queue engine;
//! an empty result set is a legitimate value that downstream assertions
//! may interpret as "not present".

use std::fmt;

/// A re-resolvable description of how to find zero or more elements.
///
/// The dialect is deliberately restricted: class/id/attribute predicates
/// plus a row-scoping form that locates a row by a sibling cell's text
/// (e.g. "the row whose name cell contains 'Backpack', then its action
/// button").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementQuery {
    /// Raw CSS selector (`.class`, `#id`, or `[data-test=...]` forms)
    Css(String),
    /// Exact `data-test` attribute match
    TestId(String),
    /// `data-test` attribute prefix match (`[data-test^="add-to-cart"]`)
    TestIdPrefix(String),
    /// Base query filtered to elements whose text contains a substring
    WithText {
        /// The query to filter
        base: Box<ElementQuery>,
        /// Substring the element text must contain
        text: String,
    },
    /// Row-scoped query: find rows matching `row` that contain a `probe`
    /// element whose text contains `text`, then select `target` within
    /// those rows.
    RowByText {
        /// CSS selector for the row container (e.g. `.inventory_item`)
        row: String,
        /// CSS selector for the probe cell (e.g. `.inventory_item_name`)
        probe: String,
        /// Substring the probe cell's text must contain
        text: String,
        /// Query for the target element within the matched row
        target: Box<ElementQuery>,
    },
}

impl ElementQuery {
    /// Create a CSS selector query
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an exact `data-test` attribute query
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a `data-test` attribute prefix query
    #[must_use]
    pub fn test_id_prefix(prefix: impl Into<String>) -> Self {
        Self::TestIdPrefix(prefix.into())
    }

    /// Filter this query to elements whose text contains `text`
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        Self::WithText {
            base: Box::new(self),
            text: text.into(),
        }
    }

    /// Row-scoped query: the row matching `row` whose `probe` cell
    /// contains `text`, then `target` within that row.
    #[must_use]
    pub fn row(
        row: impl Into<String>,
        probe: impl Into<String>,
        text: impl Into<String>,
        target: ElementQuery,
    ) -> Self {
        Self::RowByText {
            row: row.into(),
            probe: probe.into(),
            text: text.into(),
            target: Box::new(target),
        }
    }

    /// Render the query as a CSS-flavoured selector string for messages
    #[must_use]
    pub fn to_selector(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "{s}"),
            Self::TestId(id) => write!(f, "[data-test=\"{id}\"]"),
            Self::TestIdPrefix(p) => write!(f, "[data-test^=\"{p}\"]"),
            Self::WithText { base, text } => write!(f, "{base}:contains(\"{text}\")"),
            Self::RowByText {
                row,
                probe,
                text,
                target,
            } => write!(f, "{row}:has({probe}:contains(\"{text}\")) {target}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod builder_tests {
        use super::*;

        #[test]
        fn test_css_query() {
            let q = ElementQuery::css(".title");
            assert!(matches!(q, ElementQuery::Css(_)));
        }

        #[test]
        fn test_test_id_query() {
            let q = ElementQuery::test_id("login-button");
            assert_eq!(q.to_selector(), "[data-test=\"login-button\"]");
        }

        #[test]
        fn test_test_id_prefix_query() {
            let q = ElementQuery::test_id_prefix("add-to-cart");
            assert_eq!(q.to_selector(), "[data-test^=\"add-to-cart\"]");
        }

        #[test]
        fn test_with_text_wraps_base() {
            let q = ElementQuery::css(".inventory_item_name").with_text("Backpack");
            assert!(matches!(q, ElementQuery::WithText { .. }));
            assert!(q.to_selector().contains("Backpack"));
        }

        #[test]
        fn test_row_query_display() {
            let q = ElementQuery::row(
                ".inventory_item",
                ".inventory_item_name",
                "Sauce Labs Backpack",
                ElementQuery::test_id_prefix("remove"),
            );
            let sel = q.to_selector();
            assert!(sel.contains(".inventory_item:has("));
            assert!(sel.contains("Sauce Labs Backpack"));
            assert!(sel.contains("[data-test^=\"remove\"]"));
        }
    }

    mod reuse_tests {
        use super::*;

        #[test]
        fn test_query_is_cloneable_for_re_resolution() {
            // Queries are descriptions, not handles. The engine clones and
            // re-resolves on every poll.
            let q = ElementQuery::test_id("checkout");
            let again = q.clone();
            assert_eq!(q, again);
        }
    }
}
