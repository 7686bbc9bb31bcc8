//! Commands: immutable descriptions of queued page operations.
//!
//! A command is created by a page abstraction, enqueued, executed once by
//! the engine, then discarded. The kind decides the execution policy:
//! observations (`Assert`, `Read`) retry until their [`RetryPolicy`]
//! timeout; actions (`Click`, `Type`, `Visit`) execute exactly once. This
//! split tolerates render lag for reads without ever risking a
//! double-fired click.

use crate::driver::ElementState;
use crate::locator::ElementQuery;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout for retried observations (10 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Timeout for the page-load path (30 seconds)
pub const PAGE_LOAD_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Timeout and poll-interval pair governing how long an observation is
/// retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total budget before the observation fails
    pub timeout_ms: u64,
    /// Interval between re-resolutions
    pub poll_interval_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with explicit timeout and poll interval
    #[must_use]
    pub const fn new(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms,
        }
    }

    /// Policy for the page-load path (30 second budget)
    #[must_use]
    pub const fn page_load() -> Self {
        Self {
            timeout_ms: PAGE_LOAD_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Override the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Override the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Poll interval as a [`Duration`]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Assertion predicate evaluated against a freshly resolved element set
/// and the current page state.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// At least one element matches
    Exists,
    /// No element matches ("not present" is a legitimate observation)
    Absent,
    /// At least one matching element is visible
    Visible,
    /// Some matching element's text contains the substring
    TextContains(String),
    /// Some matching element's text equals the string exactly
    TextEquals(String),
    /// The number of matching elements equals the count
    CountEquals(usize),
    /// Some matching input's value equals the string
    ValueEquals(String),
    /// The current URL contains the substring
    UrlContains(String),
    /// The current URL equals the string exactly
    UrlEquals(String),
    /// The document has signalled ready
    DocumentReady,
}

impl Predicate {
    /// Evaluate against resolved elements and page state.
    #[must_use]
    pub fn evaluate(&self, elements: &[ElementState], url: &str, ready: bool) -> bool {
        match self {
            Self::Exists => !elements.is_empty(),
            Self::Absent => elements.is_empty(),
            Self::Visible => elements.iter().any(|e| e.visible),
            Self::TextContains(s) => elements.iter().any(|e| e.text.contains(s)),
            Self::TextEquals(s) => elements.iter().any(|e| e.text == *s),
            Self::CountEquals(n) => elements.len() == *n,
            Self::ValueEquals(s) => elements.iter().any(|e| e.value == *s),
            Self::UrlContains(s) => url.contains(s),
            Self::UrlEquals(s) => url == s,
            Self::DocumentReady => ready,
        }
    }

    /// Human-readable description for timeout messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Exists => "exists".to_string(),
            Self::Absent => "absent".to_string(),
            Self::Visible => "visible".to_string(),
            Self::TextContains(s) => format!("text contains \"{s}\""),
            Self::TextEquals(s) => format!("text equals \"{s}\""),
            Self::CountEquals(n) => format!("count equals {n}"),
            Self::ValueEquals(s) => format!("value equals \"{s}\""),
            Self::UrlContains(s) => format!("url contains \"{s}\""),
            Self::UrlEquals(s) => format!("url equals \"{s}\""),
            Self::DocumentReady => "document ready".to_string(),
        }
    }
}

/// What a `Read` command extracts once its target is observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadTarget {
    /// Text of the first matching element (retries until one matches)
    Text,
    /// Texts of all matching elements, in document order (eager)
    TextAll,
    /// Number of matching elements (eager; zero is a valid answer)
    Count,
    /// Input value of the first matching element (retries until one matches)
    Value,
    /// The current URL (eager; needs no query)
    Url,
}

impl ReadTarget {
    /// Whether this target settles on first evaluation even with zero
    /// matching elements. Eager targets observe legitimately-empty states.
    #[must_use]
    pub const fn is_eager(&self) -> bool {
        matches!(self, Self::TextAll | Self::Count | Self::Url)
    }

    /// Extract the value from resolved elements and page state.
    ///
    /// Returns `None` when a non-eager target has nothing to extract yet.
    #[must_use]
    pub fn extract(&self, elements: &[ElementState], url: &str) -> Option<ReadValue> {
        match self {
            Self::Text => elements.first().map(|e| ReadValue::Text(e.text.clone())),
            Self::TextAll => Some(ReadValue::TextAll(
                elements.iter().map(|e| e.text.clone()).collect(),
            )),
            Self::Count => Some(ReadValue::Count(elements.len())),
            Self::Value => elements.first().map(|e| ReadValue::Value(e.value.clone())),
            Self::Url => Some(ReadValue::Url(url.to_string())),
        }
    }
}

/// Value produced by a settled `Read` command.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadValue {
    /// Text of the first matching element
    Text(String),
    /// Texts of all matching elements
    TextAll(Vec<String>),
    /// Matching element count
    Count(usize),
    /// Input value
    Value(String),
    /// Current URL
    Url(String),
}

impl ReadValue {
    /// The contained single string (text, value, or url), if any
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(s) | Self::Value(s) | Self::Url(s) => Some(s),
            Self::TextAll(_) | Self::Count(_) => None,
        }
    }

    /// The contained text list, if any
    #[must_use]
    pub fn into_texts(self) -> Option<Vec<String>> {
        match self {
            Self::TextAll(v) => Some(v),
            _ => None,
        }
    }

    /// The contained count, if any
    #[must_use]
    pub const fn as_count(&self) -> Option<usize> {
        match self {
            Self::Count(n) => Some(*n),
            _ => None,
        }
    }
}

/// One queued page operation or verification.
///
/// The execution policy is carried by the variant, not by runtime flags:
/// `Assert`/`Read` own a [`RetryPolicy`], actions own none because they
/// never retry.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Navigate to an absolute URL, then wait for document ready.
    ///
    /// Idempotent: navigating to the current URL skips the navigation but
    /// still waits for the ready signal.
    Visit {
        /// Absolute URL
        url: String,
        /// Budget for the document-ready wait
        policy: RetryPolicy,
    },
    /// Clear the target input and type text (choosing the option with
    /// that value when the target is a `<select>`). Non-retrying.
    Type {
        /// Target input
        query: ElementQuery,
        /// Text or option value
        text: String,
    },
    /// Click the target element. Non-retrying.
    Click {
        /// Target element
        query: ElementQuery,
    },
    /// Re-resolve and re-evaluate until the predicate passes or the
    /// policy times out.
    Assert {
        /// Target elements (None for page-level predicates)
        query: Option<ElementQuery>,
        /// Predicate to satisfy
        predicate: Predicate,
        /// Retry budget
        policy: RetryPolicy,
    },
    /// Re-resolve until the target is extractable (or immediately for
    /// eager targets), then produce a [`ReadValue`].
    Read {
        /// Target elements (None for URL reads)
        query: Option<ElementQuery>,
        /// What to extract
        target: ReadTarget,
        /// Retry budget
        policy: RetryPolicy,
    },
}

impl Command {
    /// Navigation command with the page-load policy
    #[must_use]
    pub fn visit(url: impl Into<String>) -> Self {
        Self::Visit {
            url: url.into(),
            policy: RetryPolicy::page_load(),
        }
    }

    /// Click command
    #[must_use]
    pub fn click(query: ElementQuery) -> Self {
        Self::Click { query }
    }

    /// Type command
    #[must_use]
    pub fn type_text(query: ElementQuery, text: impl Into<String>) -> Self {
        Self::Type {
            query,
            text: text.into(),
        }
    }

    /// Element assertion with the default policy
    #[must_use]
    pub fn assert(query: ElementQuery, predicate: Predicate) -> Self {
        Self::Assert {
            query: Some(query),
            predicate,
            policy: RetryPolicy::default(),
        }
    }

    /// Page-level assertion (URL, document ready) with the default policy
    #[must_use]
    pub fn assert_page(predicate: Predicate) -> Self {
        Self::Assert {
            query: None,
            predicate,
            policy: RetryPolicy::default(),
        }
    }

    /// Element read with the default policy
    #[must_use]
    pub fn read(query: ElementQuery, target: ReadTarget) -> Self {
        Self::Read {
            query: Some(query),
            target,
            policy: RetryPolicy::default(),
        }
    }

    /// URL read
    #[must_use]
    pub fn read_url() -> Self {
        Self::Read {
            query: None,
            target: ReadTarget::Url,
            policy: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy on variants that carry one
    #[must_use]
    pub fn with_policy(mut self, new_policy: RetryPolicy) -> Self {
        match &mut self {
            Self::Visit { policy, .. }
            | Self::Assert { policy, .. }
            | Self::Read { policy, .. } => *policy = new_policy,
            Self::Type { .. } | Self::Click { .. } => {}
        }
        self
    }

    /// Whether this command retries until timeout
    #[must_use]
    pub const fn is_retrying(&self) -> bool {
        matches!(self, Self::Assert { .. } | Self::Read { .. })
    }

    /// Description for logs and error messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Visit { url, .. } => format!("visit {url}"),
            Self::Type { query, text } => format!("type \"{text}\" into {query}"),
            Self::Click { query } => format!("click {query}"),
            Self::Assert {
                query, predicate, ..
            } => match query {
                Some(q) => format!("assert {q} {}", predicate.describe()),
                None => format!("assert page {}", predicate.describe()),
            },
            Self::Read { query, target, .. } => match query {
                Some(q) => format!("read {target:?} of {q}"),
                None => format!("read {target:?}"),
            },
        }
    }
}

/// Final outcome of an executed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandState {
    /// Completed successfully
    Settled,
    /// Failed; the rest of the queue is abandoned
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod policy_tests {
        use super::*;

        #[test]
        fn test_default_policy() {
            let p = RetryPolicy::default();
            assert_eq!(p.timeout_ms, 10_000);
            assert_eq!(p.poll_interval_ms, 50);
        }

        #[test]
        fn test_page_load_policy() {
            let p = RetryPolicy::page_load();
            assert_eq!(p.timeout_ms, 30_000);
        }

        #[test]
        fn test_policy_builders() {
            let p = RetryPolicy::default()
                .with_timeout(500)
                .with_poll_interval(10);
            assert_eq!(p.timeout(), Duration::from_millis(500));
            assert_eq!(p.poll_interval(), Duration::from_millis(10));
        }
    }

    mod predicate_tests {
        use super::*;
        use crate::driver::ElementState;

        fn badge(text: &str) -> Vec<ElementState> {
            vec![ElementState::with_text(text)]
        }

        #[test]
        fn test_exists_and_absent() {
            assert!(Predicate::Exists.evaluate(&badge("1"), "", true));
            assert!(!Predicate::Exists.evaluate(&[], "", true));
            assert!(Predicate::Absent.evaluate(&[], "", true));
            assert!(!Predicate::Absent.evaluate(&badge("1"), "", true));
        }

        #[test]
        fn test_text_predicates() {
            let els = badge("Thank you for your order!");
            assert!(Predicate::TextContains("Thank you".to_string()).evaluate(&els, "", true));
            assert!(!Predicate::TextEquals("Thank you".to_string()).evaluate(&els, "", true));
            assert!(
                Predicate::TextEquals("Thank you for your order!".to_string())
                    .evaluate(&els, "", true)
            );
        }

        #[test]
        fn test_count_predicate() {
            let els = vec![ElementState::default(), ElementState::default()];
            assert!(Predicate::CountEquals(2).evaluate(&els, "", true));
            assert!(Predicate::CountEquals(0).evaluate(&[], "", true));
        }

        #[test]
        fn test_url_predicates() {
            let url = "https://www.saucedemo.com/inventory.html";
            assert!(Predicate::UrlContains("/inventory.html".to_string()).evaluate(&[], url, true));
            assert!(Predicate::UrlEquals(url.to_string()).evaluate(&[], url, true));
            assert!(!Predicate::UrlEquals("/cart.html".to_string()).evaluate(&[], url, true));
        }

        #[test]
        fn test_visible_predicate() {
            let hidden = vec![ElementState {
                text: "menu".to_string(),
                value: String::new(),
                visible: false,
            }];
            assert!(!Predicate::Visible.evaluate(&hidden, "", true));
            assert!(Predicate::Visible.evaluate(&badge("x"), "", true));
        }

        #[test]
        fn test_document_ready() {
            assert!(Predicate::DocumentReady.evaluate(&[], "", true));
            assert!(!Predicate::DocumentReady.evaluate(&[], "", false));
        }
    }

    mod read_target_tests {
        use super::*;
        use crate::driver::ElementState;

        #[test]
        fn test_eager_targets() {
            assert!(ReadTarget::Count.is_eager());
            assert!(ReadTarget::TextAll.is_eager());
            assert!(ReadTarget::Url.is_eager());
            assert!(!ReadTarget::Text.is_eager());
            assert!(!ReadTarget::Value.is_eager());
        }

        #[test]
        fn test_text_needs_an_element() {
            assert_eq!(ReadTarget::Text.extract(&[], ""), None);
            let els = vec![ElementState::with_text("$29.99")];
            assert_eq!(
                ReadTarget::Text.extract(&els, ""),
                Some(ReadValue::Text("$29.99".to_string()))
            );
        }

        #[test]
        fn test_count_of_nothing_is_zero() {
            assert_eq!(
                ReadTarget::Count.extract(&[], ""),
                Some(ReadValue::Count(0))
            );
        }

        #[test]
        fn test_text_all_preserves_order() {
            let els = vec![
                ElementState::with_text("Sauce Labs Backpack"),
                ElementState::with_text("Sauce Labs Bike Light"),
            ];
            let got = ReadTarget::TextAll.extract(&els, "").unwrap();
            assert_eq!(
                got.into_texts().unwrap(),
                vec!["Sauce Labs Backpack", "Sauce Labs Bike Light"]
            );
        }
    }

    mod command_tests {
        use super::*;

        #[test]
        fn test_retrying_split() {
            let q = ElementQuery::test_id("checkout");
            assert!(Command::assert(q.clone(), Predicate::Exists).is_retrying());
            assert!(Command::read(q.clone(), ReadTarget::Text).is_retrying());
            assert!(!Command::click(q.clone()).is_retrying());
            assert!(!Command::type_text(q, "x").is_retrying());
            assert!(!Command::visit("https://example.com").is_retrying());
        }

        #[test]
        fn test_visit_gets_page_load_policy() {
            let Command::Visit { policy, .. } = Command::visit("https://example.com") else {
                panic!("expected visit");
            };
            assert_eq!(policy.timeout_ms, PAGE_LOAD_TIMEOUT_MS);
        }

        #[test]
        fn test_with_policy_on_action_is_a_no_op() {
            let cmd = Command::click(ElementQuery::test_id("finish"))
                .with_policy(RetryPolicy::new(1, 1));
            assert_eq!(cmd, Command::click(ElementQuery::test_id("finish")));
        }

        #[test]
        fn test_describe() {
            let cmd = Command::assert(
                ElementQuery::css(".title"),
                Predicate::TextContains("Products".to_string()),
            );
            let desc = cmd.describe();
            assert!(desc.contains(".title"));
            assert!(desc.contains("Products"));
        }
    }
}
