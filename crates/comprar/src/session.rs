//! Scenario execution context.
//!
//! A [`Session`] owns the driver and recorder for one scenario at a time
//! and funnels every page-abstraction command through the engine one at a
//! time, preserving queue semantics across composed page calls: strict
//! ordering falls out of the single-threaded execution, and a sticky
//! abort makes every command after the first failure surface that first
//! failure instead of attempting anything further.

use crate::command::{Command, Predicate, ReadTarget, ReadValue, RetryPolicy};
use crate::config::HarnessConfig;
use crate::driver::{NullRecorder, PageDriver, Recorder};
use crate::locator::ElementQuery;
use crate::queue::{execute_command, CommandQueue, QueueReport};
use crate::result::{ComprarError, ComprarResult};

/// Execution context for one scenario.
pub struct Session {
    driver: Box<dyn PageDriver>,
    recorder: Box<dyn Recorder>,
    config: HarnessConfig,
    /// First failure of the current scenario, if any
    aborted: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("aborted", &self.aborted)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session over a driver with the given configuration
    #[must_use]
    pub fn new(driver: Box<dyn PageDriver>, config: HarnessConfig) -> Self {
        Self {
            driver,
            recorder: Box::new(NullRecorder),
            config,
            aborted: None,
        }
    }

    /// Attach a snapshot/metric recorder
    #[must_use]
    pub fn with_recorder(mut self, recorder: Box<dyn Recorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Harness configuration
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Start a fresh scenario, clearing any sticky abort.
    pub fn begin_scenario(&mut self, name: &str) {
        tracing::debug!(scenario = name, "starting scenario");
        self.aborted = None;
    }

    /// The first failure of the current scenario, if it has aborted
    #[must_use]
    pub fn first_failure(&self) -> Option<&str> {
        self.aborted.as_deref()
    }

    /// Execute one command, honoring the sticky abort.
    ///
    /// # Errors
    ///
    /// `ScenarioAborted` if an earlier command already failed, otherwise
    /// the command's own failure.
    pub fn execute(&mut self, command: Command) -> ComprarResult<Option<ReadValue>> {
        if let Some(first_failure) = &self.aborted {
            return Err(ComprarError::ScenarioAborted {
                first_failure: first_failure.clone(),
            });
        }
        match execute_command(&command, self.driver.as_mut()) {
            Ok(value) => Ok(value),
            Err(err) => {
                if err.aborts_scenario() {
                    self.aborted = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Run a whole queue through this session.
    ///
    /// # Errors
    ///
    /// The first command failure.
    pub fn run(&mut self, queue: CommandQueue) -> ComprarResult<QueueReport> {
        if let Some(first_failure) = &self.aborted {
            return Err(ComprarError::ScenarioAborted {
                first_failure: first_failure.clone(),
            });
        }
        match queue.run(self.driver.as_mut()).into_result() {
            Ok(report) => Ok(report),
            Err(err) => {
                if err.aborts_scenario() {
                    self.aborted = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Convenience command builders used by the page abstractions.
    // ------------------------------------------------------------------

    /// Navigate to a path under the configured base URL and wait for the
    /// document-ready signal.
    pub fn visit(&mut self, path: &str) -> ComprarResult<()> {
        let url = self.config.url_for(path);
        let policy = self.config.page_load_policy();
        self.execute(Command::visit(url).with_policy(policy))
            .map(|_| ())
    }

    /// Click an element (non-retrying).
    pub fn click(&mut self, query: ElementQuery) -> ComprarResult<()> {
        self.execute(Command::click(query)).map(|_| ())
    }

    /// Clear and type into an element (non-retrying).
    pub fn type_text(&mut self, query: ElementQuery, text: &str) -> ComprarResult<()> {
        self.execute(Command::type_text(query, text)).map(|_| ())
    }

    /// Assert with the configured default policy.
    pub fn assert(&mut self, query: ElementQuery, predicate: Predicate) -> ComprarResult<()> {
        let policy = self.config.default_policy();
        self.execute(Command::assert(query, predicate).with_policy(policy))
            .map(|_| ())
    }

    /// Assert with an explicit policy.
    pub fn assert_with(
        &mut self,
        query: ElementQuery,
        predicate: Predicate,
        policy: RetryPolicy,
    ) -> ComprarResult<()> {
        self.execute(Command::assert(query, predicate).with_policy(policy))
            .map(|_| ())
    }

    /// Page-level assert (URL, document ready).
    pub fn assert_page(&mut self, predicate: Predicate) -> ComprarResult<()> {
        let policy = self.config.default_policy();
        self.execute(Command::assert_page(predicate).with_policy(policy))
            .map(|_| ())
    }

    fn read(&mut self, query: ElementQuery, target: ReadTarget) -> ComprarResult<ReadValue> {
        let policy = self.config.default_policy();
        let value = self.execute(Command::read(query, target).with_policy(policy))?;
        value.ok_or_else(|| ComprarError::Assertion {
            message: "read command produced no value".to_string(),
        })
    }

    /// Read the text of the first matching element.
    pub fn read_text(&mut self, query: ElementQuery) -> ComprarResult<String> {
        self.read(query, ReadTarget::Text)?
            .into_text()
            .ok_or_else(|| ComprarError::Assertion {
                message: "expected a text read value".to_string(),
            })
    }

    /// Read the texts of all matching elements, in document order.
    pub fn read_texts(&mut self, query: ElementQuery) -> ComprarResult<Vec<String>> {
        self.read(query, ReadTarget::TextAll)?
            .into_texts()
            .ok_or_else(|| ComprarError::Assertion {
                message: "expected a text-list read value".to_string(),
            })
    }

    /// Read the number of matching elements (zero is a valid answer).
    pub fn read_count(&mut self, query: ElementQuery) -> ComprarResult<usize> {
        self.read(query, ReadTarget::Count)?
            .as_count()
            .ok_or_else(|| ComprarError::Assertion {
                message: "expected a count read value".to_string(),
            })
    }

    /// Read the input value of the first matching element.
    pub fn read_value(&mut self, query: ElementQuery) -> ComprarResult<String> {
        self.read(query, ReadTarget::Value)?
            .into_text()
            .ok_or_else(|| ComprarError::Assertion {
                message: "expected a value read value".to_string(),
            })
    }

    /// Read the current URL.
    pub fn read_url(&mut self) -> ComprarResult<String> {
        let value = self.execute(Command::read_url())?;
        value
            .and_then(ReadValue::into_text)
            .ok_or_else(|| ComprarError::Assertion {
                message: "expected a url read value".to_string(),
            })
    }

    /// Request a named snapshot (fire-and-forget).
    pub fn snapshot(&mut self, name: &str) {
        self.recorder.capture_snapshot(name);
    }

    /// Record a named metric (fire-and-forget).
    pub fn metric(&mut self, name: &str, value: f64) {
        self.recorder.record_metric(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::FakeStorefront;

    fn fast_config() -> HarnessConfig {
        let mut config = HarnessConfig::default();
        config.timeouts.default_ms = 200;
        config.timeouts.page_load_ms = 200;
        config.timeouts.poll_interval_ms = 5;
        config
    }

    fn session() -> Session {
        Session::new(Box::new(FakeStorefront::new()), fast_config())
    }

    #[test]
    fn test_execute_runs_commands_in_order() {
        let mut s = session();
        s.visit("/").unwrap();
        s.type_text(ElementQuery::test_id("username"), "standard_user")
            .unwrap();
        s.type_text(ElementQuery::test_id("password"), "secret_sauce")
            .unwrap();
        s.click(ElementQuery::test_id("login-button")).unwrap();
        let url = s.read_url().unwrap();
        assert!(url.contains("/inventory.html"));
    }

    #[test]
    fn test_sticky_abort_surfaces_first_failure_only() {
        let mut s = session();
        s.visit("/").unwrap();
        let first = s.click(ElementQuery::test_id("no-such-button")).unwrap_err();
        assert!(matches!(first, ComprarError::ElementNotFound { .. }));

        // Subsequent commands do not execute; they surface the first failure.
        let second = s.click(ElementQuery::test_id("login-button")).unwrap_err();
        let ComprarError::ScenarioAborted { first_failure } = second else {
            panic!("expected ScenarioAborted, got {second:?}");
        };
        assert!(first_failure.contains("no-such-button"));
    }

    #[test]
    fn test_begin_scenario_clears_abort() {
        let mut s = session();
        s.visit("/").unwrap();
        let _ = s.click(ElementQuery::test_id("no-such-button"));
        assert!(s.first_failure().is_some());

        s.begin_scenario("next scenario");
        assert!(s.first_failure().is_none());
        s.click(ElementQuery::test_id("login-button")).unwrap();
    }

    #[test]
    fn test_read_count_zero_for_absent_badge() {
        let mut s = session();
        s.visit("/").unwrap();
        let n = s.read_count(ElementQuery::css(".shopping_cart_badge")).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_recorder_hooks_are_fire_and_forget() {
        struct CountingRecorder {
            snapshots: usize,
        }
        impl Recorder for CountingRecorder {
            fn capture_snapshot(&mut self, _name: &str) {
                self.snapshots += 1;
            }
            fn record_metric(&mut self, _name: &str, _value: f64) {}
        }

        let mut s = Session::new(Box::new(FakeStorefront::new()), fast_config())
            .with_recorder(Box::new(CountingRecorder { snapshots: 0 }));
        s.snapshot("login-page");
        s.metric("load-ms", 12.5);
    }
}
