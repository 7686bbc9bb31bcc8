//! Command queue engine: the retry/verification core.
//!
//! Executes an ordered sequence of [`Command`]s against the live page
//! with three guarantees:
//!
//! - **Strict ordering**: commands execute in enqueue order; a later
//!   command never starts before an earlier one's effect (including any
//!   retry loop) has settled.
//! - **Implicit retry-until-timeout** for observations: the engine
//!   re-resolves the target query and re-evaluates the predicate every
//!   poll interval until it passes or the timeout elapses. The page
//!   re-renders asynchronously after every action; without polling, most
//!   checks would be flaky.
//! - **First failure wins**: a failed command abandons the remaining
//!   queue. A broken precondition invalidates the rest of the sequence,
//!   so there are no partial-continuation semantics.
//!
//! Actions never retry: a click that resolves zero elements fails
//! immediately with `ElementNotFound` rather than hanging. Callers gate
//! flaky actions behind a prior visibility assertion.

use crate::command::{Command, CommandState, Predicate, ReadTarget, ReadValue, RetryPolicy};
use crate::driver::{ElementState, PageDriver};
use crate::result::{ComprarError, ComprarResult};
use std::time::{Duration, Instant};

/// Summarize the last observed state for a timeout message.
fn summarize(elements: &[ElementState], url: &str) -> String {
    match elements.first() {
        None => format!("no elements; url {url}"),
        Some(first) => format!(
            "{} element(s); first text \"{}\"; url {url}",
            elements.len(),
            first.text
        ),
    }
}

/// Bounded poll loop: evaluate, early-exit on success, sleep, repeat.
///
/// Evaluates at least once even with a zero timeout. On failure the
/// elapsed time is never less than the timeout and never more than one
/// poll interval past it.
fn poll_until<T>(
    policy: RetryPolicy,
    mut evaluate: impl FnMut() -> Option<T>,
) -> Result<T, Duration> {
    let start = Instant::now();
    loop {
        if let Some(value) = evaluate() {
            return Ok(value);
        }
        if start.elapsed() >= policy.timeout() {
            return Err(start.elapsed());
        }
        std::thread::sleep(policy.poll_interval());
    }
}

fn run_visit(driver: &mut dyn PageDriver, url: &str, policy: RetryPolicy) -> ComprarResult<()> {
    if driver.current_url() == url {
        tracing::debug!(url, "visit is a no-op, url already current");
    } else {
        driver.visit(url)?;
    }
    // Even the no-op path waits for the ready signal before the next
    // command runs.
    poll_until(policy, || driver.document_ready().then_some(())).map_err(|_| {
        ComprarError::Navigation {
            url: url.to_string(),
            message: format!("document not ready after {}ms", policy.timeout_ms),
        }
    })
}

fn run_assert(
    driver: &mut dyn PageDriver,
    query: Option<&crate::locator::ElementQuery>,
    predicate: &Predicate,
    policy: RetryPolicy,
) -> ComprarResult<()> {
    let mut last = String::new();
    poll_until(policy, || {
        let elements = query.map_or_else(Vec::new, |q| driver.resolve(q));
        let url = driver.current_url();
        let passed = predicate.evaluate(&elements, &url, driver.document_ready());
        if passed {
            Some(())
        } else {
            last = summarize(&elements, &url);
            None
        }
    })
    .map_err(|_| ComprarError::AssertionTimeout {
        query: query.map_or_else(|| predicate.describe(), ToString::to_string),
        last_observed: last.clone(),
        timeout_ms: policy.timeout_ms,
    })
}

fn run_read(
    driver: &mut dyn PageDriver,
    query: Option<&crate::locator::ElementQuery>,
    target: ReadTarget,
    policy: RetryPolicy,
) -> ComprarResult<ReadValue> {
    let mut last = String::new();
    poll_until(policy, || {
        let elements = query.map_or_else(Vec::new, |q| driver.resolve(q));
        let url = driver.current_url();
        let value = target.extract(&elements, &url);
        if value.is_none() {
            last = summarize(&elements, &url);
        }
        value
    })
    .map_err(|_| ComprarError::AssertionTimeout {
        query: query.map_or_else(|| format!("{target:?}"), ToString::to_string),
        last_observed: last.clone(),
        timeout_ms: policy.timeout_ms,
    })
}

/// Execute a single command against the driver.
///
/// Observations loop between evaluate and wait per their policy; actions
/// execute once and fail fast.
///
/// # Errors
///
/// `ElementNotFound` for an action whose query resolved nothing,
/// `AssertionTimeout` for an observation that never passed, `Navigation`
/// when a visited document never becomes ready.
pub fn execute_command(
    command: &Command,
    driver: &mut dyn PageDriver,
) -> ComprarResult<Option<ReadValue>> {
    tracing::debug!(command = %command.describe(), "executing");
    match command {
        Command::Visit { url, policy } => {
            run_visit(driver, url, *policy)?;
            Ok(None)
        }
        Command::Click { query } => {
            if driver.resolve(query).is_empty() {
                return Err(ComprarError::ElementNotFound {
                    query: query.to_string(),
                });
            }
            driver.click(query)?;
            Ok(None)
        }
        Command::Type { query, text } => {
            if driver.resolve(query).is_empty() {
                return Err(ComprarError::ElementNotFound {
                    query: query.to_string(),
                });
            }
            driver.type_text(query, text)?;
            Ok(None)
        }
        Command::Assert {
            query,
            predicate,
            policy,
        } => {
            run_assert(driver, query.as_ref(), predicate, *policy)?;
            Ok(None)
        }
        Command::Read {
            query,
            target,
            policy,
        } => run_read(driver, query.as_ref(), *target, *policy).map(Some),
    }
}

/// Execution record for one command in a finished queue run.
#[derive(Debug, Clone)]
pub struct CommandRecord {
    /// Position in the queue
    pub index: usize,
    /// Description of the command
    pub command: String,
    /// Final outcome
    pub state: CommandState,
    /// Wall time spent executing (including the retry loop)
    pub elapsed: Duration,
    /// Value produced by a settled `Read`
    pub read: Option<ReadValue>,
}

/// Outcome of a queue run: one record per attempted command, plus the
/// failure that aborted the run, if any.
#[derive(Debug, Default)]
pub struct QueueReport {
    /// One record per attempted command, in queue order. The last record
    /// is `Failed` when the run aborted; commands after it were never
    /// attempted and have no record.
    pub records: Vec<CommandRecord>,
    failure: Option<ComprarError>,
}

impl QueueReport {
    /// Whether every command settled
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    /// The failure that aborted the run, if any
    #[must_use]
    pub fn failure(&self) -> Option<&ComprarError> {
        self.failure.as_ref()
    }

    /// The record of the command that failed, if any
    #[must_use]
    pub fn failed_record(&self) -> Option<&CommandRecord> {
        self.records.iter().find(|r| r.state == CommandState::Failed)
    }

    /// Convert into a `Result`: the report on a pass, the aborting
    /// failure otherwise.
    ///
    /// # Errors
    ///
    /// The first command failure, verbatim.
    pub fn into_result(mut self) -> ComprarResult<Self> {
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    /// Read value produced by the command at `index`, if any
    #[must_use]
    pub fn read_at(&self, index: usize) -> Option<&ReadValue> {
        self.records.get(index).and_then(|r| r.read.as_ref())
    }

    /// All read values, in queue order
    #[must_use]
    pub fn reads(&self) -> Vec<&ReadValue> {
        self.records.iter().filter_map(|r| r.read.as_ref()).collect()
    }
}

/// An ordered queue of commands for one scenario.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    commands: Vec<Command>,
}

impl CommandQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command
    pub fn enqueue(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Append a command, builder style
    #[must_use]
    pub fn with(mut self, command: Command) -> Self {
        self.enqueue(command);
        self
    }

    /// Number of queued commands
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Run the queue to completion or first failure.
    ///
    /// Commands execute strictly in enqueue order. The first failure is
    /// recorded as a `Failed` entry, captured in the report, and nothing
    /// after it is attempted.
    #[must_use]
    pub fn run(self, driver: &mut dyn PageDriver) -> QueueReport {
        let mut report = QueueReport::default();
        for (index, command) in self.commands.into_iter().enumerate() {
            let description = command.describe();
            let start = Instant::now();
            match execute_command(&command, driver) {
                Ok(read) => report.records.push(CommandRecord {
                    index,
                    command: description,
                    state: CommandState::Settled,
                    elapsed: start.elapsed(),
                    read,
                }),
                Err(err) => {
                    tracing::debug!(command = %description, error = %err, "queue aborted");
                    report.records.push(CommandRecord {
                        index,
                        command: description,
                        state: CommandState::Failed,
                        elapsed: start.elapsed(),
                        read: None,
                    });
                    report.failure = Some(err);
                    break;
                }
            }
        }
        report
    }
}
