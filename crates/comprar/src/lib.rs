//! Comprar: acceptance-test harness for the five-page storefront demo.
//!
//! Comprar (Spanish: "to buy") drives the demo flow end to end — login,
//! inventory, cart, the two checkout steps, and the confirmation page —
//! through a deferred command queue with retry-until-timeout
//! verification, an explicit checkout state machine with validation and
//! price-consistency gates, and an append-only evidence pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    COMPRAR Architecture                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────────┐   ┌───────────────────┐   │
//! │  │ Scenario  │   │ Page objects  │   │ Command queue     │   │
//! │  │ (Rust)    │──►│ + checkout    │──►│ engine (retry /   │   │
//! │  │           │   │ state machine │   │ ordering / abort) │   │
//! │  └───────────┘   └───────┬───────┘   └─────────┬─────────┘   │
//! │                          │                     │             │
//! │                  ┌───────▼───────┐   ┌─────────▼─────────┐   │
//! │                  │ Evidence sink │   │ PageDriver seam   │   │
//! │                  │ (JSONL logs)  │   │ (browser / fake)  │   │
//! │                  └───────────────┘   └───────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The browser itself sits behind the [`PageDriver`] trait; the bundled
//! [`FakeStorefront`] implements the same seam over an in-memory model of
//! the demo application so every scenario in this crate runs hermetically.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod checkout;
pub mod command;
pub mod config;
pub mod driver;
pub mod evidence;
pub mod locator;
pub mod mock;
pub mod pages;
pub mod queue;
pub mod result;
pub mod session;

pub use checkout::{
    next_state, CartLine, CheckoutContext, CheckoutEvent, CheckoutFlow, CheckoutState,
    DisplayedTotals, FlowFailure, GateFailure, RequiredField, PRICE_EPSILON,
};
pub use command::{
    Command, CommandState, Predicate, ReadTarget, ReadValue, RetryPolicy, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_TIMEOUT_MS, PAGE_LOAD_TIMEOUT_MS,
};
pub use config::{
    BaseUrl, Customer, HarnessConfig, Password, ProductCatalog, Timeouts, UserFixture, UserRole,
    Viewport, Viewports,
};
pub use driver::{ElementState, NullRecorder, PageDriver, Recorder};
pub use evidence::{
    rebuild_summary, write_summary, AccessibilityViolation, AccessibilityViolationSet,
    ConsolidatedSummary, ErrorReport, EvidenceKind, EvidencePayload, EvidenceRecord, EvidenceSink,
    PerformanceMetric, ResponsiveCheckResult, SecurityCheckResult, CONSOLIDATED_FILE_NAME,
};
pub use locator::ElementQuery;
pub use mock::FakeStorefront;
pub use pages::{
    CartPage, CheckoutCompletePage, CheckoutInfoPage, CheckoutOverviewPage, InventoryPage,
    LoginPage, SortOption,
};
pub use queue::{CommandQueue, CommandRecord, QueueReport};
pub use result::{ComprarError, ComprarResult};
pub use session::Session;
