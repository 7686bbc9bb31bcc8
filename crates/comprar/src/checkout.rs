//! Multi-page checkout state machine.
//!
//! The checkout flow is modelled as an explicit state machine with a pure
//! transition function: [`next_state`] takes the current state, an event,
//! and the accumulated [`CheckoutContext`], and either yields the next
//! state or a [`GateFailure`] explaining which gate refused the
//! transition. Gate failures are values, not errors; an expected
//! rejection (submitting the form with a missing field) is a passing
//! test, and only [`CheckoutFlow`] decides whether a failure becomes a
//! hard error.
//!
//! Price consistency is reconciled, not recomputed: the subtotal must
//! match the sum of the cart snapshot, and the displayed total must match
//! displayed subtotal plus displayed tax, each within [`PRICE_EPSILON`].
//! The tax amount itself is treated as opaque page output.

use crate::config::Customer;
use crate::evidence::ErrorReport;
use crate::pages::{CartPage, CheckoutCompletePage, CheckoutInfoPage, CheckoutOverviewPage};
use crate::result::{ComprarError, ComprarResult};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance for comparing money amounts parsed from rendered text.
pub const PRICE_EPSILON: f64 = 0.01;

/// One line of the cart snapshot taken when checkout begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product name
    pub name: String,
    /// Unit price in dollars
    pub unit_price: f64,
    /// Quantity
    pub qty: u32,
}

impl CartLine {
    /// Create a cart line
    #[must_use]
    pub fn new(name: impl Into<String>, unit_price: f64, qty: u32) -> Self {
        Self {
            name: name.into(),
            unit_price,
            qty,
        }
    }

    /// Extended price for this line
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.qty)
    }
}

/// Money amounts read off the overview page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayedTotals {
    /// Item total before tax
    pub subtotal: f64,
    /// Tax as rendered by the application
    pub tax: f64,
    /// Grand total
    pub total: f64,
}

/// States of the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckoutState {
    /// Reviewing the cart, checkout not yet started
    Cart,
    /// Customer information form (step one)
    CustomerInfo,
    /// Order overview (step two)
    Overview,
    /// Order placed, confirmation shown
    Complete,
    /// Flow abandoned via cancel
    Cancelled,
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cart => "cart",
            Self::CustomerInfo => "customer-info",
            Self::Overview => "overview",
            Self::Complete => "complete",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

/// Required fields of the customer information form, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequiredField {
    /// First name
    FirstName,
    /// Last name
    LastName,
    /// Postal code
    PostalCode,
}

impl RequiredField {
    /// Validation order: first missing field wins
    pub const VALIDATION_ORDER: [Self; 3] = [Self::FirstName, Self::LastName, Self::PostalCode];

    /// The application's error banner text for this field
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::FirstName => "Error: First Name is required",
            Self::LastName => "Error: Last Name is required",
            Self::PostalCode => "Error: Postal Code is required",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FirstName => "first name",
            Self::LastName => "last name",
            Self::PostalCode => "postal code",
        };
        write!(f, "{name}")
    }
}

/// Why a transition was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GateFailure {
    /// A required form field is empty
    #[error("required field missing: {field}")]
    MissingField {
        /// The first missing field in validation order
        field: RequiredField,
    },

    /// Displayed subtotal disagrees with the cart snapshot
    #[error("displayed subtotal {displayed:.2} != computed {computed:.2}")]
    SubtotalMismatch {
        /// Sum of the cart snapshot lines
        computed: f64,
        /// Subtotal rendered on the overview page
        displayed: f64,
    },

    /// Displayed total disagrees with subtotal plus tax
    #[error("displayed total {displayed_total:.2} != subtotal + tax = {expected:.2}")]
    TotalMismatch {
        /// Total rendered on the overview page
        displayed_total: f64,
        /// Displayed subtotal plus displayed tax
        expected: f64,
    },

    /// Overview items disagree with the cart snapshot
    #[error("overview items {observed:?} != cart snapshot {expected:?}")]
    ItemsMismatch {
        /// Names from the cart snapshot
        expected: Vec<String>,
        /// Names rendered on the overview page
        observed: Vec<String>,
    },

    /// The event is not legal in the current state
    #[error("event {event} is not legal in state {state}")]
    IllegalTransition {
        /// State the flow was in
        state: CheckoutState,
        /// Description of the refused event
        event: String,
    },
}

/// Events driving the checkout state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutEvent {
    /// Click checkout from the cart
    Begin,
    /// Submit the customer information form
    SubmitInfo,
    /// Click finish on the overview, carrying the rendered totals
    Confirm(DisplayedTotals),
    /// Abandon the flow
    Cancel,
}

impl CheckoutEvent {
    fn describe(&self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::SubmitInfo => "submit-info",
            Self::Confirm(_) => "confirm",
            Self::Cancel => "cancel",
        }
    }
}

/// Data accumulated while the flow runs: who is checking out and what the
/// cart held when checkout began.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CheckoutContext {
    /// Customer data for the information form
    pub customer: Customer,
    /// Cart contents snapshotted at [`CheckoutEvent::Begin`]
    pub lines: Vec<CartLine>,
}

impl CheckoutContext {
    /// Expected subtotal from the snapshot, in dollars
    #[must_use]
    pub fn computed_subtotal(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    fn first_missing_field(&self) -> Option<RequiredField> {
        RequiredField::VALIDATION_ORDER.into_iter().find(|field| {
            let value = match field {
                RequiredField::FirstName => &self.customer.first_name,
                RequiredField::LastName => &self.customer.last_name,
                RequiredField::PostalCode => &self.customer.postal_code,
            };
            value.trim().is_empty()
        })
    }
}

fn within_epsilon(a: f64, b: f64) -> bool {
    (a - b).abs() <= PRICE_EPSILON
}

/// Pure transition function of the checkout state machine.
///
/// # Errors
///
/// Returns the [`GateFailure`] describing which gate refused the event.
pub fn next_state(
    state: CheckoutState,
    event: &CheckoutEvent,
    ctx: &CheckoutContext,
) -> Result<CheckoutState, GateFailure> {
    match (state, event) {
        (CheckoutState::Cart, CheckoutEvent::Begin) => Ok(CheckoutState::CustomerInfo),
        (CheckoutState::CustomerInfo, CheckoutEvent::SubmitInfo) => {
            match ctx.first_missing_field() {
                Some(field) => Err(GateFailure::MissingField { field }),
                None => Ok(CheckoutState::Overview),
            }
        }
        (CheckoutState::Overview, CheckoutEvent::Confirm(totals)) => {
            let computed = ctx.computed_subtotal();
            if !within_epsilon(totals.subtotal, computed) {
                return Err(GateFailure::SubtotalMismatch {
                    computed,
                    displayed: totals.subtotal,
                });
            }
            let expected = totals.subtotal + totals.tax;
            if !within_epsilon(totals.total, expected) {
                return Err(GateFailure::TotalMismatch {
                    displayed_total: totals.total,
                    expected,
                });
            }
            Ok(CheckoutState::Complete)
        }
        (CheckoutState::CustomerInfo | CheckoutState::Overview, CheckoutEvent::Cancel) => {
            Ok(CheckoutState::Cancelled)
        }
        (state, event) => Err(GateFailure::IllegalTransition {
            state,
            event: event.describe().to_string(),
        }),
    }
}

/// A gate failure together with the context it happened in, ready to be
/// turned into an error report or a hard error.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowFailure {
    /// Which gate refused
    pub failure: GateFailure,
    /// Context at the time of refusal
    pub context: CheckoutContext,
}

impl FlowFailure {
    /// Evidence payload for the error log
    #[must_use]
    pub fn to_error_report(&self, url: impl Into<String>) -> ErrorReport {
        ErrorReport {
            error: self.failure.to_string(),
            url: url.into(),
            context: serde_json::to_value(&self.context).ok(),
        }
    }

    /// The hard-error form of this failure
    #[must_use]
    pub fn to_error(&self) -> ComprarError {
        match &self.failure {
            GateFailure::MissingField { field } => ComprarError::ValidationGate {
                field: field.to_string(),
                message: field.message().to_string(),
            },
            GateFailure::SubtotalMismatch { computed, displayed } => {
                ComprarError::DataIntegrityMismatch {
                    label: "item subtotal".to_string(),
                    computed: *computed,
                    displayed: *displayed,
                    epsilon: PRICE_EPSILON,
                }
            }
            GateFailure::TotalMismatch {
                displayed_total,
                expected,
            } => ComprarError::DataIntegrityMismatch {
                label: "order total".to_string(),
                computed: *expected,
                displayed: *displayed_total,
                epsilon: PRICE_EPSILON,
            },
            GateFailure::ItemsMismatch { expected, observed } => ComprarError::Assertion {
                message: format!(
                    "overview items {observed:?} do not match cart snapshot {expected:?}"
                ),
            },
            GateFailure::IllegalTransition { .. } => ComprarError::Assertion {
                message: self.failure.to_string(),
            },
        }
    }
}

/// Drives the checkout pages while keeping the state machine honest:
/// every page interaction is preceded by the corresponding pure
/// transition, so the flow refuses to act from an illegal state.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutFlow {
    state: CheckoutState,
    context: CheckoutContext,
    last_failure: Option<FlowFailure>,
}

impl CheckoutFlow {
    /// Start a flow for a customer; the cart snapshot is taken at
    /// [`CheckoutFlow::begin`].
    #[must_use]
    pub fn new(customer: Customer) -> Self {
        Self {
            state: CheckoutState::Cart,
            context: CheckoutContext {
                customer,
                lines: Vec::new(),
            },
            last_failure: None,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    /// Accumulated context
    #[must_use]
    pub const fn context(&self) -> &CheckoutContext {
        &self.context
    }

    /// The most recent gate refusal, if any
    #[must_use]
    pub const fn last_failure(&self) -> Option<&FlowFailure> {
        self.last_failure.as_ref()
    }

    fn refuse(&mut self, failure: GateFailure) -> ComprarError {
        let flow_failure = FlowFailure {
            failure,
            context: self.context.clone(),
        };
        let err = flow_failure.to_error();
        tracing::warn!(state = %self.state, failure = %flow_failure.failure, "checkout gate refused");
        self.last_failure = Some(flow_failure);
        err
    }

    /// Snapshot the cart and move to the customer information form.
    ///
    /// # Errors
    ///
    /// Gate refusal or any failed page command.
    pub fn begin(&mut self, session: &mut Session) -> ComprarResult<()> {
        let lines = CartPage::new(session).cart_lines()?;
        self.context.lines = lines;
        match next_state(self.state, &CheckoutEvent::Begin, &self.context) {
            Ok(next) => {
                CartPage::new(session).checkout()?;
                CheckoutInfoPage::new(session).verify_loaded()?;
                self.state = next;
                Ok(())
            }
            Err(failure) => Err(self.refuse(failure)),
        }
    }

    /// Fill and submit the customer information form.
    ///
    /// # Errors
    ///
    /// Gate refusal (a required field is empty) or any failed page
    /// command.
    pub fn submit_info(&mut self, session: &mut Session) -> ComprarResult<()> {
        match next_state(self.state, &CheckoutEvent::SubmitInfo, &self.context) {
            Ok(next) => {
                let customer = self.context.customer.clone();
                let mut page = CheckoutInfoPage::new(session);
                page.fill(&customer)?;
                page.submit()?;
                CheckoutOverviewPage::new(session).verify_loaded()?;
                self.state = next;
                Ok(())
            }
            Err(failure) => Err(self.refuse(failure)),
        }
    }

    /// Submit the form expecting the application to reject it, and verify
    /// the rendered error matches the first missing field. The flow stays
    /// on the information form.
    ///
    /// # Errors
    ///
    /// Fails when the form would actually pass validation, or when the
    /// application's error banner does not match the expected message.
    pub fn submit_info_expecting_rejection(
        &mut self,
        session: &mut Session,
    ) -> ComprarResult<GateFailure> {
        let Err(failure) = next_state(self.state, &CheckoutEvent::SubmitInfo, &self.context)
        else {
            return Err(ComprarError::Assertion {
                message: "expected the information form to be rejected, but all fields are present"
                    .to_string(),
            });
        };
        let GateFailure::MissingField { field } = failure else {
            return Err(self.refuse(failure));
        };

        let customer = self.context.customer.clone();
        let mut page = CheckoutInfoPage::new(session);
        page.fill(&customer)?;
        page.submit()?;
        page.verify_error_contains(field.message())?;
        Ok(GateFailure::MissingField { field })
    }

    /// Reconcile the overview against the cart snapshot and place the
    /// order.
    ///
    /// # Errors
    ///
    /// Gate refusal (price or item mismatch) or any failed page command.
    pub fn confirm(&mut self, session: &mut Session) -> ComprarResult<()> {
        let mut overview = CheckoutOverviewPage::new(session);
        let observed = overview.item_names()?;
        let expected: Vec<String> = self.context.lines.iter().map(|l| l.name.clone()).collect();
        if observed != expected {
            return Err(self.refuse(GateFailure::ItemsMismatch { expected, observed }));
        }
        let totals = overview.displayed_totals()?;
        match next_state(self.state, &CheckoutEvent::Confirm(totals), &self.context) {
            Ok(next) => {
                CheckoutOverviewPage::new(session).finish()?;
                let mut complete = CheckoutCompletePage::new(session);
                complete.verify_loaded()?;
                complete.verify_completion_message()?;
                complete.verify_cart_empty()?;
                self.state = next;
                Ok(())
            }
            Err(failure) => Err(self.refuse(failure)),
        }
    }

    /// Abandon the flow from either checkout step.
    ///
    /// # Errors
    ///
    /// Gate refusal (cancel is only legal mid-flow) or a failed page
    /// command.
    pub fn cancel(&mut self, session: &mut Session) -> ComprarResult<()> {
        match next_state(self.state, &CheckoutEvent::Cancel, &self.context) {
            Ok(next) => {
                match self.state {
                    CheckoutState::CustomerInfo => CheckoutInfoPage::new(session).cancel()?,
                    CheckoutState::Overview => CheckoutOverviewPage::new(session).cancel()?,
                    _ => {}
                }
                self.state = next;
                Ok(())
            }
            Err(failure) => Err(self.refuse(failure)),
        }
    }

    /// The whole happy path: begin, submit the form, confirm.
    ///
    /// # Errors
    ///
    /// The first gate refusal or page failure.
    pub fn place_order(&mut self, session: &mut Session) -> ComprarResult<()> {
        self.begin(session)?;
        self.submit_info(session)?;
        self.confirm(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::mock::FakeStorefront;
    use crate::pages::{InventoryPage, LoginPage};

    fn ctx(lines: Vec<CartLine>) -> CheckoutContext {
        CheckoutContext {
            customer: Customer::default(),
            lines,
        }
    }

    fn two_item_ctx() -> CheckoutContext {
        ctx(vec![
            CartLine::new("Sauce Labs Backpack", 29.99, 1),
            CartLine::new("Sauce Labs Bike Light", 9.99, 1),
        ])
    }

    mod transition_tests {
        use super::*;

        #[test]
        fn test_happy_path_transitions() {
            let ctx = two_item_ctx();
            let s = next_state(CheckoutState::Cart, &CheckoutEvent::Begin, &ctx).unwrap();
            assert_eq!(s, CheckoutState::CustomerInfo);
            let s = next_state(s, &CheckoutEvent::SubmitInfo, &ctx).unwrap();
            assert_eq!(s, CheckoutState::Overview);
            let totals = DisplayedTotals {
                subtotal: 39.98,
                tax: 3.20,
                total: 43.18,
            };
            let s = next_state(s, &CheckoutEvent::Confirm(totals), &ctx).unwrap();
            assert_eq!(s, CheckoutState::Complete);
        }

        #[test]
        fn test_cancel_is_legal_from_both_steps() {
            let ctx = two_item_ctx();
            assert_eq!(
                next_state(CheckoutState::CustomerInfo, &CheckoutEvent::Cancel, &ctx),
                Ok(CheckoutState::Cancelled)
            );
            assert_eq!(
                next_state(CheckoutState::Overview, &CheckoutEvent::Cancel, &ctx),
                Ok(CheckoutState::Cancelled)
            );
        }

        #[test]
        fn test_illegal_transitions_are_refused() {
            let ctx = two_item_ctx();
            let err =
                next_state(CheckoutState::Cart, &CheckoutEvent::SubmitInfo, &ctx).unwrap_err();
            assert!(matches!(err, GateFailure::IllegalTransition { .. }));
            let totals = DisplayedTotals {
                subtotal: 0.0,
                tax: 0.0,
                total: 0.0,
            };
            let err = next_state(
                CheckoutState::Complete,
                &CheckoutEvent::Confirm(totals),
                &ctx,
            )
            .unwrap_err();
            assert!(matches!(err, GateFailure::IllegalTransition { .. }));
        }

        #[test]
        fn test_missing_fields_checked_in_order() {
            let mut context = two_item_ctx();
            context.customer = Customer::new("", "", "");
            let err = next_state(CheckoutState::CustomerInfo, &CheckoutEvent::SubmitInfo, &context)
                .unwrap_err();
            assert_eq!(
                err,
                GateFailure::MissingField {
                    field: RequiredField::FirstName
                }
            );

            context.customer = Customer::new("John", "", "");
            let err = next_state(CheckoutState::CustomerInfo, &CheckoutEvent::SubmitInfo, &context)
                .unwrap_err();
            assert_eq!(
                err,
                GateFailure::MissingField {
                    field: RequiredField::LastName
                }
            );

            context.customer = Customer::new("John", "Doe", "  ");
            let err = next_state(CheckoutState::CustomerInfo, &CheckoutEvent::SubmitInfo, &context)
                .unwrap_err();
            assert_eq!(
                err,
                GateFailure::MissingField {
                    field: RequiredField::PostalCode
                }
            );
        }

        #[test]
        fn test_subtotal_checked_within_epsilon() {
            let ctx = two_item_ctx();
            // 39.98 computed; 39.985 is inside epsilon, 40.00 is not.
            let ok = DisplayedTotals {
                subtotal: 39.985,
                tax: 3.20,
                total: 43.185,
            };
            assert!(next_state(CheckoutState::Overview, &CheckoutEvent::Confirm(ok), &ctx).is_ok());

            let bad = DisplayedTotals {
                subtotal: 40.00,
                tax: 3.20,
                total: 43.20,
            };
            let err = next_state(CheckoutState::Overview, &CheckoutEvent::Confirm(bad), &ctx)
                .unwrap_err();
            assert!(matches!(err, GateFailure::SubtotalMismatch { .. }));
        }

        #[test]
        fn test_total_must_equal_subtotal_plus_tax() {
            let ctx = two_item_ctx();
            let bad = DisplayedTotals {
                subtotal: 39.98,
                tax: 3.20,
                total: 44.00,
            };
            let err = next_state(CheckoutState::Overview, &CheckoutEvent::Confirm(bad), &ctx)
                .unwrap_err();
            assert!(matches!(err, GateFailure::TotalMismatch { .. }));
        }

        #[test]
        fn test_tax_amount_itself_is_opaque() {
            // Any tax is accepted as long as the total reconciles.
            let ctx = two_item_ctx();
            let odd_tax = DisplayedTotals {
                subtotal: 39.98,
                tax: 0.0,
                total: 39.98,
            };
            assert!(
                next_state(CheckoutState::Overview, &CheckoutEvent::Confirm(odd_tax), &ctx).is_ok()
            );
        }
    }

    mod context_tests {
        use super::*;

        #[test]
        fn test_computed_subtotal_sums_line_totals() {
            let context = ctx(vec![
                CartLine::new("Sauce Labs Backpack", 29.99, 2),
                CartLine::new("Sauce Labs Onesie", 7.99, 1),
            ]);
            assert!((context.computed_subtotal() - 67.97).abs() < 1e-9);
        }

        #[test]
        fn test_flow_failure_error_report_carries_context() {
            let failure = FlowFailure {
                failure: GateFailure::MissingField {
                    field: RequiredField::PostalCode,
                },
                context: two_item_ctx(),
            };
            let report = failure.to_error_report("https://www.saucedemo.com/checkout-step-one.html");
            assert!(report.error.contains("postal code"));
            assert!(report.context.is_some());
        }

        #[test]
        fn test_flow_failure_maps_to_error_taxonomy() {
            let missing = FlowFailure {
                failure: GateFailure::MissingField {
                    field: RequiredField::FirstName,
                },
                context: CheckoutContext::default(),
            };
            assert!(matches!(
                missing.to_error(),
                ComprarError::ValidationGate { .. }
            ));

            let mismatch = FlowFailure {
                failure: GateFailure::SubtotalMismatch {
                    computed: 39.98,
                    displayed: 40.00,
                },
                context: CheckoutContext::default(),
            };
            assert!(matches!(
                mismatch.to_error(),
                ComprarError::DataIntegrityMismatch { .. }
            ));
        }
    }

    mod flow_tests {
        use super::*;

        fn fast_config() -> HarnessConfig {
            let mut config = HarnessConfig::default();
            config.timeouts.default_ms = 200;
            config.timeouts.page_load_ms = 200;
            config.timeouts.poll_interval_ms = 5;
            config
        }

        fn session_with(driver: FakeStorefront) -> Session {
            Session::new(Box::new(driver), fast_config())
        }

        fn logged_in_session_with_items(driver: FakeStorefront) -> Session {
            let mut session = session_with(driver);
            LoginPage::new(&mut session).login_as_standard().unwrap();
            let mut inventory = InventoryPage::new(&mut session);
            inventory.add_to_cart("Sauce Labs Backpack").unwrap();
            inventory.add_to_cart("Sauce Labs Bike Light").unwrap();
            inventory.open_cart().unwrap();
            session
        }

        #[test]
        fn test_place_order_happy_path() {
            let mut session = logged_in_session_with_items(FakeStorefront::new());
            let mut flow = CheckoutFlow::new(Customer::default());
            flow.place_order(&mut session).unwrap();
            assert_eq!(flow.state(), CheckoutState::Complete);
            assert!(flow.last_failure().is_none());
            assert_eq!(flow.context().lines.len(), 2);
        }

        #[test]
        fn test_missing_field_refused_before_touching_the_page() {
            let mut session = logged_in_session_with_items(FakeStorefront::new());
            let mut flow = CheckoutFlow::new(Customer::new("", "Doe", "12345"));
            flow.begin(&mut session).unwrap();
            let err = flow.submit_info(&mut session).unwrap_err();
            assert!(matches!(err, ComprarError::ValidationGate { .. }));
            assert_eq!(flow.state(), CheckoutState::CustomerInfo);
            assert!(flow.last_failure().is_some());
        }

        #[test]
        fn test_expected_rejection_is_a_passing_outcome() {
            let mut session = logged_in_session_with_items(FakeStorefront::new());
            let mut flow = CheckoutFlow::new(Customer::new("", "Doe", "12345"));
            flow.begin(&mut session).unwrap();
            let failure = flow.submit_info_expecting_rejection(&mut session).unwrap();
            assert_eq!(
                failure,
                GateFailure::MissingField {
                    field: RequiredField::FirstName
                }
            );
            assert_eq!(flow.state(), CheckoutState::CustomerInfo);
            // The session did not abort; the scenario can keep going.
            assert!(session.first_failure().is_none());
        }

        #[test]
        fn test_subtotal_mismatch_blocks_the_order() {
            let mut driver = FakeStorefront::new();
            driver.override_displayed_subtotal(99.99);
            let mut session = logged_in_session_with_items(driver);
            let mut flow = CheckoutFlow::new(Customer::default());
            flow.begin(&mut session).unwrap();
            flow.submit_info(&mut session).unwrap();
            let err = flow.confirm(&mut session).unwrap_err();
            assert!(matches!(err, ComprarError::DataIntegrityMismatch { .. }));
            assert_eq!(flow.state(), CheckoutState::Overview);
        }

        #[test]
        fn test_cancel_from_information_form() {
            let mut session = logged_in_session_with_items(FakeStorefront::new());
            let mut flow = CheckoutFlow::new(Customer::default());
            flow.begin(&mut session).unwrap();
            flow.cancel(&mut session).unwrap();
            assert_eq!(flow.state(), CheckoutState::Cancelled);
            let url = session.read_url().unwrap();
            assert!(url.contains("/cart.html"));
        }

        #[test]
        fn test_cancel_from_overview_returns_to_inventory() {
            let mut session = logged_in_session_with_items(FakeStorefront::new());
            let mut flow = CheckoutFlow::new(Customer::default());
            flow.begin(&mut session).unwrap();
            flow.submit_info(&mut session).unwrap();
            flow.cancel(&mut session).unwrap();
            assert_eq!(flow.state(), CheckoutState::Cancelled);
            let url = session.read_url().unwrap();
            assert!(url.contains("/inventory.html"));
        }

        #[test]
        fn test_confirm_from_cart_is_illegal() {
            let mut session = logged_in_session_with_items(FakeStorefront::new());
            let mut flow = CheckoutFlow::new(Customer::default());
            // begin() was never called; confirm must refuse, not act.
            let err = flow.confirm(&mut session);
            assert!(err.is_err());
            assert_eq!(flow.state(), CheckoutState::Cart);
        }
    }
}
