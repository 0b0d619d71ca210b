//! Client-side gate around CV generation.
//!
//! The controller walks `Idle -> Submitting -> Accepted | Denied`. While denied
//! it listens for the payment widget's completion event on an explicit channel
//! and reports the email captured at denial time, since the event itself
//! carries no payload.

pub mod api;

use std::sync::{Arc, Weak};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::models::{Cv, CvFields};
use crate::validation::{FieldErrors, normalize_email, validate_cv};

pub use api::{GateApi, GateError, HttpGateApi};

/// Message attached to `Idle` after a failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Fields(FieldErrors),
    Message(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentPhase {
    AwaitingPayment { notice: Option<String> },
    PaymentPending,
    PaymentConfirmed,
}

#[derive(Debug, Clone)]
pub enum GateState {
    Idle { notice: Option<Notice> },
    Submitting,
    Accepted(Cv),
    Denied {
        email: String,
        form: CvFields,
        payment: PaymentPhase,
    },
}

impl GateState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GateState::Idle { .. })
    }

    pub fn payment_phase(&self) -> Option<&PaymentPhase> {
        match self {
            GateState::Denied { payment, .. } => Some(payment),
            _ => None,
        }
    }
}

/// Fired by the payment widget when checkout completes.
#[derive(Debug, Clone, Copy)]
pub struct PaymentCompleted;

/// Handle given to the payment widget. Cloneable and safe to keep after the
/// controller is gone; events nobody listens for are dropped.
#[derive(Clone)]
pub struct PaymentNotifier {
    events: broadcast::Sender<PaymentCompleted>,
}

impl PaymentNotifier {
    pub fn notify(&self) {
        let _ = self.events.send(PaymentCompleted);
    }
}

pub struct GateController<A: GateApi> {
    api: Arc<A>,
    state: Arc<watch::Sender<GateState>>,
    events: broadcast::Sender<PaymentCompleted>,
    listener: Option<JoinHandle<()>>,
}

impl<A: GateApi> GateController<A> {
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(GateState::Idle { notice: None });
        let (events, _) = broadcast::channel(8);
        Self {
            api: Arc::new(api),
            state: Arc::new(state),
            events,
            listener: None,
        }
    }

    pub fn state(&self) -> GateState {
        self.state.borrow().clone()
    }

    /// Observe state changes, including those made by the payment listener.
    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.state.subscribe()
    }

    pub fn payment_notifier(&self) -> PaymentNotifier {
        PaymentNotifier {
            events: self.events.clone(),
        }
    }

    /// Run one generation attempt. Submitting is an explicit user action, so
    /// any previous outcome (including a denial) is discarded first.
    pub async fn submit(&mut self, form: CvFields) -> GateState {
        self.stop_listener();
        self.state.send_replace(GateState::Submitting);

        if let Err(fields) = validate_cv(&form) {
            self.set_idle(Some(Notice::Fields(fields)));
            return self.state();
        }

        let email = normalize_email(&form.email);

        let checked = self.api.check_entitlement(&email).await;
        match checked {
            Ok(entitlement) if !entitlement.can_generate => {
                self.deny(email, form);
                return self.state();
            }
            Ok(_) => {}
            Err(e) => {
                self.fail(e, email, form);
                return self.state();
            }
        }

        let generated = self.api.generate(&form).await;
        match generated {
            Ok(cv) => {
                tracing::debug!(cv_id = %cv.id, "CV accepted");
                self.state.send_replace(GateState::Accepted(cv));
            }
            Err(e) => self.fail(e, email, form),
        }

        self.state()
    }

    /// Back to `Idle`, dropping any pending payment listener. An acknowledgement
    /// already sent to the server still completes.
    pub fn retry(&mut self) {
        self.stop_listener();
        self.set_idle(None);
    }

    fn fail(&mut self, err: GateError, email: String, form: CvFields) {
        match err {
            GateError::LimitReached => self.deny(email, form),
            GateError::Validation(fields) => self.set_idle(Some(Notice::Fields(fields))),
            other => {
                tracing::warn!("CV generation failed: {other}");
                self.set_idle(Some(Notice::Message(other.user_message())));
            }
        }
    }

    fn deny(&mut self, email: String, form: CvFields) {
        tracing::debug!("CV generation denied, awaiting payment");
        // Subscribe before publishing the state so no event can slip between.
        let events = self.events.subscribe();
        self.state.send_replace(GateState::Denied {
            email: email.clone(),
            form,
            payment: PaymentPhase::AwaitingPayment { notice: None },
        });
        self.listener = Some(tokio::spawn(listen_for_payment(
            self.api.clone(),
            Arc::downgrade(&self.state),
            email,
            events,
        )));
    }

    fn set_idle(&self, notice: Option<Notice>) {
        self.state.send_replace(GateState::Idle { notice });
    }

    fn stop_listener(&mut self) {
        if let Some(handle) = self.listener.take() {
            handle.abort();
        }
    }
}

impl<A: GateApi> Drop for GateController<A> {
    fn drop(&mut self) {
        self.stop_listener();
    }
}

/// Waits for completion events while the controller stays denied for `email`.
/// Holds only a weak handle so a torn-down controller is never written to.
async fn listen_for_payment<A: GateApi>(
    api: Arc<A>,
    state: Weak<watch::Sender<GateState>>,
    email: String,
    mut events: broadcast::Receiver<PaymentCompleted>,
) {
    loop {
        match events.recv().await {
            Ok(PaymentCompleted) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => return,
        }

        let Some(sender) = state.upgrade() else {
            return;
        };
        let started = sender.send_if_modified(|s| match s {
            GateState::Denied {
                email: denied,
                payment,
                ..
            } if *denied == email
                && matches!(payment, PaymentPhase::AwaitingPayment { .. }) =>
            {
                *payment = PaymentPhase::PaymentPending;
                true
            }
            _ => false,
        });
        drop(sender);
        if !started {
            continue;
        }

        // Detached: an acknowledgement in flight must finish even if this
        // listener is aborted.
        let ack = tokio::spawn(acknowledge_payment(api.clone(), state.clone(), email.clone()));
        match ack.await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Payment acknowledgement task failed: {e}");
                return;
            }
        }
    }
}

/// Reports the payment for `email` and settles the pending phase. Returns
/// whether the server confirmed it.
async fn acknowledge_payment<A: GateApi>(
    api: Arc<A>,
    state: Weak<watch::Sender<GateState>>,
    email: String,
) -> bool {
    let result = api.complete_payment(&email).await;
    match &result {
        Ok(()) => tracing::info!("Payment confirmed"),
        Err(e) => tracing::warn!("Payment completion failed: {e}"),
    }

    let Some(sender) = state.upgrade() else {
        tracing::debug!("Payment acknowledged after controller teardown");
        return result.is_ok();
    };
    sender.send_if_modified(|s| match s {
        GateState::Denied {
            email: denied,
            payment,
            ..
        } if *denied == email && *payment == PaymentPhase::PaymentPending => {
            *payment = match &result {
                Ok(()) => PaymentPhase::PaymentConfirmed,
                Err(e) => PaymentPhase::AwaitingPayment {
                    notice: Some(e.user_message()),
                },
            };
            true
        }
        _ => false,
    });

    result.is_ok()
}
