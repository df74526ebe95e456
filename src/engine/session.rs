use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{info, warn};

use crate::engine::{error::QuoteError, quote_engine::QuoteEngine};
use crate::types::quote::Quote;
use crate::validation::{form::QuoteForm, validator::RequestValidator};
use crate::view::quote_view::QuoteView;

/// How a submission made while another one is pending is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionPolicy {
    /// Refuse the new submission; the pending one carries on.
    Reject,
    /// Abort the pending submission; only the newest can update the view.
    #[default]
    Supersede,
}

impl fmt::Display for SubmissionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Supersede => write!(f, "supersede"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Idle,
    Submitting,
    Success,
    Failed(String),
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    view: QuoteView,
    quote: Option<Quote>,
    generation: u64,
    in_flight: Option<AbortHandle>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            view: QuoteView::default(),
            quote: None,
            generation: 0,
            in_flight: None,
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

/// One quote form and its results surface: a single submission slot driving
/// `Idle -> Submitting -> Success | Failed`, back to `Idle` on reset.
#[derive(Clone)]
pub struct QuoteSession {
    engine: Arc<QuoteEngine>,
    validator: Arc<RequestValidator>,
    policy: SubmissionPolicy,
    state: Arc<Mutex<SessionState>>,
}

impl QuoteSession {
    pub fn new(
        engine: Arc<QuoteEngine>,
        validator: Arc<RequestValidator>,
        policy: SubmissionPolicy,
    ) -> Self {
        Self {
            engine,
            validator,
            policy,
            state: Arc::new(Mutex::new(SessionState::new())),
        }
    }

    /// Starts a submission and waits for its outcome. Validation, pricing and
    /// settling run on a spawned task that outlives the returned future.
    pub async fn submit(&self, form: QuoteForm) -> Result<Quote, QuoteError> {
        let task = {
            let mut state = self.state.lock().await;

            if state.phase == SessionPhase::Submitting {
                match self.policy {
                    SubmissionPolicy::Reject => {
                        warn!("quote submission rejected, another one is in flight");
                        return Err(QuoteError::SubmissionInFlight);
                    }
                    SubmissionPolicy::Supersede => {
                        info!("superseding in-flight quote submission");
                        state.abort_in_flight();
                    }
                }
            }

            state.generation += 1;
            state.phase = SessionPhase::Submitting;
            state.view.clear_error();

            let generation = state.generation;
            let task = tokio::spawn({
                let session = self.clone();
                async move { session.run(generation, form).await }
            });
            state.in_flight = Some(task.abort_handle());
            task
        };

        match task.await {
            Ok(result) => result,
            Err(join_error) => {
                if !join_error.is_cancelled() {
                    warn!(error = %join_error, "quote task failed");
                }
                Err(QuoteError::Cancelled)
            }
        }
    }

    async fn run(&self, generation: u64, form: QuoteForm) -> Result<Quote, QuoteError> {
        let result = match form.into_request(&self.validator) {
            Ok(request) => self.engine.quote(request).await,
            Err(error) => Err(QuoteError::from(error)),
        };

        if !self.settle(generation, result.as_ref()).await {
            return Err(QuoteError::Cancelled);
        }

        result
    }

    /// Back to `Idle`: aborts any pending submission and clears the results surface.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;

        state.abort_in_flight();
        state.generation += 1;
        state.phase = SessionPhase::Idle;
        state.quote = None;
        state.view.reset();
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.lock().await.phase.clone()
    }

    pub async fn view(&self) -> QuoteView {
        self.state.lock().await.view.clone()
    }

    pub async fn quote(&self) -> Option<Quote> {
        self.state.lock().await.quote.clone()
    }

    /// Applies an outcome to the view unless a newer submission or a reset took
    /// the slot. Returns whether it was applied.
    async fn settle(&self, generation: u64, result: Result<&Quote, &QuoteError>) -> bool {
        let mut state = self.state.lock().await;

        if state.generation != generation {
            return false;
        }

        state.in_flight = None;

        match result {
            Ok(quote) => {
                state.view.render(quote);
                state.quote = Some(quote.clone());
                state.phase = SessionPhase::Success;
            }
            Err(error) => {
                let message = error.user_message();
                warn!(%error, "quote submission failed");
                state.view.show_error(message.clone());
                state.quote = None;
                state.phase = SessionPhase::Failed(message);
            }
        }

        true
    }
}

impl fmt::Debug for QuoteSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuoteSession")
            .field("policy", &self.policy)
            .finish()
    }
}
