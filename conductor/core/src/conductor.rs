//! Conductor - The Submission Controller
//!
//! The Conductor owns everything about one conversation view: the session,
//! the message log, the busy/idle state machine and the last error. Surfaces
//! read from it and report user actions to it; nothing else mutates state.
//!
//! # State Machine
//!
//! ```text
//!            dispatch(non-empty text)
//!   ┌──────┐ ───────────────────────────▶ ┌──────────────────┐
//!   │ Idle │                              │ AwaitingResponse │ ── dispatch() ─▶ ignored
//!   └──────┘ ◀─────────────────────────── └──────────────────┘
//!            response applied (answer, error or discard)
//! ```
//!
//! # Suspension
//!
//! The transport call is the only operation that suspends. It runs on a
//! spawned task and reports back through a oneshot channel that only the
//! Conductor holds, so a surface can keep reading state (and rendering the
//! busy indicator) while the exchange is outstanding. The result is applied
//! by [`Conductor::poll_response`] or [`Conductor::wait_for_response`].
//!
//! There is no cancellation: once dispatched, an exchange always completes.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::backend::{ChatRequest, ChatResponse, GuidanceBackend, TransportError};
use crate::events::SurfaceEvent;
use crate::messages::{ConductorState, MessageId, SessionId};
use crate::quick_actions::quick_action;
use crate::region::Region;
use crate::session::{ConversationMessage, Session};
use crate::watcher::{self, EmergencyBanner};

/// What happens to a response that arrives after the conversation was cleared
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LateResponsePolicy {
    /// Append it to the (new) conversation anyway
    #[default]
    Apply,
    /// Drop it silently: no message, no error
    DiscardAfterClear,
}

impl LateResponsePolicy {
    /// Config-file spelling
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apply => "apply",
            Self::DiscardAfterClear => "discard-after-clear",
        }
    }
}

impl fmt::Display for LateResponsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LateResponsePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "apply" => Ok(Self::Apply),
            "discard-after-clear" | "discard" => Ok(Self::DiscardAfterClear),
            other => Err(format!(
                "unknown late response policy '{other}' (expected apply or discard-after-clear)"
            )),
        }
    }
}

/// Conductor configuration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConductorConfig {
    /// Region selected when the session starts
    pub default_region: Region,
    /// Handling of responses that outlive a clear
    pub late_responses: LateResponsePolicy,
}

/// Result of a submission attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submission {
    /// The user message was appended and the exchange started
    Accepted {
        /// ID of the appended user message
        message_id: MessageId,
    },
    /// Nothing happened
    Ignored(IgnoreReason),
}

impl Submission {
    /// Whether the submission started an exchange
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Why a submission was a no-op
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Text was empty after trimming
    EmptyInput,
    /// An exchange is already in flight
    Busy,
    /// Quick action index out of range
    UnknownQuickAction,
}

/// How a finished exchange was applied
#[derive(Clone, Debug, PartialEq)]
pub enum ExchangeOutcome {
    /// An assistant message was appended
    Answered {
        /// ID of the assistant message
        message_id: MessageId,
        /// Whether the answer was flagged as an emergency
        is_emergency: bool,
    },
    /// The exchange failed; `last_error` now holds the message
    Failed {
        /// The transport failure
        error: TransportError,
    },
    /// The result arrived after a clear and was dropped
    Discarded,
}

type ExchangeResult = Result<ChatResponse, TransportError>;

/// The exchange currently outstanding
struct InFlight {
    rx: oneshot::Receiver<ExchangeResult>,
    /// Conversation generation when the exchange started
    generation: u64,
    /// The user message that started it
    message_id: MessageId,
    region: Region,
    started: Instant,
}

/// The Conductor - headless submission controller
pub struct Conductor<B: GuidanceBackend> {
    /// Configuration
    config: ConductorConfig,
    /// Guidance backend
    backend: Arc<B>,
    /// Current session
    session: Session,
    /// Current operational state
    state: ConductorState,
    /// Message from the most recent failed exchange
    last_error: Option<String>,
    /// At most one outstanding exchange
    in_flight: Option<InFlight>,
}

impl<B: GuidanceBackend + 'static> Conductor<B> {
    /// Create a new Conductor with a fresh session
    pub fn new(backend: B, config: ConductorConfig) -> Self {
        let session = Session::new(config.default_region);
        Self::with_session(backend, config, session)
    }

    /// Create a Conductor around an existing session
    pub fn with_session(backend: B, config: ConductorConfig, session: Session) -> Self {
        tracing::info!(
            session_id = %session.id(),
            region = %session.region(),
            backend = backend.name(),
            late_responses = %config.late_responses,
            "Conductor created"
        );

        Self {
            config,
            backend: Arc::new(backend),
            session,
            state: ConductorState::Idle,
            last_error: None,
            in_flight: None,
        }
    }

    /// Get the session ID
    pub fn session_id(&self) -> &SessionId {
        self.session.id()
    }

    /// Get the session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Get current state
    pub fn state(&self) -> ConductorState {
        self.state
    }

    /// Whether input affordances should be enabled
    pub fn accepts_input(&self) -> bool {
        self.state.accepts_input()
    }

    /// Message of the most recent failure, cleared by the next accepted submission
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// All messages in display order
    pub fn messages(&self) -> &[ConversationMessage] {
        self.session.conversation().all()
    }

    /// Currently selected region
    pub fn region(&self) -> Region {
        self.session.region()
    }

    /// Late response handling in effect
    pub fn late_response_policy(&self) -> LateResponsePolicy {
        self.config.late_responses
    }

    /// Active emergency banner, derived from the current log and region
    pub fn emergency_banner(&self) -> Option<EmergencyBanner> {
        watcher::active_banner(self.messages(), self.region())
    }

    /// Check whether the guidance service is reachable
    pub async fn health_check(&self) -> bool {
        self.backend.health_check().await
    }

    /// Shared handle to the backend, for probes that outlive a borrow
    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    /// Select a region for future requests
    ///
    /// An exchange already in flight keeps the region it was sent with.
    pub fn set_region(&mut self, region: Region) {
        if region != self.session.region() {
            tracing::info!(
                session_id = %self.session.id(),
                from = %self.session.region(),
                to = %region,
                "Region changed"
            );
        }
        self.session.set_region(region);
    }

    /// Empty the conversation
    ///
    /// An exchange in flight is not cancelled; its result is handled per the
    /// configured [`LateResponsePolicy`].
    pub fn clear_conversation(&mut self) {
        self.session.conversation_mut().clear();
        self.session.metadata_mut().touch();
        tracing::info!(
            session_id = %self.session.id(),
            in_flight = self.in_flight.is_some(),
            "Conversation cleared"
        );
    }

    /// Handle an event from a UI surface
    ///
    /// Returns the submission result for `Submit` and `QuickAction`.
    pub fn handle_event(&mut self, event: SurfaceEvent) -> Option<Submission> {
        match event {
            SurfaceEvent::Submit { text } => Some(self.dispatch(&text)),
            SurfaceEvent::QuickAction { index } => Some(self.quick_action(index)),
            SurfaceEvent::RegionChanged { region } => {
                self.set_region(region);
                None
            }
            SurfaceEvent::ClearConversation => {
                self.clear_conversation();
                None
            }
        }
    }

    /// Submit the text of a quick action
    pub fn quick_action(&mut self, index: usize) -> Submission {
        match quick_action(index) {
            Some(action) => self.dispatch(action.text),
            None => {
                tracing::debug!(index, "Ignoring unknown quick action");
                Submission::Ignored(IgnoreReason::UnknownQuickAction)
            }
        }
    }

    /// Start an exchange without waiting for it
    ///
    /// Appends the user message, clears `last_error`, enters
    /// `AwaitingResponse` and sends the request with the region selected now.
    /// Empty input and submissions while busy are ignored.
    pub fn dispatch(&mut self, text: &str) -> Submission {
        if self.in_flight.is_some() {
            tracing::debug!(session_id = %self.session.id(), "Ignoring submission while awaiting response");
            return Submission::Ignored(IgnoreReason::Busy);
        }

        let message = text.trim();
        if message.is_empty() {
            tracing::debug!("Ignoring empty submission");
            return Submission::Ignored(IgnoreReason::EmptyInput);
        }

        self.last_error = None;
        let message_id = self
            .session
            .conversation_mut()
            .append(ConversationMessage::user(message));

        let region = self.session.region();
        let request = ChatRequest::new(message, self.session.id().clone(), region);

        let (tx, rx) = oneshot::channel();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            let result = backend.send(&request).await;
            // Receiver is only gone if the conductor was dropped
            let _ = tx.send(result);
        });

        self.in_flight = Some(InFlight {
            rx,
            generation: self.session.conversation().generation(),
            message_id,
            region,
            started: Instant::now(),
        });
        self.state = ConductorState::AwaitingResponse;

        let metadata = self.session.metadata_mut();
        metadata.exchanges_started += 1;
        metadata.touch();

        tracing::info!(
            session_id = %self.session.id(),
            region = %region,
            message_id = %message_id,
            "Exchange started"
        );

        Submission::Accepted { message_id }
    }

    /// Submit text and wait for the exchange to finish
    pub async fn submit(&mut self, text: &str) -> Submission {
        let submission = self.dispatch(text);
        if submission.is_accepted() {
            self.wait_for_response().await;
        }
        submission
    }

    /// Apply the in-flight result if it has arrived
    ///
    /// Never blocks. Returns `None` when idle or still waiting.
    pub fn poll_response(&mut self) -> Option<ExchangeOutcome> {
        let in_flight = self.in_flight.as_mut()?;
        let result = match in_flight.rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => Err(TransportError::Aborted),
        };
        let in_flight = self.in_flight.take()?;
        Some(self.complete(in_flight, result))
    }

    /// Wait for the in-flight exchange and apply its result
    ///
    /// Returns `None` immediately when idle. Cancel-safe: dropping the future
    /// leaves the exchange in flight.
    pub async fn wait_for_response(&mut self) -> Option<ExchangeOutcome> {
        let in_flight = self.in_flight.as_mut()?;
        let result = (&mut in_flight.rx)
            .await
            .unwrap_or(Err(TransportError::Aborted));
        let in_flight = self.in_flight.take()?;
        Some(self.complete(in_flight, result))
    }

    fn complete(&mut self, in_flight: InFlight, result: ExchangeResult) -> ExchangeOutcome {
        self.state = ConductorState::Idle;
        let elapsed_ms = u64::try_from(in_flight.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let session_id = self.session.id().clone();

        let stale = in_flight.generation != self.session.conversation().generation();
        if stale && self.config.late_responses == LateResponsePolicy::DiscardAfterClear {
            tracing::warn!(
                session_id = %session_id,
                message_id = %in_flight.message_id,
                elapsed_ms,
                "Discarding response that arrived after the conversation was cleared"
            );
            return ExchangeOutcome::Discarded;
        }

        match result {
            Ok(response) => {
                let message = ConversationMessage::assistant(response);
                let is_emergency = message.is_emergency();
                let message_id = self.session.conversation_mut().append(message);

                let metadata = self.session.metadata_mut();
                metadata.exchanges_answered += 1;
                metadata.touch();

                tracing::info!(
                    session_id = %session_id,
                    region = %in_flight.region,
                    message_id = %message_id,
                    is_emergency,
                    elapsed_ms,
                    "Exchange answered"
                );
                ExchangeOutcome::Answered {
                    message_id,
                    is_emergency,
                }
            }
            Err(error) => {
                self.last_error = Some(error.user_message());

                let metadata = self.session.metadata_mut();
                metadata.exchanges_failed += 1;
                metadata.touch();

                tracing::warn!(
                    session_id = %session_id,
                    region = %in_flight.region,
                    message_id = %in_flight.message_id,
                    elapsed_ms,
                    error = %error,
                    "Exchange failed"
                );
                ExchangeOutcome::Failed { error }
            }
        }
    }
}

impl<B: GuidanceBackend> fmt::Debug for Conductor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conductor")
            .field("session_id", self.session.id())
            .field("region", &self.session.region())
            .field("state", &self.state)
            .field("messages", &self.session.conversation().len())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
