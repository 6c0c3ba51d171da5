//! Scripted Backend
//!
//! A [`GuidanceBackend`] that answers from a script instead of the network.
//! Used by tests and offline demos to drive the conductor deterministically.
//!
//! Replies are looked up first by exact message text, then from a shared
//! queue. A reply can be held pending until the test releases it, which is how
//! the `AwaitingResponse` state is observed from outside.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::traits::{ChatRequest, ChatResponse, GuidanceBackend, TransportError};

type ReplyResult = Result<ChatResponse, TransportError>;

/// One scripted reply
#[derive(Debug)]
pub enum ScriptedReply {
    /// Resolve immediately with this result
    Ready(ReplyResult),
    /// Resolve when the paired [`ReplyGate`] is released; never resolves if
    /// the gate is dropped
    Pending(oneshot::Receiver<ReplyResult>),
}

/// Releases a pending scripted reply
#[derive(Debug)]
pub struct ReplyGate {
    tx: oneshot::Sender<ReplyResult>,
}

impl ReplyGate {
    /// Resolve the pending call with a result
    pub fn release(self, result: ReplyResult) {
        let _ = self.tx.send(result);
    }
}

#[derive(Debug, Default)]
struct Script {
    by_message: HashMap<String, VecDeque<ScriptedReply>>,
    queue: VecDeque<ScriptedReply>,
    calls: Vec<ChatRequest>,
    healthy: bool,
}

/// Backend answering from a script
///
/// Cloning shares the script, so a test can keep a handle after moving the
/// backend into a conductor.
#[derive(Clone, Debug)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    /// Create an empty, healthy script
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                healthy: true,
                ..Script::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        // A panic while holding the lock only happens in a failing test.
        self.script
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Answer `message` with `response`
    #[must_use]
    pub fn with_reply(self, message: &str, response: ChatResponse) -> Self {
        self.push_for(message, ScriptedReply::Ready(Ok(response)));
        self
    }

    /// Fail `message` with `error`
    #[must_use]
    pub fn with_failure(self, message: &str, error: TransportError) -> Self {
        self.push_for(message, ScriptedReply::Ready(Err(error)));
        self
    }

    /// Report the service as unhealthy
    #[must_use]
    pub fn unhealthy(self) -> Self {
        self.lock().healthy = false;
        self
    }

    /// Queue a reply for whatever message comes next
    pub fn push(&self, reply: ScriptedReply) {
        self.lock().queue.push_back(reply);
    }

    /// Queue a reply for a specific message text
    pub fn push_for(&self, message: &str, reply: ScriptedReply) {
        self.lock()
            .by_message
            .entry(message.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Queue a pending reply and return the gate that releases it
    #[must_use]
    pub fn push_pending(&self) -> ReplyGate {
        let (tx, rx) = oneshot::channel();
        self.push(ScriptedReply::Pending(rx));
        ReplyGate { tx }
    }

    /// Every request received so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<ChatRequest> {
        self.lock().calls.clone()
    }

    /// Number of requests received so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn next_reply(&self, request: &ChatRequest) -> Option<ScriptedReply> {
        let mut script = self.lock();
        script.calls.push(request.clone());
        if let Some(reply) = script
            .by_message
            .get_mut(&request.message)
            .and_then(VecDeque::pop_front)
        {
            return Some(reply);
        }
        script.queue.pop_front()
    }
}

#[async_trait]
impl GuidanceBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "Scripted"
    }

    async fn health_check(&self) -> bool {
        self.lock().healthy
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        match self.next_reply(request) {
            Some(ScriptedReply::Ready(result)) => result,
            Some(ScriptedReply::Pending(rx)) => match rx.await {
                Ok(result) => result,
                Err(_) => std::future::pending().await,
            },
            None => Err(TransportError::Decode(format!(
                "no scripted reply for '{}'",
                request.message
            ))),
        }
    }
}
