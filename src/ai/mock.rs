use super::{GenerativeApi, ModelCall, UpstreamReply};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted outcome for one call to [`MockGenerativeApi`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Json { status: u16, body: Value },
    TransportFailure(String),
}

impl MockReply {
    pub fn ok(body: Value) -> Self {
        Self::Json { status: 200, body }
    }

    pub fn status(status: u16, body: Value) -> Self {
        Self::Json { status, body }
    }
}

/// In-memory stand-in for the remote API.
///
/// Replies cycle through the scripted list; with none scripted every call
/// answers 200 with an empty object.
pub struct MockGenerativeApi {
    replies: Arc<Mutex<Vec<MockReply>>>,
    call_count: Arc<Mutex<usize>>,
    payloads: Arc<Mutex<Vec<Value>>>,
    delay: Option<Duration>,
    abandoned: Arc<AtomicBool>,
}

impl MockGenerativeApi {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            payloads: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            abandoned: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_reply(self, reply: MockReply) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push(reply);
        }
        self
    }

    /// Hold every call for `delay` before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.call_count.lock().map(|count| *count).unwrap_or(0)
    }

    pub fn sent_payloads(&self) -> Vec<Value> {
        self.payloads
            .lock()
            .map(|payloads| payloads.clone())
            .unwrap_or_default()
    }

    /// True once a call was dropped before it produced a reply.
    pub fn was_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> MockReply {
        let index = match self.call_count.lock() {
            Ok(mut count) => {
                *count += 1;
                *count - 1
            }
            Err(_) => 0,
        };

        match self.replies.lock() {
            Ok(replies) if !replies.is_empty() => replies[index % replies.len()].clone(),
            _ => MockReply::ok(json!({})),
        }
    }
}

impl Default for MockGenerativeApi {
    fn default() -> Self {
        Self::new()
    }
}

struct InFlight {
    settled: bool,
    abandoned: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.settled {
            self.abandoned.store(true, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl GenerativeApi for MockGenerativeApi {
    async fn post(
        &self,
        _call: &ModelCall,
        _api_key: &str,
        payload: &Value,
    ) -> Result<UpstreamReply> {
        let mut in_flight = InFlight {
            settled: false,
            abandoned: self.abandoned.clone(),
        };

        if let Ok(mut payloads) = self.payloads.lock() {
            payloads.push(payload.clone());
        }
        let reply = self.next_reply();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        in_flight.settled = true;

        match reply {
            MockReply::Json { status, body } => Ok(UpstreamReply { status, body }),
            MockReply::TransportFailure(reason) => Err(Error::Generic(reason)),
        }
    }
}
