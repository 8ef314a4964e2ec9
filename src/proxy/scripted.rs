//! In-memory proxy that replays canned responses.
//!
//! Useful for offline runs and for exercising the acquisition protocol
//! without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ProxyError, RequestProxy};
use crate::models::{RawSearchResult, SearchParams};

type Reply = Result<RawSearchResult, ProxyError>;

/// Proxy returning queued replies in order and recording every request.
///
/// Once the queue is drained every call returns the fallback reply.
pub struct ScriptedProxy {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    requests: Mutex<Vec<SearchParams>>,
}

impl ScriptedProxy {
    /// Empty script; calls fail with an HTTP error once drained.
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Err(ProxyError::Http("no scripted reply".to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Proxy whose every call fails with `message`.
    pub fn always_failing(message: &str) -> Self {
        Self {
            fallback: Err(ProxyError::Http(message.to_string())),
            ..Self::new()
        }
    }

    /// Queue a successful reply.
    pub fn push_ok(&self, result: RawSearchResult) -> &Self {
        self.push(Ok(result))
    }

    /// Queue a failed reply.
    pub fn push_err(&self, error: ProxyError) -> &Self {
        self.push(Err(error))
    }

    fn push(&self, reply: Reply) -> &Self {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<SearchParams> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for ScriptedProxy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestProxy for ScriptedProxy {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn search(&self, params: &SearchParams) -> Result<RawSearchResult, ProxyError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(params.clone());

        // Yield so callers observe a real suspension point
        tokio::task::yield_now().await;

        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
