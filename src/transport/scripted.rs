//! Scripted transport: replays queued replies and records every request.
//!
//! Used by the test suite and handy for offline demos. Each call pops the next
//! scripted reply; an exhausted script answers with
//! [`VisionError::Internal`] so a test that makes an unexpected extra call
//! fails loudly instead of hanging.

use super::{GenerateRequest, GenerateResponse, GenerationTransport};
use crate::config::ApiKey;
use crate::error::VisionError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<GenerateResponse, VisionError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn respond(self, response: GenerateResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queue a failing reply.
    pub fn fail(self, error: VisionError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, reply: Result<GenerateResponse, VisionError>) {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(reply);
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Copies of every request received, in call order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl GenerationTransport for ScriptedTransport {
    async fn generate(
        &self,
        _credential: &ApiKey,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(VisionError::Internal("scripted transport exhausted".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ResponsePart;

    #[tokio::test]
    async fn replays_in_order_then_exhausts() {
        let t = ScriptedTransport::new()
            .respond(GenerateResponse::from_parts(vec![ResponsePart::text("one")]))
            .fail(VisionError::ApiTimeout { elapsed_ms: 5 });
        let key = ApiKey::new("k").unwrap();
        let req = || GenerateRequest {
            model: "m".into(),
            parts: vec![],
        };

        assert!(t.generate(&key, req()).await.is_ok());
        assert!(matches!(
            t.generate(&key, req()).await,
            Err(VisionError::ApiTimeout { .. })
        ));
        assert!(matches!(
            t.generate(&key, req()).await,
            Err(VisionError::Internal(_))
        ));
        assert_eq!(t.calls(), 3);
        assert_eq!(t.requests().len(), 3);
    }
}
