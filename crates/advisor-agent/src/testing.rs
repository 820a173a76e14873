// ABOUTME: Test utilities for advisor-agent, including a stub model runtime.
// ABOUTME: Replays scripted responses so stage and pipeline tests never hit the network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::runtime::{ModelRuntime, StageError};

/// A stub model runtime that replays a scripted queue of responses.
///
/// Each `complete` call pops the next scripted reply; once the queue is
/// empty the last reply repeats, so a single-response stub can drive an
/// arbitrary number of stage calls.
pub struct StubModelRuntime {
    responses: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl StubModelRuntime {
    /// Create a stub that replays the given responses in order.
    pub fn new(responses: Vec<&str>) -> Self {
        let queue: VecDeque<String> = responses.iter().map(|s| s.to_string()).collect();
        let last = queue
            .back()
            .cloned()
            .unwrap_or_else(|| "{\"accepted\": []}".to_string());
        Self {
            responses: Mutex::new(queue),
            last: Mutex::new(last),
        }
    }

    /// A stub that always accepts exactly the given names.
    pub fn accepting(names: &[&str]) -> Self {
        let reply = serde_json::json!({ "accepted": names }).to_string();
        Self::new(vec![&reply])
    }

    /// A stub that always returns an empty accepted list.
    pub fn rejecting_all() -> Self {
        Self::new(vec!["{\"accepted\": []}"])
    }
}

#[async_trait]
impl ModelRuntime for StubModelRuntime {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, StageError> {
        let mut queue = self.responses.lock().unwrap();
        match queue.pop_front() {
            Some(reply) => {
                *self.last.lock().unwrap() = reply.clone();
                Ok(reply)
            }
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }

    fn provider_name(&self) -> &str {
        "stub"
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}
