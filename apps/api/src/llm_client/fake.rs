//! Scripted in-process `ChatCompletion` for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatCompletion, ChatMessage, GenerationError, GenerationParams};

/// Answers from a script of replies; the last reply repeats once the script
/// runs out. `Err(status)` becomes a `RemoteService` error.
pub struct FakeChat {
    replies: Mutex<VecDeque<Result<String, u16>>>,
    calls: Mutex<Vec<(Vec<ChatMessage>, GenerationParams)>>,
}

impl FakeChat {
    pub fn scripted(replies: Vec<Result<&str, u16>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(text: &str) -> Self {
        Self::scripted(vec![Ok(text)])
    }

    pub fn failing(status: u16) -> Self {
        Self::scripted(vec![Err(status)])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(Vec<ChatMessage>, GenerationParams)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletion for FakeChat {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), params.clone()));

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().cloned()
            }
        };

        match reply {
            Some(Ok(text)) => Ok(text),
            Some(Err(status)) => Err(GenerationError::RemoteService {
                status: Some(status),
                body: "upstream failure".to_string(),
            }),
            None => Err(GenerationError::MalformedResponse(
                "no scripted reply".to_string(),
            )),
        }
    }
}
