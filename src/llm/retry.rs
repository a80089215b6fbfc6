use async_trait::async_trait;
use log::{ error, warn };
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::chat::ChatClient;
use crate::models::chat::ChatMessage;

/// Blocking pause used between retries and after answered questions.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Runs `op` until it succeeds or `policy.max_retries` attempts have failed.
///
/// Every error counts the same. The delay is only taken between attempts,
/// so exhausting `n` attempts sleeps `n - 1` times. Exhaustion yields `None`.
pub async fn call_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut op: F
) -> Option<T>
    where F: FnMut() -> Fut, Fut: Future<Output = Result<T, E>>, E: Display
{
    for attempt in 1..=policy.max_retries {
        match op().await {
            Ok(value) => {
                return Some(value);
            }
            Err(e) => {
                warn!("API call failed (attempt {}/{}): {}", attempt, policy.max_retries, e);
                if attempt < policy.max_retries {
                    sleeper.sleep(policy.delay).await;
                }
            }
        }
    }
    None
}

/// A [`ChatClient`] wrapped in the retry policy, with replies whitespace-trimmed.
#[derive(Clone)]
pub struct RetryingChatClient {
    inner: Arc<dyn ChatClient>,
    policy: RetryPolicy,
    temperature: f32,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryingChatClient {
    pub fn new(
        inner: Arc<dyn ChatClient>,
        policy: RetryPolicy,
        temperature: f32,
        sleeper: Arc<dyn Sleeper>
    ) -> Self {
        Self { inner, policy, temperature, sleeper }
    }

    pub async fn ask(&self, messages: &[ChatMessage]) -> Option<String> {
        let reply = call_with_retry(&self.policy, self.sleeper.as_ref(), || {
            self.inner.complete(messages, self.temperature)
        }).await;

        if reply.is_none() {
            error!(
                "Giving up on {} after {} attempts",
                self.inner.get_model(),
                self.policy.max_retries
            );
        }
        reply.map(|r| r.trim().to_string())
    }

    pub fn model(&self) -> String {
        self.inner.get_model()
    }
}
