use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use ratebot_core::domain::quote::UserId;

/// Delivery failure, carrying the transport's reason. The dispatcher
/// surfaces it to the caller; it never retries or suppresses.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MessengerError {
    #[error("reply delivery failed: {0}")]
    Reply(String),
    #[error("push delivery failed: {0}")]
    Push(String),
}

/// Outbound side of the messaging platform: answer the message that
/// triggered us, or push to a user by identifier.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), MessengerError>;
    async fn push(&self, user_id: &UserId, text: &str) -> Result<(), MessengerError>;
}

#[derive(Default)]
pub struct NoopMessenger;

#[async_trait]
impl Messenger for NoopMessenger {
    async fn reply(&self, _reply_token: &str, _text: &str) -> Result<(), MessengerError> {
        Ok(())
    }

    async fn push(&self, _user_id: &UserId, _text: &str) -> Result<(), MessengerError> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    Reply { reply_token: String, text: String },
    Push { user_id: UserId, text: String },
}

/// Test double that records every delivery in order.
#[derive(Default)]
pub struct RecordingMessenger {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().await.clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), MessengerError> {
        self.deliveries.lock().await.push(Delivery::Reply {
            reply_token: reply_token.to_owned(),
            text: text.to_owned(),
        });
        Ok(())
    }

    async fn push(&self, user_id: &UserId, text: &str) -> Result<(), MessengerError> {
        self.deliveries
            .lock()
            .await
            .push(Delivery::Push { user_id: user_id.clone(), text: text.to_owned() });
        Ok(())
    }
}
