pub mod publisher;

use crate::webhook::schemas::InboundEvent;
use async_trait::async_trait;
use uuid::Uuid;

/// Acknowledgement returned once a record is handed to the queue
#[derive(Debug, Clone, PartialEq)]
pub struct Ack {
    pub id: Uuid,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes a classified inbound event under `topic`.
    ///
    /// Retry and backpressure policy belongs to the implementation, callers
    /// only log failures.
    async fn publish(&self, topic: &str, event: &InboundEvent) -> anyhow::Result<Ack>;
}

pub type ImplEventPublisher = Box<dyn EventPublisher>;
