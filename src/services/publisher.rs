use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    services::{Ack, EventPublisher},
    webhook::schemas::InboundEvent,
};

/// Publisher that writes every record to the application log, tagged with
/// the configured queue and client name.
#[derive(Clone)]
pub struct LogPublisher {
    queue: String,
    client_name: String,
}

impl LogPublisher {
    pub fn new(app_config: &AppConfig) -> Self {
        Self {
            queue: app_config.rabbitmq_queue.clone(),
            client_name: app_config.facebook_service_name.clone(),
        }
    }
}

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, topic: &str, event: &InboundEvent) -> anyhow::Result<Ack> {
        let record = serde_json::to_string(event)
            .with_context(|| format!("failed to serialize {topic} record"))?;
        let ack = Ack { id: Uuid::new_v4() };

        tracing::info!(
            queue = %self.queue,
            client = %self.client_name,
            topic,
            ack_id = %ack.id,
            record = %record,
            "inbound event published"
        );

        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{consts, webhook::schemas::MessageReceived};

    #[tokio::test]
    async fn test_log_publisher_acks_every_event() {
        let publisher = LogPublisher {
            queue: "messages_queue".into(),
            client_name: "FACEBOOK_SERVICE".into(),
        };
        let event = InboundEvent::Message(MessageReceived {
            message_id: "m_1".into(),
            sender_id: "user-1".into(),
            page_id: "page-1".into(),
            text: Some("hi".into()),
            attachments: vec![],
            timestamp: 1,
            channel: consts::CHANNEL_NAME,
        });

        let first = publisher.publish(event.topic(), &event).await.unwrap();
        let second = publisher.publish(event.topic(), &event).await.unwrap();

        assert_ne!(first.id, second.id);
    }
}
