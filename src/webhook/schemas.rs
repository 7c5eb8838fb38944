//! # Messenger Webhook Schemas
//!
//! Data structures for the JSON payloads Facebook sends to the webhook and
//! for the flat records published for every classified event.
//!
//! Entries and messaging events are kept as raw JSON in [`WebhookPayload`]
//! and [`Entry`] so that one malformed item can be skipped without rejecting
//! the whole delivery.

use crate::consts;
use serde::{Deserialize, Serialize};

/// Query parameters of the subscription verification request
#[derive(Debug, Default, Deserialize)]
pub struct VerificationRequest {
    /// The mode parameter, should be "subscribe"
    #[serde(rename = "hub.mode", default)]
    pub mode: String,
    /// The challenge string to echo back
    #[serde(rename = "hub.challenge", default)]
    pub challenge: String,
    /// The verification token configured in the Facebook app dashboard
    #[serde(rename = "hub.verify_token", default)]
    pub verify_token: String,
}

/// Root webhook payload.
///
/// Both fields are kept as raw JSON: a delivery for another object is ignored
/// whatever its shape, and an `entry` that is not a list holds no entries.
#[derive(Debug, Default)]
pub struct WebhookPayload {
    /// The object type, "page" for Messenger notifications
    pub object: Option<serde_json::Value>,
    /// Page entries, decoded one by one into [`Entry`]
    pub entry: Option<serde_json::Value>,
}

impl From<serde_json::Map<String, serde_json::Value>> for WebhookPayload {
    fn from(mut body: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            object: body.remove("object"),
            entry: body.remove("entry"),
        }
    }
}

impl WebhookPayload {
    pub fn is_page(&self) -> bool {
        self.object.as_ref().and_then(serde_json::Value::as_str) == Some(consts::PAGE_OBJECT)
    }

    /// Object name for logs, the raw JSON when it isn't a string
    pub fn object_name(&self) -> String {
        match &self.object {
            Some(serde_json::Value::String(object)) => object.clone(),
            Some(other) => other.to_string(),
            None => "none".to_string(),
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entry
            .as_ref()
            .and_then(serde_json::Value::as_array)
            .map_or(0, Vec::len)
    }

    pub fn into_entries(self) -> Vec<serde_json::Value> {
        match self.entry {
            Some(serde_json::Value::Array(entries)) => entries,
            _ => Vec::new(),
        }
    }
}

/// Page level unit of a notification
#[derive(Debug, Deserialize)]
pub struct Entry {
    /// Page ID
    pub id: String,
    /// Time of the update in epoch milliseconds
    #[serde(default)]
    pub time: Option<i64>,
    /// Messaging events, decoded one by one into [`MessagingEvent`]
    #[serde(default)]
    pub messaging: Vec<serde_json::Value>,
}

/// Sender or recipient of a messaging event
#[derive(Debug, Deserialize)]
pub struct Party {
    pub id: String,
}

/// One message or postback between a user and the page
#[derive(Debug, Deserialize)]
pub struct MessagingEvent {
    pub sender: Party,
    #[serde(default)]
    pub recipient: Option<Party>,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
    #[serde(default)]
    pub postback: Option<serde_json::Value>,
    /// Keys of other event kinds (reads, deliveries, reactions...)
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl MessagingEvent {
    /// Decodes the event kind from the key present. An event carrying both
    /// `message` and `postback` is a [`EventKind::Message`].
    pub fn take_kind(&mut self) -> Result<EventKind, serde_json::Error> {
        if let Some(message) = self.message.take() {
            return Ok(EventKind::Message {
                message: serde_json::from_value(message)?,
            });
        }
        if let Some(postback) = self.postback.take() {
            return Ok(EventKind::Postback {
                postback: serde_json::from_value(postback)?,
            });
        }

        Ok(EventKind::Unhandled(self.other.keys().cloned().collect()))
    }
}

/// Kind of a messaging event
#[derive(Debug)]
pub enum EventKind {
    Message { message: IncomingMessage },
    Postback { postback: Postback },
    /// Keys of an event this channel doesn't relay
    Unhandled(Vec<String>),
}

/// Message content
#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    /// Message ID, empty when Facebook leaves it out
    #[serde(default)]
    pub mid: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Attachment of an incoming message
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Attachment {
    /// image, audio, video, file, location, fallback...
    #[serde(rename = "type")]
    pub attachment_type: String,
    #[serde(default)]
    pub payload: Option<AttachmentPayload>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AttachmentPayload {
    #[serde(default)]
    pub url: Option<String>,
}

/// Button or persistent menu interaction
#[derive(Debug, Deserialize)]
pub struct Postback {
    pub payload: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Published record for a received message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReceived {
    pub message_id: String,
    pub sender_id: String,
    pub page_id: String,
    pub text: Option<String>,
    pub attachments: Vec<Attachment>,
    pub timestamp: i64,
    pub channel: &'static str,
}

/// Published record for a received postback
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostbackReceived {
    pub payload: String,
    pub title: Option<String>,
    pub sender_id: String,
    pub page_id: String,
    pub timestamp: i64,
    pub channel: &'static str,
}

/// Classified inbound event, serialized as a flat record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InboundEvent {
    Message(MessageReceived),
    Postback(PostbackReceived),
}

impl InboundEvent {
    /// Topic the event is published under
    pub fn topic(&self) -> &'static str {
        match self {
            InboundEvent::Message(_) => consts::TOPIC_MESSAGE_RECEIVED,
            InboundEvent::Postback(_) => consts::TOPIC_POSTBACK_RECEIVED,
        }
    }

    pub fn sender_id(&self) -> &str {
        match self {
            InboundEvent::Message(event) => &event.sender_id,
            InboundEvent::Postback(event) => &event.sender_id,
        }
    }
}

/// Result of processing a webhook delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WebhookStatus {
    Processed,
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verification_request_deserialization() {
        let json = r#"{"hub.mode":"subscribe","hub.verify_token":"test123","hub.challenge":"challenge123"}"#;
        let query: VerificationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(query.mode, "subscribe");
        assert_eq!(query.verify_token, "test123");
        assert_eq!(query.challenge, "challenge123");
    }

    #[test]
    fn test_verification_request_missing_fields_are_empty() {
        let query: VerificationRequest = serde_json::from_str(r#"{"hub.mode":"subscribe"}"#).unwrap();
        assert_eq!(query.challenge, "");
        assert_eq!(query.verify_token, "");
    }

    #[test]
    fn test_message_event_is_classified_as_message() {
        let mut event: MessagingEvent = serde_json::from_value(json!({
            "sender": {"id": "user-1"},
            "recipient": {"id": "page-1"},
            "timestamp": 1_700_000_000_000_i64,
            "message": {
                "mid": "m_1",
                "text": "hi",
                "attachments": [{"type": "image", "payload": {"url": "https://cdn.example/a.png"}}]
            }
        }))
        .unwrap();

        assert_eq!(event.sender.id, "user-1");
        match event.take_kind().unwrap() {
            EventKind::Message { message } => {
                assert_eq!(message.mid, "m_1");
                assert_eq!(message.text.as_deref(), Some("hi"));
                assert_eq!(message.attachments.len(), 1);
                assert_eq!(message.attachments[0].attachment_type, "image");
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_postback_event_is_classified_as_postback() {
        let mut event: MessagingEvent = serde_json::from_value(json!({
            "sender": {"id": "user-1"},
            "recipient": {"id": "page-1"},
            "timestamp": 1,
            "postback": {"payload": "BUY", "title": "Buy now"}
        }))
        .unwrap();

        assert!(matches!(
            event.take_kind().unwrap(),
            EventKind::Postback { postback } if postback.payload == "BUY"
        ));
    }

    #[test]
    fn test_other_events_are_unhandled() {
        let mut event: MessagingEvent = serde_json::from_value(json!({
            "sender": {"id": "user-1"},
            "recipient": {"id": "page-1"},
            "timestamp": 1,
            "read": {"watermark": 1}
        }))
        .unwrap();

        match event.take_kind().unwrap() {
            EventKind::Unhandled(keys) => assert_eq!(keys, vec!["read".to_string()]),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_event_kind_follows_the_key_present() {
        let mut event: MessagingEvent = serde_json::from_value(json!({
            "sender": {"id": "user-1"},
            "timestamp": 1,
            "message": {"text": "hi"}
        }))
        .unwrap();
        match event.take_kind().unwrap() {
            EventKind::Message { message } => {
                assert_eq!(message.mid, "");
                assert_eq!(message.text.as_deref(), Some("hi"));
            }
            other => panic!("unexpected kind {other:?}"),
        }

        let mut event: MessagingEvent = serde_json::from_value(json!({
            "sender": {"id": "user-1"},
            "timestamp": 1,
            "message": "not an object",
            "postback": {"payload": "BUY"}
        }))
        .unwrap();
        assert!(event.take_kind().is_err());
    }

    #[test]
    fn test_webhook_payload_shapes() {
        let payload = |value: serde_json::Value| match value {
            serde_json::Value::Object(body) => WebhookPayload::from(body),
            other => panic!("not an object: {other}"),
        };

        let page = payload(json!({"object": "page", "entry": [{"id": "1"}, {"id": "2"}]}));
        assert!(page.is_page());
        assert_eq!(page.entry_count(), 2);
        assert_eq!(page.into_entries().len(), 2);

        let null_entry = payload(json!({"object": "page", "entry": null}));
        assert!(null_entry.is_page());
        assert!(null_entry.into_entries().is_empty());

        let odd_object = payload(json!({"object": 5, "entry": {}}));
        assert!(!odd_object.is_page());
        assert_eq!(odd_object.object_name(), "5");
        assert_eq!(odd_object.entry_count(), 0);

        assert!(!payload(json!({})).is_page());
    }

    #[test]
    fn test_inbound_event_serializes_flat_camel_case_record() {
        let event = InboundEvent::Postback(PostbackReceived {
            payload: "BUY".into(),
            title: Some("Buy".into()),
            sender_id: "user-1".into(),
            page_id: "page-1".into(),
            timestamp: 42,
            channel: consts::CHANNEL_NAME,
        });

        assert_eq!(event.topic(), "postback.received");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "payload": "BUY",
                "title": "Buy",
                "senderId": "user-1",
                "pageId": "page-1",
                "timestamp": 42,
                "channel": "facebook"
            })
        );
    }

    #[test]
    fn test_webhook_status_serialization() {
        assert_eq!(
            serde_json::to_value(WebhookStatus::Processed).unwrap(),
            json!({"status": "processed"})
        );
        assert_eq!(
            serde_json::to_value(WebhookStatus::Ignored).unwrap(),
            json!({"status": "ignored"})
        );
    }
}
