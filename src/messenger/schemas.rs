//! # Messenger Send API Schemas
//!
//! Request bodies sent to the Graph API `me/messages` endpoint and the
//! responses read back from it.

use serde::{Deserialize, Serialize};

/// Message recipient, a page scoped user ID
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipient {
    pub id: String,
}

impl Recipient {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessagingType {
    #[default]
    Response,
    Update,
    MessageTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    Image,
    Audio,
    Video,
    File,
}

/// Message content, exactly one shape per message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text {
        text: String,
    },
    QuickReplies {
        text: String,
        quick_replies: Vec<QuickReply>,
    },
    Attachment {
        attachment: OutgoingAttachment,
    },
}

/// Quick reply button
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickReply {
    /// Always "text" for title/payload replies
    pub content_type: String,
    pub title: String,
    pub payload: String,
}

impl QuickReply {
    pub fn text(title: String, payload: String) -> Self {
        Self {
            content_type: "text".to_string(),
            title,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingAttachment {
    #[serde(rename = "type")]
    pub attachment_type: AttachmentType,
    pub payload: OutgoingAttachmentPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingAttachmentPayload {
    pub url: String,
    pub is_reusable: bool,
}

/// Body of a Send API message request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub recipient: Recipient,
    pub message: MessageContent,
    pub messaging_type: MessagingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl OutgoingMessage {
    fn new(recipient_id: &str, message: MessageContent) -> Self {
        Self {
            recipient: Recipient::new(recipient_id),
            message,
            messaging_type: MessagingType::Response,
            tag: None,
        }
    }

    /// Creates a plain text message
    pub fn text(recipient_id: &str, text: &str) -> Self {
        Self::new(
            recipient_id,
            MessageContent::Text {
                text: text.to_string(),
            },
        )
    }

    /// Creates a text message with quick reply buttons
    pub fn quick_replies(recipient_id: &str, text: &str, replies: Vec<QuickReply>) -> Self {
        Self::new(
            recipient_id,
            MessageContent::QuickReplies {
                text: text.to_string(),
                quick_replies: replies,
            },
        )
    }

    /// Creates a reusable attachment message from a public url
    pub fn attachment(recipient_id: &str, attachment_type: AttachmentType, url: &str) -> Self {
        Self::new(
            recipient_id,
            MessageContent::Attachment {
                attachment: OutgoingAttachment {
                    attachment_type,
                    payload: OutgoingAttachmentPayload {
                        url: url.to_string(),
                        is_reusable: true,
                    },
                },
            },
        )
    }

    /// Sends the message outside the standard messaging window with a tag
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.messaging_type = MessagingType::MessageTag;
        self.tag = Some(tag.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderAction {
    MarkSeen,
    TypingOn,
}

impl SenderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderAction::MarkSeen => "mark_seen",
            SenderAction::TypingOn => "typing_on",
        }
    }
}

/// Body of a Send API sender action request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SenderActionRequest {
    pub recipient: Recipient,
    pub sender_action: SenderAction,
}

impl SenderActionRequest {
    pub fn new(recipient_id: &str, sender_action: SenderAction) -> Self {
        Self {
            recipient: Recipient::new(recipient_id),
            sender_action,
        }
    }
}

/// Response from the Send API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
}

/// User profile fields returned by the Graph API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    /// UTC offset in hours
    #[serde(default)]
    pub timezone: Option<f64>,
}
