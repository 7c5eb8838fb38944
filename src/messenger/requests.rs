//! Bodies accepted by the `/messages` endpoints.
//!
//! Fields default to empty values so a missing field is reported by
//! `validate` with the names of every required field.

use super::schemas::AttachmentType;
use crate::{errors::ChannelError, utils};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTextRequest {
    #[serde(default)]
    pub recipient_id: String,
    #[serde(default)]
    pub text: String,
    /// Message tag, sends outside the 24 hour window when set
    #[serde(default)]
    pub tag: Option<String>,
}

impl SendTextRequest {
    pub fn validate(&self) -> Result<(), ChannelError> {
        utils::require_fields(&[
            ("recipientId", self.recipient_id.as_str()),
            ("text", self.text.as_str()),
        ])
    }
}

#[derive(Debug, Deserialize)]
pub struct QuickReplyOption {
    pub title: String,
    pub payload: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendQuickReplyRequest {
    #[serde(default)]
    pub recipient_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub quick_replies: Option<Vec<QuickReplyOption>>,
}

impl SendQuickReplyRequest {
    /// Validates the request and returns the `(title, payload)` pairs
    pub fn validate(self) -> Result<(String, String, Vec<(String, String)>), ChannelError> {
        let required = || {
            ChannelError::Validation("recipientId, text, quickReplies are required".to_string())
        };

        utils::require_fields(&[
            ("recipientId", self.recipient_id.as_str()),
            ("text", self.text.as_str()),
        ])
            .map_err(|_| required())?;
        let quick_replies = self.quick_replies.ok_or_else(required)?;

        Ok((
            self.recipient_id,
            self.text,
            quick_replies
                .into_iter()
                .map(|reply| (reply.title, reply.payload))
                .collect(),
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAttachmentRequest {
    #[serde(default)]
    pub recipient_id: String,
    #[serde(rename = "type", default)]
    pub attachment_type: Option<AttachmentType>,
    #[serde(default)]
    pub url: String,
}

impl SendAttachmentRequest {
    pub fn validate(&self) -> Result<AttachmentType, ChannelError> {
        let required =
            || ChannelError::Validation("recipientId, type, url are required".to_string());

        utils::require_fields(&[
            ("recipientId", self.recipient_id.as_str()),
            ("url", self.url.as_str()),
        ])
            .map_err(|_| required())?;

        self.attachment_type.ok_or_else(required)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestMessageRequest {
    #[serde(default)]
    pub user_id: String,
}

impl TestMessageRequest {
    pub fn validate(&self) -> Result<(), ChannelError> {
        utils::require_fields(&[("userId", self.user_id.as_str())])
    }
}
