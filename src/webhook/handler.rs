//! # Messenger Webhook Handler
//!
//! Verifies subscription requests and walks incoming notifications
//! (entry → messaging event → message/postback), publishing one record per
//! classified event. A failing entry, event or publish is logged and the
//! walk continues.

use super::schemas::{
    Entry, EventKind, InboundEvent, MessageReceived, MessagingEvent, PostbackReceived,
    VerificationRequest, WebhookPayload, WebhookStatus,
};
use crate::{consts, errors::ChannelError, metric, services, utils};
use subtle::ConstantTimeEq;

/// Checks a subscription verification request.
///
/// Returns the challenge to echo back when the mode is `subscribe` and the
/// token matches the configured one.
pub fn verify_webhook(
    request: &VerificationRequest,
    expected_token: &str,
) -> Result<String, ChannelError> {
    let token_matches: bool = request
        .verify_token
        .as_bytes()
        .ct_eq(expected_token.as_bytes())
        .into();

    if request.mode == consts::SUBSCRIBE_MODE && token_matches {
        logfire::info!("Webhook verified");
        return Ok(request.challenge.clone());
    }

    logfire::warn!(
        "Webhook verification rejected: mode={mode}",
        mode = request.mode.clone()
    );
    Err(ChannelError::Unauthorized)
}

/// Processes a complete webhook delivery.
///
/// Deliveries for objects other than `page` are ignored.
pub async fn process_incoming_message(
    payload: WebhookPayload,
    publisher: &services::ImplEventPublisher,
) -> WebhookStatus {
    if !payload.is_page() {
        logfire::warn!(
            "Ignoring webhook for object {object}",
            object = payload.object_name()
        );
        return WebhookStatus::Ignored;
    }

    if !payload.entry.as_ref().is_some_and(serde_json::Value::is_array) {
        logfire::warn!("Page webhook without an entry list");
    }

    for raw_entry in payload.into_entries() {
        match serde_json::from_value::<Entry>(raw_entry) {
            Ok(entry) => process_page_entry(entry, publisher).await,
            Err(e) => {
                logfire::warn!("Skipping malformed entry: {error}", error = e.to_string());
            }
        }
    }

    WebhookStatus::Processed
}

async fn process_page_entry(entry: Entry, publisher: &services::ImplEventPublisher) {
    logfire::info!(
        "Processing page entry {page_id} at {time}",
        page_id = entry.id.clone(),
        time = entry
            .time
            .map(utils::millis_to_rfc3339)
            .unwrap_or_else(|| "unknown time".to_string())
    );

    for raw_event in entry.messaging {
        let event = match serde_json::from_value::<MessagingEvent>(raw_event) {
            Ok(event) => event,
            Err(e) => {
                logfire::warn!(
                    "Skipping malformed messaging event: {error}",
                    error = e.to_string()
                );
                continue;
            }
        };

        match classify_event(event, &entry.id) {
            Ok(Some(inbound)) => publish_event(&inbound, publisher).await,
            Ok(None) => {}
            Err(e) => {
                logfire::warn!(
                    "Skipping undecodable messaging event: {error}",
                    error = e.to_string()
                );
            }
        }
    }
}

/// Turns a decoded messaging event into the record to publish.
///
/// Returns `None` for event kinds this channel doesn't relay, and an error
/// when the `message` or `postback` body can't be decoded.
pub fn classify_event(
    mut event: MessagingEvent,
    page_id: &str,
) -> Result<Option<InboundEvent>, serde_json::Error> {
    logfire::info!(
        "Messaging event from {sender} to {recipient} at {timestamp}",
        sender = event.sender.id.clone(),
        recipient = event
            .recipient
            .as_ref()
            .map(|recipient| recipient.id.clone())
            .unwrap_or_default(),
        timestamp = utils::millis_to_rfc3339(event.timestamp)
    );

    let inbound = match event.take_kind()? {
        EventKind::Message { message } => {
            logfire::info!(
                "Message {mid} received with {attachments} attachments",
                mid = message.mid.clone(),
                attachments = message.attachments.len() as i64
            );
            for (index, attachment) in message.attachments.iter().enumerate() {
                logfire::debug!(
                    "Attachment {position}: type={attachment_type} url={url}",
                    position = (index + 1) as i64,
                    attachment_type = attachment.attachment_type.clone(),
                    url = attachment
                        .payload
                        .as_ref()
                        .and_then(|payload| payload.url.clone())
                        .unwrap_or_else(|| "N/A".to_string())
                );
            }

            Some(InboundEvent::Message(MessageReceived {
                message_id: message.mid,
                sender_id: event.sender.id,
                page_id: page_id.to_string(),
                text: message.text,
                attachments: message.attachments,
                timestamp: event.timestamp,
                channel: consts::CHANNEL_NAME,
            }))
        }
        EventKind::Postback { postback } => {
            logfire::info!(
                "Postback received: payload={payload}",
                payload = postback.payload.clone()
            );

            Some(InboundEvent::Postback(PostbackReceived {
                payload: postback.payload,
                title: postback.title,
                sender_id: event.sender.id,
                page_id: page_id.to_string(),
                timestamp: event.timestamp,
                channel: consts::CHANNEL_NAME,
            }))
        }
        EventKind::Unhandled(keys) => {
            logfire::debug!(
                "Unhandled messaging event with keys: {keys}",
                keys = keys.join(",")
            );
            None
        }
    };

    Ok(inbound)
}

async fn publish_event(event: &InboundEvent, publisher: &services::ImplEventPublisher) {
    match publisher.publish(event.topic(), event).await {
        Ok(ack) => {
            metric::incr_inbound_event_statds(event.topic());
            logfire::info!(
                "Published {topic} for sender {sender} (ack {ack})",
                topic = event.topic(),
                sender = event.sender_id().to_string(),
                ack = ack.id.to_string()
            );
        }
        Err(e) => {
            logfire::error!(
                "Failed to publish {topic}: {error}",
                topic = event.topic(),
                error = e.to_string()
            );
        }
    }
}
