//! Outbound messaging endpoints, thin wrappers over [`MessengerClient`]
//!
//! [`MessengerClient`]: super::client::MessengerClient

use super::{requests, schemas::OutgoingMessage};
use crate::{consts, state::AppState, utils};
use ntex::{util::Bytes, web};
use serde_json::json;

#[web::post("/text")]
pub async fn send_text(
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let request: requests::SendTextRequest = utils::parse_json_body(&body)?;
    request.validate()?;

    let mut message = OutgoingMessage::text(&request.recipient_id, &request.text);
    if let Some(tag) = request.tag.as_deref().filter(|tag| !tag.is_empty()) {
        message = message.with_tag(tag);
    }

    let sent = app_state.messenger.send_message(&message).await?;

    Ok(web::HttpResponse::Ok().json(&json!({
        "success": true,
        "messageId": sent.message_id,
        "recipientId": sent.recipient_id.unwrap_or(request.recipient_id),
    })))
}

#[web::post("/quick-reply")]
pub async fn send_quick_reply(
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let request: requests::SendQuickReplyRequest = utils::parse_json_body(&body)?;
    let (recipient_id, text, replies) = request.validate()?;

    let sent = app_state
        .messenger
        .send_quick_replies(&recipient_id, &text, replies)
        .await?;

    Ok(web::HttpResponse::Ok().json(&json!({
        "success": true,
        "messageId": sent.message_id,
        "recipientId": sent.recipient_id.unwrap_or(recipient_id),
    })))
}

#[web::post("/attachment")]
pub async fn send_attachment(
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let request: requests::SendAttachmentRequest = utils::parse_json_body(&body)?;
    let attachment_type = request.validate()?;

    let sent = app_state
        .messenger
        .send_attachment(&request.recipient_id, attachment_type, &request.url)
        .await?;

    Ok(web::HttpResponse::Ok().json(&json!({
        "success": true,
        "messageId": sent.message_id,
        "recipientId": sent.recipient_id.unwrap_or(request.recipient_id),
    })))
}

/// Succeeds even when the Graph API rejects the action
#[web::post("/mark-read/{user_id}")]
pub async fn mark_as_read(
    path: web::types::Path<(String,)>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let user_id = path.0.to_string();
    app_state.messenger.mark_as_read(&user_id).await?;

    Ok(web::HttpResponse::Ok().json(&json!({
        "success": true,
        "action": "marked_as_read",
        "userId": user_id,
    })))
}

#[web::post("/typing/{user_id}")]
pub async fn send_typing_indicator(
    path: web::types::Path<(String,)>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let user_id = path.0.to_string();
    app_state.messenger.send_typing_indicator(&user_id).await?;

    Ok(web::HttpResponse::Ok().json(&json!({
        "success": true,
        "action": "typing_indicator_sent",
        "userId": user_id,
    })))
}

#[web::get("/user/{user_id}")]
pub async fn get_user_profile(
    path: web::types::Path<(String,)>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let profile = app_state.messenger.get_user_profile(&path.0).await?;

    Ok(web::HttpResponse::Ok().json(&json!({
        "success": true,
        "profile": profile,
    })))
}

/// Development helper: shows the typing bubble, waits, then sends a canned
/// text to `userId`
#[web::post("/test")]
pub async fn send_test_message(
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let request: requests::TestMessageRequest = utils::parse_json_body(&body)?;
    request.validate()?;

    app_state
        .messenger
        .send_typing_indicator(&request.user_id)
        .await?;
    ntex::time::sleep(ntex::time::Millis(consts::TEST_MESSAGE_TYPING_DELAY_MS)).await;

    let sent = app_state
        .messenger
        .send_text_message(&request.user_id, consts::TEST_MESSAGE_TEXT)
        .await?;

    Ok(web::HttpResponse::Ok().json(&json!({
        "success": true,
        "messageId": sent.message_id,
        "message": "Test message sent successfully",
    })))
}
