//! # Messenger API Client
//!
//! Client for the Facebook Graph API used to send messages, sender actions
//! and to read user profiles. Every call is one-shot: no retry, no backoff.
//!
//! The page access token travels as the `access_token` query parameter, so
//! request urls are never logged.

use super::schemas::{
    AttachmentType, OutgoingMessage, QuickReply, SendMessageResponse, SenderAction,
    SenderActionRequest, UserProfile,
};
use crate::{config::AppConfig, consts, errors::ChannelError, metric};
use anyhow::Context;

/// Graph API client bound to one page access token
#[derive(Clone)]
pub struct MessengerClient {
    /// HTTP client for making API requests
    client: reqwest::Client,
    /// Graph API base url, e.g. https://graph.facebook.com/v22.0
    graph_api_url: reqwest::Url,
    /// Page access token, `None` when not configured
    access_token: Option<String>,
}

impl MessengerClient {
    /// Creates a new client. A blank access token counts as missing.
    pub fn new(graph_api_url: &str, access_token: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(consts::GRAPH_API_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(
                consts::GRAPH_API_MAX_REDIRECTS,
            ))
            .build()
            .context("failed to build Graph API http client")?;

        let graph_api_url = reqwest::Url::parse(graph_api_url)
            .with_context(|| format!("invalid Graph API url: {graph_api_url}"))?;

        Ok(Self {
            client,
            graph_api_url,
            access_token: access_token.filter(|token| !token.trim().is_empty()),
        })
    }

    /// Creates a client from the application configuration
    pub fn from_config(app_config: &AppConfig) -> anyhow::Result<Self> {
        Self::new(
            app_config.graph_api_base_url(),
            app_config.fb_page_access_token.clone(),
        )
    }

    /// Sends a plain text message
    pub async fn send_text_message(
        &self,
        recipient_id: &str,
        text: &str,
    ) -> Result<SendMessageResponse, ChannelError> {
        self.send_message(&OutgoingMessage::text(recipient_id, text))
            .await
    }

    /// Sends a text message with quick reply buttons
    ///
    /// # Arguments
    /// * `recipient_id` - Page scoped ID of the user
    /// * `text` - Message text shown above the buttons
    /// * `replies` - `(title, payload)` pairs, one per button
    pub async fn send_quick_replies(
        &self,
        recipient_id: &str,
        text: &str,
        replies: Vec<(String, String)>,
    ) -> Result<SendMessageResponse, ChannelError> {
        let replies = replies
            .into_iter()
            .map(|(title, payload)| QuickReply::text(title, payload))
            .collect();

        self.send_message(&OutgoingMessage::quick_replies(recipient_id, text, replies))
            .await
    }

    /// Sends an image, audio, video or file available at `url`
    pub async fn send_attachment(
        &self,
        recipient_id: &str,
        attachment_type: AttachmentType,
        url: &str,
    ) -> Result<SendMessageResponse, ChannelError> {
        self.send_message(&OutgoingMessage::attachment(
            recipient_id,
            attachment_type,
            url,
        ))
        .await
    }

    /// Sends any message to the Send API
    pub async fn send_message(
        &self,
        message: &OutgoingMessage,
    ) -> Result<SendMessageResponse, ChannelError> {
        let access_token = self.access_token()?;
        let endpoint = self.endpoint(&["me", "messages"])?;

        logfire::info!(
            "Sending message to {recipient_id}",
            recipient_id = message.recipient.id.clone()
        );

        let result = async {
            let response = self
                .client
                .post(endpoint)
                .query(&[("access_token", access_token)])
                .json(message)
                .send()
                .await
                .map_err(connection_error)?;

            check_status(response)
                .await?
                .json::<SendMessageResponse>()
                .await
                .map_err(connection_error)
        }
        .await;

        match &result {
            Ok(sent) => {
                metric::incr_outbound_statds("send_message", "ok");
                logfire::info!(
                    "Message sent, id: {message_id}",
                    message_id = sent.message_id.clone().unwrap_or_default()
                );
            }
            Err(e) => {
                metric::incr_outbound_statds("send_message", "error");
                logfire::error!("Failed to send message: {error}", error = e.to_string());
            }
        }

        result
    }

    /// Marks the last message from the user as seen.
    ///
    /// Graph API failures are logged and not returned, only a missing access
    /// token fails.
    pub async fn mark_as_read(&self, recipient_id: &str) -> Result<(), ChannelError> {
        self.send_sender_action(recipient_id, SenderAction::MarkSeen)
            .await
    }

    /// Shows the typing bubble to the user, same failure policy as
    /// [`MessengerClient::mark_as_read`]
    pub async fn send_typing_indicator(&self, recipient_id: &str) -> Result<(), ChannelError> {
        self.send_sender_action(recipient_id, SenderAction::TypingOn)
            .await
    }

    async fn send_sender_action(
        &self,
        recipient_id: &str,
        sender_action: SenderAction,
    ) -> Result<(), ChannelError> {
        let access_token = self.access_token()?;
        let endpoint = self.endpoint(&["me", "messages"])?;
        let request = SenderActionRequest::new(recipient_id, sender_action);

        let result = async {
            let response = self
                .client
                .post(endpoint)
                .query(&[("access_token", access_token)])
                .json(&request)
                .send()
                .await
                .map_err(connection_error)?;

            check_status(response).await.map(|_| ())
        }
        .await;

        match result {
            Ok(()) => {
                metric::incr_outbound_statds(sender_action.as_str(), "ok");
                logfire::info!(
                    "Sender action {action} sent to {recipient_id}",
                    action = sender_action.as_str(),
                    recipient_id = recipient_id.to_string()
                );
            }
            Err(e) => {
                metric::incr_outbound_statds(sender_action.as_str(), "error");
                logfire::error!(
                    "Failed to send sender action {action}: {error}",
                    action = sender_action.as_str(),
                    error = e.to_string()
                );
            }
        }

        Ok(())
    }

    /// Fetches the public profile of a user
    pub async fn get_user_profile(&self, user_id: &str) -> Result<UserProfile, ChannelError> {
        let access_token = self.access_token()?;
        let endpoint = self.endpoint(&[user_id])?;

        let result = async {
            let response = self
                .client
                .get(endpoint)
                .query(&[
                    ("fields", consts::USER_PROFILE_FIELDS),
                    ("access_token", access_token),
                ])
                .send()
                .await
                .map_err(connection_error)?;

            check_status(response)
                .await?
                .json::<UserProfile>()
                .await
                .map_err(connection_error)
        }
        .await;

        match &result {
            Ok(profile) => {
                metric::incr_outbound_statds("get_user_profile", "ok");
                logfire::info!(
                    "Profile fetched for {user_id}: {first_name} {last_name}",
                    user_id = user_id.to_string(),
                    first_name = profile.first_name.clone().unwrap_or_default(),
                    last_name = profile.last_name.clone().unwrap_or_default()
                );
            }
            Err(e) => {
                metric::incr_outbound_statds("get_user_profile", "error");
                logfire::error!(
                    "Failed to fetch user profile: {error}",
                    error = e.to_string()
                );
            }
        }

        result
    }

    fn access_token(&self) -> Result<&str, ChannelError> {
        self.access_token.as_deref().ok_or_else(|| {
            ChannelError::Configuration("FB_PAGE_ACCESS_TOKEN is not configured".to_string())
        })
    }

    /// Appends path segments (percent-encoded) to the Graph API base url
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, ChannelError> {
        let mut url = self.graph_api_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ChannelError::Configuration("GRAPH_API_URL can't be used as a base url".to_string())
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}

/// Maps transport errors, dropping the url so the access token never leaks
fn connection_error(err: reqwest::Error) -> ChannelError {
    ChannelError::Connection(err.without_url().to_string())
}

/// Turns a non 2xx response into [`ChannelError::Upstream`] carrying the
/// Graph API error body
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ChannelError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    let body = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));

    Err(ChannelError::Upstream { status, body })
}
