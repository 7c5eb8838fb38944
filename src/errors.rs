use derive_more::{Display, Error};
use ntex::{http, web};
use serde_json::json;

#[derive(Debug, Display, Error)]
pub enum ChannelError {
    /// Missing or invalid configuration, never retried
    #[display("configuration error: {_0}")]
    Configuration(#[error(not(source))] String),
    /// Request rejected before any side effect
    #[display("invalid request: {_0}")]
    Validation(#[error(not(source))] String),
    /// Graph API answered with a non 2xx status
    #[display("Facebook API returned error status {status}: {body}")]
    Upstream {
        status: u16,
        body: serde_json::Value,
    },
    /// Transport failure, timeout or undecodable Graph API response
    #[display("error connecting to the Facebook API: {_0}")]
    Connection(#[error(not(source))] String),
    #[display("invalid verification token")]
    Unauthorized,
}

impl ChannelError {
    fn public_message(&self) -> String {
        match self {
            ChannelError::Configuration(msg) | ChannelError::Validation(msg) => msg.clone(),
            ChannelError::Upstream { .. } => "error sending request to Facebook".to_string(),
            ChannelError::Connection(_) => "error connecting to the Facebook API".to_string(),
            ChannelError::Unauthorized => self.to_string(),
        }
    }
}

impl web::error::WebResponseError for ChannelError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        match self {
            ChannelError::Configuration(_) => {
                logfire::error!("{error}", error = self.to_string());
            }
            _ => {
                logfire::warn!("{error}", error = self.to_string());
            }
        }

        let status = self.status_code();
        let mut body = json!({
            "statusCode": status.as_u16(),
            "message": self.public_message(),
        });
        if let ChannelError::Upstream { body: upstream, .. } = self {
            body["error"] = upstream.clone();
        }

        web::HttpResponse::build(status).json(&body)
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            ChannelError::Configuration(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
            ChannelError::Unauthorized => http::StatusCode::UNAUTHORIZED,
            ChannelError::Validation(_)
            | ChannelError::Upstream { .. }
            | ChannelError::Connection(_) => http::StatusCode::BAD_REQUEST,
        }
    }
}
