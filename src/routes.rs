//! Route configuration.
//!
//! Every route lives under the global `/api/v1` prefix.

use crate::{consts, messenger, webhook};
use ntex::web;

/// Configures webhook routes.
///
/// These routes are public endpoints called by Facebook, they don't require
/// authentication beyond the verify token.
///
/// # Routes
/// - `GET /api/v1/webhook` - Subscription verification
/// - `POST /api/v1/webhook` - Notification receiver
/// - `GET /api/v1/webhook/health` - Health check
pub fn webhook(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(format!("{}/webhook", consts::API_PREFIX).as_str()).service((
            webhook::routes::verify,
            webhook::routes::receive,
            webhook::routes::health,
        )),
    );
}

/// Configures outbound messaging routes.
///
/// # Routes
/// - `POST /api/v1/messages/text` - Send a text message
/// - `POST /api/v1/messages/quick-reply` - Send a message with quick replies
/// - `POST /api/v1/messages/attachment` - Send an attachment
/// - `POST /api/v1/messages/mark-read/{user_id}` - Mark as seen
/// - `POST /api/v1/messages/typing/{user_id}` - Show typing indicator
/// - `GET /api/v1/messages/user/{user_id}` - Fetch a user profile
/// - `POST /api/v1/messages/test` - Send a canned message, only outside production
pub fn messages(cfg: &mut web::ServiceConfig, with_test_endpoint: bool) {
    let mut scope = web::scope(format!("{}/messages", consts::API_PREFIX).as_str()).service((
        messenger::routes::send_text,
        messenger::routes::send_quick_reply,
        messenger::routes::send_attachment,
        messenger::routes::mark_as_read,
        messenger::routes::send_typing_indicator,
        messenger::routes::get_user_profile,
    ));

    if with_test_endpoint {
        scope = scope.service(messenger::routes::send_test_message);
    }

    cfg.service(scope);
}
