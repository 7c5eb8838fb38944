use std::time::Duration;

pub const SERVICE_NAME: &str = "channel-facebook";
pub const API_PREFIX: &str = "/api/v1";

/// Channel name attached to every published inbound event
pub const CHANNEL_NAME: &str = "facebook";
pub const PAGE_OBJECT: &str = "page";
pub const SUBSCRIBE_MODE: &str = "subscribe";

pub const TOPIC_MESSAGE_RECEIVED: &str = "message.received";
pub const TOPIC_POSTBACK_RECEIVED: &str = "postback.received";

pub const USER_PROFILE_FIELDS: &str = "first_name,last_name,profile_pic,locale,timezone";

pub const GRAPH_API_TIMEOUT: Duration = Duration::from_secs(10);
pub const GRAPH_API_MAX_REDIRECTS: usize = 3;

pub const TEST_MESSAGE_TYPING_DELAY_MS: u32 = 1_500;
pub const TEST_MESSAGE_TEXT: &str = "Hi! This is a test message from the Facebook channel 🚀";
