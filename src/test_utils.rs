//! Fixtures shared by route tests

use crate::{config::AppConfig, messenger::client::MessengerClient, services, state::AppState};
use envconfig::Envconfig;
use std::collections::HashMap;

pub const VERIFY_TOKEN: &str = "verify-me";

/// Config for a local deployment with no page access token
pub fn app_config() -> AppConfig {
    let env = HashMap::from([
        ("FB_VERIFY_TOKEN".to_string(), VERIFY_TOKEN.to_string()),
        (
            "GRAPH_API_URL".to_string(),
            "https://graph.facebook.com/v22.0".to_string(),
        ),
    ]);

    AppConfig::init_from_hashmap(&env).unwrap()
}

/// Builds state around `publisher`. Without a `messenger`, every Graph API
/// call fails with a configuration error.
pub fn app_state(
    publisher: services::ImplEventPublisher,
    messenger: Option<MessengerClient>,
) -> AppState {
    let messenger =
        messenger.unwrap_or_else(|| MessengerClient::new("http://127.0.0.1:9", None).unwrap());

    AppState {
        config: app_config(),
        messenger,
        publisher,
    }
}
