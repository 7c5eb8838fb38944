use crate::{config::AppConfig, messenger::client::MessengerClient, services};

/// Per worker application state
pub struct AppState {
    pub config: AppConfig,
    pub messenger: MessengerClient,
    pub publisher: services::ImplEventPublisher,
}
