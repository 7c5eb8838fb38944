//! # Facebook Channel
//!
//! Relay between Facebook Messenger and the internal messaging pipeline.
//! Receives page webhooks, publishes each inbound message and postback, and
//! exposes endpoints to send messages through the Graph API.

#![recursion_limit = "256"]

pub mod config;
pub mod consts;
pub mod errors;
pub mod messenger;
pub mod metric;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
pub mod webhook;

#[cfg(test)]
mod test_utils;

use logfire::config::{MetricsOptions, SendToLogfire};
use ntex::web;
use ntex_cors::Cors;
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::init_config()?;

    // Logs are always printed, exported only when a token is configured
    let mut logfire_config = logfire::configure()
        .install_panic_handler()
        .with_metrics(Some(MetricsOptions::default()))
        .send_to_logfire(SendToLogfire::IfTokenPresent);
    if let Some(token) = &app_config.logfire_token {
        logfire_config = logfire_config.with_token(token);
    }
    let shutdown_handler = logfire_config.finish()?;

    let messenger = messenger::client::MessengerClient::from_config(&app_config)?;
    let publisher = services::publisher::LogPublisher::new(&app_config);

    if app_config.fb_page_access_token.is_none() {
        logfire::warn!("FB_PAGE_ACCESS_TOKEN is not set, outbound messages will fail");
    }

    configure_and_run_server(app_config, messenger, publisher).await?;

    shutdown_handler.shutdown()?;

    Ok(())
}

/// Configures SSL acceptor from the certificate and private key files
fn setup_ssl_acceptor(
    certificate_path: &str,
    private_key_path: &str,
) -> anyhow::Result<openssl::ssl::SslAcceptorBuilder> {
    let mut ssl_acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls_server())
        .map_err(|e| anyhow::anyhow!("Failed to create SSL acceptor: {}", e))?;

    ssl_acceptor
        .set_private_key_file(private_key_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load private key from {}: {}",
                private_key_path,
                e
            )
        })?;

    ssl_acceptor
        .set_certificate_file(certificate_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load certificate from {}: {}",
                certificate_path,
                e
            )
        })?;

    Ok(ssl_acceptor)
}

/// Configures and starts the web server, over HTTPS when TLS paths are set
async fn configure_and_run_server(
    app_config: config::AppConfig,
    messenger: messenger::client::MessengerClient,
    publisher: services::publisher::LogPublisher,
) -> anyhow::Result<()> {
    let server_addr = ("0.0.0.0", app_config.port);
    let with_test_endpoint = !app_config.is_prod();
    let tls_paths = app_config
        .tls_paths()
        .map(|(cert, key)| (cert.to_string(), key.to_string()));

    logfire::info!(
        "Starting {service} on port {port} (env: {env})",
        service = consts::SERVICE_NAME,
        port = app_config.port as i64,
        env = app_config.env.clone()
    );

    let server = web::server(move || {
        web::App::new()
            .wrap(
                Cors::new()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .finish(),
            )
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(state::AppState {
                config: app_config.clone(),
                messenger: messenger.clone(),
                publisher: Box::new(publisher.clone()),
            })
            .configure(routes::webhook)
            .configure(move |cfg| routes::messages(cfg, with_test_endpoint))
    });

    let bound_server = match tls_paths {
        Some((certificate_path, private_key_path)) => {
            let ssl_acceptor = setup_ssl_acceptor(&certificate_path, &private_key_path)?;
            server.bind_openssl(server_addr, ssl_acceptor)?
        }
        None => server.bind(server_addr)?,
    };

    bound_server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
