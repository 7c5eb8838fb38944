//! Messenger webhook endpoint handlers
//!
//! Implements both the verification endpoint (GET) and the notification
//! receiver (POST), plus a health check.

use super::{handler, schemas};
use crate::{consts, state::AppState, utils};
use ntex::{util::Bytes, web};
use serde_json::json;
use tracing::Instrument;

/// Webhook verification endpoint (GET)
///
/// Facebook sends a GET request to verify the webhook URL.
///
/// # Query Parameters
/// - `hub.mode` - Should be "subscribe"
/// - `hub.verify_token` - Token configured in the Facebook app dashboard
/// - `hub.challenge` - Challenge string to echo back
///
/// # Returns
/// - 200 with the challenge string if verification succeeds
/// - 401 if verification fails
#[web::get("")]
pub async fn verify(
    query: web::types::Query<schemas::VerificationRequest>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let challenge = handler::verify_webhook(&query, &app_state.config.fb_verify_token)?;

    Ok(web::HttpResponse::Ok()
        .content_type("text/plain")
        .body(challenge))
}

/// Webhook receiver endpoint (POST)
///
/// Decomposes the notification and publishes every message and postback.
/// Processed synchronously, Facebook gives us 20 seconds to respond.
#[web::post("")]
pub async fn receive(
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let body: serde_json::Map<String, serde_json::Value> = utils::parse_json_body(&body)?;
    let payload = schemas::WebhookPayload::from(body);

    logfire::info!(
        "Webhook received: object={object}, entries={entries}",
        object = payload.object_name(),
        entries = payload.entry_count() as i64
    );

    let status = handler::process_incoming_message(payload, &app_state.publisher)
        .instrument(logfire::span!("facebook_webhook"))
        .await;

    Ok(web::HttpResponse::Ok().json(&status))
}

#[web::get("/health")]
pub async fn health() -> Result<impl web::Responder, web::Error> {
    Ok(web::HttpResponse::Ok().json(&json!({
        "status": "ok",
        "service": consts::SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

#[cfg(test)]
mod tests {
    use crate::{
        routes,
        services::{Ack, MockEventPublisher},
        state::AppState,
        test_utils,
    };
    use ntex::{http, web, web::test};
    use serde_json::json;

    fn app_state(publisher: MockEventPublisher) -> AppState {
        test_utils::app_state(Box::new(publisher), None)
    }

    #[ntex::test]
    async fn test_verify_returns_challenge() {
        let app = test::init_service(
            web::App::new()
                .state(app_state(MockEventPublisher::new()))
                .configure(routes::webhook),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/webhook?hub.mode=subscribe&hub.challenge=1158201444&hub.verify_token=verify-me")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(
            test::read_body(resp).await,
            ntex::util::Bytes::from_static(b"1158201444")
        );
    }

    #[ntex::test]
    async fn test_verify_rejects_bad_token() {
        let app = test::init_service(
            web::App::new()
                .state(app_state(MockEventPublisher::new()))
                .configure(routes::webhook),
        )
        .await;

        for uri in [
            "/api/v1/webhook?hub.mode=subscribe&hub.challenge=abc&hub.verify_token=nope",
            "/api/v1/webhook?hub.mode=unsubscribe&hub.challenge=abc&hub.verify_token=verify-me",
            "/api/v1/webhook",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), http::StatusCode::UNAUTHORIZED);
            let body: serde_json::Value =
                serde_json::from_slice(&test::read_body(resp).await).unwrap();
            assert_eq!(body["message"], "invalid verification token");
        }
    }

    #[ntex::test]
    async fn test_receive_processes_page_events() {
        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .withf(|topic, _| topic == "message.received")
            .times(1)
            .returning(|_, _| {
                Ok(Ack {
                    id: uuid::Uuid::new_v4(),
                })
            });

        let app = test::init_service(
            web::App::new()
                .state(app_state(publisher))
                .configure(routes::webhook),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/webhook")
            .header("content-type", "application/json")
            .set_payload(
                json!({
                    "object": "page",
                    "entry": [{
                        "id": "page-1",
                        "time": 1_700_000_000_000_i64,
                        "messaging": [{
                            "sender": {"id": "user-1"},
                            "recipient": {"id": "page-1"},
                            "timestamp": 1_700_000_000_000_i64,
                            "message": {"mid": "m_1", "text": "hi"}
                        }]
                    }]
                })
                .to_string(),
            )
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body, json!({"status": "processed"}));
    }

    #[ntex::test]
    async fn test_receive_ignores_other_objects() {
        let app = test::init_service(
            web::App::new()
                .state(app_state(MockEventPublisher::new()))
                .configure(routes::webhook),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/webhook")
            .set_payload(json!({"object": "user", "entry": []}).to_string())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body, json!({"status": "ignored"}));
    }

    #[ntex::test]
    async fn test_receive_tolerates_unexpected_shapes() {
        let app = test::init_service(
            web::App::new()
                .state(app_state(MockEventPublisher::new()))
                .configure(routes::webhook),
        )
        .await;

        for (payload, status) in [
            (json!({"object": "instagram", "entry": {}}), "ignored"),
            (json!({"object": 5}), "ignored"),
            (json!({"object": "page", "entry": null}), "processed"),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/v1/webhook")
                .set_payload(payload.to_string())
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), http::StatusCode::OK);
            let body: serde_json::Value =
                serde_json::from_slice(&test::read_body(resp).await).unwrap();
            assert_eq!(body, json!({"status": status}));
        }
    }

    #[ntex::test]
    async fn test_receive_rejects_invalid_json() {
        let app = test::init_service(
            web::App::new()
                .state(app_state(MockEventPublisher::new()))
                .configure(routes::webhook),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/webhook")
            .set_payload("not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/v1/webhook")
            .set_payload(r#"["page", []]"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
    }

    #[ntex::test]
    async fn test_health() {
        let app = test::init_service(
            web::App::new()
                .state(app_state(MockEventPublisher::new()))
                .configure(routes::webhook),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/webhook/health")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "channel-facebook");
        assert!(
            chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok()
        );
    }
}
