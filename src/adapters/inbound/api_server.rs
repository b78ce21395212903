//! Custom Domain API Server
//!
//! HTTP entry point for provisioning: accepts a subdomain, runs the
//! provisioning workflow and returns the combined outcome.

use crate::application::DomainProvisioner;
use crate::domain::value_objects::SubdomainLabel;
use crate::infrastructure::{InFlightRegistry, ShutdownController};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

/// Provisioning request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDomainRequest {
    #[serde(default)]
    pub subdomain: Option<String>,
}

/// Error body shared by every non-200 response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub inflight: usize,
}

/// API Server state.
#[derive(Clone)]
pub struct ApiState {
    pub provisioner: Arc<DomainProvisioner>,
    /// Same-subdomain serialization; `None` leaves requests uncoordinated
    pub inflight: Option<InFlightRegistry>,
}

impl ApiState {
    pub fn new(provisioner: Arc<DomainProvisioner>, serialize_inflight: bool) -> Self {
        Self {
            provisioner,
            inflight: serialize_inflight.then(InFlightRegistry::new),
        }
    }
}

/// Build the application router.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/create-custom-domain", post(create_custom_domain_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API Server for custom domain provisioning.
pub struct ApiServer {
    listen_addr: String,
    state: ApiState,
}

impl ApiServer {
    pub fn new(listen_addr: String, state: ApiState) -> Self {
        Self { listen_addr, state }
    }

    /// Get shared state for use by other components.
    pub fn state(&self) -> ApiState {
        self.state.clone()
    }

    /// Run the API server until `shutdown` fires.
    pub async fn run(&self, shutdown: ShutdownController) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("custom domain API listening on {}", listener.local_addr()?);

        axum::serve(listener, router(self.state.clone()))
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("custom domain API stopped");
        Ok(())
    }
}

fn error_response(status: StatusCode, message: impl Into<String>, details: Option<String>) -> Response {
    let body = ErrorResponse {
        error: true,
        message: message.into(),
        details,
    };
    (status, Json(body)).into_response()
}

// Handler functions

async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        inflight: state.inflight.as_ref().map_or(0, |r| r.len()),
    };
    Json(response)
}

async fn create_custom_domain_handler(
    State(state): State<ApiState>,
    payload: Result<Json<CreateDomainRequest>, JsonRejection>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("create_custom_domain", %request_id);

    async move {
        let Json(request) = match payload {
            Ok(payload) => payload,
            Err(rejection) => {
                tracing::warn!("rejected request body: {}", rejection.body_text());
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "Invalid JSON body",
                    Some(rejection.body_text()),
                );
            }
        };

        let label = match SubdomainLabel::parse_optional(request.subdomain.as_deref()) {
            Ok(label) => label,
            Err(e) => {
                tracing::warn!("invalid subdomain: {}", e);
                return error_response(StatusCode::BAD_REQUEST, e.to_string(), None);
            }
        };

        let guard = match &state.inflight {
            Some(registry) => match registry.try_acquire(label.as_str()) {
                Some(guard) => Some(guard),
                None => {
                    tracing::warn!("provisioning already in progress for {}", label);
                    return error_response(
                        StatusCode::CONFLICT,
                        format!("Provisioning already in progress for {}", label),
                        None,
                    );
                }
            },
            None => None,
        };

        // Run detached so a dropped connection cannot abort a half-finished
        // workflow; the guard lives as long as the workflow does.
        let provisioner = state.provisioner.clone();
        let task = tokio::spawn(
            async move {
                let _guard = guard;
                provisioner.provision_label(&label).await
            }
            .in_current_span(),
        );

        match task.await {
            Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
            Err(join_err) => {
                let details = join_err.to_string();
                let message = panic_message(join_err)
                    .unwrap_or_else(|| "Failed to create custom domain".to_string());
                tracing::error!("provisioning aborted: {}", details);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, message, Some(details))
            }
        }
    }
    .instrument(span)
    .await
}

fn panic_message(err: tokio::task::JoinError) -> Option<String> {
    let payload = err.try_into_panic().ok()?;
    if let Some(s) = payload.downcast_ref::<&str>() {
        Some(s.to_string())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::DEFAULT_STEP_TIMEOUT;
    use crate::domain::entities::SubResult;
    use crate::domain::errors::TransportError;
    use crate::domain::ports::{DnsRecordProvisioner, RouteProvisioner};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    // ===== Mock Implementations =====

    #[derive(Clone, Copy)]
    enum Behavior {
        Succeed,
        Fail,
        Transport,
        Panic,
    }

    struct MockPorts {
        dns: Behavior,
        routes: Behavior,
        delay: Duration,
        dns_calls: AtomicUsize,
        route_calls: AtomicUsize,
    }

    impl MockPorts {
        fn new(dns: Behavior, routes: Behavior) -> Arc<Self> {
            Self::with_delay(dns, routes, Duration::ZERO)
        }

        fn with_delay(dns: Behavior, routes: Behavior, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                dns,
                routes,
                delay,
                dns_calls: AtomicUsize::new(0),
                route_calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> (usize, usize) {
            (
                self.dns_calls.load(Ordering::SeqCst),
                self.route_calls.load(Ordering::SeqCst),
            )
        }

        async fn respond(&self, behavior: Behavior, what: &str) -> Result<SubResult, TransportError> {
            tokio::time::sleep(self.delay).await;
            match behavior {
                Behavior::Succeed => Ok(SubResult::ok(format!("{} created", what))),
                Behavior::Fail => Ok(SubResult::failed("already exists")),
                Behavior::Transport => Err(TransportError::Request("connection reset".to_string())),
                Behavior::Panic => panic!("{} collaborator exploded", what),
            }
        }
    }

    #[async_trait]
    impl DnsRecordProvisioner for MockPorts {
        async fn create_cname_record(
            &self,
            _subdomain: &SubdomainLabel,
        ) -> Result<SubResult, TransportError> {
            self.dns_calls.fetch_add(1, Ordering::SeqCst);
            self.respond(self.dns, "CNAME record").await
        }
    }

    #[async_trait]
    impl RouteProvisioner for MockPorts {
        async fn create_worker_route(
            &self,
            _subdomain: &SubdomainLabel,
        ) -> Result<SubResult, TransportError> {
            self.route_calls.fetch_add(1, Ordering::SeqCst);
            self.respond(self.routes, "Worker route").await
        }
    }

    // ===== Test Helpers =====

    fn create_state(ports: Arc<MockPorts>, serialize_inflight: bool) -> ApiState {
        let provisioner = DomainProvisioner::new(ports.clone(), ports, DEFAULT_STEP_TIMEOUT);
        ApiState::new(Arc::new(provisioner), serialize_inflight)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/create-custom-domain")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ===== Handler Tests =====

    #[tokio::test]
    async fn test_create_custom_domain_success() {
        let ports = MockPorts::new(Behavior::Succeed, Behavior::Succeed);
        let app = router(create_state(ports.clone(), true));

        let response = app.oneshot(post_json(r#"{"subdomain":"demo"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = read_json(response).await;
        assert_eq!(json["overallSuccess"], true);
        assert_eq!(json["dnsSetup"]["success"], true);
        assert_eq!(json["dnsSetup"]["message"], "CNAME record created");
        assert_eq!(json["workerSetup"]["success"], true);
        assert_eq!(ports.calls(), (1, 1));
    }

    #[tokio::test]
    async fn test_create_custom_domain_dns_failure_reports_both() {
        let ports = MockPorts::new(Behavior::Fail, Behavior::Succeed);
        let app = router(create_state(ports.clone(), true));

        let response = app.oneshot(post_json(r#"{"subdomain":"demo"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = read_json(response).await;
        assert_eq!(json["overallSuccess"], false);
        assert_eq!(json["dnsSetup"]["success"], false);
        assert_eq!(json["dnsSetup"]["message"], "already exists");
        assert_eq!(json["workerSetup"]["success"], true);
        assert_eq!(ports.calls(), (1, 1));
    }

    #[tokio::test]
    async fn test_create_custom_domain_dns_transport_error() {
        let ports = MockPorts::new(Behavior::Transport, Behavior::Succeed);
        let app = router(create_state(ports, true));

        let response = app.oneshot(post_json(r#"{"subdomain":"demo"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = read_json(response).await;
        assert_eq!(json["overallSuccess"], false);
        assert_eq!(
            json["dnsSetup"]["message"],
            "dns step failed: request failed: connection reset"
        );
        assert_eq!(json["workerSetup"]["success"], true);
    }

    #[tokio::test]
    async fn test_create_custom_domain_missing_subdomain() {
        let ports = MockPorts::new(Behavior::Succeed, Behavior::Succeed);
        let app = router(create_state(ports.clone(), true));

        let response = app.oneshot(post_json("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = read_json(response).await;
        assert_eq!(
            json,
            serde_json::json!({ "error": true, "message": "Subdomain is required" })
        );
        assert_eq!(ports.calls(), (0, 0));
    }

    #[tokio::test]
    async fn test_create_custom_domain_null_and_empty_subdomain() {
        for body in [r#"{"subdomain":null}"#, r#"{"subdomain":""}"#] {
            let ports = MockPorts::new(Behavior::Succeed, Behavior::Succeed);
            let app = router(create_state(ports.clone(), true));

            let response = app.oneshot(post_json(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(read_json(response).await["message"], "Subdomain is required");
            assert_eq!(ports.calls(), (0, 0));
        }
    }

    #[tokio::test]
    async fn test_create_custom_domain_invalid_label() {
        let ports = MockPorts::new(Behavior::Succeed, Behavior::Succeed);
        let app = router(create_state(ports.clone(), true));

        let response = app
            .oneshot(post_json(r#"{"subdomain":"bad_label"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = read_json(response).await;
        assert_eq!(json["error"], true);
        assert!(json["message"].as_str().unwrap().contains("invalid character"));
        assert_eq!(ports.calls(), (0, 0));
    }

    #[tokio::test]
    async fn test_create_custom_domain_invalid_json() {
        let ports = MockPorts::new(Behavior::Succeed, Behavior::Succeed);
        let app = router(create_state(ports.clone(), true));

        let response = app.oneshot(post_json("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = read_json(response).await;
        assert_eq!(json["message"], "Invalid JSON body");
        assert!(json["details"].is_string());
        assert_eq!(ports.calls(), (0, 0));
    }

    #[tokio::test]
    async fn test_create_custom_domain_panic_is_500() {
        let ports = MockPorts::new(Behavior::Panic, Behavior::Succeed);
        let state = create_state(ports, true);
        let app = router(state.clone());

        let response = app.oneshot(post_json(r#"{"subdomain":"demo"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = read_json(response).await;
        assert_eq!(json["error"], true);
        assert_eq!(json["message"], "CNAME record collaborator exploded");
        assert!(json["details"].as_str().unwrap().contains("panicked"));

        // The in-flight marker is released even though the workflow panicked
        assert!(state.inflight.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_custom_domain_same_label_conflict() {
        let ports = MockPorts::with_delay(Behavior::Succeed, Behavior::Succeed, Duration::from_millis(100));
        let state = create_state(ports.clone(), true);

        let first = tokio::spawn(router(state.clone()).oneshot(post_json(r#"{"subdomain":"demo"}"#)));
        tokio::time::sleep(Duration::from_millis(30)).await;

        let second = router(state.clone())
            .oneshot(post_json(r#"{"subdomain":"DEMO"}"#))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(
            read_json(second).await["message"],
            "Provisioning already in progress for demo"
        );

        let first = first.await.unwrap().unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(ports.calls(), (1, 1));

        // Released after completion
        let third = router(state)
            .oneshot(post_json(r#"{"subdomain":"demo"}"#))
            .await
            .unwrap();
        assert_eq!(third.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_custom_domain_without_serialization() {
        let ports = MockPorts::with_delay(Behavior::Succeed, Behavior::Succeed, Duration::from_millis(50));
        let state = create_state(ports.clone(), false);
        assert!(state.inflight.is_none());

        let (a, b) = tokio::join!(
            router(state.clone()).oneshot(post_json(r#"{"subdomain":"demo"}"#)),
            router(state.clone()).oneshot(post_json(r#"{"subdomain":"demo"}"#)),
        );

        assert_eq!(a.unwrap().status(), StatusCode::OK);
        assert_eq!(b.unwrap().status(), StatusCode::OK);
        assert_eq!(ports.calls(), (2, 2));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let ports = MockPorts::new(Behavior::Succeed, Behavior::Succeed);
        let app = router(create_state(ports, true));

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = read_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["inflight"], 0);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let ports = MockPorts::new(Behavior::Succeed, Behavior::Succeed);
        let app = router(create_state(ports.clone(), true));

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/create-custom-domain")
            .header("origin", "https://www.vegvisr.org")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        assert_eq!(ports.calls(), (0, 0));
    }

    #[tokio::test]
    async fn test_cors_header_on_post() {
        let ports = MockPorts::new(Behavior::Succeed, Behavior::Succeed);
        let app = router(create_state(ports, true));

        let mut request = post_json(r#"{"subdomain":"demo"}"#);
        request
            .headers_mut()
            .insert("origin", "https://www.vegvisr.org".parse().unwrap());

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[test]
    fn test_error_response_serialization() {
        let body = ErrorResponse {
            error: true,
            message: "Subdomain is required".to_string(),
            details: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "error": true, "message": "Subdomain is required" })
        );
    }

    #[tokio::test]
    async fn test_api_server_run_and_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let ports = MockPorts::new(Behavior::Succeed, Behavior::Succeed);
        let server = ApiServer::new(addr.to_string(), create_state(ports, true));
        let shutdown = ShutdownController::new();

        let ctrl = shutdown.clone();
        let server_handle = tokio::spawn(async move { server.run(ctrl).await });

        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("http://{}/health", addr))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        shutdown.shutdown();
        let result = tokio::time::timeout(Duration::from_secs(2), server_handle).await;
        assert!(result.unwrap().unwrap().is_ok());
    }
}
