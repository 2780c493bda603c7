//! Shared test harness for HTTP-level integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::broadcast;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use viewpress_api::routes;
use viewpress_api::state::AppState;
use viewpress_api::ws::WsManager;
use viewpress_automation::messages::{
    DescriptorTemplate, RemoteStatus, StatusResponse, SubmitResponse, WorkItemDescriptor,
};
use viewpress_automation::{AutomationApiError, AutomationService, WorkItemManager, WorkItemRegistry};
use viewpress_events::{EventBus, TopicEvent};

pub const CALLBACK_PATH: &str = "/api/v1/callback/designautomation";

// ---------------------------------------------------------------------------
// Remote service stand-in
// ---------------------------------------------------------------------------

/// Scriptable fake of the remote compute service.
///
/// Submissions get sequential ids `wi-1`, `wi-2`, ...; unknown ids are 404s.
#[derive(Default)]
pub struct MockService {
    next_id: AtomicUsize,
    statuses: Mutex<HashMap<String, RemoteStatus>>,
    pub submitted: Mutex<Vec<WorkItemDescriptor>>,
    pub cancelled: Mutex<Vec<String>>,
    pub fail_submit: Mutex<bool>,
}

impl MockService {
    pub fn set_status(&self, id: &str, status: RemoteStatus) {
        self.statuses.lock().unwrap().insert(id.to_string(), status);
    }

    pub fn last_descriptor(&self) -> WorkItemDescriptor {
        self.submitted
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("a submission was made")
    }

    pub fn cancel_calls(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl AutomationService for MockService {
    async fn submit(
        &self,
        descriptor: &WorkItemDescriptor,
    ) -> Result<SubmitResponse, AutomationApiError> {
        if *self.fail_submit.lock().unwrap() {
            return Err(AutomationApiError::ApiError {
                status: 400,
                body: "activity not found".to_string(),
            });
        }
        self.submitted.lock().unwrap().push(descriptor.clone());
        let id = format!("wi-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.set_status(&id, RemoteStatus::Pending);
        Ok(SubmitResponse {
            id,
            status: RemoteStatus::Pending,
        })
    }

    async fn status(&self, id: &str) -> Result<StatusResponse, AutomationApiError> {
        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| AutomationApiError::NotFound(id.to_string()))?;
        Ok(StatusResponse {
            id: id.to_string(),
            status,
            report_url: None,
            stats: None,
        })
    }

    async fn cancel(&self, id: &str) -> Result<(), AutomationApiError> {
        self.cancelled.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub service: Arc<MockService>,
    /// Subscribed before any request is made.
    pub events: broadcast::Receiver<TopicEvent>,
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses.
pub fn build_test_app() -> TestApp {
    let service = Arc::new(MockService::default());
    let event_bus = Arc::new(EventBus::default());
    let events = event_bus.subscribe();

    let workitems = Arc::new(WorkItemManager::new(
        service.clone(),
        Arc::new(WorkItemRegistry::new()),
        Arc::clone(&event_bus),
        DescriptorTemplate {
            activity_id: "viewpress.ExportToPdfs+test".to_string(),
            callback_url: format!("http://localhost:3000{CALLBACK_PATH}"),
            input_token: None,
        },
    ));

    let state = AppState {
        ws_manager: Arc::new(WsManager::new()),
        workitems,
        event_bus,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    let router = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state.clone());

    TestApp {
        router,
        state,
        service,
        events,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Request::delete(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(
        app,
        Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Wait for the next bus event, failing the test after one second.
pub async fn next_event(rx: &mut broadcast::Receiver<TopicEvent>) -> TopicEvent {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("event within one second")
        .expect("bus open")
}

/// Assert that no event arrives within a short window.
pub async fn assert_no_event(rx: &mut broadcast::Receiver<TopicEvent>) {
    let outcome = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(outcome.is_err(), "unexpected event: {outcome:?}");
}

/// Submit a job for `output_ref` with every view type enabled.
pub async fn submit(app: &TestApp, output_ref: &str) -> String {
    let response = post_json(
        app.router.clone(),
        "/api/v1/workitems",
        serde_json::json!({
            "input_ref": "https://storage.example/in.rvt",
            "output_ref": output_ref,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["workitem_id"]
        .as_str()
        .unwrap()
        .to_string()
}
