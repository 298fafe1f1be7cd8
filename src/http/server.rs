//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router feeding every GET/POST into the dispatcher
//! - Wire up middleware (tracing, timeout, request ID)
//! - Convert axum requests into `HttpRequest` and `HttpResponse` back
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::FrameworkConfig;
use crate::dispatch::Dispatcher;
use crate::http::request::HttpRequest;
use crate::http::request_id::{request_id_of, UuidRequestId};
use crate::http::response::HttpResponse;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub context_path: Arc<str>,
    pub max_body_bytes: usize,
}

/// HTTP front end for a [`Dispatcher`].
pub struct HttpServer {
    router: Router,
    config: FrameworkConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: FrameworkConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let state = AppState {
            dispatcher,
            context_path: Arc::from(config.context_path.as_str()),
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &FrameworkConfig, state: AppState) -> Router {
        let dispatch = get(dispatch_handler).post(dispatch_handler);
        Router::new()
            .route("/{*path}", dispatch.clone())
            .route("/", dispatch)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// A clone of the router, for serving elsewhere or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            context_path = %self.config.context_path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &FrameworkConfig {
        &self.config
    }
}

/// Bridge one axum request through the dispatcher.
/// Dispatch is synchronous and may block, so it runs on the blocking pool.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let request_id = request_id_of(&parts.headers).to_string();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request body rejected");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let request = HttpRequest::from_parts(&parts, body, &*state.context_path);
    let dispatcher = Arc::clone(&state.dispatcher);
    let span = tracing::debug_span!("dispatch", request_id = %request_id);

    let joined = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let mut response = HttpResponse::new();
        dispatcher.dispatch(&request, &mut response);
        response
    })
    .await;

    match joined {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Dispatch task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Dispatch task failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Catalog, ComponentType, ParamDecl};
    use crate::dispatch::NOT_FOUND_BODY;
    use crate::lifecycle::bootstrap;
    use axum::http::{header, Method};
    use tower::ServiceExt;

    #[derive(Default)]
    struct Echo;

    fn server(context_path: &str) -> HttpServer {
        let catalog = Catalog::new().with(
            ComponentType::builder::<Echo>("app.controller.Echo")
                .controller("/echo")
                .default_constructor()
                .route(
                    "say",
                    "/say",
                    [ParamDecl::response(), ParamDecl::named("word")],
                    |_, args| {
                        let word = args.value(1)?.to_string();
                        let resp = args.response(0)?;
                        resp.set_character_encoding("UTF-8");
                        resp.write(&word);
                        Ok(())
                    },
                )
                .build(),
        );
        let config = FrameworkConfig {
            scan_package: "app.controller".into(),
            context_path: context_path.into(),
            ..Default::default()
        };
        let app = bootstrap(&config, &catalog).unwrap();
        HttpServer::new(config, app.dispatcher())
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_get_reaches_handler() {
        let response = server("")
            .router()
            .oneshot(Request::get("/echo/say?word=hi").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain;charset=UTF-8"
        );
        assert_eq!(body_text(response).await, "hi");
    }

    #[tokio::test]
    async fn test_post_form_with_context_path() {
        let response = server("/app")
            .router()
            .oneshot(
                Request::post("/app/echo/say")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("word=posted"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "posted");
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let response = server("")
            .router()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, NOT_FOUND_BODY);
    }

    #[tokio::test]
    async fn test_other_methods_are_rejected() {
        let response = server("")
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/echo/say")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_client_request_id_is_echoed() {
        let response = server("")
            .router()
            .oneshot(
                Request::get("/echo/say?word=x")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get("x-request-id").unwrap(), "abc-123");
    }
}
