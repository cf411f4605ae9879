//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (tracing, timeouts, request ID, `x-proxied-by`)
//! - Hand each request to the dispatcher and render its decision
//! - Forward allowed requests to the target site
//! - Sweep idle sessions in the background
//! - Serve the admin API when enabled

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{self, HeaderName, HeaderValue},
        uri::{Authority, PathAndQuery, Scheme},
        request::Parts,
        Request, Uri,
    },
    response::Response,
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{set_header::SetResponseHeaderLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::setup_admin_router;
use crate::config::{validate_config, ConfigError, GatewayConfig, ValidationError};
use crate::gateway::{GatewayRequest, RequestDispatcher, ResponseIntent, UserDirectory};
use crate::http::request::{
    propagate_request_id_layer, read_login_form, request_id, set_request_id_layer, X_REQUEST_ID,
};
use crate::http::response::{apply_decision_headers, bad_gateway, render, X_PROXIED_BY};
use crate::observability::metrics;
use crate::routing::RouteKind;
use crate::session::{Clock, CookieCodec, SystemClock};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: RequestDispatcher,
    pub client: Client<HttpConnector, Body>,
    /// Target site `host:port`.
    pub upstream: Authority,
    /// Identity header plus every configured per-user header. Client-supplied
    /// copies of these are stripped before forwarding.
    pub stripped_headers: Arc<[HeaderName]>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    dispatcher: RequestDispatcher,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Configuration faults surface here, before anything is served.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Like `new`, with an explicit time source for sessions and lockout.
    pub fn with_clock(config: GatewayConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let users = Arc::new(UserDirectory::new(config.users.clone()));
        let dispatcher = RequestDispatcher::new(config.target_site.clone(), users, clock)
            .map_err(|e| ConfigError::Validation(vec![e]))?
            .with_cookie_codec(CookieCodec::new(config.sessions.cookie_domain.clone()))
            .with_idle_timeout(config.sessions.idle_timeout_secs);

        let invalid_host = || ConfigError::Validation(vec![ValidationError::InvalidHost(config.target_site.host.clone())]);
        let upstream = Authority::from_str(dispatcher.proxied_by()).map_err(|_| invalid_host())?;
        let proxied_by = HeaderValue::from_str(dispatcher.proxied_by()).map_err(|_| invalid_host())?;
        let identity_header = HeaderName::from_bytes(config.target_site.identity_header.as_bytes())
            .map_err(|_| {
                ConfigError::Validation(vec![ValidationError::InvalidHeaderName {
                    context: "target_site.identity_header".to_string(),
                    name: config.target_site.identity_header.clone(),
                }])
            })?;
        let mut stripped_headers = vec![identity_header];
        for name in config.users.values().flat_map(|u| u.auth_headers.keys()) {
            if let Ok(name) = HeaderName::from_bytes(name.as_bytes()) {
                if !stripped_headers.contains(&name) {
                    stripped_headers.push(name);
                }
            }
        }

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            dispatcher: dispatcher.clone(),
            client,
            upstream,
            stripped_headers: stripped_headers.into(),
        };

        let router = Self::build_router(&config, state, proxied_by);
        Ok(Self {
            router,
            config,
            dispatcher,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState, proxied_by: HeaderValue) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
            .layer(SetResponseHeaderLayer::overriding(X_PROXIED_BY, proxied_by))
    }

    /// The router, for driving the gateway without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
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
            target = %self.config.target_site.host,
            "Gateway starting"
        );

        let idle_timeout = self.dispatcher.idle_timeout_secs();
        let purge_interval = self.config.sessions.purge_interval_secs;
        if idle_timeout > 0 && purge_interval > 0 {
            let dispatcher = self.dispatcher.clone();
            let stop = shutdown.resubscribe();
            tokio::spawn(purge_idle_sessions(
                dispatcher,
                Duration::from_secs(purge_interval),
                stop,
            ));
        }

        if self.config.admin.enabled {
            let admin_listener = TcpListener::bind(&self.config.admin.bind_address).await?;
            tracing::info!(address = %admin_listener.local_addr()?, "Admin API listening");
            let admin = setup_admin_router(self.dispatcher.clone(), self.config.admin.api_key.clone());
            let mut stop = shutdown.resubscribe();
            tokio::spawn(async move {
                let served = axum::serve(admin_listener, admin)
                    .with_graceful_shutdown(async move {
                        let _ = stop.recv().await;
                    })
                    .await;
                if let Err(e) = served {
                    tracing::error!(error = %e, "Admin API failed");
                }
            });
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Periodically drop sessions that have gone idle.
async fn purge_idle_sessions(
    dispatcher: RequestDispatcher,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = dispatcher.clock().now();
                let purged = dispatcher.sessions().purge_idle(now, dispatcher.idle_timeout_secs());
                if purged > 0 {
                    tracing::debug!(purged, remaining = dispatcher.sessions().len(), "Purged idle sessions");
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

/// Main gateway handler.
/// Asks the dispatcher what to do, then does it.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();
    let request_id = request_id(&parts.headers).to_string();

    let mut gateway_request = GatewayRequest::new(parts.method.clone(), parts.uri.path())
        .with_headers(parts.headers.clone());
    let kind = state.dispatcher.route_kind(&gateway_request);

    let body = if kind == RouteKind::LoginSubmit {
        gateway_request.login = Some(read_login_form(&parts.headers, body, &request_id).await);
        Body::empty()
    } else {
        body
    };

    let decision = state.dispatcher.dispatch(&gateway_request);

    let mut response = match &decision.intent {
        ResponseIntent::Forward { identity_headers } => {
            forward(&state, parts, body, identity_headers, &request_id).await
        }
        intent => {
            tracing::debug!(
                request_id = %request_id,
                route = %kind,
                intent = ?intent,
                "Answering without forwarding"
            );
            render(intent)
        }
    };
    apply_decision_headers(&mut response, &decision);

    metrics::record_request(
        gateway_request.method.as_str(),
        response.status().as_u16(),
        kind.as_str(),
        start_time,
    );
    response
}

/// Send the request on to the target site and stream its answer back.
async fn forward(
    state: &AppState,
    mut parts: Parts,
    body: Body,
    identity_headers: &[(String, String)],
    request_id: &str,
) -> Response {
    // URI rewrite
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Could not build upstream URI");
            return bad_gateway("Upstream request failed");
        }
    };

    let headers = &mut parts.headers;
    for name in state.stripped_headers.iter() {
        headers.remove(name);
    }
    for (name, value) in identity_headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => tracing::warn!(request_id = %request_id, header = %name, "Skipping unencodable identity header"),
        }
    }
    if let Ok(host) = HeaderValue::from_str(state.upstream.as_str()) {
        headers.insert(header::HOST, host);
    }
    if let Ok(id) = HeaderValue::from_str(request_id) {
        headers.insert(X_REQUEST_ID, id);
    }

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        uri = %parts.uri,
        identity_headers = identity_headers.len(),
        "Forwarding to target"
    );

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            bad_gateway("Upstream request failed")
        }
    }
}
