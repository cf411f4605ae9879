//! The per-request state machine.
//!
//! # Responsibilities
//! - Resolve the caller's session from the SMSESSION cookie
//! - Classify the request and run the matching branch
//! - Drive login attempts, lockout and session lifecycle
//! - Emit a `GatewayResponse` for the transport to render
//!
//! # Design Decisions
//! - `x-proxied-by` is attached to every decision, whatever the branch
//! - Idle sessions are dropped on sight and treated as absent
//! - A blank username never counts against the attempt limit

use std::sync::Arc;

use axum::http::StatusCode;

use crate::config::{TargetSiteConfig, ValidationError};
use crate::gateway::credentials::{CredentialCheck, CredentialValidator};
use crate::gateway::intent::{GatewayRequest, GatewayResponse, ResponseIntent};
use crate::observability::metrics;
use crate::routing::{RouteClassifier, RouteKind};
use crate::session::{Clock, CookieCodec, LockState, LoginAttemptTracker, Session, SessionStore};

/// Body returned on logoff when no redirect is configured.
pub const LOGOFF_BODY: &str = "You have been logged off.";

/// Decides the outcome of each request bound for the target site.
#[derive(Clone)]
pub struct RequestDispatcher {
    site: Arc<TargetSiteConfig>,
    proxied_by: String,
    classifier: Arc<RouteClassifier>,
    cookies: CookieCodec,
    sessions: SessionStore,
    attempts: LoginAttemptTracker,
    validator: Arc<dyn CredentialValidator>,
    clock: Arc<dyn Clock>,
    idle_timeout_secs: u64,
}

impl RequestDispatcher {
    /// Build a dispatcher with an empty session store and attempt tracker.
    ///
    /// Fails if the target host has no usable `host:port`.
    pub fn new(
        site: TargetSiteConfig,
        validator: Arc<dyn CredentialValidator>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ValidationError> {
        let proxied_by = site
            .authority()
            .ok_or_else(|| ValidationError::InvalidHost(site.host.clone()))?;
        let attempts = LoginAttemptTracker::new(site.max_login_attempts, clock.clone());

        Ok(Self {
            classifier: Arc::new(RouteClassifier::new(&site)),
            site: Arc::new(site),
            proxied_by,
            cookies: CookieCodec::default(),
            sessions: SessionStore::new(),
            attempts,
            validator,
            clock,
            idle_timeout_secs: 0,
        })
    }

    /// Use an existing session store.
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_cookie_codec(mut self, cookies: CookieCodec) -> Self {
        self.cookies = cookies;
        self
    }

    /// Sliding idle timeout in seconds; 0 disables it.
    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn attempts(&self) -> &LoginAttemptTracker {
        &self.attempts
    }

    pub fn site(&self) -> &TargetSiteConfig {
        &self.site
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn idle_timeout_secs(&self) -> u64 {
        self.idle_timeout_secs
    }

    /// The `x-proxied-by` value: target `host:port`.
    pub fn proxied_by(&self) -> &str {
        &self.proxied_by
    }

    pub fn route_kind(&self, request: &GatewayRequest) -> RouteKind {
        self.classifier.classify(&request.method, &request.path)
    }

    /// The caller's live session, or the empty session.
    pub fn current_session(&self, request: &GatewayRequest) -> Session {
        let id = self.cookies.extract_session_id(&request.headers);
        self.session_for(id.as_deref())
    }

    fn session_for(&self, id: Option<&str>) -> Session {
        let session = self.sessions.get(id);
        if session.is_empty() {
            return session;
        }
        // Only evicts if still idle at removal time; a concurrent touch wins.
        if self.sessions.remove_if_idle(&session.id, self.clock.now(), self.idle_timeout_secs) {
            tracing::debug!(user = %session.user, "Session idled out");
            return Session::empty();
        }
        session
    }

    /// Run the state machine for one request.
    pub fn dispatch(&self, request: &GatewayRequest) -> GatewayResponse {
        let session_id = self.cookies.extract_session_id(&request.headers);
        let session = self.session_for(session_id.as_deref());
        let kind = self.route_kind(request);

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            route = %kind,
            user = %session.user,
            "Dispatching request"
        );
        metrics::record_decision(kind.as_str());

        let (set_cookie, intent) = match kind {
            RouteKind::Logoff => self.logoff(session_id.as_deref()),
            RouteKind::LoginSubmit => self.login(request),
            RouteKind::Protected => (None, self.protected(&session)),
            RouteKind::Public => (None, ResponseIntent::Forward { identity_headers: Vec::new() }),
        };

        GatewayResponse {
            proxied_by: self.proxied_by.clone(),
            set_cookie,
            intent,
        }
    }

    fn logoff(&self, session_id: Option<&str>) -> (Option<String>, ResponseIntent) {
        if let Some(ended) = session_id.and_then(|id| self.sessions.delete(id)) {
            tracing::info!(user = %ended.user, "User logged off");
        }

        let intent = match &self.site.logoff_redirect_url {
            Some(location) => redirect(location),
            None => ResponseIntent::Respond {
                status: StatusCode::OK,
                body: LOGOFF_BODY.to_string(),
            },
        };
        (Some(self.cookies.logoff_cookie()), intent)
    }

    fn login(&self, request: &GatewayRequest) -> (Option<String>, ResponseIntent) {
        let form = request.login.clone().unwrap_or_default();
        let user = form.user.as_str();

        if user.is_empty() {
            metrics::record_login("bad_login");
            return (None, redirect(&self.site.bad_login_url));
        }

        if self.attempts.is_locked(user) {
            tracing::warn!(user = %user, "Login rejected for locked account");
            metrics::record_login("locked");
            return (None, redirect(&self.site.account_locked_url));
        }

        let check = self.validator.validate(user, &form.password);
        if check == CredentialCheck::Valid {
            self.attempts.record_success(user);
            let session = Session::new(user, self.validator.attributes(user), self.clock.now());
            let cookie = self.cookies.session_cookie(&session.id);
            self.sessions.put(session);

            tracing::info!(user = %user, "Login succeeded");
            metrics::record_login("success");
            return (Some(cookie), redirect(&self.site.target_uri));
        }

        let location = match (self.attempts.record_failure(user), check) {
            (LockState::Locked, _) => {
                metrics::record_login("locked");
                &self.site.account_locked_url
            }
            (LockState::Allowed, CredentialCheck::InvalidPassword) => {
                metrics::record_login("bad_password");
                &self.site.bad_password_url
            }
            (LockState::Allowed, _) => {
                metrics::record_login("bad_login");
                &self.site.bad_login_url
            }
        };
        tracing::info!(user = %user, outcome = ?check, "Login failed");
        (None, redirect(location))
    }

    fn protected(&self, session: &Session) -> ResponseIntent {
        if session.is_empty() {
            return redirect(&self.site.not_authenticated_url);
        }

        self.sessions.touch(&session.id, self.clock.now());

        let mut identity_headers = Vec::with_capacity(session.attributes.len() + 1);
        identity_headers.push((self.site.identity_header.clone(), session.user.clone()));
        identity_headers.extend(
            session
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        ResponseIntent::Forward { identity_headers }
    }
}

fn redirect(location: &str) -> ResponseIntent {
    ResponseIntent::Redirect {
        location: location.to_string(),
    }
}
