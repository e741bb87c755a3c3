//! Session manager: operations and transition side effects
//!
//! Every mutating operation follows the same shape: dispatch `Start`,
//! call the endpoint, then dispatch the terminal transition. The start
//! transition is observable before the network call begins; the terminal
//! one strictly after it settles. The credential store and the gateway's
//! bearer slot are written only here, by the transition handlers.
//!
//! Teardown discipline: refresh failure, `logout()`, and the successful
//! completion of `change_password()`/`revoke_all_tokens()` (the server
//! invalidates all outstanding tokens) clear the store, the bearer, and
//! the pending refresh alarm together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use campus_auth::{
    ChangePasswordRequest, CredentialStore, Identity, LoginRequest, ProfileUpdate,
    RegisterRequest, TokenPair, endpoints,
};
use campus_gateway::ApiClient;
use common::Secret;

use crate::error::{Error, Result};
use crate::reducer::{SessionAction, SessionState, reduce};
use crate::refresh::RefreshScheduler;

/// Owner of the session state machine for one logged-in identity.
pub struct SessionManager {
    client: Arc<ApiClient>,
    store: Arc<CredentialStore>,
    scheduler: RefreshScheduler,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    pub fn new(
        client: Arc<ApiClient>,
        store: Arc<CredentialStore>,
        refresh_margin: Duration,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState::default());
        Arc::new(Self {
            client,
            store,
            scheduler: RefreshScheduler::new(refresh_margin),
            state,
        })
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The gateway client this session authenticates.
    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// Whether a refresh alarm is currently pending.
    pub fn refresh_pending(&self) -> bool {
        self.scheduler.is_armed()
    }

    /// Single mutation entry point: every transition goes through the
    /// reducer and is published to subscribers.
    fn dispatch(&self, action: SessionAction) {
        self.state
            .send_modify(|state| *state = reduce(std::mem::take(state), action));
    }

    /// Replay a stored session at startup.
    ///
    /// Returns whether a session was restored. Corruption in the store is
    /// handled silently: the store wipes itself and this resolves to an
    /// unauthenticated session with no error surfaced.
    pub async fn restore(self: &Arc<Self>) -> bool {
        match self.store.load().await {
            Some(session) => {
                info!(user_id = session.user.id, "restoring stored session");
                self.client.set_bearer(&session.tokens.access_token);
                self.arm_refresh(session.tokens.expires_in);
                self.dispatch(SessionAction::Success {
                    user: session.user,
                    tokens: session.tokens,
                });
                true
            }
            None => {
                self.client.clear_bearer();
                self.dispatch(SessionAction::Reset);
                false
            }
        }
    }

    /// Authenticate with student id and password.
    pub async fn login(self: &Arc<Self>, request: LoginRequest) -> Result<()> {
        self.dispatch(SessionAction::Start);
        match endpoints::login(&self.client, &request).await {
            Ok(response) => {
                info!(user_id = response.user.id, "login succeeded");
                self.establish(response.user, response.tokens).await;
                Ok(())
            }
            Err(e) => {
                self.fail_and_teardown(&e).await;
                Err(e.into())
            }
        }
    }

    /// Create an account; on success the new user is logged in directly.
    pub async fn register(self: &Arc<Self>, request: RegisterRequest) -> Result<()> {
        self.dispatch(SessionAction::Start);
        match endpoints::register(&self.client, &request).await {
            Ok(response) => {
                info!(user_id = response.user.id, "registration succeeded");
                self.establish(response.user, response.tokens).await;
                Ok(())
            }
            Err(e) => {
                self.fail_and_teardown(&e).await;
                Err(e.into())
            }
        }
    }

    /// Rotate the token pair using the stored refresh token.
    ///
    /// With no refresh token present this fails fast: no network call, no
    /// state transition, no alarm side effect. On refresh failure the
    /// session is torn down — no retry is scheduled.
    pub async fn refresh(self: &Arc<Self>) -> Result<()> {
        let Some(refresh_token) = self.snapshot().tokens.map(|t| t.refresh_token) else {
            return Err(Error::NoRefreshToken);
        };

        self.dispatch(SessionAction::Start);
        match endpoints::refresh(&self.client, &refresh_token).await {
            Ok(tokens) => {
                match self.snapshot().user {
                    Some(user) => self.establish(user, tokens).await,
                    None => {
                        // Tokens without an identity: repair by fetching
                        // the profile with the fresh access token.
                        self.client.set_bearer(&tokens.access_token);
                        match endpoints::me(&self.client).await {
                            Ok(user) => self.establish(user, tokens).await,
                            Err(e) => {
                                self.fail_and_teardown(&e).await;
                                return Err(e.into());
                            }
                        }
                    }
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, forcing logout");
                self.fail_and_teardown(&e).await;
                Err(e.into())
            }
        }
    }

    /// End the session. Local teardown never depends on network
    /// availability: the server-side invalidation call may fail, the
    /// local session is cleared regardless.
    pub async fn logout(&self) -> Result<()> {
        self.dispatch(SessionAction::Start);
        if let Err(e) = endpoints::logout(&self.client).await {
            warn!(error = %e, "server-side logout failed, clearing local session anyway");
        }
        self.teardown().await;
        self.dispatch(SessionAction::Reset);
        info!("session ended");
        Ok(())
    }

    /// Change the account password. On success the server invalidates all
    /// outstanding tokens, so the local session logs out as a terminal
    /// step. On failure the prior session stays intact.
    pub async fn change_password(
        self: &Arc<Self>,
        old_password: Secret<String>,
        new_password: Secret<String>,
    ) -> Result<()> {
        self.dispatch(SessionAction::Start);
        let request = ChangePasswordRequest {
            old_password,
            new_password,
        };
        match endpoints::change_password(&self.client, &request).await {
            Ok(()) => {
                info!("password changed, all tokens revoked server-side");
                self.logout().await
            }
            Err(e) => {
                self.dispatch(SessionAction::OperationError {
                    message: e.user_message(),
                });
                Err(e.into())
            }
        }
    }

    /// Revoke every outstanding token for the account, then log out. On
    /// failure the prior session stays intact.
    pub async fn revoke_all_tokens(self: &Arc<Self>) -> Result<()> {
        self.dispatch(SessionAction::Start);
        match endpoints::revoke_all(&self.client).await {
            Ok(()) => {
                info!("all tokens revoked");
                self.logout().await
            }
            Err(e) => {
                self.dispatch(SessionAction::OperationError {
                    message: e.user_message(),
                });
                Err(e.into())
            }
        }
    }

    /// Update profile fields. Success replaces the identity and
    /// re-persists it; failure leaves the session untouched apart from
    /// the surfaced error.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<()> {
        self.dispatch(SessionAction::Start);
        match endpoints::update_profile(&self.client, &update).await {
            Ok(user) => {
                if let Some(tokens) = self.snapshot().tokens {
                    if let Err(e) = self.store.save(&user, &tokens).await {
                        warn!(error = %e, "failed to persist updated profile");
                    }
                }
                self.dispatch(SessionAction::ProfileUpdated { user });
                Ok(())
            }
            Err(e) => {
                self.dispatch(SessionAction::OperationError {
                    message: e.user_message(),
                });
                Err(e.into())
            }
        }
    }

    /// Drop the current error message.
    pub fn clear_error(&self) {
        self.dispatch(SessionAction::ClearError);
    }

    /// Commit a successful auth result: bearer, durable store, state, and
    /// refresh alarm, in that order.
    async fn establish(self: &Arc<Self>, user: Identity, tokens: TokenPair) {
        self.client.set_bearer(&tokens.access_token);
        if let Err(e) = self.store.save(&user, &tokens).await {
            // The in-memory session stays valid; durable state catches up
            // on the next successful refresh.
            warn!(error = %e, "failed to persist credentials");
        }
        self.arm_refresh(tokens.expires_in);
        self.dispatch(SessionAction::Success { user, tokens });
    }

    /// Tear down all shared credential state without touching the
    /// session state machine.
    ///
    /// `disarm` goes last: when a scheduled refresh tears its own session
    /// down, disarming aborts the very task running this code, and the
    /// abort takes effect at the next await point. Nothing after the
    /// disarm may suspend.
    async fn teardown(&self) {
        self.store.clear().await;
        self.client.clear_bearer();
        self.scheduler.disarm();
    }

    async fn fail_and_teardown(&self, error: &campus_auth::Error) {
        self.teardown().await;
        self.dispatch(SessionAction::Failure {
            message: error.user_message(),
        });
    }

    fn arm_refresh(self: &Arc<Self>, expires_in: u64) {
        let weak = Arc::downgrade(self);
        self.scheduler
            .arm(Duration::from_secs(expires_in), move || async move {
                if let Some(session) = weak.upgrade() {
                    // Failure needs no handling here: the refresh failure
                    // path already tore the session down.
                    let _ = session.refresh().await;
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::{post, put};
    use campus_auth::Role;
    use campus_gateway::ClientOptions;
    use serde_json::{Value, json};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MARGIN: Duration = Duration::from_secs(300);

    async fn start_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn manager(url: &str, dir: &Path, margin: Duration) -> Arc<SessionManager> {
        let client = Arc::new(ApiClient::new(url, ClientOptions::default()));
        let store = Arc::new(CredentialStore::new(dir));
        SessionManager::new(client, store, margin)
    }

    fn user_body(name: &str) -> Value {
        json!({
            "id": 1,
            "name": name,
            "role": "student",
            "is_active": true,
            "last_login": "2026-08-01T09:30:00Z"
        })
    }

    fn tokens_body(suffix: &str, expires_in: u64) -> Value {
        json!({
            "access_token": format!("at_{suffix}"),
            "refresh_token": format!("rt_{suffix}"),
            "token_type": "bearer",
            "expires_in": expires_in
        })
    }

    fn login_request() -> LoginRequest {
        LoginRequest {
            student_id: "2021000001".into(),
            password: "Abc12345".into(),
        }
    }

    /// Router with a working login and a refresh endpoint that issues a
    /// new pair on each call.
    fn rotating_app(expires_in: u64) -> Router {
        let refreshes = Arc::new(AtomicUsize::new(0));
        Router::new()
            .route(
                "/auth/login",
                post(move || async move {
                    axum::Json(json!({
                        "user": user_body("Zhang San"),
                        "tokens": tokens_body("0", expires_in)
                    }))
                }),
            )
            .route(
                "/auth/refresh",
                post(move || {
                    let refreshes = refreshes.clone();
                    async move {
                        let n = refreshes.fetch_add(1, Ordering::SeqCst) + 1;
                        axum::Json(tokens_body(&n.to_string(), expires_in))
                    }
                }),
            )
            .route("/auth/logout", post(|| async { axum::Json(json!({})) }))
    }

    #[tokio::test]
    async fn login_success_establishes_session() {
        let url = start_server(rotating_app(3600)).await;
        let dir = tempfile::tempdir().unwrap();
        let session = manager(&url, dir.path(), MARGIN);

        session.login(login_request()).await.unwrap();

        let state = session.snapshot();
        assert!(state.authenticated);
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(state.user.as_ref().unwrap().name, "Zhang San");
        assert_eq!(state.user.as_ref().unwrap().role, Role::Student);
        assert_eq!(state.tokens.as_ref().unwrap().access_token, "at_0");

        assert_eq!(session.client().bearer().as_deref(), Some("at_0"));
        assert!(session.refresh_pending(), "refresh alarm must be armed");

        let stored = session.store.load().await.unwrap();
        assert_eq!(stored.tokens.access_token, "at_0");
    }

    #[tokio::test]
    async fn login_failure_surfaces_detail_and_clears_state() {
        let app = Router::new().route(
            "/auth/login",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"detail": "incorrect student id or password"})),
                )
            }),
        );
        let url = start_server(app).await;
        let dir = tempfile::tempdir().unwrap();
        let session = manager(&url, dir.path(), MARGIN);

        let err = session.login(login_request()).await.unwrap_err();
        assert_eq!(err.user_message(), "incorrect student id or password");

        let state = session.snapshot();
        assert!(!state.authenticated);
        assert!(!state.loading);
        assert_eq!(
            state.error.as_deref(),
            Some("incorrect student id or password")
        );
        assert!(session.client().bearer().is_none());
        assert!(!session.refresh_pending());
        assert!(session.store.load().await.is_none());
    }

    #[tokio::test]
    async fn start_transition_is_observable_before_completion() {
        let app = Router::new().route(
            "/auth/login",
            post(|| async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                axum::Json(json!({
                    "user": user_body("Zhang San"),
                    "tokens": tokens_body("0", 3600)
                }))
            }),
        );
        let url = start_server(app).await;
        let dir = tempfile::tempdir().unwrap();
        let session = manager(&url, dir.path(), MARGIN);

        let mut rx = session.subscribe();
        let task = {
            let session = session.clone();
            tokio::spawn(async move { session.login(login_request()).await })
        };

        rx.changed().await.unwrap();
        let observed = rx.borrow_and_update().clone();
        assert!(observed.loading, "start transition must be visible first");
        assert!(!observed.authenticated);

        task.await.unwrap().unwrap();
        assert!(session.snapshot().authenticated);
    }

    #[tokio::test]
    async fn successive_refreshes_rotate_the_token_pair() {
        let url = start_server(rotating_app(3600)).await;
        let dir = tempfile::tempdir().unwrap();
        let session = manager(&url, dir.path(), MARGIN);

        session.login(login_request()).await.unwrap();
        let first = session.snapshot().tokens.unwrap();

        session.refresh().await.unwrap();
        let second = session.snapshot().tokens.unwrap();
        assert_ne!(first, second, "refresh must supersede the pair");

        session.refresh().await.unwrap();
        let third = session.snapshot().tokens.unwrap();
        assert_ne!(second, third);

        assert!(session.refresh_pending(), "exactly one alarm stays armed");
        assert_eq!(
            session.client().bearer().as_deref(),
            Some(third.access_token.as_str())
        );
        let stored = session.store.load().await.unwrap();
        assert_eq!(stored.tokens, third, "store holds the newest pair");
    }

    #[tokio::test]
    async fn refresh_without_token_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        // Dead endpoint: a network call would fail loudly
        let session = manager("http://127.0.0.1:1", dir.path(), MARGIN);

        let err = session.refresh().await.unwrap_err();
        assert!(matches!(err, Error::NoRefreshToken));
        assert_eq!(err.user_message(), "no refresh token available");

        // No transition, no alarm side effect, no telemetry from a dispatch
        assert_eq!(session.snapshot(), SessionState::default());
        assert!(!session.refresh_pending());
        assert!(session.client().telemetry().performance().is_empty());
    }

    #[tokio::test]
    async fn refresh_failure_forces_logout() {
        let app = Router::new()
            .route(
                "/auth/login",
                post(|| async {
                    axum::Json(json!({
                        "user": user_body("Zhang San"),
                        "tokens": tokens_body("0", 3600)
                    }))
                }),
            )
            .route(
                "/auth/refresh",
                post(|| async {
                    (
                        StatusCode::UNAUTHORIZED,
                        axum::Json(json!({"detail": "refresh token revoked"})),
                    )
                }),
            );
        let url = start_server(app).await;
        let dir = tempfile::tempdir().unwrap();
        let session = manager(&url, dir.path(), MARGIN);

        session.login(login_request()).await.unwrap();
        let err = session.refresh().await.unwrap_err();
        assert_eq!(err.user_message(), "refresh token revoked");

        let state = session.snapshot();
        assert!(!state.authenticated);
        assert_eq!(state.error.as_deref(), Some("refresh token revoked"));
        assert!(session.client().bearer().is_none());
        assert!(!session.refresh_pending(), "no retry is scheduled");
        assert!(session.store.load().await.is_none());
    }

    #[tokio::test]
    async fn scheduled_refresh_fires_and_rotates() {
        // expires_in 1s with a 900ms margin: the alarm fires ~100ms in
        let url = start_server(rotating_app(1)).await;
        let dir = tempfile::tempdir().unwrap();
        let session = manager(&url, dir.path(), Duration::from_millis(900));

        session.login(login_request()).await.unwrap();
        assert_eq!(
            session.snapshot().tokens.as_ref().unwrap().access_token,
            "at_0"
        );

        tokio::time::sleep(Duration::from_millis(400)).await;

        let tokens = session.snapshot().tokens.unwrap();
        assert_ne!(
            tokens.access_token, "at_0",
            "background refresh must have rotated the pair"
        );
        assert!(session.snapshot().authenticated);
    }

    #[tokio::test]
    async fn logout_clears_locally_even_when_network_fails() {
        let app = Router::new()
            .route(
                "/auth/login",
                post(|| async {
                    axum::Json(json!({
                        "user": user_body("Zhang San"),
                        "tokens": tokens_body("0", 3600)
                    }))
                }),
            )
            .route(
                "/auth/logout",
                post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "") }),
            );
        let url = start_server(app).await;
        let dir = tempfile::tempdir().unwrap();
        let session = manager(&url, dir.path(), MARGIN);

        session.login(login_request()).await.unwrap();
        session.logout().await.unwrap();

        let state = session.snapshot();
        assert_eq!(state, SessionState::default());
        assert!(session.client().bearer().is_none());
        assert!(!session.refresh_pending());
        assert!(session.store.load().await.is_none());
    }

    #[tokio::test]
    async fn change_password_success_ends_the_session() {
        let app = rotating_app(3600).route(
            "/auth/change-password",
            post(|| async { axum::Json(json!({})) }),
        );
        let url = start_server(app).await;
        let dir = tempfile::tempdir().unwrap();
        let session = manager(&url, dir.path(), MARGIN);

        session.login(login_request()).await.unwrap();
        session
            .change_password("Abc12345".into(), "Def67890".into())
            .await
            .unwrap();

        assert!(!session.snapshot().authenticated);
        assert!(session.store.load().await.is_none());
        assert!(!session.refresh_pending());
    }

    #[tokio::test]
    async fn change_password_failure_keeps_the_session() {
        let app = rotating_app(3600).route(
            "/auth/change-password",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    axum::Json(json!({"detail": "old password incorrect"})),
                )
            }),
        );
        let url = start_server(app).await;
        let dir = tempfile::tempdir().unwrap();
        let session = manager(&url, dir.path(), MARGIN);

        session.login(login_request()).await.unwrap();
        let err = session
            .change_password("wrong".into(), "Def67890".into())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "old password incorrect");

        let state = session.snapshot();
        assert!(state.authenticated, "failed change must not log out");
        assert_eq!(state.error.as_deref(), Some("old password incorrect"));
        assert!(session.refresh_pending());
        assert!(session.store.load().await.is_some());
    }

    #[tokio::test]
    async fn revoke_all_success_ends_the_session() {
        let app = rotating_app(3600)
            .route("/auth/revoke-all", post(|| async { axum::Json(json!({})) }));
        let url = start_server(app).await;
        let dir = tempfile::tempdir().unwrap();
        let session = manager(&url, dir.path(), MARGIN);

        session.login(login_request()).await.unwrap();
        session.revoke_all_tokens().await.unwrap();

        assert_eq!(session.snapshot(), SessionState::default());
        assert!(session.store.load().await.is_none());
    }

    #[tokio::test]
    async fn update_profile_replaces_identity_and_keeps_tokens() {
        let app = rotating_app(3600).route(
            "/auth/me",
            put(|body: axum::Json<Value>| async move {
                assert_eq!(body.0["name"], "Li Wei");
                axum::Json(user_body("Li Wei"))
            }),
        );
        let url = start_server(app).await;
        let dir = tempfile::tempdir().unwrap();
        let session = manager(&url, dir.path(), MARGIN);

        session.login(login_request()).await.unwrap();
        let tokens_before = session.snapshot().tokens.unwrap();

        session
            .update_profile(ProfileUpdate {
                name: Some("Li Wei".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let state = session.snapshot();
        assert_eq!(state.user.as_ref().unwrap().name, "Li Wei");
        assert_eq!(state.tokens.as_ref().unwrap(), &tokens_before);
        assert!(state.authenticated);

        let stored = session.store.load().await.unwrap();
        assert_eq!(stored.user.name, "Li Wei", "profile change is persisted");
    }

    #[tokio::test]
    async fn update_profile_failure_keeps_session_intact() {
        let app = rotating_app(3600).route(
            "/auth/me",
            put(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    axum::Json(json!({"detail": "name too long"})),
                )
            }),
        );
        let url = start_server(app).await;
        let dir = tempfile::tempdir().unwrap();
        let session = manager(&url, dir.path(), MARGIN);

        session.login(login_request()).await.unwrap();
        let err = session
            .update_profile(ProfileUpdate {
                name: Some("x".repeat(500)),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "name too long");

        let state = session.snapshot();
        assert!(state.authenticated);
        assert_eq!(state.user.as_ref().unwrap().name, "Zhang San");
    }

    #[tokio::test]
    async fn restore_replays_a_stored_session_without_network() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = CredentialStore::new(dir.path());
            let user: Identity = serde_json::from_value(user_body("Zhang San")).unwrap();
            let tokens: TokenPair = serde_json::from_value(tokens_body("7", 3600)).unwrap();
            store.save(&user, &tokens).await.unwrap();
        }

        // Dead endpoint proves restore is purely local
        let session = manager("http://127.0.0.1:1", dir.path(), MARGIN);
        assert!(session.restore().await);

        let state = session.snapshot();
        assert!(state.authenticated);
        assert_eq!(state.user.as_ref().unwrap().name, "Zhang San");
        assert_eq!(session.client().bearer().as_deref(), Some("at_7"));
        assert!(session.refresh_pending());
    }

    #[tokio::test]
    async fn restore_with_empty_store_is_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let session = manager("http://127.0.0.1:1", dir.path(), MARGIN);

        assert!(!session.restore().await);
        assert_eq!(session.snapshot(), SessionState::default());
        assert!(!session.refresh_pending());
    }

    #[tokio::test]
    async fn restore_with_corrupt_store_resets_silently() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("auth_tokens.json"), "not json{{")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("auth_user.json"), "{}")
            .await
            .unwrap();

        let session = manager("http://127.0.0.1:1", dir.path(), MARGIN);
        assert!(!session.restore().await, "corruption is never an error");

        let state = session.snapshot();
        assert!(!state.authenticated);
        assert!(
            state.error.is_none(),
            "local corruption is not surfaced to the user"
        );
        assert!(session.client().bearer().is_none());
        assert!(!dir.path().join("auth_tokens.json").exists());
        assert!(!dir.path().join("auth_user.json").exists());
    }

    #[tokio::test]
    async fn clear_error_drops_the_message() {
        let app = Router::new().route(
            "/auth/login",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"detail": "nope"})),
                )
            }),
        );
        let url = start_server(app).await;
        let dir = tempfile::tempdir().unwrap();
        let session = manager(&url, dir.path(), MARGIN);

        let _ = session.login(login_request()).await;
        assert!(session.snapshot().error.is_some());

        session.clear_error();
        assert!(session.snapshot().error.is_none());
    }
}
