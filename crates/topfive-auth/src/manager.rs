//! Auth Manager
//!
//! Single owner of the session value. Every mutation funnels through
//! `apply`, which reduces one of the four action kinds over the current
//! snapshot; readers get clones, never a reference into the lock.

use parking_lot::RwLock;
use std::sync::Arc;

use topfive_api::{Credentials, Registration, SessionApi};
use topfive_storage::Database;

use crate::message::UserMessage;
use crate::navigator::Navigator;
use crate::session::{AuthAction, Session};
use crate::Result;

/// Durable flag requesting silent re-authentication on the next startup.
pub const REMEMBER_FLAG: &str = "loggedIn";
/// How long the remembered-login flag stays valid.
pub const REMEMBER_DAYS: i64 = 2;

const LOGIN_FALLBACK: &str = "I'm not sure what happened...";
const REGISTER_FALLBACK: &str = "Something is wrong with the server...";

pub struct AuthManager {
    /// Current session snapshot
    session: Arc<RwLock<Session>>,
    /// Remote session API
    api: Arc<dyn SessionApi>,
    /// Durable flag store
    db: Database,
    /// Redirect hook owned by the view layer
    navigator: Arc<dyn Navigator>,
}

impl AuthManager {
    pub fn new(api: Arc<dyn SessionApi>, db: Database, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::anonymous())),
            api,
            db,
            navigator,
        }
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.session.read().clone()
    }

    /// Reduce an action over the owned session value. Logging out also
    /// clears the remembered-login flag, whatever path requested it; a
    /// storage failure there is logged and swallowed.
    fn apply(&self, action: AuthAction) {
        if matches!(action, AuthAction::SetLoggedOut) {
            if let Err(e) = self.db.clear_flag(REMEMBER_FLAG) {
                tracing::warn!("Failed to clear remembered login: {}", e);
            }
        }

        let mut session = self.session.write();
        *session = session.reduce(action);

        tracing::debug!(
            logged_in = session.logged_in,
            user = ?session.username(),
            "Applied session transition"
        );
    }

    /// Startup hook: probe the server once iff a remembered login is
    /// present. Without the flag the session stays anonymous until a
    /// user-initiated action.
    pub async fn initialize(&self) {
        match self.db.get_flag(REMEMBER_FLAG) {
            Ok(Some(_)) => self.fetch_session().await,
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read remembered login: {}", e),
        }
    }

    /// Best-effort probe of the server-side session. Applies the reported
    /// pair on success; any failure leaves state untouched and is only
    /// logged. Never redirects.
    pub async fn fetch_session(&self) {
        match self.api.get_logged_in().await {
            Ok(status) => {
                tracing::info!(
                    logged_in = status.logged_in,
                    user = ?status.user.as_ref().map(|u| u.username.as_str()),
                    "Fetched server session"
                );
                self.apply(AuthAction::GetLoggedIn {
                    user: status.user,
                    logged_in: status.logged_in,
                });
            }
            Err(e) => tracing::debug!("Failed to fetch server session: {}", e),
        }
    }

    /// Authenticate with the server. On success the session is overwritten,
    /// the remembered-login flag is persisted iff `remember_me`, and the
    /// navigator redirects to the root. On failure nothing changes and the
    /// caller gets a display-ready message.
    pub async fn login(&self, credentials: &Credentials, remember_me: bool) -> Result<Session> {
        match self.api.login(credentials).await {
            Ok(response) => {
                self.apply(AuthAction::SetLoggedIn {
                    user: Some(response.user),
                });

                if remember_me {
                    if let Err(e) = self.db.set_flag(REMEMBER_FLAG, "true", REMEMBER_DAYS) {
                        tracing::warn!("Failed to persist remembered login: {}", e);
                    }
                }

                self.navigator.redirect_to_root();
                Ok(self.session())
            }
            Err(e) => {
                tracing::debug!("Login failed: {}", e);
                Err(UserMessage::from_api_error(&e, LOGIN_FALLBACK))
            }
        }
    }

    /// Clear the local session and redirect. The server is notified on a
    /// detached task; its result never gates the local transition.
    pub async fn logout(&self) {
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            if let Err(e) = api.logout().await {
                tracing::warn!("Failed to notify server of logout: {}", e);
            }
        });

        self.apply(AuthAction::SetLoggedOut);
        self.navigator.redirect_to_root();
    }

    /// Create an account. Success enters the authenticated state and
    /// redirects to the root; failure policy matches `login` with its own
    /// fallback message.
    pub async fn register(&self, registration: &Registration) -> Result<Session> {
        match self.api.register(registration).await {
            Ok(response) => {
                self.apply(AuthAction::RegisterUser {
                    user: response.user,
                });
                self.navigator.redirect_to_root();
                Ok(self.session())
            }
            Err(e) => {
                tracing::debug!("Registration failed: {}", e);
                Err(UserMessage::from_api_error(&e, REGISTER_FALLBACK))
            }
        }
    }

    /// Enter a guest session. Purely local: no network call, no remembered
    /// flag, no redirect.
    pub fn login_as_guest(&self) {
        self.apply(AuthAction::SetLoggedIn { user: None });
    }
}

impl Clone for AuthManager {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            api: Arc::clone(&self.api),
            db: self.db.clone(),
            navigator: Arc::clone(&self.navigator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use topfive_api::{ApiError, LoginResponse, SessionStatus, User};

    type ApiResult<T> = topfive_api::Result<T>;

    #[derive(Default)]
    struct FakeApi {
        login_result: Mutex<Option<ApiResult<LoginResponse>>>,
        register_result: Mutex<Option<ApiResult<LoginResponse>>>,
        status_result: Mutex<Option<ApiResult<SessionStatus>>>,
        logout_result: Mutex<Option<ApiResult<()>>>,
        login_calls: AtomicUsize,
        register_calls: AtomicUsize,
        probe_calls: AtomicUsize,
        logout_calls: AtomicUsize,
    }

    #[async_trait]
    impl SessionApi for FakeApi {
        async fn login(&self, _credentials: &Credentials) -> ApiResult<LoginResponse> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            self.login_result.lock().take().expect("login not scripted")
        }

        async fn logout(&self) -> ApiResult<()> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            self.logout_result
                .lock()
                .take()
                .expect("logout not scripted")
        }

        async fn get_logged_in(&self) -> ApiResult<SessionStatus> {
            self.probe_calls.fetch_add(1, Ordering::SeqCst);
            self.status_result
                .lock()
                .take()
                .expect("probe not scripted")
        }

        async fn register(&self, _registration: &Registration) -> ApiResult<LoginResponse> {
            self.register_calls.fetch_add(1, Ordering::SeqCst);
            self.register_result
                .lock()
                .take()
                .expect("register not scripted")
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        redirects: AtomicUsize,
    }

    impl Navigator for RecordingNavigator {
        fn redirect_to_root(&self) {
            self.redirects.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            username: format!("user-{}", id),
            email: None,
        }
    }

    fn credentials() -> Credentials {
        Credentials {
            username: "a".to_string(),
            password: "passw0rd".to_string(),
        }
    }

    fn registration() -> Registration {
        Registration {
            first_name: "Ana".to_string(),
            last_name: "Lovelace".to_string(),
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "passw0rd".to_string(),
            password_verify: "passw0rd".to_string(),
        }
    }

    fn setup() -> (
        AuthManager,
        Arc<FakeApi>,
        Database,
        Arc<RecordingNavigator>,
    ) {
        let api = Arc::new(FakeApi::default());
        let db = Database::open_in_memory().unwrap();
        let navigator = Arc::new(RecordingNavigator::default());
        let manager = AuthManager::new(api.clone(), db.clone(), navigator.clone());
        (manager, api, db, navigator)
    }

    fn rejected(message: &str) -> ApiError {
        ApiError::Rejected {
            status: 400,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_rejection_returns_server_message() {
        let (manager, api, db, navigator) = setup();
        *api.login_result.lock() = Some(Err(rejected("Invalid credentials")));

        let result = manager.login(&credentials(), false).await;

        assert_eq!(result.unwrap_err().as_str(), "Invalid credentials");
        assert_eq!(manager.session(), Session::anonymous());
        assert_eq!(navigator.redirects.load(Ordering::SeqCst), 0);
        assert_eq!(db.get_flag(REMEMBER_FLAG).unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_transport_failure_uses_generic_fallback() {
        let (manager, api, _db, navigator) = setup();
        *api.login_result.lock() = Some(Err(ApiError::UnexpectedStatus(502)));

        let result = manager.login(&credentials(), false).await;

        assert_eq!(result.unwrap_err().as_str(), "I'm not sure what happened...");
        assert_eq!(manager.session(), Session::anonymous());
        assert_eq!(navigator.redirects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_success_remembers_and_redirects_once() {
        let (manager, api, db, navigator) = setup();
        *api.login_result.lock() = Some(Ok(LoginResponse { user: user("1") }));

        let session = manager.login(&credentials(), true).await.unwrap();

        assert!(session.is_authenticated());
        assert_eq!(session.user.as_ref().map(|u| u.id.as_str()), Some("1"));
        assert_eq!(navigator.redirects.load(Ordering::SeqCst), 1);
        assert_eq!(db.get_flag(REMEMBER_FLAG).unwrap(), Some("true".to_string()));

        // The flag expires two days out
        let expires_at: String = db
            .with_connection(|conn| {
                Ok(conn.query_row(
                    "SELECT expires_at FROM flags WHERE key = ?1",
                    [REMEMBER_FLAG],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        let expires_at = chrono::DateTime::parse_from_rfc3339(&expires_at)
            .unwrap()
            .with_timezone(&chrono::Utc);
        let days_out = expires_at - chrono::Utc::now();
        assert!(days_out > chrono::Duration::days(1));
        assert!(days_out <= chrono::Duration::days(2));
    }

    #[tokio::test]
    async fn test_login_without_remember_leaves_no_flag() {
        let (manager, api, db, _navigator) = setup();
        *api.login_result.lock() = Some(Ok(LoginResponse { user: user("1") }));

        manager.login(&credentials(), false).await.unwrap();

        assert_eq!(db.get_flag(REMEMBER_FLAG).unwrap(), None);
    }

    #[tokio::test]
    async fn test_guest_login_is_purely_local() {
        let (manager, api, db, navigator) = setup();

        manager.login_as_guest();

        let session = manager.session();
        assert!(session.is_guest());
        assert_eq!(api.login_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.probe_calls.load(Ordering::SeqCst), 0);
        assert_eq!(db.get_flag(REMEMBER_FLAG).unwrap(), None);
        assert_eq!(navigator.redirects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_initialize_probes_once_when_remembered() {
        let (manager, api, db, navigator) = setup();
        db.set_flag(REMEMBER_FLAG, "true", REMEMBER_DAYS).unwrap();
        *api.status_result.lock() = Some(Ok(SessionStatus {
            logged_in: true,
            user: Some(user("2")),
        }));

        manager.initialize().await;

        assert_eq!(api.probe_calls.load(Ordering::SeqCst), 1);
        let session = manager.session();
        assert!(session.is_authenticated());
        assert_eq!(session.user.as_ref().map(|u| u.id.as_str()), Some("2"));
        // The passive probe never redirects
        assert_eq!(navigator.redirects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_initialize_skips_probe_without_flag() {
        let (manager, api, _db, _navigator) = setup();

        manager.initialize().await;

        assert_eq!(api.probe_calls.load(Ordering::SeqCst), 0);
        assert_eq!(manager.session(), Session::anonymous());
    }

    #[tokio::test]
    async fn test_probe_failure_leaves_state_unchanged() {
        let (manager, api, _db, _navigator) = setup();
        *api.login_result.lock() = Some(Ok(LoginResponse { user: user("1") }));
        manager.login(&credentials(), false).await.unwrap();

        *api.status_result.lock() = Some(Err(ApiError::UnexpectedStatus(500)));
        manager.fetch_session().await;

        let session = manager.session();
        assert!(session.is_authenticated());
        assert_eq!(session.user.as_ref().map(|u| u.id.as_str()), Some("1"));
    }

    #[tokio::test]
    async fn test_logout_clears_state_despite_remote_failure() {
        let (manager, api, db, navigator) = setup();
        *api.login_result.lock() = Some(Ok(LoginResponse { user: user("1") }));
        manager.login(&credentials(), true).await.unwrap();
        assert!(db.get_flag(REMEMBER_FLAG).unwrap().is_some());

        *api.logout_result.lock() = Some(Err(ApiError::UnexpectedStatus(500)));
        manager.logout().await;

        assert_eq!(manager.session(), Session::anonymous());
        assert_eq!(db.get_flag(REMEMBER_FLAG).unwrap(), None);
        // Redirect counts: one for login, one for logout
        assert_eq!(navigator.redirects.load(Ordering::SeqCst), 2);

        // The detached notify still ran (and failed) without affecting any
        // of the above
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(api.logout_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_register_success_then_logout_round_trips() {
        let (manager, api, db, navigator) = setup();
        *api.register_result.lock() = Some(Ok(LoginResponse { user: user("3") }));
        *api.logout_result.lock() = Some(Ok(()));

        let session = manager.register(&registration()).await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(navigator.redirects.load(Ordering::SeqCst), 1);

        manager.logout().await;

        assert_eq!(manager.session(), Session::anonymous());
        assert_eq!(db.get_flag(REMEMBER_FLAG).unwrap(), None);
        assert_eq!(navigator.redirects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_register_failure_messages() {
        let (manager, api, _db, _navigator) = setup();

        *api.register_result.lock() = Some(Err(rejected("Username already taken")));
        let result = manager.register(&registration()).await;
        assert_eq!(result.unwrap_err().as_str(), "Username already taken");

        *api.register_result.lock() = Some(Err(ApiError::UnexpectedStatus(503)));
        let result = manager.register(&registration()).await;
        assert_eq!(
            result.unwrap_err().as_str(),
            "Something is wrong with the server..."
        );

        assert_eq!(manager.session(), Session::anonymous());
    }

    // Known limitation: operations carry no generation token, so a probe
    // that resolves after a logout overwrites the logged-out state with the
    // stale authenticated one. This test pins the current behavior.
    #[tokio::test]
    async fn test_stale_probe_resurrects_state_after_logout() {
        let (manager, api, _db, _navigator) = setup();
        *api.logout_result.lock() = Some(Ok(()));
        manager.logout().await;
        assert_eq!(manager.session(), Session::anonymous());

        *api.status_result.lock() = Some(Ok(SessionStatus {
            logged_in: true,
            user: Some(user("1")),
        }));
        manager.fetch_session().await;

        assert!(manager.session().is_authenticated());
    }
}
