use crate::client::api::ConsoleApi;
use crate::client::error::ClientError;
use crate::client::forms::{UserSetupForm, VesselSetupForm};
use crate::client::token_store::TokenStore;
use crate::client::view::{View, ViewInputs, select_view};
use crate::models::init::InitStatus;
use crate::models::vessel::VesselResponse;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// How long the "session closed" notice stays up before the login screen returns.
pub const LOGOUT_NOTICE: Duration = Duration::from_secs(2);

/// Poll period of the status panel.
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbStatus {
    Online { server_time: String },
    Offline(String),
}

#[derive(Debug, Default)]
struct SessionState {
    init: Option<InitStatus>,
    vessel: Option<VesselResponse>,
    db: Option<DbStatus>,
}

/// Console-side state: what the server last reported and which screen follows from it.
///
/// A logout bumps `epoch` and raises `logging_out`; any refresh that started under an
/// older epoch, or lands while the flag is up, is dropped instead of applied.
pub struct ConsoleSession<A, S> {
    api: A,
    store: S,
    state: Mutex<SessionState>,
    logging_out: AtomicBool,
    epoch: AtomicU64,
}

impl<A: ConsoleApi, S: TokenStore> ConsoleSession<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self {
            api,
            store,
            state: Mutex::new(SessionState::default()),
            logging_out: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn is_logging_out(&self) -> bool {
        self.logging_out.load(Ordering::SeqCst)
    }

    /// Epoch the refresh runs under, or `None` while a logout is in progress.
    ///
    /// The epoch is read before the flag. `logout` raises the flag before bumping the
    /// epoch, so any logout that starts after this snapshot changes the epoch and the
    /// result is dropped by `is_stale`, even when the fetch outlives the notice.
    fn begin_refresh(&self) -> Option<u64> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        if self.is_logging_out() { None } else { Some(epoch) }
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.is_logging_out() || self.epoch.load(Ordering::SeqCst) != epoch
    }

    async fn fetch(&self, token: Option<&str>) -> Result<(InitStatus, Option<VesselResponse>), ClientError> {
        let init = self.api.check_init(token).await?;
        let vessel = if init.is_logged_in && !init.vessel_required {
            self.api.get_vessel().await?.vessel().cloned()
        } else {
            None
        };
        Ok((init, vessel))
    }

    /// One combined fetch of database status, initialization state and, once logged
    /// in, the active vessel.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let Some(epoch) = self.begin_refresh() else {
            debug!("refresh suppressed during logout");
            return Ok(());
        };
        let token = self.store.get()?;

        let db = match self.api.test_db().await {
            Ok(status) => DbStatus::Online {
                server_time: status.server_time,
            },
            Err(e) => DbStatus::Offline(e.message()),
        };
        let fetched = self.fetch(token.as_deref()).await;

        let mut state = self.state.lock().await;
        if self.is_stale(epoch) {
            debug!("discarding refresh that started before logout");
            return Ok(());
        }

        state.db = Some(db);
        let (init, vessel) = fetched?;
        state.init = Some(init);
        state.vessel = vessel;
        Ok(())
    }

    pub async fn login(&self, handle: &str, password: &str) -> Result<(), ClientError> {
        let token = self.api.login(handle, password).await?;
        self.store.set(&token)?;
        info!(handle = %handle, "logged in");
        self.refresh().await
    }

    /// Clears the token at once, holds the `LoggingOut` notice for `LOGOUT_NOTICE`,
    /// then drops authenticated state so the login screen shows.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.logging_out.store(true, Ordering::SeqCst);
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let cleared = self.store.clear();
        info!("session closed");

        tokio::time::sleep(LOGOUT_NOTICE).await;

        {
            let mut state = self.state.lock().await;
            state.vessel = None;
            state.init.get_or_insert_with(InitStatus::default).is_logged_in = false;
        }
        self.logging_out.store(false, Ordering::SeqCst);
        cleared
    }

    pub async fn submit_user_setup(&self, form: UserSetupForm) -> Result<(), ClientError> {
        let request = form.into_request()?;
        let token = self.store.get()?;
        self.api.save_user(token.as_deref(), &request).await?;
        info!(handle = %request.user_handle, "user registered");
        self.refresh().await
    }

    pub async fn submit_vessel_setup(&self, form: VesselSetupForm) -> Result<(), ClientError> {
        let request = form.into_request()?;
        let token = self.store.get()?;
        self.api.save_vessel(token.as_deref(), &request).await?;
        info!(vessel = %request.vessel_name, "vessel registered");
        self.refresh().await
    }

    /// `None` until the first refresh has completed.
    pub async fn view(&self) -> Option<View> {
        let state = self.state.lock().await;
        if self.is_logging_out() {
            return Some(View::LoggingOut);
        }

        let init = state.init?;
        Some(select_view(&ViewInputs {
            user_required: init.user_required,
            vessel_required: init.vessel_required,
            is_logged_in: init.is_logged_in,
            vessel_loaded: state.vessel.is_some(),
            logging_out: false,
        }))
    }

    pub async fn vessel(&self) -> Option<VesselResponse> {
        self.state.lock().await.vessel.clone()
    }

    pub async fn db_status(&self) -> Option<DbStatus> {
        self.state.lock().await.db.clone()
    }
}

impl<A, S> ConsoleSession<A, S>
where
    A: ConsoleApi + 'static,
    S: TokenStore + 'static,
{
    /// Refreshes every `period` until the handle is aborted. Only keeps the panel fresh;
    /// correctness never depends on it.
    pub fn spawn_poller(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(err) = session.refresh().await {
                    warn!(error = %err, "background refresh failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::token_store::MemoryTokenStore;
    use crate::models::health::DbStatusResponse;
    use crate::models::user::SaveUserRequest;
    use crate::models::vessel::{GetVesselResponse, SaveVesselRequest, VesselName};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;
    use uuid::Uuid;

    const TOKEN: &str = "header.claims.signature";

    fn vessel_named(name: &str) -> VesselResponse {
        VesselResponse {
            vessel_uuid: Uuid::new_v4(),
            vessel_name: name.to_string(),
            vessel_flag_nation: None,
            vessel_port_of_registry: None,
            vessel_build_details: None,
            vessel_official_number: Some("IRL-1234".to_string()),
            vessel_hull_identification_number: None,
            vessel_keel_offset: None,
            vessel_waterline_offset: None,
            setup_required: false,
        }
    }

    /// Answers like a server with the given state. `check_init` treats any token as valid.
    struct FakeApi {
        user_required: StdMutex<bool>,
        vessel: StdMutex<Option<VesselResponse>>,
        check_init_delay: StdMutex<Duration>,
        db_online: bool,
        calls: AtomicUsize,
        saved_users: StdMutex<Vec<(Option<String>, SaveUserRequest)>>,
    }

    impl FakeApi {
        fn new(user_required: bool, vessel: Option<VesselResponse>) -> Self {
            Self {
                user_required: StdMutex::new(user_required),
                vessel: StdMutex::new(vessel),
                check_init_delay: StdMutex::new(Duration::ZERO),
                db_online: true,
                calls: AtomicUsize::new(0),
                saved_users: StdMutex::new(Vec::new()),
            }
        }

        fn configured() -> Self {
            Self::new(false, Some(vessel_named("Muirgen")))
        }
    }

    #[async_trait]
    impl ConsoleApi for FakeApi {
        async fn check_init(&self, token: Option<&str>) -> Result<InitStatus, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = *self.check_init_delay.lock().unwrap();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let user_required = *self.user_required.lock().unwrap();
            Ok(InitStatus {
                user_required,
                vessel_required: self.vessel.lock().unwrap().is_none(),
                is_logged_in: !user_required && token.is_some(),
            })
        }

        async fn get_vessel(&self) -> Result<GetVesselResponse, ClientError> {
            Ok(match self.vessel.lock().unwrap().clone() {
                Some(vessel) => GetVesselResponse::Found(vessel),
                None => GetVesselResponse::setup_required(),
            })
        }

        async fn list_active_vessels(&self) -> Result<Vec<VesselName>, ClientError> {
            Ok(self
                .vessel
                .lock()
                .unwrap()
                .iter()
                .map(|v| VesselName {
                    uuid: v.vessel_uuid,
                    name: v.vessel_name.clone(),
                })
                .collect())
        }

        async fn test_db(&self) -> Result<DbStatusResponse, ClientError> {
            if self.db_online {
                Ok(DbStatusResponse {
                    status: "Online".to_string(),
                    server_time: "2026-10-19 08:00:00".to_string(),
                })
            } else {
                Err(ClientError::Api {
                    status: 500,
                    message: "Database connection failed".to_string(),
                })
            }
        }

        async fn login(&self, handle: &str, password: &str) -> Result<String, ClientError> {
            if handle == "captain" && password == "hunter22" {
                Ok(TOKEN.to_string())
            } else {
                Err(ClientError::Api {
                    status: 401,
                    message: "Invalid credentials".to_string(),
                })
            }
        }

        async fn save_user(&self, token: Option<&str>, request: &SaveUserRequest) -> Result<(), ClientError> {
            self.saved_users.lock().unwrap().push((token.map(str::to_string), request.clone()));
            *self.user_required.lock().unwrap() = false;
            Ok(())
        }

        async fn save_vessel(&self, _token: Option<&str>, request: &SaveVesselRequest) -> Result<(), ClientError> {
            *self.vessel.lock().unwrap() = Some(vessel_named(&request.vessel_name));
            Ok(())
        }
    }

    fn logged_in_session() -> Arc<ConsoleSession<FakeApi, MemoryTokenStore>> {
        Arc::new(ConsoleSession::new(FakeApi::configured(), MemoryTokenStore::with_token(TOKEN)))
    }

    #[tokio::test]
    async fn no_view_before_first_fetch() {
        let session = logged_in_session();
        assert_eq!(session.view().await, None);
        assert_eq!(session.db_status().await, None);
    }

    #[tokio::test]
    async fn refresh_reaches_ready_with_vessel() {
        let session = logged_in_session();
        session.refresh().await.unwrap();

        assert_eq!(session.view().await, Some(View::Ready));
        assert_eq!(session.vessel().await.unwrap().vessel_name, "Muirgen");
        assert!(matches!(session.db_status().await, Some(DbStatus::Online { .. })));
    }

    #[tokio::test]
    async fn fresh_install_walks_through_setup() {
        let session = ConsoleSession::new(FakeApi::new(true, None), MemoryTokenStore::default());
        session.refresh().await.unwrap();
        assert_eq!(session.view().await, Some(View::VesselSetupRequired));

        let vessel_form = VesselSetupForm {
            name: "Muirgen".to_string(),
            ..VesselSetupForm::default()
        };
        session.submit_vessel_setup(vessel_form).await.unwrap();
        assert_eq!(session.view().await, Some(View::UserSetupRequired));

        let user_form = UserSetupForm {
            handle: "captain".to_string(),
            name: "Captain".to_string(),
            password: "hunter22".to_string(),
            password_confirm: "hunter22".to_string(),
            ..UserSetupForm::default()
        };
        session.submit_user_setup(user_form).await.unwrap();
        assert_eq!(session.view().await, Some(View::LoginRequired));

        session.login("captain", "hunter22").await.unwrap();
        assert_eq!(session.view().await, Some(View::Ready));
    }

    #[tokio::test]
    async fn mismatched_user_form_sends_nothing() {
        let session = ConsoleSession::new(FakeApi::new(true, Some(vessel_named("Muirgen"))), MemoryTokenStore::default());
        let form = UserSetupForm {
            handle: "captain".to_string(),
            name: "Captain".to_string(),
            password: "hunter22".to_string(),
            password_confirm: "hunter2".to_string(),
            ..UserSetupForm::default()
        };

        let err = session.submit_user_setup(form).await.unwrap_err();
        assert!(matches!(err, ClientError::PasswordMismatch));
        assert!(session.api().saved_users.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_login_keeps_store_empty() {
        let session = ConsoleSession::new(FakeApi::configured(), MemoryTokenStore::default());
        let err = session.login("captain", "wrong").await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(session.store.get().unwrap(), None);
    }

    #[tokio::test]
    async fn database_outage_is_reported_on_panel() {
        let mut api = FakeApi::configured();
        api.db_online = false;
        let session = ConsoleSession::new(api, MemoryTokenStore::with_token(TOKEN));
        session.refresh().await.unwrap();

        assert_eq!(session.db_status().await, Some(DbStatus::Offline("Database connection failed".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn logout_shows_notice_then_login() {
        let session = logged_in_session();
        session.refresh().await.unwrap();
        assert_eq!(session.view().await, Some(View::Ready));

        let closing = Arc::clone(&session);
        let logout = tokio::spawn(async move { closing.logout().await });
        tokio::task::yield_now().await;

        assert_eq!(session.view().await, Some(View::LoggingOut));
        assert_eq!(session.store.get().unwrap(), None);

        let calls_before = session.api().calls.load(Ordering::SeqCst);
        session.refresh().await.unwrap();
        assert_eq!(session.api().calls.load(Ordering::SeqCst), calls_before);
        assert_eq!(session.view().await, Some(View::LoggingOut));

        logout.await.unwrap().unwrap();
        assert_eq!(session.view().await, Some(View::LoginRequired));
        assert_eq!(session.vessel().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_in_flight_during_logout_is_discarded() {
        let session = logged_in_session();
        session.refresh().await.unwrap();

        *session.api().check_init_delay.lock().unwrap() = Duration::from_millis(500);
        *session.api().vessel.lock().unwrap() = Some(vessel_named("Impostor"));

        let refreshing = Arc::clone(&session);
        let refresh = tokio::spawn(async move { refreshing.refresh().await });
        tokio::task::yield_now().await;

        let closing = Arc::clone(&session);
        let logout = tokio::spawn(async move { closing.logout().await });
        tokio::task::yield_now().await;

        refresh.await.unwrap().unwrap();
        assert_eq!(session.view().await, Some(View::LoggingOut));
        assert_eq!(session.vessel().await.unwrap().vessel_name, "Muirgen");

        logout.await.unwrap().unwrap();
        assert_eq!(session.view().await, Some(View::LoginRequired));
        assert_eq!(session.vessel().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_refresh_outliving_the_logout_notice_is_discarded() {
        let session = logged_in_session();
        session.refresh().await.unwrap();

        *session.api().check_init_delay.lock().unwrap() = LOGOUT_NOTICE * 2;
        *session.api().vessel.lock().unwrap() = Some(vessel_named("Impostor"));

        let refreshing = Arc::clone(&session);
        let refresh = tokio::spawn(async move { refreshing.refresh().await });
        tokio::task::yield_now().await;

        // the whole logout, flag lowered again, completes while the fetch is pending
        session.logout().await.unwrap();
        assert!(!session.is_logging_out());
        assert_eq!(session.view().await, Some(View::LoginRequired));

        refresh.await.unwrap().unwrap();
        assert_eq!(session.view().await, Some(View::LoginRequired));
        assert_eq!(session.vessel().await, None);
    }

    #[test]
    fn refresh_epoch_is_taken_before_the_logout_flag() {
        let session = ConsoleSession::new(FakeApi::configured(), MemoryTokenStore::with_token(TOKEN));
        let epoch = session.begin_refresh().unwrap();

        // a logout that begins right after the snapshot
        session.logging_out.store(true, Ordering::SeqCst);
        session.epoch.fetch_add(1, Ordering::SeqCst);
        assert!(session.begin_refresh().is_none());

        // once the notice is over, the earlier snapshot is still stale
        session.logging_out.store(false, Ordering::SeqCst);
        assert!(session.is_stale(epoch));
        assert_eq!(session.begin_refresh(), Some(epoch + 1));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_after_logout_window_sees_logged_out_server_state() {
        let session = logged_in_session();
        session.refresh().await.unwrap();
        session.logout().await.unwrap();

        session.refresh().await.unwrap();
        assert_eq!(session.view().await, Some(View::LoginRequired));
    }

    #[tokio::test(start_paused = true)]
    async fn poller_refreshes_in_background() {
        let session = logged_in_session();
        let poller = session.spawn_poller(DEFAULT_POLL_PERIOD);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(session.view().await, Some(View::Ready));

        tokio::time::sleep(DEFAULT_POLL_PERIOD * 3).await;
        assert!(session.api().calls.load(Ordering::SeqCst) >= 3);
        poller.abort();
    }
}
