use crate::events::EventBus;
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::middleware;
use crate::session::SessionManager;
use crate::settings::SettingsStore;
use crate::static_handler::StaticHandler;
use std::convert::Infallible;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::handlers;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::net::ToSocketAddrs;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::filters::BoxedFilter;
use warp::reply::{self, Response};
use warp::{Filter, Reply};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    static_dir: PathBuf,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            port,
            static_dir: static_dir.into(),
        }
    }

    pub fn for_tests() -> Self {
        let dir = std::env::temp_dir().join("greenfelt_web_static");
        Self::new("127.0.0.1", 0, dir)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }
}

/// Everything the route tree needs, shared by reference.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: ServerConfig,
    event_bus: Arc<EventBus>,
    sessions: Arc<SessionManager>,
    static_handler: Arc<StaticHandler>,
    settings: Arc<SettingsStore>,
    metrics: MetricsCollector,
    started_at: DateTime<Utc>,
}

impl AppContext {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        if !config.static_dir().exists() {
            fs::create_dir_all(config.static_dir())
                .map_err(|err| ServerError::ConfigError(err.to_string()))?;
        }

        let event_bus = Arc::new(EventBus::new());
        let metrics = MetricsCollector::new();
        let sessions = Arc::new(SessionManager::with_metrics(
            Arc::clone(&event_bus),
            metrics.clone(),
        ));
        let static_handler = Arc::new(StaticHandler::new(config.static_dir().to_path_buf()));
        let settings = Arc::new(SettingsStore::new());

        Ok(Self::new_with_dependencies(
            config,
            event_bus,
            sessions,
            static_handler,
            settings,
            metrics,
        ))
    }

    pub fn new_with_dependencies(
        config: ServerConfig,
        event_bus: Arc<EventBus>,
        sessions: Arc<SessionManager>,
        static_handler: Arc<StaticHandler>,
        settings: Arc<SettingsStore>,
        metrics: MetricsCollector,
    ) -> Self {
        Self {
            config,
            event_bus,
            sessions,
            static_handler,
            settings,
            metrics,
            started_at: Utc::now(),
        }
    }

    pub fn new_for_tests() -> Self {
        Self::new(ServerConfig::for_tests()).expect("test context")
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn sessions(&self) -> Arc<SessionManager> {
        Arc::clone(&self.sessions)
    }

    pub fn static_handler(&self) -> Arc<StaticHandler> {
        Arc::clone(&self.static_handler)
    }

    pub fn settings(&self) -> Arc<SettingsStore> {
        Arc::clone(&self.settings)
    }

    pub fn metrics(&self) -> MetricsCollector {
        self.metrics.clone()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Wire shape of `GET /api/metrics`.
#[derive(Debug, Serialize)]
struct MetricsResponse {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    average_response_time_ms: u64,
    success_rate: f64,
    active_sessions: u64,
    total_events_broadcast: u64,
    total_rounds_settled: u64,
}

impl From<MetricsSnapshot> for MetricsResponse {
    fn from(snapshot: MetricsSnapshot) -> Self {
        Self {
            total_requests: snapshot.total_requests,
            successful_requests: snapshot.successful_requests,
            failed_requests: snapshot.failed_requests,
            average_response_time_ms: snapshot.average_response_time_ms(),
            success_rate: snapshot.success_rate(),
            active_sessions: snapshot.active_sessions,
            total_events_broadcast: snapshot.total_events_broadcast,
            total_rounds_settled: snapshot.total_rounds_settled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let context = AppContext::new(config)?;
        Ok(Self { context })
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let config = context.config().clone();
        let bind_addr = Self::bind_addr(&config)?;

        let preflight = if bind_addr.port() != 0 {
            Some(std::net::TcpListener::bind(bind_addr).map_err(ServerError::BindError)?)
        } else {
            None
        };
        drop(preflight);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let routes = Self::routes(&context);
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        tracing::info!(address = %addr, "web server listening");

        let task = tokio::spawn(async move {
            server_future.await;
            Ok(())
        });

        Ok(ServerHandle::new(addr, shutdown_tx, task, context))
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        let host = config.host();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }

        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }

        let candidate = format!("{}:{}", host, config.port());
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;

        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        if let Some(source) = err.source() {
            if let Some(io_err) = source.downcast_ref::<std::io::Error>() {
                let recreated = std::io::Error::new(io_err.kind(), io_err.to_string());
                return ServerError::BindError(recreated);
            }
        }

        ServerError::ConfigError(err.to_string())
    }

    fn routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let health = Self::health_route(context);
        let metrics_route = Self::metrics_route(context);
        let session_routes = Self::session_routes(context);
        let wallet_routes = Self::wallet_routes(context);
        let blackjack_routes = Self::blackjack_routes(context);
        let roulette_routes = Self::roulette_routes(context);
        let slots_routes = Self::slots_routes(context);
        let poker_routes = Self::poker_routes(context);
        let history_routes = Self::history_routes(context);
        let settings_routes = Self::settings_routes(context);
        let sse_routes = Self::sse_routes(context);
        let static_routes = Self::static_routes(context);

        let all = health
            .or(metrics_route)
            .unify()
            .or(session_routes)
            .unify()
            .or(wallet_routes)
            .unify()
            .or(blackjack_routes)
            .unify()
            .or(roulette_routes)
            .unify()
            .or(slots_routes)
            .unify()
            .or(poker_routes)
            .unify()
            .or(history_routes)
            .unify()
            .or(settings_routes)
            .unify()
            .or(sse_routes)
            .unify()
            .or(static_routes)
            .unify();

        middleware::with_request_metrics(all, context.metrics()).boxed()
    }

    fn health_route(context: &AppContext) -> BoxedFilter<(Response,)> {
        let started_at = context.started_at();

        warp::path!("api" / "health")
            .and(warp::get())
            .map(move || handlers::health::health(started_at).into_response())
            .boxed()
    }

    fn metrics_route(context: &AppContext) -> BoxedFilter<(Response,)> {
        let metrics = context.metrics();

        warp::path!("api" / "metrics")
            .and(warp::get())
            .map(move || {
                let body = MetricsResponse::from(metrics.snapshot());
                reply::json(&body).into_response()
            })
            .boxed()
    }

    fn session_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let sessions = context.sessions();
        let settings = context.settings();

        let create = warp::path!("api" / "sessions")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and(Self::with_settings_store(settings))
            .and(warp::body::json())
            .and_then(
                |sessions: Arc<SessionManager>,
                 settings: Arc<SettingsStore>,
                 request: handlers::CreateSessionRequest| async move {
                    let response = handlers::create_session(sessions, settings, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let info = warp::path!("api" / "sessions" / String)
            .and(warp::get())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::get_session(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let delete = warp::path!("api" / "sessions" / String)
            .and(warp::delete())
            .and(Self::with_session_manager(sessions))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::delete_session(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        create
            .or(info)
            .unify()
            .or(delete)
            .unify()
            .boxed()
    }

    fn wallet_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let sessions = context.sessions();

        let get = warp::path!("api" / "sessions" / String / "wallet")
            .and(warp::get())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::get_wallet(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let connect = warp::path!("api" / "sessions" / String / "wallet" / "connect")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::connect_wallet(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let disconnect = warp::path!("api" / "sessions" / String / "wallet" / "disconnect")
            .and(warp::post())
            .and(Self::with_session_manager(sessions))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::disconnect_wallet(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        get.or(connect).unify().or(disconnect).unify().boxed()
    }

    fn blackjack_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let sessions = context.sessions();

        let table = warp::path!("api" / "sessions" / String / "blackjack")
            .and(warp::get())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::get_blackjack(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let deal = warp::path!("api" / "sessions" / String / "blackjack" / "deal")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and(warp::body::json())
            .and_then(
                |session_id: String,
                 sessions: Arc<SessionManager>,
                 request: handlers::StakeRequest| async move {
                    let response = handlers::blackjack_deal(sessions, session_id, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let hit = warp::path!("api" / "sessions" / String / "blackjack" / "hit")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::blackjack_hit(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let stand = warp::path!("api" / "sessions" / String / "blackjack" / "stand")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::blackjack_stand(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let reset = warp::path!("api" / "sessions" / String / "blackjack" / "reset")
            .and(warp::post())
            .and(Self::with_session_manager(sessions))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::blackjack_reset(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        table
            .or(deal)
            .unify()
            .or(hit)
            .unify()
            .or(stand)
            .unify()
            .or(reset)
            .unify()
            .boxed()
    }

    fn roulette_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let sessions = context.sessions();

        let table = warp::path!("api" / "sessions" / String / "roulette")
            .and(warp::get())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::get_roulette(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let place = warp::path!("api" / "sessions" / String / "roulette" / "bets")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and(warp::body::json())
            .and_then(
                |session_id: String,
                 sessions: Arc<SessionManager>,
                 request: handlers::BetRequest| async move {
                    let response =
                        handlers::place_roulette_bet(sessions, session_id, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let clear = warp::path!("api" / "sessions" / String / "roulette" / "bets")
            .and(warp::delete())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::clear_roulette_bets(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let spin = warp::path!("api" / "sessions" / String / "roulette" / "spin")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::spin_roulette(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let reset = warp::path!("api" / "sessions" / String / "roulette" / "reset")
            .and(warp::post())
            .and(Self::with_session_manager(sessions))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::reset_roulette(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        table
            .or(place)
            .unify()
            .or(clear)
            .unify()
            .or(spin)
            .unify()
            .or(reset)
            .unify()
            .boxed()
    }

    fn slots_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let sessions = context.sessions();

        let machine = warp::path!("api" / "sessions" / String / "slots")
            .and(warp::get())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::get_slots(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let spin = warp::path!("api" / "sessions" / String / "slots" / "spin")
            .and(warp::post())
            .and(Self::with_session_manager(sessions))
            .and(warp::body::json())
            .and_then(
                |session_id: String,
                 sessions: Arc<SessionManager>,
                 request: handlers::StakeRequest| async move {
                    let response = handlers::spin_slots(sessions, session_id, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        machine.or(spin).unify().boxed()
    }

    fn poker_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let sessions = context.sessions();

        let table = warp::path!("api" / "sessions" / String / "poker")
            .and(warp::get())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::get_poker(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let join = warp::path!("api" / "sessions" / String / "poker" / "join")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and(warp::body::json())
            .and_then(
                |session_id: String,
                 sessions: Arc<SessionManager>,
                 request: handlers::BuyInRequest| async move {
                    let response = handlers::join_poker(sessions, session_id, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let action = warp::path!("api" / "sessions" / String / "poker" / "action")
            .and(warp::post())
            .and(Self::with_session_manager(sessions))
            .and(warp::body::json())
            .and_then(
                |session_id: String,
                 sessions: Arc<SessionManager>,
                 request: handlers::PokerActionRequest| async move {
                    let response = handlers::poker_action(sessions, session_id, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        table.or(join).unify().or(action).unify().boxed()
    }

    fn history_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let sessions = context.sessions();

        handlers::session_history(Arc::clone(&sessions))
            .or(handlers::session_stats(sessions))
            .unify()
            .boxed()
    }

    fn settings_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let settings = context.settings();

        let get = warp::path!("api" / "settings")
            .and(warp::get())
            .and(Self::with_settings_store(settings.clone()))
            .and_then(|store: Arc<SettingsStore>| async move {
                let response = handlers::get_settings(store).await;
                Ok::<_, Infallible>(response)
            });

        let update = warp::path!("api" / "settings")
            .and(warp::put())
            .and(Self::with_settings_store(settings.clone()))
            .and(warp::body::json())
            .and_then(
                |store: Arc<SettingsStore>,
                 request: handlers::UpdateSettingsRequest| async move {
                    let response = handlers::update_settings(store, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let reset = warp::path!("api" / "settings" / "reset")
            .and(warp::post())
            .and(Self::with_settings_store(settings.clone()))
            .and_then(|store: Arc<SettingsStore>| async move {
                let response = handlers::reset_settings(store).await;
                Ok::<_, Infallible>(response)
            });

        let update_field = warp::path!("api" / "settings" / String)
            .and(warp::put())
            .and(Self::with_settings_store(settings))
            .and(warp::body::json())
            .and_then(
                |field: String, store: Arc<SettingsStore>, value: serde_json::Value| async move {
                    let request = handlers::UpdateFieldRequest { field, value };
                    let response = handlers::update_field(store, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        get.or(update)
            .unify()
            .or(reset)
            .unify()
            .or(update_field)
            .unify()
            .boxed()
    }

    fn sse_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let sessions = context.sessions();

        warp::path!("api" / "sessions" / String / "events")
            .and(warp::get())
            .and(Self::with_session_manager(sessions))
            .and_then(
                |session_id: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::sse::stream_events(session_id, sessions).await;
                    Ok::<_, Infallible>(response)
                },
            )
            .boxed()
    }

    fn static_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let handler = context.static_handler();

        let index = warp::path::end()
            .and(warp::get())
            .and(Self::with_static_handler(handler.clone()))
            .and_then(|handler: Arc<StaticHandler>| async move {
                let response = handler
                    .index()
                    .await
                    .unwrap_or_else(|err| handler.error_response(err));
                Ok::<_, Infallible>(response)
            });

        let assets = warp::path("static")
            .and(warp::path::tail())
            .and(warp::get())
            .and(Self::with_static_handler(handler))
            .and_then(
                |tail: warp::path::Tail, handler: Arc<StaticHandler>| async move {
                    let response = handler
                        .asset(tail.as_str())
                        .await
                        .unwrap_or_else(|err| handler.error_response(err));
                    Ok::<_, Infallible>(response)
                },
            );

        index.or(assets).unify().boxed()
    }

    fn with_static_handler(
        handler: Arc<StaticHandler>,
    ) -> impl Filter<Extract = (Arc<StaticHandler>,), Error = Infallible> + Clone {
        warp::any().map(move || handler.clone())
    }

    fn with_session_manager(
        sessions: Arc<SessionManager>,
    ) -> impl Filter<Extract = (Arc<SessionManager>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&sessions))
    }

    fn with_settings_store(
        settings: Arc<SettingsStore>,
    ) -> impl Filter<Extract = (Arc<SettingsStore>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&settings))
    }
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
    context: AppContext,
}

impl ServerHandle {
    fn new(
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<Result<(), ServerError>>,
        context: AppContext,
    ) -> Self {
        Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
            context,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            match task.await {
                Ok(result) => result?,
                Err(err) => {
                    return Err(ServerError::ConfigError(format!(
                        "server task join error: {err}"
                    )))
                }
            }
        }

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
