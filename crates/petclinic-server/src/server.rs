// crates/petclinic-server/src/server.rs
// ============================================================================
// Module: Pet Clinic HTTP Server
// Description: Axum wiring for the clinic router.
// Purpose: Build the store, auth policy, and audit sink from config and serve
//          the clinic HTTP API.
// Dependencies: axum, petclinic-config, petclinic-core, petclinic-store-sqlite,
//               serde, tokio
// ============================================================================

//! ## Overview
//! [`PetClinicServer::from_config`] builds the owner store (memory or
//! `SQLite`), seeds it when empty, and wires the [`ClinicRouter`]. Every HTTP
//! request flows through [`ClinicRouter`]; this module only extracts
//! transport inputs, maps [`ClinicError`] values to status codes, and records
//! one request audit event per call.
//!
//! Routes:
//! - `POST /owners/{ownerId}/pets/{petId}/delete`
//! - `GET /owners`, `POST /owners`
//! - `GET /owners/{ownerId}`
//! - `POST /owners/{ownerId}/pets`
//! - `GET /pettypes`

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use petclinic_config::PetClinicConfig;
use petclinic_config::SeedConfig;
use petclinic_config::ServerAuditConfig;
use petclinic_config::ServerConfig;
use petclinic_config::StoreConfig;
use petclinic_config::StoreType;
use petclinic_core::ClinicService;
use petclinic_core::InMemoryOwnerStore;
use petclinic_core::SharedOwnerStore;
use petclinic_store_sqlite::SqliteOwnerStore;
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::net::TcpListener;

use crate::audit::AuditSink;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::RequestAuditEvent;
use crate::audit::RequestAuditEventParams;
use crate::audit::SecurityAuditEvent;
use crate::audit::StderrAuditSink;
use crate::auth::DefaultRequestAuthz;
use crate::auth::RequestContext;
use crate::router::ClinicError;
use crate::router::ClinicRouter;

// ============================================================================
// SECTION: Server
// ============================================================================

/// Pet clinic server instance.
pub struct PetClinicServer {
    /// Server configuration.
    config: ServerConfig,
    /// Request router.
    router: ClinicRouter,
    /// Audit sink for request events.
    audit: Arc<dyn AuditSink>,
}

impl PetClinicServer {
    /// Builds a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when validation, store setup, seeding, or
    /// audit setup fails.
    pub fn from_config(config: PetClinicConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let store = build_owner_store(&config.store)?;
        let service = ClinicService::new(store);
        seed_owners(&service, &config.seed)?;
        let audit = build_audit_sink(&config.server.audit)?;
        let authz = Arc::new(DefaultRequestAuthz::from_config(config.server.auth.as_ref()));
        let router = ClinicRouter::new(service, authz, Arc::clone(&audit));
        emit_bind_warning(&config.server, audit.as_ref());
        Ok(Self {
            config: config.server,
            router,
            audit,
        })
    }

    /// Returns the request router.
    #[must_use]
    pub const fn router(&self) -> &ClinicRouter {
        &self.router
    }

    /// Builds the axum application.
    #[must_use]
    pub fn app(&self) -> Router {
        build_app(self.router.clone(), Arc::clone(&self.audit), self.config.max_body_bytes)
    }

    /// Binds the configured address and serves until the process exits.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr = self.config.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_with_shutdown(listener, std::future::pending()).await
    }

    /// Serves on an existing listener until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when the server fails.
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.app();
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

/// Builds the axum application over a router and audit sink.
#[must_use]
pub fn build_app(router: ClinicRouter, audit: Arc<dyn AuditSink>, max_body_bytes: usize) -> Router {
    let state = Arc::new(ServerState {
        router,
        audit,
        next_request_id: AtomicU64::new(1),
    });
    Router::new()
        .route("/owners", get(handle_list_owners).post(handle_create_owner))
        .route("/owners/{owner_id}", get(handle_show_owner))
        .route("/owners/{owner_id}/pets", post(handle_add_pet))
        .route("/owners/{owner_id}/pets/{pet_id}/delete", post(handle_delete_pet))
        .route("/pettypes", get(handle_pet_types))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Builds the owner store from configuration.
fn build_owner_store(config: &StoreConfig) -> Result<SharedOwnerStore, ServerError> {
    let store = match config.store_type {
        StoreType::Memory => SharedOwnerStore::from_store(InMemoryOwnerStore::new()),
        StoreType::Sqlite => {
            let sqlite_config = config.sqlite_config().ok_or_else(|| {
                ServerError::Config("sqlite store requires store.path".to_string())
            })?;
            let store = SqliteOwnerStore::new(&sqlite_config)
                .map_err(|err| ServerError::Init(err.to_string()))?;
            SharedOwnerStore::from_store(store)
        }
    };
    Ok(store)
}

/// Saves seeded owners when the store is empty.
fn seed_owners(service: &ClinicService, seed: &SeedConfig) -> Result<(), ServerError> {
    if seed.owners.is_empty() {
        return Ok(());
    }
    let existing = service.find_owners(None).map_err(|err| ServerError::Init(err.to_string()))?;
    if !existing.is_empty() {
        return Ok(());
    }
    let today = OffsetDateTime::now_utc().date();
    for entry in &seed.owners {
        let owner = entry.to_owner().map_err(|err| ServerError::Config(err.to_string()))?;
        service
            .create_owner(owner, today)
            .map_err(|err| ServerError::Init(format!("seed owner {}: {err}", entry.last_name)))?;
    }
    Ok(())
}

/// Builds the audit sink from configuration.
fn build_audit_sink(config: &ServerAuditConfig) -> Result<Arc<dyn AuditSink>, ServerError> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => {
            let sink = FileAuditSink::new(FsPath::new(path))
                .map_err(|err| ServerError::Init(format!("audit log open failed: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

/// Warns when the server listens beyond loopback.
fn emit_bind_warning(server: &ServerConfig, audit: &dyn AuditSink) {
    let Ok(addr) = server.bind_addr() else {
        return;
    };
    if addr.ip().is_loopback() {
        return;
    }
    let message = format!("listening on non-loopback address {addr}; mutations require auth");
    let _ = writeln!(std::io::stderr(), "petclinic-server: WARNING: {message}");
    audit.record_security(&SecurityAuditEvent::new("non_loopback_bind", Some(message)));
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared server state for HTTP handlers.
struct ServerState {
    /// Request router.
    router: ClinicRouter,
    /// Audit sink for request events.
    audit: Arc<dyn AuditSink>,
    /// Monotonic request id source.
    next_request_id: AtomicU64,
}

/// Audit labels for one request.
struct RouteTarget {
    /// HTTP method.
    method: &'static str,
    /// Route label.
    route: &'static str,
    /// Raw owner id path segment.
    owner_id: Option<String>,
    /// Raw pet id path segment.
    pet_id: Option<String>,
}

impl ServerState {
    /// Builds a request context from transport inputs.
    fn request_context(&self, peer: SocketAddr, headers: &HeaderMap) -> RequestContext {
        let auth_header =
            headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()).map(str::to_string);
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        RequestContext::http(Some(peer.ip()), auth_header).with_request_id(format!("req-{request_id}"))
    }

    /// Converts a router outcome into a response and records the audit event.
    fn finish(
        &self,
        ctx: &RequestContext,
        target: RouteTarget,
        result: Result<Response, ClinicError>,
    ) -> Response {
        let (response, error_kind, error_detail) = match result {
            Ok(response) => (response, None, None),
            Err(err) => (error_response(&err), Some(err.kind()), Some(err.to_string())),
        };
        self.audit.record_request(&RequestAuditEvent::new(RequestAuditEventParams {
            request_id: ctx.request_id.clone(),
            peer_ip: ctx.peer_ip.map(|ip| ip.to_string()),
            method: target.method,
            route: target.route,
            owner_id: target.owner_id,
            pet_id: target.pet_id,
            status: response.status().as_u16(),
            error_kind,
            error_detail,
        }));
        response
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Query parameters for the owner listing.
#[derive(Debug, Deserialize)]
struct OwnerQuery {
    /// Last-name prefix filter.
    #[serde(rename = "lastName")]
    last_name: Option<String>,
}

/// Handles `POST /owners/{ownerId}/pets/{petId}/delete`.
async fn handle_delete_pet(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path((owner_id, pet_id)): Path<(String, String)>,
) -> Response {
    let ctx = state.request_context(peer, &headers);
    let result = run_blocking(|| state.router.delete_pet(&ctx, &owner_id, &pet_id))
        .map(|_| StatusCode::OK.into_response());
    state.finish(
        &ctx,
        RouteTarget {
            method: "POST",
            route: "delete_pet",
            owner_id: Some(owner_id),
            pet_id: Some(pet_id),
        },
        result,
    )
}

/// Handles `GET /owners`.
async fn handle_list_owners(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(query): Query<OwnerQuery>,
) -> Response {
    let ctx = state.request_context(peer, &headers);
    let result = run_blocking(|| state.router.list_owners(query.last_name.as_deref()))
        .map(|owners| Json(owners).into_response());
    state.finish(
        &ctx,
        RouteTarget {
            method: "GET",
            route: "list_owners",
            owner_id: None,
            pet_id: None,
        },
        result,
    )
}

/// Handles `POST /owners`.
async fn handle_create_owner(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = state.request_context(peer, &headers);
    let result = run_blocking(|| state.router.create_owner(&ctx, &body))
        .map(|owner| (StatusCode::CREATED, Json(owner)).into_response());
    state.finish(
        &ctx,
        RouteTarget {
            method: "POST",
            route: "create_owner",
            owner_id: None,
            pet_id: None,
        },
        result,
    )
}

/// Handles `GET /owners/{ownerId}`.
async fn handle_show_owner(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(owner_id): Path<String>,
) -> Response {
    let ctx = state.request_context(peer, &headers);
    let result = run_blocking(|| state.router.show_owner(&owner_id))
        .map(|owner| Json(owner).into_response());
    state.finish(
        &ctx,
        RouteTarget {
            method: "GET",
            route: "show_owner",
            owner_id: Some(owner_id),
            pet_id: None,
        },
        result,
    )
}

/// Handles `POST /owners/{ownerId}/pets`.
async fn handle_add_pet(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(owner_id): Path<String>,
    body: Bytes,
) -> Response {
    let ctx = state.request_context(peer, &headers);
    let result = run_blocking(|| state.router.add_pet(&ctx, &owner_id, &body))
        .map(|pet| (StatusCode::CREATED, Json(pet)).into_response());
    state.finish(
        &ctx,
        RouteTarget {
            method: "POST",
            route: "add_pet",
            owner_id: Some(owner_id),
            pet_id: None,
        },
        result,
    )
}

/// Handles `GET /pettypes`.
async fn handle_pet_types(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let ctx = state.request_context(peer, &headers);
    let result =
        run_blocking(|| state.router.pet_types()).map(|types| Json(types).into_response());
    state.finish(
        &ctx,
        RouteTarget {
            method: "GET",
            route: "pet_types",
            owner_id: None,
            pet_id: None,
        },
        result,
    )
}

/// Runs store-bound work, shifting to a blocking context when available.
fn run_blocking<T>(work: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(work)
        }
        _ => work(),
    }
}

// ============================================================================
// SECTION: Error Mapping
// ============================================================================

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// HTTP status code.
    status: u16,
    /// Canonical reason phrase.
    error: &'static str,
    /// Client-facing message.
    message: String,
}

/// Returns the HTTP status for a router error.
const fn status_for(error: &ClinicError) -> StatusCode {
    match error {
        ClinicError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        ClinicError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ClinicError::NotFound(_) => StatusCode::NOT_FOUND,
        ClinicError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builds the JSON error response for a router error.
fn error_response(error: &ClinicError) -> Response {
    let status = status_for(error);
    let message = match error {
        ClinicError::Internal(_) => "Internal server error".to_string(),
        ClinicError::Unauthenticated(_) => error.to_string(),
        ClinicError::BadRequest(message) | ClinicError::NotFound(message) => message.clone(),
    };
    let body = ErrorBody {
        status: status.as_u16(),
        error: status.canonical_reason().unwrap_or("Error"),
        message,
    };
    (status, Json(body)).into_response()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
