mod cli;
mod input;
mod payload;
mod store;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tower_http::trace::TraceLayer;

use crate::core::{
    BudgetResult, DebtParameters, DebtResult, InvestmentResult, MortgageCapacity,
    MortgageCapacityResult, MortgageStructure, MortgageStructureResult, SalaryParameters,
    SimulationParameters, compute_budget, compute_mortgage_capacity, compute_mortgage_structure,
    simulate_debt_payoff, simulate_investment,
};

pub use cli::{Cli, Command, run_cli};
pub use input::{NumberInput, parse_number};
pub use payload::{
    BucketMode, BudgetPayload, CapacityPayload, DebtPayload, InvestPayload, Resolver,
    StructurePayload,
};
pub use store::{FieldStore, StoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("background task failed: {0}")]
    Task(#[from] JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        json_response(
            status,
            ErrorResponse {
                error: self.to_string(),
            },
        )
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<FieldStore>>,
    // Orders disk writes so an older snapshot never lands after a newer one.
    save_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(store: FieldStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            save_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn store(&self) -> MutexGuard<'_, FieldStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Merges `fields` into the store and writes a snapshot to disk on the
    /// blocking pool. The store lock is only held for the merge.
    async fn persist(
        &self,
        fields: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<FieldStore, ApiError> {
        let _writing = self.save_lock.lock().await;
        let snapshot = {
            let mut store = self.store();
            store.merge(fields);
            store.clone()
        };
        let saved = tokio::task::spawn_blocking(move || {
            snapshot.save()?;
            Ok::<_, StoreError>(snapshot)
        })
        .await??;
        Ok(saved)
    }
}

/// A calculator reachable over HTTP. The payload resolves itself against the
/// field store, and the resolved request values are written back afterwards.
trait Calculation: DeserializeOwned + Send + 'static {
    const PREFIX: &'static str;
    type Params: Send;
    type Output: Serialize + Send;

    fn params(&self, resolver: &mut Resolver<'_>) -> Self::Params;

    fn run(params: &Self::Params) -> Self::Output;
}

impl Calculation for InvestPayload {
    const PREFIX: &'static str = "invest";
    type Params = SimulationParameters;
    type Output = InvestmentResult;

    fn params(&self, resolver: &mut Resolver<'_>) -> Self::Params {
        self.resolve(resolver)
    }

    fn run(params: &Self::Params) -> Self::Output {
        simulate_investment(params)
    }
}

impl Calculation for DebtPayload {
    const PREFIX: &'static str = "debt";
    type Params = DebtParameters;
    type Output = DebtResult;

    fn params(&self, resolver: &mut Resolver<'_>) -> Self::Params {
        self.resolve(resolver)
    }

    fn run(params: &Self::Params) -> Self::Output {
        simulate_debt_payoff(params)
    }
}

impl Calculation for StructurePayload {
    const PREFIX: &'static str = "mortgage";
    type Params = MortgageStructure;
    type Output = MortgageStructureResult;

    fn params(&self, resolver: &mut Resolver<'_>) -> Self::Params {
        self.resolve(resolver)
    }

    fn run(params: &Self::Params) -> Self::Output {
        compute_mortgage_structure(params)
    }
}

impl Calculation for CapacityPayload {
    const PREFIX: &'static str = "capacity";
    type Params = MortgageCapacity;
    type Output = MortgageCapacityResult;

    fn params(&self, resolver: &mut Resolver<'_>) -> Self::Params {
        self.resolve(resolver)
    }

    fn run(params: &Self::Params) -> Self::Output {
        compute_mortgage_capacity(params)
    }
}

impl Calculation for BudgetPayload {
    const PREFIX: &'static str = "budget";
    type Params = SalaryParameters;
    type Output = BudgetResult;

    fn params(&self, resolver: &mut Resolver<'_>) -> Self::Params {
        self.resolve(resolver)
    }

    fn run(params: &Self::Params) -> Self::Output {
        compute_budget(params)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/invest",
            get(calculate_get::<InvestPayload>).post(calculate_post::<InvestPayload>),
        )
        .route(
            "/api/debt",
            get(calculate_get::<DebtPayload>).post(calculate_post::<DebtPayload>),
        )
        .route(
            "/api/mortgage/structure",
            get(calculate_get::<StructurePayload>).post(calculate_post::<StructurePayload>),
        )
        .route(
            "/api/mortgage/capacity",
            get(calculate_get::<CapacityPayload>).post(calculate_post::<CapacityPayload>),
        )
        .route(
            "/api/budget",
            get(calculate_get::<BudgetPayload>).post(calculate_post::<BudgetPayload>),
        )
        .route("/api/fields", get(fields_get_handler).put(fields_put_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_http_server(port: u16, store_path: PathBuf) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let store = FieldStore::load(store_path);
    let app = router(AppState::new(store));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "finplan HTTP API listening");
    tracing::info!("Local access: http://127.0.0.1:{port}/health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    ApiError::NotFound.into_response()
}

async fn calculate_get<C: Calculation>(
    State(state): State<AppState>,
    payload: Result<Query<C>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(run_calculation(state, payload).await)
}

async fn calculate_post<C: Calculation>(
    State(state): State<AppState>,
    payload: Result<Json<C>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(run_calculation(state, payload).await)
}

async fn run_calculation<C: Calculation>(state: AppState, payload: C) -> Response {
    let (params, touched) = {
        let store = state.store();
        let mut resolver = Resolver::new(&store, C::PREFIX);
        let params = payload.params(&mut resolver);
        (params, resolver.into_touched())
    };
    let output = C::run(&params);

    if !touched.is_empty() {
        tracing::debug!(calculator = C::PREFIX, fields = touched.len(), "persisting fields");
        if let Err(err) = state.persist(touched).await {
            tracing::warn!(calculator = C::PREFIX, %err, "could not persist fields");
        }
    }
    json_response(StatusCode::OK, output)
}

async fn fields_get_handler(State(state): State<AppState>) -> Response {
    let store = state.store();
    json_response(StatusCode::OK, store.fields())
}

async fn fields_put_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let Value::Object(fields) = body else {
        return Err(ApiError::BadRequest(
            "fields payload must be a JSON object".to_string(),
        ));
    };

    let store = state.persist(fields).await?;
    Ok(json_response(StatusCode::OK, store.fields()))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}
