//! HTTP front-end.
//!
//! Routes:
//!
//! - `GET  /health`
//! - `GET  /combine?element-one=..&element-two=..` stateless recipe lookup
//! - `GET  /players/{id}/discovered`
//! - `POST /players/{id}/combine` discovery-gated combine, committed at once
//! - `GET  /untried`

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use derive_new::new;
use open_craft_engine::{CombineOutcome, Element, Identity, SessionDirectory};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::messages;

/// Shared state behind every handler.
#[derive(Debug, Clone, new)]
pub struct ServerState {
    directory: SessionDirectory,
}

// ── Request / response types ────────────────────────────────────────────

/// Health probe body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Open player sessions.
    pub sessions: usize,
}

/// Query string of the stateless lookup.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    #[serde(rename = "element-one", default)]
    element_one: String,
    #[serde(rename = "element-two", default)]
    element_two: String,
}

/// Stateless lookup result.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LookupResponse {
    /// True when a recipe matched.
    pub success: bool,
    /// Display name of the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Miss message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /players/{id}/combine`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CombineRequest {
    /// First element (any case or spacing).
    pub element_one: String,
    /// Second element.
    pub element_two: String,
}

/// Result of a player's combine.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombineResponse {
    /// True when a recipe matched.
    pub success: bool,
    /// Display name of the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// True when the result was not discovered before.
    pub new_discovery: bool,
    /// Rejection message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// False when the progress write failed.
    pub saved: bool,
    /// Save failure detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// One element as reported over HTTP.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ElementView {
    /// Canonical id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category label, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl From<&Element> for ElementView {
    fn from(element: &Element) -> Self {
        Self {
            id: element.id().to_string(),
            name: element.name().to_string(),
            category: element.category().map(|c| c.to_string()),
        }
    }
}

/// A player's discovered elements.
#[derive(Debug, Serialize, Deserialize)]
pub struct DiscoveredResponse {
    /// Player id.
    pub player: i64,
    /// Number discovered.
    pub count: usize,
    /// Number of elements in the catalog.
    pub total: usize,
    /// Discovered elements, sorted by name.
    pub elements: Vec<ElementView>,
}

/// One untried pair.
#[derive(Debug, Serialize, Deserialize)]
pub struct UntriedView {
    /// Id of the first element.
    pub first: String,
    /// Id of the second element.
    pub second: String,
    /// `"First + Second"` with display names.
    pub label: String,
}

/// Enumerator output.
#[derive(Debug, Serialize, Deserialize)]
pub struct UntriedResponse {
    /// Number of untried pairs.
    pub count: usize,
    /// Pairs in deterministic order.
    pub combinations: Vec<UntriedView>,
}

// ── Router ──────────────────────────────────────────────────────────────

/// Builds the application router.
pub fn router(directory: SessionDirectory) -> Router {
    let state = Arc::new(ServerState::new(directory));
    Router::new()
        .route("/health", get(health))
        .route("/combine", get(lookup).fallback(method_not_allowed))
        .route("/players/{id}/discovered", get(discovered))
        .route("/players/{id}/combine", post(player_combine))
        .route("/untried", get(untried))
        .with_state(state)
}

/// Binds and serves until the process is stopped.
#[instrument(skip(directory))]
pub async fn serve(directory: SessionDirectory, host: &str, port: u16) -> anyhow::Result<()> {
    let app = router(directory);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(host, port, "HTTP server ready");
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.directory.len(),
    })
}

async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

#[instrument(skip(state))]
async fn lookup(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<LookupQuery>,
) -> Json<LookupResponse> {
    let catalog = state.directory.catalog();
    let response = match catalog.lookup(&query.element_one, &query.element_two) {
        Some(element) => LookupResponse {
            success: true,
            result: Some(element.name().to_string()),
            error: None,
        },
        None => LookupResponse {
            success: false,
            result: None,
            error: Some(messages::LOOKUP_MISS.to_string()),
        },
    };
    Json(response)
}

#[instrument(skip(state))]
async fn discovered(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<i64>,
) -> Json<DiscoveredResponse> {
    let response = state.directory.with_session(&Identity::Player(id), |session| {
        let (count, total) = session.progress();
        DiscoveredResponse {
            player: id,
            count,
            total,
            elements: session
                .discovered_list()
                .into_iter()
                .map(ElementView::from)
                .collect(),
        }
    });
    Json(response)
}

#[instrument(skip(state, request))]
async fn player_combine(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<i64>,
    Json(request): Json<CombineRequest>,
) -> Json<CombineResponse> {
    let response = state.directory.with_session(&Identity::Player(id), |session| {
        let report = session.combine(&request.element_one, &request.element_two);
        let warning = report.save_error().as_ref().map(|e| {
            warn!(player = id, error = %e, "Progress not saved");
            format!("Progress could not be saved: {}", e.message)
        });
        let (success, result, error) = match report.outcome() {
            CombineOutcome::Created { result, .. } => (
                true,
                Some(session.catalog().display_name(result).to_string()),
                None,
            ),
            CombineOutcome::Undiscovered { .. } => {
                (false, None, Some(messages::NOT_DISCOVERED.to_string()))
            }
            CombineOutcome::NoRecipe => (false, None, Some(messages::CANNOT_COMBINE.to_string())),
        };
        CombineResponse {
            success,
            result,
            new_discovery: report.outcome().is_new_discovery(),
            error,
            saved: report.saved(),
            warning,
        }
    });
    Json(response)
}

async fn untried(State(state): State<Arc<ServerState>>) -> Json<UntriedResponse> {
    let combinations: Vec<UntriedView> = state
        .directory
        .catalog()
        .untried_combinations()
        .iter()
        .map(|c| UntriedView {
            first: c.first().id().to_string(),
            second: c.second().id().to_string(),
            label: c.to_string(),
        })
        .collect();
    Json(UntriedResponse {
        count: combinations.len(),
        combinations,
    })
}
