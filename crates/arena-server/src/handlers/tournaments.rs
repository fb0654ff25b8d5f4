//! Tournaments API endpoint.
//!
//! Returns the tournament cards shown on the dashboard.

use std::sync::Arc;

use arena_tournament::Tournament;
use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

/// Status labels accepted by the `status` filter.
const STATUSES: [&str; 3] = ["live", "upcoming", "completed"];

/// Query parameters for GET /api/tournaments.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TournamentQuery {
    /// Only return tournaments with this status.
    status: Option<String>,
}

/// Response for GET /api/tournaments.
#[derive(Serialize)]
pub(crate) struct TournamentsResponse {
    /// Tournament cards in file order.
    tournaments: Vec<Tournament>,
}

/// Handle GET /api/tournaments.
pub(crate) async fn list_tournaments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TournamentQuery>,
) -> Result<Json<TournamentsResponse>, ServerError> {
    let all = state.tournaments.as_deref().unwrap_or_default();
    let tournaments = filter(all, query.status.as_deref())?;
    Ok(Json(TournamentsResponse { tournaments }))
}

/// Select tournaments matching the optional status label.
fn filter(all: &[Tournament], status: Option<&str>) -> Result<Vec<Tournament>, ServerError> {
    let Some(status) = status else {
        return Ok(all.to_vec());
    };
    if !STATUSES.contains(&status) {
        return Err(ServerError::InvalidStatus(status.to_owned()));
    }
    Ok(all
        .iter()
        .filter(|t| t.status.label() == status)
        .cloned()
        .collect())
}
