//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};
use uuid::Uuid;

use crate::domain::{DurationSet, FlightEvent, RawClockTime, normalize_sequence, validate};
use crate::logbook::{Logbook, LogbookError};
use crate::store::StoreError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/times/preview", post(preview_times))
        .route("/legs/validate", post(validate_leg))
        .route("/legs", get(list_legs).post(create_leg))
        .route("/legs/:id", put(update_leg).delete(delete_leg))
        .route("/import", post(import_legs))
        .route("/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Resolve partially typed times as the user enters them.
///
/// Each field is read leniently ("9" is 09:00, "930" is 09:30) and the
/// sequence is normalized from scratch.
async fn preview_times(
    Json(req): Json<TimesPreviewRequest>,
) -> Result<Json<TimesPreviewResponse>, AppError> {
    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
    let entries = req.entries();

    let parse = |event: FlightEvent| {
        RawClockTime::parse_interactive(entries[event.index()]).map_err(|e| AppError::BadRequest {
            message: format!("{event}: {e}"),
        })
    };
    let raw = [
        parse(FlightEvent::Out)?,
        parse(FlightEvent::Off)?,
        parse(FlightEvent::On)?,
        parse(FlightEvent::In)?,
    ];

    let times = normalize_sequence(date, raw).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    Ok(Json(TimesPreviewResponse {
        date,
        events: EventResult::from_times(&times),
        durations: DurationsResult::from_durations(&DurationSet::compute(&times)),
    }))
}

/// Check a leg against every rule without saving it.
async fn validate_leg(Json(req): Json<LegRequest>) -> Json<ValidateResponse> {
    let draft = req.into_draft(None);

    let response = match validate(&draft) {
        Ok(times) => ValidateResponse {
            valid: true,
            error: None,
            durations: Some(DurationsResult::from_durations(&DurationSet::compute(
                &times,
            ))),
        },
        Err(e) => ValidateResponse {
            valid: false,
            error: Some(e.into()),
            durations: draft
                .normalized()
                .ok()
                .map(|times| DurationsResult::from_durations(&DurationSet::compute(&times))),
        },
    };

    Json(response)
}

/// Run a logbook call on the blocking pool.
///
/// Store implementations may do file I/O under a lock, which must not stall
/// the async workers.
async fn with_logbook<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Logbook) -> Result<T, LogbookError> + Send + 'static,
    T: Send + 'static,
{
    let logbook = state.logbook.clone();
    let result = tokio::task::spawn_blocking(move || f(&logbook))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("logbook task failed: {e}"),
        })?;
    Ok(result?)
}

/// List every stored leg, oldest first.
async fn list_legs(State(state): State<AppState>) -> Result<Json<Vec<LegResult>>, AppError> {
    let legs = with_logbook(&state, |book| book.legs()).await?;
    Ok(Json(legs.iter().map(LegResult::from_leg).collect()))
}

/// Validate and store a new leg.
async fn create_leg(
    State(state): State<AppState>,
    Json(req): Json<LegRequest>,
) -> Result<(StatusCode, Json<LegResult>), AppError> {
    let draft = req.into_draft(None);
    let leg = with_logbook(&state, move |book| book.save(draft)).await?;
    Ok((StatusCode::CREATED, Json(LegResult::from_leg(&leg))))
}

/// Validate and replace a stored leg.
async fn update_leg(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<LegRequest>,
) -> Result<Json<LegResult>, AppError> {
    let draft = req.into_draft(Some(id));
    let leg = with_logbook(&state, move |book| book.update(id, draft)).await?;
    Ok(Json(LegResult::from_leg(&leg)))
}

/// Delete a stored leg.
async fn delete_leg(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    with_logbook(&state, move |book| book.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Import tokenized rows, storing the valid ones.
async fn import_legs(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    let rows = req.import_rows();
    let mapping = req.mapping;
    let outcome = with_logbook(&state, move |book| Ok(book.import(&rows, &mapping))).await?;
    Ok(Json(ImportResponse::from_outcome(&outcome)))
}

/// Monthly and all-time totals.
async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let (all_time, monthly) = with_logbook(&state, |book| {
        Ok((book.all_time_totals()?, book.monthly_totals()?))
    })
    .await?;
    let monthly = monthly
        .iter()
        .map(|(month, totals)| MonthTotalsResult {
            month: *month,
            totals: TotalsResult::from_totals(totals),
        })
        .collect();

    Ok(Json(StatsResponse {
        all_time: TotalsResult::from_totals(&all_time),
        monthly,
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unprocessable { message: String, code: &'static str },
    Internal { message: String },
}

impl From<LogbookError> for AppError {
    fn from(e: LogbookError) -> Self {
        match e {
            LogbookError::Invalid(v) => AppError::Unprocessable {
                message: v.to_string(),
                code: v.code(),
            },
            LogbookError::Store(s @ StoreError::NotFound(_)) => AppError::NotFound {
                message: s.to_string(),
            },
            LogbookError::Store(s @ StoreError::Duplicate(_)) => AppError::BadRequest {
                message: s.to_string(),
            },
            LogbookError::Store(s) => AppError::Internal {
                message: s.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error, code) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message, None),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message, None),
            AppError::Unprocessable { message, code } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message, Some(code))
            }
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message, None),
        };

        if status.is_server_error() {
            error!(%status, error = %error, "request failed");
        } else {
            warn!(%status, error = %error, "request rejected");
        }

        let body = Json(ErrorResponse { error, code });
        (status, body).into_response()
    }
}
