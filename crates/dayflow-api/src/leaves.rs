//! Handlers for `/leaves` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/leaves` | `?employee_id=&status=`; employees see their own only |
//! | `POST`   | `/leaves` | File a request; 201 |
//! | `GET`    | `/leaves/{id}` | Owner or admin |
//! | `DELETE` | `/leaves/{id}` | Owner only, PENDING only |
//! | `POST`   | `/leaves/{id}/status` | Admin; `{"status":"APPROVED","comment":…}` |
//! | `GET`    | `/leaves/{id}/conflicts` | Admin; advisory overlap check |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use dayflow_core::{
  Mirror, SnapshotCache, TaskStore,
  leave::{LeaveFilter, LeaveRequest, LeaveStatus, LeaveType, NewLeave},
};
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, Authenticated, error::ApiError, extract::ValidatedJson};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub employee_id: Option<String>,
  pub status:      Option<LeaveStatus>,
}

/// `GET /leaves[?employee_id=<id>][&status=<status>]`
pub async fn list<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Query(params): Query<ListParams>,
) -> Json<Vec<LeaveRequest>>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  let filter = LeaveFilter {
    employee_id: params.employee_id,
    status:      params.status,
  };
  Json(state.engine.list_leaves(&actor, filter).await)
}

// ─── Apply ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyBody {
  /// Defaults to the caller.
  #[validate(length(min = 1))]
  pub employee_id: Option<String>,
  pub leave_type:  LeaveType,
  pub start_date:  NaiveDate,
  pub end_date:    NaiveDate,
  #[validate(length(max = 1000))]
  pub reason:      String,
}

/// `POST /leaves`
pub async fn apply<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  ValidatedJson(body): ValidatedJson<ApplyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  let employee_id = body
    .employee_id
    .unwrap_or_else(|| actor.employee_id.clone());
  let leave = state
    .engine
    .apply_leave(&actor, NewLeave {
      employee_id,
      leave_type: body.leave_type,
      start_date: body.start_date,
      end_date: body.end_date,
      reason: body.reason,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(leave)))
}

// ─── Get / cancel ────────────────────────────────────────────────────────────

/// `GET /leaves/{id}`
pub async fn get_one<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<String>,
) -> Result<Json<LeaveRequest>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  Ok(Json(state.engine.get_leave(&actor, &id).await?))
}

/// `DELETE /leaves/{id}`. Returns the withdrawn request.
pub async fn cancel<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<String>,
) -> Result<Json<LeaveRequest>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  Ok(Json(state.engine.cancel_leave(&actor, &id).await?))
}

// ─── Decide ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct DecisionBody {
  pub status:  LeaveStatus,
  #[validate(length(max = 1000))]
  pub comment: Option<String>,
}

/// `POST /leaves/{id}/status`
pub async fn decide<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<String>,
  ValidatedJson(body): ValidatedJson<DecisionBody>,
) -> Result<Json<LeaveRequest>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  let leave = state
    .engine
    .update_leave_status(&actor, &id, body.status, body.comment)
    .await?;
  Ok(Json(leave))
}

/// `GET /leaves/{id}/conflicts`
pub async fn conflicts<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<String>,
) -> Result<Json<Vec<LeaveRequest>>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  Ok(Json(state.engine.leave_conflicts(&actor, &id).await?))
}
