//! Handlers for `/attendance` endpoints.
//!
//! Check-in and check-out act for the caller. An admin may act for someone
//! else by sending `{"employee_id": "..."}`; the body is otherwise optional.

use axum::{
  Json,
  body::Bytes,
  extract::{Path, Query, State},
};
use chrono::NaiveDate;
use dayflow_core::{
  Actor, Mirror, SnapshotCache, TaskStore,
  attendance::{AttendanceRecord, DayStatus, MonthlySummary},
};
use serde::Deserialize;

use crate::{AppState, Authenticated, error::ApiError};

#[derive(Debug, Default, Deserialize)]
struct ActingFor {
  employee_id: Option<String>,
}

/// The employee a check-in or check-out applies to.
fn target_employee(actor: &Actor, body: &Bytes) -> Result<String, ApiError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(actor.employee_id.clone());
  }
  let acting: ActingFor = serde_json::from_slice(body)
    .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?;
  Ok(acting.employee_id.unwrap_or_else(|| actor.employee_id.clone()))
}

/// `POST /attendance/check-in`
pub async fn check_in<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  body: Bytes,
) -> Result<Json<AttendanceRecord>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  let employee_id = target_employee(&actor, &body)?;
  Ok(Json(state.engine.check_in(&actor, &employee_id).await?))
}

/// `POST /attendance/check-out`. Returns `null` when there was nothing to close.
pub async fn check_out<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  body: Bytes,
) -> Result<Json<Option<AttendanceRecord>>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  let employee_id = target_employee(&actor, &body)?;
  Ok(Json(state.engine.check_out(&actor, &employee_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub from: Option<NaiveDate>,
  pub to:   Option<NaiveDate>,
}

/// `GET /attendance/{employee_id}[?from=YYYY-MM-DD&to=YYYY-MM-DD]`
pub async fn records<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path(employee_id): Path<String>,
  Query(range): Query<RangeParams>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  let records = state
    .engine
    .attendance_for(&actor, &employee_id, range.from, range.to)
    .await?;
  Ok(Json(records))
}

/// `GET /attendance/{employee_id}/status/{date}`
pub async fn day_status<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path((employee_id, date)): Path<(String, NaiveDate)>,
) -> Result<Json<DayStatus>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  Ok(Json(state.engine.day_status(&actor, &employee_id, date).await?))
}

/// `GET /attendance/{employee_id}/summary/{year}/{month}`
pub async fn summary<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path((employee_id, year, month)): Path<(String, i32, u32)>,
) -> Result<Json<MonthlySummary>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  let summary = state
    .engine
    .monthly_summary(&actor, &employee_id, year, month)
    .await?;
  Ok(Json(summary))
}
