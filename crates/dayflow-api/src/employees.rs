//! Handlers for `/employees` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/employees` | Admin only; optional `?department=` |
//! | `POST`  | `/employees` | Admin only; 201 |
//! | `GET`   | `/employees/{id}` | Self or admin |
//! | `PATCH` | `/employees/{id}` | Admin only; salary, department, designation |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use dayflow_core::{
  Mirror, SnapshotCache, TaskStore,
  employee::{Employee, EmployeePatch, NewEmployee, Role},
};
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, Authenticated, error::ApiError, extract::ValidatedJson};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub department: Option<String>,
}

/// `GET /employees[?department=<name>]`
pub async fn list<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Employee>>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  actor.require_admin("only administrators may list employees")?;
  let employees = state
    .engine
    .list_employees(params.department.as_deref())
    .await;
  Ok(Json(employees))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBody {
  #[validate(length(min = 1, max = 32))]
  pub id:          Option<String>,
  #[validate(length(min = 1, max = 120))]
  pub name:        String,
  #[validate(email)]
  pub email:       String,
  #[validate(length(min = 1, max = 80))]
  pub department:  String,
  #[validate(length(min = 1, max = 80))]
  pub designation: String,
  #[serde(default = "default_role")]
  pub role:        Role,
  #[serde(default)]
  pub salary:      u64,
}

fn default_role() -> Role { Role::Employee }

/// `POST /employees`
pub async fn create<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  ValidatedJson(body): ValidatedJson<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  let employee = state
    .engine
    .add_employee(&actor, NewEmployee {
      id:          body.id,
      name:        body.name,
      email:       body.email,
      department:  body.department,
      designation: body.designation,
      role:        body.role,
      salary:      body.salary,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(employee)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /employees/{id}`
pub async fn get_one<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<String>,
) -> Result<Json<Employee>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  actor.require_self_or_admin(&id, "employees may only view their own profile")?;
  Ok(Json(state.engine.get_employee(&id).await?))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBody {
  pub salary:      Option<u64>,
  #[validate(length(min = 1, max = 80))]
  pub department:  Option<String>,
  #[validate(length(min = 1, max = 80))]
  pub designation: Option<String>,
}

/// `PATCH /employees/{id}`
pub async fn update<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<String>,
  ValidatedJson(body): ValidatedJson<UpdateBody>,
) -> Result<Json<Employee>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  let employee = state
    .engine
    .update_employee(&actor, &id, EmployeePatch {
      salary:      body.salary,
      department:  body.department,
      designation: body.designation,
    })
    .await?;
  Ok(Json(employee))
}
