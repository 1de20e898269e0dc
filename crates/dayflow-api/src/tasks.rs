//! Handlers for `/tasks` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/tasks` | Admins see all (`?assignee_id=`); employees their own |
//! | `POST`   | `/tasks` | Admin only; 201 |
//! | `GET`    | `/tasks/{id}` | Assignee or admin |
//! | `PATCH`  | `/tasks/{id}` | Assignee or admin; only admins reassign |
//! | `DELETE` | `/tasks/{id}` | Admin only; 204 |
//! | `GET`    | `/tasks/{id}/comments` | Assignee or admin; oldest first |
//! | `POST`   | `/tasks/{id}/comments` | Assignee or admin; 201 |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use dayflow_core::{
  Actor, Error, Mirror, SnapshotCache, TaskStore,
  store::TaskQuery,
  task::{NewTask, Task, TaskComment, TaskPatch, TaskStatus},
};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, Authenticated, error::ApiError, extract::ValidatedJson};

/// Distinguishes an absent field from an explicit `null`.
fn nullable<'de, D, V>(d: D) -> Result<Option<Option<V>>, D::Error>
where
  D: Deserializer<'de>,
  V: Deserialize<'de>,
{
  Option::<V>::deserialize(d).map(Some)
}

/// Fetch task `id` and check that `actor` may see it.
async fn visible_task<C, M, T>(
  state: &AppState<C, M, T>,
  actor: &Actor,
  id: Uuid,
) -> Result<Task, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  let task = state
    .tasks
    .get_task(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
  if !task.visible_to(actor) {
    return Err(Error::Forbidden("task is assigned to someone else").into());
  }
  Ok(task)
}

/// Reject assignments to employees that do not exist.
async fn ensure_assignee<C, M, T>(
  state: &AppState<C, M, T>,
  assignee_id: &str,
) -> Result<(), ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  match state.engine.get_employee(assignee_id).await {
    Ok(_) => Ok(()),
    Err(Error::EmployeeNotFound(id)) => Err(
      Error::InvalidField {
        field:   "assignee_id",
        message: format!("no employee {id}"),
      }
      .into(),
    ),
    Err(e) => Err(e.into()),
  }
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub assignee_id: Option<String>,
  pub limit:       Option<usize>,
  pub offset:      Option<usize>,
}

/// `GET /tasks[?assignee_id=&limit=&offset=]`
pub async fn list<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  let assignee_id = if actor.is_admin() {
    params.assignee_id
  } else {
    Some(actor.employee_id.clone())
  };
  let tasks = state
    .tasks
    .list_tasks(TaskQuery {
      assignee_id,
      limit: params.limit,
      offset: params.offset,
    })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(tasks))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBody {
  #[validate(length(min = 1, max = 200))]
  pub title:       String,
  #[serde(default)]
  #[validate(length(max = 4000))]
  pub description: String,
  #[validate(length(min = 1))]
  pub assignee_id: String,
  #[serde(default)]
  pub status:      TaskStatus,
  pub due_date:    Option<NaiveDate>,
}

/// `POST /tasks`
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
  actor.require_admin("only administrators may create tasks")?;
  ensure_assignee(&state, &body.assignee_id).await?;

  let task = state
    .tasks
    .create_task(NewTask {
      title:       body.title,
      description: body.description,
      assignee_id: body.assignee_id,
      created_by:  actor.employee_id,
      status:      body.status,
      due_date:    body.due_date,
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(task)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /tasks/{id}`
pub async fn get_one<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  Ok(Json(visible_task(&state, &actor, id).await?))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBody {
  #[validate(length(min = 1, max = 200))]
  pub title:       Option<String>,
  #[validate(length(max = 4000))]
  pub description: Option<String>,
  #[validate(length(min = 1))]
  pub assignee_id: Option<String>,
  pub status:      Option<TaskStatus>,
  /// `null` clears the due date.
  #[serde(default, deserialize_with = "nullable")]
  pub due_date:    Option<Option<NaiveDate>>,
}

/// `PATCH /tasks/{id}`
pub async fn update<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<Uuid>,
  ValidatedJson(body): ValidatedJson<UpdateBody>,
) -> Result<Json<Task>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  visible_task(&state, &actor, id).await?;
  if let Some(assignee_id) = &body.assignee_id {
    actor.require_admin("only administrators may reassign tasks")?;
    ensure_assignee(&state, assignee_id).await?;
  }

  let task = state
    .tasks
    .update_task(id, TaskPatch {
      title:       body.title,
      description: body.description,
      assignee_id: body.assignee_id,
      status:      body.status,
      due_date:    body.due_date,
    })
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
  tracing::debug!(task_id = %id, status = ?task.status, "task updated");
  Ok(Json(task))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /tasks/{id}`
pub async fn delete<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  actor.require_admin("only administrators may delete tasks")?;
  let deleted = state.tasks.delete_task(id).await.map_err(ApiError::store)?;
  if !deleted {
    return Err(Error::TaskNotFound(id.to_string()).into());
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── Comments ────────────────────────────────────────────────────────────────

/// `GET /tasks/{id}/comments`
pub async fn comments<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<TaskComment>>, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  visible_task(&state, &actor, id).await?;
  let comments = state.tasks.list_comments(id).await.map_err(ApiError::store)?;
  Ok(Json(comments))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentBody {
  #[validate(length(min = 1, max = 2000))]
  pub body: String,
}

/// `POST /tasks/{id}/comments`
pub async fn add_comment<C, M, T>(
  State(state): State<AppState<C, M, T>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<Uuid>,
  ValidatedJson(body): ValidatedJson<CommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  visible_task(&state, &actor, id).await?;
  let comment = state
    .tasks
    .add_comment(id, actor.employee_id, body.body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
  Ok((StatusCode::CREATED, Json(comment)))
}
