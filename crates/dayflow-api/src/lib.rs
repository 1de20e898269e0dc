//! JSON REST API for Dayflow.
//!
//! Exposes an axum [`Router`] over a [`Dayflow`] engine and any
//! [`TaskStore`]. Every route except `/health` requires a bearer token;
//! see [`auth`]. TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", dayflow_api::api_router(state))
//! ```

pub mod attendance;
pub mod auth;
pub mod employees;
pub mod error;
pub mod extract;
pub mod health;
pub mod leaves;
pub mod tasks;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use dayflow_core::{Dayflow, Mirror, SnapshotCache, TaskStore};

pub use auth::{Authenticated, TokenRegistry, hash_token};
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<C, M, T> {
  pub engine: Arc<Dayflow<C, M>>,
  pub tasks:  Arc<T>,
  pub tokens: Arc<TokenRegistry>,
}

impl<C, M, T> Clone for AppState<C, M, T> {
  fn clone(&self) -> Self {
    Self {
      engine: Arc::clone(&self.engine),
      tasks:  Arc::clone(&self.tasks),
      tokens: Arc::clone(&self.tokens),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<C, M, T>(state: AppState<C, M, T>) -> Router<()>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  Router::new()
    // Directory
    .route(
      "/employees",
      get(employees::list::<C, M, T>).post(employees::create::<C, M, T>),
    )
    .route(
      "/employees/{id}",
      get(employees::get_one::<C, M, T>).patch(employees::update::<C, M, T>),
    )
    // Attendance
    .route("/attendance/check-in", post(attendance::check_in::<C, M, T>))
    .route("/attendance/check-out", post(attendance::check_out::<C, M, T>))
    .route("/attendance/{employee_id}", get(attendance::records::<C, M, T>))
    .route(
      "/attendance/{employee_id}/status/{date}",
      get(attendance::day_status::<C, M, T>),
    )
    .route(
      "/attendance/{employee_id}/summary/{year}/{month}",
      get(attendance::summary::<C, M, T>),
    )
    // Leave
    .route("/leaves", get(leaves::list::<C, M, T>).post(leaves::apply::<C, M, T>))
    .route(
      "/leaves/{id}",
      get(leaves::get_one::<C, M, T>).delete(leaves::cancel::<C, M, T>),
    )
    .route("/leaves/{id}/status", post(leaves::decide::<C, M, T>))
    .route("/leaves/{id}/conflicts", get(leaves::conflicts::<C, M, T>))
    // Tasks
    .route("/tasks", get(tasks::list::<C, M, T>).post(tasks::create::<C, M, T>))
    .route(
      "/tasks/{id}",
      get(tasks::get_one::<C, M, T>)
        .patch(tasks::update::<C, M, T>)
        .delete(tasks::delete::<C, M, T>),
    )
    .route(
      "/tasks/{id}/comments",
      get(tasks::comments::<C, M, T>).post(tasks::add_comment::<C, M, T>),
    )
    // Health
    .route("/health", get(health::handler::<C, M, T>))
    .with_state(state)
}
