//! `GET /health`: liveness and mirror drift counters. No auth.

use axum::{Json, extract::State};
use dayflow_core::{Mirror, SnapshotCache, TaskStore, mirror::MirrorCounts};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
  pub status: &'static str,
  pub mirror: MirrorCounts,
}

pub async fn handler<C, M, T>(
  State(state): State<AppState<C, M, T>>,
) -> Json<Health>
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  Json(Health {
    status: "ok",
    mirror: state.engine.mirror_counts(),
  })
}
