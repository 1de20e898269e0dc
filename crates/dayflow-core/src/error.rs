//! Error types for `dayflow-core`.
//!
//! Every mutation entry point returns `Result<_, Error>`; an `Err` means the
//! operation was rejected and no local state was changed.

use chrono::NaiveDate;
use thiserror::Error;

use crate::leave::{LeaveStatus, LeaveType};

#[derive(Debug, Error)]
pub enum Error {
  // ── Not found ───────────────────────────────────────────────────────────
  #[error("employee not found: {0}")]
  EmployeeNotFound(String),

  #[error("leave request not found: {0}")]
  LeaveNotFound(String),

  #[error("task not found: {0}")]
  TaskNotFound(String),

  // ── Validation ──────────────────────────────────────────────────────────
  #[error("end date {end} is before start date {start}")]
  InvalidDateRange { start: NaiveDate, end: NaiveDate },

  #[error("reason must be at least {min} characters")]
  ReasonTooShort { min: usize },

  #[error("insufficient {0} leave balance")]
  InsufficientBalance(LeaveType),

  #[error("an employee with email {0:?} already exists")]
  DuplicateEmail(String),

  #[error("an employee with id {0:?} already exists")]
  DuplicateEmployeeId(String),

  #[error("{employee_id} is on approved leave on {date}")]
  OnApprovedLeave { employee_id: String, date: NaiveDate },

  #[error("invalid month {year}-{month:02}")]
  InvalidMonth { year: i32, month: u32 },

  #[error("invalid field {field}: {message}")]
  InvalidField { field: &'static str, message: String },

  // ── Workflow ────────────────────────────────────────────────────────────
  #[error("leave request {id} is {status}, not pending")]
  NotPending { id: String, status: LeaveStatus },

  #[error("cannot transition a leave request to {0}")]
  InvalidTransition(LeaveStatus),

  // ── Authorization ───────────────────────────────────────────────────────
  #[error("forbidden: {0}")]
  Forbidden(&'static str),

  // ── Infrastructure ──────────────────────────────────────────────────────
  #[error("snapshot cache error: {0}")]
  Cache(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// True for rejections caused by caller input, as opposed to missing
  /// records, authorization or infrastructure failures.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::InvalidDateRange { .. }
        | Self::ReasonTooShort { .. }
        | Self::InsufficientBalance(_)
        | Self::DuplicateEmail(_)
        | Self::DuplicateEmployeeId(_)
        | Self::OnApprovedLeave { .. }
        | Self::InvalidMonth { .. }
        | Self::InvalidField { .. }
        | Self::NotPending { .. }
        | Self::InvalidTransition(_)
    )
  }

  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::EmployeeNotFound(_) | Self::LeaveNotFound(_) | Self::TaskNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
