//! Leave requests and their lifecycle states.
//!
//! A request starts `PENDING` and moves exactly once to a terminal state
//! (`APPROVED` or `REJECTED`). While pending it may instead be cancelled by
//! its owner, which removes it outright.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ─── Leave type ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveType {
  Paid,
  Sick,
  Casual,
  Unpaid,
}

impl fmt::Display for LeaveType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Paid => "PAID",
      Self::Sick => "SICK",
      Self::Casual => "CASUAL",
      Self::Unpaid => "UNPAID",
    })
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
  Pending,
  Approved,
  Rejected,
}

impl LeaveStatus {
  pub fn is_terminal(self) -> bool { !matches!(self, Self::Pending) }
}

impl fmt::Display for LeaveStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Pending => "PENDING",
      Self::Approved => "APPROVED",
      Self::Rejected => "REJECTED",
    })
  }
}

/// The admin decision applied by [`crate::Dayflow::update_leave_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
  Approved,
  Rejected,
}

impl From<Decision> for LeaveStatus {
  fn from(d: Decision) -> Self {
    match d {
      Decision::Approved => Self::Approved,
      Decision::Rejected => Self::Rejected,
    }
  }
}

impl TryFrom<LeaveStatus> for Decision {
  type Error = crate::Error;

  fn try_from(s: LeaveStatus) -> crate::Result<Self> {
    match s {
      LeaveStatus::Approved => Ok(Self::Approved),
      LeaveStatus::Rejected => Ok(Self::Rejected),
      LeaveStatus::Pending => Err(crate::Error::InvalidTransition(s)),
    }
  }
}

// ─── Request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
  pub id:            String,
  pub employee_id:   String,
  pub leave_type:    LeaveType,
  /// Inclusive.
  pub start_date:    NaiveDate,
  /// Inclusive; never before `start_date`.
  pub end_date:      NaiveDate,
  pub reason:        String,
  pub status:        LeaveStatus,
  pub admin_comment: Option<String>,
  pub created_at:    DateTime<Utc>,
}

impl LeaveRequest {
  /// Number of calendar days in the inclusive range.
  pub fn days(&self) -> u32 { inclusive_days(self.start_date, self.end_date) }

  pub fn covers(&self, date: NaiveDate) -> bool {
    self.start_date <= date && date <= self.end_date
  }

  pub fn overlaps(&self, other: &LeaveRequest) -> bool {
    self.start_date <= other.end_date && self.end_date >= other.start_date
  }
}

/// `(end - start) + 1`, or zero for an inverted range.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> u32 {
  let span = (end - start).num_days();
  if span < 0 { 0 } else { u32::try_from(span + 1).unwrap_or(u32::MAX) }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::Dayflow::apply_leave`].
#[derive(Debug, Clone)]
pub struct NewLeave {
  pub employee_id: String,
  pub leave_type:  LeaveType,
  pub start_date:  NaiveDate,
  pub end_date:    NaiveDate,
  pub reason:      String,
}

/// Filter for [`crate::Dayflow::list_leaves`].
#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
  pub employee_id: Option<String>,
  pub status:      Option<LeaveStatus>,
}

impl LeaveFilter {
  pub fn matches(&self, leave: &LeaveRequest) -> bool {
    self.employee_id.as_ref().is_none_or(|id| *id == leave.employee_id)
      && self.status.is_none_or(|s| s == leave.status)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(s: &str) -> NaiveDate { s.parse().unwrap() }

  fn request(start: &str, end: &str) -> LeaveRequest {
    LeaveRequest {
      id:            "L1".into(),
      employee_id:   "E1".into(),
      leave_type:    LeaveType::Paid,
      start_date:    d(start),
      end_date:      d(end),
      reason:        "family trip".into(),
      status:        LeaveStatus::Pending,
      admin_comment: None,
      created_at:    Utc::now(),
    }
  }

  #[test]
  fn day_count_is_inclusive() {
    assert_eq!(request("2025-03-10", "2025-03-12").days(), 3);
    assert_eq!(request("2025-04-01", "2025-04-01").days(), 1);
    assert_eq!(inclusive_days(d("2025-04-02"), d("2025-04-01")), 0);
  }

  #[test]
  fn overlap_touching_edges() {
    let a = request("2025-05-01", "2025-05-03");
    assert!(a.overlaps(&request("2025-05-03", "2025-05-07")));
    assert!(a.overlaps(&request("2025-04-28", "2025-05-01")));
    assert!(!a.overlaps(&request("2025-05-04", "2025-05-05")));
  }

  #[test]
  fn pending_is_not_a_decision() {
    assert!(Decision::try_from(LeaveStatus::Pending).is_err());
    assert_eq!(
      Decision::try_from(LeaveStatus::Rejected).unwrap(),
      Decision::Rejected
    );
  }

  #[test]
  fn wire_names() {
    assert_eq!(serde_json::to_string(&LeaveType::Casual).unwrap(), "\"CASUAL\"");
    assert_eq!(
      serde_json::from_str::<LeaveStatus>("\"APPROVED\"").unwrap(),
      LeaveStatus::Approved
    );
  }
}
