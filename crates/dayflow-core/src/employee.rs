//! Employee records and leave balances.
//!
//! Employees are created by an administrator (or seeded at startup), edited
//! by administrators, and have their leave balance adjusted by the leave
//! workflow. They are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::leave::LeaveType;

// ─── Role ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  Admin,
  Employee,
}

// ─── Leave balance ───────────────────────────────────────────────────────────

/// Remaining days per capped leave type, plus the running count of unpaid
/// days taken. Unpaid leave has no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
  pub paid:        u32,
  pub sick:        u32,
  pub casual:      u32,
  pub unpaid_used: u32,
}

impl LeaveBalance {
  pub const DEFAULT_PAID: u32 = 15;
  pub const DEFAULT_SICK: u32 = 10;
  pub const DEFAULT_CASUAL: u32 = 7;

  /// Remaining days for a capped type; `None` for [`LeaveType::Unpaid`].
  pub fn remaining(&self, kind: LeaveType) -> Option<u32> {
    match kind {
      LeaveType::Paid => Some(self.paid),
      LeaveType::Sick => Some(self.sick),
      LeaveType::Casual => Some(self.casual),
      LeaveType::Unpaid => None,
    }
  }

  /// Whether a new request of `kind` may be filed at all.
  pub fn can_request(&self, kind: LeaveType) -> bool {
    self.remaining(kind).is_none_or(|days| days > 0)
  }

  /// Account for `days` of approved leave. Capped types are floored at zero;
  /// unpaid days accumulate.
  pub fn deduct(&mut self, kind: LeaveType, days: u32) {
    match kind {
      LeaveType::Paid => self.paid = self.paid.saturating_sub(days),
      LeaveType::Sick => self.sick = self.sick.saturating_sub(days),
      LeaveType::Casual => self.casual = self.casual.saturating_sub(days),
      LeaveType::Unpaid => {
        self.unpaid_used = self.unpaid_used.saturating_add(days)
      }
    }
  }
}

impl Default for LeaveBalance {
  fn default() -> Self {
    Self {
      paid:        Self::DEFAULT_PAID,
      sick:        Self::DEFAULT_SICK,
      casual:      Self::DEFAULT_CASUAL,
      unpaid_used: 0,
    }
  }
}

// ─── Employee ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
  pub id:            String,
  pub name:          String,
  /// Unique across the directory, compared case-insensitively.
  pub email:         String,
  pub department:    String,
  pub designation:   String,
  pub role:          Role,
  /// Monthly gross salary in whole currency units.
  pub salary:        u64,
  pub leave_balance: LeaveBalance,
  pub joined_at:     DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::Dayflow::add_employee`]. Balances are always the
/// defaults; `id` is generated when not supplied.
#[derive(Debug, Clone)]
pub struct NewEmployee {
  pub id:          Option<String>,
  pub name:        String,
  pub email:       String,
  pub department:  String,
  pub designation: String,
  pub role:        Role,
  pub salary:      u64,
}

/// Administrative edits. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct EmployeePatch {
  pub salary:      Option<u64>,
  pub department:  Option<String>,
  pub designation: Option<String>,
}

impl EmployeePatch {
  pub fn is_empty(&self) -> bool {
    self.salary.is_none()
      && self.department.is_none()
      && self.designation.is_none()
  }
}
