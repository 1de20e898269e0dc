//! Daily attendance records and the statuses derived from them.
//!
//! At most one [`AttendanceRecord`] exists per employee per calendar day. The
//! per-day status shown on calendars is computed on read by
//! [`derive_day_status`] and never stored.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::leave::{LeaveRequest, LeaveStatus};

// ─── Stored status ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
  Present,
  Absent,
  HalfDay,
  Leave,
}

// ─── Record ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
  /// Always `ATT-{employee_id}-{date}`; see [`record_id`].
  pub id:          String,
  pub employee_id: String,
  pub date:        NaiveDate,
  pub check_in:    Option<DateTime<Utc>>,
  pub check_out:   Option<DateTime<Utc>>,
  pub status:      AttendanceStatus,
  /// Hours between check-in and check-out, two decimals. Zero until
  /// checkout.
  pub total_hours: f64,
}

impl AttendanceRecord {
  /// A fresh record for a check-in at `at`.
  pub fn checked_in(
    employee_id: &str,
    date: NaiveDate,
    at: DateTime<Utc>,
  ) -> Self {
    Self {
      id:          record_id(employee_id, date),
      employee_id: employee_id.to_owned(),
      date,
      check_in:    Some(at),
      check_out:   None,
      status:      AttendanceStatus::Present,
      total_hours: 0.0,
    }
  }

  pub fn is_open(&self) -> bool {
    self.check_in.is_some() && self.check_out.is_none()
  }

  /// Close the record at `at`. Returns `false` (and changes nothing) if the
  /// record has no open check-in.
  pub fn close(&mut self, at: DateTime<Utc>) -> bool {
    let Some(check_in) = self.check_in.filter(|_| self.check_out.is_none())
    else {
      return false;
    };
    let at = at.max(check_in);
    self.check_out = Some(at);
    self.total_hours = hours_between(check_in, at);
    true
  }
}

/// The deterministic record id for `(employee_id, date)`.
pub fn record_id(employee_id: &str, date: NaiveDate) -> String {
  format!("ATT-{employee_id}-{date}")
}

/// Elapsed hours rounded to two decimal places; never negative.
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
  let seconds = (to - from).num_seconds().max(0) as f64;
  (seconds / 36.0).round() / 100.0
}

pub fn is_weekend(date: NaiveDate) -> bool {
  matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// ─── Derived status ──────────────────────────────────────────────────────────

/// What a calendar shows for one employee on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum DayStatus {
  /// Saturday or Sunday; excluded from working-day counts.
  Weekend,
  /// A stored record exists; its status wins.
  Recorded(AttendanceStatus),
  /// Covered by an approved leave request.
  Leave,
  /// Today, and no record yet.
  NotCheckedIn,
  /// A past working day with neither a record nor approved leave.
  Absent,
  /// A future working day with nothing recorded.
  Upcoming,
}

/// Resolve the [`DayStatus`] for `date`.
///
/// `record` is the employee's record for that day, if any; `leaves` are the
/// employee's requests (any status).
pub fn derive_day_status<'a>(
  date: NaiveDate,
  today: NaiveDate,
  record: Option<&AttendanceRecord>,
  leaves: impl IntoIterator<Item = &'a LeaveRequest>,
) -> DayStatus {
  if is_weekend(date) {
    return DayStatus::Weekend;
  }
  if let Some(r) = record {
    return DayStatus::Recorded(r.status);
  }
  if leaves
    .into_iter()
    .any(|l| l.status == LeaveStatus::Approved && l.covers(date))
  {
    return DayStatus::Leave;
  }
  match date.cmp(&today) {
    std::cmp::Ordering::Equal => DayStatus::NotCheckedIn,
    std::cmp::Ordering::Less => DayStatus::Absent,
    std::cmp::Ordering::Greater => DayStatus::Upcoming,
  }
}

// ─── Monthly summary ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
  pub year:          i32,
  pub month:         u32,
  /// Weekdays in the month.
  pub working_days:  u32,
  /// Working days with a PRESENT or HALF_DAY record.
  pub present_days:  u32,
  pub leave_days:    u32,
  pub absent_days:   u32,
  /// `round(present_days / working_days × 100)`.
  pub percentage:    u32,
}

/// Every calendar day of `year`-`month`, or `None` for an invalid month.
pub fn days_of_month(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
  let first = NaiveDate::from_ymd_opt(year, month, 1)?;
  Some(
    first
      .iter_days()
      .take_while(|d| d.month() == month)
      .collect(),
  )
}

/// Tally a month from per-day statuses.
pub fn summarize_month(
  year: i32,
  month: u32,
  days: impl IntoIterator<Item = DayStatus>,
) -> MonthlySummary {
  let mut s = MonthlySummary {
    year,
    month,
    working_days: 0,
    present_days: 0,
    leave_days: 0,
    absent_days: 0,
    percentage: 0,
  };
  for status in days {
    if status == DayStatus::Weekend {
      continue;
    }
    s.working_days += 1;
    match status {
      DayStatus::Recorded(
        AttendanceStatus::Present | AttendanceStatus::HalfDay,
      ) => s.present_days += 1,
      DayStatus::Recorded(AttendanceStatus::Leave) | DayStatus::Leave => {
        s.leave_days += 1
      }
      DayStatus::Recorded(AttendanceStatus::Absent) | DayStatus::Absent => {
        s.absent_days += 1
      }
      _ => {}
    }
  }
  if s.working_days > 0 {
    s.percentage = ((f64::from(s.present_days) / f64::from(s.working_days))
      * 100.0)
      .round() as u32;
  }
  s
}
