//! The full serialisable state of the record store.
//!
//! The whole snapshot is loaded at startup and written back in full after
//! every committed mutation; there is no delta persistence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  attendance::AttendanceRecord,
  employee::Employee,
  leave::LeaveRequest,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
  #[serde(default)]
  pub employees:  Vec<Employee>,
  #[serde(default)]
  pub attendance: Vec<AttendanceRecord>,
  #[serde(default)]
  pub leaves:     Vec<LeaveRequest>,
}

impl Snapshot {
  pub fn from_json(s: &str) -> crate::Result<Self> {
    Ok(serde_json::from_str(s)?)
  }

  pub fn to_json(&self) -> crate::Result<String> {
    Ok(serde_json::to_string(self)?)
  }

  // ── Employees ─────────────────────────────────────────────────────────

  pub fn employee(&self, id: &str) -> Option<&Employee> {
    self.employees.iter().find(|e| e.id == id)
  }

  pub fn employee_mut(&mut self, id: &str) -> Option<&mut Employee> {
    self.employees.iter_mut().find(|e| e.id == id)
  }

  pub fn employee_by_email(&self, email: &str) -> Option<&Employee> {
    self
      .employees
      .iter()
      .find(|e| e.email.eq_ignore_ascii_case(email))
  }

  // ── Attendance ────────────────────────────────────────────────────────

  pub fn attendance(
    &self,
    employee_id: &str,
    date: NaiveDate,
  ) -> Option<&AttendanceRecord> {
    self
      .attendance
      .iter()
      .find(|r| r.employee_id == employee_id && r.date == date)
  }

  pub fn attendance_mut(
    &mut self,
    employee_id: &str,
    date: NaiveDate,
  ) -> Option<&mut AttendanceRecord> {
    self
      .attendance
      .iter_mut()
      .find(|r| r.employee_id == employee_id && r.date == date)
  }

  // ── Leaves ────────────────────────────────────────────────────────────

  pub fn leave(&self, id: &str) -> Option<&LeaveRequest> {
    self.leaves.iter().find(|l| l.id == id)
  }

  pub fn leave_mut(&mut self, id: &str) -> Option<&mut LeaveRequest> {
    self.leaves.iter_mut().find(|l| l.id == id)
  }

  pub fn leaves_of<'a>(
    &'a self,
    employee_id: &'a str,
  ) -> impl Iterator<Item = &'a LeaveRequest> + 'a {
    self.leaves.iter().filter(move |l| l.employee_id == employee_id)
  }

  pub fn remove_leave(&mut self, id: &str) -> Option<LeaveRequest> {
    let idx = self.leaves.iter().position(|l| l.id == id)?;
    Some(self.leaves.remove(idx))
  }
}
