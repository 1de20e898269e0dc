//! Attendance ledger: check-in, check-out, and derived daily status.

use chrono::NaiveDate;

use crate::{
  Dayflow, Error, Result,
  actor::Actor,
  attendance::{
    AttendanceRecord, DayStatus, MonthlySummary, days_of_month,
    derive_day_status, summarize_month,
  },
  leave::LeaveStatus,
  mirror::{Mirror, MirrorOp},
  snapshot::Snapshot,
  store::SnapshotCache,
};

impl<C, M> Dayflow<C, M>
where
  C: SnapshotCache,
  M: Mirror,
{
  /// Open today's attendance record for `employee_id`.
  ///
  /// Idempotent for the rest of the day: if a record already exists it is
  /// returned unchanged. Refused on a day covered by approved leave.
  pub async fn check_in(
    &self,
    actor: &Actor,
    employee_id: &str,
  ) -> Result<AttendanceRecord> {
    actor.require_self_or_admin(
      employee_id,
      "employees may only check themselves in",
    )?;
    let today = self.clock.today();
    let now = self.clock.now();

    let (record, created) = self
      .records
      .commit(|s| {
        ensure_employee(s, employee_id)?;
        if let Some(existing) = s.attendance(employee_id, today) {
          return Ok((existing.clone(), false));
        }
        let on_leave = s
          .leaves_of(employee_id)
          .any(|l| l.status == LeaveStatus::Approved && l.covers(today));
        if on_leave {
          return Err(Error::OnApprovedLeave {
            employee_id: employee_id.to_owned(),
            date:        today,
          });
        }
        let record = AttendanceRecord::checked_in(employee_id, today, now);
        s.attendance.push(record.clone());
        Ok((record, true))
      })
      .await?;

    if created {
      tracing::info!(employee_id, date = %today, "checked in");
      self.mirror.dispatch(MirrorOp::UpsertAttendance(record.clone()));
    } else {
      tracing::debug!(employee_id, date = %today, "already checked in");
    }
    Ok(record)
  }

  /// Close today's open record for `employee_id` and compute the hours
  /// worked. Returns `None`, changing nothing, if there is no open record.
  pub async fn check_out(
    &self,
    actor: &Actor,
    employee_id: &str,
  ) -> Result<Option<AttendanceRecord>> {
    actor.require_self_or_admin(
      employee_id,
      "employees may only check themselves out",
    )?;
    let today = self.clock.today();
    let now = self.clock.now();

    let closed = self
      .records
      .commit(|s| {
        ensure_employee(s, employee_id)?;
        Ok(
          s.attendance_mut(employee_id, today)
            .filter(|r| r.is_open())
            .map(|r| {
              r.close(now);
              r.clone()
            }),
        )
      })
      .await?;

    match &closed {
      Some(record) => {
        tracing::info!(
          employee_id,
          date = %today,
          hours = record.total_hours,
          "checked out"
        );
        self.mirror.dispatch(MirrorOp::UpsertAttendance(record.clone()));
      }
      None => tracing::debug!(employee_id, "check-out without open check-in"),
    }
    Ok(closed)
  }

  /// Stored records for `employee_id` between `from` and `to` (inclusive),
  /// sorted by date.
  pub async fn attendance_for(
    &self,
    actor: &Actor,
    employee_id: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
  ) -> Result<Vec<AttendanceRecord>> {
    actor.require_self_or_admin(
      employee_id,
      "employees may only view their own attendance",
    )?;
    self
      .records
      .read(|s| {
        ensure_employee(s, employee_id)?;
        let mut records: Vec<_> = s
          .attendance
          .iter()
          .filter(|r| r.employee_id == employee_id)
          .filter(|r| from.is_none_or(|f| r.date >= f))
          .filter(|r| to.is_none_or(|t| r.date <= t))
          .cloned()
          .collect();
        records.sort_by_key(|r| r.date);
        Ok(records)
      })
      .await
  }

  /// The calendar status of one day for one employee.
  pub async fn day_status(
    &self,
    actor: &Actor,
    employee_id: &str,
    date: NaiveDate,
  ) -> Result<DayStatus> {
    actor.require_self_or_admin(
      employee_id,
      "employees may only view their own attendance",
    )?;
    let today = self.clock.today();
    self
      .records
      .read(|s| {
        ensure_employee(s, employee_id)?;
        Ok(derive_day_status(
          date,
          today,
          s.attendance(employee_id, date),
          s.leaves_of(employee_id),
        ))
      })
      .await
  }

  /// Working-day tally and attendance percentage for one month.
  pub async fn monthly_summary(
    &self,
    actor: &Actor,
    employee_id: &str,
    year: i32,
    month: u32,
  ) -> Result<MonthlySummary> {
    actor.require_self_or_admin(
      employee_id,
      "employees may only view their own attendance",
    )?;
    let days =
      days_of_month(year, month).ok_or(Error::InvalidMonth { year, month })?;
    let today = self.clock.today();
    self
      .records
      .read(|s| {
        ensure_employee(s, employee_id)?;
        let statuses = days.iter().map(|&date| {
          derive_day_status(
            date,
            today,
            s.attendance(employee_id, date),
            s.leaves_of(employee_id),
          )
        });
        Ok(summarize_month(year, month, statuses))
      })
      .await
  }
}

fn ensure_employee(s: &Snapshot, employee_id: &str) -> Result<()> {
  s.employee(employee_id)
    .map(|_| ())
    .ok_or_else(|| Error::EmployeeNotFound(employee_id.to_owned()))
}
