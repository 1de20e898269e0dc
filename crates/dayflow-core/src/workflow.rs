//! Leave workflow: apply, decide, cancel, and conflict detection.
//!
//! ```text
//! PENDING ──approve──▶ APPROVED   (balance deducted once, here)
//!    │    ──reject───▶ REJECTED
//!    └────cancel─────▶ (removed)
//! ```
//!
//! Terminal states accept no further transition, so an approval can never
//! deduct twice.

use uuid::Uuid;

use crate::{
  Dayflow, Error, Result,
  actor::Actor,
  leave::{Decision, LeaveFilter, LeaveRequest, LeaveStatus, NewLeave},
  mirror::{Mirror, MirrorOp},
  store::SnapshotCache,
};

/// Shortest accepted leave reason, in characters, after trimming.
pub const MIN_REASON_LEN: usize = 5;

impl<C, M> Dayflow<C, M>
where
  C: SnapshotCache,
  M: Mirror,
{
  /// File a new PENDING request. The balance is checked but not touched.
  pub async fn apply_leave(
    &self,
    actor: &Actor,
    input: NewLeave,
  ) -> Result<LeaveRequest> {
    actor.require_self_or_admin(
      &input.employee_id,
      "employees may only apply for their own leave",
    )?;
    if input.end_date < input.start_date {
      return Err(Error::InvalidDateRange {
        start: input.start_date,
        end:   input.end_date,
      });
    }
    let reason = input.reason.trim();
    if reason.chars().count() < MIN_REASON_LEN {
      return Err(Error::ReasonTooShort { min: MIN_REASON_LEN });
    }

    let request = LeaveRequest {
      id:            Uuid::new_v4().to_string(),
      employee_id:   input.employee_id,
      leave_type:    input.leave_type,
      start_date:    input.start_date,
      end_date:      input.end_date,
      reason:        reason.to_owned(),
      status:        LeaveStatus::Pending,
      admin_comment: None,
      created_at:    self.clock.now(),
    };

    let request = self
      .records
      .commit(|s| {
        let employee = s
          .employee(&request.employee_id)
          .ok_or_else(|| Error::EmployeeNotFound(request.employee_id.clone()))?;
        if !employee.leave_balance.can_request(request.leave_type) {
          return Err(Error::InsufficientBalance(request.leave_type));
        }
        s.leaves.push(request.clone());
        Ok(request)
      })
      .await?;

    tracing::info!(
      id = %request.id,
      employee_id = %request.employee_id,
      leave_type = %request.leave_type,
      days = request.days(),
      "leave requested"
    );
    self.mirror.dispatch(MirrorOp::UpsertLeave(request.clone()));
    Ok(request)
  }

  /// Approve or reject a PENDING request. Admin only.
  ///
  /// Approval deducts the inclusive day count from the employee's balance
  /// for the request's type, floored at zero, in the same commit as the
  /// status change.
  pub async fn update_leave_status(
    &self,
    actor: &Actor,
    id: &str,
    new_status: LeaveStatus,
    comment: Option<String>,
  ) -> Result<LeaveRequest> {
    actor.require_admin("only administrators may decide leave requests")?;
    let decision = Decision::try_from(new_status)?;
    let comment = comment
      .map(|c| c.trim().to_owned())
      .filter(|c| !c.is_empty());

    let (request, balance) = self
      .records
      .commit(|s| {
        let leave = s
          .leave(id)
          .ok_or_else(|| Error::LeaveNotFound(id.to_owned()))?;
        if leave.status.is_terminal() {
          return Err(Error::NotPending {
            id:     id.to_owned(),
            status: leave.status,
          });
        }
        let (employee_id, leave_type, days) =
          (leave.employee_id.clone(), leave.leave_type, leave.days());

        let balance = match decision {
          Decision::Approved => {
            let employee = s
              .employee_mut(&employee_id)
              .ok_or_else(|| Error::EmployeeNotFound(employee_id.clone()))?;
            employee.leave_balance.deduct(leave_type, days);
            Some(employee.leave_balance)
          }
          Decision::Rejected => None,
        };

        let leave = s
          .leave_mut(id)
          .ok_or_else(|| Error::LeaveNotFound(id.to_owned()))?;
        leave.status = decision.into();
        leave.admin_comment = comment;
        Ok((leave.clone(), balance))
      })
      .await?;

    tracing::info!(
      id,
      employee_id = %request.employee_id,
      status = %request.status,
      "leave decided"
    );
    self.mirror.dispatch(MirrorOp::UpsertLeave(request.clone()));
    if let Some(balance) = balance {
      self.mirror.dispatch(MirrorOp::UpdateBalance {
        employee_id: request.employee_id.clone(),
        balance,
      });
    }
    Ok(request)
  }

  /// Withdraw a PENDING request. Only its owner may cancel it; the request
  /// is removed outright.
  pub async fn cancel_leave(
    &self,
    actor: &Actor,
    id: &str,
  ) -> Result<LeaveRequest> {
    let removed = self
      .records
      .commit(|s| {
        let leave = s
          .leave(id)
          .ok_or_else(|| Error::LeaveNotFound(id.to_owned()))?;
        if leave.employee_id != actor.employee_id {
          return Err(Error::Forbidden(
            "only the requesting employee may cancel a leave request",
          ));
        }
        if leave.status.is_terminal() {
          return Err(Error::NotPending {
            id:     id.to_owned(),
            status: leave.status,
          });
        }
        s.remove_leave(id)
          .ok_or_else(|| Error::LeaveNotFound(id.to_owned()))
      })
      .await?;

    tracing::info!(id, employee_id = %removed.employee_id, "leave cancelled");
    self.mirror.dispatch(MirrorOp::DeleteLeave { id: removed.id.clone() });
    Ok(removed)
  }

  pub async fn get_leave(&self, actor: &Actor, id: &str) -> Result<LeaveRequest> {
    let leave = self
      .records
      .read(|s| s.leave(id).cloned())
      .await
      .ok_or_else(|| Error::LeaveNotFound(id.to_owned()))?;
    actor.require_self_or_admin(
      &leave.employee_id,
      "employees may only view their own leave",
    )?;
    Ok(leave)
  }

  /// Requests matching `filter`, newest first. Non-admins only ever see
  /// their own requests.
  pub async fn list_leaves(
    &self,
    actor: &Actor,
    mut filter: LeaveFilter,
  ) -> Vec<LeaveRequest> {
    if !actor.is_admin() {
      filter.employee_id = Some(actor.employee_id.clone());
    }
    let mut leaves: Vec<_> = self
      .records
      .read(|s| s.leaves.iter().filter(|l| filter.matches(l)).cloned().collect())
      .await;
    leaves.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    leaves
  }

  /// Other employees' non-rejected requests in the same department whose
  /// dates overlap request `id`. Advisory only: nothing here blocks an
  /// approval. Admin only.
  pub async fn leave_conflicts(
    &self,
    actor: &Actor,
    id: &str,
  ) -> Result<Vec<LeaveRequest>> {
    actor.require_admin("only administrators may review leave conflicts")?;
    self
      .records
      .read(|s| {
        let leave = s
          .leave(id)
          .ok_or_else(|| Error::LeaveNotFound(id.to_owned()))?;
        let department = &s
          .employee(&leave.employee_id)
          .ok_or_else(|| Error::EmployeeNotFound(leave.employee_id.clone()))?
          .department;

        Ok(
          s.leaves
            .iter()
            .filter(|other| other.id != leave.id)
            .filter(|other| other.employee_id != leave.employee_id)
            .filter(|other| other.status != LeaveStatus::Rejected)
            .filter(|other| other.overlaps(leave))
            .filter(|other| {
              s.employee(&other.employee_id)
                .is_some_and(|e| e.department == *department)
            })
            .cloned()
            .collect(),
        )
      })
      .await
  }
}
