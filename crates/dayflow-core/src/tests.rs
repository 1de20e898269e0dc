//! Engine tests against an in-memory cache, a recording mirror and a fixed
//! clock.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::{
  Actor, Dayflow, Error, Mirror, MirrorOp, MirrorOutcome, RecordStore, Snapshot,
  SnapshotCache, SyncMirror,
  attendance::{AttendanceStatus, DayStatus},
  clock::FixedClock,
  employee::{Employee, EmployeePatch, LeaveBalance, NewEmployee, Role},
  leave::{LeaveFilter, LeaveStatus, LeaveType, NewLeave},
  store::MemoryCache,
};

// ─── Doubles ─────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("remote unavailable")]
struct RemoteDown;

#[derive(Clone, Default)]
struct RecordingMirror {
  ops: Arc<Mutex<Vec<MirrorOp>>>,
}

impl Mirror for RecordingMirror {
  type Error = RemoteDown;

  async fn probe(&self) -> Result<(), RemoteDown> { Ok(()) }

  async fn apply(&self, op: &MirrorOp) -> Result<(), RemoteDown> {
    self.ops.lock().unwrap().push(op.clone());
    Ok(())
  }
}

struct FailingMirror;

impl Mirror for FailingMirror {
  type Error = RemoteDown;

  async fn probe(&self) -> Result<(), RemoteDown> { Err(RemoteDown) }

  async fn apply(&self, _: &MirrorOp) -> Result<(), RemoteDown> {
    Err(RemoteDown)
  }
}

/// A [`MemoryCache`] whose writes start failing once `fail` is set.
#[derive(Default)]
struct FailingCache {
  inner: MemoryCache,
  fail:  Arc<AtomicBool>,
}

#[derive(Debug, thiserror::Error)]
#[error("disk full")]
struct DiskFull;

impl SnapshotCache for FailingCache {
  type Error = DiskFull;

  async fn load(&self, key: &str) -> Result<Option<Snapshot>, DiskFull> {
    self.inner.load(key).await.map_err(|_| DiskFull)
  }

  async fn save(&self, key: &str, snapshot: &Snapshot) -> Result<(), DiskFull> {
    if self.fail.load(Ordering::SeqCst) {
      return Err(DiskFull);
    }
    self.inner.save(key, snapshot).await.map_err(|_| DiskFull)
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

fn employee(id: &str, department: &str, role: Role) -> Employee {
  Employee {
    id:            id.into(),
    name:          format!("Employee {id}"),
    email:         format!("{}@dayflow.test", id.to_lowercase()),
    department:    department.into(),
    designation:   "Engineer".into(),
    role,
    salary:        5000,
    leave_balance: LeaveBalance::default(),
    joined_at:     at(2024, 1, 1, 9, 0),
  }
}

fn seed() -> Snapshot {
  Snapshot {
    employees: vec![
      employee("A1", "HR", Role::Admin),
      employee("E1", "Engineering", Role::Employee),
      employee("E2", "Engineering", Role::Employee),
      employee("E3", "Engineering", Role::Employee),
      employee("E4", "Sales", Role::Employee),
    ],
    ..Snapshot::default()
  }
}

fn new_leave(employee_id: &str, kind: LeaveType, start: &str, end: &str) -> NewLeave {
  NewLeave {
    employee_id: employee_id.into(),
    leave_type:  kind,
    start_date:  date(start),
    end_date:    date(end),
    reason:      "family event".into(),
  }
}

fn admin() -> Actor { Actor::admin("A1") }

struct Harness<M> {
  engine: Dayflow<MemoryCache, M>,
  clock:  Arc<FixedClock>,
}

async fn harness_with<M: Mirror>(mirror: SyncMirror<M>) -> Harness<M> {
  // Monday 2025-03-10, 09:05.
  let clock = Arc::new(FixedClock::new(at(2025, 3, 10, 9, 5)));
  let records = RecordStore::open_or_seed(MemoryCache::new(), "dayflow", seed())
    .await
    .unwrap();
  let engine = Dayflow::new(records, mirror, clock.clone());
  Harness { engine, clock }
}

async fn harness() -> (Harness<RecordingMirror>, Arc<Mutex<Vec<MirrorOp>>>) {
  let mirror = RecordingMirror::default();
  let ops = Arc::clone(&mirror.ops);
  (harness_with(SyncMirror::enabled(mirror)).await, ops)
}

async fn balance(engine: &Dayflow<MemoryCache, impl Mirror>, id: &str) -> LeaveBalance {
  engine.get_employee(id).await.unwrap().leave_balance
}

// ─── Leave workflow ──────────────────────────────────────────────────────────

#[tokio::test]
async fn approval_deducts_inclusive_day_count() {
  let (h, ops) = harness().await;
  let e1 = Actor::employee("E1");

  let req = h
    .engine
    .apply_leave(&e1, new_leave("E1", LeaveType::Paid, "2025-03-10", "2025-03-12"))
    .await
    .unwrap();
  assert_eq!(req.status, LeaveStatus::Pending);
  assert_eq!(balance(&h.engine, "E1").await.paid, 15, "request alone must not deduct");

  let approved = h
    .engine
    .update_leave_status(&admin(), &req.id, LeaveStatus::Approved, None)
    .await
    .unwrap();
  assert_eq!(approved.status, LeaveStatus::Approved);
  assert_eq!(balance(&h.engine, "E1").await.paid, 12);

  h.engine.shutdown().await.unwrap();
  let ops = ops.lock().unwrap();
  assert_eq!(ops.len(), 3);
  assert!(ops.iter().any(|op| matches!(
    op,
    MirrorOp::UpdateBalance { employee_id, balance } if employee_id == "E1" && balance.paid == 12
  )));
  assert!(ops.iter().any(|op| matches!(
    op,
    MirrorOp::UpsertLeave(l) if l.status == LeaveStatus::Approved
  )));
}

#[tokio::test]
async fn approvals_sum_and_floor_at_zero() {
  let (h, _) = harness().await;
  let e1 = Actor::employee("E1");

  for (start, end) in [("2025-06-02", "2025-06-05"), ("2025-07-01", "2025-07-05")] {
    let req = h
      .engine
      .apply_leave(&e1, new_leave("E1", LeaveType::Casual, start, end))
      .await
      .unwrap();
    h.engine
      .update_leave_status(&admin(), &req.id, LeaveStatus::Approved, None)
      .await
      .unwrap();
  }
  // 7 − 4 − 5, floored.
  assert_eq!(balance(&h.engine, "E1").await.casual, 0);
  assert_eq!(balance(&h.engine, "E1").await.paid, 15);
}

#[tokio::test]
async fn zero_balance_rejects_application() {
  let (h, _) = harness().await;
  h.engine
    .records()
    .commit(|s| {
      s.employee_mut("E1").unwrap().leave_balance.sick = 0;
      Ok(())
    })
    .await
    .unwrap();

  let err = h
    .engine
    .apply_leave(
      &Actor::employee("E1"),
      new_leave("E1", LeaveType::Sick, "2025-03-11", "2025-03-11"),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InsufficientBalance(LeaveType::Sick)));
  assert!(h.engine.records().snapshot().await.leaves.is_empty());
}

#[tokio::test]
async fn unpaid_leave_is_uncapped_and_counted() {
  let (h, _) = harness().await;
  let req = h
    .engine
    .apply_leave(
      &Actor::employee("E1"),
      new_leave("E1", LeaveType::Unpaid, "2025-03-17", "2025-03-18"),
    )
    .await
    .unwrap();
  h.engine
    .update_leave_status(&admin(), &req.id, LeaveStatus::Approved, None)
    .await
    .unwrap();
  assert_eq!(balance(&h.engine, "E1").await.unpaid_used, 2);
}

#[tokio::test]
async fn rejection_stores_comment_and_keeps_balance() {
  let (h, _) = harness().await;
  let req = h
    .engine
    .apply_leave(
      &Actor::employee("E1"),
      new_leave("E1", LeaveType::Paid, "2025-03-20", "2025-03-21"),
    )
    .await
    .unwrap();

  let rejected = h
    .engine
    .update_leave_status(
      &admin(),
      &req.id,
      LeaveStatus::Rejected,
      Some("Insufficient notice".into()),
    )
    .await
    .unwrap();
  assert_eq!(rejected.status, LeaveStatus::Rejected);
  assert_eq!(rejected.admin_comment.as_deref(), Some("Insufficient notice"));
  assert_eq!(balance(&h.engine, "E1").await, LeaveBalance::default());
}

#[tokio::test]
async fn terminal_state_is_immutable() {
  let (h, _) = harness().await;
  let req = h
    .engine
    .apply_leave(
      &Actor::employee("E1"),
      new_leave("E1", LeaveType::Paid, "2025-03-10", "2025-03-12"),
    )
    .await
    .unwrap();
  h.engine
    .update_leave_status(&admin(), &req.id, LeaveStatus::Approved, None)
    .await
    .unwrap();

  let again = h
    .engine
    .update_leave_status(&admin(), &req.id, LeaveStatus::Approved, None)
    .await;
  assert!(matches!(again, Err(Error::NotPending { status: LeaveStatus::Approved, .. })));

  let flip = h
    .engine
    .update_leave_status(&admin(), &req.id, LeaveStatus::Rejected, None)
    .await;
  assert!(matches!(flip, Err(Error::NotPending { .. })));

  assert_eq!(balance(&h.engine, "E1").await.paid, 12, "no second deduction");
  let stored = h.engine.get_leave(&admin(), &req.id).await.unwrap();
  assert_eq!(stored.status, LeaveStatus::Approved);
}

#[tokio::test]
async fn pending_is_not_a_valid_decision() {
  let (h, _) = harness().await;
  let req = h
    .engine
    .apply_leave(
      &Actor::employee("E1"),
      new_leave("E1", LeaveType::Paid, "2025-03-10", "2025-03-10"),
    )
    .await
    .unwrap();
  let err = h
    .engine
    .update_leave_status(&admin(), &req.id, LeaveStatus::Pending, None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidTransition(LeaveStatus::Pending)));
}

#[tokio::test]
async fn only_admins_decide() {
  let (h, _) = harness().await;
  let e1 = Actor::employee("E1");
  let req = h
    .engine
    .apply_leave(&e1, new_leave("E1", LeaveType::Paid, "2025-03-10", "2025-03-10"))
    .await
    .unwrap();

  let err = h
    .engine
    .update_leave_status(&e1, &req.id, LeaveStatus::Approved, None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
  assert_eq!(balance(&h.engine, "E1").await.paid, 15);
}

#[tokio::test]
async fn deciding_unknown_request_is_not_found() {
  let (h, _) = harness().await;
  let before = h.engine.records().snapshot().await;
  let err = h
    .engine
    .update_leave_status(&admin(), "missing", LeaveStatus::Approved, None)
    .await
    .unwrap_err();
  assert!(err.is_not_found());
  assert_eq!(h.engine.records().snapshot().await, before);
}

#[tokio::test]
async fn invalid_input_creates_nothing() {
  let (h, _) = harness().await;
  let e1 = Actor::employee("E1");

  let backwards = h
    .engine
    .apply_leave(&e1, new_leave("E1", LeaveType::Paid, "2025-03-12", "2025-03-10"))
    .await;
  assert!(matches!(backwards, Err(Error::InvalidDateRange { .. })));

  let mut short = new_leave("E1", LeaveType::Paid, "2025-03-12", "2025-03-12");
  short.reason = "  ok  ".into();
  let short = h.engine.apply_leave(&e1, short).await;
  assert!(matches!(short, Err(Error::ReasonTooShort { min: 5 })));

  let other = h
    .engine
    .apply_leave(&e1, new_leave("E2", LeaveType::Paid, "2025-03-12", "2025-03-12"))
    .await;
  assert!(matches!(other, Err(Error::Forbidden(_))));

  assert!(h.engine.records().snapshot().await.leaves.is_empty());
}

#[tokio::test]
async fn owner_cancels_pending_request() {
  let (h, ops) = harness().await;
  let e1 = Actor::employee("E1");
  let req = h
    .engine
    .apply_leave(&e1, new_leave("E1", LeaveType::Casual, "2025-04-01", "2025-04-01"))
    .await
    .unwrap();

  h.engine.cancel_leave(&e1, &req.id).await.unwrap();
  assert!(h.engine.list_leaves(&e1, LeaveFilter::default()).await.is_empty());

  h.engine.shutdown().await.unwrap();
  assert!(
    ops
      .lock()
      .unwrap()
      .iter()
      .any(|op| matches!(op, MirrorOp::DeleteLeave { id } if *id == req.id))
  );
}

#[tokio::test]
async fn decided_requests_cannot_be_cancelled() {
  let (h, _) = harness().await;
  let e1 = Actor::employee("E1");
  for status in [LeaveStatus::Approved, LeaveStatus::Rejected] {
    let req = h
      .engine
      .apply_leave(&e1, new_leave("E1", LeaveType::Paid, "2025-04-07", "2025-04-07"))
      .await
      .unwrap();
    h.engine
      .update_leave_status(&admin(), &req.id, status, None)
      .await
      .unwrap();

    let err = h.engine.cancel_leave(&e1, &req.id).await.unwrap_err();
    assert!(matches!(err, Error::NotPending { .. }));
    assert!(h.engine.get_leave(&e1, &req.id).await.is_ok());
  }
}

#[tokio::test]
async fn only_owner_cancels() {
  let (h, _) = harness().await;
  let req = h
    .engine
    .apply_leave(
      &Actor::employee("E1"),
      new_leave("E1", LeaveType::Paid, "2025-04-07", "2025-04-07"),
    )
    .await
    .unwrap();

  for actor in [Actor::employee("E2"), admin()] {
    let err = h.engine.cancel_leave(&actor, &req.id).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
  }
  assert_eq!(h.engine.records().snapshot().await.leaves.len(), 1);
}

#[tokio::test]
async fn conflicts_are_advisory_and_department_scoped() {
  let (h, _) = harness().await;

  for id in ["E2", "E3", "E4"] {
    let req = h
      .engine
      .apply_leave(
        &Actor::employee(id),
        new_leave(id, LeaveType::Paid, "2025-05-01", "2025-05-03"),
      )
      .await
      .unwrap();
    h.engine
      .update_leave_status(&admin(), &req.id, LeaveStatus::Approved, None)
      .await
      .unwrap();
  }
  // A rejected teammate request never counts.
  let rejected = h
    .engine
    .apply_leave(
      &Actor::employee("E2"),
      new_leave("E2", LeaveType::Casual, "2025-05-02", "2025-05-02"),
    )
    .await
    .unwrap();
  h.engine
    .update_leave_status(&admin(), &rejected.id, LeaveStatus::Rejected, None)
    .await
    .unwrap();

  let req = h
    .engine
    .apply_leave(
      &Actor::employee("E1"),
      new_leave("E1", LeaveType::Paid, "2025-05-02", "2025-05-02"),
    )
    .await
    .unwrap();

  let conflicts = h.engine.leave_conflicts(&admin(), &req.id).await.unwrap();
  assert_eq!(conflicts.len(), 2);
  assert!(conflicts.iter().all(|l| l.employee_id == "E2" || l.employee_id == "E3"));

  let approved = h
    .engine
    .update_leave_status(&admin(), &req.id, LeaveStatus::Approved, None)
    .await
    .unwrap();
  assert_eq!(approved.status, LeaveStatus::Approved);
}

#[tokio::test]
async fn employees_only_list_their_own_requests() {
  let (h, _) = harness().await;
  for id in ["E1", "E2"] {
    h.engine
      .apply_leave(
        &Actor::employee(id),
        new_leave(id, LeaveType::Sick, "2025-03-11", "2025-03-11"),
      )
      .await
      .unwrap();
  }

  let asked_for_other = LeaveFilter {
    employee_id: Some("E2".into()),
    status:      None,
  };
  let own = h.engine.list_leaves(&Actor::employee("E1"), asked_for_other).await;
  assert_eq!(own.len(), 1);
  assert_eq!(own[0].employee_id, "E1");

  let pending = LeaveFilter {
    employee_id: None,
    status:      Some(LeaveStatus::Pending),
  };
  assert_eq!(h.engine.list_leaves(&admin(), pending).await.len(), 2);
}

#[tokio::test]
async fn failed_cache_write_leaves_approval_unapplied() {
  let cache = FailingCache::default();
  let fail = Arc::clone(&cache.fail);
  let records = RecordStore::open_or_seed(cache, "dayflow", seed())
    .await
    .unwrap();
  let mirror = RecordingMirror::default();
  let ops = Arc::clone(&mirror.ops);
  let clock = Arc::new(FixedClock::new(at(2025, 3, 10, 9, 5)));
  let engine = Dayflow::new(records, SyncMirror::enabled(mirror), clock);

  let e1 = Actor::employee("E1");
  let req = engine
    .apply_leave(&e1, new_leave("E1", LeaveType::Paid, "2025-03-10", "2025-03-12"))
    .await
    .unwrap();

  fail.store(true, Ordering::SeqCst);
  let err = engine
    .update_leave_status(&admin(), &req.id, LeaveStatus::Approved, None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Cache(_)), "got {err:?}");

  let current = engine.get_leave(&admin(), &req.id).await.unwrap();
  assert_eq!(current.status, LeaveStatus::Pending);
  assert_eq!(engine.get_employee("E1").await.unwrap().leave_balance.paid, 15);

  fail.store(false, Ordering::SeqCst);
  engine.shutdown().await.unwrap();
  let ops = ops.lock().unwrap();
  assert_eq!(ops.len(), 1, "only the application is mirrored");
  assert!(matches!(
    &ops[0],
    MirrorOp::UpsertLeave(l) if l.status == LeaveStatus::Pending
  ));
}

// ─── Attendance ledger ───────────────────────────────────────────────────────

#[tokio::test]
async fn check_in_then_out_computes_hours() {
  let (h, ops) = harness().await;
  let e1 = Actor::employee("E1");

  let opened = h.engine.check_in(&e1, "E1").await.unwrap();
  assert_eq!(opened.id, "ATT-E1-2025-03-10");
  assert_eq!(opened.status, AttendanceStatus::Present);
  assert_eq!(opened.total_hours, 0.0);
  assert!(opened.check_out.is_none());

  h.clock.set(at(2025, 3, 10, 18, 0));
  let closed = h.engine.check_out(&e1, "E1").await.unwrap().unwrap();
  assert_eq!(closed.total_hours, 8.92);
  assert_eq!(closed.status, AttendanceStatus::Present);
  assert_eq!(closed.check_out, Some(at(2025, 3, 10, 18, 0)));

  h.engine.shutdown().await.unwrap();
  assert_eq!(ops.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn repeated_check_in_is_idempotent() {
  let (h, ops) = harness().await;
  let e1 = Actor::employee("E1");

  let first = h.engine.check_in(&e1, "E1").await.unwrap();
  h.clock.set(at(2025, 3, 10, 11, 30));
  let second = h.engine.check_in(&e1, "E1").await.unwrap();

  assert_eq!(first, second);
  assert_eq!(h.engine.records().snapshot().await.attendance.len(), 1);
  h.engine.shutdown().await.unwrap();
  assert_eq!(ops.lock().unwrap().len(), 1, "no mirror write for a no-op");
}

#[tokio::test]
async fn check_out_without_check_in_is_a_no_op() {
  let (h, ops) = harness().await;
  let before = h.engine.records().snapshot().await;

  let result = h.engine.check_out(&Actor::employee("E1"), "E1").await.unwrap();
  assert!(result.is_none());
  assert_eq!(h.engine.records().snapshot().await, before);

  h.engine.shutdown().await.unwrap();
  assert!(ops.lock().unwrap().is_empty());
}

#[tokio::test]
async fn second_check_out_changes_nothing() {
  let (h, _) = harness().await;
  let e1 = Actor::employee("E1");
  h.engine.check_in(&e1, "E1").await.unwrap();
  h.clock.set(at(2025, 3, 10, 17, 5));
  let first = h.engine.check_out(&e1, "E1").await.unwrap().unwrap();

  h.clock.set(at(2025, 3, 10, 19, 0));
  assert!(h.engine.check_out(&e1, "E1").await.unwrap().is_none());
  let stored = h.engine.attendance_for(&e1, "E1", None, None).await.unwrap();
  assert_eq!(stored, vec![first]);
}

#[tokio::test]
async fn no_check_in_on_approved_leave() {
  let (h, _) = harness().await;
  let e1 = Actor::employee("E1");
  let req = h
    .engine
    .apply_leave(&e1, new_leave("E1", LeaveType::Sick, "2025-03-10", "2025-03-10"))
    .await
    .unwrap();
  h.engine
    .update_leave_status(&admin(), &req.id, LeaveStatus::Approved, None)
    .await
    .unwrap();

  let err = h.engine.check_in(&e1, "E1").await.unwrap_err();
  assert!(matches!(err, Error::OnApprovedLeave { .. }));
  assert!(h.engine.records().snapshot().await.attendance.is_empty());
  assert_eq!(
    h.engine.day_status(&e1, "E1", date("2025-03-10")).await.unwrap(),
    DayStatus::Leave
  );
}

#[tokio::test]
async fn employees_cannot_check_in_others() {
  let (h, _) = harness().await;
  let err = h.engine.check_in(&Actor::employee("E1"), "E2").await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
  assert!(h.engine.check_in(&admin(), "E2").await.is_ok());
}

#[tokio::test]
async fn monthly_summary_counts_present_days() {
  let (h, _) = harness().await;
  let e1 = Actor::employee("E1");
  for day in 3..=7 {
    h.clock.set(at(2025, 3, day, 9, 0));
    h.engine.check_in(&e1, "E1").await.unwrap();
  }
  h.clock.set(at(2025, 3, 10, 9, 0));

  let summary = h.engine.monthly_summary(&e1, "E1", 2025, 3).await.unwrap();
  assert_eq!(summary.working_days, 21);
  assert_eq!(summary.present_days, 5);
  assert_eq!(summary.absent_days, 0);
  assert_eq!(summary.percentage, 24);

  assert_eq!(
    h.engine.day_status(&e1, "E1", date("2025-03-10")).await.unwrap(),
    DayStatus::NotCheckedIn
  );
  assert_eq!(
    h.engine.day_status(&e1, "E1", date("2025-03-08")).await.unwrap(),
    DayStatus::Weekend
  );
  assert!(matches!(
    h.engine.monthly_summary(&e1, "E1", 2025, 0).await,
    Err(Error::InvalidMonth { .. })
  ));
}

// ─── Directory ───────────────────────────────────────────────────────────────

fn hire(email: &str) -> NewEmployee {
  NewEmployee {
    id:          None,
    name:        "New Hire".into(),
    email:       email.into(),
    department:  "Engineering".into(),
    designation: "Intern".into(),
    role:        Role::Employee,
    salary:      2000,
  }
}

#[tokio::test]
async fn added_employee_gets_default_balances() {
  let (h, _) = harness().await;
  let e = h.engine.add_employee(&admin(), hire("new@dayflow.test")).await.unwrap();
  assert!(e.id.starts_with("EMP-"));
  assert_eq!(e.leave_balance, LeaveBalance::default());
  assert_eq!(h.engine.list_employees(Some("Engineering")).await.len(), 4);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let (h, _) = harness().await;
  let err = h
    .engine
    .add_employee(&admin(), hire("E1@DAYFLOW.test"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateEmail(_)));
}

#[tokio::test]
async fn only_admins_manage_employees() {
  let (h, _) = harness().await;
  let e1 = Actor::employee("E1");
  assert!(matches!(
    h.engine.add_employee(&e1, hire("x@dayflow.test")).await,
    Err(Error::Forbidden(_))
  ));
  assert!(matches!(
    h.engine.update_employee(&e1, "E1", EmployeePatch::default()).await,
    Err(Error::Forbidden(_))
  ));
}

#[tokio::test]
async fn patch_updates_selected_fields() {
  let (h, _) = harness().await;
  let patch = EmployeePatch {
    salary:      Some(7000),
    department:  Some("Platform".into()),
    designation: None,
  };
  let e = h.engine.update_employee(&admin(), "E1", patch).await.unwrap();
  assert_eq!(e.salary, 7000);
  assert_eq!(e.department, "Platform");
  assert_eq!(e.designation, "Engineer");
}

// ─── Mirror policy ───────────────────────────────────────────────────────────

#[tokio::test]
async fn remote_failure_never_touches_local_state() {
  let h = harness_with(SyncMirror::enabled(FailingMirror)).await;
  let req = h
    .engine
    .apply_leave(
      &Actor::employee("E1"),
      new_leave("E1", LeaveType::Paid, "2025-03-10", "2025-03-10"),
    )
    .await
    .unwrap();

  let outcomes = h.engine.shutdown().await.unwrap();
  assert!(matches!(outcomes.as_slice(), [MirrorOutcome::Failed(_)]));
  assert_eq!(h.engine.mirror_counts().failed, 1);
  assert!(h.engine.get_leave(&admin(), &req.id).await.is_ok());
}

#[tokio::test]
async fn unreachable_remote_disables_mirroring() {
  let mirror = SyncMirror::connect(Some(FailingMirror)).await;
  assert!(!mirror.is_enabled());

  let h = harness_with(mirror).await;
  h.engine.check_in(&Actor::employee("E1"), "E1").await.unwrap();
  let outcomes = h.engine.shutdown().await.unwrap();
  assert_eq!(outcomes, vec![MirrorOutcome::SkippedDisabled]);
  assert_eq!(h.engine.mirror_counts().skipped, 1);
}

#[tokio::test]
async fn snapshot_is_persisted_after_each_commit() {
  let (h, _) = harness().await;
  h.engine.check_in(&Actor::employee("E1"), "E1").await.unwrap();
  let raw = h.engine.records().cache().raw("dayflow").unwrap();
  let persisted = Snapshot::from_json(&raw).unwrap();
  assert_eq!(persisted.attendance.len(), 1);
}
