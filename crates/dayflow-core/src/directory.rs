//! Employee directory operations.

use uuid::Uuid;

use crate::{
  Dayflow, Error, Result,
  actor::Actor,
  employee::{Employee, EmployeePatch, LeaveBalance, NewEmployee},
  mirror::{Mirror, MirrorOp},
  store::SnapshotCache,
};

impl<C, M> Dayflow<C, M>
where
  C: SnapshotCache,
  M: Mirror,
{
  /// Create an employee with the default leave allocation. Admin only.
  pub async fn add_employee(
    &self,
    actor: &Actor,
    input: NewEmployee,
  ) -> Result<Employee> {
    actor.require_admin("only administrators may add employees")?;

    let name = input.name.trim().to_owned();
    let email = input.email.trim().to_owned();
    if name.is_empty() {
      return Err(Error::InvalidField {
        field:   "name",
        message: "must not be empty".into(),
      });
    }
    if !email.contains('@') {
      return Err(Error::InvalidField {
        field:   "email",
        message: "must be an email address".into(),
      });
    }

    let employee = Employee {
      id: input.id.unwrap_or_else(generate_employee_id),
      name,
      email,
      department: input.department,
      designation: input.designation,
      role: input.role,
      salary: input.salary,
      leave_balance: LeaveBalance::default(),
      joined_at: self.clock.now(),
    };

    let employee = self
      .records
      .commit(|s| {
        if s.employee_by_email(&employee.email).is_some() {
          return Err(Error::DuplicateEmail(employee.email.clone()));
        }
        if s.employee(&employee.id).is_some() {
          return Err(Error::DuplicateEmployeeId(employee.id.clone()));
        }
        s.employees.push(employee.clone());
        Ok(employee)
      })
      .await?;

    tracing::info!(
      id = %employee.id,
      department = %employee.department,
      "employee added"
    );
    self.mirror.dispatch(MirrorOp::UpsertEmployee(employee.clone()));
    Ok(employee)
  }

  /// Change salary, department or designation. Admin only.
  pub async fn update_employee(
    &self,
    actor: &Actor,
    id: &str,
    patch: EmployeePatch,
  ) -> Result<Employee> {
    actor.require_admin("only administrators may edit employees")?;
    let changed = !patch.is_empty();

    let employee = self
      .records
      .commit(|s| {
        let e = s
          .employee_mut(id)
          .ok_or_else(|| Error::EmployeeNotFound(id.to_owned()))?;
        if let Some(salary) = patch.salary {
          e.salary = salary;
        }
        if let Some(department) = patch.department {
          e.department = department;
        }
        if let Some(designation) = patch.designation {
          e.designation = designation;
        }
        Ok(e.clone())
      })
      .await?;

    if changed {
      tracing::info!(id, "employee updated");
      self.mirror.dispatch(MirrorOp::UpsertEmployee(employee.clone()));
    }
    Ok(employee)
  }

  pub async fn get_employee(&self, id: &str) -> Result<Employee> {
    self
      .records
      .read(|s| s.employee(id).cloned())
      .await
      .ok_or_else(|| Error::EmployeeNotFound(id.to_owned()))
  }

  /// All employees, optionally restricted to one department.
  pub async fn list_employees(
    &self,
    department: Option<&str>,
  ) -> Vec<Employee> {
    self
      .records
      .read(|s| {
        s.employees
          .iter()
          .filter(|e| department.is_none_or(|d| e.department == d))
          .cloned()
          .collect()
      })
      .await
  }
}

fn generate_employee_id() -> String {
  let uuid = Uuid::new_v4().simple().to_string();
  format!("EMP-{}", &uuid[..8]).to_uppercase()
}
