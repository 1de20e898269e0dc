//! The authenticated caller of an engine operation.
//!
//! Role checks live here and are applied by the engine itself, not only by
//! whatever front end sits in front of it.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, employee::Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub employee_id: String,
  pub role:        Role,
}

impl Actor {
  pub fn admin(employee_id: impl Into<String>) -> Self {
    Self { employee_id: employee_id.into(), role: Role::Admin }
  }

  pub fn employee(employee_id: impl Into<String>) -> Self {
    Self { employee_id: employee_id.into(), role: Role::Employee }
  }

  pub fn is_admin(&self) -> bool { self.role == Role::Admin }

  /// Whether this actor may read or act on `employee_id`'s records.
  pub fn can_act_for(&self, employee_id: &str) -> bool {
    self.is_admin() || self.employee_id == employee_id
  }

  pub fn require_admin(&self, action: &'static str) -> Result<()> {
    if self.is_admin() { Ok(()) } else { Err(Error::Forbidden(action)) }
  }

  pub fn require_self_or_admin(
    &self,
    employee_id: &str,
    action: &'static str,
  ) -> Result<()> {
    if self.can_act_for(employee_id) {
      Ok(())
    } else {
      Err(Error::Forbidden(action))
    }
  }
}
