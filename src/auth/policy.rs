//! Role policy: an explicit mapping from each role to the set of actions it
//! may perform, resolved once at startup. There is no hierarchy; a Super
//! Admin does not implicitly satisfy Admin-only checks. Granting one is a
//! one-line change to the table below.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "Super Admin")]
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::SuperAdmin => "Super Admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "Admin" => Some(Role::Admin),
            "Super Admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewIntakeQueue,
    RegisterPotentialCustomer,
    SubmitIntakeForm,
    IssueCredentials,
    RejectPotentialCustomer,
    ManageAdmins,
}

static POLICY: Lazy<HashMap<Role, HashSet<Action>>> = Lazy::new(|| {
    use Action::*;

    let mut table = HashMap::new();
    table.insert(
        Role::Admin,
        HashSet::from([
            ViewIntakeQueue,
            RegisterPotentialCustomer,
            SubmitIntakeForm,
            IssueCredentials,
            RejectPotentialCustomer,
        ]),
    );
    table.insert(Role::SuperAdmin, HashSet::from([ManageAdmins]));
    table
});

pub fn permits(role: Role, action: Action) -> bool {
    POLICY
        .get(&role)
        .map(|actions| actions.contains(&action))
        .unwrap_or(false)
}

/// Access gate: called by every protected handler before any workflow step.
pub fn authorize(role: Role, action: Action) -> Result<(), ApiError> {
    if permits(role, action) {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "You do not have access to this resource",
        ))
    }
}
