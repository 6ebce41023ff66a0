//! Team roster: static reference data, never created or destroyed at runtime.

use crate::types::StaffId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id:   StaffId,
    pub name: String,
    pub role: String,
}

impl StaffMember {
    pub fn new(id: &str, name: &str, role: &str) -> Self {
        Self {
            id:   id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
        }
    }
}

/// The built-in support team.
pub fn builtin_roster() -> Vec<StaffMember> {
    vec![
        StaffMember::new("1", "Pookie", "Support Specialist"),
        StaffMember::new("2", "Gam", "Support Specialist"),
        StaffMember::new("3", "Pume", "Project Coordinator"),
        StaffMember::new("4", "Namva", "Support Specialist"),
        StaffMember::new("5", "Aim", "Project Specialist"),
        StaffMember::new("6", "Noey", "Senior Support"),
        StaffMember::new("7", "TBA 1", "Support Staff"),
        StaffMember::new("8", "TBA 2", "Support Staff"),
    ]
}

/// Lookup helpers over a roster slice.
pub trait Roster {
    fn by_id(&self, id: &str) -> Option<&StaffMember>;
    fn by_name(&self, name: &str) -> Option<&StaffMember>;
}

impl Roster for [StaffMember] {
    fn by_id(&self, id: &str) -> Option<&StaffMember> {
        self.iter().find(|m| m.id == id)
    }

    fn by_name(&self, name: &str) -> Option<&StaffMember> {
        self.iter().find(|m| m.name == name)
    }
}
