use serde::{Deserialize, Serialize};

use crate::error::AuthError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Plantonista,
}

impl Default for Role {
    fn default() -> Self {
        // Accounts without a role record are on-call staff: data entry only.
        Role::Plantonista
    }
}

/// What a signed-in user may do. Resolved once at login from the role and
/// passed around explicitly, instead of comparing role strings at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_edit: bool,
    pub can_view_dashboard: bool,
}

impl Role {
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Role::Admin => Capabilities {
                can_edit: true,
                can_view_dashboard: true,
            },
            Role::Plantonista => Capabilities {
                can_edit: false,
                can_view_dashboard: false,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub role: Role,
    pub capabilities: Capabilities,
}

impl Session {
    pub fn new(username: String, role: Role) -> Self {
        Session {
            username,
            capabilities: role.capabilities(),
            role,
        }
    }
}

/// The identity collaborator. The real system would sit on a hosted
/// provider; here it is whatever backs the trait.
pub trait IdentityProvider {
    fn authenticate(&self, username: &str, secret: &str) -> Result<Session, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_capabilities() {
        let caps = Role::Admin.capabilities();
        assert!(caps.can_edit);
        assert!(caps.can_view_dashboard);
    }

    #[test]
    fn test_plantonista_is_data_entry_only() {
        let caps = Role::Plantonista.capabilities();
        assert!(!caps.can_edit);
        assert!(!caps.can_view_dashboard);
    }

    #[test]
    fn test_missing_role_defaults_to_plantonista() {
        assert_eq!(Role::default(), Role::Plantonista);
    }
}
