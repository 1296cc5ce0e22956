use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Role {
    Customer,      // Holds a primary card, may (re)issue their own
    BusinessOwner, // Issues loyalty card and promo QR codes
    Staff,         // Scans and revokes codes for a business
    Admin,         // Platform administration, repairs QR records
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => write!(f, "Customer"),
            Role::BusinessOwner => write!(f, "Business Owner"),
            Role::Staff => write!(f, "Staff"),
            Role::Admin => write!(f, "Administrator"),
        }
    }
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::BusinessOwner.is_admin());
        assert!(!Role::Staff.is_admin());
        assert!(!Role::Customer.is_admin());
    }

    #[test]
    fn roles_round_trip_through_json() {
        let json = serde_json::to_string(&vec![Role::Customer, Role::Admin]).unwrap();
        assert_eq!(json, r#"["Customer","Admin"]"#);
        let roles: Vec<Role> = serde_json::from_str(&json).unwrap();
        assert_eq!(roles, vec![Role::Customer, Role::Admin]);
    }
}
