use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role
///
/// Stored and transmitted as its upper-case code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Citizen submitting tickets
    #[default]
    User,
    /// Triages and resolves tickets
    Staff,
    /// Manages staff accounts and reads analytics
    Admin,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::User, UserRole::Staff, UserRole::Admin];

    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "USER",
            Staff => "STAFF",
            Admin => "ADMIN",
        }
    }

    /// Parse a stored or token-carried code; unknown codes yield `None`
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.code() == code)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_code() {
        assert_eq!(UserRole::from_code("USER"), Some(UserRole::User));
        assert_eq!(UserRole::from_code("STAFF"), Some(UserRole::Staff));
        assert_eq!(UserRole::from_code("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_code("admin"), None);
        assert_eq!(UserRole::from_code("ROOT"), None);
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::User.to_string(), "USER");
        assert_eq!(UserRole::Staff.to_string(), "STAFF");
        assert_eq!(UserRole::Admin.to_string(), "ADMIN");
    }

    #[test]
    fn test_user_role_serde_matches_code() {
        for role in UserRole::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.code()));
        }
    }
}
