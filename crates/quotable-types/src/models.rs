use serde::{Deserialize, Serialize};

/// Role carried on the user row and inside the JWT. Immutable after
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// The identity making a request, reconstructed per request from a verified
/// bearer credential. A sum type rather than an optional user field so every
/// policy function has to handle the anonymous case explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    User { id: i64, role: Role },
    Anonymous,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Actor::User {
                role: Role::Admin,
                ..
            }
        )
    }

    /// The acting user's id, or None for anonymous requests.
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Actor::User { id, .. } => Some(*id),
            Actor::Anonymous => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::parse(Role::Admin.as_str()), Some(Role::Admin));
    }

    #[test]
    fn test_actor_helpers() {
        let admin = Actor::User {
            id: 1,
            role: Role::Admin,
        };
        let user = Actor::User {
            id: 2,
            role: Role::User,
        };
        assert!(admin.is_admin());
        assert!(!user.is_admin());
        assert!(!Actor::Anonymous.is_admin());
        assert_eq!(user.user_id(), Some(2));
        assert_eq!(Actor::Anonymous.user_id(), None);
    }
}
