// Session identity domain models
use serde::{Deserialize, Serialize};

/// Signed-in account as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user: Option<User>,
    pub loading: bool,
}

impl SessionIdentity {
    /// State before the provider has reported anything
    pub fn initial() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    pub fn resolved(user: Option<User>) -> Self {
        Self {
            user,
            loading: false,
        }
    }

    pub fn access(&self) -> Access<'_> {
        match (&self.user, self.loading) {
            (_, true) => Access::Pending,
            (Some(user), false) => Access::Granted(user),
            (None, false) => Access::Denied,
        }
    }
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::initial()
    }
}

/// Outcome of gating a protected route
#[derive(Debug, PartialEq, Eq)]
pub enum Access<'a> {
    Pending,
    Granted(&'a User),
    Denied,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_gate() {
        let user = User {
            uid: "u1".into(),
            email: "keeper@example.com".into(),
        };
        assert_eq!(SessionIdentity::initial().access(), Access::Pending);
        assert_eq!(SessionIdentity::resolved(None).access(), Access::Denied);
        let identity = SessionIdentity::resolved(Some(user.clone()));
        assert_eq!(identity.access(), Access::Granted(&user));
    }
}
