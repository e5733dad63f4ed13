use serde::{Deserialize, Serialize};

const ADMIN_ROLE_NAMES: [&str; 2] = ["ADMIN", "ROLE_ADMIN"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            permissions: Vec::new(),
        }
    }

    /// Admin detection ignores case; every other role lookup is exact
    pub fn is_admin_role(&self) -> bool {
        ADMIN_ROLE_NAMES
            .iter()
            .any(|admin| self.name.eq_ignore_ascii_case(admin))
    }
}

/// Cached user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl UserInfo {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin_role)
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.roles
            .iter()
            .flat_map(|r| r.permissions.iter())
            .any(|p| p.name == name)
    }

    /// "First Last" when available, otherwise the login name
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.user_name.clone()
        } else {
            full
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_roles(names: &[&str]) -> UserInfo {
        UserInfo {
            id: "1".into(),
            user_name: "lin".into(),
            first_name: None,
            last_name: None,
            email: None,
            birth_date: None,
            roles: names.iter().map(|n| Role::named(*n)).collect(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_admin_detection_ignores_case() {
        for name in ["admin", "Admin", "ADMIN", "ROLE_ADMIN", "role_admin"] {
            assert!(user_with_roles(&[name]).is_admin(), "{} should be admin", name);
        }
    }

    #[test]
    fn test_admin_detection_rejects_lookalikes() {
        assert!(!user_with_roles(&["ADMINISTRATOR"]).is_admin());
        assert!(!user_with_roles(&["USER", "TEACHER"]).is_admin());
        assert!(!user_with_roles(&[]).is_admin());
    }

    #[test]
    fn test_role_and_permission_lookup_is_exact() {
        let mut user = user_with_roles(&["TEACHER"]);
        user.roles[0].permissions.push(Permission {
            name: "QUIZ_EDIT".into(),
            description: None,
        });
        assert!(user.has_role("TEACHER"));
        assert!(!user.has_role("teacher"));
        assert!(user.has_permission("QUIZ_EDIT"));
        assert!(!user.has_permission("quiz_edit"));
    }

    #[test]
    fn test_display_name() {
        let mut user = user_with_roles(&[]);
        assert_eq!(user.display_name(), "lin");
        user.first_name = Some("Lin".into());
        user.last_name = Some("Wei".into());
        assert_eq!(user.display_name(), "Lin Wei");
    }
}
