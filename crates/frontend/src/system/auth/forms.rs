//! Client-side validation for the auth forms.
//!
//! Invalid input is reported per field and never reaches the network.

use std::collections::BTreeMap;

use contracts::system::auth::{LoginRequest, RegisterRequest};

pub const MIN_USER_NAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Field name -> message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message, for single-line display
    pub fn summary(&self) -> Option<String> {
        self.0.values().next().cloned()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub fn validate_login(request: &LoginRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if request.user_name.trim().is_empty() {
        errors.add("userName", "User name is required");
    }
    if request.password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors.into_result()
}

pub fn validate_register(request: &RegisterRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    let user_name = request.user_name.trim();
    if user_name.is_empty() {
        errors.add("userName", "User name is required");
    } else if user_name.chars().count() < MIN_USER_NAME_LEN {
        errors.add(
            "userName",
            format!("User name must be at least {} characters", MIN_USER_NAME_LEN),
        );
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
    if let Some(email) = request.email.as_deref().map(str::trim) {
        if !email.is_empty() && !email.contains('@') {
            errors.add("email", "Email address is not valid");
        }
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_both_fields() {
        let errors = validate_login(&LoginRequest {
            user_name: "  ".into(),
            password: String::new(),
        })
        .unwrap_err();
        assert_eq!(errors.get("userName"), Some("User name is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }

    #[test]
    fn test_register_rules() {
        let mut request = RegisterRequest {
            user_name: "li".into(),
            password: "12345".into(),
            email: Some("nope".into()),
            ..Default::default()
        };
        let errors = validate_register(&request).unwrap_err();
        assert!(errors.get("userName").is_some());
        assert!(errors.get("password").is_some());
        assert!(errors.get("email").is_some());

        request.user_name = "lin".into();
        request.password = "123456".into();
        request.email = Some("lin@example.com".into());
        assert!(validate_register(&request).is_ok());
    }

    #[test]
    fn test_blank_email_is_optional() {
        let request = RegisterRequest {
            user_name: "wang".into(),
            password: "secret1".into(),
            email: Some("".into()),
            ..Default::default()
        };
        assert!(validate_register(&request).is_ok());
    }
}
