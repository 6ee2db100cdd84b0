use crate::error::{Error, FieldError, Result};
use crate::models::Registration;
use regex::Regex;
use std::sync::OnceLock;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 120;

fn email_re() -> &'static Regex {
    // Loose on purpose: something@something.tld, no whitespace.
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"))
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("phone regex"))
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !email_re().is_match(email) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }
}

fn check_password(password: &str, errors: &mut Vec<FieldError>) {
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
}

fn required(value: &str, field: &'static str, message: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, message));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

/// Checks the login form. Reports every failing field, not just the first.
pub fn validate_login(email: &str, password: &str) -> Result<()> {
    let mut errors = Vec::new();
    check_email(email, &mut errors);
    check_password(password, &mut errors);
    finish(errors)
}

/// Checks the sign-up form.
///
/// Rules:
/// 1. First name, last name and username are required
/// 2. Email must look like an email
/// 3. Password is at least 6 characters and the confirmation matches
/// 4. Phone is exactly 10 digits
/// 5. Age is between 1 and 120
pub fn validate_registration(form: &Registration) -> Result<()> {
    let mut errors = Vec::new();

    required(&form.first_name, "firstName", "First name is required", &mut errors);
    required(&form.last_name, "lastName", "Last name is required", &mut errors);
    required(&form.username, "username", "Username is required", &mut errors);
    check_email(&form.email, &mut errors);
    check_password(&form.password, &mut errors);

    if form.confirm_password.is_empty() {
        errors.push(FieldError::new(
            "confirmPassword",
            "Please confirm your password",
        ));
    } else if form.confirm_password != form.password {
        errors.push(FieldError::new("confirmPassword", "Passwords do not match"));
    }

    if form.phone.is_empty() {
        errors.push(FieldError::new("phone", "Phone is required"));
    } else if !phone_re().is_match(&form.phone) {
        errors.push(FieldError::new(
            "phone",
            "Phone number must be exactly 10 digits",
        ));
    }

    match form.age {
        None => errors.push(FieldError::new("age", "Age is required")),
        Some(age) if !(MIN_AGE..=MAX_AGE).contains(&age) => {
            errors.push(FieldError::new("age", "Please enter a valid age"));
        }
        Some(_) => {}
    }

    finish(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> Registration {
        Registration {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "engine1".into(),
            confirm_password: "engine1".into(),
            phone: "0123456789".into(),
            age: Some(36),
        }
    }

    fn fields(result: Result<()>) -> Vec<&'static str> {
        match result {
            Err(Error::Validation(errors)) => errors.into_iter().map(|e| e.field).collect(),
            Ok(()) => Vec::new(),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn accepts_a_complete_form() {
        assert!(validate_registration(&valid_form()).is_ok());
    }

    #[test]
    fn reports_every_broken_field() {
        let form = Registration {
            email: "not-an-email".into(),
            confirm_password: "different".into(),
            phone: "12345".into(),
            age: Some(0),
            ..valid_form()
        };
        assert_eq!(
            fields(validate_registration(&form)),
            vec!["email", "confirmPassword", "phone", "age"]
        );
    }

    #[test]
    fn empty_form_requires_everything() {
        let found = fields(validate_registration(&Registration::default()));
        assert_eq!(found.len(), 8);
    }

    #[test]
    fn login_rules() {
        assert!(validate_login("emily@example.com", "emilyspass").is_ok());
        assert_eq!(fields(validate_login("", "12345")), vec!["email", "password"]);
        assert_eq!(fields(validate_login("emily@", "emilyspass")), vec!["email"]);
    }

    #[test]
    fn age_bounds_are_inclusive() {
        for (age, ok) in [(1, true), (120, true), (121, false)] {
            let form = Registration {
                age: Some(age),
                ..valid_form()
            };
            assert_eq!(validate_registration(&form).is_ok(), ok, "age {age}");
        }
    }
}
