//! Field rule tables for the user request bodies.
//!
//! Each request lists its fields in wire order together with the rules that
//! apply to them. Checking walks that table and yields one message per
//! violated rule; an empty result means the request may reach the service.

use validator::ValidateEmail;

use crate::api::rest::dto::{CreateUserReq, UpdateUserReq};

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 50;
pub const EMAIL_MAX_LEN: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Present and not blank. A failure skips the remaining rules of the field.
    Required,
    /// Length in characters of the trimmed value within `min..=max`.
    Length { min: usize, max: usize },
    MaxLength(usize),
    /// Syntactically valid e-mail address (checked on the trimmed value).
    Email,
}

const NAME_RULES: &[Rule] = &[
    Rule::Required,
    Rule::Length {
        min: NAME_MIN_LEN,
        max: NAME_MAX_LEN,
    },
];

const EMAIL_RULES: &[Rule] = &[Rule::Required, Rule::Email, Rule::MaxLength(EMAIL_MAX_LEN)];

/// Requests that carry a rule table.
pub trait Validate {
    /// Violation messages in field declaration order.
    fn validate(&self) -> Vec<String>;
}

impl Validate for CreateUserReq {
    fn validate(&self) -> Vec<String> {
        check_fields(&[
            ("firstName", self.first_name.as_deref(), NAME_RULES),
            ("lastName", self.last_name.as_deref(), NAME_RULES),
            ("email", self.email.as_deref(), EMAIL_RULES),
        ])
    }
}

impl Validate for UpdateUserReq {
    // isActive is a plain boolean and has no rules.
    fn validate(&self) -> Vec<String> {
        check_fields(&[
            ("firstName", self.first_name.as_deref(), NAME_RULES),
            ("lastName", self.last_name.as_deref(), NAME_RULES),
            ("email", self.email.as_deref(), EMAIL_RULES),
        ])
    }
}

type FieldRules<'a> = (&'static str, Option<&'a str>, &'static [Rule]);

fn check_fields(fields: &[FieldRules<'_>]) -> Vec<String> {
    let mut errors = Vec::new();
    for &(field, value, rules) in fields {
        check_field(field, value, rules, &mut errors);
    }
    errors
}

fn check_field(field: &str, value: Option<&str>, rules: &[Rule], errors: &mut Vec<String>) {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        if rules.contains(&Rule::Required) {
            errors.push(format!("The {field} field is required."));
        }
        return;
    };

    // Rules apply to the value as it will be stored.
    let value = value.trim();
    let len = value.chars().count();
    for rule in rules {
        match *rule {
            Rule::Required => {}
            Rule::Length { min, max } if len < min || len > max => errors.push(format!(
                "The field {field} must be a string with a minimum length of {min} and a maximum length of {max}."
            )),
            Rule::MaxLength(max) if len > max => errors.push(format!(
                "The field {field} must be a string with a maximum length of {max}."
            )),
            Rule::Email if !value.validate_email() => {
                errors.push(format!("The {field} field is not a valid e-mail address."))
            }
            Rule::Length { .. } | Rule::MaxLength(_) | Rule::Email => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(first: Option<&str>, last: Option<&str>, email: Option<&str>) -> CreateUserReq {
        CreateUserReq {
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn valid_request_has_no_errors() {
        let req = create(Some("Al"), Some("Ng"), Some("al@x.com"));
        assert!(req.validate().is_empty());
    }

    #[test]
    fn short_first_name_reports_minimum_length() {
        let errors = create(Some("A"), Some("Ng"), Some("al@x.com")).validate();
        assert_eq!(
            errors,
            vec![
                "The field firstName must be a string with a minimum length of 2 and a maximum length of 50."
                    .to_string()
            ]
        );
    }

    #[test]
    fn missing_and_blank_fields_are_required() {
        let errors = create(None, Some("   "), None).validate();
        assert_eq!(
            errors,
            vec![
                "The firstName field is required.".to_string(),
                "The lastName field is required.".to_string(),
                "The email field is required.".to_string(),
            ]
        );
    }

    #[test]
    fn errors_follow_field_declaration_order() {
        let long = "x".repeat(NAME_MAX_LEN + 1);
        let errors = create(Some(&long), Some("N"), Some("not-an-email")).validate();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("The field firstName"));
        assert!(errors[1].starts_with("The field lastName"));
        assert_eq!(errors[2], "The email field is not a valid e-mail address.");
    }

    #[test]
    fn email_length_and_format_are_checked_independently() {
        let local = "a".repeat(EMAIL_MAX_LEN);
        let too_long = format!("{local}@example.com");
        let errors = create(Some("Al"), Some("Ng"), Some(&too_long)).validate();
        assert!(errors
            .iter()
            .any(|e| e == "The field email must be a string with a maximum length of 120."));
    }

    #[test]
    fn boundaries_are_inclusive() {
        let max = "y".repeat(NAME_MAX_LEN);
        assert!(create(Some("Al"), Some(&max), Some("al@x.com"))
            .validate()
            .is_empty());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // two characters, four bytes
        assert!(create(Some("Żó"), Some("Ng"), Some("al@x.com"))
            .validate()
            .is_empty());
    }

    #[test]
    fn padding_does_not_count_towards_length() {
        let errors = create(Some(" A "), Some("Ng"), Some("al@x.com")).validate();
        assert_eq!(
            errors,
            vec![
                "The field firstName must be a string with a minimum length of 2 and a maximum length of 50."
                    .to_string()
            ]
        );

        let padded = format!("  {}  ", "y".repeat(NAME_MAX_LEN));
        assert!(create(Some("Al"), Some(&padded), Some("al@x.com"))
            .validate()
            .is_empty());
    }

    #[test]
    fn update_uses_the_same_rules() {
        let req = UpdateUserReq {
            first_name: Some("Al".into()),
            last_name: None,
            email: Some("bad".into()),
            is_active: false,
        };
        assert_eq!(
            req.validate(),
            vec![
                "The lastName field is required.".to_string(),
                "The email field is not a valid e-mail address.".to_string(),
            ]
        );
    }
}
