use crate::model::case::{Category, Stage};
use crate::model::form::FilingForm;

pub const IDENTITY_DIGITS: usize = 12;
pub const MAX_NAME_LEN: usize = 120;
pub const MAX_TEXT_LEN: usize = 500;
pub const MAX_DESCRIPTION_LEN: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} '{value}': {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
    pub suggestion: String,
    pub code: &'static str,
}

impl ValidationError {
    pub fn new(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
        code: &'static str,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
            code,
        }
    }
}

/// Accepts exactly twelve digits, optionally grouped 4-4-4 with hyphens or
/// spaces. Separators are stripped before counting.
#[must_use]
pub fn is_valid_identity_number(input: &str) -> bool {
    let mut digits = 0usize;
    for c in input.chars() {
        if c == '-' || c.is_whitespace() {
            continue;
        }
        if !c.is_ascii_digit() {
            return false;
        }
        digits += 1;
    }
    digits == IDENTITY_DIGITS
}

/// Display normalization for case ids. Does not check the format.
#[must_use]
pub fn normalize_case_id(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Hide everything but the last four characters of an identity number so
/// it can appear in error text.
#[must_use]
pub fn mask_identity(input: &str) -> String {
    let total = input.chars().filter(char::is_ascii_alphanumeric).count();
    let keep_from = total.saturating_sub(4);
    let mut seen = 0usize;
    input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                seen += 1;
                if seen <= keep_from { '*' } else { c }
            } else {
                c
            }
        })
        .collect()
}

fn require(field: &'static str, value: &str, label: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(
            field,
            value,
            "must not be empty",
            format!("fill in {label}"),
            "missing_field",
        ));
    }
    Ok(())
}

fn bounded(
    field: &'static str,
    value: &str,
    max: usize,
    allow_newlines: bool,
) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            value,
            format!("must be <= {max} characters"),
            format!("shorten the {field}"),
            "field_too_long",
        ));
    }
    let bad_control = value
        .chars()
        .any(|c| c.is_control() && !(allow_newlines && matches!(c, '\n' | '\r' | '\t')));
    if bad_control {
        return Err(ValidationError::new(
            field,
            value,
            "must not contain control characters",
            format!("remove control characters from the {field}"),
            "invalid_characters",
        ));
    }
    Ok(())
}

pub fn validate_identity_number(s: &str) -> Result<(), ValidationError> {
    require("identity_number", s, "the Aadhar number")?;
    if !is_valid_identity_number(s) {
        return Err(ValidationError::new(
            "identity_number",
            mask_identity(s),
            format!("must contain exactly {IDENTITY_DIGITS} digits"),
            "enter the number as XXXX-XXXX-XXXX",
            "invalid_identity_number",
        ));
    }
    Ok(())
}

/// Check every required field of a filing before anything is stored.
pub fn validate_filing(form: &FilingForm) -> Result<Category, ValidationError> {
    require("name", &form.name, "your full name")?;
    bounded("name", &form.name, MAX_NAME_LEN, false)?;
    validate_identity_number(&form.identity_number)?;
    require("address", &form.address, "your address")?;
    bounded("address", &form.address, MAX_TEXT_LEN, false)?;

    let Some(category) = form.category else {
        return Err(ValidationError::new(
            "category",
            "",
            "must be selected",
            "choose one of the listed complaint types",
            "missing_field",
        ));
    };

    require("incident_date", &form.incident_date, "the date of the incident")?;
    require("incident_time", &form.incident_time, "the time of the incident")?;
    require("location", &form.location, "where the incident happened")?;
    bounded("location", &form.location, MAX_TEXT_LEN, false)?;
    require("description", &form.description, "a description of the incident")?;
    bounded("description", &form.description, MAX_DESCRIPTION_LEN, true)?;

    Ok(category)
}

pub fn validate_category(s: &str) -> Result<Category, ValidationError> {
    s.parse().map_err(|_| {
        ValidationError::new(
            "category",
            s,
            "expected one of Theft, Fraud, Assault, Harassment, Cybercrime, Property Dispute, \
             Missing Person, Traffic Violation, Domestic Violence, Other",
            "use --category theft|fraud|property-dispute|...",
            "invalid_category",
        )
    })
}

pub fn validate_stage(s: &str) -> Result<Stage, ValidationError> {
    s.parse().map_err(|_| {
        ValidationError::new(
            "stage",
            s,
            "expected one of filed, acknowledged, under-review, investigation, resolved",
            "use filed|acknowledged|under-review|investigation|resolved",
            "invalid_stage",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn form() -> FilingForm {
        FilingForm {
            name: "Raj Kumar".into(),
            identity_number: "1234-5678-9012".into(),
            address: "12 Residency Road, Bangalore".into(),
            category: Some(Category::Theft),
            incident_date: "2024-06-08".into(),
            incident_time: "14:30".into(),
            location: "MG Road".into(),
            description: "Phone stolen".into(),
            evidence: None,
            account: None,
        }
    }

    #[test]
    fn identity_number_formats() {
        assert!(is_valid_identity_number("123456789012"));
        assert!(is_valid_identity_number("1234-5678-9012"));
        assert!(is_valid_identity_number("1234 5678 9012"));
        assert!(is_valid_identity_number(" 1234-5678 9012 "));

        assert!(!is_valid_identity_number("12345"));
        assert!(!is_valid_identity_number("1234-5678-901"));
        assert!(!is_valid_identity_number("1234-5678-90123"));
        assert!(!is_valid_identity_number("1234-5678-901a"));
        assert!(!is_valid_identity_number("1234.5678.9012"));
        assert!(!is_valid_identity_number(""));
    }

    #[test]
    fn normalize_uppercases_only() {
        assert_eq!(normalize_case_id("fir202400001"), "FIR202400001");
        assert_eq!(normalize_case_id(" fir-x "), "FIR-X");
        assert_eq!(normalize_case_id("not an id"), "NOT AN ID");
    }

    #[test]
    fn mask_keeps_last_four() {
        assert_eq!(mask_identity("1234-5678-9012"), "****-****-9012");
        assert_eq!(mask_identity("12345"), "*2345");
        assert_eq!(mask_identity("12"), "12");
    }

    #[test]
    fn complete_form_passes() {
        assert_eq!(validate_filing(&form()).unwrap(), Category::Theft);
    }

    #[test]
    fn short_identity_is_rejected_without_leaking_it() {
        let mut f = form();
        f.identity_number = "98765".into();
        let err = validate_filing(&f).unwrap_err();
        assert_eq!(err.field, "identity_number");
        assert!(!err.to_string().contains("98765"));
    }

    #[test]
    fn each_required_field_is_checked() {
        let blanks: [(&str, fn(&mut FilingForm)); 7] = [
            ("name", |f| f.name = "  ".into()),
            ("identity_number", |f| f.identity_number.clear()),
            ("address", |f| f.address.clear()),
            ("incident_date", |f| f.incident_date.clear()),
            ("incident_time", |f| f.incident_time.clear()),
            ("location", |f| f.location.clear()),
            ("description", |f| f.description = "\n".into()),
        ];
        for (field, blank) in blanks {
            let mut f = form();
            blank(&mut f);
            assert_eq!(validate_filing(&f).unwrap_err().field, field);
        }

        let mut f = form();
        f.category = None;
        assert_eq!(validate_filing(&f).unwrap_err().field, "category");
    }

    #[test]
    fn description_allows_newlines_but_name_does_not() {
        let mut f = form();
        f.description = "Line one\nLine two\tindented".into();
        assert!(validate_filing(&f).is_ok());

        f.name = "Raj\u{7}Kumar".into();
        assert_eq!(validate_filing(&f).unwrap_err().code, "invalid_characters");
    }

    #[test]
    fn enum_validators() {
        assert_eq!(validate_category("cybercrime").unwrap(), Category::Cybercrime);
        assert!(validate_category("arson").is_err());
        assert_eq!(validate_stage("under-review").unwrap(), Stage::UnderReview);
        assert_eq!(validate_stage("nope").unwrap_err().code, "invalid_stage");
    }

    proptest! {
        #[test]
        fn any_twelve_digits_are_valid(
            a in "[0-9]{4}", b in "[0-9]{4}", c in "[0-9]{4}",
            sep in prop::sample::select(vec!["", "-", " "]),
        ) {
            let grouped = format!("{a}{sep}{b}{sep}{c}");
            prop_assert!(is_valid_identity_number(&grouped));
        }

        #[test]
        fn other_digit_counts_are_invalid(digits in "[0-9]{0,30}") {
            prop_assume!(digits.len() != IDENTITY_DIGITS);
            prop_assert!(!is_valid_identity_number(&digits));
        }

        #[test]
        fn any_letter_is_invalid(prefix in "[0-9]{11}", letter in "[a-zA-Z]") {
            let input = format!("{prefix}{letter}");
            prop_assert!(!is_valid_identity_number(&input));
        }
    }
}
