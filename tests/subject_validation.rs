#[path = "../src/form/validate.rs"]
mod validate;

use validate::{validate, FieldErrors, SubjectEntry};

fn check(name: &str, code: &str, sessions: &str) -> FieldErrors {
    validate(&SubjectEntry::new(name, code, sessions))
}

#[test]
fn documented_scenarios() {
    assert_eq!(check("Math", "M101", "10"), FieldErrors::default());
    assert_eq!(
        check("Math1", "M101", "10").name_error,
        "Subject Name should only contain letters and spaces."
    );
    assert_eq!(
        check("Math", "M 101", "10").code_error,
        "Subject Code should be alphanumeric without spaces."
    );
    assert_eq!(
        check("Math", "M101", "-5").sessions_error,
        "Sessions cannot be negative."
    );
}

#[test]
fn sessions_error_is_empty_only_for_non_negative_numbers() {
    let cases = [
        ("0", true),
        ("12", true),
        ("2.5", true),
        ("1e3", true),
        ("-1", false),
        ("-0.5", false),
        ("", false),
        (" ", false),
        ("abc", false),
        ("12abc", false),
        ("Infinity", false),
    ];
    for (raw, ok) in cases {
        let errs = check("Math", "M101", raw);
        assert_eq!(errs.sessions_error.is_empty(), ok, "sessions {:?}", raw);
    }
}

#[test]
fn name_error_is_empty_only_for_letters_and_spaces() {
    let cases = [
        ("Math", true),
        ("Social Studies", true),
        ("  Art  ", true),
        ("", false),
        ("   ", false),
        ("Math-2", false),
        ("Español", false),
    ];
    for (raw, ok) in cases {
        assert_eq!(check(raw, "M101", "1").name_error.is_empty(), ok, "name {:?}", raw);
    }
}

#[test]
fn every_field_reports_independently() {
    let errs = check("", "", "");
    assert_eq!(errs.name_error, "Subject Name is required.");
    assert_eq!(errs.code_error, "Subject Code is required.");
    assert_eq!(errs.sessions_error, "Sessions must be a valid number.");
    assert!(!errs.is_valid());
}
