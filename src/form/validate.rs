use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

pub const NAME_REQUIRED: &str = "Subject Name is required.";
pub const NAME_LETTERS_ONLY: &str = "Subject Name should only contain letters and spaces.";
pub const CODE_REQUIRED: &str = "Subject Code is required.";
pub const CODE_ALPHANUMERIC: &str = "Subject Code should be alphanumeric without spaces.";
pub const SESSIONS_NOT_A_NUMBER: &str = "Sessions must be a valid number.";
pub const SESSIONS_NEGATIVE: &str = "Sessions cannot be negative.";

static NAME_RE: OnceLock<Regex> = OnceLock::new();
static CODE_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z\s]+$").expect("valid name pattern"))
}

fn code_re() -> &'static Regex {
    CODE_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid code pattern"))
}

/// One row of the subject form, as typed by the user.
///
/// `session_count` stays raw text so the payload can pass it through untouched;
/// JSON numbers are accepted on the way in and rendered to text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub session_count: String,
}

impl SubjectEntry {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        session_count: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            session_count: session_count.into(),
        }
    }

    /// Name and code trimmed, sessions untouched.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            code: self.code.trim().to_string(),
            session_count: self.session_count.clone(),
        }
    }
}

/// Per-field messages for one row. Empty string means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub name_error: String,
    pub code_error: String,
    pub sessions_error: String,
}

impl FieldErrors {
    pub fn is_valid(&self) -> bool {
        self.name_error.is_empty() && self.code_error.is_empty() && self.sessions_error.is_empty()
    }
}

/// Accepts either a JSON string or a JSON number and keeps it as text.
pub fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    match v {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Parses a sessions value. Surrounding whitespace is ignored; empty text,
/// non-decimal forms and non-finite values yield `None`.
pub fn parse_sessions(raw: &str) -> Option<f64> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    // f64::from_str also accepts "inf"/"nan"; only plain decimal forms count here.
    if !t
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
    {
        return None;
    }
    let v = t.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

pub fn validate(entry: &SubjectEntry) -> FieldErrors {
    let mut errors = FieldErrors::default();

    let name = entry.name.trim();
    if name.is_empty() {
        errors.name_error = NAME_REQUIRED.to_string();
    } else if !name_re().is_match(name) {
        errors.name_error = NAME_LETTERS_ONLY.to_string();
    }

    let code = entry.code.trim();
    if code.is_empty() {
        errors.code_error = CODE_REQUIRED.to_string();
    } else if !code_re().is_match(code) {
        errors.code_error = CODE_ALPHANUMERIC.to_string();
    }

    match parse_sessions(&entry.session_count) {
        None => errors.sessions_error = SESSIONS_NOT_A_NUMBER.to_string(),
        Some(v) if v < 0.0 => errors.sessions_error = SESSIONS_NEGATIVE.to_string(),
        Some(_) => {}
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_subject_is_valid() {
        let e = validate(&SubjectEntry::new("Math", "M101", "10"));
        assert!(e.is_valid(), "{e:?}");
    }

    #[test]
    fn name_checks_trimmed_value() {
        assert!(validate(&SubjectEntry::new("  Social Studies ", "SS1", "3")).is_valid());
        assert_eq!(
            validate(&SubjectEntry::new("   ", "SS1", "3")).name_error,
            NAME_REQUIRED
        );
        assert_eq!(
            validate(&SubjectEntry::new("Math1", "M101", "10")).name_error,
            NAME_LETTERS_ONLY
        );
    }

    #[test]
    fn code_rejects_inner_space() {
        let e = validate(&SubjectEntry::new("Math", "M 101", "10"));
        assert_eq!(e.code_error, CODE_ALPHANUMERIC);
        assert_eq!(e.name_error, "");
        assert_eq!(
            validate(&SubjectEntry::new("Math", "", "10")).code_error,
            CODE_REQUIRED
        );
    }

    #[test]
    fn sessions_parse_edges() {
        assert_eq!(parse_sessions("10"), Some(10.0));
        assert_eq!(parse_sessions(" 7 "), Some(7.0));
        assert_eq!(parse_sessions("1e3"), Some(1000.0));
        assert_eq!(parse_sessions("+5"), Some(5.0));
        assert_eq!(parse_sessions(""), None);
        assert_eq!(parse_sessions("   "), None);
        assert_eq!(parse_sessions("inf"), None);
        assert_eq!(parse_sessions("NaN"), None);
        assert_eq!(parse_sessions("0x10"), None);
        assert_eq!(parse_sessions("ten"), None);
    }

    #[test]
    fn negative_sessions_flagged_separately() {
        let e = validate(&SubjectEntry::new("Math", "M101", "-5"));
        assert_eq!(e.sessions_error, SESSIONS_NEGATIVE);
        assert!(validate(&SubjectEntry::new("Math", "M101", "-0")).is_valid());
        assert_eq!(
            validate(&SubjectEntry::new("Math", "M101", "abc")).sessions_error,
            SESSIONS_NOT_A_NUMBER
        );
    }

    #[test]
    fn entry_accepts_numeric_sessions() {
        let e: SubjectEntry =
            serde_json::from_value(serde_json::json!({ "name": "Art", "code": "A1", "sessionCount": 12 }))
                .expect("deserialize entry");
        assert_eq!(e.session_count, "12");
    }
}
