//! Attribute value validators registered per element kind.

use mfm_types::Severity;

/// A problem found in an attribute value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Checks one attribute value; `None` means the value is acceptable.
pub type AttributeValidator = fn(&str) -> Option<ValidationIssue>;

/// SDK levels are API numbers or preview codenames (`"P"`, `"Tiramisu"`).
pub fn sdk_version(value: &str) -> Option<ValidationIssue> {
    let value = value.trim();
    if value.is_empty() {
        return Some(ValidationIssue::error("SDK version must not be empty"));
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut chars = value.chars();
    let is_codename = chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if is_codename {
        None
    } else {
        Some(ValidationIssue::error(format!(
            "SDK version {value:?} is neither an API level nor a codename"
        )))
    }
}

pub fn boolean(value: &str) -> Option<ValidationIssue> {
    match value {
        "true" | "false" => None,
        // Resource references are resolved at build time.
        v if v.starts_with('@') => None,
        other => Some(ValidationIssue::warning(format!(
            "expected \"true\" or \"false\", found {other:?}"
        ))),
    }
}

/// OpenGL ES versions are written `0xMMMMmmmm`.
pub fn gl_es_version(value: &str) -> Option<ValidationIssue> {
    let valid = value
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 8 && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if valid {
        None
    } else {
        Some(ValidationIssue::error(format!(
            "glEsVersion {value:?} must be 0x followed by 8 hex digits"
        )))
    }
}
