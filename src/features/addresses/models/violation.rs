use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ViolationKind {
    MissingRequiredField,
    BranchConflict,
    DependencyViolation,
    InvalidReference,
    InvalidField,
}

/// One reason a selection was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Violation {
    /// Path of the offending field, e.g. `province` or `suburbs[2]`
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self::new(
            field,
            ViolationKind::MissingRequiredField,
            format!("{} is required", field),
        )
    }

    pub fn conflict(field: &str, message: &str) -> Self {
        Self::new(field, ViolationKind::BranchConflict, message)
    }

    pub fn dependency(field: &str, message: &str) -> Self {
        Self::new(field, ViolationKind::DependencyViolation, message)
    }

    pub fn invalid_reference(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, ViolationKind::InvalidReference, message)
    }

    /// `"<field>: <message>"`, as sent in error responses
    pub fn to_message(&self) -> String {
        format!("{}: {}", self.field, self.message)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
