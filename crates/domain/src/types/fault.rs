//! Fault vocabulary reported by the accounting service

use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;

/// Classification of a service-reported fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultKind {
    Validation,
    Service,
    Authentication,
    Authorization,
    Unknown,
}

impl_wire_enum_conversions!(FaultKind {
    Validation => "validation",
    Service => "service",
    Authentication => "authentication",
    Authorization => "authorization",
    Unknown => "unknown",
});

impl FaultKind {
    /// Authentication and authorization faults are both security failures.
    pub fn is_security(&self) -> bool {
        matches!(self, Self::Authentication | Self::Authorization)
    }
}

/// One field-level error entry inside a fault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub code: Option<String>,
    pub detail: Option<String>,
    /// Name of the offending element, when the service reports one.
    pub element: Option<String>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Self::default() }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code {code})")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}
