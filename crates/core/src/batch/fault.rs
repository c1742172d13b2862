//! Fault translation
//!
//! Turns the service's fault payload into a typed [`FaultError`]. The set of
//! fault types is closed; anything outside it is reported as
//! [`FaultError::Unknown`] instead of being swallowed.

use std::fmt;

use ledgerlink_domain::{ErrorDetail, FaultKind};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Stand-in for the type string of a fault that declares none.
pub const MISSING_FAULT_TYPE: &str = "<missing>";

/// Fault payload as sent by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub fault_type: Option<String>,
    #[serde(rename = "Error", default, deserialize_with = "null_as_empty")]
    pub errors: Vec<FaultEntry>,
}

/// `"Error": null` carries no entries, same as an absent list.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<FaultEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<FaultEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One entry of a fault's error list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultEntry {
    #[serde(rename = "Message", alias = "message", default)]
    pub message: String,
    #[serde(rename = "Detail", alias = "detail", default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(alias = "Code", default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(alias = "Element", default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

impl From<&FaultEntry> for ErrorDetail {
    fn from(entry: &FaultEntry) -> Self {
        let non_blank = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());
        ErrorDetail {
            message: entry.message.clone(),
            code: non_blank(&entry.code),
            detail: non_blank(&entry.detail),
            element: non_blank(&entry.element),
        }
    }
}

/// Fault type strings the SDK understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultType {
    Validation,
    Service,
    Authentication,
    Authorization,
    /// Any other type string, kept verbatim ([`MISSING_FAULT_TYPE`] when absent).
    Unrecognized(String),
}

impl FaultType {
    /// Case-insensitive parse accepting both `Validation` and `ValidationFault` forms.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Unrecognized(MISSING_FAULT_TYPE.to_string());
        };
        let normalized = raw.trim().to_ascii_lowercase();
        let base = normalized.strip_suffix("fault").unwrap_or(&normalized);
        match base {
            "validation" => Self::Validation,
            "service" => Self::Service,
            "authentication" => Self::Authentication,
            "authorization" => Self::Authorization,
            _ => Self::Unrecognized(raw.to_string()),
        }
    }

    pub fn kind(&self) -> FaultKind {
        match self {
            Self::Validation => FaultKind::Validation,
            Self::Service => FaultKind::Service,
            Self::Authentication => FaultKind::Authentication,
            Self::Authorization => FaultKind::Authorization,
            Self::Unrecognized(_) => FaultKind::Unknown,
        }
    }
}

/// Ordered error entries carried by a fault.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList(Vec<ErrorDetail>);

impl ErrorList {
    pub fn new(errors: Vec<ErrorDetail>) -> Self {
        Self(errors)
    }

    pub fn as_slice(&self) -> &[ErrorDetail] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ErrorDetail> {
        self.0.iter()
    }
}

impl From<Vec<ErrorDetail>> for ErrorList {
    fn from(errors: Vec<ErrorDetail>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no error details");
        }
        for (index, detail) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{detail}")?;
        }
        Ok(())
    }
}

/// A fault reported by the service, grouped by family.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaultError {
    #[error("validation fault: {0}")]
    Validation(ErrorList),

    #[error("service fault: {0}")]
    Service(ErrorList),

    #[error("{kind} fault: {errors}")]
    Security { kind: FaultKind, errors: ErrorList },

    #[error("unrecognized fault type `{fault_type}`: {errors}")]
    Unknown { fault_type: String, errors: ErrorList },
}

impl FaultError {
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::Validation(_) => FaultKind::Validation,
            Self::Service(_) => FaultKind::Service,
            Self::Security { kind, .. } => *kind,
            Self::Unknown { .. } => FaultKind::Unknown,
        }
    }

    pub fn errors(&self) -> &[ErrorDetail] {
        match self {
            Self::Validation(errors) | Self::Service(errors) => errors.as_slice(),
            Self::Security { errors, .. } | Self::Unknown { errors, .. } => errors.as_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.errors().len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors().is_empty()
    }
}

/// Translate an optional fault payload.
///
/// Returns `None` when there is no fault, or when a recognized fault carries
/// no error entries. Unrecognized fault types always produce an error.
pub fn translate(fault: Option<&Fault>) -> Option<FaultError> {
    let fault = fault?;
    let fault_type = FaultType::parse(fault.fault_type.as_deref());
    let errors = ErrorList::new(fault.errors.iter().map(ErrorDetail::from).collect());

    if errors.is_empty() && !matches!(fault_type, FaultType::Unrecognized(_)) {
        return None;
    }

    Some(match fault_type {
        FaultType::Validation => FaultError::Validation(errors),
        FaultType::Service => FaultError::Service(errors),
        FaultType::Authentication => {
            FaultError::Security { kind: FaultKind::Authentication, errors }
        }
        FaultType::Authorization => FaultError::Security { kind: FaultKind::Authorization, errors },
        FaultType::Unrecognized(fault_type) => FaultError::Unknown { fault_type, errors },
    })
}
