//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use ledgerlink_domain::LedgerLinkError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LedgerLinkError);

impl From<InfraError> for LedgerLinkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LedgerLinkError> for InfraError {
    fn from(value: LedgerLinkError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoLedgerLinkError {
    fn into_ledgerlink(self) -> LedgerLinkError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → LedgerLinkError */
/* -------------------------------------------------------------------------- */

impl IntoLedgerLinkError for HttpError {
    fn into_ledgerlink(self) -> LedgerLinkError {
        if self.is_timeout() {
            return LedgerLinkError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return LedgerLinkError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return LedgerLinkError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => LedgerLinkError::Auth(message),
                404 => LedgerLinkError::NotFound(message),
                429 => LedgerLinkError::Network(message),
                400..=499 => LedgerLinkError::InvalidInput(message),
                _ => LedgerLinkError::Network(message),
            };
        }

        LedgerLinkError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_ledgerlink())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → LedgerLinkError */
/* -------------------------------------------------------------------------- */

impl IntoLedgerLinkError for IoError {
    fn into_ledgerlink(self) -> LedgerLinkError {
        match self.kind() {
            ErrorKind::NotFound => LedgerLinkError::NotFound(self.to_string()),
            ErrorKind::InvalidData | ErrorKind::InvalidInput | ErrorKind::UnexpectedEof => {
                LedgerLinkError::Serialization(format!("corrupt body: {self}"))
            }
            _ => LedgerLinkError::Internal(format!("I/O failure: {self}")),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_ledgerlink())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
