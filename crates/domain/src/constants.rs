//! SDK constants
//!
//! Centralized location for the wire vocabulary and limits shared by the
//! batch engine and its adapters.

// Batch limits
pub const MAX_BATCH_ITEMS: usize = 25;

// Request envelope members
pub const BATCH_REQUEST_MEMBER: &str = "BatchItemRequest";
pub const BATCH_ID_MEMBER: &str = "bId";
pub const OPERATION_MEMBER: &str = "operation";
pub const QUERY_MEMBER: &str = "Query";
pub const REPORT_QUERY_MEMBER: &str = "ReportQuery";
pub const PLACEHOLDER_TAG: &str = "IntuitObject";
pub const MARKER_ATTRIBUTE: &str = "batchMarker";

// Response envelope members
pub const BATCH_RESPONSE_MEMBER: &str = "BatchItemResponse";
pub const FAULT_MEMBER: &str = "Fault";
pub const QUERY_RESPONSE_MEMBER: &str = "QueryResponse";
pub const REPORT_MEMBER: &str = "Report";

/// Names the envelope already uses; entity tags may not collide with them.
pub const RESERVED_TAGS: &[&str] = &[
    PLACEHOLDER_TAG,
    BATCH_ID_MEMBER,
    OPERATION_MEMBER,
    QUERY_MEMBER,
    REPORT_QUERY_MEMBER,
    FAULT_MEMBER,
    QUERY_RESPONSE_MEMBER,
    REPORT_MEMBER,
    MARKER_ATTRIBUTE,
];

// HTTP
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const DEFAULT_USER_AGENT: &str = concat!("ledgerlink-sdk/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_BASE_URL: &str = "https://quickbooks.api.intuit.com/v3";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: usize = 1;
