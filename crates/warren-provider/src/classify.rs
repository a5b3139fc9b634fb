//! Error classification
//!
//! Maps transport errors onto the reconciliation taxonomy with one rule
//! table per resource kind. The first matching rule wins; rate limiting and
//! 5xx statuses are shared by every kind. Classification never retries and
//! never performs I/O.

use crate::error::ApiError;
use warren_cloud::{CloudError, ErrorKind, ResourceKind};

struct Rule {
    status: u16,
    contains: Option<&'static str>,
    kind: ErrorKind,
}

// The platform reports some missing machines as 400 instead of 404.
const VIRTUAL_MACHINE_RULES: &[Rule] = &[
    Rule {
        status: 400,
        contains: Some("No such virtual machine exists"),
        kind: ErrorKind::NotFound,
    },
    Rule {
        status: 404,
        contains: None,
        kind: ErrorKind::NotFound,
    },
    Rule {
        status: 409,
        contains: None,
        kind: ErrorKind::Locked,
    },
];

const NOT_FOUND_RULES: &[Rule] = &[Rule {
    status: 404,
    contains: None,
    kind: ErrorKind::NotFound,
}];

fn rules(kind: ResourceKind) -> &'static [Rule] {
    match kind {
        ResourceKind::VirtualMachine => VIRTUAL_MACHINE_RULES,
        ResourceKind::Disk
        | ResourceKind::FloatingIp
        | ResourceKind::Network
        | ResourceKind::Location
        | ResourceKind::OsBaseImage => NOT_FOUND_RULES,
    }
}

/// Classify an HTTP status together with the rendered error text
pub fn classify_status(kind: ResourceKind, status: u16, text: &str) -> Option<ErrorKind> {
    rules(kind)
        .iter()
        .find(|rule| rule.status == status && rule.contains.is_none_or(|needle| text.contains(needle)))
        .map(|rule| rule.kind)
        .or(match status {
            429 => Some(ErrorKind::RateLimited),
            500..=599 => Some(ErrorKind::InternalUnknown),
            _ => None,
        })
}

/// Classify a typed transport error; `None` means passthrough
pub fn classify(kind: ResourceKind, err: &ApiError) -> Option<ErrorKind> {
    match err.status() {
        Some(status) => classify_status(kind, status, &err.to_string())
            .or_else(|| err.is_malformed().then_some(ErrorKind::MalformedResponse)),
        None if err.is_malformed() => Some(ErrorKind::MalformedResponse),
        None => None,
    }
}

/// Read the status out of a `[NNN] ...` prefixed error string
pub fn parse_status_prefix(text: &str) -> Option<u16> {
    if !text.starts_with('[') || text.find(']') != Some(4) {
        return None;
    }
    let code = &text[1..4];
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    code.parse().ok()
}

/// Classify a pre-formatted error string
pub fn classify_message(kind: ResourceKind, text: &str) -> Option<ErrorKind> {
    parse_status_prefix(text).and_then(|status| classify_status(kind, status, text))
}

/// Translate a transport error into a reconciliation error for one object
pub fn into_cloud_error(kind: ResourceKind, id: impl Into<String>, err: ApiError) -> CloudError {
    let id = id.into();
    let message = err.to_string();
    let classified = classify(kind, &err);

    tracing::trace!("Classified {} error for {} as {:?}: {}", kind, id, classified, message);

    match classified {
        Some(ErrorKind::NotFound) => CloudError::NotFound { kind, id },
        Some(ErrorKind::Locked) => CloudError::Locked { kind, id, message },
        Some(ErrorKind::RateLimited) => CloudError::RateLimited { kind, id, message },
        Some(ErrorKind::InternalUnknown) => CloudError::InternalUnknown { kind, id, message },
        Some(ErrorKind::MalformedResponse) => CloudError::MalformedResponse { kind, id, message },
        _ if err.status().is_some() => CloudError::Api { kind, id, message },
        _ => CloudError::Transport { kind, id, message },
    }
}
