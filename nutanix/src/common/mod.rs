//! Expand/flatten plumbing shared by every resource and data source

pub mod attrs;
pub mod network;
pub mod obj;
pub mod schema;

pub use attrs::Attrs;
pub use obj::{carry, many, single, unknowns_to_null, IntoDynamic, Obj};

use std::collections::BTreeSet;

use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use crate::api::ApiError;
use crate::tasks::TaskError;

/// Entries of `new` missing from `old`, and of `old` missing from `new`.
/// Empty strings never count.
pub fn diff_string_sets(old: &[String], new: &[String]) -> (Vec<String>, Vec<String>) {
    let old: BTreeSet<&str> = old.iter().map(String::as_str).filter(|s| !s.is_empty()).collect();
    let new: BTreeSet<&str> = new.iter().map(String::as_str).filter(|s| !s.is_empty()).collect();
    let added = new.difference(&old).map(|s| s.to_string()).collect();
    let removed = old.difference(&new).map(|s| s.to_string()).collect();
    (added, removed)
}

/// Whether the plan moves `key` away from the prior state. Values still
/// unknown in the plan do not count as a change.
pub fn has_change(prior: &DynamicValue, planned: &DynamicValue, key: &str) -> bool {
    let path = AttributePath::new(key);
    match planned.get(&path) {
        Some(value) if value.is_unknown() => false,
        planned => {
            let prior = prior.get(&path).filter(|v| !v.is_null());
            let planned = planned.filter(|v| !v.is_null());
            prior != planned
        }
    }
}

pub fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}

pub fn api_error(summary: impl Into<String>, error: &ApiError) -> Diagnostic {
    Diagnostic::error(summary, format!("API error: {}", error))
}

/// `error waiting for {what} ({task}): {error}`
pub fn task_error(what: &str, task: Option<&str>, error: &TaskError) -> Diagnostic {
    Diagnostic::error(
        format!("error waiting for {} ({})", what, task.unwrap_or("unknown task")),
        error.to_string(),
    )
}

pub fn state_error(error: impl std::fmt::Display) -> Diagnostic {
    Diagnostic::error("Failed to write state", error.to_string())
}

/// Random id for objects the API does not identify on its own
pub fn random_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
