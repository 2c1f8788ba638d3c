//! Import helpers

use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Builds a state holding only `attribute = id`. The host's follow-up read
/// fills in everything else.
pub fn import_state_passthrough_id(
    attribute: &str,
    request: &ImportResourceStateRequest,
) -> ImportResourceStateResponse {
    let path = AttributePath::new(attribute);
    let id = request.id.trim();
    if id.is_empty() {
        return ImportResourceStateResponse::failed(
            Diagnostic::error("Invalid import ID", "the import ID must not be empty")
                .with_attribute(path),
        );
    }

    let mut state = DynamicValue::empty_object();
    match state.set_string(&path, id.to_string()) {
        Ok(()) => ImportResourceStateResponse::single(request.type_name.clone(), state),
        Err(e) => ImportResourceStateResponse::failed(
            Diagnostic::error("Failed to set import ID", e.to_string()).with_attribute(path),
        ),
    }
}
