use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::slots;
use serde_json::json;

/// Static catalogue data for the shell's constrained choice inputs.
/// Day and slot pickers must offer exactly these values; free-text slot
/// entry is what makes unknown-slot failures reachable downstream.
fn handle_catalogue_get(req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "days": slots::DAYS,
            "slots": slots::all_slots(),
            "gridColumns": slots::GRID_COLUMNS,
            "theoryTimes": slots::THEORY_TIMES,
            "labTimes": slots::LAB_TIMES,
        }),
    )
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "catalogue.get" => Some(handle_catalogue_get(req)),
        _ => None,
    }
}
