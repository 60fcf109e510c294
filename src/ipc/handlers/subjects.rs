use crate::ipc::error::{err, no_workspace, ok};
use crate::ipc::types::{AppState, Request};
use crate::slots;
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

struct HandlerErr {
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

impl HandlerErr {
    fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: format!("missing {}", key),
            details: None,
        })
}

fn get_trimmed_field(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    let raw = get_required_str(params, key)?;
    let trimmed = raw.trim().to_string();
    if trimmed.is_empty() {
        return Err(HandlerErr {
            code: "validation_failed",
            message: format!("{} must not be blank", key),
            details: Some(json!({ "field": key })),
        });
    }
    Ok(trimmed)
}

/// Atomically creates the subject, its first timetable entry, and a
/// zeroed attendance counter. No partial write survives a failure.
fn subjects_add(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let name = get_trimmed_field(params, "name")?;
    let code = get_trimmed_field(params, "code")?;
    let professor = get_trimmed_field(params, "professor")?;
    let day = get_trimmed_field(params, "day")?;
    let slot = get_trimmed_field(params, "slot")?;

    if !slots::is_valid_day(&day) {
        return Err(HandlerErr {
            code: "bad_params",
            message: "day must be one of MON, TUE, WED, THU, FRI".to_string(),
            details: Some(json!({ "day": day })),
        });
    }
    if let Err(e) = slots::column_of(&slot) {
        return Err(HandlerErr {
            code: "unknown_slot",
            message: e.to_string(),
            details: Some(json!({ "slot": slot })),
        });
    }

    let subject_id = Uuid::new_v4().to_string();
    let tx = conn.unchecked_transaction().map_err(|e| HandlerErr {
        code: "db_tx_failed",
        message: e.to_string(),
        details: None,
    })?;
    tx.execute(
        "INSERT INTO subjects(id, name, code, professor) VALUES(?, ?, ?, ?)",
        (&subject_id, &name, &code, &professor),
    )
    .map_err(|e| HandlerErr {
        code: "db_insert_failed",
        message: e.to_string(),
        details: Some(json!({ "table": "subjects" })),
    })?;
    tx.execute(
        "INSERT INTO timetable(subject_id, day, slot) VALUES(?, ?, ?)",
        (&subject_id, &day, &slot),
    )
    .map_err(|e| HandlerErr {
        code: "db_insert_failed",
        message: e.to_string(),
        details: Some(json!({ "table": "timetable" })),
    })?;
    tx.execute(
        "INSERT INTO attendance(subject_id, attended, total) VALUES(?, 0, 0)",
        [&subject_id],
    )
    .map_err(|e| HandlerErr {
        code: "db_insert_failed",
        message: e.to_string(),
        details: Some(json!({ "table": "attendance" })),
    })?;
    tx.commit().map_err(|e| HandlerErr {
        code: "db_tx_failed",
        message: e.to_string(),
        details: None,
    })?;

    Ok(json!({ "subjectId": subject_id, "code": code }))
}

/// Distinct subjects that have at least one timetable entry, for the
/// attendance picker.
fn subjects_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT s.id, s.code
             FROM subjects s
             JOIN timetable t ON s.id = t.subject_id
             ORDER BY s.code",
        )
        .map_err(|e| HandlerErr {
            code: "db_query_failed",
            message: e.to_string(),
            details: None,
        })?;
    let rows = stmt
        .query_map([], |r| {
            Ok(json!({
                "id": r.get::<_, String>(0)?,
                "code": r.get::<_, String>(1)?
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(|e| HandlerErr {
            code: "db_query_failed",
            message: e.to_string(),
            details: None,
        })?;
    Ok(json!({ "subjects": rows }))
}

fn handle_subjects_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };
    match subjects_add(conn, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

fn handle_subjects_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "subjects": [] }));
    };
    match subjects_list(conn) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.add" => Some(handle_subjects_add(state, req)),
        "subjects.list" => Some(handle_subjects_list(state, req)),
        _ => None,
    }
}
