use crate::ipc::error::{err, no_workspace, ok};
use crate::ipc::types::{AppState, Request};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
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

fn get_trimmed_field(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    let raw = params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: format!("missing {}", key),
            details: None,
        })?;
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

fn assignments_add(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = get_trimmed_field(params, "subjectId")?;
    let title = get_trimmed_field(params, "title")?;
    let deadline = get_trimmed_field(params, "deadline")?;

    // Deadlines persist as ISO calendar dates; reject anything else at
    // the boundary so the notifier's equality scan stays exact.
    let parsed = NaiveDate::parse_from_str(&deadline, "%Y-%m-%d").map_err(|_| HandlerErr {
        code: "validation_failed",
        message: "deadline must be an ISO date (YYYY-MM-DD)".to_string(),
        details: Some(json!({ "deadline": deadline })),
    })?;

    // The id arrives caller-supplied here, so check it rather than
    // letting the foreign key bounce the insert with a raw db error.
    let exists = conn
        .query_row("SELECT 1 FROM subjects WHERE id = ?", [&subject_id], |r| {
            r.get::<_, i64>(0)
        })
        .optional()
        .map_err(|e| HandlerErr {
            code: "db_query_failed",
            message: e.to_string(),
            details: None,
        })?
        .is_some();
    if !exists {
        return Err(HandlerErr {
            code: "not_found",
            message: "subject not found".to_string(),
            details: Some(json!({ "subjectId": subject_id })),
        });
    }

    let assignment_id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO assignments(id, subject_id, title, deadline) VALUES(?, ?, ?, ?)",
        (&assignment_id, &subject_id, &title, parsed.to_string()),
    )
    .map_err(|e| HandlerErr {
        code: "db_insert_failed",
        message: e.to_string(),
        details: Some(json!({ "table": "assignments" })),
    })?;

    Ok(json!({ "assignmentId": assignment_id }))
}

fn assignments_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let mut stmt = conn
        .prepare(
            "SELECT id, subject_id, title, deadline
             FROM assignments
             ORDER BY deadline, rowid",
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
                "subjectId": r.get::<_, String>(1)?,
                "title": r.get::<_, String>(2)?,
                "deadline": r.get::<_, String>(3)?
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(|e| HandlerErr {
            code: "db_query_failed",
            message: e.to_string(),
            details: None,
        })?;
    Ok(json!({ "assignments": rows }))
}

fn handle_assignments_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };
    match assignments_add(conn, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

fn handle_assignments_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "assignments": [] }));
    };
    match assignments_list(conn) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assignments.add" => Some(handle_assignments_add(state, req)),
        "assignments.list" => Some(handle_assignments_list(state, req)),
        _ => None,
    }
}
