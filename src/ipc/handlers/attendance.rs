use crate::calc;
use crate::ipc::error::{err, no_workspace, ok};
use crate::ipc::types::{AppState, Request};
use crate::slots;
use rusqlite::{Connection, OptionalExtension};
use serde_json::json;

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

fn count_slots_for_subject_on_day(
    conn: &Connection,
    subject_id: &str,
    day: &str,
) -> Result<i64, HandlerErr> {
    conn.query_row(
        "SELECT COUNT(*) FROM timetable WHERE subject_id = ? AND day = ?",
        (subject_id, day),
        |r| r.get(0),
    )
    .map_err(|e| HandlerErr {
        code: "db_query_failed",
        message: e.to_string(),
        details: None,
    })
}

fn read_counters(conn: &Connection, subject_id: &str) -> Result<Option<(i64, i64)>, HandlerErr> {
    conn.query_row(
        "SELECT attended, total FROM attendance WHERE subject_id = ?",
        [subject_id],
        |r| Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?)),
    )
    .optional()
    .map_err(|e| HandlerErr {
        code: "db_query_failed",
        message: e.to_string(),
        details: None,
    })
}

fn counters_json(attended: i64, total: i64) -> serde_json::Value {
    if total > 0 {
        let pct = calc::attendance_percent(attended, total);
        json!({
            "attended": attended,
            "total": total,
            "percent": pct,
            "status": calc::classify(pct).as_str()
        })
    } else {
        // Never marked; a percentage would be meaningless.
        json!({
            "attended": attended,
            "total": total,
            "percent": serde_json::Value::Null,
            "status": serde_json::Value::Null
        })
    }
}

/// Marking is an all-or-nothing decision per day, scaled by how many
/// scheduled slots that day represents (a 3-hour lab block counts as 3).
/// Zero scheduled slots is an informational no-op, not an error.
fn attendance_mark(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = get_required_str(params, "subjectId")?;
    let day = get_required_str(params, "day")?;
    let present = params
        .get("present")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: "missing present".to_string(),
            details: None,
        })?;

    if !slots::is_valid_day(&day) {
        return Err(HandlerErr {
            code: "bad_params",
            message: "day must be one of MON, TUE, WED, THU, FRI".to_string(),
            details: Some(json!({ "day": day })),
        });
    }

    let slots_today = count_slots_for_subject_on_day(conn, &subject_id, &day)?;
    if slots_today == 0 {
        // Also covers unknown subject ids: the increment path does not
        // pre-validate the id (caller picked it from subjects.list).
        return Ok(json!({ "marked": false, "slotsToday": 0 }));
    }

    let attended_delta = if present { slots_today } else { 0 };
    conn.execute(
        "UPDATE attendance
         SET attended = attended + ?,
             total = total + ?
         WHERE subject_id = ?",
        (attended_delta, slots_today, &subject_id),
    )
    .map_err(|e| HandlerErr {
        code: "db_update_failed",
        message: e.to_string(),
        details: Some(json!({ "table": "attendance" })),
    })?;

    let Some((attended, total)) = read_counters(conn, &subject_id)? else {
        // A timetable row without its counter row means the store was
        // edited out of band.
        return Err(HandlerErr {
            code: "not_found",
            message: "attendance counter not found".to_string(),
            details: Some(json!({ "subjectId": subject_id })),
        });
    };

    let pct = calc::attendance_percent(attended, total);
    Ok(json!({
        "marked": true,
        "slotsToday": slots_today,
        "attended": attended,
        "total": total,
        "percent": pct,
        "status": calc::classify(pct).as_str()
    }))
}

fn attendance_get(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_id = get_required_str(params, "subjectId")?;
    let Some((attended, total)) = read_counters(conn, &subject_id)? else {
        return Err(HandlerErr {
            code: "not_found",
            message: "attendance counter not found".to_string(),
            details: Some(json!({ "subjectId": subject_id })),
        });
    };
    Ok(counters_json(attended, total))
}

fn handle_attendance_mark(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };
    match attendance_mark(conn, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

fn handle_attendance_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };
    match attendance_get(conn, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.mark" => Some(handle_attendance_mark(state, req)),
        "attendance.get" => Some(handle_attendance_get(state, req)),
        _ => None,
    }
}
