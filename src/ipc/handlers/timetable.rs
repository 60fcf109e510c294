use crate::ipc::error::{err, no_workspace, ok};
use crate::ipc::types::{AppState, Request};
use crate::slots;
use rusqlite::OptionalExtension;
use serde_json::json;

fn handle_timetable_add_entry(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let subject_id = match req.params.get("subjectId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing subjectId", None),
    };
    let day = match req.params.get("day").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing day", None),
    };
    let slot = match req.params.get("slot").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing slot", None),
    };

    if !slots::is_valid_day(&day) {
        return err(
            &req.id,
            "bad_params",
            "day must be one of MON, TUE, WED, THU, FRI",
            Some(json!({ "day": day })),
        );
    }
    if let Err(e) = slots::column_of(&slot) {
        return err(
            &req.id,
            "unknown_slot",
            e.to_string(),
            Some(json!({ "slot": slot })),
        );
    }

    let exists: Option<i64> = match conn
        .query_row("SELECT 1 FROM subjects WHERE id = ?", [&subject_id], |r| {
            r.get(0)
        })
        .optional()
    {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if exists.is_none() {
        return err(&req.id, "not_found", "subject not found", None);
    }

    if let Err(e) = conn.execute(
        "INSERT INTO timetable(subject_id, day, slot) VALUES(?, ?, ?)",
        (&subject_id, &day, &slot),
    ) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "timetable" })),
        );
    }

    ok(&req.id, json!({ "subjectId": subject_id, "day": day, "slot": slot }))
}

fn handle_timetable_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "entries": [] }));
    };

    let mut stmt = match conn.prepare(
        "SELECT s.code, t.day, t.slot
         FROM timetable t
         JOIN subjects s ON s.id = t.subject_id
         ORDER BY t.rowid",
    ) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let rows = stmt
        .query_map([], |r| {
            Ok(json!({
                "code": r.get::<_, String>(0)?,
                "day": r.get::<_, String>(1)?,
                "slot": r.get::<_, String>(2)?
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>());

    match rows {
        Ok(entries) => ok(&req.id, json!({ "entries": entries })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_timetable_today(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let day = match req.params.get("day").and_then(|v| v.as_str()) {
        Some(d) => {
            if !slots::is_valid_day(d) {
                return err(
                    &req.id,
                    "bad_params",
                    "day must be one of MON, TUE, WED, THU, FRI",
                    Some(json!({ "day": d })),
                );
            }
            Some(d.to_string())
        }
        // No explicit day: use the local weekday. Weekends have no day
        // code and therefore no classes.
        None => slots::local_day(chrono::Local::now().date_naive()).map(|d| d.to_string()),
    };

    let Some(day) = day else {
        return ok(&req.id, json!({ "day": serde_json::Value::Null, "classes": [] }));
    };

    let mut stmt = match conn.prepare(
        "SELECT s.code, t.slot
         FROM timetable t
         JOIN subjects s ON s.id = t.subject_id
         WHERE t.day = ?
         ORDER BY t.rowid",
    ) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let rows = stmt
        .query_map([&day], |r| {
            Ok(json!({
                "code": r.get::<_, String>(0)?,
                "slot": r.get::<_, String>(1)?
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>());

    match rows {
        Ok(classes) => ok(&req.id, json!({ "day": day, "classes": classes })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

/// Derived weekly view: 5 day rows by 12 slot columns, recomputed from
/// the store on every request. Entries that land on the same (day,
/// column) resolve last-write-wins in insertion order.
fn handle_timetable_grid(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let mut stmt = match conn.prepare(
        "SELECT s.code, t.day, t.slot
         FROM timetable t
         JOIN subjects s ON s.id = t.subject_id
         ORDER BY t.rowid",
    ) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let rows = match stmt
        .query_map([], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
    {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let mut grid: Vec<Vec<serde_json::Value>> =
        vec![vec![serde_json::Value::Null; slots::GRID_COLUMNS]; slots::DAYS.len()];

    for (code, day, slot) in rows {
        // Writes validate the day, so a miss here means the store was
        // edited out of band; such a row has no grid row to land on.
        let Some(row) = slots::day_index(&day) else {
            continue;
        };
        let col = match slots::column_of(&slot) {
            Ok(c) => c,
            Err(e) => {
                // Unreachable via the write paths; a config/programming
                // error, not something the user can fix.
                return err(
                    &req.id,
                    "unknown_slot",
                    e.to_string(),
                    Some(json!({ "slot": slot, "day": day })),
                );
            }
        };
        grid[row][col] = json!({
            "code": code,
            "category": slots::category_of(&slot).as_str()
        });
    }

    ok(
        &req.id,
        json!({
            "days": slots::DAYS,
            "columns": slots::GRID_COLUMNS,
            "theoryTimes": slots::THEORY_TIMES,
            "labTimes": slots::LAB_TIMES,
            "rows": grid
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "timetable.addEntry" => Some(handle_timetable_add_entry(state, req)),
        "timetable.list" => Some(handle_timetable_list(state, req)),
        "timetable.today" => Some(handle_timetable_today(state, req)),
        "timetable.grid" => Some(handle_timetable_grid(state, req)),
        _ => None,
    }
}
