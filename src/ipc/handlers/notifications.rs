use crate::calc;
use crate::ipc::error::{err, no_workspace, ok};
use crate::ipc::types::{AppState, Request};
use chrono::{Days, NaiveDate};
use rusqlite::Connection;
use serde_json::json;

/// Scans the store for notification-worthy facts and returns them as
/// `{title, body}` events for the shell to deliver. Delivery is
/// best-effort and fire-and-forget on the shell side; this routine
/// re-fires the same events on every run, by design.
pub fn scan_events(
    conn: &Connection,
    today: NaiveDate,
    threshold_pct: f64,
) -> anyhow::Result<Vec<serde_json::Value>> {
    let mut events = Vec::new();

    // Exact equality with today+1: an assignment due today or in two
    // days does not fire.
    let tomorrow = today
        .checked_add_days(Days::new(1))
        .ok_or_else(|| anyhow::anyhow!("date overflow computing tomorrow"))?;
    let mut stmt = conn.prepare(
        "SELECT title FROM assignments WHERE deadline = ? ORDER BY rowid",
    )?;
    let titles = stmt
        .query_map([tomorrow.to_string()], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for title in titles {
        events.push(json!({
            "title": "Assignment Due Tomorrow",
            "body": title
        }));
    }

    let mut stmt = conn.prepare(
        "SELECT s.code, a.attended, a.total
         FROM attendance a
         JOIN subjects s ON s.id = a.subject_id
         WHERE a.total > 0
         ORDER BY s.code",
    )?;
    let counters = stmt
        .query_map([], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, i64>(1)?,
                r.get::<_, i64>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for (code, attended, total) in counters {
        if calc::below_threshold(attended, total, threshold_pct) {
            events.push(json!({
                "title": "Attendance Alert",
                "body": format!("{} below {}%", code, format_pct(threshold_pct))
            }));
        }
    }

    Ok(events)
}

/// "75", not "75.0", for whole thresholds; fractional ones keep their
/// digits ("67.5").
fn format_pct(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("{}", pct as i64)
    } else {
        format!("{}", pct)
    }
}

fn handle_notifications_scan(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let today = match req.params.get("today").and_then(|v| v.as_str()) {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                return err(
                    &req.id,
                    "bad_params",
                    "today must be an ISO date (YYYY-MM-DD)",
                    Some(json!({ "today": raw })),
                );
            }
        },
        None => chrono::Local::now().date_naive(),
    };
    let threshold_pct = req
        .params
        .get("thresholdPct")
        .and_then(|v| v.as_f64())
        .unwrap_or(calc::ATTENDANCE_THRESHOLD_PCT);

    match scan_events(conn, today, threshold_pct) {
        Ok(events) => ok(
            &req.id,
            json!({
                "today": today.to_string(),
                "thresholdPct": threshold_pct,
                "events": events
            }),
        ),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "notifications.scan" => Some(handle_notifications_scan(state, req)),
        _ => None,
    }
}
