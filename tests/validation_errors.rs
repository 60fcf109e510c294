use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_plannerd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn plannerd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn request_err_code(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .expect("error code")
        .to_string()
}

#[test]
fn blank_fields_abort_subject_add_with_no_partial_write() {
    let workspace = temp_dir("plannerd-val-blank");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "2",
        "subjects.add",
        json!({
            "name": "Data Structures",
            "code": "CS101",
            "professor": "   ",
            "day": "MON",
            "slot": "A1"
        }),
    );
    assert_eq!(code, "validation_failed");

    let listed = request_ok(&mut stdin, &mut reader, "3", "timetable.list", json!({}));
    assert_eq!(
        listed
            .get("entries")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(0),
        "failed add must leave the store unchanged"
    );
    let subjects = request_ok(&mut stdin, &mut reader, "4", "subjects.list", json!({}));
    assert_eq!(
        subjects
            .get("subjects")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(0)
    );
}

#[test]
fn day_outside_the_enum_is_rejected() {
    let workspace = temp_dir("plannerd-val-day");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "2",
        "subjects.add",
        json!({
            "name": "Weekend Yoga",
            "code": "YG100",
            "professor": "Prof. Roy",
            "day": "SAT",
            "slot": "A1"
        }),
    );
    assert_eq!(code, "bad_params");
}

#[test]
fn slot_outside_the_catalogue_is_rejected() {
    let workspace = temp_dir("plannerd-val-slot");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    for (id, slot) in [("2", "Z9"), ("3", "L0"), ("4", "L61")] {
        let code = request_err_code(
            &mut stdin,
            &mut reader,
            id,
            "subjects.add",
            json!({
                "name": "Phantom Class",
                "code": "XX000",
                "professor": "Prof. Roy",
                "day": "MON",
                "slot": slot
            }),
        );
        assert_eq!(code, "unknown_slot", "slot {:?}", slot);
    }
}

#[test]
fn malformed_deadline_is_rejected() {
    let workspace = temp_dir("plannerd-val-deadline");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let added = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "subjects.add",
        json!({
            "name": "Data Structures",
            "code": "CS101",
            "professor": "Dr. Rao",
            "day": "MON",
            "slot": "A1"
        }),
    );
    let sid = added.get("subjectId").and_then(|v| v.as_str()).unwrap();

    for (id, bad) in [("3", "11-03-2026"), ("4", "2026/03/11"), ("5", "soon")] {
        let code = request_err_code(
            &mut stdin,
            &mut reader,
            id,
            "assignments.add",
            json!({ "subjectId": sid, "title": "Essay", "deadline": bad }),
        );
        assert_eq!(code, "validation_failed", "deadline {:?}", bad);
    }

    let listed = request_ok(&mut stdin, &mut reader, "6", "assignments.list", json!({}));
    assert_eq!(
        listed
            .get("assignments")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(0)
    );
}

#[test]
fn operations_require_a_workspace() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    for (id, method, params) in [
        (
            "1",
            "subjects.add",
            json!({ "name": "n", "code": "c", "professor": "p", "day": "MON", "slot": "A1" }),
        ),
        (
            "2",
            "attendance.mark",
            json!({ "subjectId": "x", "day": "MON", "present": true }),
        ),
        ("3", "timetable.grid", json!({})),
        ("4", "notifications.scan", json!({})),
    ] {
        let code = request_err_code(&mut stdin, &mut reader, id, method, params);
        assert_eq!(code, "no_workspace", "method {}", method);
    }
}

#[test]
fn unknown_methods_report_not_implemented() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let code = request_err_code(&mut stdin, &mut reader, "1", "subjects.remove", json!({}));
    assert_eq!(code, "not_implemented");
}

#[test]
fn assignment_for_unknown_subject_is_not_found() {
    let workspace = temp_dir("plannerd-val-assignment-subject");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "2",
        "assignments.add",
        json!({ "subjectId": "no-such-id", "title": "Essay", "deadline": "2026-04-02" }),
    );
    assert_eq!(code, "not_found");

    let listed = request_ok(&mut stdin, &mut reader, "3", "assignments.list", json!({}));
    assert_eq!(
        listed
            .get("assignments")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(0)
    );
}

#[test]
fn add_entry_for_unknown_subject_is_not_found() {
    let workspace = temp_dir("plannerd-val-entry");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "2",
        "timetable.addEntry",
        json!({ "subjectId": "no-such-id", "day": "MON", "slot": "A1" }),
    );
    assert_eq!(code, "not_found");
}
