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

#[test]
fn add_subject_then_list_yields_exactly_one_matching_tuple() {
    let workspace = temp_dir("plannerd-roundtrip");
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
    let subject_id = added
        .get("subjectId")
        .and_then(|v| v.as_str())
        .expect("subjectId")
        .to_string();

    let listed = request_ok(&mut stdin, &mut reader, "3", "timetable.list", json!({}));
    let entries = listed
        .get("entries")
        .and_then(|v| v.as_array())
        .expect("entries");
    let matching: Vec<_> = entries
        .iter()
        .filter(|e| {
            e.get("code").and_then(|v| v.as_str()) == Some("CS101")
                && e.get("day").and_then(|v| v.as_str()) == Some("MON")
                && e.get("slot").and_then(|v| v.as_str()) == Some("A1")
        })
        .collect();
    assert_eq!(matching.len(), 1, "expected exactly one tuple: {:?}", entries);

    let subjects = request_ok(&mut stdin, &mut reader, "4", "subjects.list", json!({}));
    let rows = subjects
        .get("subjects")
        .and_then(|v| v.as_array())
        .expect("subjects");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("id").and_then(|v| v.as_str()), Some(subject_id.as_str()));
    assert_eq!(rows[0].get("code").and_then(|v| v.as_str()), Some("CS101"));
}

#[test]
fn today_listing_filters_by_day() {
    let workspace = temp_dir("plannerd-today");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "subjects.add",
        json!({
            "name": "Operating Systems",
            "code": "CS220",
            "professor": "Dr. Iyer",
            "day": "WED",
            "slot": "F1"
        }),
    );

    let wed = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "timetable.today",
        json!({ "day": "WED" }),
    );
    let classes = wed
        .get("classes")
        .and_then(|v| v.as_array())
        .expect("classes");
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].get("code").and_then(|v| v.as_str()), Some("CS220"));
    assert_eq!(classes[0].get("slot").and_then(|v| v.as_str()), Some("F1"));

    let tue = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "timetable.today",
        json!({ "day": "TUE" }),
    );
    assert_eq!(
        tue.get("classes").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(0)
    );
}

#[test]
fn catalogue_exposes_constrained_inputs() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let cat = request_ok(&mut stdin, &mut reader, "1", "catalogue.get", json!({}));
    let days = cat.get("days").and_then(|v| v.as_array()).expect("days");
    assert_eq!(days.len(), 5);
    assert_eq!(days[0].as_str(), Some("MON"));
    assert_eq!(days[4].as_str(), Some("FRI"));

    let slots = cat.get("slots").and_then(|v| v.as_array()).expect("slots");
    assert_eq!(slots.len(), 83, "23 named slots plus L1..L60");
    let has = |name: &str| slots.iter().any(|s| s.as_str() == Some(name));
    assert!(has("A1") && has("TG2") && has("V7") && has("L1") && has("L60"));
    assert!(!has("SAT") && !has("L61"));

    assert_eq!(cat.get("gridColumns").and_then(|v| v.as_u64()), Some(12));
    let theory = cat
        .get("theoryTimes")
        .and_then(|v| v.as_array())
        .expect("theoryTimes");
    assert_eq!(theory.len(), 12);
    assert!(theory.iter().any(|t| t.as_str() == Some("LUNCH")));
    let lab = cat
        .get("labTimes")
        .and_then(|v| v.as_array())
        .expect("labTimes");
    assert_eq!(lab.len(), 13);
}
