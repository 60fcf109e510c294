use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "planner.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subjects(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            code TEXT NOT NULL,
            professor TEXT NOT NULL
        )",
        [],
    )?;

    // Multiple rows per subject are allowed: one subject can meet in
    // several day/slot combinations. Insertion order (rowid) is the
    // rendering order for the weekly grid.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS timetable(
            subject_id TEXT NOT NULL,
            day TEXT NOT NULL,
            slot TEXT NOT NULL,
            FOREIGN KEY(subject_id) REFERENCES subjects(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_timetable_subject ON timetable(subject_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_timetable_day ON timetable(day)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_timetable_subject_day ON timetable(subject_id, day)",
        [],
    )?;

    // One counter row per subject, created zeroed when the subject is
    // added. attended <= total at all times; both only ever grow.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS attendance(
            subject_id TEXT PRIMARY KEY,
            attended INTEGER NOT NULL,
            total INTEGER NOT NULL,
            FOREIGN KEY(subject_id) REFERENCES subjects(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS assignments(
            id TEXT PRIMARY KEY,
            subject_id TEXT NOT NULL,
            title TEXT NOT NULL,
            deadline TEXT NOT NULL,
            FOREIGN KEY(subject_id) REFERENCES subjects(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assignments_subject ON assignments(subject_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assignments_deadline ON assignments(deadline)",
        [],
    )?;

    Ok(conn)
}
