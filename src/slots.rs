use std::fmt;

/// The five teaching days. No weekend classes are modeled; weekday six
/// and seven simply have no entry here.
pub const DAYS: [&str; 5] = ["MON", "TUE", "WED", "THU", "FRI"];

pub const GRID_COLUMNS: usize = 12;

/// Display labels for the theory row of the grid header. One column is a
/// LUNCH placeholder that never carries a class. Display metadata only;
/// column computation never reads these.
pub const THEORY_TIMES: [&str; 12] = [
    "08:00–08:50",
    "09:00–09:50",
    "10:00–10:50",
    "11:00–11:50",
    "12:00–12:50",
    "LUNCH",
    "14:00–14:50",
    "15:00–15:50",
    "16:00–16:50",
    "17:00–17:50",
    "18:00–18:50",
    "19:00–19:50",
];

/// Lab row header labels. The institutional lab row carries thirteen
/// labels (the source timetable prints one extra), also display-only.
pub const LAB_TIMES: [&str; 13] = [
    "08:00–08:50",
    "08:51–09:40",
    "09:51–10:40",
    "10:41–11:30",
    "11:40–12:30",
    "12:31–13:20",
    "LUNCH",
    "14:00–14:50",
    "14:51–15:40",
    "15:51–16:40",
    "16:41–17:30",
    "17:40–18:30",
    "18:31–19:20",
];

const NAMED_SLOTS: [&str; 23] = [
    "A1", "A2", "B1", "B2", "C1", "C2", "D1", "D2", "E1", "F1", "F2", "G1", "TB1", "TB2", "TG1",
    "TG2", "V1", "V2", "V3", "V4", "V5", "V6", "V7",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSlot(pub String);

impl fmt::Display for UnknownSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown slot: {}", self.0)
    }
}

impl std::error::Error for UnknownSlot {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotCategory {
    Theory,
    Lab,
}

impl SlotCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            SlotCategory::Theory => "theory",
            SlotCategory::Lab => "lab",
        }
    }
}

/// Grid column for a slot name. Named theory/elective slots use the fixed
/// institutional mapping; lab slots L1..L60 wrap cyclically across the
/// twelve columns.
pub fn column_of(slot: &str) -> Result<usize, UnknownSlot> {
    let col = match slot {
        "A1" | "B1" | "C1" | "D1" | "E1" => 0,
        "F1" | "G1" => 1,
        "TB1" => 3,
        "TG1" => 4,
        "A2" | "B2" | "C2" | "D2" => 6,
        "F2" => 7,
        "TB2" => 9,
        "TG2" => 10,
        "V1" | "V2" | "V3" | "V4" | "V5" | "V6" | "V7" => 11,
        other => {
            return lab_column(other).ok_or_else(|| UnknownSlot(slot.to_string()));
        }
    };
    Ok(col)
}

fn lab_column(slot: &str) -> Option<usize> {
    let digits = slot.strip_prefix('L')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u32 = digits.parse().ok()?;
    if !(1..=60).contains(&n) {
        return None;
    }
    Some(((n - 1) % GRID_COLUMNS as u32) as usize)
}

pub fn category_of(slot: &str) -> SlotCategory {
    if slot.starts_with('L') {
        SlotCategory::Lab
    } else {
        SlotCategory::Theory
    }
}

/// Full catalogue, lexicographically sorted, for constrained choice
/// inputs in the shell.
pub fn all_slots() -> Vec<String> {
    let mut slots: Vec<String> = NAMED_SLOTS.iter().map(|s| s.to_string()).collect();
    slots.extend((1..=60).map(|n| format!("L{}", n)));
    slots.sort();
    slots
}

pub fn is_valid_day(day: &str) -> bool {
    DAYS.contains(&day)
}

pub fn day_index(day: &str) -> Option<usize> {
    DAYS.iter().position(|d| *d == day)
}

/// Today's day code, or None on weekends.
pub fn local_day(date: chrono::NaiveDate) -> Option<&'static str> {
    use chrono::Datelike;
    DAYS.get(date.weekday().num_days_from_monday() as usize)
        .copied()
}
