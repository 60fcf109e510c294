/// Attendance below this percentage puts a subject at risk.
pub const ATTENDANCE_THRESHOLD_PCT: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Danger,
    Success,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Danger => "danger",
            AttendanceStatus::Success => "success",
        }
    }
}

pub fn attendance_percent(attended: i64, total: i64) -> f64 {
    if total > 0 {
        100.0 * attended as f64 / total as f64
    } else {
        0.0
    }
}

/// Strict "< 75" cutoff: exactly 75.0 is not flagged.
pub fn classify(percent: f64) -> AttendanceStatus {
    if percent < ATTENDANCE_THRESHOLD_PCT {
        AttendanceStatus::Danger
    } else {
        AttendanceStatus::Success
    }
}

pub fn below_threshold(attended: i64, total: i64, threshold_pct: f64) -> bool {
    total > 0 && attendance_percent(attended, total) < threshold_pct
}
