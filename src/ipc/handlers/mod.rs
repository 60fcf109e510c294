pub mod assignments;
pub mod attendance;
pub mod backup_exchange;
pub mod catalogue;
pub mod core;
pub mod notifications;
pub mod subjects;
pub mod timetable;
