pub mod analytics;
pub mod daily_logs;
pub mod exercise_logs;
pub mod health;
pub mod phases;
pub mod points;
pub mod profile;
