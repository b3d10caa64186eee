pub mod analytics;
pub mod notifications;
pub mod phases;
pub mod points;
