pub mod assign;
pub mod audit;
pub mod auth;
pub mod availability;
pub mod backup;
pub mod calendar;
pub mod dashboard;
pub mod import;
pub mod log;
pub mod password;
pub mod personnel;
pub mod projects;
pub mod users;
