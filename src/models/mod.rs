pub mod assignment;
pub mod audit;
pub mod date_range;
pub mod person;
pub mod project;
pub mod role;
pub mod user;
