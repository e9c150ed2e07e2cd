pub mod audit;
pub mod auth;
pub mod backup_exchange;
pub mod classroom;
pub mod core;
pub mod fees;
pub mod schedules;
pub mod security;
pub mod students;
pub mod syllabus;
pub mod views;
