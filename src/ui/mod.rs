pub mod chat;
pub mod dashboard;
pub mod strategy;
pub mod vision;
