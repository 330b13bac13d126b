pub mod attendees;
pub mod civic;
pub mod clean;
pub mod config;
pub mod letters;
pub mod registration;
