//! CLI command implementations

pub mod checkin;
pub mod init;
pub mod record;
pub mod report;
pub mod show;
