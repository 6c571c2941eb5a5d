pub mod job;
pub mod record;
pub mod submission;
