pub mod profile;
pub mod time;

pub use profile::ProfileRef;
pub use time::{current_human_timestamp, today};
