pub mod follower;
pub mod watch;

pub use follower::{FollowerReading, FollowerService};
pub use watch::{poll_profiles, watch_profiles};
