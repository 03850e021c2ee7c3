pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod records;
pub mod services;
pub mod ui;
pub mod utils;

pub use error::{AppError, Result};
pub use fetch::{FetchMode, FetchSelector, FetchState, FollowerProvider};
pub use records::{History, HistoryStore, JsonHistoryStore};
pub use services::FollowerService;
