pub mod chart;
pub mod terminal;

pub use chart::{run_history_chart, ChartState};
pub use terminal::ChartScreen;
