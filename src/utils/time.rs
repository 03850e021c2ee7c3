use chrono::{Local, NaiveDate};

/// Calendar day used as the history key for samples taken now.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn current_human_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M").to_string()
}
