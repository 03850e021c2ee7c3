use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDate};
use crossterm::event::KeyCode;
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Borders, Paragraph, Wrap,
    },
};

use crate::error::Result;
use crate::records::{growth_summary, ProfileHistory};
use crate::ui::ChartScreen;

const TIMEFRAMES: &[(&str, Option<i64>)] = &[
    ("ALL", None),
    ("1Y", Some(365)),
    ("3M", Some(91)),
    ("1M", Some(30)),
    ("1W", Some(7)),
];

/// Which slice of a profile's history is on screen.
#[derive(Debug, Default, Clone)]
pub struct ChartState {
    pub timeframe_index: usize,
}

impl ChartState {
    pub fn next_timeframe(&mut self) {
        self.timeframe_index = (self.timeframe_index + 1) % TIMEFRAMES.len();
    }

    pub fn prev_timeframe(&mut self) {
        self.timeframe_index = (self.timeframe_index + TIMEFRAMES.len() - 1) % TIMEFRAMES.len();
    }

    pub fn label(&self) -> &'static str {
        TIMEFRAMES[self.timeframe_index].0
    }

    fn window_days(&self) -> Option<i64> {
        TIMEFRAMES[self.timeframe_index].1
    }
}

/// Samples inside the window ending at the newest sample. Falls back to everything when fewer than two remain.
pub fn filter_history(
    history: &ProfileHistory,
    window_days: Option<i64>,
) -> Vec<(NaiveDate, u64)> {
    let all: Vec<(NaiveDate, u64)> = history.iter().map(|(d, c)| (*d, *c)).collect();
    let (Some(days), Some((latest, _))) = (window_days, all.last().copied()) else {
        return all;
    };

    let cutoff = latest - ChronoDuration::days(days);
    let filtered: Vec<(NaiveDate, u64)> = all
        .iter()
        .copied()
        .filter(|(date, _)| *date >= cutoff)
        .collect();

    if filtered.len() < 2 {
        all
    } else {
        filtered
    }
}

/// Vertical bounds with a little headroom so flat series stay visible.
pub fn y_bounds(points: &[(NaiveDate, u64)]) -> [f64; 2] {
    let min = points.iter().map(|(_, c)| *c).min().unwrap_or(0) as f64;
    let max = points.iter().map(|(_, c)| *c).max().unwrap_or(0) as f64;
    let padding = ((max - min) * 0.05).max(1.0);
    [(min - padding).max(0.0), max + padding]
}

pub fn render_history_chart(
    f: &mut Frame<'_>,
    area: Rect,
    profile: &str,
    history: &ProfileHistory,
    chart: &ChartState,
) {
    let segments = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(area);
    let chart_area = segments[0];
    let help_area = segments[1];

    let points = filter_history(history, chart.window_days());
    let help_text = if points.is_empty() {
        f.render_widget(
            Paragraph::new("No samples recorded for this profile yet.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(profile)),
            chart_area,
        );
        "Press q to quit.".to_string()
    } else {
        let legend = TIMEFRAMES
            .iter()
            .enumerate()
            .map(|(idx, (lbl, _))| {
                if idx == chart.timeframe_index {
                    format!("[{lbl}]")
                } else {
                    lbl.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("  ");

        let x_bounds = [-0.5, (points.len().saturating_sub(1) as f64) + 0.5];
        let series: Vec<(f64, f64)> = points
            .iter()
            .enumerate()
            .map(|(idx, (_, count))| (idx as f64, *count as f64))
            .collect();

        let canvas = Canvas::default()
            .block(Block::default().borders(Borders::ALL).title(format!(
                "{profile} followers | {legend}  (←/→ cycle • q quit)"
            )))
            .marker(Marker::Braille)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds(&points))
            .paint(move |ctx| {
                for pair in series.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: pair[0].0,
                        y1: pair[0].1,
                        x2: pair[1].0,
                        y2: pair[1].1,
                        color: Color::Magenta,
                    });
                }
                ctx.draw(&Points {
                    coords: &series,
                    color: Color::LightMagenta,
                });
            });
        f.render_widget(canvas, chart_area);

        let (first_date, _) = points[0];
        let (last_date, last_count) = points[points.len() - 1];
        let window: ProfileHistory = points.iter().copied().collect();
        let growth = growth_summary(&window, (last_date - first_date).num_days() as u32)
            .map(|summary| summary.describe())
            .unwrap_or_default();
        format!(
            "{} • {} samples {}→{} • latest {} • {}",
            chart.label(),
            points.len(),
            first_date,
            last_date,
            last_count,
            growth
        )
    };

    f.render_widget(
        Paragraph::new(help_text)
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true }),
        help_area,
    );
}

/// Interactive chart of one profile's history. Returns when the user quits.
pub fn run_history_chart(profile: &str, history: &ProfileHistory) -> Result<()> {
    let mut screen = ChartScreen::open()?;
    let mut chart = ChartState::default();

    loop {
        screen.draw(|f| {
            let area = f.size();
            render_history_chart(f, area, profile, history, &chart)
        })?;

        match screen.next_key(Duration::from_millis(250))? {
            Some(KeyCode::Char('q') | KeyCode::Esc) => break,
            Some(KeyCode::Right | KeyCode::Enter) => chart.next_timeframe(),
            Some(KeyCode::Left) => chart.prev_timeframe(),
            _ => {}
        }
    }

    screen.close()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn window_keeps_recent_samples() {
        let history = ProfileHistory::from([
            (day(1), 10),
            (day(20), 20),
            (day(25), 25),
            (day(28), 30),
        ]);

        let week = filter_history(&history, Some(7));
        assert_eq!(week, vec![(day(25), 25), (day(28), 30)]);

        assert_eq!(filter_history(&history, None).len(), 4);
    }

    #[test]
    fn sparse_window_shows_everything() {
        let history = ProfileHistory::from([(day(1), 10), (day(28), 30)]);
        assert_eq!(filter_history(&history, Some(7)).len(), 2);
    }

    #[test]
    fn bounds_pad_flat_series() {
        let bounds = y_bounds(&[(day(1), 100), (day(2), 100)]);
        assert_eq!(bounds, [99.0, 101.0]);
    }

    #[test]
    fn timeframes_cycle_both_ways() {
        let mut chart = ChartState::default();
        chart.prev_timeframe();
        assert_eq!(chart.label(), "1W");
        chart.next_timeframe();
        assert_eq!(chart.label(), "ALL");
    }

    #[test]
    fn renders_into_test_backend() {
        let backend = ratatui::backend::TestBackend::new(60, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        let history = ProfileHistory::from([(day(1), 100), (day(2), 140)]);

        terminal
            .draw(|f| {
                let area = f.size();
                render_history_chart(f, area, "alice", &history, &ChartState::default())
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("alice followers"));
    }
}
