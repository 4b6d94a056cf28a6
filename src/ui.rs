pub mod charting;
pub mod screen;

use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, BarChart, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthChar;
use wpmtrack::{keymap::Symbol, time_series::timeline, ActivityState};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

/// Keep the tail of `text` that fits in `width` columns
fn tail_fitting(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut kept: Vec<char> = Vec::new();
    for c in text.chars().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        kept.push(c);
    }
    kept.into_iter().rev().collect()
}

fn describe_key(symbol: Option<Symbol>) -> String {
    match symbol {
        None => "No key yet".to_string(),
        Some(Symbol::Space) => "space".to_string(),
        Some(Symbol::Newline) => "return".to_string(),
        Some(Symbol::Char(c)) => c.to_uppercase().to_string(),
    }
}

/// Live view: current rate, activity state and timers
pub fn render_live(app: &App, area: Rect, buf: &mut Buffer) {
    let tracker = &app.tracker;
    let now = Local::now();

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // padding
            Constraint::Length(1), // rate
            Constraint::Length(1), // state
            Constraint::Length(1), // timers
            Constraint::Length(1), // last key
            Constraint::Length(1), // padding
            Constraint::Length(3), // typed preview
            Constraint::Min(1),    // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let rate_style = match tracker.state() {
        ActivityState::Active => bold_style.fg(Color::Green),
        ActivityState::Paused => bold_style.add_modifier(Modifier::DIM),
    };
    Paragraph::new(Span::styled(
        format!("{} WPM", tracker.current_rate()),
        rate_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let state_line = match tracker.state() {
        ActivityState::Active => Span::styled("TRACKING", bold_style.fg(Color::Magenta)),
        ActivityState::Paused => Span::styled(
            "PAUSED - start typing to resume",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ),
    };
    Paragraph::new(state_line)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let elapsed = tracker.elapsed_display(now);
    let elapsed_style = if tracker.input_error().is_some() {
        bold_style.fg(Color::Red)
    } else {
        bold_style
    };
    Paragraph::new(Line::from(vec![
        Span::styled(elapsed, elapsed_style),
        Span::styled("   next sample in ", dim_style),
        Span::styled(tracker.countdown_display(now), bold_style),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        format!("last key: {}", describe_key(tracker.last_key())),
        dim_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    let preview_width = chunks[6].width.saturating_sub(2) as usize;
    let preview = tail_fitting(&tracker.typed_display().replace('\n', "⏎"), preview_width);
    Paragraph::new(Span::styled(preview, italic_style))
        .block(Block::default().borders(Borders::ALL).title("typed"))
        .render(chunks[6], buf);

    Paragraph::new(Span::styled(
        "(tab) history / (ctrl-p) pause / (esc) quit",
        italic_style,
    ))
    .render(chunks[8], buf);
}

/// History view: summary figures, WPM histogram and rate over time
pub fn render_history(app: &App, area: Rect, buf: &mut Buffer) {
    let history = &app.history;
    let stats = &history.stats;

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),      // summary
            Constraint::Length(1),      // filters
            Constraint::Percentage(45), // histogram
            Constraint::Min(3),         // chart
            Constraint::Length(1),      // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        format!(
            "max {}   min {}   avg {:.2}   median {:.2}   sd {:.2}   ({} samples)",
            stats.max, stats.min, stats.mean, stats.median, stats.std_dev, stats.count
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let range = history
        .filter
        .range
        .map_or_else(|| "any".to_string(), |r| r.to_string());
    Paragraph::new(Span::styled(
        format!(
            "time frame: {}   range: {}   range avg {:.2}",
            history.filter.time_frame, range, stats.range_mean
        ),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let labels: Vec<String> = stats.histogram.iter().map(|b| b.bin.label()).collect();
    let bars: Vec<(&str, u64)> = labels
        .iter()
        .zip(&stats.histogram)
        .map(|(label, b)| (label.as_str(), b.count as u64))
        .collect();
    let bar_width = if bars.is_empty() {
        1
    } else {
        (chunks[2].width / bars.len() as u16).saturating_sub(1).clamp(1, 9)
    };
    BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("wpm distribution"))
        .data(bars.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(magenta_style)
        .value_style(bold_style.fg(Color::Black).bg(Color::Magenta))
        .render(chunks[2], buf);

    let points = timeline(&history.samples);
    let (overall_duration, highest_wpm) = charting::compute_chart_params(&points);
    let (unit, divisor) = charting::time_unit(overall_duration);
    let tuples: Vec<(f64, f64)> = points.iter().map(|p| (p.t / divisor, p.wpm)).collect();
    let x_max = overall_duration / divisor;

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&tuples)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(unit)
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(x_max), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_wpm), bold_style),
                ]),
        )
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        "(f) time frame / (r) range / (tab) live / (esc) quit",
        italic_style,
    ))
    .wrap(Wrap { trim: true })
    .render(chunks[4], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{App, AppScreen};
    use wpmtrack::{config::Config, store::SqliteStore, Sample, SampleStore, Tracker};

    fn create_test_app(samples: &[u32]) -> App {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let now = Local::now();
        for (i, w) in samples.iter().enumerate() {
            let at = now - chrono::Duration::seconds(10 * (samples.len() - i) as i64);
            store.append(&Sample::new(at, *w, "defaultUser")).unwrap();
        }
        let mut app = App::new(Tracker::new(&Config::default(), store));
        app.refresh_history();
        app
    }

    fn render_to_string(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        match app.screen {
            AppScreen::Live => render_live(app, area, &mut buffer),
            AppScreen::History => render_history(app, area, &mut buffer),
        }
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_live_view_paused() {
        let app = create_test_app(&[]);
        let rendered = render_to_string(&app, 80, 24);
        assert!(rendered.contains("0 WPM"));
        assert!(rendered.contains("PAUSED"));
        assert!(rendered.contains("No key yet"));
    }

    #[test]
    fn test_live_view_tracking() {
        let mut app = create_test_app(&[]);
        let now = Local::now();
        for c in "hi there ".chars() {
            let code = wpmtrack::keymap::usage_from_key_code(crossterm::event::KeyCode::Char(c))
                .unwrap();
            app.tracker.ingest(code, now);
        }
        app.tracker.tick(now);
        let rendered = render_to_string(&app, 80, 24);
        assert!(rendered.contains("12 WPM"));
        assert!(rendered.contains("TRACKING"));
        assert!(rendered.contains("hi there"));
        assert!(rendered.contains("space"));
    }

    #[test]
    fn test_live_view_input_error() {
        let mut app = create_test_app(&[]);
        app.tracker
            .report_input_unavailable("terminal closed", Local::now());
        let rendered = render_to_string(&app, 80, 24);
        assert!(rendered.contains("Error: terminal closed"));
    }

    #[test]
    fn test_history_view() {
        let mut app = create_test_app(&[10, 20, 30, 40]);
        app.screen = AppScreen::History;
        let rendered = render_to_string(&app, 120, 40);
        assert!(rendered.contains("max 40"));
        assert!(rendered.contains("median 25.00"));
        assert!(rendered.contains("All Time"));
        assert!(rendered.contains("range avg 25.00"));
    }

    #[test]
    fn test_history_headline_ignores_range() {
        let mut app = create_test_app(&[0, 40, 80, 150]);
        app.screen = AppScreen::History;
        app.history.filter.range = Some(wpmtrack::report::WpmRange::OneTo100);
        app.refresh_history();
        let rendered = render_to_string(&app, 120, 40);
        assert!(rendered.contains("max 150"));
        assert!(rendered.contains("min 0"));
        assert!(rendered.contains("range avg 60.00"));
    }

    #[test]
    fn test_history_view_empty_and_tiny() {
        let mut app = create_test_app(&[]);
        app.screen = AppScreen::History;
        for (w, h) in [(120, 40), (20, 8), (1, 1)] {
            let _ = render_to_string(&app, w, h);
        }
    }

    #[test]
    fn test_tail_fitting() {
        assert_eq!(tail_fitting("hello world", 5), "world");
        assert_eq!(tail_fitting("abc", 10), "abc");
        assert_eq!(tail_fitting("abc", 0), "");
    }

    #[test]
    fn test_describe_key() {
        assert_eq!(describe_key(None), "No key yet");
        assert_eq!(describe_key(Some(Symbol::Char('q'))), "Q");
        assert_eq!(describe_key(Some(Symbol::Newline)), "return");
    }
}
