pub mod charting;
pub mod view;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthChar;

use crate::countdown::CountdownTick;
use crate::render::SessionResults;
use crate::session::CharOutcome;

pub use view::{ViewModel, ViewRenderer};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &ViewModel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.results {
            Some(results) => render_results(self, results, area, buf),
            None => render_typing(self, area, buf),
        }
    }
}

fn passage_width(passage: &[char]) -> usize {
    passage.iter().map(|c| c.width().unwrap_or(0)).sum()
}

fn render_typing(model: &ViewModel, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2 + 2).max(1);
    let width = passage_width(&model.passage);
    let prompt_lines = if width <= max_chars_per_line as usize {
        1
    } else {
        ((width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),                // hud
            Constraint::Length(1),                // countdown / advisory
            Constraint::Min(0),                   // spacer
            Constraint::Length(prompt_lines + 2), // passage
            Constraint::Min(0),                   // spacer
            Constraint::Length(1),                // legend
        ])
        .split(area);

    let hud = Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {}s   {}%",
            model.hud.wpm, model.hud.accuracy, model.hud.elapsed_secs, model.progress_percent
        ),
        dim_bold_style,
    ))
    .alignment(Alignment::Center);
    hud.render(chunks[0], buf);

    let banner = match (&model.countdown, &model.advisory) {
        (Some(tick), _) => Some(Span::styled(
            match tick {
                CountdownTick::Count(n) => format!("starting in {n}"),
                CountdownTick::Go => tick.to_string(),
            },
            Style::default().patch(bold_style).fg(Color::Yellow),
        )),
        (None, Some(message)) => Some(Span::styled(
            message.clone(),
            Style::default().fg(Color::Yellow).patch(italic_style),
        )),
        (None, None) => input_notice(model).map(|notice| {
            Span::styled(notice, Style::default().add_modifier(Modifier::DIM).patch(italic_style))
        }),
    };
    if let Some(span) = banner {
        Paragraph::new(span)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    }

    let spans = model
        .passage
        .iter()
        .zip(model.outcomes.iter())
        .enumerate()
        .map(|(idx, (expected, outcome))| match outcome {
            CharOutcome::Incorrect => Span::styled(
                match expected {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red_bold_style,
            ),
            CharOutcome::Correct => Span::styled(expected.to_string(), green_bold_style),
            CharOutcome::Untouched if idx == model.cursor => {
                Span::styled(expected.to_string(), underlined_dim_bold_style)
            }
            CharOutcome::Untouched => Span::styled(expected.to_string(), dim_bold_style),
        })
        .collect::<Vec<Span>>();

    let border_style = if model.error_pulse {
        Style::default().fg(Color::Red)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };
    let passage = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .alignment(if prompt_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    passage.render(chunks[3], buf);

    let legend = Paragraph::new(Span::styled(legend_text(model), italic_style));
    legend.render(chunks[5], buf);
}

/// Says why keystrokes are being ignored, if they are.
fn input_notice(model: &ViewModel) -> Option<&'static str> {
    if model.human_input {
        None
    } else if model.bot_running {
        Some("bot is typing, (tab) to take over")
    } else {
        Some("input paused, (enter) for a new test")
    }
}

fn legend_text(model: &ViewModel) -> String {
    format!(
        "(enter) new / (tab) bot {} / (ctrl+b) backspace {} / (esc)ape",
        if model.bot_running { "off" } else { "on" },
        if model.allow_backspace { "off" } else { "on" },
    )
}

fn render_results(model: &ViewModel, results: &SessionResults, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // headline stats
            Constraint::Length(1), // counts
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let (overall_duration, highest_wpm) =
        charting::compute_chart_params(&results.wpm_samples, results.elapsed_seconds);
    let points: Vec<(f64, f64)> = results.wpm_samples.iter().map(|&s| s.into()).collect();
    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&points)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(overall_duration), bold_style),
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
        );
    chart.render(chunks[0], buf);

    let stats = Paragraph::new(Span::styled(
        format!(
            "{} wpm   {} raw   {}% acc   {:.2}s   {:.2} sd",
            results.net_wpm,
            results.gross_wpm,
            results.accuracy_percent,
            results.elapsed_seconds,
            results.consistency
        ),
        bold_style,
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[1], buf);

    let counts = Paragraph::new(Span::styled(
        format!(
            "{} typed   {} correct   {} mistakes",
            results.typed_count, results.correct_count, results.mistake_count
        ),
        Style::default().fg(Color::Cyan).patch(italic_style),
    ))
    .alignment(Alignment::Center);
    counts.render(chunks[2], buf);

    let legend = Paragraph::new(Span::styled(legend_text(model), italic_style));
    legend.render(chunks[4], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::WpmSample;

    fn rendered(model: &ViewModel, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        model.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    fn typing_model(passage: &str) -> ViewModel {
        let passage: Vec<char> = passage.chars().collect();
        ViewModel {
            outcomes: vec![CharOutcome::Untouched; passage.len()],
            passage,
            allow_backspace: true,
            human_input: true,
            ..ViewModel::default()
        }
    }

    #[test]
    fn test_typing_view_shows_passage() {
        let model = typing_model("hello world");
        let out = rendered(&model, Rect::new(0, 0, 80, 24));

        assert!(out.contains("hello world"));
        assert!(out.contains("0 wpm"));
    }

    #[test]
    fn test_incorrect_space_is_visible() {
        let mut model = typing_model("a b");
        model.outcomes = vec![
            CharOutcome::Correct,
            CharOutcome::Incorrect,
            CharOutcome::Untouched,
        ];
        model.cursor = 2;

        let out = rendered(&model, Rect::new(0, 0, 80, 24));
        assert!(out.contains("a·b"));
    }

    #[test]
    fn test_countdown_banner() {
        let mut model = typing_model("abc");
        model.countdown = Some(CountdownTick::Count(3));
        assert!(rendered(&model, Rect::new(0, 0, 80, 24)).contains("starting in 3"));

        model.countdown = Some(CountdownTick::Go);
        assert!(rendered(&model, Rect::new(0, 0, 80, 24)).contains("Go!"));
    }

    #[test]
    fn test_advisory_banner() {
        let mut model = typing_model("abc");
        model.advisory = Some("using default".to_string());
        assert!(rendered(&model, Rect::new(0, 0, 80, 24)).contains("using default"));
    }

    #[test]
    fn test_results_view() {
        let mut model = typing_model("test");
        model.results = Some(SessionResults {
            net_wpm: 42,
            gross_wpm: 45,
            accuracy_percent: 95,
            elapsed_seconds: 3.5,
            typed_count: 20,
            correct_count: 19,
            mistake_count: 1,
            consistency: 2.5,
            wpm_samples: vec![
                WpmSample::new(1.0, 20),
                WpmSample::new(2.0, 35),
                WpmSample::new(3.0, 42),
            ],
        });

        let out = rendered(&model, Rect::new(0, 0, 100, 24));
        assert!(out.contains("42 wpm"));
        assert!(out.contains("95% acc"));
        assert!(out.contains("1 mistakes"));
    }

    #[test]
    fn test_small_area_does_not_panic() {
        let model = typing_model("a much longer passage than fits in this tiny area");
        let area = Rect::new(0, 0, 12, 5);
        let mut buffer = Buffer::empty(area);
        (&model).render(area, &mut buffer);
        assert_eq!(*buffer.area(), area);
    }

    #[test]
    fn test_paused_input_is_shown() {
        let mut model = typing_model("abc");
        let area = Rect::new(0, 0, 80, 24);
        assert!(!rendered(&model, area).contains("input paused"));

        model.human_input = false;
        assert!(rendered(&model, area).contains("input paused"));

        model.bot_running = true;
        assert!(rendered(&model, area).contains("bot is typing"));

        // the countdown banner wins while it runs
        model.bot_running = false;
        model.countdown = Some(CountdownTick::Count(2));
        let out = rendered(&model, area);
        assert!(out.contains("starting in 2"));
        assert!(!out.contains("input paused"));
    }

    #[test]
    fn test_legend_reflects_status() {
        let mut model = typing_model("abc");
        assert!(legend_text(&model).contains("bot on"));
        assert!(legend_text(&model).contains("backspace off"));

        model.bot_running = true;
        model.allow_backspace = false;
        assert!(legend_text(&model).contains("bot off"));
        assert!(legend_text(&model).contains("backspace on"));
    }
}
