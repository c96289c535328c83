use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::{AnsweredQuestion, App};
use crate::score::{KeyValueStore, SessionOutcome};
use crate::timer::Timer;

use super::Theme;

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render<T: Timer, S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<T, S>, theme: Theme) {
    let Some(outcome) = app.outcome() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[1], outcome, app.best_score(), theme);
    render_question_breakdown(frame, chunks[2], app.history(), app.result_scroll(), theme);
    render_controls(frame, chunks[3], theme);
}

fn get_grade_color(percentage: u8) -> Color {
    match percentage {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(
    frame: &mut Frame,
    area: Rect,
    outcome: &SessionOutcome,
    best: Option<u8>,
    theme: Theme,
) {
    let grade_color = get_grade_color(outcome.percentage);

    let banner = if outcome.is_new_record {
        Line::from(Span::styled(
            "★ New High Score! ★",
            Style::default().fg(theme.warning()).bold(),
        ))
    } else if outcome.should_celebrate() {
        Line::from(Span::styled(
            "★ Great job! ★",
            Style::default().fg(theme.correct()).bold(),
        ))
    } else {
        Line::from("")
    };

    let best_line = match best {
        Some(best) => Line::from(format!("Best score: {}%", best).fg(theme.muted())),
        None => Line::from(""),
    };

    let content = vec![
        Line::from(Span::styled(
            "QUIZ COMPLETE",
            Style::default().fg(theme.accent()).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} / {}  ({}%)",
                outcome.score, outcome.total, outcome.percentage
            ),
            Style::default().fg(grade_color).bold(),
        )),
        Line::from(""),
        banner,
        best_line,
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(theme.muted()),
    );
    frame.render_widget(widget, area);
}

fn render_question_breakdown(
    frame: &mut Frame,
    area: Rect,
    history: &[AnsweredQuestion],
    scroll: usize,
    theme: Theme,
) {
    if history.is_empty() {
        let widget = Paragraph::new("No questions matched this category and difficulty.")
            .alignment(Alignment::Center)
            .fg(theme.muted());
        frame.render_widget(widget, area);
        return;
    }

    let lines: Vec<Line> = history
        .iter()
        .enumerate()
        .map(|(index, answered)| {
            let (symbol, color) = if answered.is_correct {
                ("+", theme.correct())
            } else if answered.timed_out {
                ("⏱", theme.warning())
            } else {
                ("-", theme.wrong())
            };

            Line::from(vec![
                Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
                Span::styled(
                    format!("{:2}. ", index + 1),
                    Style::default().fg(theme.muted()),
                ),
                Span::styled(truncate_question(&answered.prompt), Style::default().fg(theme.text())),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn render_controls(frame: &mut Frame, area: Rect, theme: Theme) {
    let widget = Paragraph::new("j/k scroll  ·  r restart  ·  s setup  ·  q quit")
        .alignment(Alignment::Center)
        .fg(theme.muted());
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_question() {
        assert_eq!(truncate_question("short"), "short");
        let long = "x".repeat(60);
        let truncated = truncate_question(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), QUESTION_PREVIEW_LENGTH + 3);
    }

    #[test]
    fn test_grade_color() {
        assert_eq!(get_grade_color(100), Color::Green);
        assert_eq!(get_grade_color(75), Color::Cyan);
        assert_eq!(get_grade_color(50), Color::Yellow);
        assert_eq!(get_grade_color(0), Color::Red);
    }
}
