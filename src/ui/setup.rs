use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::models::Difficulty;
use crate::score::KeyValueStore;
use crate::timer::Timer;

use super::Theme;

pub fn render<T: Timer, S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<T, S>, theme: Theme) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(17),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "QUIZ",
            Style::default().fg(theme.accent()).bold(),
        )),
        Line::from(""),
        category_line(app, theme),
        Line::from(""),
    ];

    for difficulty in Difficulty::ALL {
        content.push(difficulty_line(difficulty, app.selected_difficulty(), theme));
    }

    content.push(Line::from(""));
    content.push(Line::from(summary(app).fg(theme.muted())));
    if let Some(best) = app.best_score() {
        content.push(Line::from(
            format!("Best score: {}%", best).fg(theme.warning()),
        ));
    } else {
        content.push(Line::from(""));
    }
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "ENTER",
        Style::default().fg(theme.correct()).bold(),
    )));
    content.push(Line::from("to start".fg(theme.muted())));

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.muted()),
    );
    frame.render_widget(widget, chunks[1]);

    render_controls(frame, chunks[3], theme);
}

fn category_line<T: Timer, S: KeyValueStore>(app: &App<T, S>, theme: Theme) -> Line<'static> {
    let name = app
        .selected_category()
        .map(str::to_uppercase)
        .unwrap_or_else(|| "NO QUESTIONS LOADED".to_string());

    Line::from(vec![
        Span::styled("◀  ", Style::default().fg(theme.muted())),
        Span::styled(name, Style::default().fg(theme.text()).bold()),
        Span::styled("  ▶", Style::default().fg(theme.muted())),
    ])
}

fn difficulty_line(difficulty: Difficulty, selected: Difficulty, theme: Theme) -> Line<'static> {
    let is_selected = difficulty == selected;
    let style = if is_selected {
        Style::default().fg(theme.accent()).bold()
    } else {
        Style::default().fg(theme.muted())
    };
    let marker = if is_selected { ">" } else { " " };

    Line::from(vec![
        Span::styled(format!("{} ", marker), style),
        Span::styled(
            format!("{:<12} up to {:>2}", difficulty.as_str(), difficulty.question_cap()),
            style,
        ),
    ])
}

fn summary<T: Timer, S: KeyValueStore>(app: &App<T, S>) -> String {
    let count = app.selection_size();
    let timer = app.timer_config();
    if timer.enabled {
        format!("{} questions · {}s each", count, timer.duration_secs)
    } else {
        format!("{} questions · no time limit", count)
    }
}

fn render_controls(frame: &mut Frame, area: Rect, theme: Theme) {
    let widget = Paragraph::new("h/l category  ·  j/k difficulty  ·  t theme  ·  q quit")
        .alignment(Alignment::Center)
        .fg(theme.muted());
    frame.render_widget(widget, area);
}
