use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};

use crate::app::{App, Feedback};
use crate::models::Answer;
use crate::score::KeyValueStore;
use crate::session::{AnswerOutcome, Phase, SessionState};
use crate::timer::Timer;

use super::Theme;

pub fn render<T: Timer, S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<T, S>, theme: Theme) {
    let Some(session) = app.session() else {
        return;
    };
    let Some(question) = session.current_question() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1), // Progress text + timer
        Constraint::Length(1), // Progress bar
        Constraint::Length(4), // Question text
        Constraint::Fill(1),   // Answers
        Constraint::Length(5), // Feedback
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    render_status(frame, chunks[0], app, session, theme);
    render_progress_bar(frame, chunks[1], session, theme);
    render_question_text(frame, chunks[2], &question.prompt, theme);
    render_answers(
        frame,
        chunks[3],
        session.answers(),
        app.selected_option(),
        session.last_outcome(),
        theme,
    );
    if let Some(feedback) = app.feedback() {
        render_feedback(frame, chunks[4], feedback, theme);
    }
    render_controls(frame, chunks[5], session, theme);
}

fn render_status<T: Timer, S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    app: &App<T, S>,
    session: &SessionState,
    theme: Theme,
) {
    let halves = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(area);

    let (number, total) = session.progress();
    let progress = Paragraph::new(format!("Question {} of {}", number, total))
        .fg(theme.accent())
        .bold();
    frame.render_widget(progress, halves[0]);

    let timer = app.timer_config();
    if !timer.enabled {
        return;
    }
    let remaining = match session.phase() {
        Phase::AwaitingAnswer => session.time_left(),
        _ => 0,
    };
    let color = if timer.is_warning(remaining) {
        theme.warning()
    } else {
        theme.muted()
    };
    let widget = Paragraph::new(format!("{}s", remaining))
        .alignment(Alignment::Right)
        .fg(color)
        .bold();
    frame.render_widget(widget, halves[1]);
}

fn render_progress_bar(frame: &mut Frame, area: Rect, session: &SessionState, theme: Theme) {
    let gauge = Gauge::default()
        .ratio(session.progress_ratio().clamp(0.0, 1.0))
        .label("")
        .gauge_style(Style::default().fg(theme.accent()).bg(theme.muted()));
    frame.render_widget(gauge, area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str, theme: Theme) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(theme.text())
        .bold()
        .block(Block::default().padding(Padding::vertical(1)));
    frame.render_widget(widget, area);
}

fn option_label(index: usize) -> char {
    char::from(b'A' + (index % 26) as u8)
}

fn render_answers(
    frame: &mut Frame,
    area: Rect,
    answers: &[Answer],
    selected: usize,
    outcome: Option<AnswerOutcome>,
    theme: Theme,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(answers.len() * 2);

    for (index, answer) in answers.iter().enumerate() {
        let (marker, style) = match outcome {
            // Revealed: every answer shows whether it was right.
            Some(outcome) => {
                let chosen = outcome.selected == Some(index);
                let marker = if chosen { ">" } else { " " };
                let color = if answer.is_correct {
                    theme.correct()
                } else if chosen {
                    theme.wrong()
                } else {
                    theme.muted()
                };
                let style = Style::default().fg(color);
                (marker, if chosen { style.bold() } else { style })
            }
            None if index == selected => (">", Style::default().fg(theme.accent()).bold()),
            None => (" ", Style::default().fg(theme.text())),
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", option_label(index)), style),
            Span::styled(answer.text.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_feedback(frame: &mut Frame, area: Rect, feedback: &Feedback, theme: Theme) {
    let color = if feedback.is_correct {
        theme.correct()
    } else {
        theme.wrong()
    };

    let mut spans = vec![Span::styled(
        feedback.headline(),
        Style::default().fg(color).bold(),
    )];
    if let Some(explanation) = &feedback.explanation {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(explanation.as_str(), Style::default().fg(theme.text())));
    }

    let widget = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(theme.muted())
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, session: &SessionState, theme: Theme) {
    let text = match session.phase() {
        Phase::Revealed => "n next question  ·  t theme  ·  q quit",
        _ => "j/k navigate  ·  enter select  ·  1-9 answer  ·  q quit",
    };
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(theme.muted());
    frame.render_widget(widget, area);
}
