mod quiz;
mod result;
mod setup;

use ratatui::{prelude::*, widgets::Block};

use crate::app::App;
use crate::models::AppState;
use crate::score::KeyValueStore;
use crate::timer::Timer;

/// Colour scheme, toggled with `t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    fn background(self) -> Color {
        match self {
            Theme::Dark => Color::Reset,
            Theme::Light => Color::White,
        }
    }

    fn text(self) -> Color {
        match self {
            Theme::Dark => Color::White,
            Theme::Light => Color::Black,
        }
    }

    fn muted(self) -> Color {
        match self {
            Theme::Dark => Color::DarkGray,
            Theme::Light => Color::Gray,
        }
    }

    fn accent(self) -> Color {
        match self {
            Theme::Dark => Color::Cyan,
            Theme::Light => Color::Blue,
        }
    }

    fn correct(self) -> Color {
        Color::Green
    }

    fn wrong(self) -> Color {
        Color::Red
    }

    fn warning(self) -> Color {
        match self {
            Theme::Dark => Color::Yellow,
            Theme::Light => Color::LightRed,
        }
    }
}

pub fn render<T: Timer, S: KeyValueStore>(frame: &mut Frame, app: &App<T, S>) {
    let area = frame.area();
    let theme = app.theme();
    frame.render_widget(Block::default().bg(theme.background()), area);

    match app.state {
        AppState::Setup => setup::render(frame, area, app, theme),
        AppState::Quiz => quiz::render(frame, area, app, theme),
        AppState::Result => result::render(frame, area, app, theme),
    }
}
