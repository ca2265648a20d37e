use ratatui::Frame;

use crate::{
    ui::{render_modal, render_settings_panel},
    App, AppState,
};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Typing screen; also shows the results of the last test
pub struct TypingScreen;

impl Screen for TypingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Settings panel over the typing screen
pub struct SettingsScreen;

impl Screen for SettingsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
        render_settings_panel(app, f);
    }
}

/// Modal (leaderboard) over the typing screen
pub struct ModalScreen {
    title: String,
    lines: Vec<String>,
}

impl Screen for ModalScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
        render_modal(app, &self.title, &self.lines, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Typing => Box::new(TypingScreen),
        AppState::Settings => Box::new(SettingsScreen),
        AppState::Modal { title, lines } => Box::new(ModalScreen {
            title: title.clone(),
            lines: lines.clone(),
        }),
    }
}
