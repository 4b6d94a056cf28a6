use ratatui::Frame;

use crate::{
    ui::{render_history, render_live},
    App, AppScreen,
};

/// A UI Screen boundary: responsible for rendering one view of the app
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Live rate, state and timers
pub struct LiveScreen;

impl Screen for LiveScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        render_live(app, area, f.buffer_mut());
    }
}

/// Historical statistics and charts
pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        render_history(app, area, f.buffer_mut());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(screen: &AppScreen) -> Box<dyn Screen> {
    match screen {
        AppScreen::Live => Box::new(LiveScreen),
        AppScreen::History => Box::new(HistoryScreen),
    }
}
