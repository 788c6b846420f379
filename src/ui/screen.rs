//! Screen layout, drawing and mouse hit-testing
//!
//! Drawing and hit-testing share one layout computation so a click always
//! lands on what was drawn at that cell.

use super::{App, ConfirmDialog, KeyboardVisual, LatencyLogPanel, ResultsPanel, StatusBar, TabBar};
use crate::keyboard::LayoutId;
use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::Style,
    symbols::border,
    widgets::Block,
    Frame,
};

/// Buttons at the right of the tab bar
pub const TAB_BUTTONS: [&str; 2] = ["[ Reset ]", "[ Quit ]"];

/// Tallest layout table plus its border
const KEYBOARD_HEIGHT: u16 = 8;

/// Something the operator can click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Layout(LayoutId),
    Reset,
    Quit,
    ConfirmYes,
    ConfirmNo,
}

/// Areas of the main screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub tabs: Rect,
    pub keyboard: Rect,
    pub summary: Rect,
    pub log: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let [tabs, keyboard, main, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(KEYBOARD_HEIGHT),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .areas(area);
        let [summary, log] =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(main);

        Self {
            tabs,
            keyboard,
            summary,
            log,
            status,
        }
    }
}

fn tab_labels() -> Vec<&'static str> {
    LayoutId::all().iter().map(|id| id.name()).collect()
}

/// What sits at (`column`, `row`) on a screen of size `area`.
///
/// While the confirmation dialog is open only its buttons respond.
pub fn hit_test(area: Rect, dialog_open: bool, column: u16, row: u16) -> Option<Target> {
    let position = Position::new(column, row);

    if dialog_open {
        let [yes, no] = ConfirmDialog::button_regions(ConfirmDialog::area(area));
        return if yes.contains(position) {
            Some(Target::ConfirmYes)
        } else if no.contains(position) {
            Some(Target::ConfirmNo)
        } else {
            None
        };
    }

    let layout = ScreenLayout::new(area);
    let labels = tab_labels();
    let bar = TabBar::new(&labels, 0, &TAB_BUTTONS, Default::default());
    let index = bar
        .regions(layout.tabs)
        .iter()
        .position(|region| region.contains(position))?;

    let target = match index.checked_sub(labels.len()) {
        None => Target::Layout(LayoutId::from_index(index)),
        Some(0) => Target::Reset,
        Some(_) => Target::Quit,
    };
    Some(target)
}

/// Draw the whole screen for the current app state
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let colors = app.colors;
    let layout = ScreenLayout::new(area);

    frame.render_widget(Block::default().style(Style::default().bg(colors.bg).fg(colors.fg)), area);

    let labels = tab_labels();
    frame.render_widget(
        TabBar::new(&labels, app.layout.index(), &TAB_BUTTONS, colors),
        layout.tabs,
    );

    let kb_block = Block::bordered()
        .title(format!(" ⌨ {} ", app.layout.name()))
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(colors.dim));
    let kb_inner = kb_block.inner(layout.keyboard);
    frame.render_widget(kb_block, layout.keyboard);
    frame.render_widget(
        KeyboardVisual::new(app.layout.table(), &app.keyboard_state, colors),
        kb_inner,
    );

    let results = app.results();
    frame.render_widget(ResultsPanel::new(&results, " Summary ", colors), layout.summary);
    frame.render_widget(
        LatencyLogPanel::new(app.latency_test.records(), " Latency (newest first) ", colors),
        layout.log,
    );

    let mode = app.mode_label();
    let progress = app.progress_label();
    let detail = app.status_detail();
    frame.render_widget(
        StatusBar::new(mode, app.layout.name(), &progress, colors)
            .detail(&detail)
            .message(app.get_status()),
        layout.status,
    );

    if app.is_confirming_reset() {
        frame.render_widget(
            ConfirmDialog::new(
                " Reset ",
                "Clear all latency records and key states? This cannot be undone.",
                colors,
            ),
            ConfirmDialog::area(area),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_stacks_panels() {
        let layout = ScreenLayout::new(Rect::new(0, 0, 100, 30));
        assert_eq!(layout.tabs, Rect::new(0, 0, 100, 1));
        assert_eq!(layout.keyboard, Rect::new(0, 1, 100, KEYBOARD_HEIGHT));
        assert_eq!(layout.status, Rect::new(0, 29, 100, 1));
        assert_eq!(layout.summary.y, layout.log.y);
        assert_eq!(layout.summary.right(), layout.log.x);
    }

    #[test]
    fn tabs_and_buttons_are_clickable() {
        let area = Rect::new(0, 0, 100, 30);
        assert_eq!(hit_test(area, false, 1, 0), Some(Target::Layout(LayoutId::Qwerty)));
        assert_eq!(hit_test(area, false, 20, 0), Some(Target::Layout(LayoutId::Azerty)));
        assert_eq!(hit_test(area, false, 98, 0), Some(Target::Quit));
        assert_eq!(hit_test(area, false, 85, 0), Some(Target::Reset));
        assert_eq!(hit_test(area, false, 50, 10), None);
    }

    #[test]
    fn dialog_is_modal() {
        let area = Rect::new(0, 0, 100, 30);
        let [yes, no] = ConfirmDialog::button_regions(ConfirmDialog::area(area));
        assert_eq!(hit_test(area, true, yes.x, yes.y), Some(Target::ConfirmYes));
        assert_eq!(hit_test(area, true, no.x + 1, no.y), Some(Target::ConfirmNo));
        // The tab bar is covered while the dialog is open
        assert_eq!(hit_test(area, true, 1, 0), None);
    }
}
