//! Custom TUI widgets

use super::ThemeColors;
use crate::tests::{LatencyRecord, ResultStatus, TestResult};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Widget, Wrap},
};

/// Widget for displaying test results
pub struct ResultsPanel<'a> {
    results: &'a [TestResult],
    title: &'a str,
    colors: ThemeColors,
}

impl<'a> ResultsPanel<'a> {
    pub fn new(results: &'a [TestResult], title: &'a str, colors: ThemeColors) -> Self {
        Self {
            results,
            title,
            colors,
        }
    }

    fn status_symbol(status: ResultStatus) -> &'static str {
        match status {
            ResultStatus::Ok => "[OK]",
            ResultStatus::Warning => "[!!]",
            ResultStatus::Error => "[XX]",
            ResultStatus::Info => "[--]",
        }
    }
}

impl<'a> Widget for ResultsPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.dim));

        let inner = block.inner(area);
        block.render(area, buf);

        for (result, y) in self.results.iter().zip(inner.y..inner.y + inner.height) {
            let color = self.colors.status_color(result.status);
            let line = Line::from(vec![
                Span::styled(format!("{} ", Self::status_symbol(result.status)), Style::default().fg(color)),
                Span::styled(
                    format!("{}: ", result.label),
                    Style::default().fg(self.colors.fg).add_modifier(Modifier::BOLD),
                ),
                Span::styled(&result.value, Style::default().fg(color)),
            ]);
            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}

/// Latency records, newest at the top
pub struct LatencyLogPanel<'a, I> {
    records: I,
    title: &'a str,
    colors: ThemeColors,
}

impl<'a, I> LatencyLogPanel<'a, I>
where
    I: Iterator<Item = &'a LatencyRecord>,
{
    pub fn new(records: I, title: &'a str, colors: ThemeColors) -> Self {
        Self {
            records,
            title,
            colors,
        }
    }
}

impl<'a, I> Widget for LatencyLogPanel<'a, I>
where
    I: Iterator<Item = &'a LatencyRecord>,
{
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = area.height.saturating_sub(2) as usize;
        let items: Vec<ListItem> = self
            .records
            .take(visible)
            .enumerate()
            .map(|(i, record)| {
                let color = if i == 0 { self.colors.green } else { self.colors.fg };
                ListItem::new(record.to_string()).style(Style::default().fg(color))
            })
            .collect();

        List::new(items)
            .block(
                Block::default()
                    .title(self.title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.colors.dim)),
            )
            .render(area, buf);
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    mode: &'a str,
    layout: &'a str,
    progress: &'a str,
    detail: &'a str,
    message: Option<&'a str>,
    colors: ThemeColors,
}

impl<'a> StatusBar<'a> {
    pub fn new(mode: &'a str, layout: &'a str, progress: &'a str, colors: ThemeColors) -> Self {
        Self {
            mode,
            layout,
            progress,
            detail: "",
            message: None,
            colors,
        }
    }

    /// Right-aligned text (event counters, last key)
    pub fn detail(mut self, detail: &'a str) -> Self {
        self.detail = detail;
        self
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg_style = Style::default().bg(self.colors.bar).fg(self.colors.fg);
        buf.set_style(area, bg_style);

        let left = format!(" {} | {} | {} ", self.mode, self.layout, self.progress);
        let (left_end, _) = buf.set_stringn(
            area.x,
            area.y,
            &left,
            area.width as usize,
            bg_style.add_modifier(Modifier::BOLD),
        );

        let right_width = self.detail.chars().count() as u16 + 1;
        let right_x = area.x + area.width.saturating_sub(right_width);
        if right_x > left_end {
            buf.set_string(right_x, area.y, self.detail, bg_style);
        }

        if let Some(msg) = self.message {
            let space = right_x.saturating_sub(left_end);
            let msg_style = bg_style.fg(self.colors.yellow);
            buf.set_stringn(left_end + 1, area.y, msg, space.saturating_sub(2) as usize, msg_style);
        }
    }
}

/// Layout tabs on the left, action buttons on the right
pub struct TabBar<'a> {
    tabs: &'a [&'a str],
    selected: usize,
    buttons: &'a [&'a str],
    colors: ThemeColors,
}

impl<'a> TabBar<'a> {
    pub fn new(tabs: &'a [&'a str], selected: usize, buttons: &'a [&'a str], colors: ThemeColors) -> Self {
        Self {
            tabs,
            selected,
            buttons,
            colors,
        }
    }

    /// Clickable region of every tab, then every button, in order.
    /// Items that do not fit get an empty rect.
    pub fn regions(&self, area: Rect) -> Vec<Rect> {
        let mut regions = Vec::with_capacity(self.tabs.len() + self.buttons.len());

        let mut x = area.x;
        for tab in self.tabs {
            let width = tab.chars().count() as u16 + 2;
            if x + width <= area.x + area.width {
                regions.push(Rect::new(x, area.y, width, 1));
                x += width + 1;
            } else {
                regions.push(Rect::default());
            }
        }
        let tabs_end = x;

        let mut right = area.x + area.width;
        let mut button_regions: Vec<Rect> = self
            .buttons
            .iter()
            .rev()
            .map(|button| {
                let width = button.chars().count() as u16;
                match right.checked_sub(width + 1) {
                    Some(start) if start >= tabs_end => {
                        right = start;
                        Rect::new(start, area.y, width, 1)
                    }
                    _ => Rect::default(),
                }
            })
            .collect();
        button_regions.reverse();
        regions.extend(button_regions);
        regions
    }
}

impl<'a> Widget for TabBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.colors.bar));
        let regions = self.regions(area);

        for (i, (tab, rect)) in self.tabs.iter().zip(&regions).enumerate() {
            if rect.width == 0 {
                continue;
            }
            let style = if i == self.selected {
                Style::default()
                    .fg(self.colors.bg)
                    .bg(self.colors.cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.colors.fg).bg(self.colors.bar)
            };
            buf.set_string(rect.x, rect.y, format!(" {} ", tab), style);
        }

        let button_style = Style::default()
            .fg(self.colors.yellow)
            .bg(self.colors.bar)
            .add_modifier(Modifier::BOLD);
        for (button, rect) in self.buttons.iter().zip(&regions[self.tabs.len()..]) {
            if rect.width > 0 {
                buf.set_string(rect.x, rect.y, *button, button_style);
            }
        }
    }
}

/// Modal yes/no question drawn over the screen
pub struct ConfirmDialog<'a> {
    title: &'a str,
    message: &'a str,
    colors: ThemeColors,
}

impl<'a> ConfirmDialog<'a> {
    pub const YES: &'static str = "[ Yes ]";
    pub const NO: &'static str = "[ No ]";

    pub fn new(title: &'a str, message: &'a str, colors: ThemeColors) -> Self {
        Self {
            title,
            message,
            colors,
        }
    }

    /// Dialog rectangle centered in `screen`
    pub fn area(screen: Rect) -> Rect {
        let width = screen.width.min(52);
        let height = screen.height.min(7);
        Rect::new(
            screen.x + (screen.width - width) / 2,
            screen.y + (screen.height - height) / 2,
            width,
            height,
        )
    }

    /// Regions of the Yes and No buttons inside a dialog at `area`
    pub fn button_regions(area: Rect) -> [Rect; 2] {
        let y = area.y + area.height.saturating_sub(2);
        let yes_w = Self::YES.len() as u16;
        let no_w = Self::NO.len() as u16;
        let total = yes_w + 4 + no_w;
        let x = area.x + area.width.saturating_sub(total) / 2;
        [
            Rect::new(x, y, yes_w, 1).intersection(area),
            Rect::new(x + yes_w + 4, y, no_w, 1).intersection(area),
        ]
    }
}

impl<'a> Widget for ConfirmDialog<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.yellow))
            .style(Style::default().bg(self.colors.bg).fg(self.colors.fg));
        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.message)
            .wrap(Wrap { trim: true })
            .render(Rect { height: inner.height.saturating_sub(2), ..inner }, buf);

        let [yes, no] = Self::button_regions(area);
        let style = Style::default().bg(self.colors.bg).add_modifier(Modifier::BOLD);
        buf.set_stringn(yes.x, yes.y, Self::YES, yes.width as usize, style.fg(self.colors.green));
        buf.set_stringn(no.x, no.y, Self::NO, no.width as usize, style.fg(self.colors.red));
    }
}
