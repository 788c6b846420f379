//! Visual keyboard layout rendering

use super::ThemeColors;
use crate::keyboard::{KeyboardState, KeySlot, LayoutTable};
use crate::utils::fit_label;
use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};

/// Narrowest unit (standard key) width in cells
const MIN_UNIT: f32 = 2.0;
/// Widest unit width in cells
const MAX_UNIT: f32 = 8.0;

/// One row per table row, every key colored by its visual state
pub struct KeyboardVisual<'a> {
    table: &'a LayoutTable,
    keyboard_state: &'a KeyboardState,
    colors: ThemeColors,
}

impl<'a> KeyboardVisual<'a> {
    pub fn new(table: &'a LayoutTable, keyboard_state: &'a KeyboardState, colors: ThemeColors) -> Self {
        Self {
            table,
            keyboard_state,
            colors,
        }
    }

    /// Cells per key unit for a panel `width` cells wide, `None` if the
    /// table cannot fit
    pub fn unit_width(table: &LayoutTable, width: u16) -> Option<f32> {
        let units = table.max_row_units();
        if units <= 0.0 {
            return None;
        }
        let unit = (f32::from(width) / units).min(MAX_UNIT);
        (unit >= MIN_UNIT).then_some(unit)
    }

    /// Column span `[start, end)` of each slot in a row, relative to the
    /// panel's left edge. Positions come from the cumulative width so
    /// rounding never drifts along the row.
    pub fn slot_spans(row: &[KeySlot], unit: f32) -> Vec<(u16, u16)> {
        let mut offset = 0.0f32;
        row.iter()
            .map(|slot| {
                let start = (offset * unit).round() as u16;
                offset += slot.width();
                let end = (offset * unit).round() as u16;
                (start, end)
            })
            .collect()
    }
}

impl<'a> Widget for KeyboardVisual<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(unit) = Self::unit_width(self.table, area.width) else {
            buf.set_string(
                area.x,
                area.y,
                "⌨ Window too small",
                Style::default().fg(self.colors.dim),
            );
            return;
        };

        // Center the widest row
        let used = (self.table.max_row_units() * unit).round() as u16;
        let x0 = area.x + area.width.saturating_sub(used) / 2;

        for (row_index, row) in self.table.rows.iter().enumerate() {
            let y = area.y + row_index as u16;
            if y >= area.y + area.height {
                break;
            }

            for (slot, (start, end)) in row.iter().zip(Self::slot_spans(row, unit)) {
                let KeySlot::Key(cap) = slot else {
                    continue;
                };
                // One cell of spacing between keys
                let width = end.saturating_sub(start).saturating_sub(1);
                if width == 0 {
                    continue;
                }
                let style = self.colors.key_style(self.keyboard_state.state_of(&cap.key));
                buf.set_string(x0 + start, y, fit_label(cap.label, width as usize), style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{CanonicalKey, KeyEvent, KeyVisualState, LayoutId};
    use std::time::Instant;

    #[test]
    fn unit_width_scales_with_panel() {
        let table = LayoutId::Qwerty.table();
        assert!(KeyboardVisual::unit_width(table, 10).is_none());
        let narrow = KeyboardVisual::unit_width(table, 60).unwrap();
        let wide = KeyboardVisual::unit_width(table, 120).unwrap();
        assert!(wide > narrow);
        assert_eq!(KeyboardVisual::unit_width(table, 1000), Some(MAX_UNIT));
    }

    #[test]
    fn spans_are_contiguous() {
        let row = LayoutId::Qwerty.table().rows[4];
        let spans = KeyboardVisual::slot_spans(row, 4.0);
        for pair in spans.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
        // Shift_L is 2.5 units
        assert_eq!(spans[0], (0, 10));
    }

    #[test]
    fn renders_key_colors_by_state() {
        let table = LayoutId::Qwerty.table();
        let mut state = KeyboardState::new();
        let f1 = CanonicalKey::Named(crate::keyboard::NamedKey::F1);
        state.process_event(&KeyEvent::release(f1, Instant::now()));

        let colors = ThemeColors::dark();
        let area = Rect::new(0, 0, 100, 6);
        let mut buf = Buffer::empty(area);
        KeyboardVisual::new(table, &state, colors).render(area, &mut buf);

        let tested_bg = colors.key_style(KeyVisualState::Tested).bg.unwrap();
        let default_bg = colors.key_style(KeyVisualState::Default).bg.unwrap();
        let row: Vec<_> = (0..area.width).map(|x| buf[(x, 0)].clone()).collect();
        let text: String = row.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Esc"));
        assert!(text.contains("F1"));
        assert!(row.iter().any(|c| c.bg == tested_bg));
        assert!(row.iter().any(|c| c.bg == default_bg));
    }

    #[test]
    fn too_small_shows_message() {
        let state = KeyboardState::new();
        let area = Rect::new(0, 0, 12, 3);
        let mut buf = Buffer::empty(area);
        KeyboardVisual::new(LayoutId::Azerty.table(), &state, ThemeColors::dark()).render(area, &mut buf);
        let text: String = (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(text.contains("Window"));
    }
}
