use crate::app::rendering::{RenderSurface, COLOR_RED, COLOR_WHITE};
use crate::app::Vec2;

const MENU_ORIGIN: Vec2 = Vec2::new(10.0, 10.0);
const MENU_ROW_HEIGHT: f32 = 40.0;
const SELECTED_INDENT: f32 = 40.0;

/// Ordered option list with a wrapping selection cursor.
#[derive(Debug, Clone)]
pub struct Menu {
    options: Vec<&'static str>,
    selected: usize,
}

impl Menu {
    pub fn new(options: Vec<&'static str>) -> Self {
        Self {
            options,
            selected: 0,
        }
    }

    pub fn next(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.options.len();
    }

    pub fn prev(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(self.options.len() - 1);
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_option(&self) -> Option<&'static str> {
        self.options.get(self.selected).copied()
    }

    pub fn render(&self, surface: &mut dyn RenderSurface) {
        for (index, option) in self.options.iter().enumerate() {
            let y = MENU_ORIGIN.y + MENU_ROW_HEIGHT * index as f32;
            if index == self.selected {
                let position = Vec2::new(MENU_ORIGIN.x + SELECTED_INDENT, y);
                surface.draw_text(&format!("> {option}"), position, COLOR_RED);
            } else {
                surface.draw_text(option, Vec2::new(MENU_ORIGIN.x, y), COLOR_WHITE);
            }
        }
    }
}
