use crate::app::{Rect, Vec2};

use super::{RenderError, RenderSurface, Rgba, SpriteId};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawOp {
    Clear,
    Sprite {
        sprite: SpriteId,
        dest: Rect,
    },
    FillRect(Rect),
    Text {
        text: String,
        position: Vec2,
        color: Rgba,
    },
    Present,
}

/// Headless surface that records every call for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub(crate) ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub(crate) fn texts(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count(&self, wanted: &DrawOp) -> usize {
        self.ops
            .iter()
            .filter(|op| std::mem::discriminant(*op) == std::mem::discriminant(wanted))
            .count()
    }

    pub(crate) fn clear_ops(&mut self) {
        self.ops.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn draw_sprite(&mut self, sprite: SpriteId, dest: Rect, _src: Rect) {
        self.ops.push(DrawOp::Sprite { sprite, dest });
    }

    fn fill_rect(&mut self, rect: Rect, _color: Rgba) {
        self.ops.push(DrawOp::FillRect(rect));
    }

    fn draw_text(&mut self, text: &str, position: Vec2, color: Rgba) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            position,
            color,
        });
    }

    fn draw_text_wrapped(&mut self, text: &str, position: Vec2, _max_width: f32, color: Rgba) {
        self.draw_text(text, position, color);
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Present);
        Ok(())
    }
}
