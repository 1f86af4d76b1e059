use thiserror::Error;

use crate::app::{Rect, Vec2};

pub type Rgba = [u8; 4];

pub const SCREEN_WIDTH: u32 = 640;
pub const SCREEN_HEIGHT: u32 = 480;

pub const COLOR_WHITE: Rgba = [255, 255, 255, 255];
pub const COLOR_RED: Rgba = [255, 0, 0, 255];
pub const COLOR_BLACK: Rgba = [0, 0, 0, 255];

/// Sprite sheets the scenes draw from. Paths are relative to the asset root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteId {
    SceneryTiles,
    Player,
}

impl SpriteId {
    pub fn asset_path(self) -> &'static str {
        match self {
            SpriteId::SceneryTiles => "art/background_scenery_tiles.png",
            SpriteId::Player => "art/player.png",
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to present frame: {0}")]
    Present(#[source] pixels::Error),
}

/// Drawing services the scenes call from `render`. Scenes never inspect the
/// underlying graphics state.
pub trait RenderSurface {
    fn clear(&mut self);
    fn draw_sprite(&mut self, sprite: SpriteId, dest: Rect, src: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    fn draw_text(&mut self, text: &str, position: Vec2, color: Rgba);
    fn draw_text_wrapped(&mut self, text: &str, position: Vec2, max_width: f32, color: Rgba);
    fn present(&mut self) -> Result<(), RenderError>;
}
