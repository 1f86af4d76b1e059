mod font;
mod renderer;
mod surface;
#[cfg(test)]
pub(crate) mod testing;

pub use font::{text_width_px, wrap_text, GLYPH_ADVANCE_PX, LINE_ADVANCE_PX};
pub use renderer::Renderer;
pub use surface::{
    RenderError, RenderSurface, Rgba, SpriteId, COLOR_BLACK, COLOR_RED, COLOR_WHITE,
    SCREEN_HEIGHT, SCREEN_WIDTH,
};
