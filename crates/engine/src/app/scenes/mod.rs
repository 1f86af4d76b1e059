mod end;
mod game;
mod main_menu;
mod menu;

pub use end::EndScene;
pub use game::{GameScene, PROMPTS, TERMINAL_LEVEL};
pub use main_menu::MainMenuScene;
pub use menu::Menu;

use super::rendering::{RenderSurface, COLOR_BLACK, COLOR_WHITE};
use super::{Rect, Vec2};

const TEXT_BOX: Rect = Rect::new(0.0, 400.0, 700.0, 100.0);
const TEXT_BOX_TEXT_POSITION: Vec2 = Vec2::new(5.0, 405.0);
const TEXT_BOX_WRAP_WIDTH: f32 = 690.0;

/// White caption strip along the bottom edge with wrapped black text.
fn draw_text_box(surface: &mut dyn RenderSurface, text: &str) {
    surface.fill_rect(TEXT_BOX, COLOR_WHITE);
    surface.draw_text_wrapped(text, TEXT_BOX_TEXT_POSITION, TEXT_BOX_WRAP_WIDTH, COLOR_BLACK);
}
