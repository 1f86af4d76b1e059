mod command;
mod frame;
mod game_state;
mod geometry;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod scenes;

pub use command::{Action, Command};
pub use frame::{FrameDriver, FrameReport};
pub use game_state::GameState;
pub use geometry::{Rect, Vec2};
pub use input::{decode_frame, InputConfig, InputEvent, Key, KeyboardInput, SerialFrame, SerialInput};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    text_width_px, wrap_text, RenderError, RenderSurface, Renderer, Rgba, SpriteId, COLOR_BLACK,
    COLOR_RED, COLOR_WHITE, GLYPH_ADVANCE_PX, LINE_ADVANCE_PX, SCREEN_HEIGHT, SCREEN_WIDTH,
};
pub use scene::{ActiveScene, Scene, SceneKey, SceneRequests};
pub use scenes::{EndScene, GameScene, MainMenuScene, Menu, PROMPTS, TERMINAL_LEVEL};
