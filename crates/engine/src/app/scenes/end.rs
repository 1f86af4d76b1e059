use crate::app::rendering::{RenderSurface, SpriteId, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::app::scene::{Scene, SceneKey, SceneRequests};
use crate::app::Rect;

use super::draw_text_box;

const WINTER_BACKGROUND_SRC: Rect = Rect::new(240.0, 20.0, 150.0, 140.0);
const CONGRATULATIONS: &str = "Congratulations! You're ready to play!";

/// Static closing screen. Reacts to no actions; exit is handled by `GameState`.
#[derive(Debug, Clone, Default)]
pub struct EndScene;

impl EndScene {
    pub fn new() -> Self {
        Self
    }
}

impl Scene for EndScene {
    fn key(&self) -> SceneKey {
        SceneKey::End
    }

    fn update(&mut self, _delta_seconds: f32, _requests: &mut SceneRequests) {}

    fn render(&self, surface: &mut dyn RenderSurface) {
        let screen = Rect::new(0.0, 0.0, SCREEN_WIDTH as f32, SCREEN_HEIGHT as f32);
        surface.draw_sprite(SpriteId::SceneryTiles, screen, WINTER_BACKGROUND_SRC);
        draw_text_box(surface, CONGRATULATIONS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::rendering::testing::{DrawOp, RecordingSurface};

    #[test]
    fn renders_background_box_and_message() {
        let mut surface = RecordingSurface::default();
        EndScene::new().render(&mut surface);

        assert!(matches!(
            surface.ops.first(),
            Some(DrawOp::Sprite {
                sprite: SpriteId::SceneryTiles,
                ..
            })
        ));
        assert_eq!(surface.count(&DrawOp::FillRect(Rect::default())), 1);
        assert_eq!(surface.texts(), vec![CONGRATULATIONS.to_string()]);
    }
}
