use tracing::{debug, info};

use crate::app::rendering::{RenderSurface, SpriteId, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::app::scene::{ActiveScene, Scene, SceneKey, SceneRequests};
use crate::app::{Rect, Vec2};

use super::{draw_text_box, EndScene};

/// Top edge of the player sprite when standing on the ground.
pub const GROUND_Y: f32 = 300.0;
pub const TERMINAL_LEVEL: u32 = 4;
pub const JUMPS_AFTER_FIRST: u32 = 5;
pub const WALK_STEPS: u32 = 10;

const GRAVITY_PX_PER_S2: f32 = 1200.0;
const JUMP_SPEED_PX_PER_S: f32 = 600.0;
const WALK_SPEED_PX_PER_S: f32 = 600.0;
const PLAYER_SIZE: Vec2 = Vec2::new(48.0, 48.0);
const PLAYER_START: Vec2 = Vec2::new(64.0, 120.0);
const SCENERY_SRC: Rect = Rect::new(20.0, 20.0, 150.0, 140.0);

pub const PROMPTS: [&str; 5] = [
    "CONCENTRATE to make Mario jump!",
    "Now jump five more times!",
    "Tense your right arm to make Mario move right!",
    "Tense your left arm to make Mario move left!",
    "Now combine jumping and moving to reach the\nflag!",
];

/// Tutorial level. Each level waits on one kind of action before advancing;
/// see [`GameScene::level`] for the order.
#[derive(Debug, Clone)]
pub struct GameScene {
    position: Vec2,
    velocity: Vec2,
    grounded: bool,
    level: u32,
    prompt_index: usize,
    jumps_remaining: u32,
    right_steps_remaining: u32,
    left_steps_remaining: u32,
    finished: bool,
}

impl GameScene {
    pub fn new() -> Self {
        Self {
            position: PLAYER_START,
            velocity: Vec2::ZERO,
            grounded: false,
            level: 0,
            prompt_index: 0,
            jumps_remaining: JUMPS_AFTER_FIRST,
            right_steps_remaining: WALK_STEPS,
            left_steps_remaining: WALK_STEPS,
            finished: false,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// 0: first jump, 1: five more jumps, 2: walk right, 3: walk left,
    /// 4: done.
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn prompt(&self) -> &'static str {
        PROMPTS[self.prompt_index % PROMPTS.len()]
    }

    pub fn jumps_remaining(&self) -> u32 {
        self.jumps_remaining
    }

    fn advance_level(&mut self) {
        self.level += 1;
        self.prompt_index = (self.level as usize).min(PROMPTS.len() - 1);
        info!(level = self.level, "tutorial_level_reached");
    }

    fn on_successful_jump(&mut self) {
        match self.level {
            0 => {
                self.jumps_remaining = JUMPS_AFTER_FIRST;
                self.advance_level();
            }
            1 => {
                self.jumps_remaining = self.jumps_remaining.saturating_sub(1);
                if self.jumps_remaining == 0 {
                    self.advance_level();
                }
            }
            _ => {}
        }
    }

    fn clamp_horizontal(&mut self) {
        let max_x = SCREEN_WIDTH as f32 - PLAYER_SIZE.x;
        self.position.x = self.position.x.clamp(0.0, max_x);
    }
}

impl Default for GameScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for GameScene {
    fn key(&self) -> SceneKey {
        SceneKey::Game
    }

    fn update(&mut self, delta_seconds: f32, requests: &mut SceneRequests) {
        if self.level >= TERMINAL_LEVEL {
            if !self.finished {
                self.finished = true;
                requests.request_write();
                requests.switch_scene(ActiveScene::End(EndScene::new()));
            }
            return;
        }

        self.velocity.y += GRAVITY_PX_PER_S2 * delta_seconds;
        self.position += self.velocity * delta_seconds;
        if self.position.y >= GROUND_Y {
            self.position.y = GROUND_Y;
            self.velocity.y = 0.0;
            self.grounded = true;
        }
        self.clamp_horizontal();
        self.velocity.x = 0.0;
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        let screen = Rect::new(0.0, 0.0, SCREEN_WIDTH as f32, SCREEN_HEIGHT as f32);
        surface.draw_sprite(SpriteId::SceneryTiles, screen, SCENERY_SRC);
        surface.draw_sprite(
            SpriteId::Player,
            Rect::at(self.position, PLAYER_SIZE),
            Rect::default(),
        );
        draw_text_box(surface, self.prompt());
    }

    fn jump(&mut self) {
        if !self.grounded {
            debug!(level = self.level, "jump_ignored_airborne");
            return;
        }
        self.velocity.y = -JUMP_SPEED_PX_PER_S;
        self.grounded = false;
        self.on_successful_jump();
    }

    fn walk_right(&mut self) {
        self.velocity.x = WALK_SPEED_PX_PER_S;
        if self.level == 2 {
            self.right_steps_remaining = self.right_steps_remaining.saturating_sub(1);
            if self.right_steps_remaining == 0 {
                self.advance_level();
            }
        }
    }

    fn walk_left(&mut self) {
        self.velocity.x = -WALK_SPEED_PX_PER_S;
        if self.level == 3 {
            self.left_steps_remaining = self.left_steps_remaining.saturating_sub(1);
            if self.left_steps_remaining == 0 {
                self.advance_level();
            }
        }
    }

    fn menu_select(&mut self) {
        self.prompt_index = (self.prompt_index + 1) % PROMPTS.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::rendering::testing::{DrawOp, RecordingSurface};

    fn land(scene: &mut GameScene, requests: &mut SceneRequests) {
        for _ in 0..200 {
            if scene.is_grounded() {
                return;
            }
            scene.update(0.016, requests);
        }
        panic!("player never landed");
    }

    #[test]
    fn jump_before_landing_is_rejected() {
        let mut scene = GameScene::new();
        assert!(!scene.is_grounded());
        scene.jump();
        assert_eq!(scene.velocity().y, 0.0);
        assert_eq!(scene.level(), 0);
    }

    #[test]
    fn landing_clamps_to_ground() {
        let mut scene = GameScene::new();
        let mut requests = SceneRequests::default();
        land(&mut scene, &mut requests);
        assert_eq!(scene.position().y, GROUND_Y);
        assert_eq!(scene.velocity().y, 0.0);
    }

    #[test]
    fn grounded_jump_moves_to_level_one() {
        let mut scene = GameScene::new();
        let mut requests = SceneRequests::default();
        land(&mut scene, &mut requests);

        scene.jump();
        assert!(scene.velocity().y < 0.0);
        assert!(!scene.is_grounded());
        assert_eq!(scene.level(), 1);
        assert_eq!(scene.jumps_remaining(), JUMPS_AFTER_FIRST);
        assert_eq!(scene.prompt(), PROMPTS[1]);
    }

    #[test]
    fn horizontal_velocity_is_an_impulse() {
        let mut scene = GameScene::new();
        let mut requests = SceneRequests::default();
        let start_x = scene.position().x;

        scene.walk_right();
        scene.update(0.1, &mut requests);
        let moved_x = scene.position().x;
        assert!(moved_x > start_x);
        assert_eq!(scene.velocity().x, 0.0);

        scene.update(0.1, &mut requests);
        assert_eq!(scene.position().x, moved_x);
    }

    #[test]
    fn walking_outside_its_level_does_not_progress() {
        let mut scene = GameScene::new();
        for _ in 0..WALK_STEPS * 2 {
            scene.walk_right();
            scene.walk_left();
        }
        assert_eq!(scene.level(), 0);
    }

    #[test]
    fn full_tutorial_ends_in_end_scene_with_write_request() {
        let mut scene = GameScene::new();
        let mut requests = SceneRequests::default();

        for _ in 0..=JUMPS_AFTER_FIRST {
            land(&mut scene, &mut requests);
            scene.jump();
        }
        assert_eq!(scene.level(), 2);

        for _ in 0..WALK_STEPS {
            scene.walk_right();
        }
        assert_eq!(scene.level(), 3);
        for _ in 0..WALK_STEPS {
            scene.walk_left();
        }
        assert_eq!(scene.level(), TERMINAL_LEVEL);
        assert_eq!(requests.pending_scene_key(), None);

        scene.update(0.016, &mut requests);
        assert_eq!(requests.pending_scene_key(), Some(SceneKey::End));
        assert!(requests.take_write());

        scene.update(0.016, &mut requests);
        assert!(!requests.take_write());
    }

    #[test]
    fn menu_select_cycles_prompts() {
        let mut scene = GameScene::new();
        for _ in 0..PROMPTS.len() {
            scene.menu_select();
        }
        assert_eq!(scene.prompt(), PROMPTS[0]);
        scene.menu_select();
        assert_eq!(scene.prompt(), PROMPTS[1]);
    }

    #[test]
    fn render_draws_scenery_player_and_prompt() {
        let mut surface = RecordingSurface::default();
        GameScene::new().render(&mut surface);

        let sprites: Vec<_> = surface
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Sprite { sprite, .. } => Some(*sprite),
                _ => None,
            })
            .collect();
        assert_eq!(sprites, vec![SpriteId::SceneryTiles, SpriteId::Player]);
        assert_eq!(surface.texts(), vec![PROMPTS[0].to_string()]);
    }
}
