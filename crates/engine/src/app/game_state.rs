use tracing::info;

use super::rendering::RenderSurface;
use super::scene::{ActiveScene, SceneKey, SceneRequests};

/// Owns the active scene and exposes the action vocabulary as delegating calls.
///
/// Exactly one scene is current. A scene requested through [`GameState::switch_scene`]
/// or from inside `update` waits in the pending slot until the driver calls
/// [`GameState::apply_pending_scene`] after rendering, at which point the previous
/// scene is dropped.
#[derive(Debug)]
pub struct GameState {
    current: ActiveScene,
    requests: SceneRequests,
}

impl GameState {
    pub fn new(initial: ActiveScene) -> Self {
        Self {
            current: initial,
            requests: SceneRequests::default(),
        }
    }

    pub fn jump(&mut self) {
        self.current.as_scene_mut().jump();
    }

    pub fn walk_left(&mut self) {
        self.current.as_scene_mut().walk_left();
    }

    pub fn walk_right(&mut self) {
        self.current.as_scene_mut().walk_right();
    }

    pub fn menu_select(&mut self) {
        self.current.as_scene_mut().menu_select();
    }

    pub fn next_line(&mut self) {
        self.current.as_scene_mut().next_line();
    }

    /// Sets the exit flag directly. The scene is only notified.
    pub fn exit(&mut self) {
        if !self.requests.should_exit() {
            info!(scene = ?self.current.key(), "exit_requested");
        }
        self.requests.exit();
        self.current.as_scene_mut().exit();
    }

    pub fn switch_scene(&mut self, scene: ActiveScene) {
        self.requests.switch_scene(scene);
    }

    pub fn update(&mut self, delta_seconds: f32) {
        let (current, requests) = (&mut self.current, &mut self.requests);
        current.as_scene_mut().update(delta_seconds, requests);
    }

    pub fn render(&self, surface: &mut dyn RenderSurface) {
        self.current.as_scene().render(surface);
    }

    /// Moves the pending scene into the current slot. Returns the new key when a
    /// switch happened.
    pub fn apply_pending_scene(&mut self) -> Option<SceneKey> {
        let next = self.requests.take_pending_scene()?;
        let previous = std::mem::replace(&mut self.current, next);
        let key = self.current.key();
        info!(from = ?previous.key(), to = ?key, "scene_switched");
        Some(key)
    }

    pub fn should_exit(&self) -> bool {
        self.requests.should_exit()
    }

    pub fn take_write_request(&mut self) -> bool {
        self.requests.take_write()
    }

    pub fn has_pending_scene(&self) -> bool {
        self.requests.pending_scene_key().is_some()
    }

    pub fn pending_scene_key(&self) -> Option<SceneKey> {
        self.requests.pending_scene_key()
    }

    pub fn active_scene_key(&self) -> SceneKey {
        self.current.key()
    }

    pub fn current_scene(&self) -> &ActiveScene {
        &self.current
    }

}
