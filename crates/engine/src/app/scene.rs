use super::rendering::RenderSurface;
use super::scenes::{EndScene, GameScene, MainMenuScene};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    MainMenu,
    Game,
    End,
}

/// Requests a scene can raise while it updates.
///
/// The pending slot is a deferred write: it is only moved into the current
/// slot by [`GameState::apply_pending_scene`](super::GameState::apply_pending_scene),
/// after the frame has been rendered. Setting it twice keeps the last value.
#[derive(Debug, Default)]
pub struct SceneRequests {
    should_exit: bool,
    should_write: bool,
    pending_scene: Option<ActiveScene>,
}

impl SceneRequests {
    pub fn switch_scene(&mut self, scene: ActiveScene) {
        self.pending_scene = Some(scene);
    }

    pub fn exit(&mut self) {
        self.should_exit = true;
    }

    /// Asks the driver to persist calibration statistics at the end of the frame.
    pub fn request_write(&mut self) {
        self.should_write = true;
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn should_write(&self) -> bool {
        self.should_write
    }

    pub fn pending_scene_key(&self) -> Option<SceneKey> {
        self.pending_scene.as_ref().map(ActiveScene::key)
    }

    pub(crate) fn take_write(&mut self) -> bool {
        std::mem::take(&mut self.should_write)
    }

    pub(crate) fn take_pending_scene(&mut self) -> Option<ActiveScene> {
        self.pending_scene.take()
    }
}

/// Capability set shared by every scene. Action hooks default to no-ops so a
/// scene only overrides what it reacts to.
pub trait Scene {
    fn key(&self) -> SceneKey;
    fn update(&mut self, delta_seconds: f32, requests: &mut SceneRequests);
    fn render(&self, surface: &mut dyn RenderSurface);

    fn jump(&mut self) {}
    fn walk_left(&mut self) {}
    fn walk_right(&mut self) {}
    fn menu_select(&mut self) {}
    fn next_line(&mut self) {}
    fn exit(&mut self) {}
}

/// The closed set of scenes the game moves through.
pub enum ActiveScene {
    MainMenu(MainMenuScene),
    Game(GameScene),
    End(EndScene),
}

impl ActiveScene {
    pub fn main_menu() -> Self {
        ActiveScene::MainMenu(MainMenuScene::new())
    }

    pub fn key(&self) -> SceneKey {
        self.as_scene().key()
    }

    pub fn as_scene(&self) -> &dyn Scene {
        match self {
            ActiveScene::MainMenu(scene) => scene,
            ActiveScene::Game(scene) => scene,
            ActiveScene::End(scene) => scene,
        }
    }

    pub fn as_scene_mut(&mut self) -> &mut dyn Scene {
        match self {
            ActiveScene::MainMenu(scene) => scene,
            ActiveScene::Game(scene) => scene,
            ActiveScene::End(scene) => scene,
        }
    }
}

impl std::fmt::Debug for ActiveScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ActiveScene").field(&self.key()).finish()
    }
}
