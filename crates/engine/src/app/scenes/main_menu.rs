use tracing::info;

use crate::app::rendering::RenderSurface;
use crate::app::scene::{ActiveScene, Scene, SceneKey, SceneRequests};

use super::{GameScene, Menu};

const START_OPTION: usize = 0;

#[derive(Debug, Clone)]
pub struct MainMenuScene {
    menu: Menu,
    should_continue: bool,
    should_quit: bool,
}

impl MainMenuScene {
    pub fn new() -> Self {
        Self {
            menu: Menu::new(vec!["Start calibration", "Quit"]),
            should_continue: false,
            should_quit: false,
        }
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }
}

impl Default for MainMenuScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for MainMenuScene {
    fn key(&self) -> SceneKey {
        SceneKey::MainMenu
    }

    fn update(&mut self, _delta_seconds: f32, requests: &mut SceneRequests) {
        if std::mem::take(&mut self.should_continue) {
            requests.switch_scene(ActiveScene::Game(GameScene::new()));
        }
        if std::mem::take(&mut self.should_quit) {
            requests.exit();
        }
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        self.menu.render(surface);
    }

    fn walk_left(&mut self) {
        self.menu.prev();
    }

    fn walk_right(&mut self) {
        self.menu.next();
    }

    fn menu_select(&mut self) {
        info!(option = ?self.menu.selected_option(), "menu_option_selected");
        if self.menu.selected() == START_OPTION {
            self.should_continue = true;
        } else {
            self.should_quit = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_start_switches_on_next_update() {
        let mut scene = MainMenuScene::new();
        let mut requests = SceneRequests::default();

        scene.menu_select();
        assert_eq!(requests.pending_scene_key(), None);

        scene.update(0.016, &mut requests);
        assert_eq!(requests.pending_scene_key(), Some(SceneKey::Game));
        assert!(!requests.should_exit());
    }

    #[test]
    fn transition_flag_is_one_shot() {
        let mut scene = MainMenuScene::new();
        let mut requests = SceneRequests::default();
        scene.menu_select();
        scene.update(0.016, &mut requests);
        requests.take_pending_scene();

        scene.update(0.016, &mut requests);
        assert_eq!(requests.pending_scene_key(), None);
    }

    #[test]
    fn selecting_quit_requests_exit() {
        let mut scene = MainMenuScene::new();
        let mut requests = SceneRequests::default();
        scene.walk_right();
        scene.menu_select();
        scene.update(0.016, &mut requests);

        assert!(requests.should_exit());
        assert_eq!(requests.pending_scene_key(), None);
    }

    #[test]
    fn walking_moves_selection_with_wrap() {
        let mut scene = MainMenuScene::new();
        scene.walk_left();
        assert_eq!(scene.menu().selected(), 1);
        scene.walk_right();
        assert_eq!(scene.menu().selected(), 0);
    }
}
