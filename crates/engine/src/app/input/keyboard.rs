use serde::Deserialize;
use tracing::debug;

use crate::app::command::{Action, Command};
use crate::app::game_state::GameState;

use super::{InputEvent, Key, KEY_COUNT};

/// Which keyboard actions re-fire every frame while their key is held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub jump_retrigger: bool,
    pub walk_left_retrigger: bool,
    pub walk_right_retrigger: bool,
    pub next_line_retrigger: bool,
}

/// Edge-triggered keyboard source with optional held-key retrigger.
#[derive(Debug, Clone)]
pub struct KeyboardInput {
    commands: [Command; KEY_COUNT],
    down: [bool; KEY_COUNT],
}

impl KeyboardInput {
    pub fn new(config: &InputConfig) -> Self {
        let commands = Key::ALL.map(|key| match key {
            Key::W => Command::new(Action::Jump, config.jump_retrigger),
            Key::A => Command::new(Action::WalkLeft, config.walk_left_retrigger),
            Key::D => Command::new(Action::WalkRight, config.walk_right_retrigger),
            Key::T => Command::new(Action::NextLine, config.next_line_retrigger),
            Key::Enter => Command::once(Action::MenuSelect),
            Key::Escape => Command::once(Action::Exit),
        });
        Self {
            commands,
            down: [false; KEY_COUNT],
        }
    }

    pub fn command(&self, key: Key) -> Command {
        self.commands[key.index()]
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.down[key.index()]
    }

    /// Applies one event. Returns the action fired by a fresh key press.
    pub fn handle_event(&mut self, event: InputEvent, state: &mut GameState) -> Option<Action> {
        match event {
            InputEvent::KeyDown(key) => {
                let slot = &mut self.down[key.index()];
                if *slot {
                    return None;
                }
                *slot = true;
                let command = self.commands[key.index()];
                debug!(key = ?key, action = command.action().label(), "key_pressed");
                command.execute(state);
                Some(command.action())
            }
            InputEvent::KeyUp(key) => {
                self.down[key.index()] = false;
                None
            }
            InputEvent::QuitRequested => {
                state.exit();
                Some(Action::Exit)
            }
        }
    }

    /// Re-fires held keys whose command asks for it. Returns how many fired.
    pub fn retrigger(&mut self, state: &mut GameState) -> usize {
        let mut fired = 0;
        for (command, down) in self.commands.iter().zip(self.down) {
            if down && command.retrigger() {
                command.execute(state);
                fired += 1;
            }
        }
        fired
    }
}

impl Default for KeyboardInput {
    fn default() -> Self {
        Self::new(&InputConfig::default())
    }
}
