use super::game_state::GameState;

/// The action vocabulary exposed by [`GameState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Jump,
    WalkLeft,
    WalkRight,
    MenuSelect,
    NextLine,
    Exit,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Jump,
        Action::WalkLeft,
        Action::WalkRight,
        Action::MenuSelect,
        Action::NextLine,
        Action::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::Jump => "jump",
            Action::WalkLeft => "walk_left",
            Action::WalkRight => "walk_right",
            Action::MenuSelect => "menu_select",
            Action::NextLine => "next_line",
            Action::Exit => "exit",
        }
    }
}

/// Binds one [`Action`] to a trigger owned by an input source.
///
/// `execute` fires unconditionally. Edge and level semantics belong to the
/// input source that owns the command; `retrigger` only tells that source
/// whether a held trigger should fire again on every `retrigger()` pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    action: Action,
    retrigger: bool,
}

impl Command {
    pub const fn new(action: Action, retrigger: bool) -> Self {
        Self { action, retrigger }
    }

    pub const fn once(action: Action) -> Self {
        Self::new(action, false)
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn retrigger(&self) -> bool {
        self.retrigger
    }

    pub fn execute(&self, state: &mut GameState) {
        match self.action {
            Action::Jump => state.jump(),
            Action::WalkLeft => state.walk_left(),
            Action::WalkRight => state.walk_right(),
            Action::MenuSelect => state.menu_select(),
            Action::NextLine => state.next_line(),
            Action::Exit => state.exit(),
        }
    }
}
