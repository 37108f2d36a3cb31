use serde::{Deserialize, Serialize};

/// Discrete triggers the presentation layer can send into a session.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    Start,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ControlBindings {
    pub move_left: String,
    pub move_right: String,
    pub move_down: String,
    pub rotate: String,
    pub start: String,
}

impl Default for ControlBindings {
    fn default() -> Self {
        Self {
            move_left: "ArrowLeft".to_string(),
            move_right: "ArrowRight".to_string(),
            move_down: "ArrowDown".to_string(),
            rotate: "ArrowUp".to_string(),
            start: "Enter".to_string(),
        }
    }
}

impl ControlBindings {
    /// Maps a `KeyboardEvent.code` to a command.
    pub fn command_for(&self, code: &str) -> Option<Command> {
        if code == self.move_left {
            Some(Command::MoveLeft)
        } else if code == self.move_right {
            Some(Command::MoveRight)
        } else if code == self.move_down {
            Some(Command::MoveDown)
        } else if code == self.rotate {
            Some(Command::Rotate)
        } else if code == self.start {
            Some(Command::Start)
        } else {
            None
        }
    }
}
