//! Input mapping
//!
//! Turns raw key names and touch-button ids into controller actions. Any
//! movement release stops both axes, matching the keyup handling of the page.

use crate::sim::Direction;

/// A command for the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Move(Direction),
    Stop,
    Pause,
    Resume,
    Retry,
}

/// On-screen touch buttons and the direction each one drives
pub const TOUCH_BUTTONS: [(&str, Direction); 4] = [
    ("leftButton", Direction::Left),
    ("rightButton", Direction::Right),
    ("upButton", Direction::Up),
    ("downButton", Direction::Down),
];

impl Direction {
    /// Map a `KeyboardEvent.key` value to a direction
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            _ => None,
        }
    }
}

pub fn action_for_key_down(key: &str) -> Option<InputAction> {
    Direction::from_key(key).map(InputAction::Move)
}

pub fn action_for_key_up(key: &str) -> Option<InputAction> {
    Direction::from_key(key).map(|_| InputAction::Stop)
}
