//! Keyboard shortcuts
//!
//! Keys are `KeyboardEvent.code` values, so the layout doesn't matter.

use crate::settings::GameMode;
use crate::sim::{Command, GamePhase};

/// Map a key press to a command for the current screen.
///
/// - `Space`: menu → settings, settings → start, summary → restart
/// - `KeyP`: pause toggle during a round
/// - `Escape`: leave the round (free play shows the summary, countdown modes
///   abandon it), or go back to the menu from settings / summary
pub fn command_for_key(code: &str, phase: GamePhase, mode: GameMode) -> Option<Command> {
    match (code, phase) {
        ("Space", GamePhase::Menu) => Some(Command::OpenSettings),
        ("Space", GamePhase::Settings | GamePhase::Ended) => Some(Command::Start),
        ("KeyP", GamePhase::Running | GamePhase::Paused) => Some(Command::TogglePause),
        ("Escape", GamePhase::Running | GamePhase::Paused) => {
            if mode.is_countdown() {
                Some(Command::Quit)
            } else {
                Some(Command::End)
            }
        }
        ("Escape", GamePhase::Settings | GamePhase::Ended) => Some(Command::Menu),
        _ => None,
    }
}

/// Keys whose browser default (page scroll) should be suppressed
pub fn should_prevent_default(code: &str) -> bool {
    code == "Space"
}
