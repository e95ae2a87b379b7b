//! Difficulty progression
//!
//! Each level-up makes objects fall faster and spawn more often. The spawn
//! period shrinks geometrically, so the owner of the spawn timer must cancel
//! and recreate it whenever [`level_up`] reports a change.

use super::state::GameState;
use crate::tuning::Tuning;

/// Raise the level by one unless already at the cap.
///
/// Returns `true` if anything changed.
pub fn level_up(state: &mut GameState, tuning: &Tuning) -> bool {
    if state.level >= tuning.max_level {
        return false;
    }
    state.level += 1;
    state.object_speed += tuning.speed_per_level;
    state.spawn_interval_ms *= tuning.spawn_interval_factor;
    log::info!(
        "Level {}: speed {:.1}, spawn every {:.1} ms",
        state.level,
        state.object_speed,
        state.spawn_interval_ms
    );
    true
}
