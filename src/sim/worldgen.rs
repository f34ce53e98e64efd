//! Procedural platform column
//!
//! The column grows upward (toward negative y) ahead of the camera and is
//! pruned behind it. All randomness comes from the state's seeded RNG.

use glam::Vec2;
use rand::Rng;

use super::state::{GameState, PickupKind, Platform};

/// Reset the column: a wide start platform with the avatar on its centre,
/// then `initial_platforms` random ones above it
pub fn spawn_initial_platforms(state: &mut GameState) {
    let g = state.tuning.generation.clone();
    state.platforms.clear();

    let start_y = state.world_height - g.start_offset;
    let start_x = ((state.world_width - g.start_width) / 2.0).max(g.side_margin);
    let start = Platform::new(start_x, start_y, g.start_width, g.start_height);
    let spawn = Vec2::new(start.center_x(), start_y - state.avatar.radius);
    state.platforms.push(start);
    state.avatar.place(spawn);

    let mut y = start_y;
    for _ in 0..g.initial_platforms {
        y -= next_gap(state);
        create_platform_at(state, y);
    }
    log::debug!(
        "Spawned {} platforms, avatar at ({:.1}, {:.1})",
        state.platforms.len(),
        spawn.x,
        spawn.y
    );
}

fn next_gap(state: &mut GameState) -> f32 {
    let g = &state.tuning.generation;
    let (lo, hi) = (g.min_gap, g.max_gap);
    if hi > lo { state.rng.random_range(lo..hi) } else { lo }
}

/// Append a random platform with its top edge at `y`
pub fn create_platform_at(state: &mut GameState, y: f32) {
    let g = &state.tuning.generation;
    let w = if g.max_width > g.min_width {
        state.rng.random_range(g.min_width..g.max_width)
    } else {
        g.min_width
    };
    // Narrow worlds collapse the range to the left margin
    let span = state.world_width - w - 2.0 * g.side_margin;
    let x = g.side_margin + if span > 0.0 { state.rng.random_range(0.0..span) } else { 0.0 };

    let mut platform = Platform::new(x, y, w, g.height);
    if state.rng.random_bool(g.pickup_chance.clamp(0.0, 1.0)) {
        let pickup = match state.rng.random_range(0..3) {
            0 => PickupKind::Double,
            1 => PickupKind::Triple,
            _ => PickupKind::Penalty,
        };
        platform = platform.with_pickup(pickup);
    }
    state.platforms.push(platform);
}

/// Drop platforms that fell behind the camera and top up the column ahead of it
pub fn maintain_column(state: &mut GameState) {
    // A non-finite camera would never see the column as tall enough
    if !state.camera.y.is_finite() {
        log::warn!("Camera at y={}, skipping column upkeep", state.camera.y);
        return;
    }
    let g = &state.tuning.generation;
    let view_bottom = state.world_height + g.prune_below;
    let spawn_above = g.spawn_above;
    let fallback_y = state.world_height - g.start_offset;

    let stale = state
        .platforms
        .iter()
        .take_while(|p| state.camera.to_screen(p.y) > view_bottom)
        .count();
    if stale > 0 {
        state.platforms.drain(..stale);
        log::trace!("Pruned {stale} platforms");
    }

    loop {
        let top = state.platforms.last().map(|p| p.y);
        match top {
            Some(y) if state.camera.to_screen(y) <= -spawn_above => break,
            _ => {
                let base = top.unwrap_or(fallback_y);
                let y = base - next_gap(state);
                create_platform_at(state, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_initial_column_shape() {
        let state = GameState::new(42, Tuning::default());
        let g = &state.tuning.generation;

        assert!(state.platforms.len() > g.initial_platforms);
        let start = &state.platforms[0];
        assert_eq!(start.w, g.start_width);
        assert_eq!(start.y, state.world_height - g.start_offset);

        for pair in state.platforms.windows(2) {
            let gap = pair[0].y - pair[1].y;
            assert!(gap > g.min_gap - 1e-3 && gap < g.max_gap + 1e-3, "gap {gap}");
        }
        for p in &state.platforms[1..] {
            assert!(p.w >= g.min_width && p.w < g.max_width);
            assert!(p.x >= g.side_margin);
            assert!(p.right() <= state.world_width - g.side_margin + 1e-3);
        }
    }

    #[test]
    fn test_same_seed_same_column() {
        let a = GameState::new(1234, Tuning::default());
        let b = GameState::new(1234, Tuning::default());
        assert_eq!(a.platforms, b.platforms);

        let c = GameState::new(4321, Tuning::default());
        assert_ne!(a.platforms, c.platforms);
    }

    #[test]
    fn test_column_extends_ahead_of_camera() {
        let mut state = GameState::new(9, Tuning::default());
        state.camera.y -= 5000.0;

        maintain_column(&mut state);

        let top = state.platforms.last().unwrap();
        assert!(state.camera.to_screen(top.y) <= -state.tuning.generation.spawn_above);
    }

    #[test]
    fn test_prunes_platforms_below_view() {
        let mut state = GameState::new(9, Tuning::default());
        let start_y = state.platforms[0].y;
        state.camera.y -= 1000.0;

        maintain_column(&mut state);

        assert!(state.platforms[0].y < start_y);
        let limit = state.world_height + state.tuning.generation.prune_below;
        assert!(state.camera.to_screen(state.platforms[0].y) <= limit);
    }

    #[test]
    fn test_empty_column_regenerates() {
        let mut state = GameState::new(9, Tuning::default());
        state.platforms.clear();

        maintain_column(&mut state);

        assert!(!state.platforms.is_empty());
    }

    #[test]
    fn test_non_finite_camera_leaves_column_alone() {
        let mut state = GameState::new(9, Tuning::default());
        let before = state.platforms.clone();
        state.camera.y = f32::NAN;

        maintain_column(&mut state);

        assert_eq!(state.platforms, before);
    }

    #[test]
    fn test_narrow_world_still_generates() {
        let mut state = GameState::new(9, Tuning::default());
        state.resize(80.0, 700.0);
        spawn_initial_platforms(&mut state);

        for p in &state.platforms[1..] {
            assert_eq!(p.x, state.tuning.generation.side_margin);
        }
    }
}
