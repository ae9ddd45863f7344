//! Arena boundary sweep
//!
//! Four axis-aligned half-planes. Left, right and top reflect; the floor is
//! terminal and stops the ball.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{ArenaConfig, SolverConfig};

/// One of the arena walls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wall {
    Left,
    Top,
    Right,
    /// Terminal boundary: crossing it ends the ball's flight
    Floor,
}

/// Earliest wall contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHit {
    pub wall: Wall,
    pub time: f32,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl WallHit {
    pub fn terminal(&self) -> bool {
        self.wall == Wall::Floor
    }
}

/// Axis-aligned playfield
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub min: Vec2,
    pub max: Vec2,
}

impl Arena {
    pub fn new(config: &ArenaConfig) -> Self {
        Self {
            min: config.min,
            max: config.max,
        }
    }

    /// Earliest wall a ball at `pos` moving at `vel` will touch.
    ///
    /// A wall only counts when the velocity component toward it exceeds
    /// `epsilon`, so the division below never sees a near-zero denominator.
    /// The time can be negative when the ball already overlaps a wall; the
    /// predicted position then lies on the wall line, pulling it back inside.
    /// Walls are checked left, top, right, floor; the first minimum wins ties.
    pub fn sweep(&self, pos: Vec2, vel: Vec2, radius: f32, solver: &SolverConfig) -> Option<WallHit> {
        let eps = solver.epsilon;
        let candidates = [
            (Wall::Left, vel.x < -eps, self.min.x + radius - pos.x, vel.x),
            (Wall::Top, vel.y > eps, self.max.y - radius - pos.y, vel.y),
            (Wall::Right, vel.x > eps, self.max.x - radius - pos.x, vel.x),
            (Wall::Floor, vel.y < -eps, self.min.y + radius - pos.y, vel.y),
        ];

        let mut best: Option<(Wall, f32)> = None;
        let mut best_time = solver.max_time;
        for (wall, facing, gap, speed) in candidates {
            if !facing {
                continue;
            }
            let time = gap / speed;
            if time < best_time {
                best_time = time;
                best = Some((wall, time));
            }
        }

        let (wall, time) = best?;
        let velocity = match wall {
            Wall::Left | Wall::Right => Vec2::new(-vel.x, vel.y),
            Wall::Top => Vec2::new(vel.x, -vel.y),
            Wall::Floor => Vec2::ZERO,
        };
        Some(WallHit {
            wall,
            time,
            position: pos + vel * time,
            velocity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arena() -> Arena {
        Arena::new(&ArenaConfig::default())
    }

    #[test]
    fn test_floor_is_terminal() {
        let hit = arena()
            .sweep(Vec2::new(7.0, 0.5), Vec2::new(0.0, -5.0), 0.25, &SolverConfig::default())
            .unwrap();
        assert_eq!(hit.wall, Wall::Floor);
        assert!(hit.terminal());
        assert!((hit.time - 0.05).abs() < 1e-6);
        assert!((hit.position - Vec2::new(7.0, 0.25)).length() < 1e-6);
        assert_eq!(hit.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_side_walls_reflect() {
        let solver = SolverConfig::default();
        let left = arena()
            .sweep(Vec2::new(7.0, 7.0), Vec2::new(-2.0, 0.5), 0.25, &solver)
            .unwrap();
        assert_eq!(left.wall, Wall::Left);
        assert!((left.time - 3.375).abs() < 1e-5);
        assert!((left.position.x - 0.25).abs() < 1e-5);
        assert_eq!(left.velocity, Vec2::new(2.0, 0.5));

        let top = arena()
            .sweep(Vec2::new(7.0, 7.0), Vec2::new(0.0, 3.0), 0.25, &solver)
            .unwrap();
        assert_eq!(top.wall, Wall::Top);
        assert_eq!(top.velocity, Vec2::new(0.0, -3.0));
        assert!(!top.terminal());
    }

    #[test]
    fn test_corner_tie_prefers_top() {
        let hit = arena()
            .sweep(Vec2::new(7.0, 7.0), Vec2::new(1.0, 1.0), 0.25, &SolverConfig::default())
            .unwrap();
        assert_eq!(hit.wall, Wall::Top);
        assert!((hit.time - 6.75).abs() < 1e-5);
    }

    #[test]
    fn test_stationary_ball_never_hits() {
        let hit = arena().sweep(Vec2::new(7.0, 7.0), Vec2::ZERO, 0.25, &SolverConfig::default());
        assert!(hit.is_none());
    }

    #[test]
    fn test_overlap_pulls_back_onto_wall() {
        let hit = arena()
            .sweep(Vec2::new(0.1, 7.0), Vec2::new(-1.0, 0.0), 0.25, &SolverConfig::default())
            .unwrap();
        assert_eq!(hit.wall, Wall::Left);
        assert!(hit.time < 0.0);
        assert!((hit.position.x - 0.25).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_wall_reflection_preserves_speed(
            x in 1.0f32..13.0,
            y in 1.0f32..13.0,
            vx in -10.0f32..10.0,
            vy in -10.0f32..10.0,
        ) {
            let vel = Vec2::new(vx, vy);
            if let Some(hit) = arena().sweep(Vec2::new(x, y), vel, 0.25, &SolverConfig::default()) {
                prop_assert!(hit.time >= 0.0);
                if hit.terminal() {
                    prop_assert_eq!(hit.velocity, Vec2::ZERO);
                } else {
                    prop_assert!((hit.velocity.length() - vel.length()).abs() < 1e-4);
                }
            }
        }
    }
}
