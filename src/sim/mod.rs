//! Continuous collision simulation
//!
//! All collision math lives here. This module is pure and single-threaded:
//! - Analytic time-of-impact, no sub-stepping
//! - Stable iteration order (spawn order for balls, insertion order for obstacles)
//! - No rendering or platform dependencies

pub mod arena;
pub mod ball;
pub mod events;
pub mod geom;
pub mod obstacle;
pub mod sweep;
pub mod tick;
pub mod world;

pub use arena::{Arena, Wall, WallHit};
pub use ball::{Ball, BallId, BallState, CollisionResult, ContactSource, StepOutcome};
pub use events::{Discard, EventSink, GameEvent};
pub use obstacle::{
    EdgePolygon, HitOutcome, Obstacle, ObstacleError, ObstacleId, ObstacleSet, PickupCircle,
};
pub use sweep::{Contact, Feature, Mover, sweep_circle, sweep_polygon, sweep_segment};
pub use tick::{TickReport, tick};
pub use world::{World, WorldError};
