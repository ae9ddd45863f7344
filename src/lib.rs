//! Sweep Ball - continuous collision core for a brick-breaker board
//!
//! Core modules:
//! - `sim`: Analytic sweep tests, obstacles, arena bounds and the per-ball scheduler
//! - `config`: Injectable tuning (arena bounds, epsilons, backoff, time sentinel)
//!
//! Rendering, input and level generation live outside this crate; they talk to
//! the core through [`sim::World`] and the [`sim::GameEvent`] stream.

pub mod config;
pub mod sim;

pub use config::{ArenaConfig, BallConfig, ConfigError, SimConfig, SolverConfig};

/// Default tuning constants
pub mod consts {
    /// Demo simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Arena side length; the board spans `0..ARENA_SIZE` on both axes
    pub const ARENA_SIZE: f32 = 14.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.25;
    pub const BALL_DAMAGE: u32 = 1;
    /// Where the first ball of a run waits for launch
    pub const BALL_RESET_X: f32 = 7.0;
    pub const BALL_RESET_Y: f32 = 0.5;

    /// Approach/parallel threshold for dot products and velocity components
    pub const EPSILON: f32 = 1e-5;
    /// Time pulled back from an endpoint contact so the ball stops short of tangency
    pub const ANTI_TUNNEL_BACKOFF: f32 = 0.01;
    /// "No collision" time. Must exceed any realistic frame time x speed product.
    pub const MAX_TIME: f32 = 196_000.0;
}
