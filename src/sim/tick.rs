//! Fixed timestep tick for a whole wave
//!
//! Every ball is stepped once per tick with the same `dt`, in spawn order.
//! A ball's hit callback may remove an obstacle that a later ball still has
//! cached in its prediction; that later hit is a no-op.

use super::ball::{BallId, StepOutcome};
use super::events::EventSink;
use super::world::World;

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Contacts applied this tick (walls and obstacles)
    pub bounces: usize,
    /// Balls that reached the floor this tick, in step order
    pub settled: Vec<BallId>,
    /// Balls still in flight after the tick
    pub moving: usize,
}

/// Advance every ball in the world by one timestep
pub fn tick(world: &mut World, dt: f32, events: &mut impl EventSink) -> TickReport {
    let mut report = TickReport::default();
    let (balls, obstacles, config) = world.parts_mut();

    for ball in balls.iter_mut() {
        match ball.step(dt, obstacles, config, events) {
            StepOutcome::Idle => continue,
            StepOutcome::Advanced => {}
            StepOutcome::Bounced(_) => report.bounces += 1,
            StepOutcome::Settled(_) => report.settled.push(ball.id()),
        }
        if ball.is_moving() {
            report.moving += 1;
        }
    }
    report
}
