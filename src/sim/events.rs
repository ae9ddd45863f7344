//! Out-of-band notifications from the core to the orchestrator
//!
//! The core never reaches into game state. Anything the game layer has to
//! react to (settled balls, destroyed bricks, consumed pickups) is pushed into
//! an [`EventSink`] handed down by the caller.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::BallId;
use super::obstacle::ObstacleId;

/// Something the orchestrator may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A ball crossed the floor and is static again
    BallSettled { ball: BallId, position: Vec2 },
    /// A brick took damage and survived
    ObstacleHit {
        obstacle: ObstacleId,
        ball: BallId,
        remaining: u32,
    },
    /// A brick ran out of hit points and left the board
    ObstacleDestroyed { obstacle: ObstacleId, ball: BallId },
    /// A pickup was collected; the game should spawn one more static ball
    PickupConsumed {
        obstacle: ObstacleId,
        ball: BallId,
        position: Vec2,
    },
}

/// Receiver for [`GameEvent`]s
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Sink for callers that only care about state, not notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: GameEvent) {}
}
