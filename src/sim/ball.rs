//! Ball kinematics and collision scheduling
//!
//! A moving ball always carries a prediction of its next contact. Between
//! contacts the velocity is constant, so each tick just integrates
//! `pos += vel * dt` until the accumulated move time reaches the predicted
//! time of impact. The ball then snaps to the predicted contact, takes the
//! reflected velocity, notifies the obstacle it hit and predicts again.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::{Arena, Wall};
use super::events::{EventSink, GameEvent};
use super::obstacle::{ObstacleId, ObstacleSet};
use super::sweep::Mover;
use crate::config::SimConfig;

/// Stable ball identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BallId(pub u32);

impl fmt::Display for BallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ball#{}", self.0)
    }
}

/// Ball state - waiting at the launch line or in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    Static,
    Moving,
}

/// Where a predicted contact comes from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ContactSource {
    Obstacle(ObstacleId),
    Wall(Wall),
    /// Too slow to reach anything; settles where it is
    Stalled,
}

/// A ball's next predicted contact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionResult {
    /// Time of impact, measured from the last contact (or activation)
    pub time: f32,
    /// Position to snap to on impact
    pub position: Vec2,
    /// Velocity after impact
    pub velocity: Vec2,
    /// The ball leaves play instead of bouncing
    pub terminal: bool,
    pub source: ContactSource,
}

impl CollisionResult {
    /// Settle immediately at `position`
    pub fn stalled(position: Vec2) -> Self {
        Self {
            time: 0.0,
            position,
            velocity: Vec2::ZERO,
            terminal: true,
            source: ContactSource::Stalled,
        }
    }

    /// The obstacle to notify on impact, if any
    pub fn obstacle(&self) -> Option<ObstacleId> {
        match self.source {
            ContactSource::Obstacle(id) => Some(id),
            _ => None,
        }
    }
}

/// What a single [`Ball::step`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Static ball, nothing to do
    Idle,
    /// Moved along the current velocity
    Advanced,
    /// Reached the predicted contact and bounced
    Bounced(ContactSource),
    /// Reached the floor and stopped
    Settled(Vec2),
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    id: BallId,
    radius: f32,
    /// Hit points removed from a brick per contact
    pub damage: u32,
    pos: Vec2,
    vel: Vec2,
    state: BallState,
    /// Time travelled since the last contact
    move_time: f32,
    prediction: CollisionResult,
    /// Obstacle bounced off most recently (re-collision suppression)
    last_hit: Option<ObstacleId>,
}

impl Ball {
    pub fn new(id: BallId, radius: f32, damage: u32, pos: Vec2) -> Self {
        Self {
            id,
            radius,
            damage,
            pos,
            vel: Vec2::ZERO,
            state: BallState::Static,
            move_time: 0.0,
            prediction: CollisionResult::stalled(pos),
            last_hit: None,
        }
    }

    pub fn id(&self) -> BallId {
        self.id
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn velocity(&self) -> Vec2 {
        self.vel
    }

    pub fn state(&self) -> BallState {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        self.state == BallState::Moving
    }

    pub fn prediction(&self) -> &CollisionResult {
        &self.prediction
    }

    pub fn last_hit(&self) -> Option<ObstacleId> {
        self.last_hit
    }

    /// Launch the ball, optionally teleporting it first
    pub fn activate(
        &mut self,
        velocity: Vec2,
        position: Option<Vec2>,
        obstacles: &ObstacleSet,
        config: &SimConfig,
    ) {
        if let Some(position) = position {
            self.pos = position;
        }
        self.vel = velocity;
        self.state = BallState::Moving;
        self.move_time = 0.0;
        self.last_hit = None;
        self.predict(obstacles, config);
    }

    /// Stop the ball and forget its flight history
    pub fn reset(&mut self, position: Option<Vec2>) {
        if let Some(position) = position {
            self.pos = position;
        }
        self.vel = Vec2::ZERO;
        self.state = BallState::Static;
        self.move_time = 0.0;
        self.last_hit = None;
        self.prediction = CollisionResult::stalled(self.pos);
    }

    /// Advance by `dt`
    pub fn step(
        &mut self,
        dt: f32,
        obstacles: &mut ObstacleSet,
        config: &SimConfig,
        events: &mut impl EventSink,
    ) -> StepOutcome {
        if self.state == BallState::Static {
            return StepOutcome::Idle;
        }

        if self.move_time < self.prediction.time {
            self.move_time += dt;
            self.pos += self.vel * dt;
            return StepOutcome::Advanced;
        }

        let prediction = self.prediction;
        self.pos = prediction.position;

        if prediction.terminal {
            self.vel = Vec2::ZERO;
            self.state = BallState::Static;
            self.move_time = 0.0;
            self.last_hit = None;
            log::info!(
                "{} settled at ({:.3}, {:.3})",
                self.id,
                self.pos.x,
                self.pos.y
            );
            events.emit(GameEvent::BallSettled {
                ball: self.id,
                position: self.pos,
            });
            return StepOutcome::Settled(self.pos);
        }

        self.vel = prediction.velocity;
        self.last_hit = prediction.obstacle();
        if let Some(id) = self.last_hit {
            obstacles.on_hit(id, self.id, self.damage, self.pos, events);
        }
        log::debug!(
            "{} bounced off {:?} at ({:.3}, {:.3})",
            self.id,
            prediction.source,
            self.pos.x,
            self.pos.y
        );

        self.move_time = 0.0;
        self.predict(obstacles, config);
        StepOutcome::Bounced(prediction.source)
    }

    /// Re-predict from the current position (after the board changed).
    ///
    /// A ball whose last advance already carried it to or past its predicted
    /// contact keeps that contact; the next [`Ball::step`] snaps back to it
    /// and predicts from there. Predicting from the overshot position would
    /// start inside the obstacle's collision line and miss it.
    pub fn refresh(&mut self, obstacles: &ObstacleSet, config: &SimConfig) {
        if self.state != BallState::Moving || self.contact_pending() {
            return;
        }
        self.move_time = 0.0;
        self.predict(obstacles, config);
    }

    /// The predicted contact is due on the next step
    pub fn contact_pending(&self) -> bool {
        self.state == BallState::Moving && self.move_time >= self.prediction.time
    }

    /// Recompute the next contact against every live obstacle and the arena
    pub fn predict(&mut self, obstacles: &ObstacleSet, config: &SimConfig) {
        let solver = &config.solver;
        if self.vel.length() < solver.epsilon {
            self.prediction = CollisionResult::stalled(self.pos);
            return;
        }

        let mover = Mover::new(self.pos, self.vel, self.radius);
        let skip = if config.ball.suppress_repeat_hit {
            self.last_hit
        } else {
            None
        };

        let mut best = obstacles
            .sweep(&mover, solver, skip)
            .map(|(id, contact)| CollisionResult {
                time: contact.time,
                position: contact.position,
                velocity: contact.velocity,
                terminal: false,
                source: ContactSource::Obstacle(id),
            });

        let arena = Arena::new(&config.arena);
        if let Some(hit) = arena.sweep(self.pos, self.vel, self.radius, solver)
            && best.is_none_or(|b| hit.time < b.time)
        {
            best = Some(CollisionResult {
                time: hit.time,
                position: hit.position,
                velocity: hit.velocity,
                terminal: hit.terminal(),
                source: ContactSource::Wall(hit.wall),
            });
        }

        self.prediction = best.unwrap_or_else(|| {
            log::warn!(
                "{} has no reachable contact at velocity ({}, {}); settling",
                self.id,
                self.vel.x,
                self.vel.y
            );
            CollisionResult::stalled(self.pos)
        });
        log::trace!("{} next contact {:?}", self.id, self.prediction);
    }
}
