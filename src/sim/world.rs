//! Per-ball lifecycle facade for the game layer
//!
//! Owns the balls, the obstacle set and the configuration. The game layer
//! drives everything through ball ids and obstacle ids; hits and settles come
//! back through the [`EventSink`] passed to [`World::step`] and
//! [`super::tick`].

use glam::Vec2;
use thiserror::Error;

use super::ball::{Ball, BallId, StepOutcome};
use super::events::EventSink;
use super::obstacle::{Obstacle, ObstacleId, ObstacleSet};
use crate::config::{ConfigError, SimConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("no such ball: {0}")]
    UnknownBall(BallId),
}

/// Balls plus the board they bounce around
#[derive(Debug, Clone)]
pub struct World {
    config: SimConfig,
    obstacles: ObstacleSet,
    /// Indexed by `BallId`; balls are never removed
    balls: Vec<Ball>,
}

impl World {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            obstacles: ObstacleSet::new(),
            balls: Vec::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Add a static ball with the configured radius and damage
    pub fn spawn_ball(&mut self, position: Vec2) -> BallId {
        let id = BallId(self.balls.len() as u32);
        let ball = &self.config.ball;
        self.balls
            .push(Ball::new(id, ball.radius, ball.damage, position));
        log::debug!("Spawned {id} at ({:.2}, {:.2})", position.x, position.y);
        id
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.get(id.0 as usize)
    }

    /// All balls in spawn order
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn position(&self, id: BallId) -> Result<Vec2, WorldError> {
        self.get(id).map(Ball::position)
    }

    pub fn velocity(&self, id: BallId) -> Result<Vec2, WorldError> {
        self.get(id).map(Ball::velocity)
    }

    /// Launch a ball, optionally from a new position
    pub fn activate(
        &mut self,
        id: BallId,
        velocity: Vec2,
        position: Option<Vec2>,
    ) -> Result<(), WorldError> {
        let ball = self
            .balls
            .get_mut(id.0 as usize)
            .ok_or(WorldError::UnknownBall(id))?;
        ball.activate(velocity, position, &self.obstacles, &self.config);
        Ok(())
    }

    /// Advance one ball by `dt`
    pub fn step(
        &mut self,
        id: BallId,
        dt: f32,
        events: &mut impl EventSink,
    ) -> Result<StepOutcome, WorldError> {
        let ball = self
            .balls
            .get_mut(id.0 as usize)
            .ok_or(WorldError::UnknownBall(id))?;
        Ok(ball.step(dt, &mut self.obstacles, &self.config, events))
    }

    /// Stop a ball, optionally moving it
    pub fn reset(&mut self, id: BallId, position: Option<Vec2>) -> Result<(), WorldError> {
        self.get_mut(id)?.reset(position);
        Ok(())
    }

    /// Stop every ball in flight where it is (recall)
    pub fn reset_all(&mut self) {
        for ball in self.balls.iter_mut().filter(|b| b.is_moving()) {
            ball.reset(None);
        }
    }

    pub fn moving_count(&self) -> usize {
        self.balls.iter().filter(|b| b.is_moving()).count()
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    /// Add an obstacle. Balls already in flight keep their predictions until
    /// [`World::refresh_predictions`].
    pub fn insert_obstacle(&mut self, obstacle: impl Into<Obstacle>) -> ObstacleId {
        self.obstacles.insert(obstacle)
    }

    pub fn remove_obstacle(&mut self, id: ObstacleId) -> Option<Obstacle> {
        self.obstacles.remove(id)
    }

    /// Scroll the board down between waves
    pub fn shift_obstacles(&mut self, amount: f32) {
        self.obstacles.shift_down(amount);
        self.obstacles.purge();
        self.refresh_predictions();
        log::debug!(
            "Board shifted by {amount}; {} obstacles remain",
            self.obstacles.len()
        );
    }

    /// Re-predict every ball in flight against the current board
    pub fn refresh_predictions(&mut self) {
        for ball in &mut self.balls {
            ball.refresh(&self.obstacles, &self.config);
        }
    }

    /// Split borrow for stepping every ball against the shared board
    pub(crate) fn parts_mut(&mut self) -> (&mut [Ball], &mut ObstacleSet, &SimConfig) {
        (self.balls.as_mut_slice(), &mut self.obstacles, &self.config)
    }

    fn get(&self, id: BallId) -> Result<&Ball, WorldError> {
        self.ball(id).ok_or(WorldError::UnknownBall(id))
    }

    fn get_mut(&mut self, id: BallId) -> Result<&mut Ball, WorldError> {
        self.balls
            .get_mut(id.0 as usize)
            .ok_or(WorldError::UnknownBall(id))
    }
}
