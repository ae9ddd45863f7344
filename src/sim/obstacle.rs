//! Static obstacles: edge polygons (bricks) and pickup circles
//!
//! Obstacles are a closed sum type so the per-tick sweep loop dispatches with
//! a `match`. They live in an [`ObstacleSet`] keyed by a stable
//! [`ObstacleId`]; removal only marks a slot dead, so ids cached in a ball's
//! prediction stay safe to query after another ball destroyed the obstacle.

use std::collections::HashMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ball::BallId;
use super::events::{EventSink, GameEvent};
use super::geom::normalize_or_zero;
use super::sweep::{Contact, Mover, sweep_circle, sweep_polygon};
use crate::config::SolverConfig;

/// Stable obstacle identifier. Never reused by the set that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(pub u32);

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obstacle#{}", self.0)
    }
}

/// Rejected obstacle geometry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObstacleError {
    #[error("polygon needs at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },
    #[error("edge {index} has zero length")]
    DegenerateEdge { index: usize },
    #[error("polygon has zero area")]
    ZeroArea,
    #[error("vertex ring winds counter-clockwise; outward normals need clockwise order")]
    CounterClockwise,
    #[error("vertex {vertex} is reflex; bricks must be convex")]
    Concave { vertex: usize },
    #[error("radius must be positive")]
    NonPositiveRadius,
    #[error("geometry contains NaN or infinite coordinates")]
    NonFinite,
}

/// What an obstacle did in response to a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Brick survived with this many hit points left
    Damaged { remaining: u32 },
    /// Brick ran out of hit points
    Destroyed,
    /// Pickup collected
    Consumed,
}

impl HitOutcome {
    /// Whether the obstacle should leave the board
    pub fn removes(&self) -> bool {
        !matches!(self, HitOutcome::Damaged { .. })
    }
}

/// Serialized form of an [`EdgePolygon`]; normals are rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PolygonShape {
    vertices: Vec<Vec2>,
    hp: u32,
}

/// A destructible brick bounded by a clockwise vertex ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolygonShape", into = "PolygonShape")]
pub struct EdgePolygon {
    vertices: Vec<Vec2>,
    /// `normals[i]` is the outward unit normal of edge `i -> i + 1`
    normals: Vec<Vec2>,
    hp: u32,
}

impl EdgePolygon {
    /// Build a brick from a clockwise convex vertex ring, validated with the
    /// default solver tolerances.
    pub fn new(vertices: Vec<Vec2>, hp: u32) -> Result<Self, ObstacleError> {
        Self::with_solver(vertices, hp, &SolverConfig::default())
    }

    /// Build a brick from a clockwise convex vertex ring.
    ///
    /// With clockwise winding `perp(edge)` points away from the interior,
    /// which the sweep relies on to tell approaching from leaving. The ring
    /// must be convex: a ball skips the brick it just bounced off, which is
    /// only safe when it cannot reach the same brick again without first
    /// touching something else. `solver.epsilon` bounds edge length, area and
    /// the turn at each vertex.
    pub fn with_solver(
        vertices: Vec<Vec2>,
        hp: u32,
        solver: &SolverConfig,
    ) -> Result<Self, ObstacleError> {
        let count = vertices.len();
        if count < 3 {
            return Err(ObstacleError::TooFewVertices { count });
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(ObstacleError::NonFinite);
        }

        let eps = solver.epsilon;
        let mut normals = Vec::with_capacity(count);
        let mut twice_area = 0.0;
        for i in 0..count {
            let start = vertices[i];
            let end = vertices[(i + 1) % count];
            let normal = normalize_or_zero((end - start).perp(), eps);
            if normal == Vec2::ZERO {
                return Err(ObstacleError::DegenerateEdge { index: i });
            }
            normals.push(normal);
            twice_area += start.perp_dot(end);
        }

        if twice_area.abs() <= eps {
            return Err(ObstacleError::ZeroArea);
        }
        if twice_area > 0.0 {
            return Err(ObstacleError::CounterClockwise);
        }
        // Clockwise rings turn right at every vertex; a left turn is reflex
        for i in 0..count {
            let next = (i + 1) % count;
            if normals[i].perp_dot(normals[next]) > eps {
                return Err(ObstacleError::Concave { vertex: next });
            }
        }

        Ok(Self {
            vertices,
            normals,
            hp,
        })
    }

    /// Axis-aligned box brick, `min` bottom-left
    pub fn rect(min: Vec2, max: Vec2, hp: u32) -> Result<Self, ObstacleError> {
        Self::new(
            vec![
                Vec2::new(min.x, max.y),
                max,
                Vec2::new(max.x, min.y),
                min,
            ],
            hp,
        )
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    /// Remaining hit points
    pub fn hp(&self) -> u32 {
        self.hp
    }
}

impl TryFrom<PolygonShape> for EdgePolygon {
    type Error = ObstacleError;

    fn try_from(shape: PolygonShape) -> Result<Self, Self::Error> {
        Self::new(shape.vertices, shape.hp)
    }
}

impl From<EdgePolygon> for PolygonShape {
    fn from(polygon: EdgePolygon) -> Self {
        Self {
            vertices: polygon.vertices,
            hp: polygon.hp,
        }
    }
}

/// A pass-through pickup that grants an extra ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupCircle {
    pub center: Vec2,
    pub radius: f32,
}

impl PickupCircle {
    pub fn new(center: Vec2, radius: f32) -> Result<Self, ObstacleError> {
        if !center.is_finite() || !radius.is_finite() {
            return Err(ObstacleError::NonFinite);
        }
        if radius <= 0.0 {
            return Err(ObstacleError::NonPositiveRadius);
        }
        Ok(Self { center, radius })
    }
}

/// Anything a ball can run into besides the arena walls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Obstacle {
    EdgePolygon(EdgePolygon),
    PickupCircle(PickupCircle),
}

impl Obstacle {
    /// Earliest contact with this obstacle, if any
    pub fn sweep(&self, mover: &Mover, solver: &SolverConfig) -> Option<Contact> {
        match self {
            Obstacle::EdgePolygon(polygon) => {
                sweep_polygon(mover, &polygon.vertices, &polygon.normals, solver)
            }
            Obstacle::PickupCircle(pickup) => {
                sweep_circle(mover, pickup.center, pickup.radius, true, solver)
            }
        }
    }

    /// Move down by `amount` (board scroll after a wave)
    pub fn shift_down(&mut self, amount: f32) {
        match self {
            Obstacle::EdgePolygon(polygon) => {
                for vertex in &mut polygon.vertices {
                    vertex.y -= amount;
                }
            }
            Obstacle::PickupCircle(pickup) => pickup.center.y -= amount,
        }
    }

    /// Apply a hit from a ball dealing `damage`
    pub fn on_hit(&mut self, damage: u32) -> HitOutcome {
        match self {
            Obstacle::EdgePolygon(polygon) => {
                polygon.hp = polygon.hp.saturating_sub(damage);
                if polygon.hp == 0 {
                    HitOutcome::Destroyed
                } else {
                    HitOutcome::Damaged {
                        remaining: polygon.hp,
                    }
                }
            }
            Obstacle::PickupCircle(_) => HitOutcome::Consumed,
        }
    }
}

impl From<EdgePolygon> for Obstacle {
    fn from(polygon: EdgePolygon) -> Self {
        Obstacle::EdgePolygon(polygon)
    }
}

impl From<PickupCircle> for Obstacle {
    fn from(pickup: PickupCircle) -> Self {
        Obstacle::PickupCircle(pickup)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    id: ObstacleId,
    obstacle: Option<Obstacle>,
}

/// Live obstacles keyed by stable id.
///
/// Iteration follows insertion order. Removed obstacles leave a dead slot
/// behind until [`ObstacleSet::purge`] runs between waves.
#[derive(Debug, Clone, Default)]
pub struct ObstacleSet {
    slots: Vec<Slot>,
    index: HashMap<ObstacleId, usize>,
    next_id: u32,
    live: usize,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, obstacle: impl Into<Obstacle>) -> ObstacleId {
        let id = ObstacleId(self.next_id);
        self.next_id += 1;
        self.index.insert(id, self.slots.len());
        self.slots.push(Slot {
            id,
            obstacle: Some(obstacle.into()),
        });
        self.live += 1;
        id
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].obstacle.as_ref()
    }

    pub fn get_mut(&mut self, id: ObstacleId) -> Option<&mut Obstacle> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].obstacle.as_mut()
    }

    pub fn contains(&self, id: ObstacleId) -> bool {
        self.get(id).is_some()
    }

    /// Remove an obstacle. Unknown or already-removed ids return `None`.
    pub fn remove(&mut self, id: ObstacleId) -> Option<Obstacle> {
        let slot = *self.index.get(&id)?;
        let removed = self.slots[slot].obstacle.take();
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// Number of live obstacles
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live obstacles in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.obstacle.as_ref().map(|obstacle| (slot.id, obstacle)))
    }

    /// Scroll every live obstacle down
    pub fn shift_down(&mut self, amount: f32) {
        for obstacle in self.slots.iter_mut().filter_map(|s| s.obstacle.as_mut()) {
            obstacle.shift_down(amount);
        }
    }

    /// Drop dead slots and rebuild the id index. Ids stay valid.
    pub fn purge(&mut self) {
        self.slots.retain(|slot| slot.obstacle.is_some());
        self.index = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (slot.id, i))
            .collect();
    }

    /// Earliest contact over every live obstacle except `skip`.
    ///
    /// Candidates must beat the running minimum strictly, so on an exact tie
    /// the obstacle inserted first wins.
    pub fn sweep(
        &self,
        mover: &Mover,
        solver: &SolverConfig,
        skip: Option<ObstacleId>,
    ) -> Option<(ObstacleId, Contact)> {
        let mut best: Option<(ObstacleId, Contact)> = None;
        let mut best_time = solver.max_time;
        for (id, obstacle) in self.iter() {
            if Some(id) == skip {
                continue;
            }
            if let Some(contact) = obstacle.sweep(mover, solver)
                && contact.time < best_time
            {
                best_time = contact.time;
                best = Some((id, contact));
            }
        }
        best
    }

    /// Deliver a hit to `id` and report the consequences to `events`.
    ///
    /// An id that is no longer live is a no-op: another ball may have removed
    /// the obstacle earlier in the same tick.
    pub fn on_hit(
        &mut self,
        id: ObstacleId,
        ball: BallId,
        damage: u32,
        position: Vec2,
        events: &mut impl EventSink,
    ) -> Option<HitOutcome> {
        let Some(obstacle) = self.get_mut(id) else {
            log::debug!("{ball} hit {id}, which is already gone");
            return None;
        };

        let outcome = obstacle.on_hit(damage);
        if outcome.removes() {
            self.remove(id);
        }
        let event = match outcome {
            HitOutcome::Damaged { remaining } => GameEvent::ObstacleHit {
                obstacle: id,
                ball,
                remaining,
            },
            HitOutcome::Destroyed => GameEvent::ObstacleDestroyed { obstacle: id, ball },
            HitOutcome::Consumed => GameEvent::PickupConsumed {
                obstacle: id,
                ball,
                position,
            },
        };
        events.emit(event);
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: Vec2, hp: u32) -> EdgePolygon {
        EdgePolygon::rect(min, min + Vec2::ONE, hp).unwrap()
    }

    #[test]
    fn test_rect_normals_point_outward() {
        let brick = square(Vec2::ZERO, 1);
        let center = Vec2::splat(0.5);
        for (i, normal) in brick.normals().iter().enumerate() {
            let mid = (brick.vertices()[i] + brick.vertices()[(i + 1) % 4]) * 0.5;
            assert!(normal.dot(mid - center) > 0.0, "edge {i} normal points inward");
            assert!((normal.length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_invalid_polygons_fail_fast() {
        let two = vec![Vec2::ZERO, Vec2::ONE];
        assert_eq!(
            EdgePolygon::new(two, 1),
            Err(ObstacleError::TooFewVertices { count: 2 })
        );

        let repeated = vec![Vec2::new(0.0, 1.0), Vec2::new(0.0, 1.0), Vec2::ZERO];
        assert_eq!(
            EdgePolygon::new(repeated, 1),
            Err(ObstacleError::DegenerateEdge { index: 0 })
        );

        let collinear = vec![Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)];
        assert_eq!(EdgePolygon::new(collinear, 1), Err(ObstacleError::ZeroArea));

        let ccw = vec![Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        assert_eq!(EdgePolygon::new(ccw, 1), Err(ObstacleError::CounterClockwise));

        // Clockwise, but notched at (1, 1)
        let notched = vec![
            Vec2::new(0.0, 2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::ZERO,
        ];
        assert_eq!(
            EdgePolygon::new(notched, 1),
            Err(ObstacleError::Concave { vertex: 3 })
        );

        let nan = vec![Vec2::ZERO, Vec2::new(f32::NAN, 1.0), Vec2::new(1.0, 0.0)];
        assert_eq!(EdgePolygon::new(nan, 1), Err(ObstacleError::NonFinite));

        assert_eq!(
            PickupCircle::new(Vec2::ZERO, 0.0),
            Err(ObstacleError::NonPositiveRadius)
        );
    }

    #[test]
    fn test_tolerance_comes_from_solver() {
        let tiny = || EdgePolygon::rect(Vec2::ZERO, Vec2::splat(1e-3), 1);
        assert_eq!(tiny(), Err(ObstacleError::ZeroArea));

        let fine = SolverConfig {
            epsilon: 1e-9,
            ..SolverConfig::default()
        };
        let vertices = vec![
            Vec2::new(0.0, 1e-3),
            Vec2::splat(1e-3),
            Vec2::new(1e-3, 0.0),
            Vec2::ZERO,
        ];
        let brick = EdgePolygon::with_solver(vertices, 1, &fine).unwrap();
        assert_eq!(brick.normals()[0], Vec2::Y);
    }

    #[test]
    fn test_triangle_brick() {
        // Lower-left half of a cell
        let tri = EdgePolygon::new(
            vec![Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0), Vec2::ZERO],
            3,
        )
        .unwrap();
        let diagonal = tri.normals()[0];
        assert!((diagonal - Vec2::splat(std::f32::consts::FRAC_1_SQRT_2)).length() < 1e-6);
    }

    #[test]
    fn test_shift_down_moves_geometry() {
        let mut brick: Obstacle = square(Vec2::new(2.0, 5.0), 1).into();
        brick.shift_down(1.0);
        let Obstacle::EdgePolygon(polygon) = &brick else {
            panic!("expected polygon");
        };
        assert!(polygon.vertices().iter().all(|v| v.y == 4.0 || v.y == 5.0));
        // Normals are translation invariant
        assert_eq!(polygon.normals()[0], Vec2::Y);

        let mut pickup: Obstacle = PickupCircle::new(Vec2::new(3.0, 3.0), 0.2).unwrap().into();
        pickup.shift_down(1.0);
        assert_eq!(pickup, PickupCircle::new(Vec2::new(3.0, 2.0), 0.2).unwrap().into());
    }

    #[test]
    fn test_hit_count_until_destroyed() {
        let mut brick: Obstacle = square(Vec2::ZERO, 3).into();
        assert_eq!(brick.on_hit(1), HitOutcome::Damaged { remaining: 2 });
        assert_eq!(brick.on_hit(5), HitOutcome::Destroyed);

        let mut pickup: Obstacle = PickupCircle::new(Vec2::ZERO, 0.2).unwrap().into();
        assert_eq!(pickup.on_hit(1), HitOutcome::Consumed);
    }

    #[test]
    fn test_set_removal_is_stable() {
        let mut set = ObstacleSet::new();
        let a = set.insert(square(Vec2::ZERO, 1));
        let b = set.insert(square(Vec2::new(2.0, 0.0), 1));
        let c = set.insert(PickupCircle::new(Vec2::new(5.0, 5.0), 0.2).unwrap());
        assert_eq!(set.len(), 3);

        assert!(set.remove(b).is_some());
        assert!(set.remove(b).is_none());
        assert!(!set.contains(b));
        assert_eq!(set.len(), 2);
        let ids: Vec<_> = set.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c]);

        set.purge();
        assert!(set.contains(a) && set.contains(c));
        let d = set.insert(square(Vec2::new(8.0, 0.0), 1));
        assert_ne!(d, b, "ids are never reused");
    }

    #[test]
    fn test_on_hit_emits_events_and_tolerates_missing() {
        let mut set = ObstacleSet::new();
        let brick = set.insert(square(Vec2::ZERO, 2));
        let pickup = set.insert(PickupCircle::new(Vec2::new(5.0, 5.0), 0.2).unwrap());
        let ball = BallId(0);
        let mut events: Vec<GameEvent> = Vec::new();

        set.on_hit(brick, ball, 1, Vec2::ZERO, &mut events);
        set.on_hit(brick, ball, 1, Vec2::ZERO, &mut events);
        set.on_hit(brick, ball, 1, Vec2::ZERO, &mut events);
        set.on_hit(pickup, ball, 1, Vec2::new(5.0, 4.5), &mut events);

        assert_eq!(
            events,
            vec![
                GameEvent::ObstacleHit { obstacle: brick, ball, remaining: 1 },
                GameEvent::ObstacleDestroyed { obstacle: brick, ball },
                GameEvent::PickupConsumed {
                    obstacle: pickup,
                    ball,
                    position: Vec2::new(5.0, 4.5)
                },
            ]
        );
        assert!(set.is_empty());
    }

    #[test]
    fn test_set_sweep_picks_earliest_and_skips() {
        let mut set = ObstacleSet::new();
        let far = set.insert(square(Vec2::new(0.0, 8.0), 1));
        let near = set.insert(square(Vec2::new(0.0, 4.0), 1));
        let mover = Mover::new(Vec2::new(0.5, 0.5), Vec2::new(0.0, 1.0), 0.25);
        let solver = SolverConfig::default();

        let (id, contact) = set.sweep(&mover, &solver, None).unwrap();
        assert_eq!(id, near);
        assert!((contact.time - 3.25).abs() < 1e-5);

        let (id, _) = set.sweep(&mover, &solver, Some(near)).unwrap();
        assert_eq!(id, far);
    }

    #[test]
    fn test_tie_goes_to_first_inserted() {
        let mut set = ObstacleSet::new();
        let first = set.insert(square(Vec2::new(0.0, 4.0), 1));
        let _second = set.insert(square(Vec2::new(0.0, 4.0), 1));
        let mover = Mover::new(Vec2::new(0.5, 0.5), Vec2::new(0.0, 1.0), 0.25);
        let (id, _) = set.sweep(&mover, &SolverConfig::default(), None).unwrap();
        assert_eq!(id, first);
    }

    #[test]
    fn test_polygon_serde_revalidates() {
        let brick: Obstacle = square(Vec2::ZERO, 4).into();
        let json = serde_json::to_string(&brick).unwrap();
        let back: Obstacle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, brick);

        let ccw = r#"{"EdgePolygon":{"vertices":[[0.0,0.0],[1.0,0.0],[0.0,1.0]],"hp":1}}"#;
        assert!(serde_json::from_str::<Obstacle>(ccw).is_err());
    }
}
