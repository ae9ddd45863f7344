//! Time-of-impact solvers
//!
//! The hard part of the board: a ball moving at constant velocity is swept
//! against a segment, a circle, or a whole polygon, and the solver returns the
//! earliest time the surfaces touch along with the post-impact state. Pure
//! functions; no solver ever divides by a near-zero quantity. Degenerate input
//! is reported as "no contact".

use glam::Vec2;

use super::geom::{cross, earliest_positive_root, reflect};
use crate::config::SolverConfig;

/// A circle moving at constant velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mover {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Mover {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self { pos, vel, radius }
    }

    /// Position after travelling for `time`
    #[inline]
    pub fn at(&self, time: f32) -> Vec2 {
        self.pos + self.vel * time
    }
}

/// Which part of the target produced a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Interior of an edge (line-intersection path)
    Face,
    /// An edge endpoint (quadratic path, backed off)
    Vertex,
    /// A circular target
    Circle,
}

/// Earliest contact found by a sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Time of impact, measured from the mover's current position
    pub time: f32,
    /// Where the mover's center ends up at impact
    pub position: Vec2,
    /// Velocity after the impact
    pub velocity: Vec2,
    pub feature: Feature,
}

/// Sweep a ball against the segment `start..end`.
///
/// `normal` is the unit outward normal of the face. Only the face side is
/// solid: a ball moving away from or parallel to the face never collides.
/// Interior hits reflect about `normal`; endpoint hits land `solver.backoff`
/// time units short of tangency and reflect about the endpoint-to-ball line.
pub fn sweep_segment(
    mover: &Mover,
    start: Vec2,
    end: Vec2,
    normal: Vec2,
    solver: &SolverConfig,
) -> Option<Contact> {
    let Mover { pos, vel, radius } = *mover;
    if vel.dot(normal) >= -solver.epsilon {
        return None;
    }

    // Collision line: the face pushed out by the ball radius
    let line = end - start;
    let offset = normal * radius;
    let near_start = start + offset;
    let near_end = end + offset;

    if cross(vel, near_start - pos) * cross(vel, near_end - pos) <= 0.0 {
        // |denom| is |line| times the approach speed along the normal
        let denom = cross(vel, line);
        if denom.abs() <= solver.epsilon * line.length() {
            return None;
        }
        let time = cross(near_start - pos, line) / denom;
        if time < 0.0 {
            // Already past the collision line; the endpoints are out of reach too
            return None;
        }
        return Some(Contact {
            time,
            position: mover.at(time),
            velocity: reflect(vel, normal),
            feature: Feature::Face,
        });
    }

    let mut best: Option<(f32, Vec2)> = None;
    for vertex in [start, end] {
        if (vertex - pos).dot(vel) <= 0.0 {
            continue;
        }
        if let Some(time) = sweep_point(mover, vertex, radius, solver)
            && best.is_none_or(|(best_time, _)| time < best_time)
        {
            best = Some((time, vertex));
        }
    }
    let (time, vertex) = best?;
    if time >= solver.max_time {
        return None;
    }

    let position = mover.at((time - solver.backoff).max(0.0));
    let mut bounce_normal = position - vertex;
    if bounce_normal.length_squared() <= solver.epsilon * solver.epsilon {
        // Zero-radius ball with no backoff sits on the vertex itself
        bounce_normal = normal;
    }
    Some(Contact {
        time,
        position,
        velocity: reflect(vel, bounce_normal),
        feature: Feature::Vertex,
    })
}

/// Earliest positive time at which the mover's center is `reach` away from `point`
pub fn sweep_point(mover: &Mover, point: Vec2, reach: f32, solver: &SolverConfig) -> Option<f32> {
    let d = mover.pos - point;
    earliest_positive_root(
        mover.vel.length_squared(),
        mover.vel.dot(d),
        d.length_squared() - reach * reach,
        solver.fast_sqrt,
    )
}

/// Sweep a ball against a static circle.
///
/// A `trigger` circle reports the contact but leaves the velocity unchanged.
pub fn sweep_circle(
    mover: &Mover,
    center: Vec2,
    radius: f32,
    trigger: bool,
    solver: &SolverConfig,
) -> Option<Contact> {
    let time = sweep_point(mover, center, mover.radius + radius, solver)?;
    if time >= solver.max_time {
        return None;
    }
    let position = mover.at(time);
    let velocity = if trigger {
        mover.vel
    } else {
        reflect(mover.vel, position - center)
    };
    Some(Contact {
        time,
        position,
        velocity,
        feature: Feature::Circle,
    })
}

/// Sweep a ball against every edge of a polygon ring.
///
/// `normals[i]` belongs to the edge `vertices[i] -> vertices[i + 1]`. Only
/// strictly positive times count; on an exact tie the edge evaluated first wins.
pub fn sweep_polygon(
    mover: &Mover,
    vertices: &[Vec2],
    normals: &[Vec2],
    solver: &SolverConfig,
) -> Option<Contact> {
    let count = vertices.len();
    let mut best: Option<Contact> = None;
    let mut best_time = solver.max_time;

    for (i, &normal) in normals.iter().enumerate().take(count) {
        let start = vertices[i];
        let end = vertices[(i + 1) % count];
        if let Some(contact) = sweep_segment(mover, start, end, normal, solver)
            && contact.time > 0.0
            && contact.time < best_time
        {
            best_time = contact.time;
            best = Some(contact);
        }
    }
    best
}
