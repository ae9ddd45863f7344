//! Sweep Ball demo driver
//!
//! Plays a handful of volleys on a fixed board with no renderer attached and
//! logs what happened. Pass a JSON config path as the first argument to
//! override the defaults. Set `RUST_LOG=debug` to see every contact.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::f32::consts::PI;

    use anyhow::{Context, Result};
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use sweep_ball::SimConfig;
    use sweep_ball::consts::SIM_DT;
    use sweep_ball::sim::{BallId, EdgePolygon, GameEvent, PickupCircle, World, tick};

    const VOLLEYS: u32 = 5;
    const LAUNCH_INTERVAL: f32 = 0.25;
    const LAUNCH_SPEED: f32 = 10.0;
    /// Lowest launch angle above the horizon, radians
    const MIN_LAUNCH_ANGLE: f32 = 0.35;
    const MAX_TICKS_PER_VOLLEY: u32 = 60 * 600;
    const BRICK_HP: u32 = 3;
    const SEED: u64 = 0x5eed_ba11;

    /// Counters for one volley
    #[derive(Debug, Default)]
    struct VolleyStats {
        settled: usize,
        hits: usize,
        destroyed: usize,
        pickups: usize,
        first_settle: Option<Vec2>,
    }

    /// Clockwise outline for brick template `kind` in the cell whose top-left
    /// corner is `(col, top)`
    fn brick_outline(kind: usize, col: f32, top: f32) -> Vec<Vec2> {
        let (l, r, t, b) = (col, col + 1.0, top, top - 1.0);
        match kind {
            0 => vec![Vec2::new(l, t), Vec2::new(r, t), Vec2::new(r, b), Vec2::new(l, b)],
            1 => vec![Vec2::new(l, t), Vec2::new(r, b), Vec2::new(l, b)],
            2 => vec![Vec2::new(r, t), Vec2::new(r, b), Vec2::new(l, b)],
            3 => vec![Vec2::new(l, t), Vec2::new(r, t), Vec2::new(l, b)],
            4 => vec![Vec2::new(l, t), Vec2::new(r, t), Vec2::new(r, b)],
            5 => vec![
                Vec2::new(l, t),
                Vec2::new(r + 1.0, t),
                Vec2::new(r + 1.0, b),
                Vec2::new(l, b),
            ],
            _ => vec![
                Vec2::new(l, t - 0.5),
                Vec2::new(r, t),
                Vec2::new(r + 1.0, t - 0.5),
                Vec2::new(r, b),
            ],
        }
    }

    /// Lay out three rows of bricks and pickups below the top wall
    fn build_board(world: &mut World) -> Result<()> {
        let arena = world.config().arena;
        let solver = world.config().solver;
        let columns = (arena.max.x - arena.min.x) as usize;

        for row in 0..3usize {
            let top = arena.max.y - 1.0 - row as f32 * 1.5;
            let mut col = 0;
            while col < columns {
                let x = arena.min.x + col as f32;
                let kind = (row * 3 + col) % 9;
                let width = if kind == 5 || kind == 6 { 2 } else { 1 };
                if col + width > columns {
                    break;
                }
                match kind {
                    0..=6 => {
                        let outline = brick_outline(kind, x, top);
                        let brick = EdgePolygon::with_solver(outline, BRICK_HP, &solver)
                            .with_context(|| format!("brick template {kind} at column {col}"))?;
                        world.insert_obstacle(brick);
                    }
                    7 => {
                        let pickup = PickupCircle::new(Vec2::new(x + 0.5, top - 0.5), 0.3)?;
                        world.insert_obstacle(pickup);
                    }
                    _ => {}
                }
                col += width;
            }
        }
        log::info!("Board ready with {} obstacles", world.obstacles().len());
        Ok(())
    }

    /// Launch `shooters` one after another and tick until every one settles
    fn play_volley(
        world: &mut World,
        shooters: &[BallId],
        launch: Vec2,
        velocity: Vec2,
        spawned: &mut Vec<BallId>,
    ) -> Result<VolleyStats> {
        let mut stats = VolleyStats::default();
        let mut events: Vec<GameEvent> = Vec::new();
        let mut next = 0;
        let mut since_launch = LAUNCH_INTERVAL;

        for _ in 0..MAX_TICKS_PER_VOLLEY {
            if next < shooters.len() {
                since_launch += SIM_DT;
                if since_launch >= LAUNCH_INTERVAL {
                    world.activate(shooters[next], velocity, Some(launch))?;
                    next += 1;
                    since_launch = 0.0;
                }
            }

            tick(world, SIM_DT, &mut events);

            for event in events.drain(..) {
                match event {
                    GameEvent::BallSettled { position, .. } => {
                        stats.settled += 1;
                        stats.first_settle.get_or_insert(position);
                    }
                    GameEvent::ObstacleHit { .. } => stats.hits += 1,
                    GameEvent::ObstacleDestroyed { .. } => {
                        stats.hits += 1;
                        stats.destroyed += 1;
                    }
                    GameEvent::PickupConsumed { .. } => {
                        stats.pickups += 1;
                        spawned.push(world.spawn_ball(launch));
                    }
                }
            }

            if next == shooters.len() && world.moving_count() == 0 {
                return Ok(stats);
            }
        }

        log::warn!(
            "Volley did not finish within {MAX_TICKS_PER_VOLLEY} ticks, recalling {} balls",
            world.moving_count()
        );
        world.reset_all();
        Ok(stats)
    }

    pub fn run() -> Result<()> {
        env_logger::init();

        let config = match std::env::args().nth(1) {
            Some(path) => SimConfig::load(&path)
                .with_context(|| format!("failed to load config from {path}"))?,
            None => SimConfig::default(),
        };
        let mut world = World::new(config)?;
        build_board(&mut world)?;

        let mut rng = Pcg32::seed_from_u64(SEED);
        let mut launch = world.config().ball.reset_position;
        let mut balls = vec![world.spawn_ball(launch)];

        for volley in 1..=VOLLEYS {
            let angle = rng.random_range(MIN_LAUNCH_ANGLE..(PI - MIN_LAUNCH_ANGLE));
            let velocity = Vec2::from_angle(angle) * LAUNCH_SPEED;
            let mut spawned = Vec::new();

            let stats = play_volley(&mut world, &balls, launch, velocity, &mut spawned)?;

            if let Some(position) = stats.first_settle {
                launch = position;
            }
            balls.extend(spawned);
            for &id in &balls {
                world.reset(id, Some(launch))?;
            }
            world.shift_obstacles(1.0);

            log::info!(
                "Volley {volley}: angle {angle:.2} rad, {} settled, {} hits, {} destroyed, {} pickups, {} balls, {} obstacles left",
                stats.settled,
                stats.hits,
                stats.destroyed,
                stats.pickups,
                balls.len(),
                world.obstacles().len()
            );
        }

        println!(
            "Played {VOLLEYS} volleys: {} balls, {} obstacles remaining",
            balls.len(),
            world.obstacles().len()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    demo::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the product on wasm; there is no demo driver
}
