use crate::body::Registry;
use clap::ValueEnum;
use std::time::{Duration, Instant};

/// Self-rotation per tick of a planet at speed 1.0
pub const PLANET_ROTATION_RATE: f64 = 0.005;
/// Self-rotation per tick of the sun
pub const SUN_ROTATION_RATE: f64 = 0.001;
/// Numerator of the inverse orbit-radius rule
pub const ORBIT_CONSTANT: f64 = 0.5;
/// Extra scale applied to every orbital step
pub const ORBIT_SCALE: f64 = 0.5;
/// Refresh rate the per-tick constants are tuned for
pub const REFERENCE_FRAME_RATE: f64 = 60.0;

/// How a tick's increments relate to wall-clock time
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TimeStep {
    /// Fixed increments per tick; speed follows the refresh rate
    Frame,
    /// Increments scaled by the measured frame time, relative to 60 Hz
    Delta,
}

/// Running/paused state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
}

/// Monotonic wall-clock timer
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    start: Instant,
    last: Instant,
}

impl Clock {
    pub fn start() -> Self {
        let now = Instant::now();
        Clock {
            start: now,
            last: now,
        }
    }

    /// Time since the previous lap (or since start for the first one)
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now.duration_since(self.last);
        self.last = now;
        delta
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Self-rotation increment of a planet for one tick
pub fn self_rotation_step(speed: f64) -> f64 {
    PLANET_ROTATION_RATE * speed
}

/// Orbital increment of a planet for one tick. Larger orbits advance more slowly.
pub fn orbit_step(orbit_radius: f64, speed: f64) -> f64 {
    (ORBIT_CONSTANT / orbit_radius) * speed * ORBIT_SCALE
}

/// Drives the per-tick angle updates of every body
#[derive(Clone, Debug)]
pub struct Animator {
    state: RunState,
    time_step: TimeStep,
    /// Accumulated frame time, advanced on every tick including paused ones
    elapsed: Duration,
    /// Number of ticks processed so far
    ticks: u64,
}

impl Animator {
    pub fn new(time_step: TimeStep) -> Self {
        Animator {
            state: RunState::Running,
            time_step,
            elapsed: Duration::ZERO,
            ticks: 0,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    pub fn time_step(&self) -> TimeStep {
        self.time_step
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Flips between running and paused, returning whether the animation is now paused
    pub fn toggle_pause(&mut self) -> bool {
        self.state = match self.state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
        };
        log::info!("animation {:?}", self.state);
        self.is_paused()
    }

    fn scale(&self, dt: Duration) -> f64 {
        match self.time_step {
            TimeStep::Frame => 1.0,
            TimeStep::Delta => dt.as_secs_f64() * REFERENCE_FRAME_RATE,
        }
    }

    /// Processes one tick: records the frame time, then advances every body unless paused
    pub fn advance(&mut self, registry: &mut Registry, dt: Duration) {
        self.elapsed += dt;
        self.ticks += 1;

        if self.is_paused() {
            return;
        }

        let scale = self.scale(dt);
        registry.sun_mut().rotation += SUN_ROTATION_RATE * scale;

        for body in registry.iter_mut() {
            let self_delta = self_rotation_step(body.speed()) * scale;
            let orbit_delta = orbit_step(body.orbit_radius(), body.speed()) * scale;

            // Skip the body rather than poison its transforms
            if !(self_delta.is_finite() && orbit_delta.is_finite()) {
                log::warn!("skipping {}: non-finite rotation step", body.name());
                continue;
            }
            body.rotate(self_delta, orbit_delta);
        }
    }
}
