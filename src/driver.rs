// Frame driver: owns an effect's emitters and surface and moves them through
// Idle -> Running -> Disposed. The host feeds it frames, timer fires and
// input, every entry point is a no-op unless the driver is running.

use crate::config::{EffectConfig, EmitterConfig, PointerGlow, SpawnPolicy};
use crate::random::RandomSource;
use crate::renderer::{Renderer, Surface};
use crate::schedule::SpawnTimer;
use crate::spawner::{SpawnTrigger, Spawner};
use crate::stepper::Stepper;
use crate::store::ParticleStore;
use crate::Bounds;
use std::convert::Infallible;
use vecmath::Vector2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Disposed,
}

pub struct Emitter {
    config: EmitterConfig,
    store: ParticleStore,
    spawner: Spawner,
    stepper: Stepper,
    timer: SpawnTimer,
}

impl Emitter {
    pub fn new(config: EmitterConfig) -> Emitter {
        Emitter {
            store: ParticleStore::new(config.cap, config.cap_policy),
            spawner: Spawner::new(),
            stepper: Stepper::default(),
            timer: SpawnTimer::new(),
            config,
        }
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.store
    }

    pub fn timer(&self) -> &SpawnTimer {
        &self.timer
    }

    fn populate(&mut self, now: f64, bounds: Bounds, rng: &mut dyn RandomSource) -> usize {
        self.store.clear();
        self.stepper.reset();
        self.spawner
            .burst(now, &self.config, &mut self.store, bounds, rng)
    }

    fn arm_first(&mut self, now: f64, rng: &mut dyn RandomSource) {
        if let SpawnPolicy::Interval {
            delay_ms,
            first_delay_ms,
        } = self.config.spawn
        {
            let delay = first_delay_ms.unwrap_or_else(|| delay_ms.sample(rng));
            self.timer.arm(now, delay);
        }
    }
}

pub struct FrameDriver<S: Surface> {
    state: DriverState,
    surface: Option<S>,
    bounds: Bounds,
    emitters: Vec<Emitter>,
    pointer_glow: Option<PointerGlow>,
    pointer: Option<Vector2<f64>>,
    renderer: Renderer,
    rng: Box<dyn RandomSource>,
    last_frame: Option<f64>,
}

impl<S: Surface> FrameDriver<S> {
    // Longest step a single frame may take, keeps a backgrounded tab from
    // teleporting everything when it comes back
    const MAX_FRAME_SECONDS: f64 = 0.1;
    const FIRST_FRAME_SECONDS: f64 = 1.0 / 60.0;

    pub fn new(config: EffectConfig, rng: Box<dyn RandomSource>) -> FrameDriver<S> {
        FrameDriver {
            state: DriverState::Idle,
            surface: None,
            bounds: Bounds::new(0.0, 0.0),
            emitters: config.emitters.into_iter().map(Emitter::new).collect(),
            pointer_glow: config.pointer_glow,
            pointer: None,
            renderer: Renderer::new(),
            rng,
            last_frame: None,
        }
    }

    // Starts the effect on `surface`. Without a surface nothing happens and
    // the driver stays idle. Returns whether the driver is now running.
    pub fn start(&mut self, surface: Option<S>, bounds: Bounds, now: f64) -> bool {
        match self.start_with(surface, bounds, now, |_| Ok::<(), Infallible>(())) {
            Ok(running) => running,
            Err(never) => match never {},
        }
    }

    // Starts like `start`, then runs `attach` to hook the running driver up to
    // its host. A failed `attach` disposes the driver and returns the error.
    pub fn start_with<E, F>(
        &mut self,
        surface: Option<S>,
        bounds: Bounds,
        now: f64,
        attach: F,
    ) -> Result<bool, E>
    where
        F: FnOnce(&Self) -> Result<(), E>,
    {
        if self.state != DriverState::Idle {
            return Ok(self.state == DriverState::Running);
        }
        if !self.enter_running(surface, bounds, now) {
            return Ok(false);
        }
        if let Err(err) = attach(self) {
            self.dispose();
            return Err(err);
        }
        Ok(true)
    }

    fn enter_running(&mut self, surface: Option<S>, bounds: Bounds, now: f64) -> bool {
        let surface = match surface {
            Some(surface) => surface,
            None => return false,
        };
        self.surface = Some(surface);
        self.bounds = bounds;
        self.state = DriverState::Running;

        let rng = &mut *self.rng;
        for emitter in self.emitters.iter_mut() {
            emitter.populate(now, bounds, rng);
            emitter.arm_first(now, rng);
        }
        true
    }

    // One display tick: step every emitter, then draw. Returns whether a
    // frame was drawn.
    pub fn frame(&mut self, now: f64) -> Result<bool, S::Error> {
        if self.state != DriverState::Running {
            return Ok(false);
        }
        let surface = match self.surface.as_mut() {
            Some(surface) => surface,
            None => return Ok(false),
        };

        let dt = match self.last_frame {
            Some(last) => ((now - last) / 1000.0)
                .max(0.0)
                .min(Self::MAX_FRAME_SECONDS),
            None => Self::FIRST_FRAME_SECONDS,
        };
        self.last_frame = Some(now);

        let bounds = self.bounds;
        for emitter in self.emitters.iter_mut() {
            emitter
                .stepper
                .step(&mut emitter.store, &emitter.config, dt, now, bounds);
        }

        self.renderer.clear_screen(surface, bounds)?;
        for emitter in self.emitters.iter() {
            self.renderer
                .render_particles(surface, &emitter.store, &emitter.config.palette)?;
        }
        if let (Some(glow), Some(pointer)) = (self.pointer_glow.as_ref(), self.pointer) {
            self.renderer.render_pointer_glow(surface, pointer, glow)?;
        }
        Ok(true)
    }

    // A spawn timeout went off. Spawns for every emitter whose deadline has
    // passed, re-arms them and returns the delay until the next deadline.
    pub fn timer_fired(&mut self, now: f64) -> Option<f64> {
        if self.state != DriverState::Running {
            return None;
        }
        let bounds = self.bounds;
        let rng = &mut *self.rng;
        for emitter in self.emitters.iter_mut() {
            let delay_ms = match emitter.config.spawn {
                SpawnPolicy::Interval { delay_ms, .. } => delay_ms,
                _ => continue,
            };
            if emitter.timer.fire(now) {
                emitter.spawner.spawn(
                    SpawnTrigger::Timer,
                    now,
                    &emitter.config,
                    &mut emitter.store,
                    bounds,
                    rng,
                );
                emitter.timer.arm(now, delay_ms.sample(rng));
            }
        }
        self.next_timer_delay(now)
    }

    // Delay until the earliest armed spawn deadline
    pub fn next_timer_delay(&self, now: f64) -> Option<f64> {
        if self.state != DriverState::Running {
            return None;
        }
        self.emitters
            .iter()
            .filter_map(|e| e.timer.remaining(now))
            .fold(None, |earliest: Option<f64>, d| match earliest {
                Some(e) if e <= d => Some(e),
                _ => Some(d),
            })
    }

    // Pointer moved to (x, y) in surface coordinates. Returns how many
    // particles were spawned.
    pub fn pointer_moved(&mut self, x: f64, y: f64, now: f64) -> usize {
        if self.state != DriverState::Running {
            return 0;
        }
        self.pointer = Some([x, y]);
        let bounds = self.bounds;
        let rng = &mut *self.rng;
        let mut spawned = 0;
        for emitter in self.emitters.iter_mut() {
            if let SpawnPolicy::Pointer { .. } = emitter.config.spawn {
                let trigger = SpawnTrigger::Pointer { x, y };
                if emitter.spawner.spawn(
                    trigger,
                    now,
                    &emitter.config,
                    &mut emitter.store,
                    bounds,
                    rng,
                ) {
                    spawned += 1;
                }
            }
        }
        spawned
    }

    pub fn pointer_left(&mut self) {
        if self.state == DriverState::Running {
            self.pointer = None;
        }
    }

    // Surface changed size. Burst emitters are repopulated for the new area,
    // the others keep their particles.
    pub fn resize(&mut self, bounds: Bounds, now: f64) {
        if self.state != DriverState::Running {
            return;
        }
        self.bounds = bounds;
        let rng = &mut *self.rng;
        for emitter in self.emitters.iter_mut() {
            if let SpawnPolicy::Burst { .. } = emitter.config.spawn {
                emitter.populate(now, bounds, rng);
            }
        }
    }

    // Stops the effect for good. Pending spawn deadlines are dropped and
    // every later call is ignored.
    pub fn dispose(&mut self) {
        if self.state == DriverState::Disposed {
            return;
        }
        self.state = DriverState::Disposed;
        for emitter in self.emitters.iter_mut() {
            emitter.timer.cancel();
            emitter.spawner.reset();
        }
        self.pointer = None;
        self.last_frame = None;
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn pointer(&self) -> Option<Vector2<f64>> {
        self.pointer
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    pub fn particle_count(&self) -> usize {
        self.emitters.iter().map(|e| e.store.len()).sum()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.renderer.frames_drawn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;
    use crate::renderer::testing::{DrawCall, RecordingSurface};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BOUNDS: Bounds = Bounds {
        width: 800.0,
        height: 600.0,
    };

    fn driver(config: EffectConfig, seed: u64) -> FrameDriver<RecordingSurface> {
        FrameDriver::new(config, Box::new(StdRng::seed_from_u64(seed)))
    }

    fn running(config: EffectConfig, seed: u64) -> FrameDriver<RecordingSurface> {
        let mut d = driver(config, seed);
        assert!(d.start(Some(RecordingSurface::default()), BOUNDS, 0.0));
        d
    }

    fn snapshot(d: &FrameDriver<RecordingSurface>) -> Vec<Vec<Particle>> {
        d.emitters()
            .iter()
            .map(|e| e.particles().iter().copied().collect())
            .collect()
    }

    fn calls(d: &FrameDriver<RecordingSurface>) -> usize {
        d.surface().map(|s| s.calls.len()).unwrap_or(0)
    }

    #[test]
    fn missing_surface_is_a_silent_noop() {
        let mut d = driver(EffectConfig::space_background(), 1);
        assert!(!d.start(None, BOUNDS, 0.0));
        assert_eq!(d.state(), DriverState::Idle);
        assert_eq!(d.particle_count(), 0);
        assert_eq!(d.next_timer_delay(0.0), None);
        assert_eq!(d.frame(16.0), Ok(false));
        assert_eq!(d.timer_fired(5000.0), None);
        assert_eq!(d.pointer_moved(10.0, 10.0, 0.0), 0);
        assert_eq!(d.particle_count(), 0);
    }

    #[test]
    fn dust_starts_with_a_burst_and_draws_each_frame() {
        let mut d = running(EffectConfig::cosmic_dust(), 2);
        let count = d.particle_count();
        assert!(count >= 40 && count < 60);
        assert_eq!(d.next_timer_delay(0.0), None);

        assert_eq!(d.frame(16.0), Ok(true));
        let surface = d.surface().unwrap();
        assert!(matches!(surface.calls[0], DrawCall::Clear(_)));
        assert_eq!(surface.calls.len(), 1 + 2 * count);
        assert_eq!(d.frames_drawn(), 1);
    }

    #[test]
    fn start_twice_does_not_repopulate() {
        let mut d = running(EffectConfig::cosmic_dust(), 3);
        let before = snapshot(&d);
        assert!(d.start(Some(RecordingSurface::default()), BOUNDS, 100.0));
        assert_eq!(snapshot(&d), before);
    }

    #[test]
    fn space_background_meteor_schedule() {
        let mut d = running(EffectConfig::space_background(), 4);
        assert_eq!(d.emitters()[0].particles().len(), 200);
        assert_eq!(d.next_timer_delay(0.0), Some(2000.0));

        // Early fire is ignored and reports the time still left
        assert_eq!(d.timer_fired(1500.0), Some(500.0));
        assert!(d.emitters()[1].particles().is_empty());

        let next = d.timer_fired(2000.0).unwrap();
        assert_eq!(d.emitters()[1].particles().len(), 1);
        assert!(next >= 8000.0 && next < 15_000.0, "next meteor in {}", next);
    }

    #[test]
    fn shooting_star_interval_window() {
        let mut d = running(EffectConfig::shooting_star(), 5);
        let first = d.next_timer_delay(0.0).unwrap();
        assert!(first >= 12_000.0 && first < 18_000.0);
        let next = d.timer_fired(first).unwrap();
        assert!(next >= 12_000.0 && next < 18_000.0);
        assert_eq!(d.particle_count(), 1);

        // A second star replaces the first one
        let later = first + next;
        d.timer_fired(later);
        assert_eq!(d.particle_count(), 1);
        let star = d.emitters()[0].particles().iter().next().copied().unwrap();
        assert_eq!(star.created_at, later);
    }

    #[test]
    fn trail_follows_pointer_and_expires() {
        let mut d = running(EffectConfig::cursor_trail(), 6);
        assert_eq!(d.particle_count(), 0);
        let mut spawned = 0;
        for i in 0..10 {
            spawned += d.pointer_moved(300.0 + i as f64, 200.0, i as f64 * 10.0);
        }
        // 10ms apart with a 30ms throttle: 0, 30, 60, 90
        assert_eq!(spawned, 4);
        assert_eq!(d.particle_count(), 4);

        let mut now = 100.0;
        while now < 1000.0 {
            d.frame(now).unwrap();
            now += 16.0;
        }
        assert_eq!(d.particle_count(), 0);
    }

    #[test]
    fn trail_is_capped_at_fifty() {
        let mut d = running(EffectConfig::cursor_trail(), 7);
        for i in 0..80 {
            d.pointer_moved(400.0, 300.0, i as f64 * 30.0);
            assert!(d.particle_count() <= 50);
        }
        assert_eq!(d.particle_count(), 50);
    }

    #[test]
    fn pointer_glow_hides_after_leave() {
        let mut d = running(EffectConfig::space_background(), 8);
        d.pointer_moved(100.0, 100.0, 0.0);
        d.frame(16.0).unwrap();
        let glows_at_pointer = |d: &FrameDriver<RecordingSurface>| {
            d.surface()
                .unwrap()
                .calls
                .iter()
                .filter(|c| match c {
                    DrawCall::Glow { center, radius, .. } => *center == [100.0, 100.0] && *radius == 400.0,
                    _ => false,
                })
                .count()
        };
        assert_eq!(glows_at_pointer(&d), 1);

        d.pointer_left();
        assert_eq!(d.pointer(), None);
        d.frame(32.0).unwrap();
        assert_eq!(glows_at_pointer(&d), 1);
    }

    #[test]
    fn resize_refills_burst_emitters_only() {
        let mut dust = running(EffectConfig::cosmic_dust(), 9);
        let small = Bounds::new(100.0, 80.0);
        dust.resize(small, 500.0);
        assert!(dust.particle_count() >= 40);
        assert_eq!(dust.bounds(), small);
        for p in dust.emitters()[0].particles() {
            assert!(p.pos[0] < 100.0 && p.pos[1] < 80.0);
            assert_eq!(p.created_at, 500.0);
        }

        let mut trail = running(EffectConfig::cursor_trail(), 10);
        trail.pointer_moved(50.0, 50.0, 0.0);
        let before = snapshot(&trail);
        trail.resize(small, 10.0);
        assert_eq!(snapshot(&trail), before);
    }

    #[test]
    fn dispose_stops_everything() {
        let mut d = running(EffectConfig::space_background(), 11);
        d.pointer_moved(10.0, 10.0, 0.0);
        d.frame(16.0).unwrap();
        d.dispose();
        assert_eq!(d.state(), DriverState::Disposed);
        assert_eq!(d.next_timer_delay(16.0), None);

        let particles = snapshot(&d);
        let drawn = calls(&d);
        let frames = d.frames_drawn();

        assert_eq!(d.frame(32.0), Ok(false));
        assert_eq!(d.timer_fired(2000.0), None);
        assert_eq!(d.timer_fired(60_000.0), None);
        assert_eq!(d.pointer_moved(20.0, 20.0, 100.0), 0);
        d.pointer_left();
        d.resize(Bounds::new(10.0, 10.0), 200.0);
        assert!(!d.start(Some(RecordingSurface::default()), BOUNDS, 300.0));

        assert_eq!(snapshot(&d), particles);
        assert_eq!(calls(&d), drawn);
        assert_eq!(d.frames_drawn(), frames);
        assert_eq!(d.bounds(), BOUNDS);
        assert!(d.emitters().iter().all(|e| !e.timer().is_armed()));
    }

    #[test]
    fn attach_sees_the_running_driver() {
        let mut d = driver(EffectConfig::space_background(), 13);
        let mut first_delay = None;
        let started = d.start_with(Some(RecordingSurface::default()), BOUNDS, 0.0, |d| {
            assert!(d.is_running());
            first_delay = d.next_timer_delay(0.0);
            Ok::<(), &str>(())
        });
        assert_eq!(started, Ok(true));
        assert_eq!(first_delay, Some(2000.0));
    }

    #[test]
    fn failed_attach_disposes() {
        let mut d = driver(EffectConfig::space_background(), 14);
        let started = d.start_with(Some(RecordingSurface::default()), BOUNDS, 0.0, |_| Err("no frames"));
        assert_eq!(started, Err("no frames"));
        assert_eq!(d.state(), DriverState::Disposed);
        assert!(!d.is_running());
        assert_eq!(d.next_timer_delay(0.0), None);
        assert!(d.emitters().iter().all(|e| !e.timer().is_armed()));

        // Retrying does not pretend to run
        let retried = d.start_with(Some(RecordingSurface::default()), BOUNDS, 10.0, |_| Ok::<(), &str>(()));
        assert_eq!(retried, Ok(false));
        assert_eq!(d.frame(16.0), Ok(false));
    }

    #[test]
    fn attach_skipped_without_surface() {
        let mut d = driver(EffectConfig::cosmic_dust(), 15);
        let mut attached = false;
        let started = d.start_with(None, BOUNDS, 0.0, |_| {
            attached = true;
            Ok::<(), &str>(())
        });
        assert_eq!(started, Ok(false));
        assert!(!attached);
        assert_eq!(d.state(), DriverState::Idle);
    }

    #[test]
    fn repopulating_restarts_the_clock() {
        let mut d = running(EffectConfig::cosmic_dust(), 16);
        d.frame(0.0).unwrap();
        d.frame(50.0).unwrap();
        assert!(d.emitters[0].stepper.clock() > 0.0);
        d.resize(Bounds::new(400.0, 300.0), 60.0);
        assert_eq!(d.emitters[0].stepper.clock(), 0.0);
    }

    #[test]
    fn long_pause_is_clamped_to_one_step() {
        let mut config = EmitterConfig::cosmic_dust();
        config.noise_strength = 0.0;
        let mut d = running(EffectConfig::single(config), 12);
        d.frame(0.0).unwrap();
        let before = snapshot(&d);
        d.frame(60_000.0).unwrap();
        let after = snapshot(&d);
        for (a, b) in before[0].iter().zip(after[0].iter()) {
            // 6 px/s at most, over at most 0.1s
            assert!((a.pos[0] - b.pos[0]).abs() <= 0.6 + 1e-9 || (a.pos[0] - b.pos[0]).abs() > 700.0);
        }
    }

    #[test]
    fn same_seed_same_run() {
        let run = |seed| {
            let mut d = running(EffectConfig::space_background(), seed);
            for i in 0..120 {
                let now = i as f64 * 16.0;
                d.pointer_moved(i as f64, 2.0 * i as f64, now);
                d.timer_fired(now);
                d.frame(now).unwrap();
            }
            snapshot(&d)
        };
        assert_eq!(run(13), run(13));
    }
}
