use crate::config::AnimationConfig;
use rand::Rng;
use ratatui::style::Color;
use std::f64::consts::TAU;

const WAVE_SPEEDS: [f64; 3] = [0.05, 0.03, 0.07];
const WAVE_AMPLITUDES: [f64; 3] = [8.0, 5.0, 11.0];
const WAVE_COLORS: [Color; 3] = [
    Color::Rgb(0x61, 0xda, 0xfb),
    Color::Rgb(0xa7, 0x8b, 0xfa),
    Color::Rgb(0x34, 0xd3, 0x99),
];
const PARTICLE_PALETTE: [Color; 4] = [
    Color::Rgb(0x60, 0xa5, 0xfa),
    Color::Rgb(0xf4, 0x72, 0xb6),
    Color::Rgb(0xfb, 0xbf, 0x24),
    Color::Rgb(0xe5, 0xe7, 0xeb),
];
const PARTICLE_SPEED: f64 = 0.5;
const PARTICLE_RADIUS: (f64, f64) = (1.0, 3.0);
/// Segments used to flatten each smoothing curve between two samples.
const CURVE_STEPS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Uninitialized,
    Running,
    Disposed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub color: Color,
}

impl Particle {
    /// Advance one frame, wrapping to the opposite edge on either axis.
    fn step(&mut self, width: f64, height: f64) {
        self.x += self.vx;
        self.y += self.vy;

        if self.x < 0.0 {
            self.x = width;
        } else if self.x > width {
            self.x = 0.0;
        }
        if self.y < 0.0 {
            self.y = height;
        } else if self.y > height {
            self.y = 0.0;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    pub speed: f64,
    pub amplitude: f64,
    pub color: Color,
    pub phase: f64,
    /// Flattened smoothed path, recomputed every frame.
    pub path: Vec<(f64, f64)>,
}

impl Wave {
    fn step(&mut self, width: f64, height: f64, samples: usize) {
        self.phase += self.speed;
        let baseline = height / 2.0;
        let spacing = width / (samples.max(2) - 1) as f64;

        let points: Vec<(f64, f64)> = (0..samples.max(2))
            .map(|i| {
                let y = baseline + self.amplitude * (i as f64 / 10.0 + self.phase).sin();
                (i as f64 * spacing, y)
            })
            .collect();

        self.path = smooth(&points);
    }
}

/// Quadratic smoothing through `points`: each sample acts as the control
/// point of a curve ending at the midpoint to the next sample.
pub fn smooth(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut path = vec![points[0]];
    let mut start = points[0];
    for window in points[1..].windows(2) {
        let (control, next) = (window[0], window[1]);
        let end = ((control.0 + next.0) / 2.0, (control.1 + next.1) / 2.0);
        for step in 1..=CURVE_STEPS {
            let t = step as f64 / CURVE_STEPS as f64;
            let u = 1.0 - t;
            path.push((
                u * u * start.0 + 2.0 * u * t * control.0 + t * t * end.0,
                u * u * start.1 + 2.0 * u * t * control.1 + t * t * end.1,
            ));
        }
        start = end;
    }
    if let Some(last) = points.last() {
        path.push(*last);
    }
    path
}

/// The decorative wave/particle panel.
///
/// Lifecycle is `Uninitialized -> Running -> Disposed`. The host starts
/// running the first time it observes a non-empty surface; once disposed it
/// ignores every further frame and resize.
#[derive(Debug, Clone)]
pub struct AnimationHost {
    config: AnimationConfig,
    state: HostState,
    width: f64,
    height: f64,
    frame: u64,
    pub particles: Vec<Particle>,
    pub waves: Vec<Wave>,
}

impl AnimationHost {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            state: HostState::Uninitialized,
            width: 0.0,
            height: 0.0,
            frame: 0,
            particles: Vec::new(),
            waves: Vec::new(),
        }
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn initialize(&mut self, width: f64, height: f64) {
        self.initialize_with(width, height, &mut rand::thread_rng());
    }

    /// Allocates particles and waves for a `width` x `height` surface. An
    /// empty surface leaves the host untouched.
    pub fn initialize_with<R: Rng>(&mut self, width: f64, height: f64, rng: &mut R) {
        if self.state == HostState::Disposed || width <= 0.0 || height <= 0.0 {
            return;
        }

        self.width = width;
        self.height = height;
        self.frame = 0;

        self.particles = (0..self.config.particle_count)
            .map(|_| Particle {
                x: rng.gen_range(0.0..width),
                y: rng.gen_range(0.0..height),
                vx: rng.gen_range(-PARTICLE_SPEED..PARTICLE_SPEED),
                vy: rng.gen_range(-PARTICLE_SPEED..PARTICLE_SPEED),
                radius: rng.gen_range(PARTICLE_RADIUS.0..PARTICLE_RADIUS.1),
                color: PARTICLE_PALETTE[rng.gen_range(0..PARTICLE_PALETTE.len())],
            })
            .collect();

        self.waves = (0..self.config.wave_count)
            .map(|i| Wave {
                speed: WAVE_SPEEDS[i % WAVE_SPEEDS.len()],
                amplitude: WAVE_AMPLITUDES[i % WAVE_AMPLITUDES.len()],
                color: WAVE_COLORS[i % WAVE_COLORS.len()],
                phase: rng.gen_range(0.0..TAU),
                path: Vec::new(),
            })
            .collect();

        self.state = HostState::Running;
        tracing::debug!(
            width,
            height,
            particles = self.particles.len(),
            waves = self.waves.len(),
            "animation running"
        );
    }

    /// Reports the current content size of the drawing surface. Starts the
    /// host on its first non-empty size, otherwise behaves like [`resize`].
    ///
    /// [`resize`]: Self::resize
    pub fn observe_surface(&mut self, width: f64, height: f64) {
        match self.state {
            HostState::Uninitialized => self.initialize(width, height),
            HostState::Running => {
                if (width, height) != (self.width, self.height) {
                    self.resize(width, height);
                }
            }
            HostState::Disposed => {}
        }
    }

    /// Updates the surface dimensions only. Entities keep their positions and
    /// drift back in through the wrap-around.
    pub fn resize(&mut self, width: f64, height: f64) {
        if self.state != HostState::Running || width <= 0.0 || height <= 0.0 {
            return;
        }
        self.width = width;
        self.height = height;
    }

    /// Advances every wave and particle by one frame.
    pub fn tick(&mut self) {
        if self.state != HostState::Running {
            return;
        }

        self.frame = self.frame.wrapping_add(1);
        for wave in &mut self.waves {
            wave.step(self.width, self.height, self.config.sample_points);
        }
        for particle in &mut self.particles {
            particle.step(self.width, self.height);
        }
    }

    pub fn dispose(&mut self) {
        if self.state != HostState::Disposed {
            tracing::debug!(frames = self.frame, "animation disposed");
        }
        self.state = HostState::Disposed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn running_host(width: f64, height: f64) -> AnimationHost {
        let mut host = AnimationHost::new(AnimationConfig::default());
        host.initialize_with(width, height, &mut StdRng::seed_from_u64(7));
        host
    }

    #[test]
    fn test_initialize_allocates_entities() {
        let host = running_host(800.0, 600.0);
        assert_eq!(host.state(), HostState::Running);
        assert_eq!(host.particles.len(), 50);
        assert_eq!(host.waves.len(), 3);

        for p in &host.particles {
            assert!((0.0..800.0).contains(&p.x));
            assert!((0.0..600.0).contains(&p.y));
            assert!((-0.5..0.5).contains(&p.vx));
            assert!((-0.5..0.5).contains(&p.vy));
            assert!((1.0..3.0).contains(&p.radius));
            assert!(PARTICLE_PALETTE.contains(&p.color));
        }
    }

    #[test]
    fn test_wave_parameters_use_modular_indexing() {
        let mut host = AnimationHost::new(AnimationConfig {
            wave_count: 5,
            ..AnimationConfig::default()
        });
        host.initialize_with(100.0, 50.0, &mut StdRng::seed_from_u64(1));

        for (i, wave) in host.waves.iter().enumerate() {
            assert_eq!(wave.speed, WAVE_SPEEDS[i % 3]);
            assert_eq!(wave.amplitude, WAVE_AMPLITUDES[i % 3]);
            assert_eq!(wave.color, WAVE_COLORS[i % 3]);
            assert!((0.0..TAU).contains(&wave.phase));
        }
    }

    #[test]
    fn test_empty_surface_is_a_no_op() {
        let mut host = AnimationHost::new(AnimationConfig::default());
        host.initialize(0.0, 300.0);
        assert_eq!(host.state(), HostState::Uninitialized);
        assert!(host.particles.is_empty());

        host.tick();
        assert_eq!(host.frame(), 0);
    }

    #[test]
    fn test_observe_surface_starts_host() {
        let mut host = AnimationHost::new(AnimationConfig::default());
        host.observe_surface(0.0, 0.0);
        assert_eq!(host.state(), HostState::Uninitialized);
        host.observe_surface(120.0, 40.0);
        assert_eq!(host.state(), HostState::Running);
        assert_eq!(host.size(), (120.0, 40.0));
    }

    #[test]
    fn test_tick_advances_wave_phase_and_path() {
        let mut host = running_host(200.0, 100.0);
        let phase_before = host.waves[0].phase;
        host.tick();

        let wave = &host.waves[0];
        assert!((wave.phase - (phase_before + wave.speed)).abs() < 1e-12);
        assert!(!wave.path.is_empty());

        let (first_x, first_y) = wave.path[0];
        assert_eq!(first_x, 0.0);
        let expected = 50.0 + wave.amplitude * wave.phase.sin();
        assert!((first_y - expected).abs() < 1e-9);

        let (last_x, _) = *wave.path.last().unwrap();
        assert!((last_x - 200.0).abs() < 1e-9);
        for (_, y) in &wave.path {
            assert!((*y - 50.0).abs() <= wave.amplitude + 1e-9);
        }
    }

    #[test]
    fn test_particles_wrap_toroidally() {
        let mut host = running_host(100.0, 100.0);
        host.particles[0] = Particle {
            x: 99.8,
            y: 0.2,
            vx: 0.4,
            vy: -0.4,
            radius: 1.0,
            color: Color::White,
        };
        host.tick();
        assert_eq!(host.particles[0].x, 0.0);
        assert_eq!(host.particles[0].y, 100.0);
    }

    #[test]
    fn test_resize_keeps_entities() {
        let mut host = running_host(800.0, 600.0);
        let before = host.particles.clone();

        host.resize(400.0, 300.0);
        assert_eq!(host.size(), (400.0, 300.0));
        assert_eq!(host.particles, before);
        assert_eq!(host.particles.len(), 50);

        // Out-of-bounds particles are left for the wrap to fix
        for _ in 0..10 {
            host.tick();
        }
        assert_eq!(host.particles.len(), 50);
    }

    #[test]
    fn test_disposed_host_ignores_frames_and_resizes() {
        let mut host = running_host(80.0, 40.0);
        host.tick();
        host.dispose();
        let frame = host.frame();
        let particles = host.particles.clone();

        host.tick();
        host.observe_surface(10.0, 10.0);
        host.initialize(10.0, 10.0);
        assert_eq!(host.state(), HostState::Disposed);
        assert_eq!(host.frame(), frame);
        assert_eq!(host.particles, particles);
        assert_eq!(host.size(), (80.0, 40.0));
    }

    #[test]
    fn test_smooth_passes_through_endpoints() {
        let points = vec![(0.0, 0.0), (1.0, 2.0), (2.0, 0.0), (3.0, 2.0)];
        let path = smooth(&points);
        assert_eq!(path.first(), Some(&(0.0, 0.0)));
        assert_eq!(path.last(), Some(&(3.0, 2.0)));
        assert_eq!(path.len(), 2 + 2 * CURVE_STEPS);
    }
}
