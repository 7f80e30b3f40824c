use crate::render::{Composite, Rgb, Surface};
use fastrand::Rng;
use std::collections::VecDeque;

// Celebration shell colors, warm corals through cool violets
const PALETTE: [Rgb; 15] = [
    (255, 107, 107), (78, 205, 196),  (69, 183, 209),  (249, 202, 36),  (240, 147, 43),
    (235, 77, 75),   (108, 92, 231),  (162, 155, 254), (253, 121, 168), (253, 203, 110),
    (85, 163, 255),  (38, 222, 129),  (252, 66, 123),  (254, 211, 48),  (253, 150, 68),
];

// White-hot core added to every burst
const SPARKLE_COLOR: Rgb = (255, 255, 255);
const SPARKLE_COUNT: usize = 20;

const PARTICLE_TRAIL_CAP: usize = 15;
const ROCKET_TRAIL_CAP: usize = 10;

const LAUNCH_SPEED: f32 = 8.0;
const EXPLODE_RADIUS: f32 = 20.0;
const LIFE_FADE: f32 = 0.98;
const DEAD_LIFE: f32 = 0.01;

// Queued launches fire 200ms apart with up to 300ms of jitter each
const LAUNCH_STAGGER: f32 = 0.2;
const LAUNCH_JITTER: f32 = 0.3;
const FADE_ALPHA: f32 = 0.1;

struct TrailPoint {
    x: f32,
    y: f32,
    opacity: f32,
}

pub struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    color: Rgb,
    gravity: f32,
    decay: f32,
    life: f32,
    opacity: f32,
    trail: VecDeque<TrailPoint>,
}

impl Particle {
    fn new(x: f32, y: f32, vx: f32, vy: f32, color: Rgb, gravity: f32, decay: f32) -> Self {
        Self {
            x,
            y,
            vx,
            vy,
            color,
            gravity,
            decay,
            life: 1.0,
            opacity: 1.0,
            trail: VecDeque::with_capacity(PARTICLE_TRAIL_CAP + 1),
        }
    }

    fn update(&mut self) {
        self.trail.push_back(TrailPoint {
            x: self.x,
            y: self.y,
            opacity: self.opacity,
        });
        if self.trail.len() > PARTICLE_TRAIL_CAP {
            self.trail.pop_front();
        }

        self.x += self.vx;
        self.y += self.vy;

        // Gravity pulls down, drag damps both axes uniformly
        self.vy += self.gravity;
        self.vx *= self.decay;
        self.vy *= self.decay;

        self.life *= LIFE_FADE;
        self.opacity = self.life;
    }

    fn is_dead(&self) -> bool {
        self.life <= DEAD_LIFE
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let len = self.trail.len() as f32;
        for (i, point) in self.trail.iter().enumerate() {
            let alpha = i as f32 / len * self.opacity * 0.3;
            if alpha > 0.01 {
                surface.fill_circle(point.x, point.y, 1.0, self.color, alpha);
            }
        }

        if self.opacity > 0.01 {
            surface.fill_circle(self.x, self.y, 3.0, self.color, self.opacity);
            surface.glow_circle(self.x, self.y, 1.5, 10.0, self.color, self.opacity);
        }
    }
}

pub struct Firework {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    target_x: f32,
    target_y: f32,
    exploded: bool,
    particles: Vec<Particle>,
    trail: VecDeque<(f32, f32)>,
    color: Rgb,
}

impl Firework {
    // Rockets launch from the bottom edge (floor_y) on a straight
    // line toward the target at a fixed speed.
    pub fn new(rng: &mut Rng, start_x: f32, target_x: f32, target_y: f32, floor_y: f32) -> Self {
        let dx = target_x - start_x;
        let dy = target_y - floor_y;
        let distance = (dx * dx + dy * dy).sqrt();

        Self {
            x: start_x,
            y: floor_y,
            vx: dx / distance * LAUNCH_SPEED,
            vy: dy / distance * LAUNCH_SPEED,
            target_x,
            target_y,
            exploded: false,
            particles: Vec::new(),
            trail: VecDeque::with_capacity(ROCKET_TRAIL_CAP + 1),
            color: PALETTE[rng.usize(0..PALETTE.len())],
        }
    }

    pub fn update(&mut self, rng: &mut Rng) {
        if !self.exploded {
            self.trail.push_back((self.x, self.y));
            if self.trail.len() > ROCKET_TRAIL_CAP {
                self.trail.pop_front();
            }

            self.x += self.vx;
            self.y += self.vy;

            let dx = self.target_x - self.x;
            let dy = self.target_y - self.y;
            let distance = (dx * dx + dy * dy).sqrt();

            // Either arm may fire first for odd targets; both are kept
            if distance < EXPLODE_RADIUS || self.y <= self.target_y {
                self.explode(rng);
            }
        } else {
            self.particles.retain_mut(|particle| {
                particle.update();
                !particle.is_dead()
            });
        }
    }

    fn explode(&mut self, rng: &mut Rng) {
        self.exploded = true;

        let count = 50 + rng.usize(0..=50);
        let colors = [
            self.color,
            PALETTE[rng.usize(0..PALETTE.len())],
            PALETTE[rng.usize(0..PALETTE.len())],
        ];

        // Evenly spaced spray with a little angular scatter
        for i in 0..count {
            let angle = std::f32::consts::PI * 2.0 * i as f32 / count as f32
                + (rng.f32() - 0.5) * 0.5;
            let speed = 2.0 + rng.f32() * 8.0;

            self.particles.push(Particle::new(
                self.x,
                self.y,
                angle.cos() * speed,
                angle.sin() * speed,
                colors[rng.usize(0..colors.len())],
                0.05 + rng.f32() * 0.05,
                0.96 + rng.f32() * 0.04,
            ));
        }

        // Tight, slow, fast-fading white core
        for _ in 0..SPARKLE_COUNT {
            let angle = rng.f32() * std::f32::consts::PI * 2.0;
            let speed = 1.0 + rng.f32() * 3.0;

            self.particles.push(Particle::new(
                self.x,
                self.y,
                angle.cos() * speed,
                angle.sin() * speed,
                SPARKLE_COLOR,
                0.02,
                0.95,
            ));
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.set_composite(Composite::Lighten);

        if !self.exploded {
            let len = self.trail.len() as f32;
            for (i, &(x, y)) in self.trail.iter().enumerate() {
                surface.fill_circle(x, y, 2.0, self.color, i as f32 / len * 0.8);
            }

            surface.fill_circle(self.x, self.y, 3.0, self.color, 1.0);
            surface.glow_circle(self.x, self.y, 3.0, 15.0, self.color, 1.0);
        } else {
            for particle in &self.particles {
                particle.draw(surface);
            }
        }

        surface.set_composite(Composite::Over);
    }

    pub fn is_dead(&self) -> bool {
        self.exploded && self.particles.is_empty()
    }
}

pub struct FireworksSystem {
    width: f32,
    height: f32,
    fireworks: Vec<Firework>,
    // Launch deadlines in clock seconds; coordinates are rolled when one fires
    pending: Vec<f32>,
    running: bool,
    clock: f32,
    rng: Rng,
    bg: Rgb,
}

impl FireworksSystem {
    pub fn new(width: f32, height: f32, bg: Rgb, rng: Rng) -> Self {
        Self {
            width,
            height,
            fireworks: Vec::new(),
            pending: Vec::new(),
            running: false,
            clock: 0.0,
            rng,
            bg,
        }
    }

    // Dimensions only; in-flight fireworks keep their old targets
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn launch(&mut self, count: usize) {
        for i in 0..count {
            let delay = i as f32 * LAUNCH_STAGGER + self.rng.f32() * LAUNCH_JITTER;
            self.pending.push(self.clock + delay);
        }
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn clear(&mut self, surface: &mut dyn Surface) {
        self.fireworks.clear();
        self.stop();
        surface.clear();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_idle(&self) -> bool {
        self.fireworks.is_empty() && self.pending.is_empty()
    }

    // One simulation tick, driven once per display frame. The clock only
    // feeds the launch schedule; entity physics advance in per-tick units.
    pub fn tick(&mut self, surface: &mut dyn Surface, dt: f32) {
        self.clock += dt;
        self.fire_due_launches();

        if !self.running {
            return;
        }

        // Low-alpha wash instead of a full clear, so motion leaves trails
        surface.fill_rect(0.0, 0.0, self.width, self.height, self.bg, FADE_ALPHA);

        let rng = &mut self.rng;
        self.fireworks.retain_mut(|firework| {
            firework.update(rng);
            firework.draw(surface);
            !firework.is_dead()
        });

        if self.fireworks.is_empty() && self.pending.is_empty() {
            self.stop();
        }
    }

    fn fire_due_launches(&mut self) {
        let clock = self.clock;
        let mut due = 0;
        self.pending.retain(|&at| {
            if at <= clock {
                due += 1;
                false
            } else {
                true
            }
        });

        for _ in 0..due {
            let start_x = self.rng.f32() * self.width;
            let target_x = self.rng.f32() * self.width;
            // Apex confined to the upper 40% of the sky
            let target_y =
                self.height / 6.0 + self.rng.f32() * (self.height * 2.0 / 5.0 - self.height / 6.0);

            let firework =
                Firework::new(&mut self.rng, start_x, target_x, target_y, self.height);
            self.fireworks.push(firework);
            self.start();
        }
    }
}
