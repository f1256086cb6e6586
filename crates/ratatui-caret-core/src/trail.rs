//! Particle bursts left behind by a moving caret.

use crate::geometry::CaretPosition;
use crate::geometry::ScrollOffset;
use crate::host::OverlayCanvas;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::f64::consts::TAU;

/// Life lost per frame. 50 frames take a particle from 1.0 to nothing.
pub const LIFE_DECAY: f64 = 0.02;

#[derive(Clone, Debug, PartialEq)]
pub struct TrailParticle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub life: f64,
    pub max_life: f64,
    pub size: f64,
    pub color: String,
}

/// What a burst needs from the current options.
#[derive(Clone, Copy, Debug)]
pub struct BurstParams<'a> {
    pub count: usize,
    pub trail_width: f64,
    pub colors: &'a [String],
    /// Maximum number of live particles.
    pub cap: usize,
}

/// A bounded FIFO of particles. Colors are fixed when a particle spawns.
#[derive(Clone, Debug)]
pub struct TrailEngine {
    particles: VecDeque<TrailParticle>,
    rng: StdRng,
}

impl Default for TrailEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TrailEngine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic particles, for tests and reproducible recordings.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            particles: VecDeque::new(),
            rng,
        }
    }

    pub fn spawn_burst(&mut self, origin: CaretPosition, params: BurstParams<'_>) {
        for _ in 0..params.count {
            self.spawn(origin, &params);
        }
        tracing::trace!(
            count = params.count,
            live = self.particles.len(),
            "spawned trail burst"
        );
    }

    fn spawn(&mut self, origin: CaretPosition, params: &BurstParams<'_>) {
        let color = if params.colors.is_empty() {
            String::new()
        } else {
            params.colors[self.rng.gen_range(0..params.colors.len())].clone()
        };
        let angle = self.rng.gen_range(0.0..TAU);
        let speed = self.rng.gen_range(0.2..1.0);
        let size = params.trail_width * self.rng.gen_range(0.4..1.0);

        self.particles.push_back(TrailParticle {
            x: origin.x,
            y: origin.y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            life: 1.0,
            max_life: 1.0,
            size,
            color,
        });
        while self.particles.len() > params.cap {
            self.particles.pop_front();
        }
    }

    /// One frame of motion and decay. Dead particles are dropped immediately.
    pub fn advance(&mut self) {
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            p.life -= LIFE_DECAY;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    /// Clears the canvas and draws every particle, shrinking and fading with its life.
    pub fn render<C: OverlayCanvas + ?Sized>(
        &self,
        canvas: &mut C,
        page_scroll: ScrollOffset,
        trail_opacity: f64,
    ) {
        canvas.clear();
        for p in &self.particles {
            canvas.set_alpha(p.life * trail_opacity);
            canvas.fill_circle(
                p.x - page_scroll.x,
                p.y - page_scroll.y,
                p.size * p.life,
                &p.color,
            );
        }
        canvas.set_alpha(1.0);
    }

    pub fn is_active(&self) -> bool {
        !self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> impl Iterator<Item = &TrailParticle> {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::DrawOp;
    use crate::testing::RecordingCanvas;

    fn colors() -> Vec<String> {
        vec!["#ff4500".to_string(), "#ffd700".to_string()]
    }

    fn params(colors: &[String], count: usize, cap: usize) -> BurstParams<'_> {
        BurstParams {
            count,
            trail_width: 2.0,
            colors,
            cap,
        }
    }

    #[test]
    fn spawned_particles_respect_ranges() {
        let colors = colors();
        let mut t = TrailEngine::seeded(7);
        t.spawn_burst(CaretPosition::new(3.0, 4.0), params(&colors, 8, 100));
        assert_eq!(t.len(), 8);
        for p in t.particles() {
            assert_eq!((p.x, p.y), (3.0, 4.0));
            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            assert!((0.2 - 1e-9..1.0 + 1e-9).contains(&speed), "speed {speed}");
            assert!((0.8..2.0).contains(&p.size), "size {}", p.size);
            assert_eq!(p.life, 1.0);
            assert_eq!(p.max_life, 1.0);
            assert!(colors.contains(&p.color));
        }
    }

    #[test]
    fn fifty_frames_exhaust_every_particle() {
        let colors = colors();
        let mut t = TrailEngine::seeded(1);
        t.spawn_burst(CaretPosition::default(), params(&colors, 5, 100));
        for _ in 0..49 {
            t.advance();
        }
        assert_eq!(t.len(), 5);
        t.advance();
        assert!(t.is_empty());
        assert!(!t.is_active());
    }

    #[test]
    fn cap_evicts_oldest_first() {
        let colors = colors();
        let mut t = TrailEngine::seeded(2);
        t.spawn_burst(CaretPosition::new(0.0, 0.0), params(&colors, 6, 10));
        t.spawn_burst(CaretPosition::new(50.0, 0.0), params(&colors, 6, 10));
        assert_eq!(t.len(), 10);
        let at_origin = t.particles().filter(|p| p.x == 0.0).count();
        assert_eq!(at_origin, 4);
        assert!(t.particles().take(4).all(|p| p.x == 0.0));
    }

    #[test]
    fn render_fades_and_shrinks_with_life() {
        let colors = vec!["#00ff00".to_string()];
        let mut t = TrailEngine::seeded(3);
        t.spawn_burst(CaretPosition::new(10.0, 10.0), params(&colors, 3, 100));
        for _ in 0..25 {
            t.advance();
        }
        let mut canvas = RecordingCanvas::default();
        t.render(&mut canvas, ScrollOffset::new(0.0, 5.0), 0.5);

        assert_eq!(canvas.ops.first(), Some(&DrawOp::Clear));
        assert_eq!(canvas.ops.last(), Some(&DrawOp::Alpha(1.0)));
        let circles: Vec<_> = canvas
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Circle { alpha, radius, y, .. } => Some((*alpha, *radius, *y)),
                _ => None,
            })
            .collect();
        assert_eq!(circles.len(), 3);
        for ((alpha, radius, y), p) in circles.into_iter().zip(t.particles()) {
            assert!((alpha - p.life * 0.5).abs() < 1e-12);
            assert!((radius - p.size * p.life).abs() < 1e-12);
            assert!((y - (p.y - 5.0)).abs() < 1e-12);
        }
    }
}
