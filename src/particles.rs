use rand::Rng;

pub const DEFAULT_PARTICLE_COUNT: usize = 50;

/// A mote drifting upward behind the typing area
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub opacity: f64,
}

impl Particle {
    fn new<R: Rng>(width: f64, height: f64, rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(0.0..width.max(1.0)),
            y: rng.gen_range(0.0..height.max(1.0)),
            radius: rng.gen_range(1.0..3.0),
            vel_x: rng.gen_range(-0.05..0.05),
            vel_y: rng.gen_range(-0.25..-0.1), // upwards
            opacity: rng.gen_range(0.2..0.7),
        }
    }

    /// The glyph used to draw this particle in a terminal cell
    pub fn symbol(&self) -> char {
        if self.radius >= 2.3 {
            '•'
        } else if self.radius >= 1.6 {
            '∙'
        } else {
            '·'
        }
    }
}

/// Ambient particle field whose drift speeds up with typing speed.
#[derive(Debug, Clone)]
pub struct ParticleField {
    pub particles: Vec<Particle>,
    pub width: f64,
    pub height: f64,
    count: usize,
}

impl ParticleField {
    pub fn new(count: usize, width: u16, height: u16) -> Self {
        let mut field = Self {
            particles: Vec::with_capacity(count),
            width: width as f64,
            height: height as f64,
            count,
        };
        field.seed();
        field
    }

    /// Re-seeds the whole field for a new area.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width as f64;
        self.height = height as f64;
        self.seed();
    }

    fn seed(&mut self) {
        let mut rng = rand::thread_rng();
        self.particles.clear();
        for _ in 0..self.count {
            self.particles
                .push(Particle::new(self.width, self.height, &mut rng));
        }
    }

    /// Advances every particle one animation frame at the given words per minute.
    pub fn step(&mut self, wpm: u32) {
        let mut rng = rand::thread_rng();
        let speed_multiplier = 1.0 + wpm as f64 / 100.0;
        let (width, height) = (self.width, self.height);

        for p in &mut self.particles {
            p.x += p.vel_x;
            p.y += p.vel_y;
            p.y += p.vel_y * speed_multiplier;

            if p.y < -p.radius {
                p.y = height + p.radius;
                p.x = rng.gen_range(0.0..width.max(1.0));
            }
            if p.x < -p.radius {
                p.x = width + p.radius;
            }
            if p.x > width + p.radius {
                p.x = -p.radius;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_seeds_requested_count() {
        let field = ParticleField::new(50, 80, 24);
        assert_eq!(field.len(), 50);

        for p in &field.particles {
            assert!(p.x >= 0.0 && p.x < 80.0);
            assert!(p.y >= 0.0 && p.y < 24.0);
            assert!(p.radius >= 1.0 && p.radius < 3.0);
            assert!(p.vel_y < 0.0);
            assert!(p.opacity >= 0.2 && p.opacity < 0.7);
        }
    }

    #[test]
    fn test_empty_field() {
        let mut field = ParticleField::new(0, 80, 24);
        field.step(120);
        assert!(field.is_empty());
    }

    #[test]
    fn test_particles_rise() {
        let mut field = ParticleField::new(10, 80, 1000);
        let before: Vec<f64> = field.particles.iter().map(|p| p.y).collect();

        field.step(0);

        for (p, y) in field.particles.iter().zip(before) {
            // unless it wrapped to the bottom
            assert!(p.y < y || p.y > 999.0);
        }
    }

    #[test]
    fn test_faster_typing_moves_particles_further() {
        let mut field = ParticleField::new(1, 80, 1000);
        field.particles[0] = Particle {
            x: 10.0,
            y: 500.0,
            radius: 1.0,
            vel_x: 0.0,
            vel_y: -0.2,
            opacity: 0.5,
        };
        let mut fast = field.clone();

        field.step(0);
        fast.step(100);

        // 0.2 + 0.2 * 1 versus 0.2 + 0.2 * 2
        assert!((field.particles[0].y - 499.6).abs() < 1e-9);
        assert!((fast.particles[0].y - 499.4).abs() < 1e-9);
    }

    #[test]
    fn test_particle_wraps_to_bottom() {
        let mut field = ParticleField::new(1, 80, 24);
        field.particles[0] = Particle {
            x: 10.0,
            y: -0.9,
            radius: 1.0,
            vel_x: 0.0,
            vel_y: -0.2,
            opacity: 0.5,
        };

        field.step(0);

        assert_eq!(field.particles[0].y, 25.0);
        assert!(field.particles[0].x >= 0.0 && field.particles[0].x < 80.0);
    }

    #[test]
    fn test_particle_wraps_horizontally() {
        let mut field = ParticleField::new(2, 80, 24);
        field.particles[0] = Particle {
            x: -0.99,
            y: 10.0,
            radius: 1.0,
            vel_x: -0.05,
            vel_y: -0.1,
            opacity: 0.5,
        };
        field.particles[1] = Particle {
            x: 80.99,
            y: 10.0,
            radius: 1.0,
            vel_x: 0.05,
            vel_y: -0.1,
            opacity: 0.5,
        };

        field.step(0);

        assert_eq!(field.particles[0].x, 81.0);
        assert_eq!(field.particles[1].x, -1.0);
    }

    #[test]
    fn test_resize_reseeds() {
        let mut field = ParticleField::new(20, 80, 24);
        field.resize(10, 5);

        assert_eq!(field.len(), 20);
        assert_eq!(field.width, 10.0);
        for p in &field.particles {
            assert!(p.x < 10.0 && p.y < 5.0);
        }
    }

    #[test]
    fn test_symbol_by_radius() {
        let mut p = ParticleField::new(1, 10, 10).particles[0].clone();
        p.radius = 1.0;
        assert_eq!(p.symbol(), '·');
        p.radius = 2.0;
        assert_eq!(p.symbol(), '∙');
        p.radius = 2.9;
        assert_eq!(p.symbol(), '•');
    }
}
