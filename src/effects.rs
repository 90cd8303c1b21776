use rand::seq::SliceRandom;
use rand::Rng;

const SPARK_SYMBOLS: [char; 4] = ['*', '+', '·', '°'];
const CONFETTI_SYMBOLS: [char; 5] = ['✦', '✧', '❀', '•', '✿'];
const GRAVITY: f64 = 15.0;
const SPARKS_PER_HIT: usize = 6;
const CONFETTI_COUNT: usize = 30;
const CELEBRATION_SECS: f64 = 3.0;
const LETTER_EASE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleKind {
    /// short-lived burst where an item was hit
    Spark,
    /// falls under gravity around the victory banner
    Confetti,
    /// one banner character flying to its slot
    Letter { target_x: f64, target_y: f64 },
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: ParticleKind,
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
}

impl Particle {
    fn spark<R: Rng>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            kind: ParticleKind::Spark,
            x,
            y,
            vel_x: rng.gen_range(-6.0..6.0),
            vel_y: rng.gen_range(-3.0..1.0),
            symbol: *SPARK_SYMBOLS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..4),
            age: 0.0,
            max_age: rng.gen_range(0.3..0.6),
        }
    }

    fn confetti<R: Rng>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            kind: ParticleKind::Confetti,
            x,
            y,
            vel_x: rng.gen_range(-3.0..3.0),
            vel_y: rng.gen_range(-4.0..-1.0),
            symbol: *CONFETTI_SYMBOLS.choose(rng).unwrap_or(&'•'),
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(2.0..CELEBRATION_SECS),
        }
    }

    fn letter(x: f64, y: f64, target_x: f64, target_y: f64, symbol: char, color: usize) -> Self {
        Self {
            kind: ParticleKind::Letter { target_x, target_y },
            x,
            y,
            vel_x: 0.0,
            vel_y: 0.0,
            symbol,
            color_index: color,
            age: 0.0,
            max_age: CELEBRATION_SECS,
        }
    }

    /// Returns false once the particle has lived out its age
    fn update(&mut self, dt: f64) -> bool {
        match self.kind {
            ParticleKind::Letter { target_x, target_y } => {
                // ease toward the slot, closing part of the gap each frame
                let ease = (dt * LETTER_EASE).min(1.0);
                self.x += (target_x - self.x) * ease;
                self.y += (target_y - self.y) * ease;
                if ((target_x - self.x).powi(2) + (target_y - self.y).powi(2)).sqrt() < 0.5 {
                    self.x = target_x;
                    self.y = target_y;
                }
            }
            ParticleKind::Spark | ParticleKind::Confetti => {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_y += GRAVITY * dt;
            }
        }
        self.age += dt;
        self.age < self.max_age
    }

    /// 1.0 when fresh, 0.0 when about to expire
    pub fn vitality(&self) -> f64 {
        (1.0 - self.age / self.max_age).clamp(0.0, 1.0)
    }
}

/// Particle overlay drawn on top of the play area and results screen
#[derive(Debug, Clone)]
pub struct Effects {
    pub particles: Vec<Particle>,
    width: f64,
    height: f64,
}

impl Effects {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            width: 80.0,
            height: 24.0,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width as f64;
        self.height = height as f64;
    }

    pub fn is_active(&self) -> bool {
        !self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Sparks around the cell where an item was hit
    pub fn burst(&mut self, x: f64, y: f64) {
        let mut rng = rand::thread_rng();
        for _ in 0..SPARKS_PER_HIT {
            self.particles.push(Particle::spark(x, y, &mut rng));
        }
    }

    /// Flies `text` in to the middle of the screen and throws confetti around it
    pub fn celebrate(&mut self, text: &str) {
        let mut rng = rand::thread_rng();
        self.particles.clear();

        let center_x = self.width / 2.0;
        let center_y = self.height / 2.0;
        let spacing = 2.0;
        let start_x = center_x - (text.chars().count().saturating_sub(1) as f64 * spacing) / 2.0;
        let color = rng.gen_range(0..7);

        for (i, ch) in text.chars().enumerate().filter(|(_, c)| *c != ' ') {
            self.particles.push(Particle::letter(
                center_x + rng.gen_range(-10.0..10.0),
                center_y + rng.gen_range(-5.0..5.0),
                start_x + i as f64 * spacing,
                center_y - 3.0,
                ch,
                color,
            ));
        }

        for _ in 0..CONFETTI_COUNT {
            self.particles.push(Particle::confetti(
                center_x + rng.gen_range(-20.0..20.0),
                center_y + rng.gen_range(-6.0..6.0),
                &mut rng,
            ));
        }
    }

    pub fn update(&mut self, dt: f64) {
        let margin = 5.0;
        let (w, h) = (self.width, self.height);
        self.particles.retain_mut(|p| {
            let alive = p.update(dt);
            let off_screen = matches!(p.kind, ParticleKind::Spark | ParticleKind::Confetti)
                && (p.y > h + margin || p.x < -margin || p.x > w + margin);
            alive && !off_screen
        });
    }
}

impl Default for Effects {
    fn default() -> Self {
        Self::new()
    }
}
