// simulation/dust.rs - Drifting dust motes that bounce inside the room

use bytemuck::{Pod, Zeroable};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::clamp_reporting;
use crate::config::DustSettings;
use crate::geometry::RoomPlan;
use crate::types::Vec3;

/// One mote. Only position and velocity change after creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DustParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub phase: f32,
}

/// Per-instance record handed to the renderer
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub phase: f32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<ParticleInstance>(), 16);

impl From<&DustParticle> for ParticleInstance {
    fn from(p: &DustParticle) -> Self {
        Self {
            position: p.position.into(),
            phase: p.phase,
        }
    }
}

/// Fixed-size particle set with per-axis elastic reflection
#[derive(Debug, Clone)]
pub struct DustParticleSimulator {
    particles: Vec<DustParticle>,
    min: Vec3,
    max: Vec3,
    sway_amplitude: f32,
    sway_rate: f32,
}

impl DustParticleSimulator {
    /// Seed `settings.count` particles inside the room's interior margin
    pub fn new<R: Rng + ?Sized>(plan: &RoomPlan, settings: &DustSettings, rng: &mut R) -> Self {
        let hx = (plan.half_width() - settings.margin).max(0.0);
        let hz = (plan.half_depth() - settings.margin).max(0.0);
        let min = Vec3::new(-hx, settings.min_y, -hz);
        let max = Vec3::new(hx, (plan.height() - settings.max_y_inset).max(settings.min_y), hz);

        let particles = (0..settings.count)
            .map(|_| DustParticle {
                position: Vec3::new(
                    sample(rng, min.x, max.x),
                    sample(rng, min.y, max.y),
                    sample(rng, min.z, max.z),
                ),
                velocity: Vec3::new(
                    sample(rng, -settings.speed, settings.speed),
                    sample(rng, -settings.vertical_speed, settings.vertical_speed),
                    sample(rng, -settings.speed, settings.speed),
                ),
                phase: rng.gen_range(0.0..TAU),
            })
            .collect();

        log::info!("Seeded {} dust particles", settings.count);

        Self {
            particles,
            min,
            max,
            sway_amplitude: settings.sway_amplitude,
            sway_rate: settings.sway_rate,
        }
    }

    pub fn particles(&self) -> &[DustParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Inclusive bounds every particle is kept within
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.min, self.max)
    }

    /// Advance one tick at session time `time` (seconds). Returns the number
    /// of axis reflections that happened.
    pub fn tick(&mut self, time: f32) -> usize {
        let (min, max) = (self.min, self.max);
        let mut reflections = 0;

        for p in &mut self.particles {
            p.position += p.velocity;
            p.position.y += (time * self.sway_rate + p.phase).sin() * self.sway_amplitude;

            for axis in 0..3 {
                let (clamped, hit) = clamp_reporting(p.position.axis(axis), min.axis(axis), max.axis(axis));
                if hit {
                    *p.position.axis_mut(axis) = clamped;
                    let v = p.velocity.axis_mut(axis);
                    *v = -*v;
                    reflections += 1;
                }
            }
        }

        reflections
    }

    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.particles.iter().map(ParticleInstance::from).collect()
    }
}

#[inline]
fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn plan() -> RoomPlan {
        RoomPlan::new(6.0, 8.0, 3.2, 0.1, 1.0).unwrap()
    }

    fn in_bounds(sim: &DustParticleSimulator) -> bool {
        let (min, max) = sim.bounds();
        sim.particles().iter().all(|p| {
            (0..3).all(|a| p.position.axis(a) >= min.axis(a) && p.position.axis(a) <= max.axis(a))
        })
    }

    #[test]
    fn test_seeded_inside_interior() {
        let settings = DustSettings::default();
        let sim = DustParticleSimulator::new(&plan(), &settings, &mut StdRng::seed_from_u64(1));
        assert_eq!(sim.len(), settings.count);
        assert!(in_bounds(&sim));
        let (min, max) = sim.bounds();
        assert!((max.x - 2.7).abs() < 1e-5);
        assert!((min.z + 3.7).abs() < 1e-5);
        assert!((max.y - 2.95).abs() < 1e-5);
        for p in sim.particles() {
            assert!(p.velocity.x.abs() <= settings.speed);
            assert!(p.velocity.y.abs() <= settings.vertical_speed);
            assert!((0.0..TAU).contains(&p.phase));
        }
    }

    #[test]
    fn test_same_seed_same_particles() {
        let settings = DustSettings::default();
        let a = DustParticleSimulator::new(&plan(), &settings, &mut StdRng::seed_from_u64(9));
        let b = DustParticleSimulator::new(&plan(), &settings, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_reflects_one_axis_only() {
        let mut sim = DustParticleSimulator {
            particles: vec![DustParticle {
                position: Vec3::new(0.99, 0.5, 0.0),
                velocity: Vec3::new(0.05, 0.0, 0.02),
                phase: 0.0,
            }],
            min: Vec3::new(-1.0, 0.0, -1.0),
            max: Vec3::new(1.0, 1.0, 1.0),
            sway_amplitude: 0.0,
            sway_rate: 0.0,
        };

        assert_eq!(sim.tick(0.0), 1);
        let p = sim.particles()[0];
        assert_eq!(p.position.x, 1.0);
        assert_eq!(p.velocity, Vec3::new(-0.05, 0.0, 0.02));
        assert!((p.position.z - 0.02).abs() < 1e-6);

        // heads back inside on the next tick
        assert_eq!(sim.tick(0.0), 0);
        assert!(sim.particles()[0].position.x < 1.0);
    }

    #[test]
    fn test_sway_moves_y() {
        let mut sim = DustParticleSimulator {
            particles: vec![DustParticle {
                position: Vec3::new(0.0, 0.5, 0.0),
                velocity: Vec3::zero(),
                phase: std::f32::consts::FRAC_PI_2,
            }],
            min: Vec3::new(-1.0, 0.0, -1.0),
            max: Vec3::new(1.0, 1.0, 1.0),
            sway_amplitude: 0.01,
            sway_rate: 1.0,
        };
        sim.tick(0.0);
        assert!((sim.particles()[0].position.y - 0.51).abs() < 1e-6);
    }

    #[test]
    fn test_instances_are_pod() {
        let sim = DustParticleSimulator::new(&plan(), &DustSettings::default(), &mut StdRng::seed_from_u64(2));
        let instances = sim.instances();
        assert_eq!(instances.len(), sim.len());
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), sim.len() * 16);
        assert_eq!(instances[0].position, <[f32; 3]>::from(sim.particles()[0].position));
    }

    proptest! {
        #[test]
        fn prop_particles_stay_bounded(seed in any::<u64>(), ticks in 1usize..400, fast in 1.0f32..40.0) {
            let settings = DustSettings {
                count: 24,
                speed: DustSettings::default().speed * fast,
                vertical_speed: DustSettings::default().vertical_speed * fast,
                sway_amplitude: 0.01,
                ..DustSettings::default()
            };
            let mut sim = DustParticleSimulator::new(&plan(), &settings, &mut StdRng::seed_from_u64(seed));
            let (min, max) = sim.bounds();
            let count = sim.len();

            for t in 0..ticks {
                let before: Vec<DustParticle> = sim.particles().to_vec();
                sim.tick(t as f32 / 60.0);
                prop_assert_eq!(sim.len(), count);
                prop_assert!(in_bounds(&sim));

                for (old, new) in before.iter().zip(sim.particles()) {
                    prop_assert_eq!(old.phase, new.phase);
                    for a in 0..3 {
                        let (v0, v1) = (old.velocity.axis(a), new.velocity.axis(a));
                        if v1 != v0 {
                            // flipped, and only because this axis was clamped
                            prop_assert_eq!(v1, -v0);
                            let pos = new.position.axis(a);
                            prop_assert!(pos == min.axis(a) || pos == max.axis(a));
                        }
                    }
                }
            }
        }
    }
}
