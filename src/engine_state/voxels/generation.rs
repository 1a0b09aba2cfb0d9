//! # Volume Population
//!
//! Bring-up fill patterns shared by the octree and the chunked field. The random source is
//! always injected so tests and seeded runs are reproducible.
//!
//! Supported patterns:
//! - `random`: each cell is filled with probability `fill_percent / 100`
//! - `perlin`: cells where 3D Perlin noise exceeds `threshold` are filled
//! - `solid`: every cell is filled
//! - `checkerboard`: cells with even `x + y + z` are filled
//! - `empty`: nothing is filled

use noise::{NoiseFn, Perlin};
use serde::Deserialize;

use super::block::{VoxelTypeId, EMPTY_VOXEL};

/// How a freshly constructed volume is filled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PopulationPattern {
    /// Independent coin flip per cell
    Random {
        /// Chance out of 100 that a cell is filled
        fill_percent: u32,
        /// Type written into filled cells
        voxel_type: VoxelTypeId,
    },
    /// Thresholded 3D Perlin noise
    Perlin {
        /// World-to-noise coordinate scale
        scale: f64,
        /// Noise value above which a cell is filled
        threshold: f64,
        /// Type written into filled cells
        voxel_type: VoxelTypeId,
    },
    /// Every cell filled
    Solid {
        /// Type written into every cell
        voxel_type: VoxelTypeId,
    },
    /// Alternating cells filled
    Checkerboard {
        /// Type written into filled cells
        voxel_type: VoxelTypeId,
    },
    /// Nothing filled
    Empty,
}

impl Default for PopulationPattern {
    fn default() -> Self {
        PopulationPattern::Random {
            fill_percent: 50,
            voxel_type: 1,
        }
    }
}

/// A pattern bound to its random state, ready to be sampled cell by cell.
pub struct PopulationSampler<'a> {
    pattern: &'a PopulationPattern,
    rng: &'a mut fastrand::Rng,
    perlin: Option<Perlin>,
}

impl PopulationPattern {
    /// Binds the pattern to a random source. Perlin noise is seeded from `rng`.
    pub fn sampler<'a>(&'a self, rng: &'a mut fastrand::Rng) -> PopulationSampler<'a> {
        let perlin = match self {
            PopulationPattern::Perlin { .. } => Some(Perlin::new(rng.u32(..))),
            _ => None,
        };
        PopulationSampler {
            pattern: self,
            rng,
            perlin,
        }
    }
}

impl PopulationSampler<'_> {
    /// Type id for the cell at `(x, y, z)`, [`EMPTY_VOXEL`] when the cell stays empty.
    pub fn sample(&mut self, x: i32, y: i32, z: i32) -> VoxelTypeId {
        match *self.pattern {
            PopulationPattern::Random {
                fill_percent,
                voxel_type,
            } => {
                // Roll 1..=100 and fill when the roll lands inside the percentage.
                if self.rng.u32(1..=100) <= fill_percent {
                    voxel_type
                } else {
                    EMPTY_VOXEL
                }
            }
            PopulationPattern::Perlin {
                scale,
                threshold,
                voxel_type,
            } => {
                let sample = self.perlin.as_ref().map_or(0.0, |perlin| {
                    perlin.get([x as f64 * scale, y as f64 * scale, z as f64 * scale])
                });
                if sample > threshold {
                    voxel_type
                } else {
                    EMPTY_VOXEL
                }
            }
            PopulationPattern::Solid { voxel_type } => voxel_type,
            PopulationPattern::Checkerboard { voxel_type } => {
                if (x + y + z).rem_euclid(2) == 0 {
                    voxel_type
                } else {
                    EMPTY_VOXEL
                }
            }
            PopulationPattern::Empty => EMPTY_VOXEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_alternates() {
        let pattern = PopulationPattern::Checkerboard { voxel_type: 3 };
        let mut rng = fastrand::Rng::with_seed(1);
        let mut sampler = pattern.sampler(&mut rng);
        assert_eq!(sampler.sample(0, 0, 0), 3);
        assert_eq!(sampler.sample(1, 0, 0), EMPTY_VOXEL);
        assert_eq!(sampler.sample(1, 1, 0), 3);
        assert_eq!(sampler.sample(-1, 0, 0), EMPTY_VOXEL);
    }

    #[test]
    fn random_extremes_are_deterministic() {
        let mut rng = fastrand::Rng::with_seed(9);
        let always = PopulationPattern::Random {
            fill_percent: 100,
            voxel_type: 2,
        };
        let never = PopulationPattern::Random {
            fill_percent: 0,
            voxel_type: 2,
        };
        for i in 0..64 {
            assert_eq!(always.sampler(&mut rng).sample(i, 0, 0), 2);
            assert_eq!(never.sampler(&mut rng).sample(i, 0, 0), EMPTY_VOXEL);
        }
    }

    #[test]
    fn same_seed_same_fill() {
        let pattern = PopulationPattern::default();
        let fill = |seed| {
            let mut rng = fastrand::Rng::with_seed(seed);
            let mut sampler = pattern.sampler(&mut rng);
            (0..32).map(|i| sampler.sample(i, 0, 0)).collect::<Vec<_>>()
        };
        assert_eq!(fill(5), fill(5));
    }
}
