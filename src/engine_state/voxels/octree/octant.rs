//! Octant arithmetic shared by insertion, removal, lookup, and the GPU header.
//!
//! Octants are numbered by the sign pattern of a point relative to a node centre:
//! bit 0 is x, bit 1 is y, bit 2 is z, and a bit is set only for a strictly positive
//! delta. A delta of exactly zero falls into the negative half.

use cgmath::Vector3;

/// Number of children allocated together for every subdivided node.
pub const CHILDREN_PER_NODE: usize = 8;

/// Centre shift per octant, in units of the parent node's edge length.
#[rustfmt::skip]
pub const OCTANT_OFFSETS: [[f32; 3]; CHILDREN_PER_NODE] = [
    [-0.25, -0.25, -0.25],
    [ 0.25, -0.25, -0.25],
    [-0.25,  0.25, -0.25],
    [ 0.25,  0.25, -0.25],
    [-0.25, -0.25,  0.25],
    [ 0.25, -0.25,  0.25],
    [-0.25,  0.25,  0.25],
    [ 0.25,  0.25,  0.25],
];

/// Octant of a point relative to a centre: `4·[dz>0] + 2·[dy>0] + [dx>0]`.
pub fn octant_of(delta: Vector3<f32>) -> usize {
    ((delta.z > 0.0) as usize) << 2 | ((delta.y > 0.0) as usize) << 1 | (delta.x > 0.0) as usize
}

/// Centre of the child in `octant` of a node with the given centre and edge length.
pub fn child_center(center: Vector3<f32>, octant: usize, extent: u32) -> Vector3<f32> {
    center + Vector3::from(OCTANT_OFFSETS[octant]) * extent as f32
}

/// Upper bound on node records for a cube of edge `size`: Σ i³ over i = 1, 2, 4, …, size.
///
/// Returns `None` when `size` is not a power of two or the count overflows.
pub fn max_node_count(size: u32) -> Option<usize> {
    if !size.is_power_of_two() {
        return None;
    }
    let mut total: usize = 0;
    let mut edge: usize = 1;
    while edge <= size as usize {
        let level = edge.checked_mul(edge)?.checked_mul(edge)?;
        total = total.checked_add(level)?;
        edge *= 2;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_patterns_map_bijectively() {
        let mut seen = [false; CHILDREN_PER_NODE];
        for octant in 0..CHILDREN_PER_NODE {
            let pick = |bit: usize| if octant & bit != 0 { 1.0 } else { -1.0 };
            let delta = Vector3::new(pick(1), pick(2), pick(4));
            let found = octant_of(delta);
            assert_eq!(found, octant, "sign pattern {:?} should land in {}", delta, octant);
            seen[found] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn zero_delta_takes_negative_branch() {
        assert_eq!(octant_of(Vector3::new(0.0, 0.0, 0.0)), 0);
        assert_eq!(octant_of(Vector3::new(0.0, 1.0, 0.0)), 2);
        assert_eq!(octant_of(Vector3::new(3.0, -0.0, 0.0)), 1);
    }

    #[test]
    fn offsets_point_into_their_octant() {
        for (octant, offset) in OCTANT_OFFSETS.iter().enumerate() {
            assert_eq!(octant_of(Vector3::from(*offset)), octant);
        }
    }

    #[test]
    fn node_count_bound() {
        assert_eq!(max_node_count(1), Some(1));
        assert_eq!(max_node_count(2), Some(9));
        assert_eq!(max_node_count(4), Some(73));
        assert_eq!(max_node_count(64), Some(299_593));
        assert_eq!(max_node_count(6), None);
        assert_eq!(max_node_count(0), None);
    }
}
