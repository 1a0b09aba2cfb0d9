use octree_voxel_engine::{
    error::{OctreeError, VolumeError},
    PopulationPattern, RenderableVolume, SparseOctree,
};

#[test]
fn two_leaves_in_a_size_four_volume() {
    let mut octree = SparseOctree::new(4).unwrap();
    octree.add_voxel(0, 0, 0, 5).unwrap();
    octree.add_voxel(1, 0, 0, 7).unwrap();

    assert_eq!(octree.count_typed_voxels(), 2);
    assert_eq!(octree.voxel_at(0, 0, 0), 5);
    assert_eq!(octree.voxel_at(1, 0, 0), 7);
    assert_eq!(octree.voxel_at(2, 2, 2), 0);
}

#[test]
fn minimal_volume_prunes_back_to_the_root() {
    let mut octree = SparseOctree::new(2).unwrap();
    let initial = octree.cursor();
    assert_eq!(initial, 1);

    octree.add_voxel(1, 1, 1, 3).unwrap();
    assert_eq!(octree.cursor(), 9);
    octree.remove_voxel(1, 1, 1).unwrap();

    assert_eq!(octree.cursor(), initial);
    assert_eq!(octree.count_typed_voxels(), 0);
}

#[test]
fn every_cell_round_trips() {
    let size = 8;
    let mut octree = SparseOctree::new(size).unwrap();
    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                let voxel_type = (1 + x + y * size + z * size * size) as u16;
                octree.add_voxel(x, y, z, voxel_type).unwrap();
            }
        }
    }

    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                let expected = (1 + x + y * size + z * size * size) as u16;
                assert_eq!(octree.voxel_at(x, y, z), expected, "at ({x}, {y}, {z})");
            }
        }
    }
    assert_eq!(octree.count_typed_voxels(), size * size * size);
    assert_eq!(octree.cursor(), octree.capacity());
}

#[test]
fn overwriting_keeps_one_leaf() {
    let mut octree = SparseOctree::new(16).unwrap();
    octree.add_voxel(9, 3, 12, 2).unwrap();
    let cursor = octree.cursor();
    octree.add_voxel(9, 3, 12, 4).unwrap();

    assert_eq!(octree.cursor(), cursor);
    assert_eq!(octree.voxel_at(9, 3, 12), 4);
    assert_eq!(octree.count_typed_voxels(), 1);
}

#[test]
fn reverse_removal_restores_the_cursor() {
    let mut rng = fastrand::Rng::with_seed(11);
    let mut octree = SparseOctree::new(32).unwrap();
    octree.add_voxel(16, 16, 16, 9).unwrap();
    let before = octree.cursor();

    let mut cells = Vec::new();
    while cells.len() < 40 {
        let cell = (rng.u32(0..32), rng.u32(0..32), rng.u32(0..32));
        if cell != (16, 16, 16) && !cells.contains(&cell) {
            cells.push(cell);
        }
    }

    for &(x, y, z) in &cells {
        octree.add_voxel(x, y, z, 2).unwrap();
    }
    assert_eq!(octree.count_typed_voxels(), 41);

    for &(x, y, z) in cells.iter().rev() {
        octree.remove_voxel(x, y, z).unwrap();
    }

    assert_eq!(octree.cursor(), before);
    assert_eq!(octree.voxel_at(16, 16, 16), 9);
    assert_eq!(octree.count_typed_voxels(), 1);
}

#[test]
fn removing_in_any_order_restores_the_cursor() {
    let mut octree = SparseOctree::new(8).unwrap();
    let cells = [(0, 0, 0), (7, 0, 3), (7, 7, 7), (2, 5, 1), (3, 3, 3)];
    for &(x, y, z) in &cells {
        octree.add_voxel(x, y, z, 1).unwrap();
    }
    for &(x, y, z) in &[cells[2], cells[0], cells[4], cells[1], cells[3]] {
        octree.remove_voxel(x, y, z).unwrap();
    }
    assert_eq!(octree.cursor(), 1);
    assert!(octree.records()[1..].iter().all(|record| record.child_base < 0));
}

#[test]
fn removing_an_absent_voxel_changes_nothing() {
    let mut octree = SparseOctree::new(16).unwrap();
    octree.add_voxel(1, 2, 3, 4).unwrap();
    octree.add_voxel(14, 14, 0, 6).unwrap();
    let cursor = octree.cursor();
    let records = octree.records().to_vec();

    octree.remove_voxel(8, 8, 8).unwrap();
    octree.remove_voxel(1, 2, 2).unwrap();

    assert_eq!(octree.cursor(), cursor);
    assert_eq!(octree.records(), records.as_slice());
    assert_eq!(octree.voxel_at(1, 2, 3), 4);
    assert_eq!(octree.voxel_at(14, 14, 0), 6);
}

#[test]
fn pruning_keeps_siblings_intact() {
    let mut octree = SparseOctree::new(8).unwrap();
    octree.add_voxel(0, 0, 0, 1).unwrap();
    octree.add_voxel(1, 0, 0, 2).unwrap();
    octree.add_voxel(6, 6, 6, 3).unwrap();

    octree.remove_voxel(0, 0, 0).unwrap();
    assert_eq!(octree.voxel_at(1, 0, 0), 2);
    assert_eq!(octree.voxel_at(6, 6, 6), 3);

    octree.remove_voxel(1, 0, 0).unwrap();
    assert_eq!(octree.voxel_at(6, 6, 6), 3);
    assert_eq!(octree.count_typed_voxels(), 1);
}

#[test]
fn adding_type_zero_removes() {
    let mut octree = SparseOctree::new(4).unwrap();
    octree.add_voxel(3, 3, 3, 8).unwrap();
    octree.add_voxel(3, 3, 3, 0).unwrap();
    assert_eq!(octree.count_typed_voxels(), 0);
    assert_eq!(octree.cursor(), 1);
}

#[test]
fn out_of_bounds_edits_are_rejected() {
    let mut octree = SparseOctree::new(4).unwrap();
    octree.add_voxel(1, 1, 1, 1).unwrap();
    let records = octree.records().to_vec();
    octree.confirm_upload();

    assert!(matches!(
        octree.add_voxel(4, 0, 0, 1),
        Err(OctreeError::OutOfBounds { x: 4, size: 4, .. })
    ));
    assert!(matches!(
        octree.remove_voxel(0, 0, 9),
        Err(OctreeError::OutOfBounds { z: 9, .. })
    ));

    assert_eq!(octree.records(), records.as_slice());
    assert!(!octree.is_updated());
    assert_eq!(octree.voxel_at(4, 0, 0), 0);
}

#[test]
fn edits_raise_the_update_flag() {
    let mut octree = SparseOctree::new(4).unwrap();
    assert!(octree.is_updated());
    octree.confirm_upload();
    assert!(!octree.is_updated());

    octree.add_voxel(0, 1, 2, 3).unwrap();
    assert!(octree.is_updated());
    octree.confirm_upload();

    octree.remove_voxel(0, 1, 2).unwrap();
    assert!(octree.is_updated());
}

#[test]
fn populated_volumes_match_their_pattern() {
    let mut rng = fastrand::Rng::with_seed(3);
    let mut solid = SparseOctree::new(8).unwrap();
    assert_eq!(
        solid
            .populate(&PopulationPattern::Solid { voxel_type: 2 }, &mut rng)
            .unwrap(),
        512
    );
    assert_eq!(solid.count_typed_voxels(), 512);

    let mut checkerboard = SparseOctree::new(8).unwrap();
    checkerboard
        .populate(&PopulationPattern::Checkerboard { voxel_type: 1 }, &mut rng)
        .unwrap();
    assert_eq!(checkerboard.count_typed_voxels(), 256);
    assert_eq!(checkerboard.voxel_at(0, 0, 0), 1);
    assert_eq!(checkerboard.voxel_at(1, 0, 0), 0);
}

#[test]
fn seeded_population_is_reproducible() {
    let pattern = PopulationPattern::Random {
        fill_percent: 30,
        voxel_type: 4,
    };
    let mut a = SparseOctree::new(16).unwrap();
    let mut b = SparseOctree::new(16).unwrap();
    a.populate(&pattern, &mut fastrand::Rng::with_seed(99)).unwrap();
    b.populate(&pattern, &mut fastrand::Rng::with_seed(99)).unwrap();
    assert_eq!(a.records(), b.records());
}

#[test]
fn volume_surface_wraps_octree_errors() {
    let mut octree = SparseOctree::new(4).unwrap();
    let volume: &mut dyn RenderableVolume = &mut octree;

    volume.add_voxel(2, 2, 2, 6).unwrap();
    assert_eq!(volume.voxel_at(2, 2, 2), 6);
    assert_eq!(volume.extent(), [4, 4, 4]);
    assert!(matches!(
        volume.remove_voxel(4, 4, 4),
        Err(VolumeError::Octree(OctreeError::OutOfBounds { .. }))
    ));
}
