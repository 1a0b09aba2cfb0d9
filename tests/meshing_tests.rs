use cgmath::Point3;
use octree_voxel_engine::{
    error::FieldError, BlockSide, ChunkMesh, Plane, PopulationPattern, RenderableVolume,
};

fn single_chunk() -> Plane {
    Plane::new([1, 1, 1], Point3::new(0, 0, 0)).unwrap()
}

fn total_quads(meshes: &[ChunkMesh]) -> usize {
    meshes.iter().map(ChunkMesh::quad_count).sum()
}

#[test]
fn neighbor_masks_are_mutual() {
    let mut plane = Plane::new([3, 1, 3], Point3::new(0, 0, 0)).unwrap();
    plane.populate(
        &PopulationPattern::Random {
            fill_percent: 45,
            voxel_type: 2,
        },
        &mut fastrand::Rng::with_seed(21),
    );
    plane.check_voxels();

    let (min, max) = plane.voxel_bounds();
    for z in min.z..max.z {
        for y in min.y..max.y {
            for x in min.x..max.x {
                let voxel = *plane.get_voxel(x, y, z).unwrap();
                if voxel.is_empty() {
                    continue;
                }
                for side in BlockSide::all() {
                    let step = side.offset();
                    match plane.get_voxel(x + step.x, y + step.y, z + step.z) {
                        Some(other) if !other.is_empty() => {
                            assert!(voxel.has_neighbor(side), "({x}, {y}, {z}) {side:?}");
                            assert!(other.has_neighbor(side.opposite()));
                        }
                        _ => assert!(!voxel.has_neighbor(side), "({x}, {y}, {z}) {side:?}"),
                    }
                }
            }
        }
    }
}

#[test]
fn isolated_voxel_emits_six_quads() {
    let mut plane = single_chunk();
    plane.set_voxel(4, 5, 6, 3).unwrap();

    let meshes = plane.generate_meshes();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].quad_count(), 6);
    assert_eq!(meshes[0].vertex_count(), 36);

    for vertex in meshes[0].vertices() {
        let [x, y, z] = vertex.position;
        assert!((4.0..=5.0).contains(&x));
        assert!((5.0..=6.0).contains(&y));
        assert!((6.0..=7.0).contains(&z));
    }
}

#[test]
fn buried_voxel_emits_nothing() {
    let mut plane = single_chunk();
    for z in 3..6 {
        for y in 3..6 {
            for x in 3..6 {
                plane.set_voxel(x, y, z, 1).unwrap();
            }
        }
    }

    let meshes = plane.generate_meshes();
    // Nine visible unit faces per side of the cube, none from the centre.
    assert_eq!(total_quads(&meshes), 54);
    assert_eq!(
        plane.get_voxel(4, 4, 4).unwrap().neighbors,
        0b11_1111
    );
}

#[test]
fn faces_touching_the_window_edge_are_emitted() {
    let mut plane = single_chunk();
    plane.set_voxel(0, 0, 0, 1).unwrap();
    plane.set_voxel(9, 9, 9, 1).unwrap();

    let meshes = plane.generate_meshes();
    assert_eq!(total_quads(&meshes), 12);
}

#[test]
fn faces_between_chunks_are_culled() {
    let mut plane = Plane::new([3, 1, 1], Point3::new(1, 0, 0)).unwrap();
    plane.set_voxel(9, 5, 5, 1).unwrap();
    plane.set_voxel(10, 5, 5, 1).unwrap();

    let meshes = plane.generate_meshes();
    assert_eq!(total_quads(&meshes), 10);

    let left = plane.get_voxel(9, 5, 5).unwrap();
    let right = plane.get_voxel(10, 5, 5).unwrap();
    assert!(left.has_neighbor(BlockSide::RIGHT));
    assert!(right.has_neighbor(BlockSide::LEFT));

    let by_slot: Vec<usize> = meshes.iter().map(ChunkMesh::quad_count).collect();
    assert_eq!(by_slot, vec![5, 5, 0]);
}

#[test]
fn negative_coordinates_resolve_by_floor_division() {
    let mut plane = Plane::new([3, 3, 3], Point3::new(0, 0, 0)).unwrap();
    assert_eq!(plane.voxel_bounds(), (Point3::new(-10, -10, -10), Point3::new(20, 20, 20)));

    plane.set_voxel(-1, -10, 19, 4).unwrap();
    assert_eq!(plane.get_voxel(-1, -10, 19).unwrap().voxel_type, 4);

    let (slot, local) = plane.locate(-1, -10, 19).unwrap();
    assert_eq!(plane.chunks()[slot].position, Point3::new(-1, -1, 1));
    assert_eq!(local, 9 + 9 * 100);
}

#[test]
fn outside_the_window_is_absent() {
    let mut plane = single_chunk();
    assert!(plane.get_voxel(10, 0, 0).is_none());
    assert!(plane.get_voxel(0, -1, 0).is_none());
    assert!(matches!(
        plane.set_voxel(0, 0, 10, 1),
        Err(FieldError::OutOfWindow { x: 0, y: 0, z: 10 })
    ));
    assert_eq!(plane.count_typed_voxels(), 0);
}

#[test]
fn only_dirty_chunks_are_remeshed() {
    let mut plane = Plane::new([3, 1, 1], Point3::new(1, 0, 0)).unwrap();
    plane.set_voxel(25, 5, 5, 1).unwrap();

    let first = plane.generate_meshes();
    assert_eq!(first.len(), 3);
    assert!(plane.generate_meshes().is_empty());

    // An interior edit only touches its own chunk.
    plane.set_voxel(24, 5, 5, 1).unwrap();
    let second = plane.generate_meshes();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].slot, 2);
    assert_eq!(second[0].quad_count(), 10);

    // An edit on a chunk face also dirties the chunk across it.
    plane.set_voxel(10, 0, 0, 1).unwrap();
    let third = plane.generate_meshes();
    let slots: Vec<usize> = third.iter().map(|mesh| mesh.slot).collect();
    assert_eq!(slots, vec![0, 1]);
    assert_eq!(third[1].quad_count(), 6);
}

#[test]
fn edits_after_meshing_are_remeshed() {
    let mut plane = single_chunk();
    plane.generate_meshes();
    assert!(!plane.needs_remesh());

    plane.set_voxel(3, 3, 3, 1).unwrap();
    assert!(plane.is_dirty(0));

    let meshes = plane.generate_meshes();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].quad_count(), 6);
    assert_eq!(plane.count_typed_voxels(), 1);
}

#[test]
fn rewriting_the_same_type_leaves_chunks_clean() {
    let mut plane = single_chunk();
    plane.set_voxel(1, 1, 1, 2).unwrap();
    plane.generate_meshes();

    plane.set_voxel(1, 1, 1, 2).unwrap();
    assert!(!plane.needs_remesh());
}

#[test]
fn volume_surface_addresses_the_window_from_its_corner() {
    let mut plane = Plane::new([3, 1, 1], Point3::new(0, 0, 0)).unwrap();
    let volume: &mut dyn RenderableVolume = &mut plane;

    assert_eq!(volume.extent(), [30, 10, 10]);
    volume.add_voxel(0, 0, 0, 7).unwrap();
    assert_eq!(volume.voxel_at(0, 0, 0), 7);
    assert!(volume.add_voxel(30, 0, 0, 1).is_err());

    assert_eq!(plane.get_voxel(-10, 0, 0).unwrap().voxel_type, 7);
}
