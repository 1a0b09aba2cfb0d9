use cgmath::Vector3;
use octree_voxel_engine::{
    engine_state::{
        buffer_state::AsBytes,
        rendering::octree_buffer::{OCTREE_BUFFER_NAME, OCTREE_HEADER_SIZE},
    },
    error::BufferError,
    BufferWriteCommand, Camera, OctreeGpuBuffer, OctreeGpuHeader, SparseOctree, VoxelRecord,
};

fn fresh_pair() -> (SparseOctree, Camera) {
    let octree = SparseOctree::new(8).unwrap();
    let camera = Camera::framing_volume(8, 1.0, 320, 240);
    (octree, camera)
}

/// Runs one frame against a recorder standing in for the GPU buffer.
fn run_frame(octree: &mut SparseOctree, camera: &mut Camera) -> (Vec<BufferWriteCommand>, bool) {
    let frame = OctreeGpuBuffer::synchronize(octree, camera);
    let mut written = Vec::new();
    let dispatch = OctreeGpuBuffer::submit(frame, octree, |command| {
        written.push(command);
        Ok(())
    })
    .unwrap();
    (written, dispatch)
}

fn header_of(command: &BufferWriteCommand) -> OctreeGpuHeader {
    bytemuck::pod_read_unaligned(command.data.as_bytes())
}

/// Worst-case record count of an octree of edge `size`.
fn node_count(size: u32) -> usize {
    let mut count = 0usize;
    let mut edge = 1usize;
    while edge <= size as usize {
        count += edge * edge * edge;
        edge *= 2;
    }
    count
}

#[test]
fn first_frame_uploads_everything() {
    let (mut octree, mut camera) = fresh_pair();
    let frame = OctreeGpuBuffer::synchronize(&mut octree, &mut camera);

    assert!(frame.dispatch);
    assert!(frame.is_full_upload());
    assert_eq!(frame.commands.len(), 2);

    let header = &frame.commands[0];
    assert_eq!(header.buffer_name, OCTREE_BUFFER_NAME);
    assert_eq!(header.offset, 0);
    assert_eq!(header.len() as u64, OCTREE_HEADER_SIZE);

    let voxels = &frame.commands[1];
    assert_eq!(voxels.buffer_name, OCTREE_BUFFER_NAME);
    assert_eq!(voxels.offset, OCTREE_HEADER_SIZE);
    assert_eq!(
        voxels.len(),
        octree.capacity() * std::mem::size_of::<VoxelRecord>()
    );
    assert_eq!(
        OCTREE_HEADER_SIZE + voxels.len() as u64,
        OctreeGpuBuffer::buffer_size(octree.capacity())
    );
}

#[test]
fn idle_frame_does_nothing() {
    let (mut octree, mut camera) = fresh_pair();
    run_frame(&mut octree, &mut camera);

    let (written, dispatch) = run_frame(&mut octree, &mut camera);
    assert!(!dispatch);
    assert!(written.is_empty());
}

#[test]
fn camera_motion_rewrites_only_the_header() {
    let (mut octree, mut camera) = fresh_pair();
    run_frame(&mut octree, &mut camera);

    camera.translate(Vector3::new(0.0, 2.0, 0.0));
    let frame = OctreeGpuBuffer::synchronize(&mut octree, &mut camera);

    assert!(frame.dispatch);
    assert!(!frame.is_full_upload());
    assert_eq!(frame.commands.len(), 1);
    assert_eq!(frame.commands[0].offset, 0);

    let header = header_of(&frame.commands[0]);
    assert_eq!(header.position[1], camera.position.y);
    assert_eq!(header.position[3], 1.0);
    assert_eq!(header.size, 8);
}

#[test]
fn zoom_alone_does_not_dispatch() {
    let (mut octree, mut camera) = fresh_pair();
    run_frame(&mut octree, &mut camera);

    camera.zoom_by(0.5, 0.1, 4.0);
    let (written, dispatch) = run_frame(&mut octree, &mut camera);
    assert!(!dispatch);
    assert!(written.is_empty());
}

#[test]
fn edits_trigger_a_full_upload_once() {
    let (mut octree, mut camera) = fresh_pair();
    run_frame(&mut octree, &mut camera);

    octree.add_voxel(3, 3, 3, 2).unwrap();
    let (written, dispatch) = run_frame(&mut octree, &mut camera);
    assert!(dispatch);
    assert_eq!(written.len(), 2);
    assert_eq!(written[0].offset, 0);
    assert_eq!(written[1].offset, OCTREE_HEADER_SIZE);

    let records: &[VoxelRecord] = bytemuck::cast_slice(written[1].data.as_bytes());
    assert_eq!(records, octree.records());

    let (written, dispatch) = run_frame(&mut octree, &mut camera);
    assert!(!dispatch);
    assert!(written.is_empty());
}

#[test]
fn failed_upload_is_retried() {
    let (mut octree, mut camera) = fresh_pair();
    run_frame(&mut octree, &mut camera);

    octree.add_voxel(1, 2, 3, 4).unwrap();
    let frame = OctreeGpuBuffer::synchronize(&mut octree, &mut camera);
    let result = OctreeGpuBuffer::submit(frame, &mut octree, |command| {
        Err(BufferError::Missing(command.buffer_name))
    });
    assert!(matches!(result, Err(BufferError::Missing(_))));
    assert!(octree.is_updated());

    let (written, dispatch) = run_frame(&mut octree, &mut camera);
    assert!(dispatch);
    assert_eq!(written.len(), 2);
    assert!(!octree.is_updated());
}

#[test]
fn edit_and_motion_in_one_frame_share_the_upload() {
    let (mut octree, mut camera) = fresh_pair();
    run_frame(&mut octree, &mut camera);

    octree.remove_voxel(0, 0, 0).unwrap();
    camera.translate(Vector3::new(1.0, 0.0, 0.0));
    let (written, dispatch) = run_frame(&mut octree, &mut camera);

    assert!(dispatch);
    assert_eq!(written.len(), 2);
    assert!(!camera.is_changed());
}

#[test]
fn resize_reaches_the_header() {
    let (mut octree, mut camera) = fresh_pair();
    run_frame(&mut octree, &mut camera);

    camera.set_viewport(1280, 720);
    let frame = OctreeGpuBuffer::synchronize(&mut octree, &mut camera);

    assert!(frame.dispatch);
    let header = header_of(&frame.commands[0]);
    assert_eq!((header.view_width, header.view_height), (1280, 720));
    assert_eq!(header.center, [3.5, 3.5, 3.5, 0.0]);
}

#[test]
fn arena_larger_than_the_default_binding_is_rejected() {
    let limits = wgpu::Limits::default();

    let fits = node_count(128);
    assert_eq!(
        OctreeGpuBuffer::checked_size(fits, &limits).unwrap(),
        OctreeGpuBuffer::buffer_size(fits)
    );

    let too_large = node_count(256);
    match OctreeGpuBuffer::checked_size(too_large, &limits) {
        Err(BufferError::ExceedsLimit {
            buffer,
            size,
            limit,
        }) => {
            assert_eq!(buffer, OCTREE_BUFFER_NAME);
            assert_eq!(size, OctreeGpuBuffer::buffer_size(too_large));
            assert_eq!(limit, u64::from(limits.max_storage_buffer_binding_size));
        }
        other => panic!("expected a limit error, got {:?}", other),
    }
}
