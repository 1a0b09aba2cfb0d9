//! Vertex data structures and layouts for the chunk meshes.
//!
//! Chunk meshes are plain colored triangle lists, so a vertex is a world-space position and
//! an RGBA color.

use cgmath::Point3;

/// A vertex of a chunk mesh.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Color: [f32; 4] (16 bytes)
///
/// Total size: 28 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorVertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Linear RGBA color
    pub color: [f32; 4],
}

impl ColorVertex {
    /// Creates a vertex at an integer lattice point.
    pub fn new(position: Point3<i32>, color: [f32; 4]) -> Self {
        Self {
            position: [position.x as f32, position.y as f32, position.z as f32],
            color,
        }
    }

    /// Returns the vertex buffer layout description for the mesh pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: color (vec4<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Three vertices wound counter-clockwise when seen from outside the voxel.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Triangle {
    /// Corners in winding order
    pub vertices: [ColorVertex; 3],
}

impl Triangle {
    /// Builds a triangle from its three corners.
    pub fn new(a: ColorVertex, b: ColorVertex, c: ColorVertex) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Geometric normal from the winding, not normalised.
    pub fn normal(&self) -> cgmath::Vector3<f32> {
        let [a, b, c] = self.vertices.map(|vertex| cgmath::Vector3::from(vertex.position));
        (b - a).cross(c - a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_struct_size() {
        assert_eq!(std::mem::size_of::<ColorVertex>(), 28);
        assert_eq!(std::mem::size_of::<Triangle>(), 84);
        assert_eq!(
            ColorVertex::desc().array_stride,
            std::mem::size_of::<ColorVertex>() as u64
        );
    }
}
