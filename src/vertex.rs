//! # Vertex Module
//!
//! This module provides the `Vertex` struct and its associated methods for defining and managing
//! vertex data for the lit, textured mesh. Each vertex carries a position, a normal used by the
//! lighting model, a color multiplied into the base color, and texture coordinates for sampling
//! the albedo texture.
//!
//! Meshes are loaded from disk by [`crate::resources`] and expanded into a flat triangle list of
//! `Vertex` values, which is uploaded as-is into the vertex buffer of the [`crate::Scene`].
//!
//! ```ignore
//! use wgpu::util::DeviceExt;
//!
//! let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
//!     label: Some("Vertex Buffer"),
//!     contents: bytemuck::cast_slice(&vertices),
//!     usage: wgpu::BufferUsages::VERTEX,
//! });
//! ```
//!
//! The attribute locations must match the `VertexInput` struct of the WGSL shader:
//!
//! | location | field      | format      |
//! |----------|------------|-------------|
//! | 0        | `position` | `Float32x3` |
//! | 1        | `normal`   | `Float32x3` |
//! | 2        | `color`    | `Float32x3` |
//! | 3        | `uv`       | `Float32x2` |

/// A single vertex of the rendered mesh.
///
/// The struct is `#[repr(C)]` and `Pod` so a slice of vertices can be cast directly into the
/// bytes of a vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in model space (Z up).
    pub position: [f32; 3],

    /// Surface normal in model space, used for the diffuse and specular terms.
    pub normal: [f32; 3],

    /// Per-vertex color in the `[0.0, 1.0]` range.
    pub color: [f32; 3],

    /// Texture coordinates with the origin at the top-left of the image.
    pub uv: [f32; 2],
}

impl Vertex {
    /// Generates the vertex attributes layout for the `Vertex` struct.
    ///
    /// The offsets follow the field order of the struct, so the GPU reads each attribute from
    /// the same bytes `bytemuck` wrote it to.
    pub fn vertex_attributes() -> Vec<wgpu::VertexAttribute> {
        wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x3,
            3 => Float32x2
        ]
        .to_vec()
    }

    /// Returns the vertex buffer layout for the `Vertex` struct.
    ///
    /// The stride is the size of one `Vertex` and the buffer advances once per vertex.
    pub fn description(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex>(), 44);
        let attributes = Vertex::vertex_attributes();
        let layout = Vertex::description(&attributes);
        assert_eq!(layout.array_stride, 44);
    }

    #[test]
    fn attribute_offsets_follow_fields() {
        let attributes = Vertex::vertex_attributes();
        let offsets: Vec<_> = attributes.iter().map(|a| a.offset).collect();
        let locations: Vec<_> = attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(offsets, vec![0, 12, 24, 36]);
        assert_eq!(locations, vec![0, 1, 2, 3]);
    }
}
