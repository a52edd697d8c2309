use bytemuck::{Pod, Zeroable};

use crate::world::meshing::quad::Quad;

/// One vertex of a tessellated quad, laid out for direct upload into a vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
    pub texture_index: u32,
}

static_assertions::const_assert_eq!(size_of::<MeshVertex>(), 36);

/// A single quad split into two triangles.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QuadMesh {
    pub vertices: [MeshVertex; 6],
}

/// The renderable surface of one chunk.
#[derive(Clone, Debug, Default)]
pub struct ChunkMesh {
    quads: Vec<Quad>,
    vertices: Vec<MeshVertex>,
}

impl ChunkMesh {
    pub fn new(quads: Vec<Quad>, quad_meshes: impl IntoIterator<Item = QuadMesh>) -> Self {
        let vertices = quad_meshes
            .into_iter()
            .flat_map(|quad_mesh| quad_mesh.vertices)
            .collect();

        Self { quads, vertices }
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Interleaved `x, y, z, u, v` floats, five per vertex.
    pub fn position_uv_floats(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|vertex| {
                let [x, y, z] = vertex.position;
                let [u, v] = vertex.uv;
                [x, y, z, u, v]
            })
            .collect()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn memory_size(&self) -> usize {
        size_of_val(self.quads.as_slice()) + size_of_val(self.vertices.as_slice())
    }
}
