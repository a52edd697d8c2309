use cgmath::Vector3;

use crate::world::block::{Block, BlockType};
use crate::world::block_registry::BlockRegistry;
use crate::world::chunk_data::ChunkData;
use crate::world::location::ChunkLocation;
use crate::world::mesh::{ChunkMesh, MeshVertex, QuadMesh};
use crate::world::meshing::direction::Direction;
use crate::world::meshing::quad::Quad;

pub mod direction;
pub mod quad;

/// A visible unit face inside a mask slice. Only cells with equal faces are merged into one quad.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct MaskFace {
    block_type: BlockType,
    direction: Direction,
}

/// Binary greedy mesher.
///
/// Every chunk is meshed on its own: voxels outside of the chunk always count as empty, so faces on the chunk
/// border are always emitted.
pub struct GreedyMesher;

impl GreedyMesher {
    /// Meshes a chunk and tessellates the result into world-space vertices.
    pub fn generate_mesh(location: ChunkLocation, data: &ChunkData, registry: &BlockRegistry) -> ChunkMesh {
        let origin = location.to_world_location_f32(data.index());

        let quads = Self::chunk_to_quads(data);
        let quad_meshes: Vec<QuadMesh> = quads
            .iter()
            .map(|quad| Self::quad_to_quad_mesh(quad, origin, registry))
            .collect();

        ChunkMesh::new(quads, quad_meshes)
    }

    /// Produces the merged visible faces of a chunk in chunk-local coordinates.
    ///
    /// Axes are swept in x, y, z order. Within a slice, cells are scanned row by row along the second in-plane
    /// axis and merged width first.
    pub fn chunk_to_quads(data: &ChunkData) -> Vec<Quad> {
        let mut quads = Vec::new();

        if data
            .uniform_block()
            .is_some_and(Block::is_empty)
        {
            return quads;
        }

        let n = data.size();
        let mut mask: Vec<Option<MaskFace>> = vec![None; n * n];

        for d in 0..3 {
            let u = (d + 1) % 3;
            let v = (d + 2) % 3;

            let mut step = [0; 3];
            step[d] = 1;

            // p = -1 catches the faces on the negative border of the chunk
            for p in -1..n as i32 {
                let mut x = [0; 3];
                x[d] = p;

                for (cell, (xv, xu)) in mask
                    .iter_mut()
                    .zip(itertools::iproduct!(0..n as i32, 0..n as i32))
                {
                    x[u] = xu;
                    x[v] = xv;

                    let current = voxel(data, x);
                    let next = voxel(data, [x[0] + step[0], x[1] + step[1], x[2] + step[2]]);
                    *cell = face_between(current, next, d);
                }

                merge_slice(&mut mask, n, [d, u, v], p + 1, &mut quads);
            }
        }

        quads
    }

    /// Splits a quad into two triangles placed at `origin`, in the vertex order rb, rt, lb, lt, rt, lb.
    ///
    /// Texture coordinates come from the two axes that vary across the quad: x-constant quads map (z, y),
    /// y-constant quads map (x, z) and z-constant quads map (x, y).
    pub fn quad_to_quad_mesh(quad: &Quad, origin: Vector3<f32>, registry: &BlockRegistry) -> QuadMesh {
        let constant_axis = constant_axis(quad);
        // unknown block types fall back to the first texture layer
        let texture_index = registry
            .texture_index(quad.block_type, quad.direction.side())
            .unwrap_or_default();
        let normal = quad.direction.to_vec();
        let normal = [normal.x as f32, normal.y as f32, normal.z as f32];

        let vertex = |corner: Vector3<i32>| {
            let position = origin + Vector3::new(corner.x as f32, corner.y as f32, corner.z as f32);
            let uv = match constant_axis {
                0 => [position.z, position.y],
                1 => [position.x, position.z],
                _ => [position.x, position.y],
            };

            MeshVertex {
                position: position.into(),
                uv,
                normal,
                texture_index,
            }
        };

        let lt = vertex(quad.lt());
        let rt = vertex(quad.rt());
        let lb = vertex(quad.lb());
        let rb = vertex(quad.rb());

        QuadMesh {
            vertices: [rb, rt, lb, lt, rt, lb],
        }
    }
}

fn voxel(data: &ChunkData, position: [i32; 3]) -> Block {
    data.get(position[0], position[1], position[2])
        .unwrap_or(Block::EMPTY)
}

/// The face between two voxels neighbouring along `axis`, owned by whichever of them is solid.
fn face_between(current: Block, next: Block, axis: usize) -> Option<MaskFace> {
    match (current.is_solid(), next.is_solid()) {
        (true, false) => Some(MaskFace {
            block_type: current.ty,
            direction: Direction::from_axis(axis, true),
        }),
        (false, true) => Some(MaskFace {
            block_type: next.ty,
            direction: Direction::from_axis(axis, false),
        }),
        _ => None,
    }
}

/// Greedily merges one mask slice into quads lying on the plane `plane` of axis `axes[0]`. Clears the mask.
fn merge_slice(mask: &mut [Option<MaskFace>], n: usize, axes: [usize; 3], plane: i32, quads: &mut Vec<Quad>) {
    let [d, u, v] = axes;

    for j in 0..n {
        let mut i = 0;
        while i < n {
            let Some(face) = mask[j * n + i] else {
                i += 1;
                continue;
            };

            let mut width = 1;
            while i + width < n && mask[j * n + i + width] == Some(face) {
                width += 1;
            }

            let mut height = 1;
            'grow: while j + height < n {
                let row = (j + height) * n + i;
                if mask[row..row + width]
                    .iter()
                    .any(|cell| *cell != Some(face))
                {
                    break 'grow;
                }
                height += 1;
            }

            let mut origin = Vector3::new(0, 0, 0);
            origin[d] = plane;
            origin[u] = i as i32;
            origin[v] = j as i32;

            let mut du = Vector3::new(0, 0, 0);
            du[u] = width as i32;
            let mut dv = Vector3::new(0, 0, 0);
            dv[v] = height as i32;

            quads.push(Quad::new(origin, du, dv, face.direction, face.block_type));

            for row in j..j + height {
                mask[row * n + i..row * n + i + width].fill(None);
            }

            i += width;
        }
    }
}

fn constant_axis(quad: &Quad) -> usize {
    let lt = quad.lt();
    (0..3)
        .find(|&axis| {
            quad.corners
                .iter()
                .all(|corner| corner[axis] == lt[axis])
        })
        .unwrap_or(quad.direction.axis())
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;
    use hashbrown::HashSet;

    use crate::world::block::{Block, BlockType};
    use crate::world::block_registry::BlockRegistry;
    use crate::world::chunk_data::ChunkData;
    use crate::world::index::Index3;
    use crate::world::location::ChunkLocation;
    use crate::world::meshing::direction::Direction;
    use crate::world::meshing::quad::Quad;
    use crate::world::meshing::GreedyMesher;

    const DIRT: Block = Block::new(BlockType(2));
    const STONE: Block = Block::new(BlockType(5));

    fn flat_layer(size: usize) -> ChunkData {
        let mut data = ChunkData::empty(Index3::new(size).unwrap());
        data.fill_layers(1, DIRT);
        data
    }

    fn random_chunk(size: usize, seed: u64) -> ChunkData {
        let index = Index3::new(size).unwrap();
        let mut rng = fastrand::Rng::with_seed(seed);
        let blocks = (0..index.volume())
            .map(|_| match rng.u8(0..10) {
                0..=3 => DIRT,
                4..=5 => STONE,
                _ => Block::EMPTY,
            })
            .collect();
        ChunkData::from_blocks(index, blocks).unwrap()
    }

    /// Expands quads into unit faces, identified by the solid voxel they belong to and their direction.
    fn unit_faces(data: &ChunkData, quads: &[Quad]) -> Vec<(Vector3<i32>, Direction)> {
        let mut faces = Vec::new();
        for quad in quads {
            let d = quad.direction.axis();
            let du = quad.rt() - quad.lt();
            let dv = quad.lb() - quad.lt();
            let step_u = du / quad.width();
            let step_v = dv / quad.height();

            for a in 0..quad.width() {
                for b in 0..quad.height() {
                    let mut voxel = quad.lt() + step_u * a + step_v * b;
                    if quad.direction.is_positive() {
                        voxel[d] -= 1;
                    }
                    assert_eq!(data.get(voxel.x, voxel.y, voxel.z).unwrap().ty, quad.block_type);
                    faces.push((voxel, quad.direction));
                }
            }
        }
        faces
    }

    fn expected_faces(data: &ChunkData) -> HashSet<(Vector3<i32>, Direction)> {
        let mut faces = HashSet::new();
        for position in data.index().iter() {
            if !data.is_solid(position.x, position.y, position.z) {
                continue;
            }
            for direction in [
                Direction::XPos,
                Direction::XNeg,
                Direction::YPos,
                Direction::YNeg,
                Direction::ZPos,
                Direction::ZNeg,
            ] {
                let neighbor = position + direction.to_vec();
                if !data.is_solid(neighbor.x, neighbor.y, neighbor.z) {
                    faces.insert((position, direction));
                }
            }
        }
        faces
    }

    #[test]
    fn test_empty_chunk_has_no_quads() {
        let data = ChunkData::empty(Index3::new(8).unwrap());
        assert!(GreedyMesher::chunk_to_quads(&data).is_empty());

        let dense_but_empty = ChunkData::from_blocks(Index3::new(2).unwrap(), vec![Block::EMPTY; 8]).unwrap();
        assert!(GreedyMesher::chunk_to_quads(&dense_but_empty).is_empty());
    }

    #[test]
    fn test_solid_chunk_has_one_quad_per_face() {
        for size in [1, 2, 5, 16, 32] {
            let data = ChunkData::uniform(Index3::new(size).unwrap(), STONE);
            let quads = GreedyMesher::chunk_to_quads(&data);

            assert_eq!(quads.len(), 6, "chunk size {size}");
            for quad in &quads {
                assert_eq!(quad.width(), size as i32);
                assert_eq!(quad.height(), size as i32);
                assert_eq!(quad.block_type, STONE.ty);
            }
            let directions: HashSet<Direction> = quads.iter().map(|quad| quad.direction).collect();
            assert_eq!(directions.len(), 6);
        }
    }

    #[test]
    fn test_flat_layer_has_six_quads() {
        for size in [1, 2, 3, 8, 32] {
            let quads = GreedyMesher::chunk_to_quads(&flat_layer(size));
            let n = size as i32;

            assert_eq!(quads.len(), 6, "chunk size {size}");
            for quad in &quads {
                match quad.direction {
                    Direction::YPos | Direction::YNeg => assert_eq!(quad.area(), n * n),
                    _ => {
                        assert_eq!(quad.area(), n);
                        assert_eq!(quad.width().min(quad.height()), 1);
                    }
                }
            }

            let top = quads
                .iter()
                .find(|quad| quad.direction == Direction::YPos)
                .unwrap();
            assert!(top.corners.iter().all(|corner| corner.y == 1));
        }
    }

    #[test]
    fn test_quad_corner_order() {
        let mut data = ChunkData::empty(Index3::new(2).unwrap());
        data.set(0, 0, 0, DIRT).unwrap();

        let quads = GreedyMesher::chunk_to_quads(&data);
        assert_eq!(quads.len(), 6);

        // first sweep is along x, the in-plane axes are y (right) and z (bottom)
        assert_eq!(quads[0].direction, Direction::XNeg);
        assert_eq!(
            quads[0].corners,
            [
                Vector3::new(0, 0, 0),
                Vector3::new(0, 1, 0),
                Vector3::new(0, 0, 1),
                Vector3::new(0, 1, 1)
            ]
        );
        assert_eq!(quads[1].direction, Direction::XPos);
        assert_eq!(quads[1].lt(), Vector3::new(1, 0, 0));
    }

    #[test]
    fn test_quads_cover_every_visible_face_exactly_once() {
        for seed in 0..4 {
            let data = random_chunk(8, seed);
            let quads = GreedyMesher::chunk_to_quads(&data);

            let faces = unit_faces(&data, &quads);
            let unique: HashSet<_> = faces.iter().copied().collect();

            assert_eq!(faces.len(), unique.len(), "a unit face was covered twice");
            assert_eq!(unique, expected_faces(&data));
        }
    }

    #[test]
    fn test_meshing_is_deterministic() {
        let data = random_chunk(16, 42);

        assert_eq!(GreedyMesher::chunk_to_quads(&data), GreedyMesher::chunk_to_quads(&data));
    }

    #[test]
    fn test_different_block_types_are_not_merged() {
        let index = Index3::new(4).unwrap();
        let mut data = ChunkData::empty(index);
        data.fill_layers(1, DIRT);
        for z in 0..4 {
            data.set(3, 0, z, STONE).unwrap();
        }

        let quads = GreedyMesher::chunk_to_quads(&data);
        let tops: Vec<&Quad> = quads
            .iter()
            .filter(|quad| quad.direction == Direction::YPos)
            .collect();

        assert_eq!(tops.len(), 2);
        assert_eq!(tops.iter().map(|quad| quad.area()).sum::<i32>(), 16);
    }

    #[test]
    fn test_tessellation() {
        let registry = BlockRegistry::builtin().unwrap();
        let grass = registry.block_type("grass").unwrap();
        // y-constant quad: right runs along z, bottom along x
        let quad = Quad::new(
            Vector3::new(0, 1, 0),
            Vector3::new(0, 0, 2),
            Vector3::new(3, 0, 0),
            Direction::YPos,
            grass,
        );

        let mesh = GreedyMesher::quad_to_quad_mesh(&quad, Vector3::new(16.0, 0.0, 0.0), &registry);
        let positions: Vec<[f32; 3]> = mesh.vertices.iter().map(|vertex| vertex.position).collect();

        let lt = [16.0, 1.0, 0.0];
        let rt = [16.0, 1.0, 2.0];
        let lb = [19.0, 1.0, 0.0];
        let rb = [19.0, 1.0, 2.0];
        assert_eq!(positions, vec![rb, rt, lb, lt, rt, lb]);

        for vertex in &mesh.vertices {
            assert_eq!(vertex.uv, [vertex.position[0], vertex.position[2]]);
            assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
            assert_eq!(vertex.texture_index, registry.texture_index(grass, crate::world::block::Side::Top).unwrap());
        }
    }

    #[test]
    fn test_z_constant_quads_map_x_and_y() {
        let registry = BlockRegistry::builtin().unwrap();
        let stone = registry.block_type("stone").unwrap();
        let quad = Quad::new(
            Vector3::new(0, 0, 4),
            Vector3::new(0, 2, 0),
            Vector3::new(3, 0, 0),
            Direction::ZPos,
            stone,
        );

        let mesh = GreedyMesher::quad_to_quad_mesh(&quad, Vector3::new(0.0, 32.0, -8.0), &registry);

        // rb is the far corner, origin + (3, 2, 4)
        assert_eq!(mesh.vertices[0].position, [3.0, 34.0, -4.0]);
        assert_eq!(mesh.vertices[0].uv, [3.0, 34.0]);
        for vertex in &mesh.vertices {
            assert_eq!(vertex.position[2], -4.0);
            assert_eq!(vertex.uv, [vertex.position[0], vertex.position[1]]);
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
            assert_eq!(
                vertex.texture_index,
                registry.texture_index(stone, crate::world::block::Side::North).unwrap()
            );
        }
    }

    #[test]
    fn test_generate_mesh_offsets_by_chunk_location() {
        let registry = BlockRegistry::builtin().unwrap();
        let data = flat_layer(4);

        let mesh = GreedyMesher::generate_mesh(ChunkLocation::new(1, 0, -1), &data, &registry);

        assert_eq!(mesh.quads().len(), 6);
        assert_eq!(mesh.vertices().len(), 36);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.position_uv_floats().len(), 36 * 5);
        for vertex in mesh.vertices() {
            assert!((4.0..=8.0).contains(&vertex.position[0]));
            assert!((-4.0..=0.0).contains(&vertex.position[2]));
        }

        let side = mesh
            .quads()
            .iter()
            .position(|quad| quad.direction == Direction::XNeg)
            .unwrap();
        for vertex in &mesh.vertices()[side * 6..side * 6 + 6] {
            assert_eq!(vertex.uv, [vertex.position[2], vertex.position[1]]);
        }
    }
}
