// ============================================
// Terrain Mesh - Сетка патчей + юбка
// ============================================
// Статический меш, строится один раз из карты высот с шагом
// patch_stride. По периметру добавлена «юбка» из вершин, опущенных
// до h_base, чтобы спрятать щели по краю террейна.
// Индексы тела лежат построчно по ячейкам: это позволяет рисовать
// выбранные квадродеревом боксы поддиапазонами.

use rayon::prelude::*;
use ultraviolet::Vec3;

use super::heightfield::HeightField;
use crate::geometry::BoundingSphere;

/// Код юбки: 0 (оставлен про запас), 1..4 — стороны, 5 — обычная вершина
pub const SKIRT_NONE: u32 = 5;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub skirt: u32,
}

impl TerrainVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TerrainVertex>() as wgpu::BufferAddress,
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
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Uint32,
                },
            ],
        }
    }
}

pub struct TerrainMesh {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
    /// Сколько индексов занимает тело (до юбки)
    pub body_index_count: u32,
    /// Ячеек патч-сетки по X и Y
    pub cells_x: u32,
    pub cells_y: u32,
    /// Пол юбки: минимальная высота меша минус 10
    pub h_base: f32,
    /// Сфера всего террейна для грубых тестов видимости
    pub bounds: BoundingSphere,
}

impl TerrainMesh {
    pub fn build(field: &HeightField, patch_stride: u32) -> Self {
        assert!(patch_stride >= 1);

        let patch_x = (field.width() / patch_stride).max(1) as usize;
        let patch_y = (field.height() / patch_stride).max(1) as usize;
        let stride = patch_stride as f32;
        let scale = field.height_scale();

        // --- вершины сетки (параллельно по строкам) ---
        let grid_count = patch_x * patch_y;
        let mut vertices = vec![TerrainVertex::default(); grid_count];
        vertices
            .par_chunks_mut(patch_x)
            .enumerate()
            .for_each(|(py, row)| {
                for (px, v) in row.iter_mut().enumerate() {
                    let sx = px as f32 * stride;
                    let sy = py as f32 * stride;
                    let z = field.texel((px * patch_stride as usize) as i32,
                                        (py * patch_stride as usize) as i32) * scale;
                    let n = field.normal_at(sx, sy);
                    *v = TerrainVertex {
                        position: [sx, sy, z],
                        normal: [n.x, n.y, n.z],
                        skirt: SKIRT_NONE,
                    };
                }
            });

        let mut z_min = f32::MAX;
        let mut z_max = f32::MIN;
        for v in &vertices {
            z_min = z_min.min(v.position[2]);
            z_max = z_max.max(v.position[2]);
        }
        let h_base = z_min - 10.0;

        // --- юбка: четыре стороны, опущенные до h_base ---
        let up = [0.0, 0.0, 1.0];
        let top_y = (patch_y - 1) as f32 * stride;
        let right_x = (patch_x - 1) as f32 * stride;

        let skirt_bottom = vertices.len();
        for px in 0..patch_x {
            vertices.push(TerrainVertex {
                position: [px as f32 * stride, 0.0, h_base],
                normal: up,
                skirt: 1,
            });
        }
        let skirt_top = vertices.len();
        for px in 0..patch_x {
            vertices.push(TerrainVertex {
                position: [px as f32 * stride, top_y, h_base],
                normal: up,
                skirt: 2,
            });
        }
        let skirt_left = vertices.len();
        for py in 0..patch_y {
            vertices.push(TerrainVertex {
                position: [0.0, py as f32 * stride, h_base],
                normal: up,
                skirt: 3,
            });
        }
        let skirt_right = vertices.len();
        for py in 0..patch_y {
            vertices.push(TerrainVertex {
                position: [right_x, py as f32 * stride, h_base],
                normal: up,
                skirt: 4,
            });
        }

        // --- индексы тела, построчно по ячейкам ---
        let cells_x = patch_x - 1;
        let cells_y = patch_y - 1;
        let mut indices = Vec::with_capacity(cells_x * cells_y * 6 + (cells_x + cells_y) * 12);

        for py in 0..cells_y {
            for px in 0..cells_x {
                let v0 = (py * patch_x + px) as u32;
                let v1 = v0 + 1;
                let v2 = v0 + patch_x as u32;
                let v3 = v2 + 1;
                indices.extend_from_slice(&[v0, v1, v2, v2, v1, v3]);
            }
        }
        let body_index_count = indices.len() as u32;

        // --- индексы юбки ---
        let mut quad = |a: u32, b: u32, c: u32, d: u32| {
            indices.extend_from_slice(&[a, b, c, c, b, d]);
        };

        for px in 0..cells_x {
            // низ: юбка + нижний ряд сетки
            quad(
                (skirt_bottom + px) as u32,
                (skirt_bottom + px + 1) as u32,
                px as u32,
                (px + 1) as u32,
            );
        }
        let top_row = patch_x * (patch_y - 1);
        for px in 0..cells_x {
            quad(
                (skirt_top + px + 1) as u32,
                (skirt_top + px) as u32,
                (top_row + px + 1) as u32,
                (top_row + px) as u32,
            );
        }
        for py in 0..cells_y {
            quad(
                (skirt_left + py + 1) as u32,
                (skirt_left + py) as u32,
                ((py + 1) * patch_x) as u32,
                (py * patch_x) as u32,
            );
        }
        for py in 0..cells_y {
            quad(
                (skirt_right + py) as u32,
                (skirt_right + py + 1) as u32,
                (py * patch_x + patch_x - 1) as u32,
                ((py + 1) * patch_x + patch_x - 1) as u32,
            );
        }

        // Сфера по XY-полудиагонали растра
        let hw = field.width() as f32 * 0.5;
        let hh = field.height() as f32 * 0.5;
        let bounds = BoundingSphere::new(
            Vec3::new(hw, hh, (z_min + z_max) * 0.5),
            (hw * hw + hh * hh).sqrt(),
        );

        Self {
            vertices,
            indices,
            body_index_count,
            cells_x: cells_x as u32,
            cells_y: cells_y as u32,
            h_base,
            bounds,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::raster::Raster;

    fn flat_field(size: u32) -> HeightField {
        let mut data = vec![0u8; (size * size * 4) as usize];
        for px in data.chunks_mut(4) {
            px[0] = 128;
            px[3] = 128;
        }
        HeightField::new(
            Raster { data, width: size, height: size },
            Raster::generated_displacement(64),
        )
    }

    #[test]
    fn test_mesh_counts() {
        let field = flat_field(512);
        let mesh = TerrainMesh::build(&field, 16);
        // 32x32 вершины сетки + юбка 2*32 + 2*32
        assert_eq!(mesh.vertices.len(), 32 * 32 + 4 * 32);
        assert_eq!(mesh.cells_x, 31);
        assert_eq!(mesh.cells_y, 31);
        assert_eq!(mesh.body_index_count, 31 * 31 * 6);
        // Юбка: по 31 кваду на сторону
        assert_eq!(mesh.index_count() - mesh.body_index_count, 4 * 31 * 6);
    }

    #[test]
    fn test_flat_mesh_heights() {
        let field = flat_field(512);
        let mesh = TerrainMesh::build(&field, 16);
        let expected = 128.0 / 255.0 * 32.0;
        for v in mesh.vertices.iter().filter(|v| v.skirt == SKIRT_NONE) {
            assert!((v.position[2] - expected).abs() < 1e-3);
        }
        assert!((mesh.h_base - (expected - 10.0)).abs() < 1e-3);
    }

    #[test]
    fn test_skirt_vertices_at_base() {
        let field = flat_field(256);
        let mesh = TerrainMesh::build(&field, 16);
        for v in mesh.vertices.iter().filter(|v| v.skirt != SKIRT_NONE) {
            assert_eq!(v.position[2], mesh.h_base);
        }
    }

    #[test]
    fn test_indices_in_range() {
        let field = flat_field(256);
        let mesh = TerrainMesh::build(&field, 16);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_bounds_cover_grid_corners() {
        let field = flat_field(256);
        let mesh = TerrainMesh::build(&field, 16);
        let r2 = mesh.bounds.radius * mesh.bounds.radius + 1.0;
        for v in &mesh.vertices {
            let dx = v.position[0] - mesh.bounds.center.x;
            let dy = v.position[1] - mesh.bounds.center.y;
            assert!(dx * dx + dy * dy <= r2);
        }
    }
}
