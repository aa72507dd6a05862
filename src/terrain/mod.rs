// ============================================
// Terrain Module - Террейн по карте высот
// ============================================
// Карта высот -> HeightField -> {статический меш с юбкой,
// квадродерево LOD}. Всё строится один раз при загрузке.

mod generation;
mod heightfield;
mod mesh;
mod quadtree;
mod raster;

pub use heightfield::HeightField;
pub use mesh::{TerrainMesh, TerrainVertex};
pub use quadtree::{SelectedBox, TerrainQuadtree};
pub use raster::Raster;

use crate::geometry::BoundingSphere;

/// Шаг тесселяции: сколько текселей карты высот приходится на патч
pub const PATCH_STRIDE: u32 = 16;

/// Террейн целиком: поле высот, меш и квадродерево LOD
pub struct Terrain {
    pub height_field: HeightField,
    pub mesh: TerrainMesh,
    pub quadtree: TerrainQuadtree,
}

impl Terrain {
    pub fn new(height_map: Raster, displacement_map: Raster, patch_stride: u32) -> Self {
        let height_field = HeightField::new(height_map, displacement_map);
        let mesh = TerrainMesh::build(&height_field, patch_stride);
        let quadtree = TerrainQuadtree::build(&height_field, patch_stride, mesh.h_base);

        log::info!(
            "Terrain: {}x{} texels, {} patches, {} quadtree nodes",
            height_field.width(),
            height_field.height(),
            quadtree.patch_count().0 * quadtree.patch_count().1,
            quadtree.node_count(),
        );

        Self { height_field, mesh, quadtree }
    }

    pub fn bounds(&self) -> BoundingSphere {
        self.mesh.bounds
    }

    /// Фактическая высота поверхности (для привязки камеры)
    pub fn surface_height_at(&self, x: f32, y: f32) -> f32 {
        self.height_field.surface_height_at(x, y)
    }
}
