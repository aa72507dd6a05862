// ============================================
// Quadtree - Пространственный индекс LOD
// ============================================
// Рекурсивный индекс над сеткой патчей карты высот. Узлы лежат в
// плоском массиве (арена), дети адресуются индексами — дерево
// принадлежит конкретному террейну и строится один раз: карта высот
// после загрузки неизменна.
//
// Каждый кадр select() обходит дерево сверху вниз (только чтение) и
// отдаёт список боксов: близкие крупные узлы раскрываются в детей,
// остальные отдаются целиком.

use ultraviolet::Vec3;

use super::heightfield::HeightField;

/// Коэффициент раскрытия: узел делится, пока eye ближе K * R
const SPLIT_DISTANCE_FACTOR: f32 = 2.0;

/// Минимальный размер раскрываемой ячейки, в шагах патча
const MIN_SPLIT_CELLS: f32 = 4.0;

const NO_CHILD: u32 = u32::MAX;

#[derive(Clone, Copy, Debug)]
struct QuadtreeNode {
    /// Границы ячейки в единицах патч-сетки
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    aabb_min: Vec3,
    aabb_max: Vec3,
    #[allow(dead_code)]
    level: u32,
    children: [u32; 4],
}

impl QuadtreeNode {
    fn has_children(&self) -> bool {
        self.children.iter().any(|&c| c != NO_CHILD)
    }
}

/// Бокс, выбранный обходом LOD
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectedBox {
    /// Диапазон ячеек патч-сетки [x0..x1) x [y0..y1)
    pub cell_x0: i32,
    pub cell_y0: i32,
    pub cell_x1: i32,
    pub cell_y1: i32,
    pub aabb_min: Vec3,
    pub aabb_max: Vec3,
}

impl SelectedBox {
    /// Мировой XY-бокс (x0, y0, x1, y1)
    pub fn world_xy(&self) -> [f32; 4] {
        [self.aabb_min.x, self.aabb_min.y, self.aabb_max.x, self.aabb_max.y]
    }

    pub fn center(&self) -> Vec3 {
        (self.aabb_min + self.aabb_max) * 0.5
    }

    pub fn extents(&self) -> Vec3 {
        (self.aabb_max - self.aabb_min) * 0.5
    }
}

pub struct TerrainQuadtree {
    nodes: Vec<QuadtreeNode>,
    root: u32,
    patch_stride: u32,
    patch_count_x: i32,
    patch_count_y: i32,
}

impl TerrainQuadtree {
    /// Построение по карте высот. h_base — пол юбки меша, им смещён
    /// диапазон высот каждого узла.
    pub fn build(field: &HeightField, patch_stride: u32, h_base: f32) -> Self {
        assert!(patch_stride >= 1);

        let patch_count_x = ((field.width() / patch_stride) as i32).max(1);
        let patch_count_y = ((field.height() / patch_stride) as i32).max(1);

        let mut tree = Self {
            nodes: Vec::new(),
            root: 0,
            patch_stride,
            patch_count_x,
            patch_count_y,
        };
        tree.root = tree.build_node(field, h_base, 0, 0, patch_count_x, patch_count_y, 0);
        tree
    }

    pub fn patch_count(&self) -> (i32, i32) {
        (self.patch_count_x, self.patch_count_y)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Корневой AABB всего дерева
    pub fn root_aabb(&self) -> (Vec3, Vec3) {
        let n = &self.nodes[self.root as usize];
        (n.aabb_min, n.aabb_max)
    }

    /// Выбор боксов LOD для точки наблюдения. Чистый обход без
    /// мутаций; порядок детей фиксирован, список стабилен.
    pub fn select(&self, eye: Vec3) -> Vec<SelectedBox> {
        let mut out = Vec::new();
        self.select_into(eye, &mut out);
        out
    }

    /// То же, но в переиспользуемый буфер
    pub fn select_into(&self, eye: Vec3, out: &mut Vec<SelectedBox>) {
        out.clear();
        if !self.nodes.is_empty() {
            self.walk(self.root, eye, out);
        }
    }

    fn walk(&self, index: u32, eye: Vec3, out: &mut Vec<SelectedBox>) {
        let node = &self.nodes[index as usize];

        if node.has_children() && self.should_split(node, eye) {
            for &child in &node.children {
                if child != NO_CHILD {
                    self.walk(child, eye, out);
                }
            }
            return;
        }

        out.push(SelectedBox {
            cell_x0: node.x0,
            cell_y0: node.y0,
            cell_x1: node.x1,
            cell_y1: node.y1,
            aabb_min: node.aabb_min,
            aabb_max: node.aabb_max,
        });
    }

    fn should_split(&self, node: &QuadtreeNode, eye: Vec3) -> bool {
        let center = (node.aabb_min + node.aabb_max) * 0.5;
        let ex = (node.aabb_max.x - node.aabb_min.x) * 0.5;
        let ey = (node.aabb_max.y - node.aabb_min.y) * 0.5;
        let r = ex.max(ey);

        let dist = (eye - center).mag() + 1e-3;

        let min_size = MIN_SPLIT_CELLS * self.patch_stride as f32;
        r > min_size && dist < SPLIT_DISTANCE_FACTOR * r
    }

    fn build_node(
        &mut self,
        field: &HeightField,
        h_base: f32,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        level: u32,
    ) -> u32 {
        let stride = self.patch_stride as i32;
        let (z_min, z_max) = self.cell_z_bounds(field, x0, y0, x1, y1);

        let index = self.nodes.len() as u32;
        self.nodes.push(QuadtreeNode {
            x0,
            y0,
            x1,
            y1,
            aabb_min: Vec3::new((x0 * stride) as f32, (y0 * stride) as f32, z_min + h_base),
            aabb_max: Vec3::new((x1 * stride) as f32, (y1 * stride) as f32, z_max + h_base),
            level,
            children: [NO_CHILD; 4],
        });

        // Лист: ячейка не больше 1x1 патча
        if (x1 - x0) <= 1 && (y1 - y0) <= 1 {
            return index;
        }

        // Целочисленная середина; при ширине 1 двигаем на единицу,
        // чтобы не зациклиться на нулевом расщеплении
        let mut mx = (x0 + x1) / 2;
        let mut my = (y0 + y1) / 2;
        if mx == x0 && x1 - x0 > 1 {
            mx = x0 + 1;
        }
        if my == y0 && y1 - y0 > 1 {
            my = y0 + 1;
        }

        let mut children = [NO_CHILD; 4];
        if x0 < mx && y0 < my {
            children[0] = self.build_node(field, h_base, x0, y0, mx, my, level + 1);
        }
        if mx < x1 && y0 < my {
            children[1] = self.build_node(field, h_base, mx, y0, x1, my, level + 1);
        }
        if x0 < mx && my < y1 {
            children[2] = self.build_node(field, h_base, x0, my, mx, y1, level + 1);
        }
        if mx < x1 && my < y1 {
            children[3] = self.build_node(field, h_base, mx, my, x1, y1, level + 1);
        }

        // AABB родителя накрывает диапазон собственной ячейки и детей
        let mut aabb_min = self.nodes[index as usize].aabb_min;
        let mut aabb_max = self.nodes[index as usize].aabb_max;
        for &c in &children {
            if c != NO_CHILD {
                let child = &self.nodes[c as usize];
                aabb_min = Vec3::new(
                    aabb_min.x.min(child.aabb_min.x),
                    aabb_min.y.min(child.aabb_min.y),
                    aabb_min.z.min(child.aabb_min.z),
                );
                aabb_max = Vec3::new(
                    aabb_max.x.max(child.aabb_max.x),
                    aabb_max.y.max(child.aabb_max.y),
                    aabb_max.z.max(child.aabb_max.z),
                );
            }
        }

        let node = &mut self.nodes[index as usize];
        node.children = children;
        node.aabb_min = aabb_min;
        node.aabb_max = aabb_max;

        index
    }

    /// Мин/макс высота ячейки по текселям карты высот
    fn cell_z_bounds(&self, field: &HeightField, x0: i32, y0: i32, x1: i32, y1: i32) -> (f32, f32) {
        let stride = self.patch_stride as i32;
        let px0 = x0 * stride;
        let py0 = y0 * stride;
        let px1 = (x1 * stride - 1).min(field.width() as i32 - 1);
        let py1 = (y1 * stride - 1).min(field.height() as i32 - 1);

        let scale = field.height_scale();
        let mut z_min = f32::MAX;
        let mut z_max = f32::MIN;
        for y in py0..=py1 {
            for x in px0..=px1 {
                let z = field.texel(x, y) * scale;
                z_min = z_min.min(z);
                z_max = z_max.max(z);
            }
        }
        (z_min, z_max)
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

    /// Проверка точного покрытия: каждая ячейка патч-сетки накрыта
    /// ровно одним боксом
    fn assert_tiles_root(tree: &TerrainQuadtree, boxes: &[SelectedBox]) {
        let (px, py) = tree.patch_count();
        let mut coverage = vec![0u32; (px * py) as usize];
        for b in boxes {
            for y in b.cell_y0..b.cell_y1 {
                for x in b.cell_x0..b.cell_x1 {
                    coverage[(y * px + x) as usize] += 1;
                }
            }
        }
        assert!(
            coverage.iter().all(|&c| c == 1),
            "selection must tile the root exactly once"
        );
    }

    #[test]
    fn test_build_counts() {
        let field = flat_field(512);
        let tree = TerrainQuadtree::build(&field, 16, 0.0);
        assert_eq!(tree.patch_count(), (32, 32));
        // 32x32 полное дерево: 1 + 4 + 16 + ... + 1024
        assert_eq!(tree.node_count(), 1 + 4 + 16 + 64 + 256 + 1024);
        let (min, max) = tree.root_aabb();
        assert_eq!(min.x, 0.0);
        assert_eq!(max.x, 512.0);
        assert_eq!(max.y, 512.0);
    }

    #[test]
    fn test_far_eye_returns_root() {
        // Камера высоко над центром: расстояние велико относительно R,
        // дерево не раскрывается
        let field = flat_field(512);
        let tree = TerrainQuadtree::build(&field, 16, 0.0);
        let boxes = tree.select(Vec3::new(256.0, 256.0, 1000.0));
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].cell_x0, 0);
        assert_eq!(boxes[0].cell_y0, 0);
        assert_eq!(boxes[0].cell_x1, 32);
        assert_eq!(boxes[0].cell_y1, 32);
        assert_eq!(boxes[0].world_xy(), [0.0, 0.0, 512.0, 512.0]);
    }

    #[test]
    fn test_near_eye_refines_and_tiles() {
        // Камера у самой поверхности в центре: вокруг неё мелкие боксы,
        // покрытие корня остаётся точным
        let field = flat_field(512);
        let tree = TerrainQuadtree::build(&field, 16, 0.0);
        let boxes = tree.select(Vec3::new(256.0, 256.0, 0.0));
        assert!(boxes.len() > 1);
        assert_tiles_root(&tree, &boxes);

        // Мелкие боксы группируются около центра
        let smallest = boxes
            .iter()
            .min_by(|a, b| {
                let ea = a.extents();
                let eb = b.extents();
                ea.x.max(ea.y).partial_cmp(&eb.x.max(eb.y)).unwrap()
            })
            .unwrap();
        let c = smallest.center();
        assert!((c.x - 256.0).abs() <= 128.0 && (c.y - 256.0).abs() <= 128.0);
    }

    #[test]
    fn test_tiling_various_eyes() {
        let field = flat_field(512);
        let tree = TerrainQuadtree::build(&field, 16, 0.0);
        for eye in [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(511.0, 511.0, 5.0),
            Vec3::new(100.0, 400.0, 50.0),
            Vec3::new(-200.0, 256.0, 10.0),
        ] {
            let boxes = tree.select(eye);
            assert_tiles_root(&tree, &boxes);
        }
    }

    #[test]
    fn test_selection_deterministic() {
        let field = flat_field(512);
        let tree = TerrainQuadtree::build(&field, 16, 0.0);
        let eye = Vec3::new(137.0, 301.0, 12.0);
        assert_eq!(tree.select(eye), tree.select(eye));
    }

    #[test]
    fn test_monotonic_refinement() {
        // Приближение к центру узла никогда не укрупняет бокс над ним
        let field = flat_field(512);
        let tree = TerrainQuadtree::build(&field, 16, 0.0);
        let target = Vec3::new(384.0, 384.0, 16.0); // центр северо-восточной четверти

        let box_area_at = |dist: f32| -> f32 {
            let dir = Vec3::new(-1.0, -1.0, 0.0).normalized();
            let eye = target - dir * dist;
            let boxes = tree.select(eye);
            let hit = boxes
                .iter()
                .find(|b| {
                    target.x >= b.aabb_min.x
                        && target.x < b.aabb_max.x
                        && target.y >= b.aabb_min.y
                        && target.y < b.aabb_max.y
                })
                .expect("selection must cover the target");
            let e = hit.extents();
            e.x * e.y * 4.0
        };

        let mut prev = f32::MAX;
        for dist in [900.0, 600.0, 400.0, 250.0, 120.0, 60.0, 10.0] {
            let area = box_area_at(dist);
            assert!(area <= prev + 1e-3, "refinement must not coarsen");
            prev = area;
        }
    }

    #[test]
    fn test_narrow_grid_makes_progress() {
        // Узкая сетка (ширина 1 патч): принудительное смещение середины
        // не даёт бесконечной рекурсии
        let field = flat_field(64);
        // stride 64 -> 1 патч по каждой оси
        let tree = TerrainQuadtree::build(&field, 64, 0.0);
        assert_eq!(tree.node_count(), 1);
        let boxes = tree.select(Vec3::zero());
        assert_eq!(boxes.len(), 1);
    }

    #[test]
    fn test_aabb_encloses_children() {
        let field = flat_field(256);
        let tree = TerrainQuadtree::build(&field, 16, -5.0);
        for node in &tree.nodes {
            for &c in &node.children {
                if c != NO_CHILD {
                    let child = &tree.nodes[c as usize];
                    assert!(node.aabb_min.x <= child.aabb_min.x);
                    assert!(node.aabb_min.y <= child.aabb_min.y);
                    assert!(node.aabb_min.z <= child.aabb_min.z);
                    assert!(node.aabb_max.x >= child.aabb_max.x);
                    assert!(node.aabb_max.y >= child.aabb_max.y);
                    assert!(node.aabb_max.z >= child.aabb_max.z);
                }
            }
        }
    }
}
