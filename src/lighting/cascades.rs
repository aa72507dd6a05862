// ============================================
// Shadow Cascades - Каскадные матрицы теней
// ============================================
// По камере и направлению света строятся четыре каскада: три среза
// фрустума камеры по фиксированным глубинам и один «запасной» каскад
// на всю сцену (слот 3), корректный на любом удалении. Каждый каскад:
// ортопроекция по сфере среза, привязка к текселям карты теней
// (убирает мерцание краёв) и матрица перевода в свой квадрант
// атласа 2x2 + четыре боковые плоскости для локального отсечения.

use ultraviolet::{Mat4, Vec3, Vec4};

use crate::camera::Camera;
use crate::geometry::{extract_side_planes, BoundingSphere, Plane};
use crate::math::{look_at_lh, orthographic_off_center_lh, transform_point};

/// Глубины разбиения фрустума камеры, мировые единицы вдоль взгляда
pub const CASCADE_PLANES: [f32; 5] = [0.1, 64.0, 128.0, 256.0, 1200.0];

pub const CASCADE_COUNT: usize = 4;

/// Индекс каскада, покрывающего всю сцену
pub const WHOLE_SCENE_CASCADE: usize = CASCADE_COUNT - 1;

#[derive(Clone, Copy, Debug)]
pub struct ShadowCascade {
    /// Матрица вида-проекции света (уже с привязкой к текселям)
    pub view_proj: Mat4,
    /// То же с переводом в квадрант атласа 2x2
    pub view_proj_tex: Mat4,
    /// Боковые плоскости (left/right/bottom/top), нормализованы;
    /// near/far закрыты границами самой ортопроекции
    pub frustum: [Plane; 4],
}

impl Default for ShadowCascade {
    fn default() -> Self {
        Self {
            view_proj: Mat4::identity(),
            view_proj_tex: Mat4::identity(),
            frustum: [[0.0; 4]; 4],
        }
    }
}

pub struct ShadowCascades {
    shadow_map_size: u32,
    pub cascades: [ShadowCascade; CASCADE_COUNT],
}

impl ShadowCascades {
    pub fn new(shadow_map_size: u32) -> Self {
        Self {
            shadow_map_size,
            cascades: [ShadowCascade::default(); CASCADE_COUNT],
        }
    }

    pub fn shadow_map_size(&self) -> u32 {
        self.shadow_map_size
    }

    /// Пересчёт всех каскадов. Вызывается каждый кадр; прошлое
    /// состояние не используется.
    pub fn update(&mut self, scene_bounds: &BoundingSphere, camera: &Camera, light_dir: Vec3) {
        // Коррекция вырожденного направления — один раз на обновление
        let dir = corrected_light_direction(light_dir);

        // Запас по краю, чтобы не упираться в кромку карты теней
        let offset = (self.shadow_map_size + 8) as f32 / self.shadow_map_size as f32;
        let scene_radius = scene_bounds.radius.ceil() * offset;
        let scene_center = scene_bounds.center;

        // Вид из света: глаз отнесён назад вдоль -dir от центра сцены.
        // up = cross(Y, dir) вырождается при свете вдоль мировой Y —
        // известный краевой случай, вызывающая сторона держит свет
        // в стороне от этой оси.
        let light_pos = scene_center - dir * (2.0 * scene_radius);
        let up = Vec3::unit_y().cross(dir);
        let view = look_at_lh(light_pos, scene_center, up);

        let scene_center_ls = transform_point(&view, scene_center);

        // Три среза фрустума камеры
        for i in 0..WHOLE_SCENE_CASCADE {
            let slice = camera.frustum_slice(CASCADE_PLANES[i], CASCADE_PLANES[i + 1]);
            let radius = slice.bounds.radius.ceil() * offset;
            let c = transform_point(&view, slice.bounds.center);

            // Глубина — по всей сцене вдоль оси света: кастеры за
            // пределами среза всё равно должны отбрасывать тень в него
            let proj = orthographic_off_center_lh(
                c.x - radius,
                c.x + radius,
                c.y - radius,
                c.y + radius,
                c.z - scene_center_ls.z - scene_radius,
                c.z + scene_center_ls.z + scene_radius,
            );

            self.cascades[i] = self.finish_cascade(i, proj * view);
        }

        // Каскад на всю сцену
        let proj = orthographic_off_center_lh(
            scene_center_ls.x - scene_radius,
            scene_center_ls.x + scene_radius,
            scene_center_ls.y - scene_radius,
            scene_center_ls.y + scene_radius,
            scene_center_ls.z - scene_radius,
            scene_center_ls.z + scene_radius,
        );
        self.cascades[WHOLE_SCENE_CASCADE] = self.finish_cascade(WHOLE_SCENE_CASCADE, proj * view);
    }

    fn finish_cascade(&self, index: usize, view_proj: Mat4) -> ShadowCascade {
        let snapped = self.snap_to_texels(view_proj);
        ShadowCascade {
            view_proj: snapped,
            view_proj_tex: atlas_quadrant_matrix(index) * snapped,
            frustum: extract_side_planes(&snapped),
        }
    }

    /// Привязка к текселям: начало мира округляется до ближайшего
    /// текселя карты теней, матрица сдвигается на остаток. Повторное
    /// применение к уже привязанной матрице ничего не меняет.
    fn snap_to_texels(&self, view_proj: Mat4) -> Mat4 {
        let g = self.snap_granularity();
        let origin = view_proj * Vec4::new(0.0, 0.0, 0.0, 1.0);

        let sx = origin.x * g;
        let sy = origin.y * g;
        let dx = (sx.round() - sx) / g;
        let dy = (sy.round() - sy) / g;

        Mat4::from_translation(Vec3::new(dx, dy, 0.0)) * view_proj
    }

    fn snap_granularity(&self) -> f32 {
        let offset = (self.shadow_map_size + 8) as f32 / self.shadow_map_size as f32;
        (self.shadow_map_size as f32 + offset) / 4.0
    }
}

/// Свет с нулевой горизонтальной проекцией, глядящий слишком вверх,
/// принудительно направляется вниз
fn corrected_light_direction(dir: Vec3) -> Vec3 {
    let d = dir.normalized();
    if d.x.abs() < 1e-6 && d.y.abs() < 1e-6 && d.z > -0.5 {
        Vec3::new(0.0, 0.0, -1.0)
    } else {
        d
    }
}

/// Перевод clip-пространства каскада в его квадрант атласа 2x2
fn atlas_quadrant_matrix(index: usize) -> Mat4 {
    let tx = if index < 2 { 0.25 } else { 0.75 };
    let ty = if index % 2 == 0 { 0.25 } else { 0.75 };

    Mat4::new(
        Vec4::new(0.25, 0.0, 0.0, 0.0),
        Vec4::new(0.0, -0.25, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(tx, ty, 0.0, 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> BoundingSphere {
        BoundingSphere::new(Vec3::new(256.0, 256.0, 16.0), 362.0)
    }

    fn mats_close(a: &Mat4, b: &Mat4, tol: f32) -> bool {
        let aa: [[f32; 4]; 4] = (*a).into();
        let bb: [[f32; 4]; 4] = (*b).into();
        for c in 0..4 {
            for r in 0..4 {
                if (aa[c][r] - bb[c][r]).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn test_snap_idempotent() {
        // Повторная привязка уже привязанной матрицы — no-op
        let camera = Camera::new(1280, 720);
        let mut cascades = ShadowCascades::new(1024);
        cascades.update(&scene(), &camera, Vec3::new(0.3, 0.2, -0.9));

        let first: Vec<Mat4> = cascades.cascades.iter().map(|c| c.view_proj).collect();
        cascades.update(&scene(), &camera, Vec3::new(0.3, 0.2, -0.9));
        for (a, c) in first.iter().zip(&cascades.cascades) {
            assert!(mats_close(a, &c.view_proj, 1e-4));
        }
    }

    #[test]
    fn test_slice_corners_inside_cascade() {
        // Опорные углы среза лежат на сфере каскада, значит попадают
        // в его ортобокс (с точностью до сдвига привязки)
        let camera = Camera::new(1280, 720);
        let mut cascades = ShadowCascades::new(1024);
        cascades.update(&scene(), &camera, Vec3::new(0.3, 0.2, -0.9));

        for i in 0..WHOLE_SCENE_CASCADE {
            let slice = camera.frustum_slice(CASCADE_PLANES[i], CASCADE_PLANES[i + 1]);
            let vp = cascades.cascades[i].view_proj;
            for &ci in &[0usize, 4, 7] {
                let p = slice.corners[ci];
                let clip = vp * Vec4::new(p.x, p.y, p.z, 1.0);
                assert!(clip.x.abs() <= 1.05, "corner outside cascade {}", i);
                assert!(clip.y.abs() <= 1.05, "corner outside cascade {}", i);
            }
        }
    }

    #[test]
    fn test_whole_scene_cascade_covers_scene() {
        let camera = Camera::new(1280, 720);
        let mut cascades = ShadowCascades::new(1024);
        let bs = scene();
        cascades.update(&bs, &camera, Vec3::new(0.3, 0.2, -0.9));

        let vp = cascades.cascades[WHOLE_SCENE_CASCADE].view_proj;
        // Точки на сфере сцены по осям — внутри clip-бокса
        for d in [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 0.0),
        ] {
            let p = bs.center + d * bs.radius;
            let clip = vp * Vec4::new(p.x, p.y, p.z, 1.0);
            assert!(clip.x.abs() <= 1.05 && clip.y.abs() <= 1.05);
        }
    }

    #[test]
    fn test_cascade_side_planes_normalized() {
        let camera = Camera::new(1280, 720);
        let mut cascades = ShadowCascades::new(1024);
        cascades.update(&scene(), &camera, Vec3::new(0.3, 0.2, -0.9));

        for c in &cascades.cascades {
            for p in &c.frustum {
                let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
                assert!((len - 1.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_scene_center_inside_side_planes() {
        let camera = Camera::new(1280, 720);
        let mut cascades = ShadowCascades::new(1024);
        let bs = scene();
        cascades.update(&bs, &camera, Vec3::new(0.3, 0.2, -0.9));

        let c = bs.center;
        for p in &cascades.cascades[WHOLE_SCENE_CASCADE].frustum {
            assert!(c.x * p[0] + c.y * p[1] + c.z * p[2] + p[3] >= 0.0);
        }
    }

    #[test]
    fn test_light_direction_correction() {
        // Вертикально вверх — принудительно вниз
        let d = corrected_light_direction(Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(d, Vec3::new(0.0, 0.0, -1.0));
        // Прямо вниз — не трогаем
        let d = corrected_light_direction(Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(d, Vec3::new(0.0, 0.0, -1.0));
        // С горизонтальной составляющей — не трогаем (только нормализация)
        let d = corrected_light_direction(Vec3::new(1.0, 0.0, 1.0));
        assert!((d - Vec3::new(1.0, 0.0, 1.0).normalized()).mag() < 1e-6);
    }

    #[test]
    fn test_quadrant_assignment() {
        // Начало clip-пространства попадает в центр своего квадранта
        for (i, expected) in [(0usize, (0.25, 0.25)), (1, (0.25, 0.75)), (2, (0.75, 0.25)), (3, (0.75, 0.75))] {
            let m = atlas_quadrant_matrix(i);
            let p = m * Vec4::new(0.0, 0.0, 0.5, 1.0);
            assert_eq!((p.x, p.y), expected);
        }
    }
}
