// ============================================
// Frustum - Плоскости фрустума и AABB-тесты
// ============================================
// Общее для камеры, каскадов теней и видимости воды

use ultraviolet::{Mat4, Vec3};

/// Плоскость (nx, ny, nz, d): точка внутри, если n·p + d >= 0
pub type Plane = [f32; 4];

/// Извлекает 6 нормализованных плоскостей frustum из view-projection матрицы
/// Стандартная комбинация строк: left = row4 + row1, right = row4 - row1 и т.д.
pub fn extract_frustum_planes(vp: &Mat4) -> [Plane; 6] {
    let c: [[f32; 4]; 4] = (*vp).into();
    let row = |i: usize| -> [f32; 4] { [c[0][i], c[1][i], c[2][i], c[3][i]] };
    let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

    let mut planes = [
        add(r3, r0), // left
        sub(r3, r0), // right
        add(r3, r1), // bottom
        sub(r3, r1), // top
        add(r3, r2), // near
        sub(r3, r2), // far
    ];
    for p in &mut planes {
        normalize_plane(p);
    }
    planes
}

/// Четыре боковые плоскости (left/right/bottom/top) для каскада теней:
/// near/far каскада покрыты самими границами ортопроекции
pub fn extract_side_planes(vp: &Mat4) -> [Plane; 4] {
    let all = extract_frustum_planes(vp);
    [all[0], all[1], all[2], all[3]]
}

/// AABB полностью снаружи фрустума? Консервативный тест по каждой плоскости:
/// проекция полуразмеров на |нормаль| + запас pad
pub fn aabb_outside_frustum(planes: &[Plane], center: Vec3, extents: Vec3, pad: f32) -> bool {
    for p in planes {
        let s = center.x * p[0] + center.y * p[1] + center.z * p[2] + p[3];
        let r = extents.x * p[0].abs() + extents.y * p[1].abs() + extents.z * p[2].abs() + pad;
        if s + r < 0.0 {
            return true; // полностью вне
        }
    }
    false
}

fn add(a: [f32; 4], b: [f32; 4]) -> Plane {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3]]
}

fn sub(a: [f32; 4], b: [f32; 4]) -> Plane {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2], a[3] - b[3]]
}

fn normalize_plane(p: &mut Plane) {
    let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
    if len > 1e-12 {
        p[0] /= len;
        p[1] /= len;
        p[2] /= len;
        p[3] /= len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{look_at_lh, perspective_fov_lh};

    fn test_view_proj() -> Mat4 {
        let view = look_at_lh(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(0.0, 100.0, 5.0),
            Vec3::new(0.0, 0.0, 1.0),
        );
        let proj = perspective_fov_lh(60f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0);
        proj * view
    }

    #[test]
    fn test_planes_normalized() {
        let planes = extract_frustum_planes(&test_view_proj());
        for p in &planes {
            let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_inside_aabb_kept() {
        // Ящик прямо перед камерой: не должен быть отброшен
        let planes = extract_frustum_planes(&test_view_proj());
        let outside = aabb_outside_frustum(
            &planes,
            Vec3::new(0.0, 50.0, 5.0),
            Vec3::new(1.0, 1.0, 1.0),
            0.0,
        );
        assert!(!outside);
    }

    #[test]
    fn test_far_outside_aabb_rejected() {
        let planes = extract_frustum_planes(&test_view_proj());
        // Далеко позади камеры
        let behind = aabb_outside_frustum(
            &planes,
            Vec3::new(0.0, -500.0, 5.0),
            Vec3::new(1.0, 1.0, 1.0),
            0.0,
        );
        assert!(behind);
        // Далеко сбоку
        let side = aabb_outside_frustum(
            &planes,
            Vec3::new(10000.0, 50.0, 5.0),
            Vec3::new(1.0, 1.0, 1.0),
            0.0,
        );
        assert!(side);
    }

    #[test]
    fn test_padding_keeps_border_box() {
        let planes = extract_frustum_planes(&test_view_proj());
        // Ящик чуть за левой плоскостью: с большим запасом не отбрасывается
        let center = Vec3::new(-80.0, 100.0, 5.0);
        let ext = Vec3::new(1.0, 1.0, 1.0);
        if aabb_outside_frustum(&planes, center, ext, 0.0) {
            assert!(!aabb_outside_frustum(&planes, center, ext, 1000.0));
        }
    }
}
