// ============================================
// Math - Матричные и скалярные помощники
// ============================================
// Левосторонняя система (как во всём проекте): X вправо, Y вглубь, Z вверх.
// Матрицы колоночные (column-vector), clip-space глубина 0..1 под wgpu.

use ultraviolet::{Mat4, Vec3, Vec4};

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Билинейная интерполяция четырёх значений (a=00, b=10, c=01, d=11)
#[inline]
pub fn bilerp(a: f32, b: f32, c: f32, d: f32, u: f32, v: f32) -> f32 {
    lerp(lerp(a, b, u), lerp(c, d, u), v)
}

/// Поворот вектора вокруг нормализованной оси (формула Родрига)
pub fn rotate_about_axis(v: Vec3, axis: Vec3, angle_rad: f32) -> Vec3 {
    let (s, c) = angle_rad.sin_cos();
    v * c + axis.cross(v) * s + axis * (axis.dot(v) * (1.0 - c))
}

/// Матрица вида, левосторонняя (аналог XMMatrixLookAtLH)
pub fn look_at_lh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let z_axis = (target - eye).normalized();
    let x_axis = up.cross(z_axis).normalized();
    let y_axis = z_axis.cross(x_axis);

    Mat4::new(
        Vec4::new(x_axis.x, y_axis.x, z_axis.x, 0.0),
        Vec4::new(x_axis.y, y_axis.y, z_axis.y, 0.0),
        Vec4::new(x_axis.z, y_axis.z, z_axis.z, 0.0),
        Vec4::new(-x_axis.dot(eye), -y_axis.dot(eye), -z_axis.dot(eye), 1.0),
    )
}

/// Перспективная проекция, левосторонняя, глубина 0..1
pub fn perspective_fov_lh(fov_y_rad: f32, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
    let h = 1.0 / (fov_y_rad * 0.5).tan();
    let w = h / aspect;
    let range = z_far / (z_far - z_near);

    Mat4::new(
        Vec4::new(w, 0.0, 0.0, 0.0),
        Vec4::new(0.0, h, 0.0, 0.0),
        Vec4::new(0.0, 0.0, range, 1.0),
        Vec4::new(0.0, 0.0, -range * z_near, 0.0),
    )
}

/// Ортографическая проекция по границам, левосторонняя, глубина 0..1
/// (аналог XMMatrixOrthographicOffCenterLH)
pub fn orthographic_off_center_lh(
    l: f32,
    r: f32,
    b: f32,
    t: f32,
    z_near: f32,
    z_far: f32,
) -> Mat4 {
    Mat4::new(
        Vec4::new(2.0 / (r - l), 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 / (t - b), 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0 / (z_far - z_near), 0.0),
        Vec4::new(
            (l + r) / (l - r),
            (t + b) / (b - t),
            z_near / (z_near - z_far),
            1.0,
        ),
    )
}

/// Точка через матрицу с делением на w
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    let v = *m * Vec4::new(p.x, p.y, p.z, 1.0);
    Vec3::new(v.x / v.w, v.y / v.w, v.z / v.w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bilerp_corners() {
        // В углах возвращает сами значения
        assert_eq!(bilerp(1.0, 2.0, 3.0, 4.0, 0.0, 0.0), 1.0);
        assert_eq!(bilerp(1.0, 2.0, 3.0, 4.0, 1.0, 0.0), 2.0);
        assert_eq!(bilerp(1.0, 2.0, 3.0, 4.0, 0.0, 1.0), 3.0);
        assert_eq!(bilerp(1.0, 2.0, 3.0, 4.0, 1.0, 1.0), 4.0);
        assert_eq!(bilerp(0.0, 1.0, 1.0, 2.0, 0.5, 0.5), 1.0);
    }

    #[test]
    fn test_rotate_about_axis() {
        let v = rotate_about_axis(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            std::f32::consts::FRAC_PI_2,
        );
        assert!((v.x - 0.0).abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_look_at_lh_basis() {
        // Камера в начале координат, смотрит вдоль +Y, Z вверх
        let v = look_at_lh(Vec3::zero(), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        // Точка перед камерой уходит в +z вид-пространства
        let p = transform_point(&v, Vec3::new(0.0, 5.0, 0.0));
        assert!((p.z - 5.0).abs() < 1e-4);
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
    }

    #[test]
    fn test_perspective_depth_range() {
        let p = perspective_fov_lh(60f32.to_radians(), 16.0 / 9.0, 0.1, 3000.0);
        let near = transform_point(&p, Vec3::new(0.0, 0.0, 0.1));
        let far = transform_point(&p, Vec3::new(0.0, 0.0, 3000.0));
        assert!(near.z.abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_orthographic_maps_bounds() {
        let p = orthographic_off_center_lh(-10.0, 30.0, -5.0, 15.0, 1.0, 101.0);
        let lo = transform_point(&p, Vec3::new(-10.0, -5.0, 1.0));
        let hi = transform_point(&p, Vec3::new(30.0, 15.0, 101.0));
        assert!((lo.x + 1.0).abs() < 1e-5 && (lo.y + 1.0).abs() < 1e-5 && lo.z.abs() < 1e-5);
        assert!((hi.x - 1.0).abs() < 1e-5 && (hi.y - 1.0).abs() < 1e-5 && (hi.z - 1.0).abs() < 1e-5);
    }
}
