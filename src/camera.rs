// ============================================
// Camera - Свободная камера (Z вверх)
// ============================================
// Yaw/pitch/roll поверх стартового базиса, перемещение вдоль
// look/left/up. Отсюда же считаются плоскости фрустума и срезы
// фрустума для каскадов теней.

use ultraviolet::{Mat4, Vec3};

use crate::geometry::{extract_frustum_planes, BoundingSphere, Plane};
use crate::math::{look_at_lh, perspective_fov_lh, rotate_about_axis};

/// Срез фрустума камеры по диапазону глубины [z_near, z_far]
/// Восемь мировых углов + грубая сфера по трём характерным углам
#[derive(Clone, Copy, Debug)]
pub struct FrustumSlice {
    /// nlb, nrb, nlt, nrt, flb, frb, flt, frt
    pub corners: [Vec3; 8],
    pub bounds: BoundingSphere,
}

pub struct Camera {
    projection: Mat4,
    view: Mat4,

    position: Vec3,
    start_look: Vec3,
    start_left: Vec3,
    start_up: Vec3,
    cur_look: Vec3,
    cur_left: Vec3,
    cur_up: Vec3,

    yaw: f32,
    pitch: f32,
    roll: f32,

    fov_vertical: f32,
    fov_horizontal: f32,
    z_near: f32,
    z_far: f32,
}

const WORLD_UP: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let fov_vertical = 60.0f32;
        let aspect = width as f32 / height as f32;
        let fov_horizontal =
            ((fov_vertical.to_radians() * 0.5).tan() * aspect).atan().to_degrees() * 2.0;

        let z_near = 0.1;
        let z_far = 3000.0;
        let projection = perspective_fov_lh(fov_vertical.to_radians(), aspect, z_near, z_far);

        let start_look = Vec3::new(1.0, 1.0, 0.0).normalized();
        let start_left = start_look.cross(WORLD_UP).normalized();
        let start_up = start_left.cross(start_look).normalized();

        let mut cam = Self {
            projection,
            view: Mat4::identity(),
            position: Vec3::new(450.0, -300.0, 250.0),
            start_look,
            start_left,
            start_up,
            cur_look: start_look,
            cur_left: start_left,
            cur_up: start_up,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            fov_vertical,
            fov_horizontal,
            z_near,
            z_far,
        };
        cam.update();
        cam
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let aspect = width as f32 / height as f32;
        self.fov_horizontal =
            ((self.fov_vertical.to_radians() * 0.5).tan() * aspect).atan().to_degrees() * 2.0;
        self.projection =
            perspective_fov_lh(self.fov_vertical.to_radians(), aspect, self.z_near, self.z_far);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look(&self) -> Vec3 {
        self.cur_look
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Шесть нормализованных плоскостей фрустума камеры
    pub fn view_frustum(&self) -> [Plane; 6] {
        extract_frustum_planes(&self.view_projection())
    }

    /// Перемещение в локальном базисе: x вдоль взгляда, y влево, z вверх
    pub fn translate(&mut self, movement: Vec3) {
        self.position += self.cur_look * movement.x
            + self.cur_left * movement.y
            + self.cur_up * movement.z;
        self.update();
    }

    pub fn pitch(&mut self, theta: f32) {
        self.pitch = wrap_angle(self.pitch + theta);
        self.update();
    }

    pub fn yaw(&mut self, theta: f32) {
        self.yaw = wrap_angle(self.yaw + theta);
        self.update();
    }

    pub fn roll(&mut self, theta: f32) {
        self.roll = wrap_angle(self.roll + theta);
        self.update();
    }

    /// Жёсткая установка позиции (привязка к высоте террейна)
    pub fn lock_position(&mut self, p: Vec3) {
        self.position = p;
        self.update();
    }

    /// Мировые углы среза фрустума [z_near, z_far] и его сфера.
    /// Сфера строится по трём углам (nlb, flb, frt) — дешёвая оценка,
    /// а не минимальная сфера всех восьми.
    pub fn frustum_slice(&self, z_near: f32, z_far: f32) -> FrustumSlice {
        let tan_half_h = (self.fov_horizontal.to_radians() * 0.5).tan();
        let tan_half_v = (self.fov_vertical.to_radians() * 0.5).tan();

        let x_near = z_near * tan_half_h;
        let x_far = z_far * tan_half_h;
        let y_near = z_near * tan_half_v;
        let y_far = z_far * tan_half_v;

        // Вид-пространство: x вправо, y вверх, z вперёд
        let right = -self.cur_left;
        let up = self.cur_up;
        let near_c = self.position + self.cur_look * z_near;
        let far_c = self.position + self.cur_look * z_far;

        let nlb = near_c - right * x_near - up * y_near;
        let nrb = near_c + right * x_near - up * y_near;
        let nlt = near_c - right * x_near + up * y_near;
        let nrt = near_c + right * x_near + up * y_near;
        let flb = far_c - right * x_far - up * y_far;
        let frb = far_c + right * x_far - up * y_far;
        let flt = far_c - right * x_far + up * y_far;
        let frt = far_c + right * x_far + up * y_far;

        FrustumSlice {
            corners: [nlb, nrb, nlt, nrt, flb, frb, flt, frt],
            bounds: BoundingSphere::from_three_points(nlb, flb, frt),
        }
    }

    fn update(&mut self) {
        let pitch = self.pitch.to_radians();
        let yaw = self.yaw.to_radians();
        let roll = self.roll.to_radians();

        let look0 = self.start_look;
        let left0 = self.start_left;
        let up0 = self.start_up;

        // Порядок как в базисе: сначала pitch, затем yaw, затем roll
        let rot = |v: Vec3| -> Vec3 {
            let v = rotate_about_axis(v, left0, pitch);
            let v = rotate_about_axis(v, up0, yaw);
            rotate_about_axis(v, look0, roll)
        };

        self.cur_look = rot(look0).normalized();
        self.cur_left = rot(left0).normalized();
        self.cur_up = self.cur_left.cross(self.cur_look).normalized();

        self.view = look_at_lh(self.position, self.position + self.cur_look, self.cur_up);
    }
}

fn wrap_angle(mut a: f32) -> f32 {
    if a > 360.0 {
        a -= 360.0;
    } else if a < -360.0 {
        a += 360.0;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_corner_count_and_symmetry() {
        let cam = Camera::new(1280, 720);
        let slice = cam.frustum_slice(0.1, 64.0);
        // Центр дальней грани лежит на оси взгляда
        let far_center = (slice.corners[4] + slice.corners[5] + slice.corners[6] + slice.corners[7]) / 4.0;
        let expected = cam.position() + cam.look() * 64.0;
        assert!((far_center - expected).mag() < 1e-2);
    }

    #[test]
    fn test_slice_sphere_touches_seed_corners() {
        let cam = Camera::new(1280, 720);
        let slice = cam.frustum_slice(64.0, 128.0);
        // Три опорных угла равноудалены от центра сферы
        for &i in &[0usize, 4, 7] {
            let d = (slice.corners[i] - slice.bounds.center).mag();
            assert!((d - slice.bounds.radius).abs() < 1e-2);
        }
    }

    #[test]
    fn test_cascade_slices_grow() {
        // Свойство: у более дальних срезов радиус сферы не меньше
        let cam = Camera::new(1280, 720);
        let table = [0.1f32, 64.0, 128.0, 256.0];
        let mut prev = 0.0f32;
        for i in 0..3 {
            let r = cam.frustum_slice(table[i], table[i + 1]).bounds.radius;
            assert!(r >= prev);
            prev = r;
        }
    }

    #[test]
    fn test_frustum_contains_look_target() {
        let cam = Camera::new(1280, 720);
        let planes = cam.view_frustum();
        let p = cam.position() + cam.look() * 100.0;
        for pl in &planes {
            assert!(p.x * pl[0] + p.y * pl[1] + p.z * pl[2] + pl[3] > 0.0);
        }
    }

    #[test]
    fn test_yaw_wraps() {
        let mut cam = Camera::new(1280, 720);
        for _ in 0..100 {
            cam.yaw(30.0);
        }
        // Не накапливается за пределами +-360
        let p = cam.position();
        assert!(p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
    }
}
