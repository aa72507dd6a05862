// ============================================
// Day/Night Cycle - Цикл дня и ночи
// ============================================
// Солнце ходит по небу за period секунд; цвет диффуза/спекуляра
// интерполируется по 12 опорным точкам суток. Сюда же выведена
// пауза анимации (пробел).

use ultraviolet::Vec3;

use super::light::DirectionalLight;

const SUN_DIFFUSE_COLORS: [[f32; 3]; 12] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.9, 0.2, 0.2],
    [0.98, 0.86, 0.2],
    [0.8, 0.8, 0.6],
    [0.8, 0.8, 0.8],
    [0.8, 0.8, 0.6],
    [0.98, 0.86, 0.2],
    [0.9, 0.2, 0.2],
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
];

const SUN_SPECULAR_COLORS: [[f32; 3]; 12] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.5, 0.5, 0.5],
    [0.8, 0.8, 0.8],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.8, 0.8, 0.8],
    [0.5, 0.5, 0.5],
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
];

pub struct DayNightCycle {
    /// Длительность полных суток в секундах
    period: f32,
    /// Нормализованное время суток, 0.0 = полночь, 0.5 = полдень
    time: f32,
    paused: bool,
    sun: DirectionalLight,
}

impl DayNightCycle {
    pub fn new(period: f32) -> Self {
        let mut cycle = Self {
            period,
            time: 0.5, // стартуем в полдень
            paused: true,
            sun: DirectionalLight::default(),
        };
        cycle.refresh_sun();
        cycle
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn light(&self) -> DirectionalLight {
        self.sun
    }

    pub fn update(&mut self, dt: f32) {
        if !self.paused {
            self.time = (self.time + dt / self.period).rem_euclid(1.0);
        }
        self.refresh_sun();
    }

    fn refresh_sun(&mut self) {
        let angle = (self.time - 0.25) * std::f32::consts::TAU;

        // Высота солнца не опускается ниже малого порога, а небольшой
        // сдвиг по X уводит направление от оси up вида света
        let dir = Vec3::new(0.35, -angle.cos(), -angle.sin().max(0.15)).normalized();
        self.sun.set_direction(dir);

        // Интерполяция по 12 опорным цветам суток
        let t = self.time * 12.0;
        let i = (t.floor() as usize) % 12;
        let j = (i + 1) % 12;
        let f = t.fract();

        self.sun.diffuse = lerp3(SUN_DIFFUSE_COLORS[i], SUN_DIFFUSE_COLORS[j], f);
        self.sun.specular = lerp3(SUN_SPECULAR_COLORS[i], SUN_SPECULAR_COLORS[j], f);
    }
}

fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> Vec3 {
    Vec3::new(
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noon_sun_points_down() {
        let cycle = DayNightCycle::new(600.0);
        let dir = cycle.light().direction;
        assert!(dir.z < -0.8);
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut cycle = DayNightCycle::new(600.0);
        let t0 = cycle.time();
        cycle.update(10.0);
        assert_eq!(cycle.time(), t0);

        cycle.toggle_pause();
        cycle.update(10.0);
        assert!(cycle.time() != t0);
    }

    #[test]
    fn test_time_wraps() {
        let mut cycle = DayNightCycle::new(1.0);
        cycle.toggle_pause();
        for _ in 0..100 {
            cycle.update(0.173);
        }
        assert!((0.0..1.0).contains(&cycle.time()));
    }

    #[test]
    fn test_direction_always_normalized_and_down() {
        let mut cycle = DayNightCycle::new(1.0);
        cycle.toggle_pause();
        for _ in 0..50 {
            cycle.update(0.02);
            let d = cycle.light().direction;
            assert!((d.mag() - 1.0).abs() < 1e-5);
            assert!(d.z < 0.0);
        }
    }
}
