// ============================================
// Bounding Sphere - Ограничивающая сфера
// ============================================

use ultraviolet::Vec3;

/// Ограничивающая сфера. Инвариант: radius >= 0.
#[derive(Clone, Copy, Debug)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        debug_assert!(radius >= 0.0);
        Self { center, radius }
    }

    /// Наименьшая сфера, проходящая через три точки (описанная окружность
    /// треугольника, поднятая до сферы). Используется для грубой оценки
    /// среза фрустума по трём характерным углам.
    pub fn from_three_points(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let ab = b - a;
        let ac = c - a;
        let n = ab.cross(ac);
        let denom = 2.0 * n.mag_sq();

        if denom < 1e-10 {
            // Вырожденный (коллинеарный) случай: сфера на самой длинной хорде
            let (p, q) = longest_chord(a, b, c);
            let center = (p + q) * 0.5;
            return Self::new(center, (q - p).mag() * 0.5);
        }

        let offset = (n.cross(ab) * ac.mag_sq() + ac.cross(n) * ab.mag_sq()) / denom;
        Self::new(a + offset, offset.mag())
    }

    pub fn contains(&self, p: Vec3) -> bool {
        (p - self.center).mag_sq() <= self.radius * self.radius + 1e-4
    }
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self { center: Vec3::zero(), radius: 0.0 }
    }
}

fn longest_chord(a: Vec3, b: Vec3, c: Vec3) -> (Vec3, Vec3) {
    let ab = (b - a).mag_sq();
    let ac = (c - a).mag_sq();
    let bc = (c - b).mag_sq();
    if ab >= ac && ab >= bc {
        (a, b)
    } else if ac >= bc {
        (a, c)
    } else {
        (b, c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_points_equidistant() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(-1.0, 0.3, 2.0);
        let c = Vec3::new(0.5, -2.0, 1.0);
        let s = BoundingSphere::from_three_points(a, b, c);

        let da = (a - s.center).mag();
        let db = (b - s.center).mag();
        let dc = (c - s.center).mag();
        assert!((da - s.radius).abs() < 1e-4);
        assert!((db - s.radius).abs() < 1e-4);
        assert!((dc - s.radius).abs() < 1e-4);
        assert!(s.radius >= 0.0);
    }

    #[test]
    fn test_three_points_right_triangle() {
        // Прямоугольный треугольник: центр сферы в середине гипотенузы
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(4.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 3.0, 0.0);
        let s = BoundingSphere::from_three_points(a, b, c);
        assert!((s.center - Vec3::new(2.0, 1.5, 0.0)).mag() < 1e-4);
        assert!((s.radius - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_three_points_collinear() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(3.0, 0.0, 0.0);
        let s = BoundingSphere::from_three_points(a, b, c);
        assert!((s.radius - 1.5).abs() < 1e-4);
        assert!(s.contains(a) && s.contains(b) && s.contains(c));
    }
}
