// ============================================
// HeightField - Выборка высот и смещения
// ============================================
// Отвечает на вопрос "какая высота/смещение/нормаль в непрерывной
// точке (x, y)?" Кормит генерацию меша, квадродерево и привязку
// камеры к земле.

use ultraviolet::Vec3;

use super::raster::Raster;
use crate::math::bilerp;

/// Во сколько раз тайлится карта смещения поверх всего террейна
const DISPLACEMENT_TILING: f32 = 32.0;

/// Смещение соседей для оценки нормали, в текселях карты высот
const NORMAL_SAMPLE_OFFSET: f32 = 0.3;

pub struct HeightField {
    height_map: Raster,
    displacement_map: Raster,
    height_scale: f32,
}

impl HeightField {
    pub fn new(height_map: Raster, displacement_map: Raster) -> Self {
        // Масштаб высот привязан к ширине растра
        let height_scale = height_map.width as f32 / 16.0;
        Self { height_map, displacement_map, height_scale }
    }

    pub fn width(&self) -> u32 {
        self.height_map.width
    }

    pub fn height(&self) -> u32 {
        self.height_map.height
    }

    /// Масштаб, переводящий нормализованную высоту в мировую
    pub fn height_scale(&self) -> f32 {
        self.height_scale
    }

    /// Сырое значение текселя карты высот в 0.0..1.0 (канал R),
    /// координаты зажимаются в границы
    #[inline]
    pub fn texel(&self, x: i32, y: i32) -> f32 {
        let xi = x.clamp(0, self.height_map.width as i32 - 1) as u32;
        let yi = y.clamp(0, self.height_map.height as i32 - 1) as u32;
        self.height_map.sample(xi, yi, 0)
    }

    /// Билинейная высота в 0.0..1.0. Координаты зажимаются по осям
    /// независимо, поэтому в целочисленной точке вырождается в один тексель.
    pub fn height_map_value_at(&self, x: f32, y: f32) -> f32 {
        let x1 = x.floor();
        let x2 = x.ceil();
        let y1 = y.floor();
        let y2 = y.ceil();

        let dx = x - x1;
        let dy = y - y1;

        let a = self.texel(x1 as i32, y1 as i32);
        let b = self.texel(x2 as i32, y1 as i32);
        let c = self.texel(x1 as i32, y2 as i32);
        let d = self.texel(x2 as i32, y2 as i32);

        bilerp(a, b, c, d, dx, dy)
    }

    /// Мировая высота (без смещения)
    pub fn height_at(&self, x: f32, y: f32) -> f32 {
        self.height_map_value_at(x, y) * self.height_scale
    }

    /// Значение карты смещения в 0.0..1.0 (альфа-канал). В отличие от
    /// карты высот координаты оборачиваются: карта тайлится по террейну,
    /// давая мелкую деталь независимо от его размера.
    pub fn displacement_value_at(&self, x: f32, y: f32) -> f32 {
        let dm = &self.displacement_map;
        let mut u = (x / dm.width as f32) / DISPLACEMENT_TILING;
        let mut v = (y / dm.height as f32) / DISPLACEMENT_TILING;
        u -= u.floor();
        v -= v.floor();

        let fx = u * (dm.width - 1) as f32;
        let fy = v * (dm.height - 1) as f32;

        let x1 = fx.floor();
        let x2 = fx.ceil();
        let y1 = fy.floor();
        let y2 = fy.ceil();

        let clamp_x = |t: f32| (t as i32).clamp(0, dm.width as i32 - 1) as u32;
        let clamp_y = |t: f32| (t as i32).clamp(0, dm.height as i32 - 1) as u32;

        let a = dm.sample(clamp_x(x1), clamp_y(y1), 3);
        let b = dm.sample(clamp_x(x2), clamp_y(y1), 3);
        let c = dm.sample(clamp_x(x1), clamp_y(y2), 3);
        let d = dm.sample(clamp_x(x2), clamp_y(y2), 3);

        bilerp(a, b, c, d, fx - x1, fy - y1)
    }

    /// Оценка нормали собелем по 8 соседям. Константа nz = 8 управляет
    /// чувствительностью к наклону: больше — площе.
    pub fn normal_at(&self, x: f32, y: f32) -> Vec3 {
        let o = NORMAL_SAMPLE_OFFSET;
        let h = |sx: f32, sy: f32| self.height_map_value_at(sx, sy) * self.height_scale;

        let zb = h(x, y - o);
        let zc = h(x + o, y - o);
        let zd = h(x + o, y);
        let ze = h(x + o, y + o);
        let zf = h(x, y + o);
        let zg = h(x - o, y + o);
        let zh = h(x - o, y);
        let zi = h(x - o, y - o);

        let nx = zg + 2.0 * zh + zi - zc - 2.0 * zd - ze;
        let ny = 2.0 * zb + zc + zi - ze - 2.0 * zf - zg;

        Vec3::new(nx, ny, 8.0).normalized()
    }

    /// Фактическая высота поверхности: высота плюс знаковое смещение
    /// вдоль нормали. Именно сюда «встаёт» камера при привязке к земле.
    pub fn surface_height_at(&self, x: f32, y: f32) -> f32 {
        let z = self.height_at(x, y);
        let d = 2.0 * self.displacement_value_at(x, y) - 1.0;
        let n = self.normal_at(x, y);

        let p = Vec3::new(x, y, z) + n * 0.5 * d;
        p.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_field(value: u8, size: u32) -> HeightField {
        let mut data = vec![0u8; (size * size * 4) as usize];
        for px in data.chunks_mut(4) {
            px[0] = value;
            px[3] = 128;
        }
        let hm = Raster { data, width: size, height: size };
        let dm = Raster::generated_displacement(64);
        HeightField::new(hm, dm)
    }

    fn ramp_field(size: u32) -> HeightField {
        // Высота растёт вдоль x: тексель (x, y) = x
        let mut data = vec![0u8; (size * size * 4) as usize];
        for y in 0..size {
            for x in 0..size {
                data[((y * size + x) * 4) as usize] = x as u8;
            }
        }
        let hm = Raster { data, width: size, height: size };
        let dm = Raster::generated_displacement(64);
        HeightField::new(hm, dm)
    }

    #[test]
    fn test_integer_coords_exact() {
        // В целочисленных координатах билинейность вырождается в тексель
        let hf = ramp_field(64);
        for x in 0..64 {
            let expected = x as f32 / 255.0 * hf.height_scale();
            let got = hf.height_at(x as f32, 10.0);
            assert!((got - expected).abs() < 1e-4, "x={}: {} vs {}", x, got, expected);
        }
    }

    #[test]
    fn test_monotonic_between_texels() {
        let hf = ramp_field(64);
        let mut prev = hf.height_at(10.0, 5.0);
        for i in 1..=10 {
            let t = 10.0 + i as f32 * 0.1;
            let cur = hf.height_at(t, 5.0);
            assert!(cur >= prev - 1e-6);
            prev = cur;
        }
    }

    #[test]
    fn test_clamping_outside_bounds() {
        let hf = ramp_field(64);
        // За правой границей — значение краевого текселя
        assert_eq!(hf.height_at(1000.0, 5.0), hf.height_at(63.0, 5.0));
        // За левой — нулевого
        assert_eq!(hf.height_at(-50.0, 5.0), hf.height_at(0.0, 5.0));
        // Оси зажимаются независимо
        assert_eq!(hf.height_at(-50.0, 1000.0), hf.height_at(0.0, 63.0));
    }

    #[test]
    fn test_height_scale_from_width() {
        let hf = flat_field(128, 512);
        assert_eq!(hf.height_scale(), 32.0);
    }

    #[test]
    fn test_flat_normal_points_up() {
        let hf = flat_field(100, 64);
        let n = hf.normal_at(20.0, 20.0);
        assert!((n.z - 1.0).abs() < 1e-5);
        assert!(n.x.abs() < 1e-5 && n.y.abs() < 1e-5);
    }

    #[test]
    fn test_displacement_wraps() {
        let hf = flat_field(100, 64);
        // Период тайлинга: 32 * размер карты смещения
        let period = 64.0 * 32.0;
        let a = hf.displacement_value_at(5.0, 7.0);
        let b = hf.displacement_value_at(5.0 + period, 7.0);
        assert!((a - b).abs() < 1e-4);
    }

    #[test]
    fn test_surface_height_flat_raster() {
        // На плоском растре смещение двигает высоту не более чем на 0.5
        let hf = flat_field(128, 64);
        let base = hf.height_at(30.0, 30.0);
        let surf = hf.surface_height_at(30.0, 30.0);
        assert!((surf - base).abs() <= 0.5 + 1e-4);
    }
}
