// ============================================
// Raster - Декодированные RGBA8 карты
// ============================================
// Ядро потребляет уже раскодированные пиксели; декодер (image) живёт
// только здесь

use std::path::Path;

use super::generation::fbm2d;

/// RGBA8 растр с известными размерами
pub struct Raster {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Raster {
    /// Загрузка PNG и приведение к RGBA8
    pub fn from_png(path: &Path) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self { data: img.into_raw(), width, height })
    }

    /// Значение канала в 0.0..1.0; координаты должны быть в границах
    #[inline]
    pub fn sample(&self, x: u32, y: u32, channel: usize) -> f32 {
        debug_assert!(x < self.width && y < self.height && channel < 4);
        let idx = ((y * self.width + x) * 4) as usize + channel;
        self.data[idx] as f32 / 255.0
    }

    /// Запасная карта высот: value-noise FBM в красном канале
    pub fn generated_heightmap(size: u32) -> Self {
        let mut data = vec![0u8; (size * size * 4) as usize];
        for y in 0..size {
            for x in 0..size {
                let h = fbm2d(x as f32 * 0.008, y as f32 * 0.008, 6);
                let v = (h * 255.0) as u8;
                let idx = ((y * size + x) * 4) as usize;
                data[idx] = v;
                data[idx + 1] = v;
                data[idx + 2] = v;
                data[idx + 3] = 255;
            }
        }
        Self { data, width: size, height: size }
    }

    /// Запасная карта смещения: мелкий шум в альфа-канале
    pub fn generated_displacement(size: u32) -> Self {
        let mut data = vec![0u8; (size * size * 4) as usize];
        for y in 0..size {
            for x in 0..size {
                let d = fbm2d(x as f32 * 0.15 + 771.0, y as f32 * 0.15 + 133.0, 4);
                let idx = ((y * size + x) * 4) as usize;
                data[idx + 3] = (d * 255.0) as u8;
            }
        }
        Self { data, width: size, height: size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_heightmap_dimensions() {
        let r = Raster::generated_heightmap(64);
        assert_eq!(r.width, 64);
        assert_eq!(r.height, 64);
        assert_eq!(r.data.len(), 64 * 64 * 4);
    }

    #[test]
    fn test_sample_normalized() {
        let r = Raster::generated_heightmap(16);
        for y in 0..16 {
            for x in 0..16 {
                let v = r.sample(x, y, 0);
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
