// ============================================
// Lighting Module - Солнце и каскадные тени
// ============================================
// Цикл дня/ночи задаёт направление и цвет света, каскады строят
// по нему матрицы теней

mod cascades;
mod day_night;
mod light;

pub use cascades::{ShadowCascade, ShadowCascades, CASCADE_COUNT, CASCADE_PLANES};
pub use day_night::DayNightCycle;
pub use light::DirectionalLight;
