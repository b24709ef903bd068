//! Random target placement

use glam::Vec2;
use rand::Rng;

use super::state::TargetColor;

/// Allowed range for target centers, `None` if the area is too small.
///
/// The padding equals the target size on every side.
pub fn spawn_bounds(area: Vec2, target_size: f32) -> Option<(Vec2, Vec2)> {
    let padding = Vec2::splat(target_size);
    let span = area - padding * 2.0;
    if span.x <= 0.0 || span.y <= 0.0 {
        return None;
    }
    Some((padding, padding + span))
}

/// Uniform position inside the padded play area
pub fn random_position<R: Rng>(rng: &mut R, area: Vec2, target_size: f32) -> Option<Vec2> {
    let (min, max) = spawn_bounds(area, target_size)?;
    let span = max - min;
    Some(Vec2::new(
        min.x + rng.random::<f32>() * span.x,
        min.y + rng.random::<f32>() * span.y,
    ))
}

/// Uniform color tag
pub fn random_color<R: Rng>(rng: &mut R) -> TargetColor {
    TargetColor::ALL[rng.random_range(0..TargetColor::ALL.len())]
}
