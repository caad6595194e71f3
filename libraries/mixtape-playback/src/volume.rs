//! Volume scale conversion
//!
//! The volume slider works on an integer `0..=100` scale while media
//! resources take a linear `0.0..=1.0` gain. The mapping is linear in both
//! directions, matching the media element it stands in for.

/// Highest slider value
pub const MAX_LEVEL: u8 = 100;

/// Convert a slider level (`0..=100`) to a resource volume (`0.0..=1.0`)
///
/// Levels above 100 are clamped.
pub fn level_to_volume(level: u8) -> f32 {
    f32::from(level.min(MAX_LEVEL)) / f32::from(MAX_LEVEL)
}

/// Convert a resource volume (`0.0..=1.0`) to the nearest slider level
///
/// Out-of-range and NaN volumes are clamped to the slider range.
pub fn volume_to_level(volume: f32) -> u8 {
    if volume.is_nan() {
        return 0;
    }

    (volume.clamp(0.0, 1.0) * f32::from(MAX_LEVEL)).round() as u8
}
