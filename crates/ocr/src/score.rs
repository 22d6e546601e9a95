//! Score components shared by the field detectors. Every function returns a
//! value in 0.0–1.0 so detectors can blend them freely.

use tally_core::ScoringWeights;

pub fn clamp(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// 1.0 for the first of `n` lines, falling linearly towards 0 at the bottom.
pub fn from_top(index: usize, n: usize) -> f32 {
    if n == 0 {
        return 0.0;
    }
    clamp(1.0 - index as f32 / n as f32)
}

/// 1.0 for the last of `n` lines, falling linearly towards 0 at the top.
pub fn from_bottom(index: usize, n: usize) -> f32 {
    if n == 0 {
        return 0.0;
    }
    clamp((index + 1) as f32 / n as f32)
}

/// Weighted mean of two components.
pub fn blend(a: f32, weight_a: f32, b: f32, weight_b: f32) -> f32 {
    let total = weight_a + weight_b;
    if total <= 0.0 {
        return 0.0;
    }
    clamp((clamp(a) * weight_a + clamp(b) * weight_b) / total)
}

/// Keyword proximity blended with line position.
pub fn context(keyword: f32, position: f32, weights: &ScoringWeights) -> f32 {
    blend(keyword, weights.keyword, position, weights.position)
}

/// Relative box height blended with line position, for prominence-driven fields.
pub fn prominence(height: f32, position: f32, weights: &ScoringWeights) -> f32 {
    blend(height, weights.height, position, weights.position)
}
