//! Configuration for the liquid-metal logo effect.

/// Appearance parameters for [`crate::LiquidLogoRenderer`].
///
/// Set once at configuration time; only elapsed time varies per frame.
/// Each field is a bounded scalar; out-of-range values are clamped by
/// [`LiquidParams::clamped`] before upload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiquidParams {
    /// Width of the highlighted silhouette edge band.
    pub edge: f32,
    /// Softening applied to the metallic stripe pattern.
    pub pattern_blur: f32,
    /// Spatial frequency of the stripe pattern.
    pub pattern_scale: f32,
    /// How strongly the silhouette bends the pattern's sampling direction.
    pub refraction: f32,
    /// Animation speed multiplier folded into the time uniform.
    pub speed: f32,
    /// Amount of time-varying domain warp ("liquid" wobble).
    pub liquid: f32,
}

impl Default for LiquidParams {
    fn default() -> Self {
        Self {
            edge: 2.0,
            pattern_blur: 0.005,
            pattern_scale: 2.0,
            refraction: 0.015,
            speed: 0.3,
            liquid: 0.07,
        }
    }
}

impl LiquidParams {
    /// Clamp every parameter to its supported range.
    pub fn clamped(self) -> Self {
        Self {
            edge: self.edge.clamp(0.0, 2.0),
            pattern_blur: self.pattern_blur.clamp(0.0, 0.05),
            pattern_scale: self.pattern_scale.clamp(1.0, 10.0),
            refraction: self.refraction.clamp(0.0, 0.06),
            speed: self.speed.clamp(0.0, 1.0),
            liquid: self.liquid.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_within_bounds() {
        let params = LiquidParams::default();
        assert_eq!(params, params.clamped());
    }

    #[test]
    fn clamping_bounds_every_field() {
        let wild = LiquidParams {
            edge: 100.0,
            pattern_blur: -1.0,
            pattern_scale: 0.0,
            refraction: 9.0,
            speed: -3.0,
            liquid: 2.0,
        };
        let clamped = wild.clamped();

        assert_eq!(clamped.edge, 2.0);
        assert_eq!(clamped.pattern_blur, 0.0);
        assert_eq!(clamped.pattern_scale, 1.0);
        assert_eq!(clamped.refraction, 0.06);
        assert_eq!(clamped.speed, 0.0);
        assert_eq!(clamped.liquid, 1.0);
    }

    #[test]
    fn clamping_in_range_values_is_identity() {
        let params = LiquidParams {
            edge: 1.0,
            pattern_blur: 0.01,
            pattern_scale: 5.0,
            refraction: 0.03,
            speed: 0.5,
            liquid: 0.5,
        };
        assert_eq!(params, params.clamped());
    }
}
