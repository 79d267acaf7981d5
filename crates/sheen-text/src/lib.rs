//! Text rasterization for the text-trail renderer.
//!
//! A [`TextStyle`] describes everything that affects the generated texture:
//! the string itself plus font family, weight, pixel size, and color. The
//! style is rasterized once into a fixed-size coverage bitmap via
//! `cosmic-text` (shaping + swash coverage masks); the renderer uploads it
//! as an `R8Unorm` texture. [`TextTextureCache`] decides when the bitmap
//! must be regenerated: exactly when any style field changed.

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, Weight};

/// Fixed working resolution of the text texture.
pub const TEXT_TEXTURE_SIZE: u32 = 512;

/// Everything that affects the rasterized text texture.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub text: String,
    pub family: String,
    pub weight: u16,
    pub size_px: f32,
    pub color_hex: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text: "Text".to_string(),
            family: "Inter".to_string(),
            weight: 900,
            size_px: 64.0,
            color_hex: "#ffffff".to_string(),
        }
    }
}

impl TextStyle {
    /// Text color as linear-ish RGB in `[0, 1]`. White if the hex string is
    /// malformed; the texture is decorative and should never fail hard.
    pub fn color(&self) -> [f32; 3] {
        parse_hex_color(&self.color_hex).unwrap_or([1.0, 1.0, 1.0])
    }
}

/// Parse `#rgb` / `#rrggbb` (leading `#` optional) into RGB in `[0, 1]`.
pub fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let h = hex.strip_prefix('#').unwrap_or(hex);

    let expanded: String = match h.len() {
        3 => h.chars().flat_map(|c| [c, c]).collect(),
        6 => h.to_string(),
        _ => return None,
    };

    let n = u32::from_str_radix(&expanded, 16).ok()?;
    Some([
        ((n >> 16) & 0xff) as f32 / 255.0,
        ((n >> 8) & 0xff) as f32 / 255.0,
        (n & 0xff) as f32 / 255.0,
    ])
}

/// Coverage bitmap produced from a [`TextStyle`], suitable for an
/// `R8Unorm` upload. Row-major, `size[0] * size[1]` bytes.
#[derive(Clone, Debug)]
pub struct TextBitmap {
    pub size: [u32; 2],
    pub pixels: Vec<u8>,
}

/// Tracks the last rasterized style so the texture is regenerated if and
/// only if an input changed.
#[derive(Default)]
pub struct TextTextureCache {
    last: Option<TextStyle>,
}

impl TextTextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `style` differs from the last rasterized style
    /// (including the very first call), and records it as current.
    pub fn needs_update(&mut self, style: &TextStyle) -> bool {
        if self.last.as_ref() == Some(style) {
            return false;
        }
        self.last = Some(style.clone());
        true
    }
}

/// CPU-side shaping and rasterization engine.
///
/// Owns the font database and the swash raster cache. System fonts are
/// used; if the requested family is missing, cosmic-text falls back to
/// whatever face is available.
pub struct TextRasterizer {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl TextRasterizer {
    pub fn new() -> Self {
        let font_system = FontSystem::new();
        log::debug!(
            "text rasterizer ready ({} font faces)",
            font_system.db().faces().count()
        );

        Self {
            font_system,
            swash_cache: SwashCache::new(),
        }
    }

    /// Rasterize a single centered line into the fixed-size coverage bitmap.
    ///
    /// Shaping that produces no drawable glyphs (empty string, missing
    /// fonts) yields a blank bitmap; this path is decorative best-effort.
    pub fn rasterize(&mut self, style: &TextStyle) -> TextBitmap {
        let size = TEXT_TEXTURE_SIZE;
        let mut pixels = vec![0u8; (size * size) as usize];

        let metrics = Metrics::new(style.size_px, style.size_px * 1.2);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);

        // Single line: no wrapping, one line-height tall.
        buffer.set_size(
            &mut self.font_system,
            Some(f32::MAX),
            Some(metrics.line_height),
        );

        let attrs = Attrs::new()
            .family(Family::Name(&style.family))
            .weight(Weight(style.weight));

        buffer.set_text(
            &mut self.font_system,
            &style.text,
            &attrs,
            Shaping::Advanced,
            None,
        );
        buffer.shape_until_scroll(&mut self.font_system, false);

        // Center the shaped line in the square texture.
        let (line_w, line_h) = buffer
            .layout_runs()
            .next()
            .map(|run| (run.line_w, run.line_height))
            .unwrap_or((0.0, metrics.line_height));
        let origin_x = ((size as f32 - line_w) * 0.5).max(0.0);
        let origin_y = ((size as f32 - line_h) * 0.5).max(0.0);

        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((origin_x, origin_y), 1.0);

                let Some(image) = self
                    .swash_cache
                    .get_image(&mut self.font_system, physical.cache_key)
                else {
                    continue;
                };

                // Coverage masks only; color glyphs are not expected here.
                if image.content != cosmic_text::SwashContent::Mask {
                    continue;
                }

                let gx = physical.x + image.placement.left;
                let gy = run.line_y as i32 + physical.y - image.placement.top;

                blit_mask(
                    &mut pixels,
                    size,
                    gx,
                    gy,
                    image.placement.width,
                    image.placement.height,
                    &image.data,
                );
            }
        }

        TextBitmap {
            size: [size, size],
            pixels,
        }
    }
}

impl Default for TextRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Blend a glyph coverage mask into the destination bitmap, clipping to the
/// texture bounds. Overlapping glyphs keep the maximum coverage.
fn blit_mask(dst: &mut [u8], dst_size: u32, x0: i32, y0: i32, w: u32, h: u32, src: &[u8]) {
    for sy in 0..h {
        let dy = y0 + sy as i32;
        if dy < 0 || dy >= dst_size as i32 {
            continue;
        }
        for sx in 0..w {
            let dx = x0 + sx as i32;
            if dx < 0 || dx >= dst_size as i32 {
                continue;
            }
            let si = (sy * w + sx) as usize;
            let di = (dy as u32 * dst_size + dx as u32) as usize;
            dst[di] = dst[di].max(src[si]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_six_digit() {
        assert_eq!(parse_hex_color("#ffffff"), Some([1.0, 1.0, 1.0]));
        assert_eq!(parse_hex_color("#000000"), Some([0.0, 0.0, 0.0]));

        let c = parse_hex_color("#ff8000").unwrap();
        assert_eq!(c[0], 1.0);
        assert!((c[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c[2], 0.0);
    }

    #[test]
    fn hex_three_digit_expands() {
        assert_eq!(parse_hex_color("#fff"), Some([1.0, 1.0, 1.0]));
        assert_eq!(parse_hex_color("#f00"), Some([1.0, 0.0, 0.0]));
    }

    #[test]
    fn hex_hash_is_optional() {
        assert_eq!(parse_hex_color("ffffff"), parse_hex_color("#ffffff"));
    }

    #[test]
    fn hex_rejects_malformed_input() {
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn malformed_color_falls_back_to_white() {
        let style = TextStyle {
            color_hex: "nope".to_string(),
            ..TextStyle::default()
        };
        assert_eq!(style.color(), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn cache_regenerates_on_first_use_only() {
        let mut cache = TextTextureCache::new();
        let style = TextStyle::default();

        assert!(cache.needs_update(&style));
        assert!(!cache.needs_update(&style));
        assert!(!cache.needs_update(&style.clone()));
    }

    #[test]
    fn cache_regenerates_iff_any_field_changes() {
        let base = TextStyle::default();
        let mut cache = TextTextureCache::new();
        assert!(cache.needs_update(&base));

        let variants = [
            TextStyle {
                text: "Other".into(),
                ..base.clone()
            },
            TextStyle {
                family: "Serif".into(),
                ..base.clone()
            },
            TextStyle {
                weight: 400,
                ..base.clone()
            },
            TextStyle {
                size_px: 48.0,
                ..base.clone()
            },
            TextStyle {
                color_hex: "#84a98c".into(),
                ..base.clone()
            },
        ];

        for variant in variants {
            assert!(cache.needs_update(&variant));
            assert!(!cache.needs_update(&variant));
        }
    }

    #[test]
    fn bitmap_has_fixed_working_resolution() {
        let mut rasterizer = TextRasterizer::new();
        let bitmap = rasterizer.rasterize(&TextStyle::default());

        assert_eq!(bitmap.size, [TEXT_TEXTURE_SIZE, TEXT_TEXTURE_SIZE]);
        assert_eq!(
            bitmap.pixels.len(),
            (TEXT_TEXTURE_SIZE * TEXT_TEXTURE_SIZE) as usize
        );
    }

    #[test]
    fn empty_text_is_blank() {
        let mut rasterizer = TextRasterizer::new();
        let bitmap = rasterizer.rasterize(&TextStyle {
            text: String::new(),
            ..TextStyle::default()
        });

        assert!(bitmap.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn blit_clips_to_texture_bounds() {
        let mut dst = vec![0u8; 16];
        // 3x3 mask partially off the top-left corner.
        let src = vec![200u8; 9];
        blit_mask(&mut dst, 4, -1, -1, 3, 3, &src);

        assert_eq!(dst[0], 200);
        assert_eq!(dst[1], 200);
        assert_eq!(dst[4], 200);
        assert_eq!(dst[5], 200);
        assert_eq!(dst[2], 0);
        assert_eq!(dst[15], 0);
    }
}
