//! GPU renderers for the two decorative brand effects.
//!
//! Both renderers are independent leaves: each owns its pipeline, textures,
//! bind group and uniform buffer exclusively, and releases them when
//! dropped. The host owns the frame clock and passes elapsed time into
//! every `render` call; nothing here blocks or suspends.

mod logo;
mod params;
mod text_trail;
mod viewport;

pub use logo::LiquidLogoRenderer;
pub use params::LiquidParams;
pub use text_trail::{glow_intensity, TextTrailRenderer};
pub use viewport::ViewportGate;
