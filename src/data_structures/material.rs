//! Surface and line paint parameters.

use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicU64, Ordering},
};

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Linear RGB colour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Interprets `0xRRGGBB` as an sRGB colour and converts it to linear.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: 1.0,
        }
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// A raster image used as a colour map.
///
/// Generated maps are ready immediately. Maps created with
/// [`TextureMap::pending`] stay empty until the loader fills them in; meshes
/// using an empty map render with their plain colour until then.
#[derive(Debug)]
pub struct TextureMap {
    id: u64,
    source: String,
    image: OnceLock<image::RgbaImage>,
}

impl TextureMap {
    pub fn from_image(source: impl Into<String>, image: image::RgbaImage) -> Arc<Self> {
        let map = Self::new(source.into());
        let _ = map.image.set(image);
        Arc::new(map)
    }

    pub fn pending(source: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(source.into()))
    }

    fn new(source: String) -> Self {
        Self {
            id: NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed),
            source,
            image: OnceLock::new(),
        }
    }

    /// Stable identity used by the renderer to cache the GPU upload.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn image(&self) -> Option<&image::RgbaImage> {
        self.image.get()
    }

    pub fn is_ready(&self) -> bool {
        self.image.get().is_some()
    }

    /// Fills a pending map. Returns `false` if it already had pixels.
    pub fn fill(&self, image: image::RgbaImage) -> bool {
        self.image.set(image).is_ok()
    }
}

/// Physically based surface parameters, shared between meshes via `Arc`.
#[derive(Clone, Debug)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub metalness: f32,
    pub roughness: f32,
    pub map: Option<Arc<TextureMap>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            metalness: 0.0,
            roughness: 1.0,
            map: None,
        }
    }
}

impl Material {
    pub fn colored(hex: u32) -> Arc<Self> {
        Arc::new(Self {
            color: Color::from_hex(hex),
            ..Default::default()
        })
    }

    pub fn textured(map: Arc<TextureMap>) -> Arc<Self> {
        Arc::new(Self {
            map: Some(map),
            ..Default::default()
        })
    }

    pub fn with_color(mut self, hex: u32) -> Self {
        self.color = Color::from_hex(hex);
        self
    }

    pub fn with_map(mut self, map: Arc<TextureMap>) -> Self {
        self.map = Some(map);
        self
    }

    pub fn with_pbr(mut self, metalness: f32, roughness: f32) -> Self {
        self.metalness = metalness;
        self.roughness = roughness;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self.transparent = opacity < 1.0;
        self
    }

    /// Whether the renderer must blend this material.
    pub fn is_blended(&self) -> bool {
        self.transparent && self.opacity < 1.0
    }
}

/// Paint for line overlays such as outlines.
#[derive(Clone, Debug, PartialEq)]
pub struct LineMaterial {
    pub color: Color,
    // wgpu rasterises lines one pixel wide; kept so outlines record what was asked for
    pub linewidth: f32,
}
