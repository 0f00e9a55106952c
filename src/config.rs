//! Start-up configuration.
//!
//! [`Config`] collects what a scene needs before the window opens: window
//! size and title, where assets live and the orbit-control limits. Values
//! come from [`Config::default`], can be overridden from the environment with
//! [`Config::from_env`] and tweaked with the builder-style setters.

use std::{f32::consts::PI, path::PathBuf};

use crate::data_structures::material::Color;

pub const ASSET_DIR_VAR: &str = "CAMPUS_ASSET_DIR";
pub const WINDOW_SIZE_VAR: &str = "CAMPUS_WINDOW_SIZE";

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitConfig {
    pub damping: bool,
    /// Fraction of the remaining rotation applied per update when damping.
    pub damping_factor: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            damping: false,
            damping_factor: 0.05,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Directory that holds `objects/` and `textures/` on native builds.
    pub asset_root: PathBuf,
    pub clear_colour: Color,
    pub orbit: OrbitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "campus-ngin".to_string(),
            width: 800,
            height: 600,
            asset_root: PathBuf::from("./assets"),
            clear_colour: Color::BLACK,
            orbit: OrbitConfig::default(),
        }
    }
}

impl Config {
    /// Defaults overridden by `CAMPUS_ASSET_DIR` and `CAMPUS_WINDOW_SIZE` (`WIDTHxHEIGHT`).
    pub fn from_env() -> Self {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`; malformed values are logged and ignored.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(ASSET_DIR_VAR) {
            self.asset_root = PathBuf::from(dir);
        }
        if let Some(size) = lookup(WINDOW_SIZE_VAR) {
            match parse_size(&size) {
                Some((width, height)) => {
                    self.width = width;
                    self.height = height;
                }
                None => log::warn!("Ignoring {WINDOW_SIZE_VAR}={size}, expected WIDTHxHEIGHT"),
            }
        }
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_clear_colour(mut self, colour: Color) -> Self {
        self.clear_colour = colour;
        self
    }

    pub fn with_orbit(mut self, orbit: OrbitConfig) -> Self {
        self.orbit = orbit;
        self
    }
}

fn parse_size(size: &str) -> Option<(u32, u32)> {
    let (w, h) = size.trim().split_once(['x', 'X'])?;
    let width = w.trim().parse().ok().filter(|w| *w > 0)?;
    let height = h.trim().parse().ok().filter(|h| *h > 0)?;
    Some((width, height))
}
