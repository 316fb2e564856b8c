//! Render parameters and their derivation from host-supplied properties.

use crate::{AvatarError, Result};

/// Name the paint host registers the renderer under
pub const PAINT_NAME: &str = "voronoiAvatar";

/// Property carrying the seed
pub const SEED_PROPERTY: &str = "--avatar-seed";

/// Number of color slots a host can fill
pub const COLOR_SLOTS: usize = 8;

/// Seed used when none (or only whitespace) is supplied
pub const DEFAULT_SEED: &str = "123456";

/// Property name for color slot `index` (0-based): `--avatar-color-1` .. `--avatar-color-8`
pub fn color_property(index: usize) -> String {
    format!("--avatar-color-{}", index + 1)
}

/// Every property the renderer reads, in declaration order (seed first)
pub fn input_properties() -> Vec<String> {
    std::iter::once(SEED_PROPERTY.to_string())
        .chain((0..COLOR_SLOTS).map(color_property))
        .collect()
}

/// Raw, unvalidated values as a host hands them over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvatarProps {
    pub seed: Option<String>,
    pub colors: [Option<String>; COLOR_SLOTS],
}

impl AvatarProps {
    /// Read the properties through a string-keyed lookup (e.g. a host's style map).
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let seed = lookup(SEED_PROPERTY);
        let colors = std::array::from_fn(|i| lookup(&color_property(i)));
        Self { seed, colors }
    }

    /// Fill slots 1.. in order from `colors`.
    pub fn with_colors<S: AsRef<str>>(seed: Option<&str>, colors: &[S]) -> Result<Self> {
        if colors.len() > COLOR_SLOTS {
            return Err(AvatarError::TooManyColors(colors.len()));
        }
        let mut slots: [Option<String>; COLOR_SLOTS] = Default::default();
        for (slot, color) in slots.iter_mut().zip(colors) {
            *slot = Some(color.as_ref().to_string());
        }
        Ok(Self {
            seed: seed.map(str::to_string),
            colors: slots,
        })
    }

    /// Trimmed seed, or [`DEFAULT_SEED`] when missing or blank.
    pub fn seed(&self) -> String {
        self.seed
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SEED)
            .to_string()
    }

    /// Non-empty trimmed colors in slot order.
    pub fn defined_colors(&self) -> Vec<String> {
        self.colors
            .iter()
            .filter_map(|c| c.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn to_config(&self, width: f64, height: f64) -> Result<RenderConfig> {
        RenderConfig::new(self.seed(), self.defined_colors(), width, height)
    }
}

/// Validated inputs for one render call. Only [`RenderConfig::new`] builds
/// one, so every config in circulation has finite positive dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    seed: String,
    colors: Vec<String>,
    width: f64,
    height: f64,
}

impl RenderConfig {
    pub fn new(seed: impl Into<String>, colors: Vec<String>, width: f64, height: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(AvatarError::InvalidDimensions { width, height });
        }
        Ok(Self {
            seed: seed.into(),
            colors,
            width,
            height,
        })
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Palette in slot order; may be empty.
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_input_properties_order() {
        let props = input_properties();
        assert_eq!(props.len(), 9);
        assert_eq!(props[0], "--avatar-seed");
        assert_eq!(props[1], "--avatar-color-1");
        assert_eq!(props[8], "--avatar-color-8");
    }

    #[test]
    fn test_no_colors_defined() {
        let props = AvatarProps::default();
        assert!(props.defined_colors().is_empty());
    }

    #[test]
    fn test_blank_slots_dropped() {
        let props = AvatarProps::with_colors(None, &["#fff", "", "#000"]).unwrap();
        assert_eq!(props.defined_colors(), vec!["#fff", "#000"]);
    }

    #[test]
    fn test_slot_order_not_lookup_order() {
        let mut map = HashMap::new();
        map.insert("--avatar-color-7", " green ");
        map.insert("--avatar-color-2", "red");
        map.insert("--avatar-color-4", "   ");
        let props = AvatarProps::from_lookup(|name| map.get(name).map(|v| v.to_string()));
        assert_eq!(props.defined_colors(), vec!["red", "green"]);
    }

    #[test]
    fn test_seed_default_and_trim() {
        assert_eq!(AvatarProps::default().seed(), DEFAULT_SEED);
        let blank = AvatarProps::with_colors(Some("   "), &["red"]).unwrap();
        assert_eq!(blank.seed(), "123456");
        let padded = AvatarProps::with_colors(Some("  abc "), &["red"]).unwrap();
        assert_eq!(padded.seed(), "abc");
    }

    #[test]
    fn test_too_many_colors() {
        let colors = vec!["red"; 9];
        assert!(matches!(
            AvatarProps::with_colors(None, &colors),
            Err(AvatarError::TooManyColors(9))
        ));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(RenderConfig::new("a", vec![], 0.0, 10.0).is_err());
        assert!(RenderConfig::new("a", vec![], 10.0, -1.0).is_err());
        assert!(RenderConfig::new("a", vec![], f64::NAN, 10.0).is_err());
        assert!(RenderConfig::new("a", vec![], f64::INFINITY, 10.0).is_err());
        assert!(RenderConfig::new("a", vec![], 0.5, 10.0).is_ok());
    }

    #[test]
    fn test_config_only_through_validation() {
        let config = RenderConfig::new("s", vec!["red".into()], 12.5, 3.0).unwrap();
        assert_eq!(config.seed(), "s");
        assert_eq!(config.colors(), ["red".to_string()]);
        assert_eq!((config.width(), config.height()), (12.5, 3.0));
        // A clone carries the already-validated dimensions
        assert_eq!(config.clone(), config);
    }

    #[test]
    fn test_to_config() {
        let props = AvatarProps::with_colors(Some("xyz"), &["red", " ", "blue"]).unwrap();
        let config = props.to_config(64.0, 32.0).unwrap();
        assert_eq!(config.seed(), "xyz");
        assert_eq!(config.colors(), vec!["red", "blue"]);
        assert_eq!((config.width(), config.height()), (64.0, 32.0));
    }
}
