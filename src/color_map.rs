//! Scalar to color mapping for color axes and vary-by-element palettes.
//!
//! A [`ColorMap`] is a sorted list of integer-binned stops. Lookups wrap the
//! value modulo `max_bin + 1` and interpolate linearly between the two stops
//! bracketing it, so a map with stops at 0, 2 and 5 cycles with period 6.
//!
//! Maps are shared through a [`ColorMapRegistry`] that the caller builds once
//! and passes to whatever needs it.

use crate::color::Rgba;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One color stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Integer bin.
    pub bin: u32,
    /// Color at this bin.
    pub color: Rgba,
}

#[derive(Deserialize)]
struct RawColorMap {
    id: String,
    #[serde(default)]
    name: String,
    stops: Vec<ColorStop>,
}

/// Integer-binned color stops with interpolated lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawColorMap")]
pub struct ColorMap {
    id: String,
    name: String,
    stops: Vec<ColorStop>,
}

impl TryFrom<RawColorMap> for ColorMap {
    type Error = Error;

    fn try_from(raw: RawColorMap) -> Result<Self> {
        Self::from_stops(raw.id, raw.name, raw.stops)
    }
}

/// Palette used for vary-by-element coloring.
const DISCRETE_PALETTE: [u32; 8] = [
    0x9c9c_ffff,
    0x9c31_63ff,
    0xffff_ceff,
    0xceff_ffff,
    0x6300_63ff,
    0xff80_80ff,
    0x0063_ceff,
    0xcece_ffff,
];

impl ColorMap {
    /// Map with a single stop at bin 0.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, first: Rgba) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stops: vec![ColorStop { bin: 0, color: first }],
        }
    }

    /// Build a map from arbitrary stops.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColorMap`] when there is no stop at bin 0 or a
    /// bin appears twice.
    pub fn from_stops(
        id: impl Into<String>,
        name: impl Into<String>,
        mut stops: Vec<ColorStop>,
    ) -> Result<Self> {
        let id = id.into();
        stops.sort_by_key(|s| s.bin);
        if stops.first().map(|s| s.bin) != Some(0) {
            return Err(Error::InvalidColorMap(format!("{id}: no stop at bin 0")));
        }
        if stops.windows(2).any(|w| w[0].bin == w[1].bin) {
            return Err(Error::InvalidColorMap(format!("{id}: duplicate bin")));
        }
        Ok(Self {
            id,
            name: name.into(),
            stops,
        })
    }

    /// Default continuous map: blue, cyan, green, yellow, red.
    #[must_use]
    pub fn default_map() -> Self {
        let mut map = Self::new("default", "Default", Rgba::rgb(0, 0, 255));
        map.add_stop(1, Rgba::rgb(0, 255, 255));
        map.add_stop(2, Rgba::rgb(0, 255, 0));
        map.add_stop(3, Rgba::rgb(255, 255, 0));
        map.add_stop(4, Rgba::rgb(255, 0, 0));
        map
    }

    /// Default discrete palette, one stop per bin.
    #[must_use]
    pub fn discrete_map() -> Self {
        let mut map = Self::new("discrete", "Discrete", Rgba::from_u32(DISCRETE_PALETTE[0]));
        for (bin, packed) in (1u32..).zip(&DISCRETE_PALETTE[1..]) {
            map.add_stop(bin, Rgba::from_u32(*packed));
        }
        map
    }

    /// Registry id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops sorted by bin.
    #[must_use]
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Insert a stop, replacing any stop already at `bin`.
    pub fn add_stop(&mut self, bin: u32, color: Rgba) {
        match self.stops.binary_search_by_key(&bin, |s| s.bin) {
            Ok(i) => self.stops[i].color = color,
            Err(i) => self.stops.insert(i, ColorStop { bin, color }),
        }
    }

    /// Highest bin.
    #[must_use]
    pub fn max_bin(&self) -> u32 {
        self.stops.last().map_or(0, |s| s.bin)
    }

    /// Color for `x`.
    ///
    /// Non-finite values are black. Other values wrap modulo `max_bin + 1`;
    /// between the last stop and the wrap point the last color holds.
    #[must_use]
    pub fn get_color(&self, x: f64) -> Rgba {
        if !x.is_finite() {
            return Rgba::BLACK;
        }
        let period = f64::from(self.max_bin()) + 1.0;
        let x = x.rem_euclid(period);

        let upper = self.stops.partition_point(|s| f64::from(s.bin) <= x);
        match (upper.checked_sub(1).map(|i| self.stops[i]), self.stops.get(upper)) {
            (Some(lo), Some(hi)) => {
                let t = (x - f64::from(lo.bin)) / f64::from(hi.bin - lo.bin);
                lo.color.lerp(hi.color, t)
            }
            (Some(lo), None) => lo.color,
            // Unreachable with a stop at bin 0 and x >= 0.
            (None, _) => self.stops.first().map_or(Rgba::BLACK, |s| s.color),
        }
    }
}

/// Explicit registry of color maps, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ColorMapRegistry {
    maps: BTreeMap<String, ColorMap>,
}

impl ColorMapRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding [`ColorMap::default_map`] and [`ColorMap::discrete_map`].
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ColorMap::default_map());
        registry.register(ColorMap::discrete_map());
        registry
    }

    /// Add or replace a map; returns the replaced one.
    pub fn register(&mut self, map: ColorMap) -> Option<ColorMap> {
        tracing::debug!(id = map.id(), stops = map.stops().len(), "register color map");
        self.maps.insert(map.id.clone(), map)
    }

    /// Look up a map.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ColorMap> {
        self.maps.get(id)
    }

    /// Look up a map, failing on unknown ids.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownId`] when `id` is not registered.
    pub fn require(&self, id: &str) -> Result<&ColorMap> {
        self.get(id).ok_or_else(|| Error::UnknownId {
            kind: "color map",
            id: id.to_string(),
        })
    }

    /// Remove a map.
    pub fn remove(&mut self, id: &str) -> Option<ColorMap> {
        self.maps.remove(id)
    }

    /// Maps in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ColorMap> {
        self.maps.values()
    }

    /// Number of registered maps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// No maps registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Register every map of a YAML list; returns how many were added.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or a map is invalid.
    pub fn load_yaml_str(&mut self, yaml: &str) -> Result<usize> {
        let maps: Vec<ColorMap> = serde_yaml_ng::from_str(yaml)?;
        let count = maps.len();
        for map in maps {
            self.register(map);
        }
        Ok(count)
    }

    /// Register every map of a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        self.load_yaml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_stops() -> ColorMap {
        let mut map = ColorMap::new("t", "Test", Rgba::BLACK);
        map.add_stop(2, Rgba::WHITE);
        map.add_stop(5, Rgba::RED);
        map
    }

    #[test]
    fn test_exact_stops() {
        let map = three_stops();
        assert_eq!(map.max_bin(), 5);
        assert_eq!(map.get_color(0.0), Rgba::BLACK);
        assert_eq!(map.get_color(2.0), Rgba::WHITE);
        assert_eq!(map.get_color(5.0), Rgba::RED);
    }

    #[test]
    fn test_interpolates_between_stops() {
        let map = three_stops();
        assert_eq!(map.get_color(1.0), Rgba::rgb(128, 128, 128));
        let c = map.get_color(3.5);
        assert_eq!(c.r, 255);
        assert_eq!(c.g, 128);
    }

    #[test]
    fn test_wraps_modulo_period() {
        let map = three_stops();
        assert_eq!(map.get_color(6.0), map.get_color(0.0));
        assert_eq!(map.get_color(8.0), map.get_color(2.0));
        assert_eq!(map.get_color(-1.0), map.get_color(5.0));
    }

    #[test]
    fn test_holds_last_color_before_wrap() {
        let map = three_stops();
        assert_eq!(map.get_color(5.5), Rgba::RED);
    }

    #[test]
    fn test_non_finite_is_black() {
        let map = ColorMap::new("w", "White", Rgba::WHITE);
        assert_eq!(map.get_color(f64::NAN), Rgba::BLACK);
        assert_eq!(map.get_color(f64::INFINITY), Rgba::BLACK);
        assert_eq!(map.get_color(42.0), Rgba::WHITE);
    }

    #[test]
    fn test_add_stop_replaces() {
        let mut map = three_stops();
        map.add_stop(2, Rgba::BLUE);
        assert_eq!(map.stops().len(), 3);
        assert_eq!(map.get_color(2.0), Rgba::BLUE);
    }

    #[test]
    fn test_from_stops_requires_bin_zero() {
        let stops = vec![ColorStop { bin: 1, color: Rgba::RED }];
        assert!(matches!(
            ColorMap::from_stops("x", "X", stops),
            Err(Error::InvalidColorMap(_))
        ));
    }

    #[test]
    fn test_discrete_palette() {
        let map = ColorMap::discrete_map();
        assert_eq!(map.max_bin(), 7);
        assert_eq!(map.get_color(1.0), Rgba::from_u32(0x9c31_63ff));
        assert_eq!(map.get_color(9.0), map.get_color(1.0));
    }

    #[test]
    fn test_registry() {
        let mut registry = ColorMapRegistry::with_builtins();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("default").is_some());
        assert!(registry.require("missing").is_err());
        registry.register(three_stops());
        assert_eq!(registry.iter().map(ColorMap::id).collect::<Vec<_>>(), ["default", "discrete", "t"]);
        assert!(registry.remove("t").is_some());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_load_yaml() {
        let yaml = r"
- id: heat
  name: Heat
  stops:
    - { bin: 0, color: { r: 0, g: 0, b: 0, a: 255 } }
    - { bin: 4, color: { r: 255, g: 0, b: 0, a: 255 } }
";
        let mut registry = ColorMapRegistry::new();
        assert_eq!(registry.load_yaml_str(yaml).unwrap(), 1);
        let heat = registry.require("heat").unwrap();
        assert_eq!(heat.get_color(2.0), Rgba::rgb(128, 0, 0));
    }

    #[test]
    fn test_load_yaml_rejects_missing_zero_bin() {
        let yaml = "- id: bad\n  stops:\n    - { bin: 3, color: { r: 0, g: 0, b: 0, a: 255 } }\n";
        assert!(ColorMapRegistry::new().load_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maps.yaml");
        std::fs::write(&path, "- id: one\n  stops:\n    - { bin: 0, color: { r: 1, g: 2, b: 3, a: 255 } }\n").unwrap();
        let mut registry = ColorMapRegistry::new();
        assert_eq!(registry.load_file(&path).unwrap(), 1);
        assert_eq!(registry.get("one").unwrap().get_color(0.0), Rgba::rgb(1, 2, 3));
    }
}
