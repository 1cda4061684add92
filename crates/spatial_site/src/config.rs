//! Site configuration
//!
//! Every tunable of the landing page lives in one TOML file. Each section is
//! optional and every field falls back to the value the live site uses, so an
//! empty file is a valid configuration.
//!
//! ```toml
//! [typewriter]
//! speed_ms = 60.0
//!
//! [[metrics]]
//! label = "Projects Delivered"
//! end = 100
//! suffix = "+"
//! duration_ms = 2500.0
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use spatial_animation::{CounterSpec, DecodeConfig, TypewriterConfig, SCRAMBLE_ALPHABET};
use spatial_core::ElementBounds;
use std::fs;
use std::path::Path;

/// Root of `spatial.toml`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub typewriter: TypewriterSection,
    #[serde(default = "default_metrics")]
    pub metrics: Vec<CounterSpec>,
    #[serde(default)]
    pub live_stats: LiveStatsSection,
    #[serde(default)]
    pub decode: DecodeSection,
    #[serde(default)]
    pub contact: ContactSection,
    #[serde(default)]
    pub feed: FeedSection,
    #[serde(default)]
    pub telemetry: TelemetrySection,
    #[serde(default)]
    pub navigation: NavigationSection,
    #[serde(default)]
    pub scene: SceneSection,
    #[serde(default)]
    pub layout: LayoutSection,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            typewriter: TypewriterSection::default(),
            metrics: default_metrics(),
            live_stats: LiveStatsSection::default(),
            decode: DecodeSection::default(),
            contact: ContactSection::default(),
            feed: FeedSection::default(),
            telemetry: TelemetrySection::default(),
            navigation: NavigationSection::default(),
            scene: SceneSection::default(),
            layout: LayoutSection::default(),
        }
    }
}

impl SiteConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded site config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn default_metrics() -> Vec<CounterSpec> {
    vec![
        CounterSpec::new("Projects Delivered", 100, 2500.0).with_suffix("+"),
        CounterSpec::new("Enterprise Clients", 50, 2000.0).with_suffix("+"),
    ]
}

// =============================================================================
// Animation sections
// =============================================================================

/// Hero tagline typewriter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypewriterSection {
    #[serde(default = "default_typewriter_texts")]
    pub texts: Vec<String>,
    #[serde(default = "default_typing_speed")]
    pub speed_ms: f64,
    #[serde(default = "default_delete_speed")]
    pub delete_speed_ms: f64,
    #[serde(default = "default_typing_pause")]
    pub pause_ms: f64,
}

fn default_typewriter_texts() -> Vec<String> {
    [
        "Premium Geospatial Solutions Architecture & Development",
        "Enterprise-Scale GIS Implementation",
        "Real-Time Spatial Data Processing",
        "Advanced Earth Engine Analytics",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_typing_speed() -> f64 {
    60.0
}

fn default_delete_speed() -> f64 {
    30.0
}

fn default_typing_pause() -> f64 {
    3000.0
}

impl Default for TypewriterSection {
    fn default() -> Self {
        Self {
            texts: default_typewriter_texts(),
            speed_ms: default_typing_speed(),
            delete_speed_ms: default_delete_speed(),
            pause_ms: default_typing_pause(),
        }
    }
}

impl TypewriterSection {
    pub fn to_config(&self) -> TypewriterConfig {
        TypewriterConfig::new(self.texts.iter().cloned()).with_speeds(
            self.speed_ms,
            self.delete_speed_ms,
            self.pause_ms,
        )
    }
}

/// Live data counters next to the earthquake feed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiveStatsSection {
    #[serde(default = "default_data_points_ms")]
    pub data_points_duration_ms: f64,
    #[serde(default = "default_connections_ms")]
    pub connections_duration_ms: f64,
}

fn default_data_points_ms() -> f64 {
    1000.0
}

fn default_connections_ms() -> f64 {
    800.0
}

impl Default for LiveStatsSection {
    fn default() -> Self {
        Self {
            data_points_duration_ms: default_data_points_ms(),
            connections_duration_ms: default_connections_ms(),
        }
    }
}

/// Section headings revealed by the decode effect
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodeSection {
    #[serde(default = "default_headlines")]
    pub headlines: Vec<String>,
    #[serde(default = "default_decode_speed")]
    pub speed_ms: f64,
    #[serde(default)]
    pub delay_ms: f64,
    #[serde(default = "default_decode_margin")]
    pub margin: f64,
    #[serde(default = "default_alphabet")]
    pub alphabet: String,
}

fn default_headlines() -> Vec<String> {
    vec!["CORE SERVICES".to_string(), "TECHNOLOGY STACK".to_string()]
}

fn default_decode_speed() -> f64 {
    50.0
}

fn default_decode_margin() -> f64 {
    -100.0
}

fn default_alphabet() -> String {
    SCRAMBLE_ALPHABET.to_string()
}

impl Default for DecodeSection {
    fn default() -> Self {
        Self {
            headlines: default_headlines(),
            speed_ms: default_decode_speed(),
            delay_ms: 0.0,
            margin: default_decode_margin(),
            alphabet: default_alphabet(),
        }
    }
}

impl DecodeSection {
    pub fn to_config(&self) -> DecodeConfig {
        DecodeConfig {
            speed_ms: self.speed_ms,
            delay_ms: self.delay_ms,
            margin: self.margin,
            alphabet: self.alphabet.clone(),
        }
    }
}

// =============================================================================
// Remote sections
// =============================================================================

/// Form relay settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactSection {
    #[serde(default = "default_relay_endpoint")]
    pub endpoint: String,
    /// Relay access key; empty until configured
    #[serde(default)]
    pub access_key: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    /// Delay before a finished submission returns to idle
    #[serde(default = "default_reset_ms")]
    pub reset_ms: f64,
}

fn default_relay_endpoint() -> String {
    "https://api.web3forms.com/submit".to_string()
}

fn default_sender_name() -> String {
    "Spatial Labs Website".to_string()
}

fn default_reset_ms() -> f64 {
    5000.0
}

impl Default for ContactSection {
    fn default() -> Self {
        Self {
            endpoint: default_relay_endpoint(),
            access_key: String::new(),
            sender_name: default_sender_name(),
            reset_ms: default_reset_ms(),
        }
    }
}

/// Earthquake feed settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedSection {
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default = "default_poll_ms")]
    pub poll_interval_ms: f64,
    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

fn default_feed_url() -> String {
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/significant_week.geojson".to_string()
}

fn default_poll_ms() -> f64 {
    300_000.0
}

fn default_max_events() -> usize {
    10
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            poll_interval_ms: default_poll_ms(),
            max_events: default_max_events(),
        }
    }
}

// =============================================================================
// Page sections
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySection {
    #[serde(default = "default_telemetry_ms")]
    pub interval_ms: f64,
}

fn default_telemetry_ms() -> f64 {
    3000.0
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            interval_ms: default_telemetry_ms(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavigationSection {
    /// Scroll offset past which the bar switches to its solid style
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold: f64,
    /// Narrowest window that still shows the HUD cursor
    #[serde(default = "default_cursor_min_width")]
    pub cursor_min_width: f64,
}

fn default_scroll_threshold() -> f64 {
    50.0
}

fn default_cursor_min_width() -> f64 {
    1024.0
}

impl Default for NavigationSection {
    fn default() -> Self {
        Self {
            scroll_threshold: default_scroll_threshold(),
            cursor_min_width: default_cursor_min_width(),
        }
    }
}

/// Seeds for everything placed at random
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSection {
    /// Fixed seed for reproducible previews; random when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Where each section sits on the page, in document pixels
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSection {
    pub metrics: SectionBounds,
    pub services: SectionBounds,
    pub story_map: SectionBounds,
    pub data_journey: SectionBounds,
    pub technologies: SectionBounds,
    pub live_data: SectionBounds,
    pub contact: SectionBounds,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            metrics: SectionBounds::new(620.0, 160.0),
            services: SectionBounds::new(900.0, 900.0),
            story_map: SectionBounds::new(1800.0, 1000.0),
            data_journey: SectionBounds::new(2800.0, 1200.0),
            technologies: SectionBounds::new(4000.0, 800.0),
            live_data: SectionBounds::new(4800.0, 900.0),
            contact: SectionBounds::new(5700.0, 900.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionBounds {
    pub top: f64,
    pub height: f64,
}

impl SectionBounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn to_bounds(self) -> Result<ElementBounds> {
        Ok(ElementBounds::new(self.top, self.height)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = SiteConfig::from_toml_str("").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.typewriter.texts.len(), 4);
        assert_eq!(config.typewriter.speed_ms, 60.0);
        assert_eq!(config.metrics[0].label, "Projects Delivered");
        assert_eq!(config.metrics[1].display(50), "50+");
        assert_eq!(config.feed.poll_interval_ms, 300_000.0);
        assert_eq!(config.contact.reset_ms, 5000.0);
        assert!(config.contact.access_key.is_empty());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = SiteConfig::from_toml_str(
            r#"
            [typewriter]
            speed_ms = 80.0

            [contact]
            access_key = "test-key"

            [scene]
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.typewriter.speed_ms, 80.0);
        assert_eq!(config.typewriter.pause_ms, 3000.0);
        assert_eq!(config.typewriter.texts.len(), 4);
        assert_eq!(config.contact.access_key, "test-key");
        assert_eq!(config.contact.endpoint, default_relay_endpoint());
        assert_eq!(config.scene.seed, Some(7));
    }

    #[test]
    fn test_metrics_override() {
        let config = SiteConfig::from_toml_str(
            r#"
            [[metrics]]
            label = "Maps Published"
            end = 1200
            prefix = "~"
            "#,
        )
        .unwrap();
        assert_eq!(config.metrics.len(), 1);
        assert_eq!(config.metrics[0].duration_ms, 2000.0);
        assert_eq!(config.metrics[0].display(1200), "~1,200");
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = SiteConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(SiteConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(SiteConfig::from_toml_str("[typewriter]\nspeed_ms = \"fast\"").is_err());
    }

    #[test]
    fn test_bounds_validation() {
        assert!(SectionBounds::new(0.0, -5.0).to_bounds().is_err());
        assert!(SectionBounds::new(10.0, 5.0).to_bounds().is_ok());
    }
}
