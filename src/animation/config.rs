//! Animation timing configuration.

use serde::{Deserialize, Serialize};

use crate::error::{LayerError, Result};

use super::tween::Easing;

/// Timing parameters for the animation layer.
///
/// Can be loaded from TOML; missing keys keep their defaults.
///
/// ```
/// use card_stage::animation::AnimationConfig;
///
/// let config = AnimationConfig::from_toml_str("move_duration = 0.25").unwrap();
/// assert_eq!(config.move_duration, 0.25);
/// assert_eq!(config.deal_interval, AnimationConfig::default().deal_interval);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Duration of a fresh move tween, in seconds.
    pub move_duration: f32,

    /// Lower clamp for recycled durations.
    pub min_duration: f32,

    /// Upper clamp for recycled durations.
    pub max_duration: f32,

    /// Delay between consecutive cards of a deal.
    pub deal_interval: f32,

    /// Duration of the resize played when a drag enters or leaves a drop target.
    pub drag_resize_duration: f32,

    /// Easing applied to move tweens.
    pub easing: Easing,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            move_duration: 0.4,
            min_duration: 0.1,
            max_duration: 0.6,
            deal_interval: 0.1,
            drag_resize_duration: 0.15,
            easing: Easing::ExponentialOut,
        }
    }
}

impl AnimationConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| LayerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that durations are usable.
    pub fn validate(&self) -> Result<()> {
        if self.move_duration < 0.0 || self.deal_interval < 0.0 || self.drag_resize_duration < 0.0 {
            return Err(LayerError::InvalidConfig(
                "durations must not be negative".to_string(),
            ));
        }
        if self.min_duration <= 0.0 {
            return Err(LayerError::InvalidConfig(
                "min_duration must be positive".to_string(),
            ));
        }
        if self.min_duration > self.max_duration {
            return Err(LayerError::InvalidConfig(format!(
                "min_duration {} exceeds max_duration {}",
                self.min_duration, self.max_duration
            )));
        }
        Ok(())
    }

    /// Set the fresh move duration.
    #[must_use]
    pub fn with_move_duration(mut self, seconds: f32) -> Self {
        self.move_duration = seconds;
        self
    }

    /// Set the clamp range for recycled durations.
    #[must_use]
    pub fn with_duration_bounds(mut self, min: f32, max: f32) -> Self {
        self.min_duration = min;
        self.max_duration = max;
        self
    }

    /// Set the delay between dealt cards.
    #[must_use]
    pub fn with_deal_interval(mut self, seconds: f32) -> Self {
        self.deal_interval = seconds;
        self
    }

    #[must_use]
    pub fn with_drag_resize_duration(mut self, seconds: f32) -> Self {
        self.drag_resize_duration = seconds;
        self
    }

    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Fresh move duration, clamped to the configured bounds.
    #[must_use]
    pub fn clamped_move_duration(&self) -> f32 {
        self.move_duration.max(self.min_duration).min(self.max_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnimationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.easing, Easing::ExponentialOut);
        assert!(config.min_duration <= config.move_duration);
        assert!(config.move_duration <= config.max_duration);
    }

    #[test]
    fn test_builder_pattern() {
        let config = AnimationConfig::default()
            .with_move_duration(0.2)
            .with_duration_bounds(0.05, 0.3)
            .with_deal_interval(0.2)
            .with_easing(Easing::Linear);

        assert_eq!(config.move_duration, 0.2);
        assert_eq!(config.min_duration, 0.05);
        assert_eq!(config.max_duration, 0.3);
        assert_eq!(config.deal_interval, 0.2);
        assert_eq!(config.easing, Easing::Linear);
    }

    #[test]
    fn test_clamped_move_duration() {
        let config = AnimationConfig::default()
            .with_move_duration(5.0)
            .with_duration_bounds(0.1, 0.5);
        assert_eq!(config.clamped_move_duration(), 0.5);
    }

    #[test]
    fn test_from_toml() {
        let config = AnimationConfig::from_toml_str(
            r#"
            move_duration = 0.3
            deal_interval = 0.05
            easing = "Linear"
            "#,
        )
        .unwrap();

        assert_eq!(config.move_duration, 0.3);
        assert_eq!(config.deal_interval, 0.05);
        assert_eq!(config.easing, Easing::Linear);
        assert_eq!(config.max_duration, AnimationConfig::default().max_duration);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let err = AnimationConfig::from_toml_str("min_duration = 1.0\nmax_duration = 0.5").unwrap_err();
        assert!(matches!(err, LayerError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = AnimationConfig::from_toml_str("move_duration = \"fast\"").unwrap_err();
        assert!(matches!(err, LayerError::InvalidConfig(_)));
    }

    #[test]
    fn test_serialization() {
        let config = AnimationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AnimationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
