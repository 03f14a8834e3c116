// src/config.rs

use crate::error::BotError;
use crate::types::{Align, Config};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Command-line values that take precedence over the YAML file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub window: Option<String>,
    pub height: Option<u32>,
    pub align: Option<String>,
    pub no_vision: bool,
    pub startup_delay_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Missing file means defaults; a file that exists must parse.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) -> Result<()> {
        if let Some(title) = overrides.window {
            self.window.title = title;
        }
        if let Some(height) = overrides.height {
            self.window.height = Some(height);
        }
        if let Some(align) = overrides.align {
            self.window.align = align.parse::<Align>()?;
        }
        if overrides.no_vision {
            self.vision.enabled = false;
        }
        if let Some(delay) = overrides.startup_delay_ms {
            self.timing.startup_delay_ms = delay;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), BotError> {
        fn ratio(name: &str, value: f64) -> Result<(), BotError> {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(BotError::InvalidArgument(format!(
                    "{name} must be in (0, 1], got {value}"
                )))
            }
        }

        let band = &self.detection.band;
        ratio("detection.band.center_ratio", band.center_ratio)?;
        ratio("detection.band.crop_ratio", band.crop_ratio)?;
        if band.downscale == 0 {
            return Err(BotError::InvalidArgument(
                "detection.band.downscale must be at least 1".into(),
            ));
        }

        let ball = &self.detection.ball;
        ratio("detection.ball.min_radius_ratio", ball.min_radius_ratio)?;
        ratio("detection.ball.max_radius_ratio", ball.max_radius_ratio)?;
        if ball.min_radius_ratio > ball.max_radius_ratio {
            return Err(BotError::InvalidArgument(format!(
                "detection.ball radius range is empty ({} > {})",
                ball.min_radius_ratio, ball.max_radius_ratio
            )));
        }

        ratio("detection.edges.min_length_ratio", self.detection.edges.min_length_ratio)?;
        ratio("decision.distance_ratio", self.decision.distance_ratio)?;

        if self.tracking.dropout_threshold == 0 {
            return Err(BotError::InvalidArgument(
                "tracking.dropout_threshold must be at least 1".into(),
            ));
        }
        if self.window.height == Some(0) {
            return Err(BotError::InvalidArgument("window.height must be positive".into()));
        }
        if self.window.title.trim().is_empty() {
            return Err(BotError::InvalidArgument("window.title is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "window:\n  title: Emulator\n  align: center\ntracking:\n  dropout_threshold: 4\n",
        )
        .unwrap();
        assert_eq!(config.window.title, "Emulator");
        assert_eq!(config.window.align, Align::Center);
        assert_eq!(config.tracking.dropout_threshold, 4);
        assert_eq!(config.detection.band.downscale, 2);
        assert_eq!(config.decision.initial_direction, Direction::Right);
        assert!(config.vision.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.timing.startup_delay_ms, 100);
        assert_eq!(config.detection.edges.canny_low, 270.0);
    }

    #[test]
    fn test_window_decorations_configurable() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!((config.window.title_bar_height, config.window.border_width), (30, 4));

        let config = Config::from_yaml("window:\n  title_bar_height: 0\n  border_width: 0\n").unwrap();
        assert_eq!((config.window.title_bar_height, config.window.border_width), (0, 0));
    }

    #[test]
    fn test_unknown_align_rejected() {
        assert!(Config::from_yaml("window:\n  align: diagonal\n").is_err());
    }

    #[test]
    fn test_direction_from_yaml() {
        let config = Config::from_yaml("decision:\n  initial_direction: LEFT\n").unwrap();
        assert_eq!(config.decision.initial_direction, Direction::Left);
    }

    #[test]
    fn test_overrides_win() {
        let mut config = Config::default();
        config
            .apply(Overrides {
                window: Some("Other".into()),
                height: Some(900),
                align: Some("right".into()),
                no_vision: true,
                startup_delay_ms: Some(0),
                log_level: Some("debug".into()),
            })
            .unwrap();
        assert_eq!(config.window.title, "Other");
        assert_eq!(config.window.height, Some(900));
        assert_eq!(config.window.align, Align::Right);
        assert!(!config.vision.enabled);
        assert_eq!(config.timing.startup_delay_ms, 0);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_bad_align_override_is_invalid_argument() {
        let mut config = Config::default();
        let err = config
            .apply(Overrides {
                align: Some("up".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BotError>(),
            Some(BotError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.detection.band.crop_ratio = 0.0;
        assert!(matches!(config.validate(), Err(BotError::InvalidArgument(_))));

        let mut config = Config::default();
        config.detection.band.downscale = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.tracking.dropout_threshold = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.detection.ball.min_radius_ratio = 0.5;
        assert!(config.validate().is_err());

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default(Path::new("/nonexistent/zigzag.yaml")).unwrap();
        assert_eq!(config.window.title, "BlueStacks App Player");
    }
}
