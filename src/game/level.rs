//! Static level layout

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ConfigError;

use super::entities::{ChoiceOption, Coin, Hazard, NarrativeTrigger, Platform};
use super::power::PowerKind;

/// Level layout; positions are static for the whole session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub hazards: Vec<Hazard>,
    #[serde(default)]
    pub coins: Vec<Coin>,
    #[serde(default)]
    pub triggers: Vec<NarrativeTrigger>,
}

impl Level {
    /// Level with no geometry at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a JSON layout
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON layout from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::LevelIo {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            platforms = level.platforms.len(),
            hazards = level.hazards.len(),
            coins = level.coins.len(),
            "Loaded level"
        );
        Ok(level)
    }

    /// Built-in alley level
    pub fn builtin() -> Self {
        let platforms = vec![
            Platform::new(300.0, 360.0, 140.0, 16.0),
            Platform::new(640.0, 320.0, 160.0, 16.0),
            Platform::new(980.0, 350.0, 120.0, 16.0),
            Platform::new(1480.0, 330.0, 180.0, 16.0),
            Platform::new(1900.0, 300.0, 140.0, 16.0),
        ];

        let hazards = vec![
            hazard(560.0, 520.0, 760.0, 70.0),
            hazard(1250.0, 1200.0, 1420.0, 90.0),
            hazard(1780.0, 1700.0, 1860.0, 110.0),
        ];

        let coins = [
            (340.0, 320.0),
            (700.0, 280.0),
            (1020.0, 310.0),
            (1300.0, 400.0),
            (1540.0, 290.0),
            (1950.0, 260.0),
            (2150.0, 400.0),
        ]
        .into_iter()
        .map(|(x, y)| Coin { x, y, taken: false })
        .collect();

        let triggers = vec![
            NarrativeTrigger {
                x: 420.0,
                prompt: "You found a little box with goodies inside. Which one do you take?"
                    .to_string(),
                options: vec![
                    option("Little spring", PowerKind::Spring),
                    option("Dried fish", PowerKind::Fish),
                    option("Colorful balloon", PowerKind::Balloon),
                ],
                used: false,
            },
            NarrativeTrigger {
                x: 1100.0,
                prompt: "A friendly stall keeper offers you a gift:".to_string(),
                options: vec![
                    option("Little horn (clears the way)", PowerKind::Horn),
                    option("Purr power (short dash)", PowerKind::Dash),
                ],
                used: false,
            },
        ];

        Self {
            platforms,
            hazards,
            coins,
            triggers,
        }
    }
}

fn hazard(x: f32, patrol_min: f32, patrol_max: f32, speed: f32) -> Hazard {
    Hazard {
        x,
        y: 404.0,
        width: 40.0,
        height: 36.0,
        direction: 1,
        patrol_min,
        patrol_max,
        speed,
    }
}

fn option(label: &str, kind: PowerKind) -> ChoiceOption {
    ChoiceOption {
        label: label.to_string(),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_hazards_start_inside_patrol() {
        let level = Level::builtin();
        for h in &level.hazards {
            assert!(h.x >= h.patrol_min && h.x <= h.patrol_max);
        }
        assert!(level.coins.iter().all(|c| !c.taken));
        assert!(level.triggers.iter().all(|t| !t.used && !t.options.is_empty()));
    }

    #[test]
    fn parses_partial_json_layout() {
        let json = r#"{
            "platforms": [{ "x": 10.0, "y": 300.0, "w": 100.0, "h": 16.0 }],
            "coins": [{ "x": 50.0, "y": 260.0 }],
            "triggers": [{
                "x": 400.0,
                "prompt": "Pick one",
                "options": [{ "label": "Spring", "kind": "spring" }]
            }]
        }"#;

        let level = Level::from_json(json).unwrap();
        assert_eq!(level.platforms.len(), 1);
        assert!(level.hazards.is_empty());
        assert!(!level.coins[0].taken);
        assert_eq!(level.triggers[0].options[0].kind, PowerKind::Spring);
    }

    #[test]
    fn rejects_unknown_power_in_layout() {
        let json = r#"{ "triggers": [{ "x": 1.0, "prompt": "?", "options": [{ "label": "x", "kind": "rocket" }] }] }"#;
        assert!(matches!(Level::from_json(json), Err(ConfigError::Level(_))));
    }
}
