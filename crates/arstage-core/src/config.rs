use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ArError, ArResult};
use crate::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Selector of the element the tracker renders into.
    pub container: String,
    /// Compiled image-target descriptor.
    pub target: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            container: "#ar-container".to_string(),
            target: "./targets1.mind".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SceneConfig {
    pub ambient_color: String,
    pub ambient_intensity: f32,
    pub directional_color: String,
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    pub tone_mapping_exposure: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            ambient_color: "#ffffff".to_string(),
            ambient_intensity: 0.8,
            directional_color: "#ffffff".to_string(),
            directional_intensity: 1.0,
            directional_position: [0.0, 2.0, 2.0],
            tone_mapping_exposure: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AvatarConfig {
    pub model: String,
    pub scale: f32,
    pub rotation_x_degrees: f32,
    /// Clip played while the avatar idles; the first clip is used when absent.
    pub idle_clip: String,
    /// Resting placement between sequence steps.
    pub center: [f32; 3],
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            model: "./2.glb".to_string(),
            scale: 0.35,
            rotation_x_degrees: 90.0,
            idle_clip: "Armature_mixamo.com_Layer0".to_string(),
            center: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IntroConfig {
    pub narration: String,
    pub delay_secs: f64,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            narration: "BezVO.mp3".to_string(),
            delay_secs: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SequenceStepConfig {
    pub source: String,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub surface_size: [f32; 2],
    /// Upper bound on how long one step waits for its clip to end.
    pub step_timeout_secs: Option<f64>,
    pub steps: Vec<SequenceStepConfig>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        let step = |source: &str, x: f32| SequenceStepConfig {
            source: source.to_string(),
            position: [x, 0.1, 0.0],
        };
        Self {
            surface_size: [0.5, 0.3],
            step_timeout_secs: Some(90.0),
            steps: vec![
                step("bez1.mp4", -1.3),
                step("bez2.mp4", -0.45),
                step("bez3.mp4", 0.45),
                step("bez1.mp4", 1.3),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ButtonStyle {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background: String,
    pub foreground: String,
    pub font_size: f32,
    pub scale: f32,
    /// Distance in front of the target plane.
    pub depth: f32,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            canvas_width: 512,
            canvas_height: 128,
            background: "#111".to_string(),
            foreground: "#fff".to_string(),
            font_size: 28.0,
            scale: 0.45,
            depth: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ButtonConfig {
    pub label: String,
    pub position: [f32; 2],
}

impl ButtonConfig {
    fn new(label: &str, x: f32, y: f32) -> Self {
        Self {
            label: label.to_string(),
            position: [x, y],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ButtonsConfig {
    pub style: ButtonStyle,
    pub our_content: ButtonConfig,
    pub case_studies: ButtonConfig,
    pub about_us: ButtonConfig,
    pub back: ButtonConfig,
    pub website: ButtonConfig,
    pub contact: ButtonConfig,
    pub show_case_studies: ButtonConfig,
}

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self {
            style: ButtonStyle::default(),
            our_content: ButtonConfig::new("our content", -1.0, 0.4),
            case_studies: ButtonConfig::new("case studies", 0.0, 0.4),
            about_us: ButtonConfig::new("about us", 1.0, 0.4),
            back: ButtonConfig::new("← Back", -1.3, 0.45),
            website: ButtonConfig::new("www.bez.agency", -0.6, -0.3),
            contact: ButtonConfig::new("bez@gmail.com", 0.6, -0.3),
            show_case_studies: ButtonConfig::new("Show Case Studies", 0.0, -0.1),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LinksConfig {
    pub website: String,
    pub contact: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            website: "https://www.bez.agency".to_string(),
            contact: "mailto:bez@gmail.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CaseStudyConfig {
    pub title: String,
    pub category: String,
    pub body: String,
    pub image: String,
    pub x: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CaseStudiesConfig {
    pub y: f32,
    pub z: f32,
    pub cards: Vec<CaseStudyConfig>,
}

impl Default for CaseStudiesConfig {
    fn default() -> Self {
        let card = |title: &str, category: &str, body: &str, image: &str, x: f32| {
            CaseStudyConfig {
                title: title.to_string(),
                category: category.to_string(),
                body: body.to_string(),
                image: image.to_string(),
                x,
            }
        };
        Self {
            y: 0.3,
            z: 0.2,
            cards: vec![
                card(
                    "National Geographic",
                    "Fashion",
                    "Visuals that epitomize curiosity.",
                    "./case1.png",
                    -0.8,
                ),
                card(
                    "Lamborghini",
                    "Automotive",
                    "Every rev tells a story.",
                    "./case2.png",
                    0.0,
                ),
                card(
                    "Hello Bello",
                    "Services",
                    "A culinary voyage with pizzas.",
                    "./case3.png",
                    0.8,
                ),
            ],
        }
    }
}

/// Clip lengths used by the simulated playback backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaConfig {
    pub default_duration_secs: f64,
    pub durations: BTreeMap<String, f64>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            default_duration_secs: 10.0,
            durations: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub fps: f64,
    pub width: f32,
    pub height: f32,
    pub fov_y_degrees: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            width: 1280.0,
            height: 720.0,
            fov_y_degrees: 45.0,
        }
    }
}

/// Upper bound for configured delays, timeouts and clip lengths (one day).
pub const MAX_TIMER_SECS: f64 = 86_400.0;
/// Upper bound for the render rate.
pub const MAX_FPS: f64 = 1000.0;

/// `value` must be finite, positive and at most `max`.
fn check_range(name: &str, value: f64, max: f64) -> ArResult<()> {
    if value.is_finite() && value > 0.0 && value <= max {
        Ok(())
    } else {
        Err(ArError::Config(format!(
            "{} must be in (0, {}], got {}",
            name, max, value
        )))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ExperienceConfig {
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub avatar: AvatarConfig,
    #[serde(default)]
    pub intro: IntroConfig,
    #[serde(default)]
    pub sequence: SequenceConfig,
    #[serde(default)]
    pub buttons: ButtonsConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub case_studies: CaseStudiesConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl ExperienceConfig {
    pub fn from_toml_str(contents: &str) -> ArResult<Self> {
        let config: ExperienceConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &std::path::Path) -> ArResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> ArResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ArError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject configurations the presentation cannot run.
    pub fn validate(&self) -> ArResult<()> {
        if self.sequence.steps.is_empty() {
            return Err(ArError::Config("sequence must have at least one step".into()));
        }
        check_range("intro.delay_secs", self.intro.delay_secs, MAX_TIMER_SECS)?;
        if let Some(t) = self.sequence.step_timeout_secs {
            check_range("sequence.step_timeout_secs", t, MAX_TIMER_SECS)?;
        }
        check_range("display.fps", self.display.fps, MAX_FPS)?;
        check_range(
            "media.default_duration_secs",
            self.media.default_duration_secs,
            MAX_TIMER_SECS,
        )?;
        for (source, secs) in &self.media.durations {
            if !secs.is_finite() || *secs < 0.0 || *secs > MAX_TIMER_SECS {
                return Err(ArError::Config(format!(
                    "media.durations.\"{}\" must be between 0 and {}, got {}",
                    source, MAX_TIMER_SECS, secs
                )));
            }
        }
        Ok(())
    }

    pub fn intro_delay(&self) -> Duration {
        Duration::from_seconds(self.intro.delay_secs)
    }

    pub fn step_timeout(&self) -> Option<Duration> {
        self.sequence.step_timeout_secs.map(Duration::from_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = ExperienceConfig::default();
        assert_eq!(config.sequence.steps.len(), 4);
        assert_eq!(config.sequence.steps[0].position, [-1.3, 0.1, 0.0]);
        assert_eq!(config.sequence.steps[3].source, "bez1.mp4");
        assert_eq!(config.case_studies.cards.len(), 3);
        assert_eq!(config.intro_delay(), Duration::from_seconds(8.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = ExperienceConfig::from_toml_str(
            r#"
            [intro]
            delay_secs = 2.5

            [links]
            website = "https://example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.intro.delay_secs, 2.5);
        assert_eq!(config.intro.narration, "BezVO.mp3");
        assert_eq!(config.links.website, "https://example.com");
        assert_eq!(config.links.contact, "mailto:bez@gmail.com");
        assert_eq!(config.sequence.steps.len(), 4);
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let err = ExperienceConfig::from_toml_str(
            r#"
            [sequence]
            steps = []
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least one step"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ExperienceConfig::default();
        config.sequence.step_timeout_secs = Some(0.0);
        assert!(config.validate().is_err());
        config.sequence.step_timeout_secs = None;
        assert!(config.validate().is_ok());
        assert!(config.step_timeout().is_none());
    }

    #[test]
    fn test_out_of_range_timers_rejected() {
        for toml in [
            "[intro]\ndelay_secs = 1e20",
            "[intro]\ndelay_secs = inf",
            "[intro]\ndelay_secs = nan",
            "[sequence]\nstep_timeout_secs = inf",
            "[sequence]\nstep_timeout_secs = 1e20",
            "[display]\nfps = inf",
            "[display]\nfps = 1e9",
            "[display]\nfps = 0.0",
            "[media]\ndefault_duration_secs = 1e20",
            "[media.durations]\n\"bez1.mp4\" = -1.0",
        ] {
            let err = ExperienceConfig::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, ArError::Config(_)), "accepted: {}", toml);
        }
        let config = ExperienceConfig::from_toml_str(
            "[intro]\ndelay_secs = 86400\n[display]\nfps = 120",
        )
        .unwrap();
        assert_eq!(config.intro_delay(), Duration::from_seconds(86_400.0));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = std::env::temp_dir().join(format!("arstage-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("arstage.toml");
        ExperienceConfig::default().save_to_file(&path).unwrap();
        let reloaded = ExperienceConfig::load_from_file(&path).unwrap();
        assert_eq!(reloaded.sequence.steps, ExperienceConfig::default().sequence.steps);
        assert_eq!(reloaded.buttons.back.label, "← Back");
        std::fs::remove_dir_all(&dir).ok();
    }
}
