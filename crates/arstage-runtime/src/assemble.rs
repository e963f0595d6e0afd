//! Startup: load assets, build every content object and wire the
//! presentation together. Asset faults here are fatal; media faults are
//! not.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use arstage_core::{
    ArResult, ButtonConfig, ButtonStyle, Camera, Duration, ExperienceConfig, Placement,
    TrackingConfig, Viewport,
};
use arstage_media::{MediaBackend, MediaId, MediaResource, MediaSource};
use arstage_scene::{
    Action, AnchorFrame, Collection, ContentRegistry, InteractionRouter, LabelStyle,
};

use crate::animation::{AnimationClip, AnimationMixer, LoadedModel};
use crate::presentation::{Presentation, PresentationSettings};
use crate::render::SceneSetup;
use crate::sequence::SequenceStep;

/// Decoded texture metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureInfo {
    pub path: String,
    pub width: u32,
    pub height: u32,
}

/// Loads the avatar model and card textures.
pub trait AssetLoader {
    fn load_model(&self, path: &str) -> ArResult<LoadedModel>;

    fn load_texture(&self, path: &str) -> ArResult<TextureInfo>;
}

/// Stands in for real assets: a model with one two-second `Idle` clip and
/// 1x1 textures.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderAssets;

impl AssetLoader for PlaceholderAssets {
    fn load_model(&self, path: &str) -> ArResult<LoadedModel> {
        Ok(LoadedModel {
            source: path.to_string(),
            clips: vec![AnimationClip::new("Idle", Duration::from_seconds(2.0))],
        })
    }

    fn load_texture(&self, path: &str) -> ArResult<TextureInfo> {
        Ok(TextureInfo {
            path: path.to_string(),
            width: 1,
            height: 1,
        })
    }
}

/// A fully wired experience, ready to hand to a director.
#[derive(Debug)]
pub struct Experience {
    pub presentation: Presentation,
    pub router: InteractionRouter,
    pub setup: SceneSetup,
    pub camera: Camera,
    pub viewport: Viewport,
    pub frame_interval: Duration,
    pub tracking: TrackingConfig,
}

impl Experience {
    pub fn assemble(
        config: &ExperienceConfig,
        assets: &dyn AssetLoader,
        media: &dyn MediaBackend,
    ) -> ArResult<Self> {
        config.validate()?;

        let model = assets.load_model(&config.avatar.model)?;
        for card in &config.case_studies.cards {
            let texture = assets.load_texture(&card.image)?;
            tracing::debug!(
                "Loaded texture {} ({}x{})",
                texture.path,
                texture.width,
                texture.height
            );
        }

        let mut registry = ContentRegistry::new(AnchorFrame::new(0));

        let avatar = &config.avatar;
        registry.create_avatar(
            avatar.model.clone(),
            Placement::from_array(avatar.center)
                .with_uniform_scale(avatar.scale)
                .with_rotation_x(avatar.rotation_x_degrees.to_radians()),
        );

        let surface = Vec2::from_array(config.sequence.surface_size);
        let mut steps = Vec::with_capacity(config.sequence.steps.len());
        for (i, step) in config.sequence.steps.iter().enumerate() {
            let position = Vec3::from_array(step.position);
            registry.create_video_surface(position, surface, MediaSource::video(&step.source), media);
            steps.push(SequenceStep {
                avatar_position: position,
                video: i,
            });
        }

        let buttons = &config.buttons;
        let mut button = |collection: Collection, key: &str, spec: &ButtonConfig, action: Action| {
            registry.create_labeled_button(
                collection,
                key,
                &spec.label,
                Vec3::new(spec.position[0], spec.position[1], buttons.style.depth),
                label_style(&buttons.style),
                buttons.style.scale,
                action,
            );
        };
        button(Collection::LinkButtons, "website", &buttons.website, Action::OpenWebsite);
        button(Collection::LinkButtons, "contact", &buttons.contact, Action::OpenContact);
        button(Collection::BackButton, "back", &buttons.back, Action::Back);
        button(
            Collection::CaseStudyButtons,
            "show-case-studies",
            &buttons.show_case_studies,
            Action::ShowCaseStudies,
        );
        button(Collection::MenuButtons, "our-content", &buttons.our_content, Action::OurContent);
        button(Collection::MenuButtons, "case-studies", &buttons.case_studies, Action::CaseStudies);
        button(Collection::MenuButtons, "about-us", &buttons.about_us, Action::AboutUs);

        let cards = &config.case_studies;
        for card in &cards.cards {
            registry.create_info_card(
                &card.title,
                &card.category,
                &card.body,
                &card.image,
                Vec3::new(card.x, cards.y, cards.z),
            );
        }

        let narration = MediaResource::load_or_unavailable(
            MediaId::new("narration"),
            MediaSource::audio(&config.intro.narration),
            media,
        );
        let mixer = AnimationMixer::new(&model, &avatar.idle_clip);
        let router = InteractionRouter::from_registry(&registry);

        tracing::info!(
            "Experience assembled: {} objects, {} videos, {} sequence steps",
            registry.objects().len(),
            registry.video_count(),
            steps.len()
        );

        let presentation = Presentation::new(
            registry,
            narration,
            mixer,
            steps,
            PresentationSettings::from_config(config),
        );

        let viewport = Viewport::new(config.display.width, config.display.height);
        Ok(Self {
            presentation,
            router,
            setup: SceneSetup::from_config(&config.scene),
            camera: Camera::perspective(config.display.fov_y_degrees, viewport.aspect_ratio()),
            viewport,
            frame_interval: Duration::from_seconds(1.0 / config.display.fps),
            tracking: config.tracking.clone(),
        })
    }
}

fn label_style(style: &ButtonStyle) -> LabelStyle {
    LabelStyle {
        canvas_width: style.canvas_width,
        canvas_height: style.canvas_height,
        background: style.background.clone(),
        foreground: style.foreground.clone(),
        font_size: style.font_size,
        bold: true,
    }
}
