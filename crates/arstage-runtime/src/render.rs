//! Boundary to the external 3D engine. The presentation only issues
//! commands; meshes, materials and the camera projection live elsewhere.

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use arstage_core::{ArResult, Duration, SceneConfig};
use arstage_scene::{ContentId, ContentObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToneMapping {
    None,
    AcesFilmic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub color: String,
    pub intensity: f32,
    /// `None` for ambient light.
    pub position: Option<Vec3>,
}

/// Lighting and output settings issued once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSetup {
    pub ambient: Light,
    pub directional: Light,
    pub srgb_output: bool,
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
}

impl SceneSetup {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            ambient: Light {
                color: config.ambient_color.clone(),
                intensity: config.ambient_intensity,
                position: None,
            },
            directional: Light {
                color: config.directional_color.clone(),
                intensity: config.directional_intensity,
                position: Some(Vec3::from_array(config.directional_position)),
            },
            srgb_output: true,
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: config.tone_mapping_exposure,
        }
    }
}

/// Commands the presentation issues to the rendering engine.
pub trait RenderBackend {
    fn setup(&mut self, setup: &SceneSetup) -> ArResult<()>;

    fn add_object(&mut self, object: &ContentObject) -> ArResult<()>;

    fn set_visibility(&mut self, id: &ContentId, visible: bool);

    /// World transform of an object for the coming frame.
    fn set_transform(&mut self, id: &ContentId, world: Mat4);

    fn advance_animation(&mut self, delta: Duration);

    fn render_frame(&mut self) -> ArResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedObject {
    pub visible: bool,
    pub world: Mat4,
}

/// Headless renderer that keeps the last commanded state of each object.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    setup: Option<SceneSetup>,
    objects: HashMap<ContentId, RenderedObject>,
    animation_time: Duration,
    frames: u64,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene_setup(&self) -> Option<&SceneSetup> {
        self.setup.as_ref()
    }

    pub fn object(&self, id: &ContentId) -> Option<&RenderedObject> {
        self.objects.get(id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn animation_time(&self) -> Duration {
        self.animation_time
    }
}

impl RenderBackend for RecordingRenderer {
    fn setup(&mut self, setup: &SceneSetup) -> ArResult<()> {
        self.setup = Some(setup.clone());
        Ok(())
    }

    fn add_object(&mut self, object: &ContentObject) -> ArResult<()> {
        self.objects.insert(
            object.id.clone(),
            RenderedObject {
                visible: object.visible,
                world: object.placement.to_mat4(),
            },
        );
        Ok(())
    }

    fn set_visibility(&mut self, id: &ContentId, visible: bool) {
        if let Some(object) = self.objects.get_mut(id) {
            object.visible = visible;
        }
    }

    fn set_transform(&mut self, id: &ContentId, world: Mat4) {
        if let Some(object) = self.objects.get_mut(id) {
            object.world = world;
        }
    }

    fn advance_animation(&mut self, delta: Duration) {
        self.animation_time += delta;
    }

    fn render_frame(&mut self) -> ArResult<()> {
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arstage_core::Placement;
    use arstage_scene::ContentKind;

    #[test]
    fn test_setup_from_default_scene() {
        let setup = SceneSetup::from_config(&SceneConfig::default());
        assert_eq!(setup.ambient.intensity, 0.8);
        assert_eq!(setup.directional.position, Some(Vec3::new(0.0, 2.0, 2.0)));
        assert_eq!(setup.tone_mapping, ToneMapping::AcesFilmic);
    }

    #[test]
    fn test_recording_renderer_tracks_commands() {
        let mut renderer = RecordingRenderer::new();
        let object = ContentObject::new(
            ContentId::new("avatar"),
            ContentKind::Avatar {
                model: "./2.glb".into(),
            },
            Placement::identity(),
        );
        renderer.add_object(&object).unwrap();
        renderer.set_visibility(&object.id, true);
        renderer.set_transform(&object.id, Mat4::from_translation(Vec3::X));
        renderer.render_frame().unwrap();
        let rendered = renderer.object(&object.id).unwrap();
        assert!(rendered.visible);
        assert_eq!(rendered.world, Mat4::from_translation(Vec3::X));
        assert_eq!(renderer.frames(), 1);
    }
}
