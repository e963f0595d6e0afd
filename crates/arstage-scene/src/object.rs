use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use arstage_core::{Placement, Ray};
use arstage_media::MediaId;

use crate::interaction::Action;

/// Unique identifier for a content object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(pub String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a button label is drawn onto its texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background: String,
    pub foreground: String,
    pub font_size: f32,
    pub bold: bool,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            canvas_width: 512,
            canvas_height: 128,
            background: "#111".to_string(),
            foreground: "#fff".to_string(),
            font_size: 28.0,
            bold: true,
        }
    }
}

/// One flat region of a composite object, relative to its origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardRegion {
    pub offset: Vec3,
    pub size: Vec2,
}

/// What a content object shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentKind {
    /// The animated 3D presenter.
    Avatar { model: String },
    /// A flat surface with a text label.
    LabeledButton { label: String, style: LabelStyle },
    /// A plane textured with a video resource.
    VideoSurface { media: MediaId },
    /// Case-study card: an image region above a text region.
    InfoCard {
        title: String,
        category: String,
        body: String,
        image: String,
        image_region: CardRegion,
        text_region: CardRegion,
    },
}

impl ContentKind {
    pub fn name(&self) -> &'static str {
        match self {
            ContentKind::Avatar { .. } => "avatar",
            ContentKind::LabeledButton { .. } => "button",
            ContentKind::VideoSurface { .. } => "video",
            ContentKind::InfoCard { .. } => "card",
        }
    }
}

/// A visual, placeable, optionally interactive unit of the presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentObject {
    pub id: ContentId,
    pub kind: ContentKind,
    /// Placement relative to the anchor frame.
    pub placement: Placement,
    /// Extent of the flat surface in local units; `None` for objects that
    /// cannot be picked.
    pub size: Option<Vec2>,
    pub visible: bool,
    pub action: Option<Action>,
}

impl ContentObject {
    /// New hidden object at `placement`.
    pub fn new(id: ContentId, kind: ContentKind, placement: Placement) -> Self {
        Self {
            id,
            kind,
            placement,
            size: None,
            visible: false,
            action: None,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Some(Vec2::new(width, height));
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Distance along `ray` to the nearest surface of this object, given
    /// the anchor-to-world transform.
    pub fn intersect(&self, ray: &Ray, anchor_pose: &Mat4) -> Option<f32> {
        let world = *anchor_pose * self.placement.to_mat4();
        match &self.kind {
            ContentKind::InfoCard {
                image_region,
                text_region,
                ..
            } => [image_region, text_region]
                .into_iter()
                .filter_map(|region| {
                    let m = world * Mat4::from_translation(region.offset);
                    ray.intersect_rect(&m, region.size)
                })
                .min_by(|a, b| a.total_cmp(b)),
            _ => self.size.and_then(|size| ray.intersect_rect(&world, size)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_objects_start_hidden() {
        let obj = ContentObject::new(
            ContentId::new("avatar"),
            ContentKind::Avatar {
                model: "./2.glb".into(),
            },
            Placement::identity(),
        );
        assert!(!obj.visible);
        assert!(obj.action.is_none());
        assert_eq!(obj.kind.name(), "avatar");
    }

    #[test]
    fn test_unsized_object_is_never_hit() {
        let obj = ContentObject::new(
            ContentId::new("avatar"),
            ContentKind::Avatar {
                model: "./2.glb".into(),
            },
            Placement::at(0.0, 0.0, -2.0),
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(obj.intersect(&ray, &Mat4::IDENTITY).is_none());
    }

    #[test]
    fn test_card_hit_uses_regions() {
        let region = |y: f32| CardRegion {
            offset: Vec3::new(0.0, y, 0.0),
            size: Vec2::new(0.6, 0.4),
        };
        let card = ContentObject::new(
            ContentId::new("card"),
            ContentKind::InfoCard {
                title: "t".into(),
                category: "c".into(),
                body: "b".into(),
                image: "i.png".into(),
                image_region: region(0.2),
                text_region: region(-0.2),
            },
            Placement::at(0.0, 0.0, -2.0),
        );
        let up = Ray::new(Vec3::new(0.0, 0.3, 0.0), Vec3::NEG_Z);
        let down = Ray::new(Vec3::new(0.0, -0.3, 0.0), Vec3::NEG_Z);
        let miss = Ray::new(Vec3::new(0.0, 0.5, 0.0), Vec3::NEG_Z);
        assert!(card.intersect(&up, &Mat4::IDENTITY).is_some());
        assert!(card.intersect(&down, &Mat4::IDENTITY).is_some());
        assert!(card.intersect(&miss, &Mat4::IDENTITY).is_none());
    }
}
