use std::collections::{BTreeMap, HashMap};

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use arstage_core::{Duration, Placement};
use arstage_media::{MediaBackend, MediaId, MediaResource, MediaSource};

use crate::anchor::AnchorFrame;
use crate::interaction::Action;
use crate::object::{CardRegion, ContentId, ContentKind, ContentObject, LabelStyle};

/// Named groups the presentation switches on and off together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Collection {
    Avatar,
    VideoSurfaces,
    MenuButtons,
    CaseStudyButtons,
    CaseStudyCards,
    BackButton,
    /// Website and contact buttons.
    LinkButtons,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Avatar => write!(f, "avatar"),
            Collection::VideoSurfaces => write!(f, "video-surfaces"),
            Collection::MenuButtons => write!(f, "menu-buttons"),
            Collection::CaseStudyButtons => write!(f, "case-study-buttons"),
            Collection::CaseStudyCards => write!(f, "case-study-cards"),
            Collection::BackButton => write!(f, "back-button"),
            Collection::LinkButtons => write!(f, "link-buttons"),
        }
    }
}

/// Owns every content object and the media behind video surfaces.
///
/// The registry constructs and places objects; it never decides which of
/// them are visible.
#[derive(Debug)]
pub struct ContentRegistry {
    anchor: AnchorFrame,
    objects: Vec<ContentObject>,
    index: HashMap<ContentId, usize>,
    collections: BTreeMap<Collection, Vec<ContentId>>,
    /// Video resources keyed by the surface showing them.
    videos: Vec<(ContentId, MediaResource)>,
}

impl ContentRegistry {
    pub fn new(anchor: AnchorFrame) -> Self {
        Self {
            anchor,
            objects: Vec::new(),
            index: HashMap::new(),
            collections: BTreeMap::new(),
            videos: Vec::new(),
        }
    }

    /// `id`, or the first free `id-2`, `id-3`, ... when it is taken.
    fn free_id(&self, id: ContentId) -> ContentId {
        if !self.index.contains_key(&id) {
            return id;
        }
        let mut n = 2;
        loop {
            let candidate = ContentId::new(format!("{}-{}", id, n));
            if !self.index.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Objects are never replaced: a clashing id gets a numeric suffix.
    fn insert(&mut self, mut object: ContentObject, collection: Collection) -> ContentId {
        let id = self.free_id(object.id.clone());
        if id != object.id {
            tracing::warn!("Content id '{}' is taken, registering as '{}'", object.id, id);
            object.id = id.clone();
        }
        self.index.insert(id.clone(), self.objects.len());
        self.objects.push(object);
        self.anchor.attach(id.clone());
        let members = self.collections.entry(collection).or_default();
        if !members.contains(&id) {
            members.push(id.clone());
        }
        id
    }

    /// Place the avatar model. It is not pickable.
    pub fn create_avatar(&mut self, model: impl Into<String>, placement: Placement) -> ContentId {
        let object = ContentObject::new(
            ContentId::new("avatar"),
            ContentKind::Avatar {
                model: model.into(),
            },
            placement,
        );
        self.insert(object, Collection::Avatar)
    }

    /// A flat labeled surface bound to `action`, with id `button:<key>`.
    /// `scale` sizes the 1.4 x 0.35 base plane.
    pub fn create_labeled_button(
        &mut self,
        collection: Collection,
        key: &str,
        label: &str,
        position: Vec3,
        style: LabelStyle,
        scale: f32,
        action: Action,
    ) -> ContentId {
        let id = ContentId::new(format!("button:{}", slug(key)));
        let object = ContentObject::new(
            id,
            ContentKind::LabeledButton {
                label: label.to_string(),
                style,
            },
            Placement::at(position.x, position.y, position.z),
        )
        .with_size(1.4 * scale, 0.35 * scale)
        .with_action(action);
        self.insert(object, collection)
    }

    /// A plane showing `source`. A source that cannot be opened leaves an
    /// unavailable resource behind the surface.
    pub fn create_video_surface(
        &mut self,
        position: Vec3,
        size: Vec2,
        source: MediaSource,
        backend: &dyn MediaBackend,
    ) -> ContentId {
        let n = self.videos.len();
        let id = ContentId::new(format!("video:{}", n));
        let media_id = MediaId::new(format!("video-{}:{}", n, source.path));
        let resource = MediaResource::load_or_unavailable(media_id.clone(), source, backend);
        let object = ContentObject::new(
            id.clone(),
            ContentKind::VideoSurface { media: media_id },
            Placement::at(position.x, position.y, position.z),
        )
        .with_size(size.x, size.y);
        let id = self.insert(object, Collection::VideoSurfaces);
        self.videos.push((id.clone(), resource));
        id
    }

    /// Composite case-study card: a 0.6 x 0.4 image above a 0.6 x 0.4 text
    /// region.
    pub fn create_info_card(
        &mut self,
        title: &str,
        category: &str,
        body: &str,
        image: &str,
        position: Vec3,
    ) -> ContentId {
        let id = ContentId::new(format!("card:{}", slug(title)));
        let region = |y: f32| CardRegion {
            offset: Vec3::new(0.0, y, 0.0),
            size: Vec2::new(0.6, 0.4),
        };
        let object = ContentObject::new(
            id,
            ContentKind::InfoCard {
                title: title.to_string(),
                category: category.to_string(),
                body: body.to_string(),
                image: image.to_string(),
                image_region: region(0.2),
                text_region: region(-0.2),
            },
            Placement::at(position.x, position.y, position.z),
        );
        self.insert(object, Collection::CaseStudyCards)
    }

    pub fn anchor(&self) -> &AnchorFrame {
        &self.anchor
    }

    pub fn anchor_mut(&mut self) -> &mut AnchorFrame {
        &mut self.anchor
    }

    pub fn get(&self, id: &ContentId) -> Option<&ContentObject> {
        self.index.get(id).map(|&i| &self.objects[i])
    }

    pub fn get_mut(&mut self, id: &ContentId) -> Option<&mut ContentObject> {
        match self.index.get(id) {
            Some(&i) => Some(&mut self.objects[i]),
            None => None,
        }
    }

    /// All objects in creation order.
    pub fn objects(&self) -> &[ContentObject] {
        &self.objects
    }

    pub fn collection(&self, collection: Collection) -> &[ContentId] {
        self.collections
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn avatar(&self) -> Option<&ContentId> {
        self.collection(Collection::Avatar).first()
    }

    pub fn menu_buttons(&self) -> &[ContentId] {
        self.collection(Collection::MenuButtons)
    }

    pub fn case_study_buttons(&self) -> &[ContentId] {
        self.collection(Collection::CaseStudyButtons)
    }

    pub fn case_study_cards(&self) -> &[ContentId] {
        self.collection(Collection::CaseStudyCards)
    }

    pub fn video_surfaces(&self) -> &[ContentId] {
        self.collection(Collection::VideoSurfaces)
    }

    pub fn is_visible(&self, id: &ContentId) -> bool {
        self.get(id).map(|o| o.visible).unwrap_or(false)
    }

    pub fn set_visible(&mut self, id: &ContentId, visible: bool) {
        if let Some(object) = self.get_mut(id) {
            object.visible = visible;
        }
    }

    /// Move an object within the anchor frame.
    pub fn set_position(&mut self, id: &ContentId, position: Vec3) {
        if let Some(object) = self.get_mut(id) {
            object.placement.position = position;
        }
    }

    pub fn visible_ids(&self) -> Vec<ContentId> {
        self.objects
            .iter()
            .filter(|o| o.visible)
            .map(|o| o.id.clone())
            .collect()
    }

    pub fn world_matrix(&self, id: &ContentId) -> Option<Mat4> {
        self.get(id).map(|o| self.anchor.world_of(&o.placement))
    }

    pub fn video_count(&self) -> usize {
        self.videos.len()
    }

    pub fn video(&self, index: usize) -> Option<&MediaResource> {
        self.videos.get(index).map(|(_, r)| r)
    }

    pub fn video_mut(&mut self, index: usize) -> Option<&mut MediaResource> {
        self.videos.get_mut(index).map(|(_, r)| r)
    }

    pub fn videos(&self) -> impl Iterator<Item = &MediaResource> {
        self.videos.iter().map(|(_, r)| r)
    }

    pub fn videos_mut(&mut self) -> impl Iterator<Item = &mut MediaResource> {
        self.videos.iter_mut().map(|(_, r)| r)
    }

    /// Index of the video resource shown on `surface`.
    pub fn video_index_of(&self, surface: &ContentId) -> Option<usize> {
        self.videos.iter().position(|(id, _)| id == surface)
    }

    pub fn tick_media(&mut self, delta: Duration) {
        for (_, resource) in &mut self.videos {
            resource.tick(delta);
        }
    }
}

fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
