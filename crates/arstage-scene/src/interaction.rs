//! Pointer routing: a tap is projected through the camera and dispatched
//! to the nearest bound object, but only if that object is visible.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use arstage_core::{Camera, Hit, Ray, Viewport};

use crate::object::ContentId;
use crate::registry::ContentRegistry;

/// Zero-argument actions a button can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    OurContent,
    CaseStudies,
    AboutUs,
    ShowCaseStudies,
    Back,
    OpenWebsite,
    OpenContact,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::OurContent => write!(f, "our-content"),
            Action::CaseStudies => write!(f, "case-studies"),
            Action::AboutUs => write!(f, "about-us"),
            Action::ShowCaseStudies => write!(f, "show-case-studies"),
            Action::Back => write!(f, "back"),
            Action::OpenWebsite => write!(f, "open-website"),
            Action::OpenContact => write!(f, "open-contact"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionBinding {
    pub target: ContentId,
    pub action: Action,
}

/// Object-to-action lookup for everything that can be tapped.
#[derive(Debug, Clone, Default)]
pub struct InteractionRouter {
    bindings: Vec<InteractionBinding>,
    lookup: HashMap<ContentId, usize>,
}

impl InteractionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every registry object that carries an action.
    pub fn from_registry(registry: &ContentRegistry) -> Self {
        let mut router = Self::new();
        for object in registry.objects() {
            if let Some(action) = object.action {
                router.bind(object.id.clone(), action);
            }
        }
        router
    }

    pub fn bind(&mut self, target: ContentId, action: Action) {
        match self.lookup.get(&target) {
            Some(&i) => self.bindings[i].action = action,
            None => {
                self.lookup.insert(target.clone(), self.bindings.len());
                self.bindings.push(InteractionBinding { target, action });
            }
        }
    }

    pub fn binding_for(&self, target: &ContentId) -> Option<&InteractionBinding> {
        self.lookup.get(target).map(|&i| &self.bindings[i])
    }

    pub fn bindings(&self) -> &[InteractionBinding] {
        &self.bindings
    }

    /// First bound object along the ray, visible or not.
    pub fn pick(&self, ray: &Ray, registry: &ContentRegistry) -> Option<Hit<ContentId>> {
        let pose = registry.anchor().pose();
        self.bindings
            .iter()
            .filter_map(|binding| {
                let object = registry.get(&binding.target)?;
                let distance = object.intersect(ray, &pose)?;
                Some(Hit {
                    target: binding.target.clone(),
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Route a tap in normalized device coordinates. Returns the action to
    /// dispatch, or `None` when nothing is hit or the nearest hit is hidden.
    pub fn route(&self, ndc: Vec2, camera: &Camera, registry: &ContentRegistry) -> Option<Action> {
        let ray = camera.ray_from_ndc(ndc);
        let hit = self.pick(&ray, registry)?;
        if !registry.is_visible(&hit.target) {
            tracing::debug!("Ignoring tap on hidden object '{}'", hit.target);
            return None;
        }
        let binding = self.binding_for(&hit.target)?;
        tracing::debug!("Tap on '{}' -> {}", hit.target, binding.action);
        Some(binding.action)
    }

    /// Route a tap given in screen pixels.
    pub fn route_pointer_event(
        &self,
        screen_x: f32,
        screen_y: f32,
        viewport: &Viewport,
        camera: &Camera,
        registry: &ContentRegistry,
    ) -> Option<Action> {
        self.route(viewport.to_ndc(screen_x, screen_y), camera, registry)
    }
}
