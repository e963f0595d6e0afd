use glam::Mat4;

use arstage_core::Placement;

use crate::object::ContentId;

/// Coordinate frame of the recognized image target. Everything attached to
/// it moves rigidly with the physical target.
#[derive(Debug, Clone)]
pub struct AnchorFrame {
    /// Index of the image target inside the tracking descriptor.
    target_index: usize,
    pose: Mat4,
    children: Vec<ContentId>,
}

impl AnchorFrame {
    pub fn new(target_index: usize) -> Self {
        Self {
            target_index,
            pose: Mat4::IDENTITY,
            children: Vec::new(),
        }
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn pose(&self) -> Mat4 {
        self.pose
    }

    /// Latest anchor-to-world transform reported by the tracker.
    pub fn set_pose(&mut self, pose: Mat4) {
        self.pose = pose;
    }

    pub fn attach(&mut self, id: ContentId) {
        if !self.children.contains(&id) {
            self.children.push(id);
        }
    }

    pub fn is_attached(&self, id: &ContentId) -> bool {
        self.children.contains(id)
    }

    pub fn children(&self) -> &[ContentId] {
        &self.children
    }

    /// World matrix of a child placed at `local`.
    pub fn world_of(&self, local: &Placement) -> Mat4 {
        self.pose * local.to_mat4()
    }
}
