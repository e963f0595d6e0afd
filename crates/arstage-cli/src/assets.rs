//! Asset loading from disk: binary glTF models and card textures.

use std::path::{Path, PathBuf};

use arstage_core::{ArError, ArResult, Duration};
use arstage_runtime::{AnimationClip, AssetLoader, LoadedModel, TextureInfo};

/// Resolves asset paths relative to a root directory.
#[derive(Debug, Clone)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        let relative = path.trim_start_matches("./");
        if Path::new(relative).is_absolute() {
            PathBuf::from(relative)
        } else {
            self.root.join(relative)
        }
    }
}

impl AssetLoader for FsAssetLoader {
    fn load_model(&self, path: &str) -> ArResult<LoadedModel> {
        let full = self.resolve(path);
        let bytes = std::fs::read(&full)
            .map_err(|e| ArError::asset(format!("cannot read model: {}", e), &full))?;
        let model = gltf::Gltf::from_slice(&bytes)
            .map_err(|e| ArError::asset(format!("invalid glTF model: {}", e), &full))?;
        let clips = animation_clips(&model);
        tracing::debug!("Model {} has {} animation clip(s)", full.display(), clips.len());
        Ok(LoadedModel {
            source: path.to_string(),
            clips,
        })
    }

    fn load_texture(&self, path: &str) -> ArResult<TextureInfo> {
        let full = self.resolve(path);
        let img = image::open(&full)
            .map_err(|e| ArError::asset(format!("cannot decode texture: {}", e), &full))?;
        Ok(TextureInfo {
            path: path.to_string(),
            width: img.width(),
            height: img.height(),
        })
    }
}

/// Clip duration is the largest keyframe time among the clip's samplers.
fn animation_clips(model: &gltf::Gltf) -> Vec<AnimationClip> {
    model
        .animations()
        .map(|anim| {
            let name = anim
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Animation{}", anim.index()));
            let secs = anim
                .samplers()
                .filter_map(|sampler| sampler.input().max())
                .filter_map(|max| max.get(0).and_then(|v| v.as_f64()))
                .fold(0.0_f64, f64::max);
            AnimationClip::new(name, Duration::from_seconds(secs))
        })
        .collect()
}

/// Wrap a glTF JSON document in a binary container with no BIN chunk.
#[cfg(test)]
pub(crate) fn glb_bytes(json: &str) -> Vec<u8> {
    const GLB_MAGIC: u32 = 0x4654_6C67;
    const CHUNK_JSON: u32 = 0x4E4F_534A;
    let mut chunk = json.as_bytes().to_vec();
    while chunk.len() % 4 != 0 {
        chunk.push(b' ');
    }
    let total = 12 + 8 + chunk.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&chunk);
    out
}
