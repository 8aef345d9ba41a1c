//! Skeleton loader (ssbh_data skeleton JSON -> Skeleton)
//!
//! Reads the `bones` array written by ssbh_data for `.nusktb` files. Only the
//! bone name, parent index and bind transform are used; other fields are ignored.

use anyhow::{Context, Result};
use nethercore_retarget::{AnimationSample, Bone, ParentRef, Skeleton, SkeletonIndex};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SkelJson {
    bones: Vec<BoneJson>,
}

#[derive(Debug, Deserialize)]
struct BoneJson {
    name: String,
    #[serde(default)]
    parent_index: Option<usize>,
    /// 4x4 bind matrix, one inner array per column (translation in the last)
    #[serde(default)]
    transform: Option<[[f32; 4]; 4]>,
}

impl From<BoneJson> for Bone {
    fn from(bone: BoneJson) -> Self {
        let rest = bone.transform.map(|columns| {
            let matrix = glam::Mat4::from_cols_array_2d(&columns);
            let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
            AnimationSample::new(translation.to_array(), rotation.to_array(), scale.to_array())
        });

        Bone {
            name: bone.name,
            parent: bone.parent_index.map(ParentRef::Index),
            rest,
        }
    }
}

/// Parse skeleton JSON from a string
pub fn parse_skeleton(json: &str) -> Result<Skeleton> {
    let skel: SkelJson = serde_json::from_str(json).context("Invalid skeleton JSON")?;
    Ok(skel.bones.into_iter().map(Bone::from).collect())
}

/// Load a skeleton JSON file
pub fn load_skeleton(path: &Path) -> Result<Skeleton> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read skeleton: {:?}", path))?;
    let skeleton =
        parse_skeleton(&json).with_context(|| format!("Failed to parse skeleton: {:?}", path))?;

    tracing::debug!("Loaded skeleton {:?}: {} bones", path, skeleton.len());
    Ok(skeleton)
}

/// List bones in hierarchy order
pub fn list_bones(path: &Path) -> Result<()> {
    let skeleton = load_skeleton(path)?;
    let index = SkeletonIndex::build(&skeleton)
        .with_context(|| format!("Invalid bone hierarchy in {:?}", path))?;

    tracing::info!("Bones in {:?} (hierarchy order):", path);
    for (position, bone) in index.iter().enumerate() {
        let parent = index
            .parent_position(position)
            .and_then(|p| index.get(p))
            .map(|p| p.name.as_str())
            .unwrap_or("-");
        let rest = skeleton.bones()[bone.source_index]
            .rest
            .map(|r| r.translation)
            .unwrap_or([0.0; 3]);
        tracing::info!(
            "  [{}] '{}' parent '{}' {:?}, rest translation [{:.3}, {:.3}, {:.3}]",
            position,
            bone.name,
            parent,
            bone.role,
            rest[0],
            rest[1],
            rest[2]
        );
    }

    Ok(())
}
