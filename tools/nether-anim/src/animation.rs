//! Animation loader (ssbh_data animation JSON -> AnimationSet)
//!
//! Reads the `groups` written by ssbh_data for `.nuanmb` files. Only
//! Transform groups are used; Visibility and Material groups are skipped.
//! Each node's `Transform` track becomes one bone track, one sample per frame.

use anyhow::{Context, Result};
use nethercore_retarget::{AnimationSample, AnimationSet, BoneTrack};
use serde::Deserialize;
use std::path::Path;

const TRANSFORM_GROUP: &str = "Transform";
const TRANSFORM_TRACK: &str = "Transform";

#[derive(Debug, Deserialize)]
struct AnimJson {
    #[serde(default)]
    final_frame_index: Option<f32>,
    groups: Vec<GroupJson>,
}

#[derive(Debug, Deserialize)]
struct GroupJson {
    group_type: String,
    nodes: Vec<NodeJson>,
}

#[derive(Debug, Deserialize)]
struct NodeJson {
    name: String,
    tracks: Vec<TrackJson>,
}

#[derive(Debug, Deserialize)]
struct TrackJson {
    name: String,
    values: TrackValuesJson,
}

/// Track values keyed by value type; only transforms are kept
#[derive(Debug, Default, Deserialize)]
struct TrackValuesJson {
    #[serde(rename = "Transform", default)]
    transform: Option<Vec<TransformJson>>,
}

#[derive(Debug, Deserialize)]
struct TransformJson {
    translation: Vector3Json,
    rotation: Vector4Json,
    scale: Vector3Json,
}

#[derive(Debug, Deserialize)]
struct Vector3Json {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Deserialize)]
struct Vector4Json {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

impl From<&TransformJson> for AnimationSample {
    fn from(t: &TransformJson) -> Self {
        AnimationSample::new(
            [t.translation.x, t.translation.y, t.translation.z],
            [t.rotation.x, t.rotation.y, t.rotation.z, t.rotation.w],
            [t.scale.x, t.scale.y, t.scale.z],
        )
    }
}

/// Parse animation JSON sampled at `source_rate` frames per second
pub fn parse_animation(json: &str, source_rate: f64) -> Result<AnimationSet> {
    let anim: AnimJson = serde_json::from_str(json).context("Invalid animation JSON")?;

    let mut set = AnimationSet::new(source_rate);
    if let Some(final_frame) = anim.final_frame_index {
        set.set_frame_count(final_frame.max(0.0) as usize + 1);
    }

    for group in &anim.groups {
        if group.group_type != TRANSFORM_GROUP {
            tracing::debug!(
                "Skipping {} group ({} nodes)",
                group.group_type,
                group.nodes.len()
            );
            continue;
        }

        for node in &group.nodes {
            let values = node
                .tracks
                .iter()
                .filter(|t| t.name == TRANSFORM_TRACK)
                .find_map(|t| t.values.transform.as_ref().filter(|v| !v.is_empty()));

            let Some(values) = values else {
                tracing::debug!("Node '{}' has no Transform values, skipping", node.name);
                continue;
            };

            let track: BoneTrack = values.iter().map(AnimationSample::from).collect();
            if set.insert(node.name.clone(), track).is_some() {
                tracing::warn!("Node '{}' appears more than once, keeping the last", node.name);
            }
        }
    }

    Ok(set)
}

/// Load an animation JSON file
pub fn load_animation(path: &Path, source_rate: f64) -> Result<AnimationSet> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read animation: {:?}", path))?;
    let set = parse_animation(&json, source_rate)
        .with_context(|| format!("Failed to parse animation: {:?}", path))?;

    tracing::debug!(
        "Loaded animation {:?}: {} tracks, {} frames",
        path,
        set.len(),
        set.frame_count()
    );
    Ok(set)
}

/// List animated bones and their sample counts
pub fn list_tracks(path: &Path, source_rate: f64) -> Result<()> {
    let set = load_animation(path, source_rate)?;
    if set.is_empty() {
        tracing::info!("No transform tracks found in {:?}", path);
        return Ok(());
    }

    tracing::info!(
        "Tracks in {:?}: {} frames at {} fps ({:.2}s)",
        path,
        set.frame_count(),
        source_rate,
        set.frame_count() as f64 / source_rate
    );
    for (name, track) in set.tracks() {
        let kind = if track.is_static() { "static" } else { "animated" };
        tracing::info!("  '{}': {} samples ({})", name, track.len(), kind);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "major_version": 2,
        "minor_version": 0,
        "final_frame_index": 2.0,
        "groups": [
            {
                "group_type": "Visibility",
                "nodes": [
                    { "name": "Eye", "tracks": [
                        { "name": "Visibility", "compensate_scale": false,
                          "values": { "Boolean": [true, false, true] } }
                    ] }
                ]
            },
            {
                "group_type": "Transform",
                "nodes": [
                    { "name": "Hip", "tracks": [
                        { "name": "Transform", "compensate_scale": false,
                          "transform_flags": { "override_translation": false },
                          "values": { "Transform": [
                            { "translation": {"x": 1, "y": 2, "z": 3},
                              "rotation": {"x": 0, "y": 0, "z": 0, "w": 1},
                              "scale": {"x": 1, "y": 1, "z": 1} },
                            { "translation": {"x": 4, "y": 5, "z": 6},
                              "rotation": {"x": 0, "y": 0, "z": 0, "w": 1},
                              "scale": {"x": 1, "y": 1, "z": 1} }
                          ] } }
                    ] },
                    { "name": "Empty", "tracks": [
                        { "name": "Transform", "values": { "Transform": [] } }
                    ] }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_transform_groups_only() {
        let set = parse_animation(SAMPLE, 60.0).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.source_rate(), 60.0);
        assert_eq!(set.frame_count(), 3);

        let hip = set.get("Hip").unwrap();
        assert_eq!(hip.len(), 2);
        assert_eq!(hip.samples()[1].translation, [4.0, 5.0, 6.0]);
        assert_eq!(hip.samples()[1].rotation, [0.0, 0.0, 0.0, 1.0]);
        assert!(set.get("Eye").is_none());
        assert!(set.get("Empty").is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_transform() {
        let json = r#"{ "groups": [ { "group_type": "Transform", "nodes": [
            { "name": "Hip", "tracks": [ { "name": "Transform",
              "values": { "Transform": [ { "translation": {"x": 1} } ] } } ] }
        ] } ] }"#;
        assert!(parse_animation(json, 60.0).is_err());
    }
}
