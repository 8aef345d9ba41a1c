//! nether-anim library
//!
//! Loads ssbh_data skeleton and animation JSON, retargets it with
//! `nethercore-retarget`, and writes Maya ASCII `.anim` curves.

pub mod animation;
pub mod convention;
pub mod convert;
pub mod formats;
pub mod manifest;
pub mod skeleton;

pub use animation::{list_tracks, load_animation, parse_animation};
pub use convention::{convert_root_sample, convert_root_tracks};
pub use convert::{convert, convert_to_memory, ConvertOptions, ConvertSettings};
pub use formats::{time_unit_for_rate, write_maya_anim, MayaAnimHeader};
pub use manifest::{load_manifest, RetargetManifest, DEFAULT_TARGET_RATE};
pub use skeleton::{list_bones, load_skeleton, parse_skeleton};
