//! Source-to-target axis convention remapping
//!
//! Root bones are expected to arrive already converted (the full convention
//! change is applied to them by matrix composition upstream), so they pass
//! through untouched. Every other bone gets a fixed axis permutation:
//!
//! | component   | target x | target y | target z |
//! |-------------|----------|----------|----------|
//! | translation | x        | z        | -y       |
//! | scale       | x        | z        | y        |
//! | Euler angle | x        | z        | -y       |
//!
//! Relabeling Euler channels is exact only for reflection-free permutations in
//! multiples of 90 degrees. It is not a conjugation of the rotation matrix.

use crate::rotation::EulerDegrees;
use crate::skeleton::BoneRole;
use crate::track::AnimationSample;

/// Remap policy for one bone, chosen once from its [`BoneRole`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateRemapper {
    /// Values unchanged
    PassThrough,
    /// Swap Y and Z, negating the new Z for signed quantities
    SwapYZ,
}

/// One sample with every channel in the target convention
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemappedSample {
    pub translate: [f64; 3],
    /// Euler XYZ degrees
    pub rotate: [f64; 3],
    pub scale: [f64; 3],
}

impl CoordinateRemapper {
    pub fn for_role(role: BoneRole) -> Self {
        match role {
            BoneRole::Root => Self::PassThrough,
            BoneRole::Child => Self::SwapYZ,
        }
    }

    pub fn translation(self, [x, y, z]: [f64; 3]) -> [f64; 3] {
        match self {
            Self::PassThrough => [x, y, z],
            Self::SwapYZ => [x, z, -y],
        }
    }

    /// Scale is a magnitude, so the permutation never flips its sign
    pub fn scale(self, [x, y, z]: [f64; 3]) -> [f64; 3] {
        match self {
            Self::PassThrough => [x, y, z],
            Self::SwapYZ => [x, z, y],
        }
    }

    pub fn euler(self, euler: EulerDegrees) -> EulerDegrees {
        let [x, y, z] = self.translation(euler.to_array());
        EulerDegrees { x, y, z }
    }

    /// Remap a whole sample whose rotation was already converted to `euler`
    pub fn sample(self, sample: &AnimationSample, euler: EulerDegrees) -> RemappedSample {
        RemappedSample {
            translate: self.translation(sample.translation.map(f64::from)),
            rotate: self.euler(euler).to_array(),
            scale: self.scale(sample.scale.map(f64::from)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_selects_policy() {
        assert_eq!(CoordinateRemapper::for_role(BoneRole::Root), CoordinateRemapper::PassThrough);
        assert_eq!(CoordinateRemapper::for_role(BoneRole::Child), CoordinateRemapper::SwapYZ);
    }

    #[test]
    fn test_child_translation() {
        let remapped = CoordinateRemapper::SwapYZ.translation([1.0, 2.0, 3.0]);
        assert_eq!(remapped, [1.0, 3.0, -2.0]);
    }

    #[test]
    fn test_child_scale_never_signed() {
        let remapped = CoordinateRemapper::SwapYZ.scale([1.0, 2.0, 3.0]);
        assert_eq!(remapped, [1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_child_euler_relabel() {
        let remapped = CoordinateRemapper::SwapYZ.euler(EulerDegrees::new(10.0, 20.0, 30.0));
        assert_eq!(remapped, EulerDegrees::new(10.0, 30.0, -20.0));
    }

    #[test]
    fn test_root_passes_through() {
        let remapper = CoordinateRemapper::PassThrough;
        assert_eq!(remapper.translation([1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
        assert_eq!(remapper.scale([1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
        assert_eq!(
            remapper.euler(EulerDegrees::new(10.0, 20.0, 30.0)),
            EulerDegrees::new(10.0, 20.0, 30.0)
        );
    }

    #[test]
    fn test_root_and_child_differ_on_same_sample() {
        let sample = AnimationSample::new([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0], [1.0, 2.0, 3.0]);
        let euler = EulerDegrees::new(10.0, 20.0, 30.0);

        let root = CoordinateRemapper::PassThrough.sample(&sample, euler);
        let child = CoordinateRemapper::SwapYZ.sample(&sample, euler);

        assert_ne!(root.translate, child.translate);
        assert_ne!(root.rotate, child.rotate);
        assert_ne!(root.scale, child.scale);
    }
}
