//! Quaternion to Euler conversion
//!
//! Only one rotation order is supported: intrinsic XYZ (rotate about X, then
//! Y, then Z, i.e. `R = Rz * Ry * Rx`). Angles come out in degrees.

use glam::{DMat3, DQuat};
use serde::{Deserialize, Serialize};

use crate::curve::ComponentKind;
use crate::error::{Diagnostic, RetargetError};

/// Quaternions with a norm below this cannot be normalized
pub const NORM_EPSILON: f64 = 1e-8;

/// `sqrt(R00² + R10²)` below this is treated as gimbal lock
pub const GIMBAL_EPSILON: f64 = 1e-6;

/// Euler angles in degrees, XYZ order
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EulerDegrees {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EulerDegrees {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Quaternion norm was too small (or not finite)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegenerateQuaternion {
    pub norm: f64,
}

/// Convert a quaternion `[x, y, z, w]` to XYZ Euler degrees
///
/// The quaternion is normalized first. `q` and `-q` produce the same matrix,
/// so double cover needs no special handling.
pub fn quat_to_euler_xyz(rotation: [f32; 4]) -> Result<EulerDegrees, DegenerateQuaternion> {
    let [x, y, z, w] = rotation.map(f64::from);
    let norm = (x * x + y * y + z * z + w * w).sqrt();
    if !norm.is_finite() || norm < NORM_EPSILON {
        return Err(DegenerateQuaternion { norm });
    }

    let q = DQuat::from_xyzw(x / norm, y / norm, z / norm, w / norm);
    Ok(euler_from_matrix(&DMat3::from_quat(q)))
}

/// Extract XYZ Euler degrees from a rotation matrix
///
/// glam matrices are column-major: `R[row][col]` is `col(col)[row]`.
fn euler_from_matrix(m: &DMat3) -> EulerDegrees {
    let r00 = m.x_axis.x;
    let r10 = m.x_axis.y;
    let r20 = m.x_axis.z;
    let r11 = m.y_axis.y;
    let r21 = m.y_axis.z;
    let r12 = m.z_axis.y;
    let r22 = m.z_axis.z;

    let sy = (r00 * r00 + r10 * r10).sqrt();

    let (x, y, z) = if sy >= GIMBAL_EPSILON {
        (r21.atan2(r22), (-r20).atan2(sy), r10.atan2(r00))
    } else {
        // Gimbal lock: X and Z rotate about the same axis, fold it all into X
        ((-r12).atan2(r11), (-r20).atan2(sy), 0.0)
    };

    EulerDegrees {
        x: x.to_degrees(),
        y: y.to_degrees(),
        z: z.to_degrees(),
    }
}

/// What to do with a quaternion that cannot be normalized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Use the identity rotation and report a diagnostic
    #[default]
    SubstituteIdentity,
    /// Fail the run
    Abort,
}

/// Per-sample rotation conversion with degenerate-input handling
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationConverter {
    policy: DegeneratePolicy,
}

impl RotationConverter {
    pub fn new(policy: DegeneratePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DegeneratePolicy {
        self.policy
    }

    /// Convert one sample's rotation, attributing failures to `bone` and `frame`
    ///
    /// Returns the angles plus a diagnostic when the identity was substituted.
    pub fn convert(
        &self,
        bone: &str,
        frame: usize,
        rotation: [f32; 4],
    ) -> Result<(EulerDegrees, Option<Diagnostic>), RetargetError> {
        match quat_to_euler_xyz(rotation) {
            Ok(euler) => Ok((euler, None)),
            Err(DegenerateQuaternion { norm }) => match self.policy {
                DegeneratePolicy::Abort => Err(RetargetError::DegenerateRotation {
                    bone: bone.to_string(),
                    frame,
                    component: ComponentKind::Rotate,
                    norm,
                }),
                DegeneratePolicy::SubstituteIdentity => {
                    tracing::warn!(
                        "Bone '{}' frame {}: degenerate rotation (norm {:e}), using identity",
                        bone,
                        frame,
                        norm
                    );
                    Ok((
                        EulerDegrees::ZERO,
                        Some(Diagnostic::DegenerateRotationSubstituted {
                            bone: bone.to_string(),
                            frame,
                            component: ComponentKind::Rotate,
                            norm,
                        }),
                    ))
                }
            },
        }
    }
}
