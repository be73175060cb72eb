use nalgebra::{DVector, Vector6};

use crate::error::{Result, SimError};

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

/// Degrees of freedom: surge/sway/heave + roll/pitch/yaw.
pub const DOF: usize = 6;

/// Width of a sample row for a vehicle with `dim_u` actuators.
pub const fn row_width(dim_u: usize) -> usize {
    2 * DOF + 2 * dim_u
}

/// World-frame pose η = [x, y, z, φ, θ, ψ]. Angles in radians.
pub type Pose = Vector6<f64>;

/// Body-frame velocity ν = [u, v, w, p, q, r].
pub type Velocity = Vector6<f64>;

// ---------------------------------------------------------------------------
// State snapshot carried across leg boundaries
// ---------------------------------------------------------------------------

/// Dynamic state handed from the end of one segment to the start of the next.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub eta: Pose,
    pub nu: Velocity,
    pub u_actual: DVector<f64>,
}

// ---------------------------------------------------------------------------
// Sample row: [η(6), ν(6), u_control(dimU), u_actual(dimU)]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub eta: Pose,
    pub nu: Velocity,
    pub u_control: DVector<f64>,
    pub u_actual: DVector<f64>,
}

impl SampleRow {
    pub fn dim_u(&self) -> usize {
        self.u_actual.len()
    }

    pub fn width(&self) -> usize {
        DOF + DOF + self.u_control.len() + self.u_actual.len()
    }

    /// Flatten into the fixed column order.
    pub fn to_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.width());
        out.extend(self.eta.iter());
        out.extend(self.nu.iter());
        out.extend(self.u_control.iter());
        out.extend(self.u_actual.iter());
        out
    }

    /// Rebuild a row from its flattened columns.
    pub fn from_slice(values: &[f64], dim_u: usize) -> Result<Self> {
        let expected = row_width(dim_u);
        if values.len() != expected {
            return Err(SimError::ShapeMismatch {
                what: "sample row width",
                expected,
                found: values.len(),
            });
        }
        let (pose, rest) = values.split_at(DOF);
        let (vel, rest) = rest.split_at(DOF);
        let (control, actual) = rest.split_at(dim_u);
        Ok(SampleRow {
            eta: Pose::from_column_slice(pose),
            nu: Velocity::from_column_slice(vel),
            u_control: DVector::from_column_slice(control),
            u_actual: DVector::from_column_slice(actual),
        })
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            eta: self.eta,
            nu: self.nu,
            u_actual: self.u_actual.clone(),
        }
    }
}
