use nalgebra::{Matrix3, Vector3};

use crate::dynamics::state::{Pose, Velocity};

// ---------------------------------------------------------------------------
// Kinematic transformations (zyx Euler convention)
// ---------------------------------------------------------------------------

/// Rotation matrix from body to world frame, R = Rz(ψ) Ry(θ) Rx(φ).
pub fn rzyx(phi: f64, theta: f64, psi: f64) -> Matrix3<f64> {
    let (sphi, cphi) = phi.sin_cos();
    let (sth, cth) = theta.sin_cos();
    let (spsi, cpsi) = psi.sin_cos();

    Matrix3::new(
        cpsi * cth, -spsi * cphi + cpsi * sth * sphi, spsi * sphi + cpsi * cphi * sth,
        spsi * cth, cpsi * cphi + sphi * sth * spsi, -cpsi * sphi + sth * spsi * cphi,
        -sth, cth * sphi, cth * cphi,
    )
}

/// Body angular rates [p, q, r] to Euler angle rates [φ̇, θ̇, ψ̇].
///
/// Singular at θ = ±90°; the division is left to produce inf/NaN.
pub fn tzyx(phi: f64, theta: f64) -> Matrix3<f64> {
    let (sphi, cphi) = phi.sin_cos();
    let (sth, cth) = theta.sin_cos();

    Matrix3::new(
        1.0, sphi * sth / cth, cphi * sth / cth,
        0.0, cphi, -sphi,
        0.0, sphi / cth, cphi / cth,
    )
}

/// World-frame pose rate η̇ for body velocity ν at pose η.
pub fn pose_rate(eta: &Pose, nu: &Velocity) -> Pose {
    let (phi, theta, psi) = (eta[3], eta[4], eta[5]);
    let linear: Vector3<f64> = rzyx(phi, theta, psi) * nu.fixed_rows::<3>(0);
    let angular: Vector3<f64> = tzyx(phi, theta) * nu.fixed_rows::<3>(3);

    Pose::new(linear.x, linear.y, linear.z, angular.x, angular.y, angular.z)
}

// ---------------------------------------------------------------------------
// Forward Euler attitude step
// ---------------------------------------------------------------------------

/// Advance the pose over one sample interval: η' = η + dt · η̇(η, ν).
pub fn attitude_euler(eta: &Pose, nu: &Velocity, dt: f64) -> Pose {
    eta + pose_rate(eta, nu) * dt
}
