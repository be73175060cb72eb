use nalgebra::DMatrix;

use crate::dynamics::state::{row_width, SampleRow, StateSnapshot};
use crate::error::{Result, SimError};

fn check_width(dim_u: usize, row: &SampleRow) -> Result<()> {
    let expected = row_width(dim_u);
    if row.width() != expected || row.u_control.len() != row.u_actual.len() {
        return Err(SimError::ShapeMismatch {
            what: "sample row width",
            expected,
            found: row.width(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Segment: output of one simulation run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Segment {
    dim_u: usize,
    times: Vec<f64>,
    rows: Vec<SampleRow>,
}

impl Segment {
    pub fn with_capacity(dim_u: usize, capacity: usize) -> Self {
        Self {
            dim_u,
            times: Vec::with_capacity(capacity),
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, time: f64, row: SampleRow) -> Result<()> {
        check_width(self.dim_u, &row)?;
        self.times.push(time);
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }
}

// ---------------------------------------------------------------------------
// Trajectory: append-only concatenation of segments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Trajectory {
    dim_u: usize,
    times: Vec<f64>,
    rows: Vec<SampleRow>,
    /// Index of the first row of each appended segment.
    segment_starts: Vec<usize>,
}

impl Trajectory {
    pub fn new(dim_u: usize) -> Self {
        Self {
            dim_u,
            times: Vec::new(),
            rows: Vec::new(),
            segment_starts: Vec::new(),
        }
    }

    pub fn from_segment(segment: Segment) -> Result<Self> {
        let mut traj = Self::new(segment.dim_u);
        traj.append(segment)?;
        Ok(traj)
    }

    /// Append a segment below the existing rows. Boundary samples with equal
    /// timestamps are kept as-is.
    pub fn append(&mut self, segment: Segment) -> Result<()> {
        if segment.dim_u != self.dim_u {
            return Err(SimError::ShapeMismatch {
                what: "segment actuator count",
                expected: self.dim_u,
                found: segment.dim_u,
            });
        }
        let mut previous = self.last_time();
        for &t in &segment.times {
            if let Some(p) = previous {
                if t < p {
                    return Err(SimError::NonMonotonicTime { previous: p, next: t });
                }
            }
            previous = Some(t);
        }
        if segment.is_empty() {
            return Ok(());
        }
        self.segment_starts.push(self.rows.len());
        self.times.extend(segment.times);
        self.rows.extend(segment.rows);
        Ok(())
    }

    /// Push a single recorded sample, e.g. when reading a stored trajectory.
    pub fn push_sample(&mut self, time: f64, row: SampleRow) -> Result<()> {
        check_width(self.dim_u, &row)?;
        if let Some(p) = self.last_time() {
            if time < p {
                return Err(SimError::NonMonotonicTime { previous: p, next: time });
            }
        }
        if self.rows.is_empty() {
            self.segment_starts.push(0);
        }
        self.times.push(time);
        self.rows.push(row);
        Ok(())
    }

    pub fn dim_u(&self) -> usize {
        self.dim_u
    }

    pub fn width(&self) -> usize {
        row_width(self.dim_u)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.segment_starts.len()
    }

    pub fn segment_starts(&self) -> &[usize] {
        &self.segment_starts
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &SampleRow)> + '_ {
        self.times.iter().copied().zip(self.rows.iter())
    }

    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Pose, velocity and actual actuation of the last recorded row.
    pub fn last_snapshot(&self) -> Option<StateSnapshot> {
        self.rows.last().map(SampleRow::snapshot)
    }

    /// Row matrix, one row per sample, `2·DOF + 2·dimU` columns.
    pub fn matrix(&self) -> DMatrix<f64> {
        let width = self.width();
        let data: Vec<f64> = self.rows.iter().flat_map(|r| r.to_vec()).collect();
        DMatrix::from_row_slice(self.rows.len(), width, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::{Pose, Velocity};
    use nalgebra::DVector;

    fn sample(x: f64) -> SampleRow {
        SampleRow {
            eta: Pose::new(x, 0.0, 0.0, 0.0, 0.0, 0.0),
            nu: Velocity::zeros(),
            u_control: DVector::zeros(2),
            u_actual: DVector::from_element(2, x),
        }
    }

    fn segment(times: &[f64]) -> Segment {
        let mut s = Segment::with_capacity(2, times.len());
        for &t in times {
            s.push(t, sample(t)).unwrap();
        }
        s
    }

    #[test]
    fn append_concatenates_in_order() {
        let mut traj = Trajectory::from_segment(segment(&[0.0, 1.0, 2.0])).unwrap();
        traj.append(segment(&[2.0, 3.0])).unwrap();
        assert_eq!(traj.times(), &[0.0, 1.0, 2.0, 2.0, 3.0]);
        assert_eq!(traj.segment_starts(), &[0, 3]);
        assert_eq!(traj.rows()[3].eta[0], 2.0);
    }

    #[test]
    fn append_rejects_time_going_backwards() {
        let mut traj = Trajectory::from_segment(segment(&[0.0, 1.0])).unwrap();
        let err = traj.append(segment(&[0.5, 1.5])).unwrap_err();
        assert!(matches!(err, SimError::NonMonotonicTime { .. }));
        assert_eq!(traj.len(), 2, "failed append must not modify the trajectory");
    }

    #[test]
    fn append_rejects_other_actuator_count() {
        let mut traj = Trajectory::new(3);
        let err = traj.append(segment(&[0.0])).unwrap_err();
        assert!(matches!(err, SimError::ShapeMismatch { expected: 3, found: 2, .. }));
    }

    #[test]
    fn segment_push_rejects_wrong_width() {
        let mut s = Segment::with_capacity(3, 1);
        assert!(s.push(0.0, sample(0.0)).is_err());
        assert!(s.is_empty());
    }

    #[test]
    fn matrix_has_one_row_per_sample() {
        let traj = Trajectory::from_segment(segment(&[0.0, 1.0, 2.0])).unwrap();
        let m = traj.matrix();
        assert_eq!(m.shape(), (3, 16));
        assert_eq!(m[(2, 0)], 2.0);
        assert_eq!(m[(2, 15)], 2.0);
    }

    #[test]
    fn last_snapshot_reads_final_row() {
        let traj = Trajectory::from_segment(segment(&[0.0, 4.0])).unwrap();
        let snap = traj.last_snapshot().unwrap();
        assert_eq!(snap.eta[0], 4.0);
        assert_eq!(snap.u_actual, DVector::from_element(2, 4.0));
        assert!(Trajectory::new(2).last_snapshot().is_none());
    }
}
