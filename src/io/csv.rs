use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::dynamics::state::{SampleRow, DOF};
use crate::error::{Result, SimError};
use crate::sim::Trajectory;

/// Time, pose and velocity columns, in order. Actuator columns follow:
/// `<name>_demand` for each channel, then `<name>_actual` for each channel.
pub const STATE_COLUMNS: [&str; 1 + 2 * DOF] = [
    "time_s",
    "x_m", "y_m", "z_m",
    "roll_rad", "pitch_rad", "yaw_rad",
    "surge_ms", "sway_ms", "heave_ms",
    "roll_rate_rads", "pitch_rate_rads", "yaw_rate_rads",
];

/// Full header for the given actuator names.
pub fn header(actuators: &[String]) -> Vec<String> {
    STATE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(actuators.iter().map(|a| format!("{a}_demand")))
        .chain(actuators.iter().map(|a| format!("{a}_actual")))
        .collect()
}

/// Write the trajectory as CSV. Values use the shortest representation that
/// parses back to the same `f64`.
pub fn write_trajectory<W: Write>(
    writer: &mut W,
    trajectory: &Trajectory,
    actuators: &[String],
) -> Result<()> {
    if actuators.len() != trajectory.dim_u() {
        return Err(SimError::ShapeMismatch {
            what: "actuator names",
            expected: trajectory.dim_u(),
            found: actuators.len(),
        });
    }

    writeln!(writer, "{}", header(actuators).join(","))?;
    for (t, row) in trajectory.iter() {
        write!(writer, "{t}")?;
        for v in row.to_vec() {
            write!(writer, ",{v}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn write_trajectory_file(
    path: impl AsRef<Path>,
    trajectory: &Trajectory,
    actuators: &[String],
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_trajectory(&mut writer, trajectory, actuators)?;
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Reading back
// ---------------------------------------------------------------------------

/// Actuator count implied by a header of `columns` columns.
pub fn dim_u_for_columns(columns: usize) -> Result<usize> {
    let state = STATE_COLUMNS.len();
    if columns < state || (columns - state) % 2 != 0 {
        return Err(SimError::ShapeMismatch {
            what: "trajectory table columns",
            expected: state,
            found: columns,
        });
    }
    Ok((columns - state) / 2)
}

pub fn read_trajectory<R: BufRead>(reader: R) -> Result<Trajectory> {
    let mut lines = reader.lines().enumerate();
    let columns = match lines.next() {
        Some((_, line)) => line?.split(',').count(),
        None => return Err(SimError::data(1, "empty trajectory table")),
    };
    let dim_u = dim_u_for_columns(columns)?;
    let mut trajectory = Trajectory::new(dim_u);

    for (idx, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let values = line
            .split(',')
            .map(|c| {
                c.trim()
                    .parse::<f64>()
                    .map_err(|_| SimError::data(idx + 1, format!("cannot parse `{}`", c.trim())))
            })
            .collect::<Result<Vec<f64>>>()?;
        if values.len() != columns {
            return Err(SimError::data(
                idx + 1,
                format!("expected {columns} values, found {}", values.len()),
            ));
        }
        let row = SampleRow::from_slice(&values[1..], dim_u)?;
        trajectory.push_sample(values[0], row)?;
    }
    Ok(trajectory)
}

pub fn read_trajectory_file(path: impl AsRef<Path>) -> Result<Trajectory> {
    let file = File::open(path)?;
    read_trajectory(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::{Pose, Velocity};
    use crate::sim::Segment;
    use nalgebra::DVector;

    fn names() -> Vec<String> {
        vec!["rudder".into(), "stern_plane".into(), "rpm".into()]
    }

    fn trajectory() -> Trajectory {
        let mut seg = Segment::with_capacity(3, 2);
        seg.push(
            0.0,
            SampleRow {
                eta: Pose::zeros(),
                nu: Velocity::zeros(),
                u_control: DVector::from_vec(vec![0.1, -0.2, 1200.0]),
                u_actual: DVector::zeros(3),
            },
        )
        .unwrap();
        seg.push(
            0.1,
            SampleRow {
                eta: Pose::new(0.123456789012, 1.0 / 3.0, 2.5, 0.0, -0.01, 1.0e-17),
                nu: Velocity::new(1.1, 0.0, 0.0, 0.0, 0.0, 0.02),
                u_control: DVector::from_vec(vec![0.1, -0.2, 1200.0]),
                u_actual: DVector::from_vec(vec![0.01, -0.02, 120.0]),
            },
        )
        .unwrap();
        Trajectory::from_segment(seg).unwrap()
    }

    #[test]
    fn csv_output_has_header_and_rows() {
        let mut buf = Vec::new();
        write_trajectory(&mut buf, &trajectory(), &names()).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("time_s,x_m,"));
        assert!(lines[0].ends_with("rudder_actual,stern_plane_actual,rpm_actual"));
        assert_eq!(lines[0].split(',').count(), 19);
        assert!(lines.iter().all(|l| l.split(',').count() == 19));
    }

    #[test]
    fn stored_values_read_back_exactly() {
        let original = trajectory();
        let mut buf = Vec::new();
        write_trajectory(&mut buf, &original, &names()).unwrap();

        let loaded = read_trajectory(buf.as_slice()).unwrap();
        assert_eq!(loaded.dim_u(), 3);
        assert_eq!(loaded.times(), original.times());
        assert_eq!(loaded.rows(), original.rows());
    }

    #[test]
    fn wrong_name_count_is_rejected() {
        let mut buf = Vec::new();
        let err = write_trajectory(&mut buf, &trajectory(), &names()[..2]).unwrap_err();
        assert!(matches!(err, SimError::ShapeMismatch { .. }));
    }

    #[test]
    fn odd_column_count_is_rejected() {
        assert_eq!(dim_u_for_columns(19).unwrap(), 3);
        assert!(dim_u_for_columns(18).is_err());
        assert!(dim_u_for_columns(5).is_err());
    }

    #[test]
    fn ragged_row_reports_line() {
        let text = format!("{}\n0,1,2\n", header(&names()).join(","));
        let err = read_trajectory(text.as_bytes()).unwrap_err();
        assert!(matches!(err, SimError::DataFormat { line: 2, .. }));
    }
}
