use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::mission::Mission;
use crate::sim::Trajectory;

/// Summary statistics computed from a mission trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionSummary {
    pub samples: usize,
    pub segments: usize,
    pub duration: f64,
    pub max_depth: f64,
    pub final_position: [f64; 3],
    /// Path length in the horizontal plane, summed over consecutive samples.
    pub horizontal_distance: f64,
}

impl MissionSummary {
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        let rows = trajectory.rows();

        let max_depth = rows.iter().map(|r| r.eta[2]).fold(0.0_f64, f64::max);

        let horizontal_distance = rows
            .windows(2)
            .map(|w| {
                let dx = w[1].eta[0] - w[0].eta[0];
                let dy = w[1].eta[1] - w[0].eta[1];
                dx.hypot(dy)
            })
            .sum();

        let final_position = rows
            .last()
            .map(|r| [r.eta[0], r.eta[1], r.eta[2]])
            .unwrap_or([0.0; 3]);

        let duration = match (trajectory.times().first(), trajectory.last_time()) {
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        };

        MissionSummary {
            samples: trajectory.len(),
            segments: trajectory.segment_count(),
            duration,
            max_depth,
            final_position,
            horizontal_distance,
        }
    }
}

/// Quote `s` as a JSON string literal.
fn json_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Write mission summary as JSON to a writer.
pub fn write_summary<W: Write>(
    writer: &mut W,
    mission: &Mission,
    summary: &MissionSummary,
) -> Result<()> {
    let [x, y, z] = summary.final_position;
    writeln!(writer, "{{")?;
    writeln!(writer, "  \"mission\": {{")?;
    writeln!(writer, "    \"name\": {},", json_string(&mission.name))?;
    writeln!(writer, "    \"legs\": {}", mission.flown_legs().len())?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"trajectory\": {{")?;
    writeln!(writer, "    \"samples\": {},", summary.samples)?;
    writeln!(writer, "    \"segments\": {},", summary.segments)?;
    writeln!(writer, "    \"duration_s\": {:.2},", summary.duration)?;
    writeln!(writer, "    \"max_depth_m\": {:.2},", summary.max_depth)?;
    writeln!(writer, "    \"final_position_m\": [{x:.2}, {y:.2}, {z:.2}],")?;
    writeln!(writer, "    \"horizontal_distance_m\": {:.2}", summary.horizontal_distance)?;
    writeln!(writer, "  }}")?;
    writeln!(writer, "}}")?;
    Ok(())
}

pub fn write_summary_file(
    path: impl AsRef<Path>,
    mission: &Mission,
    summary: &MissionSummary,
) -> Result<()> {
    let mut file = File::create(path)?;
    write_summary(&mut file, mission, summary)
}
