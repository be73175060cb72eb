use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, SimError};
use crate::mission::{Leg, Mission};
use crate::vehicle::Current;

// ---------------------------------------------------------------------------
// Mission table: header row + one row per leg, columns located by name
// ---------------------------------------------------------------------------

const DEPTH: &[&str] = &["depth", "depth_m", "z_d"];
const HEADING: &[&str] = &["heading", "heading_deg", "psi_d"];
const PROPULSION: &[&str] = &["rpm", "propulsion", "n"];
const DURATION: &[&str] = &["duration", "duration_s", "leg_time"];
const CURRENT_SPEED: &[&str] = &["current_speed", "v_c"];
const CURRENT_DIRECTION: &[&str] = &["current_direction", "beta_c"];
const LABEL: &[&str] = &["label", "name", "description"];

struct Columns {
    depth: usize,
    heading: usize,
    propulsion: usize,
    duration: usize,
    current_speed: Option<usize>,
    current_direction: Option<usize>,
    label: Option<usize>,
}

fn find(header: &[String], names: &[&str]) -> Option<usize> {
    header.iter().position(|h| names.contains(&h.as_str()))
}

/// Fixed layout assumed when the header names none of the required columns:
/// depth, heading, rpm, current speed, current direction, then duration in
/// the ninth column.
const POSITIONAL: Columns = Columns {
    depth: 0,
    heading: 1,
    propulsion: 2,
    duration: 8,
    current_speed: Some(3),
    current_direction: Some(4),
    label: None,
};

fn require(header: &[String], names: &[&str]) -> Result<usize> {
    find(header, names).ok_or_else(|| SimError::MissingColumn(names[0].to_string()))
}

impl Columns {
    fn from_header(line: &str) -> Result<Self> {
        let header: Vec<String> = line
            .trim_start_matches('\u{feff}')
            .split(',')
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();
        let named = [DEPTH, HEADING, PROPULSION, DURATION]
            .iter()
            .any(|names| find(&header, names).is_some());
        if !named {
            return Ok(POSITIONAL);
        }
        Ok(Self {
            depth: require(&header, DEPTH)?,
            heading: require(&header, HEADING)?,
            propulsion: require(&header, PROPULSION)?,
            duration: require(&header, DURATION)?,
            current_speed: find(&header, CURRENT_SPEED),
            current_direction: find(&header, CURRENT_DIRECTION),
            label: find(&header, LABEL),
        })
    }
}

fn number(cells: &[&str], idx: usize, column: &str, line: usize) -> Result<f64> {
    let cell = cells
        .get(idx)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| SimError::data(line, format!("missing value for `{column}`")))?;
    let value: f64 = cell
        .parse()
        .map_err(|_| SimError::data(line, format!("`{column}`: cannot parse `{cell}` as a number")))?;
    if !value.is_finite() {
        return Err(SimError::data(line, format!("`{column}` must be finite, got `{cell}`")));
    }
    Ok(value)
}

fn optional_number(cells: &[&str], idx: Option<usize>, column: &str, line: usize) -> Result<f64> {
    match idx {
        Some(i) if cells.get(i).is_some_and(|c| !c.trim().is_empty()) => number(cells, i, column, line),
        _ => Ok(0.0),
    }
}

fn parse_leg(cols: &Columns, text: &str, line: usize) -> Result<Leg> {
    let cells: Vec<&str> = text.split(',').collect();
    let duration = number(&cells, cols.duration, "duration", line)?;
    if duration < 0.0 {
        return Err(SimError::data(line, format!("duration must be non-negative, got {duration}")));
    }
    Ok(Leg {
        depth: number(&cells, cols.depth, "depth", line)?,
        heading: number(&cells, cols.heading, "heading", line)?,
        propulsion: number(&cells, cols.propulsion, "rpm", line)?,
        duration,
        current: Current {
            speed: optional_number(&cells, cols.current_speed, "current_speed", line)?,
            direction: optional_number(&cells, cols.current_direction, "current_direction", line)?,
        },
        label: cols
            .label
            .and_then(|i| cells.get(i))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
    })
}

/// Parse a mission table. The whole table is validated before returning.
pub fn parse_mission<R: BufRead>(name: impl Into<String>, reader: R) -> Result<Mission> {
    let mut lines = reader.lines().enumerate();

    let cols = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break Columns::from_header(&line)?;
                }
            }
            None => return Err(SimError::EmptyMission),
        }
    };

    let mut legs = Vec::new();
    for (idx, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        legs.push(parse_leg(&cols, &line, idx + 1)?);
    }

    if legs.is_empty() {
        return Err(SimError::EmptyMission);
    }
    Ok(Mission { name: name.into(), legs })
}

/// Read a mission table from a CSV file, naming the mission after the file stem.
///
/// Header names are matched case-insensitively. Accepted names:
/// `depth`/`depth_m`/`z_d`, `heading`/`heading_deg`/`psi_d`,
/// `rpm`/`propulsion`/`n`, `duration`/`duration_s`/`leg_time`, and the
/// optional `current_speed`/`v_c`, `current_direction`/`beta_c`,
/// `label`/`name`/`description`. A header naming none of the required
/// columns is read by position (depth, heading, rpm, current speed, current
/// direction in columns 1-5, duration in column 9).
pub fn read_mission(path: impl AsRef<Path>) -> Result<Mission> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mission".to_string());
    let file = File::open(path)?;
    parse_mission(name, BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Mission> {
        parse_mission("test", text.as_bytes())
    }

    #[test]
    fn reads_required_and_optional_columns() {
        let m = parse(
            "Depth,Heading,RPM,Current_Speed,Current_Direction,note,Duration,Label\n\
             5,0,1000,0.5,30,ignored,60,start\n\
             10,90,1200,,,x,30,\n",
        )
        .unwrap();
        assert_eq!(m.legs.len(), 2);
        assert_eq!(m.legs[0].current, Current { speed: 0.5, direction: 30.0 });
        assert_eq!(m.legs[0].label.as_deref(), Some("start"));
        assert_eq!(m.legs[1].heading, 90.0);
        assert_eq!(m.legs[1].duration, 30.0);
        assert_eq!(m.legs[1].current, Current::default());
        assert!(m.legs[1].label.is_none());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let m = parse("\ndepth,heading,rpm,duration\n\n1,2,3,4\n\n").unwrap();
        assert_eq!(m.legs, vec![Leg::new(1.0, 2.0, 3.0, 4.0)]);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = parse("depth,heading,duration\n1,2,3\n").unwrap_err();
        assert!(matches!(err, SimError::MissingColumn(ref c) if c == "rpm"));
    }

    #[test]
    fn bad_number_reports_line() {
        let err = parse("depth,heading,rpm,duration\n1,2,3,4\n1,abc,3,4\n").unwrap_err();
        assert!(matches!(err, SimError::DataFormat { line: 3, .. }), "got {err}");
    }

    #[test]
    fn short_row_is_an_error() {
        let err = parse("depth,heading,rpm,duration\n1,2,3\n").unwrap_err();
        assert!(matches!(err, SimError::DataFormat { line: 2, .. }));
    }

    #[test]
    fn negative_duration_is_an_error() {
        assert!(parse("depth,heading,rpm,duration\n1,2,3,-4\n").is_err());
    }

    #[test]
    fn header_only_is_empty() {
        assert!(matches!(parse("depth,heading,rpm,duration\n"), Err(SimError::EmptyMission)));
        assert!(matches!(parse(""), Err(SimError::EmptyMission)));
    }

    #[test]
    fn unnamed_header_falls_back_to_position() {
        let m = parse(
            "z,psi,n_rpm,vc,betac,a,b,c,t\n\
             5,30,1200,0.2,45,0,0,0,60\n\
             8,90,1000,,,0,0,0,12.5\n",
        )
        .unwrap();
        assert_eq!(m.legs.len(), 2);
        assert_eq!(m.legs[0].depth, 5.0);
        assert_eq!(m.legs[0].heading, 30.0);
        assert_eq!(m.legs[0].propulsion, 1200.0);
        assert_eq!(m.legs[0].current, Current { speed: 0.2, direction: 45.0 });
        assert_eq!(m.legs[0].duration, 60.0);
        assert_eq!(m.legs[1].duration, 12.5);
        assert_eq!(m.legs[1].current, Current::default());
    }
}
