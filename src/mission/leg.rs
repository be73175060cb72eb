use crate::vehicle::{Current, Setpoints};

// ---------------------------------------------------------------------------
// Leg: one row of the mission table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub depth: f64,       // m, positive down
    pub heading: f64,     // deg
    pub propulsion: f64,  // propeller command, rpm
    pub duration: f64,    // s
    /// Only read from the seeding row, when the vehicle is constructed.
    pub current: Current,
    pub label: Option<String>,
}

impl Leg {
    pub fn new(depth: f64, heading: f64, propulsion: f64, duration: f64) -> Self {
        Self {
            depth,
            heading,
            propulsion,
            duration,
            current: Current::default(),
            label: None,
        }
    }

    /// Setpoints as written in the table, without heading wrap correction.
    pub fn setpoints(&self) -> Setpoints {
        Setpoints {
            depth: self.depth,
            heading: self.heading,
            propulsion: self.propulsion,
        }
    }
}

pub struct LegBuilder {
    leg: Leg,
}

impl LegBuilder {
    pub fn new(duration: f64) -> Self {
        Self { leg: Leg::new(0.0, 0.0, 0.0, duration) }
    }

    pub fn depth(mut self, v: f64) -> Self { self.leg.depth = v; self }
    pub fn heading(mut self, v: f64) -> Self { self.leg.heading = v; self }
    pub fn propulsion(mut self, v: f64) -> Self { self.leg.propulsion = v; self }
    pub fn current(mut self, speed: f64, direction: f64) -> Self {
        self.leg.current = Current { speed, direction };
        self
    }
    pub fn label(mut self, v: impl Into<String>) -> Self { self.leg.label = Some(v.into()); self }

    pub fn build(self) -> Leg {
        self.leg
    }
}

// ---------------------------------------------------------------------------
// Mission: seeding row followed by the legs to fly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Mission {
    pub name: String,
    /// `legs[0]` seeds the vehicle; the rest are flown in order.
    pub legs: Vec<Leg>,
}

impl Mission {
    pub fn seed_leg(&self) -> Option<&Leg> {
        self.legs.first()
    }

    /// Legs flown after the seeding run.
    pub fn flown_legs(&self) -> &[Leg] {
        self.legs.get(1..).unwrap_or(&[])
    }

    /// Sum of all flown leg durations (excludes the seeding row).
    pub fn flown_duration(&self) -> f64 {
        self.flown_legs().iter().map(|l| l.duration).sum()
    }
}

pub struct MissionBuilder {
    name: String,
    legs: Vec<Leg>,
}

impl MissionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), legs: vec![] }
    }

    pub fn leg(mut self, leg: Leg) -> Self {
        self.legs.push(leg);
        self
    }

    pub fn build(self) -> Mission {
        Mission { name: self.name, legs: self.legs }
    }
}
