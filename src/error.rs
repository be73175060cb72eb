use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("line {line}: {message}")]
    DataFormat { line: usize, message: String },

    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("mission table has no rows")]
    EmptyMission,

    #[error("unknown control mode `{0}`")]
    UnknownControlMode(String),

    #[error("vehicle `{vehicle}` has no control law for mode `{mode}`")]
    UnsupportedControlMode { vehicle: String, mode: String },

    #[error("{what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("time went backwards: {next} after {previous}")]
    NonMonotonicTime { previous: f64, next: f64 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),
}

impl SimError {
    pub(crate) fn data(line: usize, message: impl Into<String>) -> Self {
        SimError::DataFormat { line, message: message.into() }
    }
}
