use thiserror::Error;

/// Malformed or inconsistent input. Raised before any model is built.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("numDays must be at least 1")]
    ZeroDays,

    #[error("numHours must be at least 1")]
    ZeroHours,

    #[error("at least one group is required")]
    NoGroups,

    #[error("group id must not be empty")]
    EmptyGroupId,

    #[error("group '{0}' is declared more than once")]
    DuplicateGroup(String),

    #[error("subject '{0}' is declared more than once")]
    DuplicateSubject(String),

    #[error("subject '{0}': maxHoursPerDay must be at least 1")]
    ZeroMaxHoursPerDay(String),

    #[error("teacher '{0}' is declared more than once")]
    DuplicateTeacher(String),

    #[error("teacher '{teacher}' references undeclared subject '{subject}'")]
    UnknownSubject { teacher: String, subject: String },

    #[error("solver.timeLimitSecs must be a positive number, got {0}")]
    InvalidTimeLimit(f64),

    #[error("solver.randomSeed must not be negative, got {0}")]
    InvalidSeed(i32),

    #[error("solver.threads must be at least 1, got {0}")]
    InvalidThreads(i32),

    #[error("cannot read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse input: {0}")]
    Parse(#[from] serde_json::Error),
}
