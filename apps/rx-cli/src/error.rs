//! Error type for the command-line front end.

/// Wraps the library errors a command can surface.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Scenario error: {0}")]
    Project(#[from] rx_project::ProjectError),

    #[error("Scenario validation failed: {0}")]
    Validation(#[from] rx_project::ValidationError),

    #[error("Controller error: {0}")]
    Control(#[from] rx_controls::ControlError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] rx_sim::SimError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
