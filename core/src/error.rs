use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModemError {
    #[error("Unsupported track count: {0} (expected 1, 4 or 8)")]
    UnsupportedTrackCount(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ModemError {
    /// True for errors caused by a bad track count, speed or sample rate.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ModemError::UnsupportedTrackCount(_) | ModemError::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ModemError>;
