use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("Availability fetch failed: {0}")]
    FetchFailed(String),

    #[error("Booking submission failed: {0}")]
    SubmissionFailed(String),

    #[error("No hour has been selected")]
    HourNotSelected,

    #[error("Hour {hour} is not available for booking")]
    SlotUnavailable { hour: u32 },

    #[error("Hour {hour} is not part of the loaded availability")]
    UnknownHour { hour: u32 },

    #[error("A provider id is required")]
    MissingProvider,

    #[error("Invalid hour of day: {hour}")]
    InvalidTime { hour: u32 },
}
