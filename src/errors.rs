use std::fmt;

use crate::output::OutputId;
use crate::seat::SeatId;
use crate::surface::SurfaceId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellError {
    UnknownOutput(OutputId),
    UnknownSeat(SeatId),
    UnknownSurface(SurfaceId),
    InvalidWorkspace(usize),
    EventLoop(String),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::UnknownOutput(id) => write!(f, "unknown output {}", id.0),
            ShellError::UnknownSeat(id) => write!(f, "unknown seat {}", id.0),
            ShellError::UnknownSurface(id) => write!(f, "unknown surface {}", id.0),
            ShellError::InvalidWorkspace(index) => {
                write!(f, "invalid workspace index {index}")
            }
            ShellError::EventLoop(msg) => write!(f, "event loop error: {msg}"),
        }
    }
}

impl std::error::Error for ShellError {}

pub type Result<T, E = ShellError> = std::result::Result<T, E>;
