//! Error types for the pathfinding core and its driver.

use std::fmt;

use thiserror::Error;

use crate::grid::Position;

/// Which endpoint of a search was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::End => write!(f, "end"),
        }
    }
}

/// Why an endpoint was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointIssue {
    Missing,
    OutOfBounds(Position),
    Obstacle(Position),
}

impl fmt::Display for EndpointIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointIssue::Missing => write!(f, "not set"),
            EndpointIssue::OutOfBounds(pos) => write!(f, "{} is outside the grid", pos),
            EndpointIssue::Obstacle(pos) => write!(f, "{} is an obstacle", pos),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathfindingError {
    #[error("invalid {endpoint} endpoint: {issue}")]
    InvalidEndpoint {
        endpoint: Endpoint,
        issue: EndpointIssue,
    },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("position {position} is outside the {cols}x{rows} grid")]
    OutOfBounds {
        position: Position,
        cols: usize,
        rows: usize,
    },

    #[error("configuration error: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PathfindingError>;
