// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeError {
    /// No badge at the requested user/position.
    NotFound,
    /// A required field was absent or blank.
    MissingField(&'static str),
}

impl fmt::Display for BadgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadgeError::NotFound => f.write_str("Badge not found"),
            BadgeError::MissingField(field) => write!(f, "Missing required field: {}", field),
        }
    }
}

pub type KernelResult<T> = core::result::Result<T, BadgeError>;
