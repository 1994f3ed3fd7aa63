// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Badge records and input validation.

use alloc::string::{String, ToString};
use serde::{Deserialize, Serialize};

use crate::error::{BadgeError, KernelResult};

/// A tooltip-labeled image. Field names match the persisted document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub tooltip: String,
    /// Public image URL.
    pub badge: String,
}

impl Badge {
    pub fn new(tooltip: impl Into<String>, badge: impl Into<String>) -> Self {
        Self {
            tooltip: tooltip.into(),
            badge: badge.into(),
        }
    }
}

/// A validated request to append a badge to a user's sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBadge {
    pub user_id: String,
    pub badge: Badge,
}

impl NewBadge {
    /// Trims every field and rejects any that is absent or blank.
    pub fn parse(
        user_id: Option<&str>,
        tooltip: Option<&str>,
        badge: Option<&str>,
    ) -> KernelResult<Self> {
        let user_id = required("userId", user_id)?;
        let tooltip = required("tooltip", tooltip)?;
        let badge = required("badge", badge)?;

        Ok(Self {
            user_id,
            badge: Badge { tooltip, badge },
        })
    }
}

fn required(field: &'static str, value: Option<&str>) -> KernelResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(BadgeError::MissingField(field)),
    }
}
