// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Publication lifecycle of admission information.
//!
//! ```text
//!  draft ──publish──▶ published ──archive──▶ archived
//!    ▲                   │
//!    └──────revert───────┘
//! ```
//!
//! `archived` is terminal.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{CatalogError, Violation};
use crate::validation::rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionStatus {
    /// Being edited; not visible to applicants.
    #[default]
    Draft,
    /// Visible to applicants.
    Published,
    /// Retired. No further transitions.
    Archived,
}

impl AdmissionStatus {
    /// Returns the string representation used for persistence and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Archived)
    }

    /// Checks whether moving from this status to `target` is allowed.
    ///
    /// Staying in the same status is always allowed.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Draft | Self::Published)
                | (Self::Published, Self::Published | Self::Archived | Self::Draft)
                | (Self::Archived, Self::Archived)
        )
    }

    /// Validates the move to `target`.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_status_transition` violation for any move outside
    /// the lifecycle diagram.
    pub fn transition_to(self, target: Self) -> Result<Self, Violation> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(Violation::new(
                "status",
                rule::INVALID_STATUS_TRANSITION,
                format!(
                    "cannot change admission status from '{}' to '{}'",
                    self.as_str(),
                    target.as_str()
                ),
            ))
        }
    }

    /// draft → published
    ///
    /// # Errors
    ///
    /// Fails unless the current status is `draft`.
    pub fn publish(self) -> Result<Self, Violation> {
        self.strict(Self::Draft, Self::Published)
    }

    /// published → archived
    ///
    /// # Errors
    ///
    /// Fails unless the current status is `published`.
    pub fn archive(self) -> Result<Self, Violation> {
        self.strict(Self::Published, Self::Archived)
    }

    /// published → draft
    ///
    /// # Errors
    ///
    /// Fails unless the current status is `published`.
    pub fn revert(self) -> Result<Self, Violation> {
        self.strict(Self::Published, Self::Draft)
    }

    fn strict(self, from: Self, to: Self) -> Result<Self, Violation> {
        if self == from {
            Ok(to)
        } else {
            Err(Violation::new(
                "status",
                rule::INVALID_STATUS_TRANSITION,
                format!(
                    "cannot change admission status from '{}' to '{}'",
                    self.as_str(),
                    to.as_str()
                ),
            ))
        }
    }
}

impl FromStr for AdmissionStatus {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            _ => Err(CatalogError::invalid_input(
                "status",
                format!("unknown admission status '{s}'"),
            )),
        }
    }
}

impl std::fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
