// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Markers: small circular badges pinned to the canvas.

use crate::types::Color;

/// Semantic category of a marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MarkerType {
    /// Informational note.
    #[default]
    Info,
    /// Something that needs attention.
    Warning,
    /// A failure.
    Error,
    /// Time-related annotation.
    Timer,
    /// Cost or budget annotation.
    Budget,
    /// Project milestone.
    Milestone,
    /// Known risk.
    Risk,
    /// Person or owner.
    User,
    /// Host-defined meaning.
    Custom,
}

impl MarkerType {
    const ALL: [(Self, &'static str); 9] = [
        (Self::Info, "info"),
        (Self::Warning, "warning"),
        (Self::Error, "error"),
        (Self::Timer, "timer"),
        (Self::Budget, "budget"),
        (Self::Milestone, "milestone"),
        (Self::Risk, "risk"),
        (Self::User, "user"),
        (Self::Custom, "custom"),
    ];

    /// Serialized name.
    pub fn name(self) -> &'static str {
        Self::ALL
            .iter()
            .find_map(|&(ty, name)| (ty == self).then_some(name))
            .unwrap_or("info")
    }

    /// Parse a serialized name; unknown names fall back to [`MarkerType::Info`].
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .iter()
            .find_map(|&(ty, n)| (n == name).then_some(ty))
            .unwrap_or_default()
    }
}

/// A circular badge with an optional tooltip label.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    /// Category, used by hosts to pick an icon.
    pub marker_type: MarkerType,
    /// Tooltip text.
    pub label: String,
    /// Badge color.
    pub color: Color,
    /// Badge diameter in world units.
    pub diameter: f64,
}

impl Marker {
    /// Diameter of a freshly created marker.
    pub const DEFAULT_DIAMETER: f64 = 24.0;

    /// Create a marker of the given type with default color and diameter.
    pub fn new(marker_type: MarkerType) -> Self {
        Self {
            marker_type,
            label: String::new(),
            color: Color::MARKER,
            diameter: Self::DEFAULT_DIAMETER,
        }
    }

    /// Builder-style tooltip label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::new(MarkerType::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_and_unknown_falls_back() {
        for (ty, name) in MarkerType::ALL {
            assert_eq!(ty.name(), name);
            assert_eq!(MarkerType::from_name(name), ty);
        }
        assert_eq!(MarkerType::from_name("volcano"), MarkerType::Info);
    }
}
