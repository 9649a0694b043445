// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identifiers, colors, layers, and capability flags shared by all annotation kinds.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of an annotation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

/// Stable identity of a graph node, owned by the host graph.
///
/// Annotations only ever store node ids; the node itself is resolved through a
/// [`NodeLookup`](crate::NodeLookup) at the moment of use.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            /// Create an id from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(AnnotationId);
string_id!(NodeId);

/// A packed `0xAARRGGBB` color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    /// Default tint for groups.
    pub const GROUP: Self = Self(0xFF_21_96_F3);
    /// Default paper color for sticky notes.
    pub const STICKY: Self = Self(0xFF_FF_F5_9D);
    /// Default marker color.
    pub const MARKER: Self = Self(0xFF_F4_43_36);

    /// Parse `#RRGGBB` or `#AARRGGBB`. Six-digit colors are made opaque.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let value = u32::from_str_radix(hex, 16).ok()?;
        match hex.len() {
            6 => Some(Self(0xFF00_0000 | value)),
            8 => Some(Self(value)),
            _ => None,
        }
    }
}

/// Render layer an annotation paints and hit-tests in.
///
/// Background annotations (groups) sit behind graph nodes; foreground
/// annotations (notes, markers) sit above them. Hit testing visits the
/// foreground first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderLayer {
    /// Behind nodes.
    Background,
    /// Above nodes.
    Foreground,
}

bitflags::bitflags! {
    /// Capability record of an annotation, derived from its kind and behavior.
    ///
    /// Generic orchestration (resize, monitoring, removal) reads these flags
    /// instead of branching on the annotation kind.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Can be resized through resize handles.
        const RESIZABLE         = 0b0000_0001;
        /// Wants move/resize/delete notifications for its member nodes.
        const MONITORS_NODES    = 0b0000_0010;
        /// Should be deleted once its membership becomes empty.
        const REMOVE_WHEN_EMPTY = 0b0000_0100;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(Color::from_hex("#ff0000"), Some(Color(0xFFFF_0000)));
        assert_eq!(Color::from_hex("80ff0000"), Some(Color(0x80FF_0000)));
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn ids_display_and_order() {
        let a = NodeId::from("a");
        let b = NodeId::new(String::from("b"));
        assert!(a < b);
        assert_eq!(a.to_string(), "a");
        assert_eq!(AnnotationId::from("g1").as_str(), "g1");
    }
}
