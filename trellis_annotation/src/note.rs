// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sticky notes: free-floating, resizable text overlays.

use kurbo::Size;

use crate::types::Color;

/// A resizable text note.
#[derive(Clone, Debug, PartialEq)]
pub struct StickyNote {
    /// Note body.
    pub text: String,
    /// Paper color.
    pub color: Color,
    size: Size,
}

impl StickyNote {
    /// Smallest size a note can be resized to.
    pub const MIN_SIZE: Size = Size::new(100.0, 60.0);
    /// Largest size a note can be resized to.
    pub const MAX_SIZE: Size = Size::new(800.0, 600.0);
    /// Size of a freshly created note.
    pub const DEFAULT_SIZE: Size = Size::new(200.0, 100.0);

    /// Create a note with the default color. `size` is clamped to the note limits.
    pub fn new(text: impl Into<String>, size: Size) -> Self {
        Self {
            text: text.into(),
            color: Color::STICKY,
            size: clamp_size(size),
        }
    }

    /// Builder-style color override.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Current size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Resize, clamped to [`MIN_SIZE`](Self::MIN_SIZE)..=[`MAX_SIZE`](Self::MAX_SIZE).
    pub fn set_size(&mut self, size: Size) {
        self.size = clamp_size(size);
    }
}

impl Default for StickyNote {
    fn default() -> Self {
        Self::new("", Self::DEFAULT_SIZE)
    }
}

fn clamp_size(size: Size) -> Size {
    size.clamp(StickyNote::MIN_SIZE, StickyNote::MAX_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_clamped_both_ways() {
        let mut note = StickyNote::new("hi", Size::new(10.0, 10_000.0));
        assert_eq!(note.size(), Size::new(100.0, 600.0));
        note.set_size(Size::new(300.0, 200.0));
        assert_eq!(note.size(), Size::new(300.0, 200.0));
        note.set_size(Size::new(-5.0, 59.0));
        assert_eq!(note.size(), StickyNote::MIN_SIZE);
    }
}
