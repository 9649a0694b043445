// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Insets, Size};
use trellis_annotation::Group;

/// Tunables for a [`Canvas`](crate::Canvas).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasConfig {
    /// Floor applied by resize sessions before the annotation's own limits.
    pub min_resize_size: Size,
    /// Padding given to groups created by [`Canvas::group_selected_nodes`](crate::Canvas::group_selected_nodes).
    pub default_group_padding: Insets,
    /// Cell size of the default grid index, in world units.
    pub index_cell_size: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_resize_size: Size::new(50.0, 50.0),
            default_group_padding: Group::DEFAULT_PADDING,
            index_cell_size: 256.0,
        }
    }
}
