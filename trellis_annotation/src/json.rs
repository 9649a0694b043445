// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON encoding of annotations.
//!
//! The shape is a flat object: shared fields (`id`, `type`, `x`, `y`,
//! `zIndex`, `isVisible`, `isInteractive`, `metadata`) next to kind-specific
//! fields. Decoding is lenient: every optional field falls back to its default
//! when it is absent or has the wrong JSON type.

use kurbo::{Insets, Point, Size};
use serde_json::{Map, Value, json};

use crate::annotation::{Annotation, AnnotationKind};
use crate::error::AnnotationError;
use crate::group::{Group, GroupBehavior};
use crate::marker::{Marker, MarkerType};
use crate::note::StickyNote;
use crate::types::{Color, NodeId};

impl Annotation {
    /// Encode as a JSON object.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("id".into(), json!(self.id().as_str()));
        obj.insert("type".into(), json!(self.type_name()));
        obj.insert("x".into(), json!(self.position().x));
        obj.insert("y".into(), json!(self.position().y));

        match self.kind() {
            AnnotationKind::Sticky(note) => {
                obj.insert("width".into(), json!(note.size().width));
                obj.insert("height".into(), json!(note.size().height));
                obj.insert("text".into(), json!(note.text));
                obj.insert("color".into(), json!(note.color.0));
            }
            AnnotationKind::Marker(marker) => {
                obj.insert("markerType".into(), json!(marker.marker_type.name()));
                obj.insert("label".into(), json!(marker.label));
                obj.insert("color".into(), json!(marker.color.0));
                obj.insert("diameter".into(), json!(marker.diameter));
            }
            AnnotationKind::Group(group) => {
                let p = group.padding();
                let members: Vec<&str> = group.members().iter().map(NodeId::as_str).collect();
                obj.insert("width".into(), json!(group.size().width));
                obj.insert("height".into(), json!(group.size().height));
                obj.insert("title".into(), json!(group.title));
                obj.insert("color".into(), json!(group.color.0));
                obj.insert("behavior".into(), json!(group.behavior().name()));
                obj.insert("memberIds".into(), json!(members));
                obj.insert("padding".into(), json!([p.x0, p.y0, p.x1, p.y1]));
            }
        }

        if let Some(z) = self.z_index() {
            obj.insert("zIndex".into(), json!(z));
        }
        obj.insert("isVisible".into(), json!(self.is_visible()));
        obj.insert("isInteractive".into(), json!(self.is_interactive()));
        obj.insert("metadata".into(), Value::Object(self.metadata().clone()));
        Value::Object(obj)
    }

    /// Decode from a JSON object produced by [`to_json`](Self::to_json).
    ///
    /// Fails only when the value is not an object, lacks a string `id` or
    /// `type`, or names an unknown type.
    pub fn from_json(value: &Value) -> Result<Self, AnnotationError> {
        let obj = value.as_object().ok_or(AnnotationError::NotAnObject)?;
        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .ok_or(AnnotationError::MissingId)?;
        let ty = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| AnnotationError::MissingType(id.to_owned()))?;
        let fields = Fields(obj);

        let kind: AnnotationKind = match ty {
            "sticky" => {
                let size = fields.size(StickyNote::DEFAULT_SIZE);
                StickyNote::new(fields.string("text"), size)
                    .with_color(fields.color(Color::STICKY))
                    .into()
            }
            "marker" => Marker {
                marker_type: MarkerType::from_name(&fields.string("markerType")),
                label: fields.string("label"),
                color: fields.color(Color::MARKER),
                diameter: fields.f64_or("diameter", Marker::DEFAULT_DIAMETER),
            }
            .into(),
            "group" => {
                let behavior = GroupBehavior::from_name(&fields.string("behavior"));
                let size = fields.size(Group::default().size());
                let mut group = Group::new(fields.string_or("title", "Group"), size)
                    .with_behavior(behavior)
                    .with_color(fields.color(Color::GROUP))
                    .with_padding(fields.padding());
                // Fitted sizes may be below the manual minimum, and a bounds
                // group may still hold ids kept across a behavior switch.
                group.restore(size, fields.members());
                group.into()
            }
            other => {
                return Err(AnnotationError::UnknownType {
                    id: id.to_owned(),
                    ty: other.to_owned(),
                });
            }
        };

        let position = Point::new(fields.f64_or("x", 0.0), fields.f64_or("y", 0.0));
        let mut annotation = Self::new(id, position, kind)
            .with_visible(fields.bool_or("isVisible", true))
            .with_interactive(fields.bool_or("isInteractive", true))
            .with_metadata(fields.metadata());
        if let Some(z) = fields.z_index() {
            annotation.set_z_index(z);
        }
        Ok(annotation)
    }

    /// Decode from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, AnnotationError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }
}

struct Fields<'a>(&'a Map<String, Value>);

impl Fields<'_> {
    fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.0
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    }

    fn bool_or(&self, key: &str, default: bool) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    fn string(&self, key: &str) -> String {
        self.string_or(key, "")
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_owned()
    }

    fn size(&self, default: Size) -> Size {
        Size::new(
            self.f64_or("width", default.width),
            self.f64_or("height", default.height),
        )
    }

    fn color(&self, default: Color) -> Color {
        match self.0.get("color") {
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map_or(default, Color),
            Some(Value::String(s)) => Color::from_hex(s).unwrap_or(default),
            _ => default,
        }
    }

    fn z_index(&self) -> Option<i32> {
        self.0
            .get("zIndex")
            .and_then(Value::as_i64)
            .and_then(|z| i32::try_from(z).ok())
    }

    fn metadata(&self) -> Map<String, Value> {
        self.0
            .get("metadata")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    fn padding(&self) -> Insets {
        let d = Group::DEFAULT_PADDING;
        let Some(values) = self.0.get("padding").and_then(Value::as_array) else {
            return d;
        };
        let at = |i: usize, default: f64| {
            values
                .get(i)
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite())
                .unwrap_or(default)
        };
        Insets::new(at(0, d.x0), at(1, d.y0), at(2, d.x1), at(3, d.y1))
    }

    fn members(&self) -> Vec<NodeId> {
        self.0
            .get("memberIds")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(NodeId::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}
