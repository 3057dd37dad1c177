//! Shape construction sinks.
//!
//! Compositors build plain [`Shape`] values and report every intermediate
//! entity to a [`ShapeBuilder`]. [`BareBuilder`] ignores the reports;
//! [`DocumentBuilder`] keeps a named, labelled object list the way a CAD
//! document tree would.

use indexmap::IndexMap;
use pcbsolid_geometry::Shape;
use serde::Serialize;

use crate::config::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Compound,
    Offset,
    Feature,
    Face,
    Extrusion,
    Cut,
}

/// One constructed entity, as reported to a builder.
#[derive(Debug, Clone, Copy)]
pub struct Entity<'s> {
    pub kind: FeatureKind,
    pub name: &'s str,
    pub layer: &'s str,
    pub label: Option<&'s str>,
    pub shape: &'s Shape,
}

pub trait ShapeBuilder {
    /// Called once per constructed entity, in construction order.
    fn record(&mut self, entity: Entity<'_>);

    /// Color the most recently recorded entity.
    fn set_color(&mut self, _color: Color) {}
}

/// Produces bare shapes and keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BareBuilder;

impl ShapeBuilder for BareBuilder {
    fn record(&mut self, _entity: Entity<'_>) {}
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentObject {
    pub name: String,
    pub label: String,
    pub kind: FeatureKind,
    pub color: Option<Color>,
    pub area: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    pub objects: Vec<DocumentObject>,
    #[serde(skip)]
    counters: IndexMap<String, usize>,
}

impl Document {
    /// `base` the first time, then `base001`, `base002`, ...
    fn unique_name(&mut self, base: &str) -> String {
        let n = self.counters.entry(base.to_string()).or_insert(0);
        let name = if *n == 0 {
            base.to_string()
        } else {
            format!("{base}{n:03}")
        };
        *n += 1;
        name
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DocumentObject> {
        self.objects.iter().find(|o| o.name == name)
    }
}

/// Materializes every entity as a named document object labelled
/// `name#layer#label`.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    pub document: Document,
}

impl DocumentBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }
}

impl ShapeBuilder for DocumentBuilder {
    fn record(&mut self, entity: Entity<'_>) {
        let name = self.document.unique_name(entity.name);
        let mut label = if entity.layer.is_empty() {
            name.clone()
        } else {
            format!("{name}#{}", entity.layer)
        };
        if let Some(extra) = entity.label {
            label.push('#');
            label.push_str(extra);
        }
        self.document.objects.push(DocumentObject {
            name,
            label,
            kind: entity.kind,
            color: None,
            area: entity.shape.area(),
            volume: entity.shape.volume(),
        });
    }

    fn set_color(&mut self, color: Color) {
        if let Some(last) = self.document.objects.last_mut() {
            last.color = Some(color);
        }
    }
}
