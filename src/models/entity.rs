//! Output graph entities and the sink they are emitted into

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// How the host matches a property when merging entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchingRule {
    Loose,
    Strict,
}

/// Typed property value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Float(f64),
    DateTime(DateTime<Utc>),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<u64> for PropertyValue {
    fn from(i: u64) -> Self {
        i64::try_from(i)
            .map(Self::Integer)
            .unwrap_or_else(|_| Self::Text(i.to_string()))
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<&serde_json::Value> for PropertyValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or_else(|| Self::Text(n.to_string())),
            other => Self::Text(other.to_string()),
        }
    }
}

/// Entity property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    pub display_name: String,
    pub matching: MatchingRule,
    pub value: PropertyValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayPosition {
    NorthWest,
    West,
    SouthWest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Image,
    Text,
}

/// Small badge drawn on an entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub content: String,
    pub position: OverlayPosition,
    pub kind: OverlayKind,
}

/// HTML snippet shown in the host's detail view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayInformation {
    pub label: String,
    pub html: String,
}

/// Typed graph node handed to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputEntity {
    pub entity_type: String,
    pub value: String,
    pub properties: Vec<Property>,
    pub overlays: Vec<Overlay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_label: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub display_information: Vec<DisplayInformation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

impl OutputEntity {
    pub fn new(entity_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            value: value.into(),
            properties: Vec::new(),
            overlays: Vec::new(),
            link_label: None,
            display_information: Vec::new(),
            icon_url: None,
            weight: None,
        }
    }

    /// Add a property; a second add under the same name replaces the value in place
    pub fn add_property(
        &mut self,
        name: &str,
        display_name: impl Into<String>,
        matching: MatchingRule,
        value: impl Into<PropertyValue>,
    ) -> &mut Self {
        let property = Property {
            name: name.to_string(),
            display_name: display_name.into(),
            matching,
            value: value.into(),
        };
        match self.properties.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
        self
    }

    pub fn add_overlay(
        &mut self,
        content: impl Into<String>,
        position: OverlayPosition,
        kind: OverlayKind,
    ) -> &mut Self {
        self.overlays.push(Overlay {
            content: content.into(),
            position,
            kind,
        });
        self
    }

    pub fn set_link_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.link_label = Some(label.into());
        self
    }

    pub fn add_display_information(
        &mut self,
        html: impl Into<String>,
        label: impl Into<String>,
    ) -> &mut Self {
        self.display_information.push(DisplayInformation {
            label: label.into(),
            html: html.into(),
        });
        self
    }

    pub fn set_icon_url(&mut self, icon: impl Into<String>) -> &mut Self {
        self.icon_url = Some(icon.into());
        self
    }

    pub fn set_weight(&mut self, weight: i64) -> &mut Self {
        self.weight = Some(weight);
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn has_overlay(&self, position: OverlayPosition) -> bool {
        self.overlays.iter().any(|o| o.position == position)
    }
}

// ============================================
// Sink
// ============================================

/// Position of an emitted entity inside its sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityId(pub usize);

/// Operator notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; used when a request cannot be processed at all
    Inform,
    /// Partial failure; processing continued
    Partial,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiMessage {
    pub text: String,
    pub severity: Severity,
}

/// Append-only collector for entities and operator notices
pub trait TransformSink {
    /// Takes ownership of a finished entity
    fn add_entity(&mut self, entity: OutputEntity) -> EntityId;

    fn add_message(&mut self, text: String, severity: Severity);
}

/// In-memory sink, serialized as the transform's response
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformResponse {
    pub entities: Vec<OutputEntity>,
    pub messages: Vec<UiMessage>,
}

impl TransformResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(&self, id: EntityId) -> Option<&OutputEntity> {
        self.entities.get(id.0)
    }

    pub fn messages_with(&self, severity: Severity) -> impl Iterator<Item = &UiMessage> {
        self.messages.iter().filter(move |m| m.severity == severity)
    }
}

impl TransformSink for TransformResponse {
    fn add_entity(&mut self, entity: OutputEntity) -> EntityId {
        self.entities.push(entity);
        EntityId(self.entities.len() - 1)
    }

    fn add_message(&mut self, text: String, severity: Severity) {
        self.messages.push(UiMessage { text, severity });
    }
}
