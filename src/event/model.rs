use serde::{Deserialize, Serialize};

/// Reference to one domain entity: the `(type, id)` pair of an event endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity type name, e.g. `Order` or `StockSkuItem`.
    pub entity_type: String,
    /// Entity id, unique within its type.
    pub id: String,
}

impl EntityRef {
    /// Create an entity reference.
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

/// One record of the event table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event timestamp in milliseconds.
    pub time_ms: i64,
    /// Source entity; always present.
    pub from: EntityRef,
    /// Target entity; `None` when the record carries the `NA` sentinel.
    pub to: Option<EntityRef>,
    /// Free-text message. Only color directives are interpreted; anything
    /// else is inert.
    pub message: String,
}

/// Recognized color directive messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorDirective {
    /// `"color red"`
    Red,
    /// `"color yellow"`
    Yellow,
    /// `"color green"`
    Green,
}

impl ColorDirective {
    /// Parse an event message; `None` for anything that is not a directive.
    pub fn parse(message: &str) -> Option<Self> {
        match message {
            "color red" => Some(Self::Red),
            "color yellow" => Some(Self::Yellow),
            "color green" => Some(Self::Green),
            _ => None,
        }
    }

    /// Scalar value the renderer maps onto its red-to-green ramp.
    pub const fn value(self) -> f64 {
        match self {
            Self::Red => 0.0,
            Self::Yellow => 0.5,
            Self::Green => 1.0,
        }
    }
}
