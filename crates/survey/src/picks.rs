use serde::{Deserialize, Serialize};

/// A picked location in slice pixel space.
///
/// `x` is the trace column and `y` the sample row. `value` carries an
/// explicit scalar (e.g. a thickness) and `depth` a converted depth; both
/// are optional and persisted only when present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickedPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

impl PickedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            value: None,
            depth: None,
        }
    }

    pub fn with_value(x: f64, y: f64, value: f64) -> Self {
        Self {
            value: Some(value),
            ..Self::new(x, y)
        }
    }

    /// Scalar used for structure mapping: the explicit value, else the
    /// two-way time row `y`.
    pub fn structure_value(&self) -> f64 {
        self.value.unwrap_or(self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub points: Vec<PickedPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl Horizon {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: None,
            points: Vec::new(),
            confidence: None,
            method: None,
        }
    }

    pub fn with_points(mut self, points: Vec<PickedPoint>) -> Self {
        self.points = points;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub points: Vec<PickedPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Estimated throw, in samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displacement: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl Fault {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            points: Vec::new(),
            confidence: None,
            displacement: None,
            method: None,
        }
    }
}
