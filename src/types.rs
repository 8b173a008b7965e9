use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a record within the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u32);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hospital,
    School,
}

impl Category {
    /// Fixed label set, in chart order.
    pub const ALL: [Category; 2] = [Category::Hospital, Category::School];

    pub fn label(self) -> &'static str {
        match self {
            Category::Hospital => "Hospital",
            Category::School => "School",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hospital" | "hospitals" => Ok(Category::Hospital),
            "school" | "schools" => Ok(Category::School),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::Good, Condition::Fair, Condition::Poor];

    pub fn label(self) -> &'static str {
        match self {
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    // None means the value is unknown
    pub capacity: Option<u32>,
    pub year_built: Option<i32>,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfrastructureRecord {
    pub id: RecordId,
    pub name: String,
    pub category: Category,
    // x = longitude, y = latitude
    pub location: Point<f64>,
    pub attributes: Attributes,
}

impl InfrastructureRecord {
    pub fn new(
        id: u32,
        name: &str,
        category: Category,
        latitude: f64,
        longitude: f64,
        attributes: Attributes,
    ) -> Self {
        Self {
            id: RecordId(id),
            name: name.to_string(),
            category,
            location: Point::new(longitude, latitude),
            attributes,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }
}

/// Wire form of a record for rendering collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub id: RecordId,
    pub name: String,
    pub category: Category,
    pub latitude: f64,
    pub longitude: f64,
    pub attributes: Attributes,
}

impl From<&InfrastructureRecord> for RecordView {
    fn from(record: &InfrastructureRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            category: record.category,
            latitude: record.latitude(),
            longitude: record.longitude(),
            attributes: record.attributes.clone(),
        }
    }
}
