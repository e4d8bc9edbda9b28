//! Domain data structures for material categories, bins, and persisted log records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::routing::route;

/// Material categories a classifier is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Batteries of any kind.
    Battery,
    /// Food and other organic waste.
    Biological,
    /// Brown glass bottles and jars.
    BrownGlass,
    /// Cardboard boxes and packaging.
    Cardboard,
    /// Textiles.
    Clothes,
    /// Green glass bottles and jars.
    GreenGlass,
    /// Cans and metal scrap.
    Metal,
    /// Paper.
    Paper,
    /// Plastic packaging.
    Plastic,
    /// Footwear.
    Shoes,
    /// Residual waste.
    Trash,
    /// Clear glass.
    WhiteGlass,
}

impl Category {
    /// Every category in lexicographic label order.
    pub const ALL: [Category; 12] = [
        Category::Battery,
        Category::Biological,
        Category::BrownGlass,
        Category::Cardboard,
        Category::Clothes,
        Category::GreenGlass,
        Category::Metal,
        Category::Paper,
        Category::Plastic,
        Category::Shoes,
        Category::Trash,
        Category::WhiteGlass,
    ];

    /// Lowercase label as produced by the classifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Battery => "battery",
            Category::Biological => "biological",
            Category::BrownGlass => "brown-glass",
            Category::Cardboard => "cardboard",
            Category::Clothes => "clothes",
            Category::GreenGlass => "green-glass",
            Category::Metal => "metal",
            Category::Paper => "paper",
            Category::Plastic => "plastic",
            Category::Shoes => "shoes",
            Category::Trash => "trash",
            Category::WhiteGlass => "white-glass",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Returned when a label is not one of the twelve known categories.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == label)
            .ok_or_else(|| UnknownCategory(label.to_owned()))
    }
}

/// Physical receptacle a sorted item is dropped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bin {
    /// Recyclable materials.
    Recycle,
    /// Everything else.
    General,
}

impl Bin {
    /// Name as stored in the log and returned to devices.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Bin::Recycle => "Recycle",
            Bin::General => "General",
        }
    }

    /// Device command that opens this bin, e.g. `OPEN_RECYCLE`.
    #[must_use]
    pub fn command(self) -> String {
        format!("OPEN_{}", self.as_str().to_uppercase())
    }
}

impl fmt::Display for Bin {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Opaque identifier of the submitting unit.
pub struct DeviceId(pub String);

impl DeviceId {
    /// Identifier used when no device id is configured.
    pub const DEFAULT: &'static str = "feather-s3-simulation";
}

impl Default for DeviceId {
    fn default() -> Self {
        DeviceId(Self::DEFAULT.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier assigned by the waste log to an appended record.
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// One immutable audit entry for a classification event.
///
/// The bin is always derived from the class; there is no way to build a record
/// with an inconsistent pair. Field names are the contract dashboards read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WasteLogRecord {
    timestamp: DateTime<Utc>,
    class: String,
    bin: Bin,
    #[serde(rename = "deviceId")]
    device_id: DeviceId,
}

impl WasteLogRecord {
    /// Build a record for an already normalized class label.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, class: impl Into<String>, device_id: DeviceId) -> Self {
        let class = class.into();
        let bin = route(&class);
        Self {
            timestamp,
            class,
            bin,
            device_id,
        }
    }

    /// Creation time assigned by the server.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Normalized class label.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Bin derived from the class.
    #[must_use]
    pub fn bin(&self) -> Bin {
        self.bin
    }

    /// Submitting device.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_parse_back() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        assert!("Plastic".parse::<Category>().is_err());
    }

    #[test]
    fn categories_are_listed_in_label_order() {
        let labels: Vec<_> = Category::ALL.iter().map(|category| category.as_str()).collect();
        let mut sorted = labels.clone();
        sorted.sort_unstable();
        assert_eq!(labels, sorted);
    }

    #[test]
    fn command_is_open_plus_uppercase_bin() {
        for bin in [Bin::Recycle, Bin::General] {
            assert_eq!(bin.command(), format!("OPEN_{}", bin.as_str().to_uppercase()));
        }
        assert_eq!(Bin::Recycle.command(), "OPEN_RECYCLE");
        assert_eq!(Bin::General.command(), "OPEN_GENERAL");
    }

    #[test]
    fn record_derives_bin_from_class() {
        let now = Utc::now();
        let record = WasteLogRecord::new(now, "cardboard", DeviceId::default());
        assert_eq!(record.bin(), Bin::Recycle);

        let record = WasteLogRecord::new(now, "battery", DeviceId::default());
        assert_eq!(record.bin(), Bin::General);
    }

    #[test]
    fn record_serializes_with_stable_field_names() {
        let record = WasteLogRecord::new(Utc::now(), "paper", DeviceId("unit-7".into()));
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["bin", "class", "deviceId", "timestamp"]);
        assert_eq!(object["bin"], "Recycle");
        assert_eq!(object["deviceId"], "unit-7");
    }
}
