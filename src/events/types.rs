//! Category and severity types for tracked events
//!
//! Both category enums are closed sets. Declaration order matters: the
//! frequency analyzer breaks ties between equal counts by it, so reordering
//! variants changes report output.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::events::error::EventError;

/// A closed, ordered set of categories that can be tallied
pub trait Category: Copy + Ord + fmt::Display + Send + Sync + 'static {
    /// Every variant in declaration order
    fn all() -> &'static [Self];

    /// Stable machine name used on the wire
    fn key(&self) -> &'static str;
}

/// Suspected allergy trigger
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCategory {
    /// Food, treats, chews
    Food,
    /// A specific walk route or park
    WalkLocation,
    /// Grass, tree and weed pollen
    Pollen,
    /// Heat, humidity, wind
    Weather,
    /// Cleaners, detergents, sprays
    HouseholdProduct,
    /// New home, carpet, bedding and similar changes
    EnvironmentalChange,
    /// Owner could not identify a cause
    Unknown,
}

impl Category for TriggerCategory {
    fn all() -> &'static [TriggerCategory] {
        &[
            TriggerCategory::Food,
            TriggerCategory::WalkLocation,
            TriggerCategory::Pollen,
            TriggerCategory::Weather,
            TriggerCategory::HouseholdProduct,
            TriggerCategory::EnvironmentalChange,
            TriggerCategory::Unknown,
        ]
    }

    fn key(&self) -> &'static str {
        match self {
            TriggerCategory::Food => "food",
            TriggerCategory::WalkLocation => "walk_location",
            TriggerCategory::Weather => "weather",
            TriggerCategory::Pollen => "pollen",
            TriggerCategory::HouseholdProduct => "household_product",
            TriggerCategory::EnvironmentalChange => "environmental_change",
            TriggerCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TriggerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TriggerCategory::Food => "Food",
            TriggerCategory::WalkLocation => "Walk Location",
            TriggerCategory::Weather => "Weather",
            TriggerCategory::Pollen => "Pollen",
            TriggerCategory::HouseholdProduct => "Household Product",
            TriggerCategory::EnvironmentalChange => "Environmental Change",
            TriggerCategory::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

impl FromStr for TriggerCategory {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "food" | "treat" | "treats" => Ok(TriggerCategory::Food),
            "walk_location" | "walk" | "location" => Ok(TriggerCategory::WalkLocation),
            "weather" => Ok(TriggerCategory::Weather),
            "pollen" => Ok(TriggerCategory::Pollen),
            "household_product" | "household" => Ok(TriggerCategory::HouseholdProduct),
            "environmental_change" | "environment" | "environmental" => {
                Ok(TriggerCategory::EnvironmentalChange)
            }
            "unknown" => Ok(TriggerCategory::Unknown),
            _ => Err(EventError::UnknownTrigger(s.trim().to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for TriggerCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Observed symptom
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SymptomCategory {
    Itching,
    Redness,
    Licking,
    Sneezing,
    WateryEyes,
    EarInfection,
    HairLoss,
    Hives,
    Vomiting,
    Diarrhea,
    Other,
}

impl Category for SymptomCategory {
    fn all() -> &'static [SymptomCategory] {
        &[
            SymptomCategory::Itching,
            SymptomCategory::Redness,
            SymptomCategory::Licking,
            SymptomCategory::Sneezing,
            SymptomCategory::WateryEyes,
            SymptomCategory::EarInfection,
            SymptomCategory::HairLoss,
            SymptomCategory::Hives,
            SymptomCategory::Vomiting,
            SymptomCategory::Diarrhea,
            SymptomCategory::Other,
        ]
    }

    fn key(&self) -> &'static str {
        match self {
            SymptomCategory::Itching => "itching",
            SymptomCategory::Redness => "redness",
            SymptomCategory::Licking => "licking",
            SymptomCategory::Sneezing => "sneezing",
            SymptomCategory::WateryEyes => "watery_eyes",
            SymptomCategory::EarInfection => "ear_infection",
            SymptomCategory::HairLoss => "hair_loss",
            SymptomCategory::Hives => "hives",
            SymptomCategory::Vomiting => "vomiting",
            SymptomCategory::Diarrhea => "diarrhea",
            SymptomCategory::Other => "other",
        }
    }
}

impl fmt::Display for SymptomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SymptomCategory::Itching => "Itching",
            SymptomCategory::Redness => "Redness",
            SymptomCategory::Licking => "Paw Licking",
            SymptomCategory::Sneezing => "Sneezing",
            SymptomCategory::WateryEyes => "Watery Eyes",
            SymptomCategory::EarInfection => "Ear Infection",
            SymptomCategory::HairLoss => "Hair Loss",
            SymptomCategory::Hives => "Hives",
            SymptomCategory::Vomiting => "Vomiting",
            SymptomCategory::Diarrhea => "Diarrhea",
            SymptomCategory::Other => "Other",
        };
        f.write_str(label)
    }
}

impl FromStr for SymptomCategory {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "itching" | "scratching" => Ok(SymptomCategory::Itching),
            "redness" | "rash" => Ok(SymptomCategory::Redness),
            "licking" | "paw_licking" => Ok(SymptomCategory::Licking),
            "sneezing" => Ok(SymptomCategory::Sneezing),
            "watery_eyes" => Ok(SymptomCategory::WateryEyes),
            "ear_infection" => Ok(SymptomCategory::EarInfection),
            "hair_loss" => Ok(SymptomCategory::HairLoss),
            "hives" => Ok(SymptomCategory::Hives),
            "vomiting" => Ok(SymptomCategory::Vomiting),
            "diarrhea" | "diarrhoea" => Ok(SymptomCategory::Diarrhea),
            "other" => Ok(SymptomCategory::Other),
            _ => Err(EventError::UnknownSymptom(s.trim().to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for SymptomCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Lower-case and fold separators so "Walk Location", "walk-location" and
/// "walk_location" all compare equal
fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Symptom severity on a 1-5 scale
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const MIN: Severity = Severity(1);
    pub const MAX: Severity = Severity(5);

    pub fn new(value: u8) -> Result<Self, EventError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(EventError::SeverityOutOfRange(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// All levels, mildest first
    pub fn levels() -> impl Iterator<Item = Severity> {
        (Self::MIN.0..=Self::MAX.0).map(Severity)
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "mild",
            2 => "noticeable",
            3 => "moderate",
            4 => "severe",
            _ => "extreme",
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = EventError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Severity::new(value)
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> u8 {
        severity.0
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

/// Raw trigger tag as it appears in a symptom log
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTag {
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Deserialize a symptom's trigger list, dropping entries that are not a
/// recognizable trigger and collapsing duplicates
pub(crate) fn deserialize_trigger_tags<'de, D>(
    deserializer: D,
) -> Result<Vec<TriggerCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<RawTag>> = Option::deserialize(deserializer)?;
    let mut tags = Vec::new();

    for tag in raw.into_iter().flatten() {
        match tag {
            RawTag::Text(text) => match text.parse::<TriggerCategory>() {
                Ok(category) => {
                    if !tags.contains(&category) {
                        tags.push(category);
                    }
                }
                Err(_) => tracing::debug!(tag = %text, "Dropping unrecognized trigger tag"),
            },
            RawTag::Other(_) => tracing::debug!("Dropping non-text trigger tag"),
        }
    }

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_parsing_accepts_label_forms() {
        assert_eq!(
            "Walk Location".parse::<TriggerCategory>().unwrap(),
            TriggerCategory::WalkLocation
        );
        assert_eq!(
            "walk-location".parse::<TriggerCategory>().unwrap(),
            TriggerCategory::WalkLocation
        );
        assert_eq!(
            "HOUSEHOLD_PRODUCT".parse::<TriggerCategory>().unwrap(),
            TriggerCategory::HouseholdProduct
        );
        assert!(matches!(
            "lava".parse::<TriggerCategory>(),
            Err(EventError::UnknownTrigger(s)) if s == "lava"
        ));
    }

    #[test]
    fn test_display_and_key_round_trip() {
        for category in TriggerCategory::all() {
            assert_eq!(category.key().parse::<TriggerCategory>().unwrap(), *category);
            assert_eq!(category.to_string().parse::<TriggerCategory>().unwrap(), *category);
        }
        for symptom in SymptomCategory::all() {
            assert_eq!(symptom.key().parse::<SymptomCategory>().unwrap(), *symptom);
        }
    }

    #[test]
    fn test_declaration_order_drives_ord() {
        let all = TriggerCategory::all();
        let mut sorted = all.to_vec();
        sorted.sort();
        assert_eq!(sorted, all);
        assert!(TriggerCategory::Food < TriggerCategory::Unknown);
    }

    #[test]
    fn test_trigger_serializes_snake_case() {
        let json = serde_json::to_string(&TriggerCategory::EnvironmentalChange).unwrap();
        assert_eq!(json, "\"environmental_change\"");

        let parsed: TriggerCategory = serde_json::from_str("\"Pollen\"").unwrap();
        assert_eq!(parsed, TriggerCategory::Pollen);
    }

    #[test]
    fn test_severity_bounds() {
        assert!(Severity::new(0).is_err());
        assert!(Severity::new(6).is_err());
        assert_eq!(Severity::new(3).unwrap().value(), 3);
        assert_eq!(Severity::levels().count(), 5);

        let parsed: Result<Severity, _> = serde_json::from_str("7");
        assert!(parsed.is_err());
        let parsed: Severity = serde_json::from_str("4").unwrap();
        assert_eq!(parsed, Severity::new(4).unwrap());
    }

    #[derive(Deserialize)]
    struct Tagged {
        #[serde(default, deserialize_with = "deserialize_trigger_tags")]
        triggers: Vec<TriggerCategory>,
    }

    #[test]
    fn test_lenient_tags_drop_unknown_and_duplicates() {
        let tagged: Tagged =
            serde_json::from_str(r#"{"triggers": ["food", "moon", 42, null, "Food", "pollen"]}"#)
                .unwrap();
        assert_eq!(
            tagged.triggers,
            vec![TriggerCategory::Food, TriggerCategory::Pollen]
        );

        let tagged: Tagged = serde_json::from_str(r#"{}"#).unwrap();
        assert!(tagged.triggers.is_empty());

        let tagged: Tagged = serde_json::from_str(r#"{"triggers": null}"#).unwrap();
        assert!(tagged.triggers.is_empty());
    }
}
