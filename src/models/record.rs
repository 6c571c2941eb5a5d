use chrono::{DateTime, Local, TimeZone};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Human-readable completion time, e.g. "February 14, 2019 at 5:46 PM".
pub const TIMESTAMP_FORMAT: &str = "%B %-d, %Y at %-I:%M %p";

/// A single concept as returned by the classifier: raw name, 0-1 confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Concept {
    pub name: String,
    pub value: f64,
}

impl Concept {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A display label: title-cased concept name and confidence on a 0-100 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub name: String,
    pub confidence: f64,
}

/// Concept name to confidence mapping that keeps the classifier's rank order.
///
/// Serializes as a flat JSON object whose key order is the rank order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelSet(Vec<Label>);

impl LabelSet {
    /// Build the stored label mapping from raw classifier output.
    ///
    /// Keeps at most `max` concepts in service order, title-cases each name and
    /// rescales the confidence to 0-100 rounded to two decimals.
    pub fn from_concepts(concepts: &[Concept], max: usize) -> Self {
        let mut labels = Self::default();
        for concept in concepts.iter().take(max) {
            labels.insert(title_case(&concept.name), round2(concept.value * 100.0));
        }
        labels
    }

    /// Insert a label. A repeated name keeps its position and takes the new score.
    pub fn insert(&mut self, name: String, confidence: f64) {
        match self.0.iter_mut().find(|l| l.name == name) {
            Some(existing) => existing.confidence = confidence,
            None => self.0.push(Label { name, confidence }),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|l| l.name == name).map(|l| l.confidence)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for LabelSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for label in &self.0 {
            map.serialize_entry(&label.name, &label.confidence)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LabelSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabelSetVisitor;

        impl<'de> Visitor<'de> for LabelSetVisitor {
            type Value = LabelSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of concept names to confidence scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<LabelSet, A::Error> {
                let mut labels = LabelSet::default();
                while let Some((name, confidence)) = access.next_entry::<String, f64>()? {
                    labels.insert(name, confidence);
                }
                Ok(labels)
            }
        }

        deserializer.deserialize_map(LabelSetVisitor)
    }
}

/// The completed, immutable outcome of one job.
///
/// Field names on the wire match the cache file layout:
/// `filename, before, after, labels, exif, timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub filename: String,
    #[serde(rename = "before")]
    pub source_url: String,
    #[serde(rename = "after")]
    pub enhanced_url: String,
    pub labels: LabelSet,
    #[serde(rename = "exif")]
    pub metadata: BTreeMap<String, String>,
    pub timestamp: String,
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Round to two decimals from the exact binary value, as decimal formatting does.
fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Completion timestamp in server local time.
pub fn timestamp_now() -> String {
    format_timestamp(&Local::now())
}
