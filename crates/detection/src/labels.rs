//! Detector vocabulary: class ids, labels, and their classification.

use std::collections::BTreeMap;
use std::fmt;

/// Classification of a detection label.
///
/// The detector has shipped both English and Spanish vocabularies, so both
/// spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DetectionLabel {
    Crack,
    Humidity,
    Person,
    /// Anything outside the known vocabulary, kept verbatim.
    Unrecognized(String),
}

impl DetectionLabel {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "crack" | "grieta" => Self::Crack,
            "humidity" | "humedad" => Self::Humidity,
            "person" | "persona" => Self::Person,
            _ => Self::Unrecognized(label.to_string()),
        }
    }

    /// Whether the label names a bystander rather than something on the wall.
    pub fn is_bystander(&self) -> bool {
        matches!(self, Self::Person)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Crack => "Crack",
            Self::Humidity => "Humidity",
            Self::Person => "Person",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for DetectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps raw model class ids to labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    classes: BTreeMap<i64, String>,
}

impl Default for ClassMap {
    /// The class layout of the deployed detector model.
    fn default() -> Self {
        Self::from_pairs([
            (0, "Person"),
            (1, "Crack"),
            (2, "Humidity"),
            (8, "Person"),
        ])
    }
}

impl ClassMap {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Self {
            classes: pairs.into_iter().map(|(id, l)| (id, l.into())).collect(),
        }
    }

    /// Label for `class_id`, or `Class_<id>` when the id is unknown.
    pub fn label_for(&self, class_id: i64) -> String {
        self.classes
            .get(&class_id)
            .cloned()
            .unwrap_or_else(|| format!("Class_{class_id}"))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_matches_model_layout() {
        let map = ClassMap::default();
        assert_eq!(map.label_for(0), "Person");
        assert_eq!(map.label_for(1), "Crack");
        assert_eq!(map.label_for(2), "Humidity");
        assert_eq!(map.label_for(8), "Person");
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn unknown_class_falls_back_to_class_id() {
        let map = ClassMap::default();
        assert_eq!(map.label_for(5), "Class_5");
        assert_eq!(map.label_for(-1), "Class_-1");
    }

    #[test]
    fn custom_map_replaces_defaults() {
        let map = ClassMap::from_pairs([(0, "Humedad"), (1, "Crack"), (2, "Persona")]);
        assert_eq!(map.label_for(0), "Humedad");
        assert_eq!(map.label_for(8), "Class_8");
    }

    #[test]
    fn labels_parse_in_both_vocabularies() {
        assert_eq!(DetectionLabel::parse("Crack"), DetectionLabel::Crack);
        assert_eq!(DetectionLabel::parse("grieta"), DetectionLabel::Crack);
        assert_eq!(DetectionLabel::parse("HUMEDAD"), DetectionLabel::Humidity);
        assert_eq!(DetectionLabel::parse(" Persona "), DetectionLabel::Person);
        assert_eq!(
            DetectionLabel::parse("Class_5"),
            DetectionLabel::Unrecognized("Class_5".into())
        );
    }

    #[test]
    fn only_people_are_bystanders() {
        assert!(DetectionLabel::parse("Persona").is_bystander());
        assert!(!DetectionLabel::Crack.is_bystander());
        assert!(!DetectionLabel::Humidity.is_bystander());
        assert!(!DetectionLabel::parse("Class_3").is_bystander());
        assert_eq!(DetectionLabel::parse("Class_3").to_string(), "Class_3");
    }
}
