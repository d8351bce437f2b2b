//! Particles and occurrence bounds
//!
//! Particles define occurrence constraints (minOccurs, maxOccurs) and the
//! `sequence` / `choice` / `all` model groups that hold child declarations.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#p

use super::types::ElementDecl;
use serde::{Serialize, Serializer};

/// Occurrence bounds for a particle (minOccurs, maxOccurs)
/// None for max_occurs means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurs {
    /// Minimum number of occurrences (default 1)
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded, default 1)
    #[serde(serialize_with = "serialize_max")]
    pub max: Option<u32>,
}

fn serialize_max<S: Serializer>(max: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
    match max {
        Some(n) => serializer.serialize_u32(*n),
        None => serializer.serialize_str("unbounded"),
    }
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Default occurrence (1, 1)
    pub fn once() -> Self {
        Self { min: 1, max: Some(1) }
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self { min: 0, max: Some(1) }
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// Check if this particle can be empty (minOccurs == 0)
    pub fn is_emptiable(&self) -> bool {
        self.min == 0
    }

    /// Check if this particle is empty (maxOccurs == 0)
    pub fn is_empty(&self) -> bool {
        self.max == Some(0)
    }

    /// Check if particle has maxOccurs == 1
    pub fn is_single(&self) -> bool {
        self.max == Some(1)
    }

    /// Check if particle can have multiple occurrences
    pub fn is_multiple(&self) -> bool {
        !self.is_empty() && !self.is_single()
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

/// Parse minOccurs/maxOccurs from XML attribute values.
///
/// Parsing is best effort: a malformed bound falls back to its default
/// rather than failing the schema.
pub fn parse_occurs(min_occurs: Option<&str>, max_occurs: Option<&str>) -> Occurs {
    let min = min_occurs
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(1);

    let max = match max_occurs.map(str::trim) {
        Some("unbounded") => None,
        Some(s) => s.parse::<u32>().ok().or(Some(1)),
        None => Some(1),
    };

    Occurs::new(min, max)
}

/// Model group compositor type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelType {
    /// Ordered sequence of particles
    #[default]
    Sequence,
    /// One of multiple alternatives
    Choice,
    /// Unordered set of particles
    All,
}

impl ModelType {
    /// Parse from element local name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sequence" => Some(Self::Sequence),
            "choice" => Some(Self::Choice),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// One entry of a model group
#[derive(Debug, Clone, PartialEq)]
pub enum Particle {
    /// A local element declaration or element reference
    Element(ElementDecl),
    /// A nested `sequence` / `choice` / `all`
    Group(ModelGroup),
}

/// A `sequence`, `choice` or `all` group with its ordered particles
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGroup {
    /// Compositor
    pub model: ModelType,
    /// Occurrence bounds of the group itself
    pub occurs: Occurs,
    /// Particles in declaration order
    pub particles: Vec<Particle>,
}

impl ModelGroup {
    /// Create an empty group
    pub fn new(model: ModelType) -> Self {
        Self {
            model,
            occurs: Occurs::once(),
            particles: Vec::new(),
        }
    }

    /// Whether this group is a choice
    pub fn is_choice(&self) -> bool {
        self.model == ModelType::Choice
    }

    /// Element declarations directly under this group
    pub fn elements(&self) -> impl Iterator<Item = &ElementDecl> {
        self.particles.iter().filter_map(|p| match p {
            Particle::Element(decl) => Some(decl),
            Particle::Group(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occurs_defaults() {
        let occurs = Occurs::default();
        assert_eq!(occurs.min, 1);
        assert_eq!(occurs.max, Some(1));
        assert!(occurs.is_single());
        assert!(!occurs.is_multiple());
    }

    #[test]
    fn test_occurs_predicates() {
        assert!(Occurs::optional().is_emptiable());
        assert!(Occurs::zero_or_more().is_multiple());
        assert!(Occurs::new(0, Some(0)).is_empty());
        assert!(Occurs::new(1, Some(5)).is_multiple());
    }

    #[test]
    fn test_parse_occurs() {
        assert_eq!(parse_occurs(None, None), Occurs::once());
        assert_eq!(parse_occurs(Some("0"), Some("unbounded")), Occurs::zero_or_more());
        assert_eq!(parse_occurs(Some("2"), Some("5")), Occurs::new(2, Some(5)));
    }

    #[test]
    fn test_parse_occurs_is_lenient() {
        assert_eq!(parse_occurs(Some("many"), Some("lots")), Occurs::once());
    }

    #[test]
    fn test_occurs_serializes_unbounded() {
        let json = serde_json::to_value(Occurs::zero_or_more()).unwrap();
        assert_eq!(json["min"], 0);
        assert_eq!(json["max"], "unbounded");
    }

    #[test]
    fn test_model_type_from_tag() {
        assert_eq!(ModelType::from_tag("sequence"), Some(ModelType::Sequence));
        assert_eq!(ModelType::from_tag("choice"), Some(ModelType::Choice));
        assert_eq!(ModelType::from_tag("all"), Some(ModelType::All));
        assert_eq!(ModelType::from_tag("group"), None);
    }
}
