//! Recovered conditions reported alongside results
//!
//! None of these stop the pipeline. They are logged through `tracing` when
//! raised and collected so the caller can show what needs manual review.

use serde::Serialize;
use std::fmt;

/// A recovered, non-fatal condition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Notice {
    /// A sample document could not be parsed, even with the brace fallback
    SampleParse {
        /// Which sample failed
        source: String,
        /// Parser message
        reason: String,
    },
    /// The service descriptor is missing or unparsable
    DescriptorParse {
        /// Which descriptor failed
        source: String,
        /// Parser message
        reason: String,
    },
    /// An element references a type that is neither in the schema nor builtin
    UnresolvedType {
        /// Element carrying the reference
        element: String,
        /// The reference as written
        type_name: String,
    },
    /// A complex type re-entered itself; the branch was cut
    CycleDetected {
        /// The re-entered type
        type_name: String,
        /// Element name in effect when the cycle was found
        element: String,
    },
    /// complexContent derives from an XSD builtin; rendered as simple content
    BuiltinComplexBase {
        /// The deriving type (or element hint for anonymous types)
        type_name: String,
        /// The builtin base as written
        base: String,
    },
    /// A placeholder token survived finalization
    UnmappedPlaceholder {
        /// Placeholder name without the template prefix
        placeholder: String,
    },
}

impl Notice {
    /// Stable label for this notice
    pub fn kind(&self) -> &'static str {
        match self {
            Notice::SampleParse { .. } => "sample-parse",
            Notice::DescriptorParse { .. } => "descriptor-parse",
            Notice::UnresolvedType { .. } => "unresolved-type",
            Notice::CycleDetected { .. } => "cycle-detected",
            Notice::BuiltinComplexBase { .. } => "builtin-complex-base",
            Notice::UnmappedPlaceholder { .. } => "unmapped-placeholder",
        }
    }

    /// Whether this notice is a warning about an input rather than information
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Notice::SampleParse { .. } | Notice::DescriptorParse { .. }
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SampleParse { source, reason } => {
                write!(f, "sample '{}' skipped: {}", source, reason)
            }
            Notice::DescriptorParse { source, reason } => {
                write!(f, "descriptor '{}' ignored: {}", source, reason)
            }
            Notice::UnresolvedType { element, type_name } => write!(
                f,
                "element '{}' references unknown type '{}', rendered as a leaf",
                element, type_name
            ),
            Notice::CycleDetected { type_name, element } => write!(
                f,
                "type '{}' is recursive (reached again under '{}'), branch cut",
                type_name, element
            ),
            Notice::BuiltinComplexBase { type_name, base } => write!(
                f,
                "complexContent of '{}' derives from builtin '{}', rendered as simple content",
                type_name, base
            ),
            Notice::UnmappedPlaceholder { placeholder } => {
                write!(f, "placeholder '{}' has no mapping", placeholder)
            }
        }
    }
}

/// Log a notice at the level matching its kind
pub(crate) fn log_notice(notice: &Notice) {
    if notice.is_warning() {
        tracing::warn!(kind = notice.kind(), "{}", notice);
    } else {
        tracing::debug!(kind = notice.kind(), "{}", notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_kinds() {
        let cycle = Notice::CycleDetected {
            type_name: "A".to_string(),
            element: "a".to_string(),
        };
        assert_eq!(cycle.kind(), "cycle-detected");
        assert!(!cycle.is_warning());

        let sample = Notice::SampleParse {
            source: "s1.txt".to_string(),
            reason: "EOF".to_string(),
        };
        assert!(sample.is_warning());
        assert!(sample.to_string().contains("s1.txt"));
    }

    #[test]
    fn test_notice_serializes_with_kind_tag() {
        let notice = Notice::UnmappedPlaceholder {
            placeholder: "snils".to_string(),
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["kind"], "unmapped-placeholder");
        assert_eq!(json["placeholder"], "snils");
    }
}
