// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Source/target language codes (§3 `JobDescriptor.source_language` /
//! `target_language`).
//!
//! Unknown ISO 639-1 codes are tolerated here, treated as an ML layer
//! concern rather than a validation failure (§4.4), but the reserved
//! tokens `auto` and `none` are recognized and validated structurally.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// ISO 639-1 codes of languages this orchestrator recognizes as Indic for
/// the `translate` workflow's source-language constraint (§4.6, §7
/// item 7). Not exhaustive of all Indic languages; it is the set the
/// translate stage is specified against.
const INDIC_LANGUAGE_CODES: &[&str] = &[
    "hi", "bn", "ta", "te", "mr", "gu", "pa", "ur", "kn", "ml", "or", "as", "ne", "sa", "sd",
];

/// A language selector: either a concrete ISO 639-1 code, or the sentinel
/// `auto` (source only) / `none` (target only, meaning "no translation").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    Auto,
    None,
    Code(String),
}

impl Language {
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Code(c) => Some(c),
            _ => None,
        }
    }

    /// Whether this is a concrete code in the Indic set used by the
    /// `translate` workflow's source-language constraint.
    pub fn is_indic(&self) -> bool {
        matches!(self, Self::Code(c) if INDIC_LANGUAGE_CODES.contains(&c.as_str()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::None => write!(f, "none"),
            Self::Code(c) => write!(f, "{c}"),
        }
    }
}

impl FromStr for Language {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "" => Err(PipelineError::invalid_descriptor(
                "language code must not be empty",
            )),
            other => {
                // ISO 639-1 codes are two lowercase ASCII letters; tolerate
                // anything else per §4.4 ("unknown language codes are
                // tolerated, ML layer concern") but still reject obvious
                // garbage like whitespace or uppercase.
                if other.chars().all(|c| c.is_ascii_lowercase()) {
                    Ok(Self::Code(other.to_string()))
                } else {
                    Err(PipelineError::invalid_descriptor(format!(
                        "malformed language code '{other}'"
                    )))
                }
            }
        }
    }
}

impl TryFrom<String> for Language {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(value: Language) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_sentinels() {
        assert_eq!("auto".parse::<Language>().unwrap(), Language::Auto);
        assert_eq!("none".parse::<Language>().unwrap(), Language::None);
    }

    #[test]
    fn unknown_codes_are_tolerated() {
        let lang: Language = "zz".parse().unwrap();
        assert_eq!(lang.code(), Some("zz"));
        assert!(!lang.is_indic());
    }

    #[test]
    fn hindi_is_indic() {
        let lang: Language = "hi".parse().unwrap();
        assert!(lang.is_indic());
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!("EN".parse::<Language>().is_err());
        assert!(" ".parse::<Language>().is_err());
    }
}
