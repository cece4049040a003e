//! # Dialect Catalogue
//!
//! The fixed, ordered catalogue of JSON Schema dialects, newest first:
//!
//! ```text
//! 2020-12 > 2019-09 > draft-07 > draft-06 > draft-04 > draft-03 (inactive) > unversioned (inactive)
//! ```
//!
//! A document's dialect is decided by the first catalogue entry whose
//! pattern is a substring of its `$schema` value. The patterns are
//! mutually exclusive, so the result never depends on scan order.
//! Inactive entries are counted by the census but never targeted by the
//! downgrade prober.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

/// One JSON Schema specification version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Dialect {
    /// `https://json-schema.org/draft/2020-12/schema`
    Draft2020_12,
    /// `https://json-schema.org/draft/2019-09/schema`
    Draft2019_09,
    /// `http://json-schema.org/draft-07/schema#`
    Draft07,
    /// `http://json-schema.org/draft-06/schema#`
    Draft06,
    /// `http://json-schema.org/draft-04/schema#`
    Draft04,
    /// `http://json-schema.org/draft-03/schema#`
    Draft03,
    /// `http://json-schema.org/schema#`
    Unversioned,
}

impl Dialect {
    /// All dialects, newest to oldest. The index is the ordinal.
    pub const CATALOGUE: [Dialect; 7] = [
        Dialect::Draft2020_12,
        Dialect::Draft2019_09,
        Dialect::Draft07,
        Dialect::Draft06,
        Dialect::Draft04,
        Dialect::Draft03,
        Dialect::Unversioned,
    ];

    /// Symbolic name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Draft2020_12 => "2020-12",
            Dialect::Draft2019_09 => "2019-09",
            Dialect::Draft07 => "draft-07",
            Dialect::Draft06 => "draft-06",
            Dialect::Draft04 => "draft-04",
            Dialect::Draft03 => "draft-03",
            Dialect::Unversioned => "draft without version",
        }
    }

    /// Substring matched against a `$schema` value.
    pub fn pattern(self) -> &'static str {
        match self {
            Dialect::Draft2020_12 => "json-schema.org/draft/2020-12/schema",
            Dialect::Draft2019_09 => "json-schema.org/draft/2019-09/schema",
            Dialect::Draft07 => "json-schema.org/draft-07/schema",
            Dialect::Draft06 => "json-schema.org/draft-06/schema",
            Dialect::Draft04 => "json-schema.org/draft-04/schema",
            Dialect::Draft03 => "json-schema.org/draft-03/schema",
            Dialect::Unversioned => "json-schema.org/schema",
        }
    }

    /// The `$schema` value written when a document is retargeted.
    pub fn canonical_uri(self) -> &'static str {
        match self {
            Dialect::Draft2020_12 => "https://json-schema.org/draft/2020-12/schema",
            Dialect::Draft2019_09 => "https://json-schema.org/draft/2019-09/schema",
            Dialect::Draft07 => "http://json-schema.org/draft-07/schema#",
            Dialect::Draft06 => "http://json-schema.org/draft-06/schema#",
            Dialect::Draft04 => "http://json-schema.org/draft-04/schema#",
            Dialect::Draft03 => "http://json-schema.org/draft-03/schema#",
            Dialect::Unversioned => "http://json-schema.org/schema#",
        }
    }

    /// Whether the prober may target this dialect.
    pub fn is_active(self) -> bool {
        !matches!(self, Dialect::Draft03 | Dialect::Unversioned)
    }

    /// Position in [`Dialect::CATALOGUE`]; 0 is the newest.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Inverse of [`Dialect::ordinal`].
    pub fn from_ordinal(ordinal: usize) -> Option<Dialect> {
        Self::CATALOGUE.get(ordinal).copied()
    }

    /// The next older catalogue entry, if any.
    pub fn older(self) -> Option<Dialect> {
        Self::from_ordinal(self.ordinal() + 1)
    }

    /// Classify a `$schema` URI string.
    pub fn classify_uri(uri: &str) -> Option<Dialect> {
        Self::CATALOGUE
            .into_iter()
            .find(|d| uri.contains(d.pattern()))
    }

    /// Classify a schema document by its `$schema` keyword.
    ///
    /// Returns `None` when the document is not an object, has no
    /// `$schema`, the value is not a string, or no entry matches.
    pub fn classify(document: &Value) -> Option<Dialect> {
        document
            .get("$schema")
            .and_then(Value::as_str)
            .and_then(Self::classify_uri)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::CATALOGUE
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| format!("unknown dialect '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn catalogue_is_ordered_by_ordinal() {
        for (i, d) in Dialect::CATALOGUE.iter().enumerate() {
            assert_eq!(d.ordinal(), i);
            assert_eq!(Dialect::from_ordinal(i), Some(*d));
        }
        assert_eq!(Dialect::from_ordinal(7), None);
    }

    #[test]
    fn patterns_are_mutually_exclusive() {
        for a in Dialect::CATALOGUE {
            for b in Dialect::CATALOGUE {
                if a != b {
                    assert!(
                        !a.pattern().contains(b.pattern()),
                        "{a} pattern shadows {b}"
                    );
                }
            }
        }
    }

    #[test]
    fn canonical_uri_classifies_to_itself() {
        for d in Dialect::CATALOGUE {
            assert_eq!(Dialect::classify_uri(d.canonical_uri()), Some(d));
        }
    }

    #[test]
    fn classify_known_uris() {
        assert_eq!(
            Dialect::classify(&json!({"$schema": "http://json-schema.org/draft-07/schema#"})),
            Some(Dialect::Draft07)
        );
        assert_eq!(
            Dialect::classify(&json!({"$schema": "https://json-schema.org/draft/2020-12/schema"})),
            Some(Dialect::Draft2020_12)
        );
        assert_eq!(
            Dialect::classify(&json!({"$schema": "http://json-schema.org/schema#"})),
            Some(Dialect::Unversioned)
        );
    }

    #[test]
    fn classify_absent_cases() {
        assert_eq!(Dialect::classify(&json!({"type": "object"})), None);
        assert_eq!(Dialect::classify(&json!({"$schema": 7})), None);
        assert_eq!(
            Dialect::classify(&json!({"$schema": "https://example.com/meta"})),
            None
        );
        assert_eq!(Dialect::classify(&json!(true)), None);
    }

    #[test]
    fn older_walks_to_the_end() {
        assert_eq!(Dialect::Draft2020_12.older(), Some(Dialect::Draft2019_09));
        assert_eq!(Dialect::Draft06.older(), Some(Dialect::Draft04));
        assert_eq!(Dialect::Unversioned.older(), None);
        assert!(Dialect::Draft04.is_active());
        assert!(!Dialect::Draft03.is_active());
    }

    #[test]
    fn parse_from_name() {
        assert_eq!("draft-07".parse::<Dialect>(), Ok(Dialect::Draft07));
        assert!("draft-99".parse::<Dialect>().is_err());
    }

    proptest! {
        #[test]
        fn classify_is_pure(prefix in "[a-z:/.]{0,12}", idx in 0usize..7, suffix in "[#a-z]{0,4}") {
            let dialect = Dialect::CATALOGUE[idx];
            let uri = format!("{prefix}{}{suffix}", dialect.pattern());
            let doc = json!({ "$schema": uri });
            let first = Dialect::classify(&doc);
            prop_assert_eq!(first, Dialect::classify(&doc));
            prop_assert!(first.is_some());
        }
    }
}
