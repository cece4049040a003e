//! # Byte-Level Hygiene
//!
//! Checks that operate on raw file bytes rather than parsed values:
//! byte-order marks (schema files must not carry one) and duplicate
//! object keys (lost silently by a normal JSON parse).

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

/// A byte-order mark signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteOrderMark {
    /// Encoding name used in diagnostics.
    pub encoding: &'static str,
    /// Leading bytes.
    pub signature: &'static [u8],
}

/// Known marks. Longer signatures come first so UTF-32 LE is not
/// reported as UTF-16 LE.
const MARKS: [ByteOrderMark; 5] = [
    ByteOrderMark { encoding: "UTF-8", signature: &[0xEF, 0xBB, 0xBF] },
    ByteOrderMark { encoding: "UTF-32 (BE)", signature: &[0x00, 0x00, 0xFE, 0xFF] },
    ByteOrderMark { encoding: "UTF-32 (LE)", signature: &[0xFF, 0xFE, 0x00, 0x00] },
    ByteOrderMark { encoding: "UTF-16 (BE)", signature: &[0xFE, 0xFF] },
    ByteOrderMark { encoding: "UTF-16 (LE)", signature: &[0xFF, 0xFE] },
];

/// The byte-order mark at the start of `bytes`, if any.
pub fn detect_bom(bytes: &[u8]) -> Option<ByteOrderMark> {
    MARKS.into_iter().find(|mark| bytes.starts_with(mark.signature))
}

/// A key repeated inside one JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    /// The repeated key.
    pub key: String,
    /// How many times it appears in that object.
    pub occurrences: usize,
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (occurrence: {})", self.key, self.occurrences)
    }
}

/// Every duplicated key in a JSON document, innermost objects first.
///
/// A leading UTF-8 BOM is ignored.
pub fn find_duplicate_keys(bytes: &[u8]) -> Result<Vec<DuplicateKey>, serde_json::Error> {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF][..]).unwrap_or(bytes);
    let audit: KeyAudit = serde_json::from_slice(bytes)?;
    Ok(audit.0)
}

struct KeyAudit(Vec<DuplicateKey>);

impl<'de> Deserialize<'de> for KeyAudit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(KeyAuditVisitor)
    }
}

struct KeyAuditVisitor;

impl KeyAuditVisitor {
    fn leaf<E: de::Error>() -> Result<KeyAudit, E> {
        Ok(KeyAudit(Vec::new()))
    }
}

impl<'de> Visitor<'de> for KeyAuditVisitor {
    type Value = KeyAudit;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<KeyAudit, E> {
        Self::leaf()
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<KeyAudit, E> {
        Self::leaf()
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<KeyAudit, E> {
        Self::leaf()
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<KeyAudit, E> {
        Self::leaf()
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<KeyAudit, E> {
        Self::leaf()
    }

    fn visit_unit<E: de::Error>(self) -> Result<KeyAudit, E> {
        Self::leaf()
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<KeyAudit, A::Error> {
        let mut found = Vec::new();
        while let Some(KeyAudit(nested)) = seq.next_element()? {
            found.extend(nested);
        }
        Ok(KeyAudit(found))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<KeyAudit, A::Error> {
        let mut found = Vec::new();
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        while let Some(key) = map.next_key::<String>()? {
            let KeyAudit(nested) = map.next_value()?;
            found.extend(nested);
            *counts.entry(key).or_default() += 1;
        }
        found.extend(
            counts
                .into_iter()
                .filter(|(_, n)| *n > 1)
                .map(|(key, occurrences)| DuplicateKey { key, occurrences }),
        );
        Ok(KeyAudit(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_bom() {
        assert_eq!(detect_bom(b"\xEF\xBB\xBF{}").unwrap().encoding, "UTF-8");
        assert_eq!(detect_bom(b"\xFE\xFF\x00{").unwrap().encoding, "UTF-16 (BE)");
        assert_eq!(detect_bom(b"\xFF\xFE{\x00").unwrap().encoding, "UTF-16 (LE)");
        assert_eq!(detect_bom(b"\x00\x00\xFE\xFF").unwrap().encoding, "UTF-32 (BE)");
        assert_eq!(detect_bom(b"\xFF\xFE\x00\x00").unwrap().encoding, "UTF-32 (LE)");
    }

    #[test]
    fn no_bom_on_plain_json() {
        assert_eq!(detect_bom(b"{\"a\": 1}"), None);
        assert_eq!(detect_bom(b""), None);
        assert_eq!(detect_bom(b"\xEF\xBB"), None);
    }

    #[test]
    fn finds_nested_duplicates() {
        let doc = br#"{"a": 1, "b": {"c": 1, "c": 2, "c": 3}, "a": [ {"d": 0, "d": 0} ]}"#;
        let dups = find_duplicate_keys(doc).unwrap();
        assert_eq!(
            dups,
            vec![
                DuplicateKey { key: "c".into(), occurrences: 3 },
                DuplicateKey { key: "d".into(), occurrences: 2 },
                DuplicateKey { key: "a".into(), occurrences: 2 },
            ]
        );
    }

    #[test]
    fn clean_document_has_no_duplicates() {
        let doc = b"\xEF\xBB\xBF{\"a\": [1, 2, null, true, \"x\", 1.5], \"b\": {}}";
        assert!(find_duplicate_keys(doc).unwrap().is_empty());
    }

    #[test]
    fn same_key_in_sibling_objects_is_fine() {
        let doc = br#"[{"a": 1}, {"a": 2}]"#;
        assert!(find_duplicate_keys(doc).unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(find_duplicate_keys(b"{").is_err());
    }
}
