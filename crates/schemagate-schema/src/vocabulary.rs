//! # Keyword Vocabularies
//!
//! Strict mode rejects any keyword the engine family does not define and
//! any `format` the dialect does not know, unless the schema's quirks
//! list it. The `jsonschema` engine silently ignores unknown keywords,
//! so this pass is what makes a downgraded schema fail when it relies on
//! keywords introduced after the target dialect.
//!
//! Only schema positions are walked: the values of `properties`,
//! `definitions` and friends, the items of `allOf` and friends, and the
//! single-schema keywords. Data positions (`enum`, `const`, `default`,
//! `examples`) are never inspected.

use serde_json::{Map, Value};

use schemagate_core::Dialect;

use crate::dispatch::{CompileError, EngineFamily, Quirks};

/// Annotation and container keywords accepted by every family.
const COMMON_KEYWORDS: &[&str] = &[
    "$comment", "$defs", "examples", "readOnly", "writeOnly", "deprecated",
];

const DRAFT04_KEYWORDS: &[&str] = &[
    "$schema", "id", "$ref", "title", "description", "default", "format",
    "type", "enum", "multipleOf", "maximum", "exclusiveMaximum", "minimum",
    "exclusiveMinimum", "maxLength", "minLength", "pattern", "items",
    "additionalItems", "maxItems", "minItems", "uniqueItems", "maxProperties",
    "minProperties", "required", "properties", "patternProperties",
    "additionalProperties", "dependencies", "allOf", "anyOf", "oneOf", "not",
    "definitions",
];

const DRAFT07_KEYWORDS: &[&str] = &[
    "$schema", "$id", "$ref", "$comment", "title", "description", "default",
    "examples", "readOnly", "writeOnly", "format", "contentMediaType",
    "contentEncoding", "type", "enum", "const", "multipleOf", "maximum",
    "exclusiveMaximum", "minimum", "exclusiveMinimum", "maxLength",
    "minLength", "pattern", "items", "additionalItems", "contains",
    "maxItems", "minItems", "uniqueItems", "maxProperties", "minProperties",
    "required", "properties", "patternProperties", "additionalProperties",
    "propertyNames", "dependencies", "if", "then", "else", "allOf", "anyOf",
    "oneOf", "not", "definitions",
];

const DRAFT2019_KEYWORDS: &[&str] = &[
    "$schema", "$id", "$ref", "$anchor", "$recursiveRef", "$recursiveAnchor",
    "$vocabulary", "$comment", "$defs", "definitions", "title",
    "description", "default", "deprecated", "examples", "readOnly",
    "writeOnly", "format", "contentMediaType", "contentEncoding",
    "contentSchema", "type", "enum", "const", "multipleOf", "maximum",
    "exclusiveMaximum", "minimum", "exclusiveMinimum", "maxLength",
    "minLength", "pattern", "items", "additionalItems", "contains",
    "maxContains", "minContains", "maxItems", "minItems", "uniqueItems",
    "unevaluatedItems", "maxProperties", "minProperties", "required",
    "dependentRequired", "properties", "patternProperties",
    "additionalProperties", "propertyNames", "unevaluatedProperties",
    "dependentSchemas", "dependencies", "if", "then", "else", "allOf",
    "anyOf", "oneOf", "not",
];

const DRAFT2020_KEYWORDS: &[&str] = &[
    "$schema", "$id", "$ref", "$anchor", "$dynamicRef", "$dynamicAnchor",
    "$vocabulary", "$comment", "$defs", "definitions", "title",
    "description", "default", "deprecated", "examples", "readOnly",
    "writeOnly", "format", "contentMediaType", "contentEncoding",
    "contentSchema", "type", "enum", "const", "multipleOf", "maximum",
    "exclusiveMaximum", "minimum", "exclusiveMinimum", "maxLength",
    "minLength", "pattern", "prefixItems", "items", "contains",
    "maxContains", "minContains", "maxItems", "minItems", "uniqueItems",
    "unevaluatedItems", "maxProperties", "minProperties", "required",
    "dependentRequired", "properties", "patternProperties",
    "additionalProperties", "propertyNames", "unevaluatedProperties",
    "dependentSchemas", "dependencies", "if", "then", "else", "allOf",
    "anyOf", "oneOf", "not",
];

const BASE_FORMATS: &[&str] = &[
    "date", "time", "date-time", "duration", "uri", "uri-reference",
    "uri-template", "url", "email", "hostname", "ipv4", "ipv6", "regex",
    "uuid", "json-pointer", "json-pointer-uri-fragment",
    "relative-json-pointer", "byte", "int32", "int64", "float", "double",
    "password", "binary",
];

/// Internationalised formats, known from draft-07 on.
const INTERNATIONAL_FORMATS: &[&str] = &["idn-email", "idn-hostname", "iri", "iri-reference"];

/// Keywords whose value is a single subschema.
const SINGLE: &[&str] = &[
    "additionalItems", "additionalProperties", "not", "contains",
    "propertyNames", "if", "then", "else", "unevaluatedItems",
    "unevaluatedProperties", "contentSchema",
];

/// Keywords whose value is an array of subschemas.
const ARRAY: &[&str] = &["allOf", "anyOf", "oneOf", "prefixItems"];

/// Keywords whose value maps names to subschemas.
const MAP: &[&str] = &[
    "properties", "patternProperties", "definitions", "$defs",
    "dependentSchemas", "dependencies",
];

/// Keywords and formats accepted for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    family: EngineFamily,
    keywords: &'static [&'static str],
    international_formats: bool,
}

impl Vocabulary {
    /// The vocabulary of the engine family serving `dialect`.
    pub fn for_dialect(dialect: Option<Dialect>) -> Self {
        let family = EngineFamily::for_dialect(dialect);
        let keywords = match family {
            EngineFamily::Draft04 => DRAFT04_KEYWORDS,
            EngineFamily::Draft06And07 => DRAFT07_KEYWORDS,
            EngineFamily::Draft201909 => DRAFT2019_KEYWORDS,
            EngineFamily::Draft202012 => DRAFT2020_KEYWORDS,
        };
        let international_formats = matches!(
            dialect,
            Some(Dialect::Draft07 | Dialect::Draft2019_09 | Dialect::Draft2020_12)
        );
        Self {
            family,
            keywords,
            international_formats,
        }
    }

    /// Whether `keyword` is defined by this family.
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains(&keyword) || COMMON_KEYWORDS.contains(&keyword)
    }

    /// Whether `format` is a built-in format for this dialect.
    pub fn has_format(&self, format: &str) -> bool {
        BASE_FORMATS.contains(&format)
            || (self.international_formats && INTERNATIONAL_FORMATS.contains(&format))
    }

    /// Walk `schema` and reject the first unknown keyword or format.
    pub fn check(&self, schema: &Value, quirks: &Quirks) -> Result<(), CompileError> {
        self.walk(schema, "", quirks)
    }

    fn walk(&self, node: &Value, pointer: &str, quirks: &Quirks) -> Result<(), CompileError> {
        let Value::Object(map) = node else {
            return Ok(());
        };
        for (keyword, value) in map {
            if quirks.ignored_keywords.contains(keyword) {
                continue;
            }
            if !self.has_keyword(keyword) {
                return Err(CompileError::UnknownKeyword {
                    keyword: keyword.clone(),
                    pointer: display_pointer(pointer),
                    family: self.family,
                });
            }
            let here = format!("{pointer}/{}", escape(keyword));
            self.descend(keyword, value, &here, quirks)?;
        }
        self.check_format(map, pointer, quirks)
    }

    fn descend(
        &self,
        keyword: &str,
        value: &Value,
        pointer: &str,
        quirks: &Quirks,
    ) -> Result<(), CompileError> {
        if SINGLE.contains(&keyword) {
            return self.walk(value, pointer, quirks);
        }
        if keyword == "items" {
            return match value {
                Value::Array(items) => self.walk_array(items, pointer, quirks),
                other => self.walk(other, pointer, quirks),
            };
        }
        if ARRAY.contains(&keyword) {
            if let Value::Array(items) = value {
                return self.walk_array(items, pointer, quirks);
            }
        }
        if MAP.contains(&keyword) {
            if let Value::Object(entries) = value {
                for (name, sub) in entries {
                    // `dependencies` may map to a property list instead of a schema.
                    if sub.is_array() {
                        continue;
                    }
                    self.walk(sub, &format!("{pointer}/{}", escape(name)), quirks)?;
                }
            }
        }
        Ok(())
    }

    fn walk_array(&self, items: &[Value], pointer: &str, quirks: &Quirks) -> Result<(), CompileError> {
        for (i, item) in items.iter().enumerate() {
            self.walk(item, &format!("{pointer}/{i}"), quirks)?;
        }
        Ok(())
    }

    fn check_format(
        &self,
        map: &Map<String, Value>,
        pointer: &str,
        quirks: &Quirks,
    ) -> Result<(), CompileError> {
        let Some(format) = map.get("format").and_then(Value::as_str) else {
            return Ok(());
        };
        if self.has_format(format) || quirks.permitted_formats.contains(format) {
            return Ok(());
        }
        Err(CompileError::UnknownFormat {
            format: format.to_string(),
            pointer: display_pointer(pointer),
            family: self.family,
        })
    }
}

fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn display_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "#".to_string()
    } else {
        format!("#{pointer}")
    }
}
