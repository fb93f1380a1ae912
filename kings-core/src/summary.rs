//! Structured chapter summary types.
//!
//! These are the wire schema for the summarization collaborator and the
//! on-disk format of the summary cache. The doc comment on each field is
//! carried into the JSON schema sent with the request, so the field
//! documentation doubles as the model's instructions.

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

/// One mention of a character or place within a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntityMention {
    /// The name of the character or place, in Hebrew.
    pub name: String,
    /// A one or two line description of the character or place.
    pub description: String,
}

/// The structured summary of one chapter.
///
/// Produced once per chapter by the summarization collaborator, validated
/// against the schema, then immutable. The `chapter` label is stable and
/// unique per chapter key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChapterSummary {
    /// The book and chapter number in Hebrew, e.g. מלכים ב פרק א.
    pub chapter: String,
    /// A 100 word synopsis of the chapter, in Hebrew.
    pub synopsis: String,
    /// ALL characters mentioned in the chapter.
    pub characters: Vec<EntityMention>,
    /// Places mentioned in the chapter.
    pub places: Vec<EntityMention>,
}

/// The JSON schema the collaborator's response must conform to.
///
/// Derived from the types above, with `$ref`s inlined so the schema is
/// self-contained (the generation API does not resolve references).
pub fn response_schema() -> serde_json::Value {
    let schema = schema_for!(ChapterSummary);
    let mut value = serde_json::to_value(schema).unwrap_or_default();

    inline_refs(&mut value);

    if let serde_json::Value::Object(map) = &mut value {
        map.remove("definitions");
        map.remove("$schema");
    }

    value
}

fn inline_refs(value: &mut serde_json::Value) {
    let definitions = if let serde_json::Value::Object(map) = value {
        map.get("definitions").cloned()
    } else {
        None
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut serde_json::Value, definitions: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(name) = ref_path.strip_prefix("#/definitions/") {
                    if let Some(def) = definitions.get(name) {
                        *value = def.clone();
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            if let Some(serde_json::Value::Array(all_of)) = map.get("allOf").cloned() {
                if all_of.len() == 1 {
                    *value = all_of.into_iter().next().unwrap();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_round_trips_preserving_hebrew() {
        let summary = ChapterSummary {
            chapter: "מלכים א פרק א".to_string(),
            synopsis: "דוד המלך זקן".to_string(),
            characters: vec![EntityMention {
                name: "דוד".to_string(),
                description: "מלך ישראל".to_string(),
            }],
            places: vec![],
        };

        let json = serde_json::to_string_pretty(&summary).unwrap();
        // Non-ASCII must be preserved, not escaped.
        assert!(json.contains("מלכים א פרק א"));

        let parsed: ChapterSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
    }

    #[test]
    fn test_missing_field_fails_validation() {
        let malformed = r#"{"chapter": "מלכים א פרק א", "synopsis": "..."}"#;
        assert!(serde_json::from_str::<ChapterSummary>(malformed).is_err());
    }

    #[test]
    fn test_response_schema_is_self_contained() {
        let schema = response_schema();
        let obj = schema.as_object().unwrap();

        assert!(!obj.contains_key("definitions"));
        assert!(!obj.contains_key("$schema"));

        let schema_str = serde_json::to_string(&schema).unwrap();
        assert!(!schema_str.contains("$ref"));
    }

    #[test]
    fn test_response_schema_shape() {
        let schema = response_schema();
        let properties = schema["properties"].as_object().unwrap();

        assert!(properties.contains_key("chapter"));
        assert!(properties.contains_key("synopsis"));
        assert_eq!(properties["characters"]["type"], "array");
        assert_eq!(
            properties["characters"]["items"]["properties"]["name"]["type"],
            "string"
        );

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"chapter"));
        assert!(required.contains(&"characters"));
        assert!(required.contains(&"places"));
    }
}
