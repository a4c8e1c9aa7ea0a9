use serde_json::Value;

/// A parsed JSON-LD block and the `@type` it declares
#[derive(Debug, Clone)]
pub struct SchemaBlock {
    declared: Value,
}

impl SchemaBlock {
    /// Parses one block; returns `None` when the text is not valid JSON
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(raw) {
            Ok(json) => Some(Self {
                declared: json.get("@type").cloned().unwrap_or(Value::Null),
            }),
            Err(e) => {
                ::log::debug!("Skipping invalid JSON-LD block: {}", e);
                None
            }
        }
    }

    /// True only when the block's `@type` is exactly the string `ty`.
    ///
    /// A block declaring `["FAQPage", "WebPage"]` does not declare `FAQPage`.
    pub fn declares(&self, ty: &str) -> bool {
        self.declared.as_str() == Some(ty)
    }

    /// Declared type tokens, flattened, with empty and non-string entries dropped
    pub fn types(&self) -> Vec<String> {
        let tokens: Vec<&Value> = match &self.declared {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        tokens
            .into_iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Parses every block, silently dropping the ones that are not valid JSON
pub fn parse_blocks<S: AsRef<str>>(raw_blocks: &[S]) -> Vec<SchemaBlock> {
    raw_blocks
        .iter()
        .filter_map(|raw| SchemaBlock::parse(raw.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_type() {
        let block = SchemaBlock::parse(r#"{"@type": "FAQPage"}"#).unwrap();
        assert!(block.declares("FAQPage"));
        assert_eq!(block.types(), vec!["FAQPage"]);
    }

    #[test]
    fn test_array_type_is_flattened_but_not_declared() {
        let block = SchemaBlock::parse(r#"{"@type": ["Article", "", null, 3, "WebPage"]}"#).unwrap();
        assert!(!block.declares("Article"));
        assert_eq!(block.types(), vec!["Article", "WebPage"]);
    }

    #[test]
    fn test_missing_type() {
        let block = SchemaBlock::parse(r#"{"name": "x"}"#).unwrap();
        assert!(block.types().is_empty());

        let top_level_array = SchemaBlock::parse(r#"[{"@type": "Article"}]"#).unwrap();
        assert!(top_level_array.types().is_empty());
    }

    #[test]
    fn test_invalid_blocks_are_skipped() {
        let blocks = parse_blocks(&["{not json", r#"{"@type":"Article"}"#, ""]);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].declares("Article"));
    }
}
