use anyhow::{Context, Result};
use superserial::Serialized;

/// Strip the case tags from an envelope document.
pub fn run_plain(text: &str) -> Result<String> {
    let serialized: Serialized = text.parse().context("Document is not a valid envelope")?;
    serde_json::to_string_pretty(&serialized.to_plain_json()).context("Failed to render plain JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_strips_tags() {
        let text = r#"{"ss_case":"type","ss_value":{"ss_typeName":"Person","ss_data":{"ss_case":"dict","ss_value":{"age":{"ss_case":"int","ss_value":20},"name":{"ss_case":"string","ss_value":"Bob"}}}}}"#;
        let plain: serde_json::Value = serde_json::from_str(&run_plain(text).unwrap()).unwrap();
        assert_eq!(
            plain,
            serde_json::json!({
                "ss_typeName": "Person",
                "ss_data": {"age": 20, "name": "Bob"}
            })
        );
    }
}
