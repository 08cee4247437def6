use anyhow::{Context, Result};
use superserial::{RenderOptions, Serialized};

/// Turn plain JSON into its tagged envelope form.
///
/// Objects with `ss_typeName` and `ss_data` keys become custom-type
/// envelopes. `null` and booleans have no tagged form and are rejected.
pub fn run_wrap(text: &str, options: &RenderOptions) -> Result<String> {
    let serialized: Serialized = text.parse().context("Document has no tagged representation")?;
    serialized
        .render_with(options)
        .context("Failed to render document")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::run_plain;
    use rstest::rstest;

    #[test]
    fn test_wrap_tags_plain_json() {
        let text = run_wrap("[1, 2]", &RenderOptions::default()).unwrap();
        assert_eq!(
            text,
            r#"{"ss_case":"array","ss_value":[{"ss_case":"int","ss_value":1},{"ss_case":"int","ss_value":2}]}"#
        );
    }

    #[test]
    fn test_wrap_reverses_plain() {
        let tagged = r#"{"ss_case":"dict","ss_value":{"home":{"ss_case":"type","ss_value":{"ss_typeName":"Point","ss_data":{"ss_case":"dict","ss_value":{"x":{"ss_case":"float","ss_value":1.5}}}}}}}"#;
        let plain = run_plain(tagged).unwrap();
        assert_eq!(run_wrap(&plain, &RenderOptions::default()).unwrap(), tagged);
    }

    #[rstest]
    #[case("null")]
    #[case("true")]
    #[case(r#"{"flag": false}"#)]
    fn test_wrap_rejects_untaggable(#[case] text: &str) {
        assert!(run_wrap(text, &RenderOptions::default()).is_err());
    }
}
