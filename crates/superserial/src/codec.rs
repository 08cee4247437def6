//! Text codec.
//!
//! Rendering writes every node as a `{"ss_case", "ss_value"}` envelope, all
//! the way down: dict values and array elements are full envelopes, and a
//! custom type's value is a `{"ss_typeName", "ss_data"}` object whose data is
//! again an envelope. Parsing delegates to `serde_json` and hands the raw tree
//! to the [unwrapper](crate::unwrap).

use std::io;
use std::str::FromStr;

use serde::ser::{Error as _, SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};

use crate::error::{Error, Result};
use crate::serialized::{Dict, Serialized};
use crate::unwrap;

pub const CASE_KEY: &str = "ss_case";
pub const VALUE_KEY: &str = "ss_value";
pub const TYPE_NAME_KEY: &str = "ss_typeName";
pub const DATA_KEY: &str = "ss_data";

/// How a tree is written as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Indent nested envelopes instead of writing a single line.
    pub pretty: bool,
    /// Escape every non-ASCII character as `\uXXXX`.
    pub ascii_only: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            ascii_only: true,
        }
    }
}

impl RenderOptions {
    /// Indented, ASCII-only output.
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    pub fn with_ascii_only(mut self, ascii_only: bool) -> Self {
        self.ascii_only = ascii_only;
        self
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Serde view of a node as a full `{ss_case, ss_value}` envelope.
struct Envelope<'a>(&'a Serialized);

impl Serialize for Envelope<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let node = self.0;
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(CASE_KEY, node.case().as_str())?;
        match node {
            Serialized::CustomType { type_name, data } => {
                map.serialize_entry(VALUE_KEY, &CustomPayload { type_name, data })?
            }
            Serialized::Dict(entries) => map.serialize_entry(VALUE_KEY, &DictPayload(entries))?,
            Serialized::Array(items) => map.serialize_entry(VALUE_KEY, &ArrayPayload(items))?,
            Serialized::Str(text) => map.serialize_entry(VALUE_KEY, text)?,
            Serialized::Integer(int) => map.serialize_entry(VALUE_KEY, int)?,
            Serialized::FloatingPoint(float) => {
                if !float.is_finite() {
                    return Err(S::Error::custom(format!(
                        "float {} has no JSON representation",
                        float
                    )));
                }
                map.serialize_entry(VALUE_KEY, float)?
            }
        }
        map.end()
    }
}

struct CustomPayload<'a> {
    type_name: &'a str,
    data: &'a Serialized,
}

impl Serialize for CustomPayload<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // ss_typeName first, then the payload envelope
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(TYPE_NAME_KEY, self.type_name)?;
        map.serialize_entry(DATA_KEY, &Envelope(self.data))?;
        map.end()
    }
}

struct DictPayload<'a>(&'a Dict);

impl Serialize for DictPayload<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.0.iter().map(|(key, value)| (key, Envelope(value))))
    }
}

struct ArrayPayload<'a>(&'a [Serialized]);

impl Serialize for ArrayPayload<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter().map(Envelope))
    }
}

/// Wraps another formatter and escapes non-ASCII characters in strings.
struct AsciiFormatter<F>(F);

impl<F: Formatter> Formatter for AsciiFormatter<F> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Writes `serialized` as envelope JSON into `writer`.
pub fn render_to_writer<W: io::Write>(
    serialized: &Serialized,
    writer: W,
    options: &RenderOptions,
) -> Result<()> {
    let envelope = Envelope(serialized);
    let written = match (options.pretty, options.ascii_only) {
        (false, false) => envelope.serialize(&mut serde_json::Serializer::new(writer)),
        (true, false) => envelope.serialize(&mut serde_json::Serializer::pretty(writer)),
        (false, true) => envelope.serialize(&mut serde_json::Serializer::with_formatter(
            writer,
            AsciiFormatter(CompactFormatter),
        )),
        (true, true) => envelope.serialize(&mut serde_json::Serializer::with_formatter(
            writer,
            AsciiFormatter(PrettyFormatter::new()),
        )),
    };
    written.map_err(Error::Render)
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses JSON text into a raw tree with no tag semantics.
pub fn parse_json(text: &str) -> Result<serde_json::Value> {
    serde_json::from_str(text).map_err(Error::Parse)
}

/// Parses JSON bytes into a raw tree with no tag semantics.
pub fn parse_json_slice(bytes: &[u8]) -> Result<serde_json::Value> {
    serde_json::from_slice(bytes).map_err(Error::Parse)
}

impl Serialized {
    /// Renders compact, ASCII-only envelope JSON.
    pub fn render(&self) -> Result<String> {
        self.render_with(&RenderOptions::default())
    }

    pub fn render_with(&self, options: &RenderOptions) -> Result<String> {
        let bytes = self.to_vec_with(options)?;
        String::from_utf8(bytes).map_err(|e| Error::Render(serde_json::Error::custom(e)))
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        self.to_vec_with(&RenderOptions::default())
    }

    pub fn to_vec_with(&self, options: &RenderOptions) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        render_to_writer(self, &mut bytes, options)?;
        Ok(bytes)
    }

    /// Parses and unwraps envelope JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw = parse_json_slice(bytes)?;
        Ok(unwrap::unwrap(&raw)?)
    }

    /// The tree with its case tags stripped.
    ///
    /// Custom types become `{"ss_typeName", "ss_data"}` objects, which the
    /// unwrapper reads back as custom-type envelopes. Non-finite floats have
    /// no JSON form and become `null`.
    pub fn to_plain_json(&self) -> serde_json::Value {
        use serde_json::{Map, Value};

        match self {
            Serialized::CustomType { type_name, data } => {
                let mut object = Map::new();
                object.insert(TYPE_NAME_KEY.to_string(), Value::from(type_name.as_str()));
                object.insert(DATA_KEY.to_string(), data.to_plain_json());
                Value::Object(object)
            }
            Serialized::Dict(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_plain_json()))
                    .collect(),
            ),
            Serialized::Array(items) => {
                Value::Array(items.iter().map(Serialized::to_plain_json).collect())
            }
            Serialized::Str(text) => Value::from(text.as_str()),
            Serialized::Integer(int) => Value::from(*int),
            Serialized::FloatingPoint(float) => serde_json::Number::from_f64(*float)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

impl FromStr for Serialized {
    type Err = Error;

    /// Parses and unwraps envelope JSON text.
    fn from_str(text: &str) -> Result<Self> {
        let raw = parse_json(text)?;
        Ok(unwrap::unwrap(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Serialized {
        let mut fields = Dict::new();
        fields.insert("name".to_string(), Serialized::from("Bob"));
        fields.insert("age".to_string(), Serialized::Integer(20));
        Serialized::custom_type("Person", fields)
    }

    #[test]
    fn test_render_custom_type_envelope() {
        let text = person().render().unwrap();
        assert_eq!(
            text,
            r#"{"ss_case":"type","ss_value":{"ss_typeName":"Person","ss_data":{"ss_case":"dict","ss_value":{"age":{"ss_case":"int","ss_value":20},"name":{"ss_case":"string","ss_value":"Bob"}}}}}"#
        );
    }

    #[test]
    fn test_render_array_envelope() {
        let tree = Serialized::Array(vec![Serialized::Integer(1), Serialized::Integer(2)]);
        assert_eq!(
            tree.render().unwrap(),
            r#"{"ss_case":"array","ss_value":[{"ss_case":"int","ss_value":1},{"ss_case":"int","ss_value":2}]}"#
        );
    }

    #[test]
    fn test_render_float() {
        let text = Serialized::FloatingPoint(2.5).render().unwrap();
        assert_eq!(text, r#"{"ss_case":"float","ss_value":2.5}"#);
    }

    #[test]
    fn test_render_is_idempotent() {
        let tree = person();
        assert_eq!(tree.render().unwrap(), tree.render().unwrap());
    }

    #[test]
    fn test_render_rejects_non_finite_float() {
        let err = Serialized::FloatingPoint(f64::NAN).render().unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[test]
    fn test_ascii_only_escapes_non_ascii() {
        let tree = Serialized::from("café ☕ 𝄞");

        let escaped = tree.render().unwrap();
        assert!(escaped.is_ascii());
        assert!(escaped.contains(r"caf\u00e9 \u2615 \ud834\udd1e"));

        let raw = tree
            .render_with(&RenderOptions::default().with_ascii_only(false))
            .unwrap();
        assert!(raw.contains("café ☕ 𝄞"));

        // Both forms parse back to the same text
        assert_eq!(escaped.parse::<Serialized>().unwrap(), tree);
        assert_eq!(raw.parse::<Serialized>().unwrap(), tree);
    }

    #[test]
    fn test_pretty_render_parses_back() {
        let tree = person();
        let text = tree.render_with(&RenderOptions::pretty()).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(text.parse::<Serialized>().unwrap(), tree);
    }

    #[test]
    fn test_parse_reports_malformed_json() {
        let err = "{\"ss_case\": ".parse::<Serialized>().unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_bytes_round_trip() {
        let tree = person();
        let bytes = tree.to_vec().unwrap();
        assert_eq!(Serialized::from_slice(&bytes).unwrap(), tree);
    }

    #[test]
    fn test_plain_json_view() {
        let plain = person().to_plain_json();
        assert_eq!(
            plain,
            serde_json::json!({
                "ss_typeName": "Person",
                "ss_data": { "age": 20, "name": "Bob" }
            })
        );
        // The plain view unwraps back to the same tree
        assert_eq!(unwrap::unwrap(&plain).unwrap(), person());
    }
}
