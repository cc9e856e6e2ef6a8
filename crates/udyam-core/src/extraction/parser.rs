//! Lenient parser turning a model response into an [`ExtractedRecord`].

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::ExtractionError;
use crate::models::record::ExtractedRecord;

use super::Result;

/// Trait for converting a raw model response into a record.
pub trait ResponseParser {
    /// Parse a response. The only error is [`ExtractionError::NoData`].
    fn parse(&self, raw: &str) -> Result<ExtractedRecord>;
}

/// Two-tier JSON parser.
///
/// 1. The whole response is decoded as JSON.
/// 2. Otherwise the span from the first `{` to the last `}` is decoded.
///
/// The span is greedy and not nesting-aware. It recovers prose or markdown
/// fences around a single object, but fails on responses holding several
/// disjoint objects, or a stray brace in the prose before or after the real
/// object. Nothing is salvaged from a span that is not valid JSON.
#[derive(Debug, Clone)]
pub struct LenientJsonParser {
    recover: bool,
}

impl LenientJsonParser {
    /// Create a parser with brace-span recovery enabled.
    pub fn new() -> Self {
        Self { recover: true }
    }

    /// Enable or disable the brace-span recovery tier.
    pub fn with_recovery(mut self, recover: bool) -> Self {
        self.recover = recover;
        self
    }

    fn decode_object(candidate: &str) -> Option<Map<String, Value>> {
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => Some(map),
            Ok(other) => {
                trace!("Decoded JSON is not an object: {}", json_kind(&other));
                None
            }
            Err(e) => {
                trace!("JSON decode failed: {}", e);
                None
            }
        }
    }
}

impl Default for LenientJsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseParser for LenientJsonParser {
    fn parse(&self, raw: &str) -> Result<ExtractedRecord> {
        if let Some(map) = Self::decode_object(raw) {
            debug!("Parsed model response as a JSON object ({} keys)", map.len());
            return Ok(ExtractedRecord::from_map(map));
        }

        if !self.recover {
            return Err(ExtractionError::NoData);
        }

        let Some(span) = brace_span(raw) else {
            debug!("Model response contains no brace-delimited span");
            return Err(ExtractionError::NoData);
        };

        match Self::decode_object(span) {
            Some(map) => {
                debug!(
                    "Recovered JSON object from brace span ({} of {} bytes, {} keys)",
                    span.len(),
                    raw.len(),
                    map.len()
                );
                Ok(ExtractedRecord::from_map(map))
            }
            None => {
                debug!("Brace-delimited span of the model response is not a JSON object");
                Err(ExtractionError::NoData)
            }
        }
    }
}

/// Text from the first `{` to the last `}` inclusive, if the first precedes the last.
pub fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a model response with the default parser.
pub fn parse_response(raw: &str) -> Result<ExtractedRecord> {
    LenientJsonParser::new().parse(raw)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
