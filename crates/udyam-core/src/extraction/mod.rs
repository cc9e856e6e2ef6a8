//! LLM-assisted field extraction: prompt schema, completion client, response parser.

mod parser;
mod requester;
pub mod schema;

pub use parser::{LenientJsonParser, ResponseParser, brace_span, parse_response};
pub use requester::{
    CompletionClient, CompletionRequest, OpenAiClient, SYSTEM_PROMPT, decode_chat_response,
};

use std::time::Instant;

use tracing::{info, warn};

use crate::error::ExtractionError;
use crate::models::record::{ExtractedRecord, Field, NicLevel};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result of one extraction round trip.
#[derive(Debug)]
pub struct ExtractionReport {
    /// Verbatim model response.
    pub raw_response: String,
    /// Parsed record, or [`ExtractionError::NoData`].
    pub outcome: Result<ExtractedRecord>,
    /// Model that was asked.
    pub model: String,
    /// Round-trip time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionReport {
    /// The record, if one was recovered.
    pub fn record(&self) -> Option<&ExtractedRecord> {
        self.outcome.as_ref().ok()
    }
}

/// Sends raw text to a completion service and parses the answer.
pub struct Extractor<C, P = LenientJsonParser> {
    client: C,
    parser: P,
    model: String,
}

impl<C: CompletionClient> Extractor<C> {
    /// Create an extractor with the default lenient parser.
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self::with_parser(client, LenientJsonParser::new(), model)
    }
}

impl<C: CompletionClient, P: ResponseParser> Extractor<C, P> {
    pub fn with_parser(client: C, parser: P, model: impl Into<String>) -> Self {
        Self {
            client,
            parser,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one extraction.
    ///
    /// Service failures are returned as [`crate::UdyamError::Extraction`]. A response
    /// without usable JSON is not an error: it is reported through
    /// [`ExtractionReport::outcome`].
    pub async fn extract(&self, raw_text: &str) -> crate::Result<ExtractionReport> {
        let start = Instant::now();
        let request = CompletionRequest::for_raw_text(self.model.as_str(), raw_text);
        let raw_response = self.client.complete(&request).await?;
        let outcome = self.parser.parse(&raw_response);
        let processing_time_ms = start.elapsed().as_millis() as u64;

        match &outcome {
            Ok(record) => info!(
                "Extracted {} of {} schema entries in {}ms",
                record.found_count(),
                Field::ALL.len() + NicLevel::ALL.len(),
                processing_time_ms
            ),
            Err(e) => warn!("{} ({} chars of response)", e, raw_response.chars().count()),
        }

        Ok(ExtractionReport {
            raw_response,
            outcome,
            model: self.model.clone(),
            processing_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UdyamError;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct CannedClient {
        reply: std::result::Result<String, u16>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl CannedClient {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl CompletionClient for CannedClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ExtractionError::Service {
                    status: *status,
                    body: "rate limited".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_extract_parses_response() {
        let extractor = Extractor::new(
            CannedClient::replying("Here is the data:\n{\"ENTERPRISE_NAME\": \"Acme\"}"),
            "gpt-4o",
        );
        let report = extractor.extract("raw").await.unwrap();

        assert_eq!(report.model, "gpt-4o");
        assert_eq!(report.record().and_then(|r| r.found(Field::EnterpriseName)), Some("Acme"));

        let seen = extractor.client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].user_prompt.starts_with("Raw text:\nraw\n"));
    }

    #[tokio::test]
    async fn test_extract_reports_no_data() {
        let extractor = Extractor::new(CannedClient::replying("Sorry, I could not extract any data."), "gpt-4o");
        let report = extractor.extract("raw").await.unwrap();
        assert!(report.record().is_none());
        assert!(matches!(report.outcome, Err(ExtractionError::NoData)));
        assert_eq!(report.raw_response, "Sorry, I could not extract any data.");
    }

    #[tokio::test]
    async fn test_extract_propagates_service_failure() {
        let extractor = Extractor::new(CannedClient::failing(429), "gpt-4o");
        let err = extractor.extract("raw").await.unwrap_err();
        assert!(matches!(
            err,
            UdyamError::Extraction(ExtractionError::Service { status: 429, .. })
        ));
        assert!(err.to_string().contains("429"));
    }
}
