//! Natural-language insight generation over a ledger snapshot.
//!
//! The provider call is network-bound and may be slow or fail; the
//! tracker models it as an explicit task whose result can be
//! superseded, so it never blocks ledger mutations and a stale
//! response cannot overwrite a newer request.

use std::time::Duration;

use thiserror::Error;

use crate::ledger::{CategoryKind, Ledger};

/// Shown in place of insights whenever generation fails.
pub const FALLBACK_TEXT: &str =
    "Could not generate insights. Please check your internet connection.";

const UA: &str = concat!("fintrack/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
    #[error("Provider returned no insight text")]
    EmptyResponse,
}

/// Lifecycle of one insight request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InsightStatus {
    #[default]
    Idle,
    Pending,
    Succeeded(String),
    Failed(String),
}

impl InsightStatus {
    /// Text a frontend should render: the insight when available, the
    /// fallback after a failure, nothing while idle or pending.
    pub fn display_text(&self) -> Option<&str> {
        match self {
            Self::Succeeded(text) => Some(text),
            Self::Failed(_) => Some(FALLBACK_TEXT),
            Self::Idle | Self::Pending => None,
        }
    }
}

/// Handle tying a completion back to the request that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightTicket(u64);

/// Tracks the current insight request. Beginning a new request bumps
/// the generation, so completions carrying a stale ticket are dropped.
#[derive(Debug, Default)]
pub struct InsightTracker {
    generation: u64,
    status: InsightStatus,
}

impl InsightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &InsightStatus {
        &self.status
    }

    /// Marks a new request pending and returns its ticket. Any
    /// in-flight request is superseded from this point on.
    pub fn begin(&mut self) -> InsightTicket {
        self.generation += 1;
        self.status = InsightStatus::Pending;
        InsightTicket(self.generation)
    }

    /// Applies a finished request's result. Returns false (and leaves
    /// the status alone) when the ticket has been superseded.
    pub fn complete(
        &mut self,
        ticket: InsightTicket,
        result: Result<String, InsightError>,
    ) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(ticket = ticket.0, "stale insight result dropped");
            return false;
        }
        self.status = match result {
            Ok(text) => InsightStatus::Succeeded(text),
            Err(err) => InsightStatus::Failed(err.to_string()),
        };
        true
    }
}

/// Produces advisor prose from a consistent ledger snapshot.
pub trait InsightProvider: Send + Sync {
    fn generate(&self, ledger: &Ledger) -> Result<String, InsightError>;
}

/// Gemini-backed provider using a blocking HTTP client.
pub struct GeminiProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, InsightError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(UA)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Reads the API key from the environment.
    pub fn from_env(model: impl Into<String>) -> Result<Self, InsightError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| InsightError::MissingApiKey)?;
        Self::new(api_key, model)
    }
}

impl InsightProvider for GeminiProvider {
    fn generate(&self, ledger: &Ledger) -> Result<String, InsightError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": advisor_prompt(ledger) }] }]
        });
        let response: serde_json::Value = self
            .client
            .post(&url)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or(InsightError::EmptyResponse)
    }
}

/// Builds the advisor prompt: one line per transaction, one per budget
/// limit, then the instruction.
pub fn advisor_prompt(ledger: &Ledger) -> String {
    let transaction_lines: Vec<String> = ledger
        .transactions
        .iter()
        .map(|txn| {
            let category = ledger
                .categories
                .resolve(txn.category_id)
                .map(|c| c.name.as_str())
                .unwrap_or("Unknown");
            let kind = match txn.kind {
                CategoryKind::Income => "INCOME",
                CategoryKind::Expense => "EXPENSE",
            };
            format!(
                "{}: {} of ${} for {} ({})",
                txn.timestamp.date_naive(),
                kind,
                txn.amount,
                category,
                txn.description
            )
        })
        .collect();
    let budget_lines: Vec<String> = ledger
        .budget_limits
        .iter()
        .map(|budget| {
            let category = ledger
                .categories
                .resolve(budget.category_id)
                .map(|c| c.name.as_str())
                .unwrap_or("Unknown");
            format!("{}: Limit ${}", category, budget.limit)
        })
        .collect();

    format!(
        "As a personal financial advisor, analyze the following recent \
         transactions and budgets:\n\nTRANSACTIONS:\n{}\n\nBUDGETS:\n{}\n\n\
         Please provide 3 concise, actionable financial insights or tips \
         based on this data. Format them as short bullet points. Be \
         specific about spending categories and budget adherence.",
        transaction_lines.join("\n"),
        budget_lines.join("\n")
    )
}
