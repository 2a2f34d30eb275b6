//! Analysis agents.
//!
//! Each agent wraps one external text-generation call per scene plus one
//! aggregate call, parses the returned JSON into its section's breakdown
//! record, and substitutes a deterministic fallback when the call fails or
//! the output does not parse. Failures here never halt the workflow.

pub mod character;
pub mod cost;
pub mod gather;
pub mod generator;
pub mod location;
pub mod props;
pub mod scene;
pub mod timeline;

pub use generator::{
    parse_json_response, AgentError, Generator, GeneratorConfig, HttpGenerator,
};

/// Tagged result of one analysis section, so a canned placeholder can never
/// be mistaken for a real analysis.
#[derive(Debug, Clone)]
pub enum AgentOutcome<T> {
    /// The aggregate call succeeded (individual scenes may still have been
    /// filled from per-scene fallbacks).
    Success(T),
    /// The aggregate call failed; `value` is a deterministic placeholder
    /// shaped like a real result, `reason` says why.
    Fallback { value: T, reason: String },
}

impl<T> AgentOutcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Success(v) => v,
            Self::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Split into the payload and the error string to record, if any.
    pub fn into_parts(self) -> (T, Option<String>) {
        match self {
            Self::Success(v) => (v, None),
            Self::Fallback { value, reason } => (value, Some(reason)),
        }
    }
}

/// One generation call parsed into a typed record.
pub(crate) async fn call_structured<T: serde::de::DeserializeOwned>(
    generator: &dyn Generator,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<T, AgentError> {
    let text = generator.generate(system_prompt, user_prompt).await?;
    parse_json_response(&text)
}
