// Request/response types shared by the LLM backends
//
// One prompt in, one text completion out. The backends translate these into
// their own wire formats.

use serde::{Deserialize, Serialize};

/// Single-turn completion request
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequest {
    /// Task prompt (document text, prior artifact, feedback)
    pub prompt: String,

    /// Model name; empty means the backend's default
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// System instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Ask the backend for a JSON-only answer
    pub json_output: bool,
}

impl ProviderRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: String::new(),
            max_tokens: 8192,
            system: None,
            temperature: None,
            json_output: true,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Completion returned by a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub text: String,
    pub model: String,
    pub stop_reason: Option<String>,
    /// Backend name ("gemini", "openai", ...)
    pub provider: String,
}

/// Verdict of one critique round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Critique {
    pub approved: bool,
    #[serde(default)]
    pub deficiencies: Vec<String>,
}

impl Critique {
    pub fn approve() -> Self {
        Self {
            approved: true,
            deficiencies: Vec::new(),
        }
    }

    pub fn reject<I, S>(deficiencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            approved: false,
            deficiencies: deficiencies.into_iter().map(Into::into).collect(),
        }
    }
}

/// What a revision should address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionNotes {
    /// Free-text feedback from the human reviewer
    Human(String),
    /// Deficiencies reported by a critique round
    Deficiencies(Vec<String>),
}

impl RevisionNotes {
    /// Render the notes as a prompt section
    pub fn to_prompt_text(&self) -> String {
        match self {
            RevisionNotes::Human(feedback) => feedback.trim().to_string(),
            RevisionNotes::Deficiencies(items) => items
                .iter()
                .map(|d| format!("- {}", d.trim()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
