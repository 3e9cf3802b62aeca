use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::PipelineError;
use crate::pipeline::Component;

/// The three text fields of a post summary. Absent and `null` fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostSummary {
    pub article_type: String,
    pub content_summary: String,
    pub keywords: String,
}

#[derive(Deserialize)]
struct RawSummary {
    #[serde(rename = "articleType", default)]
    article_type: Option<String>,
    #[serde(rename = "contentSummary", default)]
    content_summary: Option<String>,
    #[serde(default)]
    keywords: Option<String>,
}

impl PostSummary {
    /// Reads the summary out of a JSON value. Unknown keys are ignored; a value that is not an
    /// object, or a field that is neither a string nor `null`, is [`PipelineError::MalformedSummary`].
    pub fn from_value(value: &Value) -> Result<Self, PipelineError> {
        let raw = RawSummary::deserialize(value)
            .map_err(|err| PipelineError::MalformedSummary(err.to_string()))?;
        Ok(Self {
            article_type: raw.article_type.unwrap_or_default(),
            content_summary: raw.content_summary.unwrap_or_default(),
            keywords: raw.keywords.unwrap_or_default(),
        })
    }

    pub fn field(&self, component: Component) -> &str {
        match component {
            Component::Type => &self.article_type,
            Component::Content => &self.content_summary,
            Component::Keyword => &self.keywords,
        }
    }
}

/// Parses the `--summary` argument. Text that is not valid JSON becomes an empty object.
pub fn parse_summary_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "summary_not_json");
        Value::Object(Map::new())
    })
}
