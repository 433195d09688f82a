//! Persisted document records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A stored chunk of a source document together with its embedding.
///
/// The persisted JSON shape is `{title, url, text, embedding, createdAt}`
/// plus the store-assigned `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Store-assigned identifier.
    pub id: String,

    /// Title of the source document, if any.
    #[serde(default)]
    pub title: String,

    /// Source URL, if any.
    #[serde(default)]
    pub url: String,

    /// The chunk text.
    #[serde(default)]
    pub text: String,

    /// Embedding vector for `text`. `None` when the field is missing or not
    /// a numeric sequence; such records are skipped by ranking, never scored.
    #[serde(default, deserialize_with = "lenient_embedding")]
    pub embedding: Option<Vec<f32>>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// The insert shape for a record; the store assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    /// Title of the source document, if any.
    pub title: String,

    /// Source URL, if any.
    pub url: String,

    /// The chunk text.
    pub text: String,

    /// Embedding vector for `text`.
    pub embedding: Vec<f32>,
}

/// Deserializes the embedding field, mapping anything that is not a numeric
/// sequence to `None` instead of rejecting the whole record.
fn lenient_embedding<'de, D>(deserializer: D) -> Result<Option<Vec<f32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value::<Vec<f32>>(v).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn created_at_serializes_as_camel_case() {
        let record = DocumentRecord {
            id: "d1".to_string(),
            title: "T".to_string(),
            url: String::new(),
            text: "body".to_string(),
            embedding: Some(vec![0.1, 0.2]),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn missing_embedding_deserializes_to_none() {
        let json = r#"{"id":"a","title":"","url":"","text":"t","createdAt":"2024-01-01T00:00:00Z"}"#;
        let record: DocumentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.embedding, None);
    }

    #[test]
    fn non_numeric_embedding_deserializes_to_none() {
        let json = r#"{"id":"a","title":"","url":"","text":"t","embedding":"not-a-vector","createdAt":"2024-01-01T00:00:00Z"}"#;
        let record: DocumentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.embedding, None);
    }
}
