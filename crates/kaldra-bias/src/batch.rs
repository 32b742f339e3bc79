//! Batch analysis with item-count and per-item length limits.

use crate::pipeline::{AnalysisResult, BiasPipeline};
use kaldra_core::{KaldraError, KaldraResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One batch entry, tied back to its position in the caller's input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub input_index: usize,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Analyzed(AnalysisResult),
    /// The item failed on its own; the rest of the batch still ran.
    Failed { failed: bool, reason: String },
}

impl BatchItem {
    fn failed(input_index: usize, reason: String) -> Self {
        Self {
            input_index,
            outcome: BatchOutcome::Failed {
                failed: true,
                reason,
            },
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.outcome {
            BatchOutcome::Analyzed(result) => Some(result),
            BatchOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Failed { .. })
    }
}

/// First `max_chars` characters of `text` (never splits a code point).
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

impl BiasPipeline {
    /// Analyze each text in order with one locale.
    ///
    /// Only the first `batch_max_items` texts are processed; each is cut to
    /// `text_max_length_chars` characters first. An item that fails is reported
    /// as [`BatchOutcome::Failed`] and does not abort the others.
    pub fn analyze_batch<S: AsRef<str>>(&self, texts: &[S], locale: &str) -> Vec<BatchItem> {
        if texts.is_empty() {
            return Vec::new();
        }
        let max_items = self.settings().batch_max_items;
        let max_chars = self.settings().text_max_length_chars;

        if texts.len() > max_items {
            tracing::warn!(
                target: "kaldra::batch",
                received = texts.len(),
                max_items,
                "Batch larger than limit; truncating"
            );
        }

        texts
            .iter()
            .take(max_items)
            .enumerate()
            .map(|(input_index, text)| {
                let text = text.as_ref();
                let clipped = truncate_chars(text, max_chars);
                if clipped.len() < text.len() {
                    tracing::warn!(
                        target: "kaldra::batch",
                        input_index,
                        max_chars,
                        "Batch item longer than limit; truncating"
                    );
                }
                match self.analyze(clipped, locale) {
                    Ok(result) => BatchItem {
                        input_index,
                        outcome: BatchOutcome::Analyzed(result),
                    },
                    Err(e) => {
                        tracing::warn!(
                            target: "kaldra::batch",
                            input_index,
                            error = %e,
                            "Batch item failed"
                        );
                        BatchItem::failed(input_index, e.to_string())
                    }
                }
            })
            .collect()
    }

    /// Batch entry point for untyped input (e.g. a parsed request body).
    /// Anything but a JSON array is rejected; non-string items are analyzed as
    /// their JSON text.
    pub fn analyze_batch_values(&self, texts: &Value, locale: &str) -> KaldraResult<Vec<BatchItem>> {
        let items = texts.as_array().ok_or_else(|| {
            KaldraError::InvalidInput("batch input must be a JSON array of texts".to_string())
        })?;
        let texts: Vec<String> = items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(s) => s.clone(),
                other => {
                    tracing::warn!(
                        target: "kaldra::batch",
                        input_index = index,
                        "Non-string batch item; analyzing its JSON text"
                    );
                    other.to_string()
                }
            })
            .collect();
        Ok(self.analyze_batch(&texts, locale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("ação", 2), "aç");
        assert_eq!(truncate_chars("ação", 4), "ação");
        assert_eq!(truncate_chars("ação", 10), "ação");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn failed_item_wire_shape() {
        let item = BatchItem::failed(3, "embedding backend unavailable".to_string());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "input_index": 3,
                "failed": true,
                "reason": "embedding backend unavailable"
            })
        );
        assert!(item.is_failed());
        assert!(item.result().is_none());
    }

    #[test]
    fn analyzed_item_is_flattened() {
        let item = BatchItem {
            input_index: 0,
            outcome: BatchOutcome::Analyzed(AnalysisResult::empty_input()),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["input_index"], 0);
        assert_eq!(json["label"], "unknown");
        assert_eq!(json["bias_score"], 0.0);
        assert!(json.get("failed").is_none());
        let back: BatchItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }
}
