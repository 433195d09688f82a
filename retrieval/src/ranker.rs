//! Similarity ranking over stored records.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use plinth_corpus::DocumentRecord;
use plinth_embeddings::{cosine_similarity, is_valid_vector};

/// Score assigned to a pinned record, above any possible cosine score tie.
pub const PINNED_SCORE: f32 = 1.0;

/// One query result: a stored chunk with its similarity to the query.
///
/// Created per query, discarded after prompt assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedHit {
    /// Record id.
    pub id: String,

    /// Title of the source document.
    pub title: String,

    /// Source URL.
    pub url: String,

    /// The chunk text.
    pub text: String,

    /// Cosine similarity to the query, in `[-1, 1]`.
    pub score: f32,
}

impl RankedHit {
    fn from_record(record: &DocumentRecord, score: f32) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            url: record.url.clone(),
            text: record.text.clone(),
            score,
        }
    }
}

/// Score every candidate against the query and keep the best `top_k`.
///
/// Records without an embedding, or with a non-finite one, are dropped
/// before scoring; zero vectors and dimension mismatches score `0.0` and
/// stay in. Sort is stable descending, so ties keep scan order.
pub fn rank(query: &[f32], records: &[DocumentRecord], top_k: usize) -> Vec<RankedHit> {
    let mut scored: Vec<(OrderedFloat<f32>, &DocumentRecord)> = records
        .iter()
        .filter_map(|record| {
            let vector = record.embedding.as_deref()?;
            if !is_valid_vector(vector) {
                return None;
            }
            Some((OrderedFloat(cosine_similarity(query, vector)), record))
        })
        .collect();

    scored.sort_by_key(|(score, _)| std::cmp::Reverse(*score));

    scored
        .into_iter()
        .take(top_k)
        .map(|(score, record)| RankedHit::from_record(record, score.0))
        .collect()
}

/// Force the record with `pinned_id` into the result set.
///
/// If the id exists among `records` it is moved to the front with
/// [`PINNED_SCORE`], replacing any lower-scored appearance of itself, and the
/// set is re-truncated to `top_k`. An unknown id leaves the hits untouched.
/// This is policy layered on top of [`rank`], applied only when a caller
/// asks for it.
pub fn pin(
    mut hits: Vec<RankedHit>,
    records: &[DocumentRecord],
    pinned_id: &str,
    top_k: usize,
) -> Vec<RankedHit> {
    let Some(record) = records.iter().find(|r| r.id == pinned_id) else {
        return hits;
    };

    hits.retain(|hit| hit.id != pinned_id);
    hits.insert(0, RankedHit::from_record(record, PINNED_SCORE));
    hits.truncate(top_k);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn record(id: &str, embedding: Option<Vec<f32>>) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            title: format!("title-{id}"),
            url: String::new(),
            text: format!("text-{id}"),
            embedding,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn ranks_descending_and_truncates() {
        let records = vec![
            record("far", Some(vec![0.0, 1.0])),
            record("near", Some(vec![1.0, 0.0])),
            record("mid", Some(vec![0.7, 0.7])),
        ];

        let hits = rank(&[1.0, 0.0], &records, 2);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "near");
        assert_eq!(hits[1].id, "mid");
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn returns_all_when_fewer_than_top_k() {
        let records = vec![record("only", Some(vec![1.0, 0.0]))];
        let hits = rank(&[1.0, 0.0], &records, 5);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn drops_missing_and_invalid_vectors_without_error() {
        let records = vec![
            record("no-vector", None),
            record("nan", Some(vec![f32::NAN, 1.0])),
            record("good", Some(vec![1.0, 0.0])),
        ];

        let hits = rank(&[1.0, 0.0], &records, 10);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "good");
    }

    #[test]
    fn mismatched_dimensions_score_zero_but_stay() {
        let records = vec![
            record("short", Some(vec![1.0])),
            record("aligned", Some(vec![1.0, 0.0])),
        ];

        let hits = rank(&[1.0, 0.0], &records, 10);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "aligned");
        assert_eq!(hits[1].score, 0.0);
    }

    #[test]
    fn ties_keep_scan_order() {
        let records = vec![
            record("first", Some(vec![0.0, 1.0])),
            record("second", Some(vec![0.0, 1.0])),
        ];

        let hits = rank(&[1.0, 0.0], &records, 2);
        assert_eq!(hits[0].id, "first");
        assert_eq!(hits[1].id, "second");
    }

    #[test]
    fn pin_forces_record_to_front_with_max_score() {
        let records = vec![
            record("a", Some(vec![1.0, 0.0])),
            record("b", Some(vec![0.9, 0.1])),
            record("about", Some(vec![0.0, 1.0])),
        ];

        let hits = rank(&[1.0, 0.0], &records, 2);
        assert!(!hits.iter().any(|h| h.id == "about"));

        let pinned = pin(hits, &records, "about", 2);
        assert_eq!(pinned.len(), 2);
        assert_eq!(pinned[0].id, "about");
        assert_eq!(pinned[0].score, PINNED_SCORE);
        assert_eq!(pinned[1].id, "a");
    }

    #[test]
    fn pin_rescore_applies_even_when_already_ranked() {
        let records = vec![
            record("a", Some(vec![1.0, 0.0])),
            record("about", Some(vec![0.9, 0.1])),
        ];

        let hits = rank(&[1.0, 0.0], &records, 2);
        let pinned = pin(hits, &records, "about", 2);

        assert_eq!(pinned[0].id, "about");
        assert_eq!(pinned[0].score, PINNED_SCORE);
        assert_eq!(pinned.len(), 2);
    }

    #[test]
    fn pin_with_unknown_id_changes_nothing() {
        let records = vec![record("a", Some(vec![1.0, 0.0]))];
        let hits = rank(&[1.0, 0.0], &records, 2);
        let pinned = pin(hits.clone(), &records, "ghost", 2);
        assert_eq!(pinned.len(), hits.len());
        assert_eq!(pinned[0].id, "a");
    }
}
