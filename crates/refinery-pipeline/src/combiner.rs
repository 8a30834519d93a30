//! Combine per-chunk results into one document
//!
//! Results are sorted by chunk id first, so the combined document does not
//! depend on the order in which chunks finished.

use crate::types::CombinedResult;
use refinery_domain::{
    ChunkResult, KeyPoint, ProcessingAnalysis, Sentiment, Theme, TimelineEvent,
};
use refinery_entities::merge_entities;
use std::collections::{HashMap, HashSet};

/// Combine chunk results
pub fn combine_results(mut results: Vec<ChunkResult>) -> CombinedResult {
    results.sort_by_key(|r| r.id);

    let refined: Vec<&str> = results
        .iter()
        .map(|r| r.refined_text.trim())
        .filter(|text| !text.is_empty())
        .collect();

    let bundles: Vec<_> = results.iter().map(|r| r.entities.clone()).collect();
    let entities = merge_entities(&bundles);

    CombinedResult {
        output: refined.join(" "),
        transcript: refined.join("\n"),
        analysis: combine_analysis(results.iter().map(|r| &r.analysis)),
        entities,
        timeline: combine_timeline(&results),
        chunks: results,
    }
}

/// Flatten timelines in chunk order, then stable-sort by timestamp
fn combine_timeline(results: &[ChunkResult]) -> Vec<TimelineEvent> {
    let mut timeline: Vec<TimelineEvent> = results
        .iter()
        .flat_map(|r| r.timeline.iter().cloned())
        .collect();
    timeline.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    timeline
}

fn combine_analysis<'a>(analyses: impl Iterator<Item = &'a ProcessingAnalysis>) -> ProcessingAnalysis {
    let mut title = None;
    let mut summaries = Vec::new();
    let mut scores = Vec::new();
    let mut topics = Vec::new();
    let mut quick_facts = Vec::new();
    let mut themes = Vec::new();
    let mut key_points = Vec::new();

    for analysis in analyses {
        if title.is_none() {
            title = analysis.title.clone().filter(|t| !t.trim().is_empty());
        }
        if let Some(summary) = analysis.summary.as_deref().map(str::trim) {
            if !summary.is_empty() {
                summaries.push(summary.to_string());
            }
        }
        if let Some(sentiment) = &analysis.sentiment {
            scores.push(sentiment.score);
        }
        topics.extend(analysis.topics.iter().flatten().cloned());
        quick_facts.extend(analysis.quick_facts.iter().flatten().cloned());
        themes.extend(analysis.themes.iter().flatten().cloned());
        key_points.extend(analysis.key_points.iter().flatten().cloned());
    }

    let sentiment = (!scores.is_empty())
        .then(|| Sentiment::from_score(scores.iter().sum::<f64>() / scores.len() as f64));

    ProcessingAnalysis {
        title,
        summary: (!summaries.is_empty()).then(|| summaries.join(" ")),
        sentiment,
        topics: non_empty(union(topics)),
        themes: non_empty(dedup_last_wins(themes, |t: &Theme| t.title.clone())),
        key_points: non_empty(dedup_last_wins(key_points, |k: &KeyPoint| k.title.clone())),
        quick_facts: non_empty(union(quick_facts)),
        entities: None,
        timeline: None,
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

/// Keep the first occurrence of each string
fn union(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Last occurrence of each key wins, at the first occurrence's position
fn dedup_last_wins<T, F>(items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> String,
{
    let mut out: Vec<T> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for item in items {
        let k = key(&item);
        match positions.get(&k) {
            Some(&index) => out[index] = item,
            None => {
                positions.insert(k, out.len());
                out.push(item);
            }
        }
    }
    out
}
