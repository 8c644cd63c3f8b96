//! Generate human-readable explanations for recommendations.

use super::Recommendation;

/// Describe why a material was recommended and how its score was built.
pub fn explain(rec: &Recommendation) -> String {
    let b = &rec.score_breakdown;
    let mut parts = vec![format!("matched {}", rec.match_reasons)];

    if b.favorite > 0 {
        parts.push(format!("favorite +{}", b.favorite));
    }
    if b.usage > 0 {
        parts.push(format!(
            "used {} times +{}",
            rec.material.usage_count, b.usage
        ));
    }
    if b.price > 0 {
        parts.push(format!("price {:.2} +{}", rec.material.price, b.price));
    }

    format!(
        "{} (score {}): {}",
        rec.material.name,
        rec.score,
        parts.join("; ")
    )
}

/// One line per recommendation, numbered in rank order.
pub fn summarize(recs: &[Recommendation]) -> String {
    if recs.is_empty() {
        return "No materials matched the detected pathologies.".to_string();
    }

    recs.iter()
        .enumerate()
        .map(|(i, rec)| format!("{}. {}", i + 1, explain(rec)))
        .collect::<Vec<_>>()
        .join("\n")
}
