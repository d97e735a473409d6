use std::fmt::Write as _;

use collegeqa_core::types::{Answer, Classification, QueryResult};

pub fn classification_line(c: &Classification) -> String {
    let mut line = format!("kind={}", c.kind);
    if let Some(intent) = c.intent {
        let _ = write!(line, " intent={}", intent.label());
    }
    if !c.mentioned_entities.is_empty() {
        let _ = write!(line, " entities=[{}]", c.mentioned_entities.join(", "));
    }
    line
}

pub fn result_block(rank: usize, r: &QueryResult) -> String {
    format!(
        "{rank}. [{:.1}%] {} / {}\n   Q: {}\n   A: {}",
        r.confidence, r.entity_id, r.category, r.question, r.answer
    )
}

/// Human-readable rendering of an answer, one block per result.
pub fn answer_text(answer: &Answer) -> String {
    let mut out = classification_line(&answer.classification);
    if answer.results.is_empty() {
        out.push_str("\n(no results)");
    }
    for (i, r) in answer.results.iter().enumerate() {
        out.push('\n');
        out.push_str(&result_block(i + 1, r));
    }
    out
}
