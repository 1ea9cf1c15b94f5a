//! Verdict interpretation
//!
//! Pure mapping from a verification backend's raw output to accept/reject.
//! No state mutation here; the submission pipeline applies the result.

/// Keywords that count toward acceptance in free-text responses
pub const POSITIVE_KEYWORDS: [&str; 6] = ["yes", "correct", "true", "verified", "valid", "appropriate"];

/// Keywords that force rejection in free-text responses
pub const NEGATIVE_KEYWORDS: [&str; 6] = ["no", "incorrect", "false", "invalid", "inappropriate", "not"];

/// Class labels of the local fixed-label classifier, in score-vector order
pub const CLASS_LABELS: [&str; 4] = ["not_a_deed", "planting", "trash_pickup", "recycling"];

/// Sentinel label meaning the photo shows no recognizable deed
pub const NOT_A_DEED: &str = "not_a_deed";

/// Rule set A: free-text keyword scan (hosted backend)
///
/// Accept iff at least one positive keyword is present AND no negative
/// keyword is present, scanning the lowercased text by substring. The
/// positive-present AND negative-absent precedence is a contract: a reply
/// such as "not correct" contains both "correct" and "not" and rejects.
pub fn keyword_verdict(raw_text: &str) -> bool {
    let lowered = raw_text.to_lowercase();
    let has_positive = POSITIVE_KEYWORDS.iter().any(|k| lowered.contains(k));
    let has_negative = NEGATIVE_KEYWORDS.iter().any(|k| lowered.contains(k));
    has_positive && !has_negative
}

/// Rule set B: fixed-label decision (local backend)
///
/// Accept iff the predicted label is not the `not_a_deed` sentinel.
pub fn label_verdict(label: &str) -> bool {
    label != NOT_A_DEED
}

/// Index of the largest score; ties resolve to the first maximal index
pub fn argmax(scores: &[f32]) -> usize {
    let mut best = 0;
    for (i, score) in scores.iter().enumerate() {
        if *score > scores[best] {
            best = i;
        }
    }
    best
}
