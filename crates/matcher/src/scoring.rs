//! Pure structural similarity between two fingerprints.
//!
//! Every factor function returns a value in [0, 1]. The aggregate is the
//! weighted average over informative factors: an optional factor for which
//! neither side carries a value keeps its neutral score in the reasons but
//! drops out of the average, so identical fingerprints always score 1.0.

use std::collections::HashSet;

use features::{LayoutMode, PositionZone, StructureFeatures};

use crate::types::{Factor, MatchReason, Weights};

/// Score for an optional signal that neither side provides.
pub const NEUTRAL_SCORE: f64 = 0.5;
/// Vector path lengths closer than this ratio earn [`PATH_LENGTH_CREDIT`].
pub const PATH_LENGTH_RATIO: f64 = 0.9;
pub const PATH_LENGTH_CREDIT: f64 = 0.3;
/// Text fingerprints in the same length bucket earn this.
pub const TEXT_BUCKET_CREDIT: f64 = 0.3;
/// Substring relation between parent names.
pub const PARENT_SUBSTRING_CREDIT: f64 = 0.7;

/// Aggregate score plus the reasons behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Similarity {
    pub score: f64,
    pub reasons: Vec<MatchReason>,
}

/// Compare `input` against `pattern` with the default weight table.
///
/// Optional factors missing on both sides are left out of the average, so the
/// score can differ from the plain weighted sum of the nine factor scores.
pub fn calculate_similarity(input: &StructureFeatures, pattern: &StructureFeatures) -> Similarity {
    calculate_similarity_with(input, pattern, &Weights::default())
}

/// Compare `input` against `pattern` with an explicit weight table.
pub fn calculate_similarity_with(
    input: &StructureFeatures,
    pattern: &StructureFeatures,
    weights: &Weights,
) -> Similarity {
    let mut reasons = Vec::with_capacity(Factor::ALL.len());
    let mut weighted = 0.0;
    let mut total_weight = 0.0;

    for factor in Factor::ALL {
        let eval = evaluate(factor, input, pattern);
        if eval.informative {
            let w = weights.weight(factor);
            weighted += eval.score * w;
            total_weight += w;
        }
        if eval.emit {
            reasons.push(MatchReason {
                factor,
                score: eval.score,
                detail: eval.detail,
            });
        }
    }

    let score = if total_weight > 0.0 {
        (weighted / total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Similarity { score, reasons }
}

struct Evaluation {
    score: f64,
    /// Counts toward the weighted average.
    informative: bool,
    /// Shows up in the reasons list.
    emit: bool,
    detail: String,
}

fn evaluate(factor: Factor, input: &StructureFeatures, pattern: &StructureFeatures) -> Evaluation {
    match factor {
        Factor::ChildCount => structural(
            score_child_count(input.child_count, pattern.child_count),
            format!("input: {}, pattern: {}", input.child_count, pattern.child_count),
        ),
        Factor::ChildTypes => structural(
            score_child_types(&input.child_types, &pattern.child_types),
            format!(
                "input: [{}], pattern: [{}]",
                preview(&input.child_types),
                preview(&pattern.child_types)
            ),
        ),
        Factor::LayoutMode => structural(
            score_layout_mode(input.layout_mode, pattern.layout_mode),
            format!(
                "input: {}, pattern: {}",
                input.layout_mode.as_str(),
                pattern.layout_mode.as_str()
            ),
        ),
        Factor::PositionZone => structural(
            score_position_zone(input.position_zone, pattern.position_zone),
            format!(
                "input: {}, pattern: {}",
                input.position_zone.as_str(),
                pattern.position_zone.as_str()
            ),
        ),
        Factor::AspectRatio => structural(
            score_aspect_ratio(input.aspect_ratio, pattern.aspect_ratio),
            format!(
                "input: {:.2}, pattern: {:.2}",
                input.aspect_ratio, pattern.aspect_ratio
            ),
        ),
        Factor::ChildNames => {
            let a = names(&input.child_names);
            let b = names(&pattern.child_names);
            let score = score_child_names(a, b);
            Evaluation {
                score,
                informative: a.is_some() || b.is_some(),
                emit: score > 0.0,
                detail: format!("child name overlap: {:.0}%", score * 100.0),
            }
        }
        Factor::ParentName => {
            let (a, b) = (present(&input.parent_name), present(&pattern.parent_name));
            optional(
                a,
                b,
                score_parent_name(a, b),
                format!("input: {}, pattern: {}", or_none(a), or_none(b)),
            )
        }
        Factor::VectorPathHash => {
            let (a, b) = (
                present(&input.vector_path_hash),
                present(&pattern.vector_path_hash),
            );
            optional(
                a,
                b,
                score_vector_path_hash(a, b),
                format!(
                    "input: {}, pattern: {}",
                    presence(a),
                    presence(b)
                ),
            )
        }
        Factor::TextFingerprint => {
            let (a, b) = (
                present(&input.text_fingerprint),
                present(&pattern.text_fingerprint),
            );
            optional(
                a,
                b,
                score_text_fingerprint(a, b),
                format!("input: {}, pattern: {}", or_none(a), or_none(b)),
            )
        }
    }
}

fn structural(score: f64, detail: String) -> Evaluation {
    Evaluation {
        score,
        informative: true,
        emit: true,
        detail,
    }
}

fn optional(a: Option<&str>, b: Option<&str>, score: f64, detail: String) -> Evaluation {
    let any = a.is_some() || b.is_some();
    Evaluation {
        score,
        informative: any,
        emit: any,
        detail,
    }
}

/// Empty strings count as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn names(value: &Option<Vec<String>>) -> Option<&[String]> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or("(none)")
}

fn presence(value: Option<&str>) -> &'static str {
    if value.is_some() {
        "present"
    } else {
        "absent"
    }
}

fn preview(types: &[String]) -> String {
    let shown = types.iter().take(3).map(String::as_str).collect::<Vec<_>>().join(", ");
    if types.len() > 3 {
        format!("{shown}...")
    } else {
        shown
    }
}

pub fn score_child_count(a: u32, b: u32) -> f64 {
    match a.abs_diff(b) {
        0 => 1.0,
        1 => 0.8,
        2 => 0.5,
        _ => 0.0,
    }
}

/// Order-sensitive: longest common subsequence over the longer list.
pub fn score_child_types(a: &[String], b: &[String]) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        _ => longest_common_subsequence(a, b) as f64 / a.len().max(b.len()) as f64,
    }
}

fn longest_common_subsequence(a: &[String], b: &[String]) -> usize {
    // Single rolling row over `b`.
    let mut row = vec![0usize; b.len() + 1];
    for x in a {
        let mut diag = 0;
        for (j, y) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if x == y { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    row[b.len()]
}

pub fn score_layout_mode(a: LayoutMode, b: LayoutMode) -> f64 {
    if a == b {
        1.0
    } else {
        0.0
    }
}

pub fn score_position_zone(a: PositionZone, b: PositionZone) -> f64 {
    if a == b {
        1.0
    } else if a.is_adjacent(&b) {
        0.5
    } else {
        0.0
    }
}

pub fn score_aspect_ratio(a: f64, b: f64) -> f64 {
    let ratio = a.min(b) / a.max(b);
    if !ratio.is_finite() {
        return 0.0;
    }
    if ratio >= 0.9 {
        1.0
    } else if ratio >= 0.7 {
        0.8
    } else if ratio >= 0.5 {
        0.5
    } else {
        ratio.max(0.0)
    }
}

/// Jaccard similarity of the two name sets; zero when either side is missing.
pub fn score_child_names(a: Option<&[String]>, b: Option<&[String]>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

pub fn score_parent_name(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (None, None) => NEUTRAL_SCORE,
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(a), Some(b)) if a.contains(b) || b.contains(a) => PARENT_SUBSTRING_CREDIT,
        _ => 0.0,
    }
}

/// Hashes look like `<path length>-<digest>`; near-equal lengths earn a
/// small tie-break credit.
pub fn score_vector_path_hash(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (None, None) => NEUTRAL_SCORE,
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(a), Some(b)) => match (path_length(a), path_length(b)) {
            (Some(la), Some(lb)) if (la.min(lb) as f64 / la.max(lb) as f64) > PATH_LENGTH_RATIO => {
                PATH_LENGTH_CREDIT
            }
            _ => 0.0,
        },
        _ => 0.0,
    }
}

fn path_length(hash: &str) -> Option<u64> {
    let prefix = hash.split('-').next()?;
    prefix.trim().parse::<u64>().ok().filter(|len| *len > 0)
}

/// The first character of a text fingerprint is its length bucket.
pub fn score_text_fingerprint(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (None, None) => NEUTRAL_SCORE,
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(a), Some(b)) if a.chars().next() == b.chars().next() => TEXT_BUCKET_CREDIT,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn nav_bar() -> StructureFeatures {
        StructureFeatures::new(
            s(&["TEXT", "ICON", "TEXT"]),
            LayoutMode::Horizontal,
            300.0,
            48.0,
            PositionZone::Bottom,
        )
    }

    #[test]
    fn child_count_banding() {
        assert_eq!(score_child_count(3, 3), 1.0);
        assert_eq!(score_child_count(3, 4), 0.8);
        assert_eq!(score_child_count(5, 3), 0.5);
        assert_eq!(score_child_count(3, 6), 0.0);
        assert_eq!(score_child_count(0, 100), 0.0);
    }

    #[test]
    fn child_types_is_order_sensitive() {
        assert_eq!(score_child_types(&[], &[]), 1.0);
        assert_eq!(score_child_types(&s(&["TEXT"]), &[]), 0.0);
        assert_eq!(
            score_child_types(&s(&["TEXT", "ICON"]), &s(&["TEXT", "ICON"])),
            1.0
        );
        // LCS of [A,B,C] and [C,B,A] is 1.
        let score = score_child_types(&s(&["A", "B", "C"]), &s(&["C", "B", "A"]));
        assert!((score - 1.0 / 3.0).abs() < 1e-12);
        // LCS of [A,B,C,D] and [A,C] is 2, max len 4.
        assert_eq!(score_child_types(&s(&["A", "B", "C", "D"]), &s(&["A", "C"])), 0.5);
    }

    #[test]
    fn position_zone_adjacency() {
        use PositionZone::*;
        assert_eq!(score_position_zone(Top, Top), 1.0);
        assert_eq!(score_position_zone(Top, Middle), 0.5);
        assert_eq!(score_position_zone(Bottom, Middle), 0.5);
        assert_eq!(score_position_zone(Top, Bottom), 0.0);
    }

    #[test]
    fn aspect_ratio_bands() {
        assert_eq!(score_aspect_ratio(2.0, 2.1), 1.0);
        assert_eq!(score_aspect_ratio(1.0, 1.3), 0.8);
        assert_eq!(score_aspect_ratio(1.0, 1.8), 0.5);
        assert_eq!(score_aspect_ratio(1.0, 4.0), 0.25);
    }

    #[test]
    fn child_names_jaccard() {
        let a = s(&["Label", "Icon"]);
        let b = s(&["Label", "Badge"]);
        assert!((score_child_names(Some(a.as_slice()), Some(b.as_slice())) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(score_child_names(Some(a.as_slice()), None), 0.0);
        // Order and duplicates are irrelevant.
        let c = s(&["Icon", "Label", "Icon"]);
        assert_eq!(score_child_names(Some(a.as_slice()), Some(c.as_slice())), 1.0);
    }

    #[test]
    fn parent_name_rules() {
        assert_eq!(score_parent_name(None, None), NEUTRAL_SCORE);
        assert_eq!(score_parent_name(Some("Header"), None), 0.0);
        assert_eq!(score_parent_name(Some("Header"), Some("Header")), 1.0);
        assert_eq!(
            score_parent_name(Some("Container/TimeRemaining"), Some("TimeRemaining")),
            0.7
        );
        assert_eq!(score_parent_name(Some("Header"), Some("Footer")), 0.0);
    }

    #[test]
    fn vector_path_hash_rules() {
        assert_eq!(score_vector_path_hash(None, None), NEUTRAL_SCORE);
        assert_eq!(score_vector_path_hash(Some("120-abc"), None), 0.0);
        assert_eq!(score_vector_path_hash(Some("120-abc"), Some("120-abc")), 1.0);
        // 115/120 > 0.9
        assert_eq!(score_vector_path_hash(Some("120-abc"), Some("115-def")), 0.3);
        // 100/120 < 0.9
        assert_eq!(score_vector_path_hash(Some("120-abc"), Some("100-def")), 0.0);
        // exactly 0.9 is not enough
        assert_eq!(score_vector_path_hash(Some("100-abc"), Some("90-def")), 0.0);
        assert_eq!(score_vector_path_hash(Some("abc"), Some("abd")), 0.0);
        assert_eq!(score_vector_path_hash(Some("0-abc"), Some("0-abd")), 0.0);
    }

    #[test]
    fn text_fingerprint_rules() {
        assert_eq!(score_text_fingerprint(None, None), NEUTRAL_SCORE);
        assert_eq!(score_text_fingerprint(Some("S:ab"), Some("S:ab")), 1.0);
        assert_eq!(score_text_fingerprint(Some("S:ab"), Some("S:cd")), 0.3);
        assert_eq!(score_text_fingerprint(Some("S:ab"), Some("L:ab")), 0.0);
        assert_eq!(score_text_fingerprint(None, Some("L:ab")), 0.0);
    }

    #[test]
    fn identical_structure_scores_one() {
        let input = nav_bar();
        let similarity = calculate_similarity(&input, &input.clone());
        assert_eq!(similarity.score, 1.0);
        // Structural factors only; no optional side has a value.
        let factors: Vec<_> = similarity.reasons.iter().map(|r| r.factor).collect();
        assert_eq!(
            factors,
            vec![
                Factor::ChildCount,
                Factor::ChildTypes,
                Factor::LayoutMode,
                Factor::PositionZone,
                Factor::AspectRatio
            ]
        );
    }

    #[test]
    fn fully_populated_self_match_scores_one() {
        let input = nav_bar()
            .with_child_names(s(&["Home", "Search", "Profile"]))
            .with_parent_name("Screen/Main")
            .with_vector_path_hash("240-9f8e")
            .with_text_fingerprint("M:tab");
        let similarity = calculate_similarity(&input, &input);
        assert_eq!(similarity.score, 1.0);
        assert_eq!(similarity.reasons.len(), 9);
    }

    #[test]
    fn empty_strings_are_absent() {
        let mut input = nav_bar();
        input.parent_name = Some(String::new());
        let similarity = calculate_similarity(&input, &nav_bar());
        assert_eq!(similarity.score, 1.0);
        assert!(!similarity
            .reasons
            .iter()
            .any(|r| r.factor == Factor::ParentName));
    }

    #[test]
    fn one_sided_context_lowers_score() {
        let input = nav_bar().with_parent_name("Header");
        let similarity = calculate_similarity(&input, &nav_bar());
        // 0.40 structural weight fully matched, 0.17 parent weight at zero.
        assert!((similarity.score - 0.40 / 0.57).abs() < 1e-9);
        let parent = similarity
            .reasons
            .iter()
            .find(|r| r.factor == Factor::ParentName)
            .expect("parent reason emitted");
        assert_eq!(parent.score, 0.0);
        assert_eq!(parent.detail, "input: Header, pattern: (none)");
    }

    #[test]
    fn child_count_difference_flows_into_aggregate() {
        let input = nav_bar();
        let mut pattern = nav_bar();
        pattern.child_count = 5;

        let similarity = calculate_similarity(&input, &pattern);
        let reason = &similarity.reasons[0];
        assert_eq!(reason.factor, Factor::ChildCount);
        assert_eq!(reason.score, 0.5);
        assert_eq!(reason.detail, "input: 3, pattern: 5");
        assert!((similarity.score - (0.40 - 0.08 * 0.5) / 0.40).abs() < 1e-9);
    }

    #[test]
    fn child_names_reason_only_when_overlapping() {
        let input = nav_bar().with_child_names(s(&["A"]));
        let pattern = nav_bar().with_child_names(s(&["B"]));
        let similarity = calculate_similarity(&input, &pattern);
        assert!(!similarity
            .reasons
            .iter()
            .any(|r| r.factor == Factor::ChildNames));
        assert!(similarity.score < 1.0);
    }

    #[test]
    fn child_types_detail_truncates_long_lists() {
        let mut input = nav_bar();
        input.child_types = s(&["A", "B", "C", "D"]);
        input.child_count = 4;
        let similarity = calculate_similarity(&input, &nav_bar());
        assert_eq!(
            similarity.reasons[1].detail,
            "input: [A, B, C...], pattern: [TEXT, ICON, TEXT]"
        );
    }

    #[test]
    fn scores_stay_within_bounds() {
        let a = nav_bar()
            .with_parent_name("Card")
            .with_text_fingerprint("L:title");
        let mut b = StructureFeatures::new(
            s(&["RECTANGLE"]),
            LayoutMode::Vertical,
            20.0,
            400.0,
            PositionZone::Top,
        )
        .with_vector_path_hash("12-ff");
        b.child_count = 9;

        for weights in [Weights::default(), Weights::legacy()] {
            for (x, y) in [(&a, &b), (&b, &a), (&a, &a), (&b, &b)] {
                let score = calculate_similarity_with(x, y, &weights).score;
                assert!((0.0..=1.0).contains(&score), "score {score} out of bounds");
            }
        }
    }

    #[test]
    fn legacy_weights_ignore_context_factors() {
        let input = nav_bar().with_parent_name("Header");
        let similarity = calculate_similarity_with(&input, &nav_bar(), &Weights::legacy());
        assert_eq!(similarity.score, 1.0);
    }
}
