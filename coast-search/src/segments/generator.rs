//! Partitioning of the dimension space into boolean query segments.
//!
//! Every subset of the dimension set is one cell of the partition: the
//! dimensions in the subset are asserted (AND of their positive clauses) and
//! the rest are excluded (their negative clauses). The empty subset has no
//! positive clause of its own, so it is anchored twice: once on a random
//! phrase (segment 0) and once on the configured seed (segment 1).
//!
//! Ids for the remaining subsets follow one rule: subsets are enumerated by
//! decreasing size, and within a size in lexicographic order of dimension
//! position; the n-th subset in that order gets id `n + 2`. For three
//! dimensions `a, b, c` that is:
//!
//! | id | logic |
//! |----|-------|
//! | 2 | `a + b + c` |
//! | 3 | `a + b + !(c)` |
//! | 4 | `a + c + !(b)` |
//! | 5 | `b + c + !(a)` |
//! | 6 | `a + !(b + c)` |
//! | 7 | `b + !(a + c)` |
//! | 8 | `c + !(a + b)` |

use serde::{Deserialize, Serialize};

use super::clause::{quote, DimensionClauses};
use crate::errors::{ConfigurationError, Result};

/// Segment anchored on the random phrase.
pub const RANDOM_SEGMENT_ID: u32 = 0;
/// Segment anchored on the seed phrase.
pub const SEED_SEGMENT_ID: u32 = 1;
/// First id handed out to a non-empty subset.
pub const FIRST_SUBSET_SEGMENT_ID: u32 = 2;
/// Largest supported number of dimensions.
pub const MAX_DIMENSIONS: usize = 16;

/// One cell of the logical partition, rendered as a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// Segment id (0 and 1 are the baselines).
    pub segment_id: u32,
    /// Human-readable boolean expression, e.g. `topic + !(reasoning)`.
    pub logic: String,
    /// Provider-syntax query string.
    pub query: String,
}

impl Segment {
    /// Creates a new segment.
    #[must_use]
    pub fn new(segment_id: u32, logic: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            segment_id,
            logic: logic.into(),
            query: query.into(),
        }
    }

    /// Whether this is one of the two reserved baseline segments.
    #[must_use]
    pub fn is_baseline(&self) -> bool {
        self.segment_id == RANDOM_SEGMENT_ID || self.segment_id == SEED_SEGMENT_ID
    }
}

/// Number of segments produced for `dimensions` dimensions: `2^N + 1`.
///
/// `None` above [`MAX_DIMENSIONS`], where generation is refused.
#[must_use]
pub fn expected_segment_count(dimensions: usize) -> Option<usize> {
    if dimensions > MAX_DIMENSIONS {
        return None;
    }
    Some((1usize << dimensions) + 1)
}

/// Enumerates every subset of `0..n` in id-assignment order.
///
/// Subsets come by decreasing size, lexicographic within a size; the empty
/// subset is last.
#[must_use]
pub fn enumerate_subsets(n: usize) -> Vec<Vec<usize>> {
    let capacity = u32::try_from(n)
        .ok()
        .and_then(|shift| 1usize.checked_shl(shift))
        .unwrap_or_default();
    let mut subsets = Vec::with_capacity(capacity);
    for size in (0..=n).rev() {
        let mut current = Vec::with_capacity(size);
        push_combinations(0, n, size, &mut current, &mut subsets);
    }
    subsets
}

fn push_combinations(
    start: usize,
    n: usize,
    size: usize,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if current.len() == size {
        out.push(current.clone());
        return;
    }
    for i in start..n {
        current.push(i);
        push_combinations(i + 1, n, size, current, out);
        current.pop();
    }
}

/// Generates every segment for the given dimensions, ordered by id.
///
/// `random_phrase` and `seed` are inserted verbatim (quoted) into segments 0
/// and 1, so identical inputs always produce identical output.
pub fn generate(
    dimensions: &[DimensionClauses],
    seed: &str,
    random_phrase: &str,
) -> Result<Vec<Segment>> {
    let n = dimensions.len();
    if n == 0 {
        return Err(ConfigurationError::NoDimensions.into());
    }
    if n > MAX_DIMENSIONS {
        return Err(ConfigurationError::invalid_value(
            "dimensions",
            format!("at most {MAX_DIMENSIONS} dimensions are supported, got {n}"),
        )
        .into());
    }
    if let Some(empty) = dimensions.iter().find(|d| d.is_empty()) {
        return Err(ConfigurationError::EmptyDimension {
            name: empty.name.clone(),
        }
        .into());
    }

    let mut segments = Vec::with_capacity(expected_segment_count(n).unwrap_or_default());
    let mut next_id = FIRST_SUBSET_SEGMENT_ID;

    for subset in enumerate_subsets(n) {
        let complement: Vec<&DimensionClauses> = dimensions
            .iter()
            .enumerate()
            .filter(|(i, _)| !subset.contains(i))
            .map(|(_, d)| d)
            .collect();
        let included: Vec<&DimensionClauses> = subset.iter().map(|&i| &dimensions[i]).collect();

        let excluded_names = join_names(&complement);
        let negatives: String = complement.iter().map(|d| d.negative.as_str()).collect();

        if included.is_empty() {
            segments.push(Segment::new(
                RANDOM_SEGMENT_ID,
                format!("random + !({excluded_names})"),
                format!("{} {negatives}", quote(random_phrase)),
            ));
            segments.push(Segment::new(
                SEED_SEGMENT_ID,
                format!("seed + !({excluded_names})"),
                format!("{} {negatives}", quote(seed)),
            ));
            continue;
        }

        let positives = included
            .iter()
            .map(|d| d.positive.as_str())
            .collect::<Vec<_>>()
            .join(" AND ");
        let included_names = join_names(&included);

        let segment = if complement.is_empty() {
            Segment::new(next_id, included_names, positives)
        } else {
            Segment::new(
                next_id,
                format!("{included_names} + !({excluded_names})"),
                format!("{positives} {negatives}"),
            )
        };
        tracing::debug!(segment_id = segment.segment_id, logic = %segment.logic, "Generated segment");
        segments.push(segment);
        next_id += 1;
    }

    segments.sort_by_key(|s| s.segment_id);

    tracing::info!(
        dimensions = n,
        segments = segments.len(),
        "Generated query segments"
    );

    Ok(segments)
}

fn join_names(dimensions: &[&DimensionClauses]) -> String {
    dimensions
        .iter()
        .map(|d| d.name.as_str())
        .collect::<Vec<_>>()
        .join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensions::Dimension;
    use pretty_assertions::assert_eq;

    fn clauses(dims: &[(&str, &[&str])]) -> Vec<DimensionClauses> {
        dims.iter()
            .map(|(name, words)| {
                DimensionClauses::from_dimension(&Dimension::new(*name, words.iter().copied()))
            })
            .collect()
    }

    fn three_dimensions() -> Vec<DimensionClauses> {
        clauses(&[("a", &["x"]), ("b", &["y"]), ("c", &["z"])])
    }

    #[test]
    fn test_single_dimension_example() {
        let dims = clauses(&[("topic", &["credibility", "assessment"])]);
        let segments = generate(&dims, "software", "annexs mug regions").unwrap();

        assert_eq!(
            segments,
            vec![
                Segment::new(
                    0,
                    "random + !(topic)",
                    r#""annexs mug regions" -"credibility" -"assessment" "#
                ),
                Segment::new(1, "seed + !(topic)", r#""software" -"credibility" -"assessment" "#),
                Segment::new(2, "topic", r#"("credibility" OR "assessment")"#),
            ]
        );
    }

    #[test]
    fn test_segment_count_is_two_to_the_n_plus_one() {
        let names = ["a", "b", "c", "d", "e", "f"];
        for n in 1..=names.len() {
            let dims: Vec<_> = names[..n]
                .iter()
                .map(|name| DimensionClauses::from_dimension(&Dimension::new(*name, [*name])))
                .collect();
            let segments = generate(&dims, "seed", "random words here").unwrap();
            assert_eq!(segments.len(), (1 << n) + 1, "n = {n}");
            assert_eq!(Some(segments.len()), expected_segment_count(n));

            let ids: Vec<u32> = segments.iter().map(|s| s.segment_id).collect();
            let expected: Vec<u32> = (0..=(1u32 << n)).collect();
            assert_eq!(ids, expected);
        }
    }

    #[test]
    fn test_three_dimension_ordering() {
        let segments = generate(&three_dimensions(), "seed", "r").unwrap();
        let logic: Vec<&str> = segments.iter().map(|s| s.logic.as_str()).collect();

        assert_eq!(
            logic,
            vec![
                "random + !(a + b + c)",
                "seed + !(a + b + c)",
                "a + b + c",
                "a + b + !(c)",
                "a + c + !(b)",
                "b + c + !(a)",
                "a + !(b + c)",
                "b + !(a + c)",
                "c + !(a + b)",
            ]
        );
    }

    #[test]
    fn test_mid_segment_query_shape() {
        let segments = generate(&three_dimensions(), "seed", "r").unwrap();
        let seg = segments.iter().find(|s| s.segment_id == 4).unwrap();
        assert_eq!(seg.query, r#"("x") AND ("z") -"y" "#);

        let seg = segments.iter().find(|s| s.segment_id == 8).unwrap();
        assert_eq!(seg.query, r#"("z") -"x" -"y" "#);
    }

    #[test]
    fn test_baselines_have_no_and() {
        let segments = generate(&three_dimensions(), "software", "alpha beta gamma").unwrap();

        assert!(segments[0].query.starts_with(r#""alpha beta gamma" "#));
        assert!(segments[1].query.starts_with(r#""software" "#));
        for seg in &segments[..2] {
            assert!(seg.is_baseline());
            assert!(!seg.query.contains(" AND "));
        }
    }

    #[test]
    fn test_full_subset_has_no_negation() {
        let segments = generate(&three_dimensions(), "seed", "r").unwrap();
        let full = &segments[2];
        assert_eq!(full.logic, "a + b + c");
        assert_eq!(full.query, r#"("x") AND ("y") AND ("z")"#);
        assert!(!full.query.contains('-'));
        assert!(!full.logic.contains('!'));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = generate(&three_dimensions(), "seed", "one two three").unwrap();
        let second = generate(&three_dimensions(), "seed", "one two three").unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_rejects_no_dimensions() {
        let err = generate(&[], "seed", "r").unwrap_err();
        assert!(matches!(
            err,
            crate::errors::CoastError::Configuration(ConfigurationError::NoDimensions)
        ));
    }

    #[test]
    fn test_rejects_dimension_without_words() {
        let dims = vec![
            DimensionClauses::from_dimension(&Dimension::new("topic", ["a"])),
            DimensionClauses::from_dimension(&Dimension::new("empty", Vec::<String>::new())),
        ];
        let err = generate(&dims, "software", "x y z").unwrap_err();
        assert!(matches!(
            err,
            crate::errors::CoastError::Configuration(ConfigurationError::EmptyDimension { ref name })
                if name == "empty"
        ));
    }

    #[test]
    fn test_expected_segment_count_is_bounded() {
        assert_eq!(expected_segment_count(1), Some(3));
        assert_eq!(expected_segment_count(3), Some(9));
        assert_eq!(expected_segment_count(MAX_DIMENSIONS), Some((1 << MAX_DIMENSIONS) + 1));
        assert_eq!(expected_segment_count(MAX_DIMENSIONS + 1), None);
        assert_eq!(expected_segment_count(64), None);
    }

    #[test]
    fn test_enumerate_subsets_covers_power_set() {
        let subsets = enumerate_subsets(4);
        assert_eq!(subsets.len(), 16);
        assert_eq!(subsets.first().unwrap(), &vec![0, 1, 2, 3]);
        assert!(subsets.last().unwrap().is_empty());

        let mut sorted = subsets.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 16);
    }
}
