//! Plate consensus over noisy per-image OCR reads.
//!
//! Each photo of an ad yields zero or more raw OCR guesses. A single photo
//! can misread badly (glare, angle, mud), so no single read is trusted.
//! Instead all valid reads vote: mutually consistent reads score high,
//! outliers are dropped, and the surviving reads elect a symbol per
//! position. The result is folded to canonical Cyrillic.
//!
//! The vote is a function of the read multiset only - image order and
//! candidate order within an image do not affect the outcome.

use crate::plate::{canonicalize, is_valid_plate};

/// Derive the best-guess plate from per-image OCR read-sets.
///
/// Returns `None` only when no read survives grammar validation. That is a
/// recoverable "plate not determined" condition, not an error.
pub fn consensus_plate(reads_per_image: &[Vec<String>]) -> Option<String> {
    let pool: Vec<Vec<char>> = reads_per_image
        .iter()
        .flatten()
        .filter(|read| is_valid_plate(read))
        .map(|read| read.chars().collect())
        .collect();

    if pool.is_empty() {
        return None;
    }

    let scores = similarity_scores(&pool);
    let survivors = filter_outliers(&pool, &scores);
    // A non-empty pool always keeps its top scorer, but if filtering ever
    // yields nothing the full pool votes rather than discarding all evidence.
    let raw = if survivors.is_empty() {
        positional_vote(&pool.iter().collect::<Vec<_>>())
    } else {
        positional_vote(&survivors)
    };

    Some(canonicalize(&raw))
}

/// Pairwise similarity score per candidate: for candidate `i`, the number of
/// position-wise symbol agreements summed over every other candidate.
///
/// Comparison runs over the overlapping length only, so an 8-symbol read
/// against a 9-symbol read compares 8 positions and the trailing position
/// counts as a mismatch.
fn similarity_scores(pool: &[Vec<char>]) -> Vec<u32> {
    pool.iter()
        .enumerate()
        .map(|(i, a)| {
            pool.iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, b)| a.iter().zip(b.iter()).filter(|(x, y)| x == y).count() as u32)
                .sum()
        })
        .collect()
}

/// Drop candidates scoring below half the mean score.
///
/// Protects the vote from a minority of badly-misread images without
/// requiring unanimity.
fn filter_outliers<'a>(pool: &'a [Vec<char>], scores: &[u32]) -> Vec<&'a Vec<char>> {
    let mean = scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64;
    pool.iter()
        .zip(scores)
        .filter(|(_, &score)| score as f64 >= mean * 0.5)
        .map(|(candidate, _)| candidate)
        .collect()
}

/// Per-position plurality vote. Ties keep the symbol encountered first in
/// candidate order, which is stable for a given multiset.
fn positional_vote(candidates: &[&Vec<char>]) -> String {
    let max_len = candidates.iter().map(|c| c.len()).max().unwrap_or(0);
    let mut plate = String::with_capacity(max_len);

    for pos in 0..max_len {
        let mut tally: Vec<(char, u32)> = Vec::new();
        for candidate in candidates {
            if let Some(&symbol) = candidate.get(pos) {
                match tally.iter_mut().find(|(seen, _)| *seen == symbol) {
                    Some((_, count)) => *count += 1,
                    None => tally.push((symbol, 1)),
                }
            }
        }
        if let Some(&(symbol, _)) = tally
            .iter()
            .reduce(|best, entry| if entry.1 > best.1 { entry } else { best })
        {
            plate.push(symbol);
        }
    }

    plate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reads(sets: &[&[&str]]) -> Vec<Vec<String>> {
        sets.iter()
            .map(|inner| inner.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_single_outlier_position_corrected() {
        let input = reads(&[&["X471HK96"], &["X471HK96"], &["X371HK96"]]);
        assert_eq!(consensus_plate(&input), Some("Х471НК96".to_string()));
    }

    #[test]
    fn test_all_empty_read_sets() {
        let input = reads(&[&[], &[], &[]]);
        assert_eq!(consensus_plate(&input), None);
    }

    #[test]
    fn test_no_input_at_all() {
        assert_eq!(consensus_plate(&[]), None);
    }

    #[test]
    fn test_invalid_reads_are_discarded() {
        // Garbage-only pool resolves to none
        let input = reads(&[&["garbage", "12"], &["???"]]);
        assert_eq!(consensus_plate(&input), None);

        // Garbage alongside one valid read resolves to the valid read
        let input = reads(&[&["garbage"], &["X471HK96", "no-plate"]]);
        assert_eq!(consensus_plate(&input), Some("Х471НК96".to_string()));
    }

    #[test]
    fn test_order_invariance() {
        let forward = reads(&[&["X471HK96", "X471HK96"], &["X371HK96"], &["X471HK96"]]);
        let backward = reads(&[&["X471HK96"], &["X371HK96"], &["X471HK96", "X471HK96"]]);
        let shuffled = reads(&[&["X371HK96", "X471HK96"], &["X471HK96"], &["X471HK96"]]);

        let expected = Some("Х471НК96".to_string());
        assert_eq!(consensus_plate(&forward), expected);
        assert_eq!(consensus_plate(&backward), expected);
        assert_eq!(consensus_plate(&shuffled), expected);
    }

    #[test]
    fn test_cyrillic_reads_vote_with_latin() {
        // The same physical plate read in both scripts is two distinct
        // symbol sequences; the majority script wins per position and the
        // result is canonical either way.
        let input = reads(&[&["Х471НК96"], &["Х471НК96"], &["X471HK96"]]);
        assert_eq!(consensus_plate(&input), Some("Х471НК96".to_string()));
    }

    #[test]
    fn test_mixed_lengths_do_not_panic() {
        let input = reads(&[&["А123ВС45"], &["А123ВС456"], &["А123ВС45"]]);
        let result = consensus_plate(&input).unwrap();
        assert!(result.starts_with("А123ВС45"));
    }

    #[test]
    fn test_similarity_scores_reward_agreement() {
        let pool: Vec<Vec<char>> = ["X471HK96", "X471HK96", "X371HK96"]
            .iter()
            .map(|s| s.chars().collect())
            .collect();
        let scores = similarity_scores(&pool);
        // The two identical reads agree on 8 symbols with each other and 7
        // with the outlier; the outlier gets 7 from each of them.
        assert_eq!(scores, vec![15, 15, 14]);
    }

    #[test]
    fn test_filter_outliers_drops_low_scores() {
        let pool: Vec<Vec<char>> = ["X471HK96", "K999MM11"]
            .iter()
            .map(|s| s.chars().collect())
            .collect();
        // Handcrafted scores: mean 10, threshold 5
        let kept = filter_outliers(&pool, &[19, 1]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0], &pool[0]);
    }

    #[test]
    fn test_filter_outliers_keeps_equal_scores() {
        let pool: Vec<Vec<char>> = ["X471HK96", "K999MM11"]
            .iter()
            .map(|s| s.chars().collect())
            .collect();
        // Fully disagreeing pair scores 0 each; 0 >= 0 keeps both
        let kept = filter_outliers(&pool, &[0, 0]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_positional_vote_tie_keeps_first() {
        let a: Vec<char> = "X471HK96".chars().collect();
        let b: Vec<char> = "X571HK96".chars().collect();
        let vote = positional_vote(&[&a, &b]);
        assert_eq!(vote, "X471HK96");
    }
}
