//! Similarity-ratio fuzzy matching.
//!
//! Implements the Ratcliff/Obershelp "gestalt" ratio: the total length of
//! recursively found longest common blocks, doubled, over the combined
//! length of both strings. Comparison is case-insensitive. Fuzzy matching
//! is only ever a fallback after exact and substring matching fail.

/// Upper bound on the number of candidates scored per lookup.
///
/// Keeps the quadratic ratio computation bounded when a vocabulary is
/// unexpectedly large.
pub const MAX_FUZZY_CANDIDATES: usize = 10_000;

/// Returns the candidate with the highest similarity to `word`, provided
/// it scores at least `cutoff`.
///
/// Ties on score go to the lexicographically greatest candidate so the
/// result never depends on candidate order.
#[must_use]
pub fn closest_match<'a, I>(word: &str, candidates: I, cutoff: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let word_chars: Vec<char> = word.to_lowercase().chars().collect();
    if word_chars.is_empty() {
        return None;
    }

    let mut best: Option<(f64, &'a str)> = None;

    for candidate in candidates.into_iter().take(MAX_FUZZY_CANDIDATES) {
        let cand_chars: Vec<char> = candidate.to_lowercase().chars().collect();

        if upper_bound(word_chars.len(), cand_chars.len()) < cutoff {
            continue;
        }

        let score = ratio_of(&word_chars, &cand_chars);
        if score < cutoff {
            continue;
        }

        let better = match best {
            None => true,
            Some((best_score, best_name)) => {
                score > best_score || (score == best_score && candidate > best_name)
            }
        };
        if better {
            best = Some((score, candidate));
        }
    }

    if let Some((score, name)) = best {
        log::trace!("fuzzy match '{word}' -> '{name}' ({score:.3})");
    }

    best.map(|(_, name)| name)
}

/// Cheapest bound on the ratio: every character of the shorter string
/// matches.
#[allow(clippy::cast_precision_loss)]
fn upper_bound(len_a: usize, len_b: usize) -> f64 {
    let total = len_a + len_b;
    if total == 0 {
        return 1.0;
    }
    2.0 * len_a.min(len_b) as f64 / total as f64
}

#[allow(clippy::cast_precision_loss)]
fn ratio_of(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(a, b) as f64 / total as f64
}

/// Sums the sizes of all matching blocks found by repeatedly taking the
/// longest common block and recursing on both sides of it.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_block(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, size)`; among equally long blocks the one starting
/// earliest in `a`, then earliest in `b`, wins.
fn longest_block(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    let width = bhi.saturating_sub(blo);
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[col - 1] + 1;
                curr[col] = k;
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            } else {
                curr[col] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_k)
}
