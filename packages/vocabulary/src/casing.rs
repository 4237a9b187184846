//! Canonical casing for place, crop and subdivision names.
//!
//! Applied once when records are loaded and again when the vocabulary is
//! built, so that every later comparison works on a single casing.

/// Title-cases a name: the first letter after any non-letter is upper-cased
/// and every other letter is lower-cased. Surrounding whitespace is
/// trimmed and inner runs of whitespace collapse to one space.
///
/// `"andhra  PRADESH"` becomes `"Andhra Pradesh"`, `"jammu & kashmir"`
/// becomes `"Jammu & Kashmir"`.
#[must_use]
pub fn title_case(input: &str) -> String {
    let collapsed = collapse_whitespace(input);
    let mut out = String::with_capacity(collapsed.len());
    let mut prev_is_letter = false;

    for c in collapsed.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}

/// Canonical form of a rainfall subdivision code: trimmed, whitespace
/// collapsed, upper-cased.
#[must_use]
pub fn subdivision_case(input: &str) -> String {
    collapse_whitespace(input).to_uppercase()
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
