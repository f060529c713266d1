//! Slug resolution.
//!
//! A slug is derived from a document path and used as the lookup key in the
//! record store. Previously stored slugs were produced by this exact
//! transform, so it must stay stable.

/// Characters rewritten before filtering, paired index-by-index with
/// [`REPLACEMENTS`].
const ACCENTED: &str = "åàáãäâèéëêìíïîòóöôùúüûñç·/_,:;";
const REPLACEMENTS: &str = "aaaaaaeeeeiiiioooouuuunc------";

/// Derive the URL-safe slug for a document path.
///
/// The input is trimmed and lower-cased, accented Latin letters lose their
/// accents, separators (`· / _ , : ;`) and spaces turn into `-`, anything
/// outside `[a-z0-9-]` is dropped, and dash runs are collapsed and trimmed.
///
/// ```
/// use sharenote_kernel::slugify;
///
/// assert_eq!(slugify("  My Notes/Déjà vu, Part 1  "), "my-notes-deja-vu-part-1");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());

    for ch in input.trim().to_lowercase().chars() {
        let ch = match substitute(ch) {
            c @ ('a'..='z' | '0'..='9') => c,
            ' ' | '-' => '-',
            _ => continue,
        };

        // Leading dashes and dash runs never make it into the output.
        if ch == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(ch);
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

fn substitute(ch: char) -> char {
    ACCENTED
        .chars()
        .zip(REPLACEMENTS.chars())
        .find_map(|(from, to)| (from == ch).then_some(to))
        .unwrap_or(ch)
}
