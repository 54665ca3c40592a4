/// Iterate over every position where `pattern` occurs in `haystack`, left to
/// right. Overlapping occurrences are all reported. The iterator is lazy;
/// calling again with the same arguments restarts the scan from the front.
pub fn scan<'h>(haystack: &'h [u8], pattern: &'h [u8]) -> impl Iterator<Item = usize> + 'h {
    let window = pattern.len().max(1);

    haystack
        .windows(window)
        .enumerate()
        .filter(move |(_, w)| !pattern.is_empty() && *w == pattern)
        .map(|(i, _)| i)
}

/// Position of the first occurrence of `pattern` in `haystack`, if any.
pub fn find(haystack: &[u8], pattern: &[u8]) -> Option<usize> {
    scan(haystack, pattern).next()
}
