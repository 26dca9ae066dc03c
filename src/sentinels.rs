//! Page-local footnote sentinel sequences.

/// `*`, `**`, `***`, ... without end.
pub fn star_sentinels() -> impl Iterator<Item = String> {
    (1..).map(|n| "*".repeat(n))
}

/// `1`, `2`, `3`, ... for documents that number footnotes per page.
pub fn digit_sentinels() -> impl Iterator<Item = String> {
    (1u32..).map(|n| n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_sequence_grows_by_one() {
        let first: Vec<String> = star_sentinels().take(3).collect();
        assert_eq!(first, ["*", "**", "***"]);
    }

    #[test]
    fn digit_sequence_counts_from_one() {
        let first: Vec<String> = digit_sentinels().take(3).collect();
        assert_eq!(first, ["1", "2", "3"]);
    }
}
