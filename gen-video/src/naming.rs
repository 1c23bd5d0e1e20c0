//! File naming shared by synthesis output and media pairing.
//!
//! A text file `chapter1.txt` that splits into one chunk becomes `chapter1.wav`;
//! one that splits into several becomes `chapter1-01.wav`, `chapter1-02.wav`, ...
//! The pairer reverses this mapping to recover the base name and chunk index.

/// Build the output file name for a chunk.
///
/// `position` is `None` for a single-chunk source and the 1-based chunk
/// number otherwise.
pub fn chunk_file_name(stem: &str, position: Option<usize>, suffix: &str) -> String {
    match position {
        Some(n) => format!("{}-{:02}{}", stem, n, suffix),
        None => format!("{}{}", stem, suffix),
    }
}

/// Split a file stem into its base name and chunk index.
///
/// A trailing `-NN` made only of ASCII digits is stripped and parsed as the
/// index. Stems without such a suffix are their own base name with index 0.
pub fn parse_chunk_stem(stem: &str) -> (&str, u32) {
    if let Some((base, suffix)) = stem.rsplit_once('-') {
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = suffix.parse::<u32>() {
                return (base, index);
            }
        }
    }
    (stem, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk_name() {
        assert_eq!(chunk_file_name("chapter1", None, ".wav"), "chapter1.wav");
    }

    #[test]
    fn test_multi_chunk_names() {
        let names: Vec<String> = (1..=3)
            .map(|i| chunk_file_name("chapter1", Some(i), ".wav"))
            .collect();
        assert_eq!(
            names,
            vec!["chapter1-01.wav", "chapter1-02.wav", "chapter1-03.wav"]
        );
    }

    #[test]
    fn test_wide_index_is_not_truncated() {
        assert_eq!(chunk_file_name("book", Some(123), ".wav"), "book-123.wav");
    }

    #[test]
    fn test_parse_suffixed_stem() {
        assert_eq!(parse_chunk_stem("intro-01"), ("intro", 1));
        assert_eq!(parse_chunk_stem("intro-12"), ("intro", 12));
        assert_eq!(parse_chunk_stem("intro-7"), ("intro", 7));
    }

    #[test]
    fn test_parse_plain_stem() {
        assert_eq!(parse_chunk_stem("intro"), ("intro", 0));
        assert_eq!(parse_chunk_stem("part-one"), ("part-one", 0));
        assert_eq!(parse_chunk_stem("trailing-"), ("trailing-", 0));
    }

    #[test]
    fn test_only_last_dash_counts() {
        assert_eq!(parse_chunk_stem("my-story-03"), ("my-story", 3));
        assert_eq!(parse_chunk_stem("2024-notes"), ("2024-notes", 0));
    }

    #[test]
    fn test_overflowing_index_is_kept_in_stem() {
        let stem = "x-99999999999999999999";
        assert_eq!(parse_chunk_stem(stem), (stem, 0));
    }

    #[test]
    fn test_names_round_trip_through_parser() {
        let name = chunk_file_name("chapter1", Some(2), "");
        assert_eq!(parse_chunk_stem(&name), ("chapter1", 2));
        let name = chunk_file_name("chapter1", None, "");
        assert_eq!(parse_chunk_stem(&name), ("chapter1", 0));
    }
}
