/// Split a comma-delimited tag field into distinct trimmed tags.
/// Empty tags after trimming are skipped; duplicates keep first position.
pub fn split_features(features: &str) -> Vec<&str> {
    let mut tags: Vec<&str> = Vec::new();
    for tag in features.split(',') {
        let tag = tag.trim();
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
    }
    tags
}

/// Stable fixed-length fingerprint of a tag, used as the set-index key
/// component so key length is bounded regardless of tag text length.
pub fn feature_fingerprint(tag: &str) -> String {
    format!("{:08x}", crc32fast::hash(tag.trim().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_trims_and_skips_empty() {
        assert_eq!(
            split_features("reclining, washable ,,  , headrest"),
            vec!["reclining", "washable", "headrest"]
        );
        assert!(split_features("").is_empty());
        assert!(split_features(" , ,").is_empty());
    }

    #[test]
    fn split_dedups_tags() {
        assert_eq!(split_features("a, b, a , b"), vec!["a", "b"]);
    }

    #[test]
    fn fingerprint_is_fixed_length_hex() {
        for tag in ["a", "reclining", "a much longer feature tag description"] {
            let fp = feature_fingerprint(tag);
            assert_eq!(fp.len(), 8);
            assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn fingerprint_ignores_surrounding_whitespace() {
        assert_eq!(
            feature_fingerprint(" washable "),
            feature_fingerprint("washable")
        );
        assert_ne!(
            feature_fingerprint("washable"),
            feature_fingerprint("reclining")
        );
    }
}
