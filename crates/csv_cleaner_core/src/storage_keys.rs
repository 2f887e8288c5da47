pub const DEFAULT_OUTPUT_PREFIX: &str = "processed_";

/// Key the cleaned copy of `original_key` is written under.
pub fn processed_object_key(prefix: &str, original_key: &str) -> String {
    format!("{prefix}{original_key}")
}

/// True when `key` names an object this handler wrote itself.
pub fn is_processed_object_key(prefix: &str, key: &str) -> bool {
    !prefix.is_empty() && key.starts_with(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_the_original_key() {
        assert_eq!(
            processed_object_key(DEFAULT_OUTPUT_PREFIX, "data.csv"),
            "processed_data.csv"
        );
    }

    #[test]
    fn prefix_applies_to_the_whole_key_including_folders() {
        assert_eq!(
            processed_object_key(DEFAULT_OUTPUT_PREFIX, "2024/weather.csv"),
            "processed_2024/weather.csv"
        );
    }

    #[test]
    fn recognizes_own_output() {
        assert!(is_processed_object_key("processed_", "processed_data.csv"));
        assert!(!is_processed_object_key("processed_", "data.csv"));
        assert!(!is_processed_object_key("", "data.csv"));
    }
}
