//! Text helpers for CLI output

/// Truncate text to a maximum length with ellipsis
pub fn truncate(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else if max_length <= 3 {
        "...".to_string()
    } else {
        let head: String = text.chars().take(max_length - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello world", 20), "hello world");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hi", 2), "hi");
        assert_eq!(truncate("hello", 3), "...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // must not split in the middle of a multi-byte character
        assert_eq!(truncate("커밋 메시지 컨벤션과 규칙", 8), "커밋 메시...");
    }
}
