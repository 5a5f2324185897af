use rand::{distributions::Alphanumeric, Rng};

pub const MIN_TOKEN_LENGTH: usize = 16;
pub const MAX_TOKEN_LENGTH: usize = 128;

/// Random alphanumeric token for public quote links
pub fn generate_share_token(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

pub fn is_well_formed_token(token: &str) -> bool {
    (MIN_TOKEN_LENGTH..=MAX_TOKEN_LENGTH).contains(&token.len()) && token.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Short prefix safe to log
pub fn token_preview(token: &str) -> &str {
    let end = token.char_indices().nth(8).map(|(i, _)| i).unwrap_or(token.len());
    &token[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_and_well_formed() {
        let a = generate_share_token(32);
        let b = generate_share_token(32);
        assert_eq!(a.len(), 32);
        assert!(is_well_formed_token(&a));
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        assert!(!is_well_formed_token("short"));
        assert!(!is_well_formed_token("abcdefghijklmnop/../etc"));
    }

    #[test]
    fn test_preview() {
        assert_eq!(token_preview("abcdefghijkl"), "abcdefgh");
        assert_eq!(token_preview("abc"), "abc");
    }
}
