use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use subtle::ConstantTimeEq;

/// Secret material (reset tokens, temporary passwords) comes from the OS
/// CSPRNG, never from a seeded generator.
pub fn generate_secret(length: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

pub fn generate_reset_token() -> String {
    generate_secret(32)
}

pub fn generate_temp_password() -> String {
    generate_secret(8)
}

/// Constant-time comparison for reset tokens.
pub fn tokens_match(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_alphanumeric_and_sized() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(generate_temp_password().len(), 8);
    }

    #[test]
    fn consecutive_secrets_differ() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }

    #[test]
    fn token_comparison() {
        assert!(tokens_match("abc123", "abc123"));
        assert!(!tokens_match("abc123", "abc124"));
        assert!(!tokens_match("abc123", "abc1234"));
    }
}
