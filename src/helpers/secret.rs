use rand::Rng;

/// Length of generated Drupal hash salts.
pub const HASH_SALT_LENGTH: usize = 64;

pub fn make_secret(len: usize) -> String {
    const CHARSET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
    let mut rng = rand::thread_rng();

    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_secret_length_and_charset() {
        let secret = make_secret(HASH_SALT_LENGTH);
        assert_eq!(secret.len(), 64);
        assert!(secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_make_secret_differs_between_calls() {
        assert_ne!(make_secret(32), make_secret(32));
    }
}
