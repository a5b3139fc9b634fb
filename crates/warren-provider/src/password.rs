//! Generated machine passwords

use rand::Rng;
use rand::seq::SliceRandom;

pub const GENERATED_PASSWORD_LENGTH: usize = 32;

/// Random printable ASCII password from the thread-local CSPRNG
///
/// Always contains at least one lowercase letter, one uppercase letter and
/// one digit; the guaranteed characters are shuffled into random positions.
pub fn generate_password() -> String {
    let mut rng = rand::rng();

    let mut chars: Vec<char> = (0..GENERATED_PASSWORD_LENGTH - 3)
        .map(|_| char::from(rng.random_range(b'!'..=b'~')))
        .collect();
    chars.push(char::from(rng.random_range(b'a'..=b'z')));
    chars.push(char::from(rng.random_range(b'A'..=b'Z')));
    chars.push(char::from(rng.random_range(b'0'..=b'9')));

    chars.shuffle(&mut rng);
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_classes() {
        for _ in 0..200 {
            let password = generate_password();
            assert_eq!(password.len(), GENERATED_PASSWORD_LENGTH);
            assert!(password.chars().all(|c| c.is_ascii_graphic()));
            assert!(password.chars().any(|c| c.is_ascii_lowercase()));
            assert!(password.chars().any(|c| c.is_ascii_uppercase()));
            assert!(password.chars().any(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_passwords_differ() {
        assert_ne!(generate_password(), generate_password());
    }
}
