use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;

const MIN_LEN: usize = 8;
const MAX_LEN: usize = 72;

lazy_static! {
    static ref LOWER_RE: Regex = Regex::new(r"[a-z]").unwrap();
    static ref UPPER_RE: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref DIGIT_RE: Regex = Regex::new(r"[0-9]").unwrap();
    static ref SPECIAL_RE: Regex = Regex::new(r"[^a-zA-Z0-9]").unwrap();
}

fn too_short(p: &str) -> bool {
    p.chars().count() < MIN_LEN
}

fn too_long(p: &str) -> bool {
    p.chars().count() > MAX_LEN
}

fn padded(p: &str) -> bool {
    p.starts_with(char::is_whitespace) || p.ends_with(char::is_whitespace)
}

fn too_simple(p: &str) -> bool {
    !(LOWER_RE.is_match(p) && UPPER_RE.is_match(p) && DIGIT_RE.is_match(p) && SPECIAL_RE.is_match(p))
}

// Evaluated in order; a predicate returns true when the password breaks the rule.
const RULES: &[(fn(&str) -> bool, &str)] = &[
    (too_short, "Password must be longer than 8 characters"),
    (too_long, "Password must be less than 72 characters"),
    (padded, "Password must not start or end with an empty space"),
    (
        too_simple,
        "Password must contain 1 upper case, lower case, number, and special character",
    ),
];

/// Checks a candidate password against the complexity rules and returns the
/// message of the first rule it breaks.
pub fn validate_password(password: &str) -> Option<&'static str> {
    RULES
        .iter()
        .find(|(broken, _)| broken(password))
        .map(|(_, message)| *message)
}

/// Argon2id PHC string with a fresh salt from the OS RNG.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("hash password: {}", e))
}

#[cfg(test)]
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    use argon2::password_hash::{Error, PasswordHash, PasswordVerifier};

    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("parse password hash: {}", e))?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("verify password: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_complex_password() {
        assert_eq!(validate_password("11AAbb!!!!"), None);
        assert_eq!(validate_password("111AAAaabb!!!"), None);
    }

    #[test]
    fn rejects_short_password() {
        assert_eq!(
            validate_password("1234567"),
            Some("Password must be longer than 8 characters")
        );
    }

    #[test]
    fn eight_characters_is_long_enough() {
        assert_eq!(validate_password("Aa1!Aa1!"), None);
    }

    #[test]
    fn rejects_long_password() {
        assert_eq!(
            validate_password(&"*".repeat(73)),
            Some("Password must be less than 72 characters")
        );
    }

    #[test]
    fn seventy_two_characters_is_short_enough() {
        let password = format!("Aa1!{}", "x".repeat(68));
        assert_eq!(password.len(), 72);
        assert_eq!(validate_password(&password), None);
    }

    #[test]
    fn rejects_surrounding_whitespace() {
        let msg = Some("Password must not start or end with an empty space");
        assert_eq!(validate_password(" lolololol1@#T"), msg);
        assert_eq!(validate_password("lolololol1@#T "), msg);
        assert_eq!(validate_password("\tlolololol1@#T"), msg);
    }

    #[test]
    fn rejects_missing_special_character() {
        assert_eq!(
            validate_password("111AAAaabb"),
            Some("Password must contain 1 upper case, lower case, number, and special character")
        );
    }

    #[test]
    fn rejects_each_missing_class() {
        let msg =
            Some("Password must contain 1 upper case, lower case, number, and special character");
        assert_eq!(validate_password("aaaaaa1!"), msg);
        assert_eq!(validate_password("AAAAAA1!"), msg);
        assert_eq!(validate_password("AAAaaa!!"), msg);
    }

    #[test]
    fn first_broken_rule_wins() {
        // too short and also lacks every character class
        assert_eq!(
            validate_password(" "),
            Some("Password must be longer than 8 characters")
        );
        // too long and also ends with a space
        assert_eq!(
            validate_password(&format!("{} ", "*".repeat(80))),
            Some("Password must be less than 72 characters")
        );
    }

    #[test]
    fn stored_hash_is_salted_argon2id() {
        let first = hash_password("11AAbb!!!!").expect("hash");
        let second = hash_password("11AAbb!!!!").expect("hash");
        assert!(first.starts_with("$argon2id$"));
        assert!(!first.contains("11AAbb!!!!"));
        assert_ne!(first, second);
        assert!(verify_password("11AAbb!!!!", &first).expect("verify"));
        assert!(verify_password("11AAbb!!!!", &second).expect("verify"));
    }

    #[test]
    fn near_miss_does_not_verify() {
        let hash = hash_password("111AAAaabb!!!").expect("hash");
        for candidate in ["111AAAaabb!!", "111aaaaabb!!!", " 111AAAaabb!!!"] {
            assert!(!verify_password(candidate, &hash).expect("verify"), "{}", candidate);
        }
    }

    #[test]
    fn plaintext_is_not_a_valid_stored_hash() {
        assert!(verify_password("11AAbb!!!!", "11AAbb!!!!").is_err());
    }
}
