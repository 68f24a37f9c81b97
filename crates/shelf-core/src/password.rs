//! Password policy.
//!
//! A password is valid iff it is at least 8 characters long, contains at
//! least one uppercase letter (ASCII or the Lithuanian set Ą Č Ę Ė Į Š Ų Ū Ž)
//! and at least one digit. Every unmet rule is reported, not just the first.

use std::fmt;

pub const MIN_LENGTH: usize = 8;

/// Uppercase letters accepted beyond ASCII A-Z.
const UPPERCASE_EXTRA: &[char] =
  &['Ą', 'Č', 'Ę', 'Ė', 'Į', 'Š', 'Ų', 'Ū', 'Ž'];

/// A single unmet password rule, with a user-facing message as `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
  TooShort,
  NoUppercase,
  NoDigit,
}

impl fmt::Display for PasswordRule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::TooShort => {
        write!(f, "password must be at least {MIN_LENGTH} characters long")
      }
      Self::NoUppercase => {
        write!(f, "password must contain at least one uppercase letter")
      }
      Self::NoDigit => {
        write!(f, "password must contain at least one digit")
      }
    }
  }
}

/// Check `password` against the policy. Empty result means the password is
/// acceptable.
pub fn validate(password: &str) -> Vec<PasswordRule> {
  let mut failures = Vec::new();

  if password.chars().count() < MIN_LENGTH {
    failures.push(PasswordRule::TooShort);
  }
  if !password
    .chars()
    .any(|c| c.is_ascii_uppercase() || UPPERCASE_EXTRA.contains(&c))
  {
    failures.push(PasswordRule::NoUppercase);
  }
  if !password.chars().any(|c| c.is_ascii_digit()) {
    failures.push(PasswordRule::NoDigit);
  }

  failures
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn all_lowercase_fails_two_rules() {
    let failures = validate("abcdefgh");
    assert_eq!(
      failures,
      vec![PasswordRule::NoUppercase, PasswordRule::NoDigit]
    );
  }

  #[test]
  fn valid_password_passes() {
    assert!(validate("Abcdefg1").is_empty());
  }

  #[test]
  fn short_password_fails_length() {
    assert_eq!(validate("ABC123"), vec![PasswordRule::TooShort]);
  }

  #[test]
  fn lithuanian_uppercase_counts() {
    assert!(validate("žąsys1Ėkla").is_empty());
    // Lowercase Lithuanian letters do not satisfy the uppercase rule.
    assert_eq!(validate("žąsys1ėkla"), vec![PasswordRule::NoUppercase]);
  }

  #[test]
  fn everything_wrong_reports_all_rules() {
    assert_eq!(
      validate("abc"),
      vec![
        PasswordRule::TooShort,
        PasswordRule::NoUppercase,
        PasswordRule::NoDigit
      ]
    );
  }
}
