use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

/// Whitespace as browsers define it for `\s`: includes U+FEFF, excludes U+0085.
const WS: &str = r"\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    let part = format!("[^{WS}@]+");
    Regex::new(&format!(r"^{part}@{part}\.{part}$")).expect("email pattern compiles")
});

/// Check an email is present and shaped like `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}
