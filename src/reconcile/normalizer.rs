use std::fmt;

/// Comparison key for an organization name.
///
/// Holds only `[a-z0-9 +]`, never starts or ends with a space and never
/// contains two spaces in a row. The only way to build one is [`normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalName(String);

impl CanonicalName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for CanonicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps a raw name onto its canonical key.
///
/// Drops every character other than ASCII letters, digits, space and `+`,
/// collapses space runs, lowercases and trims. Dropped characters leave no
/// gap behind, so `"A&B"` becomes `"ab"` while `"A & B"` becomes `"a b"`.
pub fn normalize(raw: &str) -> CanonicalName {
    let mut key = String::with_capacity(raw.len());

    for ch in raw.chars() {
        match ch {
            ' ' => {
                if !key.is_empty() && !key.ends_with(' ') {
                    key.push(' ');
                }
            }
            '+' => key.push('+'),
            c if c.is_ascii_alphanumeric() => key.push(c.to_ascii_lowercase()),
            _ => {}
        }
    }

    if key.ends_with(' ') {
        key.pop();
    }

    CanonicalName(key)
}
