//! Object key generation for new uploads
//!
//! Keys look like `2024/05/aZ3kQ9xB/my-report.pdf`: the UTC year and month keep the
//! bucket browsable, the random salt keeps uploads of the same filename apart.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Utc};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::ValidationError;

/// Length of the random path segment
pub const SALT_LENGTH: usize = 8;

/// Characters that separate slug fragments
static SLUG_DELIMITERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"[\r\n\t !"#$%&'()*+,\-./:;<=>?@\[\\\]^_`{|}~]+"##)
        .expect("slug delimiter pattern is valid")
});

/// Path of an object inside a bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Parses a client supplied path of an existing object
    ///
    /// # Errors
    ///
    /// Returns `ValidationError { field: "path" }` when the path is empty, absolute,
    /// contains empty, `.` or `..` segments, or contains control characters
    pub fn parse(path: &str) -> Result<Self, ValidationError> {
        if path.is_empty() {
            return Err(ValidationError::new("path", "Parameter path is required"));
        }
        if path.chars().any(char::is_control) {
            return Err(ValidationError::new(
                "path",
                "Parameter path must not contain control characters",
            ));
        }
        if path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(ValidationError::new(
                "path",
                "Parameter path must be a relative object name without empty, '.' or '..' segments",
            ));
        }

        Ok(Self(path.to_string()))
    }

    /// Borrow the key as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key and return the owned string
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generates a fresh object key for `original_filename` using the current UTC date
///
/// # Errors
///
/// Returns `ValidationError { field: "filename" }` if the filename is empty or its
/// extension is not in `allowed_extensions`
pub fn generate_object_key(
    original_filename: &str,
    allowed_extensions: &HashSet<String>,
) -> Result<ObjectKey, ValidationError> {
    generate_object_key_at(original_filename, allowed_extensions, Utc::now())
}

/// Same as [`generate_object_key`] with an explicit instant
///
/// # Errors
///
/// See [`generate_object_key`]
pub fn generate_object_key_at(
    original_filename: &str,
    allowed_extensions: &HashSet<String>,
    now: DateTime<Utc>,
) -> Result<ObjectKey, ValidationError> {
    let filename = base_name(original_filename);
    if filename.is_empty() {
        return Err(ValidationError::new(
            "filename",
            "Parameter filename is required",
        ));
    }

    let (stem, extension) = split_extension(filename);
    if !allowed_extensions.contains(extension) {
        let mut allowed: Vec<&str> = allowed_extensions.iter().map(String::as_str).collect();
        allowed.sort_unstable();
        return Err(ValidationError::new(
            "filename",
            format!(
                "Parameter filename has an invalid extension, please only send {}",
                allowed.join(", ")
            ),
        ));
    }

    let slug = slugify(stem);
    if slug.is_empty() {
        tracing::debug!("Filename {original_filename:?} produced an empty slug");
    }

    Ok(ObjectKey(format!(
        "{:04}/{:02}/{}/{}{}",
        now.year(),
        now.month(),
        random_salt(SALT_LENGTH),
        slug,
        extension
    )))
}

/// Everything after the last path separator
fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Splits `name` into stem and extension. Leading dots never start an extension,
/// so `.png` has none and `archive.tar.gz` yields `.gz`.
fn split_extension(name: &str) -> (&str, &str) {
    let leading_dots = name.len() - name.trim_start_matches('.').len();
    match name[leading_dots..].rfind('.') {
        Some(index) => name.split_at(leading_dots + index),
        None => (name, ""),
    }
}

/// ASCII-only slug: lower-case fragments joined by `-`
///
/// Fragments with no ASCII representation after NFKD decomposition are dropped,
/// so text made only of emoji produces an empty slug.
#[must_use]
pub fn slugify(text: &str) -> String {
    SLUG_DELIMITERS
        .split(&text.to_lowercase())
        .map(|fragment| {
            fragment
                .nfkd()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect::<String>()
        })
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Random `[a-zA-Z0-9]` string drawn from the operating system RNG
#[must_use]
pub fn random_salt(length: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
