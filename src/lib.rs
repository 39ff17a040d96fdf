pub mod diff;
pub mod dom;
pub mod error;
pub mod normalize;
pub mod serialize;

pub use diff::{DiffOptions, diff, diff_with_options};
pub use error::CompareError;
pub use normalize::normalize;

use std::path::Path;

/// Normalize both documents and diff their canonical text.
///
/// The names label the `---`/`+++` header lines. An empty result means the
/// documents are equivalent.
pub fn compare_strings(
    name_a: &str,
    html_a: &str,
    name_b: &str,
    html_b: &str,
    options: &DiffOptions,
) -> Vec<String> {
    let canonical_a = normalize(html_a);
    let canonical_b = normalize(html_b);
    diff_with_options(name_a, &canonical_a, name_b, &canonical_b, options)
}

/// Read two UTF-8 HTML files and compare them.
///
/// The header lines name the files by their paths as given.
pub fn compare_files(
    path_a: impl AsRef<Path>,
    path_b: impl AsRef<Path>,
    options: &DiffOptions,
) -> Result<Vec<String>, CompareError> {
    let path_a = path_a.as_ref();
    let path_b = path_b.as_ref();
    let html_a = read_html(path_a)?;
    let html_b = read_html(path_b)?;

    Ok(compare_strings(
        &path_a.display().to_string(),
        &html_a,
        &path_b.display().to_string(),
        &html_b,
        options,
    ))
}

/// Read a file in full and decode it as UTF-8.
pub fn read_html(path: &Path) -> Result<String, CompareError> {
    let data = std::fs::read(path).map_err(|source| CompareError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "read document");
    String::from_utf8(data).map_err(|source| CompareError::Utf8 {
        path: path.to_path_buf(),
        source,
    })
}
