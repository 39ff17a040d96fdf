//! Line-based unified diff over canonical text.

use similar::{Algorithm, DiffOp, DiffTag, capture_diff_slices, group_diff_ops};

/// Options controlling the diff report.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Unchanged lines shown around each change.
    pub context: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self { context: 3 }
    }
}

/// Unified diff of `text_a` against `text_b` with three lines of context.
///
/// Returns no lines at all when the texts have identical lines.
pub fn diff(name_a: &str, text_a: &str, name_b: &str, text_b: &str) -> Vec<String> {
    diff_with_options(name_a, text_a, name_b, text_b, &DiffOptions::default())
}

/// Unified diff with explicit options.
pub fn diff_with_options(
    name_a: &str,
    text_a: &str,
    name_b: &str,
    text_b: &str,
    options: &DiffOptions,
) -> Vec<String> {
    let old: Vec<&str> = text_a.lines().collect();
    let new: Vec<&str> = text_b.lines().collect();

    let ops = capture_diff_slices(Algorithm::Myers, &old, &new);
    let hunks = group_diff_ops(ops, options.context);

    let mut report = Vec::new();
    for hunk in &hunks {
        if report.is_empty() {
            report.push(format!("--- {name_a}"));
            report.push(format!("+++ {name_b}"));
        }
        write_hunk(hunk, &old, &new, &mut report);
    }

    tracing::debug!(hunks = hunks.len(), lines = report.len(), "diff computed");
    report
}

fn write_hunk(ops: &[DiffOp], old: &[&str], new: &[&str], report: &mut Vec<String>) {
    let (Some(first), Some(last)) = (ops.first(), ops.last()) else {
        return;
    };
    let old_start = first.old_range().start;
    let old_end = last.old_range().end;
    let new_start = first.new_range().start;
    let new_end = last.new_range().end;

    report.push(format!(
        "@@ -{} +{} @@",
        format_range(old_start, old_end),
        format_range(new_start, new_end)
    ));

    for op in ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                for line in &old[old_range] {
                    report.push(format!(" {line}"));
                }
            }
            DiffTag::Delete => {
                for line in &old[old_range] {
                    report.push(format!("-{line}"));
                }
            }
            DiffTag::Insert => {
                for line in &new[new_range] {
                    report.push(format!("+{line}"));
                }
            }
            DiffTag::Replace => {
                for line in &old[old_range] {
                    report.push(format!("-{line}"));
                }
                for line in &new[new_range] {
                    report.push(format!("+{line}"));
                }
            }
        }
    }
}

/// Format a half-open line range the way `diff -u` does.
///
/// A single line is written as its 1-based number alone; an empty range
/// names the line before it.
fn format_range(start: usize, end: usize) -> String {
    let len = end - start;
    match len {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        _ => format!("{},{len}", start + 1),
    }
}
