//! Test utilities shared by the PVL crates.

use similar::{ChangeTag, TextDiff};

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `warn` so passing tests stay quiet.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Render a line diff between two texts, marking removed lines with `-`
/// and added lines with `+`.
pub fn text_diff(expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(sign);
        out.push_str(change.value());
        if !change.value().ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Assert that two texts are equal, printing a line diff when they are not.
#[track_caller]
pub fn assert_text_eq(expected: &str, actual: &str) {
    if expected != actual {
        tracing::error!("text mismatch");
        panic!(
            "text mismatch (- expected, + actual):\n{}",
            text_diff(expected, actual)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_marks_changes() {
        let diff = text_diff("a\nb\n", "a\nc\n");
        assert_eq!(diff, " a\n-b\n+c\n");
    }

    #[test]
    fn test_equal_texts_pass() {
        assert_text_eq("same\n", "same\n");
    }

    #[test]
    #[should_panic(expected = "text mismatch")]
    fn test_unequal_texts_panic() {
        assert_text_eq("one\n", "two\n");
    }
}
