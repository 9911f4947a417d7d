//! Diagnostic rendering for errors that point into label text.

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::{ErrorKind, PvlError};

impl PvlError {
    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename, source.len());
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
        source_len: usize,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range = match self.span {
            Some(span) => {
                let start = (span.start as usize).min(source_len);
                start..(span.end as usize).clamp(start, source_len)
            }
            None => 0..0,
        };
        let root = self.root_cause();

        let mut report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message(&self.message);

        if self.span.is_some() {
            let label = match root.kind {
                ErrorKind::Parse if root.message.starts_with("Missing right") => {
                    "opened here without a closing delimiter".to_string()
                }
                ErrorKind::Parse => root.message.clone(),
                _ => "here".to_string(),
            };
            report = report.with_label(
                Label::new((filename, range))
                    .with_message(label)
                    .with_color(Color::Red),
            );
        }

        for cause in self.chain().skip(1) {
            report = report.with_note(&cause.message);
        }

        if let Some(help) = self.chain().find_map(|e| e.help.as_deref()) {
            report = report.with_help(help);
        }
        report
    }
}
