use std::ops::Range;

use codespan_reporting::diagnostic::Diagnostic as CsDiagnostic;
use codespan_reporting::diagnostic::Label;
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term::termcolor::Buffer;
use codespan_reporting::term::{emit, Config};
use miette::Diagnostic as MietteDiagnostic;
use miette::{GraphicalReportHandler, GraphicalTheme, NamedSource, Report};

use crate::Error;

// codespan rejects ranges past the end of the file, and an end-of-input span
// reads better on the last line than on the empty line after a final newline
fn clamp_to_source(range: Range<usize>, source: &str) -> Range<usize> {
    let end = range.end.min(source.len());
    let start = range.start.min(end);

    let trimmed = source.trim_end_matches('\n').len();
    if start == end && start > trimmed {
        trimmed..trimmed
    } else {
        start..end
    }
}

// the span and message of the primary label, falling back to the first label
type Location = (Range<usize>, Option<String>);

fn location_of_miette_diagnostic(diag: &dyn MietteDiagnostic) -> Option<Location> {
    let mut first_secondary = None;
    if let Some(labels) = diag.labels() {
        for label in labels {
            let start = label.offset();
            let found = (start..start + label.len(), label.label().map(str::to_string));

            if label.primary() {
                return Some(found);
            }
            if first_secondary.is_none() {
                first_secondary = Some(found);
            }
        }
    }
    first_secondary
}

fn to_codespan_diagnostic(error: &Error, source: &str) -> CsDiagnostic<()> {
    let mut diag = CsDiagnostic::<()>::error().with_message(error.to_string());

    if let Some(code) = error.code() {
        diag = diag.with_code(code.to_string());
    }

    if let Some((range, message)) = location_of_miette_diagnostic(error) {
        let mut label = Label::primary((), clamp_to_source(range.clone(), source));
        if let Some(message) = message {
            label = label.with_message(message);
        }
        diag.labels.push(label);

        // any further labels are secondary
        if let Some(labels) = error.labels() {
            for extra in labels.filter(|l| (l.offset()..l.offset() + l.len()) != range) {
                let loc = clamp_to_source(extra.offset()..extra.offset() + extra.len(), source);
                let message = extra.label().unwrap_or("");
                diag.labels.push(Label::secondary((), loc).with_message(message));
            }
        }
    }

    if let Some(help) = error.help() {
        diag.notes.push(help.to_string());
    }

    diag
}

fn render_with(mut writer: Buffer, error: &Error, filename: &str, source: &str) -> String {
    let file = SimpleFile::new(filename, source);
    let diagnostic = to_codespan_diagnostic(error, source);

    if emit(&mut writer, &Config::default(), &file, &diagnostic).is_err() {
        return format!("{}: {}\n", error.stage(), error);
    }

    String::from_utf8(writer.into_inner())
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Renders `error` against `source` with ANSI colours.
pub fn format_diagnostic(error: &Error, filename: &str, source: &str) -> String {
    render_with(Buffer::ansi(), error, filename, source)
}

/// Same as `format_diagnostic`, for output that is not a terminal.
pub fn format_plain_diagnostic(error: &Error, filename: &str, source: &str) -> String {
    render_with(Buffer::no_color(), error, filename, source)
}

fn render_report(error: &Error, filename: &str, source: &str, mut theme: GraphicalTheme) -> String {
    theme.characters.error = "error:".to_string();

    let named_source = NamedSource::new(filename, source.to_owned());
    let report = Report::new(error.clone()).with_source_code(named_source);

    let mut output = String::new();
    match GraphicalReportHandler::new_themed(theme).render_report(&mut output, &*report) {
        Ok(()) => output,
        Err(_) => format!("{}: {}\n", error.stage(), error),
    }
}

/// Renders `error` natively through miette's graphical handler.
pub fn format_report(error: &Error, filename: &str, source: &str) -> String {
    render_report(error, filename, source, GraphicalTheme::unicode())
}
