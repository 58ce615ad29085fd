#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub offset: usize, // byte offset into source
}

impl SourceLocation {
    pub fn new() -> Self {
        SourceLocation {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    pub fn advance(&mut self, source_char: char) {
        self.offset += source_char.len_utf8();
        if source_char == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Represents a span within a source string, using an inclusive `start` location
/// and an exclusive `end` location.
///
/// `end` may point one position past the last character of the source when the
/// span reaches end of input, which keeps `source[start.offset..end.offset]`
/// valid for every span the lexer produces. The `EOF` token has an empty span
/// located at the end of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    pub fn empty_at(location: SourceLocation) -> Self {
        Self::new(location, location)
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Returns a `&str` for this range, with an exclusive end.
    pub fn as_str<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start.offset..self.end.offset]
    }

    pub fn as_range(&self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }

    /// The smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &SourceSpan) -> SourceSpan {
        let start = if other.start.offset < self.start.offset {
            other.start
        } else {
            self.start
        };
        let end = if other.end.offset > self.end.offset {
            other.end
        } else {
            self.end
        };
        SourceSpan::new(start, end)
    }
}

impl std::fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.start)
    }
}

impl From<SourceSpan> for miette::SourceSpan {
    fn from(span: SourceSpan) -> Self {
        miette::SourceSpan::from(span.as_range())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_lines_and_columns() {
        let mut loc = SourceLocation::new();
        for c in "ab\ncd".chars() {
            loc.advance(c);
        }
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 3);
        assert_eq!(loc.offset, 5);
    }

    #[test]
    fn merge_covers_both_spans() {
        let source = "x := 1 + 22";
        let mut a_start = SourceLocation::new();
        for c in "x := ".chars() {
            a_start.advance(c);
        }
        let mut a_end = a_start;
        a_end.advance('1');

        let mut b_start = a_end;
        for c in " + ".chars() {
            b_start.advance(c);
        }
        let mut b_end = b_start;
        b_end.advance('2');
        b_end.advance('2');

        let a = SourceSpan::new(a_start, a_end);
        let b = SourceSpan::new(b_start, b_end);
        assert_eq!(a.merge(&b).as_str(source), "1 + 22");
        assert_eq!(b.merge(&a).as_str(source), "1 + 22");
    }
}
