//! Line wrapping for long keyword values.

/// Closing delimiter for each region the wrapper avoids breaking inside.
fn closing(open: u8) -> Option<u8> {
    match open {
        b'"' => Some(b'"'),
        b'\'' => Some(b'\''),
        b'<' => Some(b'>'),
        _ => None,
    }
}

/// Value text prepared for wrapping.
struct Prepared {
    text: Vec<u8>,
    /// Inclusive `(open, close)` byte positions of quoted and unit regions.
    quoted: Vec<(usize, usize)>,
}

impl Prepared {
    /// Drop line breaks, squeeze runs of spaces outside quotes and record
    /// where quoted regions are.
    fn new(text: &str) -> Self {
        let mut out: Vec<u8> = Vec::with_capacity(text.len());
        let mut quoted = Vec::new();
        let mut open: Option<(u8, usize)> = None;
        for &c in text.as_bytes() {
            if c == b'\n' || c == b'\r' {
                continue;
            }
            if open.is_none() && c == b' ' && out.last() == Some(&b' ') {
                continue;
            }
            let pos = out.len();
            out.push(c);
            match open {
                None => open = closing(c).map(|close| (close, pos)),
                Some((close, start)) if c == close => {
                    quoted.push((start, pos));
                    open = None;
                }
                Some(_) => {}
            }
        }
        Self { text: out, quoted }
    }

    fn is_quoted(&self, pos: usize) -> bool {
        self.quoted.iter().any(|&(start, end)| pos >= start && pos <= end)
    }

    /// Where to end the line that starts at `offset` when `limit` bytes fit.
    ///
    /// Prefers the last space outside quotes that is not followed by a unit,
    /// then any space not preceded by `-`. Without either, the line runs on
    /// to the next such space.
    fn break_at(&self, offset: usize, limit: usize) -> usize {
        let rest = &self.text[offset..];
        let mut good = None;
        let mut pos = limit;
        loop {
            if rest[pos] == b' ' && !(pos > 0 && rest[pos - 1] == b'-') {
                if good.is_none() {
                    good = Some(pos);
                }
                if !self.is_quoted(offset + pos) && pos + 1 < rest.len() && rest[pos + 1] != b'<' {
                    return pos;
                }
            }
            if pos <= 1 {
                break;
            }
            pos -= 1;
        }
        match good {
            Some(pos) if pos > 0 => pos,
            _ => (limit + 1..rest.len())
                .find(|&i| rest[i] == b' ' && rest[i - 1] != b'-')
                .unwrap_or(rest.len()),
        }
    }
}

/// Append `text` to `out`, wrapping at spaces so lines stay within `char_limit`.
///
/// `start_column` is the column the text starts at. Continuation lines are
/// indented to it, plus one when the text opens with `(` or `"`.
pub fn write_wrapped(out: &mut String, text: &str, start_column: usize, char_limit: usize, eol: &str) {
    let prepared = Prepared::new(text);
    let space_for_text = char_limit
        .saturating_sub(1 + eol.len() + start_column)
        .max(1);
    let indent = match prepared.text.first() {
        Some(b'(' | b'"') => start_column + 1,
        _ => start_column,
    };

    let bytes = &prepared.text;
    let mut printed = 0;
    while printed < bytes.len() {
        let remaining = bytes.len() - printed;
        let split = if space_for_text >= remaining {
            remaining
        } else {
            prepared.break_at(printed, space_for_text)
        };
        out.push_str(&String::from_utf8_lossy(&bytes[printed..printed + split]));
        printed += split;

        if printed < bytes.len() {
            out.push_str(eol);
            out.extend(std::iter::repeat_n(' ', indent));
            if bytes[printed] == b' ' {
                printed += 1;
            }
        }
    }
}
