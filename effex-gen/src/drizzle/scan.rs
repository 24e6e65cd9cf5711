//! Bracket-aware scanning over TypeScript source
//!
//! Brackets, quotes and comment markers are ASCII, so byte offsets found here
//! always fall on char boundaries.

/// One top-level entry of an object literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Entry {
    /// Entry text with comments removed, trimmed
    pub text: String,
    /// 1-based line of the first significant character
    pub line: usize,
    /// 1-based column of the first significant character
    pub column: usize,
}

/// Index of the bracket closing the one at `open`
pub(super) fn find_closing(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open;

    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'{' | b'[' => depth += 1,
            b')' | b'}' | b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            b'"' | b'\'' | b'`' => i = skip_string(bytes, i)?,
            b'/' if bytes.get(i + 1) == Some(&b'/') => i = skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i)?,
            _ => {}
        }
        i += 1;
    }

    None
}

/// Split `source[start..end]` on commas outside any brackets or strings
pub(super) fn split_entries(source: &str, start: usize, end: usize) -> Vec<Entry> {
    let bytes = source.as_bytes();
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut first: Option<usize> = None;
    let mut depth = 0usize;
    let mut seg_start = start;
    let mut i = start;

    while i < end {
        let byte = bytes[i];
        let next = bytes.get(i + 1).copied();

        if byte == b'/' && matches!(next, Some(b'/' | b'*')) {
            current.push_str(&source[seg_start..i]);
            current.push(' ');
            let stop = if next == Some(b'/') {
                skip_line_comment(bytes, i)
            } else {
                skip_block_comment(bytes, i).unwrap_or(end)
            };
            i = stop.saturating_add(1).min(end);
            seg_start = i;
            continue;
        }

        if !byte.is_ascii_whitespace() && byte != b',' && first.is_none() {
            first = Some(i);
        }

        match byte {
            b'"' | b'\'' | b'`' => {
                i = skip_string(bytes, i).unwrap_or(end).min(end);
            }
            b'(' | b'{' | b'[' => depth += 1,
            b')' | b'}' | b']' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                current.push_str(&source[seg_start..i]);
                flush(source, &mut current, &mut first, &mut entries);
                seg_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    current.push_str(&source[seg_start..end.max(seg_start)]);
    flush(source, &mut current, &mut first, &mut entries);
    entries
}

fn flush(source: &str, current: &mut String, first: &mut Option<usize>, out: &mut Vec<Entry>) {
    let text = current.trim();
    if let (false, Some(at)) = (text.is_empty(), *first) {
        let (line, column) = line_col(source, at);
        out.push(Entry {
            text: text.to_string(),
            line,
            column,
        });
    }
    current.clear();
    *first = None;
}

/// 1-based line and column of a byte offset
pub(super) fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |n| n + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

fn skip_string(bytes: &[u8], open: usize) -> Option<usize> {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len() - 1, |n| start + n)
}

fn skip_block_comment(bytes: &[u8], start: usize) -> Option<usize> {
    bytes[start + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map(|n| start + 2 + n + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_closing_skips_strings_and_comments() {
        let text = r#"({ a: "}", /* } */ b: 1 })"#;
        assert_eq!(find_closing(text, 0), Some(text.len() - 1));
        assert_eq!(find_closing(text, 1), Some(text.len() - 2));
    }

    #[test]
    fn test_find_closing_unbalanced() {
        assert_eq!(find_closing("({ a: 1 ", 0), None);
    }

    #[test]
    fn test_split_entries_tracks_positions() {
        let text = "{\n  a: f(1, 2),\n  // note\n  b: [3, 4]\n}";
        let close = find_closing(text, 0).unwrap();
        let entries = split_entries(text, 1, close);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "a: f(1, 2)");
        assert_eq!((entries[0].line, entries[0].column), (2, 3));
        assert_eq!(entries[1].text, "b: [3, 4]");
        assert_eq!(entries[1].line, 4);
    }

    #[test]
    fn test_line_col() {
        assert_eq!(line_col("ab\ncd", 4), (2, 2));
        assert_eq!(line_col("ab", 0), (1, 1));
    }
}
