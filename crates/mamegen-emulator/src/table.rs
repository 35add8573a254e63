//! Semicolon-delimited data tables with single-quote quoting

/// Split one row into fields. A field starting with `'` runs to the next
/// unpaired `'`; `''` inside it stands for a literal quote.
pub(crate) fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' if quoted => {
                if chars.peek() == Some(&'\'') {
                    field.push('\'');
                    chars.next();
                } else {
                    quoted = false;
                }
            }
            '\'' if field.is_empty() => quoted = true,
            ';' if !quoted => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    fields.push(field);
    fields
}

/// Non-blank rows of a table with their 1-based line numbers
pub(crate) fn rows(contents: &str) -> impl Iterator<Item = (usize, Vec<String>)> + '_ {
    contents
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| (n, split_row(line)))
}
