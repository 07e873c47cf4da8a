//! Lexical splitting of flat command-line strings.
//!
//! Splitting never fails and knows nothing about shapes beyond the bracket
//! stripping the resolver asks for. Spaces separate items, commas separate
//! list elements or map entries, and `=` separates a key from its value.

/// A lexically split command-line value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliValue {
    /// An unsplit string.
    Scalar(String),
    /// Space- or comma-separated items.
    List(Vec<CliValue>),
    /// `key=value` entries in input order; later duplicates win when merged.
    Map(Vec<(String, CliValue)>),
}

impl CliValue {
    /// The string of a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

/// Split `raw` by its delimiters.
///
/// - a space splits into items, each split again
/// - otherwise a comma together with `=` makes one map literal
/// - otherwise a comma makes a list of plain strings
/// - otherwise the input is a scalar
#[must_use]
pub fn lex(raw: &str) -> CliValue {
    if raw.contains(' ') {
        return CliValue::List(
            raw.split(' ')
                .filter(|token| !token.is_empty())
                .map(lex)
                .collect(),
        );
    }
    if raw.contains(',') && raw.contains('=') {
        return CliValue::Map(
            map_literal(raw)
                .into_iter()
                .map(|(k, v)| (k, CliValue::Scalar(v)))
                .collect(),
        );
    }
    if raw.contains(',') {
        return CliValue::List(
            raw.split(',')
                .map(|item| CliValue::Scalar(item.to_owned()))
                .collect(),
        );
    }
    CliValue::Scalar(raw.to_owned())
}

/// Split a map literal into `(key, value)` pairs.
///
/// Fragments between commas that lack `=` are glued back onto the previous
/// entry, as are fragments inside an open `[` or `{`. A leading fragment with
/// nothing to glue onto is dropped. Each entry splits on its first `=`.
#[must_use]
pub fn map_literal(raw: &str) -> Vec<(String, String)> {
    let mut entries: Vec<String> = Vec::new();
    let mut list_depth: i32 = 0;
    let mut map_depth: i32 = 0;

    for fragment in raw.split(',') {
        if list_depth == 0 && map_depth == 0 && fragment.contains('=') {
            entries.push(fragment.to_owned());
        } else if let Some(last) = entries.last_mut() {
            last.push(',');
            last.push_str(fragment);
        } else {
            tracing::debug!(fragment, "dropping map fragment without a key");
            continue;
        }

        if fragment.contains('[') {
            list_depth += 1;
        }
        if fragment.contains('{') {
            map_depth += 1;
        }
        if fragment.contains('}') {
            map_depth -= 1;
        }
        if fragment.contains(']') {
            list_depth -= 1;
        }
    }

    entries
        .into_iter()
        .filter_map(|entry| {
            entry
                .split_once('=')
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
        })
        .collect()
}

/// Split the body of a list argument into item strings.
///
/// Without brackets, items are separated by spaces when any are present and by
/// commas otherwise. With brackets, only a comma directly between `]` and `[`
/// (or `}` and `{`) separates items.
#[must_use]
pub fn split_list(raw: &str) -> Vec<&str> {
    let bracketed = raw.contains(['[', ']', '{', '}']);
    if !bracketed {
        let separator = if raw.contains(' ') { ' ' } else { ',' };
        return raw.split(separator).collect();
    }

    let bytes = raw.as_bytes();
    let mut items = Vec::new();
    let mut start = 0;
    for (i, b) in bytes.iter().enumerate() {
        if *b != b',' || i == 0 {
            continue;
        }
        let prev = bytes[i - 1];
        let next = bytes.get(i + 1).copied();
        let boundary = (prev == b']' && next == Some(b'['))
            || (prev == b'}' && next == Some(b'{'));
        if boundary {
            items.push(&raw[start..i]);
            start = i + 1;
        }
    }
    items.push(&raw[start..]);
    items
}

/// Strip one pair of surrounding `open`/`close` brackets.
#[must_use]
pub fn strip_brackets(raw: &str, open: char, close: char) -> &str {
    raw.strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .unwrap_or(raw)
}
