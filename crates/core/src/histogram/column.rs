use regex::Regex;
use std::sync::LazyLock;

static ALIAS_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+as\s+").expect("valid alias regex"));

/// The histogram's target: a column name, or an expression with an optional
/// trailing `AS <alias>`.
///
/// Used verbatim in the subquery's select list. Queries that read raw rows
/// (bounds, equality count) use [`Column::expression`]; the aggregate over the
/// subquery's output uses [`Column::alias`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    raw: String,
    split: Option<(usize, usize)>,
}

impl Column {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let split = find_alias_delimiter(&raw);
        Self { raw, split }
    }

    pub fn as_selected(&self) -> &str {
        &self.raw
    }

    /// Everything before the alias delimiter.
    pub fn expression(&self) -> &str {
        match self.split {
            Some((start, _)) => self.raw[..start].trim(),
            None => self.raw.trim(),
        }
    }

    /// Everything after the alias delimiter.
    pub fn alias(&self) -> &str {
        match self.split {
            Some((_, end)) => self.raw[end..].trim(),
            None => self.raw.trim(),
        }
    }

    pub fn has_alias(&self) -> bool {
        self.split.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.expression().is_empty() || self.alias().is_empty()
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// First ` as ` outside any parentheses, so `CAST(x AS REAL)` stays whole.
fn find_alias_delimiter(raw: &str) -> Option<(usize, usize)> {
    ALIAS_DELIMITER
        .find_iter(raw)
        .find(|m| paren_depth(&raw[..m.start()]) == 0)
        .map(|m| (m.start(), m.end()))
}

fn paren_depth(prefix: &str) -> i32 {
    prefix.chars().fold(0, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    })
}
