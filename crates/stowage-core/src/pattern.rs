//! Wildcard search-criteria compiler.
//!
//! Compiles a path glob into a literal prefix usable for server-side
//! narrowing plus an optional client-side matcher. The only wildcard is `*`,
//! matching a run of characters within a single path segment (it never
//! crosses `/`), expanded non-greedily; `**` collapses to the same wildcard
//! as `*`.
//!
//! The matcher is a small token list rather than a spliced regular
//! expression, so no escaping of pattern metacharacters is needed.

use crate::path;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Wildcard,
}

/// Compiled, full-string anchored path matcher.
#[derive(Debug, Clone)]
pub struct PathPattern {
    tokens: Vec<Token>,
}

impl PathPattern {
    fn parse(pattern: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        for ch in pattern.chars() {
            if ch == '*' {
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                // runs of '*' collapse into one wildcard
                if tokens.last() != Some(&Token::Wildcard) {
                    tokens.push(Token::Wildcard);
                }
            } else {
                literal.push(ch);
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }
        Self { tokens }
    }

    /// Full-string anchored match.
    ///
    /// Wildcards expand to the earliest occurrence of the following literal
    /// (non-greedy) and the expansion may not contain a path separator.
    pub fn is_match(&self, key: &str) -> bool {
        let mut pos = 0usize;
        let mut open = false;
        for (idx, token) in self.tokens.iter().enumerate() {
            match token {
                Token::Wildcard => open = true,
                Token::Literal(lit) => {
                    let last = idx + 1 == self.tokens.len();
                    let rest = &key[pos..];
                    if !open {
                        // anchored at the current position
                        if !rest.starts_with(lit.as_str()) {
                            return false;
                        }
                        pos += lit.len();
                    } else if last {
                        // final literal is anchored at the end
                        if rest.len() < lit.len() || !rest.ends_with(lit.as_str()) {
                            return false;
                        }
                        if rest[..rest.len() - lit.len()].contains('/') {
                            return false;
                        }
                        pos = key.len();
                    } else {
                        match rest.find(lit.as_str()) {
                            Some(offset) if !rest[..offset].contains('/') => {
                                pos += offset + lit.len();
                            }
                            _ => return false,
                        }
                    }
                    open = false;
                }
            }
        }
        if open {
            !key[pos..].contains('/')
        } else {
            pos == key.len()
        }
    }
}

/// Search criteria derived once per list/delete call.
///
/// `prefix` is always a safe narrowing: every matching object's key starts
/// with it. `matcher`, when present, is the authoritative client-side filter
/// applied to every key enumerated inside that prefix.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub prefix: String,
    pub matcher: Option<PathPattern>,
}

impl SearchCriteria {
    /// Compile an optional search pattern.
    ///
    /// - `None` or empty matches everything.
    /// - A pattern without `*` becomes a bare enumeration prefix with no
    ///   matcher.
    /// - A pattern with `*` yields the longest literal directory prefix with
    ///   no wildcard (empty when the wildcard occurs in the first segment)
    ///   plus a compiled matcher.
    pub fn compile(pattern: Option<&str>) -> Self {
        let raw = match pattern {
            Some(p) if !p.is_empty() => p,
            _ => return Self::match_all(),
        };
        let normalized = path::normalize(raw);
        match normalized.find('*') {
            None => Self {
                prefix: normalized.into_owned(),
                matcher: None,
            },
            Some(star) => {
                let prefix = match normalized[..star].rfind('/') {
                    Some(slash) => normalized[..slash].to_string(),
                    None => String::new(),
                };
                Self {
                    prefix,
                    matcher: Some(PathPattern::parse(&normalized)),
                }
            }
        }
    }

    /// Criteria matching every object in the bucket.
    pub fn match_all() -> Self {
        Self {
            prefix: String::new(),
            matcher: None,
        }
    }

    /// Apply the matcher to an enumerated key.
    pub fn accepts(&self, key: &str) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.is_match(key),
            None => true,
        }
    }
}
