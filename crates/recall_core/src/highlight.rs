use regex::{Regex, RegexBuilder};

pub const HIGHLIGHT_OPEN: &str = r#"<span style="background-color: yellow;">"#;
pub const HIGHLIGHT_CLOSE: &str = "</span>";

const METACHARACTERS: [char; 14] = [
    '.', '*', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\',
];

/// Escapes regex metacharacters so `query` matches as a literal substring.
pub fn escape_literal(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() * 2);
    for ch in query.chars() {
        if METACHARACTERS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Which part of the page markup is eligible for replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightScope {
    /// Replace across the whole markup string, tags and attribute values
    /// included. A query that occurs inside a tag corrupts that tag.
    #[default]
    Markup,
    /// Only replace in the text between tags; `<...>` runs are copied verbatim.
    TextNodes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted {
    pub content: String,
    pub matches: usize,
}

/// Case-insensitive literal matcher for one query.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Regex,
}

impl Highlighter {
    /// Returns `None` for an empty query, which highlights nothing.
    pub fn new(query: &str) -> Option<Self> {
        if query.is_empty() {
            return None;
        }
        // Unicode simple case folding: `é` matches `É`, and also `s` matches
        // `ſ` and `k` matches the Kelvin sign, which a plain `/gi` in a
        // browser would not. An escaped literal only fails to compile when
        // it exceeds the regex size limit; treat that as nothing to highlight.
        RegexBuilder::new(&escape_literal(query))
            .case_insensitive(true)
            .build()
            .ok()
            .map(|pattern| Self { pattern })
    }

    pub fn apply(&self, content: &str, scope: HighlightScope) -> Highlighted {
        let mut out = String::with_capacity(content.len());
        let matches = match scope {
            HighlightScope::Markup => self.wrap_into(content, &mut out),
            HighlightScope::TextNodes => self.wrap_text_nodes(content, &mut out),
        };
        Highlighted {
            content: out,
            matches,
        }
    }

    fn wrap_text_nodes(&self, markup: &str, out: &mut String) -> usize {
        let mut matches = 0;
        let mut rest = markup;
        while let Some(start) = rest.find('<') {
            let (text, tail) = rest.split_at(start);
            matches += self.wrap_into(text, out);
            let end = tail.find('>').map_or(tail.len(), |idx| idx + 1);
            out.push_str(&tail[..end]);
            rest = &tail[end..];
        }
        matches + self.wrap_into(rest, out)
    }

    fn wrap_into(&self, text: &str, out: &mut String) -> usize {
        let mut last = 0;
        let mut matches = 0;
        for found in self.pattern.find_iter(text) {
            out.push_str(&text[last..found.start()]);
            out.push_str(HIGHLIGHT_OPEN);
            out.push_str(found.as_str());
            out.push_str(HIGHLIGHT_CLOSE);
            last = found.end();
            matches += 1;
        }
        out.push_str(&text[last..]);
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::escape_literal;

    #[test]
    fn escapes_every_metacharacter() {
        assert_eq!(
            escape_literal(r".*+?^${}()|[]\"),
            r"\.\*\+\?\^\$\{\}\(\)\|\[\]\\"
        );
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(escape_literal("hello world-42"), "hello world-42");
    }
}
