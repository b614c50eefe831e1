//! Text patterns for single-field arguments and the per-worker cache of compiled patterns.
//!
//! A pattern has two positional slots: `{0}` is the field name and `{1}` is the rendered
//! field value. The value-only ([`FormatPattern::VALUE_ONLY`]) and key-value
//! ([`FormatPattern::KEY_VALUE`]) patterns never need compiling; anything else is compiled
//! on first use and kept in a [`PatternCache`].
//!
//! Pattern syntax follows `java.text.MessageFormat` for the parts that make sense with two
//! string slots:
//!
//! - `{n}` is replaced by argument `n`, or left as `{n}` when there is no such argument.
//! - `''` is a literal quote, text between single quotes is taken literally.
//! - A `}` outside of a slot is literal.
//! - The slot is the bare index, `{ 0 }` is rejected.
//! - Format types such as `{1,number}` are rejected.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

use crate::error::Error;

/// A validated text pattern for a single-field argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FormatPattern(Cow<'static, str>);

impl FormatPattern {
    /// Renders only the value: `{1}`.
    pub const VALUE_ONLY: Self = FormatPattern(Cow::Borrowed("{1}"));

    /// Renders `name=value`: `{0}={1}`.
    pub const KEY_VALUE: Self = FormatPattern(Cow::Borrowed("{0}={1}"));

    /// Validates `pattern`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use logfields::pattern::FormatPattern;
    ///
    /// assert!(FormatPattern::new("{0}:{1}").is_ok());
    /// assert!(FormatPattern::new("{0").is_err());
    /// ```
    pub fn new(pattern: impl Into<String>) -> Result<Self, Error> {
        let pattern = pattern.into();
        CompiledPattern::compile(&pattern)?;
        Ok(FormatPattern(Cow::Owned(pattern)))
    }

    /// The pattern text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_value_only(&self) -> bool {
        *self == Self::VALUE_ONLY
    }

    pub(crate) fn is_key_value(&self) -> bool {
        *self == Self::KEY_VALUE
    }
}

impl Default for FormatPattern {
    fn default() -> Self {
        Self::KEY_VALUE
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Segment {
    Literal(String),
    Argument(usize),
}

/// A parsed pattern, ready to be applied to arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledPattern {
    segments: Vec<Segment>,
}

impl CompiledPattern {
    /// Parses `pattern`.
    pub fn compile(pattern: &str) -> Result<Self, Error> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();
        let mut quoted = false;

        while let Some(c) = chars.next() {
            match c {
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    literal.push('\'');
                }
                '\'' => quoted = !quoted,
                _ if quoted => literal.push(c),
                '{' => {
                    let mut slot = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => slot.push(c),
                            None => return Err(Error::invalid_pattern(pattern, "unmatched braces")),
                        }
                    }

                    if slot.contains(',') {
                        return Err(Error::invalid_pattern(
                            pattern,
                            "format types are not supported",
                        ));
                    }
                    let index = slot.parse().map_err(|_| {
                        Error::invalid_pattern(pattern, "argument index is not a number")
                    })?;

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(core::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Argument(index));
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Applies the pattern to `arguments`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use logfields::pattern::CompiledPattern;
    ///
    /// let pattern = CompiledPattern::compile("'{0}' is {0}, {2} stays").unwrap();
    /// assert_eq!(pattern.format(&["name", "value"]), "{0} is name, {2} stays");
    /// ```
    pub fn format(&self, arguments: &[&str]) -> String {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Argument(index) => match arguments.get(*index) {
                    Some(argument) => output.push_str(argument),
                    None => {
                        output.push('{');
                        output.push_str(&index.to_string());
                        output.push('}');
                    }
                },
            }
        }
        output
    }
}

/// Compiled patterns for one worker.
///
/// Each worker (thread, task, or serialization context) owns its own cache and passes it by
/// `&mut` into rendering, so compiled patterns are never shared between workers. Entries are
/// never evicted: the cache grows with the number of distinct patterns the worker sees, which
/// in practice is bounded by the number of call sites.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: FxHashMap<String, CompiledPattern>,
}

impl PatternCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled form of `pattern`, compiling it on first use.
    pub fn get(&mut self, pattern: &str) -> Result<&CompiledPattern, Error> {
        if !self.compiled.contains_key(pattern) {
            let compiled = CompiledPattern::compile(pattern)?;
            tracing::trace!(pattern, cached = self.compiled.len(), "compiled format pattern");
            self.compiled.insert(pattern.to_owned(), compiled);
        }

        Ok(&self.compiled[pattern])
    }

    /// Number of cached patterns.
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    /// Whether nothing has been compiled yet.
    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::{CompiledPattern, FormatPattern, PatternCache};
    use crate::error::Error;

    #[test_case("{0}:{1}" => "k:5"; "custom separator")]
    #[test_case("{1}" => "5"; "value only")]
    #[test_case("{0}={1}" => "k=5"; "key value")]
    #[test_case("[{1}] {0}" => "[5] k"; "reordered")]
    #[test_case("it''s {1}" => "it's 5"; "escaped quote")]
    #[test_case("'{0}' is {0}" => "{0} is k"; "quoted braces")]
    #[test_case("{0}}" => "k}"; "stray closing brace")]
    #[test_case("{3}" => "{3}"; "missing argument")]
    #[test_case("" => ""; "empty")]
    fn formats(pattern: &str) -> String {
        CompiledPattern::compile(pattern).unwrap().format(&["k", "5"])
    }

    #[test_case("{0"; "unclosed slot")]
    #[test_case("{x}"; "non numeric slot")]
    #[test_case("{}"; "empty slot")]
    #[test_case("{ 0 }"; "whitespace in slot")]
    #[test_case("{1,number}"; "format type")]
    fn rejects(pattern: &str) {
        assert!(matches!(
            FormatPattern::new(pattern),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn well_known_patterns() {
        assert!(FormatPattern::VALUE_ONLY.is_value_only());
        assert!(FormatPattern::KEY_VALUE.is_key_value());
        assert!(FormatPattern::new("{1}").unwrap().is_value_only());
        assert!(!FormatPattern::new("{0}:{1}").unwrap().is_key_value());
        assert_eq!(FormatPattern::default(), FormatPattern::KEY_VALUE);
    }

    #[test]
    fn cache_compiles_once_per_pattern() {
        let mut cache = PatternCache::new();
        assert!(cache.is_empty());

        let first = cache.get("{0}:{1}").unwrap().clone();
        let second = cache.get("{0}:{1}").unwrap().clone();
        cache.get("{1}!").unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_does_not_keep_invalid_patterns() {
        let mut cache = PatternCache::new();
        assert!(cache.get("{0").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn caches_are_independent_per_worker() {
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                std::thread::spawn(move || {
                    let mut cache = PatternCache::new();
                    let pattern = format!("{{0}}#{worker}");
                    let rendered = cache.get(&pattern).unwrap().format(&["field"]);
                    (rendered, cache.len())
                })
            })
            .collect();

        for (worker, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), (format!("field#{worker}"), 1));
        }
    }
}
