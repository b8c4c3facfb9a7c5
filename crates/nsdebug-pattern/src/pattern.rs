use regex::Regex;
use thiserror::Error;
use tracing::trace;

const SEPARATOR: char = ',';
const NEGATION: char = '-';
const WILDCARD: &str = r"\*";
const LAZY_ANY: &str = ".*?";

/// Errors raised while compiling a pattern
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Pattern token {token:?} did not compile: {source}")]
    InvalidRegex {
        token: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled enable pattern.
///
/// Holds one anchored alternation for the positive tokens and one anchored
/// matcher per negative token.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    positive: Option<Regex>,
    negatives: Vec<Regex>,
}

impl Pattern {
    /// Compile a raw pattern such as `"mongo:*,redis*,-redis:noisy"`.
    pub fn compile(raw: &str) -> Result<Self, PatternError> {
        let mut positives = Vec::new();
        let mut negatives = Vec::new();

        for token in raw.split(SEPARATOR).filter(|t| !t.is_empty()) {
            match token.strip_prefix(NEGATION) {
                Some(excluded) => negatives.push(compile_anchored(&glob_to_regex(excluded), token)?),
                None => positives.push(glob_to_regex(token)),
            }
        }

        // An empty alternation would still match the empty namespace.
        let positive = if positives.is_empty() {
            None
        } else {
            Some(compile_anchored(&positives.join("|"), raw)?)
        };

        trace!(
            pattern = raw,
            positives = positives.len(),
            negatives = negatives.len(),
            "compiled namespace pattern"
        );

        Ok(Self {
            source: raw.to_string(),
            positive,
            negatives,
        })
    }

    /// Whether `namespace` satisfies a positive token and no negative one.
    pub fn matches(&self, namespace: &str) -> bool {
        self.matches_positive(namespace) && !self.is_excluded(namespace)
    }

    /// Whether `namespace` satisfies at least one positive token.
    pub fn matches_positive(&self, namespace: &str) -> bool {
        self.positive
            .as_ref()
            .is_some_and(|re| re.is_match(namespace))
    }

    /// Whether `namespace` is hit by any negative token.
    pub fn is_excluded(&self, namespace: &str) -> bool {
        self.negatives.iter().any(|re| re.is_match(namespace))
    }

    /// The raw string this pattern was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The anchored positive alternation, if any positive token exists.
    pub fn positive_regex(&self) -> Option<&str> {
        self.positive.as_ref().map(Regex::as_str)
    }

    /// The anchored negative matchers, in token order.
    pub fn negative_regexes(&self) -> impl Iterator<Item = &str> {
        self.negatives.iter().map(Regex::as_str)
    }
}

impl std::str::FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Escape every regex metacharacter, then turn the escaped `*` back into a
/// lazy any-sequence.
fn glob_to_regex(token: &str) -> String {
    regex::escape(token).replace(WILDCARD, LAZY_ANY)
}

fn compile_anchored(body: &str, token: &str) -> Result<Regex, PatternError> {
    Regex::new(&format!("^({})$", body)).map_err(|source| PatternError::InvalidRegex {
        token: token.to_string(),
        source,
    })
}
