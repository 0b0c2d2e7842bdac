use std::collections::HashSet;

/// Stop-words and sentinels are tuned to the label conventions of the source
/// locale (pt-BR with English spillover). They are configuration, not a fixed
/// constant: callers targeting other markets supply their own lists.
const DEFAULT_STOP_WORDS: &[&str] = &[
    // country words
    "brasil",
    "brazil",
    // open/closed targeting
    "aberto",
    "aberta",
    "abertos",
    "abertas",
    "fechado",
    "fechada",
    "fechados",
    "fechadas",
    "open",
    "closed",
    // placement names
    "feed",
    "stories",
    "story",
    "reels",
    "instagram",
    "facebook",
    "messenger",
    // message(s)
    "mensagem",
    "mensagens",
    "message",
    "messages",
];

/// Labels that mean "no specific audience" and never identify a real group.
const DEFAULT_PLACEHOLDER_LABELS: &[&str] = &[
    "todos",
    "todos os públicos",
    "todos os publicos",
    "all",
    "all audiences",
    "geral",
    "-",
];

const DEFAULT_CURRENCY_SYMBOLS: &[&str] = &["r$", "$", "€", "£"];

#[derive(Debug, Clone)]
pub struct CanonicalizerConfig {
    pub stop_words: Vec<String>,
    pub placeholder_labels: Vec<String>,
    pub currency_symbols: Vec<String>,
}

impl Default for CanonicalizerConfig {
    fn default() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            placeholder_labels: DEFAULT_PLACEHOLDER_LABELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            currency_symbols: DEFAULT_CURRENCY_SYMBOLS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Turns noisy, human-edited group labels into order-independent signatures.
/// Pure and total; equal real-world labels that differ only in word order,
/// punctuation, targeting noise or price fragments canonicalize identically.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    stop_words: HashSet<String>,
    placeholder_signatures: HashSet<String>,
    currency_symbols: Vec<String>,
}

impl Canonicalizer {
    pub fn new(config: CanonicalizerConfig) -> Self {
        let stop_words: HashSet<String> =
            config.stop_words.iter().map(|w| w.to_lowercase()).collect();
        // longest symbol first so "r$" wins over "$"
        let mut currency_symbols: Vec<String> = config
            .currency_symbols
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        currency_symbols.sort_by_key(|s| std::cmp::Reverse(s.len()));

        let mut canon = Self {
            stop_words,
            placeholder_signatures: HashSet::new(),
            currency_symbols,
        };
        canon.placeholder_signatures = config
            .placeholder_labels
            .iter()
            .map(|l| canon.canonicalize(l))
            .collect();
        canon
    }

    /// Lowercases, blanks brackets/parens, drops stop-words, `NN-NN` age
    /// ranges and currency-amount fragments, and collapses whitespace.
    pub fn normalize(&self, label: &str) -> String {
        let lowered: String = label
            .to_lowercase()
            .chars()
            .map(|c| match c {
                '[' | ']' | '(' | ')' => ' ',
                other => other,
            })
            .collect();

        let kept: Vec<&str> = lowered
            .split_whitespace()
            .filter(|token| {
                let word = token.trim_matches(|c: char| !c.is_alphanumeric());
                if word.is_empty() {
                    return false;
                }
                if self.stop_words.contains(word) {
                    return false;
                }
                if is_age_range(word) {
                    return false;
                }
                !self.is_currency_amount(token)
            })
            .collect();

        kept.join(" ")
    }

    /// Order-independent token signature: normalize, tokenize on runs of
    /// non-alphanumeric characters, drop tokens shorter than three characters,
    /// sort lexicographically. Idempotent; empty input yields empty output.
    pub fn canonicalize(&self, label: &str) -> String {
        let normalized = self.normalize(label);
        let mut tokens: Vec<&str> = normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() >= 3)
            .collect();
        tokens.sort_unstable();
        tokens.join(" ")
    }

    /// True for labels that do not name a real advertising group: empty
    /// signatures and "all audiences" sentinels. Such records are excluded
    /// before identity resolution.
    pub fn is_placeholder(&self, label: &str) -> bool {
        let signature = self.canonicalize(label);
        signature.is_empty() || self.placeholder_signatures.contains(&signature)
    }

    fn is_currency_amount(&self, token: &str) -> bool {
        for symbol in &self.currency_symbols {
            if let Some(rest) = token.strip_prefix(symbol.as_str()) {
                if !rest.is_empty()
                    && rest
                        .chars()
                        .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
                {
                    return true;
                }
            }
        }
        false
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(CanonicalizerConfig::default())
    }
}

/// Age-range token of the shape `NN-NN`.
fn is_age_range(word: &str) -> bool {
    let mut parts = word.split('-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => {
            !a.is_empty()
                && !b.is_empty()
                && a.chars().all(|c| c.is_ascii_digit())
                && b.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

/// Collapses internal runs of whitespace and trims. Used where a raw label is
/// shown to users without going through canonicalization.
pub fn clean_whitespace(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}
