//! Canned replies for greetings and pleasantries.

use strsim::normalized_levenshtein;

/// Default `(phrase, reply)` table, in priority order for fuzzy ties.
pub const DEFAULT_CANNED: &[(&str, &str)] = &[
    ("hello", "Hello! How can I help you today?"),
    ("hi", "Hi there! What can I assist you with?"),
    ("hey", "Hey! How can I assist you?"),
    ("how are you", "I'm doing great! How can I help you today?"),
    ("thank you", "You're welcome!"),
    ("thanks", "Glad to help!"),
    ("bye", "Goodbye! Have a nice day!"),
    ("good morning", "Good morning! How can I assist you today?"),
    ("good evening", "Good evening! How may I help you?"),
];

/// How a normalized query is compared with the table phrases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmallTalkPolicy {
    Exact,
    /// Accept the best phrase whose normalized Levenshtein similarity is
    /// `>= cutoff`.
    Fuzzy { cutoff: f64 },
}

impl Default for SmallTalkPolicy {
    fn default() -> Self {
        SmallTalkPolicy::Fuzzy { cutoff: 0.8 }
    }
}

#[derive(Debug, Clone)]
pub struct SmallTalkMatcher {
    table: Vec<(String, String)>,
    policy: SmallTalkPolicy,
}

impl SmallTalkMatcher {
    /// Phrases are normalized on construction.
    pub fn new<P, R>(table: impl IntoIterator<Item = (P, R)>, policy: SmallTalkPolicy) -> Self
    where
        P: AsRef<str>,
        R: Into<String>,
    {
        let table = table
            .into_iter()
            .map(|(p, r)| (normalize(p.as_ref()), r.into()))
            .collect();
        Self { table, policy }
    }

    pub fn with_default_table(policy: SmallTalkPolicy) -> Self {
        Self::new(DEFAULT_CANNED.iter().copied(), policy)
    }

    /// Returns the canned reply for `raw`, if it is small talk.
    pub fn detect(&self, raw: &str) -> Option<&str> {
        let q = normalize(raw);
        if q.is_empty() {
            return None;
        }

        match self.policy {
            SmallTalkPolicy::Exact => self
                .table
                .iter()
                .find(|(p, _)| *p == q)
                .map(|(_, r)| r.as_str()),
            SmallTalkPolicy::Fuzzy { cutoff } => {
                let mut best: Option<(f64, &str)> = None;
                for (phrase, reply) in &self.table {
                    let sim = normalized_levenshtein(&q, phrase);
                    if sim >= cutoff && best.is_none_or(|(b, _)| sim > b) {
                        best = Some((sim, reply.as_str()));
                    }
                }
                best.map(|(_, r)| r)
            }
        }
    }
}

impl Default for SmallTalkMatcher {
    fn default() -> Self {
        Self::with_default_table(SmallTalkPolicy::default())
    }
}

/// Trim, lowercase, collapse inner whitespace, drop trailing `!?.,`.
pub fn normalize(raw: &str) -> String {
    let collapsed = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed
        .trim_end_matches(['!', '?', '.', ','])
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization() {
        assert_eq!(normalize("  How   ARE\tyou?!  "), "how are you");
        assert_eq!(normalize("Thanks ..."), "thanks");
        assert_eq!(normalize("?!"), "");
    }

    #[test]
    fn every_table_phrase_maps_to_its_reply() {
        let m = SmallTalkMatcher::default();
        for (phrase, reply) in DEFAULT_CANNED {
            assert_eq!(m.detect(phrase), Some(*reply), "phrase {phrase}");
        }
    }

    #[test]
    fn hello_variants() {
        let m = SmallTalkMatcher::default();
        assert_eq!(m.detect("Hello!"), Some("Hello! How can I help you today?"));
        assert_eq!(m.detect("  HELLO  "), Some("Hello! How can I help you today?"));
        // one edit in five characters is exactly at the cutoff
        assert_eq!(m.detect("helo"), Some("Hello! How can I help you today?"));
    }

    #[test]
    fn questions_are_not_small_talk() {
        let m = SmallTalkMatcher::default();
        assert_eq!(m.detect("What are your IPTV plans?"), None);
        assert_eq!(m.detect("hello, my internet is down"), None);
        assert_eq!(m.detect(""), None);
    }

    #[test]
    fn exact_policy_rejects_typos() {
        let m = SmallTalkMatcher::with_default_table(SmallTalkPolicy::Exact);
        assert_eq!(m.detect("thank you!"), Some("You're welcome!"));
        assert_eq!(m.detect("thank yuo"), None);
    }

    #[test]
    fn fuzzy_ties_go_to_first_entry() {
        let m = SmallTalkMatcher::new(
            [("abcd", "first"), ("abce", "second")],
            SmallTalkPolicy::Fuzzy { cutoff: 0.7 },
        );
        assert_eq!(m.detect("abcx"), Some("first"));
    }
}
