//! Keyword-matched canned replies: the offline answer path.
//!
//! When no remote generator is configured, or the remote call fails, a
//! character answers from its [`ReplyBook`]: the question is classified into
//! a [`Topic`] by keyword, and one of that character's curated lines for the
//! topic is chosen uniformly at random. Classification and candidate lookup
//! are pure; randomness is injected so tests can seed it.
//!
//! Every book carries a non-empty default bucket, so this path never fails.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;

/// Question topic buckets. Match priority is [`Topic::KEYED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// "What do you do here?"
    Role,
    /// "What does a normal day look like?"
    DailyRoutine,
    /// "What is hard about the work?"
    Challenges,
    /// "What is the best part?"
    Rewarding,
    /// "Why does this policy matter?"
    PolicyImportance,
    /// "What are you working on?"
    CurrentProjects,
    /// "How do you approach it?"
    Methods,
    /// "How do you use data?"
    DataUse,
    /// "Where is this heading?"
    FutureOutlook,
    /// Stress, anxiety and wellbeing.
    MentalHealth,
    /// Anything that matched no keyword.
    Default,
}

impl Topic {
    /// Every keyed topic, in match priority order. `Default` is not listed.
    pub const KEYED: [Topic; 10] = [
        Topic::MentalHealth,
        Topic::Role,
        Topic::DailyRoutine,
        Topic::Challenges,
        Topic::Rewarding,
        Topic::PolicyImportance,
        Topic::CurrentProjects,
        Topic::Methods,
        Topic::DataUse,
        Topic::FutureOutlook,
    ];

    /// Lower-case substrings that select this topic.
    #[must_use]
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::MentalHealth => &[
                "mental", "stress", "anxiety", "anxious", "wellbeing", "well-being", "burnout",
                "depress",
            ],
            Self::Role => &["role", "your job", "what do you do", "position", "responsib"],
            Self::DailyRoutine => &["typical day", "daily", "routine", "schedule", "morning"],
            Self::Challenges => &["challeng", "difficult", "hardest", "struggle", "obstacle"],
            Self::Rewarding => &["reward", "favorite", "favourite", "best part", "enjoy", "proud"],
            Self::PolicyImportance => &["policy", "policies", "why does", "why is", "matter"],
            Self::CurrentProjects => &["project", "working on", "currently", "these days"],
            Self::Methods => &["method", "approach", "how do you", "technique", "process"],
            Self::DataUse => &["data", "statistic", "measure", "evidence", "survey"],
            Self::FutureOutlook => &["future", "next year", "vision", "going forward", "ahead"],
            Self::Default => &[],
        }
    }
}

/// Classify a free-text question into a topic by keyword.
///
/// Matching is case-insensitive; the first topic in [`Topic::KEYED`] with a
/// matching keyword wins. Unmatched input is [`Topic::Default`].
#[must_use]
pub fn classify(question: &str) -> Topic {
    let lowered = question.to_lowercase();
    Topic::KEYED
        .into_iter()
        .find(|topic| topic.keywords().iter().any(|k| lowered.contains(k)))
        .unwrap_or(Topic::Default)
}

/// Lines every character can fall back on when nothing else fits.
pub const GENERIC_DEFAULTS: &[&str] = &[
    "That's a great question. Honestly, every student's situation is a little different, so I'd love to hear more about yours.",
    "Good question! The short answer is that we try to meet each student where they are.",
    "I'm not sure I have a neat answer for that, but come find me after the tour and we can talk it through.",
];

/// A character's curated replies, bucketed by topic.
#[derive(Debug, Clone)]
pub struct ReplyBook {
    lines: HashMap<Topic, Vec<String>>,
}

impl ReplyBook {
    /// Create a book whose default bucket holds the generic lines.
    #[must_use]
    pub fn new() -> Self {
        let mut lines = HashMap::new();
        lines.insert(
            Topic::Default,
            GENERIC_DEFAULTS.iter().map(|s| (*s).to_string()).collect(),
        );
        Self { lines }
    }

    /// Add lines for a topic (builder style).
    #[must_use]
    pub fn with(mut self, topic: Topic, lines: &[&str]) -> Self {
        self.lines
            .entry(topic)
            .or_default()
            .extend(lines.iter().map(|s| (*s).to_string()));
        self
    }

    /// Lines filed under exactly this topic (may be empty).
    #[must_use]
    pub fn lines(&self, topic: Topic) -> &[String] {
        self.lines.get(&topic).map_or(&[], Vec::as_slice)
    }

    /// Candidate replies for a topic, falling back to the default bucket
    /// when this character has nothing curated for it.
    #[must_use]
    pub fn candidates(&self, topic: Topic) -> &[String] {
        let own = self.lines(topic);
        if own.is_empty() {
            self.lines(Topic::Default)
        } else {
            own
        }
    }
}

impl Default for ReplyBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Candidate replies for a question: classify, then look up.
#[must_use]
pub fn candidates_for<'a>(book: &'a ReplyBook, question: &str) -> &'a [String] {
    book.candidates(classify(question))
}

/// Pick one fallback reply uniformly among the candidates for `question`.
///
/// Never returns an empty string: if a caller emptied the default bucket the
/// first generic line is used.
pub fn fallback_reply<R: Rng + ?Sized>(book: &ReplyBook, question: &str, rng: &mut R) -> String {
    candidates_for(book, question)
        .choose(rng)
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| GENERIC_DEFAULTS[0].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn book() -> ReplyBook {
        ReplyBook::new()
            .with(Topic::Role, &["I run the counseling office."])
            .with(Topic::MentalHealth, &["Breathe first, then plan.", "You are not alone in this."])
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify("What is your ROLE here?"), Topic::Role);
        assert_eq!(classify("Tell me about your DATA work"), Topic::DataUse);
    }

    #[test]
    fn mental_health_wins_over_later_buckets() {
        // Contains both "stress" and "data"; mental health is checked first.
        assert_eq!(classify("Does data on exam stress help?"), Topic::MentalHealth);
    }

    #[test]
    fn unmatched_is_default() {
        assert_eq!(classify("Do you like pizza?"), Topic::Default);
        assert_eq!(classify(""), Topic::Default);
    }

    #[test]
    fn missing_bucket_uses_default_lines() {
        let b = book();
        let c = b.candidates(Topic::FutureOutlook);
        assert_eq!(c.len(), GENERIC_DEFAULTS.len());
    }

    #[test]
    fn fallback_draws_from_matched_bucket() {
        let b = book();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let reply = fallback_reply(&b, "I feel so much stress lately", &mut rng);
            assert!(b.lines(Topic::MentalHealth).contains(&reply));
        }
    }

    #[test]
    fn fallback_is_generic_for_unmatched_input() {
        let b = book();
        let mut rng = StdRng::seed_from_u64(1);
        let reply = fallback_reply(&b, "zzzz", &mut rng);
        assert!(GENERIC_DEFAULTS.contains(&reply.as_str()));
    }

    #[test]
    fn same_seed_same_reply() {
        let b = book();
        let a = fallback_reply(&b, "stress?", &mut StdRng::seed_from_u64(42));
        let c = fallback_reply(&b, "stress?", &mut StdRng::seed_from_u64(42));
        assert_eq!(a, c);
    }
}
