//! Repetition guard.
//!
//! Counts how often each human line already shows up, as a full line, inside
//! the bot's own earlier replies in the same window. The assembler joins
//! history entries with `" \n "`, so when the model parrots a user's line back
//! verbatim it lands in a bot message followed by a line break. Lines echoed
//! too often are dropped from the next prompt to break the loop.
//!
//! Counts are recomputed from the fetched window on every pass and never
//! outlive it.

use std::collections::{HashMap, HashSet};

/// Human lines shorter than this (in characters) are never tracked.
pub const MIN_TRACKED_CHARS: usize = 5;

/// Occurrence counts for one curation pass, keyed by exact human content.
#[derive(Debug, Clone, Default)]
pub struct RepetitionCounts {
    counts: HashMap<String, usize>,
}

impl RepetitionCounts {
    /// Count for `content`; 0 when untracked or unseen.
    pub fn get(&self, content: &str) -> usize {
        self.counts.get(content).copied().unwrap_or(0)
    }

    /// Every content whose count reached `limit`.
    ///
    /// A limit of zero is treated as one so that untracked lines can never
    /// qualify.
    pub fn excluded(&self, limit: usize) -> HashSet<String> {
        let limit = limit.max(1);
        self.counts
            .iter()
            .filter(|(_, count)| **count >= limit)
            .map(|(content, _)| content.clone())
            .collect()
    }

    /// Number of distinct human contents seen.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Builds [`RepetitionCounts`] from the human and bot halves of a window.
pub struct RepetitionTracker;

impl RepetitionTracker {
    /// For each distinct human content, count the bot messages containing
    /// `lowercase(content) + "\n"` as a substring of `lowercase(bot)`.
    ///
    /// Only a trailing line break qualifies: a human line that closes a bot
    /// message without one is not counted.
    pub fn count<'a, H, B>(human: H, bot: B) -> RepetitionCounts
    where
        H: IntoIterator<Item = &'a str>,
        B: IntoIterator<Item = &'a str>,
    {
        let bot_lower: Vec<String> = bot.into_iter().map(str::to_lowercase).collect();
        let mut counts: HashMap<String, usize> = HashMap::new();

        for content in human {
            if counts.contains_key(content) {
                continue;
            }
            let lower = content.to_lowercase();
            let hits = if lower.chars().count() < MIN_TRACKED_CHARS {
                0
            } else {
                let needle = format!("{lower}\n");
                bot_lower.iter().filter(|b| b.contains(&needle)).count()
            };
            counts.insert(content.to_string(), hits);
        }

        RepetitionCounts { counts }
    }
}
