//! History curation: turns a raw channel window into prompt history.
//!
//! # Algorithm
//!
//! 1. Split the newest-first window into human and self-authored messages
//! 2. Drop human messages that are bot commands (start with the prefix)
//! 3. Count how often each human line was echoed by the bot ([`RepetitionTracker`])
//! 4. Exclude human lines echoed at least `message_limit` times
//! 5. Walk the survivors newest → oldest, charging `"author: content"` against
//!    the character budget; the first entry that overflows ends the walk
//! 6. Reverse to restore chronological order
//!
//! Step 5 is a hard cut of the oldest tail, not a best-fit packing: an older
//! message that would fit on its own is still dropped once the walk stops.

use serde::Serialize;
use skychat_core::message::{ChannelMessage, ContextMessage};
use tracing::debug;

use crate::repetition::RepetitionTracker;

/// Statistics for a single curation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurationStats {
    /// Messages in the fetched window.
    pub window_size: usize,
    /// Self-authored messages (the repetition corpus).
    pub bot_messages: usize,
    /// Human messages dropped for starting with the command prefix.
    pub commands_dropped: usize,
    /// Human messages dropped by the repetition guard.
    pub repetition_excluded: usize,
    /// Candidates cut off when the budget ran out.
    pub truncated: usize,
    /// Characters charged against the budget, including the base prompt.
    pub characters_used: usize,
}

/// The outcome of a curation pass.
#[derive(Debug, Clone, Default)]
pub struct CuratedHistory {
    /// Curated entries, oldest first.
    pub entries: Vec<ContextMessage>,
    pub stats: CurationStats,
}

impl CuratedHistory {
    pub fn into_entries(self) -> Vec<ContextMessage> {
        self.entries
    }
}

/// Selects which history messages make it into a prompt. Stateless, so one
/// instance can be reused across requests.
#[derive(Debug, Clone)]
pub struct HistoryCurator {
    command_prefix: String,
    message_limit: usize,
    char_budget: usize,
}

impl HistoryCurator {
    pub fn new(command_prefix: impl Into<String>, message_limit: usize, char_budget: usize) -> Self {
        Self {
            command_prefix: command_prefix.into(),
            message_limit,
            char_budget,
        }
    }

    pub fn char_budget(&self) -> usize {
        self.char_budget
    }

    /// Curate `window` (newest first) for a prompt whose base section is
    /// `base_prompt_len` characters long.
    ///
    /// `self_identity` is the bot's bound user ID; when `None`, any author
    /// flagged as a bot counts as self. Never fails: an empty or fully
    /// excluded window yields empty history.
    pub fn curate(
        &self,
        window: &[ChannelMessage],
        self_identity: Option<&str>,
        base_prompt_len: usize,
    ) -> CuratedHistory {
        let mut stats = CurationStats {
            window_size: window.len(),
            ..Default::default()
        };

        let mut human: Vec<&ChannelMessage> = Vec::new();
        let mut bot: Vec<&str> = Vec::new();
        for message in window {
            if message.is_self_authored(self_identity) {
                bot.push(&message.content);
            } else if message.content.starts_with(&self.command_prefix) {
                stats.commands_dropped += 1;
            } else {
                human.push(message);
            }
        }
        stats.bot_messages = bot.len();

        let counts = RepetitionTracker::count(human.iter().map(|m| m.content.as_str()), bot);
        let excluded = counts.excluded(self.message_limit);
        for content in &excluded {
            debug!(
                content = %content,
                count = counts.get(content),
                limit = self.message_limit,
                "Excluding repeated human line"
            );
        }

        let human_count = human.len();
        let candidates: Vec<&ChannelMessage> = human
            .into_iter()
            .filter(|m| !excluded.contains(&m.content))
            .collect();
        stats.repetition_excluded = human_count - candidates.len();

        let mut used = base_prompt_len + 1;
        let mut entries = Vec::with_capacity(candidates.len());
        for (index, message) in candidates.iter().enumerate() {
            let entry = ContextMessage::new(message.author.name.clone(), message.content.clone());
            let cost = entry.rendered_len();
            if used + cost > self.char_budget {
                stats.truncated = candidates.len() - index;
                break;
            }
            used += cost;
            entries.push(entry);
        }
        stats.characters_used = used;

        entries.reverse();
        CuratedHistory { entries, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use skychat_core::channel::ChannelId;
    use skychat_core::message::Author;

    const BOT_ID: &str = "2";

    fn human(content: &str) -> ChannelMessage {
        ChannelMessage::new(ChannelId("chat".into()), Author::user("1", "person"), content)
    }

    fn bot(content: &str) -> ChannelMessage {
        ChannelMessage::new(ChannelId("chat".into()), Author::bot(BOT_ID, "bot"), content)
    }

    /// Chronological input → newest-first window, like a channel replay.
    fn window(chronological: Vec<ChannelMessage>) -> Vec<ChannelMessage> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let mut stamped: Vec<ChannelMessage> = chronological
            .into_iter()
            .enumerate()
            .map(|(i, m)| m.at(start + Duration::seconds(i as i64)))
            .collect();
        stamped.reverse();
        stamped
    }

    fn contents(history: &CuratedHistory) -> Vec<&str> {
        history.entries.iter().map(|e| e.content.as_str()).collect()
    }

    fn curator() -> HistoryCurator {
        HistoryCurator::new("!react", 2, 10_000)
    }

    #[test]
    fn collects_human_history_oldest_first() {
        let win = window(vec![
            human("!react(previous)"),
            human("short"),
            human("meaningful"),
            human("human message"),
            human("human message"),
            bot("bot reply\n"),
        ]);

        let curated = curator().curate(&win, Some(BOT_ID), "prefixtopicsuffix".len());
        assert_eq!(
            contents(&curated),
            vec!["short", "meaningful", "human message", "human message"]
        );
        assert_eq!(curated.stats.commands_dropped, 1);
        assert_eq!(curated.stats.bot_messages, 1);
        assert!(curated.entries.iter().all(|e| e.author != "bot"));
    }

    #[test]
    fn empty_window_is_empty_history() {
        let curated = curator().curate(&[], Some(BOT_ID), 10);
        assert!(curated.entries.is_empty());
        assert_eq!(curated.stats.window_size, 0);
    }

    #[test]
    fn only_commands_and_bot_messages_is_empty_history() {
        let win = window(vec![human("!react hello"), bot("sure\n"), human("!react(x) again")]);
        let curated = curator().curate(&win, Some(BOT_ID), 10);
        assert!(curated.entries.is_empty());
    }

    #[test]
    fn repeated_line_is_excluded_others_kept() {
        let win = window(vec![
            human("hello"),
            human("hi"),
            human("hey"),
            human("yo"),
            human("sup"),
            bot("person: hello\n"),
            bot("person: hello\n person: hi\n"),
        ]);

        let curated = curator().curate(&win, Some(BOT_ID), 0);
        assert_eq!(contents(&curated), vec!["hi", "hey", "yo", "sup"]);
        assert_eq!(curated.stats.repetition_excluded, 1);
    }

    #[test]
    fn excluded_line_removes_every_copy() {
        let win = window(vec![
            human("parrot this"),
            human("something new"),
            human("parrot this"),
            bot("parrot this\n"),
            bot("PARROT THIS\nand more"),
        ]);
        let curated = curator().curate(&win, Some(BOT_ID), 0);
        assert_eq!(contents(&curated), vec!["something new"]);
        assert_eq!(curated.stats.repetition_excluded, 2);
    }

    #[test]
    fn short_lines_survive_any_amount_of_echo() {
        let win = window(vec![
            human("lol"),
            bot("lol\n"),
            bot("lol\n"),
            bot("lol\n"),
        ]);
        let curated = curator().curate(&win, Some(BOT_ID), 0);
        assert_eq!(contents(&curated), vec!["lol"]);
    }

    #[test]
    fn unbound_identity_falls_back_to_bot_flag() {
        let other_bot = ChannelMessage::new(
            ChannelId("chat".into()),
            Author::bot("99", "otherbot"),
            "beep boop",
        );
        let win = window(vec![human("a human line"), other_bot]);

        let unbound = curator().curate(&win, None, 0);
        assert_eq!(contents(&unbound), vec!["a human line"]);

        // Once bound, another bot's messages are ordinary history.
        let bound = curator().curate(&win, Some(BOT_ID), 0);
        assert_eq!(contents(&bound), vec!["a human line", "beep boop"]);
    }

    #[test]
    fn bot_commands_still_feed_repetition_corpus() {
        let win = window(vec![
            human("please stop"),
            bot("!react please stop\n"),
            bot("please stop\n"),
        ]);
        let curated = curator().curate(&win, Some(BOT_ID), 0);
        assert!(curated.entries.is_empty());
        assert_eq!(curated.stats.commands_dropped, 0);
    }

    #[test]
    fn budget_keeps_only_newest_when_one_fits() {
        let long = "x".repeat(5000);
        let win = window((0..5).map(|_| human(&long)).collect());

        let curated = HistoryCurator::new("!react", 2, 5500).curate(&win, Some(BOT_ID), 16);
        assert_eq!(curated.entries.len(), 1);
        assert_eq!(curated.stats.truncated, 4);
    }

    #[test]
    fn budget_boundary_is_inclusive() {
        // "person: abcde" = 13 chars; base 10 + 1 → 24 total.
        let win = window(vec![human("abcde")]);

        let exact = HistoryCurator::new("!react", 2, 24).curate(&win, Some(BOT_ID), 10);
        assert_eq!(exact.entries.len(), 1);
        assert_eq!(exact.stats.characters_used, 24);

        let short = HistoryCurator::new("!react", 2, 23).curate(&win, Some(BOT_ID), 10);
        assert!(short.entries.is_empty());
    }

    #[test]
    fn walk_stops_at_first_overflow() {
        // Newest first: a big message that overflows, then an older tiny one.
        let win = window(vec![human("tiny!"), human(&"y".repeat(200)), human("newest")]);

        let curated = HistoryCurator::new("!react", 2, 60).curate(&win, Some(BOT_ID), 0);
        assert_eq!(contents(&curated), vec!["newest"]);
        assert_eq!(curated.stats.truncated, 2);
    }

    #[test]
    fn newest_message_kept_when_budget_tight() {
        let win = window(vec![human("oldest entry"), human("middle entry"), human("newest entry")]);
        // base 0 + 1 + "person: newest entry" (20) = 21
        let curated = HistoryCurator::new("!react", 2, 30).curate(&win, Some(BOT_ID), 0);
        assert_eq!(contents(&curated), vec!["newest entry"]);
    }

    #[test]
    fn excluded_lines_do_not_consume_budget() {
        let win = window(vec![
            human("keep me please"),
            human(&"z".repeat(100)),
            bot(&format!("{}\n", "z".repeat(100))),
            bot(&format!("{}\n", "z".repeat(100))),
        ]);
        let curated = HistoryCurator::new("!react", 2, 40).curate(&win, Some(BOT_ID), 0);
        assert_eq!(contents(&curated), vec!["keep me please"]);
    }
}
