pub mod analytics;
pub mod conversation;

use std::{fmt::Write as _, time::Duration};

use serde::{Deserialize, Serialize};

use analytics::{Intent, Summary, TOP_WORDS};

pub use conversation::{Conversation, Message, Role};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantMode {
    #[default]
    Cloud,
    Local,
}

impl AssistantMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cloud => "Cloud",
            Self::Local => "Local",
        }
    }

    pub const fn response_delay(self) -> Duration {
        match self {
            Self::Cloud => Duration::from_millis(1500),
            Self::Local => Duration::from_millis(600),
        }
    }

    fn header(self) -> &'static str {
        match self {
            Self::Cloud => "**Cloud analysis**",
            Self::Local => "**Local analysis** (on-device)",
        }
    }
}

impl std::str::FromStr for AssistantMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cloud" => Ok(Self::Cloud),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown assistant mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub mode: AssistantMode,
    pub intent: Intent,
    pub body: String,
}

impl Answer {
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.mode.header(), self.body)
    }
}

pub fn answer(query: &str, plain_text: &str, mode: AssistantMode) -> Answer {
    crate::profile_scope!("assistant.answer");

    let intent = analytics::classify(query);
    let text = analytics::normalize(plain_text);
    let body = match intent {
        Intent::Frequency => frequency_reply(&text.lower),
        Intent::Summarize => summary_reply(&text.display),
        Intent::Statistics => statistics_reply(&text.display),
        Intent::Grammar => grammar_reply(&text.display),
        Intent::Fallback => fallback_reply(query, &text.display),
    };
    log::debug!("assistant answered {intent:?} query in {} mode", mode.label());

    Answer { mode, intent, body }
}

fn frequency_reply(lower: &str) -> String {
    let ranked = analytics::word_frequency(lower, TOP_WORDS);
    if ranked.is_empty() {
        return "Not enough data to find frequent words in this document.".to_string();
    }

    let mut reply = String::from("**Most used words:**\n");
    for (rank, (word, count)) in ranked.iter().enumerate() {
        let _ = writeln!(
            reply,
            "{}. **{word}** ({count} {})",
            rank + 1,
            if *count == 1 { "time" } else { "times" }
        );
    }
    reply.trim_end().to_string()
}

fn summary_reply(display: &str) -> String {
    match analytics::summarize(display) {
        Summary::Verbatim(text) => format!("**Summary:** {text}").trim_end().to_string(),
        Summary::Extract {
            first,
            middle,
            last,
        } => format!("**Summary:** {first}. ... {middle}. ... {last}."),
    }
}

fn statistics_reply(display: &str) -> String {
    let stats = analytics::statistics(display);
    format!(
        "**Document statistics:**\n- Words: {}\n- Characters: {}\n- Sentences: {}\n- Reading time: ~{} min",
        stats.words, stats.characters, stats.sentences, stats.reading_minutes
    )
}

fn grammar_reply(display: &str) -> String {
    let report = analytics::check_capitalization(display);
    if report.is_clean() {
        return format!(
            "**Grammar check:** looks clean. No capitalization issues in the first {} sentences.",
            report.checked
        );
    }

    let mut reply = format!(
        "**Grammar check:** found {} capitalization {} in the first {} sentences:\n",
        report.flagged.len(),
        if report.flagged.len() == 1 { "issue" } else { "issues" },
        report.checked
    );
    for sentence in &report.flagged {
        let _ = writeln!(reply, "- \"{sentence}\"");
    }
    reply.trim_end().to_string()
}

fn fallback_reply(query: &str, display: &str) -> String {
    format!(
        "You asked: \"{}\". The document has {} characters.\n\nTry asking:\n- \"What is the most used word?\"\n- \"Summarize this document\"\n- \"How many words are there?\"\n- \"Check grammar\"",
        query.trim(),
        display.chars().count()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_answer_names_the_top_word() {
        let reply = answer("most used word", "cat dog cat bird cat dog", AssistantMode::Local);
        assert_eq!(reply.intent, Intent::Frequency);
        assert!(reply.body.contains("1. **cat** (3 times)"));
        assert!(reply.body.contains("3. **bird** (1 time)"));
    }

    #[test]
    fn frequency_without_words_reports_not_enough_data() {
        let reply = answer("word frequency", "", AssistantMode::Cloud);
        assert!(reply.body.starts_with("Not enough data"));
    }

    #[test]
    fn statistics_answer_counts_words_and_sentences() {
        let reply = answer("word count", "One. Two. Three.", AssistantMode::Cloud);
        assert_eq!(reply.intent, Intent::Statistics);
        assert!(reply.body.contains("Words: 3"));
        assert!(reply.body.contains("Sentences: 3"));
        assert!(reply.body.contains("Reading time: ~1 min"));
    }

    #[test]
    fn summary_of_markup_uses_text_only() {
        let html = "<p>First point.</p><p>Second point.</p>";
        let reply = answer("summary", html, AssistantMode::Local);
        assert_eq!(reply.body, "**Summary:** First point. Second point.");
    }

    #[test]
    fn summary_of_empty_text_is_the_empty_text() {
        let reply = answer("summary", "  <p></p> ", AssistantMode::Cloud);
        assert_eq!(reply.intent, Intent::Summarize);
        assert_eq!(reply.body, "**Summary:**");
    }

    #[test]
    fn extractive_summary_joins_with_elisions() {
        let text = "A one. B two. C three. D four. E five.";
        let reply = answer("Summarize", text, AssistantMode::Local);
        assert_eq!(reply.body, "**Summary:** A one. ... C three. ... E five.");
    }

    #[test]
    fn grammar_answer_counts_flags() {
        let clean = answer("grammar please", "Fine. Also fine.", AssistantMode::Local);
        assert!(clean.body.contains("looks clean"));

        let flagged = answer("check this", "Fine. not fine.", AssistantMode::Local);
        assert!(flagged.body.contains("found 1 capitalization issue"));
        assert!(flagged.body.contains("\"not fine\""));
    }

    #[test]
    fn fallback_echoes_query_and_length() {
        let reply = answer("translate to Latin", "abc", AssistantMode::Cloud);
        assert_eq!(reply.intent, Intent::Fallback);
        assert!(reply.body.contains("You asked: \"translate to Latin\""));
        assert!(reply.body.contains("3 characters"));
        assert!(reply.body.contains("Try asking"));
    }

    #[test]
    fn modes_differ_only_in_framing() {
        let text = "The quick fox. The lazy dog. A fox again. Dogs sleep. Foxes run. End.";
        for query in ["most used", "summary", "stats", "grammar", "hello"] {
            let cloud = answer(query, text, AssistantMode::Cloud);
            let local = answer(query, text, AssistantMode::Local);
            assert_eq!(cloud.body, local.body, "query {query}");
            assert_ne!(cloud.text(), local.text());
        }
        assert!(AssistantMode::Cloud.response_delay() > AssistantMode::Local.response_delay());
    }

    #[test]
    fn modes_parse_case_insensitively() {
        assert_eq!("LOCAL".parse::<AssistantMode>(), Ok(AssistantMode::Local));
        assert!("edge".parse::<AssistantMode>().is_err());
    }
}
