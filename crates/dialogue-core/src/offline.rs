//! Offline Collaborators
//!
//! Deterministic stand-ins for the language model, so a full run needs no
//! network. [`CannedSpeaker`] writes lines from a phrase bank that matches
//! the speaker's leaning; [`KeywordJudge`] scores a transcript by counting
//! leaning words.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::components::agent::MODERATOR_NAME;
use crate::components::persona::vocabulary;
use crate::llm::{GenerationError, MessageGenerator, SpeakerPrompt, TextGenerator};

const CHANGE_LINES: &[&str] = &[
    "we should try something new here.",
    "the current approach has run its course and needs reform.",
    "a bold experiment could improve things for everyone.",
    "progress means being willing to change.",
    "the future will not wait for us, so let's innovate.",
];

const STATUS_QUO_LINES: &[&str] = &[
    "the existing way works and I'd keep it.",
    "tradition exists for a reason, and stability matters.",
    "a proven approach beats a risky gamble.",
    "I'd rather be careful than rush into anything.",
    "what we have is stable, so why risk it?",
];

const UNDECIDED_LINES: &[&str] = &[
    "I can see merit on both sides.",
    "I'm not sure yet and would like to hear more.",
    "there are good points being made all around.",
];

const MODERATOR_LINES: &[&str] = &[
    "let's hear another perspective on this.",
    "what would it take to change your mind?",
    "let's keep the discussion focused and respectful.",
];

/// Words that signal movement toward change
pub const CHANGE_WORDS: &[&str] = &[
    "change", "new", "reform", "innovate", "progress", "bold", "experiment", "improve", "future",
    "try",
];

/// Words that signal movement toward the status quo
pub const STATUS_QUO_WORDS: &[&str] = &[
    "tradition", "stable", "stability", "proven", "keep", "careful", "risk", "risky", "existing",
    "works",
];

/// How far a one-sided transcript moves an opinion
pub const JUDGE_SCALE: f64 = 0.5;

const TRANSCRIPT_START: &str = "Recent conversation:\n";
const TRANSCRIPT_END: &str = "\n\nRate the opinion change";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leaning {
    Change,
    StatusQuo,
    Undecided,
}

fn leaning_of(system_message: &str) -> Leaning {
    let framing = system_message.to_lowercase();
    if framing.contains(vocabulary::CHANGE_ORIENTED) {
        Leaning::Change
    } else if framing.contains(vocabulary::STATUS_QUO) {
        Leaning::StatusQuo
    } else {
        Leaning::Undecided
    }
}

fn capitalize(line: &str) -> String {
    let mut chars = line.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Phrase-bank speaker. Each line answers whoever spoke last.
#[derive(Debug, Clone)]
pub struct CannedSpeaker {
    rng: SmallRng,
}

impl CannedSpeaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MessageGenerator for CannedSpeaker {
    fn generate(&mut self, prompt: &SpeakerPrompt<'_>) -> Result<String, GenerationError> {
        let bank = if prompt.speaker == MODERATOR_NAME {
            MODERATOR_LINES
        } else {
            match leaning_of(prompt.system_message) {
                Leaning::Change => CHANGE_LINES,
                Leaning::StatusQuo => STATUS_QUO_LINES,
                Leaning::Undecided => UNDECIDED_LINES,
            }
        };

        let line = bank
            .choose(&mut self.rng)
            .ok_or_else(|| GenerationError::new("empty phrase bank"))?;

        let addressee = prompt
            .last_heard()
            .and_then(|heard| heard.split_once(": "))
            .map(|(name, _)| name)
            .filter(|name| *name != prompt.speaker);

        Ok(match addressee {
            Some(name) => format!("{}, {}", name, line),
            None => capitalize(line),
        })
    }
}

/// Scores the transcript embedded in an analysis prompt.
///
/// Answers `JUDGE_SCALE * (status_quo - change) / (status_quo + change)`,
/// or `0` when neither kind of word appears.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordJudge;

impl KeywordJudge {
    pub fn score(transcript: &str) -> f64 {
        let mut change = 0usize;
        let mut status_quo = 0usize;

        for word in transcript
            .split(|c: char| !c.is_alphanumeric() && c != '-')
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            if CHANGE_WORDS.contains(&word.as_str()) {
                change += 1;
            } else if STATUS_QUO_WORDS.contains(&word.as_str()) {
                status_quo += 1;
            }
        }

        let total = change + status_quo;
        if total == 0 {
            return 0.0;
        }
        JUDGE_SCALE * (status_quo as f64 - change as f64) / total as f64
    }
}

fn embedded_transcript(prompt: &str) -> &str {
    let start = prompt
        .find(TRANSCRIPT_START)
        .map(|i| i + TRANSCRIPT_START.len())
        .unwrap_or(0);
    let rest = &prompt[start..];
    match rest.find(TRANSCRIPT_END) {
        Some(end) => &rest[..end],
        None => rest,
    }
}

impl TextGenerator for KeywordJudge {
    fn generate_response(&self, prompt: &str) -> Result<String, GenerationError> {
        let score = Self::score(embedded_transcript(prompt));
        Ok(format!("{:.2}", score))
    }
}
