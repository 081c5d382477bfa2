use regex::Regex;
use std::sync::OnceLock;

use crate::cascades::config::{
    DEFAULT_LEGACY_MAX_LOCAL_PROMPT_LENGTH, DEFAULT_MAX_LOCAL_PROMPT_LENGTH, RoutingPolicy,
};
use crate::cascades::patterns::{first_match, medium_transforms, simple_transforms, tool_signals};
use crate::cascades::{Confidence, Decision, LegacyTier, TaskDecision, Tier};

/// Window (in characters) in which a colon marks the end of the command.
const COMMAND_WINDOW_CHARS: usize = 100;
/// Text after the colon must be longer than this to count as inline content.
const MIN_TEXT_AFTER_COLON_CHARS: usize = 20;
/// Prompts longer than this always count as carrying inline content.
const INLINE_LENGTH_THRESHOLD: usize = 100;

/// Length ceilings used by `RoutingPolicy::Aggressive` when nothing matched.
pub const LOCAL_LENGTH_CEILING: usize = 300;
pub const CHEAP_LENGTH_CEILING: usize = 2000;

pub const DEFAULT_REASON: &str = "no clear transform pattern — default to full capability";

pub trait PromptClassifier {
    fn classify(&self, prompt: &str) -> Decision;
}

#[derive(Debug, Clone)]
pub struct RuleClassifier {
    pub max_local_prompt_length: usize,
    pub policy: RoutingPolicy,
}

impl RuleClassifier {
    pub fn new(max_local_prompt_length: usize, policy: RoutingPolicy) -> Self {
        Self {
            max_local_prompt_length,
            policy,
        }
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOCAL_PROMPT_LENGTH, RoutingPolicy::Conservative)
    }
}

impl PromptClassifier for RuleClassifier {
    fn classify(&self, prompt: &str) -> Decision {
        classify_with_policy(prompt, self.max_local_prompt_length, self.policy)
    }
}

/// Three-tier classification with the conservative default.
pub fn classify(prompt: &str, max_local_prompt_length: usize) -> Decision {
    classify_with_policy(prompt, max_local_prompt_length, RoutingPolicy::Conservative)
}

pub fn classify_with_policy(
    prompt: &str,
    max_local_prompt_length: usize,
    policy: RoutingPolicy,
) -> Decision {
    let prompt_length = prompt.chars().count();
    let inline = has_inline_content(prompt);

    let simple = first_match(simple_transforms(), prompt).filter(|_| inline);
    let medium = first_match(medium_transforms(), prompt).filter(|_| inline);

    // Inline content being transformed must not trip tool signals itself.
    let checked = if simple.is_some() || medium.is_some() {
        command_portion(prompt)
    } else {
        prompt
    };

    let signal = first_match(tool_signals(), checked).or_else(|| {
        tool_signals()
            .iter()
            .find(|signal| signal.scans_whole_prompt() && signal.test(prompt))
    });
    if let Some(signal) = signal {
        return Decision::new(
            Tier::Quality,
            format!("Tool signal: {}", signal.label()),
            prompt_length,
            Confidence::High,
        );
    }

    if let Some(transform) = simple {
        return if prompt_length <= max_local_prompt_length {
            Decision::new(
                Tier::Local,
                format!("Simple transform: {}", transform.label()),
                prompt_length,
                Confidence::High,
            )
        } else {
            Decision::new(
                Tier::Cheap,
                format!(
                    "Simple transform: {} (too long for local: {} > {} chars)",
                    transform.label(),
                    prompt_length,
                    max_local_prompt_length
                ),
                prompt_length,
                Confidence::Medium,
            )
        };
    }

    if let Some(transform) = medium {
        return Decision::new(
            Tier::Cheap,
            format!("Medium transform: {}", transform.label()),
            prompt_length,
            Confidence::Medium,
        );
    }

    match policy {
        RoutingPolicy::Conservative => {
            Decision::new(Tier::Quality, DEFAULT_REASON, prompt_length, Confidence::High)
        }
        RoutingPolicy::Aggressive => length_based_default(prompt_length),
    }
}

fn length_based_default(prompt_length: usize) -> Decision {
    if prompt_length <= LOCAL_LENGTH_CEILING {
        Decision::new(
            Tier::Local,
            format!("No transform pattern, short prompt ({} chars)", prompt_length),
            prompt_length,
            Confidence::Low,
        )
    } else if prompt_length <= CHEAP_LENGTH_CEILING {
        Decision::new(
            Tier::Cheap,
            format!("No transform pattern, medium prompt ({} chars)", prompt_length),
            prompt_length,
            Confidence::Low,
        )
    } else {
        Decision::new(
            Tier::Quality,
            format!("No transform pattern, long prompt ({} chars)", prompt_length),
            prompt_length,
            Confidence::Medium,
        )
    }
}

/// Quoted spans of 20+ chars. A single quote only opens after whitespace or
/// at the start, and only closes before a non-word char or the end, so
/// apostrophes in contractions never pair up.
fn quoted_text() -> &'static Regex {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    QUOTED.get_or_init(|| {
        Regex::new(r#""[^"]{20,}"|(?:^|\s)('[^']{20,}')(?:\W|$)|“[^”]{20,}”"#)
            .expect("Failed to compile quoted text regex")
    })
}

/// Byte offset of the opening quote of the first quoted span.
fn quoted_span_start(prompt: &str) -> Option<usize> {
    quoted_text()
        .captures(prompt)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|span| span.start())
}

/// Byte offset of the first colon within the command window. The colon of a
/// URL scheme (`https://`) does not end the command.
fn command_colon(prompt: &str) -> Option<usize> {
    prompt
        .char_indices()
        .take(COMMAND_WINDOW_CHARS)
        .find(|(index, c)| *c == ':' && !prompt[index + 1..].starts_with("//"))
        .map(|(index, _)| index)
}

/// Whether the prompt carries the text a transform should act on.
pub fn has_inline_content(prompt: &str) -> bool {
    if let Some(colon) = command_colon(prompt)
        && prompt[colon + 1..].trim().chars().count() > MIN_TEXT_AFTER_COLON_CHARS
    {
        return true;
    }

    if quoted_text().is_match(prompt) {
        return true;
    }

    prompt.chars().count() > INLINE_LENGTH_THRESHOLD
}

/// The instruction part of a transform prompt: text before the first colon in
/// the command window, else before the first quote, else the first 100 chars.
pub fn command_portion(prompt: &str) -> &str {
    if let Some(colon) = command_colon(prompt) {
        return &prompt[..colon];
    }

    let quote_char = prompt.find(['"', '“']);
    let quoted_span = quoted_span_start(prompt);
    let quote = match (quote_char, quoted_span) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    if let Some(quote) = quote {
        return &prompt[..quote];
    }

    match prompt.char_indices().nth(COMMAND_WINDOW_CHARS) {
        Some((end, _)) => &prompt[..end],
        None => prompt,
    }
}

const COMPLEX_INDICATORS: &[&str] = &[
    "architect",
    "design a",
    "implement",
    "refactor",
    "debug",
    "step by step",
    "multi-step",
    "write code",
    "write a program",
    "security",
    "optimize",
    "strategy",
    "research",
];

const SIMPLE_KEYWORDS: &[&str] = &[
    "translate",
    "summarize",
    "summarise",
    "tl;dr",
    "tldr",
    "rewrite",
    "rephrase",
    "paraphrase",
    "format",
    "convert",
    "classify",
    "categorize",
    "extract",
    "spelling",
    "grammar",
    "shorten",
    "simplify",
];

/// Legacy two-tier classification (local vs cloud), kept for callers of `route`.
pub fn classify_task(prompt: &str, max_local_prompt_length: usize) -> TaskDecision {
    let prompt_length = prompt.chars().count();
    let lower = prompt.to_lowercase();

    if let Some(indicator) = COMPLEX_INDICATORS.iter().find(|i| lower.contains(*i)) {
        return TaskDecision {
            tier: LegacyTier::Cloud,
            reason: format!("Complex indicator: {}", indicator),
            prompt_length,
            confidence: Confidence::High,
        };
    }

    let keyword = SIMPLE_KEYWORDS.iter().find(|k| lower.contains(*k));
    let fits = prompt_length <= max_local_prompt_length;

    let (tier, confidence, reason) = match (keyword, fits) {
        (Some(keyword), true) => (
            LegacyTier::Local,
            Confidence::High,
            format!("Simple task keyword: {}", keyword),
        ),
        (Some(keyword), false) => (
            LegacyTier::Cloud,
            Confidence::Medium,
            format!(
                "Simple task keyword: {}, but prompt too long ({} > {} chars)",
                keyword, prompt_length, max_local_prompt_length
            ),
        ),
        (None, true) => (
            LegacyTier::Local,
            Confidence::Low,
            format!("Short prompt ({} chars) without complex indicators", prompt_length),
        ),
        (None, false) => (
            LegacyTier::Cloud,
            Confidence::High,
            format!("Long prompt ({} chars) without simple task keyword", prompt_length),
        ),
    };

    TaskDecision {
        tier,
        reason,
        prompt_length,
        confidence,
    }
}

/// `classify_task` with the default legacy limit of 500 characters.
pub fn classify_task_default(prompt: &str) -> TaskDecision {
    classify_task(prompt, DEFAULT_LEGACY_MAX_LOCAL_PROMPT_LENGTH)
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
