use regex::Regex;
use std::sync::OnceLock;

/// A labelled prompt matcher. `exclude` carves out sub-cases that belong to a
/// different table (the regex engine has no lookahead).
#[derive(Debug)]
pub struct TextMatcher {
    pattern: Regex,
    exclude: Option<Regex>,
    label: &'static str,
    whole_prompt: bool,
}

impl TextMatcher {
    fn new(pattern: &str, label: &'static str) -> Self {
        Self {
            pattern: compile(pattern),
            exclude: None,
            label,
            whole_prompt: false,
        }
    }

    /// Also checked against the full prompt when only the command portion is
    /// scanned for tool signals.
    fn on_whole_prompt(mut self) -> Self {
        self.whole_prompt = true;
        self
    }

    fn excluding(mut self, pattern: &str) -> Self {
        self.exclude = Some(compile(pattern));
        self
    }

    pub fn test(&self, text: &str) -> bool {
        self.pattern.is_match(text)
            && !self
                .exclude
                .as_ref()
                .is_some_and(|exclude| exclude.is_match(text))
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn scans_whole_prompt(&self) -> bool {
        self.whole_prompt
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).expect("Failed to compile prompt pattern")
}

/// First matcher in table order that accepts `text`.
pub fn first_match<'a>(matchers: &'a [TextMatcher], text: &str) -> Option<&'a TextMatcher> {
    matchers.iter().find(|matcher| matcher.test(text))
}

/// Cues that the prompt touches the user's own data or needs an external
/// action. Deliberately overbroad: any hit routes to the quality tier.
pub fn tool_signals() -> &'static [TextMatcher] {
    static TOOL_SIGNALS: OnceLock<Vec<TextMatcher>> = OnceLock::new();
    TOOL_SIGNALS.get_or_init(|| {
        vec![
            TextMatcher::new(r"\b(my|mine|our|ours)\b", "possessive reference (my/our)"),
            TextMatcher::new(
                r"\b(is there|are there|do i have|have i|did i|what's running|status of|is it running)\b|\b(is|are)\s+\S+\s+(running|installed|enabled|configured|up|down|online|offline)\b",
                "state or existence question",
            ),
            TextMatcher::new(
                r"\b(send|email|check|read|open|search|look up|lookup|find|fetch|download|upload|run|execute|delete|remove|create|install|deploy|schedule|remind|post|commit|push|restart)\b",
                "action verb",
            ),
            TextMatcher::new(
                r"\b(github|gitlab|gmail|slack|calendar|inbox|emails?|cron|database|server|docker|kubernetes|jira|notion|dropbox|discord|telegram|whatsapp|repo|repository|files?|folder|directory)\b",
                "integration or service reference",
            ),
            TextMatcher::new(
                r"^\s*(hi|hello|hey|yo|good (morning|afternoon|evening)|thanks|thank you)\b",
                "conversational greeting",
            ),
            TextMatcher::new(
                r"\b(today|tonight|tomorrow|yesterday|now|currently|latest|recent|recently|this week|next week|last week)\b",
                "time-relative reference",
            ),
            TextMatcher::new(r"https?://", "URL reference").on_whole_prompt(),
        ]
    })
}

/// Pure text operations on inline content, anchored at the start of the prompt.
pub fn simple_transforms() -> &'static [TextMatcher] {
    static SIMPLE_TRANSFORMS: OnceLock<Vec<TextMatcher>> = OnceLock::new();
    SIMPLE_TRANSFORMS.get_or_init(|| {
        vec![
            TextMatcher::new(r"^\s*translate\b", "translate"),
            TextMatcher::new(
                r"^\s*(summari[sz]e\b|tl;?dr\b|give me a (tl;?dr|summary)\b)",
                "summarize",
            )
            .excluding(MULTI_ITEM_SUMMARY),
            TextMatcher::new(r"^\s*(rewrite|rephrase|paraphrase|reword)\b", "rewrite"),
            TextMatcher::new(r"^\s*(re)?format\b", "format"),
            TextMatcher::new(r"^\s*convert\b", "convert"),
            TextMatcher::new(r"^\s*(classify|categori[sz]e)\b", "classify"),
            TextMatcher::new(r"^\s*extract\b", "extract"),
            TextMatcher::new(
                r"^\s*(is|are|does|do|can|should)\s+(this|these|it|the following)\b",
                "yes/no question",
            ),
            TextMatcher::new(r"^\s*(shorten|simplify|expand|condense)\b", "shorten/simplify/expand"),
            TextMatcher::new(
                r"^\s*(proofread\b|(fix|correct)\s+(the\s+|any\s+)?(spelling|grammar|typos?|punctuation)\b)",
                "fix spelling/grammar",
            ),
        ]
    })
}

const MULTI_ITEM_SUMMARY: &str = r"^\s*summari[sz]e\s+(these|each|all|both|multiple)\b";

/// Transforms that need more reasoning than the local tier offers.
pub fn medium_transforms() -> &'static [TextMatcher] {
    static MEDIUM_TRANSFORMS: OnceLock<Vec<TextMatcher>> = OnceLock::new();
    MEDIUM_TRANSFORMS.get_or_init(|| {
        vec![
            TextMatcher::new(r"^\s*(compare|contrast)\b", "compare"),
            TextMatcher::new(r"^\s*(analy[sz]e|evaluate|assess|critique)\b", "analyze"),
            TextMatcher::new(r"^\s*(explain|describe|interpret)\b", "explain"),
            TextMatcher::new(MULTI_ITEM_SUMMARY, "multi-item summarize"),
            TextMatcher::new(
                r"^\s*(outline\b|overview\b|give (me )?an? (outline|overview)\b)",
                "outline/overview",
            ),
            TextMatcher::new(r"^\s*(list|give)\s+(me\s+)?(the\s+)?pros and cons\b", "pros and cons"),
        ]
    })
}
