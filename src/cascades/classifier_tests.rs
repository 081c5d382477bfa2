use super::*;

fn transform_prompt_of_len(len: usize) -> String {
    let prefix = "Translate this to French: ";
    let mut prompt = prefix.to_string();
    prompt.push_str(&"a".repeat(len - prefix.len()));
    assert_eq!(prompt.chars().count(), len);
    prompt
}

#[test]
fn translate_with_inline_content_routes_local() {
    let prompt = "Translate this to Spanish: Hello, how are you today? I hope you're having a great day!";
    let decision = classify(prompt, DEFAULT_MAX_LOCAL_PROMPT_LENGTH);

    assert_eq!(decision.tier, Tier::Local);
    assert_eq!(decision.confidence, Confidence::High);
    assert_eq!(decision.prompt_length, 86);
    assert!(decision.reason.contains("translate"));
}

#[test]
fn possessive_question_routes_quality() {
    let decision = classify("What are my cron jobs?", DEFAULT_MAX_LOCAL_PROMPT_LENGTH);

    assert_eq!(decision.tier, Tier::Quality);
    assert_eq!(decision.confidence, Confidence::High);
    assert!(decision.reason.contains("Tool signal"));
}

#[test]
fn compare_with_inline_content_routes_cheap() {
    let prompt = "Compare these two: Option A is faster but uses more memory. Option B is slower but memory efficient.";
    let decision = classify(prompt, DEFAULT_MAX_LOCAL_PROMPT_LENGTH);

    assert_eq!(decision.tier, Tier::Cheap);
    assert_eq!(decision.confidence, Confidence::Medium);
    assert_eq!(decision.reason, "Medium transform: compare");
}

#[test]
fn transform_without_inline_content_defaults_to_quality() {
    let decision = classify("Translate this: hi", DEFAULT_MAX_LOCAL_PROMPT_LENGTH);

    assert_eq!(decision.tier, Tier::Quality);
    assert_eq!(decision.reason, DEFAULT_REASON);
}

#[test]
fn tool_signal_in_command_beats_transform() {
    let prompt = "Summarize my notes: the meeting covered budget, hiring and the roadmap for Q3.";
    let decision = classify(prompt, DEFAULT_MAX_LOCAL_PROMPT_LENGTH);

    assert_eq!(decision.tier, Tier::Quality);
    assert_eq!(decision.reason, "Tool signal: possessive reference (my/our)");
}

#[test]
fn tool_words_inside_inline_content_are_ignored() {
    // "delete", "my" and "today" all live after the colon
    let prompt = "Rewrite this politely: delete my account today or I will call the bank.";
    let decision = classify(prompt, DEFAULT_MAX_LOCAL_PROMPT_LENGTH);

    assert_eq!(decision.tier, Tier::Local);
    assert_eq!(decision.reason, "Simple transform: rewrite");
}

#[test]
fn tool_signal_in_bare_prompt_checks_whole_text() {
    let decision = classify("Explain why the build failed yesterday", DEFAULT_MAX_LOCAL_PROMPT_LENGTH);

    assert_eq!(decision.tier, Tier::Quality);
    assert!(decision.reason.starts_with("Tool signal"));
}

#[test]
fn simple_transform_boundary_at_max_local_length() {
    let at_limit = classify(&transform_prompt_of_len(2000), 2000);
    assert_eq!(at_limit.tier, Tier::Local);
    assert_eq!(at_limit.confidence, Confidence::High);

    let over_limit = classify(&transform_prompt_of_len(2001), 2000);
    assert_eq!(over_limit.tier, Tier::Cheap);
    assert_eq!(over_limit.confidence, Confidence::Medium);
    assert!(over_limit.reason.contains("too long for local"));
}

#[test]
fn custom_max_local_length_is_honored() {
    let prompt = transform_prompt_of_len(120);
    assert_eq!(classify(&prompt, 120).tier, Tier::Local);
    assert_eq!(classify(&prompt, 119).tier, Tier::Cheap);
}

#[test]
fn classification_is_deterministic() {
    let prompts = [
        "Translate this to Spanish: Hello, how are you today? I hope you're having a great day!",
        "What are my cron jobs?",
        "Tell me a story",
        "",
    ];
    for prompt in prompts {
        assert_eq!(classify(prompt, 2000), classify(prompt, 2000));
    }
}

#[test]
fn empty_prompt_defaults_to_quality() {
    let decision = classify("", DEFAULT_MAX_LOCAL_PROMPT_LENGTH);
    assert_eq!(decision.tier, Tier::Quality);
    assert_eq!(decision.prompt_length, 0);
}

#[test]
fn prompt_length_counts_characters_not_bytes() {
    let decision = classify("Übersetze: ñandú", DEFAULT_MAX_LOCAL_PROMPT_LENGTH);
    assert_eq!(decision.prompt_length, 16);
}

#[test]
fn aggressive_policy_uses_length_defaults() {
    let at = |len: usize| classify_with_policy(&"z".repeat(len), 2000, RoutingPolicy::Aggressive).tier;

    assert_eq!(at(1), Tier::Local);
    assert_eq!(at(LOCAL_LENGTH_CEILING), Tier::Local);
    assert_eq!(at(LOCAL_LENGTH_CEILING + 1), Tier::Cheap);
    assert_eq!(at(CHEAP_LENGTH_CEILING - 1), Tier::Cheap);
    assert_eq!(at(CHEAP_LENGTH_CEILING), Tier::Cheap);
    assert_eq!(at(CHEAP_LENGTH_CEILING + 1), Tier::Quality);
}

#[test]
fn aggressive_policy_keeps_tool_signal_precedence() {
    let decision = classify_with_policy("Check my inbox", 2000, RoutingPolicy::Aggressive);
    assert_eq!(decision.tier, Tier::Quality);
}

#[test]
fn conservative_policy_ignores_length_for_unmatched_prompts() {
    let decision = classify_with_policy(&"z".repeat(10), 2000, RoutingPolicy::Conservative);
    assert_eq!(decision.tier, Tier::Quality);
}

#[test]
fn rule_classifier_uses_its_configuration() {
    let classifier = RuleClassifier::new(50, RoutingPolicy::Conservative);
    let decision = classifier.classify(&transform_prompt_of_len(51));
    assert_eq!(decision.tier, Tier::Cheap);
}

#[test]
fn inline_content_colon_rule() {
    assert!(!has_inline_content("Translate this: hi"));
    assert!(has_inline_content("Translate this: the quick brown fox jumps"));
    // exactly 20 characters after the colon is not enough
    assert!(!has_inline_content("Translate: 12345678901234567890"));
    assert!(has_inline_content("Translate: 123456789012345678901"));
}

#[test]
fn inline_content_colon_must_be_in_command_window() {
    let prompt = format!("{}: {}", "z".repeat(100), "y".repeat(30));
    // colon sits at character 100, but the prompt itself exceeds 100 chars
    assert!(has_inline_content(&prompt));
    assert_eq!(command_portion(&prompt).chars().count(), 100);
}

#[test]
fn inline_content_quote_rule() {
    assert!(has_inline_content("Translate \"the weather is lovely today\""));
    assert!(!has_inline_content("Translate \"short one\""));
}

#[test]
fn inline_content_length_rule() {
    assert!(!has_inline_content(&"z".repeat(100)));
    assert!(has_inline_content(&"z".repeat(101)));
}

#[test]
fn command_portion_variants() {
    assert_eq!(command_portion("Translate to Spanish: hola amigo"), "Translate to Spanish");
    assert_eq!(
        command_portion("Rewrite \"please send the report by friday\""),
        "Rewrite "
    );
    assert_eq!(command_portion("short prompt"), "short prompt");
}

#[test]
fn legacy_complex_indicator_forces_cloud() {
    let decision = classify_task("Refactor this module", 500);
    assert_eq!(decision.tier, LegacyTier::Cloud);
    assert_eq!(decision.confidence, Confidence::High);
    assert!(decision.reason.contains("refactor"));
}

#[test]
fn legacy_simple_keyword_within_limit_is_local() {
    let decision = classify_task_default("Translate hello to German");
    assert_eq!(decision.tier, LegacyTier::Local);
    assert_eq!(decision.confidence, Confidence::High);
}

#[test]
fn legacy_boundary_at_max_local_length() {
    assert_eq!(classify_task(&transform_prompt_of_len(500), 500).tier, LegacyTier::Local);

    let over = classify_task(&transform_prompt_of_len(501), 500);
    assert_eq!(over.tier, LegacyTier::Cloud);
    assert_eq!(over.confidence, Confidence::Medium);
}

#[test]
fn legacy_without_keyword_uses_length() {
    let short = classify_task("Tell me a joke", 500);
    assert_eq!(short.tier, LegacyTier::Local);
    assert_eq!(short.confidence, Confidence::Low);

    let long = classify_task(&"z".repeat(501), 500);
    assert_eq!(long.tier, LegacyTier::Cloud);
    assert_eq!(long.confidence, Confidence::High);
}

#[test]
fn url_after_transform_verb_routes_quality() {
    let prompt = "Summarize https://example.com/blog/some-long-article-slug";
    let decision = classify(prompt, DEFAULT_MAX_LOCAL_PROMPT_LENGTH);

    assert_eq!(decision.tier, Tier::Quality);
    assert_eq!(decision.reason, "Tool signal: URL reference");
    assert!(!has_inline_content(prompt));
    assert_eq!(command_portion(prompt), prompt);
}

#[test]
fn url_inside_inline_content_still_routes_quality() {
    let prompt = "Summarize this page: https://example.com/blog/some-long-article-slug";
    assert_eq!(command_portion(prompt), "Summarize this page");

    let decision = classify(prompt, DEFAULT_MAX_LOCAL_PROMPT_LENGTH);
    assert_eq!(decision.tier, Tier::Quality);
    assert_eq!(decision.reason, "Tool signal: URL reference");
}

#[test]
fn contractions_do_not_form_quoted_spans() {
    let prompt = "Summarize what's in my inbox and what's new from Slack";
    assert!(!has_inline_content(prompt));
    assert_eq!(command_portion(prompt), prompt);

    let decision = classify(prompt, DEFAULT_MAX_LOCAL_PROMPT_LENGTH);
    assert_eq!(decision.tier, Tier::Quality);
    assert_eq!(decision.reason, "Tool signal: possessive reference (my/our)");

    assert!(!has_inline_content("Rewrite what's written so it doesn't sound stiff"));
}

#[test]
fn contractions_do_not_cut_command_portion() {
    let prompt = "Translate what's in my notes folder into Spanish, and don't forget the ones I wrote yesterday about the trip";
    // inline by length only, so the whole command window is checked
    assert!(has_inline_content(prompt));
    assert!(command_portion(prompt).contains("my notes folder"));

    let decision = classify(prompt, DEFAULT_MAX_LOCAL_PROMPT_LENGTH);
    assert_eq!(decision.tier, Tier::Quality);
}

#[test]
fn single_quoted_span_still_counts() {
    let prompt = "Rewrite 'the weather is lovely today' in a formal tone";
    assert!(has_inline_content(prompt));
    assert_eq!(command_portion(prompt), "Rewrite ");
    assert!(has_inline_content("'the weather is lovely today'"));
}

#[test]
fn summarize_the_following_routes_local() {
    let prompt = "Summarize the following: the meeting moved to Thursday at noon in room B";
    let decision = classify(prompt, DEFAULT_MAX_LOCAL_PROMPT_LENGTH);

    assert_eq!(decision.tier, Tier::Local);
    assert_eq!(decision.reason, "Simple transform: summarize");
}
