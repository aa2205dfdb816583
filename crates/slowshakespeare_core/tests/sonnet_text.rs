use slowshakespeare_core::{SonnetCorpus, SONNET_LINE_COUNT, SONNET_ORDER};

const FIRST_AND_LAST_LINES: [(&str, &str, &str); 10] = [
    (
        "1",
        "From fairest creatures we desire increase,",
        "To eat the world's due, by the grave and thee.",
    ),
    (
        "18",
        "Shall I compare thee to a summer's day?",
        "So long lives this, and this gives life to thee.",
    ),
    (
        "29",
        "When, in disgrace with fortune and men's eyes,",
        "That then I scorn to change my state with kings.",
    ),
    (
        "30",
        "When to the sessions of sweet silent thought",
        "All losses are restor'd and sorrows end.",
    ),
    (
        "55",
        "Not marble, nor the gilded monuments",
        "You live in this, and dwell in lovers' eyes.",
    ),
    (
        "73",
        "That time of year thou mayst in me behold",
        "To love that well which thou must leave ere long.",
    ),
    (
        "104",
        "To me, fair friend, you never can be old,",
        "Ere you were born was beauty's summer dead.",
    ),
    (
        "116",
        "Let me not to the marriage of true minds",
        "I never writ, nor no man ever loved.",
    ),
    (
        "130",
        "My mistress' eyes are nothing like the sun;",
        "As any she belied with false compare.",
    ),
    (
        "138",
        "When my love swears that she is made of truth",
        "And in our faults by lies we flatter'd be.",
    ),
];

#[test]
fn corpus_has_ten_sonnets_in_published_order() {
    let corpus = SonnetCorpus::builtin();
    assert_eq!(corpus.len(), 10);
    assert_eq!(corpus.order().collect::<Vec<_>>(), SONNET_ORDER);
}

#[test]
fn every_sonnet_has_fourteen_non_blank_lines() {
    for sonnet in SonnetCorpus::builtin().iter() {
        assert_eq!(sonnet.lines.len(), SONNET_LINE_COUNT, "sonnet {}", sonnet.id);
        for line in &sonnet.lines {
            assert!(!line.trim().is_empty(), "sonnet {} has a blank line", sonnet.id);
            assert_eq!(line.trim(), line, "sonnet {} line has stray whitespace", sonnet.id);
        }
    }
}

#[test]
fn first_and_last_lines_match_reference_text() {
    let corpus = SonnetCorpus::builtin();
    for (id, first, last) in FIRST_AND_LAST_LINES {
        let sonnet = corpus.get(id).unwrap_or_else(|| panic!("missing sonnet {id}"));
        assert_eq!(sonnet.first_line(), first);
        assert_eq!(sonnet.lines.last().map(String::as_str), Some(last));
    }
}

#[test]
fn sonnet_lines_are_distinct_across_corpus() {
    let corpus = SonnetCorpus::builtin();
    let mut all = corpus
        .iter()
        .flat_map(|sonnet| sonnet.lines.iter())
        .collect::<Vec<_>>();
    let total = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), total);
}
