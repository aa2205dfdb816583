use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use slowshakespeare_core::{
    plan_display, DisplayConfig, DisplayMode, SonnetCorpus, DEFAULT_COLOR, REVIEW_FRAME_DELAY_MS,
};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, hour, minute, 30).unwrap()
}

fn config(sonnet: &str, start: &str) -> DisplayConfig {
    DisplayConfig {
        sonnet: Some(sonnet.to_string()),
        color: None,
        start_date: Some(start.to_string()),
    }
}

#[test]
fn static_plan_shows_revealed_lines_with_first_marked() {
    let corpus = SonnetCorpus::builtin();
    let plan = plan_display(corpus, &config("18", "2025-06-13T00:00:00Z"), &at(9, 41));

    assert!(!plan.is_review());
    assert_eq!(plan.progress.lines_revealed, 3);
    let DisplayMode::Static { lines } = &plan.mode else {
        panic!("expected static plan");
    };
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].text, "Shall I compare thee to a summer's day?");
    assert!(lines[0].marked);
    assert!(lines[1..].iter().all(|line| !line.marked));
    assert_eq!(lines[2].index, 2);
}

#[test]
fn review_plan_fires_at_top_of_hour_and_replays_three_times() {
    let corpus = SonnetCorpus::builtin();
    let plan = plan_display(corpus, &config("18", "2025-06-12T00:00:00Z"), &at(14, 0));

    assert!(plan.is_review());
    let DisplayMode::Review { frames, delay_ms } = &plan.mode else {
        panic!("expected review plan");
    };
    assert_eq!(*delay_ms, REVIEW_FRAME_DELAY_MS);
    assert_eq!(frames.len(), 4 * 3);
    let indices = frames.iter().map(|frame| frame.index).collect::<Vec<_>>();
    assert_eq!(indices, vec![0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3]);
    assert_eq!(frames.iter().filter(|frame| frame.marked).count(), 3);
}

#[test]
fn minute_one_is_not_review() {
    let corpus = SonnetCorpus::builtin();
    let plan = plan_display(corpus, &config("18", "2025-06-12T00:00:00Z"), &at(14, 1));
    assert!(!plan.is_review());
}

#[test]
fn defaults_apply_when_config_is_empty() {
    let corpus = SonnetCorpus::builtin();
    let plan = plan_display(corpus, &DisplayConfig::default(), &at(9, 30));
    assert_eq!(plan.progress.current_sonnet_id, "18");
    assert_eq!(plan.progress.lines_revealed, 1);
    assert_eq!(plan.style.color, DEFAULT_COLOR);
    assert_eq!(plan.style.font, "tom-thumb");
    assert_eq!(plan.style.padding, [2, 2, 2, 2]);
}

#[test]
fn unreadable_start_date_starts_today() {
    let corpus = SonnetCorpus::builtin();
    let plan = plan_display(corpus, &config("73", "last tuesday"), &at(9, 30));
    assert_eq!(plan.progress.current_sonnet_id, "73");
    assert_eq!(plan.progress.elapsed_days_clamped, 0);
}

#[test]
fn start_timestamp_is_read_in_display_zone() {
    let corpus = SonnetCorpus::builtin();
    let new_york = FixedOffset::west_opt(4 * 3600).unwrap();
    // Picked as midnight UTC on June 2nd, which is still June 1st in New York.
    let now = new_york.with_ymd_and_hms(2025, 6, 15, 12, 30, 0).unwrap();
    let plan = plan_display(corpus, &config("18", "2025-06-02T00:00:00Z"), &now);
    assert_eq!(plan.progress.elapsed_days_clamped, 14);
    assert_eq!(plan.progress.current_sonnet_id, "29");
}

#[test]
fn unknown_sonnet_falls_back_to_first_corpus_entry() {
    let corpus = SonnetCorpus::builtin();
    let plan = plan_display(corpus, &config("999", "2025-06-15"), &at(9, 30));
    assert_eq!(plan.progress.current_sonnet_id, "1");
}

#[test]
fn plan_serializes_with_mode_tag() {
    let corpus = SonnetCorpus::builtin();
    let plan = plan_display(corpus, &config("18", "2025-06-15"), &at(0, 0));
    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["mode"], "review");
    assert_eq!(json["delay_ms"], 5000);
    assert_eq!(json["frames"].as_array().map(Vec::len), Some(3));
}
