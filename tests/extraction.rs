//! Extraction behaviour through the public API.

use cardscan::extract::{
    classify, compile, extract_contacts, extract_email, extract_phone, extract_site_url,
    remove_by_regex, Entity, FoundMatch, EMAIL_PATTERN, PHONE_PATTERN, WANTED_ENTITY_TYPES,
};

const CARD: &str = "ACME Widgets\n\
Jane Doe, Sales\n\
jane.doe@acme.com | www.acme.com\n\
(415) 555-2671\n\
\n\
12 Market St, bob@yahoo.com";

#[test]
fn matches_rematch_against_their_pattern() {
    for pattern in [EMAIL_PATTERN, r"\d+", r"[A-Z][a-z]+"] {
        let regex = compile(pattern).unwrap();
        let result = remove_by_regex(CARD, pattern).unwrap();
        assert!(!result.matches.is_empty(), "no matches for {pattern}");
        for found in &result.matches {
            assert!(regex.is_match(found.text()), "{found:?} does not match {pattern}");
        }
    }
}

#[test]
fn every_line_is_kept_or_matched() {
    for pattern in [EMAIL_PATTERN, PHONE_PATTERN, r"Market"] {
        let regex = compile(pattern).unwrap();
        let result = remove_by_regex(CARD, pattern).unwrap();
        let kept: Vec<&str> = result.cleaned_text.split('\n').collect();

        let unmatched: Vec<&str> = CARD.split('\n').filter(|line| !regex.is_match(line)).collect();
        assert_eq!(kept, unmatched, "pattern {pattern}");
        assert!(kept.iter().all(|line| !regex.is_match(line)));
    }
}

#[test]
fn no_matches_leaves_text_untouched() {
    let text = "first\n\nlast\n";
    let result = remove_by_regex(text, r"\d").unwrap();
    assert!(result.matches.is_empty());
    assert_eq!(result.cleaned_text, text);
}

#[test]
fn email_extraction_is_idempotent_on_residue() {
    let first = remove_by_regex(CARD, EMAIL_PATTERN).unwrap();
    assert_eq!(first.matches.len(), 2);
    assert!(extract_email(&first.cleaned_text).is_empty());
}

#[test]
fn email_and_site_run_on_the_same_text() {
    let text = "Contact me at jane@example.com or visit www.example.com";
    assert_eq!(extract_email(text), vec!["jane@example.com"]);
    assert_eq!(extract_site_url(text), vec!["www.example.com"]);
}

#[test]
fn us_phone_lands_in_second_slot() {
    assert_eq!(
        extract_phone("(415) 555-2671"),
        vec![FoundMatch::Groups(vec![
            String::new(),
            "(415) 555-2671".to_string(),
            String::new(),
        ])]
    );
}

#[test]
fn empty_transcript_yields_nothing() {
    assert!(extract_email("").is_empty());
    assert!(extract_phone("").is_empty());
    assert!(extract_site_url("").is_empty());
    assert!(extract_contacts("").is_empty());
}

#[test]
fn card_contacts() {
    let contacts = extract_contacts(CARD);
    assert_eq!(contacts.email, vec!["jane.doe@acme.com", "bob@yahoo.com"]);
    assert_eq!(contacts.site, vec!["www.acme.com"]);
    assert_eq!(contacts.phone.len(), 1);
    assert_eq!(contacts.phone[0].text(), "(415) 555-2671");
}

#[test]
fn classifier_keys_and_counts() {
    let entities = vec![
        Entity::new("PERSON", "Alice"),
        Entity::new("LOCATION", "Paris"),
        Entity::new("PERSON", "Bob"),
    ];

    let bucket = classify(&entities, &WANTED_ENTITY_TYPES);
    assert_eq!(
        serde_json::to_value(&bucket).unwrap(),
        serde_json::json!({"ORGANIZATION": [], "PERSON": ["Alice", "Bob"], "ADDRESS": []})
    );

    let mut labels: Vec<&str> = bucket.labels().collect();
    labels.sort_unstable();
    let mut wanted = WANTED_ENTITY_TYPES.to_vec();
    wanted.sort_unstable();
    assert_eq!(labels, wanted);

    let expected = entities
        .iter()
        .filter(|e| WANTED_ENTITY_TYPES.contains(&e.entity_type.as_str()))
        .count();
    assert_eq!(bucket.total(), expected);

    let only_places = classify(&entities, &["LOCATION"]);
    assert_eq!(only_places.get("LOCATION"), Some(&["Paris".to_string()][..]));
    assert_eq!(only_places.total(), 1);
}
