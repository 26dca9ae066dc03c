mod common;

use common::*;
use redocx::normalize::{Yoficator, middle_dash_between_digits};
use redocx::{CheckMode, Error, TextVariant, Variants};

fn plains(doc: &redocx::Document) -> Vec<&str> {
    doc.paragraphs.iter().map(|p| p.plain.as_str()).collect()
}

#[test]
fn strip_empty_drops_whitespace_only_paragraphs() {
    init_logging();
    let mut doc = document(vec![
        paragraph(1, "Text"),
        paragraph(1, "   "),
        paragraph(1, "{{b}} {{/b}}"),
        paragraph(2, ""),
        paragraph(2, "More"),
    ]);
    doc.strip_empty();
    assert_eq!(plains(&doc), ["Text", "More"]);
}

#[test]
fn strip_custom_can_look_at_markers() {
    let mut doc = document(vec![
        paragraph(1, "{{b}}Heading{{/b}}"),
        paragraph(1, "Body"),
    ]);
    doc.strip_custom(|marked| !marked.starts_with("{{b}}"), TextVariant::Marked);
    assert_eq!(plains(&doc), ["Body"]);
}

#[test]
fn page_numbers_are_stripped() {
    let mut doc = document(vec![
        paragraph(1, "Body text."),
        paragraph(1, " 12 "),
        paragraph(2, "2024"),
        paragraph(2, "12345"),
        paragraph(2, "12a"),
    ]);
    doc.strip_page_numbers();
    assert_eq!(plains(&doc), ["Body text.", "12345", "12a"]);
}

#[test]
fn lowercase_paragraphs_continue_the_previous_one() {
    init_logging();
    let mut doc = document(vec![
        paragraph(1, "A sentence broken by the"),
        paragraph(2, "page boundary{{1}}."),
        paragraph(2, "New paragraph."),
        paragraph(2, "\u{ab}Quoted\u{bb} start."),
    ]);
    doc.merge_paragraphs();

    assert_eq!(
        plains(&doc),
        [
            "A sentence broken by the page boundary.",
            "New paragraph. \u{ab}Quoted\u{bb} start.",
        ]
    );
    assert_eq!(doc.paragraphs[0].marked, "A sentence broken by the page boundary{{1}}.");
    assert_eq!(doc.paragraphs[0].page, 1);
    assert_eq!(doc.paragraphs[0].origins.len(), 2);
}

#[test]
fn first_paragraph_never_merges() {
    let mut doc = document(vec![paragraph(1, "lowercase start"), paragraph(1, "Next")]);
    doc.merge_paragraphs();
    assert_eq!(plains(&doc), ["lowercase start", "Next"]);
}

#[test]
fn check_warns_and_keeps_going() {
    init_logging();
    let mut doc = document(vec![paragraph(1, "short"), paragraph(1, "long enough text")]);
    doc.check(|t| t.len() > 10, "Too short paragraph", CheckMode::Warn)
        .unwrap();
    assert_eq!(doc.paragraphs.len(), 2);
}

#[test]
fn check_fails_on_first_violation() {
    let mut doc = document(vec![paragraph(3, "long enough text"), paragraph(3, "short")]);
    let err = doc
        .check(|t| t.len() > 10, "Too short paragraph", CheckMode::Fail)
        .unwrap_err();
    match err {
        Error::CheckFailed { message, paragraph } => {
            assert_eq!(message, "Too short paragraph");
            assert!(paragraph.contains("short"));
            assert!(paragraph.contains("page:3"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn dash_normalization_keeps_variants_in_agreement() {
    let mut doc = document(vec![paragraph(1, "Pages {{b}}10 - 12{{/b}} and 3—4")]);
    doc.footnotes.push(footnote(1, 0, "See 1 – 2."));
    doc.prepare_paragraphs(middle_dash_between_digits, Variants::Both)
        .prepare_footnotes(middle_dash_between_digits, Variants::Both);

    assert_eq!(doc.paragraphs[0].marked, "Pages {{b}}10–12{{/b}} and 3–4");
    assert_eq!(doc.paragraphs[0].plain, "Pages 10–12 and 3–4");
    assert!(doc.paragraphs[0].is_consistent());
    assert_eq!(doc.footnotes[0].plain, "See 1–2.");
}

#[test]
fn dash_normalization_reaches_across_markers() {
    let mut doc = document(vec![paragraph(1, "Verses {{b}}10{{/b}} - 12")]);
    doc.prepare_paragraphs(middle_dash_between_digits, Variants::Both);

    assert_eq!(doc.paragraphs[0].marked, "Verses {{b}}10{{/b}}–12");
    assert_eq!(doc.paragraphs[0].plain, "Verses 10–12");
    assert!(doc.paragraphs[0].is_consistent());

    let mut sink = RecordingSink::default();
    redocx::write_document(&doc, &mut sink);
    assert_eq!(
        sink.paragraph_runs(0),
        vec![
            ("Verses ".to_string(), PLAIN),
            ("10".to_string(), BOLD),
            ("–12".to_string(), PLAIN),
        ]
    );
}

#[test]
fn marked_only_normalization_leaves_plain_text() {
    let mut doc = document(vec![paragraph(1, "1 - 2")]);
    doc.prepare_paragraphs(middle_dash_between_digits, Variants::MarkedOnly);
    assert_eq!(doc.paragraphs[0].marked, "1–2");
    assert_eq!(doc.paragraphs[0].plain, "1 - 2");
    assert!(!doc.paragraphs[0].is_consistent());
}

#[test]
fn yoficator_restores_words_outside_markers() {
    let yo = Yoficator::parse("еще: ещё\nвсе : всё\nbroken line\n");
    assert_eq!(yo.len(), 2);

    let mut doc = document(vec![paragraph(1, "Он {{i}}еще{{/i}} не все знает, нечто")]);
    doc.prepare_paragraphs(|t| yo.apply(t), Variants::Both);
    assert_eq!(doc.paragraphs[0].marked, "Он {{i}}ещё{{/i}} не всё знает, нечто");
    assert!(doc.paragraphs[0].is_consistent());
}

#[test]
fn yoficator_dictionary_is_read_from_disk() {
    init_logging();
    let path = std::env::temp_dir().join(format!("redocx-yo-{}.txt", std::process::id()));
    std::fs::write(&path, "елка:ёлка\n").unwrap();
    let yo = Yoficator::from_path(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(yo.apply("Новая елка."), "Новая ёлка.");
    assert!(Yoficator::from_path(&path).is_err());
}

#[test]
fn transform_options_toggle_passes() {
    init_logging();
    let source = redocx::SourceDocument {
        paragraphs: vec![
            source(1, &[("Intro 1 - 2", PLAIN)]),
            source(1, &[("3", PLAIN)]),
            source(1, &[("tail", PLAIN)]),
        ],
    };
    let options = redocx::Options {
        min_paragraph_len: 0,
        merge_continuations: false,
        strip_page_numbers: false,
        dash_normalization: false,
        ..redocx::Options::default()
    };
    let doc = redocx::transform(&source, &options).unwrap();
    assert_eq!(plains(&doc), ["Intro 1 - 2", "3", "tail"]);

    let doc = redocx::transform(&source, &redocx::Options::default()).unwrap();
    assert_eq!(plains(&doc), ["Intro 1–2 tail"]);
}
