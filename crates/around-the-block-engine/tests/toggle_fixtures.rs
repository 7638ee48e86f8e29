use around_the_block_engine::{
    BlockDescriptor, Document, Notation, current_block_descriptor, find_block_end,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("do_end_block", 2)]
#[case("brace_block_with_argument", 1)]
#[case("do_end_block_with_hash", 1)]
#[case("do_end_block_with_comment", 3)]
#[case("string_interpolation", 1)]
fn fixture_descriptor(#[case] name: &str, #[case] cursor_line: usize) {
    let lines = fixture_lines(name);
    let descriptor = current_block_descriptor(&lines, cursor_line).unwrap();
    insta::assert_yaml_snapshot!(name, descriptor);
}

#[rstest]
#[case("do_end_block", 2)]
#[case("brace_block_with_argument", 1)]
#[case("do_end_block_with_hash", 1)]
#[case("do_end_block_with_comment", 3)]
#[case("string_interpolation", 1)]
fn fixture_toggle(#[case] name: &str, #[case] cursor_line: usize) {
    let mut doc = Document::from_bytes(fixture(name).as_bytes()).unwrap();

    doc.toggle_block_at(cursor_line).unwrap();

    assert_eq!(doc.text(), fixture(&format!("{name}.toggled")));
}

/// Toggling twice in alternating directions restores the original source
#[rstest]
#[case("do_end_block", 2)]
#[case("brace_block_with_argument", 1)]
#[case("do_end_block_with_hash", 1)]
#[case("do_end_block_with_comment", 3)]
#[case("string_interpolation", 1)]
fn fixture_round_trip(#[case] name: &str, #[case] cursor_line: usize) {
    let original = fixture(name);
    let mut doc = Document::from_bytes(original.as_bytes()).unwrap();

    let first = doc.toggle_block_at(cursor_line).unwrap();
    doc.toggle_block_at(first.toggled.start_line).unwrap();

    assert_eq!(doc.text(), original);
}

/// Every line of a block, delimiters included, resolves the same block
#[rstest]
#[case("do_end_block", 2)]
#[case("brace_block_with_argument", 1)]
#[case("do_end_block_with_comment", 3)]
#[case("string_interpolation", 1)]
fn descriptor_is_stable_across_block_lines(#[case] name: &str, #[case] cursor_line: usize) {
    let lines = fixture_lines(name);
    let expected = current_block_descriptor(&lines, cursor_line).unwrap();

    for line in expected.start.line..=expected.end.line {
        let descriptor: BlockDescriptor = current_block_descriptor(&lines, line).unwrap();
        assert_eq!(descriptor, expected, "cursor on line {line}");
    }
}

#[test]
fn keyword_end_scan_passes_over_hash_literal() {
    let lines = fixture_lines("do_end_block_with_hash");

    let unlocked = find_block_end(&lines, 1, None).unwrap();
    assert_eq!(unlocked.notation, Notation::Brace);
    assert_eq!(unlocked.position.line, 2);

    let locked = find_block_end(&lines, 1, Some(Notation::Keyword)).unwrap();
    assert_eq!(locked.notation, Notation::Keyword);
    assert_eq!(locked.position.line, 3);
}

#[test]
fn long_block_keeps_every_line() {
    let mut doc = Document::from_bytes(fixture("do_end_block_with_comment").as_bytes()).unwrap();

    let patch = doc.toggle_block_at(3).unwrap();

    assert_eq!(patch.toggled.replacement_lines.len(), 5);
    assert_eq!(doc.line_count(), fixture_lines("do_end_block_with_comment").len());
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.rb",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

fn fixture_lines(name: &str) -> Vec<String> {
    fixture(name).split('\n').map(str::to_string).collect()
}
