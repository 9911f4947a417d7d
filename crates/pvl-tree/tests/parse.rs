use pvl_tree::{FindOptions, InsertMode, Keyword, Object, parse};

fn build(source: &str) -> Object {
    pvl_testhelpers::init_tracing();
    parse(source.as_bytes(), "End").unwrap()
}

#[test]
fn end_to_end_structure() {
    let root = build(
        r#"Object = A
  Keyword1 = 5
  Group = B
    Keyword2 = (1,2,3)
  EndGroup
EndObject
End
"#,
    );
    assert_eq!(root.keyword_count(), 0);
    assert_eq!(root.object_count(), 1);
    let a = root.object(0).unwrap();
    assert_eq!(a.name(), "A");
    assert_eq!(a.keyword(0).unwrap().values(), &["5"]);
    let b = a.group(0).unwrap();
    assert_eq!(b.name(), "B");
    assert_eq!(b.keyword(0).unwrap().values(), &["1", "2", "3"]);
}

#[test]
fn nested_brackets_stay_verbatim() {
    let root = build("K = (a,(b,c),d)\nEnd");
    let k = root.find_keyword("K", FindOptions::None).unwrap();
    assert_eq!(k.values(), &["a", "(b,c)", "d"]);
}

#[test]
fn multi_line_quotes_collapse() {
    let root = build("Note = \"abcd\n     efgh\"\nList = (\"one\n  , two\")\nEnd");
    let note = root.find_keyword("Note", FindOptions::None).unwrap();
    assert_eq!(note.value(0).unwrap(), "abcd efgh");
    let list = root.find_keyword("List", FindOptions::None).unwrap();
    assert_eq!(list.value(0).unwrap(), "one, two");
}

#[test]
fn duplicate_names_are_kept_and_first_wins() {
    let mut root = build("Group = G\n  K = 1\nEnd_Group\nGroup = G\n  K = 2\nEnd_Group\nEnd");
    assert_eq!(root.group_count(), 2);
    let first = root.find_group("G", FindOptions::None).unwrap();
    assert_eq!(first.find_keyword("K").unwrap().value(0).unwrap(), "1");

    let group = root.find_group_mut("G", FindOptions::None).unwrap();
    group.add_keyword_with(Keyword::new("K").with_value("9"), InsertMode::Replace);
    assert_eq!(group.keyword_count(), 1);
    assert_eq!(root.group(1).unwrap().keyword(0).unwrap().value(0).unwrap(), "2");
}

#[test]
fn traversal_finds_first_object_breadth_first() {
    let root = build(
        "Object = Outer\n  Object = Inner\n    Group = G\n      Depth = 2\n    End_Group\n  End_Object\nEnd_Object\n\
         Object = Second\n  Group = G\n    Depth = 1\n  End_Group\nEnd_Object\nEnd",
    );
    let group = root.find_group("G", FindOptions::Traverse).unwrap();
    assert_eq!(group.find_keyword("Depth").unwrap().value(0).unwrap(), "1");
    let depth = root.find_keyword("Depth", FindOptions::Traverse).unwrap();
    assert_eq!(depth.value(0).unwrap(), "1");
    assert!(root.find_keyword("Depth", FindOptions::None).unwrap_err().is_not_found());
}

#[test]
fn nul_padding_ends_the_label() {
    let mut bytes = b"Lines = 5\n".to_vec();
    bytes.extend_from_slice(&[0, 0, 0xff, 0x01]);
    let root = parse(&bytes, "End").unwrap();
    assert_eq!(root.keyword_count(), 1);
}

#[test]
fn binary_data_is_a_parse_error() {
    let err = parse(b"Lines = 5\n\x01\x02", "End").unwrap_err();
    assert!(err.is_parse());
    assert_eq!(
        err.message,
        "ASCII data expected but found unprintable (binary) data"
    );
}

#[test]
fn custom_terminator() {
    let root = parse(b"A = 1\nStop\nB = 2\n", "Stop").unwrap();
    assert_eq!(root.keyword_count(), 1);
}
