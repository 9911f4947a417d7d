use std::path::PathBuf;
use std::sync::Arc;

use pvl::{FindOptions, Group, Keyword, Object, PdsFormat, Pvl};
use pvl_testhelpers::assert_text_eq;

const SCENARIO: &str = "Object = A
  Keyword1 = 5
  Group = B
    Keyword2 = (1,2,3)
  EndGroup
EndObject
End
";

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pvl-document-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn end_to_end_scenario() {
    pvl_testhelpers::init_tracing();
    let pvl: Pvl = SCENARIO.parse().unwrap();
    let a = pvl.find_object("A", FindOptions::None).unwrap();
    assert_eq!(a.find_keyword("Keyword1", FindOptions::None).unwrap().values(), &["5"]);
    let b = a.find_group("B", FindOptions::None).unwrap();
    assert_eq!(b.find_keyword("Keyword2").unwrap().values(), &["1", "2", "3"]);

    insta::assert_snapshot!(pvl.to_string(), @r"
    Object = A
      Keyword1 = 5

      Group = B
        Keyword2 = (1, 2, 3)
      End_Group
    End_Object
    End
    ");

    let again: Pvl = pvl.to_string().parse().unwrap();
    assert_eq!(again.root(), pvl.root());
}

#[test]
fn traverse_and_first_match() {
    let pvl: Pvl = "Object = One\n  Group = G\n    K = first\n  End_Group\nEnd_Object\n\
                    Object = Two\n  Group = G\n    K = second\n  End_Group\nEnd_Object\nEnd"
        .parse()
        .unwrap();

    let err = pvl.find_keyword("K", FindOptions::None).unwrap_err();
    assert!(err.is_not_found());
    for _ in 0..3 {
        let group = pvl.find_group("G", FindOptions::Traverse).unwrap();
        assert_eq!(group.find_keyword("K").unwrap().value(0).unwrap(), "first");
    }
}

#[test]
fn structural_mismatch_names_token_and_group() {
    let err = "Group = X\n  A = 1\nEndObject\nEnd".parse::<Pvl>().unwrap_err();
    assert!(err.is_parse());
    assert_eq!(err.message, "Error in PVL file on line [3]");
    assert_eq!(err.root_cause().message, "Unexpected [EndObject] in PVL Group [X]");
}

#[test]
fn parse_error_diagnostic() {
    let source = "Object = A\n  Name = \"open\nEndObject\nEnd\n";
    let err = source.parse::<Pvl>().unwrap_err();
    let rendered = err.render("label.pvl", source);
    let plain = String::from_utf8(strip_ansi_escapes::strip(rendered.as_bytes())).unwrap();
    assert!(plain.contains("Error in PVL file on line [2]"), "{plain}");
    assert!(plain.contains("label.pvl:2:"), "{plain}");
    assert!(plain.contains("Missing right double quote"), "{plain}");
}

#[test]
fn write_read_and_append_files() {
    let dir = scratch("files");
    let path = dir.join("label.pvl");

    let mut pvl = Pvl::new();
    pvl.add_keyword(Keyword::new("Version").with_value("1"));
    pvl.add_group(Group::new("G").with_keyword(Keyword::new("K").with_value("two words")));
    pvl.write(&path).unwrap();
    assert_text_eq(
        "Version = 1\n\nGroup = G\n  K = \"two words\"\nEnd_Group\nEnd\n",
        &std::fs::read_to_string(&path).unwrap(),
    );

    let read = Pvl::read(&path).unwrap();
    assert_eq!(read.filename(), Some(path.display().to_string().as_str()));
    assert_eq!(read.root(), pvl.root());

    let missing = read.find_keyword("Nope", FindOptions::None).unwrap_err();
    assert!(missing.message.ends_with(&format!(" in file [{}]", path.display())));

    let mut extra = Pvl::new();
    extra.set_terminator("");
    extra.add_keyword(Keyword::new("Later").with_value("3"));
    extra.append(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("End\nLater = 3\n"), "{text}");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_file_is_io_error() {
    let err = Pvl::read("/nonexistent/label.pvl").unwrap_err();
    assert!(err.is_io());
    assert_eq!(err.message, "Unable to read PVL file [/nonexistent/label.pvl]");
}

#[test]
fn unreadable_label_is_wrapped() {
    let dir = scratch("bad");
    let path = dir.join("bad.pvl");
    std::fs::write(&path, "A = 1\nB = (1\nEnd\n").unwrap();
    let err = Pvl::read(&path).unwrap_err();
    assert!(err.is_parse());
    let messages: Vec<&str> = err.chain().map(|e| e.message.as_str()).collect();
    assert_eq!(messages[0], format!("Unable to read PVL file [{}]", path.display()));
    assert_eq!(messages[1], "Error in PVL file on line [2]");

    let mut pvl = Pvl::new();
    assert!(pvl.read_file(&path).is_err());
    assert_eq!(pvl.filename(), None);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn pds_formatter_and_template() {
    let mut pvl: Pvl = "Group = Image\n  Lines = 10\n  Samples = 20\nEnd_Group\nEnd".parse().unwrap();
    pvl.set_formatter(Some(Arc::new(PdsFormat::new())));
    let mut samples = Keyword::new("Samples");
    samples.add_comment("Width first");
    pvl.set_format_template(Some(Object::new("Template").with_group(Group::new("Image").with_keyword(samples))));

    assert_eq!(
        pvl.render().unwrap(),
        "GROUP = IMAGE\r\n\r\n  # Width first\r\n  SAMPLES = 20\r\n  LINES   = 10\r\nEND_GROUP = IMAGE\r\nEnd\r\n"
    );
}

#[test]
fn validation_through_documents() {
    let template: Pvl = "Group = Dimensions\n  Dimensions__Required = true\n  Lines = integer\nEnd_Group\nEnd"
        .parse()
        .unwrap();

    let user: Pvl = "Group = Dimensions\n  Lines = 5\n  Bands = 1\nEnd_Group\nEnd".parse().unwrap();
    let result = template.validate_pvl(&user).unwrap();
    let dims = result.find_group("Dimensions", FindOptions::None).unwrap();
    assert_eq!(dims.keyword_count(), 1);
    assert!(dims.has_keyword("Bands"));

    let empty: Pvl = "Group = Other\nEnd_Group\nEnd".parse().unwrap();
    let err = template.validate_pvl(&empty).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.message, "Group \"Dimensions\" Not Found in the Template File");
}

#[test]
fn every_comment_style_reads_back() {
    let mut pvl = Pvl::new();
    let mut slash = Keyword::new("A").with_value("1");
    slash.add_comment("// slashes");
    let mut block = Keyword::new("B").with_value("2");
    block.add_comment("/* block */");
    block.set_inline_comment(Some("// trailing".to_string()));
    pvl.add_keyword(slash);
    pvl.add_keyword(block);

    let text = pvl.to_string();
    assert_eq!(text, "// slashes\nA = 1\n\n/* block */\nB = 2 // trailing\nEnd\n");

    let again: Pvl = text.parse().unwrap();
    let a = again.find_keyword("A", FindOptions::None).unwrap();
    assert_eq!(a.comments(), &["// slashes"]);
    let b = again.find_keyword("B", FindOptions::None).unwrap();
    assert_eq!(b.comments(), &["/* block */"]);
    assert_eq!(b.inline_comment(), Some("// trailing"));
    assert_eq!(again.keyword_count(), 2);
}

#[test]
fn continued_lines_join() {
    let pvl: Pvl = "Note = \"The planet Jupi-\n   ter is big\"\nPath = /usr/local-\n   /share\nEnd"
        .parse()
        .unwrap();
    assert_eq!(
        pvl.find_keyword("Note", FindOptions::None).unwrap().values(),
        &["The planet Jupiter is big"]
    );
    assert_eq!(
        pvl.find_keyword("Path", FindOptions::None).unwrap().values(),
        &["/usr/local/share"]
    );
    assert_eq!(pvl.keyword_count(), 2);
}
