//! PVL output writer.
//!
//! Renders keywords, groups, objects and whole documents through a
//! [`Formatter`], optionally ordered by a format template.

use pvl_tree::{Container, FindOptions, Group, Keyword, Object, PvlError, Result, names_match};
use tracing::{debug, warn};

use crate::format::Formatter;
use crate::options::FormatOptions;
use crate::wrap::write_wrapped;

/// Template keyword whose value names a PVL file merged into the template.
pub const TEMPLATE_INCLUDE_KEYWORD: &str = "Isis:PvlTemplate:File";

/// PVL output writer.
///
/// A format template is a parallel object whose keywords, groups and objects
/// say what to write first and which comments to put before them. Anything
/// the template does not mention is written afterwards, in document order.
pub struct PvlWriter<'f> {
    out: String,
    format: &'f dyn Formatter,
    options: FormatOptions,
}

impl<'f> PvlWriter<'f> {
    /// Create a new writer with default options.
    pub fn new(format: &'f dyn Formatter) -> Self {
        Self::with_options(format, FormatOptions::default())
    }

    /// Create a new writer with the given options.
    pub fn with_options(format: &'f dyn Formatter, options: FormatOptions) -> Self {
        Self {
            out: String::new(),
            format,
            options,
        }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Consume the writer and return the output.
    pub fn finish(self) -> String {
        self.out
    }

    fn eol(&mut self) {
        self.out.push_str(self.format.format_eol());
    }

    fn pad(&mut self, n: usize) {
        self.out.extend(std::iter::repeat_n(' ', n));
    }

    fn write_comments(&mut self, comments: &[String], indent: usize) {
        for comment in comments {
            self.pad(indent);
            self.out.push_str(comment);
            self.eol();
        }
    }

    /// Write one keyword with no trailing line break.
    ///
    /// `width` is the name column width; shorter names are padded so the
    /// `=` signs of a container line up.
    pub fn write_keyword(&mut self, keyword: &Keyword, indent: usize, width: usize) {
        let format = self.format;
        self.write_comments(keyword.comments(), indent);

        self.pad(indent);
        let name = format.format_name(keyword);
        self.out.push_str(&name);
        let padding = width.saturating_sub(name.len());
        self.pad(padding);
        self.out.push_str(" = ");
        let start_column = indent + name.len() + padding + 3;

        let text: String = if keyword.is_empty() {
            format.format_value(keyword, 0)
        } else {
            (0..keyword.len())
                .map(|i| format.format_value(keyword, i))
                .collect()
        };
        write_wrapped(
            &mut self.out,
            &text,
            start_column,
            self.options.char_limit,
            format.format_eol(),
        );

        if let Some(comment) = keyword.inline_comment() {
            self.out.push(' ');
            self.out.push_str(comment);
        }
    }

    /// Write the keywords of a container, one per line, with no trailing
    /// line break after the last.
    ///
    /// Keywords named in `template` come first, in template order, each
    /// preceded by a blank line and the template's comments when either has
    /// comments.
    pub fn write_keywords(&mut self, container: &Container, template: Option<&Container>, indent: usize) {
        let width = container.iter().map(|k| k.name().len()).max().unwrap_or(0);
        let count = container.keyword_count();
        let mut written = 0;

        if let Some(template) = template {
            for guide in template {
                for keyword in container.iter().filter(|k| names_match(k.name(), guide.name())) {
                    if !guide.comments().is_empty() || !keyword.comments().is_empty() {
                        self.eol();
                    }
                    self.write_comments(guide.comments(), indent);
                    self.write_keyword(keyword, indent, width);
                    written += 1;
                    if written < count {
                        self.eol();
                    }
                }
            }
        }

        let keywords = container.keywords();
        for (i, keyword) in keywords.iter().enumerate() {
            if template.is_some_and(|t| t.has_keyword(keyword.name())) {
                continue;
            }
            self.write_keyword(keyword, indent, width);
            written += 1;
            if written < count {
                if keywords.get(i + 1).is_some_and(|next| !next.comments().is_empty()) {
                    self.eol();
                }
                self.eol();
            }
        }
    }

    /// Write a group through its end statement, with no trailing line break.
    pub fn write_group(&mut self, group: &Group, template: Option<&Group>, indent: usize) -> Result<()> {
        let template = template.map(expand_group_template).transpose()?;
        if let Some(template) = &template {
            self.write_comments(template.comments(), indent);
        }

        let name_keyword = group.name_keyword();
        self.write_keyword(&name_keyword, indent, 0);
        self.eol();

        if group.keyword_count() > 0 {
            self.write_keywords(
                group,
                template.as_ref().map(Group::container),
                indent + self.options.indent_width,
            );
            self.eol();
        }

        self.pad(indent);
        let end = self.format.format_end(group.kind().end_keyword(), &name_keyword);
        self.out.push_str(&end);
        Ok(())
    }

    /// Write an object and everything in it through its end statement, with
    /// no trailing line break.
    pub fn write_object(&mut self, object: &Object, template: Option<&Object>, indent: usize) -> Result<()> {
        let template = template.map(expand_template).transpose()?;
        if let Some(template) = &template {
            self.write_comments(template.comments(), indent);
        }

        let name_keyword = object.name_keyword();
        self.write_keyword(&name_keyword, indent, 0);
        self.eol();

        self.write_contents(object, template.as_ref(), indent + self.options.indent_width)?;

        self.pad(indent);
        let end = self.format.format_end(object.kind().end_keyword(), &name_keyword);
        self.out.push_str(&end);
        Ok(())
    }

    /// Write a whole document: the root's comments, keywords, objects and
    /// groups at the left margin, then the terminator line.
    pub fn write_document(&mut self, root: &Object, template: Option<&Object>, terminator: &str) -> Result<()> {
        let template = template.map(expand_template).transpose()?;

        let comments = root.comments();
        self.write_comments(comments, 0);
        if !comments.is_empty() {
            self.eol();
        }

        self.write_contents(root, template.as_ref(), 0)?;

        if !terminator.is_empty() {
            self.out.push_str(terminator);
            self.eol();
        }
        debug!(
            "Wrote {} keywords, {} objects and {} groups",
            root.keyword_count(),
            root.object_count(),
            root.group_count()
        );
        Ok(())
    }

    /// Keywords, then objects, then groups. Each part ends with a line break.
    fn write_contents(&mut self, object: &Object, template: Option<&Object>, indent: usize) -> Result<()> {
        if object.keyword_count() > 0 {
            self.write_keywords(object, template.map(Object::container), indent);
            self.eol();
        }

        let object_count = object.object_count();
        let mut written = 0;
        let template_objects = template.map_or(&[][..], |t| t.objects());
        let ordered = template_objects.iter().flat_map(|guide| {
            object
                .objects()
                .iter()
                .filter(move |child| names_match(child.name(), guide.name()))
                .map(move |child| (child, Some(guide)))
        });
        let rest = object
            .objects()
            .iter()
            .filter(|child| !template.is_some_and(|t| t.has_object(child.name(), FindOptions::None)))
            .map(|child| (child, None));
        for (child, guide) in ordered.chain(rest) {
            if written == 0 && object.keyword_count() > 0 {
                self.eol();
            }
            self.write_object(child, guide, indent)?;
            self.eol();
            written += 1;
            if written < object_count {
                self.eol();
            }
        }

        let group_count = object.group_count();
        let mut written = 0;
        let template_groups = template.map_or(&[][..], |t| t.groups());
        let ordered = template_groups.iter().flat_map(|guide| {
            object
                .groups()
                .iter()
                .filter(move |group| names_match(group.name(), guide.name()))
                .map(move |group| (group, Some(guide)))
        });
        let rest = object
            .groups()
            .iter()
            .filter(|group| !template.is_some_and(|t| t.has_group(group.name(), FindOptions::None)))
            .map(|group| (group, None));
        for (group, guide) in ordered.chain(rest) {
            if written == 0 && (object_count > 0 || object.keyword_count() > 0) {
                self.eol();
            }
            self.write_group(group, guide, indent)?;
            self.eol();
            written += 1;
            if written < group_count {
                self.eol();
            }
        }
        Ok(())
    }
}

/// Read a template include file.
fn load_include(keyword: &Keyword) -> Result<Object> {
    let path = keyword.value(0)?;
    let bytes = std::fs::read(path).map_err(|e| {
        PvlError::io(format!("Could not open the template file [{}]", path)).with_cause(e.into())
    })?;
    let include = pvl_tree::parse(&bytes, "End")
        .map_err(|e| e.context(format!("Could not read the template file [{}]", path)))?;
    debug!("Loaded template include {}", path);
    Ok(include)
}

/// Resolve include keywords in an object template.
///
/// Included content goes first; later keywords, objects and groups whose
/// names are already present are dropped.
pub fn expand_template(template: &Object) -> Result<Object> {
    let mut expanded = Object::new(template.name());
    for comment in template.comments() {
        expanded.add_comment(comment.clone());
    }

    for keyword in template.iter() {
        if !keyword.is_named(TEMPLATE_INCLUDE_KEYWORD) {
            if !expanded.container().has_keyword(keyword.name()) {
                expanded.add_keyword(keyword.clone());
            }
            continue;
        }

        let include = load_include(keyword)?;
        for kw in include.iter() {
            if expanded.container().has_keyword(kw.name()) {
                warn!("Template include repeats keyword {}, keeping the first", kw.name());
            } else {
                expanded.add_keyword(kw.clone());
            }
        }
        for object in include.objects() {
            if expanded.has_object(object.name(), FindOptions::None) {
                warn!("Template include repeats object {}, keeping the first", object.name());
            } else {
                expanded.add_object(object.clone());
            }
        }
        for group in include.groups() {
            if expanded.has_group(group.name(), FindOptions::None) {
                warn!("Template include repeats group {}, keeping the first", group.name());
            } else {
                expanded.add_group(group.clone());
            }
        }
    }

    for object in template.objects() {
        if !expanded.has_object(object.name(), FindOptions::None) {
            expanded.add_object(object.clone());
        }
    }
    for group in template.groups() {
        if !expanded.has_group(group.name(), FindOptions::None) {
            expanded.add_group(group.clone());
        }
    }
    Ok(expanded)
}

/// Resolve include keywords in a group template. Only keywords are merged.
fn expand_group_template(template: &Group) -> Result<Group> {
    let mut expanded = Group::new(template.name());
    for comment in template.comments() {
        expanded.add_comment(comment.clone());
    }
    for keyword in template.iter() {
        if keyword.is_named(TEMPLATE_INCLUDE_KEYWORD) {
            let include = load_include(keyword)?;
            for kw in include.iter() {
                if expanded.has_keyword(kw.name()) {
                    warn!("Template include repeats keyword {}, keeping the first", kw.name());
                } else {
                    expanded.add_keyword(kw.clone());
                }
            }
        } else if !expanded.has_keyword(keyword.name()) {
            expanded.add_keyword(keyword.clone());
        }
    }
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PdsFormat, PvlFormat};

    fn document(root: &Object, template: Option<&Object>) -> String {
        let format = PvlFormat::new();
        let mut writer = PvlWriter::new(&format);
        writer.write_document(root, template, "End").unwrap();
        writer.finish()
    }

    fn sample() -> Object {
        Object::new("Root").with_object(
            Object::new("A")
                .with_keyword(Keyword::new("Keyword1").with_value("5"))
                .with_group(Group::new("B").with_keyword(Keyword::new("Keyword2").with_values(["1", "2", "3"]))),
        )
    }

    #[test]
    fn test_document() {
        assert_eq!(
            document(&sample(), None),
            "Object = A\n  Keyword1 = 5\n\n  Group = B\n    Keyword2 = (1, 2, 3)\n  End_Group\nEnd_Object\nEnd\n"
        );
    }

    #[test]
    fn test_keyword_alignment_and_comments() {
        let mut group = Group::new("Dimensions")
            .with_keyword(Keyword::new("Lines").with_value("100"))
            .with_keyword(Keyword::new("Samples").with_value("200"));
        let mut bands = Keyword::new("Bands").with_value("3");
        bands.add_comment("Spectral bands");
        bands.set_inline_comment(Some("# visible".to_string()));
        group.add_keyword(bands);
        group.add_keyword(Keyword::new("Empty"));

        let format = PvlFormat::new();
        let mut writer = PvlWriter::new(&format);
        writer.write_group(&group, None, 0).unwrap();
        insta::assert_snapshot!(writer.finish(), @r"
        Group = Dimensions
          Lines   = 100
          Samples = 200

          # Spectral bands
          Bands   = 3 # visible
          Empty   = Null
        End_Group
        ");
    }

    #[test]
    fn test_blank_lines_between_siblings() {
        let root = Object::new("Root")
            .with_keyword(Keyword::new("Version").with_value("2"))
            .with_object(Object::new("First"))
            .with_object(Object::new("Second"))
            .with_group(Group::new("G1"))
            .with_group(Group::new("G2"));
        insta::assert_snapshot!(document(&root, None), @r"
        Version = 2

        Object = First
        End_Object

        Object = Second
        End_Object

        Group = G1
        End_Group

        Group = G2
        End_Group
        End
        ");
    }

    #[test]
    fn test_root_comments() {
        let mut root = Object::new("Root").with_keyword(Keyword::new("A").with_value("1"));
        root.add_comment("Header");
        assert_eq!(document(&root, None), "# Header\n\nA = 1\nEnd\n");
    }

    #[test]
    fn test_template_orders_output() {
        let root = Object::new("Root")
            .with_keyword(Keyword::new("Third").with_value("3"))
            .with_keyword(Keyword::new("First").with_value("1"))
            .with_group(Group::new("Extra"))
            .with_group(Group::new("Main").with_keyword(Keyword::new("Z").with_value("z")));

        let mut first = Keyword::new("First");
        first.add_comment("Leading");
        let mut main = Group::new("Main");
        main.add_comment("Main group");
        let template = Object::new("Template").with_keyword(first).with_group(main);

        // a commented keyword is set off by a blank line, even at the top
        assert_eq!(
            document(&root, Some(&template)),
            "\n# Leading\nFirst = 1\nThird = 3\n\n# Main group\nGroup = Main\n  Z = z\nEnd_Group\n\nGroup = Extra\nEnd_Group\nEnd\n"
        );
    }

    #[test]
    fn test_template_include_file() {
        let dir = std::env::temp_dir().join(format!("pvl-format-include-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("include.pvl");
        std::fs::write(&path, "B = x\nGroup = G\nEnd_Group\nEnd\n").unwrap();

        let template = Object::new("Template")
            .with_keyword(Keyword::new(TEMPLATE_INCLUDE_KEYWORD).with_value(path.display().to_string()))
            .with_keyword(Keyword::new("A"))
            .with_keyword(Keyword::new("B"));
        let expanded = expand_template(&template).unwrap();
        let names: Vec<&str> = expanded.iter().map(|k| k.name()).collect();
        assert_eq!(names, ["B", "A"]);
        assert!(expanded.has_group("G", FindOptions::None));

        let root = Object::new("Root")
            .with_keyword(Keyword::new("A").with_value("1"))
            .with_keyword(Keyword::new("B").with_value("2"));
        assert_eq!(document(&root, Some(&template)), "B = 2\nA = 1\nEnd\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_template_include() {
        let template = Object::new("Template")
            .with_keyword(Keyword::new(TEMPLATE_INCLUDE_KEYWORD).with_value("/nonexistent/include.pvl"));
        let format = PvlFormat::new();
        let mut writer = PvlWriter::new(&format);
        let err = writer.write_document(&Object::new("Root"), Some(&template), "End").unwrap_err();
        assert!(err.is_io());
        assert_eq!(err.message, "Could not open the template file [/nonexistent/include.pvl]");
    }

    #[test]
    fn test_pds_document() {
        let format = PdsFormat::new();
        let mut writer = PvlWriter::new(&format);
        writer.write_document(&sample(), None, "END").unwrap();
        assert_eq!(
            writer.finish(),
            "OBJECT = A\r\n  KEYWORD1 = 5\r\n\r\n  GROUP = B\r\n    KEYWORD2 = (1, 2, 3)\r\n  END_GROUP = B\r\nEND_OBJECT = A\r\nEND\r\n"
        );
    }

    #[test]
    fn test_long_values_wrap() {
        let keyword = Keyword::new("Bands").with_values((1..=30).map(|n| n.to_string()));
        let format = PvlFormat::new();
        let mut writer = PvlWriter::with_options(&format, FormatOptions::new().char_limit(40));
        writer.write_keyword(&keyword, 2, 0);
        let out = writer.finish();
        assert!(out.lines().all(|line| line.len() < 40), "{out}");
        assert!(out.starts_with("  Bands = (1, 2, 3,"));
        assert!(out.lines().skip(1).all(|line| line.starts_with("           ")));
    }

    #[test]
    fn test_indent_width_option() {
        let format = PvlFormat::new();
        let mut writer = PvlWriter::with_options(&format, FormatOptions::new().indent_width(4));
        let group = Group::new("G").with_keyword(Keyword::new("K").with_value("v"));
        writer.write_group(&group, None, 0).unwrap();
        assert_eq!(writer.finish(), "Group = G\n    K = v\nEnd_Group");
    }
}
