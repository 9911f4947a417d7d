//! The whole-document façade.

use std::fmt;
use std::io::{Read, Write};
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use pvl_format::{FormatOptions, Formatter, PvlFormat, PvlWriter};
use pvl_tree::{Object, PvlError, Result};
use tracing::{debug, warn};

/// Name of the root object of every document.
pub const ROOT_NAME: &str = "Root";

/// Statement that ends a document unless another one is set.
pub const DEFAULT_TERMINATOR: &str = "End";

/// A PVL document.
///
/// The document owns a root [`Object`] that is never written as an
/// `Object = ...` block: its comments, keywords, objects and groups sit at the
/// left margin, followed by the terminator. The root is reachable through
/// `Deref`, so every lookup and edit on [`Object`] works on a document.
#[derive(Clone)]
pub struct Pvl {
    root: Object,
    filename: Option<String>,
    terminator: String,
    format_template: Option<Object>,
    formatter: Option<Arc<dyn Formatter + Send + Sync>>,
    options: FormatOptions,
}

impl Default for Pvl {
    fn default() -> Self {
        Self {
            root: Object::new(ROOT_NAME),
            filename: None,
            terminator: DEFAULT_TERMINATOR.to_string(),
            format_template: None,
            formatter: None,
            options: FormatOptions::default(),
        }
    }
}

impl fmt::Debug for Pvl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pvl")
            .field("root", &self.root)
            .field("filename", &self.filename)
            .field("terminator", &self.terminator)
            .field("format_template", &self.format_template)
            .field("formatter", &self.formatter.as_ref().map(|_| ".."))
            .field("options", &self.options)
            .finish()
    }
}

/// Annotate a parse error with the line it points at.
fn with_line(err: PvlError, source: &[u8]) -> PvlError {
    match err.span {
        Some(span) => {
            let line = span.line(source);
            err.context(format!("Error in PVL file on line [{}]", line))
        }
        None => err,
    }
}

/// Record `filename` on every container so lookup errors can name it.
fn stamp_filename(object: &mut Object, filename: &str) {
    object.set_filename(Some(filename.to_string()));
    for group in object.groups_mut() {
        group.set_filename(Some(filename.to_string()));
    }
    for child in object.objects_mut() {
        stamp_filename(child, filename);
    }
}

impl Pvl {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// A document wrapping an existing tree. The tree is renamed to the root name.
    pub fn from_object(mut root: Object) -> Self {
        root.set_name(ROOT_NAME);
        Self {
            root,
            ..Self::default()
        }
    }

    /// Read a document from a file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let mut pvl = Self::new();
        pvl.read_file(path)?;
        Ok(pvl)
    }

    /// Read a file and add its contents to this document.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|e| {
            PvlError::io(format!("Unable to read PVL file [{}]", shown)).with_cause(e.into())
        })?;
        let mut parsed = pvl_tree::parse(&bytes, &self.terminator)
            .map_err(|e| with_line(e, &bytes).context(format!("Unable to read PVL file [{}]", shown)))?;
        stamp_filename(&mut parsed, &shown);
        debug!(
            "Read {} keywords, {} objects and {} groups from {}",
            parsed.keyword_count(),
            parsed.object_count(),
            parsed.group_count(),
            shown
        );
        self.filename = Some(shown);
        self.absorb(parsed);
        Ok(())
    }

    /// Read everything from `reader` and add it to this document.
    pub fn read_from<R: Read>(&mut self, mut reader: R) -> Result<()> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| PvlError::io("Unable to read PVL stream").with_cause(e.into()))?;
        self.read_bytes(&bytes)
    }

    /// Parse label text and add it to this document.
    pub fn read_bytes(&mut self, source: &[u8]) -> Result<()> {
        let parsed = pvl_tree::parse(source, &self.terminator).map_err(|e| with_line(e, source))?;
        self.absorb(parsed);
        Ok(())
    }

    /// Move the contents of a parsed tree to the end of the root.
    fn absorb(&mut self, mut parsed: Object) {
        for comment in parsed.comments() {
            self.root.add_comment(comment.clone());
        }
        self.root.keywords_mut().append(parsed.keywords_mut());
        self.root.groups_mut().append(parsed.groups_mut());
        self.root.objects_mut().append(parsed.objects_mut());
        if let Some(filename) = &self.filename {
            self.root.set_filename(Some(filename.clone()));
        }
    }

    /// Render the document, following the format template if one is set.
    pub fn render(&self) -> Result<String> {
        self.render_with(self.format_template.as_ref())
    }

    fn render_with(&self, template: Option<&Object>) -> Result<String> {
        let default = PvlFormat::new();
        let format: &dyn Formatter = match &self.formatter {
            Some(formatter) => formatter.as_ref(),
            None => &default,
        };
        let mut writer = PvlWriter::with_options(format, self.options.clone());
        writer.write_document(&self.root, template, &self.terminator)?;
        Ok(writer.finish())
    }

    /// Write the document to a file, replacing its contents.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let message = format!("Unable to write PVL to file [{}]", path.display());
        let text = self.render().map_err(|e| e.context(message.clone()))?;
        std::fs::write(path, &text).map_err(|e| PvlError::io(message).with_cause(e.into()))?;
        debug!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(())
    }

    /// Add the rendered document to the end of a file, creating it if needed.
    pub fn append(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let message = format!("Unable to append PVL information to file [{}]", path.display());
        let text = self.render().map_err(|e| e.context(message.clone()))?;
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(text.as_bytes()))
            .map_err(|e| PvlError::io(message).with_cause(e.into()))?;
        debug!("Appended {} bytes to {}", text.len(), path.display());
        Ok(())
    }

    /// Validate `user` with this document as the template.
    ///
    /// Returns a copy of `user` holding only what this template does not
    /// cover. See [`pvl_schema::Validator`].
    pub fn validate_pvl(&self, user: &Pvl) -> Result<Pvl> {
        let root = pvl_schema::validate_pvl(&self.root, &user.root)?;
        Ok(Pvl { root, ..user.clone() })
    }

    pub fn root(&self) -> &Object {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Object {
        &mut self.root
    }

    pub fn into_root(self) -> Object {
        self.root
    }

    /// The file this document was last read from.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// Set the statement that ends the document when reading and writing.
    ///
    /// An empty terminator writes no end statement.
    pub fn set_terminator(&mut self, terminator: impl Into<String>) {
        self.terminator = terminator.into();
    }

    pub fn format_template(&self) -> Option<&Object> {
        self.format_template.as_ref()
    }

    pub fn set_format_template(&mut self, template: Option<Object>) {
        self.format_template = template;
    }

    pub fn formatter(&self) -> Option<&(dyn Formatter + Send + Sync)> {
        self.formatter.as_deref()
    }

    /// Render with `formatter` instead of the default [`PvlFormat`].
    pub fn set_formatter(&mut self, formatter: Option<Arc<dyn Formatter + Send + Sync>>) {
        self.formatter = formatter;
    }

    pub fn format_options(&self) -> &FormatOptions {
        &self.options
    }

    pub fn set_format_options(&mut self, options: FormatOptions) {
        self.options = options;
    }
}

impl Deref for Pvl {
    type Target = Object;

    fn deref(&self) -> &Object {
        &self.root
    }
}

impl DerefMut for Pvl {
    fn deref_mut(&mut self) -> &mut Object {
        &mut self.root
    }
}

impl FromStr for Pvl {
    type Err = PvlError;

    fn from_str(s: &str) -> Result<Self> {
        let mut pvl = Pvl::new();
        pvl.read_bytes(s.as_bytes())?;
        Ok(pvl)
    }
}

/// Renders the document. A format template that cannot be expanded is
/// skipped with a warning; use [`Pvl::render`] to see the error.
impl fmt::Display for Pvl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self.render() {
            Ok(text) => text,
            Err(err) => {
                warn!("Ignoring format template: {}", err);
                self.render_with(None).map_err(|_| fmt::Error)?
            }
        };
        f.write_str(&text)
    }
}
