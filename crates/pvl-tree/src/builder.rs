//! Tree builder from PVL tokens.

use pvl_tokenizer::{Span, Token, TokenKind};
use tracing::{debug, trace};

use crate::{Container, Group, Keyword, Object, PvlError, Result};

/// Builder that assembles a tree of objects and groups from a token stream.
///
/// Comments on their own lines become leading comments of the next statement.
pub struct TreeBuilder {
    root: Object,
    stack: Vec<BuilderFrame>,
    pending_comments: Vec<String>,
    finished: bool,
}

enum BuilderFrame {
    Object { object: Object, span: Span },
    Group { group: Group, span: Span },
}

impl BuilderFrame {
    fn describe(&self) -> String {
        match self {
            BuilderFrame::Object { object, .. } => format!("PVL Object [{}]", object.name()),
            BuilderFrame::Group { group, .. } => format!("PVL Group [{}]", group.name()),
        }
    }
}

impl TreeBuilder {
    /// Create a builder whose root object is called `root_name`.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root: Object::new(root_name),
            stack: Vec::new(),
            pending_comments: Vec::new(),
            finished: false,
        }
    }

    /// Whether the terminator has been seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed one token. Tokens after the terminator are ignored.
    pub fn token(&mut self, token: Token) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        match token.kind {
            TokenKind::Comment => {
                if let Some(text) = token.values.into_iter().next() {
                    self.pending_comments.push(text.text);
                }
            }
            TokenKind::Keyword => {
                let keyword = self.keyword_from(token);
                match self.stack.last_mut() {
                    Some(BuilderFrame::Object { object, .. }) => object.add_keyword(keyword),
                    Some(BuilderFrame::Group { group, .. }) => group.add_keyword(keyword),
                    None => self.root.add_keyword(keyword),
                }
            }
            TokenKind::Object => {
                if let Some(frame) = self.stack.last()
                    && matches!(frame, BuilderFrame::Group { .. })
                {
                    return Err(unexpected(&token, &frame.describe()));
                }
                let name = container_name(&token, "object")?;
                trace!("Open object {:?}", name);
                let mut object = Object::new(name);
                self.attach_comments(object.container_mut(), &token);
                self.stack.push(BuilderFrame::Object {
                    object,
                    span: token.span,
                });
            }
            TokenKind::Group => {
                if let Some(frame) = self.stack.last()
                    && matches!(frame, BuilderFrame::Group { .. })
                {
                    return Err(unexpected(&token, &frame.describe()));
                }
                let name = container_name(&token, "group")?;
                trace!("Open group {:?}", name);
                let mut group = Group::new(name);
                self.attach_comments(group.container_mut(), &token);
                self.stack.push(BuilderFrame::Group {
                    group,
                    span: token.span,
                });
            }
            TokenKind::EndObject => match self.stack.pop() {
                Some(BuilderFrame::Object { object, .. }) => {
                    trace!("Close object {:?}", object.name());
                    self.drop_dangling_comments(object.name());
                    self.parent().add_object(object);
                }
                Some(frame) => {
                    let context = frame.describe();
                    self.stack.push(frame);
                    return Err(unexpected(&token, &context));
                }
                None => return Err(unexpected(&token, "PVL Object [ROOT]")),
            },
            TokenKind::EndGroup => match self.stack.pop() {
                Some(BuilderFrame::Group { group, .. }) => {
                    trace!("Close group {:?}", group.name());
                    self.drop_dangling_comments(group.name());
                    self.parent().add_group(group);
                }
                Some(frame) => {
                    let context = frame.describe();
                    self.stack.push(frame);
                    return Err(unexpected(&token, &context));
                }
                None => return Err(unexpected(&token, "PVL Object [ROOT]")),
            },
            TokenKind::End => {
                trace!("Terminator {:?}", token.key);
                self.finished = true;
            }
        }
        Ok(())
    }

    /// Finish building and return the root object.
    pub fn finish(mut self) -> Result<Object> {
        if let Some(frame) = self.stack.pop() {
            let (message, span) = match frame {
                BuilderFrame::Object { object, span } => (
                    format!(
                        "PVL Object [{}] EndObject not found before end of file",
                        object.name()
                    ),
                    span,
                ),
                BuilderFrame::Group { group, span } => (
                    format!(
                        "PVL Group [{}] EndGroup not found before end of file",
                        group.name()
                    ),
                    span,
                ),
            };
            return Err(PvlError::parse(message)
                .with_span(span)
                .with_help("close every Object and Group before the end of the label"));
        }
        let root_name = self.root.name().to_string();
        self.drop_dangling_comments(&root_name);
        Ok(self.root)
    }

    fn keyword_from(&mut self, token: Token) -> Keyword {
        let mut keyword = Keyword::new(token.key);
        keyword.add_comments(self.pending_comments.drain(..));
        for value in token.values {
            keyword.push(value.text, value.unit);
        }
        keyword.set_inline_comment(token.inline_comment);
        keyword
    }

    /// Give pending comments, and the opening line's inline comment, to a new container.
    fn attach_comments(&mut self, container: &mut Container, token: &Token) {
        for comment in self.pending_comments.drain(..) {
            container.add_comment(comment);
        }
        if let Some(inline) = &token.inline_comment {
            container.add_comment(inline.clone());
        }
    }

    fn drop_dangling_comments(&mut self, container: &str) {
        if !self.pending_comments.is_empty() {
            debug!(
                "Dropping {} comment(s) at the end of {:?}",
                self.pending_comments.len(),
                container
            );
            self.pending_comments.clear();
        }
    }

    /// The object that receives a just-closed child.
    ///
    /// Groups never sit below another group on the stack, so the parent is
    /// always an object.
    fn parent(&mut self) -> &mut Object {
        match self.stack.last_mut() {
            Some(BuilderFrame::Object { object, .. }) => object,
            Some(BuilderFrame::Group { .. }) | None => &mut self.root,
        }
    }
}

fn container_name(token: &Token, what: &str) -> Result<String> {
    match token.values.as_slice() {
        [value] => Ok(value.text.clone()),
        values => {
            let listed: Vec<&str> = values.iter().map(|v| v.text.as_str()).collect();
            Err(PvlError::parse(format!(
                "Expected a single value for PVL {} name, found [({})]",
                what,
                listed.join(", ")
            ))
            .with_span(token.span)
            .with_help(format!("write `{} = NAME`", token.key)))
        }
    }
}

fn unexpected(token: &Token, context: &str) -> PvlError {
    PvlError::parse(format!("Unexpected [{}] in {}", token.key, context))
        .with_span(token.span)
        .with_help("check that every End_Object and End_Group closes the matching statement")
}

/// Build a tree from label bytes, reading up to `terminator`.
pub fn parse(source: &[u8], terminator: &str) -> Result<Object> {
    let tokens = pvl_tokenizer::tokenize(source, terminator)?;
    debug!("Read {} PVL tokens", tokens.len());
    let mut builder = TreeBuilder::new("Root");
    for token in tokens {
        builder.token(token)?;
    }
    builder.finish()
}
