//! Page assembly: folds document lines into ordered chunks.
//!
//! Each line is classified in order. Directive lines go to the tokenizer,
//! image references to the asset resolver, and everything else is rendered
//! and appended to the open page. The first failure aborts the whole parse.

use std::path::{Path, PathBuf};

use crate::asset::{is_image_reference, resolve_asset};
use crate::chunk::{Chunk, ChunkBuilder, Document};
use crate::command::Directive;
use crate::error::{ParseError, ParseErrorKind, ParseWarning, SourceLocation};
use crate::fence::{FenceEvent, FenceTracker};
use crate::render::{MarkdownRenderer, Render, RenderOptions};
use crate::source::{FileSource, LocalFiles};
use crate::tokenizer::{DIRECTIVE_MARKER, Tokenizer};

/// Parser configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParserOptions {
    /// Options for the default markdown renderer.
    pub render: RenderOptions,
    /// Close a page left open at end of input instead of failing.
    pub allow_unterminated_page: bool,
    /// Render fenced code blocks as one unit instead of line by line.
    pub group_code_fences: bool,
    /// Document name shown in diagnostics.
    pub file_name: Option<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            allow_unterminated_page: true,
            group_code_fences: false,
            file_name: None,
        }
    }
}

/// Result of a successful parse.
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    /// Assembled chunks in source order.
    pub document: Document,
    /// Non-fatal findings, in the order they were found.
    pub warnings: Vec<ParseWarning>,
}

/// Compiles tutorial markdown into a [`Document`].
pub struct Parser {
    base_path: PathBuf,
    options: ParserOptions,
    renderer: Option<Box<dyn Render>>,
    files: Box<dyn FileSource>,
}

impl Parser {
    /// Create a parser resolving file references against `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            options: ParserOptions::default(),
            renderer: None,
            files: Box::new(LocalFiles),
        }
    }

    /// Replace the parser options.
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Render prose with `renderer` instead of the markdown-rs default.
    pub fn with_renderer<R: Render + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Read referenced files through `files` instead of the local filesystem.
    pub fn with_file_source<F: FileSource + 'static>(mut self, files: F) -> Self {
        self.files = Box::new(files);
        self
    }

    /// Directory file references are resolved against.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Active options.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse a whole document.
    pub fn parse(&self, content: &str) -> Result<ParseOutput, ParseError> {
        let default_renderer;
        let renderer: &dyn Render = match &self.renderer {
            Some(renderer) => renderer.as_ref(),
            None => {
                default_renderer = MarkdownRenderer::new(self.options.render);
                &default_renderer
            }
        };

        let mut assembly = Assembly {
            tokenizer: Tokenizer::new(&self.base_path, self.files.as_ref()),
            renderer,
            files: self.files.as_ref(),
            base_path: &self.base_path,
            options: &self.options,
            state: PageState::Idle,
            chunks: Vec::new(),
            warnings: Vec::new(),
        };

        let lines: Vec<&str> = content.lines().collect();
        for (index, line) in lines.iter().enumerate() {
            let number = index + 1;
            assembly
                .feed(number, line)
                .map_err(|kind| self.error_at(number, line, kind))?;
        }

        assembly.finish().map_err(|(number, kind)| {
            let line = lines.get(number - 1).copied().unwrap_or_default();
            self.error_at(number, line, kind)
        })
    }

    fn error_at(&self, number: usize, line: &str, kind: ParseErrorKind) -> ParseError {
        ParseError::new(location(&self.options, number), line, kind)
    }
}

/// Parse `content` with default options, resolving files against `base_path`.
pub fn parse_document(content: &str, base_path: impl AsRef<Path>) -> Result<Document, ParseError> {
    Parser::new(base_path.as_ref())
        .parse(content)
        .map(|output| output.document)
}

fn location(options: &ParserOptions, line: usize) -> SourceLocation {
    match &options.file_name {
        Some(file) => SourceLocation::with_file(file.clone(), line),
        None => SourceLocation::new(line),
    }
}

enum PageState {
    Idle,
    InPage(OpenPage),
}

struct OpenPage {
    builder: ChunkBuilder,
    fences: FenceTracker,
    pending_fence: Option<PendingFence>,
}

/// Lines of a fenced block waiting for its closer.
struct PendingFence {
    opened_at: usize,
    marker: char,
    source: String,
}

impl PendingFence {
    fn push_line(&mut self, line: &str) {
        self.source.push('\n');
        self.source.push_str(line);
    }
}

struct Assembly<'p> {
    tokenizer: Tokenizer<'p>,
    renderer: &'p dyn Render,
    files: &'p dyn FileSource,
    base_path: &'p Path,
    options: &'p ParserOptions,
    state: PageState,
    chunks: Vec<Chunk>,
    warnings: Vec<ParseWarning>,
}

impl Assembly<'_> {
    fn feed(&mut self, number: usize, line: &str) -> Result<(), ParseErrorKind> {
        if let PageState::InPage(page) = &mut self.state
            && let Some(pending) = &mut page.pending_fence
        {
            if !line.starts_with(DIRECTIVE_MARKER) {
                pending.push_line(line);
                if page.fences.observe(line) == FenceEvent::Closed {
                    let block = page.pending_fence.take().map(|p| p.source).unwrap_or_default();
                    let html = self.renderer.render(&block)?;
                    page.builder.push_text(&html)?;
                }
                return Ok(());
            }
            self.flush_fence()?;
        }

        if line.starts_with(DIRECTIVE_MARKER) {
            let directive = self.tokenizer.tokenize(line)?;
            return self.apply(number, directive);
        }

        let page = match &mut self.state {
            PageState::InPage(page) => page,
            PageState::Idle => {
                self.skip_outside(number, line);
                return Ok(());
            }
        };

        if !page.builder.accepts_text() {
            return Err(ParseErrorKind::TextAfterPostCheck);
        }
        if line.trim().is_empty() {
            return Ok(());
        }

        if self.options.group_code_fences && page.fences.observe(line) == FenceEvent::Opened {
            page.pending_fence = Some(PendingFence {
                opened_at: number,
                marker: page.fences.open_marker().unwrap_or('`'),
                source: line.to_string(),
            });
            return Ok(());
        }

        if is_image_reference(line) {
            let asset = resolve_asset(line, self.base_path, self.files)?;
            page.builder.push_asset(asset);
        }

        log::trace!("line {} rendered as prose", number);
        let html = self.renderer.render(line)?;
        page.builder.push_text(&html)
    }

    fn apply(&mut self, number: usize, directive: Directive) -> Result<(), ParseErrorKind> {
        match directive {
            Directive::StartPage => {
                if let PageState::InPage(page) = &self.state {
                    let warning = ParseWarning::NestedStartPage {
                        location: location(self.options, number),
                        opened_at: page.builder.opened_at(),
                    };
                    self.warn(warning);
                    self.close_page()?;
                }
                log::debug!("page opened on line {}", number);
                self.state = PageState::InPage(OpenPage {
                    builder: ChunkBuilder::new(number),
                    fences: FenceTracker::new(),
                    pending_fence: None,
                });
                Ok(())
            }
            Directive::EndPage => match self.state {
                PageState::Idle => Err(ParseErrorKind::UnexpectedEndPage),
                PageState::InPage(_) => self.close_page(),
            },
            Directive::Pre(command) => match &mut self.state {
                PageState::InPage(page) => {
                    page.builder.push_pre_command(command);
                    Ok(())
                }
                PageState::Idle => Err(ParseErrorKind::CommandOutsidePage {
                    method: command.method(),
                }),
            },
            Directive::Post(check) => match &mut self.state {
                PageState::InPage(page) => {
                    page.builder.push_post_check(check);
                    Ok(())
                }
                PageState::Idle => Err(ParseErrorKind::CommandOutsidePage {
                    method: check.method(),
                }),
            },
        }
    }

    /// Render a fence that never saw its closer as it stands.
    fn flush_fence(&mut self) -> Result<(), ParseErrorKind> {
        let PageState::InPage(page) = &mut self.state else {
            return Ok(());
        };
        let Some(pending) = page.pending_fence.take() else {
            return Ok(());
        };
        page.fences = FenceTracker::new();
        let html = self.renderer.render(&pending.source)?;
        page.builder.push_text(&html)?;

        self.warn(ParseWarning::UnclosedCodeFence {
            location: location(self.options, pending.opened_at),
            marker: pending.marker,
        });
        Ok(())
    }

    fn close_page(&mut self) -> Result<(), ParseErrorKind> {
        self.flush_fence()?;
        let PageState::InPage(page) = std::mem::replace(&mut self.state, PageState::Idle) else {
            return Ok(());
        };

        let chunk = page.builder.finish()?;
        log::debug!(
            "page closed with {} pre-commands, {} post-checks",
            chunk.pre_commands.len(),
            chunk.post_checks.len()
        );
        self.chunks.push(chunk);
        Ok(())
    }

    fn skip_outside(&mut self, number: usize, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        log::debug!("line {} is outside any page, skipping", number);
        self.warn(ParseWarning::ContentOutsidePage {
            location: location(self.options, number),
        });
    }

    fn warn(&mut self, warning: ParseWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn finish(mut self) -> Result<ParseOutput, (usize, ParseErrorKind)> {
        if let PageState::InPage(page) = &self.state {
            let opened_at = page.builder.opened_at();
            if !self.options.allow_unterminated_page {
                return Err((opened_at, ParseErrorKind::UnterminatedPage));
            }
            self.warn(ParseWarning::UnterminatedPage {
                location: location(self.options, opened_at),
            });
            self.close_page().map_err(|kind| (opened_at, kind))?;
        }

        Ok(ParseOutput {
            document: Document {
                chunks: self.chunks,
            },
            warnings: self.warnings,
        })
    }
}
