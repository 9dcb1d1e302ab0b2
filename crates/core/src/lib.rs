#![deny(missing_docs)]
//! Chiron core: compiles tutorial markdown with directive lines into page IR.
//!
//! ```text
//! -> START PAGE
//! -> APPLY deployment.yaml
//! ## Deployments
//! Three replicas should come up.
//! -> CHECK pod NAME web COUNT EQUALS 3
//! -> END PAGE
//! ```

/// Markdown image embedding.
pub mod asset;
/// Page assembly state machine and parser entry points.
pub mod assembler;
/// Chunk and document types.
pub mod chunk;
/// Typed directives.
pub mod command;
/// Error and diagnostic types.
pub mod error;
/// Fenced code block tracking.
pub mod fence;
/// Directive keywords and vocabularies.
pub mod grammar;
/// Markdown rendering collaborator.
pub mod render;
/// Heading anchor generation.
pub mod slug;
/// Filesystem collaborator.
pub mod source;
/// Directive line tokenizer.
pub mod tokenizer;

pub use assembler::{ParseOutput, Parser, ParserOptions, parse_document};
pub use asset::{Asset, image_file_name, is_image_reference, resolve_asset};
pub use chunk::{Chunk, ChunkBuilder, Document};
pub use command::{Condition, Directive, FileContent, PostCheck, PreCommand};
pub use error::{ParseError, ParseErrorKind, ParseWarning, SourceLocation};
pub use fence::{FenceEvent, FenceTracker};
pub use grammar::{
    EnumField, Keyword, Method, Operator, ResourceKind, Role, best_effort_match, parse_keyword,
};
pub use render::{MarkdownRenderer, Render, RenderError, RenderOptions};
pub use slug::heading_slug;
pub use source::{FileSource, LocalFiles};
pub use tokenizer::{DIRECTIVE_MARKER, Tokenizer, tokenize};
