use std::path::PathBuf;

use thiserror::Error;

use crate::grammar::{ACCEPTED_DIRECTIVES, EnumField, Method};
use crate::render::RenderError;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional document name
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize) -> Self {
        Self { file: None, line }
    }

    /// Create a source location with file information
    pub fn with_file(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: Some(file.into()),
            line,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}", file, self.line)
        } else {
            write!(f, "line {}", self.line)
        }
    }
}

/// What went wrong on a single line.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    /// The directive keyword is not part of the grammar.
    #[error(
        "Could not match `{directive}` to a command, accepted commands are {}",
        ACCEPTED_DIRECTIVES
    )]
    UnknownDirective {
        /// Directive body after the marker
        directive: String,
    },
    /// A kind or operator outside its vocabulary.
    #[error("{}", invalid_value_message(.field, .value, .suggestion))]
    InvalidEnumValue {
        /// Vocabulary the token was checked against
        field: EnumField,
        /// Rejected token, uppercased
        value: String,
        /// Closest accepted value, when one was found
        suggestion: Option<&'static str>,
    },
    /// The expected count is not a base-10 integer.
    #[error("Could not parse {token} into a number")]
    InvalidNumber {
        /// Offending token
        token: String,
    },
    /// `EXECCOMMAND`/`COMMANDWAIT` without a command.
    #[error("No command to execute specified for {method}")]
    EmptyCommand {
        /// Directive keyword
        method: Method,
    },
    /// `FILECHECK`/`CHECKCOMMANDOUT` without a target.
    #[error("No target specified for {method}")]
    EmptyTarget {
        /// Directive keyword
        method: Method,
    },
    /// Fewer positional arguments than the grammar requires.
    #[error("Not enough arguments for {method}, expected `{}`", .method.usage())]
    MissingArgument {
        /// Directive keyword
        method: Method,
    },
    /// Arguments left over after the grammar was satisfied.
    #[error("Unexpected `{tokens}` after {method}, expected `{}`", .method.usage())]
    TrailingTokens {
        /// Directive keyword
        method: Method,
        /// Leftover tokens joined by single spaces
        tokens: String,
    },
    /// A referenced file could not be read or the reference was malformed.
    #[error("Could not read file {}: {source}", .path.display())]
    AssetRead {
        /// Resolved path, or the raw reference when it is malformed
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
    /// Prose after the page already has a post-check.
    #[error("Can't enter Markdown content after a post-check, did you mean to start a new page?")]
    TextAfterPostCheck,
    /// A page closed with no pre-commands, text, or post-checks.
    #[error("Page closed but no pre-commands, post-checks, or text was provided")]
    EmptyChunkOnClose,
    /// A pre-command or post-check with no open page to hold it.
    #[error("{method} appears outside of a page, did you forget START PAGE?")]
    CommandOutsidePage {
        /// Directive keyword
        method: Method,
    },
    /// `END PAGE` while no page is open.
    #[error("END PAGE without a matching START PAGE")]
    UnexpectedEndPage,
    /// Input ended inside a page and unterminated pages are disallowed.
    #[error("Page opened here was never closed with END PAGE")]
    UnterminatedPage,
    /// The markdown renderer rejected a line.
    #[error(transparent)]
    Render(#[from] RenderError),
}

fn invalid_value_message(
    field: &EnumField,
    value: &str,
    suggestion: &Option<&'static str>,
) -> String {
    match suggestion {
        Some(candidate) => format!(
            "Provided {} {} does not match the accepted {}s, did you mean {}?",
            field.label(),
            value,
            field.label(),
            candidate
        ),
        None => format!(
            "Provided {} {} does not match the accepted {}s {}",
            field.label(),
            value,
            field.label(),
            field.accepted().join(", ")
        ),
    }
}

/// Fatal parse failure, annotated with the offending line.
#[derive(Debug, Error)]
#[error("Error at {location}\nLine was: {line_text}\nError was: {kind}")]
pub struct ParseError {
    /// Where the failure happened
    pub location: SourceLocation,
    /// Raw text of the offending line
    pub line_text: String,
    /// The failure itself
    #[source]
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Wrap a line-level failure with its location.
    pub fn new(
        location: SourceLocation,
        line_text: impl Into<String>,
        kind: ParseErrorKind,
    ) -> Self {
        Self {
            location,
            line_text: line_text.into(),
            kind,
        }
    }

    /// The underlying failure.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// 1-based line number of the failure.
    pub fn line(&self) -> usize {
        self.location.line
    }
}

/// Non-fatal findings that don't prevent assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Prose outside any page was dropped
    ContentOutsidePage {
        /// Location of the dropped line
        location: SourceLocation,
    },
    /// `START PAGE` while a page was open; the open page was closed first
    NestedStartPage {
        /// Location of the second `START PAGE`
        location: SourceLocation,
        /// Line that opened the page being closed
        opened_at: usize,
    },
    /// Input ended inside a page; the page was closed implicitly
    UnterminatedPage {
        /// Location of the `START PAGE` that was never closed
        location: SourceLocation,
    },
    /// Code fence still open when its page closed
    UnclosedCodeFence {
        /// Location of the fence opener
        location: SourceLocation,
        /// Fence marker character (backtick or tilde)
        marker: char,
    },
}

impl ParseWarning {
    /// Get the location of this warning
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseWarning::ContentOutsidePage { location }
            | ParseWarning::NestedStartPage { location, .. }
            | ParseWarning::UnterminatedPage { location }
            | ParseWarning::UnclosedCodeFence { location, .. } => location,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::ContentOutsidePage { location } => {
                write!(f, "{}: content outside of a page is ignored", location)
            }
            ParseWarning::NestedStartPage {
                location,
                opened_at,
            } => write!(
                f,
                "{}: START PAGE while the page opened on line {} is still open, closing it",
                location, opened_at
            ),
            ParseWarning::UnterminatedPage { location } => {
                write!(f, "{}: page is never closed with END PAGE", location)
            }
            ParseWarning::UnclosedCodeFence { location, marker } => {
                write!(f, "{}: code fence opened with {} is never closed", location, marker)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display() {
        assert_eq!(SourceLocation::new(4).to_string(), "line 4");
        assert_eq!(SourceLocation::with_file("intro.md", 4).to_string(), "intro.md:4");
    }

    #[test]
    fn kind_suggestion_wording() {
        let err = ParseErrorKind::InvalidEnumValue {
            field: EnumField::Kind,
            value: "PODS".into(),
            suggestion: Some("POD"),
        };
        insta::assert_snapshot!(err.to_string(), @"Provided kind PODS does not match the accepted kinds, did you mean POD?");
    }

    #[test]
    fn kind_listing_wording() {
        let err = ParseErrorKind::InvalidEnumValue {
            field: EnumField::Kind,
            value: "BANANA".into(),
            suggestion: None,
        };
        insta::assert_snapshot!(err.to_string(), @"Provided kind BANANA does not match the accepted kinds POD, DEPLOYMENT, SERVICE, SECRET, CONFIGMAP, REPLICASET");
    }

    #[test]
    fn operator_listing_wording() {
        let err = ParseErrorKind::InvalidEnumValue {
            field: EnumField::Operator,
            value: "ATLEAST".into(),
            suggestion: None,
        };
        insta::assert_snapshot!(err.to_string(), @"Provided operator ATLEAST does not match the accepted operators EQUALS, GREATERTHAN, LESSTHAN");
    }

    #[test]
    fn parse_error_carries_line_context() {
        let err = ParseError::new(
            SourceLocation::with_file("intro.md", 7),
            "-> FLY away",
            ParseErrorKind::UnknownDirective {
                directive: "FLY away".into(),
            },
        );
        assert_eq!(err.line(), 7);
        let message = err.to_string();
        assert!(message.starts_with("Error at intro.md:7\nLine was: -> FLY away\n"));
        assert!(message.ends_with("START PAGE, END PAGE"));
    }

    #[test]
    fn warnings_lead_with_location() {
        let warning = ParseWarning::UnclosedCodeFence {
            location: SourceLocation::with_file("intro.md", 2),
            marker: '`',
        };
        insta::assert_snapshot!(warning.to_string(), @"intro.md:2: code fence opened with ` is never closed");

        let warning = ParseWarning::UnterminatedPage {
            location: SourceLocation::new(1),
        };
        insta::assert_snapshot!(warning.to_string(), @"line 1: page is never closed with END PAGE");
    }

    #[test]
    fn asset_error_exposes_io_source() {
        use std::error::Error as _;

        let err = ParseErrorKind::AssetRead {
            path: PathBuf::from("docs/tux.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("docs/tux.png"));
        assert!(err.source().is_some());
    }
}
