//! Turns one directive line into a typed [`Directive`].
//!
//! A directive line starts with [`DIRECTIVE_MARKER`]. The first word selects
//! the grammar; the remaining words are interpreted positionally. Tokenizing
//! is pure apart from reading the files named by `APPLY`/`INCLUDEFILE`.

use std::path::Path;

use crate::command::{Condition, Directive, FileContent, PostCheck, PreCommand};
use crate::error::ParseErrorKind;
use crate::grammar::{Method, is_end_page, is_start_page, parse_keyword};
use crate::source::{FileSource, LocalFiles};

/// Two-character prefix marking a directive line.
pub const DIRECTIVE_MARKER: &str = "->";

/// Tokenizes directive lines, resolving file references against a base path.
pub struct Tokenizer<'a> {
    base_path: &'a Path,
    files: &'a dyn FileSource,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer reading referenced files through `files`.
    pub fn new(base_path: &'a Path, files: &'a dyn FileSource) -> Self {
        Self { base_path, files }
    }

    /// Tokenize a full raw line, marker included.
    pub fn tokenize(&self, line: &str) -> Result<Directive, ParseErrorKind> {
        let body = line.strip_prefix(DIRECTIVE_MARKER).unwrap_or(line).trim();

        if is_start_page(body) {
            return Ok(Directive::StartPage);
        }
        if is_end_page(body) {
            return Ok(Directive::EndPage);
        }

        let words: Vec<&str> = body.split_whitespace().collect();
        let Some((keyword, args)) = words.split_first() else {
            return Err(unknown(body));
        };
        let method = Method::from_keyword(keyword).ok_or_else(|| unknown(body))?;

        let directive = match method {
            Method::Apply => Directive::Pre(PreCommand::Apply(self.file_content(method, args)?)),
            Method::IncludeFile => {
                Directive::Pre(PreCommand::IncludeFile(self.file_content(method, args)?))
            }
            Method::Wait => Directive::Pre(PreCommand::Wait(condition(method, args)?)),
            Method::Check => Directive::Post(PostCheck::Check(condition(method, args)?)),
            Method::ExecCommand => {
                Directive::Pre(PreCommand::ExecCommand(command_text(method, args)?))
            }
            Method::CommandWait => {
                Directive::Post(PostCheck::CommandWait(command_text(method, args)?))
            }
            Method::FileCheck => Directive::Post(PostCheck::FileCheck(target_text(method, args)?)),
            Method::CheckCommandOut => {
                Directive::Post(PostCheck::CheckCommandOut(target_text(method, args)?))
            }
        };

        log::trace!("tokenized {} directive", method);
        Ok(directive)
    }

    fn file_content(&self, method: Method, args: &[&str]) -> Result<FileContent, ParseErrorKind> {
        let name = match args {
            [] => return Err(ParseErrorKind::MissingArgument { method }),
            [name] => *name,
            [_, rest @ ..] => {
                return Err(ParseErrorKind::TrailingTokens {
                    method,
                    tokens: rest.join(" "),
                });
            }
        };

        let path = self.base_path.join(name);
        let value = self
            .files
            .read_to_string(&path)
            .map_err(|source| ParseErrorKind::AssetRead { path, source })?;

        Ok(FileContent {
            name: name.to_string(),
            value,
        })
    }
}

/// Tokenize `line`, reading referenced files from the local filesystem.
pub fn tokenize(line: &str, base_path: &Path) -> Result<Directive, ParseErrorKind> {
    Tokenizer::new(base_path, &LocalFiles).tokenize(line)
}

fn unknown(body: &str) -> ParseErrorKind {
    ParseErrorKind::UnknownDirective {
        directive: body.to_string(),
    }
}

/// `<kind> NAME <target> COUNT <operator> <value> [NAMESPACE <namespace>]`
///
/// The second and fourth words are connectives and are not checked.
fn condition(method: Method, args: &[&str]) -> Result<Condition, ParseErrorKind> {
    let (args, namespace) = match args {
        [head @ .., keyword, namespace]
            if head.len() == 6 && keyword.eq_ignore_ascii_case("NAMESPACE") =>
        {
            (head, Some(namespace.to_string()))
        }
        _ => (args, None),
    };

    match args {
        [kind, _, target, _, operator, value] => Ok(Condition {
            kind: parse_keyword(kind)?,
            target: target.to_string(),
            operator: parse_keyword(operator)?,
            value: value.parse().map_err(|_| ParseErrorKind::InvalidNumber {
                token: value.to_string(),
            })?,
            namespace,
        }),
        [_, _, _, _, _, _, keyword] if keyword.eq_ignore_ascii_case("NAMESPACE") => {
            Err(ParseErrorKind::MissingArgument { method })
        }
        [_, _, _, _, _, _, rest @ ..] => Err(ParseErrorKind::TrailingTokens {
            method,
            tokens: rest.join(" "),
        }),
        _ => Err(ParseErrorKind::MissingArgument { method }),
    }
}

fn command_text(method: Method, args: &[&str]) -> Result<String, ParseErrorKind> {
    match args.join(" ") {
        text if text.is_empty() => Err(ParseErrorKind::EmptyCommand { method }),
        text => Ok(text),
    }
}

fn target_text(method: Method, args: &[&str]) -> Result<String, ParseErrorKind> {
    match args.join(" ") {
        text if text.is_empty() => Err(ParseErrorKind::EmptyTarget { method }),
        text => Ok(text),
    }
}
