//! Directive keywords and the closed vocabularies accepted by `WAIT`/`CHECK`.
//!
//! Every keyword is matched case-insensitively and canonicalized to uppercase.
//! Near misses in the `WAIT`/`CHECK` vocabularies get a "did you mean" hint
//! through [`best_effort_match`], a plain substring check in either direction.

use std::fmt;

use serde::Serialize;

use crate::error::ParseErrorKind;

/// When the downstream engine runs a command relative to the page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    /// Runs before the page body is presented.
    #[serde(rename = "PRECOMMAND")]
    PreCommand,
    /// Verifies the expected end state after the page body.
    #[serde(rename = "POSTCHECK")]
    PostCheck,
}

/// Directive keyword selecting a command grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `APPLY <file>`: embed a manifest to apply.
    Apply,
    /// `WAIT <kind> NAME <target> COUNT <operator> <value> [NAMESPACE <ns>]`.
    Wait,
    /// `EXECCOMMAND <shell text>`.
    ExecCommand,
    /// `INCLUDEFILE <file>`: embed a file for display.
    IncludeFile,
    /// `COMMANDWAIT <shell text>`.
    CommandWait,
    /// `CHECK <kind> NAME <target> COUNT <operator> <value> [NAMESPACE <ns>]`.
    Check,
    /// `FILECHECK <path>`.
    FileCheck,
    /// `CHECKCOMMANDOUT <expected output>`.
    CheckCommandOut,
}

impl Method {
    /// Every method, pre-commands first, in the order diagnostics list them.
    pub const ALL: [Method; 8] = [
        Method::Apply,
        Method::Wait,
        Method::ExecCommand,
        Method::IncludeFile,
        Method::CommandWait,
        Method::Check,
        Method::FileCheck,
        Method::CheckCommandOut,
    ];

    /// Matches a directive's first word, ignoring ASCII case.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(word))
    }

    /// Canonical uppercase keyword.
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Apply => "APPLY",
            Method::Wait => "WAIT",
            Method::ExecCommand => "EXECCOMMAND",
            Method::IncludeFile => "INCLUDEFILE",
            Method::CommandWait => "COMMANDWAIT",
            Method::Check => "CHECK",
            Method::FileCheck => "FILECHECK",
            Method::CheckCommandOut => "CHECKCOMMANDOUT",
        }
    }

    /// Role implied by the keyword.
    pub const fn role(self) -> Role {
        match self {
            Method::Apply | Method::Wait | Method::ExecCommand | Method::IncludeFile => {
                Role::PreCommand
            }
            Method::CommandWait | Method::Check | Method::FileCheck | Method::CheckCommandOut => {
                Role::PostCheck
            }
        }
    }

    /// Argument shape shown in arity diagnostics.
    pub const fn usage(self) -> &'static str {
        match self {
            Method::Apply => "APPLY <file>",
            Method::IncludeFile => "INCLUDEFILE <file>",
            Method::Wait => {
                "WAIT <kind> NAME <target> COUNT <operator> <value> [NAMESPACE <namespace>]"
            }
            Method::Check => {
                "CHECK <kind> NAME <target> COUNT <operator> <value> [NAMESPACE <namespace>]"
            }
            Method::ExecCommand => "EXECCOMMAND <command>",
            Method::CommandWait => "COMMANDWAIT <command>",
            Method::FileCheck => "FILECHECK <file>",
            Method::CheckCommandOut => "CHECKCOMMANDOUT <output>",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted directive list, verbatim in `UnknownDirective` messages.
pub const ACCEPTED_DIRECTIVES: &str = "APPLY, WAIT, EXECCOMMAND, INCLUDEFILE, COMMANDWAIT, CHECK, FILECHECK, CHECKCOMMANDOUT, START PAGE, END PAGE";

/// Which closed vocabulary a rejected token was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumField {
    /// Resource kind of a `WAIT`/`CHECK`.
    Kind,
    /// Comparison operator of a `WAIT`/`CHECK`.
    Operator,
}

impl EnumField {
    /// Singular noun used in diagnostics.
    pub const fn label(self) -> &'static str {
        match self {
            EnumField::Kind => "kind",
            EnumField::Operator => "operator",
        }
    }

    /// Accepted values in declaration order.
    pub fn accepted(self) -> Vec<&'static str> {
        match self {
            EnumField::Kind => ResourceKind::ALL.iter().map(|k| k.as_str()).collect(),
            EnumField::Operator => Operator::ALL.iter().map(|o| o.as_str()).collect(),
        }
    }
}

/// A closed, uppercase vocabulary with fuzzy diagnostics.
pub trait Keyword: Copy + 'static {
    /// Accepted values in declaration order; suggestions scan this order.
    const ALL: &'static [Self];
    /// Vocabulary reported in diagnostics.
    const FIELD: EnumField;

    /// Canonical uppercase spelling.
    fn as_str(self) -> &'static str;
}

/// Kubernetes resource kinds a condition can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceKind {
    /// `POD`
    Pod,
    /// `DEPLOYMENT`
    Deployment,
    /// `SERVICE`
    Service,
    /// `SECRET`
    Secret,
    /// `CONFIGMAP`
    ConfigMap,
    /// `REPLICASET`
    ReplicaSet,
}

impl Keyword for ResourceKind {
    const ALL: &'static [Self] = &[
        ResourceKind::Pod,
        ResourceKind::Deployment,
        ResourceKind::Service,
        ResourceKind::Secret,
        ResourceKind::ConfigMap,
        ResourceKind::ReplicaSet,
    ];
    const FIELD: EnumField = EnumField::Kind;

    fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Pod => "POD",
            ResourceKind::Deployment => "DEPLOYMENT",
            ResourceKind::Service => "SERVICE",
            ResourceKind::Secret => "SECRET",
            ResourceKind::ConfigMap => "CONFIGMAP",
            ResourceKind::ReplicaSet => "REPLICASET",
        }
    }
}

/// Comparison applied between the observed count and the expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    /// `EQUALS`
    Equals,
    /// `GREATERTHAN`
    GreaterThan,
    /// `LESSTHAN`
    LessThan,
}

impl Keyword for Operator {
    const ALL: &'static [Self] = &[Operator::Equals, Operator::GreaterThan, Operator::LessThan];
    const FIELD: EnumField = EnumField::Operator;

    fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "EQUALS",
            Operator::GreaterThan => "GREATERTHAN",
            Operator::LessThan => "LESSTHAN",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the options that contain `value` or are contained in it, in option order.
///
/// `PODS` yields `["POD"]`; `BANANA` yields nothing.
pub fn best_effort_match<'a>(value: &str, options: &[&'a str]) -> Vec<&'a str> {
    options
        .iter()
        .copied()
        .filter(|option| option.contains(value) || value.contains(option))
        .collect()
}

/// Canonicalizes `token` into a vocabulary value, suggesting the first near miss on failure.
pub fn parse_keyword<K: Keyword>(token: &str) -> Result<K, ParseErrorKind> {
    let value = token.to_uppercase();
    if let Some(found) = K::ALL.iter().copied().find(|k| k.as_str() == value) {
        return Ok(found);
    }

    let suggestion = best_effort_match(&value, &K::FIELD.accepted())
        .into_iter()
        .next();
    Err(ParseErrorKind::InvalidEnumValue {
        field: K::FIELD,
        value,
        suggestion,
    })
}

/// True for a `START PAGE` directive body, whatever its spacing and case.
pub fn is_start_page(body: &str) -> bool {
    compact_upper(body) == "STARTPAGE"
}

/// True for an `END PAGE` directive body, whatever its spacing and case.
pub fn is_end_page(body: &str) -> bool {
    compact_upper(body) == "ENDPAGE"
}

fn compact_upper(body: &str) -> String {
    body.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}
