//! Typed directives as they appear in the page IR.
//!
//! Commands serialize into the flat object shape the runner consumes:
//! a `type` role tag, the `method` keyword, then the method's own fields.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::grammar::{Method, Operator, ResourceKind, Role};

/// One tokenized directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `START PAGE`: opens a chunk.
    StartPage,
    /// `END PAGE`: closes the open chunk.
    EndPage,
    /// Command that runs before the page body.
    Pre(PreCommand),
    /// Check that runs after the page body.
    Post(PostCheck),
}

impl Directive {
    /// Role of the command, `None` for the page markers.
    pub fn role(&self) -> Option<Role> {
        match self {
            Directive::StartPage | Directive::EndPage => None,
            Directive::Pre(_) => Some(Role::PreCommand),
            Directive::Post(_) => Some(Role::PostCheck),
        }
    }

    /// Keyword of the command, `None` for the page markers.
    pub fn method(&self) -> Option<Method> {
        match self {
            Directive::StartPage | Directive::EndPage => None,
            Directive::Pre(command) => Some(command.method()),
            Directive::Post(check) => Some(check.method()),
        }
    }
}

/// A file embedded verbatim into the IR.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileContent {
    /// File name as written in the directive.
    pub name: String,
    /// UTF-8 contents of the file.
    pub value: String,
}

/// A resource count condition shared by `WAIT` and `CHECK`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Resource kind to count.
    pub kind: ResourceKind,
    /// Resource name.
    pub target: String,
    /// Comparison against `value`.
    pub operator: Operator,
    /// Expected count.
    pub value: i64,
    /// Namespace to look in, the runner's default when absent.
    pub namespace: Option<String>,
}

impl Condition {
    fn serialize_fields<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry("kind", &self.kind)?;
        map.serialize_entry("target", &self.target)?;
        map.serialize_entry("equalityOperator", &self.operator)?;
        map.serialize_entry("value", &self.value)?;
        if let Some(namespace) = &self.namespace {
            map.serialize_entry("namespace", namespace)?;
        }
        Ok(())
    }
}

/// Commands the runner executes before presenting a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreCommand {
    /// Manifest to apply.
    Apply(FileContent),
    /// File shown to the reader.
    IncludeFile(FileContent),
    /// Raw shell text.
    ExecCommand(String),
    /// Condition to satisfy before proceeding.
    Wait(Condition),
}

impl PreCommand {
    /// Keyword this command was written with.
    pub fn method(&self) -> Method {
        match self {
            PreCommand::Apply(_) => Method::Apply,
            PreCommand::IncludeFile(_) => Method::IncludeFile,
            PreCommand::ExecCommand(_) => Method::ExecCommand,
            PreCommand::Wait(_) => Method::Wait,
        }
    }
}

/// Checks the runner performs after a page body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostCheck {
    /// Raw shell text to run and wait on.
    CommandWait(String),
    /// Condition to verify.
    Check(Condition),
    /// File that must exist.
    FileCheck(String),
    /// Expected command output.
    CheckCommandOut(String),
}

impl PostCheck {
    /// Keyword this check was written with.
    pub fn method(&self) -> Method {
        match self {
            PostCheck::CommandWait(_) => Method::CommandWait,
            PostCheck::Check(_) => Method::Check,
            PostCheck::FileCheck(_) => Method::FileCheck,
            PostCheck::CheckCommandOut(_) => Method::CheckCommandOut,
        }
    }
}

impl Serialize for PreCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &Role::PreCommand)?;
        map.serialize_entry("method", &self.method())?;
        match self {
            PreCommand::Apply(content) | PreCommand::IncludeFile(content) => {
                map.serialize_entry("content", content)?
            }
            PreCommand::ExecCommand(value) => map.serialize_entry("value", value)?,
            PreCommand::Wait(condition) => condition.serialize_fields(&mut map)?,
        }
        map.end()
    }
}

impl Serialize for PostCheck {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &Role::PostCheck)?;
        map.serialize_entry("method", &self.method())?;
        match self {
            PostCheck::CommandWait(value)
            | PostCheck::FileCheck(value)
            | PostCheck::CheckCommandOut(value) => map.serialize_entry("value", value)?,
            PostCheck::Check(condition) => condition.serialize_fields(&mut map)?,
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn condition(namespace: Option<&str>) -> Condition {
        Condition {
            kind: ResourceKind::Pod,
            target: "basic-deployment".into(),
            operator: Operator::Equals,
            value: 3,
            namespace: namespace.map(str::to_string),
        }
    }

    #[test]
    fn apply_serializes_with_content() {
        let command = PreCommand::Apply(FileContent {
            name: "fake.yaml".into(),
            value: "Hello, World!".into(),
        });
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({
                "type": "PRECOMMAND",
                "method": "APPLY",
                "content": { "name": "fake.yaml", "value": "Hello, World!" }
            })
        );
    }

    #[test]
    fn wait_omits_missing_namespace() {
        let command = PreCommand::Wait(condition(None));
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({
                "type": "PRECOMMAND",
                "method": "WAIT",
                "kind": "POD",
                "target": "basic-deployment",
                "equalityOperator": "EQUALS",
                "value": 3
            })
        );
    }

    #[test]
    fn check_carries_namespace() {
        let check = PostCheck::Check(condition(Some("chiron")));
        let value = serde_json::to_value(&check).unwrap();
        assert_eq!(value["type"], "POSTCHECK");
        assert_eq!(value["method"], "CHECK");
        assert_eq!(value["namespace"], "chiron");
    }

    #[test]
    fn string_checks_serialize_value() {
        let check = PostCheck::CheckCommandOut("deployment.apps/web created".into());
        assert_eq!(
            serde_json::to_value(&check).unwrap(),
            json!({
                "type": "POSTCHECK",
                "method": "CHECKCOMMANDOUT",
                "value": "deployment.apps/web created"
            })
        );
    }

    #[test]
    fn page_markers_have_no_role() {
        assert_eq!(Directive::StartPage.role(), None);
        assert_eq!(Directive::EndPage.method(), None);
        let exec = Directive::Pre(PreCommand::ExecCommand("ls".into()));
        assert_eq!(exec.role(), Some(Role::PreCommand));
        assert_eq!(exec.method(), Some(Method::ExecCommand));
    }
}
