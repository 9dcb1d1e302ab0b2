use std::fs;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use chiron_core::{
    Directive, Method, ParseErrorKind, ParseWarning, Parser, ParserOptions, PostCheck, PreCommand,
    parse_document, tokenize,
};
use serde_json::json;
use tempfile::TempDir;

const TUX_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 0, 0, 0, 13];

fn lesson_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::write(
        dir.path().join("deployment.yaml"),
        "apiVersion: apps/v1\nkind: Deployment\n",
    )
    .expect("write manifest");
    fs::write(dir.path().join("tux.png"), TUX_BYTES).expect("write image");
    dir
}

#[test]
fn compiles_multi_page_tutorial() {
    let dir = lesson_dir();
    let content = "\
# Kubernetes basics

-> START PAGE
-> APPLY deployment.yaml
-> WAIT deployment NAME basic-deployment COUNT EQUALS 1
## Deployments
A deployment keeps pods running.
-> CHECK pod NAME basic-deployment COUNT GREATERTHAN 0 NAMESPACE chiron
-> END PAGE

-> START PAGE
## Deployments 2
-> EXECCOMMAND kubectl scale deployment basic-deployment --replicas=3
-> COMMANDWAIT kubectl rollout status deployment/basic-deployment
-> END PAGE
";
    let output = Parser::new(dir.path()).parse(content).expect("parse");
    let document = output.document;
    assert_eq!(document.len(), 2);

    let first = &document.chunks[0];
    assert_eq!(first.pre_commands.len(), 2);
    assert!(first.text.starts_with("<h2 id=\"deployments\">Deployments</h2>"));
    assert!(first.text.contains("<p>A deployment keeps pods running.</p>"));
    assert_eq!(first.post_checks.len(), 1);

    let second = &document.chunks[1];
    assert!(second.text.contains("<h2 id=\"deployments-2\">"));
    assert_eq!(
        second.pre_commands,
        vec![PreCommand::ExecCommand(
            "kubectl scale deployment basic-deployment --replicas=3".into()
        )]
    );

    // Only the title before the first page is outside.
    assert_eq!(output.warnings.len(), 1);
    assert!(matches!(output.warnings[0], ParseWarning::ContentOutsidePage { .. }));
}

#[test]
fn serializes_runner_ir() {
    let dir = lesson_dir();
    let content = "\
-> START PAGE
-> APPLY deployment.yaml
-> CHECK pod NAME web COUNT EQUALS 3 NAMESPACE ns
-> END PAGE";
    let document = parse_document(content, dir.path()).expect("parse");
    let value = serde_json::to_value(&document).expect("serialize");
    assert_eq!(
        value,
        json!([{
            "preCommands": [{
                "type": "PRECOMMAND",
                "method": "APPLY",
                "content": {
                    "name": "deployment.yaml",
                    "value": "apiVersion: apps/v1\nkind: Deployment\n"
                }
            }],
            "text": "",
            "postChecks": [{
                "type": "POSTCHECK",
                "method": "CHECK",
                "kind": "POD",
                "target": "web",
                "equalityOperator": "EQUALS",
                "value": 3,
                "namespace": "ns"
            }]
        }])
    );
}

#[test]
fn embeds_images_as_base64() {
    let dir = lesson_dir();
    let content = "-> START PAGE\n![Tux, the Linux mascot](tux.png)\n-> END PAGE";
    let document = parse_document(content, dir.path()).expect("parse");
    let chunk = &document.chunks[0];

    let assets = chunk.assets.as_ref().expect("assets present");
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].name, "tux.png");
    assert_eq!(assets[0].content, general_purpose::STANDARD.encode(TUX_BYTES));
    assert!(chunk.text.contains("<img src=\"tux.png\""), "{}", chunk.text);

    let json = document.to_json_pretty().expect("json");
    assert!(json.contains("\"image\": \""));
}

#[test]
fn missing_manifest_reports_io_failure() {
    let dir = lesson_dir();
    let err = parse_document("-> START PAGE\n-> APPLY nope.yaml\n-> END PAGE", dir.path())
        .expect_err("missing file");
    assert_eq!(err.line(), 2);
    match err.kind() {
        ParseErrorKind::AssetRead { path, source } => {
            assert_eq!(path, &dir.path().join("nope.yaml"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn directives_inside_fences_still_run() {
    let dir = lesson_dir();
    let content = "\
-> START PAGE
```
-> APPLY deployment.yaml
```
-> END PAGE";
    let document = parse_document(content, dir.path()).expect("parse");
    let chunk = &document.chunks[0];
    assert_eq!(chunk.pre_commands.len(), 1);
    assert!(!chunk.text.contains("APPLY"), "{}", chunk.text);
}

#[test]
fn grouped_fence_renders_one_code_block() {
    let dir = lesson_dir();
    let content = "\
-> START PAGE
```bash
kubectl get pods
kubectl get deployments
```
-> END PAGE";
    let output = Parser::new(dir.path())
        .with_options(ParserOptions {
            group_code_fences: true,
            ..ParserOptions::default()
        })
        .parse(content)
        .expect("parse");
    let text = &output.document.chunks[0].text;
    assert_eq!(text.matches("<pre>").count(), 1, "{text}");
    assert!(
        text.contains("kubectl get pods\nkubectl get deployments\n</code></pre>"),
        "{text}"
    );
    assert!(output.warnings.is_empty());
}

#[test]
fn text_after_post_check_is_rejected() {
    let dir = lesson_dir();
    let content = "-> START PAGE\n-> FILECHECK /tmp/done\nToo late\n-> END PAGE";
    let err = parse_document(content, dir.path()).expect_err("text after check");
    assert!(matches!(err.kind(), ParseErrorKind::TextAfterPostCheck));
    assert_eq!(err.line(), 3);
    assert_eq!(err.line_text, "Too late");
}

#[test]
fn tokenize_reads_local_files() {
    let dir = lesson_dir();
    let directive = tokenize("-> INCLUDEFILE deployment.yaml", dir.path()).expect("tokenize");
    let Directive::Pre(PreCommand::IncludeFile(content)) = directive else {
        panic!("expected INCLUDEFILE, got {directive:?}");
    };
    assert_eq!(content.name, "deployment.yaml");
    assert!(content.value.starts_with("apiVersion"));

    let check = tokenize("->   fileCheck   out.txt", Path::new("/nonexistent")).expect("tokenize");
    assert_eq!(check, Directive::Post(PostCheck::FileCheck("out.txt".into())));
    assert_eq!(check.method(), Some(Method::FileCheck));
}
