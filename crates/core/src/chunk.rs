//! Pages of the IR and the builder that assembles one.

use serde::Serialize;

use crate::asset::Asset;
use crate::command::{PostCheck, PreCommand};
use crate::error::ParseErrorKind;

/// One page: commands to run, the rendered body, and checks to verify.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Commands run before the body, in source order.
    pub pre_commands: Vec<PreCommand>,
    /// Concatenated HTML fragments of the page prose.
    pub text: String,
    /// Checks run after the body, in source order.
    pub post_checks: Vec<PostCheck>,
    /// Embedded images; absent until the page references one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<Asset>>,
}

impl Chunk {
    /// True when the page has no commands, text, or checks.
    pub fn is_empty(&self) -> bool {
        self.pre_commands.is_empty() && self.text.is_empty() && self.post_checks.is_empty()
    }
}

/// Accumulates a chunk between `START PAGE` and its close.
#[derive(Debug)]
pub struct ChunkBuilder {
    opened_at: usize,
    chunk: Chunk,
}

impl ChunkBuilder {
    /// Start an empty chunk opened on `opened_at` (1-based).
    pub fn new(opened_at: usize) -> Self {
        Self {
            opened_at,
            chunk: Chunk::default(),
        }
    }

    /// Line of the `START PAGE` that opened this chunk.
    pub fn opened_at(&self) -> usize {
        self.opened_at
    }

    /// Whether body text may still be appended.
    pub fn accepts_text(&self) -> bool {
        self.chunk.post_checks.is_empty()
    }

    /// Append a pre-command.
    pub fn push_pre_command(&mut self, command: PreCommand) {
        self.chunk.pre_commands.push(command);
    }

    /// Append a post-check; closes the chunk to further text.
    pub fn push_post_check(&mut self, check: PostCheck) {
        self.chunk.post_checks.push(check);
    }

    /// Append a rendered HTML fragment.
    pub fn push_text(&mut self, html: &str) -> Result<(), ParseErrorKind> {
        if !self.accepts_text() {
            return Err(ParseErrorKind::TextAfterPostCheck);
        }
        self.chunk.text.push_str(html);
        Ok(())
    }

    /// Append an embedded asset.
    pub fn push_asset(&mut self, asset: Asset) {
        self.chunk.assets.get_or_insert_with(Vec::new).push(asset);
    }

    /// Validate and return the finished chunk.
    pub fn finish(self) -> Result<Chunk, ParseErrorKind> {
        if self.chunk.is_empty() {
            return Err(ParseErrorKind::EmptyChunkOnClose);
        }
        Ok(self.chunk)
    }
}

/// Assembled pages in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Document {
    /// Chunks in the order their pages were opened.
    pub chunks: Vec<Chunk>,
}

impl Document {
    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when the document has no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Iterate over chunks in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }

    /// Serialize as a JSON array indented by four spaces.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(out).map_err(<serde_json::Error as serde::ser::Error>::custom)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}
