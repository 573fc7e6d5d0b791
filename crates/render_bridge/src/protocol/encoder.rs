//! Command stream encoder
//!
//! Producer-side counterpart of the decoder. Used by hosts that generate
//! commands in-process and by the test suite.

use super::command::{CommandType, RenderCommand};
use super::params::NullParams;

/// Appends tagged command records to a byte buffer
#[derive(Debug, Clone, Default)]
pub struct CommandBufferWriter {
    bytes: Vec<u8>,
    count: usize,
}

impl CommandBufferWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one command
    pub fn push(&mut self, command: RenderCommand) -> &mut Self {
        self.bytes.extend_from_slice(&command.command_type().tag().to_ne_bytes());
        self.bytes.extend_from_slice(command.record_bytes());
        self.count += 1;
        self
    }

    /// Append every command from an iterator
    pub fn extend(&mut self, commands: impl IntoIterator<Item = RenderCommand>) -> &mut Self {
        for command in commands {
            self.push(command);
        }
        self
    }

    /// Append a `CommandGroupBegin`
    pub fn begin_group(&mut self) -> &mut Self {
        self.push(RenderCommand::CommandGroupBegin(NullParams::default()))
    }

    /// Append a `CommandGroupEnd`
    pub fn end_group(&mut self) -> &mut Self {
        self.push(RenderCommand::CommandGroupEnd(NullParams::default()))
    }

    /// Number of commands written so far
    pub fn command_count(&self) -> usize {
        self.count
    }

    /// Encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Drop everything written so far
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.count = 0;
    }

    /// Encoded size of a single command of the given kind, tag included
    pub fn encoded_size(command_type: CommandType) -> usize {
        super::command::TAG_SIZE + command_type.record_size()
    }
}
