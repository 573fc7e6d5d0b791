//! Command stream decoder
//!
//! A command buffer is a flat byte sequence of `tag | record` pairs. Tags are
//! native-endian `i32`; the record that follows has the fixed size of its
//! command kind. The decoder is a forward-only iterator over that sequence.
//!
//! Decoding stops at the first malformed record. After an error the iterator is
//! fused and yields nothing more, so a caller that keeps pulling cannot
//! misinterpret the bytes past the fault.

use thiserror::Error;

use super::command::{CommandType, RenderCommand, TAG_SIZE};

/// Errors raised while walking a command buffer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The tag does not name any known command
    #[error("unknown command tag {tag} at offset {offset}")]
    UnknownCommandTag {
        /// Raw tag value
        tag: i32,
        /// Offset of the tag in the buffer
        offset: usize,
    },

    /// The buffer ends before a full tag or record could be read
    #[error("truncated {command} at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        /// Kind being read, `None` when the tag itself is cut off
        command: TruncatedPart,
        /// Offset where the partial read started
        offset: usize,
        /// Bytes required
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// A command group was opened twice, closed without opening, or left open
    #[error("unbalanced command group at offset {offset}")]
    UnbalancedGroup {
        /// Offset of the offending tag, or the buffer length when a group is left open
        offset: usize,
    },
}

/// What part of the stream a truncation cut into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncatedPart {
    /// The command tag
    Tag,
    /// The parameter record of a command
    Record(CommandType),
}

impl std::fmt::Display for TruncatedPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tag => f.write_str("command tag"),
            Self::Record(command_type) => write!(f, "{command_type} record"),
        }
    }
}

/// Forward iterator over the commands in a byte buffer
///
/// Yields `Ok(command)` for every well-formed command in stream order and at
/// most one `Err`, after which it is exhausted.
#[derive(Debug, Clone)]
pub struct DecodedCommandQueue<'a> {
    bytes: &'a [u8],
    offset: usize,
    group_open: bool,
    failed: bool,
}

impl<'a> DecodedCommandQueue<'a> {
    /// Start decoding at the beginning of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            group_open: false,
            failed: false,
        }
    }

    /// Byte offset of the next tag to be read
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether every byte has been consumed without error
    pub fn is_finished(&self) -> bool {
        !self.failed && self.offset >= self.bytes.len()
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn fail(&mut self, error: DecodeError) -> Option<Result<RenderCommand, DecodeError>> {
        self.failed = true;
        Some(Err(error))
    }

    fn read_tag(&self) -> Result<i32, DecodeError> {
        if self.remaining() < TAG_SIZE {
            return Err(DecodeError::Truncated {
                command: TruncatedPart::Tag,
                offset: self.offset,
                needed: TAG_SIZE,
                available: self.remaining(),
            });
        }

        let tag_bytes = &self.bytes[self.offset..self.offset + TAG_SIZE];
        Ok(bytemuck::pod_read_unaligned::<i32>(tag_bytes))
    }

    fn track_group(&mut self, command_type: CommandType, offset: usize) -> Result<(), DecodeError> {
        match command_type {
            CommandType::CommandGroupBegin if self.group_open => {
                Err(DecodeError::UnbalancedGroup { offset })
            }
            CommandType::CommandGroupBegin => {
                self.group_open = true;
                Ok(())
            }
            CommandType::CommandGroupEnd if !self.group_open => {
                Err(DecodeError::UnbalancedGroup { offset })
            }
            CommandType::CommandGroupEnd => {
                self.group_open = false;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl Iterator for DecodedCommandQueue<'_> {
    type Item = Result<RenderCommand, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if self.offset >= self.bytes.len() {
            if self.group_open {
                self.group_open = false;
                return self.fail(DecodeError::UnbalancedGroup { offset: self.bytes.len() });
            }
            return None;
        }

        let tag_offset = self.offset;
        let tag = match self.read_tag() {
            Ok(tag) => tag,
            Err(error) => return self.fail(error),
        };

        let Some(command_type) = CommandType::from_tag(tag) else {
            return self.fail(DecodeError::UnknownCommandTag { tag, offset: tag_offset });
        };

        let record_offset = tag_offset + TAG_SIZE;
        let record_size = command_type.record_size();
        let available = self.bytes.len() - record_offset;
        if available < record_size {
            return self.fail(DecodeError::Truncated {
                command: TruncatedPart::Record(command_type),
                offset: record_offset,
                needed: record_size,
                available,
            });
        }

        if let Err(error) = self.track_group(command_type, tag_offset) {
            return self.fail(error);
        }

        let record = &self.bytes[record_offset..record_offset + record_size];
        self.offset = record_offset + record_size;
        Some(Ok(RenderCommand::from_record(command_type, record)))
    }
}

impl std::iter::FusedIterator for DecodedCommandQueue<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encoder::CommandBufferWriter;
    use crate::protocol::enums::{MaterialScalarProperty, MaterialType};
    use crate::protocol::params::*;

    fn decode_all(bytes: &[u8]) -> Vec<Result<RenderCommand, DecodeError>> {
        DecodedCommandQueue::new(bytes).collect()
    }

    #[test]
    fn test_empty_buffer_yields_nothing() {
        let mut queue = DecodedCommandQueue::new(&[]);
        assert!(queue.next().is_none());
        assert!(queue.is_finished());
    }

    #[test]
    fn test_commands_come_back_in_order() {
        let mut writer = CommandBufferWriter::new();
        writer
            .push(RenderCommand::CreateMaterial(CreateMaterialParams::new(7, MaterialType::Tile, 0)))
            .push(RenderCommand::SetMaterialScalarProperty(SetMaterialScalarPropertyParams::new(
                7,
                MaterialScalarProperty::Opacity,
                0.25,
            )))
            .push(RenderCommand::DestroyMaterial(DestroyMaterialParams { material_id: 7 }));

        let commands: Vec<_> = decode_all(writer.as_bytes())
            .into_iter()
            .collect::<Result<_, _>>()
            .expect("well formed stream");

        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0].command_type(), CommandType::CreateMaterial);
        match commands[1] {
            RenderCommand::SetMaterialScalarProperty(params) => {
                assert_eq!(params.material_id, 7);
                assert_eq!(params.property, MaterialScalarProperty::Opacity.as_raw());
                assert!((params.value - 0.25).abs() < f32::EPSILON);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(commands[2], RenderCommand::DestroyMaterial(DestroyMaterialParams { material_id: 7 }));
    }

    #[test]
    fn test_set_mesh_round_trips_every_view() {
        let mut params = SetMeshParams::new(12);
        params.triangles = DataBufferView::new(0x1000, 12);
        params.positions = DataBufferView::new(0x2000, 36);
        params.feature_indices = DataBufferView::new(0x3000, 12);

        let mut writer = CommandBufferWriter::new();
        writer.push(RenderCommand::SetMesh(params));

        let decoded = decode_all(writer.as_bytes());
        assert_eq!(decoded, vec![Ok(RenderCommand::SetMesh(params))]);
    }

    #[test]
    fn test_unknown_tag_stops_decoding() {
        let mut writer = CommandBufferWriter::new();
        writer.push(RenderCommand::DestroyTexture(DestroyTextureParams { texture_id: 1 }));
        let mut bytes = writer.into_bytes();
        bytes.extend_from_slice(&99_i32.to_ne_bytes());
        bytes.extend_from_slice(&[0; 16]);

        let decoded = decode_all(&bytes);
        assert_eq!(decoded.len(), 2);
        assert!(decoded[0].is_ok());
        assert_eq!(decoded[1], Err(DecodeError::UnknownCommandTag { tag: 99, offset: 8 }));
    }

    #[test]
    fn test_truncated_record_is_reported() {
        let mut bytes = CommandType::CreateTexture.tag().to_ne_bytes().to_vec();
        bytes.extend_from_slice(&[0; 10]);

        let decoded = decode_all(&bytes);
        assert_eq!(
            decoded,
            vec![Err(DecodeError::Truncated {
                command: TruncatedPart::Record(CommandType::CreateTexture),
                offset: 4,
                needed: 20,
                available: 10,
            })]
        );
    }

    #[test]
    fn test_truncated_tag_is_reported() {
        let decoded = decode_all(&[1, 0]);
        assert!(matches!(
            decoded.as_slice(),
            [Err(DecodeError::Truncated { command: TruncatedPart::Tag, offset: 0, .. })]
        ));
    }

    #[test]
    fn test_iterator_is_fused_after_error() {
        let mut bytes = 42_i32.to_ne_bytes().to_vec();
        let mut writer = CommandBufferWriter::new();
        writer.push(RenderCommand::GenerateMipMaps(GenerateMipMapsParams { render_target_id: 3 }));
        bytes.extend_from_slice(writer.as_bytes());

        let mut queue = DecodedCommandQueue::new(&bytes);
        assert!(matches!(queue.next(), Some(Err(_))));
        assert!(queue.next().is_none());
        assert!(queue.next().is_none());
        assert!(!queue.is_finished());
    }

    #[test]
    fn test_balanced_group_decodes() {
        let mut writer = CommandBufferWriter::new();
        writer
            .begin_group()
            .push(RenderCommand::SetVisible(SetVisibleParams::new(4, true)))
            .end_group();

        let decoded = decode_all(writer.as_bytes());
        assert_eq!(decoded.len(), 3);
        assert!(decoded.iter().all(Result::is_ok));
    }

    #[test]
    fn test_end_without_begin_is_unbalanced() {
        let mut writer = CommandBufferWriter::new();
        writer.end_group();
        assert_eq!(decode_all(writer.as_bytes()), vec![Err(DecodeError::UnbalancedGroup { offset: 0 })]);
    }

    #[test]
    fn test_nested_begin_is_unbalanced() {
        let mut writer = CommandBufferWriter::new();
        writer.begin_group().begin_group();
        let decoded = decode_all(writer.as_bytes());
        assert_eq!(decoded.last(), Some(&Err(DecodeError::UnbalancedGroup { offset: 8 })));
    }

    #[test]
    fn test_group_left_open_is_unbalanced() {
        let mut writer = CommandBufferWriter::new();
        writer.begin_group();
        let len = writer.as_bytes().len();
        let decoded = decode_all(writer.as_bytes());
        assert_eq!(decoded.last(), Some(&Err(DecodeError::UnbalancedGroup { offset: len })));
    }

    #[test]
    fn test_every_command_kind_survives_decode_and_encode() {
        let mut bytes = Vec::new();
        for (index, command_type) in CommandType::ALL.iter().enumerate() {
            bytes.extend_from_slice(&command_type.tag().to_ne_bytes());
            bytes.extend((0..command_type.record_size()).map(|offset| 1 + ((index * 7 + offset) % 255) as u8));
        }

        let mut writer = CommandBufferWriter::new();
        let mut kinds = Vec::new();
        for command in DecodedCommandQueue::new(&bytes) {
            let command = command.expect("well formed stream");
            kinds.push(command.command_type());
            writer.push(command);
        }

        assert_eq!(kinds, CommandType::ALL);
        assert_eq!(writer.as_bytes(), bytes.as_slice());
    }
}
