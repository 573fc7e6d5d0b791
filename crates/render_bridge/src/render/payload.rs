//! Out-of-band payload resolution
//!
//! Large command data (vertex streams, texels, composition layers, names) does
//! not travel inside the command buffer. Records carry a [`DataBufferView`]
//! instead: an address in producer memory plus a size. A [`PayloadSource`]
//! turns those views back into byte slices.
//!
//! [`PayloadArena`] is the in-process implementation. It owns copies of the
//! payload blocks and maps address ranges onto them, so views can be resolved
//! without dereferencing raw producer pointers.

use std::collections::BTreeMap;

use bytemuck::Pod;

use super::{RenderError, RenderResult};
use crate::protocol::DataBufferView;

/// First address handed out by [`PayloadArena::insert`]
const ARENA_BASE_ADDRESS: u64 = 0x1000;

/// Alignment of addresses handed out by [`PayloadArena::insert`]
const ARENA_ALIGNMENT: u64 = 16;

/// Resolves producer buffer views to bytes
pub trait PayloadSource {
    /// Bytes covered by a non-empty view, or `None` when the view is not backed
    fn resolve(&self, view: &DataBufferView) -> Option<&[u8]>;
}

/// Bytes behind a view; empty views always resolve to an empty slice
pub fn view_bytes<'a>(source: &'a dyn PayloadSource, view: &DataBufferView) -> RenderResult<&'a [u8]> {
    if view.is_empty() {
        return Ok(&[]);
    }

    source.resolve(view).ok_or(RenderError::InvalidPayload {
        data: view.data,
        size: view.size,
        reason: "no payload block covers this range",
    })
}

/// Read a view as a packed array of plain-old-data elements
pub fn read_array<T: Pod>(source: &dyn PayloadSource, view: &DataBufferView) -> RenderResult<Vec<T>> {
    let bytes = view_bytes(source, view)?;
    let element_size = std::mem::size_of::<T>();

    if bytes.len() % element_size != 0 {
        return Err(RenderError::InvalidPayload {
            data: view.data,
            size: view.size,
            reason: "size is not a multiple of the element size",
        });
    }

    Ok(bytes.chunks_exact(element_size).map(bytemuck::pod_read_unaligned).collect())
}

/// Read a view as a NUL-terminated name
///
/// The name ends at the first NUL byte or at the end of the view.
pub fn read_name(source: &dyn PayloadSource, view: &DataBufferView) -> RenderResult<String> {
    let bytes = view_bytes(source, view)?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}

/// Owned payload blocks addressed like producer memory
#[derive(Debug, Clone, Default)]
pub struct PayloadArena {
    blocks: BTreeMap<u64, Vec<u8>>,
    next_address: u64,
}

impl PayloadArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self {
            blocks: BTreeMap::new(),
            next_address: ARENA_BASE_ADDRESS,
        }
    }

    /// Store a block at a fresh address and return a view over all of it
    pub fn insert(&mut self, bytes: impl Into<Vec<u8>>) -> DataBufferView {
        let bytes = bytes.into();
        let address = self.next_address.max(ARENA_BASE_ADDRESS);
        let size = bytes.len() as u64;
        self.next_address = (address + size.max(1)).next_multiple_of(ARENA_ALIGNMENT);
        self.blocks.insert(address, bytes);
        DataBufferView::new(address, size as u32)
    }

    /// Store a slice of plain-old-data elements
    pub fn insert_slice<T: Pod>(&mut self, elements: &[T]) -> DataBufferView {
        self.insert(bytemuck::cast_slice::<T, u8>(elements).to_vec())
    }

    /// Store a name with its terminating NUL
    pub fn insert_name(&mut self, name: &str) -> DataBufferView {
        let mut bytes = name.as_bytes().to_vec();
        bytes.push(0);
        self.insert(bytes)
    }

    /// Store a block at a specific producer address
    ///
    /// Replaces any block that starts at the same address.
    pub fn insert_at(&mut self, address: u64, bytes: impl Into<Vec<u8>>) {
        let bytes = bytes.into();
        let end = address + bytes.len() as u64;
        self.next_address = self.next_address.max(end.next_multiple_of(ARENA_ALIGNMENT));
        self.blocks.insert(address, bytes);
    }

    /// Number of stored blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no blocks are stored
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Drop every block
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.next_address = ARENA_BASE_ADDRESS;
    }
}

impl PayloadSource for PayloadArena {
    fn resolve(&self, view: &DataBufferView) -> Option<&[u8]> {
        let (&start, block) = self.blocks.range(..=view.data).next_back()?;
        let offset = usize::try_from(view.data - start).ok()?;
        let end = offset.checked_add(view.size as usize)?;
        block.get(offset..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_resolve() {
        let mut arena = PayloadArena::new();
        let first = arena.insert(vec![1, 2, 3]);
        let second = arena.insert(vec![4, 5]);

        assert_ne!(first.data, second.data);
        assert_eq!(second.data % ARENA_ALIGNMENT, 0);
        assert_eq!(arena.resolve(&first), Some(&[1, 2, 3][..]));
        assert_eq!(arena.resolve(&second), Some(&[4, 5][..]));
    }

    #[test]
    fn test_sub_range_resolves() {
        let mut arena = PayloadArena::new();
        arena.insert_at(0x8000, vec![0, 1, 2, 3, 4, 5, 6, 7]);

        let view = DataBufferView::new(0x8002, 4);
        assert_eq!(arena.resolve(&view), Some(&[2, 3, 4, 5][..]));
    }

    #[test]
    fn test_out_of_range_does_not_resolve() {
        let mut arena = PayloadArena::new();
        arena.insert_at(0x8000, vec![0; 8]);

        assert!(arena.resolve(&DataBufferView::new(0x8004, 8)).is_none());
        assert!(arena.resolve(&DataBufferView::new(0x10, 1)).is_none());
    }

    #[test]
    fn test_empty_view_is_always_valid() {
        let arena = PayloadArena::new();
        let bytes = view_bytes(&arena, &DataBufferView::empty()).expect("empty view");
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_unbacked_view_is_invalid() {
        let arena = PayloadArena::new();
        let result = view_bytes(&arena, &DataBufferView::new(0xdead_0000, 4));
        assert!(matches!(result, Err(RenderError::InvalidPayload { data: 0xdead_0000, size: 4, .. })));
    }

    #[test]
    fn test_read_array_checks_element_size() {
        let mut arena = PayloadArena::new();
        let positions = arena.insert_slice(&[[1.0_f32, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let odd = arena.insert(vec![0; 7]);

        let decoded: Vec<[f32; 3]> = read_array(&arena, &positions).expect("positions");
        assert_eq!(decoded, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);

        assert!(read_array::<f32>(&arena, &odd).is_err());
    }

    #[test]
    fn test_read_name_stops_at_nul() {
        let mut arena = PayloadArena::new();
        let view = arena.insert_name("_OverlayTex");
        let padded = arena.insert(b"_Mask\0garbage".to_vec());

        assert_eq!(read_name(&arena, &view).expect("name"), "_OverlayTex");
        assert_eq!(read_name(&arena, &padded).expect("name"), "_Mask");
    }
}
