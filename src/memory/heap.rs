//! Heap implementation for the interpreter
//!
//! This module provides a bounded, simulated heap:
//! - Explicit allocation/deallocation (`MALLOC`/`FREE` and array storage)
//! - Zero-filled blocks at 8-byte aligned addresses starting at
//!   [`HEAP_ADDRESS_START`]
//! - Tombstone tracking for the most recently freed blocks
//! - Bounds, use-after-free and double-free detection on every access
//!
//! Interpreted programs never touch host memory: an address is only
//! meaningful as a key into this heap. Addresses are never reused. Only the
//! last [`FREED_BLOCK_HISTORY`] freed blocks are kept as tombstones; once one
//! is forgotten, freeing its address again reports an invalid free and
//! touching it reports an out-of-bounds access.
//!
//! # Error Handling
//!
//! Methods return [`HeapError`], which carries no source location; the
//! interpreter maps it to a `RuntimeError` at the call site.

use super::value::{Address, Value};
use crate::interpreter::constants::{CELL_SIZE, FREED_BLOCK_HISTORY, HEAP_ADDRESS_START};
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;

/// Heap failures, mapped to runtime errors by the interpreter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
    #[error("Out of memory: requested {requested} bytes, {in_use} in use, limit is {limit}")]
    OutOfMemory {
        requested: usize,
        in_use: usize,
        limit: usize,
    },

    #[error("Double free detected at address 0x{0:x}")]
    DoubleFree(Address),

    #[error("Invalid free: address 0x{0:x} was never allocated")]
    InvalidFree(Address),

    #[error("Use-after-free: address 0x{0:x} has been freed")]
    UseAfterFree(Address),

    #[error("Out-of-bounds access of {size} byte(s) at address 0x{address:x}")]
    OutOfBounds { address: Address, size: usize },

    #[error("Null pointer dereference")]
    NullPointer,
}

/// How many bytes a load or store touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// One byte, sign-extended on load
    Byte,
    /// One 8-byte cell
    Cell,
}

impl Width {
    pub fn bytes(self) -> usize {
        match self {
            Width::Byte => 1,
            Width::Cell => CELL_SIZE,
        }
    }
}

/// State of a heap block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockState {
    Allocated,
    Tombstone, // Freed, kept so stale pointers are recognized
}

/// A block of heap memory
#[derive(Debug, Clone)]
pub struct HeapBlock {
    pub data: Vec<u8>,
    pub size: usize,
    pub state: BlockState,
}

impl HeapBlock {
    pub fn new(size: usize) -> Self {
        HeapBlock {
            data: vec![0; size],
            size,
            state: BlockState::Allocated,
        }
    }
}

/// The heap
#[derive(Debug, Clone)]
pub struct Heap {
    blocks: BTreeMap<Address, HeapBlock>,
    /// Tombstoned addresses, oldest first
    freed: VecDeque<Address>,
    next_address: Address,
    in_use: usize,
    max_heap_size: usize,
}

impl Heap {
    /// Create a new heap with a maximum size limit
    pub fn new(max_heap_size: usize) -> Self {
        Heap {
            blocks: BTreeMap::new(),
            freed: VecDeque::new(),
            next_address: HEAP_ADDRESS_START,
            in_use: 0,
            max_heap_size,
        }
    }

    /// Allocate a zero-filled block of memory
    pub fn allocate(&mut self, size: usize) -> Result<Address, HeapError> {
        if self.in_use.saturating_add(size) > self.max_heap_size {
            return Err(HeapError::OutOfMemory {
                requested: size,
                in_use: self.in_use,
                limit: self.max_heap_size,
            });
        }

        // Zero-sized blocks still get a distinct address
        let span = size.max(1).next_multiple_of(CELL_SIZE) as Address;
        let addr = self.next_address;
        self.next_address += span;
        self.blocks.insert(addr, HeapBlock::new(size));
        self.in_use += size;

        Ok(addr)
    }

    /// Free a block of memory (mark as tombstone); freeing null is a no-op
    pub fn free(&mut self, addr: Address) -> Result<(), HeapError> {
        if addr == 0 {
            return Ok(());
        }
        let size = match self.blocks.get_mut(&addr) {
            Some(block) if block.state == BlockState::Allocated => {
                block.state = BlockState::Tombstone;
                block.data = Vec::new();
                block.size
            }
            Some(_) => return Err(HeapError::DoubleFree(addr)),
            None => return Err(HeapError::InvalidFree(addr)),
        };
        self.in_use -= size;

        self.freed.push_back(addr);
        if self.freed.len() > FREED_BLOCK_HISTORY {
            if let Some(oldest) = self.freed.pop_front() {
                self.blocks.remove(&oldest);
            }
        }
        Ok(())
    }

    /// Find the live block containing `[addr, addr + size)`, returning its
    /// base address and the offset of `addr` within it
    fn locate(&self, addr: Address, size: usize) -> Result<(Address, usize), HeapError> {
        if addr == 0 {
            return Err(HeapError::NullPointer);
        }
        let out_of_bounds = HeapError::OutOfBounds {
            address: addr,
            size,
        };

        let (&base, block) = self
            .blocks
            .range(..=addr)
            .next_back()
            .ok_or_else(|| out_of_bounds.clone())?;
        let offset = (addr - base) as usize;

        if block.state == BlockState::Tombstone {
            if offset < block.size.max(1) {
                return Err(HeapError::UseAfterFree(addr));
            }
            return Err(out_of_bounds);
        }
        if offset + size > block.size {
            return Err(out_of_bounds);
        }

        Ok((base, offset))
    }

    /// Load a value of the given width
    pub fn load(&self, addr: Address, width: Width) -> Result<Value, HeapError> {
        let size = width.bytes();
        let (base, offset) = self.locate(addr, size)?;
        let block = &self.blocks[&base];
        let bytes = &block.data[offset..offset + size];

        Ok(match width {
            Width::Byte => bytes[0] as i8 as Value,
            Width::Cell => {
                let mut cell = [0u8; CELL_SIZE];
                cell.copy_from_slice(bytes);
                Value::from_le_bytes(cell)
            }
        })
    }

    /// Store a value of the given width; bytes stores keep the low 8 bits
    pub fn store(&mut self, addr: Address, width: Width, value: Value) -> Result<(), HeapError> {
        let size = width.bytes();
        let (base, offset) = self.locate(addr, size)?;
        let cell = value.to_le_bytes();
        if let Some(block) = self.blocks.get_mut(&base) {
            block.data[offset..offset + size].copy_from_slice(&cell[..size]);
        }
        Ok(())
    }

    /// Get all blocks (includes tombstones)
    pub fn blocks(&self) -> &BTreeMap<Address, HeapBlock> {
        &self.blocks
    }

    /// Bytes held by live blocks
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    pub fn live_blocks(&self) -> usize {
        self.blocks
            .values()
            .filter(|b| b.state == BlockState::Allocated)
            .count()
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new(crate::interpreter::constants::DEFAULT_HEAP_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_is_aligned_and_zeroed() {
        let mut heap = Heap::new(1024);
        let a = heap.allocate(3).unwrap();
        let b = heap.allocate(16).unwrap();
        assert_eq!(a, HEAP_ADDRESS_START);
        assert_eq!(b % CELL_SIZE as u64, 0);
        assert!(b > a);
        assert_eq!(heap.load(b + 8, Width::Cell).unwrap(), 0);
        assert_eq!(heap.load(a + 2, Width::Byte).unwrap(), 0);
        assert_eq!(heap.in_use(), 19);
    }

    #[test]
    fn test_cell_and_byte_round_trip() {
        let mut heap = Heap::new(1024);
        let p = heap.allocate(16).unwrap();
        heap.store(p + 8, Width::Cell, -42).unwrap();
        assert_eq!(heap.load(p + 8, Width::Cell).unwrap(), -42);

        heap.store(p, Width::Byte, 0x1ff).unwrap();
        assert_eq!(heap.load(p, Width::Byte).unwrap(), -1);
    }

    #[test]
    fn test_bounds_are_checked() {
        let mut heap = Heap::new(1024);
        let p = heap.allocate(8).unwrap();
        assert!(matches!(
            heap.load(p + 1, Width::Cell),
            Err(HeapError::OutOfBounds { .. })
        ));
        assert!(matches!(
            heap.store(p + 8, Width::Byte, 1),
            Err(HeapError::OutOfBounds { .. })
        ));
        assert!(matches!(
            heap.load(HEAP_ADDRESS_START - 8, Width::Cell),
            Err(HeapError::OutOfBounds { .. })
        ));
        assert_eq!(heap.load(0, Width::Cell), Err(HeapError::NullPointer));
    }

    #[test]
    fn test_free_detection() {
        let mut heap = Heap::new(1024);
        let p = heap.allocate(8).unwrap();
        heap.free(p).unwrap();
        assert_eq!(heap.free(p), Err(HeapError::DoubleFree(p)));
        assert_eq!(heap.load(p, Width::Cell), Err(HeapError::UseAfterFree(p)));
        assert_eq!(heap.free(p + 4), Err(HeapError::InvalidFree(p + 4)));
        assert_eq!(heap.free(0), Ok(()));
        assert_eq!(heap.in_use(), 0);
        assert_eq!(heap.live_blocks(), 0);
    }

    #[test]
    fn test_tombstones_are_bounded() {
        let mut heap = Heap::new(1024);
        let first = heap.allocate(8).unwrap();
        heap.free(first).unwrap();
        let mut last = first;
        for _ in 0..FREED_BLOCK_HISTORY + 10 {
            last = heap.allocate(8).unwrap();
            heap.free(last).unwrap();
        }

        assert_eq!(heap.blocks().len(), FREED_BLOCK_HISTORY);
        assert_eq!(heap.free(last), Err(HeapError::DoubleFree(last)));
        assert_eq!(heap.free(first), Err(HeapError::InvalidFree(first)));
        assert!(matches!(
            heap.load(first, Width::Cell),
            Err(HeapError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_limit_is_enforced() {
        let mut heap = Heap::new(16);
        let p = heap.allocate(16).unwrap();
        assert!(matches!(
            heap.allocate(1),
            Err(HeapError::OutOfMemory { requested: 1, .. })
        ));
        heap.free(p).unwrap();
        assert!(heap.allocate(8).is_ok());
    }
}
