// Constants for the C interpreter

/// Starting address for heap allocations
/// Heap addresses start at 0x10000000 so they are never mistaken for small integers
pub const HEAP_ADDRESS_START: u64 = 0x1000_0000;

/// Size of one value cell (`int` and pointers)
pub const CELL_SIZE: usize = 8;

/// Byte stride of pointer arithmetic, independent of the pointee type
pub const POINTER_STRIDE: i64 = 8;

/// Default heap limit: 16 MiB of live blocks
pub const DEFAULT_HEAP_LIMIT: usize = 16 * 1024 * 1024;

/// Default bound on nested calls above the global frame
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Native stack growth for deep interpreted recursion: when less than the
/// red zone remains, continue on a fresh segment of the grow size
pub const STACK_RED_ZONE: usize = 128 * 1024;
pub const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Freed blocks remembered for double-free and use-after-free detection;
/// older tombstones are forgotten
pub const FREED_BLOCK_HISTORY: usize = 4096;

/// Entry function
pub const ENTRY_FUNCTION: &str = "main";

// Reserved built-in names
pub const READ_BUILTIN: &str = "GET";
pub const PRINT_BUILTIN: &str = "PRINT";
pub const ALLOCATE_BUILTIN: &str = "MALLOC";
pub const DEALLOCATE_BUILTIN: &str = "FREE";

/// Prompt written before each read
pub const READ_PROMPT: &str = "Please Input an Integer Value: ";
