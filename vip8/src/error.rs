//! Errors reported by the engine.
//!
//! [`Error`] covers recoverable API failures (loading a program, decoding a
//! word, building an engine). [`Fault`] is what a running program can trigger;
//! it is handed to the host from `tick_chip` and the machine should not be
//! stepped further without a reset.

/// Recoverable errors of the engine API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ROM is too large ({size} bytes), max size is {capacity} bytes")]
    RomTooLarge { size: usize, capacity: usize },

    #[cfg(feature = "std")]
    #[error("Failed to read ROM: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown opcode: {0:#06X}")]
    UnknownOpcode(u16),

    #[error("Context not provided")]
    MissingContext,

    #[error("Program not provided")]
    MissingProgram,
}

/// Fatal conditions raised by an executing program
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    /// `2NNN` with all 16 stack levels in use
    #[error("Cannot enter subroutine, stack is full; pc:={pc:#05X}")]
    StackOverflow { pc: u16 },

    /// `00EE` outside of any subroutine
    #[error("Can't return. Not in subroutine; pc:={pc:#05X}")]
    StackUnderflow { pc: u16 },

    /// Access past 0xFFF
    #[error("Attempted to access memory out of address space at {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    /// Store into the font table or the rest of the interpreter area
    #[error("Attempted to write to reserved memory at {address:#06X}")]
    ReservedWrite { address: usize },
}
