//! Loading programs into memory.
//!
//! ROMs are raw big-endian machine code without any header. They are copied
//! verbatim to `PROGRAM_START`; nothing else in the machine is touched, so
//! callers wanting a clean restart reset the machine first.

use log::info;

use crate::context::Context;
use crate::error::Error;
use crate::vip8::{Vip8, MEMORY_SIZE, PROGRAM_START};

/// Largest program that fits above the reserved area
pub const ROM_CAPACITY: usize = MEMORY_SIZE - PROGRAM_START;

impl<C: Context> Vip8<C> {
    /// Load program from slice of bytes to memory from 0x200 (_start address)
    ///
    /// Memory is left untouched when the program is too large.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Error> {
        if rom.len() > ROM_CAPACITY {
            return Err(Error::RomTooLarge {
                size: rom.len(),
                capacity: ROM_CAPACITY,
            });
        }
        self.memory_mut()[PROGRAM_START..PROGRAM_START + rom.len()].copy_from_slice(rom);
        info!("ROM loaded: {} bytes", rom.len());
        Ok(())
    }

    /// Read the whole program from `reader` and load it
    ///
    /// At most one byte past the capacity is read before the source is
    /// rejected. Nothing is written unless the whole source was read.
    #[cfg(feature = "std")]
    pub fn load_rom_from<R: std::io::Read>(&mut self, reader: R) -> Result<(), Error> {
        use std::io::Read;

        let mut rom = std::vec::Vec::with_capacity(ROM_CAPACITY);
        reader.take(ROM_CAPACITY as u64 + 1).read_to_end(&mut rom)?;
        self.load_rom(&rom)
    }

    /// Open the file at `path` and load its content
    #[cfg(feature = "std")]
    pub fn load_rom_file<P: AsRef<std::path::Path>>(&mut self, path: P) -> Result<(), Error> {
        let file = std::fs::File::open(path.as_ref())?;
        info!("reading ROM from {}", path.as_ref().display());
        self.load_rom_from(std::io::BufReader::new(file))
    }
}
