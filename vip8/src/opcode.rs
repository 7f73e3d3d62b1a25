use core::convert::TryFrom;

use crate::error::Error;

/// A decoded instruction word
///
/// Field names follow the usual nibble notation: `x` and `y` select
/// registers, `n` is the low nibble, `nn` the low byte and `nnn` the low
/// 12 bits of the word. Words that encode nothing are rejected by
/// `try_from` with [`Error::UnknownOpcode`].
///
/// ```
/// use core::convert::TryFrom;
/// use vip8::opcode::OpCode;
///
/// assert_eq!(
///     OpCode::try_from(0xD12Fu16).unwrap(),
///     OpCode::_DXYN { x: 0x1, y: 0x2, n: 0xF },
/// );
/// assert!(OpCode::try_from(0x8AB8u16).is_err());
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OpCode {
    /// Native routine call; decoded but never executed
    _0NNN { nnn: u16 },
    /// Clear every pixel
    _00E0,
    /// Pop the return address into pc
    _00EE,
    /// pc = NNN
    _1NNN { nnn: u16 },
    /// Push pc, then pc = NNN
    _2NNN { nnn: u16 },
    /// Skip next word when VX == NN
    _3XNN { x: u8, nn: u8 },
    /// Skip next word when VX != NN
    _4XNN { x: u8, nn: u8 },
    /// Skip next word when VX == VY, low nibble ignored
    _5XY0 { x: u8, y: u8 },
    /// VX = NN
    _6XNN { x: u8, nn: u8 },
    /// VX += NN, wrapping, VF untouched
    _7XNN { x: u8, nn: u8 },
    /// VX = VY
    _8XY0 { x: u8, y: u8 },
    /// VX |= VY
    _8XY1 { x: u8, y: u8 },
    /// VX &= VY
    _8XY2 { x: u8, y: u8 },
    /// VX ^= VY
    _8XY3 { x: u8, y: u8 },
    /// VX += VY, VF = carry
    _8XY4 { x: u8, y: u8 },
    /// VX -= VY, VF = 1 only when VX > VY beforehand
    _8XY5 { x: u8, y: u8 },
    /// VX >>= 1, VF = bit shifted out; VY is not read
    _8XY6 { x: u8, y: u8 },
    /// VX = VY - VX, VF = 1 only when VY > VX beforehand
    _8XY7 { x: u8, y: u8 },
    /// VX <<= 1, VF = bit shifted out; VY is not read
    _8XYE { x: u8, y: u8 },
    /// Skip next word when VX != VY, low nibble ignored
    _9XY0 { x: u8, y: u8 },
    /// I = NNN
    _ANNN { nnn: u16 },
    /// pc = NNN + V0
    _BNNN { nnn: u16 },
    /// VX = random byte & NN
    _CXNN { x: u8, nn: u8 },
    /// XOR an N-row sprite from memory at I onto (VX, VY), VF = any pixel erased
    _DXYN { x: u8, y: u8, n: u8 },
    /// Skip next word when key VX is down
    _EX9E { x: u8 },
    /// Skip next word when key VX is up
    _EXA1 { x: u8 },
    /// VX = delay timer
    _FX07 { x: u8 },
    /// Stall until a key is down, then VX = that key
    _FX0A { x: u8 },
    /// Delay timer = VX
    _FX15 { x: u8 },
    /// Sound timer = VX
    _FX18 { x: u8 },
    /// I += VX, wrapping, VF untouched
    _FX1E { x: u8 },
    /// I = address of the font glyph for VX
    _FX29 { x: u8 },
    /// Decimal digits of VX to memory at I, I+1, I+2
    _FX33 { x: u8 },
    /// V0..=VX to memory from I; I keeps its value
    _FX55 { x: u8 },
    /// Memory from I to V0..=VX; I keeps its value
    _FX65 { x: u8 },
}

// Nibble layout of a word: [first][x][y][last]
impl OpCode {
    fn read_first(raw: u16) -> u8 {
        (raw >> 12) as u8
    }

    fn read_x(raw: u16) -> u8 {
        (raw >> 8) as u8 & 0xF
    }

    fn read_y(raw: u16) -> u8 {
        (raw >> 4) as u8 & 0xF
    }

    fn read_last(raw: u16) -> u8 {
        raw as u8 & 0xF
    }

    fn read_nn(raw: u16) -> u8 {
        raw as u8
    }

    fn read_nnn(raw: u16) -> u16 {
        raw & 0xFFF
    }
}

impl TryFrom<u16> for OpCode {
    type Error = Error;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        let x = Self::read_x(raw);
        let y = Self::read_y(raw);
        let nn = Self::read_nn(raw);
        let nnn = Self::read_nnn(raw);
        let opcode = match Self::read_first(raw) {
            0x0 => match nnn {
                0x0E0 => OpCode::_00E0,
                0x0EE => OpCode::_00EE,
                nnn => OpCode::_0NNN { nnn },
            },
            0x1 => OpCode::_1NNN { nnn },
            0x2 => OpCode::_2NNN { nnn },
            0x3 => OpCode::_3XNN { x, nn },
            0x4 => OpCode::_4XNN { x, nn },
            // low nibble of 5XY0 and 9XY0 is not checked
            0x5 => OpCode::_5XY0 { x, y },
            0x6 => OpCode::_6XNN { x, nn },
            0x7 => OpCode::_7XNN { x, nn },
            0x8 => match Self::read_last(raw) {
                0x0 => OpCode::_8XY0 { x, y },
                0x1 => OpCode::_8XY1 { x, y },
                0x2 => OpCode::_8XY2 { x, y },
                0x3 => OpCode::_8XY3 { x, y },
                0x4 => OpCode::_8XY4 { x, y },
                0x5 => OpCode::_8XY5 { x, y },
                0x6 => OpCode::_8XY6 { x, y },
                0x7 => OpCode::_8XY7 { x, y },
                0xE => OpCode::_8XYE { x, y },
                _ => return Err(Error::UnknownOpcode(raw)),
            },
            0x9 => OpCode::_9XY0 { x, y },
            0xA => OpCode::_ANNN { nnn },
            0xB => OpCode::_BNNN { nnn },
            0xC => OpCode::_CXNN { x, nn },
            0xD => OpCode::_DXYN {
                x,
                y,
                n: Self::read_last(raw),
            },
            0xE => match nn {
                0x9E => OpCode::_EX9E { x },
                0xA1 => OpCode::_EXA1 { x },
                _ => return Err(Error::UnknownOpcode(raw)),
            },
            0xF => match nn {
                0x07 => OpCode::_FX07 { x },
                0x0A => OpCode::_FX0A { x },
                0x15 => OpCode::_FX15 { x },
                0x18 => OpCode::_FX18 { x },
                0x1E => OpCode::_FX1E { x },
                0x29 => OpCode::_FX29 { x },
                0x33 => OpCode::_FX33 { x },
                0x55 => OpCode::_FX55 { x },
                0x65 => OpCode::_FX65 { x },
                _ => return Err(Error::UnknownOpcode(raw)),
            },
            _ => unreachable!("nibble out of range"),
        };
        Ok(opcode)
    }
}
