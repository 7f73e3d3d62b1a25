use core::convert::TryFrom;

use heapless::Vec;
use log::{debug, error, trace, warn};

use crate::context::Context;
use crate::error::Fault;
use crate::font::{glyph_address, FONT, FONT_START};
use crate::frame::{Frame, FrameView};
use crate::opcode::OpCode;
use crate::timer::{Timer, TimerState};

pub const MEMORY_SIZE: usize = 4096;
/// Address programs are loaded at and executed from
pub const PROGRAM_START: usize = 0x200;
pub const STACK_DEPTH: usize = 16;
pub const KEY_COUNT: usize = 16;

const VF: usize = 0xF;

/// Result of a single execution step
///
/// `WouldBlock` means the machine waits for a key press (`FX0A`) and the
/// same instruction will be fetched again on the next step.
pub type Step = nb::Result<(), Fault>;

pub struct Vip8<C: Context> {
    ctx: C,
    v: [u8; 16],
    i: u16,
    pc: u16,
    frame: Frame,
    memory: [u8; MEMORY_SIZE],
    stack: Vec<u16, STACK_DEPTH>,
    keys: [bool; KEY_COUNT],
    delay_timer: Timer,
    sound_timer: Timer,
}

impl<C: Context> Vip8<C> {
    /// Create machine in its power-on state, with no program loaded
    pub fn new(ctx: C) -> Self {
        let mut chip = Self {
            ctx,
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START as u16,
            frame: Frame::new(),
            memory: [0; MEMORY_SIZE],
            stack: Vec::new(),
            keys: [false; KEY_COUNT],
            delay_timer: Timer::new(),
            sound_timer: Timer::new(),
        };
        chip.initialize();
        chip
    }

    /// Reset to power-on state
    ///
    /// Clears memory (including any loaded program), registers, stack,
    /// keypad, frame and timers, then reloads the font. Context is kept.
    pub fn initialize(&mut self) {
        self.memory = [0; MEMORY_SIZE];
        self.memory[FONT_START..FONT_START + FONT.len()].copy_from_slice(&FONT);
        self.v = [0; 16];
        self.i = 0;
        self.pc = PROGRAM_START as u16;
        self.stack.clear();
        self.keys = [false; KEY_COUNT];
        self.frame.clear();
        self.delay_timer.store(0);
        self.sound_timer.store(0);
        debug!("machine reset, pc:={:#05X}", self.pc);
    }

    /// Update state of a single key, keys past 0xF are ignored
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        if let Some(state) = self.keys.get_mut(key as usize) {
            *state = pressed;
        }
    }

    /// Decrement both timers by one tick
    ///
    /// This is the only place timers decay; hosts call it at 60 Hz
    /// independently of how often `tick_chip` runs. While the sound timer
    /// is running `Context::sound_on` is called, and `Context::sound_off`
    /// once it reaches zero.
    pub fn tick_timers(&mut self) {
        self.delay_timer.decrement();
        if self.sound_timer.load() > 0 {
            self.ctx.sound_on();
        }
        if let TimerState::Finished = self.sound_timer.decrement() {
            self.ctx.sound_off();
        }
    }

    /// Fetch, decode and execute a single instruction
    ///
    /// Unknown opcodes are logged and skipped. A `Fault` leaves the machine
    /// with `pc` past the faulting instruction; reset before stepping again.
    pub fn tick_chip(&mut self) -> Step {
        let step = match self.fetch() {
            Ok(raw) => match OpCode::try_from(raw) {
                Ok(opcode) => {
                    trace!("{:#05X}: {:04X} {:?}", self.current(), raw, opcode);
                    self.execute(opcode)
                }
                Err(err) => {
                    warn!("{}; pc:={:#05X}", err, self.current());
                    Ok(())
                }
            },
            Err(fault) => Err(nb::Error::Other(fault)),
        };
        if let Err(nb::Error::Other(fault)) = &step {
            error!("{}", fault);
        }
        step
    }

    /// View over the current frame
    pub fn frame(&self) -> FrameView<'_> {
        self.frame.view()
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.load()
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.load()
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    /// Value of register VX, `x` is taken modulo 16
    pub fn v(&self, x: u8) -> u8 {
        self.v[(x & 0xF) as usize]
    }

    /// Number of return addresses on the stack
    pub fn sp(&self) -> usize {
        self.stack.len()
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        &self.keys
    }

    pub fn ctx(&self) -> &C {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    pub(crate) fn memory_mut(&mut self) -> &mut [u8; MEMORY_SIZE] {
        &mut self.memory
    }

    fn fetch(&mut self) -> Result<u16, Fault> {
        let pc = self.pc as usize;
        self.check_range(pc, 2)?;
        let raw = u16::from_be_bytes([self.memory[pc], self.memory[pc + 1]]);
        self.pc = self.pc.wrapping_add(2);
        Ok(raw)
    }

    fn check_range(&self, start: usize, len: usize) -> Result<(), Fault> {
        if start + len > MEMORY_SIZE {
            Err(Fault::MemoryOutOfBounds {
                address: start.max(MEMORY_SIZE),
            })
        } else {
            Ok(())
        }
    }

    /// Stores are limited to the program area
    fn check_writable(&self, start: usize, len: usize) -> Result<(), Fault> {
        if start < PROGRAM_START {
            return Err(Fault::ReservedWrite { address: start });
        }
        self.check_range(start, len)
    }

    fn skip_if(&mut self, condition: bool) -> Step {
        if condition {
            self.pc = self.pc.wrapping_add(2);
        }
        Ok(())
    }

    /// Address of the instruction being executed
    fn current(&self) -> u16 {
        self.pc.wrapping_sub(2)
    }
}

// OpCodes impls
impl<C: Context> Vip8<C> {
    #[rustfmt::skip]
    fn execute(&mut self, opcode: OpCode) -> Step {
        match opcode {
            OpCode::_0NNN { nnn }     => self.exec_ml_subroutine_at(nnn),
            OpCode::_00E0             => self.clear_screen(),
            OpCode::_00EE             => self.subroutine_return(),
            OpCode::_1NNN { nnn }     => self.jump_to(nnn),
            OpCode::_2NNN { nnn }     => self.exec_subroutine_at(nnn),
            OpCode::_3XNN { x, nn }   => self.skip_if_vx_eq_nn(x, nn),
            OpCode::_4XNN { x, nn }   => self.skip_if_vx_ne_nn(x, nn),
            OpCode::_5XY0 { x, y }    => self.skip_if_vx_eq_vy(x, y),
            OpCode::_6XNN { x, nn }   => self.assign_vx_nn(x, nn),
            OpCode::_7XNN { x, nn }   => self.assign_add_vx_nn(x, nn),
            OpCode::_8XY0 { x, y }    => self.assign_vx_vy(x, y),
            OpCode::_8XY1 { x, y }    => self.assign_or_vx_vy(x, y),
            OpCode::_8XY2 { x, y }    => self.assign_and_vx_vy(x, y),
            OpCode::_8XY3 { x, y }    => self.assign_xor_vx_vy(x, y),
            OpCode::_8XY4 { x, y }    => self.assign_add_vx_vy(x, y),
            OpCode::_8XY5 { x, y }    => self.assign_sub_vx_vy(x, y),
            OpCode::_8XY6 { x, .. }   => self.assign_vx_shifted_r(x),
            OpCode::_8XY7 { x, y }    => self.assign_vx_vy_sub_vx(x, y),
            OpCode::_8XYE { x, .. }   => self.assign_vx_shifted_l(x),
            OpCode::_9XY0 { x, y }    => self.skip_if_vx_ne_vy(x, y),
            OpCode::_ANNN { nnn }     => self.assign_i_nnn(nnn),
            OpCode::_BNNN { nnn }     => self.jump_to_nnn_add_v0(nnn),
            OpCode::_CXNN { x, nn }   => self.assign_vx_random_and_nn(x, nn),
            OpCode::_DXYN { x, y, n } => self.draw_n_at_vx_vy(x, y, n),
            OpCode::_EX9E { x }       => self.skip_if_vx_in_keys(x),
            OpCode::_EXA1 { x }       => self.skip_if_vx_not_in_keys(x),
            OpCode::_FX07 { x }       => self.assign_vx_delay_t(x),
            OpCode::_FX0A { x }       => self.assign_vx_wait_for_key(x),
            OpCode::_FX15 { x }       => self.assign_delay_t_vx(x),
            OpCode::_FX18 { x }       => self.assign_sound_t_vx(x),
            OpCode::_FX1E { x }       => self.assign_add_i_vx(x),
            OpCode::_FX29 { x }       => self.assign_i_addr_of_sprite_vx(x),
            OpCode::_FX33 { x }       => self.assign_mem_at_i_bcd_of_vx(x),
            OpCode::_FX55 { x }       => self.assign_mem_at_i_v0_to_vx(x),
            OpCode::_FX65 { x }       => self.assign_v0_to_vx_mem_at_i(x),
        }
    }

    /// Execute machine language subroutine at address NNN
    /// 0NNN { nnn: u16 },
    fn exec_ml_subroutine_at(&mut self, nnn: u16) -> Step {
        warn!(
            "Machine language routine at {:#05X} is not supported; pc:={:#05X}",
            nnn,
            self.current()
        );
        Ok(())
    }

    /// Clear the screen
    /// 00E0,
    fn clear_screen(&mut self) -> Step {
        self.frame.clear();
        Ok(())
    }

    /// Return from a subroutine
    /// 00EE,
    fn subroutine_return(&mut self) -> Step {
        let pc = self.current();
        let addr = self.stack.pop().ok_or(Fault::StackUnderflow { pc })?;
        self.pc = addr;
        Ok(())
    }

    /// Jump to address NNN
    /// 1NNN { nnn: u16 },
    fn jump_to(&mut self, nnn: u16) -> Step {
        self.pc = nnn;
        Ok(())
    }

    /// Execute subroutine starting at address NNN
    /// 2NNN { nnn: u16 },
    fn exec_subroutine_at(&mut self, nnn: u16) -> Step {
        let pc = self.current();
        self.stack
            .push(self.pc)
            .map_err(|_| Fault::StackOverflow { pc })?;
        self.pc = nnn;
        Ok(())
    }

    /// Skip the following instruction if the value of register VX equals NN
    /// 3XNN { x: u8, nn: u8 },
    fn skip_if_vx_eq_nn(&mut self, x: u8, nn: u8) -> Step {
        self.skip_if(self.v[x as usize] == nn)
    }

    /// Skip the following instruction if the value of register VX is not equal to NN
    /// 4XNN { x: u8, nn: u8 },
    fn skip_if_vx_ne_nn(&mut self, x: u8, nn: u8) -> Step {
        self.skip_if(self.v[x as usize] != nn)
    }

    /// Skip the following instruction if the value of register VX is equal to the value of register VY
    /// 5XY0 { x: u8, y: u8 },
    fn skip_if_vx_eq_vy(&mut self, x: u8, y: u8) -> Step {
        self.skip_if(self.v[x as usize] == self.v[y as usize])
    }

    /// Store number NN in register VX
    /// 6XNN { x: u8, nn: u8 },
    fn assign_vx_nn(&mut self, x: u8, nn: u8) -> Step {
        self.v[x as usize] = nn;
        Ok(())
    }

    /// Add the value NN to register VX
    /// 7XNN { x: u8, nn: u8 },
    fn assign_add_vx_nn(&mut self, x: u8, nn: u8) -> Step {
        self.v[x as usize] = self.v[x as usize].wrapping_add(nn);
        Ok(())
    }

    /// Store the value of register VY in register VX
    /// 8XY0 { x: u8, y: u8 },
    fn assign_vx_vy(&mut self, x: u8, y: u8) -> Step {
        self.v[x as usize] = self.v[y as usize];
        Ok(())
    }

    /// Set VX to VX OR VY
    /// 8XY1 { x: u8, y: u8 },
    fn assign_or_vx_vy(&mut self, x: u8, y: u8) -> Step {
        self.v[x as usize] |= self.v[y as usize];
        Ok(())
    }

    /// Set VX to VX AND VY
    /// 8XY2 { x: u8, y: u8 },
    fn assign_and_vx_vy(&mut self, x: u8, y: u8) -> Step {
        self.v[x as usize] &= self.v[y as usize];
        Ok(())
    }

    /// Set VX to VX XOR VY
    /// 8XY3 { x: u8, y: u8 },
    fn assign_xor_vx_vy(&mut self, x: u8, y: u8) -> Step {
        self.v[x as usize] ^= self.v[y as usize];
        Ok(())
    }

    // Flag-setting ops write VF before VX, so with X = F the result wins.

    /// Add the value of register VY to register VX, Set VF to 01 if a carry occurs, Set VF to 00 if a carry does not occur
    /// 8XY4 { x: u8, y: u8 },
    fn assign_add_vx_vy(&mut self, x: u8, y: u8) -> Step {
        let (value, carry) = self.v[x as usize].overflowing_add(self.v[y as usize]);
        self.v[VF] = carry as u8;
        self.v[x as usize] = value;
        Ok(())
    }

    /// Subtract the value of register VY from register VX, Set VF to 01 if VX is greater than VY, Set VF to 00 otherwise
    /// 8XY5 { x: u8, y: u8 },
    fn assign_sub_vx_vy(&mut self, x: u8, y: u8) -> Step {
        self.v[VF] = (self.v[x as usize] > self.v[y as usize]) as u8;
        self.v[x as usize] = self.v[x as usize].wrapping_sub(self.v[y as usize]);
        Ok(())
    }

    /// Shift register VX right by one bit, Set register VF to the least significant bit prior to the shift
    /// 8XY6 { x: u8, y: u8 },
    fn assign_vx_shifted_r(&mut self, x: u8) -> Step {
        self.v[VF] = self.v[x as usize] & 1u8;
        self.v[x as usize] >>= 1;
        Ok(())
    }

    /// Set register VX to the value of VY minus VX, Set VF to 01 if VY is greater than VX, Set VF to 00 otherwise
    /// 8XY7 { x: u8, y: u8 },
    fn assign_vx_vy_sub_vx(&mut self, x: u8, y: u8) -> Step {
        self.v[VF] = (self.v[y as usize] > self.v[x as usize]) as u8;
        self.v[x as usize] = self.v[y as usize].wrapping_sub(self.v[x as usize]);
        Ok(())
    }

    /// Shift register VX left by one bit, Set register VF to the most significant bit prior to the shift
    /// 8XYE { x: u8, y: u8 },
    fn assign_vx_shifted_l(&mut self, x: u8) -> Step {
        self.v[VF] = (self.v[x as usize] >> 7) & 1u8;
        self.v[x as usize] <<= 1;
        Ok(())
    }

    /// Skip the following instruction if the value of register VX is not equal to the value of register VY
    /// 9XY0 { x: u8, y: u8 },
    fn skip_if_vx_ne_vy(&mut self, x: u8, y: u8) -> Step {
        self.skip_if(self.v[x as usize] != self.v[y as usize])
    }

    /// Store memory address NNN in register I
    /// ANNN { nnn: u16 },
    fn assign_i_nnn(&mut self, nnn: u16) -> Step {
        self.i = nnn;
        Ok(())
    }

    /// Jump to address NNN + V0
    /// BNNN { nnn: u16 },
    fn jump_to_nnn_add_v0(&mut self, nnn: u16) -> Step {
        self.pc = nnn + self.v[0] as u16;
        Ok(())
    }

    /// Set VX to a random number with a mask of NN
    /// CXNN { x: u8, nn: u8 },
    fn assign_vx_random_and_nn(&mut self, x: u8, nn: u8) -> Step {
        self.v[x as usize] = self.ctx.gen_random() & nn;
        Ok(())
    }

    /// Draw a sprite at position VX, VY with N bytes of sprite data starting at the address stored in I, Set VF to 01 if any set pixels are changed to unset, and 00 otherwise
    /// DXYN { x: u8, y: u8, n: u8 },
    ///
    /// Pixels falling outside of the screen are dropped, the sprite does not wrap.
    fn draw_n_at_vx_vy(&mut self, x: u8, y: u8, n: u8) -> Step {
        let start = self.i as usize;
        self.check_range(start, n as usize)?;
        let (vx, vy) = (self.v[x as usize] as usize, self.v[y as usize] as usize);

        let mut collision = false;
        for (row, &sprite) in self.memory[start..start + n as usize].iter().enumerate() {
            for col in 0..8 {
                if sprite & (0x80u8 >> col) != 0 {
                    if let Some(true) = self.frame.xor_bit(vx + col, vy + row, true) {
                        collision = true;
                    }
                }
            }
        }
        self.v[VF] = collision as u8;
        Ok(())
    }

    fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is pressed
    /// EX9E { x: u8 },
    fn skip_if_vx_in_keys(&mut self, x: u8) -> Step {
        self.skip_if(self.is_pressed(self.v[x as usize]))
    }

    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is not pressed
    /// EXA1 { x: u8 },
    fn skip_if_vx_not_in_keys(&mut self, x: u8) -> Step {
        self.skip_if(!self.is_pressed(self.v[x as usize]))
    }

    /// Store the current value of the delay timer in register VX
    /// FX07 { x: u8 },
    fn assign_vx_delay_t(&mut self, x: u8) -> Step {
        self.v[x as usize] = self.delay_timer.load();
        Ok(())
    }

    /// Wait for a keypress and store the result in register VX
    /// FX0A { x: u8 },
    ///
    /// Doesn't block the caller: pc is rewound so the instruction is fetched
    /// again until a key is down.
    fn assign_vx_wait_for_key(&mut self, x: u8) -> Step {
        match self.keys.iter().position(|&pressed| pressed) {
            Some(key) => {
                self.v[x as usize] = key as u8;
                Ok(())
            }
            None => {
                self.pc = self.current();
                trace!("waiting for key; pc:={:#05X}", self.pc);
                Err(nb::Error::WouldBlock)
            }
        }
    }

    /// Set the delay timer to the value of register VX
    /// FX15 { x: u8 },
    fn assign_delay_t_vx(&mut self, x: u8) -> Step {
        self.delay_timer.store(self.v[x as usize]);
        Ok(())
    }

    /// Set the sound timer to the value of register VX
    /// FX18 { x: u8 },
    fn assign_sound_t_vx(&mut self, x: u8) -> Step {
        self.sound_timer.store(self.v[x as usize]);
        Ok(())
    }

    /// Add the value stored in register VX to register I
    /// FX1E { x: u8 },
    fn assign_add_i_vx(&mut self, x: u8) -> Step {
        self.i = self.i.wrapping_add(self.v[x as usize] as u16);
        Ok(())
    }

    /// Set I to the memory address of the sprite data corresponding to the hexadecimal digit stored in register VX
    /// FX29 { x: u8 },
    fn assign_i_addr_of_sprite_vx(&mut self, x: u8) -> Step {
        self.i = glyph_address(self.v[x as usize]);
        Ok(())
    }

    /// Store the binary-coded decimal equivalent of the value stored in register VX at addresses I, I+1, and I+2
    /// FX33 { x: u8 },
    fn assign_mem_at_i_bcd_of_vx(&mut self, x: u8) -> Step {
        let i = self.i as usize;
        self.check_writable(i, 3)?;
        let value = self.v[x as usize];
        self.memory[i] = value / 100u8;
        self.memory[i + 1] = (value / 10u8) % 10u8;
        self.memory[i + 2] = value % 10u8;
        Ok(())
    }

    /// Store the values of registers V0 to VX inclusive in memory starting at address I, I is left unchanged
    /// FX55 { x: u8 },
    fn assign_mem_at_i_v0_to_vx(&mut self, x: u8) -> Step {
        let (i, len) = (self.i as usize, x as usize + 1);
        self.check_writable(i, len)?;
        self.memory[i..i + len].copy_from_slice(&self.v[..len]);
        Ok(())
    }

    /// Fill registers V0 to VX inclusive with the values stored in memory starting at address I, I is left unchanged
    /// FX65 { x: u8 },
    fn assign_v0_to_vx_mem_at_i(&mut self, x: u8) -> Step {
        let (i, len) = (self.i as usize, x as usize + 1);
        self.check_range(i, len)?;
        self.v[..len].copy_from_slice(&self.memory[i..i + len]);
        Ok(())
    }
}
