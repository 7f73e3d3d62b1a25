//! A CHIP-8 virtual machine.
//!
//! The engine owns the whole machine state (memory, registers, call stack,
//! timers, keypad and framebuffer) and executes one instruction per
//! [`Vip8::tick_chip`] call. Timers decay only through [`Vip8::tick_timers`],
//! which the host is expected to call at 60 Hz regardless of the CPU rate.
//!
//! ```
//! use vip8::{SeededContext, Vip8};
//!
//! let mut chip = Vip8::new(SeededContext::new(0));
//! // 6A2A: VA = 0x2A
//! chip.load_rom(&[0x6A, 0x2A]).unwrap();
//! chip.tick_chip().unwrap();
//! assert_eq!(chip.v(0xA), 0x2A);
//! ```
#![no_std]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod builder;
pub mod context;
pub mod error;
pub mod font;
pub mod frame;
pub mod opcode;
pub mod rom;
pub mod timer;
pub mod utils;
pub mod vip8;

pub use builder::Builder;
pub use context::{Context, SeededContext};
pub use error::{Error, Fault};
pub use frame::{FrameView, HEIGHT, WIDTH};
pub use opcode::OpCode;
pub use vip8::Vip8;
