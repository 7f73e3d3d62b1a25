use crate::context::Context;
use crate::error::Error;
use crate::vip8::Vip8;

/// Assembles a machine with a context and a program loaded
///
/// ```
/// use vip8::{Builder, SeededContext};
///
/// let chip = Builder::new()
///     .with_context(SeededContext::new(7))
///     .with_program(&[0x00, 0xE0])
///     .build()
///     .unwrap();
/// assert_eq!(&chip.memory()[0x200..0x202], &[0x00, 0xE0]);
/// ```
pub struct Builder<'a, C: Context> {
    context: Option<C>,
    program: Option<&'a [u8]>,
}

impl<'a, C: Context> Builder<'a, C> {
    pub fn new() -> Self {
        Self {
            context: None,
            program: None,
        }
    }

    pub fn with_context(mut self, ctx: C) -> Self {
        self.context = Some(ctx);
        self
    }

    pub fn with_program(mut self, prog: &'a [u8]) -> Self {
        self.program = Some(prog);
        self
    }

    pub fn build(self) -> Result<Vip8<C>, Error> {
        let context = self.context.ok_or(Error::MissingContext)?;
        let program = self.program.ok_or(Error::MissingProgram)?;
        let mut chip = Vip8::new(context);
        chip.load_rom(program)?;
        Ok(chip)
    }
}

impl<'a, C: Context> Default for Builder<'a, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::TestingContext;
    use crate::rom::ROM_CAPACITY;

    #[test]
    fn with_context_and_prog() {
        let result = Builder::new()
            .with_context(TestingContext::new(0))
            .with_program(&[])
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn with_context_only() {
        let result = Builder::new().with_context(TestingContext::new(0)).build();
        assert!(matches!(result, Err(Error::MissingProgram)));
    }

    #[test]
    fn with_program_only() {
        let result = Builder::<'_, TestingContext>::new()
            .with_program(&[])
            .build();
        assert!(matches!(result, Err(Error::MissingContext)));
    }

    #[test]
    fn with_oversized_program() {
        let rom = [0u8; ROM_CAPACITY + 1];
        let result = Builder::new()
            .with_context(TestingContext::new(0))
            .with_program(&rom)
            .build();
        assert!(matches!(result, Err(Error::RomTooLarge { .. })));
    }
}
