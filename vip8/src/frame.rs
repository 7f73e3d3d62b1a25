use bitvec::prelude::*;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
pub(crate) const MEM_LENGTH: usize = WIDTH * HEIGHT / 8;

/// An opaque struct holding frame of the display
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Frame([u8; MEM_LENGTH]);

/// A shared view over a `Frame`
///
/// Has different accessors for the content of frames, which can be used independently
/// to fulfill the needs.
///
/// Each pixel is represented either by a corresponding bit being set, or by `true` value.
/// Internally, the data is stored in a form of concatenating rows from top to bottom of the frame.
/// Rows are represented as an individual bits of continuous memory, matching the state of pixels
/// from left to the right.
///
/// The view is only valid until the next cycle borrows the machine mutably.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct FrameView<'a>(&'a [u8; MEM_LENGTH]);

impl<'a> FrameView<'a> {
    /// Access frame's bits by coordinates
    pub fn get_bit(&self, x: usize, y: usize) -> Option<bool> {
        self.iter_rows_as_bitslices()
            .nth(y)
            .and_then(|row| row.get(x).map(|bit| *bit))
    }

    /// Access frame's bits by row-major index `y * WIDTH + x`
    pub fn pixel(&self, index: usize) -> Option<bool> {
        self.0.view_bits::<Msb0>().get(index).map(|bit| *bit)
    }

    /// Get iterator over rows in a form of a `BitSlice`s
    pub fn iter_rows_as_bitslices(&self) -> impl Iterator<Item = &'a BitSlice<u8, Msb0>> {
        self.0.chunks(WIDTH / 8).map(|row| row.view_bits::<Msb0>())
    }

    /// Iter all pixels row by row, top-left first
    pub fn iter_pixels(&self) -> impl Iterator<Item = bool> + 'a {
        self.0.view_bits::<Msb0>().iter().by_vals()
    }

    /// Unpack the frame into one byte per pixel, each either 0 or 1
    pub fn to_bytes(&self) -> [u8; WIDTH * HEIGHT] {
        let mut bytes = [0; WIDTH * HEIGHT];
        bytes
            .iter_mut()
            .zip(self.iter_pixels())
            .for_each(|(byte, pixel)| *byte = pixel as u8);
        bytes
    }

    /// Number of pixels currently set
    pub fn count_set(&self) -> usize {
        self.0.view_bits::<Msb0>().count_ones()
    }
}

impl Frame {
    pub(crate) fn new() -> Self {
        Self([0; MEM_LENGTH])
    }

    /// Get view over frame
    pub fn view(&self) -> FrameView<'_> {
        FrameView(&self.0)
    }

    pub(crate) fn clear(&mut self) {
        self.0 = [0; MEM_LENGTH];
    }

    /// XOR a single pixel, returning whether a set pixel got erased
    ///
    /// Coordinates outside of the frame are ignored and yield `None`.
    pub(crate) fn xor_bit(&mut self, x: usize, y: usize, val: bool) -> Option<bool> {
        self.iter_rows_as_bitslices_mut()
            .nth(y)
            .and_then(|row| row.get_mut(x))
            .map(|mut bit| {
                let erased = *bit && val;
                *bit ^= val;
                erased
            })
    }

    pub(crate) fn iter_rows_as_bitslices_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut BitSlice<u8, Msb0>> {
        self.0
            .chunks_mut(WIDTH / 8)
            .map(|row| row.view_bits_mut::<Msb0>())
    }
}

#[cfg(test)]
impl Frame {
    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

#[cfg(test)]
mod frame_test {
    use super::*;

    #[test]
    fn get_bit() {
        let mut frame = Frame::new();
        frame.as_raw_mut()[0] = 0b1000_0000;

        assert_eq!(frame.view().get_bit(0, 0), Some(true));
        assert_eq!(frame.view().get_bit(1, 0), Some(false));
        assert_eq!(frame.view().get_bit(0, 1), Some(false));
        assert_eq!(frame.view().get_bit(WIDTH, 0), None);
        assert_eq!(frame.view().get_bit(0, HEIGHT), None);
    }

    #[test]
    fn xor_bit() {
        let mut frame = Frame::new();
        assert_eq!(frame.xor_bit(0, 0, false), Some(false));
        assert_eq!(frame.view().get_bit(0, 0), Some(false));
        assert_eq!(frame.xor_bit(0, 0, true), Some(false));
        assert_eq!(frame.view().get_bit(0, 0), Some(true));
        assert_eq!(frame.xor_bit(0, 0, false), Some(false));
        assert_eq!(frame.view().get_bit(0, 0), Some(true));
        assert_eq!(frame.xor_bit(0, 0, true), Some(true));
        assert_eq!(frame.view().get_bit(0, 0), Some(false));
    }

    #[test]
    fn xor_bit_out_of_bounds() {
        let mut frame = Frame::new();
        assert_eq!(frame.xor_bit(WIDTH, 0, true), None);
        assert_eq!(frame.xor_bit(0, HEIGHT, true), None);
        assert_eq!(frame.view().count_set(), 0);
    }

    #[test]
    fn row_major_pixels() {
        let mut frame = Frame::new();
        frame.xor_bit(3, 2, true);
        frame.xor_bit(63, 31, true);

        let bytes = frame.view().to_bytes();
        assert_eq!(bytes[2 * WIDTH + 3], 1);
        assert_eq!(bytes[WIDTH * HEIGHT - 1], 1);
        assert_eq!(bytes.iter().filter(|&&b| b == 1).count(), 2);
        assert_eq!(frame.view().pixel(2 * WIDTH + 3), Some(true));
        assert_eq!(frame.view().pixel(WIDTH * HEIGHT), None);
    }

    #[test]
    fn clear() {
        let mut frame = Frame::new();
        frame.as_raw_mut().iter_mut().for_each(|b| *b = 0xFF);
        assert_eq!(frame.view().count_set(), WIDTH * HEIGHT);
        frame.clear();
        assert_eq!(frame.view().count_set(), 0);
    }
}
