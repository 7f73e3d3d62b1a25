#[cfg(test)]
pub mod testing {
    use core::fmt;
    use core::ops::RangeBounds;
    use std::format;
    use std::string::String;
    use std::sync::Mutex;
    use std::vec::Vec;

    use crate::frame::{FrameView, HEIGHT, WIDTH};

    /// Compare only the selected window of two masks
    #[macro_export]
    macro_rules! assert_eq_2d {
        (x_range: $xrange:expr, y_range: $yrange:expr; $lhs:expr, $rhs:expr $(,)?) => {{
            let mut lhs_mask = crate::utils::testing::ImageMask::new();
            let mut rhs_mask = crate::utils::testing::ImageMask::new();
            lhs_mask.set_slice($xrange, $yrange, &$lhs);
            rhs_mask.set_slice($xrange, $yrange, &$rhs);
            assert_eq!(lhs_mask, rhs_mask);
        }};
    }

    #[derive(Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ImageMask([[bool; WIDTH]; HEIGHT]);

    impl ImageMask {
        pub fn new() -> Self {
            Self([[false; WIDTH]; HEIGHT])
        }

        pub fn set_slice<T>(&mut self, range_x: T, range_y: T, other: &Self)
        where
            T: RangeBounds<usize>,
        {
            for y in 0..HEIGHT {
                for x in 0..WIDTH {
                    if range_x.contains(&x) && range_y.contains(&y) {
                        self.0[y][x] = other.0[y][x];
                    }
                }
            }
        }
    }

    impl fmt::Debug for ImageMask {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let width = WIDTH + 2;
            writeln!(f)?;
            for _ in 0..width {
                write!(f, "-")?;
            }
            writeln!(f)?;
            for row in &self.0 {
                write!(f, "|")?;
                for &p in row.iter() {
                    write!(f, "{}", if p { '#' } else { '.' })?;
                }
                writeln!(f, "|")?;
            }
            for _ in 0..width {
                write!(f, "-")?;
            }
            Ok(())
        }
    }

    /// Keeps every `error!` record, from all tests of the binary
    struct ErrorCapture(Mutex<Vec<String>>);

    impl log::Log for ErrorCapture {
        fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
            metadata.level() <= log::Level::Error
        }

        fn log(&self, record: &log::Record<'_>) {
            if self.enabled(record.metadata()) {
                if let Ok(mut lines) = self.0.lock() {
                    lines.push(format!("{}", record.args()));
                }
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: ErrorCapture = ErrorCapture(Mutex::new(Vec::new()));

    pub fn capture_errors() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Error);
    }

    pub fn captured_errors() -> Vec<String> {
        CAPTURE.0.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    pub trait ToMask {
        fn to_mask(&self) -> ImageMask;
    }

    /// Rows separated by whitespace, `#` marks a set pixel. Missing rows and
    /// columns are clear.
    impl ToMask for str {
        fn to_mask(&self) -> ImageMask {
            let mut mask = ImageMask::new();
            mask.0
                .iter_mut()
                .zip(self.split_whitespace())
                .for_each(|(m_row, c_row)| {
                    m_row
                        .iter_mut()
                        .zip(c_row.chars())
                        .for_each(|(m, c)| *m = c == '#')
                });
            mask
        }
    }

    impl<'a> ToMask for FrameView<'a> {
        fn to_mask(&self) -> ImageMask {
            let mut mask = ImageMask::new();
            self.iter_rows_as_bitslices()
                .zip(mask.0.iter_mut())
                .for_each(|(f_row, m_row)| {
                    m_row
                        .iter_mut()
                        .zip(f_row.iter().by_vals())
                        .for_each(|(m, f)| *m = f)
                });
            mask
        }
    }

    mod tests {
        use super::*;
        use crate::frame::Frame;

        #[test]
        fn to_image_mask() {
            let mut frame = Frame::new();
            assert_eq!(ImageMask::new(), frame.view().to_mask());

            frame.xor_bit(0, 0, true);
            frame.xor_bit(2, 1, true);
            assert_eq!("#...\n..#.".to_mask(), frame.view().to_mask());
        }

        #[test]
        fn compare_window() {
            let lhs = "##..\n....".to_mask();
            let rhs = "#...\n....".to_mask();
            assert_eq_2d!(x_range: 0..1, y_range: 0..2; lhs, rhs);
        }
    }
}
