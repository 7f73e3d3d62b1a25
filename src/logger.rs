//! `[LEVEL][module] message` lines on stderr.

use std::io::{self, Write};

use env_logger::Builder;
use log::{LevelFilter, Record, SetLoggerError};

pub fn format(out: &mut dyn Write, record: &Record<'_>) -> io::Result<()> {
    writeln!(
        out,
        "[{:5}][{}] {}",
        record.level(),
        record.module_path().unwrap_or_else(|| record.target()),
        record.args()
    )
}

/// Logger builder showing records up to `level`
pub fn builder(level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .format(|buf, record| format(buf, record));
    builder
}

/// Install the logger globally, can be called only once per process
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    builder(level).try_init()
}
