use clap::Parser;
use log::error;

use vip8_run::{logger, runner, Config};

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logger::init(config.log_level)?;

    let report = runner::run(&config)?;
    print!("{}", report.frame);
    if let Some(fault) = report.fault {
        error!("program halted after {} cycles", report.cycles);
        return Err(fault.into());
    }
    Ok(())
}
