use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

pub const DEFAULT_IPS: u32 = 500;
pub const DEFAULT_TIMER_HZ: u32 = 60;
pub const DEFAULT_DURATION_MS: u64 = 1000;

/// Run a CHIP-8 program headlessly and print the final frame
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Path to the ROM file to run
    #[arg(short, long)]
    pub rom: PathBuf,

    /// Instructions executed per second
    #[arg(short, long, default_value_t = DEFAULT_IPS, value_parser = clap::value_parser!(u32).range(1..))]
    pub ips: u32,

    /// Delay and sound timer rate
    #[arg(long, default_value_t = DEFAULT_TIMER_HZ, value_parser = clap::value_parser!(u32).range(1..))]
    pub timer_hz: u32,

    /// How long to run before printing the frame
    #[arg(short, long, default_value_t = DEFAULT_DURATION_MS)]
    pub duration_ms: u64,

    /// Seed of the random source used by CXNN
    #[arg(short, long, default_value_t = 0)]
    pub seed: u64,

    /// Keys held down for the whole run, as hex digits: `--keys 1,a,f`
    #[arg(short, long, value_delimiter = ',', value_parser = parse_key)]
    pub keys: Vec<u8>,

    /// Minimal severity of printed log messages
    #[arg(short, long, default_value = "info")]
    pub log_level: LevelFilter,
}

fn parse_key(s: &str) -> Result<u8, String> {
    match u8::from_str_radix(s.trim_start_matches("0x"), 16) {
        Ok(key) if key <= 0xF => Ok(key),
        _ => Err(format!("`{}` is not a key, expected 0-F", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["vip8", "--rom", "pong.ch8"]).unwrap();
        assert_eq!(config.rom, PathBuf::from("pong.ch8"));
        assert_eq!(config.ips, 500);
        assert_eq!(config.timer_hz, 60);
        assert_eq!(config.duration_ms, 1000);
        assert_eq!(config.seed, 0);
        assert!(config.keys.is_empty());
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn all_flags() {
        let config = Config::try_parse_from([
            "vip8",
            "--rom",
            "a.ch8",
            "--ips",
            "1000",
            "--timer-hz",
            "50",
            "--duration-ms",
            "20",
            "--seed",
            "7",
            "--keys",
            "1,a,F",
            "--log-level",
            "trace",
        ])
        .unwrap();
        assert_eq!(config.ips, 1000);
        assert_eq!(config.timer_hz, 50);
        assert_eq!(config.duration_ms, 20);
        assert_eq!(config.seed, 7);
        assert_eq!(config.keys, vec![0x1, 0xA, 0xF]);
        assert_eq!(config.log_level, LevelFilter::Trace);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::try_parse_from(["vip8"]).is_err());
        assert!(Config::try_parse_from(["vip8", "-r", "a", "--keys", "10"]).is_err());
        assert!(Config::try_parse_from(["vip8", "-r", "a", "--keys", "g"]).is_err());
        assert!(Config::try_parse_from(["vip8", "-r", "a", "--ips", "0"]).is_err());
        assert!(Config::try_parse_from(["vip8", "-r", "a", "--log-level", "loud"]).is_err());
    }
}
