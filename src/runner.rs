//! Paces the engine against wall time without any display or audio device.
//!
//! The CPU and the timers run on independent periods: `tick_chip` at
//! `Config::ips` and `tick_timers` at `Config::timer_hz`. A run ends when
//! the configured duration elapses or the program faults.

use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use log::{debug, info};
use vip8::{Context, Fault, FrameView, SeededContext, Vip8, HEIGHT, WIDTH};

use crate::config::Config;

/// Context with a seeded random source and a sound flag instead of a speaker
pub struct HeadlessContext {
    rng: SeededContext,
    sound: bool,
    beeps: usize,
}

impl HeadlessContext {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SeededContext::new(seed as u128),
            sound: false,
            beeps: 0,
        }
    }

    pub fn is_sound_on(&self) -> bool {
        self.sound
    }

    /// Number of times the sound went from off to on
    pub fn beeps(&self) -> usize {
        self.beeps
    }
}

impl Context for HeadlessContext {
    fn gen_random(&mut self) -> u8 {
        self.rng.gen_random()
    }

    fn sound_on(&mut self) {
        if !self.sound {
            debug!("beep");
            self.beeps += 1;
        }
        self.sound = true;
    }

    fn sound_off(&mut self) {
        self.sound = false;
    }
}

/// What a finished run looked like
#[derive(Debug)]
pub struct Report {
    /// Final frame, see [`render`]
    pub frame: String,
    pub cycles: u64,
    pub timer_ticks: u64,
    pub beeps: usize,
    /// Set when the run was cut short by the program
    pub fault: Option<Fault>,
}

/// Load the configured ROM and run it
pub fn run(config: &Config) -> anyhow::Result<Report> {
    let mut chip = Vip8::new(HeadlessContext::new(config.seed));
    chip.load_rom_file(&config.rom)
        .with_context(|| format!("Failed to load {}", config.rom.display()))?;
    Ok(run_loaded(&mut chip, config))
}

/// Run an already loaded machine
pub fn run_loaded(chip: &mut Vip8<HeadlessContext>, config: &Config) -> Report {
    for &key in config.keys.iter() {
        chip.set_key(key, true);
    }

    let cpu_period = Duration::from_nanos(1_000_000_000 / u64::from(config.ips.max(1)));
    let timer_period = Duration::from_nanos(1_000_000_000 / u64::from(config.timer_hz.max(1)));
    let started = Instant::now();
    let deadline = started + Duration::from_millis(config.duration_ms);
    let (mut next_cycle, mut next_timer) = (started, started + timer_period);
    let (mut cycles, mut timer_ticks) = (0u64, 0u64);
    let mut fault = None;

    info!(
        "running at {} ips, timers at {} Hz for {} ms",
        config.ips, config.timer_hz, config.duration_ms
    );
    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        if now >= next_timer {
            chip.tick_timers();
            timer_ticks += 1;
            next_timer += timer_period;
        }
        if now >= next_cycle {
            match chip.tick_chip() {
                Ok(()) | Err(nb::Error::WouldBlock) => cycles += 1,
                Err(nb::Error::Other(f)) => {
                    fault = Some(f);
                    break;
                }
            }
            next_cycle += cpu_period;
        }
        let wake = next_cycle.min(next_timer).min(deadline);
        if let Some(pause) = wake.checked_duration_since(Instant::now()) {
            sleep(pause);
        }
    }
    info!("stopped after {} cycles, {} timer ticks", cycles, timer_ticks);

    Report {
        frame: render(chip.frame()),
        cycles,
        timer_ticks,
        beeps: chip.ctx().beeps(),
        fault,
    }
}

/// Draw the frame as text, `#` for set and `.` for clear pixels, one row per line
pub fn render(frame: FrameView<'_>) -> String {
    let mut out = String::with_capacity((WIDTH + 1) * HEIGHT);
    for (index, pixel) in frame.iter_pixels().enumerate() {
        out.push(if pixel { '#' } else { '.' });
        if index % WIDTH == WIDTH - 1 {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(duration_ms: u64) -> Config {
        Config {
            rom: PathBuf::new(),
            ips: 1000,
            timer_hz: 60,
            duration_ms,
            seed: 0,
            keys: vec![],
            log_level: log::LevelFilter::Info,
        }
    }

    fn loaded(program: &[u8]) -> Vip8<HeadlessContext> {
        let mut chip = Vip8::new(HeadlessContext::new(0));
        chip.load_rom(program).unwrap();
        chip
    }

    #[test]
    fn renders_rows() {
        let chip = loaded(&[]);
        let text = render(chip.frame());
        assert_eq!(text.lines().count(), HEIGHT);
        assert!(text.lines().all(|row| row.len() == WIDTH && row.chars().all(|c| c == '.')));
    }

    #[test]
    fn draws_glyph() {
        #[rustfmt::skip]
        let mut chip = loaded(&[
            0x60, 0x01, // V0 = 1
            0xF0, 0x29, // I = glyph(V0)
            0xD1, 0x15, // draw at V1, V1
            0x12, 0x06, // jump 0x206
        ]);
        let report = run_loaded(&mut chip, &config(30));
        assert!(report.fault.is_none());
        assert!(report.cycles >= 4);

        let rows: Vec<_> = report.frame.lines().take(5).map(|row| &row[..8]).collect();
        assert_eq!(rows, ["..#.....", ".##.....", "..#.....", "..#.....", ".###...."]);
    }

    #[test]
    fn stops_on_fault() {
        let mut chip = loaded(&[0x00, 0xEE]);
        let started = Instant::now();
        let report = run_loaded(&mut chip, &config(5_000));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(report.fault, Some(Fault::StackUnderflow { pc: 0x200 }));
        assert_eq!(report.cycles, 0);
    }

    #[test]
    fn held_keys_release_key_wait() {
        #[rustfmt::skip]
        let mut chip = loaded(&[
            0xF4, 0x0A, // V4 = next key
            0x12, 0x02, // jump 0x202
        ]);
        let mut cfg = config(20);
        cfg.keys = vec![0xB];
        run_loaded(&mut chip, &cfg);
        assert_eq!(chip.v(4), 0xB);
        assert_eq!(chip.pc(), 0x202);
    }

    #[test]
    fn sound_is_reported() {
        #[rustfmt::skip]
        let mut chip = loaded(&[
            0x60, 0x02, // V0 = 2
            0xF0, 0x18, // ST = V0
            0x12, 0x04, // jump 0x204
        ]);
        let report = run_loaded(&mut chip, &config(100));
        assert_eq!(report.beeps, 1);
        assert!(report.timer_ticks >= 2);
        assert!(!chip.ctx().is_sound_on());
        assert_eq!(chip.sound_timer(), 0);
    }

    #[test]
    fn missing_rom_is_an_error() {
        let mut cfg = config(10);
        cfg.rom = PathBuf::from("/definitely/not/a/rom.ch8");
        let err = run(&cfg).unwrap_err();
        assert!(err.to_string().contains("Failed to load"));
    }
}
