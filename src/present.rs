//! Terminal presentation (spec §2, §6 `[AMBIENT]`): the teacher's
//! `crossterm`-based braille/true-color/half-block/ASCII display engine
//! and progress bar, reused verbatim against the new [`Framebuffer`] so
//! the CLI's interactive feel survives the transformation.

use crate::dispatch::Framebuffer;
use crossterm::style::{self, Stylize};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputMode {
    Braille,
    TrueColor,
    HalfBlock,
    Ascii,
}

pub fn display_framebuffer(fb: &Framebuffer, mode: OutputMode) {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    match mode {
        OutputMode::TrueColor => display_truecolor(&mut out, fb),
        OutputMode::HalfBlock => display_halfblock(&mut out, fb),
        OutputMode::Ascii => display_ascii(&mut out, fb),
        OutputMode::Braille => display_braille(&mut out, fb),
    }
    let _ = out.flush();
}

fn display_truecolor(out: &mut impl Write, fb: &Framebuffer) {
    for y in 0..fb.height {
        for x in 0..fb.width {
            let (r, g, b) = fb.get(x, y).to_rgb8();
            let _ = write!(out, "{}", "█".with(style::Color::Rgb { r, g, b }));
        }
        let _ = writeln!(out);
    }
}

fn display_halfblock(out: &mut impl Write, fb: &Framebuffer) {
    let rows = fb.height / 2;
    for row in 0..rows {
        for x in 0..fb.width {
            let (tr, tg, tb) = fb.get(x, row * 2).to_rgb8();
            let (br, bg, bb) = fb.get(x, row * 2 + 1).to_rgb8();
            let _ = write!(
                out,
                "{}",
                "▀"
                    .with(style::Color::Rgb {
                        r: tr,
                        g: tg,
                        b: tb
                    })
                    .on(style::Color::Rgb {
                        r: br,
                        g: bg,
                        b: bb
                    })
            );
        }
        let _ = writeln!(out);
    }
}

fn display_ascii(out: &mut impl Write, fb: &Framebuffer) {
    const RAMP: &[u8] = b" .:-=+*#%@";
    for y in 0..fb.height {
        for x in 0..fb.width {
            let c = fb.get(x, y);
            let lum = 0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z;
            let idx = (lum.clamp(0.0, 0.999) * RAMP.len() as f64) as usize;
            let _ = write!(out, "{}", RAMP[idx] as char);
        }
        let _ = writeln!(out);
    }
}

/// Braille pattern rendering — each Unicode braille char (U+2800..U+28FF)
/// encodes a 2x4 dot matrix, achieving 2x horizontal and 4x vertical
/// subpixel resolution.
fn display_braille(out: &mut impl Write, fb: &Framebuffer) {
    let cell_w = 2u32;
    let cell_h = 4u32;
    let cols = fb.width / cell_w;
    let rows = fb.height / cell_h;

    for row in 0..rows {
        for col in 0..cols {
            let bx = col * cell_w;
            let by = row * cell_h;

            let mut pattern: u8 = 0;
            let mut avg_color = crate::math::Color::zero();
            let mut lit_count = 0u32;

            let offsets: [(u32, u32, u8); 8] = [
                (0, 0, 0),
                (0, 1, 1),
                (0, 2, 2),
                (1, 0, 3),
                (1, 1, 4),
                (1, 2, 5),
                (0, 3, 6),
                (1, 3, 7),
            ];

            for &(dx, dy, bit) in &offsets {
                let px = bx + dx;
                let py = by + dy;
                if px < fb.width && py < fb.height {
                    let c = fb.get(px, py);
                    let lum = 0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z;
                    if lum > 0.15 {
                        pattern |= 1 << bit;
                        avg_color += c;
                        lit_count += 1;
                    }
                }
            }

            if lit_count > 0 {
                avg_color /= lit_count as f64;
            }

            let braille_char = char::from_u32(0x2800 + pattern as u32).unwrap_or(' ');
            let (r, g, b) = avg_color.to_rgb8();
            let _ = write!(
                out,
                "{}",
                braille_char.to_string().with(style::Color::Rgb { r, g, b })
            );
        }
        let _ = writeln!(out);
    }
}

/// A progress bar rendered to stderr with percentage and ETA, driven by
/// the dispatcher's progress callback.
pub struct ProgressBar {
    total_columns: u32,
    bar_width: usize,
    last_pct: u32,
}

impl ProgressBar {
    pub fn new(total_columns: u32) -> Self {
        Self {
            total_columns,
            bar_width: 24,
            last_pct: u32::MAX,
        }
    }

    pub fn update(&mut self, pct: u32, elapsed_secs: f64) {
        if pct == self.last_pct {
            return;
        }
        self.last_pct = pct;
        let filled = (pct as usize * self.bar_width) / 100;
        let empty = self.bar_width - filled;
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(empty));
        let rate = if elapsed_secs > 0.0 {
            (pct as f64 / 100.0 * self.total_columns as f64) / elapsed_secs
        } else {
            0.0
        };
        let remaining = if rate > 0.0 {
            (self.total_columns as f64 * (1.0 - pct as f64 / 100.0)) / rate
        } else {
            0.0
        };
        eprint!("\r  Rendering: │{bar}│ {pct:3}%  ETA {remaining:.0}s   ");
        let _ = io::stderr().flush();
    }

    pub fn finish(&self, elapsed_secs: f64) {
        let bar = "█".repeat(self.bar_width);
        eprintln!("\r  Rendering: │{bar}│ 100%  {elapsed_secs:.2}s       ");
    }
}
