use crate::math::Color;
use crossterm::style::{self, Stylize};
use std::io::{self, Write};

// ─── Framebuffer ────────────────────────────────────────────────────────────

pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::zero(); (width * height) as usize],
        }
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Writes the framebuffer as an ASCII PPM (P3) image: a `P3` header
    /// line, a `<width> <height>` line, a `255` maxval line, then one line
    /// of three space-separated integers per pixel, top row first.
    pub fn write_ppm(&self, path: &str) -> io::Result<()> {
        let mut file = io::BufWriter::new(std::fs::File::create(path)?);
        writeln!(file, "P3")?;
        writeln!(file, "{} {}", self.width, self.height)?;
        writeln!(file, "255")?;
        for pixel in &self.pixels {
            let (r, g, b) = pixel.to_rgb8();
            writeln!(file, "{r} {g} {b}")?;
        }
        file.flush()?;
        Ok(())
    }
}

// ─── Tone Mapping Operators ─────────────────────────────────────────────────

/// Tone mapping operators for HDR -> LDR conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneMapOp {
    /// No tone mapping — clamp to [0,1] directly.
    None,
    /// Reinhard global operator (2002): L_d = L / (1 + L).
    Reinhard,
    /// ACES filmic tone mapping (Narkowicz 2015 approximation).
    Aces,
    /// `round(255 * (1 - exp(-x))^(1/2.2))` per channel — the operator this
    /// crate defaults to.
    Photographic,
}

impl ToneMapOp {
    pub fn apply(self, color: Color) -> Color {
        match self {
            ToneMapOp::None => color,
            ToneMapOp::Reinhard => Color::new(
                color.x / (1.0 + color.x),
                color.y / (1.0 + color.y),
                color.z / (1.0 + color.z),
            ),
            ToneMapOp::Aces => {
                fn aces_channel(x: f64) -> f64 {
                    let a = 2.51;
                    let b = 0.03;
                    let c = 2.43;
                    let d = 0.59;
                    let e = 0.14;
                    ((x * (a * x + b)) / (x * (c * x + d) + e)).clamp(0.0, 1.0)
                }
                Color::new(aces_channel(color.x), aces_channel(color.y), aces_channel(color.z))
            }
            ToneMapOp::Photographic => {
                fn channel(x: f64) -> f64 {
                    (1.0 - (-x.max(0.0)).exp()).powf(1.0 / 2.2)
                }
                Color::new(channel(color.x), channel(color.y), channel(color.z))
            }
        }
    }
}

// ─── Render Statistics ──────────────────────────────────────────────────────

pub struct RenderStats {
    pub total_rays: u64,
    pub elapsed_secs: f64,
    pub width: u32,
    pub height: u32,
    pub spp: u32,
}

impl RenderStats {
    pub fn mrays_per_sec(&self) -> f64 {
        self.total_rays as f64 / self.elapsed_secs / 1e6
    }

    pub fn print_summary(&self) {
        let bar_width = 30;
        let fill = "━".repeat(bar_width);
        log::info!("{fill}");
        log::info!("Time:     {:.2}s", self.elapsed_secs);
        log::info!("Rays:     {:.2}M total", self.total_rays as f64 / 1e6);
        log::info!("Speed:    {:.2} Mrays/s", self.mrays_per_sec());
        log::info!("Image:    {}×{} @ {} spp", self.width, self.height, self.spp);
        log::info!("{fill}");
    }
}

// ─── Progress Reporter ──────────────────────────────────────────────────────

/// A Unicode progress bar rendered to stderr. Deliberately kept as
/// hand-rolled `eprint!` rather than a `log` call: this is an interactive
/// terminal UI element updated in place with `\r`, not a structured log
/// message.
pub struct ProgressBar {
    total: u64,
    done: u64,
    last_pct: u64,
    start: std::time::Instant,
}

impl ProgressBar {
    pub fn new(total: u64) -> Self {
        Self {
            total: total.max(1),
            done: 0,
            last_pct: 0,
            start: std::time::Instant::now(),
        }
    }

    pub fn tick_by(&mut self, n: u64) {
        self.done += n;
        let pct = (self.done * 100 / self.total).min(100);
        if pct != self.last_pct {
            let elapsed = self.start.elapsed().as_secs_f64();
            let rate = self.done as f64 / elapsed.max(1e-9);
            let remaining = (self.total - self.done) as f64 / rate.max(1e-9);
            let bar_width = 24;
            let filled = (pct as usize * bar_width) / 100;
            let empty = bar_width - filled;
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(empty));
            eprint!("\r  Rendering: │{bar}│ {pct:3}%  ETA {:.0}s   ", remaining);
            self.last_pct = pct;
        }
    }

    pub fn tick(&mut self) {
        self.tick_by(1);
    }

    pub fn finish(&self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        let bar = "█".repeat(24);
        eprintln!("\r  Rendering: │{bar}│ 100%  {:.2}s       ", elapsed);
    }
}

// ─── Terminal Display Engine ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    /// Unicode braille patterns (2x4 dots per cell) with ANSI true-color.
    Braille,
    /// ANSI 24-bit true-color using full-block characters.
    TrueColor,
    /// Half-block rendering with separate fg/bg colors — 2 vertical pixels per cell.
    HalfBlock,
    /// ASCII grayscale density ramp.
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
                    .with(style::Color::Rgb { r: tr, g: tg, b: tb })
                    .on(style::Color::Rgb { r: br, g: bg, b: bb })
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

/// Braille pattern rendering — each Unicode braille char (U+2800..U+28FF) encodes
/// a 2x4 dot matrix, achieving 2x horizontal and 4x vertical subpixel resolution.
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
            let mut avg_color = Color::zero();
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
            let _ = write!(out, "{}", braille_char.to_string().with(style::Color::Rgb { r, g, b }));
        }
        let _ = writeln!(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photographic_tone_map_stays_in_unit_range_for_large_input() {
        let c = ToneMapOp::Photographic.apply(Color::new(1000.0, 0.5, 0.0));
        assert!(c.x >= 0.0 && c.x <= 1.0);
        assert!(c.y >= 0.0 && c.y <= 1.0);
        assert!(c.z >= 0.0 && c.z <= 1.0);
    }

    #[test]
    fn reinhard_maps_zero_to_zero() {
        let c = ToneMapOp::Reinhard.apply(Color::zero());
        assert_eq!(c, Color::zero());
    }

    #[test]
    fn ppm_header_uses_ascii_p3() {
        let fb = Framebuffer::new(2, 1);
        let path = std::env::temp_dir().join("photon_cli_test_p3.ppm");
        fb.write_ppm(path.to_str().unwrap()).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("P3\n"));
        let _ = std::fs::remove_file(&path);
    }
}
