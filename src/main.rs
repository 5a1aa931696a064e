//! # photon-cli
//!
//! A physically based offline path tracer with photon-mapped global
//! illumination. Renders to a PPM file and/or directly to the terminal
//! using Unicode braille patterns and ANSI true-color escape codes.
//!
//! ## Pipeline
//!
//! 1. Build a scene (arena-indexed primitives/materials) and its BVH.
//! 2. If global illumination is enabled, run the photon pass: emit photons
//!    from the scene's area lights, random-walk them through the scene, and
//!    balance the deposited photons into a k-d tree (the photon map).
//! 3. Render: for every pixel, generate stratified samples, trace each
//!    camera ray, and on the first diffuse bounce consult the photon map's
//!    k-nearest-neighbor density estimate instead of further BSDF recursion.
//! 4. Tone-map and write the result to a PPM file and/or the terminal.

use clap::Parser;
use photon_cli::error::{PhotonError, Result};
use photon_cli::framebuffer::{display_framebuffer, OutputMode, ToneMapOp};
use photon_cli::integrator::{Integrator, RenderConfig};
use photon_cli::photon_map::PhotonMap;
use photon_cli::photon_tracer::{PhotonPass, PhotonPassConfig};
use photon_cli::presets::{self, ScenePreset};
use photon_cli::sampler::Sampler;

/// photon-cli — an offline path tracer with photon-mapped global illumination
#[derive(Parser, Debug)]
#[command(
    name = "photon-cli",
    version,
    about = "A physically based path tracer with photon-mapped global illumination",
    after_help = "EXAMPLES:\n  \
                  photon-cli --scene cornell --gi --max-photons 200000 --output cornell.ppm\n  \
                  photon-cli --scene showcase --mode halfblock\n  \
                  photon-cli --scene minimal --width 240 --height 120 --mode braille"
)]
struct Cli {
    /// Scene preset to render
    #[arg(short, long, value_enum, default_value_t = ScenePreset::Showcase)]
    scene: ScenePreset,

    /// Output width in pixels
    #[arg(short = 'W', long, default_value_t = 120)]
    width: u32,

    /// Output height in pixels
    #[arg(short = 'H', long, default_value_t = 60)]
    height: u32,

    /// Samples per pixel. Must be a perfect square when `--sampler
    /// multi-jittered` is selected.
    #[arg(long, default_value_t = 32)]
    spp: u32,

    /// Maximum ray bounce depth.
    #[arg(long, default_value_t = 12)]
    bounces: u32,

    /// Per-pixel sampling strategy.
    #[arg(long, value_enum, default_value_t = CliSampler::Independent)]
    sampler: CliSampler,

    /// Terminal output encoding mode.
    #[arg(short, long, value_enum, default_value_t = CliOutputMode::Halfblock)]
    mode: CliOutputMode,

    /// Tone mapping operator applied before quantization.
    #[arg(long, value_enum, default_value_t = CliToneMap::Photographic)]
    tone_map: CliToneMap,

    /// Disable gamma correction (only meaningful with `--tone-map none`).
    #[arg(long)]
    no_gamma: bool,

    /// Enable photon-mapped global illumination on diffuse surfaces.
    /// Scenes with no lights fall back to direct BSDF recursion even if set.
    #[arg(long)]
    gi: bool,

    /// Total photon emission budget for the photon pass.
    #[arg(long, default_value_t = 100_000)]
    max_photons: usize,

    /// Maximum photon bounce depth during the photon pass.
    #[arg(long, default_value_t = 8)]
    photon_bounces: u32,

    /// Number of nearest photons (`k`) consulted by the density estimate.
    #[arg(long, default_value_t = 50)]
    estimate: usize,

    /// Master RNG seed. Per-worker streams derive from this deterministically.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of rayon worker threads (defaults to the number of logical cores).
    #[arg(long)]
    threads: Option<usize>,

    /// Write the rendered image as an ASCII PPM (P3) file to this path.
    #[arg(short, long)]
    output: Option<String>,

    /// Skip the terminal preview (useful when only `--output` is wanted).
    #[arg(long)]
    no_preview: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliSampler {
    Independent,
    MultiJittered,
}

impl From<CliSampler> for Sampler {
    fn from(s: CliSampler) -> Self {
        match s {
            CliSampler::Independent => Sampler::Independent,
            CliSampler::MultiJittered => Sampler::MultiJittered,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliToneMap {
    None,
    Reinhard,
    Aces,
    Photographic,
}

impl From<CliToneMap> for ToneMapOp {
    fn from(t: CliToneMap) -> Self {
        match t {
            CliToneMap::None => ToneMapOp::None,
            CliToneMap::Reinhard => ToneMapOp::Reinhard,
            CliToneMap::Aces => ToneMapOp::Aces,
            CliToneMap::Photographic => ToneMapOp::Photographic,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputMode {
    Braille,
    Truecolor,
    Halfblock,
    Ascii,
}

impl From<CliOutputMode> for OutputMode {
    fn from(m: CliOutputMode) -> Self {
        match m {
            CliOutputMode::Braille => OutputMode::Braille,
            CliOutputMode::Truecolor => OutputMode::TrueColor,
            CliOutputMode::Halfblock => OutputMode::HalfBlock,
            CliOutputMode::Ascii => OutputMode::Ascii,
        }
    }
}

fn print_header(scene_name: &str, config: &RenderConfig, gi: bool) {
    eprintln!();
    eprintln!("  ╔═══════════════════════════════════════════════╗");
    eprintln!("  ║  photon-cli   Offline Photon-Mapped Path Tracer║");
    eprintln!("  ╚═══════════════════════════════════════════════╝");
    eprintln!();
    eprintln!("  Scene:       {scene_name}");
    eprintln!("  Resolution:  {}x{}", config.width, config.height);
    eprintln!("  Samples:     {} spp", config.samples_per_pixel);
    eprintln!("  Bounces:     {}", config.max_bounces);
    eprintln!("  Global illum: {}", if gi { "photon map" } else { "direct only" });
    eprintln!();
}

fn run() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| PhotonError::Config(format!("failed to configure thread pool: {e}")))?;
    }

    let scene_desc = cli.scene.build();
    let scene_name = scene_desc.name;
    let (scene, lights, camera, sky, _aspect) = presets::build_world(scene_desc)?;

    let config = RenderConfig {
        width: cli.width,
        height: cli.height,
        samples_per_pixel: cli.spp,
        max_bounces: cli.bounces,
        sampler: cli.sampler.into(),
        tone_map: cli.tone_map.into(),
        gamma: !cli.no_gamma,
        global_illumination: cli.gi,
        max_estimate: cli.estimate,
        seed: cli.seed,
    };

    print_header(scene_name, &config, cli.gi);

    let photon_map = if cli.gi && !lights.is_empty() {
        log::info!("running photon pass: budget={} bounces={}", cli.max_photons, cli.photon_bounces);
        let photon_config = PhotonPassConfig {
            max_photons: cli.max_photons,
            max_bounces: cli.photon_bounces,
            seed: cli.seed,
        };
        let photons = PhotonPass::run(&scene, &lights, photon_config)?;
        log::info!("photon pass deposited {} photons", photons.len());
        Some(PhotonMap::build(photons))
    } else {
        if cli.gi {
            log::warn!("--gi requested but scene has no lights; falling back to direct lighting");
        }
        None
    };

    let integrator = Integrator {
        scene: &scene,
        camera: &camera,
        config,
        sky,
        photon_map: photon_map.as_ref(),
    };

    let (framebuffer, stats) = integrator.render()?;
    stats.print_summary();

    if let Some(path) = &cli.output {
        framebuffer.write_ppm(path)?;
        log::info!("wrote image to {path}");
    }

    if !cli.no_preview {
        eprintln!();
        display_framebuffer(&framebuffer, cli.mode.into());
        eprintln!();
    }

    eprintln!("  Rendered with photon-cli v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
