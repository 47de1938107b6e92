use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use chilly_bird::assets::Assets;
use chilly_bird::audio::{Audio, RodioAudio, Silent};
use chilly_bird::config::{AudioConfig, Config};
use chilly_bird::gfx::PixelBuf;
use chilly_bird::host::TerminalHost;
use chilly_bird::machine::Game;
use chilly_bird::run_loop::RunLoop;
use chilly_bird::skin::PaletteSkins;

#[derive(Parser, Debug)]
#[command(author, version, about = "Flappy-bird in the terminal", long_about = None)]
struct Args {
    /// TOML config; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Start without sound.
    #[arg(long)]
    mute: bool,
    /// Fixed seed for the pipe layout.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn init_logging(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    let path = dir.join("game.log");
    let file = File::create(&path).with_context(|| format!("open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn open_audio(cfg: &AudioConfig, mute: bool) -> Box<dyn Audio> {
    if mute || !cfg.enabled {
        info!("audio muted");
        return Box::new(Silent::default());
    }
    match RodioAudio::open(cfg) {
        Ok(audio) => Box::new(audio),
        Err(e) => {
            warn!("{e}; continuing without sound");
            Box::new(Silent::default())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_dir)?;
    info!("chilly-bird {} starting", env!("CARGO_PKG_VERSION"));

    let cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let assets = Assets::build(&cfg)?;
    let audio = open_audio(&cfg.audio, args.mute);
    let mut game = Game::new(&cfg, &assets, audio, Box::new(PaletteSkins::new()), args.seed)?;

    // The host restores the terminal when this block ends, before any error
    // reaches stderr.
    let frames = {
        let mut host = TerminalHost::open(&cfg.window).context("open terminal")?;
        let mut canvas = PixelBuf::new(
            cfg.window.screen_width as usize,
            cfg.window.screen_height as usize,
        );
        RunLoop::new(cfg.window.fps).run(&mut game, &mut host, &mut canvas)
    }?;
    info!("bye after {frames} frames");
    Ok(())
}
