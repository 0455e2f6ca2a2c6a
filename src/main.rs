use chess_pathtracer::display::{DisplaySink, PngSink, PpmSink};
use chess_pathtracer::rendering::{PathTracer, RenderEngine};
use chess_pathtracer::scene::{ChessScene, PAWN_PATH};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
enum ConfigError {
    #[error("usage: chess-pathtracer OUTPUT [WIDTH] [HEIGHT] [FRAMES] [MESH_PATH]")]
    MissingOutput,
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug)]
struct RenderConfig {
    output: PathBuf,
    width: usize,
    height: usize,
    frames: usize,
    mesh_path: PathBuf,
}

impl RenderConfig {
    fn from_args(args: &[String]) -> Result<RenderConfig, ConfigError> {
        let output = args.get(1).ok_or(ConfigError::MissingOutput)?;
        let number = |index: usize, name: &'static str, default: usize| match args.get(index) {
            None => Ok(default),
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidNumber {
                    name,
                    value: value.clone(),
                }),
        };
        Ok(RenderConfig {
            output: PathBuf::from(output),
            width: number(2, "WIDTH", 320)?,
            height: number(3, "HEIGHT", 180)?,
            frames: number(4, "FRAMES", 1)?,
            mesh_path: args
                .get(5)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(PAWN_PATH)),
        })
    }

    fn sink(&self) -> Box<dyn DisplaySink> {
        let path = self.output.clone();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ppm") => Box::new(PpmSink { path }),
            _ => Box::new(PngSink { path }),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let config = RenderConfig::from_args(&args).context("invalid arguments")?;
    log::info!("{:?}", config);

    let scene = ChessScene::with_pawn_path(&config.mesh_path);
    let mut engine = PathTracer::new(scene);
    let mut sink = config.sink();

    engine.init();
    engine.resize(config.width, config.height);
    let progress = ProgressBar::new(config.frames as u64).with_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} frames {elapsed}")
            .context("bad progress template")?,
    );
    for _ in 0..config.frames {
        engine.render(sink.as_mut(), config.width, config.height);
        progress.inc(1);
    }
    progress.finish();
    engine.cleanup();

    log::info!("wrote {}", config.output.display());
    Ok(())
}
