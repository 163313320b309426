use glam::Vec2;

use quaker_core::{
    EngineConfig, PresetLibrary, QuakeError, QuakeType, ShakeEngine, SimulatedCamera,
};

pub const USAGE: &str = "usage: quaker-tester [presets.toml] [--preset=NAME] [--ticks=N] \
                         [--dt=SECS] [--stop-after=SECS] [--pause-at=SECS] \
                         [--resume-at=SECS] [--cancel-after=SECS] [--target=X,Y] [--seed=N]";

/// Options for one headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub presets_path: String,
    pub preset: Option<String>,
    pub ticks: usize,
    pub dt: f32,
    /// When to call `stop_sustain` on a Sustained preset.
    pub stop_after: Option<f32>,
    /// When to pause the engine.
    pub pause_at: Option<f32>,
    /// When to unpause it again.
    pub resume_at: Option<f32>,
    /// When to cancel every running quake.
    pub cancel_after: Option<f32>,
    /// World-space target for Target bumps.
    pub target: Option<Vec2>,
    pub seed: Option<u64>,
}

impl Default for RunOptions {
    /// One simulated minute at 60 Hz against the shipped presets.
    fn default() -> Self {
        Self {
            presets_path: "config/presets.toml".to_string(),
            preset: None,
            ticks: 3600,
            dt: 1.0 / 60.0,
            stop_after: None,
            pause_at: None,
            resume_at: None,
            cancel_after: None,
            target: None,
            seed: None,
        }
    }
}

/// What a run observed.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: usize,
    /// Seconds until the engine went idle, if it did.
    pub idle_after: Option<f32>,
    /// Largest offset length seen.
    pub peak: f32,
    /// Ticks delivered while the engine was paused.
    pub paused_ticks: usize,
    /// Camera offset after the last tick.
    pub final_offset: Vec2,
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .parse::<T>()
        .map_err(|_| format!("invalid value for {flag}: {value}"))
}

fn parse_vec2(value: &str) -> Result<Vec2, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y for --target, got {value}"))?;
    Ok(Vec2::new(
        parse_value("--target", x.trim())?,
        parse_value("--target", y.trim())?,
    ))
}

pub fn parse_args(args: &[String]) -> Result<RunOptions, String> {
    let mut opts = RunOptions::default();
    for arg in args {
        if let Some(v) = arg.strip_prefix("--preset=") {
            opts.preset = Some(v.to_string());
        } else if let Some(v) = arg.strip_prefix("--ticks=") {
            opts.ticks = parse_value("--ticks", v)?;
        } else if let Some(v) = arg.strip_prefix("--dt=") {
            let dt: f32 = parse_value("--dt", v)?;
            if !(dt.is_finite() && dt > 0.0) {
                return Err(format!("--dt must be > 0, got {v}"));
            }
            opts.dt = dt;
        } else if let Some(v) = arg.strip_prefix("--stop-after=") {
            opts.stop_after = Some(parse_value("--stop-after", v)?);
        } else if let Some(v) = arg.strip_prefix("--pause-at=") {
            opts.pause_at = Some(parse_value("--pause-at", v)?);
        } else if let Some(v) = arg.strip_prefix("--resume-at=") {
            opts.resume_at = Some(parse_value("--resume-at", v)?);
        } else if let Some(v) = arg.strip_prefix("--cancel-after=") {
            opts.cancel_after = Some(parse_value("--cancel-after", v)?);
        } else if let Some(v) = arg.strip_prefix("--target=") {
            opts.target = Some(parse_vec2(v)?);
        } else if let Some(v) = arg.strip_prefix("--seed=") {
            opts.seed = Some(parse_value("--seed", v)?);
        } else if arg.starts_with("--") {
            return Err(format!("unknown flag: {arg}"));
        } else {
            opts.presets_path = arg.clone();
        }
    }
    if let (Some(pause), Some(resume)) = (opts.pause_at, opts.resume_at)
        && resume < pause
    {
        return Err(format!("--resume-at ({resume}) is before --pause-at ({pause})"));
    }
    Ok(opts)
}

/// Play `name` against a simulated camera and tick until idle or out of ticks.
pub fn run_preset(
    library: &PresetLibrary,
    name: &str,
    config: &EngineConfig,
    opts: &RunOptions,
) -> Result<RunSummary, QuakeError> {
    let preset = library.get(name)?;
    let mut engine = ShakeEngine::new(Some(SimulatedCamera::default()), config)?;

    match opts.target {
        Some(target) => engine.play_at(preset, target)?,
        None => engine.play(preset)?,
    };

    let mut summary = RunSummary {
        ticks: 0,
        idle_after: None,
        peak: 0.0,
        paused_ticks: 0,
        final_offset: Vec2::ZERO,
    };
    let mut released = false;
    let mut pause_done = false;
    let mut resume_done = false;
    let mut cancelled = false;
    let mut elapsed = 0.0f32;

    for tick in 0..opts.ticks {
        if !released
            && preset.kind == QuakeType::Sustained
            && opts.stop_after.is_some_and(|t| elapsed >= t)
        {
            engine.stop_sustain();
            released = true;
            tracing::info!(elapsed, "Released sustained quake");
        }
        if !pause_done && opts.pause_at.is_some_and(|t| elapsed >= t) {
            pause_done = true;
            if !engine.is_paused() {
                engine.toggle_pause();
                tracing::info!(elapsed, "Paused");
            }
        }
        if !resume_done && opts.resume_at.is_some_and(|t| elapsed >= t) {
            resume_done = true;
            if engine.is_paused() {
                engine.toggle_pause();
                tracing::info!(elapsed, "Resumed");
            }
        }
        if !cancelled && opts.cancel_after.is_some_and(|t| elapsed >= t) {
            engine.cancel_all();
            cancelled = true;
            tracing::info!(elapsed, "Cancelled running quakes");
        }

        if engine.is_paused() {
            summary.paused_ticks += 1;
        }
        engine.tick(opts.dt);
        elapsed += opts.dt;
        summary.ticks = tick + 1;

        let offset = engine.camera().offset;
        summary.final_offset = offset;
        summary.peak = summary.peak.max(offset.length());
        tracing::debug!(tick, x = offset.x, y = offset.y, "offset");

        if engine.is_idle() {
            summary.idle_after = Some(elapsed);
            break;
        }
    }

    Ok(summary)
}
