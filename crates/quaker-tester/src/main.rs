mod run;

use tracing_subscriber::EnvFilter;

use quaker_core::{EngineConfig, PresetLibrary};

use run::parse_args;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = match parse_args(&args) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{}", run::USAGE);
            std::process::exit(2);
        },
    };

    let library = match PresetLibrary::load(&opts.presets_path) {
        Ok(lib) => lib,
        Err(e) => {
            tracing::error!(path = %opts.presets_path, error = %e, "Failed to load presets");
            std::process::exit(1);
        },
    };

    let Some(name) = opts.preset.as_deref() else {
        let names: Vec<&str> = library.names().collect();
        tracing::info!(presets = ?names, "No --preset given; available presets listed");
        return;
    };

    let mut config = EngineConfig::load();
    if let Some(seed) = opts.seed {
        config.seed = Some(seed);
    }

    match run::run_preset(&library, name, &config, &opts) {
        Ok(summary) => tracing::info!(
            preset = name,
            ticks = summary.ticks,
            idle_after = ?summary.idle_after,
            peak = summary.peak,
            paused_ticks = summary.paused_ticks,
            "Quake test finished"
        ),
        Err(e) => {
            tracing::error!(preset = name, error = %e, "Quake test failed");
            std::process::exit(1);
        },
    }
}
