mod assets;
mod script;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use arstage_core::ExperienceConfig;
use arstage_media::{MediaBackend, MediaSource, SimulatedBackend};
use arstage_runtime::visibility;
use arstage_runtime::{
    AssetLoader, Director, Experience, PlaceholderAssets, PresentationState, RecordingNavigator,
    RecordingRenderer, SessionReport, TrackingEngine,
};

use crate::assets::FsAssetLoader;
use crate::script::{ScriptedTracker, SessionScript};

const DEFAULT_CONFIG: &str = "arstage.toml";

#[derive(Parser)]
#[command(
    name = "arstage",
    version,
    about = "arstage: image-target AR presentation runtime",
    long_about = "Drives an image-target AR presentation: intro, menu, a narrated content\nsequence, case studies and an about section, all from one config file."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a session script on virtual time and print the session report
    Run {
        /// Experience config (default: arstage.toml if present, else built-in)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON session script (default: a tour of every section)
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Override the render rate
        #[arg(long)]
        fps: Option<f64>,

        /// Directory assets resolve against (default: the config's directory)
        #[arg(long)]
        assets_dir: Option<PathBuf>,

        /// Skip loading the model and textures from disk
        #[arg(long)]
        placeholder_assets: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a config and load every asset it names
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long)]
        assets_dir: Option<PathBuf>,
    },

    /// Print the content visible in each presentation state
    States {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write the default configuration
    Init {
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `run --json` output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            config,
            script,
            fps,
            assets_dir,
            placeholder_assets,
            json,
        } => cmd_run(RunOptions {
            config,
            script,
            fps,
            assets_dir,
            placeholder_assets,
            json,
        }),
        Commands::Check { config, assets_dir } => cmd_check(config, assets_dir),
        Commands::States { config } => cmd_states(config),
        Commands::Init { output, force } => cmd_init(&output, force),
    }
}

/// An explicit path must load; otherwise `arstage.toml` is used when present.
fn load_config(path: Option<&Path>) -> Result<(ExperienceConfig, PathBuf)> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None if Path::new(DEFAULT_CONFIG).exists() => PathBuf::from(DEFAULT_CONFIG),
        None => {
            tracing::info!("No {} found, using built-in defaults", DEFAULT_CONFIG);
            return Ok((ExperienceConfig::default(), PathBuf::from(".")));
        }
    };
    let config = ExperienceConfig::load_from_file(&path)
        .with_context(|| format!("failed to load config: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((config, dir))
}

struct RunOptions {
    config: Option<PathBuf>,
    script: Option<PathBuf>,
    fps: Option<f64>,
    assets_dir: Option<PathBuf>,
    placeholder_assets: bool,
    json: bool,
}

#[derive(Serialize)]
struct RunOutput {
    #[serde(flatten)]
    report: SessionReport,
    opened: Vec<String>,
}

fn cmd_run(opts: RunOptions) -> Result<()> {
    let (mut config, config_dir) = load_config(opts.config.as_deref())?;
    if let Some(fps) = opts.fps {
        config.display.fps = fps;
    }
    let root = opts.assets_dir.unwrap_or(config_dir);

    let media = SimulatedBackend::from_config(&config.media);
    let experience = if opts.placeholder_assets {
        Experience::assemble(&config, &PlaceholderAssets, &media)
    } else {
        Experience::assemble(&config, &FsAssetLoader::new(&root), &media)
    }
    .context("failed to assemble the experience")?;

    let script = match &opts.script {
        Some(path) => SessionScript::load(path)
            .with_context(|| format!("failed to load script: {}", path.display()))?,
        None => SessionScript::tour(),
    };

    // Virtual time: timers and render ticks run as fast as the CPU allows.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .context("failed to start the runtime")?;

    let tracking = experience.tracking.clone();
    let output = runtime.block_on(async move {
        let mut director =
            Director::new(experience, RecordingRenderer::new(), RecordingNavigator::new());
        let mut tracker = ScriptedTracker::new(script);
        tracker.start(&tracking, director.handle()).await?;
        let report = director.run().await?;
        tracker.stop().await?;
        Ok::<_, arstage_core::ArError>(RunOutput {
            report,
            opened: director.navigator().opened().to_vec(),
        })
    })?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let report = &output.report;
    println!("Session finished in {} ({} frames)", report.final_state, report.frames);
    for t in &report.transitions {
        println!("   {} -> {}  ({})", t.from, t.to, t.cause);
    }
    if let Some(step) = report.sequence_step {
        println!("   sequence at step {}", step);
    }
    println!("   visible: {}", join(&report.visible));
    for url in &output.opened {
        println!("   opened {}", url);
    }
    Ok(())
}

fn cmd_check(config: Option<PathBuf>, assets_dir: Option<PathBuf>) -> Result<()> {
    let (config, config_dir) = load_config(config.as_deref())?;
    let root = assets_dir.unwrap_or(config_dir);
    println!("Checking experience (assets in {})", root.display());

    config.validate().context("invalid configuration")?;
    println!("   ✓ Config OK");

    let loader = FsAssetLoader::new(&root);
    let model = loader
        .load_model(&config.avatar.model)
        .with_context(|| format!("model {}", config.avatar.model))?;
    let clips: Vec<_> = model.clips.iter().map(|c| c.name.as_str()).collect();
    println!("   ✓ Model {} [{}]", config.avatar.model, clips.join(", "));
    if !clips.contains(&config.avatar.idle_clip.as_str()) {
        println!(
            "   ⚠ No '{}' clip, the first clip will be used",
            config.avatar.idle_clip
        );
    }

    for card in &config.case_studies.cards {
        let texture = loader
            .load_texture(&card.image)
            .with_context(|| format!("texture {}", card.image))?;
        println!("   ✓ Texture {} ({}x{})", card.image, texture.width, texture.height);
    }

    // Missing media is not fatal at runtime, so only warn here.
    let media = SimulatedBackend::from_config(&config.media).with_root(&root);
    let mut sources = vec![MediaSource::audio(&config.intro.narration)];
    sources.extend(config.sequence.steps.iter().map(|s| MediaSource::video(&s.source)));
    let mut missing = 0;
    for source in &sources {
        match media.open(source) {
            Ok(_) => println!("   ✓ Media {}", source.path),
            Err(e) => {
                missing += 1;
                println!("   ⚠ {}", e);
            }
        }
    }

    println!();
    if missing == 0 {
        println!("   ✅ No errors found.");
    } else {
        println!("   ✅ No fatal errors ({} media file(s) unavailable).", missing);
    }
    Ok(())
}

fn cmd_states(config: Option<PathBuf>) -> Result<()> {
    let (config, _) = load_config(config.as_deref())?;
    let media = SimulatedBackend::from_config(&config.media);
    let experience = Experience::assemble(&config, &PlaceholderAssets, &media)
        .context("failed to assemble the experience")?;
    let registry = experience.presentation.registry();

    for state in PresentationState::ALL {
        let mut variants = vec![false];
        if state == PresentationState::CaseStudy {
            variants.push(true);
        }
        for revealed in variants {
            let label = if revealed {
                format!("{} (cards revealed)", state)
            } else {
                state.to_string()
            };
            let collections: Vec<_> = visibility::declared_collections(state, revealed)
                .iter()
                .map(|c| c.to_string())
                .collect();
            let ids: Vec<_> = visibility::declared_visible(registry, state, revealed)
                .into_iter()
                .collect();
            println!("{}", label);
            println!("   collections: {}", collections.join(", "));
            println!("   objects:     {}", join(&ids));
        }
    }
    Ok(())
}

fn cmd_init(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "'{}' already exists (use --force to overwrite)",
            output.display()
        );
    }
    ExperienceConfig::default()
        .save_to_file(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote default configuration to {}", output.display());
    Ok(())
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "arstage",
            "run",
            "--fps",
            "60",
            "--placeholder-assets",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                fps,
                placeholder_assets,
                json,
                config,
                ..
            } => {
                assert_eq!(fps, Some(60.0));
                assert!(placeholder_assets);
                assert!(json);
                assert!(config.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let root = std::env::temp_dir().join(format!("arstage_init_{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        let path = root.join("arstage.toml");

        cmd_init(&path, false).unwrap();
        assert!(cmd_init(&path, false).is_err());
        cmd_init(&path, true).unwrap();

        let (config, dir) = load_config(Some(path.as_path())).unwrap();
        assert_eq!(dir, root);
        assert_eq!(config.sequence.steps.len(), 4);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_check_loads_assets_from_disk() {
        let root = std::env::temp_dir().join(format!("arstage_check_{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        let config = ExperienceConfig::default();
        std::fs::write(
            root.join("2.glb"),
            assets::glb_bytes(r#"{"asset": {"version": "2.0"}, "animations": []}"#),
        )
        .unwrap();
        for card in &config.case_studies.cards {
            let name = card.image.trim_start_matches("./");
            image::RgbaImage::new(4, 4).save(root.join(name)).unwrap();
        }
        let path = root.join("arstage.toml");
        config.save_to_file(&path).unwrap();

        cmd_check(Some(path.clone()), None).unwrap();

        std::fs::remove_file(root.join("case2.png")).unwrap();
        assert!(cmd_check(Some(path), None).is_err());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_check_reports_invalid_configuration() {
        let root =
            std::env::temp_dir().join(format!("arstage_check_invalid_{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        let mut config = ExperienceConfig::default();
        config.intro.delay_secs = 1e20;
        let path = root.join("arstage.toml");
        config.save_to_file(&path).unwrap();

        let err = cmd_check(Some(path), None).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.starts_with("invalid configuration: "), "{}", message);
        assert!(message.contains("intro.delay_secs"), "{}", message);

        let _ = std::fs::remove_dir_all(&root);
    }
}
