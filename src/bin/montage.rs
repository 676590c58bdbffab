use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use montage::{ComposeConfig, ComposeRequest, LoggingConfig, MontageError, Script};

#[derive(Parser, Debug)]
#[command(name = "montage", version, about = "Script-driven video composition")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Log filter (overridden by RUST_LOG).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose an MP4 from a script and source clips (requires `ffmpeg` and `ffprobe` on PATH).
    Compose(ComposeArgs),
    /// Validate a script against a clip list without touching any media.
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
struct ScriptArgs {
    /// Script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Source clip; repeat in ordinal order.
    #[arg(long = "clip", required = true)]
    clips: Vec<PathBuf>,

    /// Engine configuration JSON. Missing keys take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the result as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    #[command(flatten)]
    common: ScriptArgs,

    /// Background music file.
    #[arg(long)]
    music: Option<PathBuf>,

    /// Still image composited onto the opening frame.
    #[arg(long)]
    thumbnail: Option<PathBuf>,

    /// Output MP4 path (default: generated under the configured output directory).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Plan only: resolve and lay out the timeline without decoding or encoding.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    common: ScriptArgs,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    montage::init_logging(&LoggingConfig {
        level: cli.log_level.clone(),
        json: cli.log_json,
    });
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ComposeConfig> {
    match path {
        Some(p) => Ok(ComposeConfig::from_path(p)?),
        None => Ok(ComposeConfig::default()),
    }
}

fn load_script(path: &Path) -> anyhow::Result<Script> {
    Script::from_path(path).with_context(|| format!("load script '{}'", path.display()))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(feature = "media-ffmpeg")]
fn cmd_compose(args: ComposeArgs) -> anyhow::Result<ExitCode> {
    let config = load_config(args.common.config.as_deref())?;
    let script = load_script(&args.common.script)?;

    let mut request = ComposeRequest::new(script, args.common.clips);
    request.music_path = args.music;
    request.thumbnail_path = args.thumbnail;
    request.output_path = args.out;

    if args.dry_run {
        let plan = montage::compose_plan(&request, &config)?;
        if args.common.json {
            print_json(&plan)?;
        } else {
            println!(
                "plan: {:.3}s, {} frames at {:.3} fps, {}x{} -> {}",
                plan.duration_sec,
                plan.frame_count,
                plan.fps.as_f64(),
                plan.canvas.width,
                plan.canvas.height,
                plan.output_path.display()
            );
            print_warnings(&plan.warnings);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let result = montage::compose(&request, &config)?;
    if args.common.json {
        print_json(&result)?;
    } else {
        println!(
            "wrote {} ({:.3}s, {} frames)",
            result.output_path.display(),
            result.duration_sec,
            result.frame_count
        );
        for s in &result.scenes {
            println!("  scene {}: [{:.3}, {:.3})", s.scene_id, s.start_sec, s.end_sec);
        }
        print_warnings(&result.warnings);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(not(feature = "media-ffmpeg"))]
fn cmd_compose(_args: ComposeArgs) -> anyhow::Result<ExitCode> {
    anyhow::bail!("montage was built without the 'media-ffmpeg' feature")
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<ExitCode> {
    let config = load_config(args.common.config.as_deref())?;
    let script = load_script(&args.common.script)?;

    match montage::validate(&script, args.common.clips.len(), &config) {
        Ok(v) => {
            if args.common.json {
                print_json(&serde_json::json!({
                    "valid": true,
                    "realized_duration": v.realized_duration,
                    "warnings": v.warnings,
                }))?;
            } else {
                println!(
                    "ok: {} scene(s), realized duration {:.3}s",
                    v.scenes.len(),
                    v.realized_duration
                );
                print_warnings(&v.warnings);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(MontageError::ScriptValidation { issues }) => {
            if args.common.json {
                print_json(&serde_json::json!({ "valid": false, "issues": issues }))?;
            } else {
                eprintln!("invalid script ({} issue(s)):", issues.len());
                for issue in &issues {
                    eprintln!("  {issue}");
                }
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e @ MontageError::SourceResolution { .. }) => {
            if args.common.json {
                print_json(&serde_json::json!({ "valid": false, "error": e.to_string() }))?;
            } else {
                eprintln!("invalid script: {e}");
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_warnings(warnings: &[montage::Warning]) {
    for w in warnings {
        println!("  warning: {w}");
    }
}
