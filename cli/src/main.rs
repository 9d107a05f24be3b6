use castline_cli::commands::{self, AnalyzeOptions};
use castline_cli::{CliContext, logging, readline};
use clap::{Parser, Subcommand};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let ctx = CliContext::new();

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "Ability cast timelines from combat damage reports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load report metadata and an event dump from disk
    Open {
        #[arg(short, long)]
        report: String,
        #[arg(short, long)]
        events: String,
    },
    /// Load a report from the hosted API by URL or code
    Fetch {
        #[arg(short, long)]
        url: String,
    },
    Fights,
    /// Build the timeline for a fight (id or "last")
    Analyze {
        #[arg(short, long)]
        fight: Option<String>,
        #[arg(long)]
        merge_dots: bool,
        #[arg(long)]
        no_aoe: bool,
        #[arg(long)]
        no_bind: bool,
        #[arg(long)]
        ignore_auto: bool,
        #[arg(long)]
        preset: Option<String>,
    },
    Show {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    Export {
        #[arg(short, long)]
        format: Option<String>,
        #[arg(short, long)]
        dir: Option<String>,
    },
    Config,
    /// Replace the analysis options with a TOML preset
    Preset {
        #[arg(short, long)]
        path: String,
    },
    SaveConfig,
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "castline".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Open { report, events }) => commands::open_local(report, events, ctx).await?,
        Some(Commands::Fetch { url }) => commands::fetch_report(url, ctx).await?,
        Some(Commands::Fights) => commands::list_fights(ctx).await?,
        Some(Commands::Analyze {
            fight,
            merge_dots,
            no_aoe,
            no_bind,
            ignore_auto,
            preset,
        }) => {
            let options = AnalyzeOptions {
                merge_dots: *merge_dots,
                no_aoe: *no_aoe,
                no_bind: *no_bind,
                ignore_auto: *ignore_auto,
                preset: preset.clone(),
            };
            commands::analyze(fight.as_deref(), &options, ctx).await?
        }
        Some(Commands::Show { limit }) => commands::show(*limit, ctx).await?,
        Some(Commands::Export { format, dir }) => {
            commands::export(format.as_deref(), dir.as_deref(), ctx).await?
        }
        Some(Commands::Config) => commands::show_settings(ctx).await?,
        Some(Commands::Preset { path }) => commands::use_preset(path, ctx).await?,
        Some(Commands::SaveConfig) => commands::save_settings(ctx).await?,
        Some(Commands::Exit) => {
            commands::exit()?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
