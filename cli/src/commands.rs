use castline_core::context::{AppConfigExt, load_analysis_preset};
use castline_core::report::{
    FightSelector, GraphQlClient, LocalEventDump, load_report, parse_report_url,
};
use castline_core::storage::{
    DebugDump, debug_dump_filename, export_timeline, exports_dir, timeline_filename,
    write_debug_dump,
};
use castline_core::timeline::analyze_fight;
use castline_types::{AnalysisConfig, ExportFormat, TimelineRow};
use std::io::Write;
use std::path::Path;

use crate::context::{ActiveSource, CliContext, ReportSession};

/// Per-run overrides given on the `analyze` command line.
#[derive(Debug, Default, Clone)]
pub struct AnalyzeOptions {
    pub merge_dots: bool,
    pub no_aoe: bool,
    pub no_bind: bool,
    pub ignore_auto: bool,
    pub preset: Option<String>,
}

impl AnalyzeOptions {
    fn apply(&self, base: &AnalysisConfig) -> Result<AnalysisConfig, String> {
        let mut config = match &self.preset {
            Some(path) => load_analysis_preset(Path::new(path)).map_err(|e| e.to_string())?,
            None => base.clone(),
        };
        config.merge_dot_ticks |= self.merge_dots;
        config.ignore_basic_attack |= self.ignore_auto;
        if self.no_aoe {
            config.merge_aoe_hits = false;
        }
        if self.no_bind {
            config.bind_snapshots = false;
        }
        Ok(config)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading
// ─────────────────────────────────────────────────────────────────────────────

pub async fn open_local(report_path: &str, events_path: &str, ctx: &CliContext) -> Result<(), String> {
    let report = load_report(report_path).await.map_err(|e| e.to_string())?;
    let dump = LocalEventDump::open(events_path).map_err(|e| e.to_string())?;

    println!(
        "Opened {} with {} fights, {} events",
        report.title,
        report.fights.len(),
        dump.len()
    );
    if !dump.invalid().is_empty() {
        println!(
            "  {} lines in the event dump were not valid JSON",
            dump.invalid().len()
        );
    }
    ctx.replace_session(ReportSession::new(report, ActiveSource::Local(dump)))
        .await;
    Ok(())
}

pub async fn fetch_report(url: &str, ctx: &CliContext) -> Result<(), String> {
    let locator = parse_report_url(url).map_err(|e| e.to_string())?;
    let (endpoint, env_var) = {
        let config = ctx.config.read().await;
        (config.api_endpoint.clone(), config.token_env_var.clone())
    };

    let client =
        GraphQlClient::from_env(endpoint, &env_var, &locator.code).map_err(|e| e.to_string())?;
    let report = client.report().await.map_err(|e| e.to_string())?;

    println!("{} ({} fights)", report.title, report.fights.len());
    if let Some(started) = report.started_at() {
        println!("  started {}", started.format("%Y-%m-%d %H:%M"));
    }

    let mut session = ReportSession::new(report, ActiveSource::Remote(client));
    session.preferred_fight = locator.fight;
    ctx.replace_session(session).await;
    Ok(())
}

pub async fn list_fights(ctx: &CliContext) -> Result<(), String> {
    let guard = ctx.session.read().await;
    let session = guard.as_ref().ok_or("No report loaded")?;

    if session.report.fights.is_empty() {
        println!("No fights in report");
        return Ok(());
    }
    println!("{:<6} Fight", "Id");
    println!("{}", "-".repeat(60));
    for fight in &session.report.fights {
        println!("{:<6} {}", fight.id, fight.label());
    }
    println!("\nSource: {}", session.source.describe());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Analysis
// ─────────────────────────────────────────────────────────────────────────────

pub async fn analyze(
    fight: Option<&str>,
    options: &AnalyzeOptions,
    ctx: &CliContext,
) -> Result<(), String> {
    let config = options.apply(&ctx.config.read().await.analysis)?;

    let mut guard = ctx.session.write().await;
    let session = guard.as_mut().ok_or("No report loaded")?;

    let selector = match fight {
        Some(value) => {
            FightSelector::parse(value).ok_or_else(|| format!("Invalid fight: {value}"))?
        }
        None => session.preferred_fight.unwrap_or(FightSelector::Last),
    };
    let fight = session
        .report
        .select_fight(selector)
        .cloned()
        .ok_or_else(|| format!("Fight {selector:?} not found"))?;

    println!("Analyzing {}", fight.label());
    session
        .events_for(&fight)
        .await
        .map_err(|e| e.to_string())?;
    let Some((_, fetched)) = session.events.as_ref() else {
        return Err(format!("No events fetched for fight {}", fight.id));
    };

    let analysis =
        analyze_fight(&session.report, fight.id, fetched, &config).map_err(|e| e.to_string())?;

    print!("{}", analysis.diagnostics);
    if analysis.is_empty() {
        println!("No qualifying events, the timeline is empty");
    }
    session.analysis = Some((fight, analysis));
    Ok(())
}

pub async fn show(limit: Option<usize>, ctx: &CliContext) -> Result<(), String> {
    let guard = ctx.session.read().await;
    let (fight, analysis) = guard
        .as_ref()
        .and_then(|s| s.analysis.as_ref())
        .ok_or("No analysis yet, run analyze first")?;

    println!("{}", fight.label());
    print_table(&analysis.rows, limit.unwrap_or(analysis.rows.len()));
    if let Some(limit) = limit.filter(|l| *l < analysis.rows.len()) {
        println!("... {} more rows", analysis.rows.len() - limit);
    }
    Ok(())
}

fn blank_or<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn print_table(rows: &[TimelineRow], limit: usize) {
    println!(
        "{:<8} {:<20} {:<28} {:<9} {:>8} {:>8} {:>6} {:>8} {:>4} {:>7} {:>8}",
        "Time", "Source", "Ability", "Type", "Damage", "Absorb", "Mult", "Raw", "Hits", "DoT",
        "Per tick"
    );
    println!("{}", "-".repeat(128));
    for row in rows.iter().take(limit) {
        let marker = if row.is_outlier { "*" } else { "" };
        println!(
            "{:<8} {:<20} {:<28} {:<9} {:>8} {:>8} {:>6} {:>8} {:>4} {:>7} {:>8}",
            row.time,
            truncate(&row.source, 20),
            truncate(&format!("{}{}", row.ability, marker), 28),
            row.damage_kind,
            blank_or(row.direct_damage),
            blank_or(row.absorbed),
            blank_or(row.multiplier.map(|m| format!("{m:.2}"))),
            blank_or(row.raw_damage),
            row.targets_hit,
            row.dot_duration_label(),
            blank_or(row.dot_average_raw_per_tick),
        );
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let cut: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export
// ─────────────────────────────────────────────────────────────────────────────

pub async fn export(format: Option<&str>, dir: Option<&str>, ctx: &CliContext) -> Result<(), String> {
    let config = ctx.config.read().await.clone();
    let format = match format {
        Some(name) => ExportFormat::from_name(name).ok_or_else(|| format!("Unknown format: {name}"))?,
        None => config.export_format,
    };
    let dir = exports_dir(dir.unwrap_or(&config.export_directory)).map_err(|e| e.to_string())?;

    let guard = ctx.session.read().await;
    let session = guard.as_ref().ok_or("No report loaded")?;
    let (fight, analysis) = session
        .analysis
        .as_ref()
        .ok_or("No analysis yet, run analyze first")?;

    let path = dir.join(timeline_filename(&fight.name, format));
    export_timeline(&analysis.rows, format, &path).map_err(|e| e.to_string())?;
    println!("Wrote {} rows to {}", analysis.rows.len(), path.display());

    if config.analysis.debug_export {
        let events = match &session.events {
            Some((id, fetched)) if *id == fight.id => fetched.events.as_slice(),
            _ => &[],
        };
        let dump = DebugDump {
            report_code: session.report.code.as_deref(),
            report_title: &session.report.title,
            fight,
            master_data: session.report.master_data.as_ref(),
            events,
        };
        let debug_path = dir.join(debug_dump_filename(&fight.name));
        write_debug_dump(&dump, &debug_path).map_err(|e| e.to_string())?;
        println!("Wrote debug dump to {}", debug_path.display());
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

pub async fn show_settings(ctx: &CliContext) -> Result<(), String> {
    let config = ctx.config.read().await;
    let rendered = serde_json::to_string_pretty(&*config).map_err(|e| e.to_string())?;
    println!("{rendered}");
    if let Ok(path) = castline_core::context::AppConfig::config_path() {
        println!("Stored at {}", path.display());
    }
    Ok(())
}

pub async fn use_preset(path: &str, ctx: &CliContext) -> Result<(), String> {
    let preset = load_analysis_preset(Path::new(path)).map_err(|e| e.to_string())?;
    ctx.config.write().await.analysis = preset;
    println!("Analysis options loaded from {path}");
    Ok(())
}

pub async fn save_settings(ctx: &CliContext) -> Result<(), String> {
    ctx.config.read().await.save().map_err(|e| e.to_string())?;
    println!("Configuration saved");
    Ok(())
}

pub fn exit() -> Result<(), String> {
    writeln!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_override_base() {
        let base = AnalysisConfig::default();
        let options = AnalyzeOptions {
            merge_dots: true,
            no_aoe: true,
            no_bind: true,
            ..Default::default()
        };
        let config = options.apply(&base).unwrap();
        assert!(config.merge_dot_ticks);
        assert!(!config.merge_aoe_hits);
        assert!(!config.bind_snapshots);
        assert!(!config.ignore_basic_attack);
        assert_eq!(config.outlier_ratio, base.outlier_ratio);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Boss", 20), "Boss");
        assert_eq!(truncate("Abcdefgh", 5), "Abcd…");
    }

    #[tokio::test]
    async fn test_commands_need_a_report() {
        let ctx = CliContext::with_config(Default::default());
        assert!(list_fights(&ctx).await.is_err());
        assert!(show(None, &ctx).await.is_err());
        assert!(analyze(None, &AnalyzeOptions::default(), &ctx).await.is_err());
    }
}
