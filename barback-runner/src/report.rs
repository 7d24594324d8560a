//! Report and artifact export — summary CSV, per-run directories.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use barback_core::analytics::BacktestResult;
use barback_core::domain::Side;

use crate::runner::{BatchResult, RunOutcome, SymbolRecord, SCHEMA_VERSION};

/// Status written into the summary for runs that completed.
const STATUS_OK: &str = "ok";

/// One summary row; field order fixes the CSV column order.
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    stock: &'a str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    final_portfolio_value: Option<f64>,
    buy_and_hold_value: Option<f64>,
    sharpe_ratio: Option<f64>,
    max_drawdown: Option<f64>,
    status: &'a str,
}

impl<'a> SummaryRow<'a> {
    fn from_record(record: &'a SymbolRecord) -> Self {
        match record {
            SymbolRecord::Completed(outcome) => {
                let r = &outcome.result;
                SummaryRow {
                    stock: &r.symbol,
                    start: Some(r.start),
                    end: Some(r.end),
                    final_portfolio_value: Some(r.final_portfolio_value),
                    buy_and_hold_value: Some(r.buy_and_hold_value),
                    sharpe_ratio: Some(r.sharpe_ratio),
                    max_drawdown: Some(r.max_drawdown),
                    status: STATUS_OK,
                }
            }
            SymbolRecord::Skipped(skip) => SummaryRow {
                stock: &skip.symbol,
                start: None,
                end: None,
                final_portfolio_value: None,
                buy_and_hold_value: None,
                sharpe_ratio: None,
                max_drawdown: None,
                status: &skip.reason,
            },
        }
    }
}

/// Write the batch summary CSV: one row per configured symbol, skips
/// included, in configuration order.
pub fn write_summary_csv(path: &Path, batch: &BatchResult) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create summary CSV {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for record in &batch.records {
        writer
            .serialize(SummaryRow::from_record(record))
            .context("Failed to serialize summary row")?;
    }
    writer.flush().context("Failed to flush summary CSV")?;
    Ok(())
}

/// Render the batch as an aligned text table for terminal output.
pub fn render_summary_table(batch: &BatchResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<8} {:>12} {:>12} {:>8} {:>8}  {}\n",
        "symbol", "final", "buy&hold", "sharpe", "max_dd", "status"
    ));
    for record in &batch.records {
        match record {
            SymbolRecord::Completed(outcome) => {
                let r = &outcome.result;
                out.push_str(&format!(
                    "{:<8} {:>12.2} {:>12.2} {:>8.2} {:>7.1}%  {}\n",
                    r.symbol,
                    r.final_portfolio_value,
                    r.buy_and_hold_value,
                    r.sharpe_ratio,
                    r.max_drawdown * 100.0,
                    STATUS_OK
                ));
            }
            SymbolRecord::Skipped(skip) => {
                out.push_str(&format!(
                    "{:<8} {:>12} {:>12} {:>8} {:>8}  {}\n",
                    skip.symbol, "-", "-", "-", "-", skip.reason
                ));
            }
        }
    }
    out
}

// ─── Per-run artifacts ──────────────────────────────────────────────

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    pub equity_csv: PathBuf,
    pub trades_csv: PathBuf,
    pub diagnostics_json: PathBuf,
}

/// Metadata written alongside each run's artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub run_id: String,
    pub symbol: String,
    pub strategy: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub duration_secs: f64,
    pub stats: BacktestResult,
}

/// Order diagnostics that explain why fills differ from raw intents.
#[derive(Debug, Serialize)]
struct RunDiagnostics<'a> {
    rejected_intents: &'a [barback_core::engine::RejectedIntent],
    skipped_entries: &'a [barback_core::engine::SkippedEntry],
    final_position: Option<&'a barback_core::domain::OpenPosition>,
    commission_paid: f64,
}

/// Save one run's artifacts under `{output_dir}/{symbol}_{run_id prefix}/`.
pub fn save_artifacts(output_dir: impl AsRef<Path>, outcome: &RunOutcome) -> Result<ArtifactPaths> {
    let short_id: String = outcome.run_id.chars().take(8).collect();
    let run_dir = output_dir
        .as_ref()
        .join(format!("{}_{short_id}", outcome.result.symbol));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create artifact directory {}", run_dir.display()))?;

    let manifest_path = run_dir.join("manifest.json");
    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        run_id: outcome.run_id.clone(),
        symbol: outcome.result.symbol.clone(),
        strategy: outcome.strategy.clone(),
        timestamp: chrono::Utc::now(),
        duration_secs: outcome.duration_secs,
        stats: outcome.result.clone(),
    };
    let json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize run manifest")?;
    std::fs::write(&manifest_path, json)
        .with_context(|| format!("Failed to write manifest {}", manifest_path.display()))?;

    let equity_csv = run_dir.join("equity.csv");
    write_equity_csv(&equity_csv, outcome)?;

    let trades_csv = run_dir.join("trades.csv");
    write_trades_csv(&trades_csv, outcome)?;

    let diagnostics_json = run_dir.join("diagnostics.json");
    let diagnostics = RunDiagnostics {
        rejected_intents: &outcome.run.rejected_intents,
        skipped_entries: &outcome.run.skipped_entries,
        final_position: outcome.run.final_position.as_ref(),
        commission_paid: outcome.run.commission_paid,
    };
    let json =
        serde_json::to_string_pretty(&diagnostics).context("Failed to serialize diagnostics")?;
    std::fs::write(&diagnostics_json, json)
        .with_context(|| format!("Failed to write diagnostics {}", diagnostics_json.display()))?;

    Ok(ArtifactPaths {
        run_dir,
        manifest: manifest_path,
        equity_csv,
        trades_csv,
        diagnostics_json,
    })
}

/// Load a manifest back, refusing schema versions newer than this build.
pub fn load_manifest(path: &Path) -> Result<RunManifest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let manifest: RunManifest =
        serde_json::from_str(&text).context("Failed to parse run manifest")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "manifest schema version {} is newer than supported version {}",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

fn write_equity_csv(path: &Path, outcome: &RunOutcome) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create equity CSV {}", path.display()))?;
    writeln!(file, "date,equity")?;
    for point in &outcome.run.equity_curve {
        writeln!(file, "{},{:.4}", point.date, point.equity)?;
    }
    Ok(())
}

fn write_trades_csv(path: &Path, outcome: &RunOutcome) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create trades CSV {}", path.display()))?;
    writeln!(
        file,
        "side,entry_date,entry_price,exit_date,exit_price,size,commission,net_pnl,bars_held"
    )?;
    for trade in &outcome.run.trades {
        let side = match trade.side {
            Side::Long => "Long",
            Side::Short => "Short",
        };
        writeln!(
            file,
            "{},{},{:.4},{},{:.4},{},{:.4},{:.4},{}",
            side,
            trade.entry_date,
            trade.entry_price,
            trade.exit_date,
            trade.exit_price,
            trade.size,
            trade.commission,
            trade.net_pnl,
            trade.bars_held
        )?;
    }
    Ok(())
}
