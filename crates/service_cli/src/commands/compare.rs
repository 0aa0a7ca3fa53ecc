//! Compare command implementation
//!
//! Sweeps every variance scheme, asset scheme and reduction combination over
//! several seeds and reports how often each misses the benchmark.

use pricer_heston::analytical::LewisHeston;
use pricer_heston::mc::{ComparisonRow, ReferencePricer, SchemeComparison};
use tracing::info;

use crate::config::RunConfig;
use crate::{OutputFormat, Result};

/// Run the compare command
pub fn run(run_config: &RunConfig, format: OutputFormat) -> Result<String> {
    let base = run_config.simulation_config()?;
    let compare = &run_config.compare;
    let benchmark = LewisHeston.reference_price(&base)?;
    info!(
        runs = compare.runs,
        paths = base.n_paths(),
        steps = base.n_steps(),
        benchmark,
        "Starting scheme comparison"
    );

    let rows = SchemeComparison::new(base, compare.runs)
        .tolerances(compare.abs_tol, compare.rel_tol)
        .run(benchmark)?;
    info!(combinations = rows.len(), "Comparison complete");

    render(&rows, benchmark, format)
}

/// Formats comparison rows.
pub fn render(rows: &[ComparisonRow], benchmark: f64, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Table => Ok(render_table(rows, benchmark)),
    }
}

fn render_table(rows: &[ComparisonRow], benchmark: f64) -> String {
    let mut out = format!("Semi-analytical benchmark = {:.6}\n", benchmark);
    out.push_str("┌────────────────────┬───────┬──────┬──────┬────────────┬────────────┬─────────────┐\n");
    out.push_str("│ Variance scheme    │ Asset │ Anti │ MoMa │ Mean       │ Mean |rel| │ Errors/Runs │\n");
    out.push_str("├────────────────────┼───────┼──────┼──────┼────────────┼────────────┼─────────────┤\n");
    for row in rows {
        out.push_str(&format!(
            "│ {:<18} │ {:<5} │ {:<4} │ {:<4} │ {:>10.6} │ {:>9.4}% │ {:>11} │\n",
            row.variance_scheme.as_str(),
            row.asset_scheme.as_str(),
            flag(row.antithetic),
            flag(row.moment_matching),
            row.mean_estimate,
            row.mean_abs_relative_error * 100.0,
            format!("{}/{}", row.error_count, row.runs),
        ));
    }
    out.push_str("└────────────────────┴───────┴──────┴──────┴────────────┴────────────┴─────────────┘");
    out
}

fn flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_heston::mc::{AssetScheme, VarianceScheme};

    fn row() -> ComparisonRow {
        ComparisonRow {
            variance_scheme: VarianceScheme::HighamMao,
            asset_scheme: AssetScheme::Naive,
            antithetic: true,
            moment_matching: false,
            runs: 5,
            mean_estimate: 1.4987,
            mean_abs_relative_error: 0.0123,
            error_count: 2,
        }
    }

    #[test]
    fn test_table_output() {
        let out = render(&[row()], 1.4913, OutputFormat::Table).unwrap();
        assert!(out.starts_with("Semi-analytical benchmark = 1.491300"));
        let line = out.lines().find(|l| l.contains("higham_mao")).unwrap();
        assert!(line.contains("naive"));
        assert!(line.contains("1.230"));
        assert!(line.contains("2/5"));
    }

    #[test]
    fn test_json_output() {
        let out = render(&[row(), row()], 1.4913, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["variance_scheme"], "higham_mao");
        assert_eq!(value[0]["error_count"], 2);
    }

    #[test]
    fn test_run_covers_all_combinations() {
        let mut run_config = RunConfig::default();
        run_config.simulation.paths = 200;
        run_config.simulation.steps = 5;
        run_config.compare.runs = 1;

        let out = run(&run_config, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 7 * 2 * 4);
    }
}
