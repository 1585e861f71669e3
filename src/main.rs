//! rnaseq-dge command-line interface

use anyhow::Result;
use clap::Parser;
use log::{info, LevelFilter};

use rnaseq_dge::cli::Cli;
use rnaseq_dge::pipeline;

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.to_config()?;
    let report = pipeline::run(&config, &cli.inputs())?;

    info!(
        "{}: {} of {} genes significant",
        report.method,
        report.significant.len(),
        report.full.len()
    );
    if report.significant.is_empty() {
        info!("No significant DEGs found. Top {} genes by adjusted p-value:", report.top_genes.len());
    } else {
        info!("Top DEGs:");
    }
    for row in report.top_genes.iter().take(config.top_n) {
        match row.log2_fold_change {
            Some(lfc) => info!("  {}\tlog2FC={:.3}\tadj_pval={:.3e}", row.gene_id, lfc, row.adjusted_p_value),
            None => info!("  {}\tadj_pval={:.3e}", row.gene_id, row.adjusted_p_value),
        }
    }

    Ok(())
}
