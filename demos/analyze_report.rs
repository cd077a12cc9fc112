use dotenv::dotenv;
use financial_report_pipeline::{
    CompanyReport, CsvSink, ExtractionEvent, PipelineConfig, ReportPipeline, TableSink,
    ValuationAssumptions,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

fn collect_documents(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext, "pdf" | "xml" | "xhtml"))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

async fn extract_with_progress(
    pipeline: &ReportPipeline<financial_report_pipeline::ChatClient>,
    path: &Path,
) -> financial_report_pipeline::Result<CompanyReport> {
    let (tx, mut rx) = mpsc::channel(32);

    let printer = async move {
        while let Some(event) = rx.recv().await {
            match event {
                ExtractionEvent::Starting { model, characters } => {
                    println!("🔄 Sending {} characters to {}...", characters, model);
                }
                ExtractionEvent::Requesting { attempt } => {
                    println!("🤖 Waiting for the model (attempt {})...", attempt);
                }
                ExtractionEvent::ProcessingResponse { characters } => {
                    println!("⚙️  Parsing {} characters of response...", characters);
                }
                ExtractionEvent::DroppedPeriod { period, missing } => {
                    println!("⚠️  Dropped period {} (missing {:?})", period, missing);
                }
                ExtractionEvent::Retry {
                    attempt,
                    delay,
                    error,
                } => {
                    println!(
                        "🔄 Attempt {} failed: {}. Retrying in {:?}",
                        attempt, error, delay
                    );
                }
                ExtractionEvent::Success { periods } => {
                    println!("✅ Extracted {} periods", periods);
                }
                ExtractionEvent::Failed { reason } => {
                    println!("❌ Extraction failed: {}", reason);
                }
            }
        }
    };

    let (result, _) = tokio::join!(pipeline.process_document(path, Some(tx)), printer);
    result
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    println!("🚀 Starting financial report analysis...\n");

    let config = match std::env::var("PIPELINE_CONFIG") {
        Ok(path) => PipelineConfig::from_json_file(Path::new(&path))?,
        Err(_) => PipelineConfig::default(),
    };

    let doc_dir = Path::new("demos").join("documents");
    if !doc_dir.exists() {
        std::fs::create_dir_all(&doc_dir)?;
        println!("⚠️  Created 'demos/documents'. Place an annual report (PDF or XHTML) there.");
        return Ok(());
    }

    let documents = collect_documents(&doc_dir)?;
    if documents.is_empty() {
        println!("⚠️  No PDF or XML files found in {:?}.", doc_dir);
        return Ok(());
    }

    let pipeline =
        ReportPipeline::from_env(config)?.with_work_dir(Path::new("demos").join("processed"));
    println!("🔧 Model: {}\n", pipeline.config().extraction.model);

    let mut reports = Vec::new();
    for path in &documents {
        println!("📄 {}", path.display());
        match extract_with_progress(&pipeline, path).await {
            Ok(report) => {
                println!(
                    "   {} | {} | {}\n",
                    report.company_name(),
                    report.reporting_currency(),
                    report.reporting_unit()
                );
                reports.push(report);
            }
            Err(e) => println!("   Skipped ({:?}): {}\n", e.kind(), e),
        }
    }

    if reports.is_empty() {
        println!("⚠️  No data extracted from the provided files.");
        return Ok(());
    }

    let analysis = pipeline.analyze(&reports)?;

    for warning in &analysis.table.warnings {
        println!("⚠️  {}", warning);
    }

    println!("\n📊 KPIs ({}):", pipeline.config().aggregation.target_currency);
    for row in &analysis.table.rows {
        println!(
            "   {} {:<24} revenue {:>14.2}  net margin {:>6.1}%  ROE {:>6.1}%  YoY {}",
            row.year,
            row.company_name,
            row.revenue,
            row.net_margin * 100.0,
            row.roe * 100.0,
            row.revenue_growth_yoy
                .map(|g| format!("{:+.1}%", g * 100.0))
                .unwrap_or_else(|| "n/a".to_string())
        );
    }

    println!("\n🔮 Revenue forecast (CAGR {:.2}%):", analysis.cagr * 100.0);
    for point in &analysis.forecast {
        println!("   {} {:>14.2}", point.year, point.revenue);
    }

    let stem = documents[0]
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let output = Path::new("demos")
        .join("processed")
        .join(format!("{}_analysis.csv", stem));
    let written = CsvSink.write(&analysis.combined, &ValuationAssumptions::default(), &output)?;

    println!("\n💾 Saved to {}", written.display());
    Ok(())
}
