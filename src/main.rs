use blocklist_etl::domain::ports::RecordSink;
use blocklist_etl::utils::error::{EtlError, ErrorSeverity};
use blocklist_etl::utils::{logger, validation::Validate};
use blocklist_etl::{
    CliConfig, EtlEngine, HttpFeedSource, MemorySink, RunSummary, Settings, SqliteSink,
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting blocklist-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 解析並驗證配置
    let settings = match cli.resolve().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::info!(
        "🔧 Pipeline '{}': {} -> {}#{}",
        settings.pipeline_name,
        settings.feed_url,
        settings.database,
        settings.collection
    );

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let outcome = if cli.dry_run {
        run_dry(&settings, cli.monitor).await
    } else {
        run_into_store(&settings, cli.monitor).await
    };

    match outcome {
        Ok(summary) => {
            report_summary(&summary);
            if summary.failed > 0 {
                eprintln!("❌ {} records could not be stored", summary.failed);
                std::process::exit(2);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run_into_store(settings: &Settings, monitor: bool) -> Result<RunSummary, EtlError> {
    let source = HttpFeedSource::from_config(settings)?;
    let sink = SqliteSink::from_config(settings)?;
    let engine = EtlEngine::new_with_monitoring(source, sink, monitor);

    let summary = run_engine(&engine).await?;
    tracing::info!(
        "📁 Collection '{}' now holds {} records",
        settings.collection,
        engine.sink().count()?
    );
    Ok(summary)
}

async fn run_dry(settings: &Settings, monitor: bool) -> Result<RunSummary, EtlError> {
    tracing::info!("🧪 Dry run: records are printed, not stored");
    let source = HttpFeedSource::from_config(settings)?;
    let engine = EtlEngine::new_with_monitoring(source, MemorySink::new(), monitor);

    let summary = run_engine(&engine).await?;
    engine
        .sink()
        .write_json_lines(std::io::stdout().lock())
        .await?;
    Ok(summary)
}

async fn run_engine<K: RecordSink>(
    engine: &EtlEngine<HttpFeedSource, K>,
) -> Result<RunSummary, EtlError> {
    let summary = engine.run().await?;
    tracing::info!("✅ ETL process completed successfully!");
    Ok(summary)
}

fn report_summary(summary: &RunSummary) {
    eprintln!(
        "✅ {} lines fetched, {} unique records ({} rejected, {} duplicates)",
        summary.fetched_lines, summary.records, summary.rejected, summary.duplicates
    );
    eprintln!(
        "📦 {} inserted, {} updated, {} failed",
        summary.inserted, summary.updated, summary.failed
    );
}
