use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::process::ExitCode;
use thermolog::cli::{Args, Command, ReportOptions, render_report};
use thermolog::logging::{LoggingConfig, get_logger, init_logging};
use thermolog::sdm::{OAuthClient, SdmClient};
use thermolog::weather::NwsClient;
use thermolog::{Config, Poller};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let logging = LoggingConfig {
        level: args.log_level.clone(),
        file: args.log_file.clone(),
        json_format: args.log_json,
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(&args.config)
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", args.config.display(), e))?;

    match args.command {
        Some(Command::Report {
            device,
            start,
            end,
            rows,
        }) => {
            let today = Utc::now().with_timezone(&config.timezone).date_naive();
            let options = ReportOptions {
                device,
                start,
                end,
                rows,
            };
            print!("{}", render_report(&config, &options, today)?);
            Ok(())
        }
        None => poll(&config).await,
    }
}

async fn poll(config: &Config) -> Result<()> {
    let logger = get_logger("main");
    logger.info(&format!(
        "Polling project {} into {}",
        config.project_id,
        config.output_dir.display()
    ));

    let tokens = OAuthClient::new(config)?;
    let devices = SdmClient::new(&config.project_id)?;
    let weather = NwsClient::new()?;

    let poller = Poller::new(config, &tokens, &devices, &weather);
    let report = poller.run_once(Utc::now()).await?;

    if report.is_clean() {
        info!("Poll finished: {} row(s) written", report.written.len());
    } else {
        let skipped: Vec<&str> = report.failures.iter().map(|f| f.device.as_str()).collect();
        logger.warn(&format!(
            "Poll finished with {} device(s) skipped: {}",
            skipped.len(),
            skipped.join(", ")
        ));
    }
    Ok(())
}
