use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use myocr::args::{parse_args, usage};
use myocr::config::Config;
use myocr::error::OcrError;
use myocr::ocr::OcrProvider;
use myocr::pipeline::run_scan;

#[derive(Parser)]
#[command(name = "myocr")]
#[command(about = "Extract text from regions of a still image")]
struct Args {
    /// Image path followed by -flag:value options, e.g. photo.png -cropy:100 -footer:20
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "myocr=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<OcrError>() {
                Some(OcrError::Usage(message)) => eprintln!("{message}"),
                _ => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Args) -> anyhow::Result<()> {
    let args = parse_args(&cli.args)?;
    let config = Config::from_env();

    if args.show_version {
        println!(
            "myocr {} (revision {})",
            env!("CARGO_PKG_VERSION"),
            config.ocr.revision
        );
        return Ok(());
    }

    if args.image.is_none() {
        let program = std::env::args().next().unwrap_or_else(|| "myocr".to_string());
        return Err(OcrError::Usage(usage(&program)).into());
    }

    config.validate()?;

    tracing::info!("Initializing OCR provider: {}...", config.ocr.model);
    let ocr = OcrProvider::new(&config.ocr);
    if let Some(reason) = ocr.unavailable_reason() {
        tracing::warn!(%reason, "OCR unavailable - every region will come back empty");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_scan(&args, &config, &ocr, &mut out).await?;
    out.flush()?;

    Ok(())
}
