use anyhow::{Context, Result};
use event_manager::{
    attendees::CsvSource,
    civic::CivicInfoClient,
    config::Config,
    letters::{self, LetterTemplate, LetterWriter},
    registration::{self, AnalysisError, DAY_NAMES},
};
use reqwest::Client;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    println!("EventManager initialized.");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::load()?;
    info!(
        attendees = %config.attendees_path.display(),
        output = %config.output_dir.display(),
        policy = %config.timestamp_policy,
        "config loaded"
    );
    if config.civic_api_key.is_none() {
        warn!("CIVIC_INFO_KEY not set; letters will point attendees to commoncause.org");
    }

    // ─── 3) open the roster ──────────────────────────────────────────
    let mut roster = CsvSource::open(&config.attendees_path)
        .with_context(|| format!("opening roster {}", config.attendees_path.display()))?;

    // ─── 4) thank-you letters ────────────────────────────────────────
    let civic = CivicInfoClient::new(
        Client::new(),
        &config.civic_api_url,
        config.civic_api_key.clone(),
    )?;
    let template = LetterTemplate::load(config.template_path.as_deref()).await?;
    let writer = LetterWriter::new(&config.output_dir);
    let written = letters::process_attendees(
        &mut roster,
        &civic,
        &template,
        &writer,
        config.lookup_concurrency,
    )
    .await?;
    info!(written, dir = %writer.output_dir().display(), "thank-you letters saved");

    // ─── 5) registration statistics ──────────────────────────────────
    match registration::analyze_registration_times(&mut roster, config.timestamp_policy) {
        Ok(stats) => print!("{}", registration::render_statistics(&stats, &DAY_NAMES)),
        Err(AnalysisError::EmptyFrequencyMap) => println!("\nNo registrations to analyze."),
        Err(e) => {
            error!("registration analysis failed: {}", e);
            return Err(e.into());
        }
    }

    info!("all done");
    Ok(())
}
