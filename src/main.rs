use naukri_apply_lib::{auth, listings, logger, resume_loader, search};
use naukri_apply_lib::{AppConfig, Browser, CoverLetterGenerator};

use std::env;
use std::error::Error;
use log::info;

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();
    info!("Starting Naukri Auto-Apply...");

    // 1. Load Config (path from first arg, default config.json)
    let config_path = env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = AppConfig::load(&config_path)?;

    // 2. Load Resume
    let resume = resume_loader::load_resume(&config.credentials.resume_path)?;

    // 3. Initialize Generator + Browser
    let generator = CoverLetterGenerator::new(config.openai_api_key.clone());
    let browser = Browser::launch(&config.webdriver_url)?;

    // The session is closed on every exit path: explicitly here, and via Drop
    // if run() bails out early.
    let result = run(&browser, &config, &generator, &resume);
    browser.quit();
    result
}

fn run(
    browser: &Browser,
    config: &AppConfig,
    generator: &CoverLetterGenerator,
    resume: &str,
) -> Result<(), Box<dyn Error>> {
    auth::login(browser, &config.credentials)?;
    search::search_jobs(browser, &config.search_query)?;

    let generator = generator.available().then_some(generator);
    let summary = listings::apply_to_listings(browser, &config.preferences, generator, resume)?;

    info!(
        "Run completed. Applied to {} job(s), skipped {}.",
        summary.applied, summary.skipped
    );
    Ok(())
}
