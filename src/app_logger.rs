use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;

use chrono::Local;
use log::info;

const APPLIED_HEADERS: [&str; 4] = ["Company", "Job Title", "Location", "Applied On"];
const SKIPPED_HEADERS: [&str; 5] = ["Company", "Job Title", "Location", "Skipped On", "Reason"];

/// Appends one applied record, creating the file with a header row on first write.
pub fn log_application<P: AsRef<Path>>(
    company: &str,
    title: &str,
    location: &str,
    path: P,
) -> Result<(), Box<dyn Error>> {
    let timestamp = Local::now().to_rfc3339();
    append_row(path.as_ref(), &APPLIED_HEADERS, &[company, title, location, &timestamp])?;
    info!("Logged application: {} at {}", title, company);
    Ok(())
}

/// Appends one skipped record with its reason.
pub fn log_skipped_job<P: AsRef<Path>>(
    company: &str,
    title: &str,
    location: &str,
    path: P,
    reason: &str,
) -> Result<(), Box<dyn Error>> {
    let timestamp = Local::now().to_rfc3339();
    append_row(
        path.as_ref(),
        &SKIPPED_HEADERS,
        &[company, title, location, &timestamp, reason],
    )?;
    info!("Logged skipped job: {} ({})", title, reason);
    Ok(())
}

fn append_row(path: &Path, headers: &[&str], row: &[&str]) -> Result<(), Box<dyn Error>> {
    let file_exists = path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if !file_exists {
        writer.write_record(headers)?;
    }
    writer.write_record(row)?;
    writer.flush()?;
    Ok(())
}
