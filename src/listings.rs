use log::{debug, error, info, warn};

use crate::app_logger;
use crate::browser::{Browser, BrowserError, Element};
use crate::config::JobPreferences;
use crate::cover_letter::CoverLetterGenerator;
use crate::delay_manager;
use crate::selectors::{APPLY_BUTTON, COMPANY_LINK, JOB_CARD, LOCATION_ITEM, TITLE_LINK};

/// One job card's extracted fields. Lives only for the iteration that reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
}

/// Fields bound so far while a card is being processed. When extraction or the
/// apply click fails partway, the skipped record is built from these.
#[derive(Debug, Default)]
struct PartialListing {
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
}

impl PartialListing {
    fn into_fields(self) -> (String, String, String) {
        (
            self.company.unwrap_or_else(|| "Unknown".to_string()),
            self.title.unwrap_or_else(|| "Unknown".to_string()),
            self.location.unwrap_or_default(),
        )
    }
}

enum Outcome {
    Applied,
    PreferenceMismatch,
}

#[derive(Debug, Default, PartialEq)]
pub struct RunSummary {
    pub applied: usize,
    pub skipped: usize,
}

pub fn role_match(prefs: &JobPreferences, title: &str) -> bool {
    let title_lower = title.to_lowercase();
    prefs
        .job_roles
        .iter()
        .any(|role| title_lower.contains(&role.to_lowercase()))
}

pub fn location_match(prefs: &JobPreferences, location: &str) -> bool {
    let location_lower = location.to_lowercase();
    prefs
        .locations
        .iter()
        .any(|loc| location_lower.contains(&loc.to_lowercase()))
}

pub fn matches_preferences(prefs: &JobPreferences, listing: &JobListing) -> bool {
    role_match(prefs, &listing.title) && location_match(prefs, &listing.location)
}

/// Iterates the visible job cards, applying to matches and logging every
/// outcome. One card's failure never aborts the batch; only a failed
/// back-navigation does, since every later card would be stale.
pub fn apply_to_listings(
    browser: &Browser,
    prefs: &JobPreferences,
    generator: Option<&CoverLetterGenerator>,
    resume: &str,
) -> Result<RunSummary, BrowserError> {
    let cards = browser.find_elements(JOB_CARD)?;
    info!("Found {} job card(s) on the results page.", cards.len());

    let mut summary = RunSummary::default();
    for card in &cards {
        let mut partial = PartialListing::default();
        let outcome = process_card(card, prefs, generator, resume, &mut partial);
        let applied = route_outcome(outcome, partial, prefs, &mut summary);
        if applied {
            delay_manager::post_apply_delay();
            browser.back()?;
        }
    }

    info!(
        "Finished: {} applied, {} skipped.",
        summary.applied, summary.skipped
    );
    Ok(summary)
}

/// Writes exactly one log row for the card's outcome. Returns true when the
/// caller still has to navigate back from the apply page.
fn route_outcome(
    outcome: Result<Outcome, BrowserError>,
    partial: PartialListing,
    prefs: &JobPreferences,
    summary: &mut RunSummary,
) -> bool {
    match outcome {
        Ok(Outcome::Applied) => {
            let (company, title, location) = partial.into_fields();
            record_applied(&company, &title, &location, prefs);
            summary.applied += 1;
            true
        }
        Ok(Outcome::PreferenceMismatch) => {
            let (company, title, location) = partial.into_fields();
            info!("Skipping {} due to preference mismatch", title);
            record_skipped(&company, &title, &location, prefs, "preference mismatch");
            summary.skipped += 1;
            false
        }
        Err(e) => {
            warn!("Skipping listing due to error: {}", e);
            let (company, title, location) = partial.into_fields();
            record_skipped(&company, &title, &location, prefs, &format!("error: {}", e));
            summary.skipped += 1;
            false
        }
    }
}

fn process_card(
    card: &Element,
    prefs: &JobPreferences,
    generator: Option<&CoverLetterGenerator>,
    resume: &str,
    partial: &mut PartialListing,
) -> Result<Outcome, BrowserError> {
    let title = card.find_element(TITLE_LINK)?.text()?;
    partial.title = Some(title.clone());

    let company = card.find_element(COMPANY_LINK)?.text()?;
    partial.company = Some(company.clone());

    // Best-effort: cards without a location element get an empty string.
    let location = card
        .find_element_opt(LOCATION_ITEM)
        .and_then(|el| el.text().ok())
        .unwrap_or_default();
    partial.location = Some(location.clone());

    let listing = JobListing { title, company, location };
    if !matches_preferences(prefs, &listing) {
        return Ok(Outcome::PreferenceMismatch);
    }

    if let Some(generator) = generator {
        match generator.generate(&listing.title, prefs, resume) {
            Some(letter) => debug!("Cover letter draft:\n{}", letter),
            None => debug!("No cover letter for '{}'; applying without one.", listing.title),
        }
    }

    card.find_element(APPLY_BUTTON)?.click()?;
    Ok(Outcome::Applied)
}

fn record_applied(company: &str, title: &str, location: &str, prefs: &JobPreferences) {
    if let Err(e) = app_logger::log_application(company, title, location, &prefs.log_path) {
        error!("Failed to write applied log: {}", e);
    }
}

fn record_skipped(company: &str, title: &str, location: &str, prefs: &JobPreferences, reason: &str) {
    if let Err(e) =
        app_logger::log_skipped_job(company, title, location, &prefs.skipped_log_path, reason)
    {
        error!("Failed to write skipped log: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn prefs() -> JobPreferences {
        serde_json::from_str(
            r#"{
                "locations": ["Bangalore", "Remote"],
                "job_roles": ["Software Engineer"],
                "salary_range": "10-12 LPA"
            }"#,
        )
        .unwrap()
    }

    fn prefs_logging_to(dir: &Path) -> JobPreferences {
        let mut prefs = prefs();
        prefs.log_path = dir.join("applied.csv").to_string_lossy().into_owned();
        prefs.skipped_log_path = dir.join("skipped.csv").to_string_lossy().into_owned();
        prefs
    }

    fn listing(title: &str, location: &str) -> JobListing {
        JobListing {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: location.to_string(),
        }
    }

    fn read_lines(path: &str) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_matching_title_and_location_applies() {
        let listing = listing("Senior Software Engineer", "Bangalore");
        assert!(matches_preferences(&prefs(), &listing));
    }

    #[test]
    fn test_role_mismatch_skips() {
        let listing = listing("Graphic Designer", "Bangalore");
        assert!(!matches_preferences(&prefs(), &listing));
    }

    #[test]
    fn test_location_mismatch_skips() {
        let listing = listing("Software Engineer", "Mumbai");
        assert!(!matches_preferences(&prefs(), &listing));
    }

    #[test]
    fn test_matching_is_case_insensitive_substring() {
        assert!(role_match(&prefs(), "Lead SOFTWARE engineer II"));
        assert!(location_match(&prefs(), "Hybrid - remote (IST)"));
    }

    #[test]
    fn test_empty_location_never_matches() {
        // A card whose location element was absent extracts as "".
        assert!(!location_match(&prefs(), ""));
        assert!(!matches_preferences(&prefs(), &listing("Software Engineer", "")));
    }

    #[test]
    fn test_partial_listing_defaults() {
        let (company, title, location) = PartialListing::default().into_fields();
        assert_eq!(company, "Unknown");
        assert_eq!(title, "Unknown");
        assert_eq!(location, "");
    }

    #[test]
    fn test_partial_listing_keeps_bound_fields() {
        let partial = PartialListing {
            title: Some("Software Engineer".to_string()),
            company: None,
            location: None,
        };
        let (company, title, location) = partial.into_fields();
        assert_eq!(company, "Unknown");
        assert_eq!(title, "Software Engineer");
        assert_eq!(location, "");
    }

    #[test]
    fn test_failing_card_lands_in_skipped_log_only() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = prefs_logging_to(dir.path());
        let mut summary = RunSummary::default();

        // Apply click blew up after title and company were already bound.
        let partial = PartialListing {
            title: Some("Senior Software Engineer".to_string()),
            company: Some("Acme".to_string()),
            location: Some("Bangalore".to_string()),
        };
        let outcome = Err(BrowserError::WebDriver {
            error: "no such element".to_string(),
            message: "missing apply button".to_string(),
        });

        let applied = route_outcome(outcome, partial, &prefs, &mut summary);
        assert!(!applied);
        assert_eq!(summary, RunSummary { applied: 0, skipped: 1 });

        let lines = read_lines(&prefs.skipped_log_path);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Acme,Senior Software Engineer,Bangalore,"));
        let reason = lines[1].rsplit(',').next().unwrap();
        assert!(reason.starts_with("error: "), "unexpected reason: {}", reason);
        assert!(reason.contains("missing apply button"));
        // The applied file never came into existence.
        assert!(!Path::new(&prefs.log_path).exists());
    }

    #[test]
    fn test_error_before_any_field_bound_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = prefs_logging_to(dir.path());
        let mut summary = RunSummary::default();

        let outcome = Err(BrowserError::Protocol("no element id in response".to_string()));
        route_outcome(outcome, PartialListing::default(), &prefs, &mut summary);

        let lines = read_lines(&prefs.skipped_log_path);
        assert!(lines[1].starts_with("Unknown,Unknown,,"));
        assert!(!Path::new(&prefs.log_path).exists());
    }

    #[test]
    fn test_applied_outcome_lands_in_applied_log_only() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = prefs_logging_to(dir.path());
        let mut summary = RunSummary::default();

        let partial = PartialListing {
            title: Some("Software Engineer".to_string()),
            company: Some("Acme".to_string()),
            location: Some("Remote".to_string()),
        };

        let applied = route_outcome(Ok(Outcome::Applied), partial, &prefs, &mut summary);
        assert!(applied);
        assert_eq!(summary, RunSummary { applied: 1, skipped: 0 });

        let lines = read_lines(&prefs.log_path);
        assert!(lines[1].starts_with("Acme,Software Engineer,Remote,"));
        assert!(!Path::new(&prefs.skipped_log_path).exists());
    }

    #[test]
    fn test_mismatch_outcome_records_preference_reason() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = prefs_logging_to(dir.path());
        let mut summary = RunSummary::default();

        let partial = PartialListing {
            title: Some("Graphic Designer".to_string()),
            company: Some("Acme".to_string()),
            location: Some("Bangalore".to_string()),
        };

        route_outcome(Ok(Outcome::PreferenceMismatch), partial, &prefs, &mut summary);

        let lines = read_lines(&prefs.skipped_log_path);
        assert!(lines[1].ends_with(",preference mismatch"));
        assert!(!Path::new(&prefs.log_path).exists());
    }
}
