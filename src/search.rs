use std::time::Duration;

use log::{info, warn};

use crate::browser::{Browser, BrowserError, ENTER_KEY};
use crate::selectors::{JOB_CARD, SEARCH_BOX};

const RESULTS_WAIT: Duration = Duration::from_secs(10);

/// Submits a keyword search. Failure to reach the search box is fatal; an
/// empty result page is not (the listing loop simply finds no cards).
pub fn search_jobs(browser: &Browser, query: &str) -> Result<(), BrowserError> {
    info!("Searching for '{}'", query);

    let search_box = browser.wait_for_element(SEARCH_BOX)?;
    search_box.clear()?;
    search_box.send_keys(query)?;
    search_box.send_keys(ENTER_KEY)?;

    // Give the results page a chance to render. No result-count validation.
    if let Err(e) = browser.wait_for_element_within(JOB_CARD, RESULTS_WAIT) {
        warn!("No job cards visible after search: {}", e);
    }
    Ok(())
}
