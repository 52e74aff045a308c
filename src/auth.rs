use log::info;

use crate::browser::{Browser, BrowserError, ENTER_KEY};
use crate::config::Credentials;
use crate::selectors::{LOGIN_LINK, PASSWORD_FIELD, PORTAL_URL, SEARCH_BOX, USERNAME_FIELD};

/// Logs into the portal. Any missing element here is fatal for the run.
pub fn login(browser: &Browser, creds: &Credentials) -> Result<(), BrowserError> {
    browser.goto(PORTAL_URL)?;

    browser.wait_for_element(LOGIN_LINK)?.click()?;

    let username_input = browser.wait_for_element(USERNAME_FIELD)?;
    let password_input = browser.wait_for_element(PASSWORD_FIELD)?;

    username_input.send_keys(&creds.username)?;
    password_input.send_keys(&creds.password)?;
    password_input.send_keys(ENTER_KEY)?;

    // The search box only renders once the session is established, so waiting
    // for it doubles as the post-login readiness check.
    browser.wait_for_element(SEARCH_BOX)?;
    info!("Logged in as {}", creds.username);
    Ok(())
}
