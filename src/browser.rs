use std::cell::Cell;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use thiserror::Error;

/// W3C WebDriver element identifier key.
const ELEMENT_KEY: &str = "element-6066-11e4-a852-e34f24ecf8b4";

/// Unicode code point the WebDriver protocol maps to the Enter key.
pub const ENTER_KEY: &str = "\u{E007}";

const DEFAULT_WAIT: Duration = Duration::from_secs(15);
const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("HTTP error talking to WebDriver: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver error '{error}': {message}")]
    WebDriver { error: String, message: String },

    #[error("Malformed WebDriver response: {0}")]
    Protocol(String),

    #[error("Timed out after {seconds}s waiting for element {locator}")]
    WaitTimeout { locator: String, seconds: u64 },
}

/// Element location strategies used against the portal.
#[derive(Debug, Clone, Copy)]
pub enum By<'a> {
    Id(&'a str),
    LinkText(&'a str),
    Css(&'a str),
}

impl By<'_> {
    /// Maps to the W3C (strategy, selector) pair. Ids go through a CSS
    /// attribute selector since "id" is not a W3C strategy.
    fn to_strategy(self) -> (&'static str, String) {
        match self {
            By::Id(id) => ("css selector", format!("[id=\"{}\"]", id)),
            By::LinkText(text) => ("link text", text.to_string()),
            By::Css(selector) => ("css selector", selector.to_string()),
        }
    }
}

impl fmt::Display for By<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            By::Id(id) => write!(f, "id={}", id),
            By::LinkText(text) => write!(f, "link-text={}", text),
            By::Css(selector) => write!(f, "css={}", selector),
        }
    }
}

/// One blocking WebDriver session. The program drives exactly one of these.
pub struct Browser {
    client: Client,
    base_url: String,
    session_id: String,
    closed: Cell<bool>,
}

/// Handle to a located element, valid while the page it came from is current.
pub struct Element<'a> {
    browser: &'a Browser,
    element_id: String,
}

impl Browser {
    /// Opens a new maximized Chrome session against the WebDriver server.
    pub fn launch(webdriver_url: &str) -> Result<Self, BrowserError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let base_url = webdriver_url.trim_end_matches('/').to_string();
        let payload = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": ["--start-maximized"]
                    }
                }
            }
        });

        let value = request(&client, &format!("{}/session", base_url), &payload)?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| BrowserError::Protocol("session response missing sessionId".into()))?
            .to_string();

        info!("WebDriver session {} started.", session_id);
        Ok(Browser {
            client,
            base_url,
            session_id,
            closed: Cell::new(false),
        })
    }

    pub fn goto(&self, url: &str) -> Result<(), BrowserError> {
        info!("Navigating to {}", url);
        self.post("/url", &json!({ "url": url }))?;
        Ok(())
    }

    pub fn back(&self) -> Result<(), BrowserError> {
        debug!("Navigating back.");
        self.post("/back", &json!({}))?;
        Ok(())
    }

    pub fn find_element(&self, by: By) -> Result<Element<'_>, BrowserError> {
        let (using, selector) = by.to_strategy();
        let value = self.post(
            "/element",
            &json!({ "using": using, "value": selector }),
        )?;
        let element_id = parse_element_id(&value)
            .ok_or_else(|| BrowserError::Protocol(format!("no element id in response for {}", by)))?;
        Ok(Element { browser: self, element_id })
    }

    pub fn find_elements(&self, by: By) -> Result<Vec<Element<'_>>, BrowserError> {
        let (using, selector) = by.to_strategy();
        let value = self.post(
            "/elements",
            &json!({ "using": using, "value": selector }),
        )?;
        let items = value
            .as_array()
            .ok_or_else(|| BrowserError::Protocol("elements response is not an array".into()))?;

        let mut elements = Vec::new();
        for item in items {
            if let Some(element_id) = parse_element_id(item) {
                elements.push(Element { browser: self, element_id });
            }
        }
        Ok(elements)
    }

    /// Polls for an element until it appears or the timeout lapses. Replaces
    /// the fixed sleeps a naive script would use to ride out page rendering.
    pub fn wait_for_element(&self, by: By) -> Result<Element<'_>, BrowserError> {
        self.wait_for_element_within(by, DEFAULT_WAIT)
    }

    pub fn wait_for_element_within(
        &self,
        by: By,
        timeout: Duration,
    ) -> Result<Element<'_>, BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find_element(by) {
                Ok(element) => return Ok(element),
                Err(BrowserError::Http(e)) => return Err(BrowserError::Http(e)),
                Err(_) if Instant::now() < deadline => thread::sleep(POLL_INTERVAL),
                Err(_) => {
                    return Err(BrowserError::WaitTimeout {
                        locator: by.to_string(),
                        seconds: timeout.as_secs(),
                    })
                }
            }
        }
    }

    /// Ends the session. Safe to call once; Drop covers the paths that never
    /// reach an explicit quit.
    pub fn quit(&self) {
        if self.closed.replace(true) {
            return;
        }
        let url = format!("{}/session/{}", self.base_url, self.session_id);
        match self.client.delete(&url).send() {
            Ok(_) => info!("WebDriver session {} closed.", self.session_id),
            Err(e) => warn!("Failed to close WebDriver session: {}", e),
        }
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, BrowserError> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        request(&self.client, &url, body)
    }

    fn get(&self, path: &str) -> Result<Value, BrowserError> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        let resp = self.client.get(&url).send()?;
        parse_response(resp)
    }
}

impl Drop for Browser {
    fn drop(&mut self) {
        self.quit();
    }
}

impl<'a> Element<'a> {
    pub fn click(&self) -> Result<(), BrowserError> {
        self.post("/click", &json!({}))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), BrowserError> {
        self.post("/clear", &json!({}))?;
        Ok(())
    }

    pub fn send_keys(&self, text: &str) -> Result<(), BrowserError> {
        self.post("/value", &json!({ "text": text }))?;
        Ok(())
    }

    pub fn text(&self) -> Result<String, BrowserError> {
        let value = self.browser.get(&format!("/element/{}/text", self.element_id))?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BrowserError::Protocol("element text is not a string".into()))
    }

    /// Finds a descendant of this element.
    pub fn find_element(&self, by: By) -> Result<Element<'a>, BrowserError> {
        let (using, selector) = by.to_strategy();
        let value = self.post("/element", &json!({ "using": using, "value": selector }))?;
        let element_id = parse_element_id(&value)
            .ok_or_else(|| BrowserError::Protocol(format!("no element id in response for {}", by)))?;
        Ok(Element {
            browser: self.browser,
            element_id,
        })
    }

    /// Best-effort descendant lookup: absence (or any lookup failure) is None.
    pub fn find_element_opt(&self, by: By) -> Option<Element<'a>> {
        match self.find_element(by) {
            Ok(element) => Some(element),
            Err(e) => {
                debug!("Optional element {} not found: {}", by, e);
                None
            }
        }
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, BrowserError> {
        self.browser
            .post(&format!("/element/{}{}", self.element_id, path), body)
    }
}

fn request(client: &Client, url: &str, body: &Value) -> Result<Value, BrowserError> {
    let resp = client.post(url).json(body).send()?;
    parse_response(resp)
}

fn parse_response(resp: reqwest::blocking::Response) -> Result<Value, BrowserError> {
    let status = resp.status();
    let text = resp.text()?;
    let mut parsed: Value = serde_json::from_str(&text)
        .map_err(|e| BrowserError::Protocol(format!("invalid JSON from WebDriver: {}", e)))?;

    let value = parsed
        .get_mut("value")
        .map(Value::take)
        .unwrap_or(Value::Null);

    if status.is_success() {
        Ok(value)
    } else {
        Err(error_from_value(&value))
    }
}

fn error_from_value(value: &Value) -> BrowserError {
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    BrowserError::WebDriver { error, message }
}

fn parse_element_id(value: &Value) -> Option<String> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_id_uses_css_attribute_selector() {
        let (using, selector) = By::Id("usernameField").to_strategy();
        assert_eq!(using, "css selector");
        assert_eq!(selector, "[id=\"usernameField\"]");
    }

    #[test]
    fn test_by_link_text_strategy() {
        let (using, selector) = By::LinkText("Login").to_strategy();
        assert_eq!(using, "link text");
        assert_eq!(selector, "Login");
    }

    #[test]
    fn test_parse_element_id() {
        let value = json!({ ELEMENT_KEY: "abc-123" });
        assert_eq!(parse_element_id(&value), Some("abc-123".to_string()));
        assert_eq!(parse_element_id(&json!({})), None);
    }

    #[test]
    fn test_error_from_value() {
        let value = json!({ "error": "no such element", "message": "missing button" });
        match error_from_value(&value) {
            BrowserError::WebDriver { error, message } => {
                assert_eq!(error, "no such element");
                assert_eq!(message, "missing button");
            }
            other => panic!("unexpected error variant: {:?}", other),
        }
    }
}
