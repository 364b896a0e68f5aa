use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use serde_json::{json, Value};

use crate::error::SessionError;
use crate::session::chrome::ChromeDriver;
use crate::session::{Browser, ElementHandle, Locator, SessionFactory, TabRegistry};

/// W3C WebDriver element key, shared by all compliant drivers.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const DEFAULT_TAB: &str = "default";

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub executable: PathBuf,
    pub headless: bool,
}

/// A Chrome session speaking the W3C WebDriver wire protocol over HTTP.
///
/// Owns its chromedriver process; dropping the session deletes the remote
/// session and kills the driver.
pub struct WebDriverSession {
    driver: ChromeDriver,
    client: reqwest::blocking::Client,
    session_id: String,
    tabs: TabRegistry,
}

impl WebDriverSession {
    pub fn launch(options: &SessionOptions) -> Result<Self, SessionError> {
        let driver = ChromeDriver::launch(&options.executable)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        let mut args = vec![
            "--ignore-certificate-errors".to_string(),
            "--ignore-ssl-errors".to_string(),
        ];
        if options.headless {
            args.push("--headless=new".to_string());
        }
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        });

        let body = post(
            &client,
            &format!("{}/session", driver.base_url()),
            &capabilities,
        )?;
        let session_id = body
            .pointer("/value/sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| SessionError::Protocol {
                error: "session not created".to_string(),
                message: "response carries no sessionId".to_string(),
            })?
            .to_string();
        debug!("webdriver session {session_id} created");

        let mut session = WebDriverSession {
            driver,
            client,
            session_id,
            tabs: TabRegistry::new(),
        };

        let handle = value_str(&get(&session.client, &session.session_url("/window"))?)?;
        session.tabs.register(DEFAULT_TAB, handle);
        Ok(session)
    }

    /// Opens a URL in a fresh tab registered under `key` and switches to it.
    pub fn open_tab(&mut self, key: &str, url: &str, settle: Duration) -> Result<(), SessionError> {
        let body = post(
            &self.client,
            &self.session_url("/window/new"),
            &json!({ "type": "tab" }),
        )?;
        let handle = body
            .pointer("/value/handle")
            .and_then(Value::as_str)
            .ok_or_else(|| SessionError::Protocol {
                error: "no new window".to_string(),
                message: "response carries no window handle".to_string(),
            })?
            .to_string();

        post(
            &self.client,
            &self.session_url("/window"),
            &json!({ "handle": handle }),
        )?;
        self.tabs.register(key, handle);
        self.open(url, settle)
    }

    /// Switches to a previously registered tab.
    pub fn switch_tab(&mut self, key: &str) -> Result<(), SessionError> {
        let handle = self
            .tabs
            .handle(key)
            .ok_or_else(|| SessionError::UnknownTab {
                key: key.to_string(),
            })?
            .to_string();
        post(
            &self.client,
            &self.session_url("/window"),
            &json!({ "handle": handle }),
        )?;
        Ok(())
    }

    pub fn window_handles(&self) -> Result<Vec<String>, SessionError> {
        let body = get(&self.client, &self.session_url("/window/handles"))?;
        let handles = body
            .pointer("/value")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(handles)
    }

    fn session_url(&self, suffix: &str) -> String {
        format!(
            "{}/session/{}{}",
            self.driver.base_url(),
            self.session_id,
            suffix
        )
    }

    fn element_url(&self, element: &ElementHandle, suffix: &str) -> String {
        self.session_url(&format!("/element/{}{}", element.id(), suffix))
    }

    fn find_with(&mut self, url: &str, locator: &Locator) -> Result<ElementHandle, SessionError> {
        let (using, value) = locator.strategy();
        let body = post(&self.client, url, &json!({ "using": using, "value": value }))
            .map_err(|err| not_found(err, locator))?;
        extract_element(&body)
    }

    fn find_all_with(
        &mut self,
        url: &str,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, SessionError> {
        let (using, value) = locator.strategy();
        let body = post(&self.client, url, &json!({ "using": using, "value": value }))?;
        extract_elements(&body)
    }
}

impl Browser for WebDriverSession {
    fn open(&mut self, url: &str, settle: Duration) -> Result<(), SessionError> {
        post(
            &self.client,
            &self.session_url("/url"),
            &json!({ "url": url }),
        )?;
        thread::sleep(settle);
        Ok(())
    }

    fn reload(&mut self, settle: Duration) -> Result<(), SessionError> {
        post(&self.client, &self.session_url("/refresh"), &json!({}))?;
        thread::sleep(settle);
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, SessionError> {
        value_str(&get(&self.client, &self.session_url("/url"))?)
    }

    fn find(&mut self, locator: &Locator) -> Result<ElementHandle, SessionError> {
        let url = self.session_url("/element");
        self.find_with(&url, locator)
    }

    fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>, SessionError> {
        let url = self.session_url("/elements");
        self.find_all_with(&url, locator)
    }

    fn find_from(
        &mut self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<ElementHandle, SessionError> {
        let url = self.element_url(parent, "/element");
        self.find_with(&url, locator)
    }

    fn find_all_from(
        &mut self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, SessionError> {
        let url = self.element_url(parent, "/elements");
        self.find_all_with(&url, locator)
    }

    fn click(&mut self, element: &ElementHandle) -> Result<(), SessionError> {
        post(&self.client, &self.element_url(element, "/click"), &json!({}))?;
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> Result<(), SessionError> {
        post(
            &self.client,
            &self.element_url(element, "/value"),
            &json!({ "text": text }),
        )?;
        Ok(())
    }

    fn text(&mut self, element: &ElementHandle) -> Result<String, SessionError> {
        value_str(&get(&self.client, &self.element_url(element, "/text"))?)
    }

    fn prop(&mut self, element: &ElementHandle, name: &str) -> Result<String, SessionError> {
        let url = self.element_url(element, &format!("/property/{name}"));
        value_str(&get(&self.client, &url)?)
    }

    fn download(&mut self, url: &str, dest: &Path) -> Result<bool, SessionError> {
        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(err) if chain_mentions_tls(&err) => {
                warn!("secure transport failed for {url} (is a local proxy interfering?)");
                return Ok(false);
            }
            Err(err) => return Err(SessionError::Transport(err)),
        };

        if !response.status().is_success() {
            warn!("download of {url} answered HTTP {}", response.status());
            return Ok(false);
        }

        let bytes = response.bytes()?;
        fs::write(dest, &bytes).map_err(|source| SessionError::WriteFile {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(true)
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        let url = self.session_url("");
        if let Err(err) = delete(&self.client, &url) {
            debug!("session delete failed during drop: {err}");
        }
    }
}

/// Creates one `WebDriverSession` per call, each with its own driver process.
pub struct ChromeSessionFactory {
    options: SessionOptions,
}

impl ChromeSessionFactory {
    pub fn new(options: SessionOptions) -> Self {
        ChromeSessionFactory { options }
    }
}

impl SessionFactory for ChromeSessionFactory {
    fn create(&self) -> Result<Box<dyn Browser>, SessionError> {
        Ok(Box::new(WebDriverSession::launch(&self.options)?))
    }
}

fn post(
    client: &reqwest::blocking::Client,
    url: &str,
    payload: &Value,
) -> Result<Value, SessionError> {
    let response = client.post(url).json(payload).send()?;
    let status = response.status();
    let body: Value = response.json().unwrap_or_default();
    check(status, body)
}

fn get(client: &reqwest::blocking::Client, url: &str) -> Result<Value, SessionError> {
    let response = client.get(url).send()?;
    let status = response.status();
    let body: Value = response.json().unwrap_or_default();
    check(status, body)
}

fn delete(client: &reqwest::blocking::Client, url: &str) -> Result<Value, SessionError> {
    let response = client.delete(url).send()?;
    let status = response.status();
    let body: Value = response.json().unwrap_or_default();
    check(status, body)
}

/// Applies the W3C error contract: a `value.error` field wins over the HTTP
/// status, and a non-success status without one is still a protocol error.
fn check(status: reqwest::StatusCode, body: Value) -> Result<Value, SessionError> {
    if let Some(error) = body.pointer("/value/error").and_then(Value::as_str) {
        let message = body
            .pointer("/value/message")
            .and_then(Value::as_str)
            .unwrap_or("unknown webdriver error");
        return Err(SessionError::Protocol {
            error: error.to_string(),
            message: message.to_string(),
        });
    }
    if !status.is_success() {
        return Err(SessionError::Protocol {
            error: format!("http {}", status.as_u16()),
            message: body.to_string(),
        });
    }
    Ok(body)
}

fn value_str(body: &Value) -> Result<String, SessionError> {
    body.pointer("/value")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| SessionError::Protocol {
            error: "unexpected response".to_string(),
            message: "value is not a string".to_string(),
        })
}

fn extract_element(body: &Value) -> Result<ElementHandle, SessionError> {
    body.pointer("/value")
        .and_then(|value| value.get(ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(ElementHandle::new)
        .ok_or_else(|| SessionError::Protocol {
            error: "unexpected response".to_string(),
            message: "value carries no element reference".to_string(),
        })
}

fn extract_elements(body: &Value) -> Result<Vec<ElementHandle>, SessionError> {
    let values = body
        .pointer("/value")
        .and_then(Value::as_array)
        .ok_or_else(|| SessionError::Protocol {
            error: "unexpected response".to_string(),
            message: "value is not an element array".to_string(),
        })?;
    Ok(values
        .iter()
        .filter_map(|value| value.get(ELEMENT_KEY))
        .filter_map(Value::as_str)
        .map(ElementHandle::new)
        .collect())
}

/// Maps the driver's "no such element" answer to a locator-aware error.
fn not_found(err: SessionError, locator: &Locator) -> SessionError {
    match err {
        SessionError::Protocol { ref error, .. } if error == "no such element" => {
            SessionError::NotFound {
                locator: locator.to_string(),
            }
        }
        other => other,
    }
}

/// Walks an error's source chain looking for secure-transport failures.
fn chain_mentions_tls(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        let text = e.to_string().to_lowercase();
        if text.contains("certificate") || text.contains("tls") || text.contains("ssl") {
            return true;
        }
        current = e.source();
    }
    false
}
