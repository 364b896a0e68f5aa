mod chrome;
mod webdriver;

pub use chrome::ChromeDriver;
pub use webdriver::{ChromeSessionFactory, SessionOptions, WebDriverSession};

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::SessionError;

/// A live browser session the crawl drives.
///
/// Mirrors the small slice of WebDriver the site automation needs; fakes
/// implement it in tests.
pub trait Browser: Send {
    /// Navigates to a URL, then pauses so dynamic content can settle.
    fn open(&mut self, url: &str, settle: Duration) -> Result<(), SessionError>;

    /// Reloads the current page, then pauses like `open`.
    fn reload(&mut self, settle: Duration) -> Result<(), SessionError>;

    fn current_url(&mut self) -> Result<String, SessionError>;

    fn find(&mut self, locator: &Locator) -> Result<ElementHandle, SessionError>;

    fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>, SessionError>;

    fn find_from(
        &mut self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<ElementHandle, SessionError>;

    fn find_all_from(
        &mut self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, SessionError>;

    fn click(&mut self, element: &ElementHandle) -> Result<(), SessionError>;

    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> Result<(), SessionError>;

    fn text(&mut self, element: &ElementHandle) -> Result<String, SessionError>;

    /// Reads a DOM property such as `href` or `src`.
    fn prop(&mut self, element: &ElementHandle, name: &str) -> Result<String, SessionError>;

    /// Fetches a URL outside the browser and writes the body to `dest`.
    ///
    /// Returns `Ok(false)` for recoverable failures the caller should retry:
    /// non-success HTTP statuses and secure-transport errors, which usually
    /// mean a local proxy is interfering.
    fn download(&mut self, url: &str, dest: &Path) -> Result<bool, SessionError>;
}

/// How to locate an element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(String),
    Css(String),
    Tag(String),
    XPath(String),
}

impl Locator {
    /// WebDriver location strategy and selector for this locator.
    pub fn strategy(&self) -> (&'static str, String) {
        match self {
            Locator::Id(id) => ("css selector", format!("[id=\"{id}\"]")),
            Locator::Css(css) => ("css selector", css.clone()),
            Locator::Tag(tag) => ("tag name", tag.clone()),
            Locator::XPath(xpath) => ("xpath", xpath.clone()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "id '{id}'"),
            Locator::Css(css) => write!(f, "css '{css}'"),
            Locator::Tag(tag) => write!(f, "tag '{tag}'"),
            Locator::XPath(xpath) => write!(f, "xpath '{xpath}'"),
        }
    }
}

/// Opaque WebDriver element reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        ElementHandle(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Named browser tabs, keyed by caller-chosen labels.
#[derive(Debug, Default)]
pub struct TabRegistry {
    handles: HashMap<String, String>,
}

impl TabRegistry {
    pub fn new() -> Self {
        TabRegistry::default()
    }

    pub fn register(&mut self, key: impl Into<String>, handle: impl Into<String>) {
        self.handles.insert(key.into(), handle.into());
    }

    pub fn handle(&self, key: &str) -> Option<&str> {
        self.handles.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Creates browser sessions for worker slots.
pub trait SessionFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn Browser>, SessionError>;
}
