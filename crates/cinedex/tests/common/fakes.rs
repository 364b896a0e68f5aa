use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cinedex::error::{SessionError, SiteError, TranslateError};
use cinedex::session::{Browser, ElementHandle, Locator, SessionFactory};
use cinedex::site::SiteExtractor;
use cinedex::translate::Translator;

/// Counters shared between a factory and the sessions it hands out.
#[derive(Debug, Default)]
pub struct Telemetry {
    pub sessions_created: AtomicUsize,
    pub downloads_attempted: AtomicUsize,
    pub active_sessions: AtomicUsize,
    pub max_active_sessions: AtomicUsize,
}

impl Telemetry {
    pub fn new() -> Arc<Self> {
        Arc::new(Telemetry::default())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FakeBrowserSpec {
    /// Downloads fail this many times per session before succeeding.
    pub fail_downloads_before_success: u32,
    pub always_fail_downloads: bool,
}

/// URL-tracking browser for crawls driven by a `ScriptedExtractor`.
///
/// Element lookups always fail; the scripted extractor works entirely
/// off the current URL.
pub struct FakeBrowser {
    telemetry: Arc<Telemetry>,
    spec: FakeBrowserSpec,
    failed_downloads: u32,
    pub current: String,
    pub opened: Vec<String>,
}

impl FakeBrowser {
    pub fn new(telemetry: Arc<Telemetry>, spec: FakeBrowserSpec) -> Self {
        let active = telemetry.active_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        telemetry
            .max_active_sessions
            .fetch_max(active, Ordering::SeqCst);
        FakeBrowser {
            telemetry,
            spec,
            failed_downloads: 0,
            current: String::new(),
            opened: Vec::new(),
        }
    }
}

impl Browser for FakeBrowser {
    fn open(&mut self, url: &str, _settle: Duration) -> Result<(), SessionError> {
        self.opened.push(url.to_string());
        self.current = url.to_string();
        Ok(())
    }

    fn reload(&mut self, _settle: Duration) -> Result<(), SessionError> {
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, SessionError> {
        Ok(self.current.clone())
    }

    fn find(&mut self, locator: &Locator) -> Result<ElementHandle, SessionError> {
        Err(SessionError::NotFound {
            locator: locator.to_string(),
        })
    }

    fn find_all(&mut self, _locator: &Locator) -> Result<Vec<ElementHandle>, SessionError> {
        Ok(Vec::new())
    }

    fn find_from(
        &mut self,
        _parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<ElementHandle, SessionError> {
        Err(SessionError::NotFound {
            locator: locator.to_string(),
        })
    }

    fn find_all_from(
        &mut self,
        _parent: &ElementHandle,
        _locator: &Locator,
    ) -> Result<Vec<ElementHandle>, SessionError> {
        Ok(Vec::new())
    }

    fn click(&mut self, _element: &ElementHandle) -> Result<(), SessionError> {
        Ok(())
    }

    fn send_keys(&mut self, _element: &ElementHandle, _text: &str) -> Result<(), SessionError> {
        Ok(())
    }

    fn text(&mut self, _element: &ElementHandle) -> Result<String, SessionError> {
        Ok(String::new())
    }

    fn prop(&mut self, _element: &ElementHandle, _name: &str) -> Result<String, SessionError> {
        Ok(String::new())
    }

    fn download(&mut self, _url: &str, dest: &Path) -> Result<bool, SessionError> {
        self.telemetry
            .downloads_attempted
            .fetch_add(1, Ordering::SeqCst);

        if self.spec.always_fail_downloads {
            return Ok(false);
        }
        if self.failed_downloads < self.spec.fail_downloads_before_success {
            self.failed_downloads += 1;
            return Ok(false);
        }

        fs::write(dest, b"png").map_err(|source| SessionError::WriteFile {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(true)
    }
}

impl Drop for FakeBrowser {
    fn drop(&mut self) {
        self.telemetry
            .active_sessions
            .fetch_sub(1, Ordering::SeqCst);
    }
}

/// Hands out `FakeBrowser` sessions and keeps the telemetry honest.
pub struct StubFactory {
    telemetry: Arc<Telemetry>,
    spec: FakeBrowserSpec,
}

impl StubFactory {
    pub fn new(telemetry: Arc<Telemetry>, spec: FakeBrowserSpec) -> Self {
        StubFactory { telemetry, spec }
    }
}

impl SessionFactory for StubFactory {
    fn create(&self) -> Result<Box<dyn Browser>, SessionError> {
        self.telemetry
            .sessions_created
            .fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeBrowser::new(
            Arc::clone(&self.telemetry),
            self.spec,
        )))
    }
}

#[derive(Debug, Clone)]
pub struct MovieFixture {
    pub name: String,
    pub genres: Vec<String>,
    pub rating: f64,
    pub year: u32,
}

/// Fixture with unremarkable metadata under the given site name.
pub fn fixture(name: &str) -> MovieFixture {
    MovieFixture {
        name: name.to_string(),
        genres: vec!["Action".to_string()],
        rating: 7.5,
        year: 2000,
    }
}

/// Site extractor scripted against fake URLs instead of real markup.
///
/// Searches land on `fake://search/<title>`, results open
/// `fake://movie/<title>`, and every page read is answered from the
/// fixture registered for that title.
pub struct ScriptedExtractor {
    movies: HashMap<String, MovieFixture>,
    fail_lookup_for: HashSet<String>,
    stage_delay: Duration,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        ScriptedExtractor {
            movies: HashMap::new(),
            fail_lookup_for: HashSet::new(),
            stage_delay: Duration::ZERO,
        }
    }

    pub fn with_movie(mut self, search_title: &str, fixture: MovieFixture) -> Self {
        self.movies.insert(search_title.to_string(), fixture);
        self
    }

    /// Searches for this title find no results.
    pub fn failing_lookup(mut self, search_title: &str) -> Self {
        self.fail_lookup_for.insert(search_title.to_string());
        self
    }

    /// Inserts a pause into every page read, for concurrency assertions.
    pub fn with_stage_delay(mut self, delay: Duration) -> Self {
        self.stage_delay = delay;
        self
    }

    fn fixture_for(&self, browser: &mut dyn Browser) -> Result<&MovieFixture, SiteError> {
        let current = browser.current_url().map_err(SiteError::Session)?;
        let title = title_from(&current);
        self.movies
            .get(title)
            .ok_or_else(|| SiteError::ElementMissing {
                what: format!("movie page for '{title}'"),
            })
    }
}

impl SiteExtractor for ScriptedExtractor {
    fn home_url(&self) -> &str {
        "fake://home"
    }

    fn submit_search(&self, browser: &mut dyn Browser, title: &str) -> Result<(), SiteError> {
        browser.open(&format!("fake://search/{title}"), Duration::ZERO)?;
        Ok(())
    }

    fn first_result_url(&self, browser: &mut dyn Browser) -> Result<String, SiteError> {
        let current = browser.current_url().map_err(SiteError::Session)?;
        let title = title_from(&current);
        if self.fail_lookup_for.contains(title) {
            return Err(SiteError::ElementMissing {
                what: "search result list".to_string(),
            });
        }
        Ok(format!("fake://movie/{title}"))
    }

    fn movie_name(&self, browser: &mut dyn Browser) -> Result<String, SiteError> {
        thread::sleep(self.stage_delay);
        Ok(self.fixture_for(browser)?.name.clone())
    }

    fn genres(&self, browser: &mut dyn Browser) -> Result<Vec<String>, SiteError> {
        Ok(self.fixture_for(browser)?.genres.clone())
    }

    fn rating(&self, browser: &mut dyn Browser) -> Result<f64, SiteError> {
        Ok(self.fixture_for(browser)?.rating)
    }

    fn year(&self, browser: &mut dyn Browser) -> Result<u32, SiteError> {
        Ok(self.fixture_for(browser)?.year)
    }

    fn cover_image_url(&self, browser: &mut dyn Browser) -> Result<String, SiteError> {
        let current = browser.current_url().map_err(SiteError::Session)?;
        Ok(format!("fake://cover/{}.png", title_from(&current)))
    }
}

fn title_from(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or("")
}

pub struct StubTranslator {
    pub fail: bool,
}

impl Translator for StubTranslator {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        if self.fail {
            return Err(TranslateError::Service {
                status: 500,
                body: "translation service down".to_string(),
            });
        }
        Ok(format!("{text}-fa"))
    }
}

/// DOM-level fake for exercising site extractors against canned markup.
///
/// Elements are registered per locator, children per (parent, locator)
/// pair, and text/property reads are answered from lookup tables.
#[derive(Default)]
pub struct DomFakeBrowser {
    elements: HashMap<Locator, Vec<String>>,
    children: HashMap<(String, Locator), Vec<String>>,
    texts: HashMap<String, String>,
    props: HashMap<(String, String), String>,
    pub clicked: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub current: String,
    pub opened: Vec<String>,
}

impl DomFakeBrowser {
    pub fn new() -> Self {
        DomFakeBrowser::default()
    }

    pub fn with_element(mut self, locator: Locator, id: &str) -> Self {
        self.elements.entry(locator).or_default().push(id.to_string());
        self
    }

    pub fn with_child(mut self, parent: &str, locator: Locator, id: &str) -> Self {
        self.children
            .entry((parent.to_string(), locator))
            .or_default()
            .push(id.to_string());
        self
    }

    pub fn with_text(mut self, id: &str, text: &str) -> Self {
        self.texts.insert(id.to_string(), text.to_string());
        self
    }

    pub fn with_prop(mut self, id: &str, name: &str, value: &str) -> Self {
        self.props
            .insert((id.to_string(), name.to_string()), value.to_string());
        self
    }
}

impl Browser for DomFakeBrowser {
    fn open(&mut self, url: &str, _settle: Duration) -> Result<(), SessionError> {
        self.opened.push(url.to_string());
        self.current = url.to_string();
        Ok(())
    }

    fn reload(&mut self, _settle: Duration) -> Result<(), SessionError> {
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, SessionError> {
        Ok(self.current.clone())
    }

    fn find(&mut self, locator: &Locator) -> Result<ElementHandle, SessionError> {
        self.elements
            .get(locator)
            .and_then(|ids| ids.first())
            .map(|id| ElementHandle::new(id.as_str()))
            .ok_or_else(|| SessionError::NotFound {
                locator: locator.to_string(),
            })
    }

    fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>, SessionError> {
        Ok(self
            .elements
            .get(locator)
            .map(|ids| ids.iter().map(|id| ElementHandle::new(id.as_str())).collect())
            .unwrap_or_default())
    }

    fn find_from(
        &mut self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<ElementHandle, SessionError> {
        self.children
            .get(&(parent.id().to_string(), locator.clone()))
            .and_then(|ids| ids.first())
            .map(|id| ElementHandle::new(id.as_str()))
            .ok_or_else(|| SessionError::NotFound {
                locator: locator.to_string(),
            })
    }

    fn find_all_from(
        &mut self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, SessionError> {
        Ok(self
            .children
            .get(&(parent.id().to_string(), locator.clone()))
            .map(|ids| ids.iter().map(|id| ElementHandle::new(id.as_str())).collect())
            .unwrap_or_default())
    }

    fn click(&mut self, element: &ElementHandle) -> Result<(), SessionError> {
        self.clicked.push(element.id().to_string());
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> Result<(), SessionError> {
        self.typed
            .push((element.id().to_string(), text.to_string()));
        Ok(())
    }

    fn text(&mut self, element: &ElementHandle) -> Result<String, SessionError> {
        Ok(self
            .texts
            .get(element.id())
            .cloned()
            .unwrap_or_default())
    }

    fn prop(&mut self, element: &ElementHandle, name: &str) -> Result<String, SessionError> {
        Ok(self
            .props
            .get(&(element.id().to_string(), name.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn download(&mut self, _url: &str, dest: &Path) -> Result<bool, SessionError> {
        fs::write(dest, b"png").map_err(|source| SessionError::WriteFile {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(true)
    }
}
