use std::thread;
use std::time::Duration;

use crate::error::SiteError;
use crate::session::{Browser, Locator};
use crate::site::SiteExtractor;

const HOME_URL: &str = "https://www.imdb.com";

/// Index of the metadata list that carries the release year link on a
/// movie page, counting every `<ul>` on the page in document order.
const YEAR_LIST_INDEX: usize = 13;

/// Knows its way around IMDB's markup as of the current page layout.
pub struct ImdbExtractor {
    reveal_settle: Duration,
}

impl ImdbExtractor {
    pub fn new(reveal_settle: Duration) -> Self {
        ImdbExtractor { reveal_settle }
    }
}

impl SiteExtractor for ImdbExtractor {
    fn home_url(&self) -> &str {
        HOME_URL
    }

    fn submit_search(&self, browser: &mut dyn Browser, title: &str) -> Result<(), SiteError> {
        let input = browser.find(&Locator::Id("suggestion-search".to_string()))?;
        browser.send_keys(&input, title)?;
        let button = browser.find(&Locator::Id("suggestion-search-button".to_string()))?;
        browser.click(&button)?;
        Ok(())
    }

    fn first_result_url(&self, browser: &mut dyn Browser) -> Result<String, SiteError> {
        let list = browser
            .find(&Locator::Css(".ipc-metadata-list".to_string()))
            .map_err(|err| missing(err, "search result list"))?;
        let first = browser
            .find_from(&list, &Locator::Tag("li".to_string()))
            .map_err(|err| missing(err, "first search result"))?;
        let link = browser
            .find_from(&first, &Locator::Tag("a".to_string()))
            .map_err(|err| missing(err, "search result link"))?;
        Ok(browser.prop(&link, "href")?)
    }

    fn movie_name(&self, browser: &mut dyn Browser) -> Result<String, SiteError> {
        let heading = browser
            .find(&Locator::Tag("h1".to_string()))
            .map_err(|err| missing(err, "movie title heading"))?;
        Ok(browser.text(&heading)?.trim().to_string())
    }

    fn genres(&self, browser: &mut dyn Browser) -> Result<Vec<String>, SiteError> {
        let chip_list = browser
            .find(&Locator::Css(".ipc-chip-list".to_string()))
            .map_err(|err| missing(err, "genre chip list"))?;
        let chips = browser.find_all_from(&chip_list, &Locator::Tag("span".to_string()))?;

        let mut genres = Vec::with_capacity(chips.len());
        for chip in &chips {
            let text = browser.text(chip)?.trim().to_string();
            if !text.is_empty() {
                genres.push(text);
            }
        }
        Ok(genres)
    }

    fn rating(&self, browser: &mut dyn Browser) -> Result<f64, SiteError> {
        let rating = browser
            .find(&Locator::XPath(
                "//a[@aria-label='View User Ratings']/span/div/div[2]/div/span".to_string(),
            ))
            .map_err(|err| missing(err, "rating badge"))?;
        let text = browser.text(&rating)?;
        parse_rating(&text)
    }

    fn year(&self, browser: &mut dyn Browser) -> Result<u32, SiteError> {
        let lists = browser.find_all(&Locator::Tag("ul".to_string()))?;
        let list = lists
            .get(YEAR_LIST_INDEX)
            .ok_or_else(|| SiteError::ElementMissing {
                what: format!(
                    "metadata list {} of {} on movie page",
                    YEAR_LIST_INDEX,
                    lists.len()
                ),
            })?;
        let link = browser
            .find_from(list, &Locator::Tag("a".to_string()))
            .map_err(|err| missing(err, "release year link"))?;
        let text = browser.text(&link)?;
        parse_year(&text)
    }

    fn cover_image_url(&self, browser: &mut dyn Browser) -> Result<String, SiteError> {
        let poster = browser
            .find(&Locator::Css(".ipc-poster".to_string()))
            .map_err(|err| missing(err, "poster thumbnail"))?;
        browser.click(&poster)?;
        thread::sleep(self.reveal_settle);

        let viewer = browser
            .find(&Locator::Css(".media-viewer".to_string()))
            .map_err(|err| missing(err, "poster media viewer"))?;
        let image = browser
            .find_from(&viewer, &Locator::Tag("img".to_string()))
            .map_err(|err| missing(err, "full-size poster image"))?;
        Ok(browser.prop(&image, "src")?)
    }
}

/// Turns a "not found" lookup into a page-level error naming what the
/// crawl was after; everything else stays a session error.
fn missing(err: crate::error::SessionError, what: &str) -> SiteError {
    match err {
        crate::error::SessionError::NotFound { .. } => SiteError::ElementMissing {
            what: what.to_string(),
        },
        other => SiteError::Session(other),
    }
}

fn parse_rating(text: &str) -> Result<f64, SiteError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| SiteError::Malformed {
            what: "rating".to_string(),
            text: text.to_string(),
        })
}

fn parse_year(text: &str) -> Result<u32, SiteError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| SiteError::Malformed {
            what: "release year".to_string(),
            text: text.to_string(),
        })
}
