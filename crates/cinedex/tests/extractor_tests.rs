//! IMDB markup navigation, exercised against a canned DOM.

mod common;

use std::time::Duration;

use cinedex::error::SiteError;
use cinedex::session::Locator;
use cinedex::site::{ImdbExtractor, SiteExtractor};

use common::DomFakeBrowser;

fn extractor() -> ImdbExtractor {
    ImdbExtractor::new(Duration::ZERO)
}

#[test]
fn search_types_the_title_and_clicks_the_button() {
    let mut browser = DomFakeBrowser::new()
        .with_element(Locator::Id("suggestion-search".to_string()), "box")
        .with_element(Locator::Id("suggestion-search-button".to_string()), "btn");

    extractor().submit_search(&mut browser, "Inception").unwrap();

    assert!(browser
        .typed
        .contains(&("box".to_string(), "Inception".to_string())));
    assert!(browser.clicked.contains(&"btn".to_string()));
}

#[test]
fn first_result_href_is_returned() {
    let mut browser = DomFakeBrowser::new()
        .with_element(Locator::Css(".ipc-metadata-list".to_string()), "list")
        .with_child("list", Locator::Tag("li".to_string()), "li-0")
        .with_child("li-0", Locator::Tag("a".to_string()), "a-0")
        .with_prop("a-0", "href", "https://www.imdb.com/title/tt1375666/");

    let url = extractor().first_result_url(&mut browser).unwrap();
    assert_eq!(url, "https://www.imdb.com/title/tt1375666/");
}

#[test]
fn missing_result_list_is_a_page_error() {
    let mut browser = DomFakeBrowser::new();

    let err = extractor().first_result_url(&mut browser).unwrap_err();
    assert!(matches!(
        err,
        SiteError::ElementMissing { what } if what == "search result list"
    ));
}

#[test]
fn movie_name_is_the_trimmed_heading() {
    let mut browser = DomFakeBrowser::new()
        .with_element(Locator::Tag("h1".to_string()), "h1-0")
        .with_text("h1-0", "  Inception\n");

    assert_eq!(extractor().movie_name(&mut browser).unwrap(), "Inception");
}

#[test]
fn genres_skip_empty_chips() {
    let mut browser = DomFakeBrowser::new()
        .with_element(Locator::Css(".ipc-chip-list".to_string()), "chips")
        .with_child("chips", Locator::Tag("span".to_string()), "g-0")
        .with_child("chips", Locator::Tag("span".to_string()), "g-1")
        .with_child("chips", Locator::Tag("span".to_string()), "g-2")
        .with_text("g-0", "Action")
        .with_text("g-2", " Drama ");

    let genres = extractor().genres(&mut browser).unwrap();
    assert_eq!(genres, vec!["Action", "Drama"]);
}

#[test]
fn rating_reads_the_badge() {
    let xpath = "//a[@aria-label='View User Ratings']/span/div/div[2]/div/span";
    let mut browser = DomFakeBrowser::new()
        .with_element(Locator::XPath(xpath.to_string()), "badge")
        .with_text("badge", "8.8");

    assert_eq!(extractor().rating(&mut browser).unwrap(), 8.8);
}

#[test]
fn non_numeric_rating_badge_is_malformed() {
    let xpath = "//a[@aria-label='View User Ratings']/span/div/div[2]/div/span";
    let mut browser = DomFakeBrowser::new()
        .with_element(Locator::XPath(xpath.to_string()), "badge")
        .with_text("badge", "N/A");

    let err = extractor().rating(&mut browser).unwrap_err();
    assert!(matches!(err, SiteError::Malformed { what, .. } if what == "rating"));
}

#[test]
fn year_comes_from_the_fourteenth_list() {
    let mut browser = DomFakeBrowser::new();
    for i in 0..14 {
        browser = browser.with_element(Locator::Tag("ul".to_string()), &format!("ul-{i}"));
    }
    browser = browser
        .with_child("ul-13", Locator::Tag("a".to_string()), "year-link")
        .with_text("year-link", "2010");

    assert_eq!(extractor().year(&mut browser).unwrap(), 2010);
}

#[test]
fn year_fails_when_the_page_has_too_few_lists() {
    let mut browser = DomFakeBrowser::new();
    for i in 0..3 {
        browser = browser.with_element(Locator::Tag("ul".to_string()), &format!("ul-{i}"));
    }

    let err = extractor().year(&mut browser).unwrap_err();
    assert!(matches!(
        err,
        SiteError::ElementMissing { what } if what.contains("metadata list")
    ));
}

#[test]
fn cover_flow_clicks_the_poster_and_reads_the_viewer_image() {
    let mut browser = DomFakeBrowser::new()
        .with_element(Locator::Css(".ipc-poster".to_string()), "poster")
        .with_element(Locator::Css(".media-viewer".to_string()), "viewer")
        .with_child("viewer", Locator::Tag("img".to_string()), "img-0")
        .with_prop("img-0", "src", "https://m.media-amazon.com/poster.jpg");

    let url = extractor().cover_image_url(&mut browser).unwrap();
    assert_eq!(url, "https://m.media-amazon.com/poster.jpg");
    assert!(browser.clicked.contains(&"poster".to_string()));
}
