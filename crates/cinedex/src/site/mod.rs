mod imdb;

pub use imdb::ImdbExtractor;

use crate::error::SiteError;
use crate::session::Browser;

/// Site-specific page knowledge: where to search and how to read the
/// metadata off a movie page.
///
/// Implementations assume the browser already sits on the right page for
/// each call; navigation order is the pipeline's job.
pub trait SiteExtractor: Send + Sync {
    /// Landing page carrying the search form.
    fn home_url(&self) -> &str;

    /// Types a title into the search form and submits it.
    fn submit_search(&self, browser: &mut dyn Browser, title: &str) -> Result<(), SiteError>;

    /// URL of the top search result on the current results page.
    fn first_result_url(&self, browser: &mut dyn Browser) -> Result<String, SiteError>;

    fn movie_name(&self, browser: &mut dyn Browser) -> Result<String, SiteError>;

    fn genres(&self, browser: &mut dyn Browser) -> Result<Vec<String>, SiteError>;

    fn rating(&self, browser: &mut dyn Browser) -> Result<f64, SiteError>;

    fn year(&self, browser: &mut dyn Browser) -> Result<u32, SiteError>;

    /// Reveals the poster viewer and returns the full-size image URL.
    fn cover_image_url(&self, browser: &mut dyn Browser) -> Result<String, SiteError>;
}
