use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration, loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub library: LibraryConfig,

    #[serde(default)]
    pub workers: WorkersConfig,

    #[serde(default)]
    pub driver: DriverConfig,

    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub translate: TranslateConfig,
}

/// The folder of video files to enrich.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkersConfig {
    /// Number of crawl workers. Zero means one worker per scanned file.
    #[serde(default = "default_worker_count")]
    pub max_threads: usize,

    /// Tear the browser session down after every job instead of reusing it
    /// for the lifetime of the worker slot.
    #[serde(default)]
    pub isolate_sessions: bool,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        WorkersConfig {
            max_threads: default_worker_count(),
            isolate_sessions: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Chrome major version the bundled chromedriver matches.
    #[serde(default = "default_chrome_version")]
    pub chrome_version: String,

    /// Directory holding the chromedriver executables.
    #[serde(default = "default_driver_dir")]
    pub dir: PathBuf,

    #[serde(default)]
    pub headless: bool,
}

impl DriverConfig {
    /// Path of the chromedriver executable for the configured version,
    /// e.g. `drivers/chromedriver-117` (with `.exe` on Windows).
    pub fn executable(&self) -> PathBuf {
        self.dir.join(format!(
            "chromedriver-{}{}",
            self.chrome_version,
            std::env::consts::EXE_SUFFIX
        ))
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            chrome_version: default_chrome_version(),
            dir: default_driver_dir(),
            headless: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Settle delay after opening the site home page, in seconds.
    #[serde(default = "default_home_settle")]
    pub home_settle_secs: u64,

    /// Settle delay after opening a movie page, in seconds.
    #[serde(default = "default_page_settle")]
    pub page_settle_secs: u64,

    /// Settle delay after clicking the poster to reveal the full image.
    #[serde(default = "default_reveal_settle")]
    pub reveal_settle_secs: u64,

    /// Pause between failed cover download attempts, in seconds.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: u64,

    /// Maximum cover download attempts. Zero retries forever.
    #[serde(default)]
    pub max_cover_attempts: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        CrawlConfig {
            home_settle_secs: default_home_settle(),
            page_settle_secs: default_page_settle(),
            reveal_settle_secs: default_reveal_settle(),
            retry_backoff_secs: default_retry_backoff(),
            max_cover_attempts: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// LibreTranslate-compatible endpoint.
    #[serde(default = "default_translate_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        TranslateConfig {
            endpoint: default_translate_endpoint(),
            target_lang: default_target_lang(),
        }
    }
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

fn default_chrome_version() -> String {
    "117".to_string()
}

fn default_driver_dir() -> PathBuf {
    PathBuf::from("drivers")
}

fn default_home_settle() -> u64 {
    4
}

fn default_page_settle() -> u64 {
    2
}

fn default_reveal_settle() -> u64 {
    2
}

fn default_retry_backoff() -> u64 {
    1
}

fn default_translate_endpoint() -> String {
    "http://127.0.0.1:5000/translate".to_string()
}

fn default_target_lang() -> String {
    "fa".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_executable_includes_version() {
        let driver = DriverConfig {
            chrome_version: "117".to_string(),
            dir: PathBuf::from("drivers"),
            headless: false,
        };
        let expected = format!("chromedriver-117{}", std::env::consts::EXE_SUFFIX);
        assert_eq!(driver.executable(), PathBuf::from("drivers").join(expected));
    }

    #[test]
    fn workers_default_to_cpu_count() {
        let workers = WorkersConfig::default();
        assert_eq!(workers.max_threads, num_cpus::get());
        assert!(!workers.isolate_sessions);
    }
}
