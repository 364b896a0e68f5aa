use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::SessionError;

const READY_TIMEOUT: Duration = Duration::from_secs(10);
const READY_POLL_STEP: Duration = Duration::from_millis(200);

/// A chromedriver process bound to a free local port.
///
/// The process is killed when the value is dropped.
#[derive(Debug)]
pub struct ChromeDriver {
    child: Child,
    base_url: String,
}

impl ChromeDriver {
    /// Spawns chromedriver and waits until its status endpoint reports ready.
    pub fn launch(executable: &Path) -> Result<Self, SessionError> {
        let port = free_port()?;
        let child = Command::new(executable)
            .arg(format!("--port={port}"))
            .arg("--log-level=SEVERE")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SessionError::SpawnDriver {
                path: executable.to_path_buf(),
                source,
            })?;

        let mut driver = ChromeDriver {
            child,
            base_url: format!("http://127.0.0.1:{port}"),
        };
        driver.wait_ready()?;
        debug!("chromedriver ready on port {port}");
        Ok(driver)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn wait_ready(&mut self) -> Result<(), SessionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;
        let status_url = format!("{}/status", self.base_url);
        let deadline = Instant::now() + READY_TIMEOUT;

        while Instant::now() < deadline {
            if let Ok(response) = client.get(&status_url).send() {
                let body: serde_json::Value = response.json().unwrap_or_default();
                if body
                    .pointer("/value/ready")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false)
                {
                    return Ok(());
                }
            }

            if let Ok(Some(status)) = self.child.try_wait() {
                return Err(SessionError::DriverUnavailable {
                    details: format!("chromedriver exited early with status {status}"),
                });
            }

            thread::sleep(READY_POLL_STEP);
        }

        let _ = self.child.kill();
        let _ = self.child.wait();
        Err(SessionError::DriverUnavailable {
            details: format!("no ready signal from {status_url} within {READY_TIMEOUT:?}"),
        })
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn free_port() -> Result<u16, SessionError> {
    let listener =
        TcpListener::bind("127.0.0.1:0").map_err(|source| SessionError::DriverUnavailable {
            details: format!("free port bind failed: {source}"),
        })?;
    listener
        .local_addr()
        .map(|addr| addr.port())
        .map_err(|source| SessionError::DriverUnavailable {
            details: format!("local addr lookup failed: {source}"),
        })
}
