use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Method;

use crate::cli::cancel::Cancellation;
use crate::cli::error::LegacyError;

pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Polls a URL until it answers with the expected status.
pub trait HttpProbe: Send + Sync {
    fn ensure_status(
        &self,
        url: &str,
        method: Method,
        body: Option<&str>,
        retries: u32,
        expected: u16,
    ) -> Result<(), LegacyError>;
}

pub struct ReqwestProbe {
    client: Client,
    interval: Duration,
    cancellation: Cancellation,
}

impl ReqwestProbe {
    pub fn new(interval: Duration, cancellation: Cancellation) -> Result<Self, LegacyError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LegacyError::CommandFailed {
                command: "http client".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            interval,
            cancellation,
        })
    }

    fn attempt(&self, url: &str, method: &Method, body: Option<&str>) -> Option<u16> {
        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        match request.send() {
            Ok(resp) => Some(resp.status().as_u16()),
            Err(e) => {
                tracing::debug!("{} not reachable yet: {}", url, e);
                None
            }
        }
    }
}

impl HttpProbe for ReqwestProbe {
    #[tracing::instrument(name = "Wait for HTTP status", skip(self, body))]
    fn ensure_status(
        &self,
        url: &str,
        method: Method,
        body: Option<&str>,
        retries: u32,
        expected: u16,
    ) -> Result<(), LegacyError> {
        for attempt in 1..=retries {
            self.cancellation.check()?;

            match self.attempt(url, &method, body) {
                Some(status) if status == expected => {
                    tracing::debug!("{} answered {} after {} attempts", url, status, attempt);
                    return Ok(());
                }
                Some(status) => tracing::debug!("{} answered {}, expecting {}", url, status, expected),
                None => {}
            }

            if attempt < retries {
                thread::sleep(self.interval);
            }
        }

        Err(LegacyError::NotReady {
            url: url.to_string(),
            attempts: retries,
        })
    }
}
