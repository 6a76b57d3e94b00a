//! DuetClient - talks to a Duet controller over its HTTP API.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::Value;

use super::types::{PrinterError, PrinterGeneration, PrinterStatus};
use super::PrinterControl;

/// Timeout for establishing a connection to the controller (2 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Timeout for a whole request, including slow G-code acknowledgements.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// `rr_status?type=2` response; only the status letter matters here.
#[derive(Debug, Deserialize)]
struct StandaloneStatus {
    status: String,
}

/// Client for a single Duet 2 or Duet 3 controller.
///
/// The generation is detected once in [`DuetClient::connect`] and decides
/// which endpoints every later call uses.
pub struct DuetClient {
    base_url: String,
    generation: PrinterGeneration,
    http_client: Client,
}

impl std::fmt::Debug for DuetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuetClient")
            .field("base_url", &self.base_url)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Turn a `-duet` value into a base URL.
///
/// Bare hostnames get an `http://` scheme; explicit `http://` or `https://`
/// URLs are kept. Trailing slashes are dropped.
pub fn base_url_for(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}

impl DuetClient {
    /// Connect to the controller at `address` and detect its generation.
    ///
    /// # Errors
    /// * `PrinterError::ClientInit` - the HTTP client could not be built
    /// * `PrinterError::NotDetected` - neither a Duet 2 nor a Duet 3 answered
    pub fn connect(address: &str) -> Result<Self, PrinterError> {
        let base_url = base_url_for(address);

        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(PrinterError::ClientInit)?;

        let generation = detect_generation(&http_client, &base_url)?;
        log::info!("Connected to {} at {}", generation, base_url);

        Ok(Self {
            base_url,
            generation,
            http_client,
        })
    }

    /// Get the detected controller generation.
    pub fn generation(&self) -> PrinterGeneration {
        self.generation
    }

    fn check_command(command: &str, response: Response) -> Result<(), PrinterError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PrinterError::CommandRejected {
                command: command.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

impl PrinterControl for DuetClient {
    fn send_gcode(&self, command: &str) -> Result<(), PrinterError> {
        log::debug!("G-code -> {}", command);

        let response = match self.generation {
            PrinterGeneration::Duet2 => self
                .http_client
                .get(format!("{}/rr_gcode", self.base_url))
                .query(&[("gcode", command)])
                .send()?,
            PrinterGeneration::Duet3 => self
                .http_client
                .post(format!("{}/machine/code", self.base_url))
                .header("Content-Type", "text/plain")
                .body(command.to_string())
                .send()?,
        };

        Self::check_command(command, response)
    }

    fn status(&self) -> Result<PrinterStatus, PrinterError> {
        match self.generation {
            PrinterGeneration::Duet2 => {
                let body: StandaloneStatus = self
                    .http_client
                    .get(format!("{}/rr_status", self.base_url))
                    .query(&[("type", "2")])
                    .send()?
                    .error_for_status()?
                    .json()?;
                Ok(PrinterStatus::from_status_code(&body.status))
            }
            PrinterGeneration::Duet3 => {
                let body: Value = self
                    .http_client
                    .get(format!("{}/machine/status", self.base_url))
                    .send()?
                    .error_for_status()?
                    .json()?;
                object_model_status(&body).map(PrinterStatus::from_object_model)
            }
        }
    }
}

/// Extract `state.status` from a Duet 3 object model.
///
/// Older DSF releases wrap the model in a `result` object, newer ones don't.
fn object_model_status(body: &Value) -> Result<&str, PrinterError> {
    body.pointer("/result/state/status")
        .or_else(|| body.pointer("/state/status"))
        .and_then(Value::as_str)
        .ok_or_else(|| PrinterError::MalformedStatus(format!("no state.status in {}", body)))
}

/// Probe the standalone endpoints first, then DSF.
fn detect_generation(client: &Client, base_url: &str) -> Result<PrinterGeneration, PrinterError> {
    match probe_standalone(client, base_url) {
        Ok(true) => return Ok(PrinterGeneration::Duet2),
        Ok(false) => log::debug!("{}/rr_status did not look like RepRapFirmware", base_url),
        Err(e) => log::debug!("Duet 2 probe failed: {}", e),
    }

    match probe_dsf(client, base_url) {
        Ok(true) => return Ok(PrinterGeneration::Duet3),
        Ok(false) => log::debug!("{}/machine/status did not look like DSF", base_url),
        Err(e) => log::debug!("Duet 3 probe failed: {}", e),
    }

    Err(PrinterError::NotDetected {
        address: base_url.to_string(),
    })
}

fn probe_standalone(client: &Client, base_url: &str) -> Result<bool, reqwest::Error> {
    let response = client
        .get(format!("{}/rr_status", base_url))
        .query(&[("type", "1")])
        .send()?;
    if !response.status().is_success() {
        return Ok(false);
    }
    let body: Value = response.json()?;
    Ok(body.get("coords").is_some())
}

fn probe_dsf(client: &Client, base_url: &str) -> Result<bool, reqwest::Error> {
    let response = client.get(format!("{}/machine/status", base_url)).send()?;
    if !response.status().is_success() {
        return Ok(false);
    }
    let body: Value = response.json()?;
    Ok(body.get("result").is_some() || body.get("state").is_some())
}
