//! Blocking SOAP 1.1 client for the `DailyInfo` web service.

use chrono::NaiveDate;
use tracing::{debug, info};

use super::{xml, Endpoint, RawSource, SERVICE_NAMESPACE};
use crate::config::{CbrConfig, ConfigError};
use crate::error::FetchError;
use crate::frame::Frame;

/// The real remote source: one POST per call, no retries.
pub struct SoapSource {
    client: reqwest::blocking::Client,
    endpoint_url: String,
}

impl SoapSource {
    pub fn new(config: &CbrConfig) -> Result<Self, ConfigError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
        })
    }

    /// POST an envelope and return the response body.
    fn call(&self, endpoint: &Endpoint, envelope: String) -> Result<String, FetchError> {
        let method = endpoint.method();
        let resp = self
            .client
            .post(&self.endpoint_url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{SERVICE_NAMESPACE}{method}\""))
            .body(envelope)
            .send()
            .map_err(|e| FetchError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| FetchError::NetworkUnreachable(e.to_string()))?;

        // Faults come back as HTTP 500 with a readable message.
        if let Some(message) = xml::soap_fault(&body) {
            return Err(FetchError::Soap {
                method: method.to_string(),
                message,
            });
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                method: method.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(body)
    }
}

impl RawSource for SoapSource {
    fn name(&self) -> &str {
        "cbr_daily_info"
    }

    fn fetch(
        &self,
        endpoint: &Endpoint,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Frame, FetchError> {
        let envelope = build_envelope(endpoint.method(), &endpoint.arguments(start, end));
        info!(method = endpoint.method(), %start, %end, "requesting");

        let body = self.call(endpoint, envelope)?;
        let frame = xml::parse_rows(&body, endpoint.row_tag())?;
        debug!(
            method = endpoint.method(),
            rows = frame.height(),
            columns = frame.width(),
            "parsed response"
        );
        Ok(frame)
    }
}

/// SOAP 1.1 envelope calling `method` with named arguments.
pub fn build_envelope(method: &str, arguments: &[(&str, String)]) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <soap:Envelope xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" \
         xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\"><soap:Body>",
    );
    out.push_str(&format!("<{method} xmlns=\"{SERVICE_NAMESPACE}\">"));
    for (name, value) in arguments {
        out.push_str(&format!("<{name}>{}</{name}>", escape(value)));
    }
    out.push_str(&format!("</{method}></soap:Body></soap:Envelope>"));
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
