use std::io::Read;
use std::time::Duration;

use embedded_svc::http::client::Client;
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use log::debug;

use super::http::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// 送受信のチャンクサイズ
const CHUNK_SIZE: usize = 1024;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// ESP-IDF の HTTP クライアント (TLS は証明書バンドルで検証)
pub struct EspHttpTransport {
    timeout: Duration,
}

impl Default for EspHttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl EspHttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn connect(&self) -> Result<Client<EspHttpConnection>, TransportError> {
        let connection = EspHttpConnection::new(&Configuration {
            timeout: Some(self.timeout),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        })
        .map_err(|e| TransportError::Connection(format!("{:?}", e)))?;
        Ok(Client::wrap(connection))
    }
}

impl HttpTransport for EspHttpTransport {
    fn post(
        &mut self,
        request: &HttpRequest,
        body: &mut dyn Read,
        content_length: u64,
    ) -> Result<HttpResponse, TransportError> {
        use embedded_svc::io::Write;

        let mut client = self.connect()?;

        let content_length = content_length.to_string();
        let mut headers: Vec<(&str, &str)> = request
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        headers.push(("Content-Length", content_length.as_str()));

        let mut req = client
            .post(&request.url, &headers)
            .map_err(|e| TransportError::Connection(format!("{:?}", e)))?;

        let mut buf = [0u8; CHUNK_SIZE];
        let mut sent = 0usize;
        loop {
            let n = body.read(&mut buf)?;
            if n == 0 {
                break;
            }
            req.write_all(&buf[..n])
                .map_err(|e| TransportError::Write(format!("{:?}", e)))?;
            sent += n;
        }
        req.flush()
            .map_err(|e| TransportError::Write(format!("{:?}", e)))?;
        debug!("HTTP POST {} bytes 送信", sent);

        let mut response = req
            .submit()
            .map_err(|e| TransportError::Connection(format!("{:?}", e)))?;
        let status = response.status();

        let mut body = Vec::new();
        loop {
            let n = embedded_svc::io::Read::read(&mut response, &mut buf)
                .map_err(|e| TransportError::Read(format!("{:?}", e)))?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&buf[..n]);
        }
        debug!("HTTP {} ({} bytes)", status, body.len());

        Ok(HttpResponse { status, body })
    }
}
