use reqwest::{Response, Url};

use crate::error::{GatewayError, GatewayResult};

pub mod city;
pub mod forecast;
pub mod location;
pub mod prediction;

pub use city::CityWeatherGateway;
pub use forecast::WeatherGateway;
pub use location::{GeolocationOptions, GeolocationSource, LocationResolver};
pub use prediction::PredictionGateway;

/// Read a response body, turning non-success statuses into
/// [`GatewayError::Status`] labelled with `label`.
async fn read_body(res: Response, label: &'static str) -> GatewayResult<String> {
    let status = res.status();

    if !status.is_success() {
        let url = res.url().clone();
        // Only logged; a broken error body must not hide the status.
        let body = res.text().await.unwrap_or_default();
        tracing::debug!(%url, %status, body = %truncate_body(&body), "request failed");
        return Err(GatewayError::status(label, status));
    }

    Ok(res.text().await?)
}

fn invalid_url(base: &str, err: impl std::fmt::Display) -> GatewayError {
    GatewayError::InvalidUrl(format!("{base}: {err}"))
}

/// Append `path` to a configured base URL, keeping any path prefix the
/// base already has.
fn endpoint(base: &str, path: &str) -> GatewayResult<Url> {
    let mut url = Url::parse(base).map_err(|e| invalid_url(base, e))?;
    if !url.path().ends_with('/') {
        let prefix = format!("{}/", url.path());
        url.set_path(&prefix);
    }

    url.join(path.trim_start_matches('/')).map_err(|e| invalid_url(base, e))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn endpoint_joins_absolute_path() {
        let url = endpoint("http://localhost:5000", "/api/meteo/ip").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/meteo/ip");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let url = endpoint("http://host:5000/nimbus", "/api/meteo/ip").unwrap();
        assert_eq!(url.as_str(), "http://host:5000/nimbus/api/meteo/ip");

        let url = endpoint("http://host:5000/nimbus/", "/api/meteo/coords").unwrap();
        assert_eq!(url.as_str(), "http://host:5000/nimbus/api/meteo/coords");
    }

    #[test]
    fn endpoint_rejects_garbage_base() {
        let err = endpoint("not a url", "/api/meteo/ip").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidUrl(_)));
        assert!(err.to_string().starts_with("URL inválida: not a url"));
    }

    #[tokio::test]
    async fn status_wins_over_broken_error_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Promises a longer body than it sends, then hangs up.
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 1000\r\n\r\npartial",
                )
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let res = reqwest::get(format!("http://{addr}/api/meteo/coords"))
            .await
            .unwrap();
        let err = read_body(res, "HTTP").await.unwrap_err();

        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let long = "ñ".repeat(300);
        let cut = truncate_body(&long);
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
