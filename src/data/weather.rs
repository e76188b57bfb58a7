//! OpenWeatherMap forecast integration.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::domain::WeatherSnapshot;
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

/// Only the first 3-hour interval is used.
const FORECAST_COUNT: &str = "1";

pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, AppError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            AppError::config("Missing OPENWEATHER_API_KEY in environment (.env) or `weather.api_key` in config.")
        })?;
        Ok(Self::new(config.base_url.clone(), api_key))
    }

    /// Fetch today's forecast for `city` (e.g. `"Perth,AU"`).
    pub fn fetch_forecast(&self, city: &str) -> Result<WeatherSnapshot, AppError> {
        tracing::debug!(city, url = %self.base_url, "requesting forecast");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("cnt", FORECAST_COUNT),
                ("units", "metric"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .map_err(|e| AppError::weather(format!("Weather request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| AppError::weather(format!("Failed to read weather response: {e}")))?;

        let snapshot = parse_forecast(&body).map_err(|e| {
            if status.is_success() {
                e
            } else {
                AppError::weather(format!("{e} (HTTP status {status})"))
            }
        })?;

        tracing::info!(
            city,
            max_temp = snapshot.max_temp,
            rain_mm = snapshot.rain_mm,
            cloud_pct = snapshot.cloud_pct,
            "fetched forecast"
        );
        Ok(snapshot)
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastEntry>,
    /// Error text the service returns instead of `list` (bad key, unknown city).
    #[serde(default)]
    message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    main: MainBlock,
    #[serde(default)]
    rain: Option<RainBlock>,
    clouds: CloudBlock,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct RainBlock {
    #[serde(rename = "3h", default)]
    three_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CloudBlock {
    all: f64,
}

/// Extract today's snapshot from a forecast response body.
///
/// Rain defaults to 0 when `rain` or `rain.3h` is absent. A body with no
/// forecast entries is an error, whatever the reason.
pub fn parse_forecast(body: &str) -> Result<WeatherSnapshot, AppError> {
    let parsed: ForecastResponse = serde_json::from_str(body)
        .map_err(|e| AppError::weather(format!("Failed to fetch weather forecast: invalid response ({e}).")))?;

    let Some(first) = parsed.list.into_iter().next() else {
        let detail = match parsed.message {
            Some(serde_json::Value::String(m)) if !m.is_empty() => format!(": {m}"),
            _ => String::new(),
        };
        return Err(AppError::weather(format!("Failed to fetch weather forecast{detail}.")));
    };

    Ok(WeatherSnapshot {
        max_temp: first.main.temp_max,
        rain_mm: first.rain.and_then(|r| r.three_hour).unwrap_or(0.0),
        cloud_pct: first.clouds.all,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve one canned HTTP response and hand back the request line.
    fn serve_once(status: &str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/forecast", listener.local_addr().unwrap());
        let status = status.to_string();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
            }
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
            request_line.trim_end().to_string()
        });
        (base_url, handle)
    }

    #[test]
    fn parses_first_entry_with_rain() {
        let body = r#"{"cod":"200","list":[
            {"main":{"temp":27.1,"temp_max":31.4},"rain":{"3h":1.25},"clouds":{"all":75}},
            {"main":{"temp_max":20.0},"clouds":{"all":0}}
        ]}"#;
        let snap = parse_forecast(body).unwrap();
        assert_eq!(snap.max_temp, 31.4);
        assert_eq!(snap.rain_mm, 1.25);
        assert_eq!(snap.cloud_pct, 75.0);
    }

    #[test]
    fn missing_rain_defaults_to_zero() {
        let body = r#"{"list":[{"main":{"temp_max":22.0},"clouds":{"all":2}}]}"#;
        assert_eq!(parse_forecast(body).unwrap().rain_mm, 0.0);

        let body = r#"{"list":[{"main":{"temp_max":22.0},"rain":{"1h":0.4},"clouds":{"all":2}}]}"#;
        assert_eq!(parse_forecast(body).unwrap().rain_mm, 0.0);
    }

    #[test]
    fn empty_list_is_a_weather_error() {
        let err = parse_forecast(r#"{"cod":"200","list":[]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Weather);
    }

    #[test]
    fn service_error_message_is_surfaced() {
        let body = r#"{"cod":401,"message":"Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."}"#;
        let err = parse_forecast(body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Weather);
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[test]
    fn non_json_body_is_a_weather_error() {
        let err = parse_forecast("<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Weather);
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let config = WeatherConfig {
            api_key: None,
            ..WeatherConfig::default()
        };
        let err = WeatherClient::from_config(&config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn fetch_sends_forecast_query_and_reads_first_entry() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"cod":"200","list":[{"main":{"temp_max":29.5},"rain":{"3h":0.6},"clouds":{"all":40}}]}"#,
        );
        let client = WeatherClient::new(base_url, "secret-key");

        let snap = client.fetch_forecast("Perth,AU").unwrap();
        assert_eq!(
            snap,
            WeatherSnapshot {
                max_temp: 29.5,
                rain_mm: 0.6,
                cloud_pct: 40.0,
            }
        );

        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("GET /forecast?"), "{request_line}");
        for param in ["q=Perth%2CAU", "cnt=1", "units=metric", "appid=secret-key"] {
            assert!(request_line.contains(param), "missing {param} in {request_line}");
        }
    }

    #[test]
    fn unauthorized_response_is_a_weather_error_with_status() {
        let (base_url, server) = serve_once(
            "401 Unauthorized",
            r#"{"cod":401,"message":"Invalid API key."}"#,
        );
        let client = WeatherClient::new(base_url, "bad-key");

        let err = client.fetch_forecast("Perth,AU").unwrap_err();
        server.join().unwrap();
        assert_eq!(err.kind(), ErrorKind::Weather);
        let msg = err.to_string();
        assert!(msg.contains("HTTP status 401"), "{msg}");
        assert!(msg.contains("Invalid API key"), "{msg}");
    }
}
