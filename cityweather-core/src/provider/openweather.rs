use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{ConfigError, WeatherError},
    model::CurrentConditions,
};

use super::WeatherProvider;

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";
const SUCCESS_COD: f64 = 200.0;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .user_agent(concat!("cityweather/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch_body(&self, city: &str) -> Result<String, WeatherError> {
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("units", "metric"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                WeatherError::transport(format!("failed to send request to OpenWeather: {e}"))
            })?;

        // The HTTP status is not the discriminant; `cod` in the body is.
        tracing::debug!(status = %res.status(), "OpenWeather responded");

        res.text().await.map_err(|e| {
            WeatherError::transport(format!("failed to read OpenWeather response body: {e}"))
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_by_city(&self, city: &str) -> Result<CurrentConditions, WeatherError> {
        let body = self.fetch_body(city).await?;
        parse_current(&body)
    }
}

/// Interpret a `/data/2.5/weather` body.
fn parse_current(body: &str) -> Result<CurrentConditions, WeatherError> {
    let envelope: OwEnvelope = serde_json::from_str(body).map_err(|e| {
        WeatherError::transport(format!(
            "failed to parse OpenWeather JSON: {e}: {}",
            truncate_body(body)
        ))
    })?;

    if !envelope.is_success() {
        tracing::debug!(
            cod = ?envelope.cod,
            message = ?envelope.message,
            "OpenWeather reported a non-success code"
        );
        return Err(WeatherError::NotFound);
    }

    let parsed: OwCurrentResponse = serde_json::from_str(body).map_err(|e| {
        WeatherError::transport(format!("malformed OpenWeather current JSON: {e}"))
    })?;

    let weather = parsed
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::transport("OpenWeather response contained no weather entry"))?;

    Ok(CurrentConditions {
        city_name: parsed.name,
        country_code: parsed.sys.country,
        temperature_c: parsed.main.temp,
        description: weather.description,
        humidity_pct: parsed.main.humidity.round().clamp(0.0, 100.0) as u8,
        wind_speed: parsed.wind.speed,
        icon_code: weather.icon,
    })
}

/// Just the fields that decide success. OpenWeather sends `200` as a number
/// on success but `"404"` as a string on failure; only the number counts.
#[derive(Debug, Deserialize)]
struct OwEnvelope {
    cod: Option<serde_json::Value>,
    /// Only logged; its type varies between responses.
    message: Option<serde_json::Value>,
}

impl OwEnvelope {
    fn is_success(&self) -> bool {
        self.cod.as_ref().and_then(serde_json::Value::as_f64) == Some(SUCCESS_COD)
    }
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const DELHI: &str = r#"{
        "coord": {"lon": 77.2167, "lat": 28.6667},
        "weather": [{"id": 721, "main": "Haze", "description": "haze", "icon": "50d"}],
        "main": {"temp": 31.05, "feels_like": 33.2, "humidity": 48, "pressure": 1006},
        "wind": {"speed": 2.57, "deg": 290},
        "sys": {"country": "IN", "sunrise": 1717977264, "sunset": 1718027390},
        "name": "Delhi",
        "cod": 200
    }"#;

    const NOT_FOUND: &str = r#"{"cod":"404","message":"city not found"}"#;

    #[test]
    fn parses_success_body() {
        let raw = parse_current(DELHI).expect("valid body");

        assert_eq!(raw.city_name, "Delhi");
        assert_eq!(raw.country_code, "IN");
        assert_eq!(raw.temperature_c, 31.05);
        assert_eq!(raw.description, "haze");
        assert_eq!(raw.humidity_pct, 48);
        assert_eq!(raw.wind_speed, 2.57);
        assert_eq!(raw.icon_code, "50d");
    }

    #[test]
    fn string_or_numeric_non_success_cod_is_not_found() {
        assert_eq!(parse_current(NOT_FOUND), Err(WeatherError::NotFound));
        assert_eq!(
            parse_current(r#"{"cod":401,"message":"Invalid API key"}"#),
            Err(WeatherError::NotFound)
        );
        assert_eq!(parse_current("{}"), Err(WeatherError::NotFound));
    }

    #[test]
    fn success_cod_ignores_message_type() {
        let body = DELHI.replace(r#""cod": 200"#, r#""cod": 200, "message": 0"#);
        let raw = parse_current(&body).expect("cod 200 is success");
        assert_eq!(raw.city_name, "Delhi");

        let body = DELHI.replace(r#""cod": 200"#, r#""cod": 200, "message": {"note": 1}"#);
        assert!(parse_current(&body).is_ok());
    }

    #[test]
    fn string_200_cod_is_not_found() {
        let body = DELHI.replace(r#""cod": 200"#, r#""cod": "200""#);
        assert_eq!(parse_current(&body), Err(WeatherError::NotFound));
    }

    #[test]
    fn fractional_humidity_is_rounded() {
        let body = DELHI.replace(r#""humidity": 48"#, r#""humidity": 47.6"#);
        let raw = parse_current(&body).expect("valid body");
        assert_eq!(raw.humidity_pct, 48);
    }

    #[test]
    fn malformed_payloads_are_transport_errors() {
        for body in ["", "<html>bad gateway</html>", r#"{"cod":200,"name":"Delhi"}"#] {
            let err = parse_current(body).unwrap_err();
            assert!(matches!(err, WeatherError::Transport(_)), "body {body:?}");
        }
    }

    #[test]
    fn empty_weather_array_is_transport_error() {
        let body = DELHI.replace(
            r#"[{"id": 721, "main": "Haze", "description": "haze", "icon": "50d"}]"#,
            "[]",
        );
        assert!(matches!(parse_current(&body), Err(WeatherError::Transport(_))));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(300);
        assert_eq!(truncate_body(&body).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn sends_city_units_and_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", CURRENT_WEATHER_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "New Delhi".into()),
                Matcher::UrlEncoded("units".into(), "metric".into()),
                Matcher::UrlEncoded("appid".into(), "KEY".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(DELHI)
            .create_async()
            .await;

        let provider =
            OpenWeatherProvider::with_base_url("KEY".into(), &server.url()).expect("client");
        let raw = provider.current_by_city("New Delhi").await.expect("success");

        assert_eq!(raw.city_name, "Delhi");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_404_with_cod_body_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", CURRENT_WEATHER_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(NOT_FOUND)
            .create_async()
            .await;

        let provider =
            OpenWeatherProvider::with_base_url("KEY".into(), &server.url()).expect("client");
        let err = provider.current_by_city("Atlantis").await.unwrap_err();

        assert_eq!(err, WeatherError::NotFound);
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let provider =
            OpenWeatherProvider::with_base_url("KEY".into(), "http://127.0.0.1:9").expect("client");
        let err = provider.current_by_city("Delhi").await.unwrap_err();

        assert!(matches!(err, WeatherError::Transport(_)));
    }
}
