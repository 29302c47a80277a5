use chrono::{DateTime, Local, Utc};
use cityweather_core::{DisplayModel, IconKey, QueryState, Status};

/// Text for the current state, as the widget would paint it.
pub fn render_state(state: &QueryState) -> String {
    match state.status() {
        Status::Idle => format!("Search City: {}", state.city()),
        Status::Loading => "Loading...".to_string(),
        Status::Error => format!(
            "error: {}",
            state.error_message().unwrap_or("Error fetching weather data")
        ),
        Status::Success => match state.result() {
            Some(model) => render_card(model, &format_observed_at(model.observed_at)),
            None => String::new(),
        },
    }
}

fn render_card(model: &DisplayModel, observed_at: &str) -> String {
    format!(
        "{glyph} {temp}°C\n\
         {city}, {country}\n\
         {description}\n\
         {observed_at}\n\
         Humidity: {humidity}%   Wind Speed: {wind} km/h",
        glyph = icon_glyph(model.icon_key),
        temp = model.temperature_celsius,
        city = model.city_name,
        country = model.country_code,
        description = model.description,
        humidity = model.humidity_percent,
        wind = model.wind_speed,
    )
}

fn format_observed_at(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%-d/%-m/%Y, %-I:%M:%S %p").to_string()
}

fn icon_glyph(icon: IconKey) -> &'static str {
    match icon {
        IconKey::Clear => "☀",
        IconKey::Cloud => "☁",
        IconKey::Drizzle => "🌦",
        IconKey::Rain => "🌧",
        IconKey::Snow => "❄",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn model() -> DisplayModel {
        DisplayModel {
            temperature_celsius: 31,
            city_name: "Delhi".into(),
            country_code: "IN".into(),
            description: "haze".into(),
            humidity_percent: 48,
            wind_speed: 2.57,
            icon_key: IconKey::Cloud,
            observed_at: Utc.with_ymd_and_hms(2024, 6, 10, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn card_shows_every_field() {
        let card = render_card(&model(), "10/6/2024, 2:00:00 PM");

        assert_eq!(
            card,
            "☁ 31°C\nDelhi, IN\nhaze\n10/6/2024, 2:00:00 PM\nHumidity: 48%   Wind Speed: 2.57 km/h"
        );
    }

    #[test]
    fn idle_state_shows_city_input() {
        let state = QueryState::new("Delhi");
        assert_eq!(render_state(&state), "Search City: Delhi");
    }

    #[test]
    fn every_icon_has_a_glyph() {
        for icon in IconKey::ALL {
            assert!(!icon_glyph(icon).is_empty());
        }
    }
}
