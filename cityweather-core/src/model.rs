use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::icon::IconKey;

/// Raw current observation as returned by a provider, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub city_name: String,
    pub country_code: String,
    pub temperature_c: f64,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub icon_code: String,
}

/// UI-ready snapshot of a successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel {
    pub temperature_celsius: i32,
    pub city_name: String,
    pub country_code: String,
    pub description: String,
    pub humidity_percent: u8,
    pub wind_speed: f64,
    pub icon_key: IconKey,
    /// When the response was processed locally, not a provider timestamp.
    pub observed_at: DateTime<Utc>,
}

impl DisplayModel {
    pub fn from_conditions(raw: CurrentConditions, observed_at: DateTime<Utc>) -> Self {
        Self {
            temperature_celsius: round_half_up(raw.temperature_c),
            icon_key: IconKey::from_code(&raw.icon_code),
            city_name: raw.city_name,
            country_code: raw.country_code,
            description: raw.description,
            humidity_percent: raw.humidity_pct,
            wind_speed: raw.wind_speed,
            observed_at,
        }
    }
}

/// Halves go towards positive infinity, so -2.5 becomes -2.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Idle,
    Loading,
    Success,
    Error,
}

/// Full observable state of the widget.
///
/// Only the controller mutates it. `result` survives a `Loading` phase so a
/// renderer may keep showing the last card, and is cleared on `Error`.
/// `error_message` is set only while `status` is `Error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryState {
    pub(crate) city: String,
    pub(crate) status: Status,
    pub(crate) result: Option<DisplayModel>,
    pub(crate) error_message: Option<String>,
}

impl QueryState {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            status: Status::Idle,
            result: None,
            error_message: None,
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn result(&self) -> Option<&DisplayModel> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    pub(crate) fn start_loading(&mut self) {
        self.status = Status::Loading;
        self.error_message = None;
    }

    pub(crate) fn succeed(&mut self, model: DisplayModel) {
        self.status = Status::Success;
        self.result = Some(model);
        self.error_message = None;
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.status = Status::Error;
        self.result = None;
        self.error_message = Some(message.into());
    }
}
