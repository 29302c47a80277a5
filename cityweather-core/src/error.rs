use thiserror::Error;

/// Message shown when a lookup is attempted with blank input.
pub const VALIDATION_MESSAGE: &str = "Please enter a city name";
pub const NOT_FOUND_MESSAGE: &str = "City not found";
pub const TRANSPORT_MESSAGE: &str = "Error fetching weather data";

/// Failure of a single lookup attempt. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// Blank or whitespace-only city input. No request is made.
    #[error("Please enter a city name")]
    Validation,

    /// The provider answered with a non-success `cod`.
    #[error("City not found")]
    NotFound,

    /// Network failure, unreadable body or malformed payload.
    /// The detail is only meant for logs.
    #[error("Error fetching weather data")]
    Transport(String),
}

impl WeatherError {
    pub fn transport(detail: impl std::fmt::Display) -> Self {
        WeatherError::Transport(detail.to_string())
    }

    /// Text a rendering layer should show for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Validation => VALIDATION_MESSAGE,
            WeatherError::NotFound => NOT_FOUND_MESSAGE,
            WeatherError::Transport(_) => TRANSPORT_MESSAGE,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "No OpenWeather API key configured.\n\
         Hint: set OPENWEATHER_API_KEY or run `cityweather configure`."
    )]
    MissingApiKey,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
