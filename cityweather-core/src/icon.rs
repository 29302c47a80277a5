use serde::Serialize;

/// Logical icon shown next to the current conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconKey {
    Clear,
    Cloud,
    Drizzle,
    Rain,
    Snow,
}

impl IconKey {
    /// Used for any provider code the table does not know.
    pub const DEFAULT: IconKey = IconKey::Clear;

    pub const ALL: [IconKey; 5] = [
        IconKey::Clear,
        IconKey::Cloud,
        IconKey::Drizzle,
        IconKey::Rain,
        IconKey::Snow,
    ];

    /// Resolve an OpenWeather icon code (e.g. `"10n"`).
    ///
    /// Thunderstorm codes (`11x`) map to drizzle and mist (`50x`) is not
    /// listed, so it falls back to [`IconKey::DEFAULT`].
    pub fn from_code(code: &str) -> IconKey {
        match code {
            "01d" | "01n" => IconKey::Clear,
            "02d" | "02n" | "03d" | "03n" | "04d" | "04n" => IconKey::Cloud,
            "09d" | "09n" | "10d" | "10n" => IconKey::Rain,
            "11d" | "11n" => IconKey::Drizzle,
            "13d" | "13n" => IconKey::Snow,
            _ => IconKey::DEFAULT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IconKey::Clear => "clear",
            IconKey::Cloud => "cloud",
            IconKey::Drizzle => "drizzle",
            IconKey::Rain => "rain",
            IconKey::Snow => "snow",
        }
    }
}

impl std::fmt::Display for IconKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
