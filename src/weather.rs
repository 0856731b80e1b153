use serde::Deserialize;

/// Icon category for a WMO weather condition code.
///
/// The code table is a contract with the icon set; unrecognized codes fall
/// back to `Clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Condition {
    #[default]
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    Rain,
    Snow,
    Storm,
}

impl Condition {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1 | 2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 80 | 81 | 82 => Self::Rain,
            66 | 67 | 71 | 73 | 75 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Storm,
            _ => Self::Clear,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Overcast => "Overcast",
            Self::Fog => "Fog",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Storm => "Storm",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Clear => "\u{2600}",        // BLACK SUN WITH RAYS
            Self::PartlyCloudy => "\u{26C5}", // SUN BEHIND CLOUD
            Self::Overcast => "\u{2601}",     // CLOUD
            Self::Fog => "\u{1F32B}",         // FOG
            Self::Rain => "\u{1F327}",        // CLOUD WITH RAIN
            Self::Snow => "\u{2744}",         // SNOWFLAKE
            Self::Storm => "\u{26C8}",        // THUNDER CLOUD AND RAIN
        }
    }
}

/// A resolved place. Replaced wholesale on every successful search.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// The hardcoded startup location.
    pub fn berlin() -> Self {
        Self {
            display_name: "Berlin, Germany".to_string(),
            latitude: 52.52,
            longitude: 13.405,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggle(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindUnit {
    #[default]
    Kmh,
    Mph,
}

impl WindUnit {
    pub fn toggle(self) -> Self {
        match self {
            Self::Kmh => Self::Mph,
            Self::Mph => Self::Kmh,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Kmh => "km/h",
            Self::Mph => "mph",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecipitationUnit {
    #[default]
    Mm,
    Inches,
}

impl PrecipitationUnit {
    pub fn toggle(self) -> Self {
        match self {
            Self::Mm => Self::Inches,
            Self::Inches => Self::Mm,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Inches => "in",
        }
    }
}

/// The user's display units. Defaults to metric; survives re-fetches within
/// a session but is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitPreferences {
    pub temperature: TemperatureUnit,
    pub wind: WindUnit,
    pub precipitation: PrecipitationUnit,
}

impl UnitPreferences {
    pub fn imperial() -> Self {
        Self {
            temperature: TemperatureUnit::Fahrenheit,
            wind: WindUnit::Mph,
            precipitation: PrecipitationUnit::Inches,
        }
    }
}
