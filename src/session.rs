//! The single mutable session: current location, cached forecast payload,
//! selected display units. Owned by the orchestrator and overwritten in
//! place; there is no teardown and nothing is persisted.

use crate::openmeteo::forecast::ForecastPayload;
use crate::weather::{Location, PrecipitationUnit, TemperatureUnit, UnitPreferences, WindUnit};

/// One unit-selection event from the units menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitChoice {
    Temperature(TemperatureUnit),
    Wind(WindUnit),
    Precipitation(PrecipitationUnit),
}

#[derive(Debug, Clone)]
pub struct Session {
    location: Location,
    payload: Option<ForecastPayload>,
    pub units: UnitPreferences,
}

impl Session {
    pub fn new(location: Location, units: UnitPreferences) -> Self {
        Self {
            location,
            payload: None,
            units,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn payload(&self) -> Option<&ForecastPayload> {
        self.payload.as_ref()
    }

    /// Replaces the resolved location and its payload atomically.
    pub fn set_location_and_payload(&mut self, location: Location, payload: ForecastPayload) {
        self.location = location;
        self.payload = Some(payload);
    }

    /// Applies a unit selection. Returns `true` when a payload is already
    /// cached, i.e. the caller should re-render immediately from cache —
    /// a unit change never triggers a network call.
    pub fn set_unit(&mut self, choice: UnitChoice) -> bool {
        match choice {
            UnitChoice::Temperature(u) => self.units.temperature = u,
            UnitChoice::Wind(u) => self.units.wind = u,
            UnitChoice::Precipitation(u) => self.units.precipitation = u,
        }
        self.payload.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Location::berlin(), UnitPreferences::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_change_without_payload_cannot_rerender() {
        let mut session = Session::default();
        assert!(!session.set_unit(UnitChoice::Temperature(TemperatureUnit::Fahrenheit)));
        assert_eq!(session.units.temperature, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn unit_change_with_cached_payload_rerenders() {
        let mut session = Session::default();
        session.set_location_and_payload(Location::berlin(), ForecastPayload::default());
        assert!(session.set_unit(UnitChoice::Wind(WindUnit::Mph)));
        assert_eq!(session.units.wind, WindUnit::Mph);
        // The other unit groups are untouched.
        assert_eq!(session.units.temperature, TemperatureUnit::Celsius);
        assert_eq!(session.units.precipitation, PrecipitationUnit::Mm);
    }

    #[test]
    fn payload_is_replaced_wholesale() {
        let mut session = Session::default();
        session.set_location_and_payload(Location::berlin(), ForecastPayload::default());
        let paris = Location {
            display_name: "Paris, France".into(),
            latitude: 48.8566,
            longitude: 2.3522,
        };
        session.set_location_and_payload(paris.clone(), ForecastPayload::default());
        assert_eq!(session.location(), &paris);
        assert!(session.payload().is_some());
    }
}
