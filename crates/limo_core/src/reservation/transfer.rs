use std::fmt;

use serde::{Deserialize, Serialize};

use crate::labels::canonical_label;

/// What a leg of a transfer points at, and therefore which fields it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegKind {
    Address,
    Airport,
    CruisePort,
}

/// Closed set of transfer types understood by the booking API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferType {
    #[serde(rename = "airport_to_city")]
    AirportToCity,
    #[serde(rename = "airport_to_airport")]
    AirportToAirport,
    #[serde(rename = "airport_to_cruise_port")]
    AirportToCruisePort,
    #[serde(rename = "city_to_city")]
    CityToCity,
    #[serde(rename = "city_to_airport")]
    CityToAirport,
    #[serde(rename = "city_to_cruise_port")]
    CityToCruisePort,
    #[serde(rename = "cruise_to_airport")]
    CruiseToAirport,
    #[serde(rename = "cruise_port_to_city")]
    CruisePortToCity,
}

/// Canonical labels (and accepted spellings) for every transfer type.
const TRANSFER_LABELS: &[(&str, TransferType)] = &[
    ("airport_to_city", TransferType::AirportToCity),
    ("airport_to_airport", TransferType::AirportToAirport),
    ("airport_to_cruise_port", TransferType::AirportToCruisePort),
    ("airport_to_cruise", TransferType::AirportToCruisePort),
    ("city_to_city", TransferType::CityToCity),
    ("point_to_point", TransferType::CityToCity),
    ("city_to_airport", TransferType::CityToAirport),
    ("city_to_cruise_port", TransferType::CityToCruisePort),
    ("city_to_cruise", TransferType::CityToCruisePort),
    ("cruise_to_airport", TransferType::CruiseToAirport),
    ("cruise_port_to_airport", TransferType::CruiseToAirport),
    ("cruise_port_to_city", TransferType::CruisePortToCity),
    ("cruise_to_city", TransferType::CruisePortToCity),
];

impl TransferType {
    pub const ALL: [TransferType; 8] = [
        TransferType::AirportToCity,
        TransferType::AirportToAirport,
        TransferType::AirportToCruisePort,
        TransferType::CityToCity,
        TransferType::CityToAirport,
        TransferType::CityToCruisePort,
        TransferType::CruiseToAirport,
        TransferType::CruisePortToCity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransferType::AirportToCity => "airport_to_city",
            TransferType::AirportToAirport => "airport_to_airport",
            TransferType::AirportToCruisePort => "airport_to_cruise_port",
            TransferType::CityToCity => "city_to_city",
            TransferType::CityToAirport => "city_to_airport",
            TransferType::CityToCruisePort => "city_to_cruise_port",
            TransferType::CruiseToAirport => "cruise_to_airport",
            TransferType::CruisePortToCity => "cruise_port_to_city",
        }
    }

    /// Resolve a free-text label ("Airport To City", "city-to-airport?") to a
    /// transfer type. Unknown labels return `None` rather than guessing.
    pub fn from_label(label: &str) -> Option<TransferType> {
        let canonical = canonical_label(label);
        TRANSFER_LABELS
            .iter()
            .find(|(name, _)| *name == canonical)
            .map(|(_, transfer)| *transfer)
    }

    /// (pickup, dropoff) leg kinds.
    pub fn legs(self) -> (LegKind, LegKind) {
        use LegKind::{Address, Airport, CruisePort};
        match self {
            TransferType::AirportToCity => (Airport, Address),
            TransferType::AirportToAirport => (Airport, Airport),
            TransferType::AirportToCruisePort => (Airport, CruisePort),
            TransferType::CityToCity => (Address, Address),
            TransferType::CityToAirport => (Address, Airport),
            TransferType::CityToCruisePort => (Address, CruisePort),
            TransferType::CruiseToAirport => (CruisePort, Airport),
            TransferType::CruisePortToCity => (CruisePort, Address),
        }
    }

    pub fn pickup_kind(self) -> LegKind {
        self.legs().0
    }

    pub fn dropoff_kind(self) -> LegKind {
        self.legs().1
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_labels_resolve() {
        assert_eq!(
            TransferType::from_label("Airport To City"),
            Some(TransferType::AirportToCity)
        );
        assert_eq!(
            TransferType::from_label("City-to-Cruise Port?"),
            Some(TransferType::CityToCruisePort)
        );
        assert_eq!(
            TransferType::from_label("Cruise Port to Airport"),
            Some(TransferType::CruiseToAirport)
        );
        assert_eq!(TransferType::from_label("helicopter"), None);
    }

    #[test]
    fn canonical_names_round_trip_through_labels_and_serde() {
        for transfer in TransferType::ALL {
            assert_eq!(TransferType::from_label(transfer.as_str()), Some(transfer));
            let json = serde_json::to_string(&transfer).expect("serialize");
            assert_eq!(json, format!("\"{}\"", transfer.as_str()));
        }
    }

    #[test]
    fn leg_table_matches_names() {
        assert_eq!(
            TransferType::CityToAirport.legs(),
            (LegKind::Address, LegKind::Airport)
        );
        assert_eq!(
            TransferType::CruisePortToCity.legs(),
            (LegKind::CruisePort, LegKind::Address)
        );
        assert_eq!(TransferType::AirportToAirport.dropoff_kind(), LegKind::Airport);
    }
}
