//! Real Slovak locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap.

/// A named location with coordinates and a postal address.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub address: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, address: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, address, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

pub const BRATISLAVA_OFFICE: Location =
    Location::new("Bratislava office", "Mlynské nivy 5, Bratislava", 48.1486, 17.1077);

pub const KOSICE_BRANCH: Location =
    Location::new("Košice branch", "Hlavná 10, Košice", 48.7164, 21.2611);

pub const ZILINA_WAREHOUSE: Location =
    Location::new("Žilina warehouse", "Kragujevská 4, Žilina", 49.2231, 18.7394);

pub const TRNAVA_CLIENT: Location =
    Location::new("Trnava client", "Hlavná 17, Trnava", 48.3774, 17.5883);

pub const NITRA_SUPPLIER: Location =
    Location::new("Nitra supplier", "Štefánikova trieda 60, Nitra", 48.3069, 18.0864);

/// About 150 m east of the Bratislava office.
pub const BRATISLAVA_OFFICE_PARKING: Location =
    Location::new("Bratislava office parking", "Mlynské nivy 7, Bratislava", 48.1486, 17.1097);
