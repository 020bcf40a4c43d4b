use std::fmt;

/// Linear unit of a coordinate system, used to convert measurements to km.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearUnit {
    Meter,
    Kilometer,
    Foot,
    /// Angular unit, planar lengths and areas are meaningless.
    Degree,
}

impl LinearUnit {
    /// Factor converting one unit to kilometers, `None` for angular units.
    #[must_use]
    pub fn km_factor(self) -> Option<f64> {
        match self {
            Self::Meter => Some(1e-3),
            Self::Kilometer => Some(1.0),
            Self::Foot => Some(0.304_8e-3),
            Self::Degree => None,
        }
    }
}

/// A coordinate system identified by its well-known ID.
///
/// WKIDs 102100 and 3857 both denote Web Mercator and compare equal.
#[derive(Debug, Clone, Copy)]
pub struct SpatialReference {
    wkid: u32,
    unit: LinearUnit,
}

impl SpatialReference {
    /// WGS 1984 geographic coordinates.
    pub const WGS84: u32 = 4326;
    /// Web Mercator (EPSG code).
    pub const WEB_MERCATOR: u32 = 3857;
    /// Web Mercator (legacy Esri code).
    pub const WEB_MERCATOR_ESRI: u32 = 102_100;

    /// Creates a reference with the unit inferred from the WKID.
    ///
    /// 4326 is geographic (degrees); every other WKID is assumed projected in
    /// meters. Use [`SpatialReference::with_unit`] for anything else.
    #[must_use]
    pub fn new(wkid: u32) -> Self {
        let unit = if wkid == Self::WGS84 {
            LinearUnit::Degree
        } else {
            LinearUnit::Meter
        };
        Self { wkid, unit }
    }

    /// Creates a reference with an explicit linear unit.
    #[must_use]
    pub fn with_unit(wkid: u32, unit: LinearUnit) -> Self {
        Self { wkid, unit }
    }

    #[must_use]
    pub fn wgs84() -> Self {
        Self::new(Self::WGS84)
    }

    #[must_use]
    pub fn web_mercator() -> Self {
        Self::new(Self::WEB_MERCATOR)
    }

    /// The WKID as supplied.
    #[must_use]
    pub fn wkid(&self) -> u32 {
        self.wkid
    }

    /// The WKID with aliases folded (102100 becomes 3857).
    #[must_use]
    pub fn canonical_wkid(&self) -> u32 {
        if self.wkid == Self::WEB_MERCATOR_ESRI {
            Self::WEB_MERCATOR
        } else {
            self.wkid
        }
    }

    #[must_use]
    pub fn unit(&self) -> LinearUnit {
        self.unit
    }

    #[must_use]
    pub fn is_web_mercator(&self) -> bool {
        self.canonical_wkid() == Self::WEB_MERCATOR
    }

    #[must_use]
    pub fn is_wgs84(&self) -> bool {
        self.wkid == Self::WGS84
    }
}

impl PartialEq for SpatialReference {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_wkid() == other.canonical_wkid()
    }
}

impl Eq for SpatialReference {}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wkid {}", self.wkid)
    }
}
