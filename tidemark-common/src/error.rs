//! Input validation errors shared by every tidemark crate

use thiserror::Error;

/// A coordinate that cannot be used as a query or dataset vertex.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// NaN or infinite component
    #[error("coordinate is not finite (latitude {latitude}, longitude {longitude})")]
    NotFinite { latitude: f64, longitude: f64 },

    /// Latitude outside [-90, 90]
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180]
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            InputError::LatitudeOutOfRange(999.0).to_string(),
            "latitude 999 is outside [-90, 90]"
        );
        assert_eq!(
            InputError::LongitudeOutOfRange(-181.5).to_string(),
            "longitude -181.5 is outside [-180, 180]"
        );
    }
}
