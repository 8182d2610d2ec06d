//! Request parameter enumerations validated at the edge.
//!
//! The cache and coordinator treat the tuple as opaque strings; validation
//! happens here, before a request ever reaches them.

use std::str::FromStr;
use thiserror::Error;

/// Rejection reasons for pricing request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("Missing required parameters")]
    Missing,
    #[error("Invalid period: {0}")]
    Period(String),
    #[error("Invalid hotel: {0}")]
    Hotel(String),
    #[error("Invalid room: {0}")]
    Room(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Summer,
    Autumn,
    Winter,
    Spring,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Summer => "Summer",
            Period::Autumn => "Autumn",
            Period::Winter => "Winter",
            Period::Spring => "Spring",
        }
    }
}

impl FromStr for Period {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, ParamError> {
        match s {
            "Summer" => Ok(Period::Summer),
            "Autumn" => Ok(Period::Autumn),
            "Winter" => Ok(Period::Winter),
            "Spring" => Ok(Period::Spring),
            other => Err(ParamError::Period(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotel {
    FloatingPointResort,
    GitawayHotel,
    RecursionRetreat,
}

impl Hotel {
    pub fn as_str(self) -> &'static str {
        match self {
            Hotel::FloatingPointResort => "FloatingPointResort",
            Hotel::GitawayHotel => "GitawayHotel",
            Hotel::RecursionRetreat => "RecursionRetreat",
        }
    }
}

impl FromStr for Hotel {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, ParamError> {
        match s {
            "FloatingPointResort" => Ok(Hotel::FloatingPointResort),
            "GitawayHotel" => Ok(Hotel::GitawayHotel),
            "RecursionRetreat" => Ok(Hotel::RecursionRetreat),
            other => Err(ParamError::Hotel(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Room {
    SingletonRoom,
    BooleanTwin,
    RestfulKing,
}

impl Room {
    pub fn as_str(self) -> &'static str {
        match self {
            Room::SingletonRoom => "SingletonRoom",
            Room::BooleanTwin => "BooleanTwin",
            Room::RestfulKing => "RestfulKing",
        }
    }
}

impl FromStr for Room {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, ParamError> {
        match s {
            "SingletonRoom" => Ok(Room::SingletonRoom),
            "BooleanTwin" => Ok(Room::BooleanTwin),
            "RestfulKing" => Ok(Room::RestfulKing),
            other => Err(ParamError::Room(other.to_owned())),
        }
    }
}

/// A validated pricing request tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateQuery {
    pub period: Period,
    pub hotel: Hotel,
    pub room: Room,
}

impl RateQuery {
    /// Validates raw query parameters into a `RateQuery`. Absent or empty
    /// parameters are reported before value validation.
    pub fn from_params(
        period: Option<&str>,
        hotel: Option<&str>,
        room: Option<&str>,
    ) -> Result<Self, ParamError> {
        let (Some(period), Some(hotel), Some(room)) = (period, hotel, room) else {
            return Err(ParamError::Missing);
        };
        if period.is_empty() || hotel.is_empty() || room.is_empty() {
            return Err(ParamError::Missing);
        }

        Ok(Self {
            period: period.parse()?,
            hotel: hotel.parse()?,
            room: room.parse()?,
        })
    }

    /// Canonical cache key for this tuple.
    pub fn cache_key(&self) -> String {
        format!(
            "rate:{}:{}:{}",
            self.period.as_str(),
            self.hotel.as_str(),
            self.room.as_str()
        )
    }
}
