use std::{fmt, str::FromStr};

use crate::error::Error;

/// A dining hall known to the origin site.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Location {
    Arrillaga,
    Branner,
    Evgr,
    FlorenceMoore,
    GerhardCasper,
    Lakeside,
    Ricker,
    Stern,
    Wilbur,
}

impl Location {
    pub const ALL: [Self; 9] = [
        Self::Arrillaga,
        Self::Branner,
        Self::Evgr,
        Self::FlorenceMoore,
        Self::GerhardCasper,
        Self::Lakeside,
        Self::Ricker,
        Self::Stern,
        Self::Wilbur,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Arrillaga => "Arrillaga Family Dining Commons",
            Self::Branner => "Branner Dining",
            Self::Evgr => "EVGR Dining",
            Self::FlorenceMoore => "Florence Moore Dining",
            Self::GerhardCasper => "Gerhard Casper Dining",
            Self::Lakeside => "Lakeside Dining",
            Self::Ricker => "Ricker Dining",
            Self::Stern => "Stern Dining",
            Self::Wilbur => "Wilbur Dining",
        }
    }

    /// Value of the location dropdown on the origin's menu form.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Arrillaga => "Arrillaga",
            Self::Branner => "Branner",
            Self::Evgr => "EVGR",
            Self::FlorenceMoore => "FlorenceMoore",
            Self::GerhardCasper => "GerhardCasper",
            Self::Lakeside => "Lakeside",
            Self::Ricker => "Ricker",
            Self::Stern => "Stern",
            Self::Wilbur => "Wilbur",
        }
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().map(Self::name)
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|location| location.name() == s)
            .ok_or_else(|| Error::InvalidLocation(s.to_owned()))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl serde::Serialize for Location {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.name().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Location {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

pub fn is_valid_location(name: &str) -> bool {
    name.parse::<Location>().is_ok()
}
