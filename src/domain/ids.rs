//! Discord snowflake identifiers.
//!
//! Snowflakes are 64-bit integers. They travel as JSON strings because they
//! exceed the safe integer range of most JSON clients; deserialization
//! accepts both strings and numbers.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSnowflake {
    Number(u64),
    Text(String),
}

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw snowflake value.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw snowflake value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                match RawSnowflake::deserialize(deserializer)? {
                    RawSnowflake::Number(value) => Ok(Self(value)),
                    RawSnowflake::Text(text) => text.parse().map_err(D::Error::custom),
                }
            }
        }
    };
}

snowflake_id! {
    /// Identifier of a Discord webhook; primary key of a registration.
    WebhookId
}

snowflake_id! {
    /// Identifier of a Discord guild (server).
    GuildId
}

snowflake_id! {
    /// Identifier of a role inside a guild.
    RoleId
}

impl RoleId {
    /// Returns the Discord mention markup for this role (`<@&id>`).
    #[must_use]
    pub fn mention(self) -> String {
        format!("<@&{}>", self.0)
    }
}
