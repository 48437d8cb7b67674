//! Strongly-typed identifiers.
//!
//! Ids render as `<prefix>-<uuid>` (`watcher-...`, `reg-...`) so a log line
//! shows which kind of handle it refers to. Parsing checks both halves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::Error;

/// Macro to define a prefixed, UUID-backed ID newtype.
///
/// Generates: struct, `new()` (UUID v4), `uuid()`, `PREFIX`, `Default`,
/// Display, `FromStr`, and string-form Serialize/Deserialize.
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Error> {
                let raw = s.strip_prefix(concat!($prefix, "-")).ok_or_else(|| {
                    Error::validation(format!(
                        "{} must start with '{}-': {:?}",
                        stringify!($name),
                        $prefix,
                        s
                    ))
                })?;
                Uuid::parse_str(raw).map(Self).map_err(|err| {
                    Error::validation(format!("invalid {} {:?}: {}", stringify!($name), s, err))
                })
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(s: String) -> Result<Self, Error> {
                s.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.to_string()
            }
        }
    };
}

define_id!(WatcherId, "watcher");
define_id!(RegistrationId, "reg");
