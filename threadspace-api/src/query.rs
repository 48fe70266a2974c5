use std::{fmt, str::FromStr};

use crate::Error;

/// Which posts a listing covers
#[derive(
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Scope {
    #[default]
    All,

    /// Posts of one community, matched case-insensitively
    Community(String),

    /// Posts scoring at least `POPULAR_MIN_SCORE`, best first
    Popular,
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Scope, Error> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed.is_empty() {
            return Ok(Scope::All);
        }
        if trimmed.eq_ignore_ascii_case("popular") {
            return Ok(Scope::Popular);
        }
        match trimmed.split_once(':') {
            Some((prefix, name)) if prefix.eq_ignore_ascii_case("community") && !name.is_empty() => {
                Ok(Scope::Community(String::from(name)))
            }
            _ => Err(Error::UnknownScope {
                scope: String::from(s),
            }),
        }
    }
}

impl TryFrom<String> for Scope {
    type Error = Error;

    fn try_from(s: String) -> Result<Scope, Error> {
        s.parse()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => f.write_str("all"),
            Scope::Community(name) => write!(f, "community:{name}"),
            Scope::Popular => f.write_str("popular"),
        }
    }
}

impl From<Scope> for String {
    fn from(s: Scope) -> String {
        s.to_string()
    }
}
