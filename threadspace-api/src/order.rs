use std::{fmt, str::FromStr};

use crate::Error;

/// Feed sorting strategy
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Most recent first
    New,

    /// Highest score first
    Top,

    /// Score decayed by age, see `hot_score` in the client
    #[default]
    Hot,
}

impl FromStr for Order {
    type Err = Error;

    fn from_str(s: &str) -> Result<Order, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Order::New),
            "top" => Ok(Order::Top),
            "hot" => Ok(Order::Hot),
            _ => Err(Error::UnknownOrder {
                order: String::from(s),
            }),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Order::New => "new",
            Order::Top => "top",
            Order::Hot => "hot",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!("new".parse(), Ok(Order::New));
        assert_eq!(" TOP ".parse(), Ok(Order::Top));
        assert_eq!("Hot".parse(), Ok(Order::Hot));
        assert_eq!(
            "best".parse::<Order>(),
            Err(Error::UnknownOrder {
                order: String::from("best")
            }),
        );
        assert_eq!(Order::default(), Order::Hot);
    }
}
