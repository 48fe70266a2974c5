use crate::Error;

/// A caller's vote on a scored entity
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub enum Vote {
    Down,
    #[default]
    None,
    Up,
}

impl Vote {
    pub fn value(self) -> i64 {
        match self {
            Vote::Down => -1,
            Vote::None => 0,
            Vote::Up => 1,
        }
    }
}

impl TryFrom<i64> for Vote {
    type Error = Error;

    fn try_from(vote: i64) -> Result<Vote, Error> {
        match vote {
            -1 => Ok(Vote::Down),
            0 => Ok(Vote::None),
            1 => Ok(Vote::Up),
            vote => Err(Error::InvalidVote { vote }),
        }
    }
}

impl From<Vote> for i64 {
    fn from(v: Vote) -> i64 {
        v.value()
    }
}

/// Wire body of vote requests; kept as a raw integer so out-of-range values
/// reach the engine and get reported as invalid arguments
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct VoteRequest {
    pub vote: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_conversions() {
        for v in [Vote::Down, Vote::None, Vote::Up] {
            assert_eq!(Vote::try_from(v.value()), Ok(v));
        }
        assert_eq!(Vote::try_from(2), Err(Error::InvalidVote { vote: 2 }));
        assert_eq!(Vote::try_from(-5), Err(Error::InvalidVote { vote: -5 }));
    }

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Vote::Down).unwrap(), "-1");
        assert_eq!(serde_json::from_str::<Vote>("1").unwrap(), Vote::Up);
        assert!(serde_json::from_str::<Vote>("3").is_err());
    }
}
