use std::fmt;

use crate::{Comment, Error, Post, Time};

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    pub avatar: String,
    pub join_date: Time,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    pub avatar: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.username)?;
        if self.username.is_empty()
            || !self
                .username
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::InvalidName {
                name: self.username.clone(),
            });
        }
        crate::validate_text("display_name", &self.display_name, crate::MAX_TITLE_LEN)?;
        if let Some(bio) = &self.bio {
            crate::validate_string(bio)?;
        }
        crate::validate_url(&self.avatar)
    }

    /// Assumes `validate` succeeded
    pub fn into_user(self, id: UserId, join_date: Time) -> User {
        User {
            id,
            username: self.username,
            display_name: String::from(self.display_name.trim()),
            bio: self.bio.filter(|b| !b.trim().is_empty()),
            avatar: self.avatar,
            join_date,
        }
    }
}

/// A user along with karma derived from everything they authored
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub karma: i64,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UserActivity {
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub total_activity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(username: &str) -> NewUser {
        NewUser {
            username: String::from(username),
            display_name: String::from("Alice A."),
            bio: Some(String::from("  ")),
            avatar: String::from("https://avatars.example.com/alice.png"),
        }
    }

    #[test]
    fn usernames() {
        assert!(draft("alice_01").validate().is_ok());
        assert!(draft("bob-the-builder").validate().is_ok());
        assert_eq!(
            draft("").validate(),
            Err(Error::InvalidName {
                name: String::new()
            }),
        );
        assert_eq!(
            draft("two words").validate(),
            Err(Error::InvalidName {
                name: String::from("two words")
            }),
        );
    }

    #[test]
    fn blank_bio_is_dropped() {
        let u = draft("alice").into_user(UserId(1), Time::default());
        assert_eq!(u.bio, None);
        assert_eq!(u.display_name, "Alice A.");
    }
}
