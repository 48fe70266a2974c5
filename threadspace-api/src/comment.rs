use std::fmt;

use crate::{Error, PostId, Time, Vote};

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
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,

    /// None for top-level comments
    #[serde(default)]
    pub parent_id: Option<CommentId>,

    pub author: String,
    pub content: String,
    pub timestamp: Time,
    pub score: i64,
    #[serde(default)]
    pub user_vote: Vote,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub post_id: PostId,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    pub author: String,
    pub content: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_text("author", &self.author, crate::MAX_TITLE_LEN)?;
        crate::validate_text("content", &self.content, crate::MAX_CONTENT_LEN)?;
        Ok(())
    }

    /// Assumes `validate` succeeded
    pub fn into_comment(self, id: CommentId, date: Time) -> Comment {
        Comment {
            id,
            post_id: self.post_id,
            parent_id: self.parent_id,
            author: self.author,
            content: String::from(self.content.trim()),
            timestamp: date,
            score: 0,
            user_vote: Vote::None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentEdit {
    pub content: String,
}

impl CommentEdit {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_text("content", &self.content, crate::MAX_CONTENT_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(content: &str) -> NewComment {
        NewComment {
            post_id: PostId(1),
            parent_id: None,
            author: String::from("bob"),
            content: String::from(content),
        }
    }

    #[test]
    fn blank_content_is_rejected() {
        for c in ["", "   ", "\n\t"] {
            assert_eq!(
                draft(c).validate(),
                Err(Error::EmptyField {
                    field: String::from("content")
                }),
            );
        }
        assert!(draft(" hi ").validate().is_ok());
    }

    #[test]
    fn content_is_stored_trimmed() {
        let c = draft("  nice post \n").into_comment(CommentId(4), Time::default());
        assert_eq!(c.content, "nice post");
        assert_eq!(c.score, 0);
        assert_eq!(c.user_vote, Vote::None);
    }
}
