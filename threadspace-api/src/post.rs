use std::fmt;

use crate::{Error, Time, Vote};

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
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique within its post only
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
pub struct PollOptionId(pub u64);

impl fmt::Display for PollOptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PollOption {
    pub id: PollOptionId,
    pub text: String,
    pub vote_count: u64,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Poll {
    pub options: Vec<PollOption>,

    /// Option currently holding the caller's vote, if any. Renamed on the
    /// wire as polls are flattened into `Post`, which has its own `user_vote`.
    #[serde(default, rename = "user_poll_vote")]
    pub user_vote: Option<PollOptionId>,
}

impl Poll {
    pub fn total_votes(&self) -> u64 {
        self.options
            .iter()
            .fold(0, |acc: u64, o| acc.saturating_add(o.vote_count))
    }
}

/// The payload of a post, keyed by its type
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "post_type", rename_all = "lowercase")]
pub enum PostBody {
    Text { content: String },
    Image { image_url: String },
    Link { link_url: String },
    Poll(Poll),
}

impl PostBody {
    pub fn content(&self) -> Option<&str> {
        match self {
            PostBody::Text { content } => Some(content),
            _ => None,
        }
    }

    pub fn poll(&self) -> Option<&Poll> {
        match self {
            PostBody::Poll(p) => Some(p),
            _ => None,
        }
    }

    pub fn poll_mut(&mut self) -> Option<&mut Poll> {
        match self {
            PostBody::Poll(p) => Some(p),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub author: String,
    pub community: String,
    pub score: i64,
    #[serde(default)]
    pub user_vote: Vote,
    pub timestamp: Time,

    /// Recomputed from the live comment list whenever the post is read
    #[serde(default)]
    pub comment_count: usize,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(flatten)]
    pub body: PostBody,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "post_type", rename_all = "lowercase")]
pub enum NewPostBody {
    Text { content: String },
    Image { image_url: String },
    Link { link_url: String },
    Poll { options: Vec<String> },
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewPost {
    pub title: String,
    pub author: String,
    pub community: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub body: NewPostBody,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_text("title", &self.title, crate::MAX_TITLE_LEN)?;
        crate::validate_text("author", &self.author, crate::MAX_TITLE_LEN)?;
        crate::validate_text("community", &self.community, crate::MAX_TITLE_LEN)?;
        crate::validate_tags(&self.tags)?;
        match &self.body {
            NewPostBody::Text { content } => {
                crate::validate_text("content", content, crate::MAX_CONTENT_LEN)
            }
            NewPostBody::Image { image_url } => {
                crate::validate_text("image_url", image_url, crate::MAX_CONTENT_LEN)
            }
            NewPostBody::Link { link_url } => {
                crate::validate_text("link_url", link_url, crate::MAX_CONTENT_LEN)?;
                crate::validate_url(link_url)
            }
            NewPostBody::Poll { options } => {
                let mut filled = 0;
                for o in options {
                    crate::validate_string(o)?;
                    if !o.trim().is_empty() {
                        crate::validate_text("poll_option", o, crate::MAX_TITLE_LEN)?;
                        filled += 1;
                    }
                }
                if filled < crate::MIN_POLL_OPTIONS {
                    return Err(Error::TooFewItems {
                        field: String::from("poll_options"),
                        min: crate::MIN_POLL_OPTIONS,
                    });
                }
                if filled > crate::MAX_POLL_OPTIONS {
                    return Err(Error::TooManyItems {
                        field: String::from("poll_options"),
                        max: crate::MAX_POLL_OPTIONS,
                    });
                }
                Ok(())
            }
        }
    }

    /// Builds the stored post; the author starts out upvoting it
    ///
    /// Assumes `validate` succeeded.
    pub fn into_post(self, id: PostId, date: Time) -> Post {
        let body = match self.body {
            NewPostBody::Text { content } => PostBody::Text {
                content: String::from(content.trim()),
            },
            NewPostBody::Image { image_url } => PostBody::Image {
                image_url: String::from(image_url.trim()),
            },
            NewPostBody::Link { link_url } => PostBody::Link {
                link_url: String::from(link_url.trim()),
            },
            NewPostBody::Poll { options } => PostBody::Poll(Poll {
                options: options
                    .iter()
                    .map(|o| o.trim())
                    .filter(|o| !o.is_empty())
                    .zip(1..)
                    .map(|(text, id)| PollOption {
                        id: PollOptionId(id),
                        text: String::from(text),
                        vote_count: 0,
                    })
                    .collect(),
                user_vote: None,
            }),
        };
        Post {
            id,
            title: String::from(self.title.trim()),
            author: self.author,
            community: self.community,
            score: 1,
            user_vote: Vote::Up,
            timestamp: date,
            comment_count: 0,
            tags: crate::normalize_tags(self.tags),
            body,
        }
    }
}

/// Partial update of a post; `None` keeps the current value
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PostEdit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// Only meaningful for text posts
    #[serde(default)]
    pub content: Option<String>,
}

impl PostEdit {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(title) = &self.title {
            crate::validate_text("title", title, crate::MAX_TITLE_LEN)?;
        }
        if let Some(tags) = &self.tags {
            crate::validate_tags(tags)?;
        }
        if let Some(content) = &self.content {
            crate::validate_text("content", content, crate::MAX_CONTENT_LEN)?;
        }
        Ok(())
    }

    /// Assumes `validate` succeeded. Content edits on non-text posts are ignored.
    pub fn apply_to(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = String::from(title.trim());
        }
        if let Some(tags) = self.tags {
            post.tags = crate::normalize_tags(tags);
        }
        if let (Some(new), PostBody::Text { content }) = (self.content, &mut post.body) {
            *content = String::from(new.trim());
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SaveStatus {
    pub saved: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PollVoteRequest {
    pub option: PollOptionId,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PollOptionResult {
    pub id: PollOptionId,
    pub text: String,
    pub vote_count: u64,
    pub percentage: u64,
}

/// Options annotated with their share of the votes; percentages are rounded
/// independently and may not add up to 100
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PollResults {
    pub total_votes: u64,
    pub options: Vec<PollOptionResult>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PostMatch {
    pub post: Post,
    pub snippet: String,
}
