use chrono::Utc;

pub type Time = chrono::DateTime<Utc>;

mod comment;
pub use comment::{Comment, CommentEdit, CommentId, NewComment};

mod community;
pub use community::{
    validate_community_name, Community, CommunityEdit, CommunityId, CommunityMatch,
    MembershipStatus, NewCommunity,
};

mod error;
pub use error::{Error, ErrorKind};

mod forum;
pub use forum::Forum;

mod order;
pub use order::Order;

mod post;
pub use post::{
    NewPost, NewPostBody, Poll, PollOption, PollOptionId, PollOptionResult, PollResults,
    PollVoteRequest, Post, PostBody, PostEdit, PostId, PostMatch, SaveStatus,
};

mod query;
pub use query::Scope;

mod seed;
pub use seed::Seed;

mod user;
pub use user::{NewUser, User, UserActivity, UserId, UserProfile};

mod vote;
pub use vote::{Vote, VoteRequest};

pub const MAX_TITLE_LEN: usize = 300;
pub const MAX_CONTENT_LEN: usize = 10_000;
pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_LEN: usize = 30;
pub const MIN_POLL_OPTIONS: usize = 2;
pub const MAX_POLL_OPTIONS: usize = 10;
pub const MIN_COMMUNITY_NAME_LEN: usize = 3;
pub const MAX_COMMUNITY_NAME_LEN: usize = 21;
pub const MIN_COMMUNITY_DESCRIPTION_LEN: usize = 10;

/// Posts at or above this score show up in the popular scope
pub const POPULAR_MIN_SCORE: i64 = 50;

pub fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString {
            string: String::from(s),
        });
    }
    Ok(())
}

/// Checks that `s` is non-blank once trimmed and at most `max` characters long
pub(crate) fn validate_text(field: &str, s: &str, max: usize) -> Result<(), Error> {
    validate_string(s)?;
    if s.trim().is_empty() {
        return Err(Error::EmptyField {
            field: String::from(field),
        });
    }
    if s.chars().count() > max {
        return Err(Error::FieldTooLong {
            field: String::from(field),
            max,
        });
    }
    Ok(())
}

/// Accepts anything shaped like `scheme://rest`, the same way a browser URL
/// constructor would accept it for http-like schemes
pub fn validate_url(url: &str) -> Result<(), Error> {
    validate_string(url)?;
    let invalid = || Error::InvalidUrl {
        url: String::from(url),
    };
    let (scheme, rest) = url.trim().split_once("://").ok_or_else(invalid)?;
    let mut scheme_chars = scheme.chars();
    if !scheme_chars.next().map_or(false, |c| c.is_ascii_alphabetic())
        || !scheme_chars.all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c))
    {
        return Err(invalid());
    }
    if rest.is_empty() || rest.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(())
}

/// Trims tags, drops blank ones and keeps the first occurrence of each
pub(crate) fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut res: Vec<String> = Vec::with_capacity(tags.len());
    for t in tags {
        let t = t.trim();
        if !t.is_empty() && !res.iter().any(|r| r == t) {
            res.push(String::from(t));
        }
    }
    res
}

pub(crate) fn validate_tags(tags: &[String]) -> Result<(), Error> {
    let tags = normalize_tags(tags.to_vec());
    if tags.len() > MAX_TAGS {
        return Err(Error::TooManyItems {
            field: String::from("tags"),
            max: MAX_TAGS,
        });
    }
    for t in &tags {
        validate_text("tag", t, MAX_TAG_LEN)?;
    }
    Ok(())
}
