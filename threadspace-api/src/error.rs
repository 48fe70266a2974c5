use anyhow::Context;
use serde_json::json;

use crate::{CommentId, PollOptionId, PostId};

#[derive(
    Clone,
    Debug,
    Eq,
    PartialEq,
    thiserror::Error,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Error {
    #[error("Unknown error: {details}")]
    Unknown { details: String },

    #[error("Post {post} not found")]
    PostNotFound { post: PostId },

    #[error("Comment {comment} not found")]
    CommentNotFound { comment: CommentId },

    #[error("Poll option {option} not found in post {post}")]
    PollOptionNotFound { post: PostId, option: PollOptionId },

    #[error("Post {post} is not a poll")]
    NotAPoll { post: PostId },

    #[error("Community {name:?} not found")]
    CommunityNotFound { name: String },

    #[error("User {username:?} not found")]
    UserNotFound { username: String },

    #[error("Field {field} must not be empty")]
    EmptyField { field: String },

    #[error("Field {field} must be at most {max} characters long")]
    FieldTooLong { field: String, max: usize },

    #[error("Field {field} must be at least {min} characters long")]
    FieldTooShort { field: String, min: usize },

    #[error("Field {field} can hold at most {max} items")]
    TooManyItems { field: String, max: usize },

    #[error("Field {field} needs at least {min} items")]
    TooFewItems { field: String, min: usize },

    #[error("Null byte in string is not allowed {string:?}")]
    NullByteInString { string: String },

    #[error("Invalid name {name:?}")]
    InvalidName { name: String },

    #[error("Invalid URL {url:?}")]
    InvalidUrl { url: String },

    #[error("Name already used {name:?}")]
    NameAlreadyUsed { name: String },

    #[error("Parent comment {parent} does not belong to post {post}")]
    ParentOnOtherPost { parent: CommentId, post: PostId },

    #[error("Invalid vote value {vote}, expected -1, 0 or 1")]
    InvalidVote { vote: i64 },

    #[error("Unknown sort order {order:?}")]
    UnknownOrder { order: String },

    #[error("Unknown post scope {scope:?}")]
    UnknownScope { scope: String },

    #[error("Malformed query string: {details}")]
    InvalidQuery { details: String },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    InvalidArgument,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Unknown { .. } => ErrorKind::Internal,
            Error::PostNotFound { .. }
            | Error::CommentNotFound { .. }
            | Error::PollOptionNotFound { .. }
            | Error::NotAPoll { .. }
            | Error::CommunityNotFound { .. }
            | Error::UserNotFound { .. } => ErrorKind::NotFound,
            Error::EmptyField { .. }
            | Error::FieldTooLong { .. }
            | Error::FieldTooShort { .. }
            | Error::TooManyItems { .. }
            | Error::TooFewItems { .. }
            | Error::NullByteInString { .. }
            | Error::InvalidName { .. }
            | Error::InvalidUrl { .. }
            | Error::NameAlreadyUsed { .. }
            | Error::ParentOnOtherPost { .. } => ErrorKind::Validation,
            Error::InvalidVote { .. }
            | Error::UnknownOrder { .. }
            | Error::UnknownScope { .. }
            | Error::InvalidQuery { .. } => ErrorKind::InvalidArgument,
        }
    }

    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match (self, self.kind()) {
            (Error::NameAlreadyUsed { .. }, _) => StatusCode::CONFLICT,
            (_, ErrorKind::NotFound) => StatusCode::NOT_FOUND,
            (_, ErrorKind::Validation) => StatusCode::BAD_REQUEST,
            (_, ErrorKind::InvalidArgument) => StatusCode::BAD_REQUEST,
            (_, ErrorKind::Internal) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body sent to clients: the tagged error plus a human-readable `message`
    pub fn contents(&self) -> Vec<u8> {
        let mut body = serde_json::to_value(self).expect("serializing error");
        if let Some(fields) = body.as_object_mut() {
            fields.insert(String::from("message"), json!(self.to_string()));
        }
        serde_json::to_vec(&body).expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let mut data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        if let Some(fields) = data.as_object_mut() {
            fields.remove("message");
        }
        serde_json::from_value(data).context("error contents has unknown type")
    }
}
