use crate::{Comment, Community, Post, User};

/// Full dump of the forum's collections, used to bootstrap a store
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Seed {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub communities: Vec<Community>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}
