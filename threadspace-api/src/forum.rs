use async_trait::async_trait;

use crate::{
    Comment, CommentId, CommunityMatch, Error, NewComment, NewPost, PollOptionId, PollResults,
    Post, PostId, PostMatch, SaveStatus, Scope,
};

/// Operations the forum core offers to its callers, whether they run in
/// process or across the network
#[async_trait]
pub trait Forum {
    async fn list_posts(&self, scope: Scope) -> Result<Vec<Post>, Error>;
    async fn get_post(&self, post: PostId) -> Result<Post, Error>;
    async fn create_post(&self, draft: NewPost) -> Result<Post, Error>;

    /// `vote` must be -1, 0 or 1; repeating the current vote retracts it
    async fn vote(&self, post: PostId, vote: i64) -> Result<Post, Error>;
    async fn poll_vote(&self, post: PostId, option: PollOptionId) -> Result<Post, Error>;
    async fn poll_results(&self, post: PostId) -> Result<PollResults, Error>;

    /// Flat list in creation order, see the client's `CommentTree` for nesting
    async fn comments(&self, post: PostId) -> Result<Vec<Comment>, Error>;
    async fn create_comment(&self, draft: NewComment) -> Result<Comment, Error>;
    async fn vote_comment(&self, comment: CommentId, vote: i64) -> Result<Comment, Error>;

    async fn toggle_save(&self, post: PostId) -> Result<SaveStatus, Error>;
    async fn saved(&self) -> Result<Vec<Post>, Error>;

    async fn search_posts(&self, query: &str) -> Result<Vec<PostMatch>, Error>;
    async fn search_communities(&self, query: &str) -> Result<Vec<CommunityMatch>, Error>;

    async fn user_karma(&self, username: &str) -> Result<i64, Error>;
}
