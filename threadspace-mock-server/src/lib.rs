use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use threadspace_client::{
    api::{
        Comment, CommentEdit, CommentId, Community, CommunityEdit, CommunityMatch, Error, Forum,
        MembershipStatus, NewComment, NewCommunity, NewPost, NewUser, Order, PollOptionId,
        PollResults, Post, PostEdit, PostId, PostMatch, SaveStatus, Scope, Time, User,
        UserActivity, UserProfile,
    },
    OrderExt, Store,
};
use tokio::sync::Mutex;

pub type Clock = Arc<dyn Fn() -> Time + Send + Sync>;

/// In-process forum backend with simulated latency
///
/// Every operation first sleeps for the configured delay, then runs to
/// completion while holding the lock over the whole store. Operations thus
/// never interleave, whatever the number of concurrent callers.
pub struct MockServer {
    store: Mutex<Store>,
    delay: Duration,
    clock: Clock,
}

impl MockServer {
    pub fn new(store: Store, delay: Duration) -> MockServer {
        MockServer {
            store: Mutex::new(store),
            delay,
            clock: Arc::new(chrono::Utc::now),
        }
    }

    /// No simulated latency
    pub fn instant(store: Store) -> MockServer {
        MockServer::new(store, Duration::ZERO)
    }

    /// Replaces the wall clock used to date new entities and to rank feeds
    pub fn with_clock(mut self, clock: impl Fn() -> Time + Send + Sync + 'static) -> MockServer {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now(&self) -> Time {
        (self.clock)()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    async fn run<T>(&self, f: impl FnOnce(&mut Store, Time) -> T) -> T {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut store = self.store.lock().await;
        let now = self.now();
        f(&mut store, now)
    }

    pub async fn list_posts(&self, scope: Scope) -> Vec<Post> {
        self.run(|s, _| s.list_posts(&scope)).await
    }

    /// Listing ranked at the time of the call
    pub async fn ranked_posts(&self, scope: Scope, order: Order) -> Vec<Post> {
        self.run(|s, now| {
            let mut posts = s.list_posts(&scope);
            order.sort(&mut posts, now);
            posts
        })
        .await
    }

    pub async fn get_post(&self, post: PostId) -> Result<Post, Error> {
        self.run(|s, _| s.get_post(post)).await
    }

    pub async fn create_post(&self, draft: NewPost) -> Result<Post, Error> {
        self.run(|s, now| s.create_post(draft, now)).await
    }

    pub async fn edit_post(&self, post: PostId, edit: PostEdit) -> Result<Post, Error> {
        self.run(|s, _| s.edit_post(post, edit)).await
    }

    pub async fn delete_post(&self, post: PostId) -> Result<(), Error> {
        self.run(|s, _| s.delete_post(post)).await
    }

    pub async fn vote(&self, post: PostId, vote: i64) -> Result<Post, Error> {
        self.run(|s, _| s.vote(post, vote)).await
    }

    pub async fn poll_vote(&self, post: PostId, option: PollOptionId) -> Result<Post, Error> {
        self.run(|s, _| s.poll_vote(post, option)).await
    }

    pub async fn poll_results(&self, post: PostId) -> Result<PollResults, Error> {
        self.run(|s, _| s.poll_results(post)).await
    }

    pub async fn comments(&self, post: PostId) -> Result<Vec<Comment>, Error> {
        self.run(|s, _| s.comments_for(post)).await
    }

    pub async fn get_comment(&self, comment: CommentId) -> Result<Comment, Error> {
        self.run(|s, _| s.get_comment(comment)).await
    }

    pub async fn create_comment(&self, draft: NewComment) -> Result<Comment, Error> {
        self.run(|s, now| s.create_comment(draft, now)).await
    }

    pub async fn edit_comment(
        &self,
        comment: CommentId,
        edit: CommentEdit,
    ) -> Result<Comment, Error> {
        self.run(|s, _| s.edit_comment(comment, edit)).await
    }

    pub async fn vote_comment(&self, comment: CommentId, vote: i64) -> Result<Comment, Error> {
        self.run(|s, _| s.vote_comment(comment, vote)).await
    }

    pub async fn delete_comment(&self, comment: CommentId) -> Result<usize, Error> {
        self.run(|s, _| s.delete_comment(comment)).await
    }

    pub async fn toggle_save(&self, post: PostId) -> Result<SaveStatus, Error> {
        self.run(|s, _| s.toggle_save(post)).await
    }

    pub async fn saved(&self) -> Vec<Post> {
        self.run(|s, _| s.saved()).await
    }

    pub async fn search_posts(&self, query: &str) -> Vec<PostMatch> {
        self.run(|s, _| s.search_posts(query)).await
    }

    pub async fn search_communities(&self, query: &str) -> Vec<CommunityMatch> {
        self.run(|s, _| s.search_communities(query)).await
    }

    pub async fn communities(&self) -> Vec<Community> {
        self.run(|s, _| s.communities()).await
    }

    pub async fn community(&self, name: &str) -> Result<Community, Error> {
        self.run(|s, _| s.community(name)).await
    }

    pub async fn create_community(&self, draft: NewCommunity) -> Result<Community, Error> {
        self.run(|s, _| s.create_community(draft)).await
    }

    pub async fn edit_community(
        &self,
        name: &str,
        edit: CommunityEdit,
    ) -> Result<Community, Error> {
        self.run(|s, _| s.edit_community(name, edit)).await
    }

    pub async fn delete_community(&self, name: &str) -> Result<(), Error> {
        self.run(|s, _| s.delete_community(name)).await
    }

    pub async fn toggle_membership(&self, name: &str) -> Result<MembershipStatus, Error> {
        self.run(|s, _| s.toggle_membership(name)).await
    }

    pub async fn create_user(&self, draft: NewUser) -> Result<User, Error> {
        self.run(|s, now| s.create_user(draft, now)).await
    }

    pub async fn user_profile(&self, username: &str) -> Result<UserProfile, Error> {
        self.run(|s, _| s.user_profile(username)).await
    }

    pub async fn user_karma(&self, username: &str) -> Result<i64, Error> {
        self.run(|s, _| s.user_karma(username)).await
    }

    pub async fn user_activity(&self, username: &str) -> Result<UserActivity, Error> {
        self.run(|s, _| s.user_activity(username)).await
    }
}

#[async_trait]
impl Forum for MockServer {
    async fn list_posts(&self, scope: Scope) -> Result<Vec<Post>, Error> {
        Ok(MockServer::list_posts(self, scope).await)
    }

    async fn get_post(&self, post: PostId) -> Result<Post, Error> {
        MockServer::get_post(self, post).await
    }

    async fn create_post(&self, draft: NewPost) -> Result<Post, Error> {
        MockServer::create_post(self, draft).await
    }

    async fn vote(&self, post: PostId, vote: i64) -> Result<Post, Error> {
        MockServer::vote(self, post, vote).await
    }

    async fn poll_vote(&self, post: PostId, option: PollOptionId) -> Result<Post, Error> {
        MockServer::poll_vote(self, post, option).await
    }

    async fn poll_results(&self, post: PostId) -> Result<PollResults, Error> {
        MockServer::poll_results(self, post).await
    }

    async fn comments(&self, post: PostId) -> Result<Vec<Comment>, Error> {
        MockServer::comments(self, post).await
    }

    async fn create_comment(&self, draft: NewComment) -> Result<Comment, Error> {
        MockServer::create_comment(self, draft).await
    }

    async fn vote_comment(&self, comment: CommentId, vote: i64) -> Result<Comment, Error> {
        MockServer::vote_comment(self, comment, vote).await
    }

    async fn toggle_save(&self, post: PostId) -> Result<SaveStatus, Error> {
        MockServer::toggle_save(self, post).await
    }

    async fn saved(&self) -> Result<Vec<Post>, Error> {
        Ok(MockServer::saved(self).await)
    }

    async fn search_posts(&self, query: &str) -> Result<Vec<PostMatch>, Error> {
        Ok(MockServer::search_posts(self, query).await)
    }

    async fn search_communities(&self, query: &str) -> Result<Vec<CommunityMatch>, Error> {
        Ok(MockServer::search_communities(self, query).await)
    }

    async fn user_karma(&self, username: &str) -> Result<i64, Error> {
        MockServer::user_karma(self, username).await
    }
}
