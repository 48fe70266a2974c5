use axum::{
    extract::{Path, State},
    Json,
};
use threadspace_api::{
    Comment, CommentEdit, CommentId, Community, CommunityEdit, CommunityMatch, MembershipStatus,
    NewComment, NewCommunity, NewPost, NewUser, PollResults, PollVoteRequest, Post, PostEdit,
    PostId, PostMatch, SaveStatus, User, UserActivity, UserProfile, VoteRequest,
};

use crate::{extractors::*, Error};

pub async fn list_posts(
    State(forum): State<Backend>,
    FeedQuery { scope, order }: FeedQuery,
) -> Json<Vec<Post>> {
    Json(match order {
        Some(order) => forum.ranked_posts(scope, order).await,
        None => forum.list_posts(scope).await,
    })
}

pub async fn create_post(
    State(forum): State<Backend>,
    Json(draft): Json<NewPost>,
) -> Result<Json<Post>, Error> {
    Ok(Json(forum.create_post(draft).await?))
}

pub async fn get_post(
    State(forum): State<Backend>,
    Path(post): Path<PostId>,
) -> Result<Json<Post>, Error> {
    Ok(Json(forum.get_post(post).await?))
}

pub async fn edit_post(
    State(forum): State<Backend>,
    Path(post): Path<PostId>,
    Json(edit): Json<PostEdit>,
) -> Result<Json<Post>, Error> {
    Ok(Json(forum.edit_post(post, edit).await?))
}

pub async fn delete_post(
    State(forum): State<Backend>,
    Path(post): Path<PostId>,
) -> Result<(), Error> {
    Ok(forum.delete_post(post).await?)
}

pub async fn vote(
    State(forum): State<Backend>,
    Path(post): Path<PostId>,
    Json(VoteRequest { vote }): Json<VoteRequest>,
) -> Result<Json<Post>, Error> {
    Ok(Json(forum.vote(post, vote).await?))
}

pub async fn poll_vote(
    State(forum): State<Backend>,
    Path(post): Path<PostId>,
    Json(PollVoteRequest { option }): Json<PollVoteRequest>,
) -> Result<Json<Post>, Error> {
    Ok(Json(forum.poll_vote(post, option).await?))
}

pub async fn poll_results(
    State(forum): State<Backend>,
    Path(post): Path<PostId>,
) -> Result<Json<PollResults>, Error> {
    Ok(Json(forum.poll_results(post).await?))
}

pub async fn comments(
    State(forum): State<Backend>,
    Path(post): Path<PostId>,
) -> Result<Json<Vec<Comment>>, Error> {
    Ok(Json(forum.comments(post).await?))
}

/// The post in the path wins over any `post_id` in the body
pub async fn create_comment(
    State(forum): State<Backend>,
    Path(post): Path<PostId>,
    Json(mut draft): Json<NewComment>,
) -> Result<Json<Comment>, Error> {
    draft.post_id = post;
    Ok(Json(forum.create_comment(draft).await?))
}

pub async fn toggle_save(
    State(forum): State<Backend>,
    Path(post): Path<PostId>,
) -> Result<Json<SaveStatus>, Error> {
    Ok(Json(forum.toggle_save(post).await?))
}

pub async fn saved(State(forum): State<Backend>) -> Json<Vec<Post>> {
    Json(forum.saved().await)
}

pub async fn get_comment(
    State(forum): State<Backend>,
    Path(comment): Path<CommentId>,
) -> Result<Json<Comment>, Error> {
    Ok(Json(forum.get_comment(comment).await?))
}

pub async fn edit_comment(
    State(forum): State<Backend>,
    Path(comment): Path<CommentId>,
    Json(edit): Json<CommentEdit>,
) -> Result<Json<Comment>, Error> {
    Ok(Json(forum.edit_comment(comment, edit).await?))
}

/// Returns the number of comments removed along with the replies
pub async fn delete_comment(
    State(forum): State<Backend>,
    Path(comment): Path<CommentId>,
) -> Result<Json<usize>, Error> {
    Ok(Json(forum.delete_comment(comment).await?))
}

pub async fn vote_comment(
    State(forum): State<Backend>,
    Path(comment): Path<CommentId>,
    Json(VoteRequest { vote }): Json<VoteRequest>,
) -> Result<Json<Comment>, Error> {
    Ok(Json(forum.vote_comment(comment, vote).await?))
}

pub async fn search_posts(
    State(forum): State<Backend>,
    SearchQuery(q): SearchQuery,
) -> Json<Vec<PostMatch>> {
    Json(forum.search_posts(&q).await)
}

pub async fn search_communities(
    State(forum): State<Backend>,
    SearchQuery(q): SearchQuery,
) -> Json<Vec<CommunityMatch>> {
    Json(forum.search_communities(&q).await)
}

pub async fn communities(State(forum): State<Backend>) -> Json<Vec<Community>> {
    Json(forum.communities().await)
}

pub async fn create_community(
    State(forum): State<Backend>,
    Json(draft): Json<NewCommunity>,
) -> Result<Json<Community>, Error> {
    Ok(Json(forum.create_community(draft).await?))
}

pub async fn community(
    State(forum): State<Backend>,
    Path(name): Path<String>,
) -> Result<Json<Community>, Error> {
    Ok(Json(forum.community(&name).await?))
}

pub async fn edit_community(
    State(forum): State<Backend>,
    Path(name): Path<String>,
    Json(edit): Json<CommunityEdit>,
) -> Result<Json<Community>, Error> {
    Ok(Json(forum.edit_community(&name, edit).await?))
}

pub async fn delete_community(
    State(forum): State<Backend>,
    Path(name): Path<String>,
) -> Result<(), Error> {
    Ok(forum.delete_community(&name).await?)
}

pub async fn toggle_membership(
    State(forum): State<Backend>,
    Path(name): Path<String>,
) -> Result<Json<MembershipStatus>, Error> {
    Ok(Json(forum.toggle_membership(&name).await?))
}

pub async fn create_user(
    State(forum): State<Backend>,
    Json(draft): Json<NewUser>,
) -> Result<Json<User>, Error> {
    Ok(Json(forum.create_user(draft).await?))
}

pub async fn user_profile(
    State(forum): State<Backend>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, Error> {
    Ok(Json(forum.user_profile(&username).await?))
}

pub async fn user_karma(
    State(forum): State<Backend>,
    Path(username): Path<String>,
) -> Result<Json<i64>, Error> {
    Ok(Json(forum.user_karma(&username).await?))
}

pub async fn user_activity(
    State(forum): State<Backend>,
    Path(username): Path<String>,
) -> Result<Json<UserActivity>, Error> {
    Ok(Json(forum.user_activity(&username).await?))
}
