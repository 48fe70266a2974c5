use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use structopt::StructOpt;
use threadspace_api::Seed;
use threadspace_client::Store;
use threadspace_mock_server::MockServer;

mod error;
mod extractors;
mod fuzz;
mod handlers;

use error::Error;
use extractors::{AppState, Backend};

#[derive(StructOpt)]
struct Opt {
    /// Address to listen on
    #[structopt(long, env = "THREADSPACE_LISTEN", default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    /// JSON dump to start the forum from, empty forum otherwise
    #[structopt(long, env = "THREADSPACE_SEED", parse(from_os_str))]
    seed: Option<PathBuf>,

    /// Simulated latency added to every operation, in milliseconds
    #[structopt(long, env = "THREADSPACE_DELAY_MS", default_value = "0")]
    delay_ms: u64,
}

async fn load_seed(path: &Path) -> anyhow::Result<Store> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading seed file {path:?}"))?;
    let seed: Seed = serde_json::from_slice(&data)
        .with_context(|| format!("parsing seed file {path:?}"))?;
    tracing::info!(
        users = seed.users.len(),
        communities = seed.communities.len(),
        posts = seed.posts.len(),
        comments = seed.comments.len(),
        "loaded seed"
    );
    Ok(Store::from_seed(seed))
}

pub fn app(forum: Arc<MockServer>) -> Router {
    use handlers::*;
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/:id",
            get(get_post).patch(edit_post).delete(delete_post),
        )
        .route("/api/posts/:id/vote", post(vote))
        .route("/api/posts/:id/poll-vote", post(poll_vote))
        .route("/api/posts/:id/poll", get(poll_results))
        .route("/api/posts/:id/comments", get(comments).post(create_comment))
        .route("/api/posts/:id/save", post(toggle_save))
        .route("/api/saved", get(saved))
        .route(
            "/api/comments/:id",
            get(get_comment).patch(edit_comment).delete(delete_comment),
        )
        .route("/api/comments/:id/vote", post(vote_comment))
        .route("/api/search/posts", get(search_posts))
        .route("/api/search/communities", get(search_communities))
        .route("/api/communities", get(communities).post(create_community))
        .route(
            "/api/communities/:name",
            get(community).patch(edit_community).delete(delete_community),
        )
        .route("/api/communities/:name/membership", post(toggle_membership))
        .route("/api/users", post(create_user))
        .route("/api/users/:name", get(user_profile))
        .route("/api/users/:name/karma", get(user_karma))
        .route("/api/users/:name/activity", get(user_activity))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(AppState {
            forum: Backend::new(forum),
        })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = Opt::from_args();
    let store = match &opt.seed {
        Some(path) => load_seed(path).await?,
        None => Store::new(),
    };
    let forum = Arc::new(MockServer::new(store, Duration::from_millis(opt.delay_ms)));

    tracing::info!(addr = %opt.listen, delay = ?forum.delay(), "listening");
    axum::Server::bind(&opt.listen)
        .serve(app(forum).into_make_service())
        .await
        .context("serving axum webserver")
}
