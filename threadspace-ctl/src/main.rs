use std::path::PathBuf;

use anyhow::{bail, Context};
use threadspace_api::{
    CommentId, Forum, NewComment, NewPost, NewPostBody, Order, PollOptionId, Post, PostId, Scope,
    Seed,
};
use threadspace_client::{CommentTree, OrderExt, Store};
use threadspace_mock_server::MockServer;

mod http;

use http::HttpForum;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Server to talk to, e.g. http://127.0.0.1:3000
    #[structopt(short, long, env = "THREADSPACE_HOST", required_unless = "seed")]
    host: Option<String>,

    /// Work on an in-memory forum loaded from this dump instead of a server;
    /// changes are not written back
    #[structopt(long, parse(from_os_str))]
    seed: Option<PathBuf>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// List posts
    Feed {
        /// all, popular or community:<name>
        #[structopt(long, default_value = "all")]
        scope: Scope,

        /// new, top or hot
        #[structopt(long, default_value = "hot")]
        sort: Order,
    },

    /// Show a post along with its comment thread
    Show { post: u64 },

    /// Submit a post
    Post {
        community: String,
        title: String,

        #[structopt(long, default_value = "")]
        author: String,

        #[structopt(long = "tag")]
        tags: Vec<String>,

        #[structopt(long)]
        text: Option<String>,

        #[structopt(long)]
        image: Option<String>,

        #[structopt(long)]
        link: Option<String>,

        /// One per poll option
        #[structopt(long = "option")]
        options: Vec<String>,
    },

    /// Vote on a post: 1, -1, or 0; repeating a vote retracts it
    Vote {
        post: u64,
        #[structopt(allow_hyphen_values = true)]
        vote: i64,
    },

    /// Vote for a poll option; voting for the same option again retracts
    PollVote { post: u64, option: u64 },

    /// Reply to a post, or to a comment with --parent
    Comment {
        post: u64,
        content: String,

        #[structopt(long)]
        parent: Option<u64>,

        #[structopt(long, default_value = "")]
        author: String,
    },

    /// Vote on a comment
    VoteComment {
        comment: u64,
        #[structopt(allow_hyphen_values = true)]
        vote: i64,
    },

    /// Save a post, or unsave it if it was saved
    Save { post: u64 },

    /// List saved posts
    Saved,

    /// Search posts, or communities with --communities
    Search {
        query: String,

        #[structopt(long)]
        communities: bool,
    },

    /// Show a user's karma
    Karma { username: String },
}

/// Empty means the local account name
fn author_or_default(author: String) -> String {
    if author.is_empty() {
        whoami::username()
    } else {
        author
    }
}

fn print_post(p: &Post) {
    println!(
        "[{:>5}] #{} {} (r/{}, u/{}, {} comments, {})",
        p.score,
        p.id,
        p.title,
        p.community,
        p.author,
        p.comment_count,
        p.timestamp.format("%Y-%m-%d %H:%M"),
    );
}

async fn run<F: Forum>(forum: &F, cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Feed { scope, sort } => {
            let posts = forum.list_posts(scope).await?;
            for p in sort.rank(&posts, chrono::Utc::now()) {
                print_post(&p);
            }
        }
        Command::Show { post } => {
            let p = forum.get_post(PostId(post)).await?;
            print_post(&p);
            if let Some(content) = p.body.content() {
                println!("\n{content}\n");
            }
            if p.body.poll().is_some() {
                let res = forum.poll_results(p.id).await?;
                for o in res.options {
                    println!("  ({}) {:>3}% {} [{}]", o.id, o.percentage, o.text, o.vote_count);
                }
                println!("  {} votes", res.total_votes);
            }
            let comments = forum.comments(p.id).await?;
            for (depth, c) in CommentTree::new(&comments).walk() {
                println!(
                    "{:indent$}[{}] #{} u/{}: {}",
                    "",
                    c.score,
                    c.id,
                    c.author,
                    c.content,
                    indent = 2 * depth,
                );
            }
        }
        Command::Post {
            community,
            title,
            author,
            tags,
            text,
            image,
            link,
            options,
        } => {
            let body = match (text, image, link, options.is_empty()) {
                (Some(content), None, None, true) => NewPostBody::Text { content },
                (None, Some(image_url), None, true) => NewPostBody::Image { image_url },
                (None, None, Some(link_url), true) => NewPostBody::Link { link_url },
                (None, None, None, false) => NewPostBody::Poll { options },
                _ => bail!("exactly one of --text, --image, --link or --option must be given"),
            };
            let p = forum
                .create_post(NewPost {
                    title,
                    author: author_or_default(author),
                    community,
                    tags,
                    body,
                })
                .await?;
            print_post(&p);
        }
        Command::Vote { post, vote } => print_post(&forum.vote(PostId(post), vote).await?),
        Command::PollVote { post, option } => {
            let p = forum.poll_vote(PostId(post), PollOptionId(option)).await?;
            let voted = p.body.poll().and_then(|poll| poll.user_vote);
            match voted {
                Some(o) => println!("voted for option {o} on post #{}", p.id),
                None => println!("retracted poll vote on post #{}", p.id),
            }
        }
        Command::Comment {
            post,
            content,
            parent,
            author,
        } => {
            let c = forum
                .create_comment(NewComment {
                    post_id: PostId(post),
                    parent_id: parent.map(CommentId),
                    author: author_or_default(author),
                    content,
                })
                .await?;
            println!("created comment #{} on post #{}", c.id, c.post_id);
        }
        Command::VoteComment { comment, vote } => {
            let c = forum.vote_comment(CommentId(comment), vote).await?;
            println!("comment #{} now has score {}", c.id, c.score);
        }
        Command::Save { post } => {
            let status = forum.toggle_save(PostId(post)).await?;
            println!(
                "post #{post} {}",
                if status.saved { "saved" } else { "unsaved" }
            );
        }
        Command::Saved => {
            for p in forum.saved().await? {
                print_post(&p);
            }
        }
        Command::Search {
            query,
            communities: false,
        } => {
            for m in forum.search_posts(&query).await? {
                print_post(&m.post);
                println!("        ...{}...", m.snippet);
            }
        }
        Command::Search {
            query,
            communities: true,
        } => {
            for m in forum.search_communities(&query).await? {
                println!(
                    "r/{} ({} members): ...{}...",
                    m.community.name, m.community.member_count, m.snippet
                );
            }
        }
        Command::Karma { username } => {
            println!("{}", forum.user_karma(&username).await?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();

    match (opt.host, opt.seed) {
        (_, Some(path)) => {
            let data = std::fs::read(&path)
                .with_context(|| format!("reading seed file {path:?}"))?;
            let seed: Seed = serde_json::from_slice(&data)
                .with_context(|| format!("parsing seed file {path:?}"))?;
            let forum = MockServer::instant(Store::from_seed(seed));
            run(&forum, opt.cmd).await
        }
        (Some(host), None) => run(&HttpForum::new(host), opt.cmd).await,
        (None, None) => bail!("either --host or --seed must be given"),
    }
}
