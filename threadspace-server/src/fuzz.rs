#![cfg(test)]

use axum::{
    extract::FromRequestParts,
    http::{self, request},
    Router,
};
use std::{cmp, fmt::Debug, ops::RangeTo, panic::AssertUnwindSafe, sync::Arc};
use threadspace_api::{
    CommentId, Error as ApiError, NewComment, NewCommunity, NewPost, NewPostBody, NewUser, Order,
    PollOptionId, PollVoteRequest, PostEdit, PostId, Scope, Time, VoteRequest,
};
use threadspace_client::Store;
use threadspace_mock_server::MockServer;
use tower::{Service, ServiceExt};

use crate::{app, extractors::*, Error};

macro_rules! do_tokio_test {
    ( $name:ident, $gen:expr, $fn:expr ) => {
        #[test]
        fn $name() {
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_generator($gen)
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

do_tokio_test!(
    fuzz_feed_query,
    bolero::generator::gen::<String>(),
    |query: String| async move {
        if let Ok(req) = http::Request::builder()
            .method(http::Method::GET)
            .uri(format!("/api/posts?{query}"))
            .body(())
        {
            let mut req = req.into_parts().0;
            match FeedQuery::from_request_parts(&mut req, &()).await {
                Ok(_) => (),
                Err(Error::Api(
                    ApiError::UnknownScope { .. }
                    | ApiError::UnknownOrder { .. }
                    | ApiError::InvalidQuery { .. },
                )) => {}
                Err(e) => panic!("got unexpected error: {e}"),
            }
        }
    }
);

fn fixed_now() -> Time {
    "2024-06-01T12:00:00Z"
        .parse()
        .expect("parsing fixed test time")
}

/// Percent-encodes everything but ASCII alphanumerics, `-` and `_`
fn encode(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            res.push(char::from(b));
        } else {
            res.push_str(&format!("%{b:02X}"));
        }
    }
    res
}

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum CommunityName {
    Generated(u8),
    Raw(String),
}

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum FuzzBody {
    Text(String),
    Image(String),
    Link(String),
    Poll(Vec<String>),
}

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum FuzzOp {
    CreateCommunity {
        name: CommunityName,
        description: String,
    },
    ToggleMembership {
        community: usize,
    },
    CreateUser {
        username: String,
        display_name: String,
    },
    UserKarma {
        user: usize,
    },
    CreatePost {
        community: usize,
        author: String,
        title: String,
        tags: Vec<String>,
        body: FuzzBody,
    },
    EditPost {
        post: usize,
        title: Option<String>,
        content: Option<String>,
    },
    DeletePost {
        post: usize,
    },
    Vote {
        post: usize,
        #[generator(-2i64..=2)]
        vote: i64,
    },
    PollVote {
        post: usize,
        #[generator(0u64..=4)]
        option: u64,
    },
    PollResults {
        post: usize,
    },
    CreateComment {
        post: usize,
        parent: Option<usize>,
        content: String,
    },
    VoteComment {
        comment: usize,
        #[generator(-2i64..=2)]
        vote: i64,
    },
    DeleteComment {
        comment: usize,
    },
    ToggleSave {
        post: usize,
    },
    Saved,
    ListPosts {
        community: Option<usize>,
        popular: bool,
        order: Option<Order>,
    },
    SearchPosts {
        query: String,
    },
    SearchCommunities {
        query: String,
    },
}

async fn call<Req, Resp>(
    app: &mut Router,
    req: request::Request<axum::body::Body>,
    req_body: &Req,
) -> Result<Resp, ApiError>
where
    Req: Debug,
    Resp: 'static + for<'de> serde::Deserialize<'de>,
{
    app.ready().await.expect("waiting for app to be ready");
    let resp = app.call(req).await.expect("running request");
    let status = resp.status();
    let body = hyper::body::to_bytes(resp.into_body())
        .await
        .expect("recovering resp bytes");
    if status == http::StatusCode::OK {
        if std::any::TypeId::of::<Resp>() == std::any::TypeId::of::<()>() {
            // the server returns an empty body in this situation, which does not parse properly with serde_json
            return Ok(serde_json::from_slice(b"null").unwrap());
        } else {
            return Ok(serde_json::from_slice(&body).unwrap_or_else(|err| {
                panic!(
                    r#"
                        Failed parsing resp body!

                        The error is the following:
                        ---
                        {err}
                        ---

                        Response body is:
                        ---
                        {body:?}
                        ---

                        Request was:
                        ---
                        {req_body:?}
                        ---
                    "#
                )
            }));
        }
    }
    Err(ApiError::parse(&body)
        .unwrap_or_else(|err| panic!("parsing error response body {err}, body is {body:?}")))
}

async fn run_on_app<Req, Resp>(
    app: &mut Router,
    method: &str,
    uri: &str,
    body: &Req,
) -> Result<Resp, ApiError>
where
    Req: Debug + serde::Serialize,
    Resp: 'static + for<'de> serde::Deserialize<'de>,
{
    let req = request::Builder::new()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serializing request body to json"),
        ))
        .expect("building request");
    call(app, req, body).await
}

fn compare<T>(name: &str, app_res: Result<T, ApiError>, mock_res: Result<T, ApiError>)
where
    T: Debug + PartialEq,
{
    assert_eq!(
        app_res, mock_res,
        "app and mock did not return the same result for {name}"
    );
}

fn resize_int(fuzz_id: usize, RangeTo { end }: RangeTo<usize>) -> Option<usize> {
    if end == 0 {
        return None;
    }
    let bucket_size = cmp::max(1, usize::MAX / end); // in case we rounded to 0
    let id = fuzz_id / bucket_size;
    Some(cmp::min(id, end - 1)) // in case id was actually over end - 1 due to rounding
}

/// Picks one of `ids`, or an id known to be missing one time out of `len + 1`
fn pick<T: Copy>(fuzz_id: usize, ids: &[T], missing: T) -> T {
    match resize_int(fuzz_id, ..ids.len() + 1) {
        Some(i) if i < ids.len() => ids[i],
        _ => missing,
    }
}

const MISSING_POST: PostId = PostId(1_000_000);
const MISSING_COMMENT: CommentId = CommentId(1_000_000);

struct ComparativeFuzzer {
    app: Router,
    mock: MockServer,
    usernames: Vec<String>,
}

impl ComparativeFuzzer {
    async fn new() -> ComparativeFuzzer {
        let served = MockServer::instant(Store::new()).with_clock(fixed_now);
        let mut fuzzer = ComparativeFuzzer {
            app: app(Arc::new(served)),
            mock: MockServer::instant(Store::new()).with_clock(fixed_now),
            usernames: Vec::new(),
        };
        fuzzer
            .execute_fuzz_op(FuzzOp::CreateCommunity {
                name: CommunityName::Raw(String::from("general")),
                description: String::from("Anything goes, within reason"),
            })
            .await;
        fuzzer
    }

    async fn post_ids(&self) -> Vec<PostId> {
        self.mock
            .list_posts(Scope::All)
            .await
            .into_iter()
            .map(|p| p.id)
            .collect()
    }

    async fn comment_ids(&self) -> Vec<CommentId> {
        let mut res = Vec::new();
        for post in self.post_ids().await {
            let comments = self.mock.comments(post).await.expect("listing comments");
            res.extend(comments.into_iter().map(|c| c.id));
        }
        res
    }

    async fn community_name(&self, fuzz_id: usize) -> Option<String> {
        let communities = self.mock.communities().await;
        resize_int(fuzz_id, ..communities.len()).map(|i| communities[i].name.clone())
    }

    async fn execute_fuzz_op(&mut self, op: FuzzOp) {
        match op {
            FuzzOp::CreateCommunity { name, description } => {
                let draft = NewCommunity {
                    name: match name {
                        CommunityName::Generated(n) => format!("community_{n}"),
                        CommunityName::Raw(s) => s,
                    },
                    description,
                    color: None,
                    icon: None,
                    category: None,
                };
                compare(
                    "CreateCommunity",
                    run_on_app(&mut self.app, "POST", "/api/communities", &draft).await,
                    self.mock.create_community(draft).await,
                )
            }
            FuzzOp::ToggleMembership { community } => {
                if let Some(name) = self.community_name(community).await {
                    compare(
                        "ToggleMembership",
                        run_on_app(
                            &mut self.app,
                            "POST",
                            &format!("/api/communities/{name}/membership"),
                            &(),
                        )
                        .await,
                        self.mock.toggle_membership(&name).await,
                    )
                }
            }
            FuzzOp::CreateUser {
                username,
                display_name,
            } => {
                let draft = NewUser {
                    username,
                    display_name,
                    bio: None,
                    avatar: String::from("https://avatars.example.com/fuzz.png"),
                };
                let app_res =
                    run_on_app(&mut self.app, "POST", "/api/users", &draft).await;
                let mock_res = self.mock.create_user(draft).await;
                if let Ok(user) = &mock_res {
                    self.usernames.push(user.username.clone());
                }
                compare("CreateUser", app_res, mock_res)
            }
            FuzzOp::UserKarma { user } => {
                let username = match resize_int(user, ..self.usernames.len()) {
                    Some(i) => self.usernames[i].clone(),
                    None => String::from("nobody"),
                };
                compare(
                    "UserKarma",
                    run_on_app(
                        &mut self.app,
                        "GET",
                        &format!("/api/users/{}/karma", encode(&username)),
                        &(),
                    )
                    .await,
                    self.mock.user_karma(&username).await,
                )
            }
            FuzzOp::CreatePost {
                community,
                author,
                title,
                tags,
                body,
            } => {
                let community = self
                    .community_name(community)
                    .await
                    .unwrap_or_else(|| String::from("nowhere"));
                let draft = NewPost {
                    title,
                    author,
                    community,
                    tags,
                    body: match body {
                        FuzzBody::Text(content) => NewPostBody::Text { content },
                        FuzzBody::Image(image_url) => NewPostBody::Image { image_url },
                        FuzzBody::Link(link_url) => NewPostBody::Link { link_url },
                        FuzzBody::Poll(options) => NewPostBody::Poll { options },
                    },
                };
                compare(
                    "CreatePost",
                    run_on_app(&mut self.app, "POST", "/api/posts", &draft).await,
                    self.mock.create_post(draft).await,
                )
            }
            FuzzOp::EditPost {
                post,
                title,
                content,
            } => {
                let post = pick(post, &self.post_ids().await, MISSING_POST);
                let edit = PostEdit {
                    title,
                    tags: None,
                    content,
                };
                compare(
                    "EditPost",
                    run_on_app(&mut self.app, "PATCH", &format!("/api/posts/{post}"), &edit)
                        .await,
                    self.mock.edit_post(post, edit).await,
                )
            }
            FuzzOp::DeletePost { post } => {
                let post = pick(post, &self.post_ids().await, MISSING_POST);
                compare(
                    "DeletePost",
                    run_on_app(&mut self.app, "DELETE", &format!("/api/posts/{post}"), &())
                        .await,
                    self.mock.delete_post(post).await,
                )
            }
            FuzzOp::Vote { post, vote } => {
                let post = pick(post, &self.post_ids().await, MISSING_POST);
                compare(
                    "Vote",
                    run_on_app(
                        &mut self.app,
                        "POST",
                        &format!("/api/posts/{post}/vote"),
                        &VoteRequest { vote },
                    )
                    .await,
                    self.mock.vote(post, vote).await,
                )
            }
            FuzzOp::PollVote { post, option } => {
                let post = pick(post, &self.post_ids().await, MISSING_POST);
                let option = PollOptionId(option);
                compare(
                    "PollVote",
                    run_on_app(
                        &mut self.app,
                        "POST",
                        &format!("/api/posts/{post}/poll-vote"),
                        &PollVoteRequest { option },
                    )
                    .await,
                    self.mock.poll_vote(post, option).await,
                )
            }
            FuzzOp::PollResults { post } => {
                let post = pick(post, &self.post_ids().await, MISSING_POST);
                compare(
                    "PollResults",
                    run_on_app(&mut self.app, "GET", &format!("/api/posts/{post}/poll"), &())
                        .await,
                    self.mock.poll_results(post).await,
                )
            }
            FuzzOp::CreateComment {
                post,
                parent,
                content,
            } => {
                let post = pick(post, &self.post_ids().await, MISSING_POST);
                let parent_id = match parent {
                    Some(p) => Some(pick(p, &self.comment_ids().await, MISSING_COMMENT)),
                    None => None,
                };
                let draft = NewComment {
                    post_id: post,
                    parent_id,
                    author: String::from("fuzzer"),
                    content,
                };
                compare(
                    "CreateComment",
                    run_on_app(
                        &mut self.app,
                        "POST",
                        &format!("/api/posts/{post}/comments"),
                        &draft,
                    )
                    .await,
                    self.mock.create_comment(draft).await,
                )
            }
            FuzzOp::VoteComment { comment, vote } => {
                let comment = pick(comment, &self.comment_ids().await, MISSING_COMMENT);
                compare(
                    "VoteComment",
                    run_on_app(
                        &mut self.app,
                        "POST",
                        &format!("/api/comments/{comment}/vote"),
                        &VoteRequest { vote },
                    )
                    .await,
                    self.mock.vote_comment(comment, vote).await,
                )
            }
            FuzzOp::DeleteComment { comment } => {
                let comment = pick(comment, &self.comment_ids().await, MISSING_COMMENT);
                compare(
                    "DeleteComment",
                    run_on_app(
                        &mut self.app,
                        "DELETE",
                        &format!("/api/comments/{comment}"),
                        &(),
                    )
                    .await,
                    self.mock.delete_comment(comment).await,
                )
            }
            FuzzOp::ToggleSave { post } => {
                let post = pick(post, &self.post_ids().await, MISSING_POST);
                compare(
                    "ToggleSave",
                    run_on_app(&mut self.app, "POST", &format!("/api/posts/{post}/save"), &())
                        .await,
                    self.mock.toggle_save(post).await,
                )
            }
            FuzzOp::Saved => compare(
                "Saved",
                run_on_app(&mut self.app, "GET", "/api/saved", &()).await,
                Ok(self.mock.saved().await),
            ),
            FuzzOp::ListPosts {
                community,
                popular,
                order,
            } => {
                let scope = match community {
                    Some(c) => match self.community_name(c).await {
                        Some(name) => Scope::Community(name),
                        None => Scope::All,
                    },
                    None if popular => Scope::Popular,
                    None => Scope::All,
                };
                let mut uri = format!("/api/posts?scope={scope}");
                if let Some(order) = order {
                    uri.push_str(&format!("&sort={order}"));
                }
                let mock_res = match order {
                    Some(order) => self.mock.ranked_posts(scope, order).await,
                    None => self.mock.list_posts(scope).await,
                };
                compare(
                    "ListPosts",
                    run_on_app(&mut self.app, "GET", &uri, &()).await,
                    Ok(mock_res),
                )
            }
            FuzzOp::SearchPosts { query } => compare(
                "SearchPosts",
                run_on_app(
                    &mut self.app,
                    "GET",
                    &format!("/api/search/posts?q={}", encode(&query)),
                    &(),
                )
                .await,
                Ok(self.mock.search_posts(&query).await),
            ),
            FuzzOp::SearchCommunities { query } => compare(
                "SearchCommunities",
                run_on_app(
                    &mut self.app,
                    "GET",
                    &format!("/api/search/communities?q={}", encode(&query)),
                    &(),
                )
                .await,
                Ok(self.mock.search_communities(&query).await),
            ),
        }
    }
}

do_tokio_test!(
    compare_with_mock,
    bolero::generator::gen_with::<Vec<FuzzOp>>().len(1..100usize),
    |test: Vec<FuzzOp>| async move {
        let mut fuzzer = ComparativeFuzzer::new().await;
        for op in test {
            fuzzer.execute_fuzz_op(op).await;
        }
    }
);

#[tokio::test]
async fn errors_map_to_status_codes() {
    let mut app = app(Arc::new(
        MockServer::instant(Store::new()).with_clock(fixed_now),
    ));
    let request = |method: &str, uri: &str, body: &str| {
        request::Builder::new()
            .method(method)
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(String::from(body)))
            .expect("building request")
    };
    let community = r#"{"name": "webdev", "description": "Everything about the web"}"#;
    let cases = [
        ("GET", "/api/posts/9", "", http::StatusCode::NOT_FOUND),
        ("GET", "/api/posts?sort=sideways", "", http::StatusCode::BAD_REQUEST),
        ("GET", "/api/posts?scope=trending", "", http::StatusCode::BAD_REQUEST),
        ("GET", "/api/posts?sort=new&sort=top", "", http::StatusCode::BAD_REQUEST),
        ("GET", "/api/search/posts?q=a&q=b", "", http::StatusCode::BAD_REQUEST),
        ("POST", "/api/communities", community, http::StatusCode::OK),
        ("POST", "/api/communities", community, http::StatusCode::CONFLICT),
        ("GET", "/api/users/nobody/karma", "", http::StatusCode::NOT_FOUND),
    ];
    for (method, uri, body, expected) in cases {
        let resp = app
            .ready()
            .await
            .expect("waiting for app to be ready")
            .call(request(method, uri, body))
            .await
            .expect("running request");
        assert_eq!(resp.status(), expected, "{method} {uri}");
    }

    let post = r#"{
        "title": "Learning React Hooks",
        "author": "alice",
        "community": "WEBDEV",
        "post_type": "text",
        "content": "useState and friends"
    }"#;
    let resp = app
        .ready()
        .await
        .expect("waiting for app to be ready")
        .call(request("POST", "/api/posts", post))
        .await
        .expect("running request");
    assert_eq!(resp.status(), http::StatusCode::OK);

    let resp = app
        .ready()
        .await
        .expect("waiting for app to be ready")
        .call(request("POST", "/api/posts/1/vote", r#"{"vote": 3}"#))
        .await
        .expect("running request");
    assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
    let body = hyper::body::to_bytes(resp.into_body())
        .await
        .expect("recovering resp bytes");
    assert_eq!(
        ApiError::parse(&body).expect("parsing error body"),
        ApiError::InvalidVote { vote: 3 },
    );

    let found: Vec<threadspace_api::PostMatch> = run_on_app(
        &mut app,
        "GET",
        &format!("/api/search/posts?q={}", encode("react hooks")),
        &(),
    )
    .await
    .expect("searching posts");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].post.community, "webdev");
}
