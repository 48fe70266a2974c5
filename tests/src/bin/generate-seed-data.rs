use std::collections::HashMap;

use chrono::{Duration, Utc};
use rand::{seq::SliceRandom, Rng};
use threadspace_api::{
    Comment, CommentId, Community, CommunityId, Poll, PollOption, PollOptionId, Post, PostBody,
    PostId, Seed, Time, User, UserId, Vote,
};

const NUM_USERS: usize = 8;
const NUM_COMMUNITIES: usize = 6;
const NUM_POSTS: usize = 80;
const NUM_COMMENTS: usize = 500;

const MAX_POST_AGE_HOURS: i64 = 24 * 14;
const TITLE_WORD_COUNT: usize = 8;
const CONTENT_WORD_COUNT: usize = 60;
const COMMENT_WORD_COUNT: usize = 20;
const DESCRIPTION_WORD_COUNT: usize = 12;

const CATEGORIES: &[&str] = &["Technology", "Gaming", "Science", "Food", "Arts", "General"];
const COLORS: &[&str] = &["#FF4500", "#0079D3", "#46D160", "#FFB000", "#7193FF", "#FF66AC"];
const ICONS: &[&str] = &["Users", "Code", "Gamepad2", "FlaskConical", "Utensils", "Palette"];

/// Lowercase ASCII alphanumerics of `words`, at most `max` long, never empty
fn slug(words: &str, max: usize) -> String {
    let res = words
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .take(max)
        .collect::<String>();
    if res.is_empty() {
        String::from("x")
    } else {
        res
    }
}

fn words(rng: &mut impl Rng, n: usize) -> String {
    lipsum::lipsum_words_with_rng(&mut *rng, n)
}

fn sentence(rng: &mut impl Rng, max_words: usize) -> String {
    let n = rng.gen_range(max_words / 2..=max_words);
    String::from(words(rng, n).trim_end_matches('.'))
}

fn gen_users(rng: &mut impl Rng, now: Time) -> Vec<User> {
    (0..NUM_USERS)
        .map(|i| {
            let username = format!("{}_{i}", slug(&words(rng, 1), 12));
            User {
                id: UserId(i as u64 + 1),
                display_name: sentence(rng, 2),
                bio: rng.gen_bool(0.7).then(|| words(rng, 10)),
                avatar: format!("https://avatars.example.com/{username}.png"),
                join_date: now - Duration::days(rng.gen_range(30..1000)),
                username,
            }
        })
        .collect()
}

fn gen_communities(rng: &mut impl Rng) -> Vec<Community> {
    (0..NUM_COMMUNITIES)
        .map(|i| Community {
            id: CommunityId(i as u64 + 1),
            // Community names are 3 to 21 characters of [A-Za-z0-9_]
            name: format!("{}_{i}", slug(&words(rng, 2), 15)),
            description: words(rng, DESCRIPTION_WORD_COUNT),
            member_count: rng.gen_range(1..50_000),
            color: String::from(COLORS[i % COLORS.len()]),
            icon: String::from(ICONS[i % ICONS.len()]),
            category: String::from(*CATEGORIES.choose(rng).unwrap()),
        })
        .collect()
}

fn gen_body(rng: &mut impl Rng, id: u64) -> PostBody {
    match rng.gen_range(0..20) {
        0..=9 => PostBody::Text {
            content: {
                let n = rng.gen_range(10..CONTENT_WORD_COUNT);
                words(rng, n)
            },
        },
        10..=13 => PostBody::Link {
            link_url: format!("https://example.com/articles/{id}"),
        },
        14..=16 => PostBody::Image {
            image_url: format!("https://images.example.com/{id}.jpg"),
        },
        _ => PostBody::Poll(Poll {
            options: (1..=rng.gen_range(2..=5))
                .map(|o| PollOption {
                    id: PollOptionId(o),
                    text: sentence(rng, 4),
                    vote_count: rng.gen_range(0..300),
                })
                .collect(),
            user_vote: None,
        }),
    }
}

fn gen_posts(
    rng: &mut impl Rng,
    now: Time,
    users: &[User],
    communities: &[Community],
) -> Vec<Post> {
    let mut dates = (0..NUM_POSTS)
        .map(|_| now - Duration::minutes(rng.gen_range(0..MAX_POST_AGE_HOURS * 60)))
        .collect::<Vec<_>>();
    dates.sort();
    let mut posts = dates
        .into_iter()
        .zip(1..)
        .map(|(timestamp, id)| Post {
            id: PostId(id),
            title: sentence(rng, TITLE_WORD_COUNT),
            author: users.choose(rng).unwrap().username.clone(),
            community: communities.choose(rng).unwrap().name.clone(),
            // Skewed so that some posts reach the popular feed
            score: rng.gen_range(-5i64..20) * rng.gen_range(1i64..15),
            user_vote: Vote::None,
            timestamp,
            comment_count: 0,
            tags: (0..rng.gen_range(0..=3))
                .map(|_| slug(&words(rng, 1), 20))
                .collect(),
            body: gen_body(rng, id),
        })
        .collect::<Vec<_>>();
    // Feeds list the newest post first
    posts.reverse();
    posts
}

/// Replies only ever point to earlier comments on the same post
fn gen_comments(rng: &mut impl Rng, now: Time, users: &[User], posts: &mut [Post]) -> Vec<Comment> {
    let mut per_post: HashMap<PostId, Vec<CommentId>> = HashMap::new();
    let mut comments = Vec::with_capacity(NUM_COMMENTS);
    for id in (1..).take(NUM_COMMENTS) {
        let post = posts.choose_mut(rng).unwrap();
        let thread = per_post.entry(post.id).or_default();
        let parent_id = match thread.is_empty() || rng.gen_bool(0.4) {
            true => None,
            false => thread.choose(rng).copied(),
        };
        let since_post = (now - post.timestamp).num_minutes().max(1);
        let id = CommentId(id);
        thread.push(id);
        post.comment_count += 1;
        comments.push(Comment {
            id,
            post_id: post.id,
            parent_id,
            author: users.choose(rng).unwrap().username.clone(),
            content: {
                let n = rng.gen_range(3..COMMENT_WORD_COUNT);
                words(rng, n)
            },
            timestamp: post.timestamp + Duration::minutes(rng.gen_range(0..since_post)),
            score: rng.gen_range(-3..40),
            user_vote: Vote::None,
        });
    }
    comments
}

fn main() {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    let users = gen_users(&mut rng, now);
    let communities = gen_communities(&mut rng);
    let mut posts = gen_posts(&mut rng, now, &users, &communities);
    let comments = gen_comments(&mut rng, now, &users, &mut posts);

    let seed = Seed {
        users,
        communities,
        posts,
        comments,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&seed).expect("serializing seed data")
    );
}
