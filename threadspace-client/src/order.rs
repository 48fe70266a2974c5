use std::cmp::Reverse;

use crate::api::{Order, Post, Time};

const HOT_GRAVITY: f64 = 1.8;

pub trait OrderExt {
    /// Stable: posts comparing equal keep their relative order
    fn sort(&self, posts: &mut [Post], now: Time);

    fn rank(&self, posts: &[Post], now: Time) -> Vec<Post> {
        let mut res = posts.to_vec();
        self.sort(&mut res, now);
        res
    }
}

impl OrderExt for Order {
    fn sort(&self, posts: &mut [Post], now: Time) {
        match self {
            Order::New => posts.sort_by_key(|p| Reverse(p.timestamp)),
            Order::Top => posts.sort_by_key(|p| Reverse(p.score)),
            Order::Hot => {
                let mut keyed = posts
                    .iter()
                    .map(|p| (hot_score(p, now), p.clone()))
                    .collect::<Vec<_>>();
                keyed.sort_by(|(a, _), (b, _)| b.total_cmp(a));
                for (slot, (_, p)) in posts.iter_mut().zip(keyed) {
                    *slot = p;
                }
            }
        }
    }
}

/// `(score + 1) / (age_hours + 2)^1.8`, posts from the future counting as new
pub fn hot_score(post: &Post, now: Time) -> f64 {
    let age_secs = (now - post.timestamp).num_seconds().max(0);
    let age_hours = age_secs as f64 / 3600.;
    (post.score as f64 + 1.) / (age_hours + 2.).powf(HOT_GRAVITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{PostBody, PostId, Vote};

    fn post(id: u64, score: i64, timestamp: &str) -> Post {
        Post {
            id: PostId(id),
            title: format!("post {id}"),
            author: String::from("alice"),
            community: String::from("webdev"),
            score,
            user_vote: Vote::None,
            timestamp: timestamp.parse().unwrap(),
            comment_count: 0,
            tags: vec![],
            body: PostBody::Text {
                content: String::from("body"),
            },
        }
    }

    fn ids(posts: &[Post]) -> Vec<u64> {
        posts.iter().map(|p| p.id.0).collect()
    }

    fn now() -> Time {
        "2024-01-10T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn newest_first() {
        let posts = vec![
            post(1, 0, "2024-01-01T00:00:00Z"),
            post(2, 0, "2024-01-03T00:00:00Z"),
            post(3, 0, "2024-01-02T00:00:00Z"),
        ];
        assert_eq!(ids(&Order::New.rank(&posts, now())), vec![2, 3, 1]);
    }

    #[test]
    fn best_score_first() {
        let posts = vec![
            post(1, 5, "2024-01-01T00:00:00Z"),
            post(2, 20, "2024-01-01T00:00:00Z"),
            post(3, 1, "2024-01-01T00:00:00Z"),
        ];
        assert_eq!(ids(&Order::Top.rank(&posts, now())), vec![2, 1, 3]);
    }

    #[test]
    fn ties_keep_input_order() {
        let posts = vec![
            post(4, 7, "2024-01-05T00:00:00Z"),
            post(2, 7, "2024-01-05T00:00:00Z"),
            post(9, 7, "2024-01-05T00:00:00Z"),
        ];
        for o in [Order::New, Order::Top, Order::Hot] {
            assert_eq!(ids(&o.rank(&posts, now())), vec![4, 2, 9], "{o}");
        }
    }

    #[test]
    fn hot_decays_with_age() {
        let fresh = post(1, 10, "2024-01-09T22:00:00Z");
        let old = post(2, 100, "2024-01-01T00:00:00Z");
        assert!(hot_score(&fresh, now()) > hot_score(&old, now()));
        assert_eq!(
            ids(&Order::Hot.rank(&[old.clone(), fresh.clone()], now())),
            vec![1, 2],
        );

        // 10 upvotes, two hours old: 11 / 4^1.8
        let expected = 11. / 4f64.powf(1.8);
        assert!((hot_score(&fresh, now()) - expected).abs() < 1e-9);
    }

    #[test]
    fn future_posts_count_as_brand_new() {
        let future = post(1, 3, "2024-02-01T00:00:00Z");
        let expected = 4. / 2f64.powf(1.8);
        assert!((hot_score(&future, now()) - expected).abs() < 1e-9);
    }

    #[test]
    fn ranking_does_not_touch_input() {
        let posts = vec![
            post(1, 1, "2024-01-01T00:00:00Z"),
            post(2, 50, "2024-01-02T00:00:00Z"),
        ];
        let before = posts.clone();
        let _ = Order::Top.rank(&posts, now());
        assert_eq!(posts, before);
    }
}
