use crate::api::{
    Comment, Error, PollOptionId, PollOptionResult, PollResults, Post, Vote,
};

/// Anything carrying a score along with the caller's own vote on it
pub trait Scored {
    fn vote_state(&mut self) -> (&mut i64, &mut Vote);
}

impl Scored for Post {
    fn vote_state(&mut self) -> (&mut i64, &mut Vote) {
        (&mut self.score, &mut self.user_vote)
    }
}

impl Scored for Comment {
    fn vote_state(&mut self) -> (&mut i64, &mut Vote) {
        (&mut self.score, &mut self.user_vote)
    }
}

/// Casting the vote already held retracts it, anything else replaces it
///
/// Keeps `score - user_vote` constant, short of saturating at the bounds of
/// `i64`.
pub fn apply_vote<T: Scored>(entity: &mut T, vote: Vote) {
    let (score, current) = entity.vote_state();
    if vote == *current {
        *score = score.saturating_sub(vote.value());
        *current = Vote::None;
    } else {
        *score = score.saturating_add(vote.value() - current.value());
        *current = vote;
    }
}

/// Moves the caller's poll vote to `option`, or retracts it if it was
/// already there
///
/// Fails without touching the post if it is not a poll or has no such option.
pub fn apply_poll_vote(post: &mut Post, option: PollOptionId) -> Result<(), Error> {
    let post_id = post.id;
    let poll = post
        .body
        .poll_mut()
        .ok_or(Error::NotAPoll { post: post_id })?;
    let target = poll
        .options
        .iter()
        .position(|o| o.id == option)
        .ok_or(Error::PollOptionNotFound {
            post: post_id,
            option,
        })?;
    let previous = poll
        .user_vote
        .and_then(|prev| poll.options.iter().position(|o| o.id == prev));

    if let Some(prev) = previous {
        let count = &mut poll.options[prev].vote_count;
        *count = count.saturating_sub(1);
    }
    if previous == Some(target) {
        poll.user_vote = None;
    } else {
        let count = &mut poll.options[target].vote_count;
        *count = count.saturating_add(1);
        poll.user_vote = Some(option);
    }
    Ok(())
}

/// Percentages rounded half up, each on its own
pub fn poll_results(post: &Post) -> Result<PollResults, Error> {
    let poll = post.body.poll().ok_or(Error::NotAPoll { post: post.id })?;
    let total = poll.total_votes();
    Ok(PollResults {
        total_votes: total,
        options: poll
            .options
            .iter()
            .map(|o| PollOptionResult {
                id: o.id,
                text: o.text.clone(),
                vote_count: o.vote_count,
                percentage: percentage(o.vote_count, total),
            })
            .collect(),
    })
}

fn percentage(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    let (count, total) = (u128::from(count), u128::from(total));
    u64::try_from((200 * count + total) / (2 * total)).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{NewPost, NewPostBody, PostId, Time};

    fn text_post() -> Post {
        let mut p = NewPost {
            title: String::from("Show HN"),
            author: String::from("alice"),
            community: String::from("webdev"),
            tags: vec![],
            body: NewPostBody::Text {
                content: String::from("hello"),
            },
        }
        .into_post(PostId(1), Time::default());
        p.score = 10;
        p.user_vote = Vote::None;
        p
    }

    fn poll_post(options: &[&str]) -> Post {
        NewPost {
            title: String::from("Favorite language?"),
            author: String::from("alice"),
            community: String::from("programming"),
            tags: vec![],
            body: NewPostBody::Poll {
                options: options.iter().map(|o| String::from(*o)).collect(),
            },
        }
        .into_post(PostId(2), Time::default())
    }

    #[test]
    fn vote_toggles() {
        let mut p = text_post();
        apply_vote(&mut p, Vote::Up);
        assert_eq!((p.score, p.user_vote), (11, Vote::Up));
        apply_vote(&mut p, Vote::Down);
        assert_eq!((p.score, p.user_vote), (9, Vote::Down));
        apply_vote(&mut p, Vote::Down);
        assert_eq!((p.score, p.user_vote), (10, Vote::None));
        apply_vote(&mut p, Vote::Up);
        apply_vote(&mut p, Vote::Up);
        assert_eq!((p.score, p.user_vote), (10, Vote::None));
    }

    #[test]
    fn vote_sequences_keep_baseline() {
        bolero::check!()
            .with_type::<Vec<Vote>>()
            .for_each(|votes: &Vec<Vote>| {
                let mut p = text_post();
                let baseline = p.score - p.user_vote.value();
                for v in votes {
                    apply_vote(&mut p, *v);
                    assert_eq!(p.score - p.user_vote.value(), baseline);
                }
            });
    }

    #[test]
    fn poll_vote_moves_and_retracts() {
        let mut p = poll_post(&["Rust", "Go", "Zig"]);
        apply_poll_vote(&mut p, PollOptionId(1)).unwrap();
        apply_poll_vote(&mut p, PollOptionId(3)).unwrap();
        let poll = p.body.poll().unwrap();
        assert_eq!(poll.user_vote, Some(PollOptionId(3)));
        assert_eq!(
            poll.options.iter().map(|o| o.vote_count).collect::<Vec<_>>(),
            vec![0, 0, 1],
        );
        apply_poll_vote(&mut p, PollOptionId(3)).unwrap();
        let poll = p.body.poll().unwrap();
        assert_eq!(poll.user_vote, None);
        assert_eq!(poll.total_votes(), 0);
    }

    #[test]
    fn poll_vote_failures_leave_post_untouched() {
        let mut p = poll_post(&["Rust", "Go"]);
        apply_poll_vote(&mut p, PollOptionId(1)).unwrap();
        let before = p.clone();
        assert_eq!(
            apply_poll_vote(&mut p, PollOptionId(7)),
            Err(Error::PollOptionNotFound {
                post: PostId(2),
                option: PollOptionId(7)
            }),
        );
        assert_eq!(p, before);

        let mut t = text_post();
        assert_eq!(
            apply_poll_vote(&mut t, PollOptionId(1)),
            Err(Error::NotAPoll { post: PostId(1) }),
        );
    }

    #[test]
    fn poll_vote_clamps_stale_counts() {
        let mut p = poll_post(&["Rust", "Go"]);
        p.body.poll_mut().unwrap().user_vote = Some(PollOptionId(1));
        apply_poll_vote(&mut p, PollOptionId(2)).unwrap();
        let poll = p.body.poll().unwrap();
        assert_eq!(poll.options[0].vote_count, 0);
        assert_eq!(poll.options[1].vote_count, 1);
    }

    #[test]
    fn poll_sequences_hold_at_most_one_vote() {
        bolero::check!()
            .with_type::<Vec<u8>>()
            .for_each(|choices: &Vec<u8>| {
                let mut p = poll_post(&["a", "b", "c", "d"]);
                for (i, o) in p.body.poll_mut().unwrap().options.iter_mut().enumerate() {
                    o.vote_count = 3 * i as u64;
                }
                let start = p.body.poll().unwrap().total_votes();
                for c in choices {
                    // Option 5 does not exist and must be rejected
                    let res = apply_poll_vote(&mut p, PollOptionId(u64::from(c % 5) + 1));
                    assert_eq!(res.is_err(), c % 5 == 4);
                    let poll = p.body.poll().unwrap();
                    let total = poll.total_votes();
                    assert_eq!(total, start + u64::from(poll.user_vote.is_some()));
                }
            });
    }

    #[test]
    fn percentages_are_not_normalized() {
        let mut p = poll_post(&["a", "b", "c"]);
        for o in p.body.poll_mut().unwrap().options.iter_mut() {
            o.vote_count = 1;
        }
        let res = poll_results(&p).unwrap();
        assert_eq!(res.total_votes, 3);
        assert_eq!(
            res.options.iter().map(|o| o.percentage).collect::<Vec<_>>(),
            vec![33, 33, 33],
        );

        let empty = poll_post(&["a", "b"]);
        let res = poll_results(&empty).unwrap();
        assert!(res.options.iter().all(|o| o.percentage == 0));

        let mut halves = poll_post(&["a", "b", "c"]);
        let opts = &mut halves.body.poll_mut().unwrap().options;
        opts[0].vote_count = 1;
        opts[1].vote_count = 1;
        opts[2].vote_count = 6;
        let res = poll_results(&halves).unwrap();
        // 12.5 rounds up, 75 stays
        assert_eq!(
            res.options.iter().map(|o| o.percentage).collect::<Vec<_>>(),
            vec![13, 13, 75],
        );
    }

    #[test]
    fn extreme_counts_saturate() {
        let mut p = text_post();
        p.score = i64::MAX;
        apply_vote(&mut p, Vote::Up);
        assert_eq!((p.score, p.user_vote), (i64::MAX, Vote::Up));
        p.score = i64::MIN;
        apply_vote(&mut p, Vote::Down);
        assert_eq!((p.score, p.user_vote), (i64::MIN, Vote::Down));

        let mut poll = poll_post(&["a", "b"]);
        let opts = &mut poll.body.poll_mut().unwrap().options;
        opts[0].vote_count = u64::MAX;
        opts[1].vote_count = u64::MAX - 1;
        apply_poll_vote(&mut poll, PollOptionId(1)).unwrap();
        let res = poll_results(&poll).unwrap();
        assert_eq!(res.total_votes, u64::MAX);
        assert_eq!(res.options[0].vote_count, u64::MAX);
        assert_eq!(res.options[0].percentage, 100);
    }
}
