use std::collections::{HashMap, HashSet};

use crate::api::{Comment, CommentId};

/// Direct replies to `parent`, in their original order
pub fn children_of(comments: &[Comment], parent: Option<CommentId>) -> Vec<Comment> {
    comments
        .iter()
        .filter(|c| c.parent_id == parent)
        .cloned()
        .collect()
}

pub fn top_level(comments: &[Comment]) -> Vec<Comment> {
    children_of(comments, None)
}

/// Parent-to-children adjacency over a flat comment list
///
/// The list is expected to be a forest, which the store guarantees. Nothing
/// here recurses, so arbitrarily deep threads are fine.
pub struct CommentTree<'a> {
    comments: &'a [Comment],
    children: HashMap<Option<CommentId>, Vec<usize>>,
}

impl<'a> CommentTree<'a> {
    pub fn new(comments: &'a [Comment]) -> CommentTree<'a> {
        let mut children: HashMap<Option<CommentId>, Vec<usize>> = HashMap::new();
        for (i, c) in comments.iter().enumerate() {
            children.entry(c.parent_id).or_default().push(i);
        }
        CommentTree { comments, children }
    }

    pub fn children(&self, parent: Option<CommentId>) -> impl Iterator<Item = &'a Comment> + '_ {
        let comments = self.comments;
        self.children
            .get(&parent)
            .into_iter()
            .flatten()
            .map(move |&i| &comments[i])
    }

    /// Every comment below `id`, excluding `id` itself
    pub fn descendants(&self, id: CommentId) -> Vec<CommentId> {
        let mut res = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        seen.insert(id);
        while let Some(cur) = stack.pop() {
            for c in self.children(Some(cur)) {
                if seen.insert(c.id) {
                    res.push(c.id);
                    stack.push(c.id);
                }
            }
        }
        res
    }

    /// Pre-order traversal yielding each comment with its nesting depth,
    /// siblings in their original order
    pub fn walk(&self) -> Vec<(usize, &'a Comment)> {
        let mut res = Vec::with_capacity(self.comments.len());
        let mut stack = self
            .children(None)
            .map(|c| (0, c))
            .collect::<Vec<_>>();
        stack.reverse();
        while let Some((depth, c)) = stack.pop() {
            res.push((depth, c));
            let len = stack.len();
            stack.extend(self.children(Some(c.id)).map(|r| (depth + 1, r)));
            stack[len..].reverse();
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{PostId, Time, Vote};

    fn comment(id: u64, parent: Option<u64>) -> Comment {
        Comment {
            id: CommentId(id),
            post_id: PostId(1),
            parent_id: parent.map(CommentId),
            author: String::from("bob"),
            content: format!("comment {id}"),
            timestamp: Time::default(),
            score: 0,
            user_vote: Vote::None,
        }
    }

    fn ids<'a>(comments: impl IntoIterator<Item = &'a Comment>) -> Vec<u64> {
        comments.into_iter().map(|c| c.id.0).collect()
    }

    fn sample() -> Vec<Comment> {
        vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(1)),
            comment(4, Some(2)),
        ]
    }

    #[test]
    fn filtering() {
        let comments = sample();
        assert_eq!(ids(&children_of(&comments, Some(CommentId(1)))), vec![2, 3]);
        assert_eq!(ids(&children_of(&comments, Some(CommentId(2)))), vec![4]);
        assert_eq!(ids(&children_of(&comments, Some(CommentId(4)))), Vec::<u64>::new());
        assert_eq!(ids(&top_level(&comments)), vec![1]);
    }

    #[test]
    fn tree_matches_filtering() {
        let comments = sample();
        let tree = CommentTree::new(&comments);
        for parent in [None, Some(1), Some(2), Some(3), Some(4)] {
            let parent = parent.map(CommentId);
            assert_eq!(
                ids(tree.children(parent)),
                ids(&children_of(&comments, parent)),
            );
        }
    }

    #[test]
    fn descendants() {
        let comments = sample();
        let tree = CommentTree::new(&comments);
        let mut d = tree.descendants(CommentId(1));
        d.sort();
        assert_eq!(d, vec![CommentId(2), CommentId(3), CommentId(4)]);
        assert_eq!(tree.descendants(CommentId(3)), vec![]);
    }

    #[test]
    fn walk_is_pre_order() {
        let mut comments = sample();
        comments.push(comment(5, None));
        comments.push(comment(6, Some(3)));
        let tree = CommentTree::new(&comments);
        assert_eq!(
            tree.walk()
                .into_iter()
                .map(|(d, c)| (d, c.id.0))
                .collect::<Vec<_>>(),
            vec![(0, 1), (1, 2), (2, 4), (1, 3), (2, 6), (0, 5)],
        );
    }

    #[test]
    fn deep_threads() {
        let comments = (1..=100_000)
            .map(|i| comment(i, (i > 1).then(|| i - 1)))
            .collect::<Vec<_>>();
        let tree = CommentTree::new(&comments);
        assert_eq!(tree.descendants(CommentId(1)).len(), 99_999);
        let walk = tree.walk();
        assert_eq!(walk.last().map(|(d, _)| *d), Some(99_999));
    }
}
