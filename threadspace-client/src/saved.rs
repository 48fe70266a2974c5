use std::collections::HashSet;

use crate::api::{PostId, SaveStatus};

/// The caller's bookmarked posts
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SavedSet(HashSet<PostId>);

impl SavedSet {
    pub fn toggle(&mut self, post: PostId) -> SaveStatus {
        let saved = if self.0.remove(&post) {
            false
        } else {
            self.0.insert(post);
            true
        };
        SaveStatus { saved }
    }

    pub fn contains(&self, post: PostId) -> bool {
        self.0.contains(&post)
    }

    pub fn remove(&mut self, post: PostId) {
        self.0.remove(&post);
    }
}
