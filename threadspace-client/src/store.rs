use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use tracing::{debug, warn};

use crate::{
    api::{
        Comment, CommentEdit, CommentId, Community, CommunityEdit, CommunityId, CommunityMatch,
        Error, MembershipStatus, NewComment, NewCommunity, NewPost, NewUser, PollOptionId,
        PollResults, Post, PostEdit, PostId, PostMatch, SaveStatus, Scope, Seed, Time, User,
        UserActivity, UserId, UserProfile, Vote, POPULAR_MIN_SCORE,
    },
    CommentTree, SavedSet,
};

/// All the forum's collections, as seen by one caller
///
/// Cloning is cheap: collections are shared until one of the clones mutates
/// them. Every read returns owned copies, with `comment_count` recomputed from
/// the live comment list.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Store {
    users: Arc<Vec<User>>,
    communities: Arc<Vec<Community>>,
    /// Newest first
    posts: Arc<Vec<Post>>,
    /// Oldest first
    comments: Arc<Vec<Comment>>,
    saved: SavedSet,
    joined: HashSet<CommunityId>,
    last_user: u64,
    last_community: u64,
    last_post: u64,
    last_comment: u64,
}

impl Store {
    pub fn new() -> Store {
        Store::default()
    }

    /// Loads a dump, repairing comments that would break the thread structure
    ///
    /// Comments on unknown posts and entities with duplicate ids are dropped.
    /// Comments replying to something that is not an earlier comment of the
    /// same post are moved to the top level.
    pub fn from_seed(seed: Seed) -> Store {
        let mut seen_users = HashSet::new();
        let users = seed
            .users
            .into_iter()
            .filter(|u| {
                let fresh = seen_users.insert(u.id);
                if !fresh {
                    warn!(user = %u.id, "dropping user with duplicate id from seed");
                }
                fresh
            })
            .collect::<Vec<_>>();

        let mut seen_communities = HashSet::new();
        let communities = seed
            .communities
            .into_iter()
            .filter(|c| {
                let fresh = seen_communities.insert(c.id);
                if !fresh {
                    warn!(community = %c.id, "dropping community with duplicate id from seed");
                }
                fresh
            })
            .collect::<Vec<_>>();

        let mut seen_posts = HashSet::new();
        let posts = seed
            .posts
            .into_iter()
            .filter(|p| {
                let fresh = seen_posts.insert(p.id);
                if !fresh {
                    warn!(post = %p.id, "dropping post with duplicate id from seed");
                }
                fresh
            })
            .collect::<Vec<_>>();

        let mut comment_posts = HashMap::new();
        let mut comments = Vec::with_capacity(seed.comments.len());
        for mut c in seed.comments {
            if !seen_posts.contains(&c.post_id) {
                warn!(comment = %c.id, post = %c.post_id, "dropping comment on unknown post from seed");
                continue;
            }
            if comment_posts.contains_key(&c.id) {
                warn!(comment = %c.id, "dropping comment with duplicate id from seed");
                continue;
            }
            if let Some(parent) = c.parent_id {
                if comment_posts.get(&parent) != Some(&c.post_id) {
                    warn!(
                        comment = %c.id,
                        %parent,
                        "parent is not an earlier comment of the same post, moving comment to top level"
                    );
                    c.parent_id = None;
                }
            }
            comment_posts.insert(c.id, c.post_id);
            comments.push(c);
        }

        Store {
            last_user: users.iter().map(|u| u.id.0).max().unwrap_or(0),
            last_community: communities.iter().map(|c| c.id.0).max().unwrap_or(0),
            last_post: posts.iter().map(|p| p.id.0).max().unwrap_or(0),
            last_comment: comments.iter().map(|c| c.id.0).max().unwrap_or(0),
            users: Arc::new(users),
            communities: Arc::new(communities),
            posts: Arc::new(posts),
            comments: Arc::new(comments),
            saved: SavedSet::default(),
            joined: HashSet::new(),
        }
    }

    pub fn to_seed(&self) -> Seed {
        Seed {
            users: self.users.to_vec(),
            communities: self.communities.to_vec(),
            posts: self.with_live_counts(self.posts.iter()),
            comments: self.comments.to_vec(),
        }
    }
}

// Posts
impl Store {
    pub fn list_posts(&self, scope: &Scope) -> Vec<Post> {
        match scope {
            Scope::All => self.with_live_counts(self.posts.iter()),
            Scope::Community(name) => self.with_live_counts(
                self.posts
                    .iter()
                    .filter(|p| p.community.eq_ignore_ascii_case(name)),
            ),
            Scope::Popular => {
                let mut res = self.with_live_counts(
                    self.posts.iter().filter(|p| p.score >= POPULAR_MIN_SCORE),
                );
                res.sort_by_key(|p| std::cmp::Reverse(p.score));
                res
            }
        }
    }

    pub fn get_post(&self, id: PostId) -> Result<Post, Error> {
        let i = self.post_index(id)?;
        Ok(self.with_live_count(&self.posts[i]))
    }

    /// The new post goes to the front of the feed and is filed under the
    /// community's canonical name
    pub fn create_post(&mut self, draft: NewPost, now: Time) -> Result<Post, Error> {
        draft.validate()?;
        let community = self.community_index(&draft.community)?;
        let community = self.communities[community].name.clone();
        let id = PostId(self.last_post + 1);
        let mut post = draft.into_post(id, now);
        post.community = community;
        self.last_post = id.0;
        debug!(post = %id, community = %post.community, "created post");
        Arc::make_mut(&mut self.posts).insert(0, post.clone());
        Ok(post)
    }

    pub fn edit_post(&mut self, id: PostId, edit: PostEdit) -> Result<Post, Error> {
        edit.validate()?;
        let i = self.post_index(id)?;
        let post = &mut Arc::make_mut(&mut self.posts)[i];
        edit.apply_to(post);
        debug!(post = %id, "edited post");
        Ok(self.with_live_count(&self.posts[i]))
    }

    /// Also removes the post's comments and forgets it was saved
    pub fn delete_post(&mut self, id: PostId) -> Result<(), Error> {
        let i = self.post_index(id)?;
        Arc::make_mut(&mut self.posts).remove(i);
        let comments = Arc::make_mut(&mut self.comments);
        let before = comments.len();
        comments.retain(|c| c.post_id != id);
        self.saved.remove(id);
        debug!(post = %id, comments = before - comments.len(), "deleted post");
        Ok(())
    }

    /// `vote` must be -1, 0 or 1
    pub fn vote(&mut self, id: PostId, vote: i64) -> Result<Post, Error> {
        let vote = Vote::try_from(vote)?;
        let i = self.post_index(id)?;
        let post = &mut Arc::make_mut(&mut self.posts)[i];
        crate::apply_vote(post, vote);
        debug!(post = %id, score = post.score, user_vote = post.user_vote.value(), "voted on post");
        Ok(self.with_live_count(&self.posts[i]))
    }

    pub fn poll_vote(&mut self, id: PostId, option: PollOptionId) -> Result<Post, Error> {
        let i = self.post_index(id)?;
        // Check on the shared copy first so that failures never clone the collection
        crate::apply_poll_vote(&mut self.posts[i].clone(), option)?;
        crate::apply_poll_vote(&mut Arc::make_mut(&mut self.posts)[i], option)?;
        debug!(post = %id, %option, "voted on poll");
        Ok(self.with_live_count(&self.posts[i]))
    }

    pub fn poll_results(&self, id: PostId) -> Result<PollResults, Error> {
        crate::poll_results(&self.posts[self.post_index(id)?])
    }

    fn post_index(&self, id: PostId) -> Result<usize, Error> {
        self.posts
            .iter()
            .position(|p| p.id == id)
            .ok_or(Error::PostNotFound { post: id })
    }

    fn comment_counts(&self) -> HashMap<PostId, usize> {
        let mut res = HashMap::new();
        for c in self.comments.iter() {
            *res.entry(c.post_id).or_default() += 1;
        }
        res
    }

    fn with_live_count(&self, post: &Post) -> Post {
        Post {
            comment_count: self.comments.iter().filter(|c| c.post_id == post.id).count(),
            ..post.clone()
        }
    }

    fn with_live_counts<'a>(&self, posts: impl Iterator<Item = &'a Post>) -> Vec<Post> {
        let counts = self.comment_counts();
        posts
            .map(|p| Post {
                comment_count: counts.get(&p.id).copied().unwrap_or(0),
                ..p.clone()
            })
            .collect()
    }
}

// Comments
impl Store {
    /// Flat list in creation order
    pub fn comments_for(&self, post: PostId) -> Result<Vec<Comment>, Error> {
        self.post_index(post)?;
        Ok(self
            .comments
            .iter()
            .filter(|c| c.post_id == post)
            .cloned()
            .collect())
    }

    pub fn get_comment(&self, id: CommentId) -> Result<Comment, Error> {
        Ok(self.comments[self.comment_index(id)?].clone())
    }

    pub fn create_comment(&mut self, draft: NewComment, now: Time) -> Result<Comment, Error> {
        draft.validate()?;
        self.post_index(draft.post_id)?;
        if let Some(parent) = draft.parent_id {
            let parent = &self.comments[self.comment_index(parent)?];
            if parent.post_id != draft.post_id {
                return Err(Error::ParentOnOtherPost {
                    parent: parent.id,
                    post: draft.post_id,
                });
            }
        }
        let id = CommentId(self.last_comment + 1);
        let comment = draft.into_comment(id, now);
        self.last_comment = id.0;
        debug!(comment = %id, post = %comment.post_id, "created comment");
        Arc::make_mut(&mut self.comments).push(comment.clone());
        Ok(comment)
    }

    pub fn edit_comment(&mut self, id: CommentId, edit: CommentEdit) -> Result<Comment, Error> {
        edit.validate()?;
        let i = self.comment_index(id)?;
        let comment = &mut Arc::make_mut(&mut self.comments)[i];
        comment.content = String::from(edit.content.trim());
        debug!(comment = %id, "edited comment");
        Ok(comment.clone())
    }

    /// Same toggling rules as post votes
    pub fn vote_comment(&mut self, id: CommentId, vote: i64) -> Result<Comment, Error> {
        let vote = Vote::try_from(vote)?;
        let i = self.comment_index(id)?;
        let comment = &mut Arc::make_mut(&mut self.comments)[i];
        crate::apply_vote(comment, vote);
        debug!(comment = %id, score = comment.score, "voted on comment");
        Ok(comment.clone())
    }

    /// Removes the comment along with every reply below it, returning how
    /// many comments were removed
    pub fn delete_comment(&mut self, id: CommentId) -> Result<usize, Error> {
        let i = self.comment_index(id)?;
        let post = self.comments[i].post_id;
        let thread = self
            .comments
            .iter()
            .filter(|c| c.post_id == post)
            .cloned()
            .collect::<Vec<_>>();
        let mut doomed = CommentTree::new(&thread)
            .descendants(id)
            .into_iter()
            .collect::<HashSet<_>>();
        doomed.insert(id);
        Arc::make_mut(&mut self.comments).retain(|c| !doomed.contains(&c.id));
        debug!(comment = %id, removed = doomed.len(), "deleted comment");
        Ok(doomed.len())
    }

    fn comment_index(&self, id: CommentId) -> Result<usize, Error> {
        self.comments
            .iter()
            .position(|c| c.id == id)
            .ok_or(Error::CommentNotFound { comment: id })
    }
}

// Saved posts
impl Store {
    pub fn toggle_save(&mut self, post: PostId) -> Result<SaveStatus, Error> {
        self.post_index(post)?;
        let status = self.saved.toggle(post);
        debug!(%post, saved = status.saved, "toggled saved post");
        Ok(status)
    }

    pub fn is_saved(&self, post: PostId) -> bool {
        self.saved.contains(post)
    }

    /// Saved posts in feed order
    pub fn saved(&self) -> Vec<Post> {
        self.with_live_counts(self.posts.iter().filter(|p| self.saved.contains(p.id)))
    }
}

// Search
impl Store {
    pub fn search_posts(&self, query: &str) -> Vec<PostMatch> {
        let counts = self.comment_counts();
        let mut res = crate::search_posts(self.posts.iter(), query);
        for m in res.iter_mut() {
            m.post.comment_count = counts.get(&m.post.id).copied().unwrap_or(0);
        }
        res
    }

    pub fn search_communities(&self, query: &str) -> Vec<CommunityMatch> {
        crate::search_communities(self.communities.iter(), query)
    }
}

// Communities
impl Store {
    pub fn communities(&self) -> Vec<Community> {
        self.communities.to_vec()
    }

    /// Looked up case-insensitively
    pub fn community(&self, name: &str) -> Result<Community, Error> {
        Ok(self.communities[self.community_index(name)?].clone())
    }

    pub fn create_community(&mut self, draft: NewCommunity) -> Result<Community, Error> {
        draft.validate()?;
        if self.communities.iter().any(|c| c.is_named(&draft.name)) {
            return Err(Error::NameAlreadyUsed { name: draft.name });
        }
        let id = CommunityId(self.last_community + 1);
        let community = draft.into_community(id);
        self.last_community = id.0;
        debug!(community = %id, name = %community.name, "created community");
        Arc::make_mut(&mut self.communities).push(community.clone());
        Ok(community)
    }

    pub fn edit_community(&mut self, name: &str, edit: CommunityEdit) -> Result<Community, Error> {
        edit.validate()?;
        let i = self.community_index(name)?;
        let community = &mut Arc::make_mut(&mut self.communities)[i];
        edit.apply_to(community);
        debug!(community = %community.id, "edited community");
        Ok(community.clone())
    }

    /// Posts filed under the community are left as they are
    pub fn delete_community(&mut self, name: &str) -> Result<(), Error> {
        let i = self.community_index(name)?;
        let community = Arc::make_mut(&mut self.communities).remove(i);
        self.joined.remove(&community.id);
        debug!(community = %community.id, name = %community.name, "deleted community");
        Ok(())
    }

    /// Joining counts the caller as a member, leaving uncounts them
    pub fn toggle_membership(&mut self, name: &str) -> Result<MembershipStatus, Error> {
        let i = self.community_index(name)?;
        let community = &mut Arc::make_mut(&mut self.communities)[i];
        let joined = if self.joined.remove(&community.id) {
            community.member_count = community.member_count.saturating_sub(1);
            false
        } else {
            self.joined.insert(community.id);
            community.member_count += 1;
            true
        };
        debug!(community = %community.id, joined, members = community.member_count, "toggled membership");
        Ok(MembershipStatus { joined })
    }

    pub fn is_joined(&self, name: &str) -> bool {
        self.communities
            .iter()
            .any(|c| c.is_named(name) && self.joined.contains(&c.id))
    }

    pub fn joined_communities(&self) -> Vec<Community> {
        self.communities
            .iter()
            .filter(|c| self.joined.contains(&c.id))
            .cloned()
            .collect()
    }

    fn community_index(&self, name: &str) -> Result<usize, Error> {
        self.communities
            .iter()
            .position(|c| c.is_named(name))
            .ok_or_else(|| Error::CommunityNotFound {
                name: String::from(name),
            })
    }
}

// Users
impl Store {
    pub fn create_user(&mut self, draft: NewUser, now: Time) -> Result<User, Error> {
        draft.validate()?;
        if self.users.iter().any(|u| u.username == draft.username) {
            return Err(Error::NameAlreadyUsed {
                name: draft.username,
            });
        }
        let id = UserId(self.last_user + 1);
        let user = draft.into_user(id, now);
        self.last_user = id.0;
        debug!(user = %id, username = %user.username, "created user");
        Arc::make_mut(&mut self.users).push(user.clone());
        Ok(user)
    }

    pub fn user(&self, username: &str) -> Result<User, Error> {
        self.users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| Error::UserNotFound {
                username: String::from(username),
            })
    }

    /// Sum of the scores of everything `username` authored, registered or not
    pub fn karma_of(&self, username: &str) -> i64 {
        let posts = self
            .posts
            .iter()
            .filter(|p| p.author == username)
            .map(|p| p.score);
        let comments = self
            .comments
            .iter()
            .filter(|c| c.author == username)
            .map(|c| c.score);
        posts.chain(comments).fold(0, i64::saturating_add)
    }

    pub fn user_karma(&self, username: &str) -> Result<i64, Error> {
        self.user(username)?;
        Ok(self.karma_of(username))
    }

    pub fn user_profile(&self, username: &str) -> Result<UserProfile, Error> {
        let user = self.user(username)?;
        Ok(UserProfile {
            karma: self.karma_of(username),
            user,
        })
    }

    pub fn user_activity(&self, username: &str) -> Result<UserActivity, Error> {
        self.user(username)?;
        let posts =
            self.with_live_counts(self.posts.iter().filter(|p| p.author == username));
        let comments = self
            .comments
            .iter()
            .filter(|c| c.author == username)
            .cloned()
            .collect::<Vec<_>>();
        Ok(UserActivity {
            total_activity: posts.len() + comments.len(),
            posts,
            comments,
        })
    }
}
