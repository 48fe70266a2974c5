mod comment;
pub use comment::{children_of, top_level, CommentTree};

mod order;
pub use order::{hot_score, OrderExt};

mod saved;
pub use saved::SavedSet;

mod search;
pub use search::{search_communities, search_posts};

mod store;
pub use store::Store;

mod vote;
pub use vote::{apply_poll_vote, apply_vote, poll_results, Scored};

pub mod api {
    pub use threadspace_api::*;
}

pub mod prelude {
    pub use crate::{OrderExt, Scored};
}
