use crate::api::{Community, CommunityMatch, Post, PostMatch};

const TITLE_CONTEXT: usize = 30;
const CONTENT_CONTEXT: usize = 40;

/// A lowercased query, ready to be matched against many haystacks
struct Needle(Vec<char>);

impl Needle {
    /// None for blank queries, which match nothing
    fn new(query: &str) -> Option<Needle> {
        let q = query.trim();
        if q.is_empty() {
            return None;
        }
        Some(Needle(q.chars().flat_map(char::to_lowercase).collect()))
    }

    /// Character range of the first case-insensitive occurrence in `haystack`
    fn find(&self, haystack: &str) -> Option<(usize, usize)> {
        // Lowering can expand a char; remember where each lowered char came from
        let mut lowered = Vec::with_capacity(haystack.len());
        let mut origin = Vec::with_capacity(haystack.len());
        for (i, c) in haystack.chars().enumerate() {
            for l in c.to_lowercase() {
                lowered.push(l);
                origin.push(i);
            }
        }
        let n = self.0.len();
        let start = lowered.windows(n).position(|w| w == &self.0[..])?;
        Some((origin[start], origin[start + n - 1] + 1))
    }

    fn matches(&self, haystack: &str) -> bool {
        self.find(haystack).is_some()
    }

    /// The match with up to `context` characters on each side, trimmed
    fn snippet(&self, haystack: &str, context: usize) -> Option<String> {
        let (start, end) = self.find(haystack)?;
        let snippet = haystack
            .chars()
            .skip(start.saturating_sub(context))
            .take(end + context - start.saturating_sub(context))
            .collect::<String>();
        Some(String::from(snippet.trim()))
    }
}

/// Posts matching `query` in title, text content, tags or author, in the
/// order given
pub fn search_posts<'a>(posts: impl IntoIterator<Item = &'a Post>, query: &str) -> Vec<PostMatch> {
    let needle = match Needle::new(query) {
        Some(n) => n,
        None => return Vec::new(),
    };
    posts
        .into_iter()
        .filter_map(|post| {
            let snippet = needle
                .snippet(&post.title, TITLE_CONTEXT)
                .or_else(|| {
                    post.body
                        .content()
                        .and_then(|c| needle.snippet(c, CONTENT_CONTEXT))
                })
                .or_else(|| {
                    post.tags
                        .iter()
                        .find(|t| needle.matches(t))
                        .map(|t| format!("Tagged with: {t}"))
                })
                .or_else(|| {
                    needle
                        .matches(&post.author)
                        .then(|| format!("Posted by u/{}", post.author))
                })?;
            Some(PostMatch {
                post: post.clone(),
                snippet,
            })
        })
        .collect()
}

/// Communities matching `query` in name, description or category
pub fn search_communities<'a>(
    communities: impl IntoIterator<Item = &'a Community>,
    query: &str,
) -> Vec<CommunityMatch> {
    let needle = match Needle::new(query) {
        Some(n) => n,
        None => return Vec::new(),
    };
    communities
        .into_iter()
        .filter_map(|community| {
            let snippet = needle
                .snippet(&community.name, TITLE_CONTEXT)
                .or_else(|| needle.snippet(&community.description, CONTENT_CONTEXT))
                .or_else(|| {
                    needle
                        .matches(&community.category)
                        .then(|| format!("Category: {}", community.category))
                })?;
            Some(CommunityMatch {
                community: community.clone(),
                snippet,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CommunityId, PostBody, PostId, Time, Vote};

    fn post(id: u64, title: &str, body: PostBody, tags: &[&str], author: &str) -> Post {
        Post {
            id: PostId(id),
            title: String::from(title),
            author: String::from(author),
            community: String::from("webdev"),
            score: 1,
            user_vote: Vote::Up,
            timestamp: Time::default(),
            comment_count: 0,
            tags: tags.iter().map(|t| String::from(*t)).collect(),
            body,
        }
    }

    fn text(content: &str) -> PostBody {
        PostBody::Text {
            content: String::from(content),
        }
    }

    fn snippets(matches: &[PostMatch]) -> Vec<(u64, &str)> {
        matches
            .iter()
            .map(|m| (m.post.id.0, m.snippet.as_str()))
            .collect()
    }

    #[test]
    fn title_match_keeps_original_case() {
        let posts = [post(1, "Learning React Hooks", text("useState"), &[], "alice")];
        let res = search_posts(&posts, "react");
        assert_eq!(snippets(&res), vec![(1, "Learning React Hooks")]);
    }

    #[test]
    fn windows_are_clamped() {
        let title = format!("{}needle{}", "a".repeat(50), "b".repeat(50));
        let posts = [post(1, &title, text("x"), &[], "alice")];
        let res = search_posts(&posts, "NEEDLE");
        assert_eq!(
            res[0].snippet,
            format!("{}needle{}", "a".repeat(30), "b".repeat(30)),
        );

        let content = format!("{} needle {}", "c".repeat(60), "d".repeat(60));
        let posts = [post(2, "unrelated", text(&content), &[], "alice")];
        let res = search_posts(&posts, "needle");
        assert_eq!(
            res[0].snippet,
            format!("{} needle {}", "c".repeat(39), "d".repeat(39)),
        );
    }

    #[test]
    fn snippet_priority() {
        let posts = [
            post(1, "Rust tips", text("Also about rust"), &["rust"], "rustacean"),
            post(2, "Tips", text("Borrowing in Rust"), &["rust"], "bob"),
            post(3, "Tips", text("nothing"), &["systems", "Rust"], "carol"),
            post(4, "Tips", text("nothing"), &[], "rustfan"),
            post(5, "Tips", text("nothing"), &[], "dave"),
        ];
        let res = search_posts(&posts, " rust ");
        assert_eq!(
            snippets(&res),
            vec![
                (1, "Rust tips"),
                (2, "Borrowing in Rust"),
                (3, "Tagged with: Rust"),
                (4, "Posted by u/rustfan"),
            ],
        );
    }

    #[test]
    fn non_text_posts_match_on_title_only() {
        let posts = [post(
            1,
            "A picture",
            PostBody::Image {
                image_url: String::from("https://img.example.com/rust.png"),
            },
            &[],
            "alice",
        )];
        assert!(search_posts(&posts, "rust").is_empty());
    }

    #[test]
    fn blank_queries_match_nothing() {
        let posts = [post(1, "Anything", text("at all"), &[], "alice")];
        assert!(search_posts(&posts, "").is_empty());
        assert!(search_posts(&posts, "   ").is_empty());
    }

    #[test]
    fn multibyte_text() {
        let posts = [post(1, "Ünïcödé ÇAFÉ menu", text("x"), &[], "alice")];
        let res = search_posts(&posts, "çaFé");
        assert_eq!(res[0].snippet, "Ünïcödé ÇAFÉ menu");
    }

    #[test]
    fn communities() {
        let community = |id, name: &str, description: &str, category: &str| Community {
            id: CommunityId(id),
            name: String::from(name),
            description: String::from(description),
            member_count: 1,
            color: String::from("#FF4500"),
            icon: String::from("Users"),
            category: String::from(category),
        };
        let communities = [
            community(1, "webdev", "Building for the web", "Technology"),
            community(2, "cooking", "Recipes and web of flavors", "Food"),
            community(3, "gardening", "Plants and soil", "Web culture"),
            community(4, "music", "Songs", "Arts"),
        ];
        let res = search_communities(&communities, "WEB");
        assert_eq!(
            res.iter()
                .map(|m| (m.community.id.0, m.snippet.as_str()))
                .collect::<Vec<_>>(),
            vec![
                (1, "webdev"),
                (2, "Recipes and web of flavors"),
                (3, "Category: Web culture"),
            ],
        );
        assert!(search_communities(&communities, "\t").is_empty());
    }
}
