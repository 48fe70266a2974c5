use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use threadspace_api::{
    Comment, CommentId, CommunityMatch, Error, Forum, NewComment, NewPost, PollOptionId,
    PollResults, PollVoteRequest, Post, PostId, PostMatch, SaveStatus, Scope, VoteRequest,
};

const NO_QUERY: &[(&str, &str)] = &[];

/// `Forum` backed by a running threadspace server
pub struct HttpForum {
    host: String,
    client: reqwest::Client,
}

fn transport(err: reqwest::Error) -> Error {
    Error::Unknown {
        details: format!("talking to server: {err}"),
    }
}

impl HttpForum {
    pub fn new(host: String) -> HttpForum {
        HttpForum {
            host: String::from(host.trim_end_matches('/')),
            client: reqwest::Client::new(),
        }
    }

    /// `{host}/api/{segments...}`, each segment percent-encoded
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, Error> {
        let mut url = reqwest::Url::parse(&format!("{}/api", self.host)).map_err(|e| {
            Error::Unknown {
                details: format!("invalid host {:?}: {e}", self.host),
            }
        })?;
        url.path_segments_mut()
            .map_err(|()| Error::Unknown {
                details: format!("host {:?} cannot take a path", self.host),
            })?
            .extend(segments);
        Ok(url)
    }

    async fn get<Q, T>(&self, segments: &[&str], query: &Q) -> Result<T, Error>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        tracing::debug!(%url, "GET");
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        Self::parse(resp).await
    }

    async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        tracing::debug!(%url, "POST");
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        Self::parse(resp).await
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        if resp.status().is_success() {
            return resp.json().await.map_err(transport);
        }
        let status = resp.status();
        let body = resp.bytes().await.map_err(transport)?;
        Err(Error::parse(&body).unwrap_or_else(|_| Error::Unknown {
            details: format!(
                "server answered {status}: {}",
                String::from_utf8_lossy(&body)
            ),
        }))
    }
}

#[async_trait]
impl Forum for HttpForum {
    async fn list_posts(&self, scope: Scope) -> Result<Vec<Post>, Error> {
        self.get(&["posts"], &[("scope", scope.to_string())]).await
    }

    async fn get_post(&self, post: PostId) -> Result<Post, Error> {
        self.get(&["posts", &post.to_string()], NO_QUERY).await
    }

    async fn create_post(&self, draft: NewPost) -> Result<Post, Error> {
        self.post(&["posts"], &draft).await
    }

    async fn vote(&self, post: PostId, vote: i64) -> Result<Post, Error> {
        self.post(&["posts", &post.to_string(), "vote"], &VoteRequest { vote })
            .await
    }

    async fn poll_vote(&self, post: PostId, option: PollOptionId) -> Result<Post, Error> {
        self.post(
            &["posts", &post.to_string(), "poll-vote"],
            &PollVoteRequest { option },
        )
        .await
    }

    async fn poll_results(&self, post: PostId) -> Result<PollResults, Error> {
        self.get(&["posts", &post.to_string(), "poll"], NO_QUERY)
            .await
    }

    async fn comments(&self, post: PostId) -> Result<Vec<Comment>, Error> {
        self.get(&["posts", &post.to_string(), "comments"], NO_QUERY)
            .await
    }

    async fn create_comment(&self, draft: NewComment) -> Result<Comment, Error> {
        self.post(&["posts", &draft.post_id.to_string(), "comments"], &draft)
            .await
    }

    async fn vote_comment(&self, comment: CommentId, vote: i64) -> Result<Comment, Error> {
        self.post(
            &["comments", &comment.to_string(), "vote"],
            &VoteRequest { vote },
        )
        .await
    }

    async fn toggle_save(&self, post: PostId) -> Result<SaveStatus, Error> {
        self.post(&["posts", &post.to_string(), "save"], &()).await
    }

    async fn saved(&self) -> Result<Vec<Post>, Error> {
        self.get(&["saved"], NO_QUERY).await
    }

    async fn search_posts(&self, query: &str) -> Result<Vec<PostMatch>, Error> {
        self.get(&["search", "posts"], &[("q", query)]).await
    }

    async fn search_communities(&self, query: &str) -> Result<Vec<CommunityMatch>, Error> {
        self.get(&["search", "communities"], &[("q", query)]).await
    }

    async fn user_karma(&self, username: &str) -> Result<i64, Error> {
        self.get(&["users", username, "karma"], NO_QUERY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_are_encoded() {
        let forum = HttpForum::new(String::from("http://127.0.0.1:3000/"));
        assert_eq!(
            forum.url(&["users", "élodie/x y", "karma"]).unwrap().as_str(),
            "http://127.0.0.1:3000/api/users/%C3%A9lodie%2Fx%20y/karma",
        );
        assert_eq!(
            forum.url(&["posts", "7", "poll-vote"]).unwrap().as_str(),
            "http://127.0.0.1:3000/api/posts/7/poll-vote",
        );
        assert!(matches!(
            HttpForum::new(String::from("not a host")).url(&["saved"]),
            Err(Error::Unknown { .. })
        ));
    }
}
