use serde::de::DeserializeOwned;
use serde::Deserialize;
use threadgate_core::{Comment, GitHubConfig, Thread, ThreadgateError};

use crate::analyzer::ThreadSource;

const USER_AGENT: &str = "threadgate";

/// Login GitHub shows for comments whose author account was deleted.
const GHOST_LOGIN: &str = "ghost";

const REVIEW_THREADS_QUERY: &str = r#"
query($owner: String!, $repo: String!, $number: Int!, $pageSize: Int!, $cursor: String) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $number) {
      reviewThreads(first: $pageSize, after: $cursor) {
        pageInfo {
          hasNextPage
          endCursor
        }
        nodes {
          id
          isResolved
          isOutdated
          resolvedBy {
            login
          }
          comments(first: 100) {
            pageInfo {
              hasNextPage
              endCursor
            }
            nodes {
              id
              body
              author {
                login
              }
              createdAt
              path
              line
              outdated
              position
              url
            }
          }
        }
      }
    }
  }
}"#;

const THREAD_COMMENTS_QUERY: &str = r#"
query($id: ID!, $cursor: String) {
  node(id: $id) {
    ... on PullRequestReviewThread {
      comments(first: 100, after: $cursor) {
        pageInfo {
          hasNextPage
          endCursor
        }
        nodes {
          id
          body
          author {
            login
          }
          createdAt
          path
          line
          outdated
          position
          url
        }
      }
    }
  }
}"#;

/// GitHub GraphQL client for fetching pull request review threads.
///
/// # Examples
///
/// ```no_run
/// use threadgate_core::GitHubConfig;
/// use threadgate_review::github::GitHubClient;
///
/// let client = GitHubClient::new(Some("ghp_xxxx"), &GitHubConfig::default()).unwrap();
/// ```
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    graphql_url: String,
    page_size: u32,
}

fn non_blank(token: String) -> Option<String> {
    if token.trim().is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Token from an explicit value, `GITHUB_TOKEN`, or `GH_TOKEN`, in that order.
///
/// Blank values are skipped, so `--github-token ""` falls through to the
/// environment.
pub fn resolve_token(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::to_string)
        .and_then(non_blank)
        .or_else(|| std::env::var("GITHUB_TOKEN").ok().and_then(non_blank))
        .or_else(|| std::env::var("GH_TOKEN").ok().and_then(non_blank))
}

impl GitHubClient {
    /// Create a client from an explicit token or the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadgateError::Config`] if no token is available, or
    /// [`ThreadgateError::Transport`] if the HTTP client cannot be built.
    pub fn new(token: Option<&str>, config: &GitHubConfig) -> Result<Self, ThreadgateError> {
        let token = resolve_token(token).ok_or_else(|| {
            ThreadgateError::Config(
                "GITHUB_TOKEN not set. Pass --github-token or set GITHUB_TOKEN env var".into(),
            )
        })?;

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ThreadgateError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            token,
            graphql_url: config.graphql_url(),
            page_size: config.effective_page_size(),
        })
    }

    /// Fetch every review thread of a pull request with all of its comments,
    /// following pagination of both threads and comments.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadgateError::Transport`] on network errors, non-success
    /// statuses or undecodable bodies, [`ThreadgateError::GraphQl`] when the
    /// response carries errors, and [`ThreadgateError::NotFound`] when the
    /// repository or pull request is missing.
    pub async fn fetch_review_threads(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<Thread>, ThreadgateError> {
        let number = i32::try_from(pr_number).map_err(|_| {
            ThreadgateError::Config(format!("pull request number out of range: {pr_number}"))
        })?;

        let mut threads = Vec::new();
        let mut comment_cursors = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.fetch_page(owner, repo, number, cursor.as_deref()).await?;
            tracing::debug!(
                count = page.threads.len(),
                has_next = page.next_cursor.is_some(),
                "fetched review thread page"
            );
            threads.extend(page.threads);
            comment_cursors.extend(page.comment_cursors);
            match page.next_cursor {
                Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                Some(_) => {
                    tracing::warn!("GitHub returned the same cursor twice; stopping pagination");
                    break;
                }
                None => break,
            }
        }

        for pending in comment_cursors {
            let remaining = self
                .fetch_remaining_comments(&pending.thread_id, pending.cursor)
                .await?;
            if let Some(thread) = threads.iter_mut().find(|t| t.id == pending.thread_id) {
                thread.comments.extend(remaining);
            }
        }

        tracing::info!(
            "Fetched {} review threads for {owner}/{repo}#{pr_number}",
            threads.len()
        );
        Ok(threads)
    }

    async fn fetch_page(
        &self,
        owner: &str,
        repo: &str,
        number: i32,
        cursor: Option<&str>,
    ) -> Result<ThreadsPage, ThreadgateError> {
        let body = serde_json::json!({
            "query": REVIEW_THREADS_QUERY,
            "variables": {
                "owner": owner,
                "repo": repo,
                "number": number,
                "pageSize": self.page_size,
                "cursor": cursor,
            },
        });
        let text = self.post_graphql(&body).await?;
        parse_threads_page(&text)
    }

    async fn fetch_remaining_comments(
        &self,
        thread_id: &str,
        mut cursor: String,
    ) -> Result<Vec<Comment>, ThreadgateError> {
        let mut comments = Vec::new();
        loop {
            let body = serde_json::json!({
                "query": THREAD_COMMENTS_QUERY,
                "variables": { "id": thread_id, "cursor": cursor },
            });
            let page = parse_comments_page(&self.post_graphql(&body).await?)?;
            tracing::debug!(thread = %thread_id, count = page.comments.len(), "fetched comment page");
            comments.extend(page.comments);
            match page.next_cursor {
                Some(next) if next != cursor => cursor = next,
                Some(_) => {
                    tracing::warn!(thread = %thread_id, "GitHub returned the same comment cursor twice");
                    break;
                }
                None => break,
            }
        }
        Ok(comments)
    }

    async fn post_graphql(&self, body: &serde_json::Value) -> Result<String, ThreadgateError> {
        let response = self
            .http
            .post(&self.graphql_url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| ThreadgateError::Transport(format!("failed to query GitHub GraphQL API: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("GitHub GraphQL API error {status}: {body}");
            return Err(ThreadgateError::Transport(format!(
                "GitHub GraphQL API error {status}: {body}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ThreadgateError::Transport(format!("failed to read GraphQL response: {e}")))
    }
}

impl ThreadSource for GitHubClient {
    async fn fetch_threads(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<Thread>, ThreadgateError> {
        self.fetch_review_threads(owner, repo, pr_number).await
    }
}

/// One page of normalized review threads.
#[derive(Debug)]
pub struct ThreadsPage {
    pub threads: Vec<Thread>,
    /// Cursor for the next page, if there is one.
    pub next_cursor: Option<String>,
    /// Threads whose comments did not fit in the first comment page.
    pub comment_cursors: Vec<CommentCursor>,
}

/// Where to resume fetching a thread's comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentCursor {
    pub thread_id: String,
    pub cursor: String,
}

/// A follow-up page of one thread's comments.
#[derive(Debug)]
pub struct CommentsPage {
    pub comments: Vec<Comment>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ThreadsData {
    repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    pull_request: Option<PullRequestNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    review_threads: Connection<ThreadNode>,
}

#[derive(Debug, Deserialize)]
struct CommentsData {
    node: Option<ThreadCommentsNode>,
}

#[derive(Debug, Deserialize)]
struct ThreadCommentsNode {
    comments: Connection<CommentNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection<T> {
    page_info: PageInfo,
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<T>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

impl PageInfo {
    fn next_cursor(self) -> Option<String> {
        if self.has_next_page {
            self.end_cursor
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadNode {
    id: String,
    is_resolved: bool,
    is_outdated: bool,
    resolved_by: Option<Actor>,
    comments: Connection<CommentNode>,
}

#[derive(Debug, Deserialize)]
struct Actor {
    login: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    id: String,
    body: String,
    author: Option<Actor>,
    created_at: chrono::DateTime<chrono::Utc>,
    path: String,
    line: Option<u32>,
    outdated: bool,
    position: Option<u32>,
    url: String,
}

impl From<CommentNode> for Comment {
    fn from(node: CommentNode) -> Self {
        Comment {
            id: node.id,
            body: node.body,
            author: node
                .author
                .map_or_else(|| GHOST_LOGIN.to_string(), |a| a.login),
            created_at: node.created_at,
            path: node.path,
            line: node.line,
            position: node.position,
            outdated: node.outdated,
            url: node.url,
        }
    }
}

fn normalize_comments(thread_id: &str, nodes: Vec<Option<CommentNode>>) -> Vec<Comment> {
    let total = nodes.len();
    let comments: Vec<Comment> = nodes.into_iter().flatten().map(Comment::from).collect();
    if comments.len() < total {
        tracing::warn!(
            thread = %thread_id,
            "skipped {} null comment entries",
            total - comments.len()
        );
    }
    comments
}

impl ThreadNode {
    /// Normalize into a [`Thread`], plus a cursor when more comments remain.
    ///
    /// A `null` first comment is rejected: the originating comment decides
    /// scope and no reply may take its place.
    fn into_thread(self) -> Result<(Thread, Option<CommentCursor>), ThreadgateError> {
        if matches!(self.comments.nodes.first(), Some(None)) {
            return Err(ThreadgateError::Transport(format!(
                "review thread {} has a null originating comment",
                self.id
            )));
        }

        let comments = normalize_comments(&self.id, self.comments.nodes);
        let comment_cursor = self
            .comments
            .page_info
            .next_cursor()
            .map(|cursor| CommentCursor {
                thread_id: self.id.clone(),
                cursor,
            });

        let thread = Thread {
            id: self.id,
            is_resolved: self.is_resolved,
            is_outdated: self.is_outdated,
            resolved_by: self.resolved_by.map(|a| a.login),
            comments,
        };
        Ok((thread, comment_cursor))
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ThreadgateError> {
    let response: GraphQlResponse<T> = serde_json::from_str(body).map_err(|e| {
        ThreadgateError::Transport(format!("malformed GraphQL response: {e}"))
    })?;

    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(ThreadgateError::GraphQl(messages.join("; ")));
    }

    response
        .data
        .ok_or_else(|| ThreadgateError::Transport("GraphQL response has no data".into()))
}

/// Decode one review-thread response body into normalized threads.
///
/// Null thread entries and null follow-up comments are skipped; a comment
/// without an author is attributed to `ghost`. A null originating comment,
/// or anything else that does not match the expected shape, is an error.
///
/// # Errors
///
/// Returns [`ThreadgateError::Transport`] if the body is not the expected
/// JSON, [`ThreadgateError::GraphQl`] if it reports errors, or
/// [`ThreadgateError::NotFound`] if the repository or pull request is absent.
pub fn parse_threads_page(body: &str) -> Result<ThreadsPage, ThreadgateError> {
    let repository = decode::<ThreadsData>(body)?
        .repository
        .ok_or_else(|| ThreadgateError::NotFound("repository".into()))?;
    let pull_request = repository
        .pull_request
        .ok_or_else(|| ThreadgateError::NotFound("pull request".into()))?;

    let connection = pull_request.review_threads;
    let total = connection.nodes.len();
    let mut threads = Vec::with_capacity(total);
    let mut comment_cursors = Vec::new();
    for node in connection.nodes.into_iter().flatten() {
        let (thread, comment_cursor) = node.into_thread()?;
        threads.push(thread);
        comment_cursors.extend(comment_cursor);
    }
    if threads.len() < total {
        tracing::warn!("skipped {} null review thread entries", total - threads.len());
    }

    Ok(ThreadsPage {
        threads,
        next_cursor: connection.page_info.next_cursor(),
        comment_cursors,
    })
}

/// Decode a follow-up page of one thread's comments.
///
/// # Errors
///
/// Same as [`parse_threads_page`]; a missing thread node is
/// [`ThreadgateError::NotFound`].
pub fn parse_comments_page(body: &str) -> Result<CommentsPage, ThreadgateError> {
    let node = decode::<CommentsData>(body)?
        .node
        .ok_or_else(|| ThreadgateError::NotFound("review thread".into()))?;
    let connection = node.comments;
    Ok(CommentsPage {
        comments: normalize_comments("follow-up page", connection.nodes),
        next_cursor: connection.page_info.next_cursor(),
    })
}
