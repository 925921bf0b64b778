use std::collections::{BTreeMap, HashMap};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use hanashi_client::{
    api::{
        CaptchaChallenge, Comment, CommentId, Error as ApiError, NewComment, SortField, SortOrder,
        SortState, Time, Upload,
    },
    CommentApi, Error, Forest,
};
use rand::Rng;
use tokio::sync::Mutex;
use uuid::Uuid;

const CAPTCHA_TTL_MINUTES: i64 = 5;
const CAPTCHA_LEN: usize = 4;

/// In-memory stand-in for the comment API and its CAPTCHA service
pub struct MockServer(Mutex<State>);

#[derive(Debug, Default)]
struct State {
    offline: bool,
    next_id: i64,
    last_created: Option<Time>,

    /// Every comment, with empty replies; the tree is rebuilt on each fetch
    comments: BTreeMap<CommentId, Comment>,
    captchas: HashMap<String, Captcha>,
}

#[derive(Debug)]
struct Captcha {
    answer: String,
    expires: Time,
}

impl State {
    fn check_online(&self) -> Result<(), Error> {
        match self.offline {
            true => Err(Error::Transport(anyhow!("mock server is offline"))),
            false => Ok(()),
        }
    }

    fn now(&mut self) -> Time {
        // keep creation dates strictly increasing so sorting by date is deterministic
        let mut now = Utc::now();
        if let Some(last) = self.last_created {
            if now <= last {
                now = last + Duration::milliseconds(1);
            }
        }
        self.last_created = Some(now);
        now
    }

    fn tree(&self, c: &Comment) -> Comment {
        let mut replies = self
            .comments
            .values()
            .filter(|r| r.parent == Some(c.id))
            .collect::<Vec<_>>();
        replies.sort_by_key(|r| (r.created_at, r.id));
        c.with_replies(replies.into_iter().map(|r| self.tree(r)).collect())
    }

    fn fetch_comments(&self, sort: SortState) -> Forest {
        let mut roots = self
            .comments
            .values()
            .filter(|c| c.parent.is_none())
            .collect::<Vec<_>>();
        roots.sort_by(|a, b| {
            let ord = match sort.field {
                SortField::Username => a.username.cmp(&b.username),
                SortField::Email => a.email.cmp(&b.email),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            let ord = match sort.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            ord.then(a.id.cmp(&b.id))
        });
        roots.into_iter().map(|c| self.tree(c)).collect()
    }

    fn fetch_captcha(&mut self) -> CaptchaChallenge {
        let now = Utc::now();
        self.captchas.retain(|_, c| c.expires >= now);

        let key = Uuid::new_v4().to_string();
        let mut rng = rand::thread_rng();
        let answer = (0..CAPTCHA_LEN)
            .map(|_| rng.gen_range(b'a'..=b'z') as char)
            .collect::<String>();
        self.captchas.insert(
            key.clone(),
            Captcha {
                answer,
                expires: now + Duration::minutes(CAPTCHA_TTL_MINUTES),
            },
        );
        CaptchaChallenge {
            image: format!("/captcha/image/{key}/"),
            key,
        }
    }

    fn check_captcha(&self, key: &str, response: &str) -> Result<(), ApiError> {
        if key.is_empty() || response.is_empty() {
            return Err(ApiError::Remote(String::from("CAPTCHA is required")));
        }
        let captcha = self
            .captchas
            .get(key)
            .ok_or_else(|| ApiError::Remote(String::from("Invalid CAPTCHA key")))?;
        if captcha.expires < Utc::now() {
            return Err(ApiError::Remote(String::from("CAPTCHA expired")));
        }
        if captcha.answer != response.to_lowercase() {
            return Err(ApiError::Remote(String::from("Invalid CAPTCHA")));
        }
        Ok(())
    }

    fn submit_comment(&mut self, c: NewComment) -> Result<Comment, ApiError> {
        self.check_captcha(&c.captcha_key, &c.captcha)?;
        c.validate()?;
        if let Some(parent) = c.parent {
            if !self.comments.contains_key(&parent) {
                return Err(ApiError::Remote(format!(
                    "parent: Invalid pk \"{}\" - object does not exist.",
                    parent.0
                )));
            }
        }

        self.next_id += 1;
        let comment = Comment {
            id: CommentId(self.next_id),
            username: c.username,
            email: c.email,
            home_page: c.home_page,
            text: c.text,
            parent: c.parent,
            created_at: self.now(),
            avatar_url: c.avatar.map(|a| format!("/uploads/avatars/{}", a.file_name)),
            attachment_url: c.attachment.map(|f| upload_path(&f)),
            replies: im::Vector::new(),
        };
        self.comments.insert(comment.id, comment.clone());
        // the challenge stays valid until a comment is actually stored with it
        self.captchas.remove(&c.captcha_key);
        tracing::debug!(id = ?comment.id, parent = ?comment.parent, "mock server stored comment");
        Ok(comment)
    }
}

fn upload_path(f: &Upload) -> String {
    match f.media_type.is_image() {
        true => format!("/uploads/images/{}", f.file_name),
        false => format!("/uploads/files/{}", f.file_name),
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer(Mutex::new(State::default()))
    }

    /// While offline, every call fails like a network error would
    pub async fn set_offline(&self, offline: bool) {
        self.0.lock().await.offline = offline;
    }

    /// Answer to the challenge `key`, if it is still pending
    pub async fn test_captcha_answer(&self, key: &str) -> Option<String> {
        self.0.lock().await.captchas.get(key).map(|c| c.answer.clone())
    }

    pub async fn test_expire_captcha(&self, key: &str) {
        if let Some(c) = self.0.lock().await.captchas.get_mut(key) {
            c.expires = Utc::now() - Duration::seconds(1);
        }
    }

    pub async fn test_num_comments(&self) -> usize {
        self.0.lock().await.comments.len()
    }

    pub async fn test_num_captchas(&self) -> usize {
        self.0.lock().await.captchas.len()
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[async_trait]
impl CommentApi for MockServer {
    async fn fetch_comments(&self, sort: SortState) -> Result<Forest, Error> {
        let state = self.0.lock().await;
        state.check_online()?;
        Ok(state.fetch_comments(sort))
    }

    async fn submit_comment(&self, comment: NewComment) -> Result<Comment, Error> {
        let mut state = self.0.lock().await;
        state.check_online()?;
        Ok(state.submit_comment(comment)?)
    }

    async fn fetch_captcha(&self) -> Result<CaptchaChallenge, Error> {
        let mut state = self.0.lock().await;
        state.check_online()?;
        Ok(state.fetch_captcha())
    }
}
