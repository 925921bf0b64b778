use crate::{Error, Time, Upload};

/// Limit of the backing storage for user names
pub const MAX_USERNAME_LEN: usize = 50;

/// Avatar shown for comments posted without one, relative to the API base URL
pub const DEFAULT_AVATAR_PATH: &str = "/uploads/avatars/default_avatar.jpeg";

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub i64);

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub home_page: Option<String>,

    /// Raw markup, as validated by `validate_markup` before submission
    pub text: String,

    #[serde(default)]
    pub parent: Option<CommentId>,
    pub created_at: Time,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, alias = "file")]
    pub attachment_url: Option<String>,

    /// Child comments in submission order
    #[serde(default)]
    pub replies: im::Vector<Comment>,
}

impl Comment {
    pub fn display_name(&self) -> &str {
        match self.username.is_empty() {
            true => "Anonymous",
            false => &self.username,
        }
    }

    pub fn avatar_src(&self, api_url: &str) -> String {
        match &self.avatar_url {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => url.clone(),
            Some(path) => format!("{api_url}{path}"),
            None => format!("{api_url}{DEFAULT_AVATAR_PATH}"),
        }
    }

    pub fn display_date(&self) -> String {
        self.created_at.format("%b %-d, %Y, %H:%M").to_string()
    }

    /// Same comment with its replies swapped for `replies`
    pub fn with_replies(&self, replies: im::Vector<Comment>) -> Comment {
        Comment {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            home_page: self.home_page.clone(),
            text: self.text.clone(),
            parent: self.parent,
            created_at: self.created_at,
            avatar_url: self.avatar_url.clone(),
            attachment_url: self.attachment_url.clone(),
            replies,
        }
    }

    pub fn find<'a>(comments: &'a im::Vector<Comment>, id: CommentId) -> Option<&'a Comment> {
        for c in comments.iter() {
            if c.id == id {
                return Some(c);
            }
            if let Some(res) = Comment::find(&c.replies, id) {
                return Some(res);
            }
        }
        None
    }
}

/// Everything sent to the API to post a comment
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewComment {
    pub username: String,
    pub email: String,
    pub home_page: Option<String>,
    pub text: String,

    /// Answer typed by the user and the key of the challenge it answers
    pub captcha: String,
    pub captcha_key: String,

    /// None for a root comment
    pub parent: Option<CommentId>,
    pub avatar: Option<Upload>,
    pub attachment: Option<Upload>,
}

impl NewComment {
    /// Checks that block a submission before it reaches the network
    ///
    /// The homepage format is advisory and deliberately not checked here.
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_required("username", &self.username)?;
        crate::validate_required("email", &self.email)?;
        crate::validate_required("text", &self.text)?;
        crate::validate_required("captcha", &self.captcha)?;
        crate::validate_required("captcha_key", &self.captcha_key)?;
        if self.username.chars().count() > MAX_USERNAME_LEN {
            return Err(Error::UsernameTooLong(self.username.clone()));
        }
        crate::validate_markup(&self.text)?;
        if let Some(avatar) = &self.avatar {
            avatar.check_avatar()?;
        }
        if let Some(attachment) = &self.attachment {
            attachment.check_attachment()?;
        }
        Ok(())
    }
}
