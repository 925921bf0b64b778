use chrono::Utc;

mod captcha;
pub use captcha::CaptchaChallenge;

mod comment;
pub use comment::{Comment, CommentId, NewComment, DEFAULT_AVATAR_PATH, MAX_USERNAME_LEN};

mod error;
pub use error::Error;

mod homepage;
pub use homepage::is_valid_homepage;

mod markup;
pub use markup::{tokenize, validate_markup, MarkupError, MarkupToken, TagKind, ALLOWED_TAGS};

mod sort;
pub use sort::{SortField, SortOrder, SortState};

mod upload;
pub use upload::{
    Bounds, MediaType, Upload, ATTACHMENT_BOUNDS, AVATAR_BOUNDS, MAX_TEXT_ATTACHMENT_SIZE,
};

pub type Time = chrono::DateTime<Utc>;

pub fn validate_required(field: &'static str, value: &str) -> Result<(), Error> {
    match value.trim().is_empty() {
        true => Err(Error::MissingField(field)),
        false => Ok(()),
    }
}
