mod config;
pub use config::ClientConfig;

mod draft;
pub use draft::{Attachment, CommentDraft};

mod editor;
pub use editor::{insert_tag, TagInsertion, ToolbarAction};

mod error;
pub use error::Error;

mod remote;
pub use remote::{CommentApi, HttpApi};

mod resample;
pub use resample::{resample, scaled_dimensions, Preview, Resampled};

mod store;
pub use store::{insert_reply, insert_root, CommentStore, Forest, Walk};

pub mod api {
    pub use hanashi_api::*;
}
