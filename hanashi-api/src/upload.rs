use crate::Error;

/// Plain-text attachments larger than this are refused
pub const MAX_TEXT_ATTACHMENT_SIZE: usize = 100 * 1024;

pub const AVATAR_BOUNDS: Bounds = Bounds {
    width: 100,
    height: 100,
};

pub const ATTACHMENT_BOUNDS: Bounds = Bounds {
    width: 320,
    height: 240,
};

/// Box an image must fit in after resampling
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MediaType {
    Jpeg,
    Png,
    Gif,
    PlainText,
}

impl MediaType {
    pub fn from_mime(mime: &str) -> Option<MediaType> {
        match mime {
            // image/jpg is not registered but browsers do send it
            "image/jpeg" | "image/jpg" => Some(MediaType::Jpeg),
            "image/png" => Some(MediaType::Png),
            "image/gif" => Some(MediaType::Gif),
            "text/plain" => Some(MediaType::PlainText),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<MediaType> {
        match &ext.to_ascii_lowercase() as &str {
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            "png" => Some(MediaType::Png),
            "gif" => Some(MediaType::Gif),
            "txt" => Some(MediaType::PlainText),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Gif => "image/gif",
            MediaType::PlainText => "text/plain",
        }
    }

    pub fn is_image(&self) -> bool {
        !matches!(self, MediaType::PlainText)
    }

    /// Media type for a file picked as a comment attachment
    pub fn for_attachment(mime: &str) -> Result<MediaType, Error> {
        MediaType::from_mime(mime).ok_or_else(|| Error::UnsupportedAttachment(mime.to_string()))
    }

    /// Media type for a file picked as an avatar, which must be an image
    pub fn for_avatar(mime: &str) -> Result<MediaType, Error> {
        match MediaType::from_mime(mime) {
            Some(t) if t.is_image() => Ok(t),
            _ => Err(Error::UnsupportedAvatar(mime.to_string())),
        }
    }
}

/// A file as it will be sent in the multipart submission
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub media_type: MediaType,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn check_attachment(&self) -> Result<(), Error> {
        if self.media_type == MediaType::PlainText && self.data.len() > MAX_TEXT_ATTACHMENT_SIZE {
            return Err(Error::TextFileTooLarge(self.data.len()));
        }
        Ok(())
    }

    pub fn check_avatar(&self) -> Result<(), Error> {
        match self.media_type.is_image() {
            true => Ok(()),
            false => Err(Error::UnsupportedAvatar(self.media_type.mime().to_string())),
        }
    }
}
