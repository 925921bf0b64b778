use crate::{
    api::{
        self, CaptchaChallenge, Comment, CommentId, MarkupError, MediaType, NewComment, Upload,
        ATTACHMENT_BOUNDS, AVATAR_BOUNDS,
    },
    resample, CommentApi, Error, Preview, TagInsertion, ToolbarAction,
};

/// A file attached to the draft, already in the form it will be uploaded in
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attachment {
    pub upload: Upload,
    pub preview: Preview,
}

/// State of one comment form, either for a root comment or a reply.
///
/// Every setter keeps the matching error message up to date, so the form
/// can be rendered straight from this struct.
#[derive(Clone, Debug, Default)]
pub struct CommentDraft {
    parent: Option<CommentId>,
    pub username: String,
    pub email: String,
    home_page: String,
    home_page_error: Option<api::Error>,
    text: String,
    markup_error: Option<MarkupError>,
    pub captcha_response: String,
    captcha: Option<CaptchaChallenge>,
    captcha_error: Option<String>,
    avatar: Option<Upload>,
    attachment: Option<Attachment>,
}

impl CommentDraft {
    pub fn new(parent: Option<CommentId>) -> CommentDraft {
        CommentDraft {
            parent,
            ..CommentDraft::default()
        }
    }

    pub fn parent(&self) -> Option<CommentId> {
        self.parent
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn markup_error(&self) -> Option<&MarkupError> {
        self.markup_error.as_ref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.markup_error = api::validate_markup(&self.text).err();
    }

    /// Runs a toolbar button on the current selection and returns where the
    /// caret should be put once the new text is displayed
    pub fn apply_toolbar(
        &mut self,
        action: ToolbarAction,
        selection_start: usize,
        selection_end: usize,
    ) -> usize {
        let TagInsertion { text, cursor } = action.apply(&self.text, selection_start, selection_end);
        self.set_text(text);
        cursor
    }

    pub fn home_page(&self) -> &str {
        &self.home_page
    }

    /// Only advisory, an invalid homepage does not prevent submission
    pub fn home_page_error(&self) -> Option<&api::Error> {
        self.home_page_error.as_ref()
    }

    pub fn set_home_page(&mut self, value: impl Into<String>) {
        self.home_page = value.into();
        self.home_page_error = (!api::is_valid_homepage(&self.home_page))
            .then(|| api::Error::InvalidHomePage(self.home_page.clone()));
    }

    pub fn captcha(&self) -> Option<&CaptchaChallenge> {
        self.captcha.as_ref()
    }

    /// Message shown next to the CAPTCHA, set when the API rejects a submission
    pub fn captcha_error(&self) -> Option<&str> {
        self.captcha_error.as_deref()
    }

    pub fn set_captcha(&mut self, challenge: CaptchaChallenge) {
        self.captcha = Some(challenge);
    }

    /// Replaces the challenge with a fresh one. On failure the previous
    /// challenge is kept.
    pub async fn refresh_captcha<A>(&mut self, api: &A) -> Result<(), Error>
    where
        A: CommentApi + ?Sized,
    {
        match api.fetch_captcha().await {
            Ok(challenge) => {
                self.set_captcha(challenge);
                Ok(())
            }
            Err(err) => {
                tracing::error!(?err, "failed fetching captcha");
                Err(err)
            }
        }
    }

    pub fn avatar(&self) -> Option<&Upload> {
        self.avatar.as_ref()
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn clear_attachment(&mut self) {
        self.attachment = None;
    }

    /// Attaches a picked file: images are scaled down to the attachment
    /// bounds, small text files are kept as-is. A rejected file leaves the
    /// draft untouched.
    pub async fn attach_file(
        &mut self,
        file_name: impl Into<String>,
        mime: &str,
        data: Vec<u8>,
    ) -> Result<(), Error> {
        let upload = Upload {
            file_name: file_name.into(),
            media_type: MediaType::for_attachment(mime)?,
            data,
        };
        let attachment = match upload.media_type.is_image() {
            true => {
                let res = resample(upload, ATTACHMENT_BOUNDS).await?;
                Attachment {
                    upload: res.upload,
                    preview: res.preview,
                }
            }
            false => {
                upload.check_attachment()?;
                Attachment {
                    preview: Preview::Text(String::from_utf8_lossy(&upload.data).into_owned()),
                    upload,
                }
            }
        };
        self.attachment = Some(attachment);
        Ok(())
    }

    pub async fn set_avatar(
        &mut self,
        file_name: impl Into<String>,
        mime: &str,
        data: Vec<u8>,
    ) -> Result<(), Error> {
        let upload = Upload {
            file_name: file_name.into(),
            media_type: MediaType::for_avatar(mime)?,
            data,
        };
        self.avatar = Some(resample(upload, AVATAR_BOUNDS).await?.upload);
        Ok(())
    }

    /// The submission this draft currently describes, if it passes local checks
    pub fn to_new_comment(&self) -> Result<NewComment, Error> {
        let res = NewComment {
            username: self.username.clone(),
            email: self.email.clone(),
            home_page: (!self.home_page.is_empty()).then(|| self.home_page.clone()),
            text: self.text.clone(),
            captcha: self.captcha_response.clone(),
            captcha_key: self
                .captcha
                .as_ref()
                .map(|c| c.key.clone())
                .unwrap_or_default(),
            parent: self.parent,
            avatar: self.avatar.clone(),
            attachment: self.attachment.as_ref().map(|a| a.upload.clone()),
        };
        res.validate()?;
        Ok(res)
    }

    /// Posts the draft.
    ///
    /// On success the form is cleared and a new CAPTCHA is fetched. When the
    /// API rejects the comment its message is kept for display next to the
    /// CAPTCHA and the fields are left as they are so the user can retry.
    pub async fn submit<A>(&mut self, api: &A) -> Result<Comment, Error>
    where
        A: CommentApi + ?Sized,
    {
        let comment = self.post(api).await?;
        // a failed refresh was already logged, the user can retry it by hand
        let _ = self.refresh_captcha(api).await;
        Ok(comment)
    }

    /// Same as `submit`, without fetching a new challenge afterwards. For
    /// clients that post a single comment and stop, the used challenge is
    /// dropped and the draft is left without one.
    pub async fn post<A>(&mut self, api: &A) -> Result<Comment, Error>
    where
        A: CommentApi + ?Sized,
    {
        let new = self.to_new_comment()?;
        match api.submit_comment(new).await {
            Ok(comment) => {
                tracing::info!(id = ?comment.id, parent = ?self.parent, "comment submitted");
                self.clear();
                self.captcha = None;
                Ok(comment)
            }
            Err(Error::Api(err)) => {
                tracing::info!("comment rejected by api: {err}");
                self.captcha_error = Some(err.to_string());
                Err(Error::Api(err))
            }
            Err(err) => {
                tracing::error!(?err, "failed submitting comment");
                self.captcha_error = None;
                Err(err)
            }
        }
    }

    /// Empties every field, keeping the parent and the current challenge
    pub fn clear(&mut self) {
        *self = CommentDraft {
            parent: self.parent,
            captcha: self.captcha.take(),
            ..CommentDraft::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> CommentDraft {
        let mut d = CommentDraft::new(Some(CommentId(4)));
        d.username = String::from("carol");
        d.email = String::from("carol@example.com");
        d.captcha_response = String::from("wxyz");
        d.set_captcha(CaptchaChallenge {
            key: String::from("k1"),
            image: String::from("/captcha/image/k1/"),
        });
        d.set_text("hi");
        d
    }

    #[test]
    fn text_is_validated_on_change() {
        let mut d = CommentDraft::new(None);
        d.set_text("<strong>oops");
        assert_eq!(
            d.markup_error(),
            Some(&MarkupError::Unclosed(String::from("strong")))
        );
        d.set_text("<strong>fine</strong>");
        assert_eq!(d.markup_error(), None);
    }

    #[test]
    fn toolbar() {
        let mut d = CommentDraft::new(None);
        d.set_text("hello world");
        let cursor = d.apply_toolbar(ToolbarAction::Italic, 5, 5);
        assert_eq!(d.text(), "hello<i></i> world");
        assert_eq!(cursor, 8);
        assert_eq!(d.markup_error(), None);
    }

    #[test]
    fn home_page_is_advisory() {
        let mut d = filled();
        d.set_home_page("example.com");
        assert_eq!(
            d.home_page_error(),
            Some(&api::Error::InvalidHomePage(String::from("example.com")))
        );
        let c = d.to_new_comment().unwrap();
        assert_eq!(c.home_page.as_deref(), Some("example.com"));

        d.set_home_page("");
        assert_eq!(d.home_page_error(), None);
        assert_eq!(d.to_new_comment().unwrap().home_page, None);
    }

    #[test]
    fn new_comment_fields() {
        let c = filled().to_new_comment().unwrap();
        assert_eq!(c.parent, Some(CommentId(4)));
        assert_eq!(c.captcha_key, "k1");
        assert_eq!(c.captcha, "wxyz");
        assert_eq!(c.text, "hi");
    }

    #[test]
    fn markup_blocks_submission() {
        let mut d = filled();
        d.set_text("<b>bold</b>");
        assert!(matches!(
            d.to_new_comment(),
            Err(Error::Api(api::Error::Markup(MarkupError::DisallowedTag(_))))
        ));
    }

    #[test]
    fn missing_captcha_blocks_submission() {
        let mut d = filled();
        d.captcha = None;
        assert!(matches!(
            d.to_new_comment(),
            Err(Error::Api(api::Error::MissingField("captcha_key")))
        ));
    }

    #[tokio::test]
    async fn text_attachment() {
        let mut d = filled();
        d.attach_file("notes.txt", "text/plain", b"some notes".to_vec())
            .await
            .unwrap();
        let a = d.attachment().unwrap();
        assert_eq!(a.preview, Preview::Text(String::from("some notes")));
        assert_eq!(a.upload.media_type, MediaType::PlainText);
        assert_eq!(d.to_new_comment().unwrap().attachment, Some(a.upload.clone()));
    }

    #[tokio::test]
    async fn rejected_attachment_keeps_previous() {
        let mut d = filled();
        d.attach_file("notes.txt", "text/plain", b"keep me".to_vec())
            .await
            .unwrap();

        let too_big = vec![b'x'; api::MAX_TEXT_ATTACHMENT_SIZE + 1];
        let err = d.attach_file("big.txt", "text/plain", too_big).await.unwrap_err();
        assert!(err.api().unwrap().is_attachment_rejection());

        let err = d
            .attach_file("doc.pdf", "application/pdf", vec![1, 2, 3])
            .await
            .unwrap_err();
        assert!(err.api().unwrap().is_attachment_rejection());

        assert_eq!(
            d.attachment().unwrap().preview,
            Preview::Text(String::from("keep me"))
        );
        assert_eq!(d.text(), "hi");
    }

    #[tokio::test]
    async fn avatar_must_be_an_image() {
        let mut d = filled();
        let err = d
            .set_avatar("me.txt", "text/plain", b"me".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(api::Error::UnsupportedAvatar(_))));
        assert!(d.avatar().is_none());
    }

    #[test]
    fn clear_keeps_parent_and_challenge() {
        let mut d = filled();
        d.set_home_page("nope");
        d.clear();
        assert_eq!(d.parent(), Some(CommentId(4)));
        assert_eq!(d.captcha().map(|c| &c.key as &str), Some("k1"));
        assert_eq!(d.text(), "");
        assert_eq!(d.username, "");
        assert_eq!(d.home_page_error(), None);
    }
}
