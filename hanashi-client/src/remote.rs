use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::{
    api::{self, CaptchaChallenge, Comment, NewComment, SortState, Upload},
    ClientConfig, Error, Forest,
};

/// The remote comment service and its CAPTCHA issuer
#[async_trait]
pub trait CommentApi {
    async fn fetch_comments(&self, sort: SortState) -> Result<Forest, Error>;
    async fn submit_comment(&self, comment: NewComment) -> Result<Comment, Error>;
    async fn fetch_captcha(&self) -> Result<CaptchaChallenge, Error>;
}

pub struct HttpApi {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpApi {
    pub fn new(config: ClientConfig) -> HttpApi {
        HttpApi {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

async fn decode<R>(resp: reqwest::Response) -> Result<R, Error>
where
    R: for<'de> serde::Deserialize<'de>,
{
    let status = resp.status();
    let body = resp.bytes().await.context("reading response body")?;
    if !status.is_success() {
        return Err(match api::Error::parse(&body) {
            Ok(err) => Error::Api(err),
            Err(err) => Error::Transport(err.context(format!("request failed with {status}"))),
        });
    }
    Ok(serde_json::from_slice(&body).context("parsing response body")?)
}

fn file_part(upload: Upload) -> anyhow::Result<Part> {
    let mime = upload.media_type.mime();
    Part::bytes(upload.data)
        .file_name(upload.file_name)
        .mime_str(mime)
        .with_context(|| format!("building multipart part for {mime}"))
}

fn submission_form(c: NewComment) -> anyhow::Result<Form> {
    let mut form = Form::new()
        .text("username", c.username)
        .text("email", c.email)
        .text("home_page", c.home_page.unwrap_or_default())
        .text("text", c.text)
        .text("captcha", c.captcha)
        .text("captcha_key", c.captcha_key)
        .text(
            "parent",
            c.parent.map(|p| p.0.to_string()).unwrap_or_default(),
        );
    if let Some(avatar) = c.avatar {
        form = form.part("avatar", file_part(avatar)?);
    }
    if let Some(attachment) = c.attachment {
        form = form.part("file", file_part(attachment)?);
    }
    Ok(form)
}

#[async_trait]
impl CommentApi for HttpApi {
    async fn fetch_comments(&self, sort: SortState) -> Result<Forest, Error> {
        let resp = self
            .client
            .get(self.config.url("/comments/"))
            .query(&sort.query_params())
            .send()
            .await
            .context("fetching comments")?;
        decode(resp).await
    }

    async fn submit_comment(&self, comment: NewComment) -> Result<Comment, Error> {
        let parent = comment.parent;
        let resp = self
            .client
            .post(self.config.url("/comments/"))
            .multipart(submission_form(comment)?)
            .send()
            .await
            .with_context(|| format!("submitting comment under {parent:?}"))?;
        decode(resp).await
    }

    async fn fetch_captcha(&self) -> Result<CaptchaChallenge, Error> {
        let resp = self
            .client
            .get(self.config.url("/captcha/"))
            .send()
            .await
            .context("fetching captcha")?;
        decode(resp).await
    }
}
