/// An opaque challenge issued by the API; only the key is sent back with the answer
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CaptchaChallenge {
    #[serde(rename = "captcha_key")]
    pub key: String,

    /// Path of the challenge image, relative to the API base URL
    #[serde(rename = "captcha_image")]
    pub image: String,
}

impl CaptchaChallenge {
    pub fn image_url(&self, api_url: &str) -> String {
        format!("{}{}", api_url, self.image)
    }
}
