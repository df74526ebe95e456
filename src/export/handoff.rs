use url::Url;

/// Deep link that opens the desk's chat with the quote pre-filled.
#[derive(Debug, Clone)]
pub struct ChatHandoff {
    handle: String,
}

impl ChatHandoff {
    pub fn new(handle: impl AsRef<str>) -> Self {
        Self {
            handle: handle.as_ref().trim().trim_start_matches('@').to_string(),
        }
    }

    pub fn link(&self, text: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "https://t.me/{}?text={}",
            urlencoding::encode(&self.handle),
            urlencoding::encode(text)
        ))
    }
}
