use crate::graffiti::buffer::PixelBuffer;
use crate::graffiti::collaborators::UserIdentity;
use crate::graffiti::error::SubmitError;
use chrono::Utc;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use rand::{thread_rng, Rng};
use std::fmt;

pub const PNG_MIME_TYPE: &str = "image/png";
pub const PNG_EXTENSION: &str = "png";
const OBJECT_KEY_RANDOM_RANGE: u32 = 1_000_000;
const EMBED_DELIMITERS: [char; 3] = [',', '<', '>'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub extension: &'static str,
}

impl EncodedImage {
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

pub fn encode_png(buffer: &PixelBuffer) -> Result<EncodedImage, SubmitError> {
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(SubmitError::Encoding(format!(
            "canvas is {}x{}",
            buffer.width(),
            buffer.height()
        )));
    }

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            buffer.pixels(),
            buffer.width(),
            buffer.height(),
            ColorType::Rgba8,
        )
        .map_err(|err| SubmitError::Encoding(err.to_string()))?;

    Ok(EncodedImage {
        bytes,
        mime_type: PNG_MIME_TYPE,
        extension: PNG_EXTENSION,
    })
}

/// Keeps ASCII letters only; the handle ends up inside a storage key.
pub fn sanitize_user_handle(handle: &str) -> String {
    handle.chars().filter(char::is_ascii_alphabetic).collect()
}

/// `{prefix}/{sanitized handle}{user id}{unix millis}{random}.{ext}`
pub fn object_key(
    prefix: &str,
    user: &UserIdentity,
    unix_millis: i64,
    random: u32,
    extension: &str,
) -> String {
    format!(
        "{}/{}{}{}{}.{}",
        prefix.trim_end_matches('/'),
        sanitize_user_handle(&user.handle),
        user.id,
        unix_millis,
        random,
        extension
    )
}

pub fn generate_object_key(prefix: &str, user: &UserIdentity, extension: &str) -> String {
    let random = thread_rng().gen_range(0..OBJECT_KEY_RANDOM_RANGE);
    object_key(prefix, user, Utc::now().timestamp_millis(), random, extension)
}

pub fn join_download_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

/// Inline markup `<tag,url>` expanded into an image by the comment renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedToken {
    tag: String,
    url: String,
}

impl EmbedToken {
    pub fn new(tag: &str, url: &str) -> Result<Self, SubmitError> {
        validate_embed_tag(tag)?;
        Ok(Self {
            tag: tag.to_string(),
            url: escape_embed_url(url),
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for EmbedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{},{}>", self.tag, self.url)
    }
}

pub fn validate_embed_tag(tag: &str) -> Result<(), SubmitError> {
    if tag.trim().is_empty() || tag.contains(EMBED_DELIMITERS) {
        return Err(SubmitError::InvalidEmbedTag(tag.to_string()));
    }
    Ok(())
}

fn escape_embed_url(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    for ch in url.chars() {
        match ch {
            ',' => escaped.push_str("%2C"),
            '<' => escaped.push_str("%3C"),
            '>' => escaped.push_str("%3E"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
