//! Embedding content directly into a document as a `data:` URL

use std::io::Write;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::{write::GzEncoder, Compression};
use thiserror::Error;

/// A failure embedding a resource
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Compressing the content failed
    #[error("cannot compress resource: {0}")]
    Compress(#[from] std::io::Error),
}

/// An embedded resource: its URL and the compression the consumer must undo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// A `data:` URL holding the content
    pub url: String,
    /// The compression applied to the content; empty if none
    pub compression: String,
}

/// Encodes `content` as the smallest `data:` URL available
///
/// If `compression` is given, the content is taken to be compressed already and is embedded
/// unchanged. Otherwise it is percent-encoded or base64-encoded, whichever is shorter, and, if
/// `allow_auto` is set, gzipped when that makes the URL smaller than 90% of the uncompressed one.
/// ```
/// use kindling_schema::encode_resource;
///
/// let encoded = encode_resource(b"hello world", None, true)?;
/// assert_eq!(encoded.url, "data:,hello%20world");
/// assert_eq!(encoded.compression, "");
///
/// let repetitive = "a".repeat(4096);
/// let encoded = encode_resource(repetitive.as_bytes(), None, true)?;
/// assert!(encoded.url.starts_with("data:;base64,"));
/// assert_eq!(encoded.compression, "gzip");
///
/// let encoded = encode_resource(repetitive.as_bytes(), None, false)?;
/// assert_eq!(encoded.compression, "");
/// # Ok::<(), kindling_schema::ResourceError>(())
/// ```
pub fn encode_resource(
    content: &[u8],
    compression: Option<&str>,
    allow_auto: bool,
) -> Result<Encoded, ResourceError> {
    let (compression, allow_auto) = match compression {
        Some(given) if !given.is_empty() => (given.to_owned(), false),
        _ => (String::new(), allow_auto),
    };

    let mut url = percent_url(content);
    let base64 = base64_url(content);
    if base64.len() < url.len() {
        url = base64;
    }
    if !allow_auto {
        return Ok(Encoded { url, compression });
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(content)?;
    let compressed = base64_url(&encoder.finish()?);
    if compressed.len() < url.len() * 9 / 10 {
        tracing::trace!(
            "Compressed resource from {} to {} bytes",
            url.len(),
            compressed.len()
        );
        Ok(Encoded {
            url: compressed,
            compression: "gzip".to_owned(),
        })
    } else {
        Ok(Encoded { url, compression })
    }
}

fn base64_url(content: &[u8]) -> String {
    format!("data:;base64,{}", STANDARD.encode(content))
}

fn percent_url(content: &[u8]) -> String {
    let mut url = String::from("data:,");
    for &byte in content {
        if byte.is_ascii_alphanumeric() || b"-_.~".contains(&byte) {
            url.push(byte as char);
        } else {
            url.push_str(&format!("%{byte:02X}"));
        }
    }
    url
}
