// src/download/filename.rs
// =============================================================================
// Picks the file name an image is saved under.
//
// Rules:
// 1. If the URL path ends in a file name with an image extension, use it
//    (https://x.test/photos/cat.png -> cat.png)
// 2. Otherwise invent one from a hash of the URL plus an extension guessed
//    from the Content-Type (https://cdn.test/img?id=7 -> image_1a2b3c4d.png)
// 3. Replace characters Windows won't accept in file names with '_'
//
// Collisions (two different URLs both called cat.png) are resolved by the
// downloader with numbered() below: cat.png, cat_1.png, cat_2.png, ...
// =============================================================================

use crate::config::CrawlConfig;
use sha2::{Digest, Sha256};
use url::Url;

// Characters that are illegal (or dangerous) in file names on common filesystems
const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// The base file name for `url`, before collision handling.
pub fn filename_for(url: &Url, content_type: &str, config: &CrawlConfig) -> String {
    let basename = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    let name = if !basename.is_empty() && config.has_image_extension(basename) {
        basename.to_string()
    } else {
        format!("image_{}{}", url_hash(url), extension_for(content_type))
    };

    sanitize(&name)
}

/// First 8 hex digits of the SHA-256 of the URL.
pub fn url_hash(url: &Url) -> String {
    let digest = format!("{:x}", Sha256::digest(url.as_str().as_bytes()));
    digest[..8].to_string()
}

/// File extension for an image content type, `.jpg` when we can't tell.
pub fn extension_for(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/bmp" | "image/x-ms-bmp" => ".bmp",
        "image/svg+xml" => ".svg",
        "image/x-icon" | "image/vnd.microsoft.icon" => ".ico",
        "image/tiff" => ".tiff",
        "image/avif" => ".avif",
        _ => ".jpg",
    }
}

pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// `name.ext` -> `name_<n>.ext`
pub fn numbered(name: &str, n: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_{}{}", &name[..dot], n, &name[dot..]),
        _ => format!("{}_{}", name, n),
    }
}
