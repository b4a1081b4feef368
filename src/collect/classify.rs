//! Text/binary classification.
//!
//! Content sniffing decides first. The extension denylist is only
//! consulted when the file cannot be read for sniffing.

use std::path::Path;

use tokio::io::AsyncReadExt;

/// Bytes inspected from the start of each file.
const SNIFF_LEN: u64 = 8192;

/// Fraction of suspicious bytes above which a non-UTF-8 sample is binary.
const SUSPICIOUS_RATIO: f64 = 0.1;

/// Extensions treated as binary when sniffing fails.
pub const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "pdf", "zip", "jar", "class", "exe", "bin",
];

/// Whether the file at `path` should be treated as text.
pub async fn is_text(path: &Path) -> bool {
    match read_head(path).await {
        Ok(sample) => !looks_binary(&sample),
        Err(err) => {
            tracing::warn!(path = %path.display(), "failed to check if file is binary: {err}");
            !has_binary_extension(path)
        }
    }
}

async fn read_head(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut sample = Vec::with_capacity(SNIFF_LEN as usize);
    file.take(SNIFF_LEN).read_to_end(&mut sample).await?;
    Ok(sample)
}

/// Content heuristic over the leading bytes of a file.
pub fn looks_binary(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }

    // Byte-order marks announce text even though UTF-16 contains NULs.
    if sample.starts_with(&[0xEF, 0xBB, 0xBF])
        || sample.starts_with(&[0xFF, 0xFE])
        || sample.starts_with(&[0xFE, 0xFF])
    {
        return false;
    }

    if sample.starts_with(b"%PDF-") || sample.contains(&0) {
        return true;
    }

    match std::str::from_utf8(sample) {
        Ok(_) => return false,
        // Sequence cut off by the sample boundary.
        Err(e) if e.error_len().is_none() => return false,
        Err(_) => {}
    }

    let suspicious = sample
        .iter()
        .filter(|&&b| b < 0x07 || (b > 0x0D && b < 0x20 && b != 0x1B))
        .count();
    suspicious as f64 / sample.len() as f64 > SUSPICIOUS_RATIO
}

/// Whether the extension is on the fallback denylist.
pub fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.as_str()))
}
