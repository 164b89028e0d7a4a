//! Newline-delimited JSON framing shared by both gateways.
//!
//! Each frame is one line of UTF-8 JSON terminated by `\n`. No length
//! prefix, no multi-frame assembly. A line reader caps the maximum line
//! length itself — on a raw socket nothing else bounds a malicious peer's
//! buffering, unlike the teacher's HTTP stack, which gets a body-size limit
//! for free from Rocket's request `limits.json` config.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Matches the intent of the teacher's JSON body size cap (bounding
/// base64-inflated attachment payloads), reused here since both exist for
/// the same reason.
pub const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("connection closed")]
    Eof,
    #[error("line exceeded {0} bytes")]
    TooLong(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reads one `\n`-terminated line, returning it without the trailing
/// newline. Lines longer than [`MAX_LINE_BYTES`] are rejected without
/// being buffered in full.
pub async fn read_line<R>(reader: &mut BufReader<R>) -> Result<String, CodecError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    let mut total = 0usize;
    loop {
        let mut chunk = String::new();
        let n = reader.read_line(&mut chunk).await?;
        if n == 0 {
            return if line.is_empty() {
                Err(CodecError::Eof)
            } else {
                Ok(line)
            };
        }
        total += n;
        if total > MAX_LINE_BYTES {
            return Err(CodecError::TooLong(MAX_LINE_BYTES));
        }
        line.push_str(&chunk);
        if line.ends_with('\n') {
            line.truncate(line.trim_end_matches(['\n', '\r']).len());
            return Ok(line);
        }
    }
}

/// Serializes `value` to compact JSON and writes it followed by `\n`,
/// flushing so the peer observes it promptly.
pub async fn write_json<W>(
    writer: &mut W,
    value: &serde_json::Value,
) -> Result<(), CodecError>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(value).expect("serde_json::Value always serializes");
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}
