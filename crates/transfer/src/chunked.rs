use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};

// ---------------------------------------------------------------------------
// Chunk arithmetic
// ---------------------------------------------------------------------------

/// Number of chunks needed for `size` bytes: `ceil(size / chunk_size)`.
///
/// A zero `chunk_size` is treated as 1.
pub fn total_chunks(size: u64, chunk_size: usize) -> usize {
    let chunk_size = chunk_size.max(1) as u64;
    size.div_ceil(chunk_size) as usize
}

/// Attachment name of chunk `index` (0-based): `<encoded name>.<index>`.
pub fn chunk_attachment_name(encoded_name: &str, index: usize) -> String {
    format!("{encoded_name}.{index}")
}

/// Returns `true` if `filename` has the `<name>.<index>` shape of a chunk.
pub fn is_chunk_attachment_name(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((stem, index)) => {
            !stem.is_empty() && !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Reads a source in fixed-size chunks while hashing everything read.
///
/// Short reads from the underlying source are refilled, so a chunk is
/// only shorter than requested at end of input.
pub struct ChunkReader<R> {
    reader: R,
    offset: u64,
    hasher: Sha256,
}

impl<R: AsyncRead + Unpin> ChunkReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            hasher: Sha256::new(),
        }
    }

    /// Reads up to `len` bytes, returning fewer only at end of input.
    pub async fn next_chunk(&mut self, len: usize) -> std::io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let n = self.reader.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buf.truncate(filled);
        self.hasher.update(&buf);
        self.offset += filled as u64;
        Ok(buf)
    }

    /// Returns `true` if the source has no bytes left.
    ///
    /// Any byte found is counted and hashed, so this is only meaningful
    /// once all expected chunks have been read.
    pub async fn at_end(&mut self) -> std::io::Result<bool> {
        Ok(self.next_chunk(1).await?.is_empty())
    }

    /// Bytes read so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Hex SHA-256 of everything read.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}
