//! SHA-256 digests of emitted files.

use std::io::{self, Write};

use sha2::{Digest, Sha256};

/// Writer that hashes everything passing through it.
pub struct DigestWriter<W> {
    inner: W,
    hasher: Sha256,
    bytes: u64,
}

impl<W: Write> DigestWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes: 0,
        }
    }

    /// Returns the wrapped writer, the lowercase hex digest and the byte count.
    pub fn finish(self) -> (W, String, u64) {
        (self.inner, hex::encode(self.hasher.finalize()), self.bytes)
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        self.bytes += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Lowercase hex SHA-256 of a byte slice.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_one_shot_hash() {
        let mut writer = DigestWriter::new(Vec::new());
        writer.write_all(b"Hello, ").unwrap();
        writer.write_all(b"World!").unwrap();
        let (buf, digest, bytes) = writer.finish();
        assert_eq!(buf, b"Hello, World!");
        assert_eq!(bytes, 13);
        assert_eq!(
            digest,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
        assert_eq!(sha256_hex(b"Hello, World!"), digest);
    }
}
