//! `.metro` container parsing, patching, and blob compression.
//!
//! A container is a fixed-layout binary header followed by a gzip stream
//! holding the UTF-8 JSON save document. The header records where the blob
//! starts (which is also the header length), the blob's byte length, and a
//! CRC-32 of the blob, each as a little-endian u32 at a fixed offset.

use flate2::read::GzDecoder;
use flate2::{Compression, Crc, GzBuilder};
use std::io::{self, Read, Write};
use thiserror::Error;

/// ASCII tag at the start of every `.metro` container.
pub const MAGIC: [u8; 4] = *b"METR";

/// Offset of the field giving where the gzip blob starts.
const BLOB_START_OFFSET: usize = 24;
/// Offset of the compressed-blob length field.
const BLOB_LEN_OFFSET: usize = 28;
/// Offset of the CRC-32 field covering the compressed blob.
const BLOB_CRC_OFFSET: usize = 912;

/// Smallest header that can hold all fixed fields.
pub const MIN_HEADER_LEN: usize = BLOB_CRC_OFFSET + 4;

/// Gzip level used when rebuilding a container.
pub const DEFAULT_LEVEL: u32 = 9;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("save header truncated: {0} bytes")]
    TruncatedHeader(usize),

    #[error("not a metro save: bad magic {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("blob offset {offset} out of range for {len}-byte file")]
    BlobBounds { offset: u32, len: usize },

    #[error("bad gzip stream: {0}")]
    Gzip(#[from] io::Error),
}

/// A parsed save container: the raw header plus the compressed blob.
///
/// Header bytes other than the length and checksum fields are carried
/// through untouched, so unknown header content survives an edit.
pub struct SaveContainer {
    header: Vec<u8>,
    blob: Vec<u8>,
}

impl SaveContainer {
    /// Split a raw save file into header and compressed blob.
    ///
    /// The header runs from the start of the file to the blob-start offset
    /// recorded inside it; the blob is everything after.
    pub fn parse(raw: &[u8]) -> Result<Self, ContainerError> {
        if raw.len() < MIN_HEADER_LEN {
            return Err(ContainerError::TruncatedHeader(raw.len()));
        }
        if raw[..4] != MAGIC {
            let mut found = [0u8; 4];
            found.copy_from_slice(&raw[..4]);
            return Err(ContainerError::BadMagic(found));
        }

        let blob_start = read_u32_le(raw, BLOB_START_OFFSET);
        if (blob_start as usize) < MIN_HEADER_LEN || blob_start as usize > raw.len() {
            return Err(ContainerError::BlobBounds {
                offset: blob_start,
                len: raw.len(),
            });
        }

        let split = blob_start as usize;
        Ok(SaveContainer {
            header: raw[..split].to_vec(),
            blob: raw[split..].to_vec(),
        })
    }

    /// Header bytes (everything before the blob).
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    /// Compressed blob bytes.
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// Blob length as recorded in the header.
    pub fn recorded_len(&self) -> u32 {
        read_u32_le(&self.header, BLOB_LEN_OFFSET)
    }

    /// Blob CRC-32 as recorded in the header.
    pub fn recorded_crc(&self) -> u32 {
        read_u32_le(&self.header, BLOB_CRC_OFFSET)
    }

    /// Decompress the embedded JSON document.
    pub fn decompress_blob(&self) -> Result<Vec<u8>, ContainerError> {
        decompress(&self.blob)
    }

    /// Install a new compressed blob and patch the header's length and
    /// CRC-32 fields to match it. No other header bytes change; lengths
    /// wider than the field wrap to the stored u32.
    pub fn replace_blob(&mut self, blob: Vec<u8>) {
        let crc = checksum(&blob);
        write_u32_le(&mut self.header, BLOB_LEN_OFFSET, blob.len() as u32);
        write_u32_le(&mut self.header, BLOB_CRC_OFFSET, crc);
        self.blob = blob;
    }

    /// Rebuild the on-disk byte sequence.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.header.len() + self.blob.len());
        out.extend_from_slice(&self.header);
        out.extend_from_slice(&self.blob);
        out
    }
}

/// Decompress a gzip stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, ContainerError> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Compress `data` as a gzip stream with the modification-time field forced
/// to zero, so the same input always produces the same bytes.
pub fn compress(data: &[u8], level: u32) -> io::Result<Vec<u8>> {
    let mut encoder = GzBuilder::new()
        .mtime(0)
        .write(Vec::new(), Compression::new(level));
    encoder.write_all(data)?;
    encoder.finish()
}

/// CRC-32 of `data`, as stored in the container header.
///
/// This is the same CRC-32 the gzip layer uses, computed over the compressed
/// bytes exactly as they appear in the file.
pub fn checksum(data: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(data);
    crc.sum()
}

fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

fn write_u32_le(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_HEADER_LEN: usize = 1024;

    // Build a container with a patterned header so preservation checks are
    // meaningful.
    fn build_container(json: &[u8]) -> Vec<u8> {
        let blob = compress(json, DEFAULT_LEVEL).unwrap();

        let mut raw = vec![0u8; TEST_HEADER_LEN];
        for (i, b) in raw.iter_mut().enumerate() {
            *b = (i % 251) as u8;
        }
        raw[..4].copy_from_slice(&MAGIC);
        write_u32_le(&mut raw, BLOB_START_OFFSET, TEST_HEADER_LEN as u32);
        write_u32_le(&mut raw, BLOB_LEN_OFFSET, blob.len() as u32);
        write_u32_le(&mut raw, BLOB_CRC_OFFSET, checksum(&blob));
        raw.extend_from_slice(&blob);
        raw
    }

    #[test]
    fn test_compress_roundtrip() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 256) as u8).collect();
        let compressed = compress(&data, DEFAULT_LEVEL).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_compress_deterministic() {
        let data = br#"{"mainSave":{"metadata":{"money":100}}}"#;
        let a = compress(data, DEFAULT_LEVEL).unwrap();
        let b = compress(data, DEFAULT_LEVEL).unwrap();
        assert_eq!(a, b);
        // mtime field (bytes 4..8 of the gzip header) is zeroed
        assert_eq!(&a[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_checksum_is_standard_crc32() {
        // CRC-32 check value
        assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
        assert_eq!(checksum(b""), 0);
    }

    #[test]
    fn test_parse_splits_header_and_blob() {
        let raw = build_container(br#"{"mainSave":{}}"#);
        let container = SaveContainer::parse(&raw).unwrap();

        assert_eq!(container.header().len(), TEST_HEADER_LEN);
        assert_eq!(container.header(), &raw[..TEST_HEADER_LEN]);
        assert_eq!(container.blob(), &raw[TEST_HEADER_LEN..]);
        assert_eq!(container.recorded_len() as usize, container.blob().len());
        assert_eq!(container.recorded_crc(), checksum(container.blob()));
        assert_eq!(container.to_bytes(), raw);
    }

    #[test]
    fn test_parse_rejects_short_file() {
        let result = SaveContainer::parse(b"METR");
        assert!(matches!(result, Err(ContainerError::TruncatedHeader(4))));
    }

    #[test]
    fn test_parse_rejects_bad_magic() {
        let mut raw = build_container(br#"{}"#);
        raw[..4].copy_from_slice(b"NOPE");
        let result = SaveContainer::parse(&raw);
        assert!(matches!(result, Err(ContainerError::BadMagic(m)) if &m == b"NOPE"));
    }

    #[test]
    fn test_parse_rejects_blob_offset_past_eof() {
        let mut raw = build_container(br#"{}"#);
        let len = raw.len();
        write_u32_le(&mut raw, BLOB_START_OFFSET, len as u32 + 1);
        assert!(matches!(
            SaveContainer::parse(&raw),
            Err(ContainerError::BlobBounds { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_blob_offset_inside_fixed_fields() {
        let mut raw = build_container(br#"{}"#);
        write_u32_le(&mut raw, BLOB_START_OFFSET, 100);
        assert!(matches!(
            SaveContainer::parse(&raw),
            Err(ContainerError::BlobBounds { .. })
        ));
    }

    #[test]
    fn test_decompress_rejects_garbage() {
        assert!(matches!(
            decompress(b"this is not gzip"),
            Err(ContainerError::Gzip(_))
        ));
    }

    #[test]
    fn test_decompress_rejects_truncated_stream() {
        let compressed = compress(b"some payload that compresses", DEFAULT_LEVEL).unwrap();
        let cut = &compressed[..compressed.len() / 2];
        assert!(matches!(decompress(cut), Err(ContainerError::Gzip(_))));
    }

    #[test]
    fn test_replace_blob_patches_only_size_and_crc() {
        let raw = build_container(br#"{"mainSave":{"metadata":{"money":100}}}"#);
        let mut container = SaveContainer::parse(&raw).unwrap();

        let new_blob = compress(br#"{"mainSave":{"metadata":{"money":5000}}}"#, DEFAULT_LEVEL)
            .unwrap();
        container.replace_blob(new_blob.clone());

        assert_eq!(container.recorded_len() as usize, new_blob.len());
        assert_eq!(container.recorded_crc(), checksum(&new_blob));
        assert_eq!(container.blob(), &new_blob[..]);

        // every header byte outside the two patched fields is untouched
        let header = container.header();
        for (i, (&old, &new)) in raw[..TEST_HEADER_LEN].iter().zip(header).enumerate() {
            let patched = (BLOB_LEN_OFFSET..BLOB_LEN_OFFSET + 4).contains(&i)
                || (BLOB_CRC_OFFSET..BLOB_CRC_OFFSET + 4).contains(&i);
            if !patched {
                assert_eq!(old, new, "header byte {} changed", i);
            }
        }
    }

    #[test]
    fn test_reparse_after_replace() {
        let raw = build_container(br#"{"a":1}"#);
        let mut container = SaveContainer::parse(&raw).unwrap();
        container.replace_blob(compress(br#"{"a":2}"#, DEFAULT_LEVEL).unwrap());

        let reparsed = SaveContainer::parse(&container.to_bytes()).unwrap();
        assert_eq!(reparsed.decompress_blob().unwrap(), br#"{"a":2}"#);
        assert_eq!(reparsed.recorded_crc(), checksum(reparsed.blob()));
    }
}
