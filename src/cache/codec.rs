// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cache blob format
//!
//! ```text
//! base64( MAGIC | msgpack(episodes) | sha256(msgpack(episodes)) )
//! ```
//!
//! The payload is MessagePack with named fields, so the blob is readable
//! without an external schema. There is no migration path: a new layout
//! gets a new magic and old caches simply fail to decode.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use crate::error::CodecError;
use crate::feed::Episode;

const MAGIC: &[u8; 4] = b"PCD1";
const DIGEST_LEN: usize = 32;

/// Serialize episodes into a printable cache blob
pub fn encode(episodes: &[Episode]) -> Result<Vec<u8>, CodecError> {
    let payload = rmp_serde::to_vec_named(episodes)?;
    let digest = Sha256::digest(&payload);

    let mut framed = Vec::with_capacity(MAGIC.len() + payload.len() + DIGEST_LEN);
    framed.extend_from_slice(MAGIC);
    framed.extend_from_slice(&payload);
    framed.extend_from_slice(&digest);

    Ok(STANDARD.encode(framed).into_bytes())
}

/// Decode a blob produced by [`encode`]
///
/// Fails on anything else: bad base64, foreign magic, short input, a
/// checksum mismatch or bytes left over after the episode list.
pub fn decode(blob: &[u8]) -> Result<Vec<Episode>, CodecError> {
    let framed = STANDARD.decode(blob.trim_ascii())?;

    if framed.len() < MAGIC.len() + DIGEST_LEN {
        if !framed.is_empty() && !MAGIC.starts_with(&framed[..framed.len().min(MAGIC.len())]) {
            return Err(CodecError::UnknownFormat);
        }
        return Err(CodecError::Truncated { len: framed.len() });
    }

    let (magic, rest) = framed.split_at(MAGIC.len());
    if magic != MAGIC {
        return Err(CodecError::UnknownFormat);
    }

    let (payload, digest) = rest.split_at(rest.len() - DIGEST_LEN);
    if Sha256::digest(payload).as_slice() != digest {
        return Err(CodecError::ChecksumMismatch);
    }

    let mut reader = payload;
    let episodes: Vec<Episode> = rmp_serde::from_read(&mut reader)?;
    if !reader.is_empty() {
        return Err(CodecError::TrailingBytes {
            count: reader.len(),
        });
    }

    Ok(episodes)
}
