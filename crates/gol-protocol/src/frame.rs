//! Length-prefixed bincode framing.
//!
//! Format: a 4-byte little-endian `u32` length, followed by that many
//! bytes of `bincode::encode_to_vec`-produced payload. The same shape
//! works equally well over a pipe or a socket; here it rides a
//! `TcpStream`.

use bincode::{Decode, Encode};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};

/// Reject frames larger than this many bytes — guards against a
/// corrupted or malicious length prefix causing an unbounded allocation.
const MAX_FRAME_BYTES: usize = 100 * 1024 * 1024;

/// Write one length-prefixed, bincode-encoded message.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Encode,
{
    let config = bincode::config::standard();
    let bytes =
        bincode::encode_to_vec(message, config).map_err(|e| Error::Encode(e.to_string()))?;

    let len = bytes.len() as u32;
    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed, bincode-encoded message.
pub async fn read_message<R, T>(reader: &mut R) -> Result<T>
where
    R: AsyncRead + Unpin,
    T: Decode<()>,
{
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes).await?;
    let len = u32::from_le_bytes(len_bytes) as usize;

    if len > MAX_FRAME_BYTES {
        return Err(Error::FrameTooLarge {
            len,
            cap: MAX_FRAME_BYTES,
        });
    }

    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes).await?;

    let config = bincode::config::standard();
    let (message, _) =
        bincode::decode_from_slice(&bytes, config).map_err(|e| Error::Decode(e.to_string()))?;
    Ok(message)
}
