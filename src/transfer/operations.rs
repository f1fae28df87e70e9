//! Transfer operations
//!
//! Moves listing and file bytes over an established data connection.

use log::{info, warn};
use std::io::{self, Write};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{FtpServerError, StorageError, TransferError};
use crate::storage::FileSystem;
use crate::storage::operations::format_listing;

/// Sends the listing of `target` over the data connection.
pub async fn send_listing<F, S>(
    fs: &F,
    stream: &mut S,
    target: &Path,
) -> Result<usize, FtpServerError>
where
    F: FileSystem,
    S: AsyncWrite + Unpin,
{
    let entries = fs.list_dir(target)?;
    let listing = format_listing(&entries);

    stream
        .write_all(listing.as_bytes())
        .await
        .map_err(TransferError::TransferFailed)?;
    stream.flush().await.map_err(TransferError::TransferFailed)?;

    info!("Sent listing of {} ({} entries)", target.display(), entries.len());
    Ok(entries.len())
}

/// Sends the whole content of `target` over the data connection.
pub async fn send_file<F, S>(
    fs: &F,
    stream: &mut S,
    target: &Path,
) -> Result<usize, FtpServerError>
where
    F: FileSystem,
    S: AsyncWrite + Unpin,
{
    let contents = fs.read_file(target)?;

    stream
        .write_all(&contents)
        .await
        .map_err(TransferError::TransferFailed)?;
    stream.flush().await.map_err(TransferError::TransferFailed)?;

    info!("Sent {} ({} bytes)", target.display(), contents.len());
    Ok(contents.len())
}

/// Stores everything read from the data connection into `target`, until the
/// client closes its side.
///
/// Socket reads stay on the runtime; each chunk is written to disk on the
/// blocking pool, so a slow disk never stalls other sessions.
pub async fn receive_file<F, S>(
    fs: &F,
    stream: &mut S,
    target: &Path,
    buffer_size: usize,
) -> Result<usize, FtpServerError>
where
    F: FileSystem,
    S: AsyncRead + Unpin,
{
    let mut writer = fs.create_file(target)?;
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut total = 0;

    loop {
        let n = stream
            .read(&mut buffer)
            .await
            .map_err(TransferError::TransferFailed)?;
        if n == 0 {
            break;
        }
        (writer, buffer) = run_blocking(move || {
            writer.write_all(&buffer[..n])?;
            Ok((writer, buffer))
        })
        .await?;
        total += n;
    }
    run_blocking(move || writer.flush()).await?;

    info!("Received {} ({} bytes)", target.display(), total);
    Ok(total)
}

async fn run_blocking<T, Op>(op: Op) -> Result<T, StorageError>
where
    T: Send + 'static,
    Op: FnOnce() -> io::Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(op).await {
        Ok(result) => result.map_err(StorageError::from),
        Err(e) => Err(StorageError::IoError(io::Error::other(e))),
    }
}

/// Closes the data connection. Failures are logged, never reported.
pub async fn close_data_stream<S: AsyncWrite + Unpin>(stream: &mut S) {
    if let Err(e) = stream.shutdown().await {
        warn!("Failed to close data connection cleanly: {}", e);
    }
}
