use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

static PARTIAL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Failure while saving a stream, split by which side failed.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("failed reading source stream: {0}")]
    Read(std::io::Error),

    #[error(transparent)]
    Write(std::io::Error),
}

fn partial_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = PARTIAL_COUNTER.fetch_add(1, Ordering::Relaxed);
    dest.with_file_name(format!(".{}.{}-{}.partial", name, std::process::id(), suffix))
}

async fn copy_into<R>(reader: &mut R, file: &mut File) -> Result<u64, SaveError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;
    loop {
        let n = reader.read(&mut buf).await.map_err(SaveError::Read)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).await.map_err(SaveError::Write)?;
        written += n as u64;
    }
    file.flush().await.map_err(SaveError::Write)?;
    file.sync_all().await.map_err(SaveError::Write)?;
    Ok(written)
}

/// Write everything `reader` yields to `dest`, replacing any existing file.
///
/// Bytes land in a sibling temporary file that is renamed over `dest` once
/// the stream is complete, so a failed save leaves `dest` untouched.
/// Returns the number of bytes written.
pub async fn save_to<R>(reader: &mut R, dest: &Path) -> Result<u64, SaveError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let partial = partial_path(dest);
    let mut file = File::create(&partial).await.map_err(SaveError::Write)?;

    let copied = copy_into(reader, &mut file).await;
    drop(file);

    match copied {
        Ok(written) => {
            if let Err(e) = fs::rename(&partial, dest).await {
                let _ = fs::remove_file(&partial).await;
                return Err(SaveError::Write(e));
            }
            Ok(written)
        }
        Err(err) => {
            let _ = fs::remove_file(&partial).await;
            Err(err)
        }
    }
}
