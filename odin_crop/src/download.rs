/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! retrieval of source images over HTTP(S)

use std::{path::Path, time::Duration};
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tokio::{fs::{self,File}, io::AsyncWriteExt};
use tracing::{debug,info,warn};

use crate::counters::{CounterStore, DOWNLOADED_IMAGES};
use crate::errors::{OdinCropError, Result};

/// the causes of a failed download. These are always reported as `OdinCropError::FetchError`
#[derive(Error,Debug)]
pub enum DownloadError {
    #[error("http error: {0}")]
    HttpError( #[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFoundError(String),

    #[error("response status {1} for {0}")]
    StatusError(String, StatusCode),

    #[error("IO error: {0}")]
    IOError( #[from] std::io::Error),
}

/// create the HTTP client used for image downloads. We only set a timeout if one is configured,
/// otherwise we use the reqwest defaults (which includes the redirect policy)
pub fn create_client (timeout: Option<Duration>)->Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| OdinCropError::ClientError(e.to_string()))
}

/// fetch `url` and store the response body in `path`, overwriting existing files.
/// The `DOWNLOADED_IMAGES` counter of `counters` is only incremented after the file was completely written.
/// Returns the number of bytes written
pub async fn download_file (client: &Client, url: &str, path: impl AsRef<Path>, counters: &CounterStore)->Result<u64> {
    let path = path.as_ref();

    let len = download_url( client, url, path).await?;
    let n = counters.inc( DOWNLOADED_IMAGES)?;

    info!("downloaded {} ({} bytes) to {:?}", url, len, path);
    debug!("downloaded images: {}", n);
    Ok(len)
}

/// retrieve in chunks to support large files. Note the target file is only created once we have
/// a success response status, and it is removed again if the transfer does not complete
async fn download_url (client: &Client, url: &str, path: &Path)->std::result::Result<u64,DownloadError> {
    let response = client.get(url).send().await?;

    match response.status() {
        status if status.is_success() => {
            let res = write_body( response, path).await;
            if let Err(e) = &res {
                warn!("incomplete download of {}: {}", url, e);
                let _ = fs::remove_file(path).await; // we are already reporting the transfer error
            }
            res
        }
        StatusCode::NOT_FOUND => {
            Err( DownloadError::NotFoundError( url.to_string()))
        }
        other => {
            Err( DownloadError::StatusError( url.to_string(), other))
        }
    }
}

async fn write_body (mut response: Response, path: &Path)->std::result::Result<u64,DownloadError> {
    let mut file = File::create(path).await?;
    let mut len: u64 = 0;

    while let Some(chunk) = response.chunk().await? {
        len += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok(len)
}
