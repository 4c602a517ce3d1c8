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

use thiserror::Error;
use crate::download::DownloadError;

pub type Result<T> = std::result::Result<T, OdinCropError>;

#[derive(Error,Debug)]
pub enum OdinCropError {
    /// anything that went wrong while retrieving the source image, including writing the local copy
    #[error("download failed: {0}")]
    FetchError( #[from] DownloadError),

    #[error("image metadata error: {0}")]
    MetadataError(String),

    /// requested crop size is larger than the source image
    #[error("crop region exceeds image bounds: {0}")]
    ValidationError(String),

    /// crop size fits but the region is not located inside the image
    #[error("extract out of range: {0}")]
    ExtractOutOfRange(String),

    #[error("extraction failed: {0}")]
    ExtractionError(String),

    #[error("unknown counter: {0}")]
    UnknownCounter(String),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config error {0}")]
    ConfigError( #[from] ron::error::SpannedError),

    #[error("http client error {0}")]
    ClientError(String),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String)
}

impl OdinCropError {
    /// the pipeline stage this error originated from, used as log prefix
    pub fn stage (&self)->&'static str {
        match self {
            OdinCropError::FetchError(_) => "fetch",
            OdinCropError::MetadataError(_) => "metadata",
            OdinCropError::ValidationError(_) => "validation",
            OdinCropError::ExtractOutOfRange(_) | OdinCropError::ExtractionError(_) => "extraction",
            OdinCropError::UnknownCounter(_) => "counter",
            OdinCropError::IOError(_) => "io",
            OdinCropError::ConfigError(_) => "config",
            OdinCropError::ClientError(_) => "client",
            OdinCropError::OpFailed(_) => "op"
        }
    }

    pub fn is_fetch_error (&self)->bool {
        matches!( self, OdinCropError::FetchError(_))
    }

    pub fn is_validation_error (&self)->bool {
        matches!( self, OdinCropError::ValidationError(_))
    }

    /// both out-of-range extracts and failed encode/write count as extraction errors
    pub fn is_extraction_error (&self)->bool {
        matches!( self, OdinCropError::ExtractOutOfRange(_) | OdinCropError::ExtractionError(_))
    }
}

pub fn op_failed (msg: impl ToString)->OdinCropError {
    OdinCropError::OpFailed(msg.to_string())
}

pub fn validation_error (msg: impl ToString)->OdinCropError {
    OdinCropError::ValidationError(msg.to_string())
}

pub fn extraction_error (msg: impl ToString)->OdinCropError {
    OdinCropError::ExtractionError(msg.to_string())
}

pub fn metadata_error (msg: impl ToString)->OdinCropError {
    OdinCropError::MetadataError(msg.to_string())
}
