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

#![doc = include_str!("../doc/odin_crop.md")]

use std::{env, path::{Path,PathBuf}, time::Duration};
use serde::{Deserialize,Serialize};

mod errors;
pub use errors::*;

pub mod counters;
pub use counters::{CounterStore, DOWNLOADED_IMAGES, CROP_IMAGES};

pub mod download;
pub use download::{DownloadError, create_client, download_file};

mod crop;
pub use crop::*;

mod driver;
pub use driver::*;

/// name of the output directory (relative to the executable) if none is configured
pub const DEFAULT_OUTPUT_DIR: &'static str = "images";

/// crop rectangle in source image pixel coordinates. We expect `x_start < x_end` and `y_start < y_end`
/// but do not enforce it - degenerated regions are caught when we extract the region
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub struct Coordinates {
    pub x_start: i64,
    pub x_end: i64,
    pub y_start: i64,
    pub y_end: i64,
}

impl Coordinates {
    pub fn new (x_start: i64, x_end: i64, y_start: i64, y_end: i64)->Self {
        Coordinates { x_start, x_end, y_start, y_end }
    }

    pub fn extract_parameters (&self)->ExtractParameters {
        ExtractParameters::from( self)
    }
}

/// origin/size form of `Coordinates`
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct ExtractParameters {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl From<&Coordinates> for ExtractParameters {
    fn from (c: &Coordinates)->Self {
        ExtractParameters {
            left: c.x_start,
            top: c.y_start,
            width: c.x_end.saturating_sub( c.x_start),
            height: c.y_end.saturating_sub( c.y_start)
        }
    }
}

impl ExtractParameters {
    /// check if the extract size does not exceed the given image size. Note this does not check the origin
    pub fn fits_size (&self, img_width: u32, img_height: u32)->bool {
        img_width as i64 >= self.width && img_height as i64 >= self.height
    }

    /// return (x,y,width,height) of a non-empty region that is fully inside an image of the given size
    pub fn region_within (&self, img_width: u32, img_height: u32)->Result<(u32,u32,u32,u32)> {
        let (w,h) = (img_width as i64, img_height as i64);

        if self.left < 0 || self.top < 0 || self.width <= 0 || self.height <= 0
            || self.left.saturating_add( self.width) > w || self.top.saturating_add( self.height) > h {
            Err( OdinCropError::ExtractOutOfRange( format!("{self:?} not inside {img_width}x{img_height} image")))
        } else {
            Ok( (self.left as u32, self.top as u32, self.width as u32, self.height as u32) )
        }
    }
}

/// a single source image URL with the region to crop from it
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct CropJob {
    pub url: String,
    pub coordinates: Coordinates,
}

impl CropJob {
    pub fn new (url: impl ToString, coordinates: Coordinates)->Self {
        CropJob { url: url.to_string(), coordinates }
    }
}

/// general crop pipeline parameters
#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// where to store downloaded and cropped images. If not set we use `images/` next to the executable
    pub output_dir: Option<PathBuf>,

    /// quality of encoded crop images (1..100)
    pub jpeg_quality: u8,

    /// optional request timeout. Without it a non-responding server stalls the pipeline
    pub timeout_secs: Option<u64>,

    /// max number of jobs processed at the same time. 1 means strictly sequential
    pub max_concurrent: usize,
}

impl Default for CropConfig {
    fn default()->Self {
        CropConfig {
            output_dir: None,
            jpeg_quality: 80,
            timeout_secs: None,
            max_concurrent: 1
        }
    }
}

impl CropConfig {
    pub fn timeout (&self)->Option<Duration> {
        self.timeout_secs.map( Duration::from_secs)
    }

    /// the configured output dir, or `images/` in the directory of the running executable
    pub fn resolve_output_dir (&self)->Result<PathBuf> {
        if let Some(dir) = &self.output_dir {
            Ok( dir.clone() )
        } else {
            default_output_dir()
        }
    }
}

pub fn default_output_dir ()->Result<PathBuf> {
    let exe = env::current_exe()?;
    let exe_dir = exe.parent().ok_or_else( || op_failed( format!("executable without parent dir: {exe:?}")))?;
    Ok( exe_dir.join( DEFAULT_OUTPUT_DIR) )
}

/// load a RON config file (`CropConfig`, `CropRun` etc.)
pub fn load_config<C> (path: impl AsRef<Path>)->Result<C> where C: for <'a> Deserialize<'a> {
    let data = std::fs::read( path.as_ref())?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}
