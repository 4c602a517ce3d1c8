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

use std::{fs::File, io::{BufWriter,ErrorKind,Write}, path::{Path,PathBuf}};
use futures::{stream,StreamExt};
use image::{ImageReader, codecs::jpeg::JpegEncoder};
use reqwest::Client;
use tokio::{fs, task};
use tracing::{debug,info,error};

use crate::{
    Coordinates, CropConfig, CropJob, ExtractParameters,
    counters::{CounterStore, CROP_IMAGES, DOWNLOADED_IMAGES},
    download::{create_client, download_file},
    errors::*
};

/// the local files of a single crop job. This is resolved once per job and then used for all
/// processing steps so that we never read from a different file than we downloaded to
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct CropPaths {
    pub download: PathBuf,
    pub crop: PathBuf,
}

impl CropPaths {
    pub fn new (dir: impl AsRef<Path>, download_idx: u64, crop_idx: u64)->Self {
        let dir = dir.as_ref();
        CropPaths {
            download: dir.join( format!("image-{download_idx}.jpg")),
            crop: dir.join( format!("crop-{crop_idx}.jpeg"))
        }
    }
}

/// what we report back for a successful crop job
#[derive(Debug,Clone)]
pub struct CropOutput {
    pub paths: CropPaths,
    pub image_size: (u32,u32),
    pub crop_size: (u32,u32),
    pub downloaded_bytes: u64,
}

/// the context for running crop jobs, which consists of the HTTP client, where to store the images and
/// the counters that are used to name the files
pub struct Cropper {
    client: Client,
    output_dir: PathBuf,
    jpeg_quality: u8,
    counters: CounterStore,
}

impl Cropper {
    pub fn new (config: &CropConfig)->Result<Self> {
        let client = create_client( config.timeout())?;
        let output_dir = config.resolve_output_dir()?;
        Ok( Cropper::with_client( client, output_dir, config.jpeg_quality) )
    }

    pub fn with_client (client: Client, output_dir: impl Into<PathBuf>, jpeg_quality: u8)->Self {
        Cropper {
            client,
            output_dir: output_dir.into(),
            jpeg_quality: jpeg_quality.clamp( 1, 100),
            counters: CounterStore::for_crop_pipeline()
        }
    }

    pub fn counters (&self)->&CounterStore { &self.counters }

    pub fn output_dir (&self)->&Path { &self.output_dir }

    /// the paths the next sequential job would use, based on current counter values
    pub fn next_paths (&self)->Result<CropPaths> {
        Ok( CropPaths::new( &self.output_dir, self.counters.get( DOWNLOADED_IMAGES)?, self.counters.get( CROP_IMAGES)?) )
    }

    /// create the output dir if it does not exist yet. This does not create missing parent directories.
    /// Another task creating the dir at the same time is not an error
    pub async fn ensure_output_dir (&self)->Result<()> {
        match fs::create_dir( &self.output_dir).await {
            Ok(()) => {
                info!("created output dir {:?}", self.output_dir);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if fs::metadata( &self.output_dir).await?.is_dir() { Ok(()) } else { Err(e.into()) }
            }
            Err(e) => Err(e.into())
        }
    }

    /// download the image from `url` and crop the region given by `coordinates` into a JPEG file.
    /// If no `paths` are provided they are computed from the current counter values.
    /// Errors of all stages (fetch, metadata, validation, extraction) are logged and returned.
    /// The download counter is incremented after a successful download, the crop counter after the
    /// crop file was written
    pub async fn crop_image (&self, url: &str, coordinates: &Coordinates, paths: Option<CropPaths>)->Result<CropOutput> {
        let res = self.process( url, coordinates, paths).await;
        if let Err(e) = &res {
            error!("{} stage of crop image {} failed: {}", e.stage(), url, e);
        }
        res
    }

    async fn process (&self, url: &str, coordinates: &Coordinates, paths: Option<CropPaths>)->Result<CropOutput> {
        self.ensure_output_dir().await?;

        let params = coordinates.extract_parameters();
        let paths = match paths {
            Some(paths) => paths,
            None => self.next_paths()?
        };
        debug!("crop {} {:?} using {:?}", url, params, paths);

        let downloaded_bytes = download_file( &self.client, url, &paths.download, &self.counters).await?;

        let image_size = read_dimensions( &paths.download).await?;
        debug!("image size of {:?}: {}x{}", paths.download, image_size.0, image_size.1);

        if !params.fits_size( image_size.0, image_size.1) {
            return Err( validation_error( format!("{}x{} extract does not fit into {}x{} image {}",
                                                  params.width, params.height, image_size.0, image_size.1, url)))
        }

        let crop_size = extract_region( &paths.download, &paths.crop, params, self.jpeg_quality).await?;
        let n = self.counters.inc( CROP_IMAGES)?;

        info!("cropped {}x{} region of {} to {:?}", crop_size.0, crop_size.1, url, paths.crop);
        debug!("cropped images: {}", n);

        Ok( CropOutput { paths, image_size, crop_size, downloaded_bytes } )
    }

    /// process jobs one at a time in input order. The first failing job terminates the sequence and
    /// its error is returned, i.e. the remaining jobs are not processed
    pub async fn crop_images (&self, jobs: &[CropJob])->Result<Vec<CropOutput>> {
        let mut outputs = Vec::with_capacity( jobs.len());
        for job in jobs {
            outputs.push( self.crop_image( &job.url, &job.coordinates, None).await?);
        }
        Ok(outputs)
    }

    /// process up to `max_concurrent` jobs at a time, each with its own result (in input order).
    /// File names are derived from the counter values at the start of the batch plus the job index,
    /// which are the same names sequential processing produces if all jobs succeed.
    /// Once the batch is done both counters are advanced past all batch indices (including those of
    /// failed jobs) so that subsequent jobs of this cropper cannot overwrite batch outputs
    pub async fn crop_images_concurrent (&self, jobs: &[CropJob], max_concurrent: usize)->Result<Vec<Result<CropOutput>>> {
        let download_base = self.counters.get( DOWNLOADED_IMAGES)?;
        let crop_base = self.counters.get( CROP_IMAGES)?;

        let results = stream::iter( jobs.iter().enumerate())
            .map( |(i,job)| {
                let paths = CropPaths::new( &self.output_dir, download_base + i as u64, crop_base + i as u64);
                self.crop_image( &job.url, &job.coordinates, Some(paths))
            })
            .buffered( max_concurrent.max(1))
            .collect::<Vec<_>>()
            .await;

        let n_jobs = jobs.len() as u64;
        self.counters.advance_to( DOWNLOADED_IMAGES, download_base + n_jobs)?;
        self.counters.advance_to( CROP_IMAGES, crop_base + n_jobs)?;

        Ok(results)
    }
}

/// get image size from header without decoding pixel data. All failures are reported as `MetadataError`
pub async fn read_dimensions (path: &Path)->Result<(u32,u32)> {
    let path = path.to_path_buf();

    task::spawn_blocking( move || -> Result<(u32,u32)> {
        ImageReader::open( &path)
            .map_err( |e| metadata_error( format!("failed to open {path:?}: {e}")))?
            .with_guessed_format()
            .map_err( |e| metadata_error( format!("failed to read {path:?}: {e}")))?
            .into_dimensions()
            .map_err( |e| metadata_error( format!("failed to read image header of {path:?}: {e}")))
    }).await.map_err( |e| op_failed(e))?
}

/// crop `params` region out of `src` image and store as JPEG in `tgt`, returning the crop size.
/// Runs on the blocking pool since it decodes the full image
async fn extract_region (src: &Path, tgt: &Path, params: ExtractParameters, quality: u8)->Result<(u32,u32)> {
    let src = src.to_path_buf();
    let tgt = tgt.to_path_buf();

    task::spawn_blocking( move || -> Result<(u32,u32)> {
        let img = ImageReader::open( &src)
            .map_err( |e| extraction_error( format!("failed to open {src:?}: {e}")))?
            .with_guessed_format()
            .map_err( |e| extraction_error( format!("failed to read {src:?}: {e}")))?
            .decode()
            .map_err( |e| extraction_error( format!("failed to decode {src:?}: {e}")))?;

        let (x,y,width,height) = params.region_within( img.width(), img.height())?;
        let cropped = img.crop_imm( x, y, width, height).to_rgb8(); // JPEG has no alpha

        let file = File::create( &tgt).map_err( |e| extraction_error( format!("failed to create {tgt:?}: {e}")))?;
        let mut writer = BufWriter::new( file);
        let mut encoder = JpegEncoder::new_with_quality( &mut writer, quality);
        encoder.encode_image( &cropped).map_err( |e| extraction_error( format!("failed to encode {tgt:?}: {e}")))?;
        writer.flush().map_err( |e| extraction_error( format!("failed to write {tgt:?}: {e}")))?;

        Ok( (cropped.width(), cropped.height()) )
    }).await.map_err( |e| extraction_error(e))?
}
