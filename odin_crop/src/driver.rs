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

use serde::{Deserialize,Serialize};
use tracing::{info,warn,error};

use crate::{Coordinates, CropJob, Cropper, CropOutput, errors::{Result,op_failed}};

/// the jobs of a crop run: an optional single job that is processed first, followed by a batch
#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct CropRun {
    pub single: Option<CropJob>,
    pub batch: Vec<CropJob>,
}

impl Default for CropRun {
    fn default()->Self {
        let coordinates = Coordinates::new( 100, 300, 50, 300);

        CropRun {
            single: Some( CropJob::new(
                "http://www.usefulcraft.com/wp-content/uploads/2019/12/4knaruto-17-scaled.jpg",
                Coordinates::new( 100, 200, 100, 200)
            )),
            batch: vec![
                CropJob::new( "https://www.modern-notoriety.com/wp-content/uploads/2019/03/coa.jpg", coordinates),
                CropJob::new( "https://getwallpapers.com/wallpaper/full/a/f/6/1400334-most-popular-naruto-background-1920x1080.jpg", coordinates),
                CropJob::new( "https://www.testedich.de/quiz28/picture/pic_1288807560_1.jpg", coordinates),
            ]
        }
    }
}

impl CropRun {
    pub fn len (&self)->usize {
        self.batch.len() + if self.single.is_some() { 1 } else { 0 }
    }
}

/// per-job results of a crop run, in the order in which jobs were specified
#[derive(Debug)]
pub struct RunSummary {
    pub outcomes: Vec<Result<CropOutput>>
}

impl RunSummary {
    pub fn succeeded (&self)->usize {
        self.outcomes.iter().filter( |r| r.is_ok()).count()
    }

    pub fn failed (&self)->usize {
        self.outcomes.iter().filter( |r| r.is_err()).count()
    }
}

/// process all jobs of `run` with the given cropper. Each job is guarded separately, i.e. a failing
/// job does not keep subsequent jobs from being processed. Batch jobs are processed concurrently if
/// `max_concurrent` > 1
pub async fn run_driver (cropper: &Cropper, run: &CropRun, max_concurrent: usize)->RunSummary {
    let mut outcomes: Vec<Result<CropOutput>> = Vec::with_capacity( run.len());

    if let Some(job) = &run.single {
        outcomes.push( cropper.crop_image( &job.url, &job.coordinates, None).await);
    }

    if max_concurrent > 1 {
        match cropper.crop_images_concurrent( &run.batch, max_concurrent).await {
            Ok(results) => outcomes.extend( results),
            Err(e) => {
                // keep one outcome per job
                error!("crop batch failed: {}", e);
                outcomes.extend( run.batch.iter().map( |job| Err( op_failed( format!("batch not processed: {} ({})", job.url, e)))));
            }
        }
    } else {
        for job in &run.batch {
            outcomes.push( cropper.crop_image( &job.url, &job.coordinates, None).await);
        }
    }

    let summary = RunSummary { outcomes };
    if summary.failed() > 0 {
        warn!("{} of {} crop jobs failed", summary.failed(), summary.outcomes.len());
    }
    info!("{} crop jobs succeeded", summary.succeeded());

    summary
}
