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

//! download images and crop regions out of them. Without arguments this runs the built-in job list
//! and stores images in `images/` next to the executable

use std::path::PathBuf;
use tokio;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use odin_crop::{load_config, run_driver, CropConfig, CropRun, Cropper};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "download images and crop rectangular regions out of them")]
pub struct Args {
    /// pathname of CropConfig RON file
    #[arg(short,long)]
    pub config: Option<PathBuf>,

    /// pathname of CropRun RON file (built-in jobs if not set)
    #[arg(short,long)]
    pub jobs: Option<PathBuf>,

    /// directory to store downloaded and cropped images in (overrides config)
    #[arg(short,long)]
    pub output_dir: Option<PathBuf>,

    /// max number of concurrently processed batch jobs (overrides config)
    #[arg(short='n',long)]
    pub max_concurrent: Option<usize>,
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))  // use RUST_LOG to set max level
        .init();

    let args = Args::parse();

    let mut config: CropConfig = match &args.config {
        Some(path) => load_config( path)?,
        None => CropConfig::default()
    };
    if let Some(dir) = &args.output_dir { config.output_dir = Some(dir.clone()) }
    if let Some(n) = args.max_concurrent { config.max_concurrent = n }

    let run: CropRun = match &args.jobs {
        Some(path) => load_config( path)?,
        None => CropRun::default()
    };

    let cropper = Cropper::new( &config)?;
    println!("processing {} crop jobs, output to {:?}", run.len(), cropper.output_dir());

    let summary = run_driver( &cropper, &run, config.max_concurrent).await;
    for (i,outcome) in summary.outcomes.iter().enumerate() {
        match outcome {
            Ok(output) => println!("{i}: {:?} ({}x{})", output.paths.crop, output.crop_size.0, output.crop_size.1),
            Err(e) => println!("{i}: failed in {} stage: {e}", e.stage())
        }
    }

    Ok(())
}
