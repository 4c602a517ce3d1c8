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

use std::{collections::HashMap, sync::atomic::{AtomicU64,Ordering}};
use crate::errors::{OdinCropError,Result};

pub const DOWNLOADED_IMAGES: &'static str = "downloadedImages";
pub const CROP_IMAGES: &'static str = "cropImages";

/// a fixed set of named, non-negative counters
///
/// The set of names is determined at construction time - there is no implicit counter creation,
/// `get`, `set` and `inc` of a name that was not registered fail with `OdinCropError::UnknownCounter`
/// (so that we don't mask typos).
/// All value updates are atomic so a CounterStore can be shared between concurrently running
/// crop jobs without losing increments. Instances are owned by their user (e.g. a `Cropper`) so
/// that each context starts from zero.
#[derive(Debug)]
pub struct CounterStore {
    counters: HashMap<String,AtomicU64>
}

impl CounterStore {
    pub fn new (names: &[&str])->Self {
        let counters = names.iter().map( |name| (name.to_string(), AtomicU64::new(0))).collect();
        CounterStore { counters }
    }

    /// the counters used by the crop pipeline
    pub fn for_crop_pipeline ()->Self {
        CounterStore::new( &[DOWNLOADED_IMAGES, CROP_IMAGES])
    }

    fn counter (&self, name: &str)->Result<&AtomicU64> {
        self.counters.get(name).ok_or_else( || OdinCropError::UnknownCounter(name.to_string()))
    }

    pub fn contains (&self, name: &str)->bool {
        self.counters.contains_key(name)
    }

    pub fn get (&self, name: &str)->Result<u64> {
        Ok( self.counter(name)?.load(Ordering::SeqCst) )
    }

    pub fn set (&self, name: &str, value: u64)->Result<()> {
        self.counter(name)?.store( value, Ordering::SeqCst);
        Ok(())
    }

    /// increment counter by one and return the new value
    pub fn inc (&self, name: &str)->Result<u64> {
        Ok( self.counter(name)?.fetch_add( 1, Ordering::SeqCst) + 1 )
    }

    /// raise counter to `value` if it is lower, return the resulting value
    pub fn advance_to (&self, name: &str, value: u64)->Result<u64> {
        let prev = self.counter(name)?.fetch_max( value, Ordering::SeqCst);
        Ok( prev.max(value) )
    }

    /// set all counters back to zero
    pub fn reset (&self) {
        for c in self.counters.values() {
            c.store( 0, Ordering::SeqCst);
        }
    }
}

impl Default for CounterStore {
    fn default()->Self { CounterStore::for_crop_pipeline() }
}
