use super::config::AcceleratorConfig;
use super::progress::ProgressReporter;
use std::error::Error as StdError;
use thiserror::Error;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AcceleratorError {
    #[error("No compute platforms are available")]
    NoPlatforms,
    #[error("Platform index {index} is out of range ({available} available)")]
    PlatformNotFound { index: usize, available: usize },
    #[error("Platform '{platform}' exposes no devices")]
    NoDevices { platform: String },
    #[error("Device index {index} is out of range ({available} available)")]
    DeviceNotFound { index: usize, available: usize },
    #[error("Work-group size must be at least 1")]
    InvalidWorkGroupSize,
    #[error("Failed to initialize device: {0}")]
    DeviceInit(String),
    #[error("Failed to build kernel: {0}")]
    KernelBuild(String),
    #[error("Output buffer holds {actual} slots but the kernel has {expected} work items")]
    OutputSize { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum DispatchError<E: StdError + 'static> {
    #[error(transparent)]
    Launch(#[from] AcceleratorError),
    #[error("Work item {work_item} failed: {source}")]
    Kernel {
        work_item: usize,
        #[source]
        source: E,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub compute_units: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub name: String,
    pub vendor: String,
    pub devices: Vec<DeviceInfo>,
}

/// A data-parallel program with one independent work item per output slot.
pub trait Kernel: Sync {
    type Error: StdError + Send + Sync + 'static;

    fn work_items(&self) -> usize;

    /// Computes the value of slot `work_item`. Must not depend on any other slot.
    fn execute(&self, work_item: usize) -> Result<f64, Self::Error>;
}

pub trait Accelerator: Sync {
    fn platform(&self) -> &PlatformInfo;
    fn device(&self) -> &DeviceInfo;
    fn work_group_size(&self) -> usize;

    /// Runs every work item of `kernel`, writing item `p` into `output[p]`.
    ///
    /// Blocks until all groups finished. `output.len()` must equal
    /// `kernel.work_items()`. The first failing item aborts the remaining groups.
    fn dispatch<K: Kernel>(
        &self,
        kernel: &K,
        output: &mut [f64],
        reporter: &ProgressReporter,
    ) -> Result<(), DispatchError<K::Error>>;
}

/// Enumerates the compute platforms visible to this process.
pub fn platforms() -> Vec<PlatformInfo> {
    vec![host_platform()]
}

fn host_platform() -> PlatformInfo {
    #[cfg(feature = "parallel")]
    let device = DeviceInfo {
        name: "CPU thread pool".to_string(),
        compute_units: std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
    };
    #[cfg(not(feature = "parallel"))]
    let device = DeviceInfo {
        name: "CPU (sequential)".to_string(),
        compute_units: 1,
    };

    PlatformInfo {
        name: "Host".to_string(),
        vendor: "elec14".to_string(),
        devices: vec![device],
    }
}

/// Runs kernels on the host CPU, one work group per pool task.
#[derive(Debug)]
pub struct HostAccelerator {
    platform: PlatformInfo,
    device: DeviceInfo,
    work_group_size: usize,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl HostAccelerator {
    pub fn select(config: &AcceleratorConfig) -> Result<Self, AcceleratorError> {
        Self::select_from(platforms(), config)
    }

    pub fn select_from(
        platforms: Vec<PlatformInfo>,
        config: &AcceleratorConfig,
    ) -> Result<Self, AcceleratorError> {
        if platforms.is_empty() {
            return Err(AcceleratorError::NoPlatforms);
        }
        let available = platforms.len();
        let platform = platforms
            .into_iter()
            .nth(config.platform_index)
            .ok_or(AcceleratorError::PlatformNotFound {
                index: config.platform_index,
                available,
            })?;
        if platform.devices.is_empty() {
            return Err(AcceleratorError::NoDevices {
                platform: platform.name,
            });
        }
        let device = platform
            .devices
            .get(config.device_index)
            .cloned()
            .ok_or(AcceleratorError::DeviceNotFound {
                index: config.device_index,
                available: platform.devices.len(),
            })?;
        if config.work_group_size == 0 {
            return Err(AcceleratorError::InvalidWorkGroupSize);
        }

        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads.unwrap_or(0))
            .thread_name(|i| format!("elec14-worker-{i}"))
            .build()
            .map_err(|e| AcceleratorError::DeviceInit(e.to_string()))?;

        debug!(
            platform = %platform.name,
            device = %device.name,
            work_group_size = config.work_group_size,
            "Selected accelerator device."
        );

        Ok(Self {
            platform,
            device,
            work_group_size: config.work_group_size,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}

impl Accelerator for HostAccelerator {
    fn platform(&self) -> &PlatformInfo {
        &self.platform
    }

    fn device(&self) -> &DeviceInfo {
        &self.device
    }

    fn work_group_size(&self) -> usize {
        self.work_group_size
    }

    fn dispatch<K: Kernel>(
        &self,
        kernel: &K,
        output: &mut [f64],
        reporter: &ProgressReporter,
    ) -> Result<(), DispatchError<K::Error>> {
        let expected = kernel.work_items();
        if output.len() != expected {
            return Err(AcceleratorError::OutputSize {
                expected,
                actual: output.len(),
            }
            .into());
        }

        let group = self.work_group_size;
        let groups = expected.div_ceil(group);
        debug!(work_items = expected, groups, "Dispatching kernel.");
        reporter.start_task(groups);

        let run_group = |(index, chunk): (usize, &mut [f64])| -> Result<(), DispatchError<K::Error>> {
            let base = index * group;
            for (offset, slot) in chunk.iter_mut().enumerate() {
                let work_item = base + offset;
                *slot = kernel
                    .execute(work_item)
                    .map_err(|source| DispatchError::Kernel { work_item, source })?;
            }
            reporter.advance(1);
            Ok(())
        };

        #[cfg(feature = "parallel")]
        let result = self.pool.install(|| {
            output
                .par_chunks_mut(group)
                .enumerate()
                .try_for_each(run_group)
        });

        #[cfg(not(feature = "parallel"))]
        let result = output.chunks_mut(group).enumerate().try_for_each(run_group);

        reporter.finish_task();
        result
    }
}
