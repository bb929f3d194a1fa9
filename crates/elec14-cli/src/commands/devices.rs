use crate::error::Result;
use elec14::engine::accelerator::{self, PlatformInfo};
use std::fmt::Write;
use tracing::info;

pub fn run() -> Result<()> {
    let platforms = accelerator::platforms();
    info!(platforms = platforms.len(), "Enumerated compute platforms.");
    print!("{}", format_platforms(&platforms));
    Ok(())
}

fn format_platforms(platforms: &[PlatformInfo]) -> String {
    if platforms.is_empty() {
        return "No compute platforms found.\n".to_string();
    }
    let mut out = String::new();
    for (p, platform) in platforms.iter().enumerate() {
        let _ = writeln!(out, "Platform {}: {} ({})", p, platform.name, platform.vendor);
        if platform.devices.is_empty() {
            let _ = writeln!(out, "  (no devices)");
        }
        for (d, device) in platform.devices.iter().enumerate() {
            let _ = writeln!(
                out,
                "  Device {}: {} [{} compute units]",
                d, device.name, device.compute_units
            );
        }
    }
    out
}
