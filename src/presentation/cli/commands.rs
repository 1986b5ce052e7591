//! CLI definition using clap

use clap::Parser;
use std::path::PathBuf;

/// ext4-recon - list the root directory of a raw ext4 image
///
/// Walks the on-disk metadata read-only and prints one `<name> <inode>`
/// line per root directory entry. Set RUST_LOG=debug to trace the walk.
#[derive(Parser, Debug)]
#[command(name = "ext4-recon")]
#[command(version)]
#[command(about = "List the root directory of a raw ext4 image", long_about = None)]
pub struct Cli {
    /// Path to the device or image file (e.g., /dev/sdb1, disk.img)
    pub image: PathBuf,
}
