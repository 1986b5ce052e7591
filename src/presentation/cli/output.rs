//! Listing output

use crate::domain::entities::DirectoryEntry;
use std::io::{self, Write};

/// Writes one `<name> <inode>` line per entry, in enumeration order
pub fn write_listing<W: Write>(out: &mut W, entries: &[DirectoryEntry]) -> io::Result<()> {
    for entry in entries {
        writeln!(out, "{}", entry)?;
    }
    out.flush()
}
