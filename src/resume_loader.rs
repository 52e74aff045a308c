use std::fs;
use std::io;
use std::path::Path;

use log::info;

/// Reads the plain-text resume into memory. UTF-8 only.
pub fn load_resume<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let text = fs::read_to_string(path.as_ref())?;
    info!("Loaded resume ({} bytes) from {:?}", text.len(), path.as_ref());
    Ok(text)
}
