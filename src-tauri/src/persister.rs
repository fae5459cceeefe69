use std::fs;
use std::path::Path;

use chrono::{DateTime, TimeZone};
use image::ImageFormat;

use crate::dib::decode_dib;
use crate::error::PersistError;

/// `screenshot_YYYYMMDD_HHMMSS.png`
pub fn screenshot_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("screenshot_{}.png", at.format("%Y%m%d_%H%M%S"))
}

/// Writes clipboard bitmaps into a directory as timestamped PNG files and
/// returns the file name.
///
/// Names have one-second resolution: a second save within the same second
/// replaces the first file.
pub struct ImagePersister;

impl ImagePersister {
    pub fn save<Tz: TimeZone>(
        dib: &[u8],
        destination: &Path,
        at: &DateTime<Tz>,
    ) -> Result<String, PersistError>
    where
        Tz::Offset: std::fmt::Display,
    {
        if !destination.exists() {
            fs::create_dir_all(destination).map_err(|source| PersistError::CreateDir {
                path: destination.to_path_buf(),
                source,
            })?;
            log::info!("Created screenshot directory {}", destination.display());
        }

        let image = decode_dib(dib)?;

        let file_name = screenshot_file_name(at);
        let path = destination.join(&file_name);
        log::debug!(
            "Writing {}x{} image to {}",
            image.width(),
            image.height(),
            path.display()
        );

        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| PersistError::Encode {
                path: path.clone(),
                source,
            })?;

        log::info!("Saved screenshot to {}", path.display());
        Ok(file_name)
    }
}
