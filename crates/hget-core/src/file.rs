//! Local-file getter for `file://` locators.

use crate::error::GetterError;
use crate::getter::{Buffer, Getter};
use crate::options::{apply_options, GetterOption, Options};
use url::Url;

/// Reads a local file into memory. Transport options are accepted and ignored.
#[derive(Debug, Default)]
pub struct FileGetter {
    opts: Options,
}

impl FileGetter {
    pub fn new(options: &[GetterOption]) -> Result<Self, GetterError> {
        Ok(Self {
            opts: apply_options(&Options::default(), options)?,
        })
    }

    pub fn provide(options: &[GetterOption]) -> Result<Box<dyn Getter>, GetterError> {
        Ok(Box::new(FileGetter::new(options)?))
    }
}

impl Getter for FileGetter {
    fn get(&self, href: &str, options: &[GetterOption]) -> Result<Buffer, GetterError> {
        let opts = apply_options(&self.opts, options)?;
        let raw = if href.is_empty() { opts.locator() } else { href };
        let url = Url::parse(raw).map_err(|e| GetterError::configuration(raw, e.to_string()))?;
        if url.scheme() != "file" {
            return Err(GetterError::configuration(raw, "not a file:// locator"));
        }
        let path = url
            .to_file_path()
            .map_err(|()| GetterError::configuration(raw, "locator has no local path"))?;
        let data = std::fs::read(&path).map_err(|e| {
            GetterError::configuration(raw, format!("cannot read {}: {}", path.display(), e))
        })?;
        tracing::debug!("read {} bytes from {}", data.len(), path.display());
        Ok(Buffer::new(data))
    }
}
