//! `@import` loading through the resource loader

use cssgen_css::{CssError, LoadedSheet, StylesheetLoader};
use cssgen_net::ResourceLoader;

/// Blocking `StylesheetLoader` over a `ResourceLoader`
pub struct NetStylesheetLoader<'a> {
    loader: &'a ResourceLoader,
    /// URL of the top-level sheet, used when an import has no importer base
    base: Option<String>,
}

impl<'a> NetStylesheetLoader<'a> {
    pub fn new(loader: &'a ResourceLoader) -> Self {
        Self { loader, base: None }
    }

    pub fn with_base(mut self, base: Option<&str>) -> Self {
        self.base = base.map(str::to_string);
        self
    }
}

impl StylesheetLoader for NetStylesheetLoader<'_> {
    fn load(&self, url: &str, base: Option<&str>) -> Result<LoadedSheet, CssError> {
        let base = base.or(self.base.as_deref());
        let (resolved, css) = smol::block_on(self.loader.fetch_text(url, base)).map_err(|e| {
            CssError::Import {
                url: url.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(LoadedSheet {
            url: resolved.to_string(),
            css,
        })
    }
}
