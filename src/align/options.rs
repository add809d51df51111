//! Alignment configuration.

use crate::{Error, Result};

/// Default alignment for stored entries.
pub const DEFAULT_ALIGNMENT: u32 = 4;

/// Default alignment for shared libraries (16 KiB pages).
pub const DEFAULT_SO_ALIGNMENT: u32 = 16384;

/// Largest accepted alignment.
///
/// Padding is always smaller than the alignment and must fit in the 16-bit
/// extra-field length of the local header.
pub const MAX_ALIGNMENT: u32 = 65536;

/// Default suffix identifying shared libraries.
pub const DEFAULT_LIBRARY_SUFFIX: &str = ".so";

/// Options controlling which entries are aligned and to what boundary.
///
/// # Example
///
/// ```rust
/// use apkalign::AlignOptions;
///
/// let options = AlignOptions::new().alignment(4)?.so_alignment(4096)?;
/// assert_eq!(options.so_alignment, 4096);
///
/// // Disabling library alignment makes stored `.so` files use the general rule.
/// let options = AlignOptions::new().no_library_alignment();
/// assert_eq!(options.so_alignment, 0);
/// # Ok::<(), apkalign::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignOptions {
    /// Alignment applied to stored (method 0) entries; 0 disables it.
    pub alignment: u32,
    /// Alignment applied to shared libraries regardless of compression; 0 disables it.
    pub so_alignment: u32,
    /// File name suffix that marks an entry as a shared library.
    pub library_suffix: String,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_ALIGNMENT,
            so_alignment: DEFAULT_SO_ALIGNMENT,
            library_suffix: DEFAULT_LIBRARY_SUFFIX.to_string(),
        }
    }
}

impl AlignOptions {
    /// Creates options with the defaults (4 / 16384 / `.so`).
    pub fn new() -> Self {
        Self::default()
    }

    /// 4-byte general alignment with 4 KiB library pages.
    pub fn android_page() -> Self {
        Self {
            so_alignment: 4096,
            ..Self::default()
        }
    }

    /// Sets the general alignment for stored entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAlignment`] if `alignment` exceeds [`MAX_ALIGNMENT`].
    pub fn alignment(mut self, alignment: u32) -> Result<Self> {
        check_alignment(alignment)?;
        self.alignment = alignment;
        Ok(self)
    }

    /// Sets the page alignment for shared libraries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAlignment`] if `so_alignment` exceeds [`MAX_ALIGNMENT`].
    pub fn so_alignment(mut self, so_alignment: u32) -> Result<Self> {
        check_alignment(so_alignment)?;
        self.so_alignment = so_alignment;
        Ok(self)
    }

    /// Disables shared-library page alignment.
    pub fn no_library_alignment(mut self) -> Self {
        self.so_alignment = 0;
        self
    }

    /// Sets the suffix identifying shared libraries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLibrarySuffix`] if `suffix` is empty, since every
    /// name would then count as a library.
    pub fn library_suffix(mut self, suffix: impl Into<String>) -> Result<Self> {
        let suffix = suffix.into();
        check_library_suffix(&suffix)?;
        self.library_suffix = suffix;
        Ok(self)
    }

    /// Returns `true` when neither class of alignment is enabled.
    pub fn is_disabled(&self) -> bool {
        self.alignment == 0 && self.so_alignment == 0
    }

    /// Validates fields that may have been set directly.
    pub fn validate(&self) -> Result<()> {
        check_alignment(self.alignment)?;
        check_alignment(self.so_alignment)?;
        check_library_suffix(&self.library_suffix)
    }
}

fn check_alignment(value: u32) -> Result<()> {
    if value > MAX_ALIGNMENT {
        return Err(Error::InvalidAlignment {
            value,
            reason: "padding would not fit in a 16-bit extra field",
        });
    }
    Ok(())
}

fn check_library_suffix(suffix: &str) -> Result<()> {
    if suffix.is_empty() {
        return Err(Error::InvalidLibrarySuffix {
            reason: "suffix must not be empty",
        });
    }
    Ok(())
}
