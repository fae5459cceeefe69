use crate::error::ClipboardError;

/// What a single look at the clipboard found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardRead {
    /// Raw `CF_DIB` bytes.
    Image(Vec<u8>),
    NoImage,
    /// Another process holds the clipboard open.
    Locked,
}

pub trait ClipboardSource {
    fn read_dib(&mut self) -> Result<ClipboardRead, ClipboardError>;
}

/// The OS clipboard. Read-only.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[cfg(target_os = "windows")]
impl ClipboardSource for SystemClipboard {
    fn read_dib(&mut self) -> Result<ClipboardRead, ClipboardError> {
        use windows::Win32::Foundation::HGLOBAL;
        use windows::Win32::System::DataExchange::{
            CloseClipboard, GetClipboardData, IsClipboardFormatAvailable, OpenClipboard,
        };
        use windows::Win32::System::Memory::{GlobalLock, GlobalSize, GlobalUnlock};

        const CF_DIB: u32 = 8;

        struct OpenGuard;

        impl Drop for OpenGuard {
            fn drop(&mut self) {
                unsafe {
                    let _ = CloseClipboard();
                }
            }
        }

        // Unlocks on every exit path once GlobalLock has succeeded.
        struct LockGuard(HGLOBAL);

        impl Drop for LockGuard {
            fn drop(&mut self) {
                unsafe {
                    let _ = GlobalUnlock(self.0);
                }
            }
        }

        unsafe {
            if OpenClipboard(None).is_err() {
                log::debug!("Clipboard is locked by another process");
                return Ok(ClipboardRead::Locked);
            }
            let _guard = OpenGuard;

            if IsClipboardFormatAvailable(CF_DIB).is_err() {
                return Ok(ClipboardRead::NoImage);
            }

            let handle = GetClipboardData(CF_DIB)
                .map_err(|e| ClipboardError::Read(format!("GetClipboardData(CF_DIB): {}", e)))?;
            let global = HGLOBAL(handle.0);

            let size = GlobalSize(global);
            if size == 0 {
                return Err(ClipboardError::Read("Clipboard bitmap is empty".to_string()));
            }

            let ptr = GlobalLock(global) as *const u8;
            if ptr.is_null() {
                return Err(ClipboardError::Read("Failed to lock clipboard memory".to_string()));
            }
            let _lock = LockGuard(global);

            let data = std::slice::from_raw_parts(ptr, size).to_vec();

            log::debug!("Read {} bytes of CF_DIB data", data.len());
            Ok(ClipboardRead::Image(data))
        }
    }
}

#[cfg(not(target_os = "windows"))]
impl ClipboardSource for SystemClipboard {
    fn read_dib(&mut self) -> Result<ClipboardRead, ClipboardError> {
        Err(ClipboardError::Unsupported)
    }
}
