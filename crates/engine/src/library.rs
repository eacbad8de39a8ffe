//! Dynamic module handle
//!
//! Thin wrapper over the platform loader (`dlopen`/`dlsym`/`dlclose`).
//! Closing is idempotent: the handle is nulled after the first close.

use std::ffi::{c_void, CStr};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use crate::error::LoadError;

/// An opened shared object
pub struct Library {
    handle: *mut c_void,
    path: PathBuf,
}

// SAFETY: the handle is an opaque token owned by this struct. The loader's
// functions are thread-safe, and all symbol calls happen on the worker thread.
unsafe impl Send for Library {}

impl Library {
    /// Open a shared object with local symbol visibility and lazy binding
    #[cfg(unix)]
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| LoadError::InvalidPath(path.to_path_buf()))?;

        // SAFETY: c_path is a valid NUL-terminated string for the duration of the call
        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_LOCAL | libc::RTLD_LAZY) };
        if handle.is_null() {
            return Err(LoadError::Open {
                path: path.to_path_buf(),
                reason: last_error(),
            });
        }

        tracing::debug!("Opened core module {:?}: {:p}", path, handle);
        Ok(Self {
            handle,
            path: path.to_path_buf(),
        })
    }

    #[cfg(not(unix))]
    pub fn open(_path: &Path) -> Result<Self, LoadError> {
        Err(LoadError::Unsupported)
    }

    /// Resolve an exported symbol
    ///
    /// # Arguments
    /// * `name` - Null-terminated symbol name (e.g., b"retro_run\0")
    pub fn symbol(&self, name: &[u8]) -> Option<NonNull<c_void>> {
        if self.handle.is_null() {
            return None;
        }
        let name = CStr::from_bytes_with_nul(name).ok()?;
        self.lookup(name)
    }

    #[cfg(unix)]
    fn lookup(&self, name: &CStr) -> Option<NonNull<c_void>> {
        // SAFETY: handle is a live dlopen handle (checked non-null by caller)
        NonNull::new(unsafe { libc::dlsym(self.handle, name.as_ptr()) })
    }

    #[cfg(not(unix))]
    fn lookup(&self, _name: &CStr) -> Option<NonNull<c_void>> {
        None
    }

    /// Path the module was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the module is still open
    pub fn is_open(&self) -> bool {
        !self.handle.is_null()
    }

    /// Close the module. Safe to call more than once.
    pub fn close(&mut self) {
        if self.handle.is_null() {
            return;
        }
        #[cfg(unix)]
        {
            // SAFETY: handle came from dlopen and has not been closed yet
            if unsafe { libc::dlclose(self.handle) } != 0 {
                tracing::warn!("dlclose({:?}) failed: {}", self.path, last_error());
            }
        }
        self.handle = std::ptr::null_mut();
        tracing::debug!("Closed core module {:?}", self.path);
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(unix)]
fn last_error() -> String {
    // SAFETY: dlerror returns null or a pointer to a thread-local C string
    let err = unsafe { libc::dlerror() };
    if err.is_null() {
        "unknown error".to_string()
    } else {
        // SAFETY: non-null dlerror result is a valid C string until the next dl* call
        unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_module_fails() {
        let result = Library::open(Path::new("/nonexistent/dir/missing_core.so"));
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_interior_nul_is_invalid_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"bad\0path.so"));
        assert!(matches!(Library::open(path), Err(LoadError::InvalidPath(_))));
    }
}
