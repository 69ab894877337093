//! Scoped ownership for raw OS resources.
//!
//! Handles that come out of FFI calls (the elevated launch path on Windows) have no `Drop` of
//! their own. Wrapping them in [`Scoped`] right after acquisition releases them exactly once,
//! on every exit path, including early returns and error propagation.

/// Owns a resource and runs its release function when dropped.
pub struct Scoped<T, F>
where
    F: FnOnce(T),
{
    resource: Option<T>,
    release: Option<F>,
}

impl<T, F> Scoped<T, F>
where
    F: FnOnce(T),
{
    pub fn new(resource: T, release: F) -> Self {
        Self {
            resource: Some(resource),
            release: Some(release),
        }
    }

    pub fn get(&self) -> &T {
        // Only `into_inner` takes the resource, and it consumes self
        match self.resource.as_ref() {
            Some(resource) => resource,
            None => unreachable!("resource is present until the guard is consumed"),
        }
    }

    /// Give up ownership without running the release function.
    pub fn into_inner(mut self) -> T {
        self.release = None;
        match self.resource.take() {
            Some(resource) => resource,
            None => unreachable!("resource is present until the guard is consumed"),
        }
    }
}

impl<T, F> Drop for Scoped<T, F>
where
    F: FnOnce(T),
{
    fn drop(&mut self) {
        if let (Some(resource), Some(release)) = (self.resource.take(), self.release.take()) {
            release(resource);
        }
    }
}

/// Owned Win32 `HANDLE`, closed on drop.
#[cfg(windows)]
pub type OwnedHandle = Scoped<windows::Win32::Foundation::HANDLE, fn(windows::Win32::Foundation::HANDLE)>;

#[cfg(windows)]
pub fn own_handle(handle: windows::Win32::Foundation::HANDLE) -> OwnedHandle {
    fn close(handle: windows::Win32::Foundation::HANDLE) {
        // SAFETY: the handle came from a successful Win32 call and is closed only here
        if let Err(e) = unsafe { windows::Win32::Foundation::CloseHandle(handle) } {
            tracing::warn!("CloseHandle failed: {}", e);
        }
    }
    Scoped::new(handle, close as fn(windows::Win32::Foundation::HANDLE))
}
