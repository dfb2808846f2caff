//! Owner/group resolution
//!
//! The reconciler never talks to the account database directly. It asks an
//! [`IdentityResolver`], which lets hosts that already resolved identities
//! (or tests) plug in their own mapping.

use std::collections::HashMap;
use std::ffi::CString;
use std::fmt;
use std::io;
use std::mem::MaybeUninit;
use std::ptr;

use crate::error::{Error, Result};

/// Which account database a name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    User,
    Group,
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Group => f.write_str("group"),
        }
    }
}

/// Provider for name → numeric id lookups
pub trait IdentityResolver: Send + Sync {
    /// Resolve a user name to a uid
    fn resolve_user(&self, name: &str) -> Result<u32>;

    /// Resolve a group name to a gid
    fn resolve_group(&self, name: &str) -> Result<u32>;
}

/// Resolver backed by the system passwd and group databases
///
/// A name made only of digits that is not found is taken as a numeric id.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAccounts;

impl IdentityResolver for SystemAccounts {
    fn resolve_user(&self, name: &str) -> Result<u32> {
        resolve(IdentityKind::User, name, lookup_uid)
    }

    fn resolve_group(&self, name: &str) -> Result<u32> {
        resolve(IdentityKind::Group, name, lookup_gid)
    }
}

fn resolve(
    kind: IdentityKind,
    name: &str,
    lookup: fn(&CString) -> io::Result<Option<u32>>,
) -> Result<u32> {
    let unknown = || Error::UnknownIdentity {
        kind,
        name: name.to_string(),
    };

    let c_name = CString::new(name).map_err(|_| unknown())?;
    let found = lookup(&c_name).map_err(|source| Error::IdentityLookup {
        kind,
        name: name.to_string(),
        source,
    })?;

    if let Some(id) = found {
        log::debug!("Resolved {kind} '{name}' to {id}");
        return Ok(id);
    }

    name.parse::<u32>().map_err(|_| unknown())
}

/// Initial scratch buffer for the reentrant lookups; grown on ERANGE
const LOOKUP_BUF_LEN: usize = 1024;
const LOOKUP_BUF_MAX: usize = 1024 * 1024;

/// Some libcs report a missing entry as an error code instead of a null result
fn is_not_found(rc: libc::c_int) -> bool {
    matches!(rc, libc::ENOENT | libc::ESRCH | libc::EBADF | libc::EPERM)
}

fn lookup_uid(name: &CString) -> io::Result<Option<u32>> {
    let mut buf: Vec<libc::c_char> = vec![0; LOOKUP_BUF_LEN];
    loop {
        let mut pwd: MaybeUninit<libc::passwd> = MaybeUninit::uninit();
        let mut result: *mut libc::passwd = ptr::null_mut();
        // SAFETY: all pointers are valid for the duration of the call and
        // `buf.len()` matches the buffer handed to libc.
        let rc = unsafe {
            libc::getpwnam_r(
                name.as_ptr(),
                pwd.as_mut_ptr(),
                buf.as_mut_ptr(),
                buf.len(),
                &raw mut result,
            )
        };

        if rc == libc::ERANGE && buf.len() < LOOKUP_BUF_MAX {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if is_not_found(rc) {
            return Ok(None);
        }
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }
        if result.is_null() {
            return Ok(None);
        }
        // SAFETY: non-null result points at `pwd`, which libc initialized.
        return Ok(Some(unsafe { (*result).pw_uid }));
    }
}

fn lookup_gid(name: &CString) -> io::Result<Option<u32>> {
    let mut buf: Vec<libc::c_char> = vec![0; LOOKUP_BUF_LEN];
    loop {
        let mut grp: MaybeUninit<libc::group> = MaybeUninit::uninit();
        let mut result: *mut libc::group = ptr::null_mut();
        // SAFETY: see lookup_uid.
        let rc = unsafe {
            libc::getgrnam_r(
                name.as_ptr(),
                grp.as_mut_ptr(),
                buf.as_mut_ptr(),
                buf.len(),
                &raw mut result,
            )
        };

        if rc == libc::ERANGE && buf.len() < LOOKUP_BUF_MAX {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if is_not_found(rc) {
            return Ok(None);
        }
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }
        if result.is_null() {
            return Ok(None);
        }
        // SAFETY: non-null result points at `grp`, which libc initialized.
        return Ok(Some(unsafe { (*result).gr_gid }));
    }
}

/// Fixed name → id mapping
#[derive(Debug, Clone, Default)]
pub struct StaticIdentities {
    users: HashMap<String, u32>,
    groups: HashMap<String, u32>,
}

impl StaticIdentities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, name: impl Into<String>, uid: u32) -> Self {
        self.users.insert(name.into(), uid);
        self
    }

    pub fn with_group(mut self, name: impl Into<String>, gid: u32) -> Self {
        self.groups.insert(name.into(), gid);
        self
    }
}

impl IdentityResolver for StaticIdentities {
    fn resolve_user(&self, name: &str) -> Result<u32> {
        self.users
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownIdentity {
                kind: IdentityKind::User,
                name: name.to_string(),
            })
    }

    fn resolve_group(&self, name: &str) -> Result<u32> {
        self.groups
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownIdentity {
                kind: IdentityKind::Group,
                name: name.to_string(),
            })
    }
}
