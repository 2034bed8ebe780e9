//! Startup probe for the socket readiness backend.
//!
//! tokio's reactor (mio) already picks the native mechanism for the target,
//! so the probe only names it for the startup log. Nothing above the
//! listener depends on the answer.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Epoll,
    Kqueue,
    Iocp,
    Portable,
}

impl TransportKind {
    /// Most efficient backend available on this platform.
    pub fn probe() -> Self {
        if cfg!(any(target_os = "linux", target_os = "android")) {
            TransportKind::Epoll
        } else if cfg!(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "netbsd",
            target_os = "dragonfly"
        )) {
            TransportKind::Kqueue
        } else if cfg!(windows) {
            TransportKind::Iocp
        } else {
            TransportKind::Portable
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TransportKind::Epoll => "epoll",
            TransportKind::Kqueue => "kqueue",
            TransportKind::Iocp => "iocp",
            TransportKind::Portable => "portable",
        }
    }

    pub fn is_native(self) -> bool {
        self != TransportKind::Portable
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_is_stable() {
        assert_eq!(TransportKind::probe(), TransportKind::probe());
        #[cfg(target_os = "linux")]
        assert_eq!(TransportKind::probe().to_string(), "epoll");
        assert!(!TransportKind::Portable.is_native());
    }
}
