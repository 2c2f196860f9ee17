//! Unix signal handling (SIGINT).
//!
//! The first Ctrl-C is left to the child compiler, which dies with
//! SIGINT and lets us report the interrupted command like any other
//! failure.  The handler then resets to the default so a second Ctrl-C
//! kills the driver itself.

fn sigint_action(handler: libc::sighandler_t) {
    // Safety: registering a signal handler is libc unsafe code.
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handler as libc::sighandler_t;
        libc::sigaction(libc::SIGINT, &sa, std::ptr::null_mut());
    }
}

extern "C" fn sigint_handler(_sig: libc::c_int) {
    sigint_action(libc::SIG_DFL as libc::sighandler_t);
}

pub fn register_sigint() {
    sigint_action(sigint_handler as libc::sighandler_t);
}
