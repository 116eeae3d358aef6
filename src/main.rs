mod buffer_pool;
mod config;
mod constants;
mod destination;
mod errors;
mod event_pool;
mod metrics;
mod protocol;
mod resolver;
mod ring_driver;
mod session;

use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use socket2::{Domain, Protocol, Socket, Type};
use tracing::{error, info};

use config::{LISTEN_BACKLOG, RLIMIT_MEMLOCK_TARGET, SESSION_CAPACITY};
use errors::StartupError;
use resolver::SyncResolver;
use ring_driver::RingDriver;

#[derive(Parser)]
#[command(about = "SOCKS5 proxy server built on a completion-driven io_uring event loop")]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: u16,

    /// Number of worker threads, each driving its own io_uring instance
    #[arg(short = 't', long, default_value_t = default_thread_count())]
    threads: usize,

    /// Request IORING_SETUP_SQPOLL kernel-side submission-queue polling
    /// (requires root; spec.md §6)
    #[arg(short = 'k', long)]
    kernel_polling: bool,
}

fn default_thread_count() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// One SO_REUSEPORT socket per worker thread — the kernel load-balances
/// incoming connections across them, so each ring driver gets its own
/// accept queue on the same port rather than contending over a shared fd.
fn create_listener(port: u16) -> Result<Socket> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
        .context("failed to create listening socket")?;
    socket.set_reuse_address(true)?;

    unsafe {
        let optval: libc::c_int = 1;
        let rc = libc::setsockopt(
            socket.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_REUSEPORT,
            &optval as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        );
        if rc != 0 {
            return Err(std::io::Error::last_os_error()).context("SO_REUSEPORT failed");
        }
    }

    socket.set_nonblocking(true)?;
    let addr = std::net::SocketAddrV4::new(std::net::Ipv4Addr::UNSPECIFIED, port);
    socket.bind(&addr.into()).context("bind failed")?;
    socket.listen(LISTEN_BACKLOG).context("listen failed")?;
    Ok(socket)
}

/// Raise RLIMIT_NOFILE to cover every session's client + destination fd
/// across all threads, and RLIMIT_MEMLOCK to allow fixed-buffer
/// registration. A `getrlimit`/`setrlimit` failure is fatal at startup
/// (spec.md §7's syscall-failure row), not a soft fallback.
fn raise_resource_limits(threads: usize) -> Result<(), StartupError> {
    let nofile_target = (2 * SESSION_CAPACITY * threads) as u64;
    for (resource, target, name) in [
        (libc::RLIMIT_NOFILE, nofile_target, "RLIMIT_NOFILE"),
        (libc::RLIMIT_MEMLOCK, RLIMIT_MEMLOCK_TARGET, "RLIMIT_MEMLOCK"),
    ] {
        let mut limit = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        if unsafe { libc::getrlimit(resource, &mut limit) } != 0 {
            return Err(StartupError::SyscallFailure(std::io::Error::last_os_error()));
        }
        let ceiling = limit.rlim_max;
        let wanted = target.min(ceiling);
        if wanted <= limit.rlim_cur {
            continue;
        }
        limit.rlim_cur = wanted;
        if unsafe { libc::setrlimit(resource, &limit) } != 0 {
            return Err(StartupError::SyscallFailure(std::io::Error::last_os_error()));
        }
        info!(limit = name, value = wanted, "raised resource limit");
    }
    Ok(())
}

/// SIGPIPE must be ignored so a destination or client closing mid-write
/// turns into an `EPIPE` completion rather than killing the process.
/// SIGINT/SIGQUIT are given a short handler that logs before the default
/// disposition (process exit) proceeds.
fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }

    extern "C" fn log_and_exit(signum: libc::c_int) {
        // Async-signal-safety: tracing's formatter is not guaranteed
        // signal-safe, but this only runs on an operator-initiated shutdown
        // (Ctrl-C / SIGQUIT), never on the hot path.
        error!(fatal = true, signum, "received signal, shutting down");
        std::process::exit(0);
    }
    unsafe {
        libc::signal(libc::SIGINT, log_and_exit as libc::sighandler_t);
        libc::signal(libc::SIGQUIT, log_and_exit as libc::sighandler_t);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    metrics::spawn_reporter();

    let args = Args::parse();
    install_signal_handlers();
    raise_resource_limits(args.threads)?;

    info!(
        port = args.port,
        threads = args.threads,
        kernel_polling = args.kernel_polling,
        "starting socks5-uring"
    );

    let mut handles = Vec::with_capacity(args.threads);
    for thread_index in 0..args.threads {
        let listener = create_listener(args.port)
            .with_context(|| format!("failed to create listener for thread {thread_index}"))?;
        let listen_fd: RawFd = listener.into_raw_fd();
        let use_sq_poll = args.kernel_polling;

        let handle = thread::Builder::new()
            .name(format!("ring-{thread_index}"))
            .spawn(move || {
                let driver = match RingDriver::new(listen_fd, Box::new(SyncResolver), use_sq_poll) {
                    Ok(driver) => driver,
                    Err(e) => {
                        error!(fatal = true, thread = thread_index, error = %e, "failed to initialize ring driver");
                        std::process::exit(1);
                    }
                };
                driver.run();
            })
            .with_context(|| format!("failed to spawn thread {thread_index}"))?;
        handles.push(handle);
    }

    info!("socks5-uring ready");
    for handle in handles {
        let _ = handle.join();
    }
    Ok(())
}
