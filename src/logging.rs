// tracing setup; logs stay off stdout so the progress block is not disturbed
use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `level`.
///
/// With `log_file` set, records go to that file without ANSI colours and
/// `None` is returned. Otherwise they go to stderr through the returned
/// [`DeferredWriter`], which the caller holds back while the progress block
/// is on screen.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<Option<DeferredWriter>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}"))?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow!("cannot install logger: {e}"))?;
            Ok(None)
        }
        None => {
            let stderr = DeferredWriter::stderr();
            builder
                .with_writer(stderr.clone())
                .try_init()
                .map_err(|e| anyhow!("cannot install logger: {e}"))?;
            Ok(Some(stderr))
        }
    }
}

struct Deferred {
    target: Box<dyn Write + Send>,
    held: Option<Vec<u8>>,
}

/// Log writer that passes records straight through, except while a
/// [`HoldGuard`] is alive: then they are buffered and written out when the
/// guard drops.
///
/// The progress block addresses its lines relative to the cursor, so any
/// record reaching the same terminal mid-batch would shift every line below.
#[derive(Clone)]
pub struct DeferredWriter {
    shared: Arc<Mutex<Deferred>>,
}

impl DeferredWriter {
    pub fn new(target: impl Write + Send + 'static) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Deferred {
                target: Box::new(target),
                held: None,
            })),
        }
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Buffer records until the returned guard drops. Nested holds are
    /// released by the outermost guard.
    pub fn hold(&self) -> HoldGuard {
        let mut deferred = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        let outermost = deferred.held.is_none();
        if outermost {
            deferred.held = Some(Vec::new());
        }
        HoldGuard {
            shared: Arc::clone(&self.shared),
            outermost,
        }
    }
}

impl Write for DeferredWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut deferred = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        match deferred.held.as_mut() {
            Some(held) => {
                held.extend_from_slice(buf);
                Ok(buf.len())
            }
            None => deferred.target.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut deferred = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        match deferred.held {
            Some(_) => Ok(()),
            None => deferred.target.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for DeferredWriter {
    type Writer = DeferredWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Releases records buffered by [`DeferredWriter::hold`] on drop.
pub struct HoldGuard {
    shared: Arc<Mutex<Deferred>>,
    outermost: bool,
}

impl Drop for HoldGuard {
    fn drop(&mut self) {
        if !self.outermost {
            return;
        }
        let mut deferred = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(held) = deferred.held.take() {
            let _ = deferred.target.write_all(&held);
            let _ = deferred.target.flush();
        }
    }
}
