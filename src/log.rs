//! Notice sink for human-readable engine diagnostics.
//!
//! The engine emits short notices when the window grows or a harbor is
//! detected. The sink is injected; absence of a real sink never affects
//! correctness, so the default discards everything.

/// Destination for engine notices.
pub trait NoticeSink {
    fn notice(&self, message: &str);
}

/// Discards all notices. The default collaborator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSink;

impl NoticeSink for SilentSink {
    fn notice(&self, _message: &str) {}
}

/// Prints notices to stdout; wired up by the CLI.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSink;

impl NoticeSink for StdoutSink {
    fn notice(&self, message: &str) {
        println!("{}", message);
    }
}
