//! Call stack snapshots for "with stack" log records.

use std::fmt;

/// Leading frames dropped from every snapshot.
///
/// These are the capture and logging machinery. The count is fixed, so a
/// caller reaching the logger through extra wrappers will see some of its
/// own plumbing in the trace.
pub const STACK_FRAMES_TO_SKIP: usize = 3;

const UNKNOWN_SYMBOL: &str = "<unknown>";

/// One resolved frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackFrame {
    pub symbol: String,
    pub location: Option<String>,
}

/// The call stack at the moment of capture
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackSnapshot {
    frames: Vec<StackFrame>,
}

impl StackSnapshot {
    /// Capture and resolve the current stack.
    ///
    /// One entry per frame. Inlined calls are folded into their frame and
    /// frames without symbols show as `<unknown>`.
    pub fn capture() -> Self {
        Self::from_backtrace(&backtrace::Backtrace::new())
    }

    fn from_backtrace(backtrace: &backtrace::Backtrace) -> Self {
        let frames = backtrace
            .frames()
            .iter()
            .map(|frame| match frame.symbols().first() {
                Some(symbol) => StackFrame {
                    symbol: symbol
                        .name()
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| UNKNOWN_SYMBOL.to_string()),
                    location: symbol.filename().map(|file| match symbol.lineno() {
                        Some(line) => format!("{}:{}", file.display(), line),
                        None => file.display().to_string(),
                    }),
                },
                None => StackFrame {
                    symbol: UNKNOWN_SYMBOL.to_string(),
                    location: None,
                },
            })
            .collect();
        Self { frames }
    }

    pub fn from_frames(frames: Vec<StackFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// The snapshot without its first `depth` frames
    pub fn skip_leading(mut self, depth: usize) -> Self {
        let depth = depth.min(self.frames.len());
        self.frames.drain(..depth);
        self
    }
}

impl fmt::Display for StackSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(f, "{}", frame.symbol)?;
            if let Some(location) = &frame.location {
                writeln!(f, "\t{}", location)?;
            }
        }
        Ok(())
    }
}
