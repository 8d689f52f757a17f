use std::path::PathBuf;

/// Program image could not be assembled from the bytes on disk.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("failed to read program image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A precondition violated by the executing UM program itself.
///
/// Every variant carries the program counter at which the fault was
/// detected so the top-level handler can report it without re-deriving
/// dispatch state.
#[derive(Debug, thiserror::Error)]
pub enum ProgramFault {
    #[error("illegal opcode {opcode} at pc={pc}")]
    IllegalInstruction { pc: u32, opcode: u32 },

    #[error("division by zero at pc={pc}")]
    DivisionByZero { pc: u32 },

    #[error("segment {id} is not mapped (pc={pc})")]
    InvalidSegment { pc: u32, id: u32 },

    #[error(
        "offset {offset} out of bounds for segment {id} of length {len} (pc={pc})"
    )]
    OutOfBounds { pc: u32, id: u32, offset: u32, len: u32 },

    #[error("attempted to unmap segment 0 (pc={pc})")]
    UnmapSegmentZero { pc: u32 },

    #[error("output value {value} exceeds a single byte (pc={pc})")]
    OutputOutOfRange { pc: u32, value: u32 },

    #[error("program counter ran off the end of segment 0 (pc={pc}, len={len})")]
    PcOverrun { pc: u32, len: u32 },
}

impl ProgramFault {
    /// Stamp the program counter at which this fault was actually
    /// detected by the dispatch loop. The segment store raises faults
    /// with `pc: 0` since it has no notion of the instruction pointer;
    /// the dispatch loop fills in the real value before propagating.
    pub fn at_pc(mut self, pc: u32) -> Self {
        match &mut self {
            ProgramFault::IllegalInstruction { pc: p, .. }
            | ProgramFault::DivisionByZero { pc: p }
            | ProgramFault::InvalidSegment { pc: p, .. }
            | ProgramFault::OutOfBounds { pc: p, .. }
            | ProgramFault::UnmapSegmentZero { pc: p }
            | ProgramFault::OutputOutOfRange { pc: p, .. }
            | ProgramFault::PcOverrun { pc: p, .. } => *p = pc,
        }
        self
    }
}

/// I/O failure on the host's stdin/stdout streams.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("I/O error on standard output: {0}")]
    Stdout(#[source] std::io::Error),
    #[error("I/O error on standard input: {0}")]
    Stdin(#[source] std::io::Error),
}

/// Allocation failure or id-space exhaustion in the segment store.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("segment id space exhausted")]
    SegmentLimitExceeded,
}

/// Top-level error unifying every fail-stop condition the interpreter
/// can hit, from image loading through the final instruction executed.
#[derive(Debug, thiserror::Error)]
pub enum RumError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Program(#[from] ProgramFault),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

impl RumError {
    /// Process exit code for this error, distinguishing the four fault
    /// kinds so callers can script around failure classes.
    pub fn exit_code(&self) -> i32 {
        match self {
            RumError::Program(_) => 1,
            RumError::Image(_) => 2,
            RumError::Host(_) => 3,
            RumError::Resource(_) => 4,
        }
    }
}
