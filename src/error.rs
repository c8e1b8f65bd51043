use thiserror::Error;

macro_rules! invariant_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::InvariantViolation {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvariantViolation {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers the three failure classes of the optimization pipeline: programmer errors
/// in pass declarations, schedule rejections computed before any program mutation, and fatal
/// invariant violations discovered mid-pass. There is no retry and no partial commit — a run
/// either completes or produces no output.
///
/// # Error Categories
///
/// ## Declaration Errors
/// - [`Error::IllFormedInteraction`] - A pass declared a self-contradictory property interaction
///
/// ## Schedule Errors
/// - [`Error::ScheduleViolation`] - The configured pass order violates property requirements
///
/// ## Execution Errors
/// - [`Error::InvariantViolation`] - A structural invariant (e.g. dangling CFG edge) was violated
/// - [`Error::MalformedBody`] - A method body could not be lifted into a control-flow graph
/// - [`Error::Cancelled`] - The run was cancelled through the manager's cancel hook
///
/// # Examples
///
/// ```rust,no_run
/// use dexscope::{Error, OptimizerConfig, PassManager, ProgramStore};
///
/// let mut manager = PassManager::new();
/// let mut store = ProgramStore::empty();
/// match manager.run(&mut store, &OptimizerConfig::default()) {
///     Ok(()) => println!("pipeline complete"),
///     Err(Error::ScheduleViolation(diag)) => eprintln!("rejected: {diag}"),
///     Err(e) => eprintln!("fatal: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A pass declared a self-contradictory property interaction.
    ///
    /// A declaration with `requires && establishes && !preserves` asks for a property,
    /// guarantees it on exit, yet claims not to preserve it. Rejected when pass
    /// declarations are collected, before any pass runs.
    #[error("ill-formed interaction: pass `{pass}` declares requires && establishes && !preserves for property `{property}`")]
    IllFormedInteraction {
        /// Name of the offending pass.
        pass: String,
        /// Name of the property with the contradictory declaration.
        property: String,
    },

    /// The configured pass schedule violates property requirements.
    ///
    /// Either some pass requires a property that is not established at its position
    /// in the pipeline, or the pipeline does not terminate in the configured final
    /// property set. Reported before any pass runs; the program is not mutated.
    #[error("schedule violation: {0}")]
    ScheduleViolation(String),

    /// A structural invariant was violated during pass execution.
    ///
    /// This is fatal and aborts the whole run — a compiler must not emit
    /// silently-wrong code. The error includes the source location where the
    /// violation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the violated invariant
    /// * `file` - Source file where the violation was detected
    /// * `line` - Source line where the violation was detected
    #[error("invariant violation - {file}:{line}: {message}")]
    InvariantViolation {
        /// The message to be printed for the invariant violation
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A method body could not be lifted into a control-flow graph.
    ///
    /// Occurs when the linear IR references an undefined label, falls off the end
    /// of the body without a terminator, or is otherwise not block-structured.
    #[error("malformed method body: {0}")]
    MalformedBody(String),

    /// The run was cancelled through the manager's cancel hook.
    ///
    /// Cancellation is best-effort: it is honored between passes and at block-group
    /// boundaries inside per-method workers. A cancelled run produces no output.
    #[error("optimization run cancelled")]
    Cancelled,
}
