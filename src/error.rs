use thiserror::Error;

use crate::transform::environment::EnvironmentType;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur during class file parsing,
/// rewriting and load-time transformation. Each variant provides specific context about the
/// failure mode to enable appropriate error handling.
///
/// # Error Categories
///
/// ## Decode Errors
/// - [`Error::Malformed`] - Corrupted or invalid class file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond buffer boundaries
/// - [`Error::NotSupported`] - Input is not a class file
/// - [`Error::Empty`] - Empty input provided
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// ## Transformation Errors
/// - [`Error::EnvironmentIncompatible`] - A class cannot exist in the current
///   runtime environment; the load must abort
///
/// # Examples
///
/// ```rust,no_run
/// use classweave::{Error, ClassFile};
/// use std::path::Path;
///
/// match ClassFile::from_file(Path::new("Widget.class")) {
///     Ok(class) => {
///         println!("Successfully decoded class");
///     }
///     Err(Error::NotSupported) => {
///         eprintln!("File is not a class file");
///     }
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed class: {} ({}:{})", message, file, line);
///     }
///     Err(e) => {
///         eprintln!("Other error: {}", e);
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The class file is damaged and could not be parsed.
    ///
    /// This error indicates that the input structure is corrupted or doesn't
    /// conform to the class file format. The error includes the source
    /// location where the malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the input.
    ///
    /// This error occurs when trying to read data beyond the end of a buffer.
    /// It's a safety check to prevent buffer overruns during parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This file type is not supported.
    ///
    /// Indicates that the input does not start with the class file magic number,
    /// i.e. it is not compiled JVM bytecode at all.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    ///
    /// This error occurs when an empty file or buffer is provided where
    /// actual class file data was expected.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as reading from disk, permission issues, or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// The class is tagged for a runtime environment other than the current one.
    ///
    /// Raised by the transformation pipeline when a class-level environment tag
    /// disqualifies the whole class. This is a load-abort: no bytes are produced
    /// and the caller must not define the class.
    #[error("Cannot load class {class} in environment type {environment}")]
    EnvironmentIncompatible {
        /// Name of the class that was rejected
        class: String,
        /// The environment the load was attempted under
        environment: EnvironmentType,
    },

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for
    /// wrapping external failures with additional context.
    #[error("{0}")]
    Error(String),
}
