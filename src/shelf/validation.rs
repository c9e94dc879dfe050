//! Item id validation.
//!
//! An id doubles as a directory name and a file stem. Accepted ids:
//! - ASCII letters, digits, underscores (`_`), hyphens (`-`) and dots (`.`)
//! - Must start with a letter or digit
//! - Cannot end with a dot
//! - At most [`MAX_ID_LEN`] bytes
//! - Cannot be a reserved Windows device name (`CON`, `NUL`, `COM1`, ...)

pub const MAX_ID_LEN: usize = 128;

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Validates an item id.
///
/// # Examples
/// ```
/// use shelf::validation::validate_id;
///
/// assert!(validate_id("book_a").is_ok());
/// assert!(validate_id("sicp-2nd.ed").is_ok());
///
/// assert!(validate_id("").is_err());
/// assert!(validate_id("../etc").is_err());
/// assert!(validate_id("a/b").is_err());
/// assert!(validate_id(".hidden").is_err());
/// assert!(validate_id("nul").is_err());
/// ```
pub fn validate_id(id: &str) -> Result<(), IdValidationError> {
    let Some(first) = id.chars().next() else {
        return Err(IdValidationError::Empty);
    };

    if id.len() > MAX_ID_LEN {
        return Err(IdValidationError::TooLong(id.len()));
    }

    if !first.is_ascii_alphanumeric() {
        return Err(IdValidationError::InvalidStart(first));
    }

    if let Some(ch) = id.chars().find(|ch| !is_valid_id_char(*ch)) {
        return Err(IdValidationError::InvalidCharacter(ch));
    }

    if id.ends_with('.') {
        return Err(IdValidationError::InvalidEnd('.'));
    }

    let device = id.split('.').next().unwrap_or(id);
    if RESERVED_NAMES
        .iter()
        .any(|name| name.eq_ignore_ascii_case(device))
    {
        return Err(IdValidationError::Reserved(device.to_string()));
    }

    Ok(())
}

pub fn is_valid_id(id: &str) -> bool {
    validate_id(id).is_ok()
}

fn is_valid_id_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.'
}

/// Error type for id validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdValidationError {
    /// Id is empty
    Empty,
    /// Id is longer than [`MAX_ID_LEN`] bytes
    TooLong(usize),
    /// Id starts with something other than a letter or digit
    InvalidStart(char),
    /// Id ends with a dot
    InvalidEnd(char),
    /// Id contains a character outside the allowed set
    InvalidCharacter(char),
    /// Id names a reserved device
    Reserved(String),
}

impl std::fmt::Display for IdValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdValidationError::Empty => write!(f, "id cannot be empty"),
            IdValidationError::TooLong(len) => {
                write!(f, "id is {} bytes long (maximum is {})", len, MAX_ID_LEN)
            }
            IdValidationError::InvalidStart(ch) => {
                write!(f, "id must start with a letter or digit, found '{}'", ch)
            }
            IdValidationError::InvalidEnd(ch) => write!(f, "id cannot end with '{}'", ch),
            IdValidationError::InvalidCharacter(ch) => {
                write!(
                    f,
                    "id contains invalid character '{}' (only letters, digits, '_', '-' and '.' allowed)",
                    ch.escape_debug()
                )
            }
            IdValidationError::Reserved(name) => {
                write!(f, "'{}' is a reserved device name", name)
            }
        }
    }
}

impl std::error::Error for IdValidationError {}
