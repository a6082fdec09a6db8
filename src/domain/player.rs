use crate::error::{EngineError, Result};

/// Trims a caller-supplied name and rejects it if nothing is left.
///
/// Player, area, class and asset names all go through this before any
/// store is touched. Names stay case-sensitive.
pub fn required_name(label: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidArgument(format!(
            "{label} name cannot be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validates a signed amount as a non-negative integer.
pub fn non_negative(label: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| {
        EngineError::InvalidArgument(format!("{label} must be a non-negative integer"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_name_trims() {
        assert_eq!(required_name("Player", "  Ann ").unwrap(), "Ann");
    }

    #[test]
    fn test_required_name_rejects_blank() {
        assert!(matches!(
            required_name("Player", "   "),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_names_stay_case_sensitive() {
        assert_ne!(
            required_name("Player", "ann").unwrap(),
            required_name("Player", "Ann").unwrap()
        );
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative("Houses", 3).unwrap(), 3);
        assert_eq!(non_negative("Houses", 0).unwrap(), 0);
        assert!(matches!(
            non_negative("Houses", -1),
            Err(EngineError::InvalidArgument(_))
        ));
    }
}
