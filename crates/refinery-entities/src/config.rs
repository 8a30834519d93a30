//! Entity validation configuration

/// Configuration for entity validation rules
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Require event dates to parse as ISO-8601 (date or RFC 3339 timestamp)
    pub require_iso_dates: bool,

    /// Require topic relevance to lie in [0.0, 1.0]
    pub check_relevance_bounds: bool,

    /// Longest accepted entity name, in characters
    pub max_name_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_iso_dates: true,
            check_relevance_bounds: true,
            max_name_length: 200,
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (required fields only)
    pub fn permissive() -> Self {
        Self {
            require_iso_dates: false,
            check_relevance_bounds: false,
            max_name_length: usize::MAX,
        }
    }

    /// Create a strict configuration (short names, every check enabled)
    pub fn strict() -> Self {
        Self {
            require_iso_dates: true,
            check_relevance_bounds: true,
            max_name_length: 80,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert!(config.require_iso_dates);
        assert!(config.check_relevance_bounds);
        assert_eq!(config.max_name_length, 200);
    }

    #[test]
    fn test_permissive_config() {
        let config = ValidationConfig::permissive();
        assert!(!config.require_iso_dates);
        assert_eq!(config.max_name_length, usize::MAX);
    }

    #[test]
    fn test_strict_config() {
        let config = ValidationConfig::strict();
        assert!(config.max_name_length < ValidationConfig::default().max_name_length);
    }
}
