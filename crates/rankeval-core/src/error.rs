use std::fmt;

/// Machine-readable error codes surfaced by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidArgument,
    QueryFileUnreadable,
    RankingFileInvalid,
    DumpFileInvalid,
    DefinitionFileInvalid,
    ReferenceSourceFailed,
    CandidateSourceFailed,
    SolrRequestFailed,
    OutputWriteFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InvalidArgument => "E1002",
            Self::QueryFileUnreadable => "E2001",
            Self::RankingFileInvalid => "E2002",
            Self::DumpFileInvalid => "E2003",
            Self::DefinitionFileInvalid => "E2004",
            Self::ReferenceSourceFailed => "E3001",
            Self::CandidateSourceFailed => "E3002",
            Self::SolrRequestFailed => "E3003",
            Self::OutputWriteFailed => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidArgument => "Invalid argument",
            Self::QueryFileUnreadable => "Query file unreadable",
            Self::RankingFileInvalid => "Ranking batch file invalid",
            Self::DumpFileInvalid => "Document dump invalid",
            Self::DefinitionFileInvalid => "LTR definition file invalid",
            Self::ReferenceSourceFailed => "Reference source unavailable",
            Self::CandidateSourceFailed => "Candidate source unavailable",
            Self::SolrRequestFailed => "Solr request failed",
            Self::OutputWriteFailed => "Output write failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in rankeval.toml and retry."),
            Self::InvalidArgument => Some("Run the command with --help for accepted values."),
            Self::QueryFileUnreadable => {
                Some("Pass a readable newline-delimited file with --queries.")
            }
            Self::RankingFileInvalid => {
                Some("Expected a JSON object mapping each query to an array of titles.")
            }
            Self::DumpFileInvalid => Some("Expected newline-delimited JSON, one document per line."),
            Self::DefinitionFileInvalid => Some("Expected a JSON feature or model definition."),
            Self::ReferenceSourceFailed => Some("Check [reference].api_url and network access."),
            Self::CandidateSourceFailed | Self::SolrRequestFailed => {
                Some("Check that Solr is running at [candidate].base_url.")
            }
            Self::OutputWriteFailed => Some("Check disk space and write permissions."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 10] = [
        ErrorCode::ConfigParseError,
        ErrorCode::InvalidArgument,
        ErrorCode::QueryFileUnreadable,
        ErrorCode::RankingFileInvalid,
        ErrorCode::DumpFileInvalid,
        ErrorCode::DefinitionFileInvalid,
        ErrorCode::ReferenceSourceFailed,
        ErrorCode::CandidateSourceFailed,
        ErrorCode::SolrRequestFailed,
        ErrorCode::OutputWriteFailed,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let code = code.code();
            assert_eq!(code.len(), 5);
            assert!(code.starts_with('E'));
            assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }
}
