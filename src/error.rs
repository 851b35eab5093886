use thiserror::Error;

/// Policy configuration rejected before any analysis runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
  #[error("policy list `{field}` must name at least one column")]
  EmptyColumnList { field: &'static str },
  #[error("policy list `{field}` contains a blank column name")]
  BlankColumnName { field: &'static str },
  #[error("policy `backlog_column` must not be blank")]
  BlankBacklogColumn,
  #[error("policy `months_to_analyse` must be at least 1")]
  ZeroMonths,
  #[error("unknown timezone `{0}` (expected an IANA name such as `Europe/Lisbon` or `UTC`)")]
  UnknownTimezone(String),
}

/// Board export that cannot be turned into items.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
  #[error("board export has no `columns` array")]
  MissingColumns,
  #[error("board export has no `issues` array")]
  MissingIssues,
  #[error("board column #{index} has no name")]
  UnnamedColumn { index: usize },
  #[error("status `{status}` is mapped to both `{first}` and `{second}`")]
  DuplicateStatus { status: String, first: String, second: String },
  #[error("issue #{index} has no key")]
  MissingKey { index: usize },
  #[error("issue {key} is missing `{field}`")]
  MissingField { key: String, field: &'static str },
  #[error("issue {key}: cannot parse timestamp `{raw}`")]
  BadTimestamp { key: String, raw: String },
}
