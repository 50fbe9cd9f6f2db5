//! SQL extraction from assistant replies.
//!
//! The backend answers in free-form prose with the SQL statement embedded in
//! a markdown code block. This module pulls the statement out without ever
//! failing: a reply with no block, or a block whose closing fence got cut
//! off mid-stream, still produces a usable result.

/// The fence that opens a SQL code block.
const OPEN_FENCE: &str = "```sql";

/// The fence that closes a code block.
const CLOSE_FENCE: &str = "```";

/// Result of extracting SQL from an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSql {
    /// Explanatory prose preceding the SQL block, or the whole reply when
    /// no block is present.
    pub explanation: String,
    /// The SQL statement, if a block was found. Kept verbatim (including
    /// surrounding whitespace); use [`ExtractedSql::copy_text`] for the
    /// clipboard-ready form.
    pub sql: Option<String>,
}

impl ExtractedSql {
    /// Creates a result with only explanatory text (no SQL).
    pub fn text_only(explanation: impl Into<String>) -> Self {
        Self {
            explanation: explanation.into(),
            sql: None,
        }
    }

    /// Creates a result with an explanation and a SQL statement.
    pub fn with_sql(explanation: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            explanation: explanation.into(),
            sql: Some(sql.into()),
        }
    }

    /// Returns the trimmed SQL statement, ready for the clipboard.
    ///
    /// Never includes the explanation or any fence characters. `None` when
    /// the reply carried no SQL block.
    pub fn copy_text(&self) -> Option<String> {
        self.sql.as_deref().map(|sql| sql.trim().to_string())
    }
}

/// Extracts a SQL statement from an assistant reply.
///
/// Splits at the first ```` ```sql ```` marker: everything before it is the
/// explanation, everything after it up to the next closing fence is the
/// SQL. A missing closing fence is not an error; truncated replies
/// simply yield the whole remainder as SQL. With no opening marker at all,
/// the full reply is treated as explanation.
///
/// Total and idempotent: re-extracting from a fence-free `sql` field hands
/// it back unchanged as explanation.
pub fn extract_sql(content: &str) -> ExtractedSql {
    let Some(open_idx) = content.find(OPEN_FENCE) else {
        return ExtractedSql::text_only(content);
    };

    let explanation = &content[..open_idx];
    let remainder = &content[open_idx + OPEN_FENCE.len()..];

    let sql = match remainder.find(CLOSE_FENCE) {
        Some(close_idx) => &remainder[..close_idx],
        None => remainder,
    };

    ExtractedSql::with_sql(explanation, sql)
}
