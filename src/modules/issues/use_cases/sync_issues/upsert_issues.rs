// Bulk upsert of one batch of issues.
//
// Responsibilities
// - Insert each issue by id, or overwrite every mutable column of an existing row.
// - Short circuit an empty batch without touching storage.
//
// Boundaries
// - No transaction handling here. The caller runs this inside a TransactionBoundary call.

use crate::modules::issues::core::issue::Issue;
use crate::modules::issues::core::ports::IssueRowWriter;
use crate::shared::core::errors::DataError;

pub async fn upsert_issues<TWriter>(
    writer: &mut TWriter,
    issues: Vec<Issue>,
) -> Result<Vec<Issue>, DataError>
where
    TWriter: IssueRowWriter + ?Sized,
{
    if issues.is_empty() {
        return Ok(Vec::new());
    }
    writer.upsert_rows(&issues).await?;
    Ok(issues)
}
