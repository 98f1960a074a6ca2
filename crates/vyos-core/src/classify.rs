// ── Error classifier ──
//
// One remote signal, several meanings. A `success: false` reply is "empty"
// to a list, "absent" to a get and "refused" to a mutation, so queries and
// mutations each get their own entry point and the context is explicit at
// every call site.

use tracing::{debug, warn};
use vyos_api::{StoreReply, TreeNode};

use crate::error::CoreError;

type RemoteResult = Result<StoreReply, vyos_api::Error>;

/// Which failures a list query reads as "nothing configured".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTolerance {
    /// Only a logical failure whose text says the path is empty or missing.
    LogicalEmpty,
    /// Additionally any transport failure. Sections the device has never
    /// touched answer with an HTTP error rather than an empty reply.
    AnyFailure,
}

/// The read being classified.
#[derive(Debug, Clone, Copy)]
pub enum QueryKind<'a> {
    List(ListTolerance),
    Get { resource: &'static str, id: &'a str },
    /// The read-back after a mutation that already succeeded. Only a
    /// transport failure fails it; a logical refusal reads as empty.
    Refresh,
}

/// A successfully classified read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Found(TreeNode),
    /// The queried section is not configured; render as an empty collection.
    Empty,
}

impl QueryOutcome {
    /// The tree, or an empty map for `Empty`.
    pub fn into_tree(self) -> TreeNode {
        match self {
            Self::Found(tree) => tree,
            Self::Empty => TreeNode::empty(),
        }
    }
}

/// Classify the reply to a `showConfig`.
pub fn classify_query(result: RemoteResult, kind: QueryKind<'_>) -> Result<QueryOutcome, CoreError> {
    let reply = match result {
        Ok(reply) => reply,
        Err(vyos_api::Error::Cancelled) => return Err(CoreError::Cancelled),
        Err(err) => {
            if let QueryKind::List(ListTolerance::AnyFailure) = kind {
                if err.is_missing_path() {
                    debug!(error = %err, "section absent; treating as empty");
                } else {
                    warn!(error = %err, "section unreadable; treating as empty");
                }
                return Ok(QueryOutcome::Empty);
            }
            // A missing path is still a transport-level failure for strict
            // reads; only the lenient lists forgive it.
            return Err(err.into());
        }
    };

    if reply.success {
        return Ok(QueryOutcome::Found(
            reply.data.unwrap_or_else(TreeNode::empty),
        ));
    }

    match kind {
        QueryKind::List(_) if says_empty(reply.error_text()) => Ok(QueryOutcome::Empty),
        QueryKind::List(_) => Err(CoreError::RemoteRejected {
            message: reply.error_text().trim().to_owned(),
        }),
        QueryKind::Get { resource, id } => Err(CoreError::not_found(resource, id)),
        QueryKind::Refresh => {
            warn!(error = reply.error_text().trim(), "read-back after update refused");
            Ok(QueryOutcome::Empty)
        }
    }
}

/// Classify the reply to a `set` or `delete`.
pub fn classify_mutation(result: RemoteResult) -> Result<(), CoreError> {
    let reply = result?;
    if reply.success {
        Ok(())
    } else {
        Err(CoreError::RemoteRejected {
            message: reply.error_text().trim().to_owned(),
        })
    }
}

/// VyOS phrases a missing section as "... is empty" or "... does not exist".
fn says_empty(error: &str) -> bool {
    let lower = error.to_ascii_lowercase();
    lower.contains("empty") || lower.contains("does not exist")
}
