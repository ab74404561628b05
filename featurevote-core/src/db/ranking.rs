//! Ranked feature listing: most votes first, newest first on ties.

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::features::{row_to_feature, FEATURE_COLUMNS};
use super::Database;
use crate::error::{Error, Result};
use crate::models::{Feature, FeatureView, Page, PageRequest};

/// `rowid` is the last key so features created within the same
/// microsecond still come back in a fixed order.
const RANKED_ORDER: &str = "vote_count DESC, f.created_at DESC, f.rowid DESC";

fn ranked_views(
    conn: &Connection,
    viewer: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<FeatureView>> {
    let sql = format!(
        "SELECT {FEATURE_COLUMNS},
                EXISTS(SELECT 1 FROM votes mv WHERE mv.feature_id = f.id AND mv.voter_id = ?1)
         FROM features f
         ORDER BY {RANKED_ORDER}
         LIMIT ?2 OFFSET ?3"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            params![viewer.map(|id| id.to_string()), limit, offset],
            |row| {
                Ok(FeatureView {
                    feature: row_to_feature(row)?,
                    has_voted: row.get(7)?,
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

impl Database {
    /// One page of the ranking, with `has_voted` filled in for `viewer`.
    ///
    /// The count and the page are read in one transaction so they agree
    /// with each other.
    pub fn ranked_features(
        &self,
        request: PageRequest,
        viewer: Option<Uuid>,
    ) -> Result<Page<FeatureView>> {
        if request.page == 0 {
            return Err(Error::Validation("Page numbers start at 1.".into()));
        }
        if request.page_size == 0 {
            return Err(Error::Validation("Page size must be at least 1.".into()));
        }

        let offset = i64::try_from(request.offset())
            .map_err(|_| Error::NotFound("Invalid page.".into()))?;

        self.with_read_transaction(|tx| {
            let count: i64 = tx.query_row("SELECT COUNT(*) FROM features", [], |row| row.get(0))?;
            if request.page > 1 && offset >= count {
                return Err(Error::NotFound("Invalid page.".into()));
            }

            let results = ranked_views(tx, viewer, i64::from(request.page_size), offset)?;
            tracing::debug!(
                page = request.page,
                page_size = request.page_size,
                returned = results.len(),
                "Ranked feature page"
            );

            Ok(Page {
                count,
                page: request.page,
                page_size: request.page_size,
                results,
            })
        })
    }

    /// The full ranking without paging.
    pub fn ranked_all(&self) -> Result<Vec<Feature>> {
        self.with_connection(|conn| {
            // SQLite treats a negative LIMIT as "no limit"
            let views = ranked_views(conn, None, -1, 0)?;
            Ok(views.into_iter().map(|v| v.feature).collect())
        })
    }
}
