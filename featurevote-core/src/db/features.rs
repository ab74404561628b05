use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::users::user_exists;
use super::{get_time, get_uuid, now, time_to_sql, Database, VoteLedger};
use crate::error::{Error, Result};
use crate::models::{
    CreateFeatureInput, Feature, FeatureView, ReplaceFeatureInput, UpdateFeatureInput,
    MAX_TITLE_LEN,
};

/// Column order shared by every query that feeds [`row_to_feature`].
pub(super) const FEATURE_COLUMNS: &str = "f.id, f.title, f.description, f.author_id, \
     f.created_at, f.updated_at, \
     (SELECT COUNT(*) FROM votes v WHERE v.feature_id = f.id) AS vote_count";

pub(super) fn row_to_feature(row: &Row<'_>) -> rusqlite::Result<Feature> {
    Ok(Feature {
        id: get_uuid(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        author_id: get_uuid(row, 3)?,
        created_at: get_time(row, 4)?,
        updated_at: get_time(row, 5)?,
        vote_count: row.get(6)?,
    })
}

fn validate_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(Error::Validation("Title may not be blank.".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(Error::Validation(format!(
            "Ensure title has no more than {} characters.",
            MAX_TITLE_LEN
        )));
    }
    Ok(title.to_string())
}

fn normalize_description(raw: Option<String>) -> Option<String> {
    raw.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
}

fn load_feature(conn: &Connection, id: Uuid) -> Result<Option<Feature>> {
    let sql = format!("SELECT {FEATURE_COLUMNS} FROM features f WHERE f.id = ?1");
    Ok(conn
        .query_row(&sql, params![id.to_string()], row_to_feature)
        .optional()?)
}

/// Author of a feature, or `None` if the feature does not exist.
pub(crate) fn author_of(conn: &Connection, feature_id: Uuid) -> Result<Option<Uuid>> {
    Ok(conn
        .query_row(
            "SELECT author_id FROM features WHERE id = ?1",
            params![feature_id.to_string()],
            |row| get_uuid(row, 0),
        )
        .optional()?)
}

/// Validated field changes; `description: Some(None)` clears it.
struct FeatureChanges {
    title: Option<String>,
    description: Option<Option<String>>,
}

impl FeatureChanges {
    fn partial(input: UpdateFeatureInput) -> Result<Self> {
        Ok(Self {
            title: input.title.as_deref().map(validate_title).transpose()?,
            description: input.description.map(|d| normalize_description(Some(d))),
        })
    }

    fn replace(input: ReplaceFeatureInput) -> Result<Self> {
        Ok(Self {
            title: Some(validate_title(&input.title)?),
            description: Some(normalize_description(input.description)),
        })
    }
}

impl Database {
    pub fn create_feature(&self, author_id: Uuid, input: CreateFeatureInput) -> Result<Feature> {
        let title = validate_title(&input.title)?;
        let description = normalize_description(input.description);

        let feature = self.with_transaction(|tx| {
            if !user_exists(tx, author_id)? {
                return Err(Error::user_not_found());
            }

            let created_at = now();
            let feature = Feature {
                id: Uuid::new_v4(),
                title,
                description,
                author_id,
                vote_count: 0,
                created_at,
                updated_at: created_at,
            };

            tx.execute(
                "INSERT INTO features (id, title, description, author_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    feature.id.to_string(),
                    feature.title,
                    feature.description,
                    feature.author_id.to_string(),
                    time_to_sql(feature.created_at),
                    time_to_sql(feature.updated_at),
                ],
            )?;
            Ok(feature)
        })?;

        tracing::info!(feature_id = %feature.id, author_id = %author_id, "Created feature {:?}", feature.title);
        Ok(feature)
    }

    pub fn get_feature(&self, id: Uuid) -> Result<Option<Feature>> {
        self.with_connection(|conn| load_feature(conn, id))
    }

    /// A feature together with whether `viewer` has voted on it.
    pub fn get_feature_view(&self, id: Uuid, viewer: Option<Uuid>) -> Result<FeatureView> {
        self.with_transaction(|tx| {
            let feature = load_feature(tx, id)?.ok_or_else(Error::feature_not_found)?;
            let has_voted = match viewer {
                Some(user_id) => VoteLedger::new(tx).has_voted(id, user_id)?,
                None => false,
            };
            Ok(FeatureView { feature, has_voted })
        })
    }

    pub fn find_feature_by_title(&self, title: &str) -> Result<Option<Feature>> {
        self.with_connection(|conn| {
            let sql = format!(
                "SELECT {FEATURE_COLUMNS} FROM features f WHERE f.title = ?1
                 ORDER BY f.created_at LIMIT 1"
            );
            Ok(conn
                .query_row(&sql, params![title], row_to_feature)
                .optional()?)
        })
    }

    pub fn feature_count(&self) -> Result<i64> {
        self.with_connection(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM features", [], |row| row.get(0))?)
        })
    }

    /// Change only the supplied fields. Only the author may update.
    pub fn update_feature(
        &self,
        id: Uuid,
        actor: Uuid,
        input: UpdateFeatureInput,
    ) -> Result<Feature> {
        self.apply_changes(id, actor, || FeatureChanges::partial(input))
    }

    /// Overwrite title and description. Only the author may update.
    pub fn replace_feature(
        &self,
        id: Uuid,
        actor: Uuid,
        input: ReplaceFeatureInput,
    ) -> Result<Feature> {
        self.apply_changes(id, actor, || FeatureChanges::replace(input))
    }

    fn apply_changes(
        &self,
        id: Uuid,
        actor: Uuid,
        changes: impl FnOnce() -> Result<FeatureChanges>,
    ) -> Result<Feature> {
        let feature = self.with_transaction(|tx| {
            let mut feature = load_feature(tx, id)?.ok_or_else(Error::feature_not_found)?;
            let changes = changes()?;
            if feature.author_id != actor {
                return Err(Error::Forbidden(
                    "You can only update your own features".into(),
                ));
            }

            if let Some(title) = changes.title {
                feature.title = title;
            }
            if let Some(description) = changes.description {
                feature.description = description;
            }
            feature.updated_at = now().max(feature.created_at);

            tx.execute(
                "UPDATE features SET title = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
                params![
                    feature.title,
                    feature.description,
                    time_to_sql(feature.updated_at),
                    feature.id.to_string(),
                ],
            )?;
            Ok(feature)
        })?;

        tracing::info!(feature_id = %id, "Updated feature");
        Ok(feature)
    }

    /// Delete a feature and, by cascade, its votes. Only the author may delete.
    pub fn delete_feature(&self, id: Uuid, actor: Uuid) -> Result<()> {
        self.with_transaction(|tx| {
            let author = author_of(tx, id)?.ok_or_else(Error::feature_not_found)?;
            if author != actor {
                return Err(Error::Forbidden(
                    "You can only delete your own features".into(),
                ));
            }
            tx.execute(
                "DELETE FROM features WHERE id = ?1",
                params![id.to_string()],
            )?;
            Ok(())
        })?;

        tracing::info!(feature_id = %id, "Deleted feature");
        Ok(())
    }
}
