use chrono::{DateTime, Utc};
use folio_common::{
    ACQUIRED_FIELD_NAME, ACTIVITY_NOTES_FIELD_NAME, ARTICLE_ID_FIELD_NAME,
    ARTICLE_NUMBER_FIELD_NAME, ARTICLE_TITLE_FIELD_NAME, LOGGED_FIELD_NAME,
    BODY_ATTRIBUTES_FIELD_NAME, CONTENT_FIELD_NAME, CREATED_FIELD_NAME, EDITOR_KIND_FIELD_NAME,
    EXPIRES_FIELD_NAME, FILE_PATH_FIELD_NAME, FOOTER_CONTENT_FIELD_NAME,
    FOOTER_SCRIPT_FIELD_NAME, HEAD_FIELD_NAME, HEADER_SCRIPT_FIELD_NAME, HTML_HEADER_FIELD_NAME,
    ID_FIELD_NAME, LAYOUT_NAME_FIELD_NAME, PUBLISHED_FIELD_NAME, ROLE_LIST_FIELD_NAME,
    SESSION_ID_FIELD_NAME, STATUS_FIELD_NAME, TITLE_FIELD_NAME, UPDATED_FIELD_NAME,
    URL_PATH_FIELD_NAME, USER_IDENTITY_FIELD_NAME, VERSION_NUMBER_FIELD_NAME,
};
use sqlx::{Decode, Postgres, Row, Type, postgres::PgRow};
use uuid::Uuid;

use crate::domain::{
    activity::ActivityEntry,
    article::{Version, VersionId, VersionStatus, lifecycle::PublicationWindow, path::UrlPath},
    catalog::CatalogEntry,
    locks::EditLock,
    repository::{PublishedPath, RepositoryError},
    resolver::ResolvedLayout,
};

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, RepositoryError>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get(column).map_err(|e| {
        RepositoryError::DatabaseError(format!("Failed to parse {column}: {e}"))
    })
}

fn status(row: &PgRow) -> Result<VersionStatus, RepositoryError> {
    let raw: String = get(row, STATUS_FIELD_NAME)?;
    raw.parse()
        .map_err(|_| RepositoryError::DatabaseError(format!("unknown status '{raw}' in row")))
}

fn url_path(row: &PgRow) -> Result<UrlPath, RepositoryError> {
    let raw: String = get(row, URL_PATH_FIELD_NAME)?;
    Ok(UrlPath::new(raw))
}

pub fn row_to_version(row: &PgRow) -> Result<Version, RepositoryError> {
    let id: Uuid = get(row, ID_FIELD_NAME)?;
    let role_list: Option<String> = get(row, ROLE_LIST_FIELD_NAME)?;

    Ok(Version {
        id: VersionId(id),
        article_number: get(row, ARTICLE_NUMBER_FIELD_NAME)?,
        version_number: get(row, VERSION_NUMBER_FIELD_NAME)?,
        url_path: url_path(row)?,
        title: get(row, TITLE_FIELD_NAME)?,
        content: get(row, CONTENT_FIELD_NAME)?,
        header_script: get(row, HEADER_SCRIPT_FIELD_NAME)?,
        footer_script: get(row, FOOTER_SCRIPT_FIELD_NAME)?,
        status: status(row)?,
        role_list: role_list.unwrap_or_default(),
        window: PublicationWindow::new(
            get(row, PUBLISHED_FIELD_NAME)?,
            get(row, EXPIRES_FIELD_NAME)?,
        ),
        created: get(row, CREATED_FIELD_NAME)?,
        updated: get(row, UPDATED_FIELD_NAME)?,
    })
}

pub fn row_to_published_path(row: &PgRow) -> Result<PublishedPath, RepositoryError> {
    Ok(PublishedPath {
        article_number: get(row, ARTICLE_NUMBER_FIELD_NAME)?,
        version_number: get(row, VERSION_NUMBER_FIELD_NAME)?,
        url_path: url_path(row)?,
        title: get(row, TITLE_FIELD_NAME)?,
        published: get(row, PUBLISHED_FIELD_NAME)?,
        updated: get(row, UPDATED_FIELD_NAME)?,
    })
}

pub fn row_to_catalog_entry(row: &PgRow) -> Result<CatalogEntry, RepositoryError> {
    Ok(CatalogEntry {
        article_number: get(row, ARTICLE_NUMBER_FIELD_NAME)?,
        title: get(row, TITLE_FIELD_NAME)?,
        status: status(row)?,
        updated: get(row, UPDATED_FIELD_NAME)?,
        published: get(row, PUBLISHED_FIELD_NAME)?,
        url_path: url_path(row)?,
    })
}

pub fn row_to_lock(row: &PgRow) -> Result<EditLock, RepositoryError> {
    let acquired_at: DateTime<Utc> = get(row, ACQUIRED_FIELD_NAME)?;
    Ok(EditLock {
        id: get(row, ID_FIELD_NAME)?,
        article_id: get(row, ARTICLE_ID_FIELD_NAME)?,
        session_id: get(row, SESSION_ID_FIELD_NAME)?,
        user_identity: get(row, USER_IDENTITY_FIELD_NAME)?,
        acquired_at,
        editor_kind: get(row, EDITOR_KIND_FIELD_NAME)?,
        file_path: get(row, FILE_PATH_FIELD_NAME)?,
    })
}

pub fn row_to_layout(row: &PgRow) -> Result<ResolvedLayout, RepositoryError> {
    Ok(ResolvedLayout {
        id: get(row, ID_FIELD_NAME)?,
        name: get(row, LAYOUT_NAME_FIELD_NAME)?,
        head: get(row, HEAD_FIELD_NAME)?,
        body_html_attributes: get(row, BODY_ATTRIBUTES_FIELD_NAME)?,
        html_header: get(row, HTML_HEADER_FIELD_NAME)?,
        footer_html_content: get(row, FOOTER_CONTENT_FIELD_NAME)?,
    })
}

pub fn row_to_activity(row: &PgRow) -> Result<ActivityEntry, RepositoryError> {
    Ok(ActivityEntry {
        id: get(row, ID_FIELD_NAME)?,
        user_identity: get(row, USER_IDENTITY_FIELD_NAME)?,
        article_id: get(row, ARTICLE_ID_FIELD_NAME)?,
        article_title: get(row, ARTICLE_TITLE_FIELD_NAME)?,
        notes: get(row, ACTIVITY_NOTES_FIELD_NAME)?,
        logged_at: get(row, LOGGED_FIELD_NAME)?,
    })
}
