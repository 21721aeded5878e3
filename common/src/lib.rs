pub mod database;
pub mod tables;

// Content tables

pub const COUNTERS_TABLE: &str = "counters";
pub const VERSIONS_TABLE: &str = "article_versions";
pub const CATALOG_TABLE: &str = "catalog_entries";
pub const LOCKS_TABLE: &str = "article_locks";
pub const LAYOUTS_TABLE: &str = "layouts";
pub const ARTICLE_LOGS_TABLE: &str = "article_logs";

// Shared column names

pub const ID_FIELD_NAME: &str = "id";
pub const ARTICLE_NUMBER_FIELD_NAME: &str = "article_number";
pub const VERSION_NUMBER_FIELD_NAME: &str = "version_number";
pub const URL_PATH_FIELD_NAME: &str = "url_path";
pub const TITLE_FIELD_NAME: &str = "title";
pub const CONTENT_FIELD_NAME: &str = "content";
pub const HEADER_SCRIPT_FIELD_NAME: &str = "header_script";
pub const FOOTER_SCRIPT_FIELD_NAME: &str = "footer_script";
pub const STATUS_FIELD_NAME: &str = "status";
pub const ROLE_LIST_FIELD_NAME: &str = "role_list";

pub const CREATED_FIELD_NAME: &str = "created_at";
pub const UPDATED_FIELD_NAME: &str = "updated_at";
pub const PUBLISHED_FIELD_NAME: &str = "published_at";
pub const EXPIRES_FIELD_NAME: &str = "expires_at";

pub const COUNTER_KEY_FIELD_NAME: &str = "counter_key";
pub const COUNTER_VALUE_FIELD_NAME: &str = "counter_value";

pub const ARTICLE_ID_FIELD_NAME: &str = "article_id";
pub const SESSION_ID_FIELD_NAME: &str = "session_id";
pub const USER_IDENTITY_FIELD_NAME: &str = "user_identity";
pub const ACQUIRED_FIELD_NAME: &str = "acquired_at";
pub const EDITOR_KIND_FIELD_NAME: &str = "editor_kind";
pub const FILE_PATH_FIELD_NAME: &str = "file_path";

pub const ARTICLE_TITLE_FIELD_NAME: &str = "article_title";
pub const ACTIVITY_NOTES_FIELD_NAME: &str = "activity_notes";
pub const LOGGED_FIELD_NAME: &str = "logged_at";

pub const IS_DEFAULT_FIELD_NAME: &str = "is_default";
pub const LAYOUT_NAME_FIELD_NAME: &str = "layout_name";
pub const HEAD_FIELD_NAME: &str = "head";
pub const BODY_ATTRIBUTES_FIELD_NAME: &str = "body_html_attributes";
pub const HTML_HEADER_FIELD_NAME: &str = "html_header";
pub const FOOTER_CONTENT_FIELD_NAME: &str = "footer_html_content";

pub use database::{Database, DatabaseSettings, connect as connect_to_database};
pub use tables::content_tables;
