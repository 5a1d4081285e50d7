//! Content lifecycle: `before_post_save` → persist → `after_post_save`, and
//! rendering through `post_content` and `post_meta`.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use cms_core::error::AppError;
use cms_core::result::AppResult;
use cms_database::store::{ContentCounts, ContentFilter, ContentStore};
use cms_entity::content::model::CONTENT_FIELDS;
use cms_entity::content::{Content, ContentDraft, ContentKind, ContentStatus};
use cms_entity::plugin::manifest::slugify;
use cms_entity::user::{UserContext, UserRole};
use cms_plugin::{Dispatcher, HookPoint};

/// Fields a `before_post_save` handler may rewrite. Identity fields (id,
/// kind, author, timestamps) always come from the host.
#[derive(Debug, Deserialize)]
struct EditableFields {
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    status: ContentStatus,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    category: Option<String>,
    slug: String,
}

/// Stores posts and pages, firing the save and render hooks.
#[derive(Debug, Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl ContentService {
    /// Creates a new content service.
    pub fn new(store: Arc<dyn ContentStore>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self { store, dispatcher }
    }

    /// Saves a new post on behalf of `user`.
    pub async fn save_post(&self, user: &UserContext, draft: ContentDraft) -> AppResult<Content> {
        self.save(user, ContentKind::Post, draft).await
    }

    /// Saves a new post or page.
    ///
    /// The draft is folded through `before_post_save`; host fields are read
    /// back from the folded payload and every other key lands in `extra`.
    /// The stored item is then passed to `after_post_save`, whose result is
    /// not used.
    pub async fn save(
        &self,
        user: &UserContext,
        kind: ContentKind,
        draft: ContentDraft,
    ) -> AppResult<Content> {
        draft
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid content: {e}")))?;
        if kind == ContentKind::Page && !user.role.is_editor_or_above() {
            return Err(AppError::forbidden("Only editors can create pages"));
        }

        let now = Utc::now();
        let mut content = Content {
            id: Uuid::new_v4(),
            kind,
            slug: draft
                .slug
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| slugify(&draft.title)),
            title: draft.title,
            content: draft.content,
            excerpt: draft.excerpt,
            status: draft.status,
            author_id: user.id.clone(),
            tags: draft.tags,
            category: draft.category,
            extra: Value::Object(draft.extra),
            created_at: now,
            updated_at: now,
        };

        let outcome = self
            .dispatcher
            .dispatch(&HookPoint::BeforePostSave, to_hook_value(&content))
            .await;
        debug!(
            post_id = %content.id,
            handlers = outcome.executed.len(),
            "before_post_save folded"
        );
        apply_hook_fields(&mut content, outcome.data);

        let stored = self.store.insert(&content).await?;
        info!(
            post_id = %stored.id,
            author_id = %stored.author_id,
            kind = ?stored.kind,
            "Content saved"
        );

        let after = self
            .dispatcher
            .dispatch(&HookPoint::AfterPostSave, to_hook_value(&stored))
            .await;
        let failed = after.failures();
        if failed > 0 {
            warn!(post_id = %stored.id, failed, "after_post_save handlers failed");
        }

        Ok(stored)
    }

    /// Gets a stored item. NotFound if unknown.
    pub async fn get(&self, id: Uuid) -> AppResult<Content> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Content '{id}' not found")))
    }

    /// Renders a stored item: `post_content` then `post_meta` are folded
    /// over `{post}` and the final payload is returned.
    pub async fn render(&self, id: Uuid) -> AppResult<Value> {
        let content = self.get(id).await?;
        let payload = json!({ "post": to_hook_value(&content) });
        let rendered = self
            .dispatcher
            .dispatch(&HookPoint::PostContent, payload)
            .await;
        let with_meta = self
            .dispatcher
            .dispatch(&HookPoint::PostMeta, rendered.data)
            .await;
        Ok(with_meta.data)
    }

    /// Lists content, newest first. Authors only see their own items.
    pub async fn list(&self, user: &UserContext, mut filter: ContentFilter) -> AppResult<Vec<Content>> {
        if user.role == UserRole::Author {
            filter.author_id = Some(user.id.clone());
        }
        self.store.list(&filter).await
    }

    /// Content counts for the dashboard. Authors only see their own.
    pub async fn stats(&self, user: &UserContext) -> AppResult<ContentCounts> {
        let author = (user.role == UserRole::Author).then_some(user.id.as_str());
        self.store.counts(author).await
    }

    /// The most recent items as dashboard activity entries.
    pub async fn recent_activity(&self, user: &UserContext, limit: i64) -> AppResult<Vec<Value>> {
        let recent = self
            .list(
                user,
                ContentFilter {
                    limit: Some(limit),
                    ..Default::default()
                },
            )
            .await?;
        Ok(recent
            .iter()
            .map(|item| {
                json!({
                    "type": match item.kind {
                        ContentKind::Post => "post",
                        ContentKind::Page => "page",
                    },
                    "message": format!("{} \"{}\"", item.status, item.title),
                    "author_id": item.author_id,
                    "time": item.updated_at.to_rfc3339(),
                })
            })
            .collect())
    }
}

/// The JSON handlers see: host fields with the `extra` fields inlined.
/// Host fields win on a name clash.
pub fn to_hook_value(content: &Content) -> Value {
    let mut fields = match serde_json::to_value(content) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    };
    let extra = match fields.remove("extra") {
        Some(Value::Object(extra)) => extra,
        _ => Map::new(),
    };
    for (key, value) in extra {
        fields.entry(key).or_insert(value);
    }
    Value::Object(fields)
}

fn apply_hook_fields(content: &mut Content, folded: Value) {
    let Value::Object(mut fields) = folded else {
        warn!(post_id = %content.id, "before_post_save did not return an object, keeping draft");
        return;
    };

    match serde_json::from_value::<EditableFields>(Value::Object(fields.clone())) {
        Ok(edit) => {
            content.title = edit.title;
            content.content = edit.content;
            content.excerpt = edit.excerpt;
            content.status = edit.status;
            content.tags = edit.tags;
            content.category = edit.category;
            content.slug = edit.slug;
        }
        Err(e) => {
            warn!(post_id = %content.id, error = %e, "Ignoring malformed host fields from before_post_save");
        }
    }

    fields.retain(|key, _| !CONTENT_FIELDS.contains(&key.as_str()));
    content.extra = Value::Object(fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    use cms_database::InMemoryContentStore;
    use cms_plugin::{ClosureHandler, HookAction, HookRegistry, LocalDispatcher};

    async fn service_with(registry: Arc<HookRegistry>) -> ContentService {
        ContentService::new(
            Arc::new(InMemoryContentStore::new()),
            Arc::new(LocalDispatcher::new(registry)),
        )
    }

    fn author() -> UserContext {
        UserContext::new("u3", "Ann", UserRole::Author)
    }

    fn draft(title: &str) -> ContentDraft {
        ContentDraft {
            title: title.to_string(),
            content: "<p>Body</p>".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_plugin_fields_land_in_extra() {
        let registry = Arc::new(HookRegistry::new());
        registry
            .register(
                "seo",
                HookPoint::BeforePostSave,
                ClosureHandler::shared(|post| async move {
                    assert_eq!(post["author_id"], "u3");
                    Ok(HookAction::ContinueWith(json!({
                        "seo": {"score": 80},
                        "title": "Rewritten",
                        "author_id": "someone-else"
                    })))
                }),
                0,
            )
            .await;
        let service = service_with(registry).await;

        let saved = service.save_post(&author(), draft("Hello World")).await.unwrap();
        assert_eq!(saved.title, "Rewritten");
        assert_eq!(saved.author_id, "u3");
        assert_eq!(saved.slug, "hello-world");
        assert_eq!(saved.extra, json!({"seo": {"score": 80}}));

        let hook_view = to_hook_value(&saved);
        assert_eq!(hook_view["seo"]["score"], 80);
        assert!(hook_view.get("extra").is_none());
    }

    #[tokio::test]
    async fn test_client_extra_fields_pass_through() {
        let service = service_with(Arc::new(HookRegistry::new())).await;
        let mut input = draft("Extras");
        input.extra.insert("featured".into(), json!(true));

        let saved = service.save_post(&author(), input).await.unwrap();
        assert_eq!(saved.extra["featured"], true);
    }

    #[tokio::test]
    async fn test_after_save_sees_stored_post() {
        let registry = Arc::new(HookRegistry::new());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        registry
            .register(
                "audit",
                HookPoint::AfterPostSave,
                ClosureHandler::shared(move |post| {
                    let tx = tx.clone();
                    async move {
                        let _ = tx.send(post["id"].as_str().map(str::to_string));
                        Ok(HookAction::Continue)
                    }
                }),
                0,
            )
            .await;
        let service = service_with(registry).await;

        let saved = service.save_post(&author(), draft("Audited")).await.unwrap();
        assert_eq!(rx.recv().await.flatten(), Some(saved.id.to_string()));
    }

    #[tokio::test]
    async fn test_invalid_draft_is_rejected() {
        let service = service_with(Arc::new(HookRegistry::new())).await;
        let err = service.save_post(&author(), draft("")).await.unwrap_err();
        assert_eq!(err.kind, cms_core::error::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_authors_cannot_create_pages() {
        let service = service_with(Arc::new(HookRegistry::new())).await;
        let err = service
            .save(&author(), ContentKind::Page, draft("About"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, cms_core::error::ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_render_folds_post_content() {
        let registry = Arc::new(HookRegistry::new());
        registry
            .register(
                "forms",
                HookPoint::PostContent,
                ClosureHandler::shared(|payload| async move {
                    let body = payload["post"]["content"].as_str().unwrap_or_default();
                    Ok(HookAction::ContinueWith(json!({
                        "html": format!("{body}<form></form>")
                    })))
                }),
                0,
            )
            .await;
        let service = service_with(registry).await;
        let saved = service.save_post(&author(), draft("Contact")).await.unwrap();

        let rendered = service.render(saved.id).await.unwrap();
        assert_eq!(rendered["html"], "<p>Body</p><form></form>");
        assert_eq!(rendered["post"]["title"], "Contact");

        assert!(service.render(Uuid::new_v4()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_authors_see_only_their_counts() {
        let service = service_with(Arc::new(HookRegistry::new())).await;
        let editor = UserContext::new("u2", "Ed", UserRole::Editor);
        service.save_post(&author(), draft("Mine")).await.unwrap();
        service.save_post(&editor, draft("Theirs")).await.unwrap();

        assert_eq!(service.stats(&author()).await.unwrap().posts, 1);
        assert_eq!(service.stats(&editor).await.unwrap().posts, 2);
        assert_eq!(service.list(&author(), ContentFilter::default()).await.unwrap().len(), 1);

        let activity = service.recent_activity(&editor, 1).await.unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0]["type"], "post");
    }
}
