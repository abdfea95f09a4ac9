//! The thumbnail hook against the SQLite host adapter.

use std::sync::Arc;
use integration_tests::*;
use tt_core::models::{PostProcessed, CATEGORY_OPT_IN_FIELD};
use tt_core::settings;
use tt_core::traits::ForumStore;
use tt_core::{HookRegistry, Ineligible, Outcome, ThumbnailHook};
use tt_db_sqlite::SqliteForumStore;
use uuid::Uuid;

async fn thumbnail_of(store: &SqliteForumStore, thread_id: Uuid) -> Option<Uuid> {
    store.get_thread(thread_id).await.unwrap().unwrap().image_upload_id
}

#[tokio::test]
async fn sqlite_concrete_scenario() {
    let store = Arc::new(SqliteForumStore::new("sqlite::memory:").await.unwrap());
    store.set_setting(settings::ENABLED, true).await.unwrap();

    let starter = Uuid::now_v7();
    let cat = category(true);
    let t = thread(starter, Some(&cat));
    store.insert_category(&cat).await.unwrap();
    store.insert_thread(&t).await.unwrap();

    let (j, g, k, l) = (jpeg(), gif(), png(), png());
    for u in [&j, &g, &k, &l] {
        store.insert_upload(u).await.unwrap();
    }

    let mut hooks = HookRegistry::new();
    hooks.register(Arc::new(ThumbnailHook::new(store.clone(), store.clone())));

    let steps = [
        (post(&t, starter, Some(&j)), Some(j.id)),
        (post(&t, starter, Some(&g)), Some(j.id)),
        (post(&t, Uuid::now_v7(), Some(&k)), Some(j.id)),
        (post(&t, starter, Some(&l)), Some(l.id)),
    ];

    for (p, expected) in steps {
        store.insert_post(&p).await.unwrap();
        // the receiver always dispatches the post as the host stored it
        let stored = store.get_post(p.id).await.unwrap().unwrap();
        hooks.dispatch(&PostProcessed { post: stored }).await.unwrap();
        assert_eq!(thumbnail_of(&store, t.id).await, expected);
    }
}

#[tokio::test]
async fn sqlite_category_field_written_by_host() {
    let store = Arc::new(SqliteForumStore::new("sqlite::memory:").await.unwrap());
    store.set_setting(settings::ENABLED, true).await.unwrap();

    let starter = Uuid::now_v7();
    let cat = category(false);
    let t = thread(starter, Some(&cat));
    let j = jpeg();
    store.insert_category(&cat).await.unwrap();
    store.insert_thread(&t).await.unwrap();
    store.insert_upload(&j).await.unwrap();

    let mut hooks = HookRegistry::new();
    hooks.register(Arc::new(ThumbnailHook::new(store.clone(), store.clone())));
    let event = PostProcessed { post: post(&t, starter, Some(&j)) };

    let reports = hooks.dispatch(&event).await.unwrap();
    assert_eq!(reports[0].outcome, Outcome::Skipped { reason: Ineligible::CategoryNotOptedIn });

    // hosts typically store custom field booleans as "t"/"f"
    store.set_category_field(cat.id, CATEGORY_OPT_IN_FIELD, "t").await.unwrap();
    let reports = hooks.dispatch(&event).await.unwrap();
    assert_eq!(reports[0].outcome, Outcome::Applied { thread_id: t.id, upload_id: j.id });
    assert_eq!(thumbnail_of(&store, t.id).await, Some(j.id));
}
