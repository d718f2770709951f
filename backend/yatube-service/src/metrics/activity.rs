use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    /// Posts published through the create form.
    pub static ref POSTS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "yatube_posts_created_total",
        "Total posts created"
    )
    .expect("failed to register yatube_posts_created_total");

    /// Posts changed through the edit form.
    pub static ref POSTS_EDITED_TOTAL: IntCounter = register_int_counter!(
        "yatube_posts_edited_total",
        "Total posts edited by their author"
    )
    .expect("failed to register yatube_posts_edited_total");

    pub static ref COMMENTS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "yatube_comments_created_total",
        "Total comments created"
    )
    .expect("failed to register yatube_comments_created_total");

    /// Follow graph changes (follow/unfollow) that altered an edge.
    pub static ref FOLLOW_CHANGES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "yatube_follow_changes_total",
        "Follow edges created or removed segmented by action",
        &["action"]
    )
    .expect("failed to register yatube_follow_changes_total");

    /// Index page cache lookups (hit/miss/error).
    pub static ref INDEX_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "yatube_index_cache_events_total",
        "Index page cache events segmented by outcome",
        &["event"]
    )
    .expect("failed to register yatube_index_cache_events_total");

    /// Login attempts by outcome (success/failure).
    pub static ref LOGIN_ATTEMPTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "yatube_login_attempts_total",
        "Login attempts segmented by result",
        &["result"]
    )
    .expect("failed to register yatube_login_attempts_total");
}
