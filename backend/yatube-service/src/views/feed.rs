use super::{escape_html, layout, linebreaks, paginator, post_list, profile_url, PageContext};
use crate::models::PostView;
use crate::services::{GroupFeed, Page, ProfileFeed};

pub fn index(ctx: &PageContext<'_>, page: &Page<PostView>) -> String {
    let body = format!(
        "<h1>Latest updates on the site</h1>\n{}{}",
        post_list(&page.items, true),
        paginator(&page.window)
    );
    layout(ctx, "Yatube home page", &body)
}

pub fn group(ctx: &PageContext<'_>, feed: &GroupFeed) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n{}{}",
        escape_html(&feed.group.title),
        linebreaks(&feed.group.description),
        post_list(&feed.page.items, false),
        paginator(&feed.page.window)
    );
    layout(ctx, &format!("Posts of group {}", feed.group.title), &body)
}

pub fn profile(ctx: &PageContext<'_>, feed: &ProfileFeed) -> String {
    let author = &feed.author;
    let profile = profile_url(&author.username);

    let follow_button = match ctx.user {
        Some(viewer) if viewer.id != author.id => {
            if feed.following {
                format!(
                    r#"<a class="btn" href="{}unfollow/">Unfollow</a>"#,
                    profile
                )
            } else {
                format!(
                    r#"<a class="btn" href="{}follow/">Follow</a>"#,
                    profile
                )
            }
        }
        _ => String::new(),
    };

    let body = format!(
        r#"<h1>All posts by {name}</h1>
<h3>Posts: {posts}</h3>
<p>Followers: {followers} &middot; Following: {following}</p>
{button}
{posts_html}{pages}"#,
        name = escape_html(&author.display_name()),
        posts = feed.posts_count,
        followers = feed.followers_count,
        following = feed.following_count,
        button = follow_button,
        posts_html = post_list(&feed.page.items, true),
        pages = paginator(&feed.page.window),
    );
    layout(ctx, &format!("Profile of {}", author.display_name()), &body)
}

pub fn follow(ctx: &PageContext<'_>, page: &Page<PostView>) -> String {
    let posts = if page.is_empty() {
        "<p>No posts from the authors you follow yet.</p>\n".to_string()
    } else {
        post_list(&page.items, true)
    };
    let body = format!(
        "<h1>Posts by authors you follow</h1>\n{}{}",
        posts,
        paginator(&page.window)
    );
    layout(ctx, "Following", &body)
}
