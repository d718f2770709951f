//! Server-side HTML rendering.
//!
//! Every page is a plain function returning a `String`. Dynamic text goes
//! through [`escape_html`] before it reaches the markup.

pub mod about;
pub mod auth;
pub mod errors;
pub mod feed;
pub mod posts;

use crate::forms::FormErrors;
use crate::models::{PostView, User};
use crate::services::PageWindow;

/// Per-request values shared by every page
#[derive(Debug, Clone, Copy, Default)]
pub struct PageContext<'a> {
    pub user: Option<&'a User>,
    pub csrf_token: &'a str,
}

impl<'a> PageContext<'a> {
    pub fn new(user: Option<&'a User>, csrf_token: &'a str) -> Self {
        Self { user, csrf_token }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Path of an author's profile page; usernames may contain `@` and `+`
pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

pub fn group_url(slug: &str) -> String {
    format!("/group/{}/", urlencoding::encode(slug))
}

pub fn post_url(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

/// Escaped text with line breaks kept
pub fn linebreaks(input: &str) -> String {
    escape_html(input).replace("\r\n", "\n").replace('\n', "<br>\n")
}

fn nav(ctx: &PageContext<'_>) -> String {
    let mut links = String::from(
        r#"<a href="/">Home</a> <a href="/about/author/">About the author</a> <a href="/about/tech/">Technologies</a>"#,
    );
    match ctx.user {
        Some(user) => links.push_str(&format!(
            r#" <a href="/create/">New post</a> <a href="/follow/">Following</a> <a href="{href}">{username}</a> <a href="/auth/logout/">Log out</a>"#,
            href = profile_url(&user.username),
            username = escape_html(&user.username),
        )),
        None => links.push_str(r#" <a href="/auth/login/">Log in</a> <a href="/auth/signup/">Sign up</a>"#),
    }
    format!("<nav>{}</nav>", links)
}

/// Full HTML document around `body`
pub fn layout(ctx: &PageContext<'_>, title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<header>{nav}</header>
<main>
{body}
</main>
<footer><p>&copy; Yatube</p></footer>
</body>
</html>
"#,
        title = escape_html(title),
        nav = nav(ctx),
        body = body,
    )
}

pub fn csrf_input(ctx: &PageContext<'_>) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}">"#,
        crate::forms::CSRF_FIELD,
        escape_html(ctx.csrf_token)
    )
}

/// Error list for one form field (empty string when there are none)
pub fn field_errors(errors: &FormErrors, field: &str) -> String {
    let messages = errors.get(field);
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", escape_html(m)))
        .collect();
    format!(r#"<ul class="errorlist">{}</ul>"#, items)
}

/// First/previous/current/next/last links; nothing for a single page
pub fn paginator(window: &PageWindow) -> String {
    if window.num_pages <= 1 {
        return String::new();
    }

    let mut parts = Vec::new();
    if let Some(previous) = window.previous_page_number() {
        parts.push(r#"<a href="?page=1">&laquo; first</a>"#.to_string());
        parts.push(format!(r#"<a href="?page={}">previous</a>"#, previous));
    }
    parts.push(format!(
        r#"<span class="current">Page {} of {}</span>"#,
        window.number, window.num_pages
    ));
    if let Some(next) = window.next_page_number() {
        parts.push(format!(r#"<a href="?page={}">next</a>"#, next));
        parts.push(format!(
            r#"<a href="?page={}">last &raquo;</a>"#,
            window.num_pages
        ));
    }
    format!(r#"<nav class="pagination">{}</nav>"#, parts.join(" "))
}

/// One post in a feed. `show_group` is false on the group page itself.
pub fn post_card(post: &PostView, show_group: bool) -> String {
    let mut html = String::from("<article class=\"post\">\n<ul>\n");
    html.push_str(&format!(
        "<li>Author: <a href=\"{}\">{}</a></li>\n",
        profile_url(&post.author_username),
        escape_html(&post.author_username)
    ));
    html.push_str(&format!(
        "<li>Date: {}</li>\n</ul>\n",
        post.created_at.format("%d %b %Y")
    ));
    if let Some(image) = &post.image {
        html.push_str(&format!(
            "<img src=\"/media/{}\" alt=\"\">\n",
            escape_html(image)
        ));
    }
    html.push_str(&format!("<p>{}</p>\n", linebreaks(&post.text)));
    html.push_str(&format!(
        "<a href=\"{}\">details</a>\n",
        post_url(post.id)
    ));
    if show_group {
        if let (Some(slug), Some(title)) = (&post.group_slug, &post.group_title) {
            html.push_str(&format!(
                "<a href=\"{}\">#{}</a>\n",
                group_url(slug),
                escape_html(title)
            ));
        }
    }
    html.push_str("</article>\n<hr>\n");
    html
}

/// Cards for a page of posts
pub fn post_list(posts: &[PostView], show_group: bool) -> String {
    posts.iter().map(|post| post_card(post, show_group)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Paginator;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#x27;y&#x27;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_paginator_links() {
        let window = Paginator::new(10).window(25, Some("2"));
        let html = paginator(&window);
        assert!(html.contains(r#"href="?page=1""#));
        assert!(html.contains(r#"href="?page=3""#));
        assert!(html.contains("Page 2 of 3"));

        let single = Paginator::new(10).window(3, None);
        assert_eq!(paginator(&single), "");
    }

    #[test]
    fn test_layout_nav_depends_on_user() {
        let anon = layout(&PageContext::anonymous(), "t", "");
        assert!(anon.contains("/auth/login/"));
        assert!(!anon.contains("/create/"));
    }

    #[test]
    fn test_post_card_links_are_url_encoded() {
        let post = PostView {
            id: 7,
            text: "hello".into(),
            image: None,
            created_at: chrono::Utc::now(),
            author_id: 1,
            author_username: "leo+tol@x".into(),
            group_id: Some(2),
            group_slug: Some("cats".into()),
            group_title: Some("Cats & dogs".into()),
        };
        let html = post_card(&post, true);
        assert!(html.contains(r#"href="/profile/leo%2Btol%40x/""#));
        assert!(html.contains(">leo+tol@x<"));
        assert!(html.contains(r#"href="/posts/7/""#));
        assert!(html.contains(r#"href="/group/cats/""#));
        assert!(html.contains("#Cats &amp; dogs"));
        assert_eq!(profile_url("leo+tol@x"), "/profile/leo%2Btol%40x/");
    }
}
