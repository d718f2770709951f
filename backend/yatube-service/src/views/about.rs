use super::{layout, PageContext};

pub fn author(ctx: &PageContext<'_>) -> String {
    layout(
        ctx,
        "About the author",
        "<h1>About the author</h1>\n<p>Yatube is a small blogging platform: write posts, join groups, follow the people you like.</p>\n",
    )
}

pub fn tech(ctx: &PageContext<'_>) -> String {
    layout(
        ctx,
        "Technologies",
        "<h1>Technologies</h1>\n<ul>\n<li>Rust, actix-web</li>\n<li>PostgreSQL via sqlx</li>\n<li>Redis page and session cache</li>\n</ul>\n",
    )
}
