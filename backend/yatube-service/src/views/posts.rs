use super::{
    csrf_input, escape_html, field_errors, group_url, layout, linebreaks, post_url, profile_url,
    PageContext,
};
use crate::forms::{FormErrors, NON_FIELD};
use crate::models::Group;
use crate::services::PostDetail;

pub fn detail(ctx: &PageContext<'_>, detail: &PostDetail) -> String {
    let post = &detail.post;

    let mut aside = format!(
        "<aside>\n<p>Date: {}</p>\n",
        post.created_at.format("%d %b %Y")
    );
    if let (Some(slug), Some(title)) = (&post.group_slug, &post.group_title) {
        aside.push_str(&format!(
            "<p>Group: <a href=\"{}\">{}</a></p>\n",
            group_url(slug),
            escape_html(title)
        ));
    }
    aside.push_str(&format!(
        "<p>Author: <a href=\"{}\">{}</a></p>\n<p>Posts by this author: {}</p>\n</aside>\n",
        profile_url(&post.author_username),
        escape_html(&post.author_username),
        detail.author_posts_count
    ));

    let image = post
        .image
        .as_ref()
        .map(|path| format!("<img src=\"/media/{}\" alt=\"\">\n", escape_html(path)))
        .unwrap_or_default();

    let edit_link = match ctx.user {
        Some(user) if user.id == post.author_id => {
            format!("<a href=\"{}edit/\">Edit post</a>\n", post_url(post.id))
        }
        _ => String::new(),
    };

    let comment_form = if ctx.user.is_some() {
        format!(
            r#"<form method="post" action="{action}comment/">
{csrf}
<label for="id_text">Add a comment</label>
<textarea name="text" id="id_text" required></textarea>
<button type="submit">Send</button>
</form>
"#,
            action = post_url(post.id),
            csrf = csrf_input(ctx),
        )
    } else {
        String::new()
    };

    let comments: String = detail
        .comments
        .iter()
        .map(|comment| {
            format!(
                "<div class=\"comment\"><h5><a href=\"{}\">{}</a></h5><p>{}</p></div>\n",
                profile_url(&comment.author_username),
                escape_html(&comment.author_username),
                linebreaks(&comment.text)
            )
        })
        .collect();

    let body = format!(
        "{aside}<article>\n{image}<p>{text}</p>\n{edit}</article>\n{form}<section class=\"comments\">\n{comments}</section>\n",
        aside = aside,
        image = image,
        text = linebreaks(&post.text),
        edit = edit_link,
        form = comment_form,
        comments = comments,
    );
    layout(ctx, &format!("Post {}", post.excerpt(30)), &body)
}

/// Values to pre-fill the create/edit form with
#[derive(Debug, Clone, Default)]
pub struct PostFormValues {
    pub text: String,
    pub group: Option<String>,
    pub current_image: Option<String>,
}

/// Create form when `post_id` is `None`, edit form otherwise
pub fn form(
    ctx: &PageContext<'_>,
    post_id: Option<i64>,
    values: &PostFormValues,
    groups: &[Group],
    errors: &FormErrors,
) -> String {
    let (heading, action, button) = match post_id {
        Some(id) => ("Edit post", format!("{}edit/", post_url(id)), "Save"),
        None => ("New post", "/create/".to_string(), "Add"),
    };

    let mut options = String::from("<option value=\"\">---------</option>\n");
    for group in groups {
        let value = group.id.to_string();
        let selected = if values.group.as_deref() == Some(value.as_str()) {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            value,
            selected,
            escape_html(&group.title)
        ));
    }

    let current_image = values
        .current_image
        .as_ref()
        .map(|path| {
            format!(
                "<p>Currently: <a href=\"/media/{0}\">{0}</a></p>\n",
                escape_html(path)
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"<h1>{heading}</h1>
{non_field}<form method="post" action="{action}" enctype="multipart/form-data">
{csrf}
<label for="id_text">Text</label>
{text_errors}<textarea name="text" id="id_text" required>{text}</textarea>
<label for="id_group">Group</label>
{group_errors}<select name="group" id="id_group">
{options}</select>
<label for="id_image">Image</label>
{image_errors}{current_image}<input type="file" name="image" id="id_image" accept="image/*">
<button type="submit">{button}</button>
</form>
"#,
        heading = heading,
        non_field = field_errors(errors, NON_FIELD),
        action = action,
        csrf = csrf_input(ctx),
        text_errors = field_errors(errors, "text"),
        text = escape_html(&values.text),
        group_errors = field_errors(errors, "group"),
        options = options,
        image_errors = field_errors(errors, "image"),
        current_image = current_image,
        button = button,
    );
    layout(ctx, heading, &body)
}
