use super::{csrf_input, escape_html, field_errors, layout, PageContext};
use crate::forms::{FormErrors, SignupForm, NON_FIELD};

fn text_input(name: &str, label: &str, kind: &str, value: &str, errors: &FormErrors) -> String {
    format!(
        "<label for=\"id_{name}\">{label}</label>\n{errors}<input type=\"{kind}\" name=\"{name}\" id=\"id_{name}\" value=\"{value}\">\n",
        name = name,
        label = label,
        errors = field_errors(errors, name),
        kind = kind,
        value = escape_html(value),
    )
}

pub fn signup(ctx: &PageContext<'_>, values: &SignupForm, errors: &FormErrors) -> String {
    let fields = [
        text_input("first_name", "First name", "text", &values.first_name, errors),
        text_input("last_name", "Last name", "text", &values.last_name, errors),
        text_input("username", "Username", "text", &values.username, errors),
        text_input("email", "Email address", "email", &values.email, errors),
        // Passwords are never echoed back
        text_input("password1", "Password", "password", "", errors),
        text_input("password2", "Password confirmation", "password", "", errors),
    ]
    .concat();

    let body = format!(
        "<h1>Sign up</h1>\n{}<form method=\"post\" action=\"/auth/signup/\">\n{}\n{}<button type=\"submit\">Sign up</button>\n</form>\n",
        field_errors(errors, NON_FIELD),
        csrf_input(ctx),
        fields
    );
    layout(ctx, "Sign up", &body)
}

pub fn login(
    ctx: &PageContext<'_>,
    username: &str,
    next: Option<&str>,
    errors: &FormErrors,
) -> String {
    let next_input = next
        .map(|next| {
            format!(
                "<input type=\"hidden\" name=\"next\" value=\"{}\">\n",
                escape_html(next)
            )
        })
        .unwrap_or_default();

    let body = format!(
        "<h1>Log in</h1>\n{non_field}<form method=\"post\" action=\"/auth/login/\">\n{csrf}\n{next}{username}{password}<button type=\"submit\">Log in</button>\n</form>\n",
        non_field = field_errors(errors, NON_FIELD),
        csrf = csrf_input(ctx),
        next = next_input,
        username = text_input("username", "Username", "text", username, errors),
        password = text_input("password", "Password", "password", "", errors),
    );
    layout(ctx, "Log in", &body)
}

pub fn logged_out(ctx: &PageContext<'_>) -> String {
    layout(
        ctx,
        "Logged out",
        "<h1>You have been logged out</h1>\n<p><a href=\"/auth/login/\">Log in again</a></p>\n",
    )
}
