//! Server-rendered chat page

use axum::{
    extract::{Form, State},
    response::Html,
};
use pulldown_cmark::{html, Options, Parser};
use tracing::info;

use super::chat::answer;
use super::state::AppState;
use super::types::ChatForm;

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Q/A Chatbot</title>
  <style>
    body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
    form { display: flex; gap: .5rem; }
    input[name=message] { flex: 1; padding: .5rem; }
    #response { margin-top: 1.5rem; line-height: 1.6; }
  </style>
</head>
<body>
  <h1>Q/A Chatbot</h1>
  <form method="post" action="/chat">
    <input name="message" placeholder="請輸入問題" autofocus required>
    <button type="submit">送出</button>
  </form>
  <div id="response">{{response}}</div>
</body>
</html>
"#;

/// Render markdown answer text as an HTML fragment
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

fn render_page(response_html: &str) -> Html<String> {
    Html(INDEX_TEMPLATE.replace("{{response}}", response_html))
}

pub async fn index() -> Html<String> {
    render_page("")
}

pub async fn chat_form(State(state): State<AppState>, Form(form): Form<ChatForm>) -> Html<String> {
    info!("Form chat request");
    let reply = answer(state.chatbot.as_ref(), None, &form.message).await;
    render_page(&render_markdown(&reply))
}
