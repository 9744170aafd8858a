// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Json;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::html;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use catechist_core::AnswerSegment;
use catechist_core::Item;
use catechist_core::ItemId;
use catechist_core::Language;
use catechist_core::Outcome;
use catechist_core::Phase;
use catechist_core::context::build_context;
use catechist_core::context::find_relevant;
use catechist_core::search::Filter;
use catechist_core::search::filter_items;
use catechist_core::speech::speech_text;

use crate::cmd::serve::state::MutableState;
use crate::cmd::serve::state::ServerState;
use crate::cmd::serve::template::page_template;

/// Interface labels per language.
struct UiText {
    app_title: &'static str,
    browse: &'static str,
    quiz: &'static str,
    search_placeholder: &'static str,
    questions: &'static str,
    saved: &'static str,
    view_all: &'static str,
    empty_saved: &'static str,
    no_results: &'static str,
    answer: &'static str,
    proofs: &'static str,
    listen: &'static str,
    show_answer: &'static str,
    got_it: &'static str,
    missed_it: &'static str,
    question_face: &'static str,
    answer_face: &'static str,
    quiz_complete: &'static str,
    correct_label: &'static str,
    minutes: &'static str,
    restart: &'static str,
    finish: &'static str,
}

const UI_EN: UiText = UiText {
    app_title: "Shorter Catechism",
    browse: "Browse",
    quiz: "Quiz",
    search_placeholder: "Search questions...",
    questions: "questions",
    saved: "Saved",
    view_all: "View all",
    empty_saved: "No saved questions yet.",
    no_results: "No questions found.",
    answer: "Answer",
    proofs: "Scripture Proofs",
    listen: "Listen",
    show_answer: "Show Answer",
    got_it: "Got it",
    missed_it: "Missed it",
    question_face: "Question",
    answer_face: "Answer",
    quiz_complete: "Session Complete",
    correct_label: "correct",
    minutes: "min",
    restart: "Start a New Session",
    finish: "Finish",
};

const UI_ZH: UiText = UiText {
    app_title: "小要理问答",
    browse: "浏览",
    quiz: "测验",
    search_placeholder: "搜索问题…",
    questions: "个问题",
    saved: "已收藏",
    view_all: "查看全部",
    empty_saved: "还没有收藏的问题。",
    no_results: "没有找到相关问题。",
    answer: "回答",
    proofs: "经文根据",
    listen: "朗读",
    show_answer: "显示答案",
    got_it: "答对了",
    missed_it: "答错了",
    question_face: "问题",
    answer_face: "答案",
    quiz_complete: "练习完成",
    correct_label: "答对",
    minutes: "分钟",
    restart: "开始新的练习",
    finish: "结束",
};

fn ui(language: Language) -> &'static UiText {
    match language {
        Language::En => &UI_EN,
        Language::Zh => &UI_ZH,
    }
}

#[derive(Deserialize)]
pub struct BrowseParams {
    #[serde(default)]
    pub q: String,
    pub saved: Option<u8>,
    pub expand: Option<ItemId>,
}

impl BrowseParams {
    pub fn saved_only(&self) -> bool {
        self.saved == Some(1)
    }
}

/// The browse view URL carrying the given filter state.
pub fn browse_url(query: &str, saved: bool, expand: Option<ItemId>) -> String {
    let mut params: Vec<String> = Vec::new();
    if !query.is_empty() {
        params.push(format!("q={}", utf8_percent_encode(query, NON_ALPHANUMERIC)));
    }
    if saved {
        params.push("saved=1".to_string());
    }
    if let Some(id) = expand {
        params.push(format!("expand={id}"));
    }
    if params.is_empty() {
        "/".to_string()
    } else {
        format!("/?{}", params.join("&"))
    }
}

pub async fn browse_handler(
    State(state): State<ServerState>,
    Query(params): Query<BrowseParams>,
) -> (StatusCode, Html<String>) {
    let m = state.mutable.lock().unwrap();
    let t = ui(m.language);
    let items = state.catalog.items(m.language);
    let filter = Filter {
        query: &params.q,
        bookmarked_only: params.saved_only(),
    };
    let filtered = filter_items(items, &m.bookmarks, filter);
    let here = browse_url(&params.q, params.saved_only(), params.expand);
    let body = html! {
        (header_bar(m.language, &params.q, params.saved_only(), &here))
        main .browse {
            div .browse-meta {
                span .count { (filtered.len()) " " (t.questions) }
                a .pill .active[params.saved_only()]
                    href=(browse_url(&params.q, !params.saved_only(), None)) {
                    "★ " @if params.saved_only() { (t.view_all) } @else { (t.saved) }
                }
            }
            @if filtered.is_empty() {
                p .empty {
                    @if params.saved_only() { (t.empty_saved) } @else { (t.no_results) }
                }
            }
            @for (id, item) in &filtered {
                (browse_card(*id, item, &m, &params))
            }
        }
    };
    (
        StatusCode::OK,
        Html(page_template(m.language, t.app_title, body).into_string()),
    )
}

fn browse_card(id: ItemId, item: &Item, m: &MutableState, params: &BrowseParams) -> Markup {
    let t = ui(m.language);
    let expanded = params.expand == Some(id);
    let toggle_url = browse_url(
        &params.q,
        params.saved_only(),
        if expanded { None } else { Some(id) },
    );
    let bookmarked = m.bookmarks.contains(&id);
    // Read the question, then the answer.
    let readout = speech_text(&format!("{} {}", item.question, item.answer));
    html! {
        article .card .expanded[expanded] {
            div .card-head {
                a .card-question href=(toggle_url) {
                    span .qnum { (id) }
                    h3 { (item.question) }
                }
                div .card-actions {
                    form method="post"
                        action=(format!("/bookmark/{id}{}", bookmark_suffix(params))) {
                        button .star .active[bookmarked] type="submit" title=(t.saved) {
                            @if bookmarked { "★" } @else { "☆" }
                        }
                    }
                    button .speech data-speech=(readout) data-lang=(m.language.speech_tag())
                        title=(t.listen) { "🔊" }
                }
            }
            @if expanded {
                div .card-body {
                    div .label { (t.answer) }
                    p .answer { (answer_markup(item)) }
                    @for group in 0..item.footnote_groups() {
                        (scripture_block(item, group, m.language))
                    }
                }
            }
        }
    }
}

/// Query-string suffix so the bookmark redirect lands back on the same view.
fn bookmark_suffix(params: &BrowseParams) -> String {
    let url = browse_url(&params.q, params.saved_only(), params.expand);
    url.trim_start_matches('/').to_string()
}

/// Answer text with inert footnote markers, for the browse view.
fn answer_markup(item: &Item) -> Markup {
    html! {
        @for segment in item.answer_segments() {
            @match segment {
                AnswerSegment::Text(text) => {
                    span { (text) }
                },
                AnswerSegment::Marker(index) => {
                    sup .marker { "[" ((index + 1)) "]" }
                },
            }
        }
    }
}

/// Answer text whose footnote markers toggle the matching scripture group.
fn quiz_answer_markup(item: &Item, active: Option<usize>) -> Markup {
    html! {
        @for segment in item.answer_segments() {
            @match segment {
                AnswerSegment::Text(text) => {
                    span { (text) }
                },
                AnswerSegment::Marker(index) => {
                    form .marker-form method="post" action="/quiz" {
                        input type="hidden" name="action" value="Footnote";
                        input type="hidden" name="index" value=(index);
                        button .marker .active[active == Some(index)] type="submit" {
                            ((index + 1))
                        }
                    }
                },
            }
        }
    }
}

fn scripture_block(item: &Item, group: usize, language: Language) -> Markup {
    let t = ui(language);
    html! {
        div .scriptures {
            h4 { (t.proofs) " [" ((group + 1)) "]" }
            @for reference in &item.scriptures[group] {
                div .reference {
                    span .ref-title { (reference.title) }
                    span .ref-text { "\u{201c}" (reference.text.trim()) "\u{201d}" }
                }
            }
        }
    }
}

fn header_bar(language: Language, query: &str, saved: bool, next: &str) -> Markup {
    let t = ui(language);
    html! {
        header {
            a .brand href="/" { (t.app_title) }
            form .search method="get" action="/" {
                input type="search" name="q" value=(query) placeholder=(t.search_placeholder);
                @if saved {
                    input type="hidden" name="saved" value="1";
                }
            }
            nav {
                a href="/" { (t.browse) }
                a href="/quiz" { (t.quiz) }
                form method="post" action="/language" {
                    input type="hidden" name="next" value=(next);
                    button .lang type="submit" { (language.toggle_label()) }
                }
            }
        }
    }
}

pub async fn quiz_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let m = state.mutable.lock().unwrap();
    let t = ui(m.language);
    let body = match m.session.phase() {
        Phase::Complete => render_summary(&state, &m),
        Phase::Active => match render_card(&state, &m) {
            Some(markup) => markup,
            None => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("Internal Server Error".to_string()),
                );
            }
        },
    };
    (
        StatusCode::OK,
        Html(page_template(m.language, t.app_title, body).into_string()),
    )
}

/// The flashcard view. Returns None only if the session queue holds an id
/// the catalog cannot resolve, which start() rules out.
fn render_card(state: &ServerState, m: &MutableState) -> Option<Markup> {
    let t = ui(m.language);
    let session = &m.session;
    let item = state.catalog.item(m.language, session.current_item_id())?;
    Some(html! {
        (header_bar(m.language, "", false, "/quiz"))
        main .quiz {
            div .progress {
                span .position { ((session.cursor() + 1)) " / " (session.queue().len()) }
                div .dots {
                    @for (index, id) in session.queue().iter().enumerate() {
                        @let outcome = session.result_for(*id);
                        span .dot
                            .current[index == session.cursor()]
                            .correct[outcome == Some(Outcome::Correct)]
                            .wrong[outcome == Some(Outcome::Wrong)] {}
                    }
                }
            }
            div .flashcard {
                @if !session.revealed() {
                    div .face .front {
                        h2 { (item.question) }
                        button .speech data-speech=(speech_text(&item.question))
                            data-lang=(m.language.speech_tag()) { "🔊 " (t.listen) }
                    }
                    form .flip method="post" action="/quiz" {
                        input type="hidden" name="action" value="Flip";
                        button .primary type="submit" { (t.show_answer) }
                    }
                } @else {
                    div .face .back {
                        p .question-small { (item.question) }
                        div .label { (t.answer) }
                        p .answer { (quiz_answer_markup(item, session.active_footnote())) }
                        @if let Some(group) = session.active_footnote() {
                            (scripture_block(item, group, m.language))
                        }
                        button .speech data-speech=(speech_text(&item.answer))
                            data-lang=(m.language.speech_tag()) { "🔊 " (t.listen) }
                    }
                    div .grade {
                        form method="post" action="/quiz" {
                            input type="hidden" name="action" value="Wrong";
                            button .wrong type="submit" { (t.missed_it) }
                        }
                        form method="post" action="/quiz" {
                            input type="hidden" name="action" value="Correct";
                            button .correct type="submit" { (t.got_it) }
                        }
                    }
                }
            }
            div .quiz-nav {
                form method="post" action="/quiz" {
                    input type="hidden" name="action" value="Previous";
                    button .ghost type="submit" { "‹" }
                }
                span .face-label {
                    @if session.revealed() { (t.answer_face) } @else { (t.question_face) }
                }
                form method="post" action="/quiz" {
                    input type="hidden" name="action" value="Next";
                    button .ghost type="submit" { "›" }
                }
            }
        }
    })
}

fn render_summary(state: &ServerState, m: &MutableState) -> Markup {
    let t = ui(m.language);
    let score = m.session.score();
    html! {
        (header_bar(m.language, "", false, "/quiz"))
        main .quiz {
            div .summary {
                h2 { (t.quiz_complete) }
                div .percentage { (score.percentage()) "%" }
                p .tally { (score.correct) " / " (score.queue_len) " " (t.correct_label) }
                @if let Some(finished_at) = m.finished_at {
                    p .elapsed {
                        (finished_at.minutes_since(state.session_started_at)) " " (t.minutes)
                    }
                }
                form method="post" action="/quiz" {
                    input type="hidden" name="action" value="Restart";
                    button .primary type="submit" { (t.restart) }
                }
                form method="post" action="/quiz" {
                    input type="hidden" name="action" value="End";
                    button .ghost type="submit" { (t.finish) }
                }
            }
        }
    }
}

#[derive(Deserialize)]
pub struct ContextParams {
    #[serde(default)]
    pub q: String,
}

/// Context for an external model frontend: the items relevant to the query,
/// formatted as a prompt block, plus their catalog ids for deep links.
pub async fn context_handler(
    State(state): State<ServerState>,
    Query(params): Query<ContextParams>,
) -> Json<Value> {
    let m = state.mutable.lock().unwrap();
    let items = state.catalog.items(m.language);
    let relevant = find_relevant(&params.q, items);
    let context = build_context(&relevant, m.language);
    let ids: Vec<ItemId> = relevant.iter().map(|(id, _)| *id).collect();
    Json(json!({ "context": context, "ids": ids }))
}
