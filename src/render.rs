//! Server side HTML for the two screens. The pages re-render by reloading
//! whenever `/api/events` reports a change.

use crate::quiz::Side;
use crate::session::{QuizView, SessionView};
use html_escape::{encode_double_quoted_attribute, encode_text};

const STYLE: &str = r#"
        body {
            margin: 0;
            padding: 0;
            font-family: Arial, sans-serif;
        }
        #header {
            background-color: #4CAF50;
            color: white;
            text-align: center;
            padding: 10px;
        }
        .content {
            max-width: 640px;
            margin: 0 auto;
            padding: 20px;
        }
        input {
            width: 100%;
            box-sizing: border-box;
            padding: 10px;
            margin-bottom: 10px;
            border: 1px solid #ccc;
            border-radius: 5px;
        }
        .button {
            padding: 10px 15px;
            font-size: 16px;
            border: none;
            border-radius: 5px;
            cursor: pointer;
            background-color: #2196F3;
            color: white;
        }
        .danger {
            background-color: #F44336;
        }
        #error {
            color: #F44336;
        }
        ul {
            list-style: none;
            padding: 0;
        }
        li {
            display: flex;
            justify-content: space-between;
            align-items: center;
            padding: 10px 0;
            border-bottom: 1px solid #eee;
        }
        .meta {
            color: #888;
            font-size: 12px;
        }
        .card {
            padding: 30px;
            margin: 10px 0;
            border-radius: 8px;
            text-align: center;
            cursor: pointer;
            background-color: #2196F3;
            color: white;
            transition: transform 0.4s;
        }
        .card.answer {
            background-color: #4CAF50;
            transform: rotateX(360deg);
        }
"#;

const SCRIPT: &str = r#"
        var reloading = false;
        function refresh() {
            if (!reloading) {
                reloading = true;
                setTimeout(function () { location.reload(); }, 0);
            }
        }

        // with `navigate` the page leaves for that url instead of reloading,
        // and no reload may be queued meanwhile or it cancels the navigation
        function send(method, url, body, navigate) {
            var init = { method: method, headers: { 'Content-Type': 'application/json' } };
            if (body !== undefined) {
                init.body = JSON.stringify(body);
            }
            if (navigate !== undefined) {
                reloading = true;
            }
            return fetch(url, init).then(function (response) {
                return response.json().then(function (data) {
                    if (!response.ok) {
                        throw new Error(data.error || response.statusText);
                    }
                    if (navigate !== undefined) {
                        location.href = navigate;
                    } else {
                        refresh();
                    }
                    return data;
                });
            }).catch(function (error) {
                if (navigate !== undefined) {
                    reloading = false;
                }
                throw error;
            });
        }

        function createCard() {
            var question = document.getElementById('question').value;
            var answer = document.getElementById('answer').value;
            send('POST', '/api/cards', { question: question, answer: answer })
                .catch(function (error) {
                    document.getElementById('error').textContent = error.message;
                });
        }

        new EventSource('/api/events').onmessage = refresh;
"#;

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    <div id="header">{title}</div>
    <div class="content">
{body}
    </div>
    <script>{SCRIPT}</script>
</body>
</html>
"#,
        title = encode_text(title),
    )
}

/// Main screen: input form, card list, reset and quiz navigation.
pub fn index(title: &str, view: &SessionView) -> String {
    let mut body = format!(
        r#"        <input id="question" type="text" placeholder="Type your question here" value="{}">
        <input id="answer" type="text" placeholder="Type the answer here" value="{}">
        <button id="create" class="button" onclick="createCard()">Create Flashcard</button>
        <p id="error"></p>
"#,
        encode_double_quoted_attribute(&view.form.question),
        encode_double_quoted_attribute(&view.form.answer),
    );

    if view.cards.is_empty() {
        body.push_str("        <p id=\"empty\">No flashcards yet.</p>\n");
    } else {
        body.push_str("        <ul id=\"cards\">\n");
        for card in &view.cards {
            body.push_str(&format!(
                r#"            <li data-id="{id}">
                <div><div class="question">{question}</div><div class="meta">{created}</div></div>
                <button class="button danger delete" onclick="send('DELETE', '/api/cards/{id}')">Delete</button>
            </li>
"#,
                id = card.id(),
                question = encode_text(card.question()),
                created = card.created_at().format("%Y-%m-%d %H:%M"),
            ));
        }
        body.push_str("        </ul>\n");
    }

    body.push_str(
        r#"        <button id="reset" class="button danger" onclick="send('POST', '/api/cards/reset')">Reset</button>
        <button id="start-quiz" class="button" onclick="send('POST', '/api/quiz', undefined, '/quiz')">Quiz</button>
"#,
    );
    page(title, &body)
}

/// Quiz screen over the open snapshot; tap a card to flip it.
pub fn quiz(title: &str, quiz: &QuizView) -> String {
    let mut body = format!(
        "        <p id=\"progress\">{} of {} revealed</p>\n",
        quiz.revealed,
        quiz.cards.len()
    );
    if quiz.cards.is_empty() {
        body.push_str("        <p id=\"empty\">No flashcards to quiz.</p>\n");
    }
    for card in &quiz.cards {
        let side = match card.side {
            Side::Question => "question",
            Side::Answer => "answer",
        };
        body.push_str(&format!(
            r#"        <div class="card {side}" data-id="{id}" onclick="send('POST', '/api/quiz/flip/{id}')">{text}</div>
"#,
            id = card.id,
            text = encode_text(&card.text),
        ));
    }
    body.push_str(
        r#"        <button id="reset-flips" class="button" onclick="send('POST', '/api/quiz/reset')">Reset</button>
        <button id="back" class="button" onclick="send('DELETE', '/api/quiz', undefined, '/')">Back</button>
"#,
    );
    page(title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use scraper::{Html, Selector};

    fn select(html: &Html, selector: &str) -> Vec<String> {
        let selector = Selector::parse(selector).unwrap();
        html.select(&selector)
            .map(|e| e.text().collect::<String>())
            .collect()
    }

    #[test]
    fn index_lists_cards_in_order() {
        let mut session = Session::new();
        session.add_card("first", "1").unwrap();
        session.add_card("second", "2").unwrap();
        let html = Html::parse_document(&index("FlashCards App", &session.view()));

        assert_eq!(select(&html, "#cards li .question"), vec!["first", "second"]);
        assert_eq!(select(&html, "#cards li button.delete").len(), 2);
        assert_eq!(select(&html, "title"), vec!["FlashCards App"]);
        assert!(select(&html, "#empty").is_empty());
    }

    #[test]
    fn index_escapes_user_text() {
        let mut session = Session::new();
        session.add_card("<b>bold</b> & more", "x").unwrap();
        session.set_answer("say \"hi\"");
        let raw = index("t", &session.view());
        assert!(!raw.contains("<b>bold</b>"));

        let html = Html::parse_document(&raw);
        assert_eq!(select(&html, ".question"), vec!["<b>bold</b> & more"]);
        let answer = Selector::parse("#answer").unwrap();
        let input = html.select(&answer).next().unwrap();
        assert_eq!(input.value().attr("value"), Some("say \"hi\""));
    }

    #[test]
    fn index_empty_state() {
        let html = Html::parse_document(&index("t", &Session::new().view()));
        assert_eq!(select(&html, "#empty").len(), 1);
        assert!(select(&html, "#cards").is_empty());
    }

    fn onclick(html: &Html, selector: &str) -> String {
        let selector = Selector::parse(selector).unwrap();
        let element = html.select(&selector).next().unwrap();
        element.value().attr("onclick").unwrap().to_owned()
    }

    #[test]
    fn quiz_navigation_leaves_without_reload() {
        let mut session = Session::new();
        session.add_card("q", "a").unwrap();
        let html = Html::parse_document(&index("t", &session.view()));
        assert_eq!(
            onclick(&html, "#start-quiz"),
            "send('POST', '/api/quiz', undefined, '/quiz')"
        );

        session.open_quiz();
        let view = session.view();
        let html = Html::parse_document(&quiz("t", view.quiz.as_ref().unwrap()));
        assert_eq!(
            onclick(&html, "#back"),
            "send('DELETE', '/api/quiz', undefined, '/')"
        );

        // a navigating send must not queue a reload that would cancel it
        assert!(SCRIPT.contains("location.href = navigate;\n                    } else {\n                        refresh();"));
        assert!(SCRIPT.contains("if (navigate !== undefined) {\n                reloading = true;"));
    }

    #[test]
    fn quiz_shows_one_side_per_card() {
        let mut session = Session::new();
        let id = session.add_card("Capital of France?", "Paris").unwrap();
        session.add_card("2 + 2", "4").unwrap();
        session.open_quiz();
        session.flip(id).unwrap();

        let view = session.view();
        let html = Html::parse_document(&quiz("t", view.quiz.as_ref().unwrap()));
        assert_eq!(select(&html, ".card"), vec!["Paris", "2 + 2"]);
        assert_eq!(select(&html, ".card.answer"), vec!["Paris"]);
        assert_eq!(select(&html, ".card.question"), vec!["2 + 2"]);
        assert_eq!(select(&html, "#progress"), vec!["1 of 2 revealed"]);
    }
}
