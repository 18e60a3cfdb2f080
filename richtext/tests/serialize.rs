use richtext::{Block, Document, Mark, MarkSet, TextRun, escape_html, serialize};

fn paragraph(runs: Vec<TextRun>) -> Block {
    Block::paragraph(runs.into_iter().map(Into::into).collect())
}

#[test]
fn seed_document() {
    assert_eq!(
        serialize(&Document::seed()),
        "<p>A line of text in a paragraph.</p>\
         <p>Since it&#x27;s rich text, you can do things like turn a selection of text bold, \
         or add a semantically rendered block quote in the middle of the page, like this:</p>"
    );
}

#[test]
fn untrusted_text_is_escaped() {
    let doc = Document::new(vec![paragraph(vec![TextRun::plain("<script>&\"'</script>")])]);
    let html = serialize(&doc);
    assert_eq!(
        html,
        "<p>&lt;script&gt;&amp;&quot;&#x27;&lt;/script&gt;</p>"
    );
    let inner = html.trim_start_matches("<p>").trim_end_matches("</p>");
    assert!(!inner.contains(['<', '>', '"', '\'']));
}

#[test]
fn mark_nesting_ignores_application_order() {
    let mut italic_first = MarkSet::empty();
    italic_first.insert(Mark::Italic);
    italic_first.insert(Mark::Bold);
    let bold_first: MarkSet = [Mark::Bold, Mark::Italic].into_iter().collect();

    for marks in [italic_first, bold_first] {
        let doc = Document::new(vec![paragraph(vec![TextRun::new("text", marks)])]);
        assert_eq!(serialize(&doc), "<p><strong><em>text</em></strong></p>");
    }
}

#[test]
fn block_kinds() {
    let code = Document::new(vec![Block::code(vec![TextRun::plain("x").into()])]);
    assert_eq!(serialize(&code), "<pre><code>x</code></pre>");

    let para = Document::new(vec![paragraph(vec![TextRun::plain("x")])]);
    assert_eq!(serialize(&para), "<p>x</p>");
}

#[test]
fn link_url_is_escaped() {
    let doc = Document::new(vec![Block::paragraph(vec![
        TextRun::plain("go ").into(),
        Block::link(
            "https://x.test/?a=1&b=\"2\"",
            vec![TextRun::with_marks("there", &[Mark::Underline]).into()],
        )
        .into(),
    ])]);
    assert_eq!(
        serialize(&doc),
        "<p>go <a href=\"https://x.test/?a=1&amp;b=&quot;2&quot;\"><u>there</u></a></p>"
    );
}

#[test]
fn blocks_concatenate_without_separator() {
    let doc = Document::new(vec![
        paragraph(vec![TextRun::plain("a")]),
        Block::code(vec![TextRun::plain("b <c>").into()]),
        paragraph(vec![TextRun::with_marks("d", &[Mark::Strikethrough])]),
    ]);
    assert_eq!(
        serialize(&doc),
        "<p>a</p><pre><code>b &lt;c&gt;</code></pre><p><del>d</del></p>"
    );
}

#[test]
fn serialization_is_deterministic() {
    let doc = Document::seed();
    assert_eq!(serialize(&doc), serialize(&doc.clone()));
    assert_eq!(escape_html("no specials"), "no specials");
}
