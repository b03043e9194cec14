//! Cross-cutting tests: whole-document parsing, the span tables, and
//! coherence across sequences of edits.

use crate::{SpanKind, WikiText};

fn init() {
    let _ = env_logger::try_init();
}

#[track_caller]
fn assert_well_nested(wt: &WikiText, kind: SpanKind) {
    let spans = wt.spans(kind);
    for (i, &(s1, e1)) in spans.iter().enumerate() {
        for &(s2, e2) in &spans[i + 1..] {
            let disjoint = e1 <= s2 || e2 <= s1;
            let nested = (s1 <= s2 && e2 <= e1) || (s2 <= s1 && e1 <= e2);
            assert!(
                disjoint || nested,
                "{kind:?} spans ({s1},{e1}) and ({s2},{e2}) partially overlap"
            );
        }
    }
}

#[track_caller]
fn assert_shielded(wt: &WikiText) {
    let mut shields = wt.spans(SpanKind::Comment);
    shields.extend(wt.spans(SpanKind::NoWiki));
    for kind in [
        SpanKind::Template,
        SpanKind::Parameter,
        SpanKind::ParserFunction,
        SpanKind::WikiLink,
    ] {
        for (start, end) in wt.spans(kind) {
            for at in [start, end - 1] {
                assert!(
                    !shields.iter().any(|&(s, e)| at >= s && at < e),
                    "{kind:?} delimiter at {at} lies inside a shield"
                );
            }
        }
    }
}

#[test]
fn round_trip() {
    init();
    for s in [
        "",
        "plain text",
        "text1{{cite|{{t1}}|{{t2}}}}text2{{cite|{{t3}}|{{t4}}}}text3",
        "{{\u{0631}\u{0646}\u{06af}|\u{0645}\u{062a}\u{0646}}}",
        "{{text |<nowiki>}} A </nowiki> }} B",
        "== h ==\nbody [//ex.org label] <!-- note -->\n",
    ] {
        let wt = WikiText::new(s);
        assert_eq!(wt.string(), s);
        assert_eq!(wt.to_string(), s);
    }
}

#[test]
fn universal_properties_hold() {
    init();
    for s in [
        "text1{{cite|{{t1}}|{{t2}}}}text2{{cite|{{t3}}|{{t4}}}}text3",
        "{{{1|{{colorbox|yellow|text1}}}}}",
        "{{text |[[A|}}]]}}",
        "[[A|{{text|text}}]]",
        "{{text |<nowiki>}} A </nowiki> }} B",
        "{{text |<!-- }} -->}}",
        "{{a|{{b|{{c}}}}}} [[d|[[e]]]]",
    ] {
        let wt = WikiText::new(s);
        for kind in [
            SpanKind::Template,
            SpanKind::Parameter,
            SpanKind::ParserFunction,
            SpanKind::WikiLink,
        ] {
            assert_well_nested(&wt, kind);
        }
        assert_shielded(&wt);
    }
}

#[test]
fn bare_link() {
    init();
    let wt = WikiText::new("text1 HTTP://mediawiki.org text2");
    assert_eq!(wt.external_links()[0].string(), "HTTP://mediawiki.org");
}

#[test]
fn labelled_link() {
    init();
    let wt = WikiText::new("text1 [http://mediawiki.org MediaWiki] text2");
    assert_eq!(wt.external_links()[0].url(), "http://mediawiki.org");
    assert_eq!(wt.external_links()[0].text(), "MediaWiki");
}

#[test]
fn numbered_link() {
    init();
    let wt = WikiText::new("text1 [http://mediawiki.org] text2");
    assert_eq!(wt.external_links()[0].string(), "[http://mediawiki.org]");
}

#[test]
fn protocol_relative_link() {
    init();
    let wt = WikiText::new("text1 [//en.wikipedia.org wikipedia] text2");
    assert_eq!(
        wt.external_links()[0].string(),
        "[//en.wikipedia.org wikipedia]"
    );
}

#[test]
fn destroying_a_link_keeps_its_identity() {
    init();
    let wt = WikiText::new("text1 [//en.wikipedia.org wikipedia] text2");
    let mut link = wt.external_links().remove(0);
    link.set_string("");
    assert_eq!(wt.string(), "text1  text2");
    assert_eq!(link.string(), "");
    assert_eq!(
        wt.spans(SpanKind::ExternalLink),
        [(6, 6)],
        "an emptied view keeps its collapsed span"
    );
}

#[test]
fn wikilink_in_template() {
    init();
    let s = "{{text |[[A|}}]]}}";
    let wt = WikiText::new(s);
    assert_eq!(wt.templates()[0].string(), s);
}

#[test]
fn wikilink_containing_closing_braces_in_template() {
    init();
    let s = "{{text|[[  A   |\n|}}[]<>]]\n}}";
    let wt = WikiText::new(s);
    assert_eq!(wt.templates()[0].string(), s);
}

#[test]
fn comments_are_ignored() {
    init();
    let s = "{{text |<!-- }} -->}}";
    let wt = WikiText::new(s);
    assert_eq!(wt.templates()[0].string(), s);
}

#[test]
fn nowiki_is_ignored() {
    init();
    let wt = WikiText::new("{{text |<nowiki>}} A </nowiki> }} B");
    assert_eq!(
        wt.templates()[0].string(),
        "{{text |<nowiki>}} A </nowiki> }}"
    );
}

#[test]
fn comment_contents() {
    init();
    let wt = WikiText::new("text1 <!--\n\ncomment\n{{A}}\n-->text2");
    assert_eq!(wt.comments()[0].contents(), "\n\ncomment\n{{A}}\n");
    assert!(
        wt.templates().is_empty(),
        "a template inside a comment is not recognised"
    );
}

#[test]
fn template_in_wikilink() {
    init();
    let s = "[[A|{{text|text}}]]";
    let wt = WikiText::new(s);
    assert_eq!(wt.wikilinks()[0].string(), s);
    assert_eq!(wt.templates()[0].string(), "{{text|text}}");
}

#[test]
fn wikilink_target_may_contain_newline() {
    init();
    let s = "[[A | faf a\n\nfads]]";
    let wt = WikiText::new(s);
    assert_eq!(wt.wikilinks()[0].string(), s);
}

#[test]
fn scoped_queries() {
    init();
    let wt = WikiText::new("{{a|{{b}}}} {{c}}");
    let outer = wt.templates().remove(2);
    assert_eq!(outer.string(), "{{a|{{b}}}}");
    let inner: Vec<String> = outer
        .templates()
        .iter()
        .map(|template| template.string())
        .collect();
    assert_eq!(
        inner,
        ["{{b}}", "{{a|{{b}}}}"],
        "queries are scoped to the view's own span"
    );
}

#[test]
fn extracting_sections() {
    init();
    let wt = WikiText::new("== h2 ==\nt2\n\n=== h3 ===\nt3\n\n== h22 ==\nt22");
    let sections = wt.sections();
    assert_eq!(sections.len(), 4);
    assert_eq!(sections[0].level(), 0);
    assert_eq!(sections[0].title(), "");
    assert_eq!(sections[0].contents(), "");
    assert_eq!(sections[1].string(), "== h2 ==\nt2\n\n");
    assert_eq!(sections[1].contents(), "t2\n\n");
    assert_eq!(sections[2].level(), 3);
    assert_eq!(sections[2].title(), " h3 ");
    assert_eq!(sections[3].string(), "== h22 ==\nt22");
}

#[test]
fn keyword_and_positional_argument_removal() {
    init();
    let wt = WikiText::new("text{{t1|kw=a|1=|pa|kw2=a|pa2}}{{t2|a|1|1=}}text");
    let t1 = wt.templates().remove(0);
    let t2 = wt.templates().remove(1);
    assert_eq!(t1.arguments()[2].name(), "1");
    assert_eq!(t1.arguments()[3].name(), "kw2");
    assert_eq!(t1.arguments()[4].name(), "2");
    assert_eq!(t2.arguments()[0].name(), "1");
    assert_eq!(t2.arguments()[1].name(), "2");
    assert_eq!(t2.arguments()[2].name(), "1");

    let mut removed = t1.arguments().remove(0);
    removed.set_string("");
    assert_eq!(t1.arguments()[0].name(), "1");
    assert_eq!(t1.arguments()[2].name(), "kw2");
    assert_eq!(t1.arguments()[3].string(), "|pa2");
    assert_eq!(t2.arguments()[0].name(), "1");
    assert_eq!(t2.arguments()[1].name(), "2");
    assert_eq!(t2.arguments()[2].name(), "1");

    let mut removed = t1.arguments().remove(1);
    removed.set_string("");
    assert_eq!(wt.string(), "text{{t1|1=|kw2=a|pa2}}{{t2|a|1|1=}}text");
    assert_eq!(t1.arguments()[2].value(), "pa2");
    assert_eq!(t1.arguments()[2].name(), "1");
    assert_eq!(t2.arguments()[0].value(), "a");
    assert_eq!(t2.arguments()[0].name(), "1");
}

#[test]
fn edits_shift_sibling_views() {
    init();
    let wt = WikiText::new("{{a|one}}-{{b|two}}-{{c|three}}");
    let first = wt.templates().remove(0);
    let second = wt.templates().remove(1);
    let third = wt.templates().remove(2);

    let mut argument = second.arguments().remove(0);
    argument.set_value("2");
    assert_eq!(wt.string(), "{{a|one}}-{{b|2}}-{{c|three}}");
    assert_eq!(first.string(), "{{a|one}}");
    assert_eq!(second.string(), "{{b|2}}");
    assert_eq!(third.string(), "{{c|three}}");
}

#[test]
fn structural_edits_rescan() {
    init();
    let wt = WikiText::new("{{a|x}} [[b|c]] {{d|e}}");
    let mut first = wt.templates().remove(0);
    let link = wt.wikilinks().remove(0);
    let second = wt.templates().remove(1);

    first.set_string("{{a|{{x}}}}");
    assert_eq!(wt.string(), "{{a|{{x}}}} [[b|c]] {{d|e}}");
    assert_eq!(first.string(), "{{a|{{x}}}}");
    assert_eq!(link.string(), "[[b|c]]");
    assert_eq!(second.string(), "{{d|e}}");
    assert_eq!(
        wt.spans(SpanKind::Template),
        [(4, 9), (20, 27), (0, 11)],
        "the new nested template was discovered"
    );
}

#[test]
fn handles_follow_constructs_across_a_rescan() {
    init();
    let wt = WikiText::new("{{a}} {{d|e}}");
    let mut first = wt.templates().remove(0);
    let second = wt.templates().remove(1);

    // The replacement introduces an extra template before `second`, so the
    // rescan shuffles every numeric index position.
    first.set_string("{{p}} {{q}}");
    assert_eq!(wt.string(), "{{p}} {{q}} {{d|e}}");
    assert_eq!(
        first.string(),
        "{{p}} {{q}}",
        "the edited view covers exactly the replacement"
    );
    assert_eq!(
        second.string(),
        "{{d|e}}",
        "an untouched handle follows its construct, not its old position"
    );
    assert_eq!(wt.spans(SpanKind::Template), [(0, 5), (6, 11), (12, 19)]);
}

#[test]
fn a_destroyed_construct_leaves_a_dead_handle() {
    init();
    let wt = WikiText::new("{{a|{{b}}}}");
    let inner = wt.templates().remove(0);
    let mut outer = wt.templates().remove(1);

    outer.set_string("plain");
    assert_eq!(wt.string(), "plain");
    assert_eq!(outer.string(), "plain");
    assert_eq!(inner.string(), "", "the swallowed template resolves empty");
}

#[test]
fn whole_document_replacement() {
    init();
    let mut wt = WikiText::new("old {{t}}");
    wt.set_string("new [[link]]");
    assert_eq!(wt.string(), "new [[link]]");
    assert_eq!(wt.spans(SpanKind::WikiLink), [(4, 12)]);
    assert!(wt.spans(SpanKind::Template).is_empty());
}

#[test]
fn unicode_spans_are_code_point_indexed() {
    init();
    let wt = WikiText::new("{{\n\u{0631}\u{0646}\u{06af}\n|\u{0645}\u{062a}\u{0646}}}");
    assert_eq!(wt.spans(SpanKind::Template), [(0, 13)]);

    let wt = WikiText::new("{{#\u{0627}\u{06af}\u{0631}:|\u{0641}\u{0644}\u{0627}\u{0646}}}");
    assert_eq!(wt.spans(SpanKind::ParserFunction), [(0, 14)]);
}
