use md2sv_core::{DocKind, DocNode, Document, Md2svError, ParseOptions, Stage};
use md2sv_svelte::{MarkupNode, Processor, ProcessorBuilder, Smartypants};

fn process(source: &str) -> String {
    Processor::default()
        .process(source)
        .expect("process should succeed")
}

#[test]
fn converts_basic_markdown() {
    assert_eq!(
        process("hello **world**"),
        "<p>hello <strong>world</strong></p>"
    );
}

#[test]
fn keeps_an_isolated_dollar() {
    assert_eq!(process("$"), "<p>$</p>");
}

#[test]
fn escapes_lt_in_text_and_code() {
    assert_eq!(process("a < b"), "<p>a &lt; b</p>");
    assert_eq!(process("`a < b`"), "<p><code>a &lt; b</code></p>");
    assert_eq!(
        process("enter the `<html>` tag"),
        "<p>enter the <code>&lt;html></code> tag</p>"
    );
    assert_eq!(process("enter the <> tag"), "<p>enter the &lt;> tag</p>");
}

#[test]
fn leaves_html_tags_alone() {
    assert_eq!(process("<b>bold</b>"), "<p><b>bold</b></p>");
    assert_eq!(
        process("<button on:click=\"{click}\">stuff</button>"),
        "<p><button on:click=\"{click}\">stuff</button></p>"
    );
    assert_eq!(
        process("<div on:click=\"{(e) => rateChange(rate)}\">stuff</div>"),
        "<div on:click=\"{(e) => rateChange(rate)}\">stuff</div>"
    );
    assert_eq!(
        process("<button on:click=\"{(e) => rateChange(rate)}\">stuff</button>"),
        "<p><button on:click=\"{(e) => rateChange(rate)}\">stuff</button></p>"
    );
}

#[test]
fn raw_leaf_keeps_a_svelte_component() {
    assert_eq!(
        process("::raw[<MyComponent on:click=\"{onClick}\" myattr=\"22\" />]"),
        "<MyComponent on:click=\"{onClick}\" myattr=\"22\" />"
    );
}

#[test]
fn escapes_curly_braces() {
    assert_eq!(process("{test}"), "<p>{'{'}test{'}'}</p>");
    assert_eq!(process("`{}`"), "<p><code>{'{'}{'}'}</code></p>");
    assert_eq!(
        process("\n```\nconst x = {};\n```\n\t"),
        "<pre><code>const x = {'{'}{'}'};\n</code></pre>"
    );
}

#[test]
fn does_not_escape_braces_in_styles() {
    assert_eq!(
        process("<style>p { color: blue; }</style>"),
        "<style>p { color: blue; }</style>"
    );
}

#[test]
fn raw_text_directive_is_verbatim() {
    assert_eq!(process(":raw[{1 + 2}]"), "<p>{1 + 2}</p>");
    assert_eq!(process(":raw[{\"hello\"}]"), "<p>{\"hello\"}</p>");
    assert_eq!(process(":raw[{`${\"hello\"}`}]"), "<p>{`${\"hello\"}`}</p>");
    assert_eq!(process(":raw[{{a: 3}}]"), "<p>{{a: 3}}</p>");
}

#[test]
fn raw_leaf_directives_wrap_markdown() {
    let source = "\n::raw[{#if display}]\nSome *Markdown* displayed.\n::raw[{/if}]\n\t";
    assert_eq!(
        process(source),
        "{#if display}\n<p>Some <em>Markdown</em> displayed.</p>\n{/if}"
    );
    assert_eq!(process("::raw[{`${\"hello\"}`}]"), "{`${\"hello\"}`}");
}

#[test]
fn raw_container_is_emitted_byte_for_byte() {
    let source = "
before

:::raw

{#each object as {id, name}}
<li>{id < 3 ? 'yes' : 'no'}</li>
{/each}

:::

after
\t";
    assert_eq!(
        process(source),
        "<p>before</p>\n\n{#each object as {id, name}}\n<li>{id < 3 ? 'yes' : 'no'}</li>\n{/each}\n\n<p>after</p>"
    );
}

#[test]
fn raw_container_keeps_svelte_special_elements() {
    let source = "\n:::raw\n\n<svelte:window on:event={handler} />\n\n:::\n";
    assert_eq!(process(source), "\n<svelte:window on:event={handler} />\n");
}

#[test]
fn raw_container_with_longer_fence() {
    let source = "::::raw\n:::\n{x}\n::::\n";
    assert_eq!(process(source), ":::\n{x}");
}

#[test]
fn non_raw_directives_become_divs() {
    assert_eq!(
        process(":::note\n*hi* {x}\n:::\n"),
        "<div><p><em>hi</em> {'{'}x{'}'}</p></div>"
    );
    assert_eq!(process("a :abbr[b] c"), "<p>a <div>b</div> c</p>");
}

#[test]
fn frontmatter_goes_into_a_module_script() {
    let source = "---\nabc: def\n---\n\ntest\n";
    insta::assert_snapshot!(process(source), @r#"
    <script context="module">
    export const metadata = {"abc":"def"};
    export const { abc } = metadata;
    </script><p>test</p>
    "#);
}

#[test]
fn frontmatter_goes_into_an_existing_module_script() {
    let source = "---\nabc: def\n---\n\n<script context=\"module\">\nconst x = 42;\n</script>\n\ntest\n";
    assert_eq!(
        process(source),
        "<script context=\"module\">\nconst x = 42;\n\nexport const metadata = {\"abc\":\"def\"};\nexport const { abc } = metadata;\n</script>\n<p>test</p>"
    );
}

#[test]
fn handles_a_typical_svelte_file() {
    let source = "---
abc: def
---

text0

<!-- comment -->

<script>
import { stuff } from 'lib';
export const y = 10;
</script>

text1

<style>
p { color: red; }
</style>

<i>italic</i>
<br />

text2
";
    insta::assert_snapshot!(process(source), @r#"
    <script context="module">
    export const metadata = {"abc":"def"};
    export const { abc } = metadata;
    </script><p>text0</p>
    <!-- comment -->
    <script>
    import { stuff } from 'lib';
    export const y = 10;
    </script>
    <p>text1</p>
    <style>
    p { color: red; }
    </style>
    <p><i>italic</i>
    <br></p>
    <p>text2</p>
    "#);
}

#[test]
fn runs_post_document_transforms() {
    let processor = ProcessorBuilder::new()
        .post_document(|root: &mut DocNode, _: &Document| {
            root.children[0].children[0].kind = DocKind::Text {
                value: "world".into(),
            };
        })
        .build();
    assert_eq!(processor.process("hello").unwrap(), "<p>world</p>");
}

#[test]
fn runs_post_markup_transforms() {
    let processor = ProcessorBuilder::new()
        .post_markup(|root: &mut MarkupNode, _: &Document| {
            if let Some(children) = root.children_mut()
                && let Some(MarkupNode::Element(paragraph)) = children.first_mut()
            {
                paragraph.children[0] = MarkupNode::text("world");
            }
        })
        .build();
    assert_eq!(processor.process("hello").unwrap(), "<p>world</p>");
}

#[test]
fn gfm_tables_and_task_lists() {
    let processor = ProcessorBuilder::new()
        .pre_document(|options: &mut ParseOptions| options.gfm = true)
        .build();

    insta::assert_snapshot!(processor.process("| a | b |\n| - | :-: |\n| 1 | 2 |").unwrap(), @r#"
    <table>
    <thead>
    <tr>
    <th>a</th>
    <th align="center">b</th>
    </tr>
    </thead>
    <tbody>
    <tr>
    <td>1</td>
    <td align="center">2</td>
    </tr>
    </tbody>
    </table>
    "#);

    insta::assert_snapshot!(processor.process("- [x] done\n- [ ] todo").unwrap(), @r#"
    <ul class="contains-task-list">
    <li class="task-list-item"><input type="checkbox" checked disabled> done</li>
    <li class="task-list-item"><input type="checkbox" disabled> todo</li>
    </ul>
    "#);
}

#[test]
fn smartypants_skips_raw_directives() {
    let processor = ProcessorBuilder::new().post_document(Smartypants).build();
    assert_eq!(
        processor.process("\"quoted\" -- :raw[{\"x\"}]").unwrap(),
        "<p>\u{201c}quoted\u{201d} \u{2014} {\"x\"}</p>"
    );
}

#[test]
fn unclosed_leading_rule_is_not_frontmatter() {
    assert_eq!(process("---\nhello\n"), "<hr>\n<p>hello</p>");
    assert_eq!(
        process("---\n\nA paragraph after a rule.\n"),
        "<hr>\n<p>A paragraph after a rule.</p>"
    );
}

#[test]
fn invalid_frontmatter_is_an_error() {
    let err = Processor::default()
        .process("---\n- a\n- b\n---\ntest\n")
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Metadata);
    assert!(matches!(err, Md2svError::Frontmatter(_)));
}

#[test]
fn raw_directives_inside_quotes_and_lists() {
    assert_eq!(
        process("> ::raw[{x}]"),
        "<blockquote>\n{x}\n</blockquote>"
    );
    assert_eq!(process("- ::raw[{x}]"), "<ul>\n<li>\n{x}\n</li>\n</ul>");
    assert_eq!(
        process("> :::raw\n> {#if x}\n> <b>{x}</b>\n> {/if}\n> :::\n"),
        "<blockquote>\n{#if x}\n<b>{x}</b>\n{/if}\n</blockquote>"
    );
    assert_eq!(
        process("> a :raw[{x}] b"),
        "<blockquote>\n<p>a {x} b</p>\n</blockquote>"
    );
}

#[test]
fn raw_directive_without_a_position_fails() {
    let processor = ProcessorBuilder::new()
        .post_document(|root: &mut DocNode, _: &Document| {
            root.walk_mut(&mut |node: &mut DocNode| {
                if node.kind == DocKind::RawTextDirective {
                    node.position = None;
                }
            });
        })
        .build();
    let err = processor.process("a :raw[{x}] b").unwrap_err();
    assert!(matches!(
        err,
        Md2svError::MalformedPosition {
            stage: Stage::Convert,
            kind: "rawTextDirective",
            location: None,
        }
    ));
}

#[test]
fn unhandled_raw_directive_is_an_error() {
    // Without the reclassifier's handlers the raw kinds cannot be converted.
    let document = Document::from_body(":raw[x]");
    let mut tree = md2sv_core::build_tree(&document, &ParseOptions::default()).unwrap();
    md2sv_svelte::reclassify(&mut tree);
    let err = md2sv_svelte::Converter::default()
        .convert(&mut tree, &document)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unhandled rawTextDirective node during convert"
    );
}
