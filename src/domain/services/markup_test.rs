use test_utils::codehilite_html_fixture;

use super::html_to_markdown;

#[test]
fn it_leaves_markdown_untouched() {
    let text = "Hello **there**\n\n```rust\nlet a = 1 < 2;\n```";
    assert_eq!(html_to_markdown(text), text);
}

#[test]
fn it_converts_codehilite_html() {
    let res = html_to_markdown(codehilite_html_fixture());
    insta::assert_snapshot!(res, @r###"
    Here is a loop:
    it prints & counts.

    ```
    for i in range(3):
        print(i < 2)
    ```

    Use `range` for **numbers**.
    "###);
}

#[test]
fn it_keeps_code_languages() {
    let html = "<pre><code class=\"language-python\">print(&quot;hi&quot;)\n</code></pre>";
    assert_eq!(html_to_markdown(html), "```python\nprint(\"hi\")\n```");
}

#[test]
fn it_fences_pre_blocks_without_code_tags() {
    let html = "<p>Output:</p><pre>abc123</pre>";
    assert_eq!(html_to_markdown(html), "Output:\n\n```\nabc123\n```");
}

#[test]
fn it_converts_lists_and_headings() {
    let html = "<h2>Steps</h2>\n<ul>\n<li>First</li>\n<li>Second</li>\n</ul>";
    assert_eq!(html_to_markdown(html), "## Steps\n\n- First\n- Second");
}

#[test]
fn it_decodes_entities() {
    let html = "<p>a &lt; b &amp;&amp; c &gt; d &#39;quoted&#x27;</p>";
    assert_eq!(html_to_markdown(html), "a < b && c > d 'quoted'");
}

#[test]
fn it_keeps_attributes_out_of_the_text() {
    let html = "<p>Click <a href=\"x\" title=\"a > b\">here</a> now</p>";
    assert_eq!(html_to_markdown(html), "Click here now");
}

#[test]
fn it_skips_comments() {
    let html = "<p>Hi</p><!-- <pre>ignored</pre> --><p>Bye</p>";
    assert_eq!(html_to_markdown(html), "Hi\n\nBye");
}

#[test]
fn it_converts_inline_code_and_emphasis() {
    let html = "<p>Call <code>a &lt; b</code> <em>once</em>, then <b>stop</b>.</p>";
    assert_eq!(html_to_markdown(html), "Call `a < b` *once*, then **stop**.");
}
