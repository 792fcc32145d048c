pub fn codeblock_fixture() -> &'static str {
    return r#"
Here's how to print in Rust.

```rust
fn print_numbers() {
    for i in 0..=10 {
        println!("{i}");
    }
}
```

And in Javascript.

```javascript
// Hello World.
function printNumbers() {
    let numbers = [];
    for (let i = 0; i <= 10; i++) {
        numbers.push(i);
    }
    return numbers.join('\n');
}
```

This block has no language attached, it is still counted and rendered as plain text.

```
abc123
```

Let's do Python as well!

```python
for i in range(11):
    print(i)
```

That's it!
"#
    .trim();
}

/// Reply as rendered by a markdown backend with the codehilite and nl2br
/// extensions enabled.
pub fn codehilite_html_fixture() -> &'static str {
    return r#"<p>Here is a loop:<br />
it prints &amp; counts.</p>
<div class="codehilite"><pre><span></span><code><span class="k">for</span> <span class="n">i</span> <span class="ow">in</span> <span class="nb">range</span><span class="p">(</span><span class="mi">3</span><span class="p">):</span>
    <span class="nb">print</span><span class="p">(</span><span class="n">i</span> <span class="o">&lt;</span> <span class="mi">2</span><span class="p">)</span>
</code></pre></div>
<p>Use <code>range</code> for <strong>numbers</strong>.</p>"#;
}
