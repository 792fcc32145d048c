#[cfg(test)]
#[path = "markup_test.rs"]
mod tests;

use scraper::ElementRef;
use scraper::Html;
use scraper::Node;

/// Chat services commonly render replies to HTML before returning them. The
/// terminal renders markdown, so HTML replies are turned back into markdown,
/// keeping code blocks fenced so they can be highlighted and copied.
/// Anything that doesn't look like HTML is returned as is.
pub fn html_to_markdown(text: &str) -> String {
    if !looks_like_html(text) {
        return text.to_string();
    }

    let fragment = Html::parse_fragment(text);
    let mut writer = MarkdownWriter::default();
    writer.children(fragment.root_element());

    return collapse_blank_lines(writer.out.trim());
}

fn looks_like_html(text: &str) -> bool {
    let lowered = text.to_lowercase();
    return ["<p>", "<pre", "<br", "<div", "<ul>", "<ol>", "<h1", "<h2", "<h3", "<code"]
        .iter()
        .any(|e| return lowered.contains(e));
}

fn heading_level(name: &str) -> Option<usize> {
    let level = name.strip_prefix('h')?.parse::<usize>().ok()?;
    if (1..=6).contains(&level) {
        return Some(level);
    }
    return None;
}

/// Language from a `language-xxx` or `lang-xxx` class on the `<code>` inside
/// a `<pre>`.
fn code_language(pre: ElementRef) -> String {
    return pre
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| return e.value().name() == "code")
        .and_then(|code| {
            return code.value().classes().find_map(|class| {
                return class
                    .strip_prefix("language-")
                    .or_else(|| return class.strip_prefix("lang-"));
            });
        })
        .unwrap_or("")
        .to_string();
}

#[derive(Default)]
struct MarkdownWriter {
    out: String,
}

impl MarkdownWriter {
    fn children(&mut self, element: ElementRef) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        self.element(child_element);
                    }
                }
                // Comments, doctypes and processing instructions.
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef) {
        let name = element.value().name();
        match name {
            "pre" => self.pre(element),
            "code" => {
                self.out.push('`');
                self.out.push_str(&element.text().collect::<String>());
                self.out.push('`');
            }
            "br" => self.out.push('\n'),
            "p" | "div" | "ul" | "ol" | "table" | "blockquote" => {
                self.children(element);
                self.blank_line();
            }
            "tr" => {
                self.children(element);
                self.out.push('\n');
            }
            "td" | "th" => {
                self.children(element);
                self.out.push(' ');
            }
            "li" => {
                if !self.out.is_empty() && !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
                self.out.push_str("- ");
                self.children(element);
                self.out.push('\n');
            }
            "strong" | "b" => self.wrapped(element, "**"),
            "em" | "i" => self.wrapped(element, "*"),
            "script" | "style" | "head" => {}
            _ => {
                if let Some(level) = heading_level(name) {
                    self.blank_line();
                    self.out.push_str(&["#"].repeat(level).join(""));
                    self.out.push(' ');
                    self.children(element);
                    self.blank_line();
                } else {
                    self.children(element);
                }
            }
        }
    }

    fn wrapped(&mut self, element: ElementRef, marker: &str) {
        self.out.push_str(marker);
        self.children(element);
        self.out.push_str(marker);
    }

    fn pre(&mut self, element: ElementRef) {
        self.blank_line();

        let code = element.text().collect::<String>();
        self.out.push_str(&format!("```{}\n", code_language(element)));
        self.out.push_str(&code);
        if !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.out.push_str("```\n\n");
    }

    fn text(&mut self, text: &str) {
        // Newlines in HTML source are whitespace; line breaks come from tags.
        let flattened = text.replace('\n', " ");
        if self.out.is_empty() || self.out.ends_with('\n') {
            self.out.push_str(flattened.trim_start());
        } else {
            self.out.push_str(&flattened);
        }
    }

    fn blank_line(&mut self) {
        if self.out.is_empty() {
            return;
        }
        while !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::new();
    let mut blank_count = 0;
    for line in text.lines() {
        if line.trim().is_empty() {
            blank_count += 1;
            if blank_count > 1 {
                continue;
            }
        } else {
            blank_count = 0;
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    return out.trim_end().to_string();
}
