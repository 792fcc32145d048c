#[cfg(test)]
#[path = "bubble_test.rs"]
mod tests;

use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::Theme;

use super::CopyLabel;
use super::Syntaxes;
use super::SYNTAX_SET;
use crate::domain::models::is_fence;
use crate::domain::models::Author;
use crate::domain::models::Message;
use crate::domain::models::MessageType;

#[derive(PartialEq, Eq)]
pub enum BubbleAlignment {
    Left,
    Right,
}

pub struct BubbleConfig {
    pub bubble_padding: usize,
    pub border_elements_length: usize,
    pub outer_padding_percentage: f32,
}

/// Number and current label of the copy button shown on a code fence.
pub type CopyButtonView = (usize, CopyLabel);

pub struct Bubble<'a> {
    alignment: BubbleAlignment,
    message: &'a Message,
    window_max_width: usize,
    buttons: Vec<CopyButtonView>,
}

fn expand_tabs(line: &str) -> String {
    return line.replace('\t', "  ");
}

fn width(text: &str) -> usize {
    return text.chars().count();
}

fn button_style(label: CopyLabel) -> Style {
    let fg = match label {
        CopyLabel::Copy => Color::White,
        CopyLabel::Copied => Color::Green,
        CopyLabel::Error => Color::Red,
    };

    return Style {
        fg: Some(fg),
        ..Style::default()
    };
}

/// Splits styled spans into rows no wider than `max_width`. Words move to the
/// next row whole unless they are wider than a row themselves.
fn wrap_spans<'a>(spans: Vec<Span<'a>>, max_width: usize) -> Vec<Vec<Span<'a>>> {
    let mut rows: Vec<Vec<Span<'a>>> = vec![];
    let mut row: Vec<Span<'a>> = vec![];
    let mut row_width = 0;

    for span in spans {
        let mut buffer = String::new();

        for word in span.content.split_inclusive(' ') {
            let mut word = word.to_string();

            while !word.is_empty() {
                let word_width = width(&word);
                if row_width + word_width <= max_width {
                    row_width += word_width;
                    buffer.push_str(&word);
                    break;
                }

                // Trailing whitespace may hang off the end of a row.
                if row_width + width(word.trim_end()) <= max_width {
                    buffer.push_str(word.trim_end());
                    word.clear();
                } else if row_width == 0 {
                    let head = word.chars().take(max_width).collect::<String>();
                    word = word.chars().skip(max_width).collect();
                    buffer.push_str(&head);
                }

                if !buffer.is_empty() {
                    row.push(Span::styled(std::mem::take(&mut buffer), span.style));
                }
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
        }

        if !buffer.is_empty() {
            row.push(Span::styled(buffer, span.style));
        }
    }

    rows.push(row);
    return rows;
}

impl<'a> Bubble<'a> {
    pub fn new(
        message: &'a Message,
        alignment: BubbleAlignment,
        window_max_width: usize,
        buttons: Vec<CopyButtonView>,
    ) -> Bubble<'a> {
        return Bubble {
            alignment,
            message,
            window_max_width,
            buttons,
        };
    }

    pub fn style_config() -> BubbleConfig {
        return BubbleConfig {
            // Unicode character border + padding.
            bubble_padding: 8,
            // left border + left padding + (text, not counted) + right padding + right border +
            // scrollbar.
            border_elements_length: 5,
            outer_padding_percentage: 0.04,
        };
    }

    pub fn as_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let mut highlight: Option<HighlightLines> = None;
        let mut codeblock_position = 0;
        let mut lines: Vec<Line<'static>> = vec![];

        let max_line_length = self.get_max_line_length();

        for line in self.message.text.lines() {
            let line = expand_tabs(line);
            let mut spans = vec![];

            if is_fence(&line) {
                if highlight.is_none() {
                    let lang = line.trim().trim_start_matches('`');
                    highlight = Some(HighlightLines::new(Syntaxes::get(lang), theme));
                    spans = self.fence_header(&line, codeblock_position);
                    codeblock_position += 1;
                } else {
                    highlight = None;
                }
            } else if let Some(highlighter) = highlight.as_mut() {
                spans = highlight_code_line(highlighter, &line);
            }

            if spans.is_empty() {
                spans = vec![Span::styled(line, Style::default())];
            }

            for row in wrap_spans(spans, max_line_length) {
                lines.push(self.spans_to_line(row, max_line_length));
            }
        }

        return self.wrap_lines_in_bubble(lines, max_line_length);
    }

    fn fence_header(&self, line: &str, position: usize) -> Vec<Span<'static>> {
        let mut spans = vec![Span::from(line.to_string())];
        if let Some((number, label)) = self.buttons.get(position) {
            spans.push(Span::styled(
                format!(" ({number})"),
                Style {
                    fg: Some(Color::White),
                    ..Style::default()
                },
            ));
            spans.push(Span::styled(
                format!(" [{}]", label.text()),
                button_style(*label),
            ));
        }

        return spans;
    }

    fn spans_to_line(&self, mut spans: Vec<Span<'static>>, max_line_length: usize) -> Line<'static> {
        let line_str_len: usize = spans.iter().map(|e| return width(&e.content)).sum();
        let fill = " ".repeat(max_line_length.saturating_sub(line_str_len));
        let formatted_line_length =
            line_str_len + fill.len() + Bubble::style_config().bubble_padding;

        let mut wrapped_spans = vec![self.highlight_span("│ ".to_string())];
        wrapped_spans.append(&mut spans);
        wrapped_spans.push(self.highlight_span(format!("{fill} │")));

        let outer_bubble_padding =
            " ".repeat(self.window_max_width.saturating_sub(formatted_line_length));

        if self.alignment == BubbleAlignment::Left {
            wrapped_spans.push(Span::from(outer_bubble_padding));
            return Line::from(wrapped_spans);
        }

        let mut line_spans = vec![Span::from(outer_bubble_padding)];
        line_spans.extend(wrapped_spans);

        return Line::from(line_spans);
    }

    /// Widest fence header this bubble can show, measured with the longest
    /// label so the bubble keeps its width while a label changes.
    fn header_width(&self, line: &str, position: usize) -> usize {
        let Some((number, _)) = self.buttons.get(position) else {
            return width(line);
        };

        return width(line)
            + width(&format!(" ({number})"))
            + width(&format!(" [{}]", CopyLabel::Copied.text()));
    }

    fn get_max_line_length(&self) -> usize {
        let style_config = Bubble::style_config();
        // Add a minimum 4% of padding on the side.
        let min_bubble_padding_length = ((self.window_max_width as f32
            * style_config.outer_padding_percentage)
            .ceil()) as usize;

        // Border elements + minimum bubble padding.
        let line_border_width = style_config.border_elements_length + min_bubble_padding_length;

        let mut in_codeblock = false;
        let mut position = 0;
        let mut max_line_length = 0;
        for line in self.message.text.lines() {
            let line = expand_tabs(line);
            let mut line_length = width(&line);
            if is_fence(&line) {
                if !in_codeblock {
                    line_length = self.header_width(&line, position);
                    position += 1;
                }
                in_codeblock = !in_codeblock;
            }
            max_line_length = max_line_length.max(line_length);
        }

        max_line_length =
            max_line_length.min(self.window_max_width.saturating_sub(line_border_width));

        let username = self.message.author.to_string();
        if max_line_length < username.len() {
            max_line_length = username.len();
        }

        return max_line_length;
    }

    fn wrap_lines_in_bubble(
        &self,
        lines: Vec<Line<'static>>,
        max_line_length: usize,
    ) -> Vec<Line<'static>> {
        let username = self.message.author.to_string();
        // Add 2 for the vertical bars.
        let top_bar = format!(
            "╭{username}{}╮",
            "─".repeat(max_line_length + 2 - username.len())
        );
        let bottom_bar = format!("╰{}╯", "─".repeat(max_line_length + 2));
        let bar_bubble_padding = " ".repeat(
            self.window_max_width
                .saturating_sub(max_line_length + Bubble::style_config().bubble_padding),
        );

        let mut res = vec![];
        if self.alignment == BubbleAlignment::Left {
            res.push(self.highlight_line(format!("{top_bar}{bar_bubble_padding}")));
            res.extend(lines);
            res.push(self.highlight_line(format!("{bottom_bar}{bar_bubble_padding}")));
        } else {
            res.push(self.highlight_line(format!("{bar_bubble_padding}{top_bar}")));
            res.extend(lines);
            res.push(self.highlight_line(format!("{bar_bubble_padding}{bottom_bar}")));
        }

        return res;
    }

    fn highlight_span(&self, text: String) -> Span<'static> {
        if self.message.message_type() == MessageType::Error {
            return Span::styled(
                text,
                Style {
                    fg: Some(Color::Red),
                    ..Style::default()
                },
            );
        } else if self.message.author == Author::System {
            return Span::styled(
                text,
                Style {
                    fg: Some(Color::Rgb(138, 85, 63)), // Brown
                    ..Style::default()
                },
            );
        }

        return Span::from(text);
    }

    fn highlight_line(&self, text: String) -> Line<'static> {
        return Line::from(self.highlight_span(text));
    }
}

fn highlight_code_line(highlighter: &mut HighlightLines, line: &str) -> Vec<Span<'static>> {
    // Highlighting doesn't work accurately unless each line is postfixed with '\n',
    // especially when dealing with multi-line code comments.
    let line_nl = format!("{line}\n");
    let highlighted = match highlighter.highlight_line(&line_nl, &SYNTAX_SET) {
        Ok(highlighted) => highlighted,
        Err(err) => {
            tracing::warn!(error = ?err, "Failed to highlight code line");
            return vec![];
        }
    };

    return highlighted
        .iter()
        .enumerate()
        .map(|(idx, (style, content))| {
            let mut text = content.to_string();
            if idx == highlighted.len() - 1 {
                text = text.trim_end_matches('\n').to_string();
            }

            return Span::styled(
                text,
                Style {
                    fg: Syntaxes::translate_colour(style.foreground),
                    ..Style::default()
                },
            );
        })
        .filter(|span| return !span.content.is_empty())
        .collect();
}
