use anyhow::Result;
use ratatui::style::Color;

use super::Bubble;
use super::BubbleAlignment;
use super::CopyButtonView;
use crate::domain::models::Author;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::services::CopyLabel;
use crate::domain::services::Themes;

const CODE_TEXT: &str = r#"Here's how to print in Rust.

```rust
fn print_numbers() {
    for i in 0..=0 {
        println!("{i}");
    }
}
```"#;

fn create_lines(
    message: &Message,
    alignment: BubbleAlignment,
    width: usize,
    buttons: Vec<CopyButtonView>,
) -> Result<String> {
    let theme = Themes::get("base16-ocean.dark", "")?;
    let lines = Bubble::new(message, alignment, width, buttons).as_lines(&theme);
    let lines_str = lines
        .iter()
        .map(|line| {
            return line
                .spans
                .iter()
                .map(|span| {
                    return span.content.to_string();
                })
                .collect::<Vec<String>>()
                .join("")
                .trim_end()
                .to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    return Ok(lines_str);
}

#[test]
fn it_creates_author_bot_text() -> Result<()> {
    let message = Message::new(Author::Bot, "Hi there!");
    let lines_str = create_lines(&message, BubbleAlignment::Left, 50, vec![])?;
    insta::assert_snapshot!(lines_str, @r###"
    ╭Bot────────╮
    │ Hi there! │
    ╰───────────╯
    "###);

    return Ok(());
}

#[test]
fn it_creates_author_bot_text_long() -> Result<()> {
    let message = Message::new(Author::Bot, "Hi there! This is a really long line that pushes the boundaries of 50 characters across the screen, resulting in a bubble where the line is wrapped to the next line. Cool right?");
    let lines_str = create_lines(&message, BubbleAlignment::Left, 50, vec![])?;
    insta::assert_snapshot!(lines_str, @r###"
    ╭Bot──────────────────────────────────────────╮
    │ Hi there! This is a really long line that   │
    │ pushes the boundaries of 50 characters      │
    │ across the screen, resulting in a bubble    │
    │ where the line is wrapped to the next line. │
    │ Cool right?                                 │
    ╰─────────────────────────────────────────────╯
    "###);

    return Ok(());
}

#[test]
fn it_creates_author_bot_text_code() -> Result<()> {
    let message = Message::new(Author::Bot, CODE_TEXT);
    let lines_str = create_lines(
        &message,
        BubbleAlignment::Left,
        50,
        vec![(1, CopyLabel::Copy)],
    )?;

    insta::assert_snapshot!(lines_str, @r###"
    ╭Bot───────────────────────────╮
    │ Here's how to print in Rust. │
    │                              │
    │ ```rust (1) [Copy]           │
    │ fn print_numbers() {         │
    │     for i in 0..=0 {         │
    │         println!("{i}");     │
    │     }                        │
    │ }                            │
    │ ```                          │
    ╰──────────────────────────────╯
    "###);
    return Ok(());
}

#[test]
fn it_keeps_width_when_label_changes() -> Result<()> {
    let message = Message::new(Author::Bot, CODE_TEXT);
    let lines_str = create_lines(
        &message,
        BubbleAlignment::Left,
        50,
        vec![(3, CopyLabel::Copied)],
    )?;

    insta::assert_snapshot!(lines_str, @r###"
    ╭Bot───────────────────────────╮
    │ Here's how to print in Rust. │
    │                              │
    │ ```rust (3) [Copied!]        │
    │ fn print_numbers() {         │
    │     for i in 0..=0 {         │
    │         println!("{i}");     │
    │     }                        │
    │ }                            │
    │ ```                          │
    ╰──────────────────────────────╯
    "###);
    return Ok(());
}

#[test]
fn it_highlights_code() -> Result<()> {
    let message = Message::new(Author::Bot, CODE_TEXT);
    let theme = Themes::get("base16-ocean.dark", "")?;
    let lines = Bubble::new(&message, BubbleAlignment::Left, 50, vec![(1, CopyLabel::Copy)])
        .as_lines(&theme);

    // Bubble top, prose, blank line, fence header, first line of code.
    let code_line = &lines[4];
    let coloured = code_line
        .spans
        .iter()
        .filter(|span| return matches!(span.style.fg, Some(Color::Rgb(_, _, _))))
        .count();
    assert!(coloured > 1);

    let prose_line = &lines[1];
    assert!(prose_line.spans.iter().all(|span| return span.style.fg.is_none()));

    return Ok(());
}

#[test]
fn it_creates_author_user_text() -> Result<()> {
    let message = Message::new(Author::User, "Hi there!");
    let lines_str = create_lines(&message, BubbleAlignment::Right, 50, vec![])?;
    let padding = " ".repeat(33);

    assert_eq!(
        lines_str,
        [
            format!("{padding}╭You────────╮"),
            format!("{padding}│ Hi there! │"),
            format!("{padding}╰───────────╯"),
        ]
        .join("\n")
    );

    return Ok(());
}

#[test]
fn it_splits_long_words_and_expands_tabs() -> Result<()> {
    let message = Message::new(
        Author::System,
        "a\tb supercalifragilisticexpialidociousandmoreandmorewordsinasingleword end",
    );
    let lines_str = create_lines(&message, BubbleAlignment::Left, 30, vec![])?;
    insta::assert_snapshot!(lines_str, @r###"
    ╭Chatbot──────────────────╮
    │ a  b                    │
    │ supercalifragilisticexp │
    │ ialidociousandmoreandmo │
    │ rewordsinasingleword    │
    │ end                     │
    ╰─────────────────────────╯
    "###);

    return Ok(());
}

#[test]
fn it_colours_errors_red() -> Result<()> {
    let message = Message::new_with_type(Author::System, MessageType::Error, "Timed out");
    let theme = Themes::get("base16-ocean.dark", "")?;
    let lines = Bubble::new(&message, BubbleAlignment::Left, 50, vec![]).as_lines(&theme);

    assert_eq!(lines[0].spans[0].style.fg, Some(Color::Red));
    assert_eq!(lines[1].spans[0].style.fg, Some(Color::Red));

    return Ok(());
}

#[test]
fn it_colours_system_messages_brown() -> Result<()> {
    let message = Message::new(Author::System, "Welcome");
    let theme = Themes::get("base16-ocean.dark", "")?;
    let lines = Bubble::new(&message, BubbleAlignment::Left, 50, vec![]).as_lines(&theme);

    assert_eq!(lines[0].spans[0].style.fg, Some(Color::Rgb(138, 85, 63)));

    return Ok(());
}
