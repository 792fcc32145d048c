use test_utils::codeblock_fixture;

use super::Author;
use super::Message;
use super::MessageType;

#[test]
fn it_executes_new() {
    let msg = Message::new(Author::Bot, "Hi there!");
    assert_eq!(msg.author, Author::Bot);
    assert_eq!(msg.author.to_string(), "Bot");
    assert_eq!(msg.text, "Hi there!".to_string());
    assert_eq!(msg.mtype, MessageType::Normal);
}

#[test]
fn it_keeps_text_exactly_as_typed() {
    let msg = Message::new(Author::User, "\t  Hello Playwright  ");
    assert_eq!(msg.author.to_string(), "You");
    assert_eq!(msg.text, "\t  Hello Playwright  ");
}

#[test]
fn it_executes_new_with_type() {
    let msg = Message::new_with_type(Author::System, MessageType::Error, "It broke!");
    assert_eq!(msg.author.to_string(), "Chatbot");
    assert_eq!(msg.text, "It broke!".to_string());
    assert_eq!(msg.message_type(), MessageType::Error);
}

#[test]
fn it_executes_append() {
    let mut msg = Message::new(Author::Bot, "Hi there!");
    msg.append(" It's me!");
    assert_eq!(msg.text, "Hi there! It's me!");

    msg.set_text("Replaced");
    assert_eq!(msg.text, "Replaced");
}

#[test]
fn it_sets_rendered_at() {
    let mut msg = Message::new(Author::Bot, "Hi there!");
    assert_eq!(msg.rendered_at(), 0);
    msg.set_rendered_at(3);
    assert_eq!(msg.rendered_at(), 3);
}

#[test]
fn it_executes_codeblocks() {
    let msg = Message::new(Author::Bot, codeblock_fixture());
    let codeblocks = msg.codeblocks();

    assert_eq!(codeblocks.len(), 4);
    assert_eq!(codeblocks[0].language, "rust");
    insta::assert_snapshot!(codeblocks[0].code, @r###"
    fn print_numbers() {
        for i in 0..=10 {
            println!("{i}");
        }
    }
    "###);

    assert_eq!(codeblocks[1].language, "javascript");
    assert_eq!(codeblocks[2].language, "");
    assert_eq!(codeblocks[2].code, "abc123");

    assert_eq!(codeblocks[3].language, "python");
    insta::assert_snapshot!(codeblocks[3].code, @r###"
    for i in range(11):
        print(i)
    "###);
}

#[test]
fn it_returns_unterminated_codeblocks() {
    let msg = Message::new(Author::Bot, "Streaming:\n```rust\nlet a = 1;\nlet b");
    let codeblocks = msg.codeblocks();

    assert_eq!(codeblocks.len(), 1);
    assert_eq!(codeblocks[0].code, "let a = 1;\nlet b");
}

#[test]
fn it_returns_no_codeblocks_for_plain_text() {
    let msg = Message::new(Author::User, "Hello Playwright");
    assert!(msg.codeblocks().is_empty());
}
