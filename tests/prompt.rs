//! Overwrite confirmation tests.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use framecast::{AFFIRMATIVE_ANSWER, AssumeNo, AssumeYes, ConfirmOverwrite, LinePrompt};

fn ask(input: &str) -> (bool, String) {
    let mut prompt = LinePrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
    let accepted = prompt.confirm(Path::new("frames")).unwrap();
    let (_, written) = prompt.into_inner();
    (accepted, String::from_utf8(written).unwrap())
}

// ── is_affirmative ─────────────────────────────────────────────────

#[test]
fn only_exact_y_is_affirmative() {
    assert_eq!(AFFIRMATIVE_ANSWER, "y");
    assert!(framecast::is_affirmative("y"));
    assert!(framecast::is_affirmative("y\n"));
    assert!(framecast::is_affirmative("y\r\n"));

    for answer in ["Y\n", "yes\n", " y\n", "y \n", "n\n", "\n", ""] {
        assert!(
            !framecast::is_affirmative(answer),
            "{answer:?} should not be consent"
        );
    }
}

// ── LinePrompt ─────────────────────────────────────────────────────

#[test]
fn line_prompt_shows_directory_and_reads_answer() {
    let (accepted, shown) = ask("y\n");
    assert!(accepted);
    assert_eq!(shown, "frames is not empty. Do you want to continue (y/n)? ");

    let (accepted, _) = ask("n\n");
    assert!(!accepted);
}

#[test]
fn end_of_input_is_a_refusal() {
    let (accepted, _) = ask("");
    assert!(!accepted);
}

#[test]
fn only_the_first_line_is_read() {
    let (accepted, _) = ask("no\ny\n");
    assert!(!accepted);
}

// ── closures and fixed answers ─────────────────────────────────────

#[test]
fn closures_record_the_directory() {
    let mut asked: Vec<PathBuf> = Vec::new();
    let mut record = |dir: &Path| {
        asked.push(dir.to_path_buf());
        true
    };
    assert!(record.confirm(Path::new("a")).unwrap());
    assert_eq!(asked, vec![PathBuf::from("a")]);
}

#[test]
fn fixed_answers() {
    assert!(AssumeYes.confirm(Path::new("a")).unwrap());
    assert!(!AssumeNo.confirm(Path::new("a")).unwrap());
}
